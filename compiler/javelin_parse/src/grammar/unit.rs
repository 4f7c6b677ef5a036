//! Compilation units: package clause, imports, type declarations.
//!
//! Leading annotations are ambiguous until the next token: they belong to
//! the package clause when `package` follows, otherwise they are the first
//! type declaration's modifiers.

use javelin_ir::{NodeId, NodeList, Tree, TokenKind};

use crate::{Feature, Parser, TreeFactory};

impl<F: TreeFactory> Parser<'_, '_, F> {
    /// Parse one translation unit to end of input.
    pub fn parse_compilation_unit(&mut self) -> NodeId {
        let unit_pos = self.pos();

        let mut package_annotations = NodeList::EMPTY;
        let mut pending_mods: Option<NodeId> = None;
        if self.kind() == TokenKind::At && self.peek_kind(1) != TokenKind::Interface {
            let annotations = self.annotations_opt();
            if self.kind() == TokenKind::Package {
                package_annotations = self.make_list(&annotations);
            } else {
                pending_mods = Some(self.modifiers_opt(Some(annotations)));
            }
        }

        let package_name = if self.kind() == TokenKind::Package && pending_mods.is_none() {
            self.next();
            let name = self.qualident();
            self.accept(TokenKind::Semi);
            Some(name)
        } else {
            None
        };

        let mut imports = Vec::new();
        let mut type_decls = Vec::new();
        loop {
            match self.kind() {
                TokenKind::Eof => break,
                TokenKind::Import if pending_mods.is_none() => {
                    imports.push(self.import_declaration());
                }
                TokenKind::Semi => {
                    // stray semicolon between declarations
                    let pos = self.pos();
                    self.next();
                    type_decls.push(self.make(Tree::EmptyStatement, pos));
                }
                _ => {
                    let dc = self.current_doc_comment();
                    let mods = match pending_mods.take() {
                        Some(mods) => mods,
                        None => self.modifiers_opt(None),
                    };
                    type_decls.push(self.class_or_interface_or_enum_decl(mods, dc));
                }
            }
        }

        let imports = self.make_list(&imports);
        let type_decls = self.make_list(&type_decls);
        self.make(
            Tree::CompilationUnit {
                package_annotations,
                package_name,
                imports,
                type_decls,
            },
            unit_pos,
        )
    }

    /// `import [static] Qualified [.*] ;`.
    fn import_declaration(&mut self) -> NodeId {
        let pos = self.pos();
        self.next();
        let is_static = if self.kind() == TokenKind::Static {
            self.check_feature(Feature::StaticImport, self.pos());
            self.next();
            true
        } else {
            false
        };
        let first_pos = self.pos();
        let name = self.ident();
        let mut qualified = self.make(Tree::Ident { name }, first_pos);
        loop {
            let sel_pos = self.pos();
            self.accept(TokenKind::Dot);
            if self.kind() == TokenKind::Star {
                let name = self.intern("*");
                self.next();
                qualified = self.make(
                    Tree::Select {
                        target: qualified,
                        name,
                    },
                    sel_pos,
                );
                break;
            }
            let name = self.ident();
            qualified = self.make(
                Tree::Select {
                    target: qualified,
                    name,
                },
                sel_pos,
            );
            if self.kind() != TokenKind::Dot {
                break;
            }
        }
        self.accept(TokenKind::Semi);
        self.make(
            Tree::Import {
                is_static,
                qualified,
            },
            pos,
        )
    }
}
