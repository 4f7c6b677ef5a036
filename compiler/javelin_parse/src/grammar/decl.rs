//! Type declarations and their members.
//!
//! Member disambiguation works the way the block-statement one does, with
//! one extra wrinkle: a parsed return type that is a bare identifier
//! directly followed by `(` is a constructor, and fields are told from
//! methods by whether a parameter list follows the member name.

use javelin_diagnostic::ErrorCode;
use javelin_ir::{
    ClassTag, Comment, ModifierFlags, Name, NodeId, NodeList, PrimitiveType, Tree, TokenKind,
};

use crate::{Feature, Parser, TreeFactory};

impl<F: TreeFactory> Parser<'_, '_, F> {
    // ── Modifiers and annotations ───────────────────────────────────────

    /// Raw modifier words and annotations, without building the node.
    fn modifier_parts(&mut self) -> (ModifierFlags, Vec<NodeId>) {
        let mut flags = ModifierFlags::empty();
        let mut annotations = Vec::new();
        loop {
            let flag = match self.kind() {
                TokenKind::Public => ModifierFlags::PUBLIC,
                TokenKind::Protected => ModifierFlags::PROTECTED,
                TokenKind::Private => ModifierFlags::PRIVATE,
                TokenKind::Abstract => ModifierFlags::ABSTRACT,
                TokenKind::Static => ModifierFlags::STATIC,
                TokenKind::Final => ModifierFlags::FINAL,
                TokenKind::Transient => ModifierFlags::TRANSIENT,
                TokenKind::Volatile => ModifierFlags::VOLATILE,
                TokenKind::Synchronized => ModifierFlags::SYNCHRONIZED,
                TokenKind::Native => ModifierFlags::NATIVE,
                TokenKind::Strictfp => ModifierFlags::STRICTFP,
                TokenKind::Default => {
                    self.check_feature(Feature::DefaultMethods, self.pos());
                    ModifierFlags::DEFAULT
                }
                TokenKind::At => {
                    // `@interface` is a declaration, not an annotation
                    if self.peek_kind(1) == TokenKind::Interface {
                        break;
                    }
                    self.check_feature(Feature::Annotations, self.pos());
                    let at_pos = self.pos();
                    self.next();
                    annotations.push(self.annotation_rest(at_pos));
                    continue;
                }
                _ => break,
            };
            if flags.contains(flag) {
                let at = self.pos();
                self.report_syntax_error(at, ErrorCode::E1006, "repeated modifier");
            }
            flags |= flag;
            self.next();
        }
        (flags, annotations)
    }

    /// Optional modifiers and annotations as a `Modifiers` node.
    pub(crate) fn modifiers_opt(&mut self, first_annotations: Option<Vec<NodeId>>) -> NodeId {
        let pos = self.pos();
        let (flags, mut annotations) = self.modifier_parts();
        if let Some(mut first) = first_annotations {
            first.append(&mut annotations);
            annotations = first;
        }
        let annotations = self.make_list(&annotations);
        self.make_at(Tree::Modifiers { flags, annotations }, pos)
    }

    /// The rest of an annotation, after its `@`.
    pub(crate) fn annotation_rest(&mut self, pos: u32) -> NodeId {
        let ann_type = self.qualident();
        let args = if self.kind() == TokenKind::LParen {
            self.annotation_arguments()
        } else {
            NodeList::EMPTY
        };
        self.make(Tree::Annotation { ann_type, args }, pos)
    }

    /// Marker, single-element, or normal annotation arguments.
    fn annotation_arguments(&mut self) -> NodeList {
        self.accept(TokenKind::LParen);
        let mut items = Vec::new();
        if self.kind() != TokenKind::RParen && self.kind() != TokenKind::Eof {
            loop {
                if self.kind().is_lax_identifier() && self.peek_kind(1) == TokenKind::Eq {
                    let pos = self.pos();
                    let name = self.ident();
                    let target = self.make(Tree::Ident { name }, pos);
                    let eq_pos = self.pos();
                    self.accept(TokenKind::Eq);
                    let value = self.annotation_value();
                    items.push(self.make(Tree::Assign { target, value }, eq_pos));
                } else {
                    items.push(self.annotation_value());
                }
                if self.kind() != TokenKind::Comma {
                    break;
                }
                self.next();
            }
        }
        self.accept(TokenKind::RParen);
        self.make_list(&items)
    }

    /// Element value: nested annotation, array of values, or a
    /// conditional expression.
    pub(crate) fn annotation_value(&mut self) -> NodeId {
        match self.kind() {
            TokenKind::At => {
                let pos = self.pos();
                self.next();
                self.annotation_rest(pos)
            }
            TokenKind::LBrace => {
                let pos = self.pos();
                self.next();
                let mut items = Vec::new();
                if self.kind() != TokenKind::RBrace {
                    loop {
                        items.push(self.annotation_value());
                        if self.kind() != TokenKind::Comma {
                            break;
                        }
                        self.next();
                        if self.kind() == TokenKind::RBrace {
                            break;
                        }
                    }
                }
                self.accept(TokenKind::RBrace);
                let initializers = self.make_list(&items);
                self.make(
                    Tree::NewArray {
                        elem_type: None,
                        dims: NodeList::EMPTY,
                        initializers: Some(initializers),
                    },
                    pos,
                )
            }
            _ => self.parse_expression(),
        }
    }

    /// Consecutive annotations (declaration position).
    pub(crate) fn annotations_opt(&mut self) -> Vec<NodeId> {
        let mut annotations = Vec::new();
        while self.kind() == TokenKind::At && self.peek_kind(1) != TokenKind::Interface {
            self.check_feature(Feature::Annotations, self.pos());
            let pos = self.pos();
            self.next();
            annotations.push(self.annotation_rest(pos));
        }
        annotations
    }

    // ── Type declarations ───────────────────────────────────────────────

    /// `class | interface | enum | @interface` declaration with parsed
    /// modifiers.
    pub(crate) fn class_or_interface_or_enum_decl(
        &mut self,
        mods: NodeId,
        dc: Option<Comment>,
    ) -> NodeId {
        match self.kind() {
            TokenKind::Class => self.class_declaration(mods, dc),
            TokenKind::Interface => self.interface_declaration(mods, dc, ClassTag::Interface),
            TokenKind::Enum => {
                self.check_feature(Feature::Enums, self.pos());
                self.enum_declaration(mods, dc)
            }
            TokenKind::At if self.peek_kind(1) == TokenKind::Interface => {
                self.check_feature(Feature::Annotations, self.pos());
                self.next();
                self.interface_declaration(mods, dc, ClassTag::Annotation)
            }
            _ => {
                let pos = self.pos();
                let mut parts = vec![mods];
                if self.kind().is_lax_identifier() {
                    let name = self.ident();
                    parts.push(self.make(Tree::Ident { name }, pos));
                }
                self.syntax_error(
                    pos,
                    &parts,
                    ErrorCode::E1008,
                    "'class', 'interface', or 'enum' expected",
                )
            }
        }
    }

    fn class_declaration(&mut self, mods: NodeId, dc: Option<Comment>) -> NodeId {
        let pos = self.pos();
        self.accept(TokenKind::Class);
        let name = self.ident();
        let type_params = self.type_parameters_opt();
        let extends_clause = if self.kind() == TokenKind::Extends {
            self.next();
            Some(self.parse_type())
        } else {
            None
        };
        let implements_clause = if self.kind() == TokenKind::Implements {
            self.next();
            let types = self.type_list();
            self.make_list(&types)
        } else {
            NodeList::EMPTY
        };
        let members = self.class_or_interface_body(false);
        let decl = self.make(
            Tree::ClassDecl {
                tag: ClassTag::Class,
                mods,
                name,
                type_params,
                extends_clause,
                implements_clause,
                members,
            },
            pos,
        );
        self.attach_doc(decl, dc);
        decl
    }

    fn interface_declaration(
        &mut self,
        mods: NodeId,
        dc: Option<Comment>,
        tag: ClassTag,
    ) -> NodeId {
        let pos = self.pos();
        self.accept(TokenKind::Interface);
        let name = self.ident();
        let type_params = self.type_parameters_opt();
        let extends_clause = if self.kind() == TokenKind::Extends {
            self.next();
            let types = self.type_list();
            self.make_list(&types)
        } else {
            NodeList::EMPTY
        };
        let members = self.class_or_interface_body(true);
        let decl = self.make(
            Tree::ClassDecl {
                tag,
                mods,
                name,
                type_params,
                extends_clause: None,
                implements_clause: extends_clause,
                members,
            },
            pos,
        );
        self.attach_doc(decl, dc);
        decl
    }

    fn enum_declaration(&mut self, mods: NodeId, dc: Option<Comment>) -> NodeId {
        let pos = self.pos();
        self.accept(TokenKind::Enum);
        let name = self.ident();
        let implements_clause = if self.kind() == TokenKind::Implements {
            self.next();
            let types = self.type_list();
            self.make_list(&types)
        } else {
            NodeList::EMPTY
        };
        let members = self.enum_body(name);
        let decl = self.make(
            Tree::ClassDecl {
                tag: ClassTag::Enum,
                mods,
                name,
                type_params: NodeList::EMPTY,
                extends_clause: None,
                implements_clause,
                members,
            },
            pos,
        );
        self.attach_doc(decl, dc);
        decl
    }

    /// `{ [Constants] [; Members] }`.
    fn enum_body(&mut self, enum_name: Name) -> NodeList {
        self.accept(TokenKind::LBrace);
        let mut defs = Vec::new();
        if self.kind() == TokenKind::Comma {
            self.next();
        } else if !matches!(self.kind(), TokenKind::RBrace | TokenKind::Semi | TokenKind::Eof) {
            loop {
                defs.push(self.enum_constant(enum_name));
                if self.kind() != TokenKind::Comma {
                    break;
                }
                self.next();
                if matches!(self.kind(), TokenKind::RBrace | TokenKind::Semi) {
                    break;
                }
            }
        }
        if self.kind() == TokenKind::Semi {
            self.next();
            while !matches!(self.kind(), TokenKind::RBrace | TokenKind::Eof) {
                defs.extend(self.class_body_declaration(false));
            }
        }
        self.accept(TokenKind::RBrace);
        self.make_list(&defs)
    }

    /// One enum constant: annotations, name, optional arguments, optional
    /// class body. Represented as an enum-flagged variable whose
    /// initializer instantiates the enum type.
    fn enum_constant(&mut self, enum_name: Name) -> NodeId {
        let dc = self.current_doc_comment();
        let pos = self.pos();
        let annotations = self.annotations_opt();
        let annotations = self.make_list(&annotations);
        let mods = self.make_at(
            Tree::Modifiers {
                flags: ModifierFlags::ENUM_CONSTANT
                    | ModifierFlags::PUBLIC
                    | ModifierFlags::STATIC
                    | ModifierFlags::FINAL,
                annotations,
            },
            pos,
        );
        let name_pos = self.pos();
        let name = self.ident();
        let args = if self.kind() == TokenKind::LParen {
            self.arguments()
        } else {
            NodeList::EMPTY
        };
        let class_body = if self.kind() == TokenKind::LBrace {
            let body_pos = self.pos();
            let body_mods = self.empty_modifiers(body_pos);
            let members = self.class_or_interface_body(false);
            Some(self.make(
                Tree::ClassDecl {
                    tag: ClassTag::Class,
                    mods: body_mods,
                    name: Name::EMPTY,
                    type_params: NodeList::EMPTY,
                    extends_clause: None,
                    implements_clause: NodeList::EMPTY,
                    members,
                },
                body_pos,
            ))
        } else {
            None
        };
        let enum_type = self.make_at(Tree::Ident { name: enum_name }, name_pos);
        let init = self.make(
            Tree::NewClass {
                enclosing: None,
                type_args: NodeList::EMPTY,
                class_type: enum_type,
                args,
                class_body,
            },
            name_pos,
        );
        let decl = self.make(
            Tree::VarDecl {
                mods,
                name,
                var_type: Some(enum_type),
                init: Some(init),
            },
            pos,
        );
        self.attach_doc(decl, dc);
        decl
    }

    // ── Class bodies and members ────────────────────────────────────────

    /// `{ MemberDecl* }`.
    pub(crate) fn class_or_interface_body(&mut self, is_interface: bool) -> NodeList {
        self.accept(TokenKind::LBrace);
        if self.recovered_here() {
            self.skip(false, true, false, false);
            if self.kind() == TokenKind::LBrace {
                self.next();
            }
        }
        let mut members = Vec::new();
        while !matches!(self.kind(), TokenKind::RBrace | TokenKind::Eof) {
            members.extend(self.class_body_declaration(is_interface));
            if self.recovered_here() {
                self.skip(false, true, false, false);
            }
        }
        self.accept(TokenKind::RBrace);
        self.make_list(&members)
    }

    /// One member declaration; may yield several nodes (field declarator
    /// lists) or none (stray semicolons).
    pub(crate) fn class_body_declaration(&mut self, is_interface: bool) -> Vec<NodeId> {
        if self.kind() == TokenKind::Semi {
            self.next();
            return Vec::new();
        }
        let dc = self.current_doc_comment();
        let start_pos = self.pos();
        let mods = self.modifiers_opt(None);

        // nested type declarations
        if matches!(
            self.kind(),
            TokenKind::Class | TokenKind::Interface | TokenKind::Enum
        ) || (self.kind() == TokenKind::At && self.peek_kind(1) == TokenKind::Interface)
        {
            return vec![self.class_or_interface_or_enum_decl(mods, dc)];
        }

        // initializer blocks: `{ ... }` or `static { ... }`
        if self.kind() == TokenKind::LBrace {
            let is_static = self.mods_flags(mods).contains(ModifierFlags::STATIC);
            return vec![self.block_with_static(is_static)];
        }

        // generic method type parameters
        let type_params = self.type_parameters_opt();

        // return type, or the constructor name
        let is_void = self.kind() == TokenKind::Void;
        let type_pos = self.pos();
        let ret_type = if is_void {
            let t = self.make(
                Tree::PrimitiveTypeTree {
                    prim: PrimitiveType::Void,
                },
                type_pos,
            );
            self.next();
            t
        } else {
            self.parse_type()
        };

        if self.kind() == TokenKind::LParen && !is_interface {
            if let Tree::Ident { name } = self.node_kind(ret_type) {
                // constructor: the "return type" was the type name
                let name = *name;
                let decl = self.method_rest(
                    mods,
                    type_params,
                    None,
                    name,
                    start_pos,
                    dc,
                    is_interface,
                );
                return vec![decl];
            }
        }

        let member_pos = self.pos();
        let name = self.ident();
        if self.kind() == TokenKind::LParen {
            let decl = self.method_rest(
                mods,
                type_params,
                Some(ret_type),
                name,
                start_pos,
                dc,
                is_interface,
            );
            vec![decl]
        } else if !is_void && type_params.is_empty() {
            let decls = self.variable_declarators_rest(mods, ret_type, name, member_pos);
            self.accept(TokenKind::Semi);
            if let Some(first) = decls.first() {
                self.attach_doc(*first, dc);
            }
            decls
        } else {
            let pos = self.pos();
            let parts = [mods, ret_type];
            let err = self.syntax_error(pos, &parts, ErrorCode::E1001, "'(' expected");
            vec![err]
        }
    }

    fn mods_flags(&self, mods: NodeId) -> ModifierFlags {
        match self.node_kind(mods) {
            Tree::Modifiers { flags, .. } => *flags,
            _ => ModifierFlags::empty(),
        }
    }

    /// Method (or constructor) declaration from the parameter list on.
    #[allow(
        clippy::too_many_arguments,
        reason = "mirrors the declaration prefix already parsed by the caller"
    )]
    pub(crate) fn method_rest(
        &mut self,
        mods: NodeId,
        type_params: NodeList,
        ret_type: Option<NodeId>,
        name: Name,
        pos: u32,
        dc: Option<Comment>,
        is_interface: bool,
    ) -> NodeId {
        let (params, receiver) = self.formal_parameters();
        // trailing brackets on the declarator apply to the return type
        let ret_type = ret_type.map(|t| self.brackets_opt(t));
        let throws_clause = if self.kind() == TokenKind::Throws {
            self.next();
            let types = self.type_list();
            self.make_list(&types)
        } else {
            NodeList::EMPTY
        };
        let default_value = if self.kind() == TokenKind::Default {
            self.next();
            Some(self.annotation_value())
        } else {
            None
        };
        let body = if self.kind() == TokenKind::LBrace {
            if is_interface {
                let flags = self.mods_flags(mods);
                if flags.contains(ModifierFlags::STATIC) {
                    self.check_feature(Feature::StaticInterfaceMethods, pos);
                } else if !flags.contains(ModifierFlags::DEFAULT) {
                    // body on an ordinary interface method
                    self.check_feature(Feature::DefaultMethods, pos);
                }
            }
            Some(self.block())
        } else {
            self.accept(TokenKind::Semi);
            if self.recovered_here() {
                self.skip(false, true, false, false);
                if self.kind() == TokenKind::LBrace {
                    Some(self.block())
                } else {
                    None
                }
            } else {
                None
            }
        };
        let decl = self.make(
            Tree::MethodDecl {
                mods,
                name,
                type_params,
                return_type: ret_type,
                receiver,
                params,
                throws_clause,
                default_value,
                body,
            },
            pos,
        );
        self.attach_doc(decl, dc);
        decl
    }

    /// `( [FormalParameter {, FormalParameter}] )`, extracting a leading
    /// receiver parameter when present.
    pub(crate) fn formal_parameters(&mut self) -> (NodeList, Option<NodeId>) {
        self.accept(TokenKind::LParen);
        let mut params = Vec::new();
        let mut receiver = None;
        let mut last_varargs_pos: Option<u32> = None;
        if self.kind() != TokenKind::RParen && self.kind() != TokenKind::Eof {
            loop {
                let pos = self.pos();
                let (param, is_receiver, is_varargs) = self.formal_parameter_full(false);
                if is_receiver && params.is_empty() && receiver.is_none() {
                    receiver = Some(param);
                } else {
                    if let Some(va_pos) = last_varargs_pos {
                        self.report_syntax_error(
                            va_pos,
                            ErrorCode::E1009,
                            "varargs parameter must be the last parameter",
                        );
                        last_varargs_pos = None;
                    }
                    params.push(param);
                }
                if is_varargs {
                    last_varargs_pos = Some(pos);
                }
                if self.kind() != TokenKind::Comma {
                    break;
                }
                self.next();
            }
        }
        self.accept(TokenKind::RParen);
        (self.make_list(&params), receiver)
    }

    /// One formal parameter (also used for typed lambda parameters).
    pub(crate) fn formal_parameter(&mut self, lambda: bool) -> NodeId {
        self.formal_parameter_full(lambda).0
    }

    fn formal_parameter_full(&mut self, lambda: bool) -> (NodeId, bool, bool) {
        let pos = self.pos();
        let (mut flags, annotations) = self.modifier_parts();
        let annotations = self.make_list(&annotations);
        let mut ty = self.parse_type();
        let mut is_varargs = false;
        if self.kind() == TokenKind::Ellipsis {
            self.check_feature(Feature::Varargs, self.pos());
            self.next();
            flags |= ModifierFlags::VARARGS;
            is_varargs = true;
            let elem = ty;
            ty = self.make(Tree::ArrayType { elem }, self.node_pos(elem));
        }
        let mods = self.make_at(Tree::Modifiers { flags, annotations }, pos);
        // receiver parameter: `Type this`
        if self.kind() == TokenKind::This && !lambda {
            self.check_feature(Feature::ReceiverParams, self.pos());
            let name_pos = self.pos();
            self.next();
            let name = self.intern("this");
            let param = self.make(
                Tree::VarDecl {
                    mods,
                    name,
                    var_type: Some(ty),
                    init: None,
                },
                name_pos,
            );
            return (param, true, false);
        }
        let name_pos = self.pos();
        let name = self.ident();
        let ty = self.brackets_opt(ty);
        let param = self.make(
            Tree::VarDecl {
                mods,
                name,
                var_type: Some(ty),
                init: None,
            },
            name_pos,
        );
        (param, false, is_varargs)
    }
}
