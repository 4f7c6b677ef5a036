//! Statement parsing.
//!
//! The interesting production is the block-statement disambiguation: a
//! statement starting with a name can be a labeled statement, a local
//! variable declaration, or an expression statement. It is parsed once
//! under `EXPR | TYPE`; the mode the term *ended* in (`last_mode`) plus
//! one token of lookahead decide which it was.

use javelin_diagnostic::ErrorCode;
use javelin_ir::{Name, NodeId, Tree, TokenKind};

use crate::{Feature, Mode, Parser, TreeFactory};

impl<F: TreeFactory> Parser<'_, '_, F> {
    /// `{ BlockStatements }`.
    pub(crate) fn block(&mut self) -> NodeId {
        self.block_with_static(false)
    }

    /// A block, optionally a static initializer block.
    pub(crate) fn block_with_static(&mut self, is_static: bool) -> NodeId {
        let pos = self.pos();
        self.accept(TokenKind::LBrace);
        let stats = self.block_statements();
        let stats = self.make_list(&stats);
        let t = self.make_at(Tree::Block { is_static, stats }, pos);
        self.accept(TokenKind::RBrace);
        self.finish_node(t)
    }

    /// Statements until a closing brace, a `case`/`default` label, or end
    /// of input.
    pub(crate) fn block_statements(&mut self) -> Vec<NodeId> {
        let mut stats = Vec::new();
        loop {
            match self.kind() {
                TokenKind::RBrace
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::Eof => return stats,
                TokenKind::LBrace
                | TokenKind::If
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::Try
                | TokenKind::Switch
                | TokenKind::Synchronized
                | TokenKind::Return
                | TokenKind::Throw
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Semi
                | TokenKind::Else
                | TokenKind::Finally
                | TokenKind::Catch
                | TokenKind::Assert => {
                    stats.push(self.parse_statement());
                }
                TokenKind::At
                | TokenKind::Final
                | TokenKind::Abstract
                | TokenKind::Strictfp => {
                    // local class or final local variables
                    let dc = self.current_doc_comment();
                    let mods = self.modifiers_opt(None);
                    if matches!(
                        self.kind(),
                        TokenKind::Class | TokenKind::Interface | TokenKind::Enum
                    ) {
                        stats.push(self.class_or_interface_or_enum_decl(mods, dc));
                    } else {
                        let ty = self.parse_type();
                        stats.extend(self.variable_declarators(mods, Some(ty)));
                        self.accept(TokenKind::Semi);
                    }
                }
                TokenKind::Class | TokenKind::Interface | TokenKind::Enum => {
                    let dc = self.current_doc_comment();
                    let pos = self.pos();
                    let mods = self.empty_modifiers(pos);
                    stats.push(self.class_or_interface_or_enum_decl(mods, dc));
                }
                _ => {
                    // expression, labeled statement, or typed local variable
                    let pos = self.pos();
                    let t = self.term(Mode::EXPR | Mode::TYPE);
                    if self.kind() == TokenKind::Colon && self.ident_name_of(t).is_some() {
                        self.next();
                        let label = self.ident_name_of(t).unwrap_or(Name::EMPTY);
                        let body = self.parse_statement();
                        stats.push(self.make(Tree::Labeled { label, body }, pos));
                    } else if self.last_mode.contains(Mode::TYPE)
                        && self.kind().is_lax_identifier()
                    {
                        let mods = self.empty_modifiers(pos);
                        stats.extend(self.variable_declarators(mods, Some(t)));
                        self.accept(TokenKind::Semi);
                    } else {
                        self.accept(TokenKind::Semi);
                        stats.push(self.make(Tree::ExprStatement { expr: t }, pos));
                    }
                }
            }
            if self.recovered_here() {
                self.skip(false, true, true, true);
            }
        }
    }

    /// One statement.
    pub(crate) fn parse_statement(&mut self) -> NodeId {
        crate::stack::ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> NodeId {
        let pos = self.pos();
        match self.kind() {
            TokenKind::LBrace => self.block(),
            TokenKind::If => {
                self.next();
                let cond = self.par_expression();
                let then_stat = self.parse_statement();
                let else_stat = if self.kind() == TokenKind::Else {
                    self.next();
                    Some(self.parse_statement())
                } else {
                    None
                };
                self.make(
                    Tree::If {
                        cond,
                        then_stat,
                        else_stat,
                    },
                    pos,
                )
            }
            TokenKind::For => {
                self.next();
                self.accept(TokenKind::LParen);
                let inits = if self.kind() == TokenKind::Semi {
                    Vec::new()
                } else {
                    self.for_init()
                };
                // a single uninitialized variable followed by ':' is an
                // enhanced for
                if inits.len() == 1
                    && self.kind() == TokenKind::Colon
                    && matches!(
                        self.node_kind(inits[0]),
                        Tree::VarDecl { init: None, .. }
                    )
                {
                    self.check_feature(Feature::Foreach, pos);
                    self.next();
                    let iterable = self.parse_expression();
                    self.accept(TokenKind::RParen);
                    let body = self.parse_statement();
                    return self.make(
                        Tree::ForEach {
                            var: inits[0],
                            iterable,
                            body,
                        },
                        pos,
                    );
                }
                self.accept(TokenKind::Semi);
                let cond = if self.kind() == TokenKind::Semi {
                    None
                } else {
                    Some(self.parse_expression())
                };
                self.accept(TokenKind::Semi);
                let update = if self.kind() == TokenKind::RParen {
                    Vec::new()
                } else {
                    self.statement_expression_list()
                };
                self.accept(TokenKind::RParen);
                let body = self.parse_statement();
                let init = self.make_list(&inits);
                let update = self.make_list(&update);
                self.make(
                    Tree::ForLoop {
                        init,
                        cond,
                        update,
                        body,
                    },
                    pos,
                )
            }
            TokenKind::While => {
                self.next();
                let cond = self.par_expression();
                let body = self.parse_statement();
                self.make(Tree::While { cond, body }, pos)
            }
            TokenKind::Do => {
                self.next();
                let body = self.parse_statement();
                self.accept(TokenKind::While);
                let cond = self.par_expression();
                self.accept(TokenKind::Semi);
                self.make(Tree::DoWhile { body, cond }, pos)
            }
            TokenKind::Try => {
                self.next();
                let resources = if self.kind() == TokenKind::LParen {
                    self.check_feature(Feature::TryWithResources, self.pos());
                    self.resources()
                } else {
                    Vec::new()
                };
                let body = self.block();
                let mut catches = Vec::new();
                let mut finally_block = None;
                if matches!(self.kind(), TokenKind::Catch | TokenKind::Finally) {
                    while self.kind() == TokenKind::Catch {
                        catches.push(self.catch_clause());
                    }
                    if self.kind() == TokenKind::Finally {
                        self.next();
                        finally_block = Some(self.block());
                    }
                } else if resources.is_empty() {
                    self.report_syntax_error(
                        pos,
                        ErrorCode::E1011,
                        "'try' without 'catch', 'finally' or resource declarations",
                    );
                }
                let resources = self.make_list(&resources);
                let catches = self.make_list(&catches);
                self.make(
                    Tree::Try {
                        resources,
                        body,
                        catches,
                        finally_block,
                    },
                    pos,
                )
            }
            TokenKind::Switch => {
                self.next();
                let selector = self.par_expression();
                self.accept(TokenKind::LBrace);
                let cases = self.switch_block();
                let cases = self.make_list(&cases);
                let t = self.make_at(Tree::Switch { selector, cases }, pos);
                self.accept(TokenKind::RBrace);
                self.finish_node(t)
            }
            TokenKind::Synchronized => {
                self.next();
                let lock = self.par_expression();
                let body = self.block();
                self.make(Tree::Synchronized { lock, body }, pos)
            }
            TokenKind::Return => {
                self.next();
                let expr = if self.kind() == TokenKind::Semi {
                    None
                } else {
                    Some(self.parse_expression())
                };
                self.accept(TokenKind::Semi);
                self.make(Tree::Return { expr }, pos)
            }
            TokenKind::Throw => {
                self.next();
                let expr = self.parse_expression();
                self.accept(TokenKind::Semi);
                self.make(Tree::Throw { expr }, pos)
            }
            TokenKind::Break => {
                self.next();
                let label = self.label_opt();
                self.accept(TokenKind::Semi);
                self.make(Tree::Break { label }, pos)
            }
            TokenKind::Continue => {
                self.next();
                let label = self.label_opt();
                self.accept(TokenKind::Semi);
                self.make(Tree::Continue { label }, pos)
            }
            TokenKind::Semi => {
                self.next();
                self.make(Tree::EmptyStatement, pos)
            }
            TokenKind::Assert => {
                self.next();
                let cond = self.parse_expression();
                let detail = if self.kind() == TokenKind::Colon {
                    self.next();
                    Some(self.parse_expression())
                } else {
                    None
                };
                self.accept(TokenKind::Semi);
                self.make(Tree::Assert { cond, detail }, pos)
            }
            TokenKind::Else => {
                self.report_syntax_error(pos, ErrorCode::E1013, "'else' without 'if'");
                self.next();
                let stat = self.parse_statement();
                let parts = self.make_list(&[stat]);
                self.make(Tree::Erroneous { parts }, pos)
            }
            TokenKind::Finally => {
                self.report_syntax_error(pos, ErrorCode::E1013, "'finally' without 'try'");
                self.next();
                let stat = self.parse_statement();
                let parts = self.make_list(&[stat]);
                self.make(Tree::Erroneous { parts }, pos)
            }
            TokenKind::Catch => {
                self.report_syntax_error(pos, ErrorCode::E1013, "'catch' without 'try'");
                let clause = self.catch_clause();
                let parts = self.make_list(&[clause]);
                self.make(Tree::Erroneous { parts }, pos)
            }
            TokenKind::Eof => {
                // statement requested at end of input
                self.report_syntax_error(pos, ErrorCode::E1005, "reached end of input");
                self.make(Tree::EmptyStatement, pos)
            }
            _ => {
                // expression statement or labeled statement
                let expr = self.parse_expression();
                if self.kind() == TokenKind::Colon && self.ident_name_of(expr).is_some() {
                    self.next();
                    let label = self.ident_name_of(expr).unwrap_or(Name::EMPTY);
                    let body = self.parse_statement();
                    self.make(Tree::Labeled { label, body }, pos)
                } else {
                    self.accept(TokenKind::Semi);
                    self.make(Tree::ExprStatement { expr }, pos)
                }
            }
        }
    }

    /// The name under an `Ident` node, for labeled-statement detection.
    fn ident_name_of(&self, t: NodeId) -> Option<Name> {
        match self.node_kind(t) {
            Tree::Ident { name } => Some(*name),
            _ => None,
        }
    }

    fn label_opt(&mut self) -> Option<Name> {
        if self.kind().is_lax_identifier() {
            Some(self.ident())
        } else {
            None
        }
    }

    /// `( Expression )`.
    pub(crate) fn par_expression(&mut self) -> NodeId {
        self.accept(TokenKind::LParen);
        let expr = self.parse_expression();
        self.accept(TokenKind::RParen);
        expr
    }

    /// For-loop initializers: variable declarations or an expression list.
    fn for_init(&mut self) -> Vec<NodeId> {
        if matches!(self.kind(), TokenKind::Final | TokenKind::At) {
            let mods = self.modifiers_opt(None);
            let ty = self.parse_type();
            return self.variable_declarators(mods, Some(ty));
        }
        let pos = self.pos();
        let t = self.term(Mode::EXPR | Mode::TYPE);
        if self.last_mode.contains(Mode::TYPE) && self.kind().is_lax_identifier() {
            let mods = self.empty_modifiers(pos);
            self.variable_declarators(mods, Some(t))
        } else {
            let mut stats = vec![self.make(Tree::ExprStatement { expr: t }, pos)];
            while self.kind() == TokenKind::Comma {
                self.next();
                let epos = self.pos();
                let e = self.parse_expression();
                stats.push(self.make(Tree::ExprStatement { expr: e }, epos));
            }
            stats
        }
    }

    /// `Expression {, Expression}` wrapped as expression statements, for
    /// for-loop updates.
    fn statement_expression_list(&mut self) -> Vec<NodeId> {
        let mut stats = Vec::new();
        loop {
            let pos = self.pos();
            let e = self.parse_expression();
            stats.push(self.make(Tree::ExprStatement { expr: e }, pos));
            if self.kind() != TokenKind::Comma {
                return stats;
            }
            self.next();
        }
    }

    /// `catch ( Modifiers CatchType name ) Block`; the catch type may be a
    /// multi-catch union (gated).
    fn catch_clause(&mut self) -> NodeId {
        let pos = self.pos();
        self.accept(TokenKind::Catch);
        self.accept(TokenKind::LParen);
        let mods = self.modifiers_opt(None);
        let ty = self.catch_type();
        let param_pos = self.pos();
        let name = self.ident();
        let param = self.make(
            Tree::VarDecl {
                mods,
                name,
                var_type: Some(ty),
                init: None,
            },
            param_pos,
        );
        self.accept(TokenKind::RParen);
        let body = self.block();
        self.make(Tree::Catch { param, body }, pos)
    }

    fn catch_type(&mut self) -> NodeId {
        let pos = self.pos();
        let first = self.parse_type();
        if self.kind() != TokenKind::Bar {
            return first;
        }
        self.check_feature(Feature::MultiCatch, self.pos());
        let mut alternatives = vec![first];
        while self.kind() == TokenKind::Bar {
            self.next();
            alternatives.push(self.parse_type());
        }
        let alternatives = self.make_list(&alternatives);
        self.make(Tree::TypeUnion { alternatives }, pos)
    }

    /// `case Expr : stats` and `default : stats` groups.
    fn switch_block(&mut self) -> Vec<NodeId> {
        let mut cases = Vec::new();
        loop {
            let pos = self.pos();
            match self.kind() {
                TokenKind::Case => {
                    self.next();
                    let pattern = self.parse_expression();
                    self.accept(TokenKind::Colon);
                    let stats = self.block_statements();
                    let stats = self.make_list(&stats);
                    cases.push(self.make(
                        Tree::Case {
                            pattern: Some(pattern),
                            stats,
                        },
                        pos,
                    ));
                }
                TokenKind::Default => {
                    self.next();
                    self.accept(TokenKind::Colon);
                    let stats = self.block_statements();
                    let stats = self.make_list(&stats);
                    cases.push(self.make(
                        Tree::Case {
                            pattern: None,
                            stats,
                        },
                        pos,
                    ));
                }
                TokenKind::RBrace | TokenKind::Eof => return cases,
                _ => {
                    self.report_syntax_error(
                        pos,
                        ErrorCode::E1001,
                        "'case', 'default', or '}' expected",
                    );
                }
            }
        }
    }

    /// Resource declarations: `Resource {; Resource} [;]`.
    fn resources(&mut self) -> Vec<NodeId> {
        self.accept(TokenKind::LParen);
        let mut items = vec![self.resource()];
        while self.kind() == TokenKind::Semi {
            self.next();
            if self.kind() == TokenKind::RParen {
                break;
            }
            items.push(self.resource());
        }
        self.accept(TokenKind::RParen);
        items
    }

    /// `Modifiers Type name = Expression`.
    fn resource(&mut self) -> NodeId {
        let mods = self.modifiers_opt(None);
        let ty = self.parse_type();
        let pos = self.pos();
        let name = self.ident();
        self.accept(TokenKind::Eq);
        let init = self.parse_expression();
        self.make(
            Tree::VarDecl {
                mods,
                name,
                var_type: Some(ty),
                init: Some(init),
            },
            pos,
        )
    }

    /// `Declarator {, Declarator}` sharing modifiers and base type.
    pub(crate) fn variable_declarators(
        &mut self,
        mods: NodeId,
        var_type: Option<NodeId>,
    ) -> Vec<NodeId> {
        let mut decls = vec![self.variable_declarator(mods, var_type)];
        while self.kind() == TokenKind::Comma {
            self.next();
            decls.push(self.variable_declarator(mods, var_type));
        }
        decls
    }

    /// `name BracketsOpt [= Initializer]`.
    fn variable_declarator(&mut self, mods: NodeId, var_type: Option<NodeId>) -> NodeId {
        let pos = self.pos();
        let name = self.ident();
        // trailing brackets on the declarator apply to the type
        let var_type = var_type.map(|t| self.brackets_opt(t));
        let init = if self.kind() == TokenKind::Eq {
            self.next();
            Some(self.variable_initializer())
        } else {
            None
        };
        self.make(
            Tree::VarDecl {
                mods,
                name,
                var_type,
                init,
            },
            pos,
        )
    }

    /// Rest of a declarator list whose first name is already consumed
    /// (field declarations).
    pub(crate) fn variable_declarators_rest(
        &mut self,
        mods: NodeId,
        var_type: NodeId,
        first_name: Name,
        first_pos: u32,
    ) -> Vec<NodeId> {
        let base_type = self.brackets_opt(var_type);
        let init = if self.kind() == TokenKind::Eq {
            self.next();
            Some(self.variable_initializer())
        } else {
            None
        };
        let first = self.make(
            Tree::VarDecl {
                mods,
                name: first_name,
                var_type: Some(base_type),
                init,
            },
            first_pos,
        );
        let mut decls = vec![first];
        while self.kind() == TokenKind::Comma {
            self.next();
            decls.push(self.variable_declarator(mods, Some(var_type)));
        }
        decls
    }
}
