//! Expression parsing.
//!
//! Four levels drive the grammar, mirroring their precedence structure:
//! assignment (`term`), conditional (`term1`), the binary-operator ladder
//! (`term2`, evaluated with one pooled operand/operator stack pair rather
//! than one recursive call per precedence level), and unary/cast/postfix/
//! primary (`term3`).
//!
//! `term3` consults [`Parser::analyze_parens`] at `(` to pick among cast,
//! lambda, and parenthesized expression, and
//! [`Parser::is_unbound_member_ref`] at `Ident <` to tell a generic-type
//! method reference from a comparison.

use javelin_diagnostic::ErrorCode;
use javelin_ir::{
    BinaryOp, ClassTag, Literal, Name, NodeId, NodeList, PrimitiveType, RefMode, Tree, TokenKind,
    UnaryOp,
};

use crate::stack::ensure_sufficient_stack;
use crate::{Feature, Mode, ParensResult, Parser, TreeFactory};

/// Lowest binary precedence handled by the ladder (`||`).
const OR_PREC: i32 = 4;

/// Binary precedence, `-1` for non-operators.
fn op_prec(kind: TokenKind) -> i32 {
    match kind {
        TokenKind::BarBar => 4,
        TokenKind::AmpAmp => 5,
        TokenKind::Bar => 6,
        TokenKind::Caret => 7,
        TokenKind::Amp => 8,
        TokenKind::EqEq | TokenKind::BangEq => 9,
        TokenKind::Lt
        | TokenKind::Gt
        | TokenKind::LtEq
        | TokenKind::GtEq
        | TokenKind::InstanceOf => 10,
        TokenKind::LtLt | TokenKind::GtGt | TokenKind::GtGtGt => 11,
        TokenKind::Plus | TokenKind::Sub => 12,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 13,
        _ => -1,
    }
}

fn binary_op(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::BarBar => BinaryOp::Or,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::Bar => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::GtEq => BinaryOp::Ge,
        TokenKind::LtLt => BinaryOp::Shl,
        TokenKind::GtGt => BinaryOp::Shr,
        TokenKind::GtGtGt => BinaryOp::Ushr,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Sub => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        other => {
            debug_assert!(false, "not a binary operator: {other:?}");
            BinaryOp::Add
        }
    }
}

/// Compound-assignment operators to their arithmetic op.
fn compound_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::PlusEq => BinaryOp::Add,
        TokenKind::SubEq => BinaryOp::Sub,
        TokenKind::StarEq => BinaryOp::Mul,
        TokenKind::SlashEq => BinaryOp::Div,
        TokenKind::PercentEq => BinaryOp::Rem,
        TokenKind::AmpEq => BinaryOp::BitAnd,
        TokenKind::BarEq => BinaryOp::BitOr,
        TokenKind::CaretEq => BinaryOp::BitXor,
        TokenKind::LtLtEq => BinaryOp::Shl,
        TokenKind::GtGtEq => BinaryOp::Shr,
        TokenKind::GtGtGtEq => BinaryOp::Ushr,
        _ => return None,
    })
}

impl<F: TreeFactory> Parser<'_, '_, F> {
    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> NodeId {
        self.term(Mode::EXPR)
    }

    /// Parse a term under `mode`, restoring the surrounding mode after.
    pub(crate) fn term(&mut self, mode: Mode) -> NodeId {
        self.with_mode(mode, Self::term_assign)
    }

    /// Assignment level: `Expr3 [(= | op=) AssignExpr]`, right-associative.
    pub(crate) fn term_assign(&mut self) -> NodeId {
        let t = self.term1();
        if !self.mode.contains(Mode::EXPR) {
            return t;
        }
        if self.kind() == TokenKind::Eq {
            let pos = self.pos();
            self.mode = Mode::EXPR;
            self.next();
            let value = self.term_assign();
            return self.make(Tree::Assign { target: t, value }, pos);
        }
        if let Some(op) = compound_op(self.kind()) {
            let pos = self.pos();
            self.mode = Mode::EXPR;
            self.next();
            let value = self.term_assign();
            return self.make(Tree::CompoundAssign { op, target: t, value }, pos);
        }
        t
    }

    /// Conditional level: `Expr2 [? Expr : Expr1]`.
    fn term1(&mut self) -> NodeId {
        let t = self.term2();
        if self.mode.contains(Mode::EXPR) && self.kind() == TokenKind::Ques {
            let pos = self.pos();
            self.mode = Mode::EXPR;
            self.next();
            let then_expr = self.term_assign();
            self.accept(TokenKind::Colon);
            let else_expr = self.term1();
            return self.make(
                Tree::Conditional {
                    cond: t,
                    then_expr,
                    else_expr,
                },
                pos,
            );
        }
        t
    }

    /// Binary-operator level, entered when the next token binds at `||`
    /// precedence or tighter.
    fn term2(&mut self) -> NodeId {
        let t = self.term3();
        if self.mode.contains(Mode::EXPR) && op_prec(self.kind()) >= OR_PREC {
            self.mode = Mode::EXPR;
            return self.term2_rest(t);
        }
        t
    }

    /// The operator-precedence ladder, evaluated with explicit stacks.
    ///
    /// The operand/operator stacks are owned by the parser and shared by
    /// every (possibly nested) ladder activation; each activation works
    /// above the stack watermark it entered with.
    fn term2_rest(&mut self, first: NodeId) -> NodeId {
        let od_base = self.od_stack.len();
        let op_base = self.op_stack.len();
        self.od_stack.push(first);
        // sentinel below every real operator of this activation
        let mut top_op: (TokenKind, u32) = (TokenKind::Error, 0);

        while op_prec(self.kind()) >= OR_PREC {
            self.op_stack.push(top_op);
            top_op = (self.kind(), self.pos());
            self.next();
            let rhs = if top_op.0 == TokenKind::InstanceOf {
                self.parse_type()
            } else {
                self.term3()
            };
            self.od_stack.push(rhs);
            while self.od_stack.len() > od_base + 1 && op_prec(top_op.0) >= op_prec(self.kind()) {
                let rhs = self.pop_operand();
                let lhs = self.pop_operand();
                let joined = self.make_op(top_op.1, top_op.0, lhs, rhs);
                self.od_stack.push(joined);
                top_op = self.op_stack.pop().unwrap_or((TokenKind::Error, 0));
            }
        }

        let t = self.pop_operand();
        debug_assert_eq!(self.od_stack.len(), od_base);
        debug_assert_eq!(self.op_stack.len(), op_base);
        self.od_stack.truncate(od_base);
        self.op_stack.truncate(op_base);
        t
    }

    fn pop_operand(&mut self) -> NodeId {
        match self.od_stack.pop() {
            Some(id) => id,
            None => {
                debug_assert!(false, "operand stack underflow");
                let pos = self.pos();
                self.make(Tree::Erroneous { parts: NodeList::EMPTY }, pos)
            }
        }
    }

    /// Build one binary node, folding adjacent string-literal
    /// concatenations into a single literal when enabled.
    fn make_op(&mut self, pos: u32, op_kind: TokenKind, lhs: NodeId, rhs: NodeId) -> NodeId {
        if op_kind == TokenKind::InstanceOf {
            return self.make(
                Tree::InstanceOf {
                    expr: lhs,
                    tested_type: rhs,
                },
                pos,
            );
        }
        if op_kind == TokenKind::Plus && self.fold_strings() {
            let folded = match (self.node_kind(lhs), self.node_kind(rhs)) {
                (
                    Tree::Literal(Literal::String(left)),
                    Tree::Literal(Literal::String(right)),
                ) => Some(format!("{left}{right}")),
                _ => None,
            };
            if let Some(text) = folded {
                let lhs_pos = self.node_pos(lhs);
                return self.make(Tree::Literal(Literal::String(text.into())), lhs_pos);
            }
        }
        let op = binary_op(op_kind);
        self.make(Tree::Binary { op, lhs, rhs }, pos)
    }

    /// Unary / cast / primary level plus postfix suffixes.
    pub(crate) fn term3(&mut self) -> NodeId {
        ensure_sufficient_stack(|| self.term3_inner())
    }

    fn term3_inner(&mut self) -> NodeId {
        let pos = self.pos();
        // explicit type arguments before this/super/new/ident: <T>m()
        let type_args = if self.kind() == TokenKind::Lt
            && self.mode.contains(Mode::EXPR)
            && !self.mode.contains(Mode::NO_PARAMS)
        {
            self.check_feature(Feature::Generics, pos);
            self.mode = Mode::EXPR;
            self.type_arguments(false)
        } else {
            NodeList::EMPTY
        };

        match self.kind() {
            TokenKind::Ques => {
                if self.mode.contains(Mode::TYPE)
                    && self.mode.contains(Mode::TYPE_ARG)
                    && !self.mode.contains(Mode::NO_PARAMS)
                {
                    return self.type_argument();
                }
                self.illegal()
            }
            TokenKind::PlusPlus
            | TokenKind::SubSub
            | TokenKind::Plus
            | TokenKind::Sub
            | TokenKind::Bang
            | TokenKind::Tilde => {
                if !type_args.is_empty() || !self.mode.contains(Mode::EXPR) {
                    return self.illegal();
                }
                let op_kind = self.kind();
                self.mode = Mode::EXPR;
                self.next();
                if op_kind == TokenKind::Sub
                    && matches!(
                        self.kind(),
                        TokenKind::IntLiteral | TokenKind::LongLiteral
                    )
                    && self.token().radix() == Some(10)
                {
                    // a negated decimal literal folds into the literal
                    let t = self.literal(true, pos);
                    self.term3_suffixes_and_postfix(t)
                } else {
                    let operand = self.term3();
                    let op = match op_kind {
                        TokenKind::PlusPlus => UnaryOp::PreInc,
                        TokenKind::SubSub => UnaryOp::PreDec,
                        TokenKind::Plus => UnaryOp::Pos,
                        TokenKind::Sub => UnaryOp::Neg,
                        TokenKind::Bang => UnaryOp::Not,
                        _ => UnaryOp::BitNot,
                    };
                    self.make(Tree::Unary { op, operand }, pos)
                }
            }
            TokenKind::LParen => {
                if !type_args.is_empty() || !self.mode.contains(Mode::EXPR) {
                    return self.illegal();
                }
                match self.analyze_parens() {
                    ParensResult::Cast => {
                        self.accept(TokenKind::LParen);
                        self.mode = Mode::TYPE;
                        let cast_type = self.cast_type(pos);
                        self.accept(TokenKind::RParen);
                        self.mode = Mode::EXPR;
                        let expr = self.term3();
                        self.make(Tree::TypeCast { cast_type, expr }, pos)
                    }
                    result @ (ParensResult::ExplicitLambda | ParensResult::ImplicitLambda) => {
                        self.lambda_expression(true, result == ParensResult::ExplicitLambda, pos)
                    }
                    ParensResult::Parens => {
                        self.accept(TokenKind::LParen);
                        self.mode = Mode::EXPR;
                        let expr = self.term_assign();
                        self.accept(TokenKind::RParen);
                        let t = self.make(Tree::Paren { expr }, pos);
                        self.term3_suffixes_and_postfix(t)
                    }
                }
            }
            TokenKind::This => {
                if !self.mode.contains(Mode::EXPR) {
                    return self.illegal();
                }
                self.mode = Mode::EXPR;
                let name = self.intern("this");
                self.next();
                let t = self.make(Tree::Ident { name }, pos);
                let t = if type_args.is_empty() {
                    self.arguments_opt(t)
                } else {
                    self.arguments_with(type_args, t)
                };
                self.term3_suffixes_and_postfix(t)
            }
            TokenKind::Super => {
                if !self.mode.contains(Mode::EXPR) {
                    return self.illegal();
                }
                self.mode = Mode::EXPR;
                let name = self.intern("super");
                self.next();
                let t = self.make(Tree::Ident { name }, pos);
                let t = self.super_suffix(type_args, t);
                self.term3_suffixes_and_postfix(t)
            }
            TokenKind::IntLiteral
            | TokenKind::LongLiteral
            | TokenKind::FloatLiteral
            | TokenKind::DoubleLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => {
                if !type_args.is_empty() || !self.mode.contains(Mode::EXPR) {
                    return self.illegal();
                }
                self.mode = Mode::EXPR;
                let t = self.literal(false, pos);
                self.term3_suffixes_and_postfix(t)
            }
            TokenKind::New => {
                if !type_args.is_empty() || !self.mode.contains(Mode::EXPR) {
                    return self.illegal();
                }
                self.mode = Mode::EXPR;
                self.next();
                let ctor_type_args = if self.kind() == TokenKind::Lt {
                    self.check_feature(Feature::Generics, self.pos());
                    self.type_arguments(false)
                } else {
                    NodeList::EMPTY
                };
                let t = self.creator(pos, ctor_type_args);
                self.term3_suffixes_and_postfix(t)
            }
            TokenKind::Underscore
            | TokenKind::Identifier
            | TokenKind::Assert
            | TokenKind::Enum => {
                // a bare parameter followed by an arrow is a lambda
                if self.mode.contains(Mode::EXPR)
                    && type_args.is_empty()
                    && self.peek_kind(1) == TokenKind::Arrow
                {
                    return self.lambda_expression(false, false, pos);
                }
                let name = self.ident();
                let t = self.make(Tree::Ident { name }, pos);
                let t = if !type_args.is_empty() {
                    self.arguments_with(type_args, t)
                } else {
                    t
                };
                self.term3_suffixes_and_postfix(t)
            }
            TokenKind::Byte
            | TokenKind::Short
            | TokenKind::Char
            | TokenKind::Int
            | TokenKind::Long
            | TokenKind::Float
            | TokenKind::Double
            | TokenKind::Boolean => {
                if !type_args.is_empty() {
                    return self.illegal();
                }
                let t = self.basic_type();
                let t = self.brackets_opt(t);
                let t = self.brackets_suffix(t);
                self.term3_suffixes_and_postfix(t)
            }
            TokenKind::Void => {
                if !type_args.is_empty() || !self.mode.contains(Mode::EXPR) {
                    return self.illegal();
                }
                if self.peek_kind(1) == TokenKind::Dot {
                    let t = self.make(
                        Tree::PrimitiveTypeTree {
                            prim: PrimitiveType::Void,
                        },
                        pos,
                    );
                    self.next();
                    self.term3_suffixes_and_postfix(t)
                } else {
                    self.illegal()
                }
            }
            _ => self.illegal(),
        }
    }

    /// Postfix suffixes (selection, indexing, invocation, references,
    /// generic application) followed by postfix `++`/`--`.
    fn term3_suffixes_and_postfix(&mut self, t: NodeId) -> NodeId {
        let mut t = self.term3_suffixes(t);
        while matches!(self.kind(), TokenKind::PlusPlus | TokenKind::SubSub)
            && self.mode.contains(Mode::EXPR)
        {
            self.mode = Mode::EXPR;
            let pos = self.pos();
            let op = if self.kind() == TokenKind::PlusPlus {
                UnaryOp::PostInc
            } else {
                UnaryOp::PostDec
            };
            self.next();
            t = self.make(Tree::Unary { op, operand: t }, pos);
        }
        t
    }

    fn term3_suffixes(&mut self, mut t: NodeId) -> NodeId {
        loop {
            match self.kind() {
                TokenKind::LBracket => {
                    let pos = self.pos();
                    if self.peek_kind(1) == TokenKind::RBracket {
                        // array-type brackets
                        self.next();
                        self.next();
                        t = self.make(Tree::ArrayType { elem: t }, pos);
                        t = self.brackets_opt(t);
                        t = self.brackets_suffix(t);
                        if self.mode.contains(Mode::TYPE) {
                            self.mode = Mode::TYPE;
                        }
                    } else if self.mode.contains(Mode::EXPR) {
                        self.mode = Mode::EXPR;
                        self.next();
                        let index = self.term(Mode::EXPR);
                        self.accept(TokenKind::RBracket);
                        t = self.make(Tree::ArrayAccess { array: t, index }, pos);
                    } else {
                        break;
                    }
                }
                TokenKind::Dot => {
                    let pos = self.pos();
                    self.next();
                    match self.kind() {
                        TokenKind::Class => {
                            self.mode = Mode::EXPR;
                            self.next();
                            let name = self.intern("class");
                            t = self.make(Tree::Select { target: t, name }, pos);
                        }
                        TokenKind::This if self.mode.contains(Mode::EXPR) => {
                            self.mode = Mode::EXPR;
                            self.next();
                            let name = self.intern("this");
                            t = self.make(Tree::Select { target: t, name }, pos);
                        }
                        TokenKind::Super if self.mode.contains(Mode::EXPR) => {
                            self.mode = Mode::EXPR;
                            self.next();
                            let name = self.intern("super");
                            t = self.make(Tree::Select { target: t, name }, pos);
                        }
                        TokenKind::New if self.mode.contains(Mode::EXPR) => {
                            self.mode = Mode::EXPR;
                            let new_pos = self.pos();
                            self.next();
                            let type_args = if self.kind() == TokenKind::Lt {
                                self.check_feature(Feature::Generics, self.pos());
                                self.type_arguments(false)
                            } else {
                                NodeList::EMPTY
                            };
                            t = self.inner_creator(new_pos, type_args, t);
                        }
                        TokenKind::Lt if self.mode.contains(Mode::EXPR) => {
                            // explicit generic method invocation: e.<T>m()
                            self.check_feature(Feature::Generics, self.pos());
                            let type_args = self.type_arguments(false);
                            let name = self.ident();
                            let sel = self.make(Tree::Select { target: t, name }, pos);
                            t = self.arguments_with(type_args, sel);
                        }
                        _ => {
                            let name = self.ident();
                            t = self.make(Tree::Select { target: t, name }, pos);
                        }
                    }
                }
                TokenKind::LParen if self.mode.contains(Mode::EXPR) => {
                    self.mode = Mode::EXPR;
                    t = self.arguments_with(NodeList::EMPTY, t);
                }
                TokenKind::ColCol if self.mode.contains(Mode::EXPR) => {
                    self.mode = Mode::EXPR;
                    let pos = self.pos();
                    self.check_feature(Feature::MethodReferences, pos);
                    self.next();
                    t = self.member_reference_rest(pos, t);
                }
                TokenKind::Lt => {
                    if self.mode.contains(Mode::TYPE) && !self.mode.contains(Mode::NO_PARAMS) {
                        // committed to a type from here on
                        self.mode = Mode::TYPE;
                        self.check_feature(Feature::Generics, self.pos());
                        t = self.type_arguments_apply(t, false);
                    } else if !self.mode.contains(Mode::TYPE) && self.is_unbound_member_ref() {
                        // a generic type qualifying an unbound method
                        // reference, e.g. `A<S>::m`; parse the qualifier as
                        // a type, then a `::` must follow
                        self.check_feature(Feature::Generics, self.pos());
                        self.mode = Mode::TYPE;
                        t = self.type_arguments_apply(t, false);
                        while self.kind() == TokenKind::Dot {
                            let pos = self.pos();
                            self.next();
                            let name = self.ident();
                            t = self.make(Tree::Select { target: t, name }, pos);
                        }
                        t = self.brackets_opt(t);
                        if self.kind() != TokenKind::ColCol {
                            let pos = self.pos();
                            t = self.syntax_error(pos, &[t], ErrorCode::E1001, "'::' expected");
                        }
                        self.mode = Mode::EXPR;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        t
    }

    // ── Invocation helpers ──────────────────────────────────────────────

    /// `( [Expression {, Expression}] )`.
    pub(crate) fn arguments(&mut self) -> NodeList {
        let mut items = Vec::new();
        self.accept(TokenKind::LParen);
        if self.kind() != TokenKind::RParen && self.kind() != TokenKind::Eof {
            loop {
                items.push(self.term(Mode::EXPR));
                if self.kind() != TokenKind::Comma {
                    break;
                }
                self.next();
            }
        }
        self.accept(TokenKind::RParen);
        self.make_list(&items)
    }

    /// Wrap `callee` in an invocation when an argument list follows.
    pub(crate) fn arguments_opt(&mut self, callee: NodeId) -> NodeId {
        if self.mode.contains(Mode::EXPR) && self.kind() == TokenKind::LParen {
            self.arguments_with(NodeList::EMPTY, callee)
        } else {
            callee
        }
    }

    /// Invocation with explicit type arguments.
    pub(crate) fn arguments_with(&mut self, type_args: NodeList, callee: NodeId) -> NodeId {
        let pos = self.pos();
        if self.kind() == TokenKind::LParen {
            let args = self.arguments();
            self.make(
                Tree::MethodCall {
                    type_args,
                    callee,
                    args,
                },
                pos,
            )
        } else if !type_args.is_empty() {
            self.syntax_error(pos, &[callee], ErrorCode::E1001, "'(' expected")
        } else {
            callee
        }
    }

    /// What may follow `super`: a constructor call, a member selection
    /// with optional invocation, or a method reference.
    fn super_suffix(&mut self, type_args: NodeList, t: NodeId) -> NodeId {
        if self.kind() == TokenKind::LParen || !type_args.is_empty() {
            self.arguments_with(type_args, t)
        } else if self.kind() == TokenKind::ColCol {
            let pos = self.pos();
            self.check_feature(Feature::MethodReferences, pos);
            self.next();
            self.member_reference_rest(pos, t)
        } else {
            let pos = self.pos();
            self.accept(TokenKind::Dot);
            let sel_type_args = if self.kind() == TokenKind::Lt {
                self.check_feature(Feature::Generics, self.pos());
                self.type_arguments(false)
            } else {
                NodeList::EMPTY
            };
            let name = self.ident();
            let sel = self.make(Tree::Select { target: t, name }, pos);
            if self.kind() == TokenKind::LParen || !sel_type_args.is_empty() {
                self.arguments_with(sel_type_args, sel)
            } else {
                sel
            }
        }
    }

    /// After `::`: optional type arguments, then a method name or `new`.
    fn member_reference_rest(&mut self, pos: u32, target: NodeId) -> NodeId {
        let type_args = if self.kind() == TokenKind::Lt {
            self.check_feature(Feature::Generics, self.pos());
            self.type_arguments(false)
        } else {
            NodeList::EMPTY
        };
        let (mode, name) = if self.kind() == TokenKind::New {
            self.next();
            (RefMode::New, self.intern("new"))
        } else {
            (RefMode::Invoke, self.ident())
        };
        self.make(
            Tree::MemberRef {
                mode,
                name,
                target,
                type_args,
            },
            pos,
        )
    }

    // ── Lambdas ─────────────────────────────────────────────────────────

    /// Lambda expression: parenthesized (typed or inferred) parameter list
    /// or a bare parameter, `->`, then an expression or block body.
    pub(crate) fn lambda_expression(
        &mut self,
        has_parens: bool,
        explicit: bool,
        pos: u32,
    ) -> NodeId {
        self.check_feature(Feature::Lambdas, pos);
        let mut params = Vec::new();
        if has_parens {
            self.accept(TokenKind::LParen);
            if self.kind() != TokenKind::RParen {
                loop {
                    if explicit {
                        params.push(self.formal_parameter(true));
                    } else {
                        params.push(self.implicit_lambda_parameter());
                    }
                    if self.kind() != TokenKind::Comma {
                        break;
                    }
                    self.next();
                }
            }
            self.accept(TokenKind::RParen);
        } else {
            params.push(self.implicit_lambda_parameter());
        }
        self.accept(TokenKind::Arrow);
        self.mode = Mode::EXPR;
        let body = if self.kind() == TokenKind::LBrace {
            self.block()
        } else {
            self.term(Mode::EXPR)
        };
        let params = self.make_list(&params);
        self.make(
            Tree::Lambda {
                params,
                body,
                explicit_params: explicit,
            },
            pos,
        )
    }

    fn implicit_lambda_parameter(&mut self) -> NodeId {
        let pos = self.pos();
        let name = self.ident();
        let mods = self.empty_modifiers(pos);
        self.make(
            Tree::VarDecl {
                mods,
                name,
                var_type: None,
                init: None,
            },
            pos,
        )
    }

    // ── Creators (`new`) ────────────────────────────────────────────────

    /// After `new` (and optional constructor type arguments).
    fn creator(&mut self, new_pos: u32, ctor_type_args: NodeList) -> NodeId {
        if self.kind().is_primitive_type() && ctor_type_args.is_empty() {
            let elem = self.basic_type();
            return self.array_creator_rest(new_pos, elem);
        }

        // class type, possibly generic at each segment
        let t = self.with_mode(Mode::TYPE, |p| {
            let pos = p.pos();
            let name = p.ident();
            let mut t = p.make(Tree::Ident { name }, pos);
            if p.kind() == TokenKind::Lt {
                p.check_feature(Feature::Generics, p.pos());
                t = p.type_arguments_apply(t, true);
            }
            while p.kind() == TokenKind::Dot {
                let pos = p.pos();
                p.next();
                let name = p.ident();
                t = p.make(Tree::Select { target: t, name }, pos);
                if p.kind() == TokenKind::Lt {
                    p.check_feature(Feature::Generics, p.pos());
                    t = p.type_arguments_apply(t, true);
                }
            }
            t
        });

        match self.kind() {
            TokenKind::LBracket => {
                if !ctor_type_args.is_empty() {
                    let pos = self.pos();
                    self.report_syntax_error(
                        pos,
                        ErrorCode::E1010,
                        "cannot create an array with type arguments",
                    );
                }
                self.array_creator_rest(new_pos, t)
            }
            TokenKind::LParen => self.class_creator_rest(new_pos, None, ctor_type_args, t),
            _ => {
                let pos = self.pos();
                self.syntax_error(
                    pos,
                    &[t],
                    ErrorCode::E1001,
                    "'(' or '[' expected",
                )
            }
        }
    }

    /// Qualified creator: `expr.new Inner<...>(...)`.
    fn inner_creator(&mut self, new_pos: u32, ctor_type_args: NodeList, enclosing: NodeId) -> NodeId {
        let pos = self.pos();
        let name = self.ident();
        let mut t = self.make(Tree::Ident { name }, pos);
        if self.kind() == TokenKind::Lt {
            self.check_feature(Feature::Generics, self.pos());
            t = self.with_mode(Mode::TYPE, |p| p.type_arguments_apply(t, true));
        }
        self.class_creator_rest(new_pos, Some(enclosing), ctor_type_args, t)
    }

    /// `[ ] ... Initializer` or `[Expr] {[Expr]} {[ ]}`.
    fn array_creator_rest(&mut self, new_pos: u32, elem: NodeId) -> NodeId {
        self.accept(TokenKind::LBracket);
        if self.kind() == TokenKind::RBracket {
            self.next();
            let elem = self.brackets_opt(elem);
            if self.kind() == TokenKind::LBrace {
                let initializers = self.array_initializer_elements();
                self.make(
                    Tree::NewArray {
                        elem_type: Some(elem),
                        dims: NodeList::EMPTY,
                        initializers: Some(initializers),
                    },
                    new_pos,
                )
            } else {
                let pos = self.pos();
                self.syntax_error(
                    pos,
                    &[elem],
                    ErrorCode::E1010,
                    "array dimension missing",
                )
            }
        } else {
            let mut dims = vec![self.term(Mode::EXPR)];
            self.accept(TokenKind::RBracket);
            let mut elem = elem;
            while self.kind() == TokenKind::LBracket {
                let pos = self.pos();
                self.next();
                if self.kind() == TokenKind::RBracket {
                    self.next();
                    elem = self.make(Tree::ArrayType { elem }, pos);
                } else {
                    dims.push(self.term(Mode::EXPR));
                    self.accept(TokenKind::RBracket);
                }
            }
            let dims = self.make_list(&dims);
            self.make(
                Tree::NewArray {
                    elem_type: Some(elem),
                    dims,
                    initializers: None,
                },
                new_pos,
            )
        }
    }

    /// `( Arguments ) [ClassBody]`.
    fn class_creator_rest(
        &mut self,
        new_pos: u32,
        enclosing: Option<NodeId>,
        type_args: NodeList,
        class_type: NodeId,
    ) -> NodeId {
        let args = self.arguments();
        let class_body = if self.kind() == TokenKind::LBrace {
            // anonymous class body
            let body_pos = self.pos();
            let mods = self.empty_modifiers(body_pos);
            let members = self.class_or_interface_body(false);
            Some(self.make(
                Tree::ClassDecl {
                    tag: ClassTag::Class,
                    mods,
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
        self.make(
            Tree::NewClass {
                enclosing,
                type_args,
                class_type,
                args,
                class_body,
            },
            new_pos,
        )
    }

    /// `{ [Initializer {, Initializer}] [,] }` as a `NewArray` without an
    /// element type.
    pub(crate) fn array_initializer(&mut self, pos: u32) -> NodeId {
        let initializers = self.array_initializer_elements();
        self.make(
            Tree::NewArray {
                elem_type: None,
                dims: NodeList::EMPTY,
                initializers: Some(initializers),
            },
            pos,
        )
    }

    fn array_initializer_elements(&mut self) -> NodeList {
        self.accept(TokenKind::LBrace);
        let mut items = Vec::new();
        if self.kind() == TokenKind::Comma {
            self.next();
        } else if self.kind() != TokenKind::RBrace {
            loop {
                items.push(self.variable_initializer());
                if self.kind() != TokenKind::Comma {
                    break;
                }
                self.next();
                if self.kind() == TokenKind::RBrace {
                    // trailing comma
                    break;
                }
            }
        }
        self.accept(TokenKind::RBrace);
        self.make_list(&items)
    }

    /// Array initializer or expression.
    pub(crate) fn variable_initializer(&mut self) -> NodeId {
        if self.kind() == TokenKind::LBrace {
            let pos = self.pos();
            self.array_initializer(pos)
        } else {
            self.term(Mode::EXPR)
        }
    }

    // ── Literals ────────────────────────────────────────────────────────

    /// Convert the current literal token into a literal node.
    pub(crate) fn literal(&mut self, negated: bool, pos: u32) -> NodeId {
        let kind = self.kind();
        let value = match kind {
            TokenKind::IntLiteral => {
                let text = self.token().numeric_text().unwrap_or("").to_owned();
                let radix = u32::from(self.token().radix().unwrap_or(10));
                match convert_int(&text, radix, negated) {
                    Some(v) => Literal::Int(v),
                    None => {
                        self.report_syntax_error(
                            pos,
                            ErrorCode::E1012,
                            format!("integer number too large: {text}"),
                        );
                        Literal::Int(0)
                    }
                }
            }
            TokenKind::LongLiteral => {
                let text = self.token().numeric_text().unwrap_or("").to_owned();
                let radix = u32::from(self.token().radix().unwrap_or(10));
                match convert_long(&text, radix, negated) {
                    Some(v) => Literal::Long(v),
                    None => {
                        self.report_syntax_error(
                            pos,
                            ErrorCode::E1012,
                            format!("long number too large: {text}"),
                        );
                        Literal::Long(0)
                    }
                }
            }
            TokenKind::FloatLiteral | TokenKind::DoubleLiteral => {
                let text = self.token().numeric_text().unwrap_or("").to_owned();
                let radix = u32::from(self.token().radix().unwrap_or(10));
                let value = convert_float(&text, radix).unwrap_or_else(|| {
                    self.report_syntax_error(
                        pos,
                        ErrorCode::E1012,
                        format!("malformed floating-point literal: {text}"),
                    );
                    0.0
                });
                let value = if negated { -value } else { value };
                if kind == TokenKind::FloatLiteral {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "float literals narrow to f32 by definition"
                    )]
                    {
                        Literal::Float(value as f32)
                    }
                } else {
                    Literal::Double(value)
                }
            }
            TokenKind::CharLiteral => {
                let c = self
                    .token()
                    .numeric_text()
                    .and_then(|t| t.chars().next())
                    .unwrap_or('\0');
                Literal::Char(c)
            }
            TokenKind::StringLiteral => {
                let text = self.token().string_value().unwrap_or("").to_owned();
                Literal::String(text.into())
            }
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Null => Literal::Null,
            _ => {
                // an ERROR token from the lexer; the diagnostic is already
                // out, leave a placeholder literal
                Literal::Int(0)
            }
        };
        self.next();
        self.make(Tree::Literal(value), pos)
    }
}

/// Decimal negation folds into the literal so `-2147483648` is legal.
fn convert_int(text: &str, radix: u32, negated: bool) -> Option<i64> {
    let value = u64::from_str_radix(text, radix).ok()?;
    if radix == 10 {
        let max = if negated { 1u64 << 31 } else { (1u64 << 31) - 1 };
        if value > max {
            return None;
        }
        #[allow(
            clippy::cast_possible_wrap,
            reason = "bounded by the checks above"
        )]
        Some(if negated { -(value as i64) } else { value as i64 })
    } else {
        // non-decimal literals cover the full unsigned range and wrap
        if value > u64::from(u32::MAX) {
            return None;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_possible_wrap,
            reason = "intentional two's-complement reinterpretation"
        )]
        Some(i64::from(value as u32 as i32))
    }
}

fn convert_long(text: &str, radix: u32, negated: bool) -> Option<i64> {
    let value = u128::from_str_radix(text, radix).ok()?;
    if radix == 10 {
        let max = if negated { 1u128 << 63 } else { (1u128 << 63) - 1 };
        if value > max {
            return None;
        }
        #[allow(
            clippy::cast_possible_wrap,
            clippy::cast_possible_truncation,
            reason = "bounded by the checks above"
        )]
        Some(if negated {
            (value as i128).wrapping_neg() as i64
        } else {
            value as i64
        })
    } else {
        if value > u128::from(u64::MAX) {
            return None;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_possible_wrap,
            reason = "intentional two's-complement reinterpretation"
        )]
        Some(value as u64 as i64)
    }
}

/// Decimal or hexadecimal (binary-exponent) floating literal text, with
/// any `f`/`d` suffix still attached.
fn convert_float(text: &str, radix: u32) -> Option<f64> {
    let trimmed = text.trim_end_matches(['f', 'F', 'd', 'D']);
    if radix == 16 {
        parse_hex_float(trimmed)
    } else {
        trimmed.parse::<f64>().ok()
    }
}

/// `HexDigits [. HexDigits] p[+|-]Digits` -- value is mantissa times a
/// power of two.
fn parse_hex_float(text: &str) -> Option<f64> {
    let (mantissa, exponent) = text.split_once(['p', 'P'])?;
    let exponent: i32 = exponent.parse().ok()?;
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let mut value = 0.0f64;
    for c in int_part.chars() {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for c in frac_part.chars() {
        value += f64::from(c.to_digit(16)?) * scale;
        scale /= 16.0;
    }
    Some(value * 2.0f64.powi(exponent))
}
