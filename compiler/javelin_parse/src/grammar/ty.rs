//! Type-specific productions: primitive types, array brackets, type
//! arguments (with wildcards, diamond, and the compound-operator split),
//! and declaration type parameters.
//!
//! Ordinary type *expressions* (`List<String>`, `a.b.C[]`) flow through
//! the shared term machinery in `expr` under `Mode::TYPE`.

use javelin_diagnostic::ErrorCode;
use javelin_ir::{
    ModifierFlags, NodeId, NodeList, PrimitiveType, Tree, TokenKind, WildcardKind,
};

use crate::{Feature, Mode, Parser, TreeFactory};

impl<F: TreeFactory> Parser<'_, '_, F> {
    /// Parse a type.
    pub(crate) fn parse_type(&mut self) -> NodeId {
        self.term(Mode::TYPE)
    }

    /// One primitive type keyword.
    pub(crate) fn basic_type(&mut self) -> NodeId {
        let pos = self.pos();
        let prim = match self.kind() {
            TokenKind::Byte => PrimitiveType::Byte,
            TokenKind::Short => PrimitiveType::Short,
            TokenKind::Char => PrimitiveType::Char,
            TokenKind::Int => PrimitiveType::Int,
            TokenKind::Long => PrimitiveType::Long,
            TokenKind::Float => PrimitiveType::Float,
            TokenKind::Double => PrimitiveType::Double,
            TokenKind::Boolean => PrimitiveType::Boolean,
            _ => {
                debug_assert!(false, "basic_type at {:?}", self.kind());
                PrimitiveType::Int
            }
        };
        self.next();
        self.make(Tree::PrimitiveTypeTree { prim }, pos)
    }

    /// Zero or more `[]` pairs wrapping `t` in array types.
    pub(crate) fn brackets_opt(&mut self, mut t: NodeId) -> NodeId {
        while self.kind() == TokenKind::LBracket && self.peek_kind(1) == TokenKind::RBracket {
            let pos = self.pos();
            self.next();
            self.next();
            t = self.make(Tree::ArrayType { elem: t }, pos);
        }
        t
    }

    /// In a pure expression context, a type followed by brackets must be a
    /// class literal: verify `.class` follows.
    pub(crate) fn brackets_suffix(&mut self, t: NodeId) -> NodeId {
        if self.mode.contains(Mode::EXPR) && !self.mode.contains(Mode::TYPE) {
            let is_class_literal =
                self.kind() == TokenKind::Dot && self.peek_kind(1) == TokenKind::Class;
            if !is_class_literal {
                let pos = self.pos();
                self.report_syntax_error(pos, ErrorCode::E1007, "'.class' expected");
            }
        } else if self.mode.contains(Mode::TYPE) {
            self.mode = Mode::TYPE;
        }
        t
    }

    /// Angle-bracketed type arguments applied to `t` as a generic type.
    pub(crate) fn type_arguments_apply(&mut self, t: NodeId, diamond_allowed: bool) -> NodeId {
        let pos = self.pos();
        let args = self.type_arguments(diamond_allowed);
        self.make(Tree::TypeApply { base: t, args }, pos)
    }

    /// `< [TypeArgument {, TypeArgument}] >`.
    ///
    /// The closing bracket may arrive glued into a longer operator
    /// (`>>`, `>>>`, `>=`, ...) when type-argument lists nest; the scanner
    /// splits the compound token so the outer list sees its own `>`.
    pub(crate) fn type_arguments(&mut self, diamond_allowed: bool) -> NodeList {
        debug_assert_eq!(self.kind(), TokenKind::Lt);
        let open_pos = self.pos();
        self.next();
        if diamond_allowed && self.kind() == TokenKind::Gt {
            self.check_feature(Feature::Diamond, open_pos);
            self.mode |= Mode::DIAMOND;
            self.next();
            return NodeList::EMPTY;
        }

        let mut args = Vec::new();
        loop {
            let arg = if self.mode.contains(Mode::EXPR) {
                self.parse_type()
            } else {
                self.type_argument()
            };
            args.push(arg);
            if self.kind() != TokenKind::Comma {
                break;
            }
            self.next();
        }
        match self.kind() {
            TokenKind::GtGtGtEq
            | TokenKind::GtGtEq
            | TokenKind::GtEq
            | TokenKind::GtGtGt
            | TokenKind::GtGt => self.split_token(),
            TokenKind::Gt => self.next(),
            _ => {
                let report_at = self.prev_end();
                self.report_syntax_error(report_at, ErrorCode::E1001, "'>' expected");
            }
        }
        self.make_list(&args)
    }

    /// One type argument: a possibly-annotated type, or a wildcard with an
    /// optional bound.
    pub(crate) fn type_argument(&mut self) -> NodeId {
        let pos = self.pos();
        let annotations = self.type_annotations_opt();
        let arg = self.type_argument_rest();
        if annotations.is_empty() {
            arg
        } else {
            self.make(
                Tree::AnnotatedType {
                    annotations,
                    underlying: arg,
                },
                pos,
            )
        }
    }

    fn type_argument_rest(&mut self) -> NodeId {
        if self.kind() != TokenKind::Ques {
            return self.term(Mode::TYPE | Mode::TYPE_ARG);
        }
        let pos = self.pos();
        self.next();
        match self.kind() {
            TokenKind::Extends => {
                self.next();
                let bound = self.parse_type();
                self.make(
                    Tree::Wildcard {
                        kind: WildcardKind::Extends,
                        bound: Some(bound),
                    },
                    pos,
                )
            }
            TokenKind::Super => {
                self.next();
                let bound = self.parse_type();
                self.make(
                    Tree::Wildcard {
                        kind: WildcardKind::Super,
                        bound: Some(bound),
                    },
                    pos,
                )
            }
            _ => self.make(
                Tree::Wildcard {
                    kind: WildcardKind::Unbound,
                    bound: None,
                },
                pos,
            ),
        }
    }

    /// Declaration type parameters: `< TypeParam {, TypeParam} >`, empty
    /// list when the current token is not `<`.
    pub(crate) fn type_parameters_opt(&mut self) -> NodeList {
        if self.kind() != TokenKind::Lt {
            return NodeList::EMPTY;
        }
        self.check_feature(Feature::Generics, self.pos());
        self.next();
        let mut params = vec![self.type_parameter()];
        while self.kind() == TokenKind::Comma {
            self.next();
            params.push(self.type_parameter());
        }
        match self.kind() {
            TokenKind::GtGtGtEq
            | TokenKind::GtGtEq
            | TokenKind::GtEq
            | TokenKind::GtGtGt
            | TokenKind::GtGt => self.split_token(),
            TokenKind::Gt => self.next(),
            _ => {
                let report_at = self.prev_end();
                self.report_syntax_error(report_at, ErrorCode::E1001, "'>' expected");
            }
        }
        self.make_list(&params)
    }

    /// `Ident [extends Bound {& Bound}]`.
    fn type_parameter(&mut self) -> NodeId {
        let pos = self.pos();
        let annotations = self.type_annotations_opt();
        let name = self.ident();
        let mut bounds = Vec::new();
        if self.kind() == TokenKind::Extends {
            self.next();
            bounds.push(self.parse_type());
            while self.kind() == TokenKind::Amp {
                self.next();
                bounds.push(self.parse_type());
            }
        }
        let bounds = self.make_list(&bounds);
        self.make(
            Tree::TypeParam {
                name,
                annotations,
                bounds,
            },
            pos,
        )
    }

    /// `Type {, Type}` -- extends/implements/throws lists.
    pub(crate) fn type_list(&mut self) -> Vec<NodeId> {
        let mut types = vec![self.parse_type()];
        while self.kind() == TokenKind::Comma {
            self.next();
            types.push(self.parse_type());
        }
        types
    }

    /// Annotations in type position (gated), e.g. `@NonNull String`.
    pub(crate) fn type_annotations_opt(&mut self) -> NodeList {
        if self.kind() != TokenKind::At {
            return NodeList::EMPTY;
        }
        self.check_feature(Feature::TypeAnnotations, self.pos());
        let mut annotations = Vec::new();
        while self.kind() == TokenKind::At {
            let pos = self.pos();
            self.next();
            annotations.push(self.annotation_rest(pos));
        }
        self.make_list(&annotations)
    }

    /// A type for a cast: `Type` or an intersection `A & B & C` (gated).
    pub(crate) fn cast_type(&mut self, open_pos: u32) -> NodeId {
        let first = self.term(Mode::TYPE);
        if self.kind() != TokenKind::Amp {
            return first;
        }
        self.check_feature(Feature::IntersectionCasts, self.pos());
        let mut bounds = vec![first];
        while self.kind() == TokenKind::Amp {
            self.next();
            bounds.push(self.term(Mode::TYPE));
        }
        let bounds = self.make_list(&bounds);
        self.make(Tree::TypeIntersection { bounds }, open_pos)
    }

    /// A modifiers node with no flags and no annotations, for synthesized
    /// parameter positions.
    pub(crate) fn empty_modifiers(&mut self, pos: u32) -> NodeId {
        self.make_at(
            Tree::Modifiers {
                flags: ModifierFlags::empty(),
                annotations: NodeList::EMPTY,
            },
            pos,
        )
    }
}
