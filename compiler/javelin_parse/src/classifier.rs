//! Bounded-lookahead disambiguation.
//!
//! Two classifiers carry the grammar's essential ambiguity resolution:
//!
//! - [`Parser::analyze_parens`]: at `(`, decide among cast, explicit- or
//!   implicit-parameter lambda, and plain parenthesized expression by
//!   scanning forward over balanced angle brackets, annotation argument
//!   lists, and array brackets.
//! - [`Parser::is_unbound_member_ref`]: at an identifier followed by `<`,
//!   decide between a generic-type-qualified unbound method reference and
//!   a less-than comparison by finding the balancing `>` and checking the
//!   token after it.
//!
//! The pattern set below is a required minimum, not a proven-exhaustive
//! cover of the grammar; newly discovered corner cases get a regression
//! test in `tests/` before any pattern changes.

use javelin_ir::TokenKind;

use crate::{Parser, TreeFactory};

/// What a parenthesized prefix turned out to be.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ParensResult {
    /// A cast: `(Type) expr`.
    Cast,
    /// A lambda with typed parameters: `(int x) -> ...`.
    ExplicitLambda,
    /// A lambda with inferred parameters: `(x, y) -> ...`.
    ImplicitLambda,
    /// A parenthesized expression.
    Parens,
}

impl<F: TreeFactory> Parser<'_, '_, F> {
    /// Classify the construct starting at the current `(`.
    ///
    /// Scans forward without consuming; fixed lookahead patterns resolve
    /// the common cases, and the matching `)` without a following `->`
    /// resolves the rest to a parenthesized expression.
    pub(crate) fn analyze_parens(&mut self) -> ParensResult {
        let mut depth = 0i32;
        let mut seen_type = false;
        let mut lookahead = 0usize;
        loop {
            let tk = self.peek_kind(lookahead);
            match tk {
                TokenKind::Comma => {
                    seen_type = true;
                }
                TokenKind::Extends | TokenKind::Super | TokenKind::Dot | TokenKind::Amp => {}
                TokenKind::Ques => {
                    if matches!(
                        self.peek_kind(lookahead + 1),
                        TokenKind::Extends | TokenKind::Super
                    ) {
                        // wildcard
                        seen_type = true;
                    }
                }
                TokenKind::Byte
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Boolean
                | TokenKind::Char => {
                    if self.peek_kind(lookahead + 1) == TokenKind::RParen {
                        // primitive type directly before ')': a cast
                        return ParensResult::Cast;
                    } else if self.peek_kind(lookahead + 1).is_lax_identifier() {
                        // primitive type then parameter name: typed lambda
                        return ParensResult::ExplicitLambda;
                    }
                }
                TokenKind::LParen => {
                    if lookahead != 0 {
                        // '(' in a non-starting position: expression parens
                        return ParensResult::Parens;
                    } else if self.peek_kind(lookahead + 1) == TokenKind::RParen {
                        // '()' can only start a lambda
                        return ParensResult::ExplicitLambda;
                    }
                }
                TokenKind::RParen => {
                    if seen_type {
                        return ParensResult::Cast;
                    }
                    // disambiguate on the token after ')'
                    return match self.peek_kind(lookahead + 1) {
                        TokenKind::Bang
                        | TokenKind::Tilde
                        | TokenKind::LParen
                        | TokenKind::This
                        | TokenKind::Super
                        | TokenKind::IntLiteral
                        | TokenKind::LongLiteral
                        | TokenKind::FloatLiteral
                        | TokenKind::DoubleLiteral
                        | TokenKind::CharLiteral
                        | TokenKind::StringLiteral
                        | TokenKind::True
                        | TokenKind::False
                        | TokenKind::Null
                        | TokenKind::New
                        | TokenKind::Identifier
                        | TokenKind::Assert
                        | TokenKind::Enum
                        | TokenKind::Underscore
                        | TokenKind::Byte
                        | TokenKind::Short
                        | TokenKind::Char
                        | TokenKind::Int
                        | TokenKind::Long
                        | TokenKind::Float
                        | TokenKind::Double
                        | TokenKind::Boolean
                        | TokenKind::Void => ParensResult::Cast,
                        _ => ParensResult::Parens,
                    };
                }
                TokenKind::Identifier | TokenKind::Assert | TokenKind::Enum
                | TokenKind::Underscore => {
                    if self.peek_kind(lookahead + 1).is_lax_identifier() {
                        // two identifiers in a row: typed lambda parameter
                        return ParensResult::ExplicitLambda;
                    } else if self.peek_kind(lookahead + 1) == TokenKind::RParen
                        && self.peek_kind(lookahead + 2) == TokenKind::Arrow
                    {
                        // Ident ')' '->': untyped lambda
                        return ParensResult::ImplicitLambda;
                    }
                    seen_type = false;
                }
                TokenKind::Final | TokenKind::Ellipsis => {
                    // modifiers and varargs only appear in parameter lists
                    return ParensResult::ExplicitLambda;
                }
                TokenKind::At => {
                    // annotation on a parameter or type: skip its name and
                    // a possible argument list, tracking paren nesting
                    seen_type = true;
                    lookahead += 1;
                    while self.peek_kind(lookahead + 1) == TokenKind::Dot {
                        lookahead += 2;
                    }
                    if self.peek_kind(lookahead + 1) == TokenKind::LParen {
                        lookahead += 1;
                        let mut nesting = 0i32;
                        loop {
                            match self.peek_kind(lookahead) {
                                TokenKind::Eof => return ParensResult::Parens,
                                TokenKind::LParen => nesting += 1,
                                TokenKind::RParen => {
                                    nesting -= 1;
                                    if nesting == 0 {
                                        break;
                                    }
                                }
                                _ => {}
                            }
                            lookahead += 1;
                        }
                    }
                }
                TokenKind::LBracket => {
                    if self.peek_kind(lookahead + 1) == TokenKind::RBracket
                        && self.peek_kind(lookahead + 2).is_lax_identifier()
                    {
                        // '[]' then a name: typed lambda parameter
                        return ParensResult::ExplicitLambda;
                    } else if self.peek_kind(lookahead + 1) == TokenKind::RBracket
                        && matches!(
                            self.peek_kind(lookahead + 2),
                            TokenKind::RParen | TokenKind::Amp
                        )
                    {
                        // '[]' then ')' or '&': array-type cast
                        return ParensResult::Cast;
                    } else if self.peek_kind(lookahead + 1) == TokenKind::RBracket {
                        seen_type = true;
                        lookahead += 1;
                    } else {
                        return ParensResult::Parens;
                    }
                }
                TokenKind::Lt => {
                    depth += 1;
                }
                TokenKind::GtGtGt | TokenKind::GtGt | TokenKind::Gt => {
                    depth -= match tk {
                        TokenKind::GtGtGt => 3,
                        TokenKind::GtGt => 2,
                        _ => 1,
                    };
                    if depth == 0 {
                        if matches!(
                            self.peek_kind(lookahead + 1),
                            TokenKind::RParen | TokenKind::Amp
                        ) {
                            // generic type then ')' or '&': a cast
                            return ParensResult::Cast;
                        } else if self.peek_kind(lookahead + 1).is_lax_identifier()
                            && self.peek_kind(lookahead + 2) == TokenKind::Comma
                        {
                            return ParensResult::ExplicitLambda;
                        } else if self.peek_kind(lookahead + 1).is_lax_identifier()
                            && self.peek_kind(lookahead + 2) == TokenKind::RParen
                            && self.peek_kind(lookahead + 3) == TokenKind::Arrow
                        {
                            return ParensResult::ExplicitLambda;
                        } else if self.peek_kind(lookahead + 1) == TokenKind::Ellipsis {
                            return ParensResult::ExplicitLambda;
                        }
                        // looks like a type, but could still be a cast to a
                        // generic type, an unbound method reference, or an
                        // explicit lambda
                        seen_type = true;
                    } else if depth < 0 {
                        // unbalanced angle brackets: not a generic type
                        return ParensResult::Parens;
                    }
                }
                _ => {
                    // includes EOF and every literal/operator
                    return ParensResult::Parens;
                }
            }
            lookahead += 1;
        }
    }

    /// Whether the identifier at the current position, followed by `<`,
    /// starts a generic-type-qualified unbound method reference rather
    /// than a comparison.
    ///
    /// Scans forward with an angle-bracket depth counter until the depth
    /// returns to zero; a following `.`, `[`, or `::` means a type.
    pub(crate) fn is_unbound_member_ref(&mut self) -> bool {
        let mut depth = 0i32;
        let mut pos = 0usize;
        loop {
            let tk = self.peek_kind(pos);
            match tk {
                TokenKind::Identifier
                | TokenKind::Underscore
                | TokenKind::Ques
                | TokenKind::Extends
                | TokenKind::Super
                | TokenKind::Dot
                | TokenKind::RBracket
                | TokenKind::LBracket
                | TokenKind::Comma
                | TokenKind::Byte
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Boolean
                | TokenKind::Char
                | TokenKind::At => {}
                TokenKind::LParen => {
                    // skip annotation argument lists
                    let mut nesting = 0i32;
                    loop {
                        match self.peek_kind(pos) {
                            TokenKind::Eof => return false,
                            TokenKind::LParen => nesting += 1,
                            TokenKind::RParen => {
                                nesting -= 1;
                                if nesting == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        }
                        pos += 1;
                    }
                }
                TokenKind::Lt => depth += 1,
                TokenKind::GtGtGt | TokenKind::GtGt | TokenKind::Gt => {
                    depth -= match tk {
                        TokenKind::GtGtGt => 3,
                        TokenKind::GtGt => 2,
                        _ => 1,
                    };
                    if depth == 0 {
                        return matches!(
                            self.peek_kind(pos + 1),
                            TokenKind::Dot | TokenKind::LBracket | TokenKind::ColCol
                        );
                    }
                }
                _ => return false,
            }
            pos += 1;
        }
    }
}
