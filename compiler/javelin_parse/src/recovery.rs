//! Error reporting and resynchronization.
//!
//! Reporting rules:
//! - at most one diagnostic per source offset (strictly increasing
//!   positions; repeats at the same offset are swallowed);
//! - reporting at end of input substitutes the premature-end diagnostic;
//! - if two consecutive reports happen at the same token, one token is
//!   consumed to guarantee forward progress.
//!
//! After reporting, productions either continue in place (a missing token
//! is assumed present) or build an `Erroneous` node wrapping whatever
//! sub-trees already exist and [`Parser::skip`] to a caller-chosen class
//! of safe tokens.

use javelin_diagnostic::{Diagnostic, ErrorCode};
use javelin_ir::{NodeId, Span, Tree, TokenKind};

use crate::{Parser, TreeFactory};

impl<F: TreeFactory> Parser<'_, '_, F> {
    /// Report a syntax error at `pos`, deduplicating by offset and
    /// guaranteeing progress.
    pub(crate) fn report_syntax_error(
        &mut self,
        pos: u32,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        let fresh = match self.last_err_pos {
            None => true,
            Some(last) => pos > last,
        };
        if fresh {
            if self.kind() == TokenKind::Eof {
                self.report(
                    Diagnostic::error(ErrorCode::E1005)
                        .with_message("reached end of input while parsing")
                        .with_span(Span::point(pos)),
                );
            } else {
                self.report(
                    Diagnostic::error(code)
                        .with_message(message)
                        .with_span(Span::point(pos)),
                );
            }
        }
        self.last_err_pos = Some(pos);

        // Two reports at one token: consume it so recovery cannot spin.
        let token_pos = self.pos();
        if self.recovery_pos == Some(token_pos) && self.kind() != TokenKind::Eof {
            self.next();
        }
        self.recovery_pos = Some(self.pos());
    }

    /// Report and build an `Erroneous` placeholder wrapping `parts`.
    pub(crate) fn syntax_error(
        &mut self,
        pos: u32,
        parts: &[NodeId],
        code: ErrorCode,
        message: impl Into<String>,
    ) -> NodeId {
        self.report_syntax_error(pos, code, message);
        let parts = self.make_list(parts);
        self.make(Tree::Erroneous { parts }, pos)
    }

    /// An illegal construct at the current token: report `illegal start of
    /// expression/type` depending on mode, yield an erroneous node.
    pub(crate) fn illegal(&mut self) -> NodeId {
        let pos = self.pos();
        if self.mode.contains(crate::Mode::EXPR) {
            self.syntax_error(pos, &[], ErrorCode::E1002, "illegal start of expression")
        } else {
            self.syntax_error(pos, &[], ErrorCode::E1003, "illegal start of type")
        }
    }

    /// Whether an error was just reported at or beyond the current token,
    /// meaning the caller should resynchronize before continuing.
    pub(crate) fn recovered_here(&self) -> bool {
        matches!(self.last_err_pos, Some(p) if self.pos() <= p)
    }

    /// Skip tokens until reaching one that can start the construct the
    /// caller wants to resume at. Consumes a `;` outright; always stops at
    /// end of input and at top-level declaration starters.
    pub(crate) fn skip(
        &mut self,
        stop_at_import: bool,
        stop_at_member_decl: bool,
        stop_at_identifier: bool,
        stop_at_statement: bool,
    ) {
        loop {
            match self.kind() {
                TokenKind::Semi => {
                    self.next();
                    return;
                }
                TokenKind::Public
                | TokenKind::Final
                | TokenKind::Abstract
                | TokenKind::At
                | TokenKind::Eof
                | TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Enum => return,
                TokenKind::Import if stop_at_import => return,
                TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Static
                | TokenKind::Transient
                | TokenKind::Native
                | TokenKind::Volatile
                | TokenKind::Synchronized
                | TokenKind::Strictfp
                | TokenKind::Lt
                | TokenKind::Byte
                | TokenKind::Short
                | TokenKind::Char
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Boolean
                | TokenKind::Void
                    if stop_at_member_decl =>
                {
                    return;
                }
                TokenKind::Underscore | TokenKind::Identifier if stop_at_identifier => return,
                TokenKind::Case
                | TokenKind::Default
                | TokenKind::If
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::Try
                | TokenKind::Switch
                | TokenKind::Return
                | TokenKind::Throw
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Else
                | TokenKind::Finally
                | TokenKind::Catch
                    if stop_at_statement =>
                {
                    return;
                }
                _ => {}
            }
            self.next();
        }
    }
}
