//! Lookahead scanner over the tokenizer.
//!
//! Keeps the current and previous token, supports arbitrary positive-k
//! lookahead through a lazily filled FIFO, and provides the token-splitting
//! operation: when nested type-argument lists close, an already-lexed
//! compound operator like `>>` must be reinterpreted as two shorter
//! operators covering the same span.

use std::collections::VecDeque;

use javelin_diagnostic::{Diagnostic, LineMap};
use javelin_ir::{NameTable, Span, Token, TokenKind};

use crate::Tokenizer;

/// The parser's view of the token stream.
pub struct Scanner<'src, 'sess> {
    tokenizer: Tokenizer<'src, 'sess>,
    token: Token,
    prev: Token,
    /// Tokens already lexed ahead of `token`, oldest first.
    lookahead: VecDeque<Token>,
}

impl<'src, 'sess> Scanner<'src, 'sess> {
    pub fn new(mut tokenizer: Tokenizer<'src, 'sess>) -> Self {
        let first = tokenizer.read_token();
        Scanner {
            tokenizer,
            token: first,
            prev: Token::plain(TokenKind::Error, Span::DUMMY),
            lookahead: VecDeque::new(),
        }
    }

    /// The current token.
    #[inline]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// The previously consumed token.
    #[inline]
    pub fn prev_token(&self) -> &Token {
        &self.prev
    }

    /// The token `k` positions ahead; `k == 0` is the current token.
    ///
    /// Fills the lookahead FIFO lazily. Lookahead past end of input keeps
    /// returning the EOF token.
    pub fn token_at(&mut self, k: usize) -> &Token {
        if k == 0 {
            return &self.token;
        }
        while self.lookahead.len() < k {
            let next = self.tokenizer.read_token();
            self.lookahead.push_back(next);
        }
        &self.lookahead[k - 1]
    }

    /// Consume the current token.
    pub fn advance(&mut self) {
        let next = match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.tokenizer.read_token(),
        };
        self.prev = std::mem::replace(&mut self.token, next);
    }

    /// Split the current multi-character operator token into two shorter
    /// registered operators covering the same span: the first half becomes
    /// the previous token, the second becomes current.
    ///
    /// The current token must have a fixed spelling of at least two
    /// characters whose halves are themselves registered operators
    /// (`>>` -> `>` `>`, `>>>` -> `>` `>>`).
    pub fn split(&mut self) {
        let Some(text) = self.token.kind.fixed_text() else {
            debug_assert!(false, "split on a token without fixed spelling");
            return;
        };
        debug_assert!(text.len() >= 2, "split on a single-character operator");
        let (first, rest) = text.split_at(1);
        let k1 = self.tokenizer.operator_kind(first);
        let k2 = self.tokenizer.operator_kind(rest);
        debug_assert!(
            k1 != TokenKind::Identifier && k2 != TokenKind::Identifier,
            "split halves must be registered operators"
        );
        let span = self.token.span;
        let t1 = Token::plain(k1, Span::new(span.start, span.start + 1));
        let t2 = Token::plain(k2, Span::new(span.start + 1, span.end));
        self.prev = t1;
        self.token = t2;
    }

    /// Access to the session name table.
    pub fn names(&mut self) -> &mut NameTable {
        self.tokenizer.names()
    }

    /// Drain lexer diagnostics produced so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.tokenizer.take_diagnostics()
    }

    /// Build a line map over the raw source.
    pub fn line_map(&self) -> LineMap {
        self.tokenizer.line_map()
    }

    /// Raw source text for a span.
    pub fn raw_text(&self, span: Span) -> &'src str {
        self.tokenizer.raw_text(span)
    }
}
