//! The tokenizer: one call, one token.
//!
//! A character-driven state machine over the escape-decoding reader.
//! Whitespace and comments never surface as tokens -- comments accumulate
//! onto the next emitted token, whitespace is consumed and reported to the
//! line hooks. Lexical errors are recoverable: they are pushed as
//! diagnostics and scanning continues with a best-effort token.

use javelin_diagnostic::{Diagnostic, ErrorCode, LineMap};
use javelin_ir::{
    Comment, CommentStyle, Name, NameTable, SourceLevel, Span, Token, TokenBody, TokenKind,
    TokenTag,
};
use javelin_lexer_core::{ReaderIssueKind, SourceBuffer, UnicodeReader};
use smallvec::SmallVec;

use crate::Keywords;

/// Form feed, treated as horizontal whitespace.
const FF: char = '\u{c}';
/// Old-style end-of-input marker, honored when it is the last content char.
const EOI: char = '\u{1a}';

/// Whether `ch` can appear in a multi-character operator.
fn is_special(ch: char) -> bool {
    matches!(
        ch,
        '!' | '%' | '&' | '*' | '?' | '+' | '-' | ':' | '<' | '=' | '>' | '^' | '|' | '~' | '@'
    )
}

/// Identifier-start test for non-ASCII code points.
fn is_ident_start(ch: char) -> bool {
    ch == '$' || ch == '_' || unicode_ident::is_xid_start(ch)
}

/// Identifier-part test for non-ASCII code points.
fn is_ident_part(ch: char) -> bool {
    ch == '$' || ch == '_' || unicode_ident::is_xid_continue(ch)
}

/// The tokenizer. Owns the reader; borrows the session's name table and
/// keyword table.
pub struct Tokenizer<'src, 'sess> {
    reader: UnicodeReader<'src>,
    names: &'sess mut NameTable,
    keywords: &'sess Keywords,
    level: SourceLevel,
    // Gates that flip on after their first diagnostic, suppressing cascades.
    allow_underscores: bool,
    allow_binary: bool,
    allow_hex_floats: bool,
    // Per-token scan state.
    tk: TokenKind,
    name: Option<Name>,
    radix: u8,
    // Recoverable problems, drained by the scanner's owner.
    diagnostics: Vec<Diagnostic>,
    /// Position of the most recent lexical error.
    err_pos: u32,
}

impl<'src, 'sess> Tokenizer<'src, 'sess> {
    pub fn new(
        buffer: &'src SourceBuffer,
        names: &'sess mut NameTable,
        keywords: &'sess Keywords,
        level: SourceLevel,
    ) -> Self {
        Tokenizer {
            reader: UnicodeReader::new(buffer),
            names,
            keywords,
            level,
            allow_underscores: level.allows_underscores_in_literals(),
            allow_binary: level.allows_binary_literals(),
            allow_hex_floats: level.allows_hex_floats(),
            tk: TokenKind::Error,
            name: None,
            radix: 0,
            diagnostics: Vec::new(),
            err_pos: u32::MAX,
        }
    }

    /// Access to the session name table (the parser interns through this).
    pub fn names(&mut self) -> &mut NameTable {
        self.names
    }

    /// Classify an operator spelling, for token splitting.
    pub fn operator_kind(&mut self, text: &str) -> TokenKind {
        let name = self.names.intern(text);
        self.keywords.kind_of(name)
    }

    /// Drain diagnostics produced since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Position of the most recent lexical error, `u32::MAX` if none.
    pub fn err_pos(&self) -> u32 {
        self.err_pos
    }

    /// Build a line map over the raw source buffer.
    pub fn line_map(&self) -> LineMap {
        LineMap::new(self.reader.raw_slice(0, self.reader.source_len()))
    }

    /// Raw source text for a span (escape spellings untouched).
    pub fn raw_text(&self, span: Span) -> &'src str {
        self.reader.raw_slice(span.start, span.end)
    }

    /// Report a recoverable lexical error and poison the current token.
    fn lex_error(&mut self, pos: u32, code: ErrorCode, message: impl Into<String>) {
        self.diagnostics.push(
            Diagnostic::error(code)
                .with_message(message)
                .with_span(Span::point(pos)),
        );
        self.tk = TokenKind::Error;
        self.err_pos = pos;
    }

    /// Whitespace-run hook; consumed by nothing today, kept as the
    /// extension point for incremental line tracking.
    #[inline]
    fn process_white_space(&mut self, _pos: u32, _end: u32) {}

    /// Line-terminator hook; see [`Self::process_white_space`].
    #[inline]
    fn process_line_terminator(&mut self, _pos: u32, _end: u32) {}

    /// Advance inside a comment, stepping over a doubled backslash so it
    /// cannot be taken for an escape start.
    fn scan_comment_char(&mut self) {
        self.reader.advance();
        if self.reader.ch() == '\\'
            && !self.reader.from_escape()
            && self.reader.peek_raw() == b'\\'
        {
            self.reader.skip_byte();
        }
    }

    /// Read the next character of a char/string literal into the staging
    /// buffer, decoding escape sequences.
    fn scan_lit_char(&mut self) {
        if self.reader.ch() == '\\' {
            if self.reader.peek_raw() == b'\\' && !self.reader.from_escape() {
                // doubled backslash: the escape sequence for one backslash
                self.reader.skip_byte();
                self.reader.stage('\\');
                self.reader.advance();
            } else {
                self.reader.advance();
                match self.reader.ch() {
                    lead @ '0'..='7' => {
                        let mut oct = self.reader.digit(8).unwrap_or(0);
                        self.reader.advance();
                        if ('0'..='7').contains(&self.reader.ch()) {
                            oct = oct * 8 + self.reader.digit(8).unwrap_or(0);
                            self.reader.advance();
                            if lead <= '3' && ('0'..='7').contains(&self.reader.ch()) {
                                oct = oct * 8 + self.reader.digit(8).unwrap_or(0);
                                self.reader.advance();
                            }
                        }
                        // oct <= 0o377, always a valid scalar
                        if let Some(c) = char::from_u32(oct) {
                            self.reader.stage(c);
                        }
                    }
                    'b' => {
                        self.reader.stage('\u{8}');
                        self.reader.advance();
                    }
                    't' => {
                        self.reader.stage('\t');
                        self.reader.advance();
                    }
                    'n' => {
                        self.reader.stage('\n');
                        self.reader.advance();
                    }
                    'f' => {
                        self.reader.stage(FF);
                        self.reader.advance();
                    }
                    'r' => {
                        self.reader.stage('\r');
                        self.reader.advance();
                    }
                    '\'' => {
                        self.reader.stage('\'');
                        self.reader.advance();
                    }
                    '"' => {
                        self.reader.stage('"');
                        self.reader.advance();
                    }
                    '\\' => {
                        self.reader.stage('\\');
                        self.reader.advance();
                    }
                    _ => {
                        let at = self.reader.pos();
                        self.lex_error(at, ErrorCode::E0003, "illegal escape character");
                    }
                }
            }
        } else if !self.reader.is_eof() {
            self.reader.stage_current_and_advance();
        }
    }

    /// Scan a run of digits (radix-aware), validating underscore placement.
    fn scan_digits(&mut self, pos: u32, digit_radix: u32) {
        let mut save_ch;
        let mut save_pos;
        loop {
            if self.reader.ch() != '_' {
                self.reader.stage_current();
            } else if !self.allow_underscores {
                self.lex_error(
                    pos,
                    ErrorCode::E2011,
                    format!(
                        "underscores in literals are not supported in source level {}",
                        self.level.name()
                    ),
                );
                self.allow_underscores = true;
            }
            save_ch = self.reader.ch();
            save_pos = self.reader.pos();
            self.reader.advance();
            if self.reader.digit(digit_radix).is_none() && self.reader.ch() != '_' {
                break;
            }
        }
        if save_ch == '_' {
            self.lex_error(save_pos, ErrorCode::E0011, "illegal underscore");
        }
    }

    /// Report and skip a run of underscores where none may appear.
    fn skip_illegal_underscores(&mut self) {
        if self.reader.ch() == '_' {
            let at = self.reader.pos();
            self.lex_error(at, ErrorCode::E0011, "illegal underscore");
            while self.reader.ch() == '_' {
                self.reader.advance();
            }
        }
    }

    /// Binary exponent and float suffix of a hexadecimal floating literal.
    fn scan_hex_exponent_and_suffix(&mut self, pos: u32) {
        if matches!(self.reader.ch(), 'p' | 'P') {
            self.reader.stage_current_and_advance();
            self.skip_illegal_underscores();
            if matches!(self.reader.ch(), '+' | '-') {
                self.reader.stage_current_and_advance();
            }
            self.skip_illegal_underscores();
            if self.reader.ch().is_ascii_digit() {
                self.scan_digits(pos, 10);
                if !self.allow_hex_floats {
                    self.lex_error(
                        pos,
                        ErrorCode::E2007,
                        format!(
                            "hexadecimal floating-point literals are not supported in source level {}",
                            self.level.name()
                        ),
                    );
                    self.allow_hex_floats = true;
                }
            } else {
                self.lex_error(pos, ErrorCode::E0012, "malformed floating-point literal");
            }
        } else {
            self.lex_error(pos, ErrorCode::E0012, "malformed floating-point literal");
        }
        if matches!(self.reader.ch(), 'f' | 'F') {
            self.reader.stage_current_and_advance();
            self.tk = TokenKind::FloatLiteral;
            self.radix = 16;
        } else {
            if matches!(self.reader.ch(), 'd' | 'D') {
                self.reader.stage_current_and_advance();
            }
            self.tk = TokenKind::DoubleLiteral;
            self.radix = 16;
        }
    }

    /// Fractional part and optional exponent of a decimal floating literal.
    fn scan_fraction(&mut self, pos: u32) {
        self.skip_illegal_underscores();
        if self.reader.ch().is_ascii_digit() {
            self.scan_digits(pos, 10);
        }
        let mark = self.reader.staged_len();
        if matches!(self.reader.ch(), 'e' | 'E') {
            self.reader.stage_current_and_advance();
            self.skip_illegal_underscores();
            if matches!(self.reader.ch(), '+' | '-') {
                self.reader.stage_current_and_advance();
            }
            self.skip_illegal_underscores();
            if self.reader.ch().is_ascii_digit() {
                self.scan_digits(pos, 10);
                return;
            }
            self.lex_error(pos, ErrorCode::E0012, "malformed floating-point literal");
            self.reader.truncate_staged(mark);
        }
    }

    /// Fraction plus `f`/`d` suffix selection for decimal floats.
    fn scan_fraction_and_suffix(&mut self, pos: u32) {
        self.radix = 10;
        self.scan_fraction(pos);
        if matches!(self.reader.ch(), 'f' | 'F') {
            self.reader.stage_current_and_advance();
            self.tk = TokenKind::FloatLiteral;
        } else {
            if matches!(self.reader.ch(), 'd' | 'D') {
                self.reader.stage_current_and_advance();
            }
            self.tk = TokenKind::DoubleLiteral;
        }
    }

    /// Fraction of a hexadecimal floating literal (cursor at `.`).
    fn scan_hex_fraction_and_suffix(&mut self, pos: u32, mut seen_digit: bool) {
        self.radix = 16;
        debug_assert_eq!(self.reader.ch(), '.');
        self.reader.stage_current_and_advance();
        self.skip_illegal_underscores();
        if self.reader.digit(16).is_some() {
            seen_digit = true;
            self.scan_digits(pos, 16);
        }
        if seen_digit {
            self.scan_hex_exponent_and_suffix(pos);
        } else {
            self.lex_error(pos, ErrorCode::E0009, "invalid hexadecimal number");
        }
    }

    /// Scan a number. `radix` is one of 2, 8, 10, 16.
    fn scan_number(&mut self, pos: u32, radix: u32) {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "radix is one of 2, 8, 10, 16"
        )]
        {
            self.radix = radix as u8;
        }
        // For octal, allow base-10 digit accumulation in case the literal
        // turns out to be a decimal float (e.g. 09.5).
        let digit_radix = if radix == 8 { 10 } else { radix };
        let mut seen_digit = false;
        if self.reader.digit(digit_radix).is_some() {
            seen_digit = true;
            self.scan_digits(pos, digit_radix);
        }
        let ch = self.reader.ch();
        if radix == 16 && ch == '.' {
            self.scan_hex_fraction_and_suffix(pos, seen_digit);
        } else if seen_digit && radix == 16 && matches!(ch, 'p' | 'P') {
            self.scan_hex_exponent_and_suffix(pos);
        } else if digit_radix == 10 && ch == '.' {
            self.reader.stage_current_and_advance();
            self.scan_fraction_and_suffix(pos);
        } else if digit_radix == 10 && matches!(ch, 'e' | 'E' | 'f' | 'F' | 'd' | 'D') {
            self.scan_fraction_and_suffix(pos);
        } else if matches!(self.reader.ch(), 'l' | 'L') {
            self.reader.advance();
            self.tk = TokenKind::LongLiteral;
        } else {
            self.tk = TokenKind::IntLiteral;
        }
    }

    /// Scan an identifier or reserved word.
    fn scan_ident(&mut self) {
        self.reader.stage_current_and_advance();
        loop {
            if self.reader.is_eof() {
                break;
            }
            let ch = self.reader.ch();
            match ch {
                'A'..='Z' | 'a'..='z' | '0'..='9' | '$' | '_' => {}
                EOI => {
                    // legal as the very last content character
                    if self.reader.end_pos() >= self.reader.source_len() {
                        break;
                    }
                    self.reader.advance();
                    continue;
                }
                // identifier-ignorable control characters
                '\u{0}'..='\u{8}' | '\u{e}'..='\u{19}' | '\u{1b}' | '\u{7f}' => {
                    self.reader.advance();
                    continue;
                }
                _ => {
                    let part = !ch.is_ascii() && is_ident_part(ch);
                    if !part {
                        break;
                    }
                }
            }
            self.reader.stage_current_and_advance();
        }
        let name = self.names.intern(self.reader.staged());
        self.tk = self.keywords.kind_of(name);
        self.name = Some(name);
    }

    /// Greedy longest-match operator scan: extend the spelling while the
    /// extension is itself a registered operator, then back off one.
    fn scan_operator(&mut self) {
        loop {
            self.reader.stage_current();
            let name = self.names.intern(self.reader.staged());
            let kind = self.keywords.kind_of(name);
            if kind == TokenKind::Identifier {
                // extension is not an operator: drop the char just staged
                let len = self.reader.staged_len();
                self.reader.truncate_staged(len - 1);
                break;
            }
            self.tk = kind;
            self.reader.advance();
            if !is_special(self.reader.ch()) {
                break;
            }
        }
    }

    /// Read one token.
    pub fn read_token(&mut self) -> Token {
        self.reader.reset_staged();
        self.name = None;
        self.radix = 0;
        self.tk = TokenKind::Error;
        let mut comments: SmallVec<[Comment; 1]> = SmallVec::new();
        let mut pos;

        loop {
            pos = self.reader.pos();
            let ch = self.reader.ch();
            match ch {
                ' ' | '\t' | FF => {
                    while matches!(self.reader.ch(), ' ' | '\t' | FF) {
                        self.reader.advance();
                    }
                    let end = self.reader.pos();
                    self.process_white_space(pos, end);
                }
                '\n' => {
                    self.reader.advance();
                    let end = self.reader.pos();
                    self.process_line_terminator(pos, end);
                }
                '\r' => {
                    self.reader.advance();
                    if self.reader.ch() == '\n' {
                        self.reader.advance();
                    }
                    let end = self.reader.pos();
                    self.process_line_terminator(pos, end);
                }
                'A'..='Z' | 'a'..='z' | '$' | '_' => {
                    self.scan_ident();
                    break;
                }
                '0' => {
                    self.reader.advance();
                    if matches!(self.reader.ch(), 'x' | 'X') {
                        self.reader.advance();
                        self.skip_illegal_underscores();
                        if self.reader.ch() == '.' {
                            self.scan_hex_fraction_and_suffix(pos, false);
                        } else if self.reader.digit(16).is_none() {
                            self.lex_error(pos, ErrorCode::E0009, "invalid hexadecimal number");
                        } else {
                            self.scan_number(pos, 16);
                        }
                    } else if matches!(self.reader.ch(), 'b' | 'B') {
                        if !self.allow_binary {
                            self.lex_error(
                                pos,
                                ErrorCode::E2012,
                                format!(
                                    "binary literals are not supported in source level {}",
                                    self.level.name()
                                ),
                            );
                            self.allow_binary = true;
                        }
                        self.reader.advance();
                        self.skip_illegal_underscores();
                        if self.reader.digit(2).is_none() {
                            self.lex_error(pos, ErrorCode::E0010, "invalid binary number");
                        } else {
                            self.scan_number(pos, 2);
                        }
                    } else {
                        self.reader.stage('0');
                        if self.reader.ch() == '_' {
                            let save_pos = self.reader.pos();
                            while self.reader.ch() == '_' {
                                self.reader.advance();
                            }
                            if self.reader.digit(10).is_none() {
                                self.lex_error(save_pos, ErrorCode::E0011, "illegal underscore");
                            }
                        }
                        self.scan_number(pos, 8);
                    }
                    break;
                }
                '1'..='9' => {
                    self.scan_number(pos, 10);
                    break;
                }
                '.' => {
                    self.reader.advance();
                    if self.reader.ch().is_ascii_digit() {
                        self.reader.stage('.');
                        self.scan_fraction_and_suffix(pos);
                    } else if self.reader.ch() == '.' {
                        let save_pos = self.reader.pos();
                        self.reader.stage('.');
                        self.reader.stage_current_and_advance();
                        if self.reader.ch() == '.' {
                            self.reader.stage_current_and_advance();
                            self.tk = TokenKind::Ellipsis;
                        } else {
                            self.lex_error(save_pos, ErrorCode::E0014, "illegal '.'");
                        }
                    } else {
                        self.tk = TokenKind::Dot;
                    }
                    break;
                }
                ',' => {
                    self.reader.advance();
                    self.tk = TokenKind::Comma;
                    break;
                }
                ';' => {
                    self.reader.advance();
                    self.tk = TokenKind::Semi;
                    break;
                }
                '(' => {
                    self.reader.advance();
                    self.tk = TokenKind::LParen;
                    break;
                }
                ')' => {
                    self.reader.advance();
                    self.tk = TokenKind::RParen;
                    break;
                }
                '[' => {
                    self.reader.advance();
                    self.tk = TokenKind::LBracket;
                    break;
                }
                ']' => {
                    self.reader.advance();
                    self.tk = TokenKind::RBracket;
                    break;
                }
                '{' => {
                    self.reader.advance();
                    self.tk = TokenKind::LBrace;
                    break;
                }
                '}' => {
                    self.reader.advance();
                    self.tk = TokenKind::RBrace;
                    break;
                }
                '/' => {
                    self.reader.advance();
                    if self.reader.ch() == '/' {
                        loop {
                            self.scan_comment_char();
                            if matches!(self.reader.ch(), '\r' | '\n') || self.reader.is_eof() {
                                break;
                            }
                        }
                        if !self.reader.is_eof() {
                            let end = self.reader.pos();
                            comments.push(Comment::new(
                                CommentStyle::Line,
                                Span::new(pos, end),
                                self.reader.raw_slice(pos, end),
                            ));
                        }
                    } else if self.reader.ch() == '*' {
                        self.reader.advance();
                        let mut is_empty = false;
                        let style = if self.reader.ch() == '*' {
                            self.scan_comment_char();
                            if self.reader.ch() == '/' {
                                is_empty = true;
                            }
                            CommentStyle::Doc
                        } else {
                            CommentStyle::Block
                        };
                        while !is_empty && !self.reader.is_eof() {
                            if self.reader.ch() == '*' {
                                self.reader.advance();
                                if self.reader.ch() == '/' {
                                    break;
                                }
                            } else {
                                self.scan_comment_char();
                            }
                        }
                        if self.reader.ch() == '/' {
                            self.reader.advance();
                            let end = self.reader.pos();
                            comments.push(Comment::new(
                                style,
                                Span::new(pos, end),
                                self.reader.raw_slice(pos, end),
                            ));
                        } else {
                            self.lex_error(pos, ErrorCode::E0008, "unclosed comment");
                            break;
                        }
                    } else if self.reader.ch() == '=' {
                        self.reader.advance();
                        self.tk = TokenKind::SlashEq;
                        break;
                    } else {
                        self.tk = TokenKind::Slash;
                        break;
                    }
                }
                '\'' => {
                    self.reader.advance();
                    if self.reader.ch() == '\'' {
                        self.lex_error(pos, ErrorCode::E0006, "empty character literal");
                    } else {
                        if matches!(self.reader.ch(), '\r' | '\n') {
                            self.lex_error(
                                pos,
                                ErrorCode::E0007,
                                "illegal line end in character literal",
                            );
                        }
                        self.scan_lit_char();
                        if self.reader.ch() == '\'' {
                            self.reader.advance();
                            self.tk = TokenKind::CharLiteral;
                        } else {
                            self.lex_error(pos, ErrorCode::E0005, "unclosed character literal");
                        }
                    }
                    break;
                }
                '"' => {
                    self.reader.advance();
                    while self.reader.ch() != '"'
                        && !matches!(self.reader.ch(), '\r' | '\n')
                        && !self.reader.is_eof()
                    {
                        self.scan_lit_char();
                    }
                    if self.reader.ch() == '"' {
                        self.tk = TokenKind::StringLiteral;
                        self.reader.advance();
                    } else {
                        self.lex_error(pos, ErrorCode::E0004, "unclosed string literal");
                    }
                    break;
                }
                other => {
                    if is_special(other) {
                        self.scan_operator();
                    } else if !other.is_ascii() && is_ident_start(other) {
                        self.scan_ident();
                    } else if self.reader.is_eof()
                        || (other == EOI && self.reader.end_pos() >= self.reader.source_len())
                    {
                        self.tk = TokenKind::Eof;
                        pos = self.reader.source_len();
                    } else {
                        let display = if other > ' ' && (other as u32) < 127 {
                            format!("{other}")
                        } else {
                            format!("\\u{:04x}", other as u32)
                        };
                        self.lex_error(pos, ErrorCode::E0001, format!("illegal character: '{display}'"));
                        self.reader.advance();
                    }
                    break;
                }
            }
        }

        // Convert decoding problems accumulated by the reader.
        for issue in self.reader.take_issues() {
            let (code, msg) = match issue.kind {
                ReaderIssueKind::MalformedEscape => {
                    (ErrorCode::E0002, "malformed unicode escape")
                }
                ReaderIssueKind::LoneSurrogate => {
                    (ErrorCode::E0002, "malformed unicode escape: unpaired surrogate")
                }
                ReaderIssueKind::NonAsciiDigit => {
                    (ErrorCode::E0013, "non-ASCII digit in numeric literal")
                }
            };
            self.diagnostics.push(
                Diagnostic::error(code)
                    .with_message(msg)
                    .with_span(Span::point(issue.pos)),
            );
        }

        let end_pos = if self.tk == TokenKind::Eof {
            pos
        } else {
            self.reader.pos()
        };
        let span = Span::new(pos, end_pos);
        let body = match self.tk.tag() {
            TokenTag::Default => TokenBody::None,
            TokenTag::Named => TokenBody::Named(self.name.unwrap_or(Name::EMPTY)),
            TokenTag::String => TokenBody::String(self.reader.staged().into()),
            TokenTag::Numeric => TokenBody::Numeric {
                text: self.reader.staged().into(),
                radix: self.radix,
            },
        };
        Token::new(self.tk, span, body, comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_diagnostic::Diagnostic;
    use pretty_assertions::assert_eq;

    fn lex(source: &str) -> (Vec<Token>, Vec<Diagnostic>, NameTable) {
        let buffer = SourceBuffer::new(source);
        let mut names = NameTable::new();
        let keywords = Keywords::new(&mut names);
        let mut tokens = Vec::new();
        let diags;
        {
            let mut tokenizer =
                Tokenizer::new(&buffer, &mut names, &keywords, SourceLevel::LATEST);
            loop {
                let token = tokenizer.read_token();
                let done = token.kind == TokenKind::Eof;
                tokens.push(token);
                if done {
                    break;
                }
            }
            diags = tokenizer.take_diagnostics();
        }
        (tokens, diags, names)
    }

    fn lex_at(source: &str, level: SourceLevel) -> (Vec<Token>, Vec<Diagnostic>) {
        let buffer = SourceBuffer::new(source);
        let mut names = NameTable::new();
        let keywords = Keywords::new(&mut names);
        let mut tokens = Vec::new();
        let diags;
        {
            let mut tokenizer = Tokenizer::new(&buffer, &mut names, &keywords, level);
            loop {
                let token = tokenizer.read_token();
                let done = token.kind == TokenKind::Eof;
                tokens.push(token);
                if done {
                    break;
                }
            }
            diags = tokenizer.take_diagnostics();
        }
        (tokens, diags)
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        let (tokens, diags, names) = lex("class Point extends Object");
        assert!(diags.is_empty());
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Class,
                TokenKind::Identifier,
                TokenKind::Extends,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        let point = tokens[1].name().map(|n| names.lookup(n).to_owned());
        assert_eq!(point.as_deref(), Some("Point"));
    }

    #[test]
    fn decimal_literals() {
        let (tokens, diags, _) = lex("0 42 42L 1.5 1.5f 1.5d 2e10 3f");
        assert!(diags.is_empty());
        assert_eq!(
            kinds(&tokens)[..8],
            [
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::LongLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::FloatLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::FloatLiteral,
            ]
        );
        assert_eq!(tokens[1].numeric_text(), Some("42"));
        assert_eq!(tokens[1].radix(), Some(10));
    }

    #[test]
    fn radix_literals() {
        let (tokens, diags, _) = lex("0x1F 0b101 0777 0xCAFEL");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].numeric_text(), Some("1F"));
        assert_eq!(tokens[0].radix(), Some(16));
        assert_eq!(tokens[1].numeric_text(), Some("101"));
        assert_eq!(tokens[1].radix(), Some(2));
        assert_eq!(tokens[2].numeric_text(), Some("0777"));
        assert_eq!(tokens[2].radix(), Some(8));
        assert_eq!(tokens[3].kind, TokenKind::LongLiteral);
        assert_eq!(tokens[3].radix(), Some(16));
    }

    #[test]
    fn hex_float_literal() {
        let (tokens, diags, _) = lex("0x1.8p3");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::DoubleLiteral);
        assert_eq!(tokens[0].numeric_text(), Some("1.8p3"));
        assert_eq!(tokens[0].radix(), Some(16));
    }

    #[test]
    fn leading_dot_float() {
        let (tokens, diags, _) = lex(".5 .5f");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::DoubleLiteral);
        assert_eq!(tokens[0].numeric_text(), Some(".5"));
        assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
    }

    #[test]
    fn underscores_stripped_from_text() {
        let (tokens, diags, _) = lex("1_000_000");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].numeric_text(), Some("1000000"));
    }

    #[test]
    fn underscore_gate_reports_once() {
        let (tokens, diags) = lex_at("1_000 2_000", SourceLevel::Release6);
        let gate_errors: Vec<_> = diags
            .iter()
            .filter(|d| d.code == ErrorCode::E2011)
            .collect();
        assert_eq!(gate_errors.len(), 1, "gate must report exactly once");
        // both literals still carry their digits
        assert_eq!(tokens[0].numeric_text(), Some("1000"));
        assert_eq!(tokens[1].numeric_text(), Some("2000"));
    }

    #[test]
    fn trailing_underscore_is_illegal() {
        let (_tokens, diags, _) = lex("1000_");
        assert!(diags.iter().any(|d| d.code == ErrorCode::E0011));
    }

    #[test]
    fn binary_gate_below_release7() {
        let (_tokens, diags) = lex_at("0b101", SourceLevel::Release6);
        assert!(diags.iter().any(|d| d.code == ErrorCode::E2012));
    }

    #[test]
    fn string_escapes_decode() {
        let (tokens, diags, _) = lex(r#""a\tb\n\\\"\101""#);
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].string_value(), Some("a\tb\n\\\"A"));
    }

    #[test]
    fn char_literals() {
        let (tokens, diags, _) = lex(r"'a' '\n' '\'' '\101'");
        assert!(diags.is_empty());
        for t in &tokens[..4] {
            assert_eq!(t.kind, TokenKind::CharLiteral);
        }
        assert_eq!(tokens[0].numeric_text(), Some("a"));
        assert_eq!(tokens[1].numeric_text(), Some("\n"));
        assert_eq!(tokens[2].numeric_text(), Some("'"));
        assert_eq!(tokens[3].numeric_text(), Some("A"));
    }

    #[test]
    fn empty_char_literal_reports() {
        let (_tokens, diags, _) = lex("''");
        assert!(diags.iter().any(|d| d.code == ErrorCode::E0006));
    }

    #[test]
    fn unterminated_string_reports() {
        let (_tokens, diags, _) = lex("\"abc\nrest");
        assert!(diags.iter().any(|d| d.code == ErrorCode::E0004));
    }

    #[test]
    fn unclosed_comment_reports_once() {
        let (_tokens, diags, _) = lex("/* never closed");
        let unclosed: Vec<_> = diags
            .iter()
            .filter(|d| d.code == ErrorCode::E0008)
            .collect();
        assert_eq!(unclosed.len(), 1);
    }

    #[test]
    fn operators_greedy_longest_match() {
        let (tokens, diags, _) = lex(">>>= >>= >>> >> > -> :: ... ++ +=");
        assert!(diags.is_empty());
        assert_eq!(
            kinds(&tokens)[..10],
            [
                TokenKind::GtGtGtEq,
                TokenKind::GtGtEq,
                TokenKind::GtGtGt,
                TokenKind::GtGt,
                TokenKind::Gt,
                TokenKind::Arrow,
                TokenKind::ColCol,
                TokenKind::Ellipsis,
                TokenKind::PlusPlus,
                TokenKind::PlusEq,
            ]
        );
    }

    #[test]
    fn operator_backs_off_to_registered_spelling() {
        // "<<<" is not an operator: lexes as "<<" then "<"
        let (tokens, diags, _) = lex("<<<");
        assert!(diags.is_empty());
        assert_eq!(
            kinds(&tokens)[..2],
            [TokenKind::LtLt, TokenKind::Lt]
        );
    }

    #[test]
    fn comments_attach_to_next_token() {
        let (tokens, diags, _) = lex("// leading\n/* block */ class");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Class);
        assert_eq!(tokens[0].comments.len(), 2);
        assert_eq!(tokens[0].comments[0].style(), CommentStyle::Line);
        assert_eq!(tokens[0].comments[1].style(), CommentStyle::Block);
    }

    #[test]
    fn doc_comment_deprecated_flag() {
        let (tokens, _, _) = lex("/** @deprecated gone */ class");
        assert_eq!(tokens[0].kind, TokenKind::Class);
        assert!(tokens[0].deprecated_flag());

        let (tokens, _, _) = lex("/* @deprecated */ class");
        assert!(!tokens[0].deprecated_flag());
    }

    #[test]
    fn unicode_escape_in_identifier() {
        // \u0041 is 'A': "\u0041bc" lexes as identifier "Abc"
        let (tokens, diags, names) = lex(r"\u0041bc");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        let spelled = tokens[0].name().map(|n| names.lookup(n).to_owned());
        assert_eq!(spelled.as_deref(), Some("Abc"));
    }

    #[test]
    fn escaped_keyword_is_keyword() {
        // "\u0063lass" spells "class"
        let (tokens, diags, _) = lex(r"\u0063lass");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Class);
    }

    #[test]
    fn malformed_escape_recovers() {
        let (tokens, diags, _) = lex(r"int x = \u00zz;");
        assert!(diags.iter().any(|d| d.code == ErrorCode::E0002));
        // scanning continued to the semicolon
        assert!(kinds(&tokens).contains(&TokenKind::Semi));
    }

    #[test]
    fn illegal_character_recovers() {
        let (tokens, diags, _) = lex("a # b");
        assert!(diags.iter().any(|d| d.code == ErrorCode::E0001));
        assert_eq!(kinds(&tokens).iter().filter(|k| **k == TokenKind::Identifier).count(), 2);
    }

    #[test]
    fn spans_round_trip_source() {
        // Re-rendering every token's raw span reconstructs the input
        // spelling byte-for-byte: fixed-spelling tokens render exactly
        // their spelling, and consecutive spans tile the source with only
        // whitespace and comments between them.
        let source = "class A { int x = 0x1F + 1_0; String s = \"a\\tb\"; }";
        let buffer = SourceBuffer::new(source);
        let mut names = NameTable::new();
        let keywords = Keywords::new(&mut names);
        let mut tokenizer = Tokenizer::new(&buffer, &mut names, &keywords, SourceLevel::LATEST);
        let mut prev_end = 0usize;
        loop {
            let token = tokenizer.read_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            let rendered = &source[token.span.to_range()];
            if let Some(fixed) = token.kind.fixed_text() {
                assert_eq!(rendered, fixed);
            }
            // gaps hold only whitespace and comments
            let gap = &source[prev_end..token.span.start as usize];
            assert!(
                gap.chars().all(char::is_whitespace),
                "unexpected gap {gap:?}"
            );
            prev_end = token.span.end as usize;
        }
        assert_eq!(prev_end, source.len());
    }

    #[test]
    fn escaped_spelling_spans_cover_raw_text() {
        // a unicode-escape spelling keeps its raw span; the decoded form
        // lives only in the token body
        let source = r"\u0063lass";
        let (tokens, diags, _) = lex(source);
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Class);
        assert_eq!(&source[tokens[0].span.to_range()], source);
    }

    #[test]
    fn eof_token_at_source_len() {
        let (tokens, _, _) = lex("x");
        let eof = tokens.last().map(|t| (t.kind, t.span));
        assert_eq!(eof, Some((TokenKind::Eof, Span::new(1, 1))));
    }

    #[test]
    fn eoi_char_as_last_content_is_eof() {
        let (tokens, diags, _) = lex("x\u{1a}");
        assert!(diags.is_empty());
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn crlf_and_ff_are_whitespace() {
        let (tokens, diags, _) = lex("a\r\nb\u{c}c");
        assert!(diags.is_empty());
        assert_eq!(
            kinds(&tokens)[..3],
            [
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier
            ]
        );
    }
}
