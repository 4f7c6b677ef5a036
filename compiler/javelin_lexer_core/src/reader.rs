//! Decoded-character cursor with transparent unicode-escape resolution.
//!
//! The reader presents the source as a sequence of decoded characters: a
//! backslash followed by one or more `u`s and four hex digits arrives as
//! the single character it denotes, and an escaped surrogate pair arrives
//! as one supplementary character. Raw UTF-8 is decoded as-is.
//!
//! Escape decoding is positional: each unit is decoded from its raw bytes
//! exactly once, so a backslash *produced* by an escape can never be
//! re-interpreted as the start of another escape. Callers that must honor
//! the even-number-of-backslashes rule inside literals and comments use
//! [`UnicodeReader::peek_raw`] + [`UnicodeReader::skip_byte`] to step over
//! a doubled backslash without decoding.
//!
//! Problems (malformed escapes, lone surrogates, non-ASCII digits) are
//! recorded as [`ReaderIssue`] values; the reader always leaves a
//! best-effort character so scanning can continue.

use crate::SourceBuffer;

/// What went wrong while decoding.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ReaderIssueKind {
    /// `\u` not followed by four hex digits.
    MalformedEscape,
    /// An escaped surrogate without its partner.
    LoneSurrogate,
    /// A non-ASCII digit inside a numeric literal.
    NonAsciiDigit,
}

/// A recorded decoding problem at a byte offset.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ReaderIssue {
    pub kind: ReaderIssueKind,
    pub pos: u32,
}

/// Sentinel character reported at end of input.
const EOF_CHAR: char = '\0';

/// Decoded-character cursor over a [`SourceBuffer`].
pub struct UnicodeReader<'src> {
    /// Padded buffer; reads past `source_len` yield `0x00`.
    buf: &'src [u8],
    source_len: u32,
    /// Current decoded character ([`EOF_CHAR`] at end of input).
    ch: char,
    /// Byte offset where the current character's raw spelling starts.
    ch_pos: u32,
    /// Byte offset just past the current character's raw spelling.
    next_pos: u32,
    /// Whether the current character came from a unicode escape.
    from_escape: bool,
    /// Per-token staging buffer for accumulated spellings.
    staged: String,
    issues: Vec<ReaderIssue>,
}

impl<'src> UnicodeReader<'src> {
    pub fn new(buffer: &'src SourceBuffer) -> Self {
        let mut reader = UnicodeReader {
            buf: buffer.padded(),
            source_len: buffer.source_len(),
            ch: EOF_CHAR,
            ch_pos: 0,
            next_pos: 0,
            from_escape: false,
            staged: String::with_capacity(128),
            issues: Vec::new(),
        };
        reader.advance();
        reader
    }

    /// The current decoded character. [`EOF_CHAR`] at end of input; use
    /// [`is_eof`](Self::is_eof) to distinguish from an interior NUL.
    #[inline]
    pub fn ch(&self) -> char {
        self.ch
    }

    /// Byte offset where the current character starts in the raw source.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.ch_pos
    }

    /// Byte offset just past the current character's raw spelling.
    #[inline]
    pub fn end_pos(&self) -> u32 {
        self.next_pos
    }

    /// Whether the current character was produced by escape decoding.
    #[inline]
    pub fn from_escape(&self) -> bool {
        self.from_escape
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.ch_pos >= self.source_len
    }

    /// Length of the source content in bytes.
    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_len
    }

    /// The raw byte immediately after the current character, undecoded.
    #[inline]
    pub fn peek_raw(&self) -> u8 {
        self.buf[self.next_pos as usize]
    }

    /// Step over one raw byte without decoding it.
    ///
    /// Used to consume the second backslash of a doubled pair so the
    /// following advance does not see it as a potential escape start.
    #[inline]
    pub fn skip_byte(&mut self) {
        self.next_pos += 1;
    }

    /// Advance to the next decoded character.
    pub fn advance(&mut self) {
        let (ch, start, next, from_escape) = self.decode_unit(self.next_pos);
        self.ch = ch;
        self.ch_pos = start;
        self.next_pos = next;
        self.from_escape = from_escape;
    }

    /// Decode one character starting at `pos`.
    ///
    /// Returns `(char, start, next, from_escape)`.
    fn decode_unit(&mut self, pos: u32) -> (char, u32, u32, bool) {
        if pos >= self.source_len {
            return (EOF_CHAR, self.source_len, self.source_len, false);
        }
        let b = self.buf[pos as usize];
        if b == b'\\' && self.buf[pos as usize + 1] == b'u' {
            return self.decode_escape(pos);
        }
        let (ch, width) = self.decode_raw(pos);
        (ch, pos, pos + width, false)
    }

    /// Decode a raw UTF-8 character at `pos`. The buffer is valid UTF-8,
    /// so the leading byte determines the width.
    fn decode_raw(&self, pos: u32) -> (char, u32) {
        let b = self.buf[pos as usize];
        if b < 0x80 {
            return (b as char, 1);
        }
        let width: u32 = match b {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            _ => 4,
        };
        let slice = &self.buf[pos as usize..(pos + width) as usize];
        #[allow(
            unsafe_code,
            reason = "buffer bytes come verbatim from a &str and pos sits on a character boundary"
        )]
        // SAFETY: the source was a valid &str and decoding proceeds
        // boundary-to-boundary from offset 0.
        let text = unsafe { std::str::from_utf8_unchecked(slice) };
        match text.chars().next() {
            Some(ch) => (ch, width),
            // unreachable for valid UTF-8; keep scanning on the off chance
            None => (char::REPLACEMENT_CHARACTER, 1),
        }
    }

    /// Decode `\u+XXXX` starting at the backslash. On a malformed escape,
    /// records an issue and yields the offending character undecoded.
    fn decode_escape(&mut self, pos: u32) -> (char, u32, u32, bool) {
        // Skip the backslash and every 'u' marker.
        let mut p = pos + 1;
        while self.buf[p as usize] == b'u' {
            p += 1;
        }

        let mut code: u32 = 0;
        for i in 0..4 {
            let at = p + i;
            let digit = if at < self.source_len {
                (self.buf[at as usize] as char).to_digit(16)
            } else {
                None
            };
            match digit {
                Some(d) => code = (code << 4) + d,
                None => {
                    self.issues.push(ReaderIssue {
                        kind: ReaderIssueKind::MalformedEscape,
                        pos: at.min(self.source_len),
                    });
                    // Best effort: resume at the offending character.
                    let resume = at.min(self.source_len);
                    if resume >= self.source_len {
                        return (EOF_CHAR, self.source_len, self.source_len, false);
                    }
                    let (ch, width) = self.decode_raw(resume);
                    return (ch, pos, resume + width, false);
                }
            }
        }
        let after = p + 4;

        if (0xD800..0xDC00).contains(&code) {
            // High surrogate: absorb an immediately following low surrogate
            // (necessarily another escape; raw UTF-8 cannot spell one).
            if after < self.source_len
                && self.buf[after as usize] == b'\\'
                && self.buf[after as usize + 1] == b'u'
            {
                if let Some((low, low_next)) = Self::escape_value(self.buf, after, self.source_len)
                {
                    if (0xDC00..0xE000).contains(&low) {
                        let scalar = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                        if let Some(ch) = char::from_u32(scalar) {
                            return (ch, pos, low_next, true);
                        }
                    }
                }
            }
            self.issues.push(ReaderIssue {
                kind: ReaderIssueKind::LoneSurrogate,
                pos,
            });
            return (char::REPLACEMENT_CHARACTER, pos, after, true);
        }
        if (0xDC00..0xE000).contains(&code) {
            self.issues.push(ReaderIssue {
                kind: ReaderIssueKind::LoneSurrogate,
                pos,
            });
            return (char::REPLACEMENT_CHARACTER, pos, after, true);
        }

        match char::from_u32(code) {
            Some(ch) => (ch, pos, after, true),
            None => (char::REPLACEMENT_CHARACTER, pos, after, true),
        }
    }

    /// Raw value and end offset of a well-formed `\u+XXXX` escape at `pos`,
    /// or `None` if the escape is malformed or truncated.
    fn escape_value(buf: &[u8], pos: u32, source_len: u32) -> Option<(u32, u32)> {
        let mut p = pos + 1;
        while buf[p as usize] == b'u' {
            p += 1;
        }
        let mut code: u32 = 0;
        for i in 0..4 {
            let at = p + i;
            if at >= source_len {
                return None;
            }
            code = (code << 4) + (buf[at as usize] as char).to_digit(16)?;
        }
        Some((code, p + 4))
    }

    // ── Staging buffer ──────────────────────────────────────────────────

    /// Clear the staging buffer (called at the start of each token).
    #[inline]
    pub fn reset_staged(&mut self) {
        self.staged.clear();
    }

    /// Append a character to the staging buffer.
    #[inline]
    pub fn stage(&mut self, ch: char) {
        self.staged.push(ch);
    }

    /// Append the current character to the staging buffer.
    #[inline]
    pub fn stage_current(&mut self) {
        self.staged.push(self.ch);
    }

    /// Append the current character and advance.
    #[inline]
    pub fn stage_current_and_advance(&mut self) {
        self.staged.push(self.ch);
        self.advance();
    }

    /// The accumulated spelling for the current token.
    #[inline]
    pub fn staged(&self) -> &str {
        &self.staged
    }

    #[inline]
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Roll the staging buffer back to an earlier length (error paths that
    /// un-consume a partial suffix).
    #[inline]
    pub fn truncate_staged(&mut self, len: usize) {
        self.staged.truncate(len);
    }

    // ── Digits ──────────────────────────────────────────────────────────

    /// Value of the current character as a digit in `radix`, or `None`.
    ///
    /// A non-ASCII decimal digit records an issue and substitutes `'0'`
    /// for the current character so the literal keeps scanning.
    pub fn digit(&mut self, radix: u32) -> Option<u32> {
        if self.ch.is_ascii() {
            return self.ch.to_digit(radix);
        }
        if self.ch.is_numeric() {
            self.issues.push(ReaderIssue {
                kind: ReaderIssueKind::NonAsciiDigit,
                pos: self.ch_pos,
            });
            self.ch = '0';
            return Some(0);
        }
        None
    }

    // ── Issues & raw access ─────────────────────────────────────────────

    /// Drain the issues recorded since the last call.
    pub fn take_issues(&mut self) -> Vec<ReaderIssue> {
        std::mem::take(&mut self.issues)
    }

    /// Raw source slice (escape spellings untouched).
    #[allow(
        unsafe_code,
        reason = "buffer content comes verbatim from a &str; offsets from the reader sit on character boundaries"
    )]
    pub fn raw_slice(&self, start: u32, end: u32) -> &'src str {
        debug_assert!(start <= end && end <= self.source_len);
        // SAFETY: see decode_raw.
        unsafe { std::str::from_utf8_unchecked(&self.buf[start as usize..end as usize]) }
    }

    /// Position of the next `\n` at or after `pos`, or the end of input.
    /// Used by the line-comment scanner.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offsets within the source fit in u32 by construction"
    )]
    pub fn find_line_end(&self, pos: u32) -> u32 {
        let hay = &self.buf[pos as usize..self.source_len as usize];
        match memchr::memchr2(b'\n', b'\r', hay) {
            Some(off) => pos + off as u32,
            None => self.source_len,
        }
    }
}
