//! Source comments.
//!
//! Comments never become tokens; the tokenizer attaches each completed
//! comment to the next token it emits. Documentation comments additionally
//! answer whether they carry a deprecated tag -- computed lazily on first
//! query and memoized, since most doc comments are never asked.

use crate::Span;
use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The three comment shapes of the language.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CommentStyle {
    /// `// ...` to the end of the line.
    Line,
    /// `/* ... */`.
    Block,
    /// `/** ... */` -- a documentation comment.
    Doc,
}

/// A scanned comment: style, raw span, and the raw text (delimiters
/// included, escapes untranslated).
#[derive(Clone)]
pub struct Comment {
    style: CommentStyle,
    span: Span,
    text: Box<str>,
    /// Memoized result of the deprecated-tag scan.
    deprecated: OnceCell<bool>,
}

impl Comment {
    pub fn new(style: CommentStyle, span: Span, text: impl Into<Box<str>>) -> Self {
        Comment {
            style,
            span,
            text: text.into(),
            deprecated: OnceCell::new(),
        }
    }

    #[inline]
    pub fn style(&self) -> CommentStyle {
        self.style
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Raw comment text, delimiters included.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this comment carries a deprecated tag.
    ///
    /// Only doc comments are scanned; the scan runs once and the result is
    /// cached for subsequent queries.
    pub fn is_deprecated(&self) -> bool {
        if self.style != CommentStyle::Doc {
            return false;
        }
        *self
            .deprecated
            .get_or_init(|| deprecated_tag_present(&self.text))
    }
}

impl PartialEq for Comment {
    fn eq(&self, other: &Self) -> bool {
        // The memoized flag is derived state, not identity.
        self.style == other.style && self.span == other.span && self.text == other.text
    }
}

impl Eq for Comment {}

impl Hash for Comment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.style.hash(state);
        self.span.hash(state);
        self.text.hash(state);
    }
}

impl fmt::Debug for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} comment @ {}", self.style, self.span)
    }
}

/// Scan documentation-comment text for a `@deprecated` tag.
///
/// The tag counts only when it appears first on a line, after the line's
/// leading whitespace and decorative asterisk run have been stripped, and
/// is followed by whitespace or the end of the comment. Pure function; the
/// caller memoizes.
fn deprecated_tag_present(text: &str) -> bool {
    // Strip the opening `/**` and closing `*/` if present.
    let body = text.strip_prefix("/**").unwrap_or(text);
    let body = body.strip_suffix("*/").unwrap_or(body);

    for line in body.lines() {
        let mut rest = line.trim_start_matches([' ', '\t', '\u{c}']);
        rest = rest.trim_start_matches('*');
        rest = rest.trim_start_matches([' ', '\t', '\u{c}']);
        if let Some(after) = rest.strip_prefix("@deprecated") {
            match after.chars().next() {
                None => return true,
                Some(c) if c.is_whitespace() => return true,
                // `@deprecatedFoo` is some other tag
                Some(_) => {}
            }
        }
    }
    false
}
