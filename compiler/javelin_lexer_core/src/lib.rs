//! Low-level source handling for the Javelin lexer.
//!
//! Two layers live here, both free of any `javelin_*` dependency:
//!
//! - [`SourceBuffer`]: the source bytes with a sentinel and cache-line
//!   padding, so scanning loops need no bounds checks.
//! - [`UnicodeReader`]: a decoded-character cursor over the buffer that
//!   resolves `\uXXXX` escapes transparently, absorbs surrogate pairs, and
//!   maintains the per-token staging buffer.
//!
//! The tokenizer in `javelin_lexer` drives the reader; nothing in this
//! crate knows about tokens or diagnostics -- problems surface as
//! [`ReaderIssue`] values for the caller to convert.

mod reader;
mod source_buffer;

pub use reader::{ReaderIssue, ReaderIssueKind, UnicodeReader};
pub use source_buffer::SourceBuffer;
