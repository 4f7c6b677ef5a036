//! Lexer for the Javelin front end.
//!
//! [`Tokenizer`] turns decoded characters into tokens, one per call.
//! [`Scanner`] wraps it with current/previous token access, arbitrary
//! positive-k lookahead, and the token-splitting operation the parser
//! needs when nested type-argument lists close.
//!
//! Reserved words and operators live in one [`Keywords`] table keyed by
//! interned names: the tokenizer interns every identifier spelling and
//! asks the table whether the resulting handle is reserved.

mod keywords;
mod scanner;
mod tokenizer;

pub use keywords::Keywords;
pub use scanner::Scanner;
pub use tokenizer::Tokenizer;

use javelin_ir::{NameTable, SourceLevel};
use javelin_lexer_core::SourceBuffer;

/// Convenience constructor: build a scanner over `source` with a fresh
/// keyword table registered in `names`.
pub fn scan<'src, 'sess>(
    buffer: &'src SourceBuffer,
    names: &'sess mut NameTable,
    keywords: &'sess Keywords,
    level: SourceLevel,
) -> Scanner<'src, 'sess> {
    Scanner::new(Tokenizer::new(buffer, names, keywords, level))
}
