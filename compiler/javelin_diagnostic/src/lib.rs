//! Diagnostics for the Javelin front end.
//!
//! The lexer and parser never format or print anything themselves: they
//! build [`Diagnostic`] values (stable code, message, primary span) and hand
//! them to a [`DiagnosticSink`]. Presentation -- formatting, localization,
//! terminal rendering -- belongs to whatever sits behind the sink.
//!
//! [`LineMap`] translates byte offsets to line/column pairs for sinks that
//! want positional output; it is built from the raw source buffer and is
//! not consulted by the front end itself.

mod diagnostic;
mod error_code;
mod line_map;
mod sink;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use line_map::LineMap;
pub use sink::{CollectingSink, DiagnosticSink};
