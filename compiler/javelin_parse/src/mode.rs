//! Parser term modes.
//!
//! When a term is parsed, the mode determines which sub-grammars are legal
//! at that point: an expression, a type, a type with no parameters, or a
//! type argument. The mode is saved before and restored after every
//! recursive descent into a sub-term, so a failed alternative never leaks
//! mode state into a sibling parse -- all mutation goes through
//! [`crate::Parser::with_mode`], which restores on every exit path.

use bitflags::bitflags;

bitflags! {
    /// Which interpretations the current term position admits.
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
    pub struct Mode: u8 {
        /// An expression is expected.
        const EXPR = 0x1;
        /// A type is expected.
        const TYPE = 0x2;
        /// No type parameters allowed for the type.
        const NO_PARAMS = 0x4;
        /// Parsing a type argument (wildcards legal).
        const TYPE_ARG = 0x8;
        /// An empty type-argument list (diamond) was just parsed.
        const DIAMOND = 0x10;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_compose_and_test() {
        let m = Mode::EXPR | Mode::TYPE;
        assert!(m.contains(Mode::EXPR));
        assert!(m.contains(Mode::TYPE));
        assert!(!m.contains(Mode::TYPE_ARG));
    }

    #[test]
    fn type_arg_mask() {
        let m = Mode::TYPE | Mode::TYPE_ARG;
        assert_eq!(m & (Mode::TYPE_ARG | Mode::NO_PARAMS), Mode::TYPE_ARG);
    }
}
