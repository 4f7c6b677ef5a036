//! Language levels and the grammar extensions they admit.
//!
//! Each release since 1.4 added syntax; the lexer and parser consult these
//! predicates to decide whether a construct is admissible at the configured
//! level. First use below the configured level reports one diagnostic and
//! then proceeds as if allowed -- the gate check lives in the consumers, the
//! facts live here.

/// A configured minimum language release.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub enum SourceLevel {
    Release4,
    Release5,
    Release6,
    Release7,
    Release8,
}

impl SourceLevel {
    /// The newest release this front end understands.
    pub const LATEST: SourceLevel = SourceLevel::Release8;

    /// Release name as spelled in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            SourceLevel::Release4 => "1.4",
            SourceLevel::Release5 => "5",
            SourceLevel::Release6 => "6",
            SourceLevel::Release7 => "7",
            SourceLevel::Release8 => "8",
        }
    }

    // Release 5
    pub fn allows_generics(self) -> bool {
        self >= SourceLevel::Release5
    }
    pub fn allows_enums(self) -> bool {
        self >= SourceLevel::Release5
    }
    pub fn allows_varargs(self) -> bool {
        self >= SourceLevel::Release5
    }
    pub fn allows_foreach(self) -> bool {
        self >= SourceLevel::Release5
    }
    pub fn allows_static_import(self) -> bool {
        self >= SourceLevel::Release5
    }
    pub fn allows_annotations(self) -> bool {
        self >= SourceLevel::Release5
    }
    pub fn allows_hex_floats(self) -> bool {
        self >= SourceLevel::Release5
    }

    // Release 7
    pub fn allows_diamond(self) -> bool {
        self >= SourceLevel::Release7
    }
    pub fn allows_try_with_resources(self) -> bool {
        self >= SourceLevel::Release7
    }
    pub fn allows_multi_catch(self) -> bool {
        self >= SourceLevel::Release7
    }
    pub fn allows_underscores_in_literals(self) -> bool {
        self >= SourceLevel::Release7
    }
    pub fn allows_binary_literals(self) -> bool {
        self >= SourceLevel::Release7
    }

    // Release 8
    pub fn allows_lambdas(self) -> bool {
        self >= SourceLevel::Release8
    }
    pub fn allows_method_references(self) -> bool {
        self >= SourceLevel::Release8
    }
    pub fn allows_default_methods(self) -> bool {
        self >= SourceLevel::Release8
    }
    pub fn allows_static_interface_methods(self) -> bool {
        self >= SourceLevel::Release8
    }
    pub fn allows_intersection_casts(self) -> bool {
        self >= SourceLevel::Release8
    }
    pub fn allows_type_annotations(self) -> bool {
        self >= SourceLevel::Release8
    }
    pub fn allows_receiver_params(self) -> bool {
        self >= SourceLevel::Release8
    }
}

impl Default for SourceLevel {
    fn default() -> Self {
        SourceLevel::LATEST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(SourceLevel::Release4 < SourceLevel::Release5);
        assert!(SourceLevel::Release7 < SourceLevel::Release8);
    }

    #[test]
    fn release5_gates() {
        assert!(!SourceLevel::Release4.allows_generics());
        assert!(SourceLevel::Release5.allows_generics());
        assert!(SourceLevel::Release5.allows_enums());
        assert!(!SourceLevel::Release5.allows_diamond());
    }

    #[test]
    fn release7_gates() {
        assert!(!SourceLevel::Release6.allows_underscores_in_literals());
        assert!(SourceLevel::Release7.allows_underscores_in_literals());
        assert!(SourceLevel::Release7.allows_binary_literals());
        assert!(SourceLevel::Release7.allows_multi_catch());
        assert!(!SourceLevel::Release7.allows_lambdas());
    }

    #[test]
    fn release8_gates() {
        assert!(SourceLevel::Release8.allows_lambdas());
        assert!(SourceLevel::Release8.allows_method_references());
        assert!(SourceLevel::Release8.allows_type_annotations());
    }

    #[test]
    fn latest_allows_everything() {
        let l = SourceLevel::LATEST;
        assert!(l.allows_generics() && l.allows_lambdas() && l.allows_diamond());
    }
}
