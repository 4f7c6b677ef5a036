//! Feature gates derived from the configured language level.
//!
//! Each grammar extension has one gate. The first use below the configured
//! level reports one diagnostic; the gate then flips on for the rest of the
//! parse, so a file full of lambdas at release 7 produces one lambda
//! diagnostic, not hundreds.

use javelin_diagnostic::ErrorCode;
use javelin_ir::SourceLevel;

/// Gated grammar extensions.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Feature {
    Generics,
    Enums,
    Varargs,
    Foreach,
    StaticImport,
    Annotations,
    Diamond,
    TryWithResources,
    MultiCatch,
    Lambdas,
    MethodReferences,
    DefaultMethods,
    StaticInterfaceMethods,
    IntersectionCasts,
    TypeAnnotations,
    ReceiverParams,
}

impl Feature {
    pub fn code(self) -> ErrorCode {
        match self {
            Feature::Generics => ErrorCode::E2001,
            Feature::Enums => ErrorCode::E2002,
            Feature::Varargs => ErrorCode::E2003,
            Feature::Foreach => ErrorCode::E2004,
            Feature::StaticImport => ErrorCode::E2005,
            Feature::Annotations => ErrorCode::E2006,
            Feature::Diamond => ErrorCode::E2008,
            Feature::TryWithResources => ErrorCode::E2009,
            Feature::MultiCatch => ErrorCode::E2010,
            Feature::Lambdas => ErrorCode::E2013,
            Feature::MethodReferences => ErrorCode::E2014,
            Feature::DefaultMethods => ErrorCode::E2015,
            Feature::StaticInterfaceMethods => ErrorCode::E2016,
            Feature::IntersectionCasts => ErrorCode::E2017,
            Feature::TypeAnnotations => ErrorCode::E2018,
            Feature::ReceiverParams => ErrorCode::E2019,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Feature::Generics => "generics",
            Feature::Enums => "enums",
            Feature::Varargs => "variable-arity methods",
            Feature::Foreach => "enhanced for loops",
            Feature::StaticImport => "static imports",
            Feature::Annotations => "annotations",
            Feature::Diamond => "the diamond operator",
            Feature::TryWithResources => "try-with-resources",
            Feature::MultiCatch => "multi-catch",
            Feature::Lambdas => "lambda expressions",
            Feature::MethodReferences => "method references",
            Feature::DefaultMethods => "default methods",
            Feature::StaticInterfaceMethods => "static interface methods",
            Feature::IntersectionCasts => "intersection types in cast",
            Feature::TypeAnnotations => "type annotations",
            Feature::ReceiverParams => "receiver parameters",
        }
    }
}

/// Mutable gate state: seeded from the level, flipped on first report.
pub struct FeatureGates {
    level: SourceLevel,
    enabled: [bool; 16],
}

impl FeatureGates {
    pub fn new(level: SourceLevel) -> Self {
        let mut gates = FeatureGates {
            level,
            enabled: [false; 16],
        };
        for feature in ALL_FEATURES {
            gates.enabled[feature as usize] = match feature {
                Feature::Generics => level.allows_generics(),
                Feature::Enums => level.allows_enums(),
                Feature::Varargs => level.allows_varargs(),
                Feature::Foreach => level.allows_foreach(),
                Feature::StaticImport => level.allows_static_import(),
                Feature::Annotations => level.allows_annotations(),
                Feature::Diamond => level.allows_diamond(),
                Feature::TryWithResources => level.allows_try_with_resources(),
                Feature::MultiCatch => level.allows_multi_catch(),
                Feature::Lambdas => level.allows_lambdas(),
                Feature::MethodReferences => level.allows_method_references(),
                Feature::DefaultMethods => level.allows_default_methods(),
                Feature::StaticInterfaceMethods => level.allows_static_interface_methods(),
                Feature::IntersectionCasts => level.allows_intersection_casts(),
                Feature::TypeAnnotations => level.allows_type_annotations(),
                Feature::ReceiverParams => level.allows_receiver_params(),
            };
        }
        gates
    }

    pub fn level(&self) -> SourceLevel {
        self.level
    }

    /// Whether a feature is currently admitted (configured or already
    /// reported once).
    pub fn enabled(&self, feature: Feature) -> bool {
        self.enabled[feature as usize]
    }

    /// Flip a gate on after its diagnostic was reported.
    pub fn enable(&mut self, feature: Feature) {
        self.enabled[feature as usize] = true;
    }
}

const ALL_FEATURES: [Feature; 16] = [
    Feature::Generics,
    Feature::Enums,
    Feature::Varargs,
    Feature::Foreach,
    Feature::StaticImport,
    Feature::Annotations,
    Feature::Diamond,
    Feature::TryWithResources,
    Feature::MultiCatch,
    Feature::Lambdas,
    Feature::MethodReferences,
    Feature::DefaultMethods,
    Feature::StaticInterfaceMethods,
    Feature::IntersectionCasts,
    Feature::TypeAnnotations,
    Feature::ReceiverParams,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_level_enables_everything() {
        let gates = FeatureGates::new(SourceLevel::LATEST);
        for f in ALL_FEATURES {
            assert!(gates.enabled(f), "{f:?}");
        }
    }

    #[test]
    fn release7_splits_the_gate_set() {
        let gates = FeatureGates::new(SourceLevel::Release7);
        assert!(gates.enabled(Feature::Generics));
        assert!(gates.enabled(Feature::Diamond));
        assert!(!gates.enabled(Feature::Lambdas));
        assert!(!gates.enabled(Feature::MethodReferences));
    }

    #[test]
    fn enable_flips_once() {
        let mut gates = FeatureGates::new(SourceLevel::Release4);
        assert!(!gates.enabled(Feature::Generics));
        gates.enable(Feature::Generics);
        assert!(gates.enabled(Feature::Generics));
    }
}
