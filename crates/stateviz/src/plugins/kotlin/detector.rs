//! State machine DSL detector
//!
//! Cheap textual pre-check for `StateMachine.create` builders, run before
//! the full Kotlin parse.

use crate::core::Detector;

/// Detector for the `StateMachine.create { ... }` builder DSL
pub struct DslDetector;

impl DslDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DslDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for DslDetector {
    fn detect(&self, input: &str) -> bool {
        self.confidence(input) > 0.5
    }

    fn confidence(&self, input: &str) -> f64 {
        if input.contains("StateMachine.create") {
            return 1.0;
        }

        let has_receiver = input.contains("StateMachine");
        let has_create = input.contains("create");
        let has_builder_calls = input.contains("initialState") || input.contains("transitionTo");

        // Receiver and selector split across lines
        if has_receiver && has_create {
            return 0.8;
        }

        if has_builder_calls {
            return 0.3;
        }

        0.0
    }

    fn dsl_name(&self) -> &'static str {
        "StateMachine.create"
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec![
            "StateMachine.create",
            "initialState",
            "state",
            "on",
            "transitionTo",
            "dontTransition",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_create_call() {
        let detector = DslDetector::new();
        assert!(detector.detect("val sm = StateMachine.create<S, E, F> { }"));
        assert_eq!(detector.confidence("StateMachine.create { }"), 1.0);
    }

    #[test]
    fn test_detects_split_member_access() {
        let detector = DslDetector::new();
        assert!(detector.detect("StateMachine\n    .create {\n}"));
    }

    #[test]
    fn test_builder_calls_alone_are_not_enough() {
        let detector = DslDetector::new();
        assert!(!detector.detect("initialState(\"A\")\ntransitionTo(B)"));
        assert!(detector.confidence("transitionTo(B)") > 0.0);
    }

    #[test]
    fn test_rejects_unrelated_source() {
        let detector = DslDetector::new();
        assert!(!detector.detect("fun main() { println(\"hi\") }"));
        assert_eq!(detector.confidence(""), 0.0);
    }
}
