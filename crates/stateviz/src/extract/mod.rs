//! State machine extraction
//!
//! Recognizes `StateMachine.create { ... }` builders in a syntax tree and
//! turns each one into a [`StateMachine`]. Extraction is permissive:
//! host code around and inside the builder is skipped. The only fatal
//! conditions are a `create` call without a lambda body and nesting
//! beyond [`ExtractConfig::max_depth`].

mod evaluator;
mod matcher;

use tracing::{debug, span, Level};

use crate::core::{StateMachine, StatevizError, SyntaxNode};

/// Default limit on nesting during extraction, equal to the parser's
pub const DEFAULT_EXTRACT_DEPTH: usize = crate::plugins::kotlin::DEFAULT_MAX_DEPTH;

/// Extraction settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Deepest nesting of lambdas, bracket groups and call arguments
    /// visited before giving up
    pub max_depth: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_EXTRACT_DEPTH,
        }
    }
}

/// Finds and evaluates every state machine builder in a syntax tree
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extract every machine under `root`, innermost first
    pub fn extract(&self, root: &SyntaxNode) -> Result<Vec<StateMachine>, StatevizError> {
        let extract_span = span!(
            Level::INFO,
            "extract",
            max_depth = self.config.max_depth,
            node_count = root.node_count()
        );
        let _enter = extract_span.enter();

        let mut machines = Vec::new();
        matcher::visit(root, 0, &self.config, &mut machines)?;
        debug!(machine_count = machines.len(), "Extraction completed");

        Ok(machines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SourceParser, Statement};
    use crate::plugins::kotlin::KotlinParser;

    fn parse(source: &str) -> SyntaxNode {
        KotlinParser::new().parse(source, "main.kt").unwrap()
    }

    #[test]
    fn test_default_config() {
        assert_eq!(Extractor::new().config().max_depth, DEFAULT_EXTRACT_DEPTH);
    }

    #[test]
    fn test_extracts_two_machines() {
        let root = parse(
            "val a = StateMachine.create { state(\"A\") { } }\nval b = StateMachine.create { state(\"B\") { } }",
        );
        let machines = Extractor::new().extract(&root).unwrap();
        assert_eq!(machines.len(), 2);
        assert!(machines[0].state("A").is_some());
        assert!(machines[1].state("B").is_some());
    }

    #[test]
    fn test_source_without_dsl() {
        let root = parse("fun main() {\n  println(\"hello\")\n}");
        assert!(Extractor::new().extract(&root).unwrap().is_empty());
    }

    #[test]
    fn test_statement_order_is_source_order() {
        let root = parse(
            "StateMachine.create {\n  state(\"B\") { }\n  initialState(\"A\")\n  state(\"A\") { }\n}",
        );
        let machine = Extractor::new().extract(&root).unwrap().remove(0);
        assert!(matches!(machine.statements()[0], Statement::State(ref s) if s.name == "B"));
        assert!(matches!(machine.statements()[1], Statement::InitialState { .. }));
    }

    #[test]
    fn test_depth_limit() {
        let root = parse("StateMachine.create { state(\"A\") { } }");
        let extractor = Extractor::with_config(ExtractConfig { max_depth: 1 });
        let error = extractor.extract(&root).unwrap_err();
        assert!(matches!(error, StatevizError::NestingTooDeep { limit: 1 }));
    }

    #[test]
    fn test_parser_accepted_nesting_extracts_at_default_limit() {
        let source = format!(
            "val m = StateMachine.create {{ state(\"A\") {{ }} }}\nval x = {}1{}",
            "f(".repeat(200),
            ")".repeat(200)
        );
        let root = parse(&source);
        let machines = Extractor::new().extract(&root).unwrap();
        assert_eq!(machines.len(), 1);
    }

    #[test]
    fn test_parser_limit_bounds_extraction_limit() {
        const LIMIT: usize = 24;
        let shapes: [(&str, &str); 5] = [
            ("f(", ")"),
            ("(", ")"),
            ("run { ", " }"),
            ("a.b[", "]"),
            ("g(x, { y -> ", " })"),
        ];
        for (open, close) in shapes {
            for nesting in 0..=LIMIT {
                let source = format!(
                    "StateMachine.create {{ state(\"A\") {{ }} }}\nval x = {}1{}",
                    open.repeat(nesting),
                    close.repeat(nesting)
                );
                let Ok(root) = KotlinParser::with_max_depth(LIMIT).parse(&source, "main.kt") else {
                    continue;
                };
                let extractor = Extractor::with_config(ExtractConfig { max_depth: LIMIT });
                assert!(
                    extractor.extract(&root).is_ok(),
                    "nesting {} of {:?} parsed but failed to extract",
                    nesting,
                    open
                );
            }
        }
    }
}
