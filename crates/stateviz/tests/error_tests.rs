//! Tests for core error types

use stateviz::core::StatevizError;
use stateviz::extract::{ExtractConfig, Extractor};
use stateviz::plugins::kotlin::KotlinParser;
use stateviz::SourceParser;

#[test]
fn test_parse_error() {
    let error = StatevizError::parse_error("Invalid token".to_string(), 5, 10);
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Parse error"));
    assert!(error_msg.contains("Invalid token"));
    assert!(error_msg.contains("line 5"));
    assert!(error_msg.contains("column 10"));
}

#[test]
fn test_malformed_dsl_location() {
    let source = "class A {\n    val sm = StateMachine.create<S, E, F>()\n}";
    let tree = KotlinParser::new().parse(source, "A.kt").unwrap();
    let error = Extractor::new().extract(&tree).unwrap_err();
    assert_eq!(
        error.to_string(),
        "Malformed state machine DSL: expected lambda argument to StateMachine.create at line 2, column 14"
    );
}

#[test]
fn test_nesting_too_deep_from_parser() {
    let source = format!("val x = {}1{}", "(".repeat(100), ")".repeat(100));
    let error = KotlinParser::with_max_depth(64)
        .parse(&source, "main.kt")
        .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<StatevizError>(),
        Some(StatevizError::NestingTooDeep { limit: 64 })
    ));
}

#[test]
fn test_nesting_too_deep_from_extractor() {
    let source = format!("val x = {}1{}", "f(".repeat(40), ")".repeat(40));
    let tree = KotlinParser::new().parse(&source, "main.kt").unwrap();
    let extractor = Extractor::with_config(ExtractConfig { max_depth: 16 });
    let error = extractor.extract(&tree).unwrap_err();
    assert_eq!(
        error.to_string(),
        "Nesting too deep: exceeded the limit of 16 levels"
    );
}
