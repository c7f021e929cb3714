//! `StateMachine.create` matcher
//!
//! Walks the whole syntax tree. Children are visited before the node
//! itself, so nested machines are emitted before the machine that
//! encloses them.
//!
//! Depth counts lambdas, bracket groups and call arguments, the same
//! constructs the Kotlin parser counts against its own limit. A tree the
//! parser accepts under a limit therefore never trips the same limit here.

use tracing::{debug, trace};

use super::evaluator::{check_depth, evaluate_statements};
use super::ExtractConfig;
use crate::core::{StateMachine, StatevizError, SyntaxKind, SyntaxNode};

type Result<T, E = StatevizError> = std::result::Result<T, E>;

const RECEIVER: &str = "StateMachine";
const SELECTOR: &str = "create";

/// Collect every machine under `node` into `machines`
pub(crate) fn visit(
    node: &SyntaxNode,
    depth: usize,
    config: &ExtractConfig,
    machines: &mut Vec<StateMachine>,
) -> Result<()> {
    check_depth(depth, config)?;

    for child in node.children() {
        let child_depth = if opens_level(child) { depth + 1 } else { depth };
        visit(child, child_depth, config, machines)?;
    }

    let Some(create) = match_create(node) else {
        return Ok(());
    };

    let body = create_body(create).ok_or_else(|| {
        StatevizError::malformed_dsl(
            "expected lambda argument to StateMachine.create".to_string(),
            node.location.line,
            node.location.column,
        )
    })?;

    trace!(
        line = node.location.line,
        statements = body.statements().len(),
        "Matched StateMachine.create"
    );
    let statements = evaluate_statements(body.statements(), depth + 1, config)?;
    debug!(
        line = node.location.line,
        statement_count = statements.len(),
        "Extracted state machine"
    );
    machines.push(StateMachine::new(statements));

    Ok(())
}

/// Whether `node` adds a nesting level
fn opens_level(node: &SyntaxNode) -> bool {
    matches!(
        node.kind,
        SyntaxKind::Lambda { .. } | SyntaxKind::Group { .. } | SyntaxKind::ValueArgument { .. }
    )
}

/// The `create(...)` call of a `StateMachine.create` member access
fn match_create(node: &SyntaxNode) -> Option<&SyntaxNode> {
    let SyntaxKind::MemberAccess {
        receiver, selector, ..
    } = &node.kind
    else {
        return None;
    };
    if !receiver.has_name(RECEIVER) {
        return None;
    }
    match &selector.kind {
        SyntaxKind::Call { callee, .. } if callee.has_name(SELECTOR) => Some(selector),
        _ => None,
    }
}

/// Body block of the lambda passed to `create`
fn create_body(create: &SyntaxNode) -> Option<&SyntaxNode> {
    let SyntaxKind::Call {
        value_arguments,
        lambda,
        ..
    } = &create.kind
    else {
        return None;
    };
    lambda
        .as_deref()
        .or_else(|| {
            value_arguments
                .last()
                .map(SyntaxNode::argument_expression)
                .filter(|node| matches!(node.kind, SyntaxKind::Lambda { .. }))
        })
        .and_then(SyntaxNode::lambda_body)
}
