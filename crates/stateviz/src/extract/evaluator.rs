//! Builder statement evaluators
//!
//! Three nested interpreters, one per DSL level: the statements of a
//! `create` body, the body of a `state` declaration and the body of an
//! `on` handler. Anything that does not match a known builder call is
//! skipped; none of these functions fails on unrecognized input.

use tracing::{debug, trace};

use super::ExtractConfig;
use crate::core::{State, Statement, StatevizError, SyntaxKind, SyntaxNode, Transition};

type Result<T, E = StatevizError> = std::result::Result<T, E>;

/// The pieces of a call expression the evaluators look at
struct CallView<'a> {
    name: &'a str,
    type_arguments: &'a [SyntaxNode],
    value_arguments: &'a [SyntaxNode],
    lambda: Option<&'a SyntaxNode>,
}

impl<'a> CallView<'a> {
    /// View a statement as a call to a plain identifier
    fn of(node: &'a SyntaxNode) -> Option<Self> {
        match &node.kind {
            SyntaxKind::Call {
                callee,
                type_arguments,
                value_arguments,
                lambda,
            } => Some(Self {
                name: callee.identifier_name()?,
                type_arguments,
                value_arguments,
                lambda: lambda.as_deref(),
            }),
            _ => None,
        }
    }

    /// Expression of the value argument at `index`
    fn argument(&self, index: usize) -> Option<&'a SyntaxNode> {
        self.value_arguments
            .get(index)
            .map(SyntaxNode::argument_expression)
    }

    /// Text of the first type argument, used verbatim as a name
    fn type_name(&self) -> Option<&'a str> {
        self.type_arguments.first().map(|node| node.text.as_str())
    }

    /// Statements block of the trailing lambda, or of the last lambda
    /// passed as a value argument
    fn body(&self) -> Option<&'a SyntaxNode> {
        self.lambda
            .or_else(|| {
                self.value_arguments
                    .iter()
                    .rev()
                    .map(SyntaxNode::argument_expression)
                    .find(|node| matches!(node.kind, SyntaxKind::Lambda { .. }))
            })
            .and_then(SyntaxNode::lambda_body)
    }
}

pub(crate) fn check_depth(depth: usize, config: &ExtractConfig) -> Result<()> {
    if depth > config.max_depth {
        return Err(StatevizError::nesting_too_deep(config.max_depth));
    }
    Ok(())
}

/// Interpret the top-level statements of a `create` body
pub(crate) fn evaluate_statements(
    body: &[SyntaxNode],
    depth: usize,
    config: &ExtractConfig,
) -> Result<Vec<Statement>> {
    check_depth(depth, config)?;
    let mut statements = Vec::new();

    for call in body.iter().filter_map(CallView::of) {
        match call.name {
            "initialState" => match call.argument(0) {
                Some(argument) => statements.push(Statement::InitialState {
                    state: argument.unquote(),
                }),
                None => debug!("Skipping initialState without an argument"),
            },
            "state" => {
                if let Some(state) = evaluate_state(&call, depth + 1, config)? {
                    statements.push(Statement::State(state));
                }
            }
            other => trace!(call = other, "Ignoring builder call"),
        }
    }

    Ok(statements)
}

/// Interpret one `state` declaration
fn evaluate_state(
    call: &CallView<'_>,
    depth: usize,
    config: &ExtractConfig,
) -> Result<Option<State>> {
    check_depth(depth, config)?;

    let name = call
        .type_name()
        .map(str::to_string)
        .or_else(|| call.argument(0).map(SyntaxNode::unquote));
    let Some(name) = name else {
        debug!("Skipping state without a name");
        return Ok(None);
    };

    let mut state = State::new(name);
    let Some(body) = call.body() else {
        return Ok(Some(state));
    };

    for inner in body.statements().iter().filter_map(CallView::of) {
        match inner.name {
            "on" => {
                let event = inner
                    .type_name()
                    .map(str::to_string)
                    .or_else(|| inner.argument(0).map(SyntaxNode::unquote));
                match (event, inner.body()) {
                    (Some(event), Some(handler)) => {
                        let transitions = evaluate_transitions(
                            &state.name,
                            &event,
                            handler.statements(),
                            depth + 1,
                            config,
                        )?;
                        state.transitions.extend(transitions);
                    }
                    _ => debug!(state = %state.name, "Skipping on without an event or body"),
                }
            }
            "onEnter" => match inner.body() {
                Some(block) => state.on_enter.push(block.text.clone()),
                None => debug!(state = %state.name, "Skipping onEnter without a body"),
            },
            "onExit" => match inner.body() {
                Some(block) => state.on_exit.push(block.text.clone()),
                None => debug!(state = %state.name, "Skipping onExit without a body"),
            },
            other => trace!(call = other, state = %state.name, "Ignoring state body call"),
        }
    }

    Ok(Some(state))
}

/// Interpret the body of an `on` handler
fn evaluate_transitions(
    state: &str,
    event: &str,
    body: &[SyntaxNode],
    depth: usize,
    config: &ExtractConfig,
) -> Result<Vec<Transition>> {
    check_depth(depth, config)?;
    let mut transitions = Vec::new();

    for call in body.iter().filter_map(CallView::of) {
        match call.name {
            "transitionTo" => {
                let Some(target) = call.argument(0) else {
                    debug!(state, event, "Skipping transitionTo without a target");
                    continue;
                };
                let side_effect = call.argument(1).map(SyntaxNode::unquote);
                transitions.push(transition_to(event, target).with_side_effect(side_effect));
            }
            "dontTransition" => {
                let side_effect = call.argument(0).map(SyntaxNode::unquote);
                transitions.push(Transition::new(event, state).with_side_effect(side_effect));
            }
            other => trace!(call = other, state, event, "Ignoring handler call"),
        }
    }

    Ok(transitions)
}

/// Build the transition for a `transitionTo` target expression
///
/// A call target such as `Loading(id)` names the state by its callee and
/// keeps the arguments as text.
fn transition_to(event: &str, target: &SyntaxNode) -> Transition {
    match &target.kind {
        SyntaxKind::Call {
            callee,
            value_arguments,
            ..
        } => Transition::new(event, callee.text.clone()).with_target_args(
            value_arguments
                .iter()
                .map(|argument| argument.text.clone())
                .collect(),
        ),
        _ => Transition::new(event, target.unquote()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SourceParser;
    use crate::plugins::kotlin::KotlinParser;

    fn statements(body: &str) -> Vec<Statement> {
        let file = KotlinParser::new().parse(body, "main.kt").unwrap();
        evaluate_statements(file.statements(), 0, &ExtractConfig::default()).unwrap()
    }

    fn only_state(body: &str) -> State {
        match statements(body).pop() {
            Some(Statement::State(state)) => state,
            other => panic!("Expected a state, got {:?}", other),
        }
    }

    #[test]
    fn test_initial_state_forms() {
        assert_eq!(
            statements("initialState(\"Idle\")\ninitialState(Idle)\ninitialState(State.Idle)"),
            vec![
                Statement::InitialState {
                    state: "Idle".to_string()
                },
                Statement::InitialState {
                    state: "Idle".to_string()
                },
                Statement::InitialState {
                    state: "State.Idle".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_state_name_prefers_type_argument() {
        assert_eq!(only_state("state<State.Solid>(\"ignored\") { }").name, "State.Solid");
        assert_eq!(only_state("state(\"Liquid\") { }").name, "Liquid");
    }

    #[test]
    fn test_state_without_body_is_kept() {
        let state = only_state("state(\"Done\")");
        assert_eq!(state.name, "Done");
        assert!(state.transitions.is_empty());
    }

    #[test]
    fn test_nameless_state_is_skipped() {
        assert!(statements("state { }").is_empty());
    }

    #[test]
    fn test_state_body_from_value_argument_lambda() {
        let state = only_state("state(\"A\", { on(\"Go\") { transitionTo(\"B\") } })");
        assert_eq!(state.transitions, vec![Transition::new("Go", "B")]);
    }

    #[test]
    fn test_event_forms() {
        let state = only_state(
            "state(\"A\") {\n  on<Event.Melt> { transitionTo(\"B\") }\n  on(\"Freeze\") { transitionTo(\"C\") }\n}",
        );
        let events: Vec<&str> = state.transitions.iter().map(|t| t.event.as_str()).collect();
        assert_eq!(events, vec!["Event.Melt", "Freeze"]);
    }

    #[test]
    fn test_literal_and_identifier_targets_agree() {
        let state = only_state(
            "state(\"A\") {\n  on(\"x\") { transitionTo(\"Foo\") }\n  on(\"y\") { transitionTo(Foo) }\n}",
        );
        assert_eq!(state.transitions[0].target_state, "Foo");
        assert_eq!(state.transitions[1].target_state, "Foo");
    }

    #[test]
    fn test_call_target_keeps_arguments() {
        let state = only_state("state(\"A\") { on(\"Load\") { transitionTo(Foo(1, 2)) } }");
        let transition = &state.transitions[0];
        assert_eq!(transition.target_state, "Foo");
        assert_eq!(transition.target_args, vec!["1", "2"]);
    }

    #[test]
    fn test_side_effects() {
        let state = only_state(
            "state(\"A\") {\n  on(\"Go\") { transitionTo(\"B\", \"notify\") }\n  on(\"Stay\") { dontTransition(Effect.Log) }\n}",
        );
        assert_eq!(state.transitions[0].side_effect.as_deref(), Some("notify"));
        assert_eq!(state.transitions[1].target_state, "A");
        assert_eq!(state.transitions[1].side_effect.as_deref(), Some("Effect.Log"));
    }

    #[test]
    fn test_self_loop_without_side_effect() {
        let state = only_state("state(\"S\") { on(\"E\") { dontTransition() } }");
        assert_eq!(state.transitions, vec![Transition::new("E", "S")]);
    }

    #[test]
    fn test_enter_and_exit_bodies_are_verbatim() {
        let state = only_state(
            "state(\"A\") {\n  onEnter { log(\"in\")\n    count++ }\n  onExit { \"bye\" }\n  onEnter { }\n}",
        );
        assert_eq!(
            state.on_enter,
            vec!["log(\"in\")\n    count++".to_string(), String::new()]
        );
        assert_eq!(state.on_exit, vec!["\"bye\"".to_string()]);
    }

    #[test]
    fn test_unrecognized_calls_are_ignored() {
        let result = statements(
            "println(\"x\")\nval y = 3\nstate(\"A\") {\n  helper()\n  on(\"E\") { log()\n transitionTo(\"B\") }\n}",
        );
        assert_eq!(result.len(), 1);
        match &result[0] {
            Statement::State(state) => assert_eq!(state.transitions.len(), 1),
            other => panic!("Expected a state, got {:?}", other),
        }
    }

    #[test]
    fn test_depth_limit_applies_to_evaluators() {
        let file = KotlinParser::new().parse("state(\"A\") { }", "main.kt").unwrap();
        let config = ExtractConfig { max_depth: 0 };
        let error = evaluate_statements(file.statements(), 0, &config).unwrap_err();
        assert!(matches!(error, StatevizError::NestingTooDeep { limit: 0 }));
    }
}
