//! Reference checks over an extracted state machine
//!
//! Extraction never validates targets and rendering degrades gracefully
//! when a target is missing. These checks let callers decide whether an
//! unresolved target should warn or fail.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::{StateMachine, Statement};

/// Where an unresolved state name was referenced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    InitialState,
    Transition,
}

/// A state name that no `state` declaration provides
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    pub kind: ReferenceKind,
    /// Owning state of a transition
    pub from_state: Option<String>,
    pub event: Option<String>,
    pub target: String,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.from_state, &self.event) {
            (ReferenceKind::Transition, Some(from), Some(event)) => write!(
                f,
                "transition '{}' in state '{}' targets undeclared state '{}'",
                event, from, self.target
            ),
            _ => write!(f, "initial state '{}' is not declared", self.target),
        }
    }
}

/// Names of every declared state
pub fn declared_states(machine: &StateMachine) -> HashSet<&str> {
    machine.states().map(|state| state.name.as_str()).collect()
}

/// Every initial-state or transition target that names no declared state
///
/// References are reported in statement order.
pub fn unresolved_references(machine: &StateMachine) -> Vec<UnresolvedReference> {
    let declared = declared_states(machine);
    let mut unresolved = Vec::new();

    for statement in machine.statements() {
        match statement {
            Statement::InitialState { state } => {
                if !declared.contains(state.as_str()) {
                    unresolved.push(UnresolvedReference {
                        kind: ReferenceKind::InitialState,
                        from_state: None,
                        event: None,
                        target: state.clone(),
                    });
                }
            }
            Statement::State(state) => {
                for transition in &state.transitions {
                    if !declared.contains(transition.target_state.as_str()) {
                        unresolved.push(UnresolvedReference {
                            kind: ReferenceKind::Transition,
                            from_state: Some(state.name.clone()),
                            event: Some(transition.event.clone()),
                            target: transition.target_state.clone(),
                        });
                    }
                }
            }
        }
    }

    unresolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{State, Transition};

    #[test]
    fn test_fully_resolved_machine() {
        let machine = StateMachine::new(vec![
            Statement::InitialState {
                state: "Idle".to_string(),
            },
            Statement::State(State::new("Idle").with_transition(Transition::new("Go", "Idle"))),
        ]);
        assert!(unresolved_references(&machine).is_empty());
    }

    #[test]
    fn test_reports_initial_and_transition_targets() {
        let machine = StateMachine::new(vec![
            Statement::InitialState {
                state: "Ghost".to_string(),
            },
            Statement::State(State::new("Idle").with_transition(Transition::new("Go", "Nowhere"))),
        ]);

        let unresolved = unresolved_references(&machine);
        assert_eq!(unresolved.len(), 2);
        assert_eq!(unresolved[0].kind, ReferenceKind::InitialState);
        assert_eq!(unresolved[0].to_string(), "initial state 'Ghost' is not declared");
        assert_eq!(unresolved[1].kind, ReferenceKind::Transition);
        assert_eq!(
            unresolved[1].to_string(),
            "transition 'Go' in state 'Idle' targets undeclared state 'Nowhere'"
        );
    }
}
