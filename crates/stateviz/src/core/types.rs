//! Intermediate representation of an extracted state machine
//!
//! The IR is built bottom-up in a single pass by the extractor and handed,
//! whole and immutable, to a renderer. Every code snippet it carries
//! (side effects, enter/exit bodies, target arguments) is verbatim source
//! text and is never parsed further.

use serde::Serialize;

/// One `StateMachine.create { ... }` occurrence found in a source unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateMachine {
    statements: Vec<Statement>,
}

impl StateMachine {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Statements in source declaration order
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Declared states in source order
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::State(state) => Some(state),
            Statement::InitialState { .. } => None,
        })
    }

    /// Initial state names in source order (duplicates are kept)
    pub fn initial_states(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::InitialState { state } => Some(state.as_str()),
            Statement::State(_) => None,
        })
    }

    /// Look up a declared state by name
    pub fn state(&self, name: &str) -> Option<&State> {
        self.states().find(|state| state.name == name)
    }

    pub fn state_count(&self) -> usize {
        self.states().count()
    }

    pub fn transition_count(&self) -> usize {
        self.states().map(|state| state.transitions.len()).sum()
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

/// A top-level builder statement inside a `create` lambda
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    /// `initialState(...)`: names the entry state
    InitialState { state: String },
    /// `state(...) { ... }`
    State(State),
}

/// A declared state with its handlers and enter/exit side effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    pub name: String,
    pub transitions: Vec<Transition>,
    pub on_enter: Vec<String>,
    pub on_exit: Vec<String>,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: Vec::new(),
            on_enter: Vec::new(),
            on_exit: Vec::new(),
        }
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn with_on_enter(mut self, body: impl Into<String>) -> Self {
        self.on_enter.push(body.into());
        self
    }

    pub fn with_on_exit(mut self, body: impl Into<String>) -> Self {
        self.on_exit.push(body.into());
        self
    }
}

/// One edge produced by an `on` handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub event: String,
    pub target_state: String,
    /// Constructor-style arguments when the target is written as a call
    pub target_args: Vec<String>,
    pub side_effect: Option<String>,
    /// Guard conditions. Nothing populates this yet: the DSL has no
    /// conditional-transition syntax.
    pub conditions: Vec<Condition>,
}

impl Transition {
    pub fn new(event: impl Into<String>, target_state: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            target_state: target_state.into(),
            target_args: Vec::new(),
            side_effect: None,
            conditions: Vec::new(),
        }
    }

    pub fn with_target_args(mut self, args: Vec<String>) -> Self {
        self.target_args = args;
        self
    }

    pub fn with_side_effect(mut self, side_effect: Option<String>) -> Self {
        self.side_effect = side_effect;
        self
    }
}

/// Guard attached to a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "expression", rename_all = "snake_case")]
pub enum Condition {
    If(String),
    IfNot(String),
}

impl Condition {
    pub fn expression(&self) -> &str {
        match self {
            Condition::If(expression) | Condition::IfNot(expression) => expression,
        }
    }
}
