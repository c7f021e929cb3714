//! Mermaid state diagram renderer
//!
//! Emits `stateDiagram-v2` text. States get synthetic ids (`s0`, `s1`, ...)
//! in declaration order; names appear only inside the escaped labels.

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, span, warn, Level};

use crate::core::{Renderer, State, StateMachine, Statement};

/// Indentation of every diagram line below the header
const INDENT: &str = "    ";

/// Id used for a target that names no declared state
pub const UNRESOLVED_ID: &str = "null";

/// Rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Wrap the diagram in a ```` ```mermaid ```` code fence
    pub fenced: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { fenced: true }
    }
}

/// Renderer producing Mermaid `stateDiagram-v2` text
#[derive(Debug, Clone, Default)]
pub struct MermaidRenderer {
    config: RenderConfig,
}

impl MermaidRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render a statement list
    ///
    /// Pure: the same statements always give the same text.
    pub fn render_statements(&self, statements: &[Statement]) -> String {
        let states: Vec<&State> = statements
            .iter()
            .filter_map(|statement| match statement {
                Statement::State(state) => Some(state),
                Statement::InitialState { .. } => None,
            })
            .collect();

        // A repeated name resolves to its last declaration
        let ids: HashMap<&str, String> = states
            .iter()
            .enumerate()
            .map(|(index, state)| (state.name.as_str(), format!("s{}", index)))
            .collect();
        let id_of = |name: &str| resolve_id(&ids, name);

        let mut lines = Vec::new();
        if self.config.fenced {
            lines.push("```mermaid".to_string());
        }
        lines.push("stateDiagram-v2".to_string());

        for (index, state) in states.iter().enumerate() {
            lines.push(format!(
                "{}state \"{}\" as s{}",
                INDENT,
                state_label(state),
                index
            ));
        }

        for statement in statements {
            match statement {
                Statement::InitialState { state } => {
                    lines.push(format!("{}[*] --> {}", INDENT, id_of(state)));
                }
                Statement::State(state) => {
                    let from = id_of(&state.name);
                    for transition in &state.transitions {
                        let mut line = format!(
                            "{}{} --> {}:{} //",
                            INDENT,
                            from,
                            id_of(&transition.target_state),
                            escape_label(&transition.event)
                        );
                        if let Some(side_effect) = &transition.side_effect {
                            line.push(' ');
                            line.push_str(&escape_label(side_effect));
                        }
                        lines.push(line);
                    }
                }
            }
        }

        if self.config.fenced {
            lines.push("```".to_string());
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }
}

impl Renderer for MermaidRenderer {
    type Output = String;

    fn render(&self, machine: &StateMachine) -> Result<Self::Output> {
        let render_span = span!(
            Level::INFO,
            "render_mermaid",
            state_count = machine.state_count(),
            transition_count = machine.transition_count()
        );
        let _enter = render_span.enter();

        let output = self.render_statements(machine.statements());
        debug!(output_len = output.len(), "Rendering completed");
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "mermaid"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "stateDiagram-v2"
    }
}

fn resolve_id<'a>(ids: &'a HashMap<&str, String>, name: &str) -> &'a str {
    match ids.get(name) {
        Some(id) => id.as_str(),
        None => {
            warn!(state = name, "Rendering reference to undeclared state");
            UNRESOLVED_ID
        }
    }
}

/// The state name followed by its enter and exit snippets, escaped for a
/// quoted Mermaid label
pub fn state_label(state: &State) -> String {
    let mut parts = vec![state.name.clone()];
    parts.extend(state.on_enter.iter().map(|body| format!("onEnter: {}", body)));
    parts.extend(state.on_exit.iter().map(|body| format!("onExit: {}", body)));
    escape_label(&parts.join("\n"))
}

/// Replace line breaks (`\n`, `\r\n` or `\r`) with `<br>` and double
/// quotes with single quotes
pub fn escape_label(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace(['\r', '\n'], "<br>")
        .replace('"', "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transition;

    fn machine() -> StateMachine {
        StateMachine::new(vec![
            Statement::InitialState {
                state: "Idle".to_string(),
            },
            Statement::State(
                State::new("Idle").with_transition(Transition::new("Start", "Running")),
            ),
            Statement::State(State::new("Running").with_on_enter("\"log\"")),
        ])
    }

    #[test]
    fn test_render_full_diagram() {
        let output = MermaidRenderer::new().render(&machine()).unwrap();
        assert_eq!(
            output,
            "```mermaid\n\
             stateDiagram-v2\n    \
             state \"Idle\" as s0\n    \
             state \"Running<br>onEnter: 'log'\" as s1\n    \
             [*] --> s0\n    \
             s0 --> s1:Start //\n\
             ```\n"
        );
    }

    #[test]
    fn test_unfenced_output() {
        let renderer = MermaidRenderer::with_config(RenderConfig { fenced: false });
        let output = renderer.render(&machine()).unwrap();
        assert!(output.starts_with("stateDiagram-v2\n"));
        assert!(!output.contains("```"));
    }

    #[test]
    fn test_side_effect_is_appended() {
        let statements = vec![Statement::State(
            State::new("A").with_transition(
                Transition::new("Go", "A").with_side_effect(Some("Effect.Log".to_string())),
            ),
        )];
        let output = MermaidRenderer::new().render_statements(&statements);
        assert!(output.contains("    s0 --> s0:Go // Effect.Log\n"));
    }

    #[test]
    fn test_side_effect_is_escaped() {
        let statements = vec![Statement::State(State::new("A").with_transition(
            Transition::new("Go", "A").with_side_effect(Some("log(\"a\")\nflush()".to_string())),
        ))];
        let output = MermaidRenderer::new().render_statements(&statements);
        assert!(output.contains("    s0 --> s0:Go // log('a')<br>flush()\n"));
    }

    #[test]
    fn test_unresolved_target_uses_placeholder() {
        let statements = vec![
            Statement::InitialState {
                state: "Missing".to_string(),
            },
            Statement::State(State::new("A").with_transition(Transition::new("Go", "Nowhere"))),
        ];
        let output = MermaidRenderer::new().render_statements(&statements);
        assert!(output.contains("    [*] --> null\n"));
        assert!(output.contains("    s0 --> null:Go //\n"));
    }

    #[test]
    fn test_label_escaping() {
        let state = State::new("Say \"hi\"")
            .with_on_enter("a()\nb(\"x\")")
            .with_on_exit("done()");
        assert_eq!(
            state_label(&state),
            "Say 'hi'<br>onEnter: a()<br>b('x')<br>onExit: done()"
        );
    }

    #[test]
    fn test_carriage_returns_become_line_breaks() {
        let state = State::new("A").with_on_enter("a()\r\n  b()\rc()");
        assert_eq!(state_label(&state), "A<br>onEnter: a()<br>  b()<br>c()");
    }

    #[test]
    fn test_event_is_escaped() {
        let statements = vec![Statement::State(
            State::new("A").with_transition(Transition::new("x\n\"y\"", "A")),
        )];
        let output = MermaidRenderer::new().render_statements(&statements);
        assert!(output.contains("    s0 --> s0:x<br>'y' //\n"));
        assert_eq!(output.lines().count(), 5);
    }

    #[test]
    fn test_empty_machine() {
        let output = MermaidRenderer::new().render_statements(&[]);
        assert_eq!(output, "```mermaid\nstateDiagram-v2\n```\n");
    }
}
