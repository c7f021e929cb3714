//! stateviz - Render Kotlin state machine builders as Mermaid diagrams
//!
//! Finds `StateMachine.create { ... }` builder blocks in Kotlin source and
//! renders each one as a Mermaid `stateDiagram-v2`.
//!
//! # Quick Start
//!
//! ```rust
//! use stateviz::render;
//!
//! let source = r#"
//! val machine = StateMachine.create<State, Event, SideEffect> {
//!     initialState("Idle")
//!     state("Idle") {
//!         on("Start") { transitionTo("Running") }
//!     }
//!     state("Running") { }
//! }
//! "#;
//! let diagram = render(source).unwrap();
//! assert!(diagram.contains("[*] --> s0"));
//! assert!(diagram.contains("s0 --> s1:Start //"));
//! ```
//!
//! # Advanced Usage
//!
//! Each stage is usable on its own:
//!
//! ```rust
//! use stateviz::prelude::*;
//!
//! let parser = KotlinParser::new();
//! let tree = parser
//!     .parse("StateMachine.create { state(\"A\") { } }", "Machine.kt")
//!     .unwrap();
//!
//! let machines = Extractor::new().extract(&tree).unwrap();
//! assert_eq!(machines[0].state_count(), 1);
//!
//! let renderer = MermaidRenderer::with_config(RenderConfig { fenced: false });
//! let diagram = renderer.render(&machines[0]).unwrap();
//! assert!(diagram.starts_with("stateDiagram-v2"));
//! ```

pub mod core;
pub mod extract;
pub mod plugins;

pub use core::*;

/// File name the convenience functions parse under
pub const DEFAULT_FILE_NAME: &str = "main.kt";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Condition, Detector, Renderer, SourceParser, State, StateMachine, Statement,
        StatevizError, SyntaxKind, SyntaxNode, Transition,
    };
    pub use crate::extract::{ExtractConfig, Extractor};
    pub use crate::plugins::kotlin::{DslDetector, KotlinParser};
    pub use crate::plugins::mermaid::{MermaidRenderer, RenderConfig};
    pub use crate::plugins::orchestrator::Orchestrator;
}

/// Extract every state machine from Kotlin source
///
/// # Example
/// ```rust
/// let machines = stateviz::extract("StateMachine.create { initialState(\"A\") }").unwrap();
/// assert_eq!(machines.len(), 1);
/// ```
pub fn extract(source: &str) -> anyhow::Result<Vec<StateMachine>> {
    use crate::plugins::orchestrator::Orchestrator;

    Orchestrator::with_kotlin().extract(source, DEFAULT_FILE_NAME)
}

/// Render every state machine in Kotlin source as Mermaid
///
/// Diagrams are fenced and separated by a blank line. Source without any
/// state machine renders as an empty string.
pub fn render(source: &str) -> anyhow::Result<String> {
    use crate::plugins::orchestrator::Orchestrator;

    Orchestrator::with_kotlin().process_joined(source, DEFAULT_FILE_NAME)
}
