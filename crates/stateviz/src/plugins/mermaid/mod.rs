//! Mermaid output
//!
//! Renders extracted state machines as Mermaid state diagrams.

pub mod renderer;

pub use renderer::{escape_label, state_label, MermaidRenderer, RenderConfig, UNRESOLVED_ID};
