//! Core renderer trait for diagram output
//!
//! This trait defines the interface for turning an extracted
//! [`StateMachine`] into diagram notation.

use anyhow::Result;

use super::StateMachine;

/// Core trait for state machine renderers
///
/// Rendering must be a pure function of the IR: identical input always
/// produces identical output and no I/O happens here.
///
/// # Example
/// ```
/// use stateviz::core::{Renderer, StateMachine};
/// use stateviz::plugins::mermaid::MermaidRenderer;
///
/// let machine = StateMachine::new(vec![]);
/// let renderer = MermaidRenderer::new();
/// let output = renderer.render(&machine).unwrap();
/// assert!(output.contains("stateDiagram-v2"));
/// ```
pub trait Renderer: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render one state machine into the output format
    fn render(&self, machine: &StateMachine) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Get the produced diagram notation
    fn format(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::mermaid::MermaidRenderer;

    #[test]
    fn test_renderer_trait_metadata() {
        let renderer = MermaidRenderer::new();
        assert_eq!(renderer.name(), "mermaid");
        assert_eq!(renderer.version(), "0.1.0");
        assert_eq!(renderer.format(), "stateDiagram-v2");
    }
}
