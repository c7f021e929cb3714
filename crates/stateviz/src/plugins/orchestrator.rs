//! Pipeline orchestrator
//!
//! Runs source text through Parser → Extractor → Renderer. The parser is
//! injected, so callers construct it once and reuse it across sources.

use anyhow::Result;
use tracing::{debug, info, span, Level};

use crate::core::{Renderer, SourceParser, StateMachine};
use crate::extract::{ExtractConfig, Extractor};
use crate::plugins::kotlin::KotlinParser;
use crate::plugins::mermaid::{MermaidRenderer, RenderConfig};

/// Coordinates the parse → extract → render pipeline
pub struct Orchestrator {
    parser: Box<dyn SourceParser>,
    extractor: Extractor,
    renderer: MermaidRenderer,
}

impl Orchestrator {
    /// Create an orchestrator around an already constructed parser
    pub fn new(parser: Box<dyn SourceParser>) -> Self {
        Self {
            parser,
            extractor: Extractor::new(),
            renderer: MermaidRenderer::new(),
        }
    }

    /// Create an orchestrator with the Kotlin parser and default settings
    pub fn with_kotlin() -> Self {
        Self::new(Box::new(KotlinParser::new()))
    }

    pub fn with_extract_config(mut self, config: ExtractConfig) -> Self {
        self.extractor = Extractor::with_config(config);
        self
    }

    pub fn with_render_config(mut self, config: RenderConfig) -> Self {
        self.renderer = MermaidRenderer::with_config(config);
        self
    }

    pub fn parser(&self) -> &dyn SourceParser {
        self.parser.as_ref()
    }

    /// Parse and extract every state machine in `source`
    ///
    /// `file_name` only selects the parser dialect.
    pub fn extract(&self, source: &str, file_name: &str) -> Result<Vec<StateMachine>> {
        let extract_span = span!(
            Level::INFO,
            "pipeline_extract",
            file_name,
            parser = self.parser.name(),
            input_len = source.len()
        );
        let _enter = extract_span.enter();

        let parse_span = span!(Level::DEBUG, "pipeline_parse");
        let parse_enter = parse_span.enter();
        let tree = self.parser.parse(source, file_name)?;
        drop(parse_enter);

        let machines = self.extractor.extract(&tree)?;
        debug!(machine_count = machines.len(), "Extraction completed");
        Ok(machines)
    }

    /// Render each state machine in `source` to its own diagram
    pub fn process(&self, source: &str, file_name: &str) -> Result<Vec<String>> {
        let process_span = span!(Level::INFO, "process_source", file_name);
        let _enter = process_span.enter();

        info!("Starting state machine pipeline");
        let machines = self.extract(source, file_name)?;

        let render_span = span!(Level::DEBUG, "pipeline_render");
        let _render_enter = render_span.enter();
        let diagrams = machines
            .iter()
            .map(|machine| self.renderer.render(machine))
            .collect::<Result<Vec<_>>>()?;

        info!(diagram_count = diagrams.len(), "Pipeline completed");
        Ok(diagrams)
    }

    /// Render every state machine in `source`, separated by blank lines
    pub fn process_joined(&self, source: &str, file_name: &str) -> Result<String> {
        Ok(self.process(source, file_name)?.join("\n"))
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::with_kotlin()
    }
}
