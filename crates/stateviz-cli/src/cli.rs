//! Command-line interface for the stateviz utility
//!
//! Reads Kotlin source, extracts `StateMachine.create` builders and prints
//! them as Mermaid diagrams, JSON or a validation report.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use stateviz::core::logging::init_logging;
use stateviz::core::validate::unresolved_references;
use stateviz::core::{Detector, SourceParser};
use stateviz::extract::ExtractConfig;
use stateviz::plugins::kotlin::{DslDetector, KotlinParser};
use stateviz::plugins::mermaid::RenderConfig;
use stateviz::plugins::Orchestrator;
use stateviz::DEFAULT_FILE_NAME;

/// stateviz - Render Kotlin state machine DSL blocks as Mermaid diagrams
#[derive(Parser)]
#[command(name = "stateviz")]
#[command(about = "Extract StateMachine.create builders from Kotlin and render them as Mermaid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error); defaults to
    /// STATEVIZ_LOG_LEVEL, then RUST_LOG, then warn
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Set log format (compact|pretty|json); defaults to
    /// STATEVIZ_LOG_FORMAT, then compact
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Options shared by every command that parses source
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct SourceArgs {
    /// Input Kotlin file (use - for stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// File name used to select the parser dialect; defaults to the
    /// input's file name, or main.kt for stdin
    #[arg(long)]
    pub file_name: Option<String>,

    /// Maximum syntax nesting depth before giving up
    #[arg(long)]
    pub max_depth: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render every state machine as a Mermaid state diagram
    Render {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file for the diagrams (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit bare diagram text without the ```mermaid fence
        #[arg(long)]
        no_fence: bool,
    },

    /// Print the extracted state machines as JSON
    Extract {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file for the JSON (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Fail if a state machine references an undeclared state
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Report whether the input likely contains a state machine builder
    Detect {
        /// Input file to analyze (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Main CLI application
pub struct StatevizApp {
    detector: DslDetector,
}

impl StatevizApp {
    pub fn new() -> Self {
        Self {
            detector: DslDetector::new(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Flags win over environment variables, which init_logging reads
        if let Err(e) = init_logging(
            cli.log_level.map(|level| level.as_str()),
            cli.log_format.map(|format| format.as_str()),
        ) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("stateviz v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Render {
                source,
                output,
                no_fence,
            } => self.render_command(&source, output, no_fence, cli.verbose),
            Commands::Extract {
                source,
                output,
                pretty,
            } => self.extract_command(&source, output, pretty, cli.verbose),
            Commands::Check { source } => self.check_command(&source, cli.verbose),
            Commands::Detect { input } => self.detect_command(input, cli.verbose),
        }
    }

    /// Handle the render command
    fn render_command(
        &self,
        source: &SourceArgs,
        output: Option<PathBuf>,
        no_fence: bool,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(source.input.clone())?;
        let file_name = Self::file_name(source);

        if verbose {
            eprintln!("Read {} bytes of input from {}", content.len(), file_name);
        }

        let orchestrator = Self::orchestrator(source.max_depth)
            .with_render_config(RenderConfig { fenced: !no_fence });
        let diagrams = orchestrator.process(&content, &file_name)?;

        if diagrams.is_empty() {
            warn!(file_name = %file_name, "No StateMachine.create block found");
        }
        if verbose {
            eprintln!("Rendered {} state machine(s)", diagrams.len());
        }

        self.write_output(output, &diagrams.join("\n"))
    }

    /// Handle the extract command
    fn extract_command(
        &self,
        source: &SourceArgs,
        output: Option<PathBuf>,
        pretty: bool,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(source.input.clone())?;
        let file_name = Self::file_name(source);

        let machines = Self::orchestrator(source.max_depth).extract(&content, &file_name)?;
        if verbose {
            eprintln!("Extracted {} state machine(s)", machines.len());
        }

        let json = if pretty {
            serde_json::to_string_pretty(&machines)?
        } else {
            serde_json::to_string(&machines)?
        };
        self.write_output(output, &json)
    }

    /// Handle the check command
    fn check_command(&self, source: &SourceArgs, verbose: bool) -> Result<()> {
        let content = self.read_input(source.input.clone())?;
        let file_name = Self::file_name(source);

        let machines = match Self::orchestrator(source.max_depth).extract(&content, &file_name) {
            Ok(machines) => machines,
            Err(e) => {
                println!("✗ Invalid state machine DSL in {}: {}", file_name, e);
                return Err(e);
            }
        };

        if machines.is_empty() {
            println!("✗ No state machine found in {}", file_name);
            return Err(anyhow!("No StateMachine.create block found"));
        }

        let mut problems = 0;
        for (index, machine) in machines.iter().enumerate() {
            if verbose {
                eprintln!(
                    "Machine {}: {} state(s), {} transition(s)",
                    index,
                    machine.state_count(),
                    machine.transition_count()
                );
            }
            for reference in unresolved_references(machine) {
                println!("✗ Machine {}: {}", index, reference);
                problems += 1;
            }
        }

        if problems > 0 {
            return Err(anyhow!("{} unresolved state reference(s)", problems));
        }

        println!(
            "✓ {} valid state machine(s) in {}",
            machines.len(),
            file_name
        );
        Ok(())
    }

    /// Handle the detect command
    fn detect_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let confidence = self.detector.confidence(&content);
        info!(confidence, "Checked for state machine DSL");

        if self.detector.detect(&content) {
            println!("{} (confidence {:.1})", self.detector.dsl_name(), confidence);
            Ok(())
        } else {
            eprintln!("No {} block detected", self.detector.dsl_name());
            Err(anyhow!("No state machine DSL detected"))
        }
    }

    /// Pipeline for one command invocation
    fn orchestrator(max_depth: Option<usize>) -> Orchestrator {
        match max_depth {
            Some(max_depth) => {
                Orchestrator::new(Box::new(KotlinParser::with_max_depth(max_depth)))
                    .with_extract_config(ExtractConfig { max_depth })
            }
            None => Orchestrator::with_kotlin(),
        }
    }

    /// Dialect-selecting file name for the input
    fn file_name(source: &SourceArgs) -> String {
        let name = source
            .file_name
            .clone()
            .or_else(|| {
                source
                    .input
                    .as_deref()
                    .filter(|path| *path != Path::new("-"))
                    .and_then(Path::file_name)
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

        if !KotlinParser::new().supports(&name) {
            warn!(file_name = %name, "File name does not look like Kotlin source");
        }
        name
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for StatevizApp {
    fn default() -> Self {
        Self::new()
    }
}
