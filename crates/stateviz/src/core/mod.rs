//! Core abstractions for state machine extraction
//!
//! This module defines the syntax tree the host parsers produce, the IR
//! extraction builds, and the traits tying parsers and renderers together.

pub mod chumsky_utils;
mod detector;
mod error;
pub mod logging;
mod renderer;
mod syntax;
mod types;
pub mod validate;

pub use detector::*;
pub use error::*;
pub use logging::*;
pub use renderer::*;
pub use syntax::*;
pub use types::*;
