//! Plugin implementations
//!
//! The Kotlin host-language front end, the Mermaid renderer and the
//! orchestrator that chains them.

pub mod kotlin;
pub mod mermaid;
pub mod orchestrator;

pub use kotlin::*;
pub use mermaid::*;
pub use orchestrator::*;
