//! Kotlin host-language support
//!
//! Lexes and parses Kotlin source into the generic syntax tree the
//! extractor walks.

pub mod detector;
pub mod lexer;
pub mod parser;

pub use detector::DslDetector;
pub use lexer::{tokenize, Spanned, Token};
pub use parser::{KotlinParser, DEFAULT_MAX_DEPTH};
