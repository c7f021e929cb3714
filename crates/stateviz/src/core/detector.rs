//! Core detector trait for cheap textual pre-checks
//!
//! Detectors look at raw source text, before any parsing, and estimate
//! whether a full parse is worth doing.

/// Core trait for DSL detectors
///
/// # Example
/// ```
/// use stateviz::core::Detector;
/// use stateviz::plugins::kotlin::DslDetector;
///
/// let detector = DslDetector::new();
/// assert!(detector.detect("val sm = StateMachine.create { }"));
/// ```
pub trait Detector: Send + Sync {
    /// Detect if the input likely contains the DSL
    fn detect(&self, input: &str) -> bool;

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, input: &str) -> f64;

    /// Get the name of the detected construct
    fn dsl_name(&self) -> &'static str;

    /// Get key patterns that this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}
