//! Policy constants for the completion shrink loops

/// Minimum number of seed examples the inference loop will shrink down to
pub const MIN_SEED_FLOOR: usize = 3;

/// Fraction of the page text kept on each summary retry
pub const TEXT_SHRINK_FACTOR: f64 = 0.8;

/// Minimum page-text length (bytes) the summary loop will shrink down to
pub const MIN_TEXT_FLOOR: usize = 2000;

/// Max additional tokens requested from the completion service
pub const MAX_COMPLETION_TOKENS: u32 = 128;

/// Sampling temperature; zero keeps labeling deterministic
pub const COMPLETION_TEMPERATURE: f64 = 0.0;

/// Stop sequence for inference completions
pub const INFERENCE_STOP: &str = "\n";

/// Stop sequence for page-summary completions
pub const SUMMARY_STOP: &str = "\"\"\"";
