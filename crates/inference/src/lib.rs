//! Prompt assembly and completion calls for element labeling
//!
//! A prompt is a fixed preamble, an ordered run of previously labeled seed
//! examples, and one new unlabeled example for the model to complete. The
//! completion service rejects over-long prompts with a distinguished signal;
//! the retry loops here shrink their input (drop the last seed, or truncate
//! the page text) and try again until the service accepts or a floor is hit.

pub mod completion;
pub mod constants;
pub mod prompt;
pub mod retry;

pub use completion::{
    CompletionBackend, CompletionBody, CompletionConfig, CompletionEndpoint, CompletionReply,
    HttpCompletionClient,
};
pub use prompt::{build_prompt, NewExample, PromptBlock, SeedExample};
pub use retry::{infer_with_retry, summarize_page};

use thiserror::Error;

/// A prompt that cannot be built at all: a data-integrity problem, never an
/// expected runtime condition
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PromptBuildError {
    #[error("no seed examples were provided to build the prompt")]
    NoSeeds,

    #[error("seed {id} has no label and cannot be used in a prompt")]
    UnlabeledSeed { id: i64 },
}

/// Errors from prompt building or the completion call
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("required environment variable {0} was not present")]
    MissingEnv(&'static str),

    #[error(transparent)]
    PromptBuild(#[from] PromptBuildError),

    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion service returned status {0}")]
    RemoteService(reqwest::StatusCode),

    #[error("failed to parse completion response: {0}")]
    ResponseParse(String),

    #[error("prompt was still too large after shrinking to the floor")]
    PromptTooLarge,
}
