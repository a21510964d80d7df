//! Adaptive shrink-and-retry loops around the completion service
//!
//! Both loops share one shape: attempt, and on the provider's too-long
//! signal shrink the input and go again until the service accepts or a floor
//! is reached. Retries are sequential within a request; any failure other
//! than the too-long signal propagates immediately.

use tracing::{debug, warn};

use crate::completion::{CompletionBackend, CompletionBody, CompletionEndpoint, CompletionReply};
use crate::constants::TEXT_SHRINK_FACTOR;
use crate::prompt::{build_prompt, NewExample, SeedExample};
use crate::InferenceError;

/// Label a new example, shrinking the seed list while the provider rejects
/// the prompt as too long.
///
/// The numerically-last seed is dropped on each rejection, but only while
/// the shrunken list would still sit above `min_seed_floor`; once it would
/// not, the loop gives up with [`InferenceError::PromptTooLarge`].
pub async fn infer_with_retry(
    backend: &dyn CompletionBackend,
    mut seeds: Vec<SeedExample>,
    new_example: &NewExample,
    min_seed_floor: usize,
) -> Result<String, InferenceError> {
    loop {
        let body = CompletionBody::inference(build_prompt(&seeds, new_example)?);

        match backend
            .complete(CompletionEndpoint::Inference, &body)
            .await?
        {
            CompletionReply::Text(text) => return Ok(text),
            CompletionReply::PromptTooLong => {
                if seeds.len() > min_seed_floor + 1 {
                    seeds.pop();
                    debug!(remaining = seeds.len(), "prompt too long, dropped last seed");
                } else {
                    warn!(
                        seeds = seeds.len(),
                        "prompt rejected with the seed list at its floor"
                    );
                    return Err(InferenceError::PromptTooLarge);
                }
            }
        }
    }
}

/// Summarize a page in one sentence, truncating the page text to 80% of its
/// current length while the provider rejects the prompt as too long.
pub async fn summarize_page(
    backend: &dyn CompletionBackend,
    page_title: Option<&str>,
    mut page_text: String,
    min_text_floor: usize,
) -> Result<String, InferenceError> {
    loop {
        let body = CompletionBody::summary(build_summary_prompt(page_title, &page_text));

        match backend.complete(CompletionEndpoint::Summary, &body).await? {
            CompletionReply::Text(text) => return Ok(text),
            CompletionReply::PromptTooLong => {
                if page_text.len() > min_text_floor {
                    let mut keep = (page_text.len() as f64 * TEXT_SHRINK_FACTOR) as usize;
                    // back up to a char boundary so multi-byte text can't split
                    while keep > 0 && !page_text.is_char_boundary(keep) {
                        keep -= 1;
                    }
                    page_text.truncate(keep);
                    debug!(remaining = page_text.len(), "prompt too long, truncated page text");
                } else {
                    warn!(
                        remaining = page_text.len(),
                        "prompt rejected with the page text at its floor"
                    );
                    return Err(InferenceError::PromptTooLarge);
                }
            }
        }
    }
}

fn build_summary_prompt(page_title: Option<&str>, page_text: &str) -> String {
    let mut prompt = String::from(
        "Given a website title and some text from the website, provide a one sentence summary\n\n",
    );
    if let Some(title) = page_title {
        prompt.push_str("Title:\n");
        prompt.push_str(title);
        prompt.push('\n');
    }
    prompt.push_str("Text:\n");
    prompt.push_str(page_text);
    prompt.push('\n');
    prompt.push_str("Summary:\n");
    prompt
}
