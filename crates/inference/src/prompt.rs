//! Prompt document assembly
//!
//! Every example, labeled or not, renders as the same multi-field block; the
//! full prompt is a preamble, the seed blocks in caller order, and the new
//! example's block with its label left blank for the model to fill in.

use crate::PromptBuildError;

/// Fixed instruction that opens every inference prompt
pub const PREAMBLE: &str = "Summarize meaning from HTML and OCR data.";

/// Separator between the preamble and the example blocks
const SECTION_BREAK: &str = "\n###\n";

/// Something that can render itself as one prompt example block
pub trait PromptBlock {
    fn render_block(&self) -> String;
}

/// A previously labeled record used as an in-context example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedExample {
    pub id: i64,
    pub outer_html: String,
    pub ocr_summary: String,
    /// A seed without a label is invalid and must never enter a prompt
    pub label: Option<String>,
}

/// The unlabeled example the model is asked to complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExample {
    pub outer_html: String,
    pub ocr_summary: String,
    pub page_title: Option<String>,
}

impl PromptBlock for SeedExample {
    fn render_block(&self) -> String {
        render_fields(
            &self.outer_html,
            &self.ocr_summary,
            None,
            self.label.as_deref(),
        )
    }
}

impl PromptBlock for NewExample {
    fn render_block(&self) -> String {
        render_fields(
            &self.outer_html,
            &self.ocr_summary,
            self.page_title.as_deref(),
            None,
        )
    }
}

fn render_fields(
    outer_html: &str,
    ocr_summary: &str,
    page_title: Option<&str>,
    label: Option<&str>,
) -> String {
    let mut block = String::new();
    block.push_str("High Priority\n");
    block.push_str(outer_html);
    block.push('\n');
    block.push_str("Low Priority\n");
    block.push_str(ocr_summary);
    block.push('\n');
    if let Some(title) = page_title {
        block.push_str("Page Title\n");
        block.push_str(title);
        block.push('\n');
    }
    block.push_str("Summary\n");
    if let Some(label) = label {
        block.push_str(label);
        block.push('\n');
    }
    block
}

/// Assemble the full prompt document.
///
/// Seed order is the caller's and is preserved exactly.
///
/// # Errors
/// [`PromptBuildError::NoSeeds`] for an empty seed list,
/// [`PromptBuildError::UnlabeledSeed`] when any seed lacks a label. Both
/// abort loudly; nothing is skipped or substituted.
pub fn build_prompt(
    seeds: &[SeedExample],
    new_example: &NewExample,
) -> Result<String, PromptBuildError> {
    if seeds.is_empty() {
        return Err(PromptBuildError::NoSeeds);
    }
    if let Some(unlabeled) = seeds.iter().find(|seed| seed.label.is_none()) {
        return Err(PromptBuildError::UnlabeledSeed { id: unlabeled.id });
    }

    let mut document = String::from(PREAMBLE);
    document.push_str(SECTION_BREAK);
    for seed in seeds {
        document.push_str(&seed.render_block());
    }
    document.push_str(&new_example.render_block());

    Ok(document)
}
