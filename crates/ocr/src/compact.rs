//! Proximity ranking for raw OCR output
//!
//! Region grouping in the vendor response carries no information this system
//! uses, so lines are flattened across regions, ranked by the distance from
//! their bounding-box center to the element center, and capped at
//! [`MAX_OCR_LINES`].

use std::cmp::Ordering;

use element_insight_common::Point;
use serde::{Deserialize, Serialize};

use crate::OcrError;

/// Hard cap on ranked lines kept per image
pub const MAX_OCR_LINES: usize = 10;

/// Vendor OCR response: regions of lines of words
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResponse {
    #[serde(rename = "Regions", default)]
    pub regions: Vec<OcrRegion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrRegion {
    #[serde(rename = "Lines", default)]
    pub lines: Vec<OcrLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrLine {
    /// Vendor bounding box, four comma-separated integers `"L,T,W,H"`
    #[serde(rename = "BoundingBox")]
    pub bounding_box: String,
    #[serde(rename = "Words", default)]
    pub words: Vec<OcrWord>,
}

impl OcrLine {
    #[must_use]
    pub fn with_words(bounding_box: &str, words: &[&str]) -> Self {
        Self {
            bounding_box: bounding_box.to_string(),
            words: words
                .iter()
                .map(|w| OcrWord {
                    text: (*w).to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrWord {
    #[serde(rename = "Text")]
    pub text: String,
}

/// One line of the compacted summary
///
/// `proximity_rank` is the truncated integer Euclidean distance from the
/// line's center to the element center, not a sequence index; downstream
/// ranking depends on the distance value, the list order is the sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedLine {
    pub proximity_rank: u32,
    pub text: String,
}

/// Flatten, rank, and cap raw OCR output around an element center.
///
/// Lines with no words are excluded. Ties in distance keep their flatten
/// order.
///
/// # Errors
/// [`OcrError::BoundingBoxFormat`] when any line's bounding box is not four
/// comma-separated non-negative integers; that means the vendor contract
/// changed and the whole response is unusable.
pub fn compact(response: &OcrResponse, element_center: Point) -> Result<Vec<RankedLine>, OcrError> {
    let mut ranked: Vec<(f64, RankedLine)> = Vec::new();

    for line in response.regions.iter().flat_map(|region| region.lines.iter()) {
        if line.words.is_empty() {
            continue;
        }

        let (left, top, width, height) = parse_bounding_box(&line.bounding_box)?;
        let line_center = Point::new(left + width / 2, top + height / 2);
        let distance = distance_between(line_center, element_center);

        let text = line
            .words
            .iter()
            .map(|word| word.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        ranked.push((
            distance,
            RankedLine {
                proximity_rank: distance as u32,
                text,
            },
        ));
    }

    // Stable sort: equal distances keep their flatten order
    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    ranked.truncate(MAX_OCR_LINES);

    Ok(ranked.into_iter().map(|(_, line)| line).collect())
}

fn distance_between(a: Point, b: Point) -> f64 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    (dx * dx + dy * dy).sqrt()
}

fn parse_bounding_box(raw: &str) -> Result<(i32, i32, i32, i32), OcrError> {
    let mut values = [0i32; 4];
    let mut parts = raw.split(',');

    for slot in &mut values {
        *slot = parts
            .next()
            .and_then(|part| part.parse::<u32>().ok())
            .and_then(|value| i32::try_from(value).ok())
            .ok_or_else(|| OcrError::BoundingBoxFormat(raw.to_string()))?;
    }

    if parts.next().is_some() {
        return Err(OcrError::BoundingBoxFormat(raw.to_string()));
    }

    Ok((values[0], values[1], values[2], values[3]))
}
