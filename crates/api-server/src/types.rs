//! API request and response types

use serde::{Deserialize, Serialize};

/// An element capture uploaded from the web client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub element_center_x: f64,
    pub element_center_y: f64,
    pub element_width: f64,
    pub element_height: f64,
    pub window_width: f64,
    pub window_height: f64,
    /// Base64 data URI of the screenshot
    pub image_uri: String,
    /// Outer HTML of the captured element
    #[serde(default, rename = "outerHTML")]
    pub outer_html: Option<String>,
    /// Full page HTML, stored for later summarization
    #[serde(default)]
    pub page_source: Option<String>,
    #[serde(default)]
    pub page_title: Option<String>,
}

/// A page summarization request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(default)]
    pub page_source: Option<String>,
    #[serde(default)]
    pub page_title: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// All record ids in the store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIdsResponse {
    pub ids: Vec<i64>,
}

/// Metadata for one stored record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    /// Relative route serving the stored JPEG
    pub image_uri: String,
    #[serde(rename = "outerHTML")]
    pub outer_html: String,
    pub image_ocr_data: String,
    pub inference: Option<String>,
    pub page_source: Option<String>,
    pub page_summary: Option<String>,
}

/// Patchable record fields; only the inference label may be edited
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    pub inference: Option<String>,
}
