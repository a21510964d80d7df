//! Remote OCR client and proximity-ranked text compaction
//!
//! The OCR service receives a cropped element JPEG and answers with a
//! hierarchical regions → lines → words structure. Raw output can run to
//! hundreds of lines; only text near the element matters for describing it,
//! and the completion API downstream has a tight token budget, so the
//! response is flattened, ranked by distance to the element center, and hard
//! capped before anything else sees it.

pub mod compact;

pub use compact::{compact, OcrLine, OcrRegion, OcrResponse, OcrWord, RankedLine, MAX_OCR_LINES};

use async_trait::async_trait;
use element_insight_common::Point;
use thiserror::Error;
use tracing::debug;

/// Request header carrying the OCR service api key
const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Errors from the OCR call or the compaction that follows it
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("required environment variable {0} was not present")]
    MissingEnv(&'static str),

    #[error("malformed OCR bounding box {0:?}")]
    BoundingBoxFormat(String),

    #[error("OCR request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OCR service returned status {0}")]
    RemoteService(reqwest::StatusCode),

    #[error("failed to parse OCR response: {0}")]
    ResponseParse(String),

    #[error("failed to serialize OCR summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// OCR service endpoint and credentials, resolved once at startup
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl OcrConfig {
    /// Read the endpoint and api key from `OCR_ENDPOINT` / `OCR_API_KEY`.
    pub fn from_env() -> Result<Self, OcrError> {
        Ok(Self {
            endpoint: std::env::var("OCR_ENDPOINT").map_err(|_| OcrError::MissingEnv("OCR_ENDPOINT"))?,
            api_key: std::env::var("OCR_API_KEY").map_err(|_| OcrError::MissingEnv("OCR_API_KEY"))?,
        })
    }
}

/// Remote text-recognition collaborator
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Run OCR over an encoded image and return the vendor's line structure
    async fn recognize(&self, image: &[u8]) -> Result<OcrResponse, OcrError>;
}

/// HTTP client for the OCR service
pub struct HttpOcrClient {
    http: reqwest::Client,
    config: OcrConfig,
}

impl HttpOcrClient {
    #[must_use]
    pub fn new(config: OcrConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl OcrBackend for HttpOcrClient {
    async fn recognize(&self, image: &[u8]) -> Result<OcrResponse, OcrError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .header(API_KEY_HEADER, &self.config.api_key)
            .body(image.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OcrError::RemoteService(status));
        }

        response
            .json::<OcrResponse>()
            .await
            .map_err(|e| OcrError::ResponseParse(e.to_string()))
    }
}

/// Recognize text in a cropped element image and compact it into the ranked
/// line summary stored with the record and fed to the prompt.
pub async fn ocr_and_rank(
    backend: &dyn OcrBackend,
    image: &[u8],
    element_center: Point,
) -> Result<String, OcrError> {
    let response = backend.recognize(image).await?;
    let ranked = compact(&response, element_center)?;
    debug!(lines = ranked.len(), "compacted OCR output");
    Ok(serde_json::to_string(&ranked)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedOcr(OcrResponse);

    #[async_trait]
    impl OcrBackend for FixedOcr {
        async fn recognize(&self, _image: &[u8]) -> Result<OcrResponse, OcrError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn ranked_summary_is_ordered_json() {
        let backend = FixedOcr(OcrResponse {
            regions: vec![OcrRegion {
                lines: vec![
                    OcrLine::with_words("100,100,10,10", &["far", "away"]),
                    OcrLine::with_words("0,0,10,10", &["near"]),
                ],
            }],
        });

        let summary = ocr_and_rank(&backend, b"jpeg", Point::new(5, 5))
            .await
            .unwrap();

        assert_eq!(
            summary,
            r#"[{"proximityRank":0,"text":"near"},{"proximityRank":141,"text":"far away"}]"#
        );
    }
}
