//! Record storage for captured elements
//!
//! One relational table holds everything persisted per upload: the cropped
//! image, its ranked OCR summary, the element's outer HTML, and the optional
//! page source, inference label, and page summary added later. Records are
//! keyed by store-assigned integer ids; previously labeled records double as
//! seed examples for inference prompts.
//!
//! Mutation of existing records goes through explicit per-field setters —
//! only the inference label and page summary are patchable.

pub mod memory;
pub mod postgres;
pub mod seeds;

pub use memory::MemoryRecordStore;
pub use postgres::{PostgresConfig, PostgresRecordStore};
pub use seeds::load_seeds;

use async_trait::async_trait;
use thiserror::Error;

/// Storage layer errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("postgres error: {0}")]
    Postgres(String),

    #[error("record {0} not found")]
    NotFound(i64),

    #[error("seed id {0} is not a valid positive id")]
    InvalidSeedId(i64),

    #[error("seed ordering contains duplicate ids")]
    DuplicateSeedIds,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A record as persisted, including its assigned id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: i64,
    /// Cropped element JPEG
    pub image_data: Vec<u8>,
    /// Ranked OCR summary JSON
    pub image_ocr_data: String,
    pub outer_html: String,
    pub page_source: Option<String>,
    /// Label produced by (or corrected after) inference
    pub inference: Option<String>,
    pub page_summary: Option<String>,
}

/// Fields supplied when persisting a freshly processed upload
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub image_data: Vec<u8>,
    pub image_ocr_data: String,
    pub outer_html: String,
    pub page_source: Option<String>,
}

/// Record store collaborator
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record and return its assigned id
    async fn insert(&self, record: NewRecord) -> StorageResult<i64>;

    /// Fetch one record
    async fn get(&self, id: i64) -> StorageResult<Option<StoredRecord>>;

    /// All record ids in natural (ascending id) order
    async fn list_ids(&self) -> StorageResult<Vec<i64>>;

    /// Fetch the records whose ids appear in `ids`, in natural order; ids
    /// with no record are silently absent from the result
    async fn fetch_by_ids(&self, ids: &[i64]) -> StorageResult<Vec<StoredRecord>>;

    /// Set or clear the inference label
    async fn set_inference(&self, id: i64, inference: Option<String>) -> StorageResult<()>;

    /// Set or clear the page summary
    async fn set_page_summary(&self, id: i64, page_summary: Option<String>) -> StorageResult<()>;
}
