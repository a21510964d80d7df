//! In-memory record store
//!
//! Stands in for the relational store during local development (the service
//! warns and loses data on restart) and serves as the test double everywhere
//! a [`RecordStore`] is needed without a database.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{NewRecord, RecordStore, StorageError, StorageResult, StoredRecord};

/// Map-backed [`RecordStore`]
#[derive(Debug)]
pub struct MemoryRecordStore {
    records: RwLock<BTreeMap<i64, StoredRecord>>,
    next_id: AtomicI64,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: NewRecord) -> StorageResult<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = StoredRecord {
            id,
            image_data: record.image_data,
            image_ocr_data: record.image_ocr_data,
            outer_html: record.outer_html,
            page_source: record.page_source,
            inference: None,
            page_summary: None,
        };
        self.records.write().await.insert(id, stored);
        Ok(id)
    }

    async fn get(&self, id: i64) -> StorageResult<Option<StoredRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list_ids(&self) -> StorageResult<Vec<i64>> {
        Ok(self.records.read().await.keys().copied().collect())
    }

    async fn fetch_by_ids(&self, ids: &[i64]) -> StorageResult<Vec<StoredRecord>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|record| ids.contains(&record.id))
            .cloned()
            .collect())
    }

    async fn set_inference(&self, id: i64, inference: Option<String>) -> StorageResult<()> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StorageError::NotFound(id))?;
        record.inference = inference;
        Ok(())
    }

    async fn set_page_summary(&self, id: i64, page_summary: Option<String>) -> StorageResult<()> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StorageError::NotFound(id))?;
        record.page_summary = page_summary;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ocr: &str) -> NewRecord {
        NewRecord {
            image_data: vec![0xff, 0xd8],
            image_ocr_data: ocr.to_string(),
            outer_html: "<div/>".to_string(),
            page_source: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MemoryRecordStore::new();

        let first = store.insert(record("a")).await.unwrap();
        let second = store.insert(record("b")).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(store.list_ids().await.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn new_records_start_without_inference_or_summary() {
        let store = MemoryRecordStore::new();
        let id = store.insert(record("a")).await.unwrap();

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.inference, None);
        assert_eq!(stored.page_summary, None);
    }

    #[tokio::test]
    async fn fetch_by_ids_returns_natural_order_and_skips_missing() {
        let store = MemoryRecordStore::new();
        for ocr in ["a", "b", "c"] {
            store.insert(record(ocr)).await.unwrap();
        }

        let fetched = store.fetch_by_ids(&[3, 1, 99]).await.unwrap();

        let ids: Vec<i64> = fetched.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn setters_update_only_their_field() {
        let store = MemoryRecordStore::new();
        let id = store.insert(record("a")).await.unwrap();

        store
            .set_inference(id, Some("the submit button".to_string()))
            .await
            .unwrap();

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.inference.as_deref(), Some("the submit button"));
        assert_eq!(stored.page_summary, None);
        assert_eq!(stored.image_ocr_data, "a");
    }

    #[tokio::test]
    async fn setting_a_missing_record_is_not_found() {
        let store = MemoryRecordStore::new();

        let result = store.set_inference(42, None).await;

        assert!(matches!(result, Err(StorageError::NotFound(42))));
    }
}
