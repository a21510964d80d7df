//! Seed loading with caller-imposed ordering
//!
//! Seed records feed inference prompts in a specific order; the caller's id
//! sequence takes precedence over the store's natural order. Ids must be
//! positive and unique. Ids with no backing record are simply absent from
//! the result — a fully empty result surfaces later as a prompt-build
//! failure.

use crate::{RecordStore, StorageError, StorageResult, StoredRecord};
use std::collections::HashSet;

/// Load seed records in exactly the order of `ids_in_order`.
pub async fn load_seeds(
    store: &dyn RecordStore,
    ids_in_order: &[i64],
) -> StorageResult<Vec<StoredRecord>> {
    for &id in ids_in_order {
        if id <= 0 {
            return Err(StorageError::InvalidSeedId(id));
        }
    }

    let unique: HashSet<i64> = ids_in_order.iter().copied().collect();
    if unique.len() != ids_in_order.len() {
        return Err(StorageError::DuplicateSeedIds);
    }

    let mut records = store.fetch_by_ids(ids_in_order).await?;
    records.sort_by_key(|record| {
        ids_in_order
            .iter()
            .position(|&id| id == record.id)
            .unwrap_or(usize::MAX)
    });

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryRecordStore, NewRecord};

    async fn store_with_records(count: usize) -> MemoryRecordStore {
        let store = MemoryRecordStore::new();
        for i in 0..count {
            store
                .insert(NewRecord {
                    image_data: Vec::new(),
                    image_ocr_data: format!("ocr-{}", i + 1),
                    outer_html: String::new(),
                    page_source: None,
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn supplied_ordering_takes_precedence_over_natural_order() {
        let store = store_with_records(3).await;

        let seeds = load_seeds(&store, &[3, 1, 2]).await.unwrap();

        let ids: Vec<i64> = seeds.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn missing_ids_are_omitted() {
        let store = store_with_records(2).await;

        let seeds = load_seeds(&store, &[2, 7, 1]).await.unwrap();

        let ids: Vec<i64> = seeds.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn non_positive_ids_are_rejected() {
        let store = store_with_records(1).await;

        assert!(matches!(
            load_seeds(&store, &[1, 0]).await,
            Err(StorageError::InvalidSeedId(0))
        ));
        assert!(matches!(
            load_seeds(&store, &[-4]).await,
            Err(StorageError::InvalidSeedId(-4))
        ));
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = store_with_records(2).await;

        assert!(matches!(
            load_seeds(&store, &[1, 2, 1]).await,
            Err(StorageError::DuplicateSeedIds)
        ));
    }
}
