// region:    --- Imports
use super::{RecordStore, ResourceKind, StoreError, StoredRecord};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

// endregion: --- Imports

// region:    --- Memory Store
struct Slot {
    seq: u64,
    record: StoredRecord,
}

/// Process-local record store. Used by tests and when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<(ResourceKind, String), Slot>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<StoredRecord>, StoreError> {
        let mut slots: Vec<(u64, StoredRecord)> = self
            .records
            .iter()
            .filter(|entry| entry.key().0 == kind)
            .map(|entry| (entry.seq, entry.record.clone()))
            .collect();
        slots.sort_by_key(|(seq, _)| *seq);
        Ok(slots.into_iter().map(|(_, record)| record).collect())
    }

    async fn get(&self, kind: ResourceKind, id: &str) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self
            .records
            .get(&(kind, id.to_string()))
            .map(|slot| slot.record.clone()))
    }

    async fn insert(
        &self,
        kind: ResourceKind,
        id: &str,
        data: Value,
    ) -> Result<StoredRecord, StoreError> {
        match self.records.entry((kind, id.to_string())) {
            Entry::Occupied(_) => Err(StoreError::IdConflict {
                kind,
                id: id.to_string(),
            }),
            Entry::Vacant(entry) => {
                let record = StoredRecord {
                    id: id.to_string(),
                    data,
                    version: 1,
                };
                entry.insert(Slot {
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    record: record.clone(),
                });
                Ok(record)
            }
        }
    }

    async fn replace(
        &self,
        kind: ResourceKind,
        id: &str,
        data: Value,
        expected_version: Option<i64>,
    ) -> Result<StoredRecord, StoreError> {
        let mut slot = self
            .records
            .get_mut(&(kind, id.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_string(),
            })?;

        if let Some(expected) = expected_version {
            if slot.record.version != expected {
                return Err(StoreError::VersionConflict {
                    kind,
                    id: id.to_string(),
                });
            }
        }

        slot.record.data = data;
        slot.record.version += 1;
        Ok(slot.record.clone())
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<bool, StoreError> {
        Ok(self.records.remove(&(kind, id.to_string())).is_some())
    }
}

// endregion: --- Memory Store

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replace_checks_the_expected_version() {
        let store = MemoryStore::new();
        store
            .insert(ResourceKind::Users, "u1", json!({"id": "u1"}))
            .await
            .unwrap();

        let updated = store
            .replace(ResourceKind::Users, "u1", json!({"id": "u1", "n": 1}), Some(1))
            .await
            .unwrap();
        assert_eq!(updated.version, 2);

        let stale = store
            .replace(ResourceKind::Users, "u1", json!({"id": "u1", "n": 2}), Some(1))
            .await;
        assert!(matches!(stale, Err(StoreError::VersionConflict { .. })));
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids_per_kind() {
        let store = MemoryStore::new();
        store
            .insert(ResourceKind::Users, "x", json!({}))
            .await
            .unwrap();
        store
            .insert(ResourceKind::Orders, "x", json!({}))
            .await
            .unwrap();

        let dup = store.insert(ResourceKind::Users, "x", json!({})).await;
        assert!(matches!(dup, Err(StoreError::IdConflict { .. })));
    }

    #[tokio::test]
    async fn list_keeps_creation_order() {
        let store = MemoryStore::new();
        for id in ["c", "a", "b"] {
            store
                .insert(ResourceKind::Collections, id, json!({ "id": id }))
                .await
                .unwrap();
        }
        let ids: Vec<String> = store
            .list(ResourceKind::Collections)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
// endregion: --- Tests
