//! Record storage.
//! Every resource is kept as a JSON document with a version counter, so
//! read-modify-write flows (bids, carts, reviews) can compare on version
//! instead of trusting the last writer.
// region:    --- Imports
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

pub mod memory;
pub mod postgres;
mod queries;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

// endregion: --- Imports

// region:    --- Resource Kinds
/// The record collections exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Auctions,
    Collectables,
    Collections,
    Publications,
    Orders,
    Users,
}

impl ResourceKind {
    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Auctions => "auctions",
            Self::Collectables => "collectables",
            Self::Collections => "collections",
            Self::Publications => "publications",
            Self::Orders => "orders",
            Self::Users => "users",
        }
    }

    /// Singular name used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Auctions => "auction",
            Self::Collectables => "collectable",
            Self::Collections => "collection",
            Self::Publications => "publication",
            Self::Orders => "order",
            Self::Users => "user",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

// endregion: --- Resource Kinds

// region:    --- Store Errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{} '{id}' not found", .kind.label())]
    NotFound { kind: ResourceKind, id: String },

    #[error("{} '{id}' already exists", .kind.label())]
    IdConflict { kind: ResourceKind, id: String },

    #[error("{} '{id}' was modified concurrently", .kind.label())]
    VersionConflict { kind: ResourceKind, id: String },

    #[error("gave up after repeated version conflicts")]
    RetriesExhausted,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

// endregion: --- Store Errors

// region:    --- Record Store Trait
/// A stored document and the version it was read at.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: String,
    pub data: Value,
    pub version: i64,
}

/// Versioned JSON document storage.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records of a kind in creation order.
    async fn list(&self, kind: ResourceKind) -> Result<Vec<StoredRecord>, StoreError>;

    async fn get(&self, kind: ResourceKind, id: &str) -> Result<Option<StoredRecord>, StoreError>;

    /// Insert a new record at version 1. Fails with `IdConflict` if the id is taken.
    async fn insert(
        &self,
        kind: ResourceKind,
        id: &str,
        data: Value,
    ) -> Result<StoredRecord, StoreError>;

    /// Overwrite a record. With `expected_version` the write only happens if
    /// the stored version still matches, otherwise `VersionConflict`.
    async fn replace(
        &self,
        kind: ResourceKind,
        id: &str,
        data: Value,
        expected_version: Option<i64>,
    ) -> Result<StoredRecord, StoreError>;

    /// Returns false when nothing was deleted.
    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<bool, StoreError>;
}

// endregion: --- Record Store Trait

// region:    --- Typed Repository
/// A domain type that is persisted as a record.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync {
    const KIND: ResourceKind;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);
}

/// A decoded record and the version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub record: T,
    pub version: i64,
}

// Upper bound on optimistic update attempts.
const MAX_RETRIES: i32 = 100;

/// Typed access to one resource kind on top of a [`RecordStore`].
pub struct Repository<T> {
    store: Arc<dyn RecordStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T: Resource> Repository<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        self.store
            .list(T::KIND)
            .await?
            .into_iter()
            .map(|stored| serde_json::from_value(stored.data).map_err(StoreError::from))
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<Versioned<T>>, StoreError> {
        match self.store.get(T::KIND, id).await? {
            Some(stored) => Ok(Some(decode(stored)?)),
            None => Ok(None),
        }
    }

    /// Like [`Repository::get`] but a missing record is an error.
    pub async fn find(&self, id: &str) -> Result<Versioned<T>, StoreError> {
        self.get(id).await?.ok_or_else(|| StoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        })
    }

    pub async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.store.get(T::KIND, id).await?.is_some())
    }

    /// Store a new record, assigning a fresh id when it has none.
    pub async fn create(&self, mut record: T) -> Result<T, StoreError> {
        if record.id().trim().is_empty() {
            record.set_id(uuid::Uuid::new_v4().to_string());
        }
        let data = serde_json::to_value(&record)?;
        self.store.insert(T::KIND, record.id(), data).await?;
        Ok(record)
    }

    /// Overwrite the record stored under `id`. The stored id always wins.
    pub async fn replace(&self, id: &str, mut record: T) -> Result<T, StoreError> {
        record.set_id(id.to_string());
        let data = serde_json::to_value(&record)?;
        self.store.replace(T::KIND, id, data, None).await?;
        Ok(record)
    }

    /// Overwrite only if the record is still at `version`.
    pub async fn replace_versioned(
        &self,
        id: &str,
        mut record: T,
        version: i64,
    ) -> Result<Versioned<T>, StoreError> {
        record.set_id(id.to_string());
        let data = serde_json::to_value(&record)?;
        let stored = self.store.replace(T::KIND, id, data, Some(version)).await?;
        Ok(Versioned {
            record,
            version: stored.version,
        })
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if self.store.delete(T::KIND, id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            })
        }
    }

    /// Read-modify-write with optimistic concurrency.
    ///
    /// `apply` runs against the freshest copy of the record on every attempt,
    /// so any rule it checks is re-evaluated after a conflicting write. An
    /// error from `apply` aborts without writing.
    pub async fn update_with<R, E, F>(&self, id: &str, mut apply: F) -> Result<(T, R), E>
    where
        F: FnMut(&mut T) -> Result<R, E> + Send,
        R: Send,
        E: From<StoreError> + Send,
    {
        let mut retries = 0;
        while retries < MAX_RETRIES {
            let Versioned {
                mut record,
                version,
            } = self.find(id).await?;

            let outcome = apply(&mut record)?;

            match self.replace_versioned(id, record, version).await {
                Ok(updated) => return Ok((updated.record, outcome)),
                Err(StoreError::VersionConflict { .. }) => {
                    warn!(
                        "{:<12} --> version conflict on {} '{}', retrying",
                        "Store",
                        T::KIND.label(),
                        id
                    );
                    retries += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::RetriesExhausted.into())
    }
}

fn decode<T: Resource>(stored: StoredRecord) -> Result<Versioned<T>, StoreError> {
    Ok(Versioned {
        record: serde_json::from_value(stored.data)?,
        version: stored.version,
    })
}

// endregion: --- Typed Repository
