// region:    --- Imports
use super::queries::{self, for_table};
use super::{RecordStore, ResourceKind, StoreError, StoredRecord};
use crate::database::DatabaseManager;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{FromRow, Row};
use std::sync::Arc;
use tracing::debug;

// endregion: --- Imports

// region:    --- Row Model
#[derive(FromRow)]
struct RecordRow {
    id: String,
    data: Value,
    version: i64,
}

impl From<RecordRow> for StoredRecord {
    fn from(row: RecordRow) -> Self {
        Self {
            id: row.id,
            data: row.data,
            version: row.version,
        }
    }
}

// endregion: --- Row Model

// region:    --- Postgres Store
/// Record store backed by one JSONB table per resource kind.
pub struct PostgresStore {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<StoredRecord>, StoreError> {
        debug!("{:<12} --> list {}", "Postgres", kind);
        let sql = for_table(queries::LIST_RECORDS, kind.table());
        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(rows.into_iter().map(StoredRecord::from).collect())
    }

    async fn get(&self, kind: ResourceKind, id: &str) -> Result<Option<StoredRecord>, StoreError> {
        debug!("{:<12} --> get {} id: {}", "Postgres", kind, id);
        let sql = for_table(queries::GET_RECORD, kind.table());
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(row.map(StoredRecord::from))
    }

    async fn insert(
        &self,
        kind: ResourceKind,
        id: &str,
        data: Value,
    ) -> Result<StoredRecord, StoreError> {
        debug!("{:<12} --> insert {} id: {}", "Postgres", kind, id);
        let sql = for_table(queries::INSERT_RECORD, kind.table());
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id)
            .bind(&data)
            .fetch_optional(self.db_manager.pool())
            .await?
            .ok_or_else(|| StoreError::IdConflict {
                kind,
                id: id.to_string(),
            })?;
        Ok(row.into())
    }

    async fn replace(
        &self,
        kind: ResourceKind,
        id: &str,
        data: Value,
        expected_version: Option<i64>,
    ) -> Result<StoredRecord, StoreError> {
        debug!(
            "{:<12} --> replace {} id: {} expected version: {:?}",
            "Postgres", kind, id, expected_version
        );
        let id = id.to_string();
        let table = kind.table();

        self.db_manager
            .transaction(move |tx| {
                Box::pin(async move {
                    let updated = match expected_version {
                        Some(version) => {
                            let sql = for_table(queries::REPLACE_RECORD_IF_VERSION, table);
                            sqlx::query_as::<_, RecordRow>(&sql)
                                .bind(&id)
                                .bind(&data)
                                .bind(version)
                                .fetch_optional(&mut **tx)
                                .await?
                        }
                        None => {
                            let sql = for_table(queries::REPLACE_RECORD, table);
                            sqlx::query_as::<_, RecordRow>(&sql)
                                .bind(&id)
                                .bind(&data)
                                .fetch_optional(&mut **tx)
                                .await?
                        }
                    };

                    if let Some(row) = updated {
                        return Ok(StoredRecord::from(row));
                    }

                    // Nothing matched: either the record is gone or someone else wrote first
                    let sql = for_table(queries::RECORD_EXISTS, table);
                    let present: bool = sqlx::query(&sql)
                        .bind(&id)
                        .fetch_one(&mut **tx)
                        .await?
                        .get("present");

                    if present {
                        Err(StoreError::VersionConflict { kind, id })
                    } else {
                        Err(StoreError::NotFound { kind, id })
                    }
                })
            })
            .await
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<bool, StoreError> {
        debug!("{:<12} --> delete {} id: {}", "Postgres", kind, id);
        let sql = for_table(queries::DELETE_RECORD, kind.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.db_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// endregion: --- Postgres Store

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_placeholder_is_substituted() {
        let sql = for_table(queries::GET_RECORD, ResourceKind::Auctions.table());
        assert_eq!(sql, "SELECT id, data, version FROM auctions WHERE id = $1");
    }
}
// endregion: --- Tests
