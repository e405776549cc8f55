//! SQL for the record tables. `{table}` is substituted with a
//! [`super::ResourceKind::table`] name, never with caller input.

/// All records in creation order.
pub const LIST_RECORDS: &str = "SELECT id, data, version FROM {table} ORDER BY created_at, id";

/// One record.
pub const GET_RECORD: &str = "SELECT id, data, version FROM {table} WHERE id = $1";

/// New record at version 1, nothing if the id is taken.
pub const INSERT_RECORD: &str = r#"
    INSERT INTO {table} (id, data, version, created_at, updated_at)
    VALUES ($1, $2, 1, NOW(), NOW())
    ON CONFLICT (id) DO NOTHING
    RETURNING id, data, version
"#;

/// Unconditional overwrite.
pub const REPLACE_RECORD: &str = r#"
    UPDATE {table}
    SET data = $2, version = version + 1, updated_at = NOW()
    WHERE id = $1
    RETURNING id, data, version
"#;

/// Overwrite guarded by the version the caller read.
pub const REPLACE_RECORD_IF_VERSION: &str = r#"
    UPDATE {table}
    SET data = $2, version = version + 1, updated_at = NOW()
    WHERE id = $1 AND version = $3
    RETURNING id, data, version
"#;

/// Existence check used to tell a version conflict from a missing record.
pub const RECORD_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1) AS present";

/// Delete one record.
pub const DELETE_RECORD: &str = "DELETE FROM {table} WHERE id = $1";

pub fn for_table(sql: &str, table: &'static str) -> String {
    sql.replace("{table}", table)
}
