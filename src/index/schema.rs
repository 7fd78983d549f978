//! SQL schema for the SQLite index backend
//!
//! The index name is the table name; callers validate it as an identifier
//! before it is spliced into SQL.

/// SQL creating one index table and its url lookup index
pub fn create_index_sql(table: &str) -> String {
    format!(
        r#"
-- One row per crawled page, keyed by the URL digest
CREATE TABLE IF NOT EXISTS {table} (
    id TEXT PRIMARY KEY CHECK (length(id) > 0),
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    content TEXT NOT NULL,
    -- content after HTML stripping and tokenization
    content_text TEXT NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_{table}_url ON {table}(url);
"#
    )
}

/// Initializes the index table
pub fn initialize_schema(conn: &rusqlite::Connection, table: &str) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&create_index_sql(table))?;
    Ok(())
}

/// Returns true if `table` exists
pub fn table_exists(conn: &rusqlite::Connection, table: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
