//! SQLite index backend
//!
//! This module provides a SQLite-based implementation of the `Indexer` trait,
//! useful for local runs and tests without a search cluster.

use crate::config::is_valid_index_name;
use crate::index::analyzer::{strip_html, tokenize};
use crate::index::schema::{initialize_schema, table_exists};
use crate::index::{CrawlDocument, Indexer, PageSummary, SearchQuery};
use crate::{IndexError, IndexResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite index backend
pub struct SqliteIndexer {
    conn: Mutex<Connection>,
    table: String,
}

impl SqliteIndexer {
    /// Opens (or creates) the database file at `path`
    ///
    /// The table itself is created by [`Indexer::ensure_index`].
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `table` - Index name, used as the table name
    pub fn open(path: &Path, table: &str) -> IndexResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        Self::with_connection(conn, table)
    }

    /// Creates an in-memory index
    pub fn open_in_memory(table: &str) -> IndexResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, table)
    }

    fn with_connection(conn: Connection, table: &str) -> IndexResult<Self> {
        if !is_valid_index_name(table) {
            return Err(IndexError::Schema(format!("invalid index name '{}'", table)));
        }

        Ok(Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of documents in the index
    pub fn count_documents(&self) -> IndexResult<u64> {
        let conn = self.conn();
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| {
            row.get(0)
        })?;
        Ok(count as u64)
    }
}

/// Maps SQLite failures onto the index error classes
///
/// Constraint violations and SQL errors (missing table or column) are
/// structural; everything else (busy, locked, I/O) is transient.
fn classify_write_error(error: rusqlite::Error) -> IndexError {
    match &error {
        rusqlite::Error::SqliteFailure(failure, message)
            if matches!(
                failure.code,
                ErrorCode::ConstraintViolation | ErrorCode::Unknown
            ) =>
        {
            IndexError::Schema(message.clone().unwrap_or_else(|| failure.to_string()))
        }
        _ => IndexError::Sqlite(error),
    }
}

#[async_trait]
impl Indexer for SqliteIndexer {
    fn index_name(&self) -> &str {
        &self.table
    }

    async fn ensure_index(&self) -> IndexResult<()> {
        let conn = self.conn();
        if table_exists(&conn, &self.table)? {
            tracing::debug!("Index {} already exists", self.table);
            return Ok(());
        }

        tracing::debug!("Index {} does not exist, creating", self.table);
        initialize_schema(&conn, &self.table)?;
        Ok(())
    }

    async fn put_document(&self, doc: &CrawlDocument) -> IndexResult<()> {
        let content_text = tokenize(&strip_html(&doc.content)).join(" ");
        let now = Utc::now().to_rfc3339();

        let conn = self.conn();
        conn.execute(
            &format!(
                "INSERT INTO {} (id, title, url, content, content_text, indexed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    url = excluded.url,
                    content = excluded.content,
                    content_text = excluded.content_text,
                    indexed_at = excluded.indexed_at",
                self.table
            ),
            params![doc.id, doc.title, doc.url, doc.content, content_text, now],
        )
        .map_err(classify_write_error)?;
        Ok(())
    }

    async fn search(&self, query: &SearchQuery) -> IndexResult<Vec<PageSummary>> {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        // Any token of a field matches that field; all given fields must match
        for (field, text) in query.matches() {
            let tokens = tokenize(text);
            if tokens.is_empty() {
                return Ok(Vec::new());
            }
            // Content is matched on whole tokens of the stripped text
            let whole_tokens = field == "content";
            let column = if whole_tokens {
                "(' ' || content_text || ' ')".to_string()
            } else {
                format!("lower({})", field)
            };
            let any = vec![format!("{} LIKE ?", column); tokens.len()].join(" OR ");
            clauses.push(format!("({})", any));
            values.extend(tokens.iter().map(|t| {
                Value::Text(if whole_tokens {
                    format!("% {} %", t)
                } else {
                    format!("%{}%", t)
                })
            }));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT id, title, url FROM {} {} ORDER BY url LIMIT ? OFFSET ?",
            self.table, where_clause
        );
        values.push(Value::Integer(i64::from(query.size)));
        values.push(Value::Integer(query.offset() as i64));

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let hits = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok(PageSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    url: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(hits)
    }

    async fn get_document(&self, id: &str) -> IndexResult<Option<CrawlDocument>> {
        let conn = self.conn();
        let doc = conn
            .query_row(
                &format!(
                    "SELECT id, title, url, content FROM {} WHERE id = ?1",
                    self.table
                ),
                params![id],
                |row| {
                    Ok(CrawlDocument {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        url: row.get(2)?,
                        content: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(doc)
    }
}
