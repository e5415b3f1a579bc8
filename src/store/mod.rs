// src/store/mod.rs
//! Record store abstraction: a document-style key/value table API.
//!
//! Records are JSON objects keyed by their `url` field. Both tables use the
//! same key field; the table decides what the key *means* (full article url
//! vs. hostname).

pub mod file;
pub mod memory;

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// One stored record (a JSON object).
pub type Record = Map<String, Value>;

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backing store failure: {0}")]
    Backend(String),

    #[error("record for table `{table}` is missing its `{field}` key")]
    MissingKey {
        table: &'static str,
        field: &'static str,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store call exceeded {0:?}")]
    Timeout(Duration),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Article,
    NewsSource,
}

impl Table {
    pub const ALL: [Table; 2] = [Table::Article, Table::NewsSource];

    pub fn name(self) -> &'static str {
        match self {
            Table::Article => "article",
            Table::NewsSource => "newsSource",
        }
    }

    /// Field holding the primary key.
    pub fn key_field(self) -> &'static str {
        "url"
    }

    /// Extract the primary key from a record.
    pub fn key_of(self, record: &Record) -> StoreResult<String> {
        record
            .get(self.key_field())
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(StoreError::MissingKey {
                table: self.name(),
                field: self.key_field(),
            })
    }
}

/// `set <field> = <value>` for a single field of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAssignment {
    pub field: &'static str,
    pub value: Value,
}

impl FieldAssignment {
    pub fn new(field: &'static str, value: Value) -> Self {
        Self { field, value }
    }
}

/// One key-ordered slice of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Key to pass as `start_after` for the following page; `None` on the last page.
    pub next: Option<String>,
}

/// Trait for record store backends.
///
/// `put` must be idempotent: writing the same record twice leaves the same end
/// state. Concurrent ingestions of one new url rely on this instead of locking.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, table: Table, key: &str) -> StoreResult<Option<Record>>;

    /// Insert or replace a whole record. The key is read from the record.
    async fn put(&self, table: Table, record: Record) -> StoreResult<()>;

    /// Set one field of the record at `key`, leaving other fields untouched.
    /// An absent record is created holding only the key and the field.
    async fn update(&self, table: Table, key: &str, assignment: FieldAssignment)
        -> StoreResult<()>;

    /// Remove the record at `key`; succeeds when nothing is stored there.
    async fn delete(&self, table: Table, key: &str) -> StoreResult<()>;

    /// Every record of the table, unbounded.
    async fn scan(&self, table: Table) -> StoreResult<Vec<Record>>;

    /// Up to `limit` records with keys strictly greater than `start_after`, in key order.
    async fn scan_page(
        &self,
        table: Table,
        limit: usize,
        start_after: Option<&str>,
    ) -> StoreResult<Page<Record>> {
        let mut keyed = Vec::new();
        for record in self.scan(table).await? {
            let key = table.key_of(&record)?;
            if start_after.map_or(true, |after| key.as_str() > after) {
                keyed.push((key, record));
            }
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        let has_more = keyed.len() > limit;
        keyed.truncate(limit);
        let next = if has_more {
            keyed.last().map(|(k, _)| k.clone())
        } else {
            None
        };
        Ok(Page {
            items: keyed.into_iter().map(|(_, r)| r).collect(),
            next,
        })
    }
}
