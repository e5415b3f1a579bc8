// src/store/file.rs
//! JSON-file store: one `<table>.json` object per table, keyed by record key.
//!
//! Each operation runs load-modify-save as one blocking task under a process
//! lock, so a caller that stops waiting (e.g. on timeout) cannot interleave
//! with the next operation. Saves go through a fresh temp file in the store
//! directory that is renamed over the table file. Single-process only.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tempfile::NamedTempFile;

use super::{FieldAssignment, Record, RecordStore, StoreError, StoreResult, Table};

type TableFile = BTreeMap<String, Record>;

pub struct FileStore {
    dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating store dir {}", dir.display()))?;
        Ok(Self {
            dir,
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Run `op` on the table's contents on the blocking pool, holding the store lock.
    /// The table is written back when `op` reports a change.
    async fn with_table<T, F>(&self, table: Table, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut TableFile) -> StoreResult<(T, bool)> + Send + 'static,
    {
        let dir = self.dir.clone();
        let lock = self.lock.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = lock
                .lock()
                .map_err(|_| StoreError::Backend("file store lock poisoned".into()))?;
            let path = dir.join(format!("{}.json", table.name()));
            let mut data = load(&path)?;
            let (out, changed) = op(&mut data)?;
            if changed {
                save(&dir, &path, &data)?;
            }
            Ok(out)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("file store task failed: {e}")))?
    }
}

fn load(path: &Path) -> StoreResult<TableFile> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Ok(TableFile::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TableFile::new()),
        Err(e) => Err(e.into()),
    }
}

fn save(dir: &Path, path: &Path, data: &TableFile) -> StoreResult<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, data)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[async_trait::async_trait]
impl RecordStore for FileStore {
    async fn get(&self, table: Table, key: &str) -> StoreResult<Option<Record>> {
        let key = key.to_string();
        self.with_table(table, move |data| Ok((data.remove(&key), false)))
            .await
    }

    async fn put(&self, table: Table, record: Record) -> StoreResult<()> {
        let key = table.key_of(&record)?;
        self.with_table(table, move |data| {
            data.insert(key, record);
            Ok(((), true))
        })
        .await
    }

    async fn update(
        &self,
        table: Table,
        key: &str,
        assignment: FieldAssignment,
    ) -> StoreResult<()> {
        let key = key.to_string();
        self.with_table(table, move |data| {
            let record = data.entry(key.clone()).or_insert_with(|| {
                let mut r = Record::new();
                r.insert(table.key_field().to_string(), key.into());
                r
            });
            record.insert(assignment.field.to_string(), assignment.value);
            Ok(((), true))
        })
        .await
    }

    async fn delete(&self, table: Table, key: &str) -> StoreResult<()> {
        let key = key.to_string();
        self.with_table(table, move |data| Ok(((), data.remove(&key).is_some())))
            .await
    }

    async fn scan(&self, table: Table) -> StoreResult<Vec<Record>> {
        self.with_table(table, |data| {
            Ok((std::mem::take(data).into_values().collect(), false))
        })
        .await
    }
}
