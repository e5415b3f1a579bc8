// src/store/memory.rs
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::{FieldAssignment, Record, RecordStore, StoreError, StoreResult, Table};

type Tables = HashMap<Table, BTreeMap<String, Record>>;

/// Process-local store. Tables are key-ordered so scans are deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held by `table`.
    pub fn len(&self, table: Table) -> usize {
        self.tables
            .read()
            .map(|t| t.get(&table).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, table: Table) -> bool {
        self.len(table) == 0
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, table: Table, key: &str) -> StoreResult<Option<Record>> {
        let tables = self.read()?;
        Ok(tables.get(&table).and_then(|t| t.get(key)).cloned())
    }

    async fn put(&self, table: Table, record: Record) -> StoreResult<()> {
        let key = table.key_of(&record)?;
        self.write()?.entry(table).or_default().insert(key, record);
        Ok(())
    }

    async fn update(
        &self,
        table: Table,
        key: &str,
        assignment: FieldAssignment,
    ) -> StoreResult<()> {
        let mut tables = self.write()?;
        let record = tables
            .entry(table)
            .or_default()
            .entry(key.to_string())
            .or_insert_with(|| {
                let mut r = Record::new();
                r.insert(table.key_field().to_string(), key.into());
                r
            });
        record.insert(assignment.field.to_string(), assignment.value);
        Ok(())
    }

    async fn delete(&self, table: Table, key: &str) -> StoreResult<()> {
        if let Some(t) = self.write()?.get_mut(&table) {
            t.remove(key);
        }
        Ok(())
    }

    async fn scan(&self, table: Table) -> StoreResult<Vec<Record>> {
        let tables = self.read()?;
        Ok(tables
            .get(&table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }
}
