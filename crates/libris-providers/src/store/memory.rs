//! In-memory table store
//!
//! Non-persistent backend for tests and development. The four tables live
//! in a concurrent map keyed by table; vector search takes a mutable entry
//! because it may rebuild the lazy index.

use async_trait::async_trait;
use dashmap::DashMap;

use libris_domain::error::{Error, Result};

use super::state::TableState;
use super::{IndexKey, StoredRow, Table, TableStore};

/// In-memory store over the four tables
pub struct MemoryTableStore {
    tables: DashMap<Table, TableState>,
}

impl MemoryTableStore {
    /// Create an empty store
    pub fn new() -> Self {
        let tables = DashMap::new();
        for table in Table::ALL {
            tables.insert(table, TableState::new(table));
        }
        Self { tables }
    }

    fn read(&self, table: Table) -> Result<dashmap::mapref::one::Ref<'_, Table, TableState>> {
        self.tables
            .get(&table)
            .ok_or_else(|| Error::vector_db(format!("unknown table '{}'", table.name())))
    }

    fn write(&self, table: Table) -> Result<dashmap::mapref::one::RefMut<'_, Table, TableState>> {
        self.tables
            .get_mut(&table)
            .ok_or_else(|| Error::vector_db(format!("unknown table '{}'", table.name())))
    }
}

impl Default for MemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn insert(&self, table: Table, rows: Vec<StoredRow>) -> Result<()> {
        let mut state = self.write(table)?;
        for row in rows {
            state.insert(row);
        }
        Ok(())
    }

    async fn upsert(&self, table: Table, row: StoredRow) -> Result<()> {
        self.write(table)?.insert(row);
        Ok(())
    }

    async fn delete(&self, table: Table, ids: &[i32]) -> Result<usize> {
        let mut state = self.write(table)?;
        Ok(ids.iter().filter(|id| state.remove(**id)).count())
    }

    async fn get(&self, table: Table, id: i32) -> Result<Option<StoredRow>> {
        Ok(self.read(table)?.get(id).cloned())
    }

    async fn get_many(&self, table: Table, ids: &[i32]) -> Result<Vec<StoredRow>> {
        let state = self.read(table)?;
        Ok(ids.iter().filter_map(|id| state.get(*id).cloned()).collect())
    }

    async fn count(&self, table: Table) -> Result<usize> {
        Ok(self.read(table)?.len())
    }

    async fn lookup_index(&self, key: &IndexKey) -> Result<Vec<i32>> {
        let table = match key {
            IndexKey::CatalogFilename(_) | IndexKey::CatalogCategory(_) => Table::Catalog,
            IndexKey::ChunkCatalog(_) => Table::Chunks,
            IndexKey::ConceptName(_) => Table::Concepts,
            IndexKey::CategoryName(_) => Table::Categories,
        };
        Ok(self.read(table)?.lookup(&key.encode()))
    }

    async fn prefix_scan(&self, prefix: &str, limit: usize) -> Result<Vec<i32>> {
        // Concept names are the only prefix-scanned key space.
        Ok(self.read(Table::Concepts)?.prefix_scan(prefix, limit))
    }

    async fn all_ids(&self, table: Table) -> Result<Vec<i32>> {
        Ok(self.read(table)?.all_ids())
    }

    async fn vector_search(
        &self,
        table: Table,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<(i32, f32)>> {
        Ok(self.write(table)?.vector_search(vector, limit))
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}
