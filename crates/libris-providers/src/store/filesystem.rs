//! Filesystem table store
//!
//! Persists each table as a JSON-lines file under the store root. The whole
//! working set is loaded at open and kept in [`TableState`]; inserts append
//! to the table file, deletes and upserts rewrite it atomically through a
//! temp-file rename. Ingestion is an offline batch, so write amplification
//! on rewrite is acceptable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::info;

use libris_domain::error::{Error, Result};

use super::state::TableState;
use super::{IndexKey, StoredRow, Table, TableStore};

/// JSON-lines store rooted at a directory
pub struct FilesystemTableStore {
    root: PathBuf,
    tables: HashMap<Table, RwLock<TableState>>,
}

impl FilesystemTableStore {
    /// Open or create a store under `root`
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            Error::io_with_source(
                format!("failed to create store root {}", root.display()),
                e,
            )
        })?;

        let mut tables = HashMap::new();
        for table in Table::ALL {
            let mut state = TableState::new(table);
            let path = table_path(&root, table);
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    for (line_no, line) in content.lines().enumerate() {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let row: StoredRow = serde_json::from_str(line).map_err(|e| {
                            Error::vector_db(format!(
                                "corrupt row in {} line {}: {}",
                                path.display(),
                                line_no + 1,
                                e
                            ))
                        })?;
                        state.insert(row);
                    }
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(Error::io_with_source(
                        format!("failed to read {}", path.display()),
                        err,
                    ));
                }
            }
            info!(table = table.name(), rows = state.len(), "table loaded");
            tables.insert(table, RwLock::new(state));
        }

        Ok(Self { root, tables })
    }

    fn table(&self, table: Table) -> Result<&RwLock<TableState>> {
        self.tables
            .get(&table)
            .ok_or_else(|| Error::vector_db(format!("unknown table '{}'", table.name())))
    }

    /// Append rows to the table file
    async fn append(&self, table: Table, rows: &[StoredRow]) -> Result<()> {
        let path = table_path(&self.root, table);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                Error::io_with_source(format!("failed to open {}", path.display()), e)
            })?;
        let mut buffer = String::new();
        for row in rows {
            buffer.push_str(&serde_json::to_string(row)?);
            buffer.push('\n');
        }
        file.write_all(buffer.as_bytes()).await.map_err(|e| {
            Error::io_with_source(format!("failed to append to {}", path.display()), e)
        })?;
        file.flush().await.map_err(|e| {
            Error::io_with_source(format!("failed to flush {}", path.display()), e)
        })?;
        Ok(())
    }

    /// Rewrite the table file from the in-memory state, atomically
    async fn rewrite(&self, table: Table, state: &TableState) -> Result<()> {
        let path = table_path(&self.root, table);
        let mut buffer = String::new();
        let mut rows: Vec<&StoredRow> = state.rows().collect();
        rows.sort_by_key(|row| row.id);
        for row in rows {
            buffer.push_str(&serde_json::to_string(row)?);
            buffer.push('\n');
        }
        let tmp = path.with_extension("jsonl.tmp");
        tokio::fs::write(&tmp, buffer).await.map_err(|e| {
            Error::io_with_source(format!("failed to write {}", tmp.display()), e)
        })?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            Error::io_with_source(format!("failed to replace {}", path.display()), e)
        })?;
        Ok(())
    }
}

fn table_path(root: &Path, table: Table) -> PathBuf {
    root.join(format!("{}.jsonl", table.name()))
}

#[async_trait]
impl TableStore for FilesystemTableStore {
    async fn insert(&self, table: Table, rows: Vec<StoredRow>) -> Result<()> {
        let mut state = self.table(table)?.write().await;
        self.append(table, &rows).await?;
        for row in rows {
            state.insert(row);
        }
        Ok(())
    }

    async fn upsert(&self, table: Table, row: StoredRow) -> Result<()> {
        let mut state = self.table(table)?.write().await;
        state.insert(row);
        self.rewrite(table, &state).await
    }

    async fn delete(&self, table: Table, ids: &[i32]) -> Result<usize> {
        let mut state = self.table(table)?.write().await;
        let removed = ids.iter().filter(|id| state.remove(**id)).count();
        if removed > 0 {
            self.rewrite(table, &state).await?;
        }
        Ok(removed)
    }

    async fn get(&self, table: Table, id: i32) -> Result<Option<StoredRow>> {
        Ok(self.table(table)?.read().await.get(id).cloned())
    }

    async fn get_many(&self, table: Table, ids: &[i32]) -> Result<Vec<StoredRow>> {
        let state = self.table(table)?.read().await;
        Ok(ids.iter().filter_map(|id| state.get(*id).cloned()).collect())
    }

    async fn count(&self, table: Table) -> Result<usize> {
        Ok(self.table(table)?.read().await.len())
    }

    async fn lookup_index(&self, key: &IndexKey) -> Result<Vec<i32>> {
        let table = match key {
            IndexKey::CatalogFilename(_) | IndexKey::CatalogCategory(_) => Table::Catalog,
            IndexKey::ChunkCatalog(_) => Table::Chunks,
            IndexKey::ConceptName(_) => Table::Concepts,
            IndexKey::CategoryName(_) => Table::Categories,
        };
        Ok(self.table(table)?.read().await.lookup(&key.encode()))
    }

    async fn prefix_scan(&self, prefix: &str, limit: usize) -> Result<Vec<i32>> {
        Ok(self
            .table(Table::Concepts)?
            .read()
            .await
            .prefix_scan(prefix, limit))
    }

    async fn all_ids(&self, table: Table) -> Result<Vec<i32>> {
        Ok(self.table(table)?.read().await.all_ids())
    }

    async fn vector_search(
        &self,
        table: Table,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<(i32, f32)>> {
        Ok(self.table(table)?.write().await.vector_search(vector, limit))
    }

    fn provider_name(&self) -> &str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_row(id: i32, catalog_id: i32) -> StoredRow {
        StoredRow {
            id,
            vector: vec![0.5, 0.5],
            payload: serde_json::json!({"catalog_id": catalog_id, "text": "body"}),
        }
    }

    #[tokio::test]
    async fn reopen_recovers_rows_and_indexes() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FilesystemTableStore::open(dir.path()).await.unwrap();
            store
                .insert(Table::Chunks, vec![chunk_row(1, 10), chunk_row(2, 10)])
                .await
                .unwrap();
        }

        let reopened = FilesystemTableStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.count(Table::Chunks).await.unwrap(), 2);
        let ids = reopened
            .lookup_index(&IndexKey::ChunkCatalog(10))
            .await
            .unwrap();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn delete_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FilesystemTableStore::open(dir.path()).await.unwrap();
            store
                .insert(Table::Chunks, vec![chunk_row(1, 10), chunk_row(2, 11)])
                .await
                .unwrap();
            assert_eq!(store.delete(Table::Chunks, &[1]).await.unwrap(), 1);
        }
        let reopened = FilesystemTableStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.count(Table::Chunks).await.unwrap(), 1);
        assert!(reopened.get(Table::Chunks, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_with_same_id_replaces_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemTableStore::open(dir.path()).await.unwrap();
        store.insert(Table::Chunks, vec![chunk_row(1, 10)]).await.unwrap();
        store.insert(Table::Chunks, vec![chunk_row(1, 12)]).await.unwrap();
        assert_eq!(store.count(Table::Chunks).await.unwrap(), 1);

        // The appended duplicate is resolved at load: the later line wins.
        let reopened = FilesystemTableStore::open(dir.path()).await.unwrap();
        let row = reopened.get(Table::Chunks, 1).await.unwrap().unwrap();
        assert_eq!(row.payload["catalog_id"], 12);
        assert_eq!(reopened.count(Table::Chunks).await.unwrap(), 1);
    }
}
