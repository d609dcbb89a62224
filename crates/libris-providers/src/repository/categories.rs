//! Category repository

use std::sync::Arc;

use async_trait::async_trait;

use libris_domain::entities::CategoryRow;
use libris_domain::error::Result;
use libris_domain::ports::CategoryRepository;

use super::{from_row, to_row};
use crate::store::{IndexKey, Table, TableStore};

/// Category table repository over the store
pub struct CategoryRepositoryImpl {
    store: Arc<dyn TableStore>,
}

impl CategoryRepositoryImpl {
    /// Create the repository
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CategoryRepository for CategoryRepositoryImpl {
    async fn upsert(&self, row: CategoryRow) -> Result<()> {
        // Categories carry no embedding; the vector column stays empty.
        self.store
            .upsert(Table::Categories, to_row(row.id, Vec::new(), &row)?)
            .await
    }

    async fn count(&self) -> Result<usize> {
        self.store.count(Table::Categories).await
    }

    async fn find_all(&self) -> Result<Vec<CategoryRow>> {
        let ids = self.store.all_ids(Table::Categories).await?;
        let mut rows: Vec<CategoryRow> = self
            .store
            .get_many(Table::Categories, &ids)
            .await?
            .into_iter()
            .map(|row| from_row(Table::Categories, row))
            .collect::<Result<_>>()?;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRow>> {
        let ids = self
            .store
            .lookup_index(&IndexKey::CategoryName(name.to_lowercase()))
            .await?;
        match ids.first() {
            Some(id) => match self.store.get(Table::Categories, *id).await? {
                Some(row) => Ok(Some(from_row(Table::Categories, row)?)),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<CategoryRow>> {
        self.store
            .get_many(Table::Categories, ids)
            .await?
            .into_iter()
            .map(|row| from_row(Table::Categories, row))
            .collect()
    }
}
