//! Catalog repository

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use libris_domain::entities::{CatalogEntry, ChunkRow};
use libris_domain::error::Result;
use libris_domain::ports::CatalogRepository;
use libris_domain::value_objects::VectorHit;

use super::{fetch_hits, from_row, to_row};
use crate::store::{IndexKey, Table, TableStore};

/// Catalog table repository over the store
pub struct CatalogRepositoryImpl {
    store: Arc<dyn TableStore>,
}

impl CatalogRepositoryImpl {
    /// Create the repository
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CatalogRepository for CatalogRepositoryImpl {
    async fn bulk_insert(&self, rows: Vec<CatalogEntry>) -> Result<()> {
        let stored = rows
            .iter()
            .map(|row| to_row(row.id, row.vector.clone(), row))
            .collect::<Result<Vec<_>>>()?;
        self.store.insert(Table::Catalog, stored).await
    }

    async fn delete_by_filename(&self, filename: &str) -> Result<usize> {
        let ids = self
            .store
            .lookup_index(&IndexKey::CatalogFilename(filename.to_string()))
            .await?;
        if ids.is_empty() {
            return Ok(0);
        }
        self.store.delete(Table::Catalog, &ids).await
    }

    async fn count(&self) -> Result<usize> {
        self.store.count(Table::Catalog).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CatalogEntry>> {
        match self.store.get(Table::Catalog, id).await? {
            Some(row) => Ok(Some(from_row(Table::Catalog, row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<CatalogEntry>> {
        self.store
            .get_many(Table::Catalog, ids)
            .await?
            .into_iter()
            .map(|row| from_row(Table::Catalog, row))
            .collect()
    }

    async fn find_by_source(&self, filename: &str) -> Result<Option<CatalogEntry>> {
        let ids = self
            .store
            .lookup_index(&IndexKey::CatalogFilename(filename.to_string()))
            .await?;
        match ids.first() {
            Some(id) => self.find_by_id(*id).await,
            None => Ok(None),
        }
    }

    async fn find_by_category(&self, category_id: i32) -> Result<Vec<CatalogEntry>> {
        let ids = self
            .store
            .lookup_index(&IndexKey::CatalogCategory(category_id))
            .await?;
        self.find_by_ids(&ids).await
    }

    async fn concepts_in_category(&self, category_id: i32) -> Result<Vec<i32>> {
        let doc_ids = self
            .store
            .lookup_index(&IndexKey::CatalogCategory(category_id))
            .await?;

        let mut concept_ids = BTreeSet::new();
        for doc_id in doc_ids {
            let chunk_ids = self
                .store
                .lookup_index(&IndexKey::ChunkCatalog(doc_id))
                .await?;
            for row in self.store.get_many(Table::Chunks, &chunk_ids).await? {
                let chunk: ChunkRow = from_row(Table::Chunks, row)?;
                concept_ids.extend(chunk.concept_ids);
            }
        }
        Ok(concept_ids.into_iter().collect())
    }

    async fn vector_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorHit<CatalogEntry>>> {
        let scored = self.store.vector_search(Table::Catalog, vector, limit).await?;
        fetch_hits(&self.store, Table::Catalog, scored).await
    }
}
