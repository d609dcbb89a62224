//! Chunk repository

use std::sync::Arc;

use async_trait::async_trait;

use libris_domain::entities::{ChunkRow, ConceptRow};
use libris_domain::error::Result;
use libris_domain::ids::normalize_concept;
use libris_domain::ports::ChunkRepository;
use libris_domain::value_objects::VectorHit;

use super::{fetch_hits, from_row, to_row};
use crate::store::{IndexKey, Table, TableStore};

/// Chunk table repository over the store
pub struct ChunkRepositoryImpl {
    store: Arc<dyn TableStore>,
}

impl ChunkRepositoryImpl {
    /// Create the repository
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    async fn chunks_of_catalog(&self, catalog_id: i32, limit: usize) -> Result<Vec<ChunkRow>> {
        let ids = self
            .store
            .lookup_index(&IndexKey::ChunkCatalog(catalog_id))
            .await?;
        let capped: Vec<i32> = ids.into_iter().take(limit).collect();
        self.store
            .get_many(Table::Chunks, &capped)
            .await?
            .into_iter()
            .map(|row| from_row(Table::Chunks, row))
            .collect()
    }
}

#[async_trait]
impl ChunkRepository for ChunkRepositoryImpl {
    async fn bulk_insert(&self, rows: Vec<ChunkRow>) -> Result<()> {
        let stored = rows
            .iter()
            .map(|row| to_row(row.id, row.vector.clone(), row))
            .collect::<Result<Vec<_>>>()?;
        self.store.insert(Table::Chunks, stored).await
    }

    async fn delete_by_catalog_id(&self, catalog_id: i32) -> Result<usize> {
        let ids = self
            .store
            .lookup_index(&IndexKey::ChunkCatalog(catalog_id))
            .await?;
        if ids.is_empty() {
            return Ok(0);
        }
        self.store.delete(Table::Chunks, &ids).await
    }

    async fn count(&self) -> Result<usize> {
        self.store.count(Table::Chunks).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ChunkRow>> {
        match self.store.get(Table::Chunks, id).await? {
            Some(row) => Ok(Some(from_row(Table::Chunks, row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<ChunkRow>> {
        self.store
            .get_many(Table::Chunks, ids)
            .await?
            .into_iter()
            .map(|row| from_row(Table::Chunks, row))
            .collect()
    }

    async fn find_by_concept_name(&self, name: &str, limit: usize) -> Result<Vec<ChunkRow>> {
        let normalized = normalize_concept(name);
        let concept_ids = self
            .store
            .lookup_index(&IndexKey::ConceptName(normalized))
            .await?;
        let Some(concept_id) = concept_ids.first().copied() else {
            return Ok(Vec::new());
        };
        let Some(stored) = self.store.get(Table::Concepts, concept_id).await? else {
            return Ok(Vec::new());
        };
        let concept: ConceptRow = from_row(Table::Concepts, stored)?;

        let mut out = Vec::new();
        for catalog_id in &concept.catalog_ids {
            if out.len() >= limit {
                break;
            }
            let remaining = limit - out.len();
            let chunks = self.chunks_of_catalog(*catalog_id, usize::MAX).await?;
            out.extend(
                chunks
                    .into_iter()
                    .filter(|chunk| chunk.concept_ids.contains(&concept.id))
                    .take(remaining),
            );
        }
        Ok(out)
    }

    async fn find_by_source(&self, filename: &str, limit: usize) -> Result<Vec<ChunkRow>> {
        let catalog_ids = self
            .store
            .lookup_index(&IndexKey::CatalogFilename(filename.to_string()))
            .await?;
        match catalog_ids.first() {
            Some(catalog_id) => self.chunks_of_catalog(*catalog_id, limit).await,
            None => Ok(Vec::new()),
        }
    }

    async fn find_by_catalog_id(&self, catalog_id: i32, limit: usize) -> Result<Vec<ChunkRow>> {
        self.chunks_of_catalog(catalog_id, limit).await
    }

    async fn vector_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorHit<ChunkRow>>> {
        let scored = self.store.vector_search(Table::Chunks, vector, limit).await?;
        fetch_hits(&self.store, Table::Chunks, scored).await
    }
}
