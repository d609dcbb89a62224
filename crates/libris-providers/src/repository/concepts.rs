//! Concept repository
//!
//! Concept upserts are read-modify-write and are serialized per concept id
//! behind an async mutex, so concurrent ingestion of documents sharing a
//! concept cannot lose updates.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use libris_domain::entities::ConceptRow;
use libris_domain::error::Result;
use libris_domain::ids::normalize_concept;
use libris_domain::ports::ConceptRepository;
use libris_domain::value_objects::VectorHit;

use super::{fetch_hits, from_row, to_row};
use crate::store::{IndexKey, Table, TableStore};

/// Related concepts kept per row after a merge
const MAX_RELATED: usize = 10;

/// Concept table repository over the store
pub struct ConceptRepositoryImpl {
    store: Arc<dyn TableStore>,
    merge_locks: DashMap<i32, Arc<Mutex<()>>>,
}

impl ConceptRepositoryImpl {
    /// Create the repository
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            store,
            merge_locks: DashMap::new(),
        }
    }

    fn lock_for(&self, id: i32) -> Arc<Mutex<()>> {
        self.merge_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl ConceptRepository for ConceptRepositoryImpl {
    async fn bulk_insert(&self, rows: Vec<ConceptRow>) -> Result<()> {
        let stored = rows
            .iter()
            .map(|row| to_row(row.id, row.vector.clone(), row))
            .collect::<Result<Vec<_>>>()?;
        self.store.insert(Table::Concepts, stored).await
    }

    async fn merge(&self, row: ConceptRow) -> Result<ConceptRow> {
        let lock = self.lock_for(row.id);
        let _guard = lock.lock().await;

        let merged = match self.store.get(Table::Concepts, row.id).await? {
            Some(stored) => {
                let mut current: ConceptRow = from_row(Table::Concepts, stored)?;
                for doc_id in row.catalog_ids {
                    if !current.catalog_ids.contains(&doc_id) {
                        current.catalog_ids.push(doc_id);
                    }
                }
                current.catalog_ids.sort_unstable();
                current.weight = current.catalog_ids.len() as i32;

                for related in row.related_concept_ids {
                    if !current.related_concept_ids.contains(&related) {
                        current.related_concept_ids.push(related);
                    }
                }
                current.related_concept_ids.truncate(MAX_RELATED);

                merge_strings(&mut current.synonyms, row.synonyms);
                merge_strings(&mut current.broader_terms, row.broader_terms);
                merge_strings(&mut current.narrower_terms, row.narrower_terms);

                if current.vector.is_empty() {
                    current.vector = row.vector;
                }
                current
            }
            None => {
                let mut fresh = row;
                fresh.catalog_ids.sort_unstable();
                fresh.catalog_ids.dedup();
                fresh.weight = fresh.catalog_ids.len() as i32;
                fresh.related_concept_ids.truncate(MAX_RELATED);
                fresh
            }
        };

        self.store
            .upsert(
                Table::Concepts,
                to_row(merged.id, merged.vector.clone(), &merged)?,
            )
            .await?;
        Ok(merged)
    }

    async fn count(&self) -> Result<usize> {
        self.store.count(Table::Concepts).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ConceptRow>> {
        match self.store.get(Table::Concepts, id).await? {
            Some(row) => Ok(Some(from_row(Table::Concepts, row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<ConceptRow>> {
        self.store
            .get_many(Table::Concepts, ids)
            .await?
            .into_iter()
            .map(|row| from_row(Table::Concepts, row))
            .collect()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ConceptRow>> {
        let ids = self
            .store
            .lookup_index(&IndexKey::ConceptName(normalize_concept(name)))
            .await?;
        match ids.first() {
            Some(id) => self.find_by_id(*id).await,
            None => Ok(None),
        }
    }

    async fn search(
        &self,
        query_vector: &[f32],
        query_text: &str,
        limit: usize,
    ) -> Result<Vec<VectorHit<ConceptRow>>> {
        // Exact-prefix matches rank ahead of vector neighbors at distance 0.
        let prefix = IndexKey::concept_name_prefix(&normalize_concept(query_text));
        let mut scored: Vec<(i32, f32)> = self
            .store
            .prefix_scan(&prefix, limit)
            .await?
            .into_iter()
            .map(|id| (id, 0.0))
            .collect();

        for (id, distance) in self
            .store
            .vector_search(Table::Concepts, query_vector, limit)
            .await?
        {
            if !scored.iter().any(|(seen, _)| *seen == id) {
                scored.push((id, distance));
            }
        }
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(limit);

        fetch_hits(&self.store, Table::Concepts, scored).await
    }

    async fn find_related(&self, name: &str, limit: usize) -> Result<Vec<ConceptRow>> {
        let Some(row) = self.find_by_name(name).await? else {
            return Ok(Vec::new());
        };
        let ids: Vec<i32> = row.related_concept_ids.into_iter().take(limit).collect();
        self.find_by_ids(&ids).await
    }

    async fn vector_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorHit<ConceptRow>>> {
        let scored = self
            .store
            .vector_search(Table::Concepts, vector, limit)
            .await?;
        fetch_hits(&self.store, Table::Concepts, scored).await
    }
}

fn merge_strings(target: &mut Vec<String>, incoming: Vec<String>) {
    for value in incoming {
        if !target.iter().any(|v| v.eq_ignore_ascii_case(&value)) {
            target.push(value);
        }
    }
}
