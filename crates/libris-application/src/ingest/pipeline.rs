//! Concept extraction pipeline
//!
//! Turns one source document into catalog, chunk, concept and category rows.
//! Extraction runs in batches against the LLM provider; a failed batch
//! degrades to chunks without concept references instead of failing the
//! document, and the report records the incomplete coverage.
//!
//! Re-ingest is idempotent by `(filename, content hash)`: unchanged content
//! short-circuits, changed content cascade-deletes the previous rows first.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use libris_domain::entities::{CatalogEntry, CategoryRow, ChunkRow, ConceptRow};
use libris_domain::error::{Error, Result};
use libris_domain::ids::{chunk_id, content_hash, hash_to_id, normalize_concept};
use libris_domain::ports::{
    CatalogRepository, CategoryRepository, ChunkRepository, ConceptExtractor, ConceptRepository,
    DocumentLoader, EmbeddingProvider, LexiconProvider,
};
use libris_domain::value_objects::ExtractedConcepts;
use serde::Serialize;
use tracing::{info, warn};

use super::chunker::{chunk_segments, ChunkerConfig, PendingChunk};

/// Chunks per extraction batch, sized to the LLM context window
const EXTRACTION_BATCH: usize = 8;
/// Maximum categories stored per document
const MAX_CATEGORIES: usize = 7;
/// Related concepts kept per concept row
const MAX_RELATED: usize = 10;
/// Characters of document text offered to the summarizer
const SUMMARY_INPUT_CHARS: usize = 4000;

/// What happened to a document during ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    /// New document written
    Ingested,
    /// Same filename and content hash already present; nothing written
    Unchanged,
    /// Filename existed with different content; replaced
    Reingested,
}

/// Outcome of ingesting one document
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// Source basename
    pub filename: String,
    /// What was done
    pub status: IngestStatus,
    /// Chunks written
    pub chunk_count: usize,
    /// Distinct concepts linked to the document
    pub concept_count: usize,
    /// Categories applied to the document
    pub categories: Vec<String>,
    /// False when one or more extraction batches degraded
    pub extraction_complete: bool,
}

/// The ingestion pipeline
pub struct IngestionPipeline {
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: Arc<dyn ConceptExtractor>,
    lexicon: Arc<dyn LexiconProvider>,
    catalog: Arc<dyn CatalogRepository>,
    chunks: Arc<dyn ChunkRepository>,
    concepts: Arc<dyn ConceptRepository>,
    categories: Arc<dyn CategoryRepository>,
    chunker: ChunkerConfig,
}

impl IngestionPipeline {
    /// Create the pipeline with its dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn EmbeddingProvider>,
        extractor: Arc<dyn ConceptExtractor>,
        lexicon: Arc<dyn LexiconProvider>,
        catalog: Arc<dyn CatalogRepository>,
        chunks: Arc<dyn ChunkRepository>,
        concepts: Arc<dyn ConceptRepository>,
        categories: Arc<dyn CategoryRepository>,
        chunker: ChunkerConfig,
    ) -> Self {
        Self {
            loader,
            embedder,
            extractor,
            lexicon,
            catalog,
            chunks,
            concepts,
            categories,
            chunker,
        }
    }

    /// Ingest one source document
    pub async fn ingest_path(&self, path: &Path) -> Result<IngestReport> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::validation(format!("invalid source path: {}", path.display())))?
            .to_string();

        let segments = self.loader.load(path).await?;
        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        if full_text.trim().is_empty() {
            return Err(Error::validation(format!(
                "document '{}' contains no extractable text",
                filename
            )));
        }
        let hash = content_hash(full_text.as_bytes());

        let status = match self.catalog.find_by_source(&filename).await? {
            Some(existing) if existing.hash == hash => {
                info!(filename = %filename, "content unchanged; skipping re-ingest");
                return Ok(IngestReport {
                    filename,
                    status: IngestStatus::Unchanged,
                    chunk_count: 0,
                    concept_count: 0,
                    categories: Vec::new(),
                    extraction_complete: true,
                });
            }
            Some(existing) => {
                let removed = self.chunks.delete_by_catalog_id(existing.id).await?;
                self.catalog.delete_by_filename(&filename).await?;
                info!(
                    filename = %filename,
                    chunks_removed = removed,
                    "content changed; re-ingesting"
                );
                IngestStatus::Reingested
            }
            None => IngestStatus::Ingested,
        };

        let pending = chunk_segments(&segments, &self.chunker);
        if pending.is_empty() {
            return Err(Error::internal(format!(
                "chunker produced no chunks for '{}'",
                filename
            )));
        }

        let (extraction, chunk_concepts, extraction_complete) =
            self.extract_in_batches(&filename, &pending).await;

        let mut categories = extraction.categories.clone();
        categories.truncate(MAX_CATEGORIES);
        let category_ids: Vec<i32> = categories
            .iter()
            .map(|name| hash_to_id(&name.to_lowercase()))
            .collect();

        let doc_id = hash_to_id(&filename);
        let summary = self.summarize(&full_text, &pending).await;
        let summary_vector = self.embedder.embed(&summary).await?.vector;

        self.catalog
            .bulk_insert(vec![CatalogEntry {
                id: doc_id,
                filename: filename.clone(),
                hash: hash.clone(),
                text: summary,
                vector: summary_vector,
                category_ids: category_ids.clone(),
                title: String::new(),
                author: String::new(),
                year: String::new(),
                publisher: String::new(),
                isbn: String::new(),
            }])
            .await?;

        let rows = self
            .build_chunk_rows(
                &filename,
                doc_id,
                &hash,
                &pending,
                &chunk_concepts,
                &category_ids,
            )
            .await?;
        let chunk_count = rows.len();
        self.chunks.bulk_insert(rows).await?;

        let concept_count = self
            .upsert_concepts(doc_id, &extraction.primary_concepts, &chunk_concepts)
            .await?;
        self.recount_categories(&categories, &category_ids).await?;

        if !extraction_complete {
            warn!(
                filename = %filename,
                "concept coverage incomplete: one or more extraction batches degraded"
            );
        }
        info!(
            filename = %filename,
            chunks = chunk_count,
            concepts = concept_count,
            categories = categories.len(),
            "document ingested"
        );

        Ok(IngestReport {
            filename,
            status,
            chunk_count,
            concept_count,
            categories,
            extraction_complete,
        })
    }

    /// Run extraction over chunk batches, assigning concepts to chunks
    ///
    /// Returns the merged extraction, the per-chunk concept name lists, and
    /// whether every batch succeeded. A failed batch leaves its chunks
    /// without concepts.
    async fn extract_in_batches(
        &self,
        filename: &str,
        pending: &[PendingChunk],
    ) -> (ExtractedConcepts, Vec<Vec<String>>, bool) {
        let mut merged = ExtractedConcepts::default();
        let mut chunk_concepts: Vec<Vec<String>> = vec![Vec::new(); pending.len()];
        let mut complete = true;

        for (batch_index, batch) in pending.chunks(EXTRACTION_BATCH).enumerate() {
            let joined = batch
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            let extracted = match self.extractor.extract(&joined).await {
                Ok(extracted) => extracted,
                Err(err) => {
                    warn!(
                        filename = %filename,
                        batch = batch_index,
                        error = %err,
                        "extraction batch degraded to empty concepts"
                    );
                    complete = false;
                    continue;
                }
            };

            let start = batch_index * EXTRACTION_BATCH;
            assign_batch_concepts(
                &extracted.primary_concepts,
                batch,
                &mut chunk_concepts[start..start + batch.len()],
            );
            merged.merge(extracted);
        }

        (merged, chunk_concepts, complete)
    }

    /// Document summary via the extractor, falling back to the first chunk
    async fn summarize(&self, full_text: &str, pending: &[PendingChunk]) -> String {
        let input: String = full_text.chars().take(SUMMARY_INPUT_CHARS).collect();
        match self.extractor.summarize(&input).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => pending[0].text.clone(),
            Err(err) => {
                warn!(error = %err, "summary generation degraded to first chunk");
                pending[0].text.clone()
            }
        }
    }

    /// Embed and assemble chunk rows
    async fn build_chunk_rows(
        &self,
        filename: &str,
        doc_id: i32,
        hash: &str,
        pending: &[PendingChunk],
        chunk_concepts: &[Vec<String>],
        category_ids: &[i32],
    ) -> Result<Vec<ChunkRow>> {
        let texts: Vec<String> = pending.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        Ok(pending
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(ordinal, (chunk, embedding))| {
                let concept_ids: Vec<i32> = chunk_concepts[ordinal]
                    .iter()
                    .map(|name| hash_to_id(&normalize_concept(name)))
                    .collect();
                ChunkRow {
                    id: chunk_id(filename, ordinal),
                    catalog_id: doc_id,
                    hash: hash.to_string(),
                    text: chunk.text.clone(),
                    vector: embedding.vector,
                    concept_ids,
                    category_ids: category_ids.to_vec(),
                    loc: chunk.loc.clone(),
                }
            })
            .collect())
    }

    /// Upsert concept rows with co-occurrence neighbors and lexical fields
    async fn upsert_concepts(
        &self,
        doc_id: i32,
        concept_names: &[String],
        chunk_concepts: &[Vec<String>],
    ) -> Result<usize> {
        let cooccurrence = cooccurrence_counts(chunk_concepts);

        for name in concept_names {
            let normalized = normalize_concept(name);
            let id = hash_to_id(&normalized);

            let mut neighbors: Vec<(i32, usize)> = cooccurrence
                .get(&id)
                .map(|counts| counts.iter().map(|(k, v)| (*k, *v)).collect())
                .unwrap_or_default();
            neighbors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            let related_concept_ids: Vec<i32> = neighbors
                .into_iter()
                .take(MAX_RELATED)
                .map(|(id, _)| id)
                .collect();

            let (synonyms, broader_terms, narrower_terms) = self.lexical_fields(&normalized).await;
            let vector = self.embedder.embed(name).await?.vector;

            self.concepts
                .merge(ConceptRow {
                    id,
                    concept: name.clone(),
                    catalog_ids: vec![doc_id],
                    related_concept_ids,
                    synonyms,
                    broader_terms,
                    narrower_terms,
                    weight: 1,
                    vector,
                })
                .await?;
        }
        Ok(concept_names.len())
    }

    /// Lexical enrichment for one concept; absence contributes empty fields
    async fn lexical_fields(&self, term: &str) -> (Vec<String>, Vec<String>, Vec<String>) {
        let senses = match self.lexicon.lookup(term).await {
            Ok(senses) => senses,
            Err(err) => {
                warn!(term = %term, error = %err, "lexicon enrichment skipped");
                return (Vec::new(), Vec::new(), Vec::new());
            }
        };
        let mut synonyms = Vec::new();
        let mut broader = Vec::new();
        let mut narrower = Vec::new();
        for sense in senses {
            for word in sense.synonyms {
                if !synonyms.contains(&word) && word != term {
                    synonyms.push(word);
                }
            }
            for word in sense.hypernyms {
                if !broader.contains(&word) {
                    broader.push(word);
                }
            }
            for word in sense.hyponyms {
                if !narrower.contains(&word) {
                    narrower.push(word);
                }
            }
        }
        (synonyms, broader, narrower)
    }

    /// Recompute document counts for the document's categories
    async fn recount_categories(&self, names: &[String], ids: &[i32]) -> Result<()> {
        for (name, id) in names.iter().zip(ids) {
            let document_count = self.catalog.find_by_category(*id).await?.len() as i32;
            self.categories
                .upsert(CategoryRow {
                    id: *id,
                    name: name.clone(),
                    document_count,
                })
                .await?;
        }
        Ok(())
    }
}

/// Attach batch concepts to the chunks that mention them
///
/// A concept that appears in no chunk of its batch is attached to every
/// chunk of the batch, preserving the invariant that each document concept
/// is reachable from at least one chunk.
fn assign_batch_concepts(
    concepts: &[String],
    batch: &[PendingChunk],
    assignments: &mut [Vec<String>],
) {
    for concept in concepts {
        let needle = normalize_concept(concept);
        if needle.is_empty() {
            continue;
        }
        let mut any = false;
        for (chunk, assigned) in batch.iter().zip(assignments.iter_mut()) {
            if chunk.text.to_lowercase().contains(&needle) {
                push_unique(assigned, concept);
                any = true;
            }
        }
        if !any {
            for assigned in assignments.iter_mut() {
                push_unique(assigned, concept);
            }
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Per-concept co-occurrence counts over the document's chunks
fn cooccurrence_counts(chunk_concepts: &[Vec<String>]) -> HashMap<i32, HashMap<i32, usize>> {
    let mut counts: HashMap<i32, HashMap<i32, usize>> = HashMap::new();
    for assigned in chunk_concepts {
        let ids: Vec<i32> = assigned
            .iter()
            .map(|name| hash_to_id(&normalize_concept(name)))
            .collect();
        for a in &ids {
            for b in &ids {
                if a != b {
                    *counts.entry(*a).or_default().entry(*b).or_insert(0) += 1;
                }
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(text: &str) -> PendingChunk {
        PendingChunk {
            text: text.to_string(),
            loc: String::new(),
        }
    }

    #[test]
    fn concepts_attach_to_mentioning_chunks() {
        let batch = vec![
            pending("The repository pattern isolates persistence."),
            pending("Unrelated prose about gardening."),
        ];
        let mut assignments = vec![Vec::new(), Vec::new()];
        assign_batch_concepts(
            &["Repository Pattern".to_string()],
            &batch,
            &mut assignments,
        );
        assert_eq!(assignments[0], vec!["Repository Pattern"]);
        assert!(assignments[1].is_empty());
    }

    #[test]
    fn unmatched_concepts_attach_to_all_chunks() {
        let batch = vec![pending("alpha"), pending("beta")];
        let mut assignments = vec![Vec::new(), Vec::new()];
        assign_batch_concepts(&["Gamma Theory".to_string()], &batch, &mut assignments);
        assert_eq!(assignments[0], vec!["Gamma Theory"]);
        assert_eq!(assignments[1], vec!["Gamma Theory"]);
    }

    #[test]
    fn cooccurrence_counts_are_symmetric() {
        let a = "alpha".to_string();
        let b = "beta".to_string();
        let counts = cooccurrence_counts(&[vec![a.clone(), b.clone()], vec![a.clone()]]);
        let id_a = hash_to_id("alpha");
        let id_b = hash_to_id("beta");
        assert_eq!(counts[&id_a][&id_b], 1);
        assert_eq!(counts[&id_b][&id_a], 1);
        assert!(!counts[&id_a].contains_key(&id_a));
    }
}
