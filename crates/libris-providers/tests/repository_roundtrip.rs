//! Repository behavior over the filesystem store

use std::sync::Arc;

use libris_domain::entities::{CatalogEntry, CategoryRow, ChunkRow, ConceptRow};
use libris_domain::ids::{chunk_id, hash_to_id, normalize_concept};
use libris_domain::ports::{
    CatalogRepository, CategoryRepository, ChunkRepository, ConceptRepository,
};
use libris_providers::repository::{
    CatalogRepositoryImpl, CategoryRepositoryImpl, ChunkRepositoryImpl, ConceptRepositoryImpl,
};
use libris_providers::store::{FilesystemTableStore, TableStore};

fn doc(filename: &str, category_ids: Vec<i32>) -> CatalogEntry {
    CatalogEntry {
        id: hash_to_id(filename),
        filename: filename.to_string(),
        hash: format!("hash-{}", filename),
        text: format!("summary of {}", filename),
        vector: vec![1.0, 0.0],
        category_ids,
        title: String::new(),
        author: String::new(),
        year: String::new(),
        publisher: String::new(),
        isbn: String::new(),
    }
}

fn chunk(filename: &str, ordinal: usize, concept_ids: Vec<i32>) -> ChunkRow {
    ChunkRow {
        id: chunk_id(filename, ordinal),
        catalog_id: hash_to_id(filename),
        hash: format!("hash-{}", filename),
        text: format!("chunk {} of {}", ordinal, filename),
        vector: vec![0.0, 1.0],
        concept_ids,
        category_ids: vec![],
        loc: String::new(),
    }
}

fn concept_row(name: &str, docs: &[&str]) -> ConceptRow {
    ConceptRow {
        id: hash_to_id(&normalize_concept(name)),
        concept: name.to_string(),
        catalog_ids: docs.iter().map(|d| hash_to_id(d)).collect(),
        related_concept_ids: vec![],
        synonyms: vec![],
        broader_terms: vec![],
        narrower_terms: vec![],
        weight: docs.len() as i32,
        vector: vec![0.5, 0.5],
    }
}

#[tokio::test]
async fn concept_merge_unions_documents_and_recomputes_weight() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn TableStore> =
        Arc::new(FilesystemTableStore::open(dir.path()).await.unwrap());
    let concepts = ConceptRepositoryImpl::new(Arc::clone(&store));

    let first = concepts
        .merge(concept_row("vector search", &["a.txt"]))
        .await
        .unwrap();
    assert_eq!(first.weight, 1);

    // Merging the same document again changes nothing.
    let again = concepts
        .merge(concept_row("vector search", &["a.txt"]))
        .await
        .unwrap();
    assert_eq!(again.weight, 1);
    assert_eq!(again.catalog_ids, vec![hash_to_id("a.txt")]);

    // A second document unions in, sorted.
    let merged = concepts
        .merge(concept_row("Vector Search", &["b.txt"]))
        .await
        .unwrap();
    assert_eq!(merged.weight, 2);
    let mut expected = vec![hash_to_id("a.txt"), hash_to_id("b.txt")];
    expected.sort_unstable();
    assert_eq!(merged.catalog_ids, expected);
    // The first-seen display form is kept.
    assert_eq!(merged.concept, "vector search");
}

#[tokio::test]
async fn chunks_resolve_through_the_concept_name() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn TableStore> =
        Arc::new(FilesystemTableStore::open(dir.path()).await.unwrap());
    let catalog = CatalogRepositoryImpl::new(Arc::clone(&store));
    let chunks = ChunkRepositoryImpl::new(Arc::clone(&store));
    let concepts = ConceptRepositoryImpl::new(Arc::clone(&store));

    let concept_id = hash_to_id("bm25");
    catalog
        .bulk_insert(vec![doc("ir.txt", vec![]), doc("db.txt", vec![])])
        .await
        .unwrap();
    chunks
        .bulk_insert(vec![
            chunk("ir.txt", 0, vec![concept_id]),
            chunk("ir.txt", 1, vec![]),
            chunk("db.txt", 0, vec![concept_id]),
        ])
        .await
        .unwrap();
    concepts
        .merge(concept_row("BM25", &["ir.txt", "db.txt"]))
        .await
        .unwrap();

    let found = chunks.find_by_concept_name("bm25", 10).await.unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|c| c.concept_ids.contains(&concept_id)));

    // The limit caps the result set.
    let capped = chunks.find_by_concept_name("bm25", 1).await.unwrap();
    assert_eq!(capped.len(), 1);

    // Unknown concepts resolve to an empty set.
    assert!(chunks
        .find_by_concept_name("unknown", 10)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn category_aggregation_unions_chunk_concepts() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn TableStore> =
        Arc::new(FilesystemTableStore::open(dir.path()).await.unwrap());
    let catalog = CatalogRepositoryImpl::new(Arc::clone(&store));
    let chunks = ChunkRepositoryImpl::new(Arc::clone(&store));
    let categories = CategoryRepositoryImpl::new(Arc::clone(&store));

    let cat_id = hash_to_id("databases");
    categories
        .upsert(CategoryRow {
            id: cat_id,
            name: "Databases".to_string(),
            document_count: 2,
        })
        .await
        .unwrap();
    catalog
        .bulk_insert(vec![
            doc("a.txt", vec![cat_id]),
            doc("b.txt", vec![cat_id]),
            doc("c.txt", vec![]),
        ])
        .await
        .unwrap();
    chunks
        .bulk_insert(vec![
            chunk("a.txt", 0, vec![1, 2]),
            chunk("b.txt", 0, vec![2, 3]),
            chunk("c.txt", 0, vec![99]),
        ])
        .await
        .unwrap();

    let concept_ids = catalog.concepts_in_category(cat_id).await.unwrap();
    assert_eq!(concept_ids, vec![1, 2, 3]);

    let by_name = categories.find_by_name("databases").await.unwrap().unwrap();
    assert_eq!(by_name.id, cat_id);
}

#[tokio::test]
async fn catalog_rows_survive_reopen_with_their_indexes() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store: Arc<dyn TableStore> =
            Arc::new(FilesystemTableStore::open(dir.path()).await.unwrap());
        let catalog = CatalogRepositoryImpl::new(Arc::clone(&store));
        catalog.bulk_insert(vec![doc("keep.txt", vec![])]).await.unwrap();
    }

    let store: Arc<dyn TableStore> =
        Arc::new(FilesystemTableStore::open(dir.path()).await.unwrap());
    let catalog = CatalogRepositoryImpl::new(Arc::clone(&store));
    let found = catalog.find_by_source("keep.txt").await.unwrap().unwrap();
    assert_eq!(found.id, hash_to_id("keep.txt"));
    assert_eq!(catalog.delete_by_filename("keep.txt").await.unwrap(), 1);
    assert!(catalog.find_by_source("keep.txt").await.unwrap().is_none());
}
