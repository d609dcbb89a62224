//! Shared in-memory table state
//!
//! Both backends keep the working set in this structure: rows by id, a
//! BTreeMap secondary index (the ordered key space), and a lazily built
//! vector index. The filesystem backend adds persistence around it.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap};

use super::{index_entries, StoredRow, Table};

/// Row count at which the dedicated vector index is built
///
/// Below the threshold searches scan rows directly; above it they run
/// against a packed structure with precomputed norms.
pub(crate) const VECTOR_INDEX_THRESHOLD: usize = 256;

/// Packed vector index with precomputed norms
struct VectorIndex {
    ids: Vec<i32>,
    vectors: Vec<Vec<f32>>,
    norms: Vec<f32>,
}

impl VectorIndex {
    fn build(rows: &HashMap<i32, StoredRow>) -> Self {
        let mut ids: Vec<i32> = rows.keys().copied().collect();
        ids.sort_unstable();
        let mut vectors = Vec::with_capacity(ids.len());
        let mut norms = Vec::with_capacity(ids.len());
        for id in &ids {
            let vector = rows[id].vector.clone();
            norms.push(norm(&vector));
            vectors.push(vector);
        }
        Self { ids, vectors, norms }
    }
}

/// One table's working set
pub(crate) struct TableState {
    table: Table,
    rows: HashMap<i32, StoredRow>,
    index: BTreeMap<String, BTreeSet<i32>>,
    vector_index: Option<VectorIndex>,
}

impl TableState {
    pub(crate) fn new(table: Table) -> Self {
        Self {
            table,
            rows: HashMap::new(),
            index: BTreeMap::new(),
            vector_index: None,
        }
    }

    pub(crate) fn insert(&mut self, row: StoredRow) {
        self.remove(row.id);
        for key in index_entries(self.table, &row) {
            self.index.entry(key.encode()).or_default().insert(row.id);
        }
        self.rows.insert(row.id, row);
        self.vector_index = None;
    }

    pub(crate) fn remove(&mut self, id: i32) -> bool {
        let Some(row) = self.rows.remove(&id) else {
            return false;
        };
        for key in index_entries(self.table, &row) {
            let encoded = key.encode();
            if let Some(ids) = self.index.get_mut(&encoded) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.index.remove(&encoded);
                }
            }
        }
        self.vector_index = None;
        true
    }

    pub(crate) fn get(&self, id: i32) -> Option<&StoredRow> {
        self.rows.get(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn lookup(&self, encoded_key: &str) -> Vec<i32> {
        self.index
            .get(encoded_key)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn prefix_scan(&self, prefix: &str, limit: usize) -> Vec<i32> {
        let mut out = Vec::new();
        for (_, ids) in self
            .index
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
        {
            for id in ids {
                if out.len() >= limit {
                    return out;
                }
                if !out.contains(id) {
                    out.push(*id);
                }
            }
        }
        out
    }

    pub(crate) fn all_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.rows.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &StoredRow> {
        self.rows.values()
    }

    /// Top-k nearest rows by cosine distance, ascending
    ///
    /// Builds the packed index once the table crosses the threshold; smaller
    /// tables scan rows directly.
    pub(crate) fn vector_search(&mut self, query: &[f32], limit: usize) -> Vec<(i32, f32)> {
        if limit == 0 || self.rows.is_empty() {
            return Vec::new();
        }
        let query_norm = norm(query);

        let mut heap: BinaryHeap<ScoredId> = BinaryHeap::with_capacity(limit + 1);
        if self.rows.len() >= VECTOR_INDEX_THRESHOLD {
            if self.vector_index.is_none() {
                self.vector_index = Some(VectorIndex::build(&self.rows));
            }
            let index = self.vector_index.as_ref().expect("built above");
            for ((id, vector), vector_norm) in
                index.ids.iter().zip(&index.vectors).zip(&index.norms)
            {
                push_candidate(&mut heap, *id, query, query_norm, vector, *vector_norm, limit);
            }
        } else {
            for row in self.rows.values() {
                push_candidate(
                    &mut heap,
                    row.id,
                    query,
                    query_norm,
                    &row.vector,
                    norm(&row.vector),
                    limit,
                );
            }
        }

        let mut scored: Vec<ScoredId> = heap.into_iter().collect();
        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        scored.into_iter().map(|s| (s.id, s.distance)).collect()
    }
}

/// Candidate for heap-based top-k selection
///
/// Ordered so the BinaryHeap keeps the worst (largest-distance) candidate on
/// top and can evict it when a closer row arrives.
struct ScoredId {
    id: i32,
    distance: f32,
}

impl PartialEq for ScoredId {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.id == other.id
    }
}
impl Eq for ScoredId {}

impl Ord for ScoredId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for ScoredId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn push_candidate(
    heap: &mut BinaryHeap<ScoredId>,
    id: i32,
    query: &[f32],
    query_norm: f32,
    vector: &[f32],
    vector_norm: f32,
    limit: usize,
) {
    let distance = 1.0 - similarity(query, query_norm, vector, vector_norm);
    if heap.len() < limit {
        heap.push(ScoredId { id, distance });
    } else if let Some(worst) = heap.peek() {
        if distance < worst.distance {
            heap.pop();
            heap.push(ScoredId { id, distance });
        }
    }
}

/// Cosine similarity shifted into `[0, 1]`
fn similarity(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    (dot / (norm_a * norm_b) + 1.0) / 2.0
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i32, vector: Vec<f32>, filename: &str) -> StoredRow {
        StoredRow {
            id,
            vector,
            payload: serde_json::json!({"filename": filename, "category_ids": []}),
        }
    }

    #[test]
    fn insert_replaces_and_reindexes() {
        let mut state = TableState::new(Table::Catalog);
        state.insert(row(1, vec![1.0, 0.0], "a.txt"));
        state.insert(row(1, vec![0.0, 1.0], "b.txt"));
        assert_eq!(state.len(), 1);
        assert!(state
            .lookup(&super::super::IndexKey::CatalogFilename("a.txt".into()).encode())
            .is_empty());
        assert_eq!(
            state.lookup(&super::super::IndexKey::CatalogFilename("b.txt".into()).encode()),
            vec![1]
        );
    }

    #[test]
    fn vector_search_orders_by_distance() {
        let mut state = TableState::new(Table::Catalog);
        state.insert(row(1, vec![1.0, 0.0], "x.txt"));
        state.insert(row(2, vec![0.0, 1.0], "y.txt"));
        state.insert(row(3, vec![0.7, 0.7], "z.txt"));

        let hits = state.vector_search(&[1.0, 0.0], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 1);
        assert!(hits[0].1 < hits[1].1);
    }

    #[test]
    fn vector_search_handles_limit_beyond_table() {
        let mut state = TableState::new(Table::Catalog);
        state.insert(row(1, vec![1.0, 0.0], "x.txt"));
        let hits = state.vector_search(&[1.0, 0.0], 10);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn index_survives_threshold_crossing() {
        let mut state = TableState::new(Table::Catalog);
        for i in 0..(VECTOR_INDEX_THRESHOLD as i32 + 10) {
            state.insert(row(i, vec![i as f32, 1.0], &format!("{}.txt", i)));
        }
        let first = state.vector_search(&[1.0, 1.0], 5);
        // Mutation invalidates the packed index; the next search rebuilds it.
        state.remove(0);
        let second = state.vector_search(&[1.0, 1.0], 5);
        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 5);
        assert!(!second.iter().any(|(id, _)| *id == 0));
    }
}
