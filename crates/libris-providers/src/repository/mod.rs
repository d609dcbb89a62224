//! Repositories over the table store
//!
//! Typed CRUD, indexed finders and vector search for the four tables. All
//! cross-references resolve through ID lookups or secondary indexes; no
//! repository loads a whole table to filter in memory. Schema drift in a
//! stored payload is a hard error, never a silent fallback.

mod catalog;
mod categories;
mod chunks;
mod concepts;

pub use catalog::CatalogRepositoryImpl;
pub use categories::CategoryRepositoryImpl;
pub use chunks::ChunkRepositoryImpl;
pub use concepts::ConceptRepositoryImpl;

use libris_domain::error::{Error, Result};
use libris_domain::value_objects::VectorHit;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::store::{StoredRow, Table, TableStore};

/// Serialize an entity into its stored form
fn to_row<T: Serialize>(id: i32, vector: Vec<f32>, entity: &T) -> Result<StoredRow> {
    Ok(StoredRow {
        id,
        vector,
        payload: serde_json::to_value(entity)?,
    })
}

/// Deserialize a stored payload, surfacing schema drift as a hard error
fn from_row<T: DeserializeOwned>(table: Table, row: StoredRow) -> Result<T> {
    serde_json::from_value(row.payload).map_err(|e| {
        Error::vector_db(format!(
            "schema drift in {} row {}: {}",
            table.name(),
            row.id,
            e
        ))
    })
}

/// Resolve `(id, distance)` pairs into typed vector hits, preserving order
///
/// A hit whose row vanished between search and fetch is dropped; the store
/// is quiescent during queries so this only covers racing re-ingests.
async fn fetch_hits<T: DeserializeOwned>(
    store: &Arc<dyn TableStore>,
    table: Table,
    scored: Vec<(i32, f32)>,
) -> Result<Vec<VectorHit<T>>> {
    let ids: Vec<i32> = scored.iter().map(|(id, _)| *id).collect();
    let rows = store.get_many(table, &ids).await?;
    let mut by_id: HashMap<i32, StoredRow> = rows.into_iter().map(|r| (r.id, r)).collect();

    let mut hits = Vec::with_capacity(scored.len());
    for (id, distance) in scored {
        if let Some(row) = by_id.remove(&id) {
            hits.push(VectorHit {
                row: from_row(table, row)?,
                distance,
            });
        }
    }
    Ok(hits)
}
