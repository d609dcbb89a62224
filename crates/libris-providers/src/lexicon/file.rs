//! File-backed lexicon cache
//!
//! A JSON map of lower-cased term to word senses, loaded lazily on first
//! access. Ingestion appends through [`FileLexicon::store`] and flushes the
//! whole map atomically; query traffic only reads. A missing cache file is
//! an empty lexicon, not an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use libris_domain::error::{Error, Result};
use libris_domain::ports::LexiconProvider;
use libris_domain::value_objects::SynsetEntry;

type SynsetMap = HashMap<String, Vec<SynsetEntry>>;

/// On-disk lexicon cache
pub struct FileLexicon {
    path: PathBuf,
    cache: RwLock<Option<SynsetMap>>,
}

impl FileLexicon {
    /// Create a lexicon backed by the given cache file
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: RwLock::new(None),
        }
    }

    /// Load the cache file once; absent file yields an empty map
    async fn ensure_loaded(&self) -> Result<()> {
        {
            if self.cache.read().await.is_some() {
                return Ok(());
            }
        }
        let mut guard = self.cache.write().await;
        if guard.is_some() {
            return Ok(());
        }

        let map = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                Error::lexicon(format!(
                    "corrupt lexicon cache {}: {}",
                    self.path.display(),
                    e
                ))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => SynsetMap::new(),
            Err(err) => {
                return Err(Error::io_with_source(
                    format!("failed to read lexicon cache {}", self.path.display()),
                    err,
                ));
            }
        };
        *guard = Some(map);
        Ok(())
    }

    /// Write the whole map to disk via a temp file rename
    async fn flush(&self, map: &SynsetMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::io_with_source(
                    format!("failed to create lexicon directory for {}", self.path.display()),
                    e,
                )
            })?;
        }
        let content = serde_json::to_string(map)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await.map_err(|e| {
            Error::io_with_source(format!("failed to write {}", tmp.display()), e)
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            Error::io_with_source(format!("failed to replace {}", self.path.display()), e)
        })?;
        Ok(())
    }
}

#[async_trait]
impl LexiconProvider for FileLexicon {
    async fn lookup(&self, term: &str) -> Result<Vec<SynsetEntry>> {
        self.ensure_loaded().await?;
        let guard = self.cache.read().await;
        let map = guard.as_ref().expect("cache loaded above");
        Ok(map.get(&term.to_lowercase()).cloned().unwrap_or_default())
    }

    async fn store(&self, term: &str, senses: Vec<SynsetEntry>) -> Result<()> {
        self.ensure_loaded().await?;
        let mut guard = self.cache.write().await;
        let map = guard.as_mut().expect("cache loaded above");
        map.insert(term.to_lowercase(), senses);
        self.flush(map).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sense(synonym: &str) -> SynsetEntry {
        SynsetEntry {
            synonyms: vec![synonym.to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_lexicon() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon = FileLexicon::new(dir.path().join("absent.json"));
        assert!(lexicon.lookup("index").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_then_lookup_round_trips_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.json");
        let lexicon = FileLexicon::new(&path);
        lexicon
            .store("Index", vec![sense("catalog")])
            .await
            .unwrap();
        assert_eq!(lexicon.lookup("INDEX").await.unwrap(), vec![sense("catalog")]);

        // A fresh instance reads the flushed file.
        let reopened = FileLexicon::new(&path);
        assert_eq!(reopened.lookup("index").await.unwrap(), vec![sense("catalog")]);
    }

    #[tokio::test]
    async fn corrupt_cache_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.json");
        tokio::fs::write(&path, "not json").await.unwrap();
        let lexicon = FileLexicon::new(&path);
        assert!(lexicon.lookup("term").await.is_err());
    }
}
