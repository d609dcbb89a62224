//! Document loaders
//!
//! The core ships a plain-text loader; PDF and EPUB readers are external
//! collaborators that plug in through the same port. [`DocumentLoaderSet`]
//! dispatches by file extension.

mod text;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libris_domain::error::{Error, Result};
use libris_domain::ports::DocumentLoader;
use libris_domain::value_objects::DocumentSegment;

pub use text::TextDocumentLoader;

/// Dispatches loading to the first loader supporting a path
pub struct DocumentLoaderSet {
    loaders: Vec<Arc<dyn DocumentLoader>>,
}

impl DocumentLoaderSet {
    /// Create a loader set from individual loaders, tried in order
    pub fn new(loaders: Vec<Arc<dyn DocumentLoader>>) -> Self {
        Self { loaders }
    }
}

#[async_trait]
impl DocumentLoader for DocumentLoaderSet {
    fn supports(&self, path: &Path) -> bool {
        self.loaders.iter().any(|loader| loader.supports(path))
    }

    async fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>> {
        for loader in &self.loaders {
            if loader.supports(path) {
                return loader.load(path).await;
            }
        }
        Err(Error::validation(format!(
            "unsupported document format: {}",
            path.display()
        )))
    }
}
