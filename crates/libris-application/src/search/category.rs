//! Category listing and category-scoped lookups

use std::sync::Arc;

use libris_domain::entities::{CatalogEntry, CategoryRow, ConceptRow};
use libris_domain::error::Result;
use libris_domain::ports::{CatalogRepository, CategoryRepository, ConceptRepository};

/// Category-level search service
pub struct CategorySearchService {
    categories: Arc<dyn CategoryRepository>,
    catalog: Arc<dyn CatalogRepository>,
    concepts: Arc<dyn ConceptRepository>,
}

impl CategorySearchService {
    /// Create the service with its repository dependencies
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        catalog: Arc<dyn CatalogRepository>,
        concepts: Arc<dyn ConceptRepository>,
    ) -> Self {
        Self {
            categories,
            catalog,
            concepts,
        }
    }

    /// All categories, sorted by name
    pub async fn list(&self) -> Result<Vec<CategoryRow>> {
        self.categories.find_all().await
    }

    /// A category's row, documents and aggregated concepts
    ///
    /// Returns `None` for an unknown category name.
    pub async fn documents(
        &self,
        name: &str,
    ) -> Result<Option<(CategoryRow, Vec<CatalogEntry>, Vec<ConceptRow>)>> {
        let Some(category) = self.categories.find_by_name(name).await? else {
            return Ok(None);
        };
        let documents = self.catalog.find_by_category(category.id).await?;
        let concept_ids = self.catalog.concepts_in_category(category.id).await?;
        let concepts = self.concepts.find_by_ids(&concept_ids).await?;
        Ok(Some((category, documents, concepts)))
    }
}
