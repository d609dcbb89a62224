//! Concept extraction output

use serde::{Deserialize, Serialize};

/// Output of the LLM concept extractor for one batch of chunk text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedConcepts {
    /// Canonical concept terms found in the text
    #[serde(default)]
    pub primary_concepts: Vec<String>,
    /// Coarse taxonomy labels for the document
    #[serde(default)]
    pub categories: Vec<String>,
}

impl ExtractedConcepts {
    /// Whether the extraction produced nothing
    pub fn is_empty(&self) -> bool {
        self.primary_concepts.is_empty() && self.categories.is_empty()
    }

    /// Union another batch into this one, preserving first-seen order
    pub fn merge(&mut self, other: ExtractedConcepts) {
        for concept in other.primary_concepts {
            if !self
                .primary_concepts
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&concept))
            {
                self.primary_concepts.push(concept);
            }
        }
        for category in other.categories {
            if !self
                .categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&category))
            {
                self.categories.push(category);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unions_case_insensitively() {
        let mut a = ExtractedConcepts {
            primary_concepts: vec!["Repository Pattern".into()],
            categories: vec!["Software Design".into()],
        };
        a.merge(ExtractedConcepts {
            primary_concepts: vec!["repository pattern".into(), "CQRS".into()],
            categories: vec!["software design".into(), "Architecture".into()],
        });
        assert_eq!(a.primary_concepts, vec!["Repository Pattern", "CQRS"]);
        assert_eq!(a.categories, vec!["Software Design", "Architecture"]);
    }
}
