//! Document loader output

use serde::{Deserialize, Serialize};

/// One text segment produced by a document loader
///
/// Loaders (PDF, EPUB, plain text) emit a sequence of segments; `loc` is an
/// opaque JSON blob describing the page or line range and is passed through
/// to chunk rows without interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSegment {
    /// Extracted text
    pub text: String,
    /// Opaque location blob (page/line range JSON)
    pub loc: String,
}
