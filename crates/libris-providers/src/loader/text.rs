//! Plain text and Markdown loader
//!
//! Splits the file on blank lines into paragraph segments, each tagged with
//! its one-based line range as the location blob.

use std::path::Path;

use async_trait::async_trait;

use libris_domain::error::{Error, Result};
use libris_domain::ports::DocumentLoader;
use libris_domain::value_objects::DocumentSegment;

const EXTENSIONS: &[&str] = &["txt", "md", "markdown", "text"];

/// Loader for plain text files
#[derive(Default)]
pub struct TextDocumentLoader;

impl TextDocumentLoader {
    /// Create a text loader
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentLoader for TextDocumentLoader {
    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| EXTENSIONS.contains(&ext.to_lowercase().as_str()))
    }

    async fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::io_with_source(format!("failed to read {}", path.display()), e)
        })?;

        let mut segments = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();
        let mut start_line = 1usize;

        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                if !paragraph.is_empty() {
                    segments.push(make_segment(&paragraph, start_line, index));
                    paragraph.clear();
                }
                start_line = index + 2;
            } else {
                if paragraph.is_empty() {
                    start_line = index + 1;
                }
                paragraph.push(line);
            }
        }
        if !paragraph.is_empty() {
            let end = content.lines().count();
            segments.push(make_segment(&paragraph, start_line, end));
        }

        Ok(segments)
    }
}

fn make_segment(lines: &[&str], start_line: usize, end_line: usize) -> DocumentSegment {
    DocumentSegment {
        text: lines.join("\n"),
        loc: format!(r#"{{"lines":[{},{}]}}"#, start_line, end_line),
    }
}
