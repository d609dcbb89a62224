//! Paragraph-preserving text chunking
//!
//! Packs loader segments into chunks of roughly 500-1500 characters,
//! flushing on paragraph boundaries whenever possible. A paragraph longer
//! than the maximum is split at whitespace near the limit rather than
//! mid-word.

use libris_domain::value_objects::DocumentSegment;

/// Chunk size bounds in characters
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Preferred minimum chunk length
    pub min_chars: usize,
    /// Hard maximum chunk length
    pub max_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            min_chars: 500,
            max_chars: 1500,
        }
    }
}

/// A chunk awaiting embedding and persistence
#[derive(Debug, Clone)]
pub struct PendingChunk {
    /// Chunk body
    pub text: String,
    /// Location blob of the first contributing segment
    pub loc: String,
}

/// Chunk a document's segments
pub fn chunk_segments(segments: &[DocumentSegment], config: &ChunkerConfig) -> Vec<PendingChunk> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_loc = String::new();

    for segment in segments {
        for paragraph in split_paragraphs(&segment.text) {
            for piece in split_oversized(paragraph, config.max_chars) {
                let added = if buffer.is_empty() {
                    piece.len()
                } else {
                    piece.len() + 2
                };
                if !buffer.is_empty() && buffer.len() + added > config.max_chars {
                    chunks.push(PendingChunk {
                        text: std::mem::take(&mut buffer),
                        loc: std::mem::take(&mut buffer_loc),
                    });
                }
                if buffer.is_empty() {
                    buffer_loc = segment.loc.clone();
                } else {
                    buffer.push_str("\n\n");
                }
                buffer.push_str(&piece);

                if buffer.len() >= config.min_chars {
                    chunks.push(PendingChunk {
                        text: std::mem::take(&mut buffer),
                        loc: std::mem::take(&mut buffer_loc),
                    });
                }
            }
        }
    }

    if !buffer.trim().is_empty() {
        chunks.push(PendingChunk {
            text: buffer,
            loc: buffer_loc,
        });
    }
    chunks
}

fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// Split a paragraph longer than `max_chars` at whitespace near the limit
fn split_oversized(paragraph: &str, max_chars: usize) -> Vec<String> {
    if paragraph.len() <= max_chars {
        return vec![paragraph.to_string()];
    }

    let mut pieces = Vec::new();
    let mut rest = paragraph;
    while rest.len() > max_chars {
        let window_end = floor_char_boundary(rest, max_chars);
        let cut = if window_end == 0 {
            // A single oversized leading character; take it whole.
            rest.chars().next().map_or(rest.len(), char::len_utf8)
        } else {
            rest[..window_end]
                .rfind(char::is_whitespace)
                .filter(|&i| i > 0)
                .unwrap_or(window_end)
        };
        let (head, tail) = rest.split_at(cut);
        pieces.push(head.trim_end().to_string());
        rest = tail.trim_start();
    }
    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }
    pieces
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> DocumentSegment {
        DocumentSegment {
            text: text.to_string(),
            loc: r#"{"line":1}"#.to_string(),
        }
    }

    #[test]
    fn short_paragraphs_accumulate_into_one_chunk() {
        let para = "word ".repeat(40);
        let segments = vec![segment(&format!("{}\n\n{}", para.trim(), para.trim()))];
        let chunks = chunk_segments(&segments, &ChunkerConfig::default());
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("\n\n"));
    }

    #[test]
    fn chunks_respect_max_length() {
        let long = "lorem ipsum dolor sit amet ".repeat(300);
        let config = ChunkerConfig::default();
        let chunks = chunk_segments(&[segment(&long)], &config);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= config.max_chars, "{}", chunk.text.len());
        }
    }

    #[test]
    fn paragraph_boundaries_flush_once_min_reached() {
        let para = "sentence ".repeat(70); // ~630 chars, past the minimum
        let text = format!("{}\n\n{}", para.trim(), para.trim());
        let chunks = chunk_segments(&[segment(&text)], &ChunkerConfig::default());
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn chunk_keeps_first_segment_loc() {
        let segments = vec![
            DocumentSegment {
                text: "alpha ".repeat(20),
                loc: r#"{"page":1}"#.to_string(),
            },
            DocumentSegment {
                text: "beta ".repeat(20),
                loc: r#"{"page":2}"#.to_string(),
            },
        ];
        let chunks = chunk_segments(&segments, &ChunkerConfig::default());
        assert_eq!(chunks[0].loc, r#"{"page":1}"#);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_segments(&[], &ChunkerConfig::default()).is_empty());
        assert!(chunk_segments(&[segment("   \n\n  ")], &ChunkerConfig::default()).is_empty());
    }
}
