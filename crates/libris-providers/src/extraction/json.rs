//! Tolerant JSON recovery from LLM responses
//!
//! Models wrap JSON in markdown fences or conversational prose despite
//! instructions. Recovery runs in stages: direct parse, fence stripping,
//! then brace-counting for the outermost object.

use serde::de::DeserializeOwned;

use libris_domain::error::{Error, Result};

/// Extract and parse a JSON value from an LLM response
pub fn extract_json<T: DeserializeOwned>(response: &str) -> Result<T> {
    let trimmed = response.trim();

    if let Ok(parsed) = serde_json::from_str::<T>(trimmed) {
        return Ok(parsed);
    }

    let cleaned = strip_fences(trimmed);
    if let Ok(parsed) = serde_json::from_str::<T>(&cleaned) {
        return Ok(parsed);
    }

    for haystack in [cleaned.as_str(), trimmed] {
        if let Some(object) = find_object(haystack) {
            if let Ok(parsed) = serde_json::from_str::<T>(object) {
                return Ok(parsed);
            }
        }
    }

    Err(Error::extraction(format!(
        "no parseable JSON in response: {}...",
        trimmed.chars().take(120).collect::<String>()
    )))
}

/// Remove a surrounding markdown code fence
fn strip_fences(text: &str) -> String {
    let mut result = text;
    for prefix in ["```json", "```"] {
        if let Some(stripped) = result.strip_prefix(prefix) {
            result = stripped;
            break;
        }
    }
    let result = result.trim();
    result.strip_suffix("```").unwrap_or(result).trim().to_string()
}

/// Find the outermost `{...}` span by brace counting
fn find_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;
    for (i, ch) in text.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(s) = start {
                        return Some(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_domain::value_objects::ExtractedConcepts;

    #[test]
    fn parses_bare_json() {
        let out: ExtractedConcepts =
            extract_json(r#"{"primary_concepts":["bm25"],"categories":["search"]}"#).unwrap();
        assert_eq!(out.primary_concepts, vec!["bm25"]);
    }

    #[test]
    fn parses_fenced_json() {
        let response = "```json\n{\"primary_concepts\":[\"bm25\"],\"categories\":[]}\n```";
        let out: ExtractedConcepts = extract_json(response).unwrap();
        assert_eq!(out.primary_concepts, vec!["bm25"]);
    }

    #[test]
    fn parses_json_inside_prose() {
        let response = "Here are the concepts you asked for:\n\
            {\"primary_concepts\":[\"vector search\"],\"categories\":[\"databases\"]}\n\
            Let me know if you need more.";
        let out: ExtractedConcepts = extract_json(response).unwrap();
        assert_eq!(out.categories, vec!["databases"]);
    }

    #[test]
    fn rejects_unparseable_text() {
        let err = extract_json::<ExtractedConcepts>("no json here at all").unwrap_err();
        assert!(err.to_string().contains("no parseable JSON"));
    }
}
