// src/llm/streaming.rs
// Frame handling for Gemini streamGenerateContent SSE chunks.

use serde_json::Value;

/// Pull the text delta out of one streamed chunk. Gemini frames carry
/// `candidates[0].content.parts[*].text`; frames without text (safety
/// metadata, usage) yield `None`.
pub fn extract_chunk_text(frame: &Value) -> Option<String> {
    let parts = frame
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let mut text = String::new();
    for part in parts {
        if let Some(t) = part.get("text").and_then(|t| t.as_str()) {
            text.push_str(t);
        }
    }

    if text.is_empty() { None } else { Some(text) }
}

/// Concatenate the candidate text of a non-streamed response.
pub fn extract_response_text(body: &Value) -> Option<String> {
    extract_chunk_text(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_chunk_text() {
        let frame = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "there" }] }
            }]
        });
        assert_eq!(extract_chunk_text(&frame).as_deref(), Some("Hello there"));
    }

    #[test]
    fn test_metadata_frame_yields_none() {
        let frame = json!({ "usageMetadata": { "promptTokenCount": 12 } });
        assert!(extract_chunk_text(&frame).is_none());
    }

    #[test]
    fn test_empty_parts_yields_none() {
        let frame = json!({
            "candidates": [{ "content": { "parts": [] } }]
        });
        assert!(extract_chunk_text(&frame).is_none());
    }
}
