// src/llm/client.rs
// Gemini REST client: generateContent for one-shot calls,
// streamGenerateContent (SSE) for the chat gateway.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde_json::{Value, json};
use std::env;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::error::ProviderError;
use super::streaming::{extract_chunk_text, extract_response_text};
use super::traits::TextGenerator;
use super::types::GenerateRequest;
use crate::config::CONFIG;

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new() -> Result<Self, ProviderError> {
        let api_key = env::var("GEMINI_API_KEY").map_err(|_| ProviderError::MissingApiKey)?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
        })
    }

    fn build_body(req: &GenerateRequest) -> Value {
        let mut contents: Vec<Value> = req
            .history
            .iter()
            .map(|m| {
                json!({
                    "role": m.role.as_gemini_role(),
                    "parts": [{ "text": m.content }]
                })
            })
            .collect();

        let mut parts: Vec<Value> = vec![json!({ "text": req.message })];
        for attachment in &req.attachments {
            parts.push(json!({
                "inline_data": {
                    "mime_type": attachment.mime_type,
                    "data": attachment.data
                }
            }));
        }
        contents.push(json!({ "role": "user", "parts": parts }));

        let mut generation_config = json!({
            "temperature": req.temperature.unwrap_or(CONFIG.temperature),
            "maxOutputTokens": req.max_output_tokens.unwrap_or(CONFIG.max_output_tokens),
        });
        if req.json_output {
            generation_config["responseMimeType"] = json!("application/json");
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });

        if let Some(ref system) = req.system {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        if req.use_search && CONFIG.enable_search_grounding {
            body["tools"] = json!([{ "google_search": {} }]);
        }

        body
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, req: GenerateRequest) -> Result<String, ProviderError> {
        let body = Self::build_body(&req);
        let url = CONFIG.gemini_url("generateContent");

        debug!(model = %CONFIG.model, "Gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), text));
        }

        let data: Value = response.json().await?;
        extract_response_text(&data).ok_or(ProviderError::EmptyResponse)
    }

    async fn stream_to_channel(
        &self,
        req: GenerateRequest,
        tx: mpsc::Sender<String>,
    ) -> Result<String, ProviderError> {
        let body = Self::build_body(&req);
        let url = format!("{}?alt=sse", CONFIG.gemini_url("streamGenerateContent"));

        let request_builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body);

        let mut es =
            EventSource::new(request_builder).map_err(|e| ProviderError::Stream(e.to_string()))?;

        let mut full_text = String::new();
        let mut chunk_count = 0u32;

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("Gemini SSE stream opened");
                }
                Ok(Event::Message(msg)) => {
                    if msg.data == "[DONE]" {
                        break;
                    }

                    chunk_count += 1;
                    let frame: Value = match serde_json::from_str(&msg.data) {
                        Ok(f) => f,
                        Err(e) => {
                            warn!(chunk = chunk_count, error = %e, "Skipping unparseable chunk");
                            continue;
                        }
                    };

                    if let Some(text) = extract_chunk_text(&frame) {
                        full_text.push_str(&text);
                        if tx.send(text).await.is_err() {
                            // Receiver gone: the client disconnected. Abandon
                            // the generation; nothing gets persisted.
                            es.close();
                            return Err(ProviderError::Stream(
                                "client disconnected mid-stream".to_string(),
                            ));
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let text = response.text().await.unwrap_or_default();
                    es.close();
                    return Err(ProviderError::from_status(status.as_u16(), text));
                }
                Err(e) => {
                    es.close();
                    return Err(ProviderError::Stream(e.to_string()));
                }
            }
        }

        debug!(chunks = chunk_count, chars = full_text.len(), "Gemini stream complete");

        if full_text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(full_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{Attachment, ChatMessage};

    #[test]
    fn test_build_body_roles_and_system() {
        let req = GenerateRequest::new("How do I start?")
            .with_system("You are a coach.")
            .with_history(vec![
                ChatMessage::user("Hi"),
                ChatMessage::assistant("Hello! What brings you here?"),
            ]);

        let body = GeminiClient::build_body(&req);
        let contents = body["contents"].as_array().unwrap();

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "How do I start?");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a coach."
        );
    }

    #[test]
    fn test_build_body_attachments() {
        let req = GenerateRequest::new("What is in this file?").with_attachments(vec![Attachment {
            mime_type: "application/pdf".to_string(),
            data: "aGVsbG8=".to_string(),
        }]);

        let body = GeminiClient::build_body(&req);
        let parts = body["contents"][0]["parts"].as_array().unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inline_data"]["mime_type"], "application/pdf");
    }

    #[test]
    fn test_build_body_json_output() {
        let req = GenerateRequest::new("list things").with_json_output();
        let body = GeminiClient::build_body(&req);
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }
}
