// src/api/http/stream.rs
// Shared SSE plumbing: an mpsc channel of ChatEvents bridged into an
// axum Sse response, and the delta-forwarding loop around a streamed
// generation.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::llm::{GenerateRequest, TextGenerator};

/// SSE event types for chat streaming
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Text content delta, in generation order
    Delta { content: String },
    /// Stream complete with the final (authoritative) text
    Done { content: String },
    /// Interview checklist satisfied; separate from rendered text
    InterviewComplete,
    /// Error occurred; nothing was persisted
    Error { message: String },
}

/// Convert a ChatEvent channel into an SSE response.
pub fn sse_response(
    rx: mpsc::Receiver<ChatEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        let mut rx = rx;
        while let Some(event) = rx.recv().await {
            let data = serde_json::to_string(&event).unwrap_or_default();
            yield Ok(Event::default().data(data));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Drive one streamed generation, forwarding deltas to the client.
/// Returns the assembled text on success; on failure an Error event is
/// sent and None returned so the caller persists nothing. A disconnected
/// client tears the whole pipeline down the same way.
pub async fn run_stream(
    llm: Arc<dyn TextGenerator>,
    req: GenerateRequest,
    tx: &mpsc::Sender<ChatEvent>,
) -> Option<String> {
    let (delta_tx, mut delta_rx) = mpsc::channel::<String>(100);

    let generation = tokio::spawn(async move { llm.stream_to_channel(req, delta_tx).await });

    while let Some(delta) = delta_rx.recv().await {
        if tx.send(ChatEvent::Delta { content: delta }).await.is_err() {
            // Client went away; dropping the receiver aborts the generation.
            break;
        }
    }
    drop(delta_rx);

    match generation.await {
        Ok(Ok(full_text)) => Some(full_text),
        Ok(Err(e)) => {
            let _ = tx
                .send(ChatEvent::Error {
                    message: e.to_string(),
                })
                .await;
            None
        }
        Err(e) => {
            let _ = tx
                .send(ChatEvent::Error {
                    message: format!("Generation task failed: {e}"),
                })
                .await;
            None
        }
    }
}
