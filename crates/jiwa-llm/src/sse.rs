use eventsource_stream::Eventsource;
use serde::Deserialize;
use tokio_stream::StreamExt;

use crate::error::LlmError;
use crate::provider::ChatStream;

/// Convert a Gemini `streamGenerateContent?alt=sse` response into a `ChatStream`.
pub(crate) fn gemini_sse_to_stream(response: reqwest::Response) -> ChatStream {
    let event_stream = response.bytes_stream().eventsource();
    let mapped = event_stream.filter_map(|event| match event {
        Ok(event) => parse_gemini_sse_event(&event.data),
        Err(e) => Some(Err(LlmError::SseParse(e.to_string()))),
    });
    Box::pin(mapped)
}

fn parse_gemini_sse_event(data: &str) -> Option<Result<String, LlmError>> {
    if data.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<GeminiStreamChunk>(data) {
        Ok(GeminiStreamChunk {
            error: Some(err), ..
        }) => Some(Err(LlmError::SseParse(format!(
            "Gemini stream error ({}): {}",
            err.status, err.message
        )))),
        Ok(chunk) => {
            let text: String = chunk
                .candidates
                .first()
                .and_then(|c| c.content.as_ref())
                .map(|content| content.parts.iter().map(|p| p.text.as_str()).collect())
                .unwrap_or_default();

            if text.is_empty() { None } else { Some(Ok(text)) }
        }
        Err(e) => Some(Err(LlmError::SseParse(format!(
            "failed to parse SSE data: {e}"
        )))),
    }
}

#[derive(Deserialize)]
struct GeminiStreamChunk {
    #[serde(default)]
    candidates: Vec<StreamCandidate>,
    #[serde(default)]
    error: Option<StreamError>,
}

#[derive(Deserialize)]
struct StreamCandidate {
    #[serde(default)]
    content: Option<StreamContent>,
}

#[derive(Deserialize)]
struct StreamContent {
    #[serde(default)]
    parts: Vec<StreamPart>,
}

#[derive(Deserialize)]
struct StreamPart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct StreamError {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}
