use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::Value;

use super::prompt::{user_prompt, SYSTEM_PROMPT};
use super::{ReportError, ReportService};
use crate::constants::{CLAUDE_API_URL, CLAUDE_API_VERSION, CLAUDE_CONNECT_TIMEOUT_SECS};
use crate::models::FormInputs;

/// Report backend on the Anthropic Messages API.
///
/// Streams the response and returns the accumulated text once the message
/// stops. `timeout` bounds the whole request including the stream, so a
/// stalled connection ends the generation cycle with an error.
pub struct ClaudeReportService {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl ClaudeReportService {
    pub fn new(
        api_key: String,
        model: &str,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, ReportError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CLAUDE_CONNECT_TIMEOUT_SECS).min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: CLAUDE_API_URL.to_string(),
            api_key,
            model: model.to_string(),
            max_tokens,
            timeout,
        })
    }

    /// Build from `ANTHROPIC_API_KEY` (already loaded from `.env` if present).
    pub fn from_env(model: &str, max_tokens: u32, timeout: Duration) -> Result<Self, ReportError> {
        match std::env::var("ANTHROPIC_API_KEY") {
            Ok(key) if !key.trim().is_empty() => {
                Self::new(key.trim().to_string(), model, max_tokens, timeout)
            }
            _ => Err(ReportError::MissingApiKey),
        }
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    fn transport_error(&self, e: reqwest::Error) -> ReportError {
        if e.is_timeout() {
            ReportError::Connection(format!("request timed out after {:?}", self.timeout))
        } else {
            ReportError::Connection(e.to_string())
        }
    }
}

/// Outcome of one server-sent event line.
#[derive(Debug, PartialEq, Eq)]
enum StreamStep {
    Continue,
    Done,
}

/// Incremental parser for the Messages API event stream.
///
/// Chunks may split lines, and UTF-8 sequences, anywhere. Bytes are held
/// until a newline arrives, so only complete lines are decoded.
#[derive(Debug, Default)]
struct StreamParser {
    buffer: Vec<u8>,
    text: String,
    done: bool,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the response body. Returns `true` once the message is complete.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<bool, ReportError> {
        self.buffer.extend_from_slice(chunk);
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            if self.line(line.trim_end())? == StreamStep::Done {
                self.done = true;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn line(&mut self, line: &str) -> Result<StreamStep, ReportError> {
        let data = match line.strip_prefix("data:") {
            Some(d) => d.trim(),
            None => return Ok(StreamStep::Continue),
        };
        if data == "[DONE]" {
            return Ok(StreamStep::Done);
        }
        let event: Value = match serde_json::from_str(data) {
            Ok(v) => v,
            Err(_) => return Ok(StreamStep::Continue),
        };
        match event.get("type").and_then(|t| t.as_str()) {
            Some("content_block_delta") => {
                if let Some(text) = event
                    .get("delta")
                    .and_then(|d| d.get("text"))
                    .and_then(|t| t.as_str())
                {
                    self.text.push_str(text);
                }
                Ok(StreamStep::Continue)
            }
            Some("message_stop") => Ok(StreamStep::Done),
            Some("error") => {
                let message = event
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .unwrap_or("Unknown streaming error");
                Err(ReportError::Stream(message.to_string()))
            }
            _ => Ok(StreamStep::Continue),
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The accumulated report, or `Empty` when nothing was streamed.
    pub fn finish(self) -> Result<String, ReportError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            Err(ReportError::Empty)
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl ReportService for ClaudeReportService {
    async fn generate_report(&self, inputs: &FormInputs) -> Result<String, ReportError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "stream": true,
            "system": SYSTEM_PROMPT,
            "messages": [{"role": "user", "content": user_prompt(inputs)}],
        });

        tracing::debug!(model = %self.model, "requesting report from claude");
        let response = self
            .client
            .post(&self.endpoint)
            .header("anthropic-version", CLAUDE_API_VERSION)
            .header("content-type", "application/json")
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body_text = response.text().await.unwrap_or_default();
            return Err(ReportError::from_status(status, &body_text));
        }

        let mut parser = StreamParser::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| {
                if e.is_timeout() {
                    self.transport_error(e)
                } else {
                    ReportError::Stream(e.to_string())
                }
            })?;
            if parser.feed(&bytes)? {
                break;
            }
        }
        if !parser.is_done() {
            tracing::debug!("claude stream ended without message_stop");
        }
        parser.finish()
    }

    fn name(&self) -> &str {
        "claude"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(text: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": text}})
        )
    }

    #[test]
    fn accumulates_deltas_until_stop() {
        let mut p = StreamParser::new();
        assert!(!p.feed(b"event: content_block_delta\n").unwrap());
        assert!(!p.feed(delta("### Report").as_bytes()).unwrap());
        assert!(!p.feed(delta(" for Pune").as_bytes()).unwrap());
        assert!(p.feed(b"data: {\"type\":\"message_stop\"}\n").unwrap());
        assert_eq!(p.finish().unwrap(), "### Report for Pune");
    }

    #[test]
    fn handles_lines_split_across_chunks() {
        let mut p = StreamParser::new();
        let line = delta("hello");
        let (a, b) = line.split_at(10);
        assert!(!p.feed(a.as_bytes()).unwrap());
        assert!(!p.feed(b.as_bytes()).unwrap());
        assert_eq!(p.finish().unwrap(), "hello");
    }

    #[test]
    fn multibyte_text_split_mid_character_survives() {
        let mut p = StreamParser::new();
        let line = delta("पानी");
        let bytes = line.as_bytes();
        // First byte of the first Devanagari character ends chunk one
        let cut = line.find('प').unwrap() + 1;
        assert!(!line.is_char_boundary(cut));
        assert!(!p.feed(&bytes[..cut]).unwrap());
        assert!(!p.feed(&bytes[cut..]).unwrap());
        assert_eq!(p.finish().unwrap(), "पानी");
    }

    #[test]
    fn error_event_becomes_stream_error() {
        let mut p = StreamParser::new();
        let err = p
            .feed(b"data: {\"type\":\"error\",\"error\":{\"message\":\"Overloaded\"}}\n")
            .unwrap_err();
        assert_eq!(err, ReportError::Stream("Overloaded".into()));
    }

    #[test]
    fn empty_stream_is_error() {
        let mut p = StreamParser::new();
        assert!(p.feed(b"data: [DONE]\n").unwrap());
        assert_eq!(p.finish(), Err(ReportError::Empty));
    }

    #[test]
    fn ignores_malformed_data() {
        let mut p = StreamParser::new();
        assert!(!p.feed(b"data: {not json\n: ping\n").unwrap());
        assert!(!p.is_done());
    }

    // ── Transport ───────────────────────────────────────────────

    #[tokio::test]
    async fn stalled_server_times_out_as_connection_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and hold the socket open without answering
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let service = ClaudeReportService::new(
            "test-key".into(),
            "test-model",
            256,
            Duration::from_millis(300),
        )
        .unwrap()
        .with_endpoint(format!("http://{}/v1/messages", addr));

        let err = service
            .generate_report(&FormInputs::default())
            .await
            .unwrap_err();
        assert!(
            matches!(&err, ReportError::Connection(m) if m.contains("timed out")),
            "unexpected error: {:?}",
            err
        );
    }
}
