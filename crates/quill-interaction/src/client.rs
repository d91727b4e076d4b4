//! Resilient request client for the remote chat endpoint.
//!
//! Each send makes up to [`MAX_RETRIES`] attempts. An attempt first probes
//! TCP reachability of the endpoint host; an unreachable host waits a fixed
//! short delay without consuming a backoff slot. A reachable attempt issues
//! the request with a bounded timeout and validates that the body carries
//! the reply field; anything else sleeps the current backoff, doubles it,
//! and tries again. Exhausting the ceiling returns a terminal
//! [`QuillError::Transport`] to the caller.

use crate::schema::{ChatReply, ChatRequest, ContextMessage};
use quill_core::message::ConversationMessage;
use quill_core::{QuillError, Result};
use quill_infrastructure::QuillConfig;
use reqwest::Url;
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum attempts per send.
const MAX_RETRIES: u32 = 5;
/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Reachability probe timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
/// Fixed wait after an unreachable probe.
const PROBE_RETRY_DELAY: Duration = Duration::from_secs(1);
/// First backoff slot; doubles after each failed attempt.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Client for a single remote chat endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: Url,
    model: Option<String>,
    probe_delay: Duration,
    initial_backoff: Duration,
}

impl ChatClient {
    /// Creates a client for the given endpoint URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| QuillError::config(format!("invalid endpoint URL '{endpoint}': {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| QuillError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint,
            model: None,
            probe_delay: PROBE_RETRY_DELAY,
            initial_backoff: INITIAL_BACKOFF,
        })
    }

    /// Builds a client from configuration, honoring `QUILL_ENDPOINT` and
    /// `QUILL_MODEL` environment overrides.
    pub fn from_config(config: &QuillConfig) -> Result<Self> {
        let endpoint = env::var("QUILL_ENDPOINT").unwrap_or_else(|_| config.endpoint.clone());
        let model = env::var("QUILL_MODEL").unwrap_or_else(|_| config.model.clone());
        Ok(Self::new(&endpoint)?.with_model(model))
    }

    /// Sets the model name passed through with each request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Shrinks the retry delays. Intended for tests; production callers
    /// should keep the defaults.
    pub fn with_retry_delays(mut self, probe_delay: Duration, initial_backoff: Duration) -> Self {
        self.probe_delay = probe_delay;
        self.initial_backoff = initial_backoff;
        self
    }

    /// Sends one message with its context window and returns the reply text.
    ///
    /// Synchronous from the caller's perspective: resolves only once a valid
    /// reply arrived or the retry ceiling was exhausted.
    pub async fn send(
        &self,
        message: &str,
        conversation_id: &str,
        context: &[ConversationMessage],
    ) -> Result<String> {
        let request = ChatRequest {
            message: message.to_string(),
            conversation_id: conversation_id.to_string(),
            context: context.iter().map(ContextMessage::from).collect(),
            model: self.model.clone(),
        };

        let mut backoff = self.initial_backoff;
        let mut last_error = String::new();

        for attempt in 1..=MAX_RETRIES {
            if !self.probe_reachable().await {
                warn!(attempt, endpoint = %self.endpoint, "endpoint unreachable");
                last_error = "endpoint unreachable".to_string();
                tokio::time::sleep(self.probe_delay).await;
                continue;
            }

            match self.attempt(&request).await {
                Ok(reply) => {
                    debug!(attempt, "received valid reply");
                    return Ok(reply);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "request attempt failed");
                    last_error = e.to_string();
                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        Err(QuillError::transport(format!(
            "no valid reply after {MAX_RETRIES} attempts (last error: {last_error})"
        )))
    }

    /// One request/response exchange with strict body validation.
    async fn attempt(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| QuillError::transport(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuillError::transport(format!(
                "endpoint returned {status}"
            )));
        }

        // A transport success with a malformed body is a failure, not a
        // success.
        let reply: ChatReply = response
            .json()
            .await
            .map_err(|e| QuillError::transport(format!("malformed reply body: {e}")))?;

        match reply.response {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(QuillError::transport("reply is missing the response field")),
        }
    }

    /// Cheap TCP reachability probe of the endpoint host.
    async fn probe_reachable(&self) -> bool {
        let Some(host) = self.endpoint.host_str() else {
            return false;
        };
        let Some(port) = self.endpoint.port_or_known_default() else {
            return false;
        };

        matches!(
            tokio::time::timeout(
                PROBE_TIMEOUT,
                tokio::net::TcpStream::connect((host, port)),
            )
            .await,
            Ok(Ok(_))
        )
    }
}
