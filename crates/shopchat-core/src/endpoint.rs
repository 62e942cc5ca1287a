//! Client for the single chat endpoint
//!
//! Wire contract: `POST <url>` with a JSON body `{"message": "..."}`, answered
//! with a JSON object whose `response` field holds the assistant's reply.

use std::future::Future;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Production endpoint used when neither the config nor the command line names one
pub const DEFAULT_ENDPOINT: &str = "https://a2emnug7k3.execute-api.eu-west-1.amazonaws.com";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// What the endpoint said, once a JSON body came back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(String),
    /// The body had no non-empty string `response` field
    Unusable,
}

impl Reply {
    pub fn from_body(body: &Value) -> Self {
        match body.get("response").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => Reply::Answer(text.to_string()),
            _ => Reply::Unusable,
        }
    }
}

/// The request never produced a JSON body
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("response body is not JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request task aborted: {0}")]
    Aborted(String),
}

pub trait ChatEndpoint {
    fn send(&self, message: &str) -> impl Future<Output = Result<Reply, EndpointError>> + Send;
}

#[derive(Clone)]
pub struct HttpEndpoint {
    client: Client,
    url: String,
}

impl HttpEndpoint {
    pub fn new(url: &str) -> Self {
        Self::with_client(url, Client::new())
    }

    pub fn with_client(url: &str, client: Client) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ChatEndpoint for HttpEndpoint {
    async fn send(&self, message: &str) -> Result<Reply, EndpointError> {
        debug!(url = %self.url, chars = message.chars().count(), "sending chat message");

        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        // The body decides the outcome, not the status: an error page that
        // still carries a `response` field is shown as a reply.
        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;

        if !status.is_success() {
            debug!(%status, "chat endpoint returned non-success status");
        }

        Ok(Reply::from_body(&body))
    }
}
