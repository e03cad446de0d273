use futures::future::BoxFuture;
use snafu::Snafu;

use crate::payload::{WebhookReply, WebhookRequest};

pub const DEFAULT_WEBHOOK_URL: &str =
    "https://sabapathybuilds4461.app.n8n.cloud/webhook/0115f48e-3d97-43a0-b08e-42779a8398e0/chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub webhook_url: String,
}

impl BackendConfig {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into().trim().to_string(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WEBHOOK_URL)
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BackendError {
    #[snafu(display("webhook url '{url}' is invalid: {details}"))]
    InvalidEndpoint {
        stage: &'static str,
        url: String,
        details: String,
    },
    #[snafu(display("failed to build http client on `{stage}`, {source}"))]
    BuildClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("webhook transport failed on `{stage}`, {source}"))]
    Transport {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("webhook returned status {status}: {body}"))]
    UnexpectedStatus {
        stage: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to decode webhook reply on `{stage}`, {source}"))]
    DecodeReply {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("webhook replied with a null body on `{stage}`"))]
    NullReply { stage: &'static str },
}

/// Remote collaborator that turns one user message into one reply.
///
/// Implementations perform exactly one attempt per call: no retry, no timeout,
/// no cancellation.
pub trait ChatBackend: Send + Sync {
    fn id(&self) -> &str;
    fn send<'a>(&'a self, request: WebhookRequest) -> BoxFuture<'a, BackendResult<WebhookReply>>;
}
