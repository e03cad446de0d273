use std::sync::Arc;

mod backend;
mod client;
mod payload;

pub use backend::{
    BackendConfig, BackendError, BackendResult, ChatBackend, DEFAULT_WEBHOOK_URL,
};
pub use client::{WEBHOOK_BACKEND_ID, WebhookClient};
pub use payload::{WebhookReply, WebhookRequest};

pub fn create_backend(config: BackendConfig) -> BackendResult<Arc<dyn ChatBackend>> {
    Ok(Arc::new(WebhookClient::new(config)?))
}
