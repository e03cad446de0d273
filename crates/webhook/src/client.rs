use futures::future::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use snafu::{OptionExt, ResultExt};

use super::backend::{
    BackendConfig, BackendError, BackendResult, BuildClientSnafu, ChatBackend, DecodeReplySnafu,
    NullReplySnafu, TransportSnafu, UnexpectedStatusSnafu,
};
use super::payload::{WebhookReply, WebhookRequest};

pub const WEBHOOK_BACKEND_ID: &str = "webhook";

/// Cap on how much of an error body is kept for diagnostics.
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

pub struct WebhookClient {
    config: BackendConfig,
    http: reqwest::Client,
}

impl WebhookClient {
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        if let Err(error) = reqwest::Url::parse(&config.webhook_url) {
            return Err(BackendError::InvalidEndpoint {
                stage: "webhook-client-new",
                url: config.webhook_url.clone(),
                details: error.to_string(),
            });
        }

        let http = reqwest::Client::builder().build().context(BuildClientSnafu {
            stage: "build-http-client",
        })?;

        Ok(Self { config, http })
    }

    pub fn webhook_url(&self) -> &str {
        &self.config.webhook_url
    }

    async fn post_message(&self, request: WebhookRequest) -> BackendResult<WebhookReply> {
        tracing::debug!(
            url = %self.config.webhook_url,
            message_len = request.message.len(),
            "posting message to webhook"
        );

        let response = self
            .http
            .post(&self.config.webhook_url)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .context(TransportSnafu {
                stage: "send-webhook-request",
            })?;

        let status = response.status();
        let payload = response.text().await.context(TransportSnafu {
            stage: "read-webhook-response",
        })?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                url = %self.config.webhook_url,
                "webhook responded with a non-success status"
            );
            return UnexpectedStatusSnafu {
                stage: "webhook-http-status",
                status: status.as_u16(),
                body: payload.chars().take(ERROR_BODY_PREVIEW_CHARS).collect::<String>(),
            }
            .fail();
        }

        let body: Value = serde_json::from_str(&payload).context(DecodeReplySnafu {
            stage: "decode-webhook-reply",
        })?;
        WebhookReply::from_body(body).context(NullReplySnafu {
            stage: "decode-webhook-reply",
        })
    }
}

impl ChatBackend for WebhookClient {
    fn id(&self) -> &str {
        WEBHOOK_BACKEND_ID
    }

    fn send<'a>(&'a self, request: WebhookRequest) -> BoxFuture<'a, BackendResult<WebhookReply>> {
        Box::pin(self.post_message(request))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> WebhookClient {
        WebhookClient::new(BackendConfig::new(format!("{}/webhook/chat", server.uri())))
            .expect("mock server url should be valid")
    }

    #[tokio::test]
    async fn posts_message_as_json_and_decodes_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "message": "Hi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "Hello!" })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .send(WebhookRequest::new("Hi"))
            .await
            .expect("webhook call should succeed");

        assert_eq!(reply.reply_text().as_deref(), Some("Hello!"));
    }

    #[tokio::test]
    async fn empty_object_is_a_reply_without_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .send(WebhookRequest::new("Hi"))
            .await
            .expect("an empty object is still a success");

        assert_eq!(reply.reply_text(), None);
    }

    #[tokio::test]
    async fn server_error_maps_to_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .send(WebhookRequest::new("Hi"))
            .await
            .expect_err("500 must fail");

        match error {
            BackendError::UnexpectedStatus { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Internal Server Error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn bare_string_body_is_a_reply_without_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("hello")))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .send(WebhookRequest::new("Hi"))
            .await
            .expect("a json string is still a success");

        assert_eq!(reply.reply_text(), None);
    }

    #[tokio::test]
    async fn null_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .send(WebhookRequest::new("Hi"))
            .await
            .expect_err("null has no output to read");

        assert!(matches!(error, BackendError::NullReply { .. }));
    }

    #[tokio::test]
    async fn non_json_success_body_fails_to_decode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .send(WebhookRequest::new("Hi"))
            .await
            .expect_err("html body is not a reply");

        assert!(matches!(error, BackendError::DecodeReply { .. }));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // Bind and release a port so nothing is listening on it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let client =
            WebhookClient::new(BackendConfig::new(format!("http://127.0.0.1:{port}/chat")))
                .unwrap();

        let error = client
            .send(WebhookRequest::new("Hi"))
            .await
            .expect_err("nothing is listening");

        assert!(matches!(error, BackendError::Transport { .. }));
    }

    #[test]
    fn rejects_malformed_url() {
        let result = WebhookClient::new(BackendConfig::new("not a url"));
        assert!(matches!(result, Err(BackendError::InvalidEndpoint { .. })));
    }

    #[test]
    fn default_config_points_at_the_hosted_webhook() {
        let client = WebhookClient::new(BackendConfig::default()).unwrap();
        assert!(client.webhook_url().starts_with("https://"));
        assert_eq!(client.id(), WEBHOOK_BACKEND_ID);
    }
}
