use fineflow_webhook::{ChatBackend, WebhookRequest};

use crate::chat::session::{PendingSend, SendOutcome};

/// Builds the webhook payload for a pending send.
pub fn request_for(pending: &PendingSend) -> WebhookRequest {
    WebhookRequest::new(pending.text())
}

/// Performs one webhook call and folds every failure into `SendOutcome::Failed`.
pub async fn dispatch(backend: &dyn ChatBackend, request: WebhookRequest) -> SendOutcome {
    tracing::debug!(
        backend = backend.id(),
        message_len = request.message.len(),
        "dispatching message"
    );

    match backend.send(request).await {
        Ok(reply) => SendOutcome::Replied(reply.reply_text()),
        Err(error) => {
            tracing::warn!(backend = backend.id(), error = %error, "webhook call failed");
            SendOutcome::Failed(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use fineflow_webhook::{BackendError, BackendResult, WebhookReply};
    use futures::future::BoxFuture;

    use super::*;
    use crate::chat::message::Sender;
    use crate::chat::session::{ChatSession, DEFAULT_EMPTY_REPLY_TEXT, DEFAULT_FALLBACK_TEXT};

    enum Script {
        Reply(WebhookReply),
        Status(u16),
    }

    /// In-memory webhook that records every request it receives.
    struct ScriptedBackend {
        script: Script,
        received: Mutex<Vec<WebhookRequest>>,
    }

    impl ScriptedBackend {
        fn new(script: Script) -> Self {
            Self {
                script,
                received: Mutex::new(Vec::new()),
            }
        }

        fn received(&self) -> Vec<WebhookRequest> {
            self.received.lock().unwrap().clone()
        }
    }

    impl ChatBackend for ScriptedBackend {
        fn id(&self) -> &str {
            "scripted"
        }

        fn send<'a>(
            &'a self,
            request: WebhookRequest,
        ) -> BoxFuture<'a, BackendResult<WebhookReply>> {
            self.received.lock().unwrap().push(request);
            let result = match &self.script {
                Script::Reply(reply) => Ok(reply.clone()),
                Script::Status(status) => Err(BackendError::UnexpectedStatus {
                    stage: "scripted",
                    status: *status,
                    body: String::new(),
                }),
            };
            Box::pin(async move { result })
        }
    }

    async fn send_through(session: &mut ChatSession, backend: &ScriptedBackend, text: &str) {
        session.set_draft(text);
        let Some(pending) = session.begin_submit() else {
            return;
        };
        let outcome = dispatch(backend, request_for(&pending)).await;
        session.resolve(pending, outcome);
    }

    #[tokio::test]
    async fn hi_with_output_ends_with_hello() {
        let backend = ScriptedBackend::new(Script::Reply(WebhookReply::with_output("Hello!")));
        let mut session = ChatSession::default();

        send_through(&mut session, &backend, "Hi").await;

        let log = session.messages();
        assert_eq!(log.len(), 2);
        assert_eq!((log[0].sender, log[0].text.as_str()), (Sender::User, "Hi"));
        assert_eq!((log[1].sender, log[1].text.as_str()), (Sender::Bot, "Hello!"));
        assert_eq!(session.draft(), "");
        assert!(!session.is_busy());
        assert_eq!(backend.received(), vec![WebhookRequest::new("Hi")]);
    }

    #[tokio::test]
    async fn hi_with_server_error_ends_with_fallback() {
        let backend = ScriptedBackend::new(Script::Status(500));
        let mut session = ChatSession::default();

        send_through(&mut session, &backend, "Hi").await;

        let log = session.messages();
        assert_eq!((log[0].sender, log[0].text.as_str()), (Sender::User, "Hi"));
        assert_eq!(
            (log[1].sender, log[1].text.as_str()),
            (Sender::Bot, DEFAULT_FALLBACK_TEXT)
        );
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn hi_with_empty_object_ends_with_placeholder() {
        let backend = ScriptedBackend::new(Script::Reply(WebhookReply::default()));
        let mut session = ChatSession::default();

        send_through(&mut session, &backend, "Hi").await;

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].text, DEFAULT_EMPTY_REPLY_TEXT);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn blank_draft_never_reaches_the_backend() {
        let backend = ScriptedBackend::new(Script::Reply(WebhookReply::with_output("unused")));
        let mut session = ChatSession::default();

        send_through(&mut session, &backend, "   ").await;

        assert!(session.messages().is_empty());
        assert!(backend.received().is_empty());
    }

    #[tokio::test]
    async fn user_message_is_logged_before_the_call_resolves() {
        let backend = ScriptedBackend::new(Script::Reply(WebhookReply::with_output("later")));
        let mut session = ChatSession::default();
        session.set_draft("Hi");

        let pending = session.begin_submit().unwrap();
        assert!(backend.received().is_empty());
        assert_eq!(session.messages().len(), 1);
        assert!(session.messages()[0].is_user());

        let outcome = dispatch(&backend, request_for(&pending)).await;
        session.resolve(pending, outcome);
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn every_outcome_adds_exactly_one_bot_message() {
        let backends = [
            ScriptedBackend::new(Script::Reply(WebhookReply::with_output("ok"))),
            ScriptedBackend::new(Script::Reply(WebhookReply::default())),
            ScriptedBackend::new(Script::Status(404)),
            ScriptedBackend::new(Script::Status(503)),
        ];
        let mut session = ChatSession::default();

        for (round, backend) in backends.iter().enumerate() {
            send_through(&mut session, backend, "ping").await;
            assert_eq!(session.messages().len(), (round + 1) * 2);
            assert_eq!(session.messages().last().unwrap().sender, Sender::Bot);
            assert!(!session.is_busy());
        }
    }
}
