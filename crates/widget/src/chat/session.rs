use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::chat::message::{ChatMessage, MessageClock, Sender};

pub const DEFAULT_EMPTY_REPLY_TEXT: &str = "I received a response, but it was empty.";
pub const DEFAULT_FALLBACK_TEXT: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// Fixed bot texts used when the webhook gives nothing usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTexts {
    pub empty_reply: String,
    pub fallback: String,
}

impl Default for SessionTexts {
    fn default() -> Self {
        Self {
            empty_reply: DEFAULT_EMPTY_REPLY_TEXT.to_string(),
            fallback: DEFAULT_FALLBACK_TEXT.to_string(),
        }
    }
}

/// Request lifecycle: `Idle -> Sending -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Sending,
}

/// Result of one webhook exchange, already folded into widget terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// 2xx with a decodable body. `None` when the body had no usable `output`.
    Replied(Option<String>),
    /// Transport failure, non-2xx status, or undecodable body.
    Failed(String),
}

/// Scoped hold on the session's sending flag. Dropping it returns the
/// session to `Idle`.
#[derive(Debug)]
pub struct SendingGuard {
    flag: Arc<AtomicBool>,
}

impl SendingGuard {
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { flag: flag.clone() })
    }

    fn belongs_to(&self, flag: &Arc<AtomicBool>) -> bool {
        Arc::ptr_eq(&self.flag, flag)
    }
}

impl Drop for SendingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A message that left the draft and is waiting for its reply.
#[derive(Debug)]
pub struct PendingSend {
    text: String,
    guard: SendingGuard,
}

impl PendingSend {
    /// The text to send, exactly as typed.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// View state of the widget: visibility, draft, busy flag and the message log.
#[derive(Debug)]
pub struct ChatSession {
    is_open: bool,
    is_minimized: bool,
    draft: String,
    sending: Arc<AtomicBool>,
    messages: Vec<ChatMessage>,
    clock: MessageClock,
    texts: SessionTexts,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(None, SessionTexts::default())
    }
}

impl ChatSession {
    /// Creates a closed session, seeded with a bot greeting when one is given.
    pub fn new(greeting: Option<&str>, texts: SessionTexts) -> Self {
        let mut session = Self {
            is_open: false,
            is_minimized: false,
            draft: String::new(),
            sending: Arc::new(AtomicBool::new(false)),
            messages: Vec::new(),
            clock: MessageClock::new(),
            texts,
        };

        if let Some(greeting) = greeting.filter(|text| !text.trim().is_empty()) {
            session.push(Sender::Bot, greeting.to_string());
        }

        session
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_minimized(&self) -> bool {
        self.is_minimized
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_busy(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    pub fn request_state(&self) -> RequestState {
        if self.is_busy() {
            RequestState::Sending
        } else {
            RequestState::Idle
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn texts(&self) -> &SessionTexts {
        &self.texts
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Flips visibility and returns whether the panel is now open.
    pub fn toggle_open(&mut self) -> bool {
        self.is_open = !self.is_open;
        self.is_open
    }

    pub fn toggle_minimize(&mut self) {
        self.is_minimized = !self.is_minimized;
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn can_send(&self) -> bool {
        !self.draft.trim().is_empty() && !self.is_busy()
    }

    pub fn shows_conversation(&self) -> bool {
        self.is_open && !self.is_minimized
    }

    pub fn shows_typing_indicator(&self) -> bool {
        self.is_busy() && !self.is_minimized
    }

    /// `Idle -> Sending`.
    ///
    /// Appends the draft as a user message, clears the draft and takes the
    /// sending flag. Returns `None` without touching anything when the draft
    /// is blank or a request is already in flight.
    pub fn begin_submit(&mut self) -> Option<PendingSend> {
        if self.draft.trim().is_empty() {
            return None;
        }

        let guard = SendingGuard::try_acquire(&self.sending)?;
        let text = std::mem::take(&mut self.draft);
        self.push(Sender::User, text.clone());

        Some(PendingSend { text, guard })
    }

    /// `Sending -> Idle` after a reply arrived.
    pub fn complete_success(&mut self, pending: PendingSend, output: Option<String>) {
        let text = output
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| self.texts.empty_reply.clone());
        self.finish(pending, text);
    }

    /// `Sending -> Idle` after the call failed. The draft is not restored.
    pub fn complete_failure(&mut self, pending: PendingSend, error: &str) {
        tracing::debug!(error = %error, "showing fallback reply");
        let text = self.texts.fallback.clone();
        self.finish(pending, text);
    }

    pub fn resolve(&mut self, pending: PendingSend, outcome: SendOutcome) {
        match outcome {
            SendOutcome::Replied(output) => self.complete_success(pending, output),
            SendOutcome::Failed(error) => self.complete_failure(pending, &error),
        }
    }

    fn finish(&mut self, pending: PendingSend, text: String) {
        if !pending.guard.belongs_to(&self.sending) {
            tracing::warn!("ignoring a reply issued by another session");
            return;
        }

        self.push(Sender::Bot, text);
        drop(pending);
    }

    fn push(&mut self, sender: Sender, text: String) {
        let (id, timestamp) = self.clock.tick();
        self.messages
            .push(ChatMessage::new(id, sender, text, timestamp));
    }
}
