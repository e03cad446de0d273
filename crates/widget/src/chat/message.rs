/// Stable identifier for one message: its creation time in unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub i64);

impl MessageId {
    /// Creates a typed message identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

/// One immutable entry of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    /// Unix milliseconds at creation.
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(id: MessageId, sender: Sender, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id,
            text: text.into(),
            sender,
            timestamp,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Allocates message ids from wall-clock time.
///
/// Two messages created within the same millisecond would collide, so the
/// clock bumps forward to keep ids strictly increasing.
#[derive(Debug, Clone, Default)]
pub struct MessageClock {
    last_id: Option<i64>,
}

impl MessageClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(id, timestamp)` for a message created now.
    pub fn tick(&mut self) -> (MessageId, i64) {
        self.tick_at(chrono::Utc::now().timestamp_millis())
    }

    pub fn tick_at(&mut self, now_millis: i64) -> (MessageId, i64) {
        let raw = match self.last_id {
            Some(last) if now_millis <= last => last.saturating_add(1),
            _ => now_millis,
        };
        self.last_id = Some(raw);
        (MessageId::new(raw), now_millis)
    }
}
