/// Emitted when the user asks to send the current input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub content: String,
}

impl Submit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Emitted whenever the input text changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftChanged {
    pub text: String,
}
