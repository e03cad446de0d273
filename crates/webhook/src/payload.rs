use serde::Serialize;
use serde_json::Value;

/// Outbound body: `{"message": "<user text>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookRequest {
    pub message: String,
}

impl WebhookRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Decoded success body. Every field other than `output` is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebhookReply {
    pub output: Option<Value>,
}

impl WebhookReply {
    /// Reads `output` from any JSON body.
    ///
    /// Bodies that are not objects (`"hello"`, `42`, `[]`) carry no output.
    /// Only `null` has no reply at all and yields `None`.
    pub fn from_body(body: Value) -> Option<Self> {
        match body {
            Value::Null => None,
            Value::Object(mut fields) => Some(Self {
                output: fields.remove("output"),
            }),
            _ => Some(Self::default()),
        }
    }

    pub fn with_output(output: impl Into<String>) -> Self {
        Self {
            output: Some(Value::String(output.into())),
        }
    }

    /// Returns the reply text, or `None` when the webhook sent nothing usable.
    ///
    /// Falsy values (`null`, `""`, `false`, `0`) count as absent. Other
    /// non-string values are rendered as their JSON text.
    pub fn reply_text(&self) -> Option<String> {
        match self.output.as_ref()? {
            Value::Null => None,
            Value::Bool(false) => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(text.clone()),
            Value::Number(number) if number.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }
}
