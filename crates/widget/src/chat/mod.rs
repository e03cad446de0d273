/// Async webhook exchange folded into session outcomes.
pub mod dispatch;
/// Event contracts for chat module wiring.
pub mod events;
pub mod message;
pub mod message_input;
pub mod message_list;
pub mod scroll_manager;
/// View state container and its transitions.
pub mod session;
pub mod widget;

pub use dispatch::{dispatch, request_for};
pub use events::{DraftChanged, Submit};
pub use message::{ChatMessage, MessageClock, MessageId, Sender};
pub use message_input::MessageInput;
pub use message_list::MessageList;
pub use scroll_manager::ScrollManager;
pub use session::{
    ChatSession, PendingSend, RequestState, SendOutcome, SendingGuard, SessionTexts,
};
pub use widget::ChatWidget;
