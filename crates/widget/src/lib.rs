#![deny(unsafe_code)]

/// Landing page shell hosting the chat widget.
pub mod app;
/// Chat widget state, dispatch and views.
pub mod chat;
/// Settings persistence.
pub mod settings;
