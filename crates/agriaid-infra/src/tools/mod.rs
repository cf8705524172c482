//! Tools backed by infrastructure adapters.

pub mod send_message;

pub use send_message::SendMessageTool;
