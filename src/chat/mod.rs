//! Rider and driver chat, with a simulated driver who answers on a delay.

mod message;
mod replies;
mod service;

pub use message::{Message, MessageDraft, SenderRole};
pub use replies::{quick_messages, reply_for, FALLBACK_REPLY};
pub use service::{AutoReply, ChatService, ChatSession, SentMessage, DEFAULT_REPLY_DELAY};
