//! Conversation model.
//!
//! Provides:
//! - [`Message`] entries and their id/timestamp helpers
//! - [`ConversationStore`], the single owner of the message list
//! - [`ConversationReceiver`] for observing changes
//! - the demo transcript a session starts with

mod conversation;
mod demo;
mod events;
mod message;

pub use conversation::{ConversationState, ConversationStore, Rejection, Reply, Submission};
pub use demo::demo_transcript;
pub use events::{BusError, ConversationEvent, ConversationReceiver};
pub use message::{format_timestamp, Author, Clock, FixedClock, IdGenerator, Message, SystemClock};
