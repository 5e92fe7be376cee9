//! Conversation state management
//!
//! [`ConversationStore`] owns the ordered message list and the
//! awaiting-response flag. A submission appends the user's message right
//! away and hands the text to a [`ResponseGenerator`] on a spawned task; the
//! finished reply comes back over a channel and is applied by the owner.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::demo::demo_transcript;
use super::events::{ConversationEvent, ConversationReceiver, EventSender};
use super::message::{format_timestamp, Clock, IdGenerator, Message, SystemClock};
use crate::responder::{ResponderError, ResponseGenerator};

/// Snapshot of the conversation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    messages: Vec<Message>,
    is_awaiting_response: bool,
}

impl ConversationState {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.is_awaiting_response
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Why a submission was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Text was empty or whitespace only
    Empty,
    /// A response is still outstanding
    Busy,
}

/// Result of [`ConversationStore::submit_user_message`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Accepted { id: String },
    Rejected(Rejection),
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// A finished response, tagged with the user message it answers.
#[derive(Debug)]
pub struct Reply {
    request_id: String,
    outcome: Result<String, ResponderError>,
}

impl Reply {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

/// The outstanding deferred task. Its join handle doubles as cancel handle.
struct PendingReply {
    request_id: String,
    handle: Option<JoinHandle<()>>,
}

impl PendingReply {
    fn cancel(self) {
        if let Some(handle) = self.handle {
            handle.abort();
        }
    }
}

/// Owner of the conversation for one session.
pub struct ConversationStore {
    state: ConversationState,
    ids: IdGenerator,
    clock: Arc<dyn Clock>,
    generator: Arc<dyn ResponseGenerator>,
    events: EventSender,
    pending: Option<PendingReply>,
    reply_tx: mpsc::UnboundedSender<Reply>,
    reply_rx: mpsc::UnboundedReceiver<Reply>,
}

impl ConversationStore {
    /// Create an empty store answering through `generator`.
    pub fn new(generator: Arc<dyn ResponseGenerator>) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        Self {
            state: ConversationState::default(),
            ids: IdGenerator::new(),
            clock: Arc::new(SystemClock),
            generator,
            events: EventSender::new(),
            pending: None,
            reply_tx,
            reply_rx,
        }
    }

    /// Replace the clock used for message timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create a store already seeded with the demo transcript.
    pub fn with_demo(generator: Arc<dyn ResponseGenerator>) -> Self {
        let mut store = Self::new(generator);
        store.initialize();
        store
    }

    /// Seed the demo transcript and clear the awaiting flag.
    ///
    /// Any outstanding response is cancelled; a reply that already made it
    /// into the channel is discarded when it arrives.
    pub fn initialize(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(request_id = %pending.request_id, "cancelling pending reply on reset");
            pending.cancel();
        }
        let was_awaiting = self.state.is_awaiting_response;
        self.state = ConversationState {
            messages: demo_transcript(),
            is_awaiting_response: false,
        };
        self.events.emit(ConversationEvent::Reset {
            len: self.state.messages.len(),
        });
        if was_awaiting {
            self.events.emit(ConversationEvent::AwaitingChanged(false));
        }
    }

    /// Observe changes to the conversation.
    pub fn subscribe(&self) -> ConversationReceiver {
        self.events.subscribe()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        self.state.messages()
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.state.is_awaiting_response
    }

    /// Append the user's message and start generating a response.
    ///
    /// Whitespace-only text and submissions made while a response is
    /// outstanding are ignored without touching state.
    pub fn submit_user_message(&mut self, text: &str) -> Submission {
        if text.trim().is_empty() {
            return Submission::Rejected(Rejection::Empty);
        }
        if self.state.is_awaiting_response {
            tracing::debug!("submission ignored, response still pending");
            return Submission::Rejected(Rejection::Busy);
        }

        let id = self.ids.next_id();
        let message = Message::user(id.clone(), text, self.timestamp());
        self.append(message);
        self.set_awaiting(true);

        self.pending = Some(self.spawn_reply(id.clone(), text.to_string()));
        tracing::info!(request_id = %id, chars = text.chars().count(), "user message submitted");
        Submission::Accepted { id }
    }

    fn spawn_reply(&self, request_id: String, prompt: String) -> PendingReply {
        let tx = self.reply_tx.clone();
        let generator = Arc::clone(&self.generator);
        let task_request_id = request_id.clone();

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Some(runtime.spawn(async move {
                let outcome = generator.generate(&prompt).await;
                // The store may be gone; its receiver going away is fine.
                let _ = tx.send(Reply {
                    request_id: task_request_id,
                    outcome,
                });
            })),
            Err(e) => {
                tracing::error!("no async runtime to generate a response: {}", e);
                let _ = tx.send(Reply {
                    request_id: task_request_id,
                    outcome: Err(ResponderError::Unavailable),
                });
                None
            }
        };

        PendingReply { request_id, handle }
    }

    /// Wait for the next finished reply. Cancel-safe.
    ///
    /// Never resolves while nothing is outstanding, which makes it a good
    /// `tokio::select!` arm.
    pub async fn recv_reply(&mut self) -> Option<Reply> {
        self.reply_rx.recv().await
    }

    /// Apply a reply produced by this store's task.
    ///
    /// Returns `false` and drops the reply when it does not answer the
    /// outstanding submission.
    pub fn apply_reply(&mut self, reply: Reply) -> bool {
        match &self.pending {
            Some(pending) if pending.request_id == reply.request_id => {}
            _ => {
                tracing::debug!(request_id = %reply.request_id, "discarding stale reply");
                return false;
            }
        }
        self.pending = None;

        let id = self.ids.next_id();
        let timestamp = self.timestamp();
        let message = match reply.outcome {
            Ok(content) => Message::assistant(id, content, timestamp),
            Err(e) => {
                tracing::warn!(request_id = %reply.request_id, "response generation failed: {}", e);
                Message::assistant_error(id, format!("Error: {}", e), timestamp)
            }
        };
        self.append(message);
        self.set_awaiting(false);
        true
    }

    /// Apply a reply if one is already waiting. Never blocks.
    pub fn try_apply_reply(&mut self) -> bool {
        let mut applied = false;
        while let Ok(reply) = self.reply_rx.try_recv() {
            applied |= self.apply_reply(reply);
        }
        applied
    }

    /// Wait for the outstanding response and apply it.
    ///
    /// Returns `false` right away when nothing is outstanding.
    pub async fn settle(&mut self) -> bool {
        while self.pending.is_some() {
            match self.reply_rx.recv().await {
                Some(reply) => {
                    if self.apply_reply(reply) {
                        return true;
                    }
                }
                None => return false,
            }
        }
        false
    }

    /// Tear down the session, cancelling any outstanding response.
    pub fn shutdown(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(request_id = %pending.request_id, "cancelling pending reply on shutdown");
            pending.cancel();
        }
    }

    fn append(&mut self, message: Message) {
        let id = message.id().to_string();
        self.state.messages.push(message);
        self.events.emit(ConversationEvent::MessageAppended {
            index: self.state.messages.len() - 1,
            id,
        });
    }

    fn set_awaiting(&mut self, awaiting: bool) {
        if self.state.is_awaiting_response != awaiting {
            self.state.is_awaiting_response = awaiting;
            self.events.emit(ConversationEvent::AwaitingChanged(awaiting));
        }
    }

    fn timestamp(&self) -> String {
        format_timestamp(self.clock.now())
    }
}

impl Drop for ConversationStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}
