//! Change notifications for conversation observers.

use tokio::sync::broadcast;

/// Something observable happened to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    /// A message was appended at `index`.
    MessageAppended { index: usize, id: String },
    /// The awaiting-response flag flipped.
    AwaitingChanged(bool),
    /// The sequence was replaced wholesale (session start).
    Reset { len: usize },
}

impl ConversationEvent {
    /// Whether the message sequence changed, so views should jump to the end.
    pub fn changes_messages(&self) -> bool {
        matches!(self, Self::MessageAppended { .. } | Self::Reset { .. })
    }
}

/// Sender half, owned by the store.
#[derive(Clone)]
pub(crate) struct EventSender {
    tx: broadcast::Sender<ConversationEvent>,
}

impl EventSender {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub(crate) fn emit(&self, event: ConversationEvent) {
        let _ = self.tx.send(event);
    }

    pub(crate) fn subscribe(&self) -> ConversationReceiver {
        ConversationReceiver {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiver half handed to UI bindings.
pub struct ConversationReceiver {
    rx: broadcast::Receiver<ConversationEvent>,
}

impl ConversationReceiver {
    /// Receive the next event.
    pub async fn recv(&mut self) -> Result<ConversationEvent, BusError> {
        self.rx.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => BusError::Closed,
            broadcast::error::RecvError::Lagged(n) => BusError::Lagged(n),
        })
    }

    /// Try to receive an event without waiting.
    pub fn try_recv(&mut self) -> Result<Option<ConversationEvent>, BusError> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(BusError::Closed),
            Err(broadcast::error::TryRecvError::Lagged(n)) => Err(BusError::Lagged(n)),
        }
    }

    /// Drain everything currently queued.
    ///
    /// A lagged receiver skips what it missed and keeps draining; a closed
    /// one returns what it collected so far.
    pub fn drain(&mut self) -> Vec<ConversationEvent> {
        let mut events = Vec::new();
        loop {
            match self.try_recv() {
                Ok(Some(event)) => events.push(event),
                Ok(None) | Err(BusError::Closed) => break,
                Err(BusError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "conversation observer lagged");
                }
            }
        }
        events
    }
}

/// Bus errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BusError {
    #[error("Channel closed")]
    Closed,
    #[error("Lagged behind by {0} events")]
    Lagged(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        let sender = EventSender::new();
        sender.emit(ConversationEvent::AwaitingChanged(true));
    }

    #[test]
    fn test_subscriber_sees_events_in_order() {
        let sender = EventSender::new();
        let mut rx = sender.subscribe();
        sender.emit(ConversationEvent::MessageAppended {
            index: 5,
            id: "42".to_string(),
        });
        sender.emit(ConversationEvent::AwaitingChanged(true));

        assert_eq!(
            rx.drain(),
            vec![
                ConversationEvent::MessageAppended {
                    index: 5,
                    id: "42".to_string()
                },
                ConversationEvent::AwaitingChanged(true),
            ]
        );
        assert_eq!(rx.try_recv(), Ok(None));
    }

    #[test]
    fn test_closed_after_sender_dropped() {
        let sender = EventSender::new();
        let mut rx = sender.subscribe();
        drop(sender);
        assert_eq!(rx.try_recv(), Err(BusError::Closed));
    }

    #[test]
    fn test_subscriber_only_sees_later_events() {
        let sender = EventSender::new();
        sender.emit(ConversationEvent::AwaitingChanged(true));
        let mut rx = sender.subscribe();
        sender.emit(ConversationEvent::AwaitingChanged(false));
        assert_eq!(rx.drain(), vec![ConversationEvent::AwaitingChanged(false)]);
    }
}
