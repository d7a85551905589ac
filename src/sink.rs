//! Client delivery handles
//!
//! A delivery handle is the opaque capability a transport binding hands
//! to the engine when it registers a participant. The engine only ever
//! pushes events through it; it never learns what transport sits behind.
//!
//! [`ChannelSink`] is the stock implementation: a bounded tokio mpsc
//! channel whose receiving end the transport binding drains onto the
//! wire. It uses `try_send`, so a slow or stalled subscriber can never
//! block the broadcast loop.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::event::{AudioEnd, ChunkFrame, ClientEvent};
use crate::message::Message;

/// Error pushing one event to one delivery handle
///
/// Always soft: the dispatcher logs it and moves on to the next
/// recipient. A failing handle is not evicted; it stays registered until
/// an explicit unregister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The transport session behind the handle is gone
    Closed,
    /// The handle's buffer is full; the event was dropped for this recipient
    Backpressure,
    /// Transport-specific delivery failure
    Transport(String),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Closed => write!(f, "Delivery handle closed"),
            SinkError::Backpressure => write!(f, "Delivery handle buffer full"),
            SinkError::Transport(msg) => write!(f, "Delivery failed: {}", msg),
        }
    }
}

impl std::error::Error for SinkError {}

/// Capability for pushing engine events to one registered participant
///
/// Implementations must not block: the dispatcher invokes these inline
/// while fanning out to every registered participant. Queue the event
/// and return, or fail fast with a [`SinkError`].
pub trait ClientSink: Send + Sync {
    /// Deliver a text or finalized-audio message
    fn on_message(&self, message: &Message) -> Result<(), SinkError>;

    /// Deliver one live audio chunk
    fn on_audio_chunk(&self, frame: &ChunkFrame) -> Result<(), SinkError>;

    /// Deliver an end-of-audio notification
    fn on_audio_end(&self, end: &AudioEnd) -> Result<(), SinkError>;
}

/// Channel-backed delivery handle
///
/// Wraps a bounded `mpsc::Sender`; the paired receiver belongs to the
/// transport binding that registered the participant.
pub struct ChannelSink {
    tx: mpsc::Sender<ClientEvent>,
}

impl ChannelSink {
    /// Wrap an existing sender
    pub fn new(tx: mpsc::Sender<ClientEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink and its paired receiver with the given buffer capacity
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<ClientEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    fn push(&self, event: ClientEvent) -> Result<(), SinkError> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Backpressure,
            TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

impl ClientSink for ChannelSink {
    fn on_message(&self, message: &Message) -> Result<(), SinkError> {
        self.push(ClientEvent::Message(message.clone()))
    }

    fn on_audio_chunk(&self, frame: &ChunkFrame) -> Result<(), SinkError> {
        self.push(ClientEvent::AudioChunk(frame.clone()))
    }

    fn on_audio_end(&self, end: &AudioEnd) -> Result<(), SinkError> {
        self.push(ClientEvent::AudioEnd(end.clone()))
    }
}
