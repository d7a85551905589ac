//! Broadcast event types
//!
//! The payloads the engine pushes to registered delivery handles. All of
//! them are cheap to clone: `ChunkFrame` carries its audio bytes in a
//! reference-counted `Bytes`, so fan-out to N subscribers shares one
//! allocation.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::message::Message;

/// One live audio chunk, re-broadcast as it arrives
///
/// The assembler is a pass-through relay for real-time playback: chunks
/// are forwarded immediately, not after reassembly completes.
#[derive(Debug, Clone)]
pub struct ChunkFrame {
    /// Id of the in-flight audio transfer
    pub stream_id: String,
    /// Position of this chunk within the transfer
    pub index: u32,
    /// Total chunk count as declared by the sender on this chunk
    ///
    /// Senders may declare inconsistent totals across chunks; the engine
    /// forwards whatever the current chunk said (last-writer-wins).
    pub declared_total: u32,
    /// Chunk payload (zero-copy via reference counting)
    pub data: Bytes,
    /// MIME type fixed when the transfer began
    pub mime_type: String,
}

/// Notification that an audio transfer was finalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioEnd {
    /// Id of the finished transfer; invalid for further chunks
    pub stream_id: String,
    /// Destination participant or group id
    pub to: String,
    /// Sender participant id
    pub from: String,
    /// MIME type fixed when the transfer began
    pub mime_type: String,
    /// Caller-asserted duration in seconds
    pub duration_seconds: f64,
}

/// An event delivered to one registered participant
///
/// Mirrors the three capabilities of [`ClientSink`](crate::sink::ClientSink);
/// channel-backed handles receive their callbacks in this form.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A text or finalized-audio message
    Message(Message),
    /// A live audio chunk
    AudioChunk(ChunkFrame),
    /// End of an audio transfer
    AudioEnd(AudioEnd),
}
