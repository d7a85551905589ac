//! Relay engine façade
//!
//! The single operation surface transport bindings call. One engine
//! instance is constructed at process start and shared (`Arc`) across
//! every binding, so RPC, WebSocket and TCP adapters all observe the
//! same presence, history and in-flight audio state.
//!
//! Store-then-broadcast order is fixed: a message is always appended to
//! history before any subscriber observes the broadcast, so a client
//! that fetches history right after a notification is guaranteed to see
//! the message included.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::config::EngineConfig;
use crate::error::{RelayError, Result};
use crate::event::{AudioEnd, ClientEvent};
use crate::message::{Message, Scope};
use crate::sink::{ChannelSink, ClientSink};

use super::audio::AudioAssembler;
use super::dispatch::BroadcastDispatcher;
use super::history::HistoryStore;
use super::registry::ClientRegistry;

/// Transport-agnostic chat/audio relay engine
///
/// Owns the participant registry, the scoped history store and the table
/// of in-flight audio transfers; bindings touch those only through the
/// operations here. Every broadcast goes to *all* registered
/// participants regardless of addressee; scoping only selects the
/// history partition.
pub struct RelayEngine {
    config: EngineConfig,
    registry: ClientRegistry,
    history: HistoryStore,
    audio: AudioAssembler,
    dispatcher: BroadcastDispatcher,
}

impl RelayEngine {
    /// Create an engine with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        let audio = AudioAssembler::new(config.chunk_capacity_hint);
        Self {
            config,
            registry: ClientRegistry::new(),
            history: HistoryStore::new(),
            audio,
            dispatcher: BroadcastDispatcher,
        }
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- presence ----

    /// Register a participant's delivery handle
    ///
    /// A later registration for the same id replaces the earlier handle;
    /// there is no multi-device fan-out per participant.
    pub async fn register_client(&self, participant_id: &str, sink: Arc<dyn ClientSink>) -> Result<()> {
        if participant_id.trim().is_empty() {
            return Err(RelayError::EmptyParticipantId);
        }
        self.registry.register(participant_id, sink).await;
        Ok(())
    }

    /// Register a participant behind a channel-backed handle
    ///
    /// Convenience for bindings that drain events off a receiver: creates
    /// a [`ChannelSink`] with the configured buffer capacity, registers
    /// it, and returns the paired receiver.
    pub async fn subscribe(&self, participant_id: &str) -> Result<mpsc::Receiver<ClientEvent>> {
        let (sink, rx) = ChannelSink::bounded(self.config.event_capacity);
        self.register_client(participant_id, Arc::new(sink)).await?;
        Ok(rx)
    }

    /// Remove a participant's registration; absent ids are a no-op
    pub async fn unregister_client(&self, participant_id: &str) -> bool {
        self.registry.unregister(participant_id).await
    }

    /// Sorted ids of currently registered participants
    pub async fn participants(&self) -> Vec<String> {
        self.registry.participants().await
    }

    // ---- groups & history ----

    /// Ensure a group history log exists; idempotent
    ///
    /// Returns true if the group was newly created.
    pub async fn create_group(&self, group_id: &str) -> Result<bool> {
        if group_id.trim().is_empty() {
            return Err(RelayError::EmptyField("group_id"));
        }
        Ok(self.history.create_group(group_id).await)
    }

    /// Full ordered history for (scope, scope_id)
    ///
    /// An untouched key yields an empty Vec, never an error.
    pub async fn get_history(&self, scope: Scope, scope_id: &str) -> Vec<Message> {
        self.history.fetch(scope, scope_id).await
    }

    // ---- text ----

    /// Store a text message, then broadcast it to every registered
    /// participant
    pub async fn send_text(&self, scope: Scope, to: &str, from: &str, text: &str) -> Result<Message> {
        if to.trim().is_empty() {
            return Err(RelayError::EmptyField("to"));
        }
        if from.trim().is_empty() {
            return Err(RelayError::EmptyField("from"));
        }

        let message = Message::text(scope, to, from, text);

        // Append must precede broadcast; no recipient may observe a
        // message history does not yet contain.
        self.history.append(scope, to, message.clone()).await;

        let recipients = self.registry.snapshot().await;
        self.dispatcher
            .dispatch(&recipients, "on_message", |sink| sink.on_message(&message));

        Ok(message)
    }

    // ---- audio ----

    /// Open a chunked audio transfer; returns the fresh stream id
    pub async fn begin_audio(&self, scope: Scope, to: &str, from: &str, mime_type: &str) -> Result<String> {
        if to.trim().is_empty() {
            return Err(RelayError::EmptyField("to"));
        }
        if from.trim().is_empty() {
            return Err(RelayError::EmptyField("from"));
        }
        Ok(self.audio.begin(scope, to, from, mime_type).await)
    }

    /// Record one chunk and relay it live to every registered participant
    ///
    /// Fire-as-you-go: the chunk is broadcast as it arrives, not after
    /// reassembly. An unknown or already-ended stream id is a silent
    /// no-op (logged); returns whether the chunk was accepted.
    pub async fn send_audio_chunk(
        &self,
        stream_id: &str,
        index: u32,
        declared_total: u32,
        data: Bytes,
    ) -> bool {
        let frame = match self.audio.put_chunk(stream_id, index, declared_total, data).await {
            Some(frame) => frame,
            None => return false,
        };

        let recipients = self.registry.snapshot().await;
        self.dispatcher
            .dispatch(&recipients, "on_audio_chunk", |sink| sink.on_audio_chunk(&frame));

        true
    }

    /// Finalize an audio transfer
    ///
    /// Appends the finalized message to history, then notifies every
    /// registered participant: end-of-audio first, then the message
    /// itself. An unknown stream id is a silent no-op (logged) and
    /// produces no message.
    pub async fn end_audio(&self, stream_id: &str, duration_seconds: f64) -> Option<Message> {
        let info = self.audio.end(stream_id).await?;

        let message = Message::audio(
            info.scope,
            info.to.clone(),
            info.from.clone(),
            "",
            info.mime_type.clone(),
            duration_seconds,
        );

        self.history.append(info.scope, &info.to, message.clone()).await;

        let end = AudioEnd {
            stream_id: stream_id.to_string(),
            to: info.to,
            from: info.from,
            mime_type: info.mime_type,
            duration_seconds,
        };

        let recipients = self.registry.snapshot().await;
        self.dispatcher
            .dispatch(&recipients, "on_audio_end", |sink| sink.on_audio_end(&end));
        self.dispatcher
            .dispatch(&recipients, "on_message", |sink| sink.on_message(&message));

        Some(message)
    }

    /// Number of audio transfers currently open
    pub async fn open_audio_streams(&self) -> usize {
        self.audio.open_streams().await
    }
}

impl Default for RelayEngine {
    fn default() -> Self {
        Self::new()
    }
}
