//! Transport-agnostic chat and audio relay engine
//!
//! One chat system, several front doors: an RPC service, a
//! WebSocket/STOMP broker and a raw line-based TCP service can all relay
//! the same conversations by sharing a single [`RelayEngine`] instance.
//! This crate is that shared engine; the transport bindings themselves
//! live outside it and only translate wire messages into engine calls.
//!
//! What the engine does:
//!
//! - **Presence**: tracks which participants are reachable and the
//!   delivery handle for each ([`engine::ClientRegistry`]).
//! - **History**: append-only, per-scope message logs, user and group
//!   partitions kept strictly apart ([`engine::HistoryStore`]).
//! - **Live audio**: reassembles chunked audio transfers while relaying
//!   every chunk to all participants as it arrives
//!   ([`engine::AudioAssembler`]).
//! - **Fan-out**: best-effort broadcast to every registered participant
//!   with per-recipient fault isolation
//!   ([`engine::BroadcastDispatcher`]).
//!
//! Everything is in-memory and process-scoped; there is no persistence,
//! no authentication and no delivery guarantee beyond best effort to the
//! currently registered handles.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use relay_engine::{RelayEngine, Scope};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Arc::new(RelayEngine::new());
//!
//!     // A transport binding registers a participant and drains events
//!     let mut events = engine.subscribe("alice").await?;
//!     tokio::spawn(async move {
//!         while let Some(event) = events.recv().await {
//!             // encode onto the wire
//!             let _ = event;
//!         }
//!     });
//!
//!     engine.send_text(Scope::Group, "amigos", "alice", "hola").await?;
//!     let history = engine.get_history(Scope::Group, "amigos").await;
//!     assert_eq!(history.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod message;
pub mod sink;

pub use config::EngineConfig;
pub use engine::{BroadcastDispatcher, DispatchOutcome, RelayEngine};
pub use error::{RelayError, Result};
pub use event::{AudioEnd, ChunkFrame, ClientEvent};
pub use message::{Message, MessageKind, Scope};
pub use sink::{ChannelSink, ClientSink, SinkError};
