//! Relay engine core
//!
//! The transport-agnostic heart of the relay: presence tracking, scoped
//! history, chunked audio assembly and fan-out broadcast, composed
//! behind the [`RelayEngine`] façade.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<RelayEngine>
//!                ┌───────────────────────────────┐
//!                │ ClientRegistry   (who's here) │
//!                │ HistoryStore     (what's said)│
//!                │ AudioAssembler   (in-flight)  │
//!                │ BroadcastDispatcher (fan-out) │
//!                └──────────────┬────────────────┘
//!                               │
//!            ┌──────────────────┼──────────────────┐
//!            │                  │                  │
//!            ▼                  ▼                  ▼
//!       [RPC binding]    [WS/STOMP binding]  [TCP binding]
//!       decode → call    decode → call       decode → call
//!            │                  │                  │
//!            └── ClientSink ◄── fan-out ──► ClientSink ──► wire
//! ```
//!
//! Every binding decodes its own wire format, calls one engine
//! operation, and relays engine events pushed through the delivery
//! handles it registered. The engine never touches a socket.

pub mod audio;
pub mod dispatch;
pub mod history;
pub mod registry;
pub mod relay;

pub use audio::{AudioAssembler, StreamInfo};
pub use dispatch::{BroadcastDispatcher, DispatchOutcome};
pub use history::HistoryStore;
pub use registry::ClientRegistry;
pub use relay::RelayEngine;
