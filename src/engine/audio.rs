//! Chunked audio-stream assembly
//!
//! Holds in-flight chunked audio transfers keyed by stream id. The
//! assembler is a pass-through relay for real-time playback, not a
//! store-and-forward buffer: each chunk is handed back for immediate
//! re-broadcast as it arrives, and finalization never checks whether all
//! declared chunks were actually received. A dropped chunk degrades the
//! stream rather than blocking it.
//!
//! Lifecycle per stream: `begin` opens it, `put_chunk` self-loops on the
//! open state, `end` consumes it. There is no transition back to open
//! and no timeout-driven close; an abandoned stream occupies memory until
//! the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::event::ChunkFrame;
use crate::message::Scope;

/// Identifying fields of a transfer, fixed at `begin` and copied verbatim
/// onto the finalized message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// History partition the finalized message belongs to
    pub scope: Scope,
    /// Destination participant or group id
    pub to: String,
    /// Sender participant id
    pub from: String,
    /// MIME type of the audio body
    pub mime_type: String,
}

/// In-flight state for one chunked transfer
struct AudioAssembly {
    info: StreamInfo,
    /// Total chunk count as last declared by the sender; None until the
    /// first chunk arrives. Senders may declare inconsistent totals
    /// across chunks; last writer wins, unreconciled.
    declared_total: Option<u32>,
    /// Sparse chunk table indexed by chunk index; gaps are None
    chunks: Vec<Option<Bytes>>,
}

/// Table of in-flight chunked audio transfers
pub struct AudioAssembler {
    streams: RwLock<HashMap<String, Arc<RwLock<AudioAssembly>>>>,
    chunk_capacity_hint: usize,
}

impl AudioAssembler {
    /// Create an empty assembler
    pub fn new(chunk_capacity_hint: usize) -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
            chunk_capacity_hint,
        }
    }

    /// Open a new transfer and return its freshly allocated stream id
    pub async fn begin(
        &self,
        scope: Scope,
        to: impl Into<String>,
        from: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> String {
        let stream_id = Uuid::new_v4().to_string();
        let assembly = AudioAssembly {
            info: StreamInfo {
                scope,
                to: to.into(),
                from: from.into(),
                mime_type: mime_type.into(),
            },
            declared_total: None,
            chunks: Vec::with_capacity(self.chunk_capacity_hint),
        };

        let mut streams = self.streams.write().await;
        tracing::info!(
            stream = %stream_id,
            scope = %scope,
            from = %assembly.info.from,
            to = %assembly.info.to,
            open = streams.len() + 1,
            "Audio stream opened"
        );
        streams.insert(stream_id.clone(), Arc::new(RwLock::new(assembly)));

        stream_id
    }

    /// Record one chunk and return it for immediate re-broadcast
    ///
    /// A duplicate index replaces the earlier payload (idempotent by
    /// replacement). An unknown stream id (a late chunk after `end`, or
    /// a forged id) is a soft failure: logged, `None` returned, nothing
    /// mutated.
    pub async fn put_chunk(
        &self,
        stream_id: &str,
        index: u32,
        declared_total: u32,
        data: Bytes,
    ) -> Option<ChunkFrame> {
        let entry = {
            let streams = self.streams.read().await;
            match streams.get(stream_id) {
                Some(entry) => Arc::clone(entry),
                None => {
                    tracing::warn!(stream = %stream_id, index = index, "Chunk for unknown stream, dropped");
                    return None;
                }
            }
        };

        let mut assembly = entry.write().await;
        assembly.declared_total = Some(declared_total);

        let slot = index as usize;
        if assembly.chunks.len() <= slot {
            assembly.chunks.resize(slot + 1, None);
        }
        assembly.chunks[slot] = Some(data.clone());

        tracing::trace!(
            stream = %stream_id,
            index = index,
            declared_total = declared_total,
            bytes = data.len(),
            "Chunk recorded"
        );

        Some(ChunkFrame {
            stream_id: stream_id.to_string(),
            index,
            declared_total,
            data,
            mime_type: assembly.info.mime_type.clone(),
        })
    }

    /// Close a transfer, returning its identifying fields
    ///
    /// Completion is purely caller-asserted: no chunk-count bookkeeping
    /// is consulted. The accumulated chunk bytes are discarded here; only
    /// the identifying fields survive, for the history record. An unknown
    /// id is a soft failure: logged, `None` returned.
    pub async fn end(&self, stream_id: &str) -> Option<StreamInfo> {
        let entry = self.streams.write().await.remove(stream_id);

        match entry {
            Some(entry) => {
                let assembly = entry.read().await;
                let received = assembly.chunks.iter().filter(|c| c.is_some()).count();

                tracing::info!(
                    stream = %stream_id,
                    received = received,
                    declared_total = ?assembly.declared_total,
                    "Audio stream closed"
                );

                Some(assembly.info.clone())
            }
            None => {
                tracing::warn!(stream = %stream_id, "End for unknown stream, ignored");
                None
            }
        }
    }

    /// Number of transfers currently open
    pub async fn open_streams(&self) -> usize {
        self.streams.read().await.len()
    }

    /// Whether a transfer is currently open
    pub async fn is_open(&self, stream_id: &str) -> bool {
        self.streams.read().await.contains_key(stream_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> AudioAssembler {
        AudioAssembler::new(16)
    }

    #[tokio::test]
    async fn test_begin_allocates_unique_ids() {
        let audio = assembler();
        let a = audio.begin(Scope::User, "bob", "alice", "audio/webm").await;
        let b = audio.begin(Scope::User, "bob", "alice", "audio/webm").await;
        assert_ne!(a, b);
        assert_eq!(audio.open_streams().await, 2);
    }

    #[tokio::test]
    async fn test_put_chunk_returns_frame_for_rebroadcast() {
        let audio = assembler();
        let sid = audio.begin(Scope::Group, "g1", "karen", "audio/webm").await;

        let frame = audio
            .put_chunk(&sid, 0, 3, Bytes::from_static(b"x"))
            .await
            .unwrap();

        assert_eq!(frame.stream_id, sid);
        assert_eq!(frame.index, 0);
        assert_eq!(frame.declared_total, 3);
        assert_eq!(frame.mime_type, "audio/webm");
        assert_eq!(&frame.data[..], b"x");
    }

    #[tokio::test]
    async fn test_put_chunk_unknown_stream_is_soft_noop() {
        let audio = assembler();
        let frame = audio
            .put_chunk("no-such-stream", 0, 1, Bytes::from_static(b"x"))
            .await;
        assert!(frame.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_index_replaces() {
        let audio = assembler();
        let sid = audio.begin(Scope::User, "bob", "alice", "audio/mp4").await;

        audio.put_chunk(&sid, 0, 2, Bytes::from_static(b"old")).await;
        audio.put_chunk(&sid, 1, 2, Bytes::from_static(b"b")).await;
        let frame = audio
            .put_chunk(&sid, 0, 2, Bytes::from_static(b"new"))
            .await
            .unwrap();

        assert_eq!(&frame.data[..], b"new");
    }

    #[tokio::test]
    async fn test_declared_total_last_writer_wins() {
        let audio = assembler();
        let sid = audio.begin(Scope::User, "bob", "alice", "audio/webm").await;

        audio.put_chunk(&sid, 0, 5, Bytes::from_static(b"a")).await;
        let frame = audio
            .put_chunk(&sid, 1, 9, Bytes::from_static(b"b"))
            .await
            .unwrap();

        // The assembler does not reconcile inconsistent totals
        assert_eq!(frame.declared_total, 9);
    }

    #[tokio::test]
    async fn test_gaps_are_tolerated() {
        let audio = assembler();
        let sid = audio.begin(Scope::User, "bob", "alice", "audio/webm").await;

        // Index 5 without 0..4: sparse table, never an error
        let frame = audio.put_chunk(&sid, 5, 6, Bytes::from_static(b"z")).await;
        assert!(frame.is_some());
    }

    #[tokio::test]
    async fn test_end_consumes_stream() {
        let audio = assembler();
        let sid = audio.begin(Scope::Group, "g1", "karen", "audio/webm").await;
        audio.put_chunk(&sid, 0, 1, Bytes::from_static(b"x")).await;

        let info = audio.end(&sid).await.unwrap();
        assert_eq!(info.scope, Scope::Group);
        assert_eq!(info.to, "g1");
        assert_eq!(info.from, "karen");
        assert_eq!(info.mime_type, "audio/webm");

        // Terminal state: id invalid for further chunks, no residual state
        assert!(!audio.is_open(&sid).await);
        assert!(audio.put_chunk(&sid, 1, 1, Bytes::from_static(b"y")).await.is_none());
        assert!(audio.end(&sid).await.is_none());
    }

    #[tokio::test]
    async fn test_end_does_not_require_all_chunks() {
        let audio = assembler();
        let sid = audio.begin(Scope::User, "bob", "alice", "audio/webm").await;

        // Declared 10, delivered 1: finalization is caller-asserted
        audio.put_chunk(&sid, 0, 10, Bytes::from_static(b"x")).await;
        assert!(audio.end(&sid).await.is_some());
    }
}
