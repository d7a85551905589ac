//! Fan-out broadcast with per-recipient fault isolation
//!
//! Delivers one payload to every registered delivery handle. Each
//! delivery is an isolation boundary: a failing handle is logged and
//! skipped, never aborting the remaining deliveries and never evicting
//! the failing registration. Dead handles persist until an explicit
//! unregister.

use std::sync::Arc;

use crate::sink::{ClientSink, SinkError};

/// Result of one fan-out pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Recipients that accepted the payload
    pub delivered: usize,
    /// Recipients whose delivery failed and was skipped
    pub failed: usize,
}

/// Broadcast helper shared by all engine operations
///
/// Stateless; it operates on registry snapshots, so iteration never
/// observes concurrent registry mutation. No recipient ordering is
/// guaranteed.
pub struct BroadcastDispatcher;

impl BroadcastDispatcher {
    /// Invoke `deliver` once per recipient, isolating failures
    ///
    /// `event` names the capability being exercised, for the log line
    /// only.
    pub fn dispatch<F>(
        &self,
        recipients: &[(String, Arc<dyn ClientSink>)],
        event: &'static str,
        deliver: F,
    ) -> DispatchOutcome
    where
        F: Fn(&dyn ClientSink) -> Result<(), SinkError>,
    {
        let mut outcome = DispatchOutcome::default();

        for (participant_id, sink) in recipients {
            match deliver(sink.as_ref()) {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        participant = %participant_id,
                        event = event,
                        error = %e,
                        "Delivery failed, recipient skipped"
                    );
                }
            }
        }

        tracing::debug!(
            event = event,
            delivered = outcome.delivered,
            failed = outcome.failed,
            "Broadcast complete"
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AudioEnd, ChunkFrame};
    use crate::message::{Message, Scope};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink {
        messages: AtomicUsize,
    }

    impl CountingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                messages: AtomicUsize::new(0),
            })
        }
    }

    impl ClientSink for CountingSink {
        fn on_message(&self, _: &Message) -> Result<(), SinkError> {
            self.messages.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn on_audio_chunk(&self, _: &ChunkFrame) -> Result<(), SinkError> {
            Ok(())
        }
        fn on_audio_end(&self, _: &AudioEnd) -> Result<(), SinkError> {
            Ok(())
        }
    }

    struct FailingSink;

    impl ClientSink for FailingSink {
        fn on_message(&self, _: &Message) -> Result<(), SinkError> {
            Err(SinkError::Transport("session torn down".to_string()))
        }
        fn on_audio_chunk(&self, _: &ChunkFrame) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
        fn on_audio_end(&self, _: &AudioEnd) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    #[test]
    fn test_dispatch_reaches_every_recipient() {
        let a = CountingSink::new();
        let b = CountingSink::new();
        let recipients: Vec<(String, Arc<dyn ClientSink>)> = vec![
            ("alice".to_string(), a.clone()),
            ("bob".to_string(), b.clone()),
        ];
        let msg = Message::text(Scope::User, "bob", "alice", "hi");

        let outcome =
            BroadcastDispatcher.dispatch(&recipients, "on_message", |sink| sink.on_message(&msg));

        assert_eq!(outcome, DispatchOutcome { delivered: 2, failed: 0 });
        assert_eq!(a.messages.load(Ordering::SeqCst), 1);
        assert_eq!(b.messages.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_one_failure_does_not_abort_the_rest() {
        let ok_before = CountingSink::new();
        let ok_after = CountingSink::new();
        let recipients: Vec<(String, Arc<dyn ClientSink>)> = vec![
            ("first".to_string(), ok_before.clone()),
            ("broken".to_string(), Arc::new(FailingSink)),
            ("last".to_string(), ok_after.clone()),
        ];
        let msg = Message::text(Scope::User, "bob", "alice", "hi");

        let outcome =
            BroadcastDispatcher.dispatch(&recipients, "on_message", |sink| sink.on_message(&msg));

        assert_eq!(outcome, DispatchOutcome { delivered: 2, failed: 1 });
        assert_eq!(ok_before.messages.load(Ordering::SeqCst), 1);
        assert_eq!(ok_after.messages.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_to_nobody() {
        let recipients: Vec<(String, Arc<dyn ClientSink>)> = Vec::new();
        let msg = Message::text(Scope::User, "bob", "alice", "hi");

        let outcome =
            BroadcastDispatcher.dispatch(&recipients, "on_message", |sink| sink.on_message(&msg));

        assert_eq!(outcome, DispatchOutcome::default());
    }
}
