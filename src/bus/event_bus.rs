use std::collections::{BTreeMap, HashMap};
use std::time::SystemTime;

use tokio::sync::mpsc;
use tracing::trace;

use crate::bus::protocol::{Envelope, OutboundEvent, epoch_millis};

/// State message types replayed to new subscribers, in replay order.
const STATE_KINDS: [&str; 3] = ["engine-status", "run-resolved", "tests-discovered"];

/// Sequenced broadcast channel with state replay for late joiners.
///
/// Publishing assigns the next sequence number and fans the envelope out to
/// every live subscriber. The latest value of each "state" type is cached
/// per type; individual test results are cached per test id, so repeated
/// results for the same test overwrite rather than accumulate. A new
/// subscriber first receives every cached value, then the live stream, which
/// lets an observer that connects mid-run reconstruct current engine state
/// without a full event history.
#[derive(Debug, Default)]
pub struct EventBus {
    seq: u64,
    state_cache: HashMap<&'static str, Envelope>,
    result_cache: BTreeMap<String, Envelope>,
    subscribers: Vec<mpsc::UnboundedSender<Envelope>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an event in the next-sequenced envelope, cache it if applicable,
    /// and deliver it to all live subscribers. Disconnected subscribers are
    /// pruned on the way.
    pub fn publish(&mut self, event: OutboundEvent) -> Envelope {
        self.seq += 1;
        let envelope = Envelope {
            id: uuid::Uuid::new_v4().to_string(),
            seq: self.seq,
            timestamp: epoch_millis(SystemTime::now()),
            event,
        };

        if envelope.event.is_state() {
            self.state_cache
                .insert(envelope.event.kind(), envelope.clone());
        } else if let Some(test_id) = envelope.event.test_id() {
            self.result_cache
                .insert(test_id.to_string(), envelope.clone());
        }

        trace!(seq = envelope.seq, kind = envelope.event.kind(), "publishing event");
        self.subscribers
            .retain(|tx| tx.send(envelope.clone()).is_ok());
        envelope
    }

    /// Attach an observer: cached state values and cached test results are
    /// delivered first (stable order), then all subsequent live publishes.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Envelope> {
        let (tx, rx) = mpsc::unbounded_channel();

        for kind in STATE_KINDS {
            if let Some(envelope) = self.state_cache.get(kind) {
                let _ = tx.send(envelope.clone());
            }
        }
        for envelope in self.result_cache.values() {
            let _ = tx.send(envelope.clone());
        }

        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Last assigned sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}
