#![allow(dead_code)]

pub use testsieve_test_utils::builders;
pub use testsieve_test_utils::fake_executor;
pub use testsieve_test_utils::fakes;
pub use testsieve_test_utils::{init_tracing, with_timeout};

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use testsieve::bus::protocol::{Envelope, OutboundEvent};

/// Drain envelopes until one matches `pred`, with a 5-second cap.
pub async fn wait_for_event(
    rx: &mut UnboundedReceiver<Envelope>,
    pred: impl Fn(&OutboundEvent) -> bool,
) -> Envelope {
    timeout(Duration::from_secs(5), async {
        loop {
            let envelope = rx.recv().await.expect("bus closed while waiting");
            if pred(&envelope.event) {
                return envelope;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Collect everything currently buffered on a subscription.
pub fn drain_ready(rx: &mut UnboundedReceiver<Envelope>) -> Vec<Envelope> {
    let mut out = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        out.push(envelope);
    }
    out
}
