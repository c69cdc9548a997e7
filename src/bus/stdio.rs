// src/bus/stdio.rs

//! NDJSON protocol transport over stdin/stdout.
//!
//! One envelope (or control message) per line. Logging goes to stderr, so
//! stdout stays a clean protocol stream.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::bus::inbound::InboundRegistry;
use crate::bus::protocol::{Envelope, InboundMessage};
use crate::engine::EngineEvent;

/// Spawn the writer and reader halves of the stdio protocol connection.
///
/// The writer drains `outbound_rx` (a bus subscription, so the observer gets
/// the full state replay first) to stdout. The reader parses one control
/// message per stdin line and forwards the dispatched engine events; bad
/// lines are logged and skipped.
pub fn spawn_protocol(
    mut outbound_rx: mpsc::UnboundedReceiver<Envelope>,
    registry: InboundRegistry,
    engine_tx: mpsc::Sender<EngineEvent>,
) {
    tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(envelope) = outbound_rx.recv().await {
            let line = match serde_json::to_string(&envelope) {
                Ok(line) => line,
                Err(err) => {
                    warn!(error = %err, "failed to serialize outbound envelope");
                    continue;
                }
            };
            if stdout.write_all(line.as_bytes()).await.is_err()
                || stdout.write_all(b"\n").await.is_err()
                || stdout.flush().await.is_err()
            {
                debug!("stdout closed; stopping protocol writer");
                break;
            }
        }
    });

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let message: InboundMessage = match serde_json::from_str(trimmed) {
                        Ok(message) => message,
                        Err(err) => {
                            warn!(error = %err, "malformed control message; dropping");
                            continue;
                        }
                    };
                    if let Some(event) = registry.dispatch(message) {
                        if engine_tx.send(event).await.is_err() {
                            debug!("engine channel closed; stopping protocol reader");
                            break;
                        }
                    }
                }
                Ok(None) => {
                    debug!("stdin closed; stopping protocol reader");
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "error reading control stream");
                    break;
                }
            }
        }
    });
}
