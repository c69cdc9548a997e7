// src/bus/inbound.rs

//! Typed dispatch for inbound control messages.
//!
//! Handlers are registered by message type; an unrecognized type or a
//! malformed payload is logged and dropped without disturbing the engine.

use std::collections::HashMap;

use tracing::warn;

use crate::bus::protocol::{
    CloseBufferPayload, InboundMessage, RequestRunPayload, UpdateBufferPayload,
};
use crate::engine::EngineEvent;

type Handler =
    Box<dyn Fn(serde_json::Value) -> Result<EngineEvent, serde_json::Error> + Send + Sync>;

pub struct InboundRegistry {
    handlers: HashMap<&'static str, Handler>,
}

impl std::fmt::Debug for InboundRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundRegistry")
            .field("types", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl InboundRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: &'static str, handler: Handler) {
        self.handlers.insert(kind, handler);
    }

    /// The standard control surface.
    pub fn engine_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(
            "update-buffer",
            Box::new(|payload| {
                let p: UpdateBufferPayload = serde_json::from_value(payload)?;
                Ok(EngineEvent::BufferUpdated {
                    path: p.path,
                    content: p.content,
                })
            }),
        );
        registry.register(
            "close-buffer",
            Box::new(|payload| {
                let p: CloseBufferPayload = serde_json::from_value(payload)?;
                Ok(EngineEvent::BufferClosed { path: p.path })
            }),
        );
        registry.register(
            "request-run",
            Box::new(|payload| {
                // An omitted payload means "sweep every project".
                let p: RequestRunPayload = if payload.is_null() {
                    RequestRunPayload::default()
                } else {
                    serde_json::from_value(payload)?
                };
                Ok(EngineEvent::RunRequested {
                    projects: p.projects,
                })
            }),
        );
        registry.register(
            "cancel-runs",
            Box::new(|_payload| Ok(EngineEvent::CancelRequested)),
        );
        registry.register(
            "shutdown",
            Box::new(|_payload| Ok(EngineEvent::ShutdownRequested)),
        );

        registry
    }

    /// Resolve a message to an engine event, or swallow it with a log line.
    pub fn dispatch(&self, message: InboundMessage) -> Option<EngineEvent> {
        match self.handlers.get(message.kind.as_str()) {
            None => {
                warn!(kind = %message.kind, "unrecognized control message; dropping");
                None
            }
            Some(handler) => match handler(message.payload) {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!(
                        kind = %message.kind,
                        error = %err,
                        "malformed control payload; dropping"
                    );
                    None
                }
            },
        }
    }
}

impl Default for InboundRegistry {
    fn default() -> Self {
        Self::engine_defaults()
    }
}
