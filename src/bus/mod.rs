// src/bus/mod.rs

//! Sequenced, replayable event broadcast and the wire protocol around it.
//!
//! - [`protocol`] defines the JSON envelope and the outbound/inbound message
//!   shapes.
//! - [`event_bus`] assigns sequence numbers, caches latest state per message
//!   type, and fans envelopes out to subscribers with replay on attach.
//! - [`inbound`] dispatches typed control messages to registered handlers.
//! - [`stdio`] speaks NDJSON over stdin/stdout for one observer connection.

pub mod event_bus;
pub mod inbound;
pub mod protocol;
pub mod stdio;

pub use event_bus::EventBus;
pub use inbound::InboundRegistry;
pub use protocol::{
    Envelope, EngineStatus, ErrorPayload, FileChangedAckPayload, InboundMessage, OutboundEvent,
    RunCompletePayload, RunCompletionStatus, RunResolvedPayload, RunStartedPayload,
    TestResultPayload, TestsDiscoveredPayload,
};
