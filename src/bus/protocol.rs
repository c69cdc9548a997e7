// src/bus/protocol.rs

//! Wire shapes for the observer protocol.
//!
//! Outbound messages are JSON envelopes `{id, seq, type, payload, timestamp}`
//! over a persistent ordered connection; `seq` is per-process monotonic so
//! observers can order and gap-detect. Inbound control messages carry
//! `{type, payload}` and are dispatched by type.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::types::{CollectedSummary, FilePath, RunId, TestInfo, TestResult};

/// Coarse engine lifecycle, published as `engine-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    Idle,
    Scanning,
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResolvedPayload {
    pub run: Vec<FilePath>,
    pub replayed: Vec<FilePath>,
    pub projects: Vec<String>,
    pub full_sweep: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestsDiscoveredPayload {
    pub run_id: RunId,
    pub tests: Vec<TestInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultPayload {
    /// Absent for results replayed from the cache outside any live run.
    pub run_id: Option<RunId>,
    pub replayed: bool,
    pub result: TestResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStartedPayload {
    pub run_id: RunId,
    pub test_files: Vec<FilePath>,
    pub projects: Vec<String>,
    pub priority: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunCompletionStatus {
    Passed,
    Failed,
    Error,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCompletePayload {
    pub run_id: RunId,
    pub status: RunCompletionStatus,
    pub summary: Option<CollectedSummary>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChangedAckPayload {
    pub path: FilePath,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
    pub context: Option<String>,
}

/// Everything the engine can tell an observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum OutboundEvent {
    EngineStatus { status: EngineStatus },
    RunResolved(RunResolvedPayload),
    TestsDiscovered(TestsDiscoveredPayload),
    TestResult(TestResultPayload),
    RunStarted(RunStartedPayload),
    RunComplete(RunCompletePayload),
    FileChangedAck(FileChangedAckPayload),
    Error(ErrorPayload),
}

impl OutboundEvent {
    /// Wire name of this message type.
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundEvent::EngineStatus { .. } => "engine-status",
            OutboundEvent::RunResolved(_) => "run-resolved",
            OutboundEvent::TestsDiscovered(_) => "tests-discovered",
            OutboundEvent::TestResult(_) => "test-result",
            OutboundEvent::RunStarted(_) => "run-started",
            OutboundEvent::RunComplete(_) => "run-complete",
            OutboundEvent::FileChangedAck(_) => "file-changed-ack",
            OutboundEvent::Error(_) => "error",
        }
    }

    /// "State" messages have their latest value cached per type for replay.
    pub fn is_state(&self) -> bool {
        matches!(
            self,
            OutboundEvent::EngineStatus { .. }
                | OutboundEvent::RunResolved(_)
                | OutboundEvent::TestsDiscovered(_)
        )
    }

    /// Cache key for per-test result messages.
    pub fn test_id(&self) -> Option<&str> {
        match self {
            OutboundEvent::TestResult(payload) => Some(&payload.result.test_id),
            _ => None,
        }
    }
}

/// One outbound protocol frame.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub id: String,
    pub seq: u64,
    #[serde(flatten)]
    pub event: OutboundEvent,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// One inbound control frame, prior to typed dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBufferPayload {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseBufferPayload {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestRunPayload {
    #[serde(default)]
    pub projects: Vec<String>,
}

pub fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
