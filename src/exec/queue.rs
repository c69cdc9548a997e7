use tracing::{debug, info};

use crate::exec::cancel::CancelFlag;
use crate::types::{RunId, RunResolution, TestRunRequest};

/// A queued request together with its enqueue order, used to break priority
/// ties toward the most recently enqueued request.
#[derive(Debug, Clone)]
struct QueuedRequest {
    request: TestRunRequest,
    resolution: RunResolution,
    seq: u64,
}

/// Bookkeeping for the single run currently in flight.
#[derive(Debug, Clone)]
pub struct ActiveRun {
    pub run_id: RunId,
    pub resolution: RunResolution,
    pub cancel: CancelFlag,
}

/// Single-flight, priority-sorted run queue.
///
/// At most one request executes at any instant; the rest accumulate here,
/// resorted on every enqueue, until the active run completes and the drain
/// loop dispatches the next head.
#[derive(Debug, Default)]
pub struct ExecutionQueue {
    pending: Vec<QueuedRequest>,
    active: Option<ActiveRun>,
    enqueue_seq: u64,
    run_counter: RunId,
}

impl ExecutionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request and resort the whole queue descending by
    /// `(priority, enqueue order)`.
    pub fn enqueue(&mut self, request: TestRunRequest, resolution: RunResolution) {
        self.enqueue_seq += 1;
        debug!(
            priority = request.priority,
            test_files = request.test_files.len(),
            pending = self.pending.len() + 1,
            "enqueueing run request"
        );
        self.pending.push(QueuedRequest {
            request,
            resolution,
            seq: self.enqueue_seq,
        });
        self.pending
            .sort_by(|a, b| (b.request.priority, b.seq).cmp(&(a.request.priority, a.seq)));
    }

    /// Take the head of the queue and mark it active, unless a run is already
    /// in flight or nothing is pending. Returns what the executor needs.
    pub fn try_dispatch(&mut self) -> Option<(RunId, TestRunRequest, RunResolution, CancelFlag)> {
        if self.active.is_some() || self.pending.is_empty() {
            return None;
        }

        let head = self.pending.remove(0);
        self.run_counter += 1;
        let run_id = self.run_counter;
        let cancel = CancelFlag::new();
        self.active = Some(ActiveRun {
            run_id,
            resolution: head.resolution.clone(),
            cancel: cancel.clone(),
        });
        debug!(run_id, priority = head.request.priority, "dispatching run");
        Some((run_id, head.request, head.resolution, cancel))
    }

    /// Clear the busy slot for a finished run.
    ///
    /// A completion whose run id does not match the active run (a cancelled
    /// run racing its own cancellation) is ignored so it cannot clear the
    /// slot out from under a newer run.
    pub fn finish(&mut self, run_id: RunId) -> Option<ActiveRun> {
        match &self.active {
            Some(active) if active.run_id == run_id => self.active.take(),
            _ => {
                debug!(run_id, "completion for non-active run; ignoring");
                None
            }
        }
    }

    /// Signal cancellation on the active run (if any) and discard all pending
    /// requests. Cancellation is cooperative: the active run keeps going
    /// until its next flag check, but its results will not be considered.
    pub fn cancel_all(&mut self) -> usize {
        if let Some(active) = &self.active {
            info!(run_id = active.run_id, "cancelling active run");
            active.cancel.cancel();
        }
        let discarded = self.pending.len();
        if discarded > 0 {
            info!(discarded, "discarding pending run requests");
        }
        self.pending.clear();
        discarded
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_run_id(&self) -> Option<RunId> {
        self.active.as_ref().map(|a| a.run_id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Priorities of pending requests in queue order (head first).
    pub fn pending_priorities(&self) -> Vec<i64> {
        self.pending.iter().map(|q| q.request.priority).collect()
    }
}
