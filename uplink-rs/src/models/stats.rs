use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the session and its worker.
#[derive(Debug, Default)]
pub(crate) struct SessionCounters {
    pub(crate) enqueued: AtomicU64,
    pub(crate) sent: AtomicU64,
    pub(crate) failed: AtomicU64,
    pub(crate) flushed: AtomicU64,
    pub(crate) auto_stops: AtomicU64,
}

impl SessionCounters {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, queue_depth: usize) -> SessionStats {
        SessionStats {
            batches_enqueued: self.enqueued.load(Ordering::Relaxed),
            batches_sent: self.sent.load(Ordering::Relaxed),
            submit_failures: self.failed.load(Ordering::Relaxed),
            partial_flushed: self.flushed.load(Ordering::Relaxed),
            auto_stops: self.auto_stops.load(Ordering::Relaxed),
            queue_depth,
        }
    }
}

/// Snapshot of a session's counters, accumulated over every run of the session.
///
/// `queue_depth` is the number of batches waiting for the worker. It grows
/// without bound while submissions are slower than sampling, so it is the
/// value to watch when the endpoint is unreachable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Completed batches handed to the worker.
    pub batches_enqueued: u64,
    /// Batches the transport accepted.
    pub batches_sent: u64,
    /// Batches discarded after a serialization or submission failure.
    pub submit_failures: u64,
    /// Partial batches flushed on stop.
    pub partial_flushed: u64,
    pub auto_stops: u64,
    pub queue_depth: usize,
}
