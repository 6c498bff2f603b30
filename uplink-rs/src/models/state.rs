/// Lifecycle of a measurement session: `Idle -> Running -> Stopping -> Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopping,
}

/// Why the last run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// `stop()` was called.
    Requested,
    /// Every sensor completed its last batch of the session.
    Completed,
}
