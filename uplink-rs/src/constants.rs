/// Endpoint the worker posts batches to unless configured otherwise.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/data/";

pub const DEFAULT_DEVICE_PERIOD_MS: u64 = 10;
pub const DEFAULT_SAMPLING_PERIOD_MS: u64 = 40;
pub const DEFAULT_BATCH_DURATION_SECS: u64 = 12;
pub const DEFAULT_SESSION_DURATION_SECS: u64 = 60 * 60 * 24;

/// Largest number of samples per channel a batch may preallocate.
pub const MAX_BATCH_CAPACITY: u64 = 1 << 20;

pub const CLIENT_TIMEOUT_DEFAULT: u64 = 5;

pub(crate) const WORKER_THREAD_NAME: &str = "uplink-worker";
