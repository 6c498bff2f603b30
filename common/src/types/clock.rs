use std::time::{SystemTime, UNIX_EPOCH};

pub struct Clock(f64);

impl Clock {
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let timestamp = now.as_secs() as f64 + now.subsec_micros() as f64 * 1e-6;
        Self(timestamp)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }

    /// Whole seconds since the unix epoch, as stamped on batches.
    pub fn as_unix_secs(&self) -> u64 {
        self.0 as u64
    }
}
