use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::constants::{
    CLIENT_TIMEOUT_DEFAULT, DEFAULT_BATCH_DURATION_SECS, DEFAULT_DEVICE_PERIOD_MS,
    DEFAULT_ENDPOINT, DEFAULT_SAMPLING_PERIOD_MS, DEFAULT_SESSION_DURATION_SECS,
    MAX_BATCH_CAPACITY,
};
use crate::models::errors::UplinkError;
use common::constants::DEFAULT_USER_ID;

/// Configuration of a measurement session. Every field has a default, so a
/// JSON document only needs the fields it overrides.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// URL every serialized batch is posted to.
    pub endpoint: String,
    pub user_id: u32,
    /// Period at which the sensors deliver raw events.
    pub device_period_ms: u64,
    /// Period of the samples kept in a batch. Must be a multiple of `device_period_ms`.
    pub sampling_period_ms: u64,
    pub batch_duration_secs: u64,
    /// The session stops by itself once every sensor completed
    /// `session_duration_secs / batch_duration_secs` batches.
    pub session_duration_secs: u64,
    /// Ship the partially filled batches still open when the session stops.
    pub flush_partial_on_stop: bool,
    pub request_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_id: DEFAULT_USER_ID,
            device_period_ms: DEFAULT_DEVICE_PERIOD_MS,
            sampling_period_ms: DEFAULT_SAMPLING_PERIOD_MS,
            batch_duration_secs: DEFAULT_BATCH_DURATION_SECS,
            session_duration_secs: DEFAULT_SESSION_DURATION_SECS,
            flush_partial_on_stop: true,
            request_timeout_secs: CLIENT_TIMEOUT_DEFAULT,
        }
    }
}

/// Quantities derived from a validated `SessionConfig`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingPlan {
    /// Raw events per stored sample.
    pub decimation_ratio: u64,
    /// Samples per channel in one batch.
    pub batch_capacity: usize,
    /// Batches per sensor in one session.
    pub max_batches: u32,
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, UplinkError> {
        serde_json::from_str(json).map_err(|e| UplinkError::InvalidConfig(e.to_string()))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, UplinkError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            UplinkError::InvalidConfig(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validates the configuration and derives the sampling plan.
    pub fn plan(&self) -> Result<SamplingPlan, UplinkError> {
        if self.device_period_ms == 0 || self.sampling_period_ms == 0 {
            return Err(UplinkError::InvalidConfig(
                "Sampling periods must be greater than zero".to_string(),
            ));
        }
        if self.sampling_period_ms % self.device_period_ms != 0 {
            return Err(UplinkError::InvalidConfig(format!(
                "Sampling period {}ms is not a multiple of device period {}ms",
                self.sampling_period_ms, self.device_period_ms
            )));
        }

        let batch_capacity = self
            .batch_duration_secs
            .checked_mul(1000)
            .map(|ms| ms / self.sampling_period_ms)
            .ok_or_else(|| {
                UplinkError::InvalidConfig(format!(
                    "Batch duration {}s is out of range",
                    self.batch_duration_secs
                ))
            })?;
        if batch_capacity > MAX_BATCH_CAPACITY {
            return Err(UplinkError::InvalidConfig(format!(
                "Batch of {} samples exceeds the limit of {}",
                batch_capacity, MAX_BATCH_CAPACITY
            )));
        }
        if batch_capacity == 0 {
            return Err(UplinkError::InvalidConfig(format!(
                "Batch of {}s holds no sample at {}ms",
                self.batch_duration_secs, self.sampling_period_ms
            )));
        }

        let max_batches = self
            .session_duration_secs
            .checked_div(self.batch_duration_secs)
            .unwrap_or(0);
        if max_batches == 0 {
            return Err(UplinkError::InvalidConfig(format!(
                "Session of {}s is shorter than one batch of {}s",
                self.session_duration_secs, self.batch_duration_secs
            )));
        }

        Ok(SamplingPlan {
            decimation_ratio: self.sampling_period_ms / self.device_period_ms,
            batch_capacity: usize::try_from(batch_capacity)
                .map_err(|e| UplinkError::InvalidConfig(e.to_string()))?,
            max_batches: u32::try_from(max_batches)
                .map_err(|e| UplinkError::InvalidConfig(e.to_string()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan() {
        let plan = SessionConfig::default().plan().unwrap();
        assert_eq!(plan.decimation_ratio, 4);
        assert_eq!(plan.batch_capacity, 300);
        assert_eq!(plan.max_batches, 7200);
    }

    #[test]
    fn test_from_json_overrides_defaults() {
        let config = SessionConfig::from_json_str(
            r#"{"endpoint": "http://example.com/data/", "user_id": 3, "sampling_period_ms": 20}"#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://example.com/data/");
        assert_eq!(config.user_id, 3);
        assert_eq!(config.device_period_ms, DEFAULT_DEVICE_PERIOD_MS);
        assert_eq!(config.plan().unwrap().decimation_ratio, 2);
        assert_eq!(config.plan().unwrap().batch_capacity, 600);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            SessionConfig::from_json_str("{not json"),
            Err(UplinkError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SessionConfig::from_json_file("./does/not/exist.json"),
            Err(UplinkError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_period_not_multiple() {
        let config = SessionConfig {
            sampling_period_ms: 45,
            ..Default::default()
        };
        assert!(matches!(config.plan(), Err(UplinkError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_period() {
        let config = SessionConfig {
            device_period_ms: 0,
            ..Default::default()
        };
        assert!(config.plan().is_err());
    }

    #[test]
    fn test_empty_batch() {
        let config = SessionConfig {
            batch_duration_secs: 0,
            ..Default::default()
        };
        assert!(config.plan().is_err());
    }

    #[test]
    fn test_batch_duration_overflow() {
        let config =
            SessionConfig::from_json_str(r#"{"batch_duration_secs": 18446744073709551615}"#)
                .unwrap();
        assert!(matches!(config.plan(), Err(UplinkError::InvalidConfig(_))));
    }

    #[test]
    fn test_batch_too_large() {
        let config = SessionConfig {
            batch_duration_secs: 10_000_000_000_000,
            session_duration_secs: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(config.plan(), Err(UplinkError::InvalidConfig(_))));

        let config = SessionConfig {
            device_period_ms: 1,
            sampling_period_ms: 1,
            batch_duration_secs: MAX_BATCH_CAPACITY / 1000 + 1,
            ..Default::default()
        };
        assert!(config.plan().is_err());
    }

    #[test]
    fn test_session_shorter_than_batch() {
        let config = SessionConfig {
            session_duration_secs: 5,
            ..Default::default()
        };
        assert!(config.plan().is_err());
    }
}
