use async_trait::async_trait;

use crate::models::errors::UplinkError;
use common::{SampleCallback, SensorKind};

/// Network side of the pipeline. Implementations submit one serialized batch
/// per call; a failure is reported but never retried by the caller.
#[async_trait]
pub trait TransportPort: Send + Sync {
    async fn submit(&self, endpoint: &str, payload: String) -> Result<(), UplinkError>;
}

/// Sensor side of the pipeline.
pub trait SensorPort: Send + Sync {
    /// Sensors whose events will be delivered once armed.
    fn sensor_kinds(&self) -> Vec<SensorKind>;

    /// Starts invoking `delivery` for every raw sensor event, from any thread.
    fn arm(&self, delivery: SampleCallback) -> Result<(), UplinkError>;

    /// Stops delivery. Must not wait for in-flight deliveries to return:
    /// a delivery callback may itself end up calling `disarm`.
    fn disarm(&self);
}
