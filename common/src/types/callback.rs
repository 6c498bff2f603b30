use std::sync::Arc;

use crate::types::sensors::SensorKind;

/// Delivery callback handed to a sensor source. Invoked once per raw sensor
/// event with the channel values of that event.
pub type SampleCallback = Arc<dyn Fn(SensorKind, &[f32]) + Send + Sync>;
