//! General functionality for the `uplink-rs` workspace: sensor kinds, sample
//! batches and their wire payloads.

pub mod constants;

#[doc(hidden)]
pub mod types;

// Re-export types
#[doc(inline)]
pub use types::{
    buffers, AxisReadings, BatchPayload, Clock, SampleBatch, SampleCallback, SensorKind,
};
