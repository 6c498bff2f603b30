mod payload;
mod sample_batch;

pub use payload::{AxisReadings, BatchPayload};
pub use sample_batch::SampleBatch;
