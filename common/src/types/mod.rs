pub mod batch;
pub mod buffers;
pub mod callback;
pub mod clock;
pub mod sensors;

pub use batch::{AxisReadings, BatchPayload, SampleBatch};
pub use callback::SampleCallback;
pub use clock::Clock;
pub use sensors::SensorKind;
