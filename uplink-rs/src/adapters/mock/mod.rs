// Test doubles for both ports.

mod gaussian;
mod manual;
mod sensors;
mod transport;

pub use manual::ManualSensors;
pub use sensors::MockSensors;
pub use transport::MockTransport;
