//! Fixtures and sample generators shared by the workspace tests.

pub mod csv_loader;
pub mod generators;

/// Recorded gyroscope and accelerometer readings sampled every 10 ms.
pub const SENSOR_READINGS_CSV: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/test_data/sensor_readings.csv");
