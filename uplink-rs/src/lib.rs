//! # Crate uplink-rs
//!
//! ## uplink-rs
//!
//! The `uplink-rs` crate batches raw inertial sensor readings and ships them
//! to a collection endpoint without ever blocking the sensor delivery path.
//!
//! Each sensor feeds a `BatchSequencer` that keeps one out of every
//! `sampling_period / device_period` raw events and fills fixed-size batches
//! with them. Completed batches are handed to a single `TransmissionWorker`
//! thread through a `handoff::HandoffQueue`, serialized to JSON and posted.
//! A `MeasurementSession` owns the whole pipeline and stops it once every
//! sensor produced the number of batches a session lasts.
//!
//! Features include:
//! - Accelerometer and Gyroscope streams, each with its own batch ids.
//! - Best-effort submission: failed posts are logged and dropped.
//! - Partial batches flushed on stop.
//! - Mock sensors replaying recorded readings, with optional Gaussian noise.
//!
//! **NOTE** The handoff queue is unbounded. If the endpoint stays unreachable
//! memory grows with `SessionStats::queue_depth`.

pub mod adapters;
pub mod constants;
pub mod models;
pub mod ports;
pub mod sequencer;
pub mod services;
pub mod session;
mod utils;
pub mod worker;

pub use models::config::{SamplingPlan, SessionConfig};
pub use models::errors::UplinkError;
pub use models::state::{SessionState, StopReason};
pub use models::stats::SessionStats;
pub use session::MeasurementSession;
