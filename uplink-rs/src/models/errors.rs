//! Module errors

use std::fmt;

/// Represents the different types of errors that can occur in the uplink library.
#[derive(Debug, Clone, PartialEq)]
pub enum UplinkError {
    /// Error indicating that there was an issue building the HTTP client.
    ClientBuild(String),

    /// Error indicating that a batch could not be submitted to the endpoint.
    Submit(String),

    /// Error indicating that a batch could not be turned into a payload.
    Serialize(String),

    /// Error indicating that the session configuration is not usable.
    InvalidConfig(String),

    /// Error indicating that the transmission worker could not be started.
    WorkerSpawn(String),

    /// Error indicating that sensor delivery could not be armed.
    SensorArm(String),

    /// `start` while running or `stop` while idle. Informational: nothing changed.
    InvalidTransition(String),
}

impl fmt::Display for UplinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UplinkError::ClientBuild(e) => write!(f, "Error building client: {}", e),
            UplinkError::Submit(e) => write!(f, "Error submitting batch: {}", e),
            UplinkError::Serialize(e) => write!(f, "Error serializing batch: {}", e),
            UplinkError::InvalidConfig(e) => write!(f, "Invalid configuration: {}", e),
            UplinkError::WorkerSpawn(e) => write!(f, "Error spawning worker: {}", e),
            UplinkError::SensorArm(e) => write!(f, "Error arming sensors: {}", e),
            UplinkError::InvalidTransition(e) => write!(f, "Invalid transition: {}", e),
        }
    }
}

impl std::error::Error for UplinkError {}
