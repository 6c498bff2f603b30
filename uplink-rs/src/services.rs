use std::sync::Arc;
use std::time::Duration;

use crate::adapters::mock::{MockSensors, MockTransport};
use crate::adapters::production::HttpTransport;
use crate::models::config::SessionConfig;
use crate::models::errors::UplinkError;
use crate::ports::SensorPort;
use crate::session::MeasurementSession;
use common::constants::N_CHANNELS;
use common::SensorKind;

/// Starts a measurement session that posts every batch to `config.endpoint`.
///
/// The session is returned Running; call `stop()` on it to end the run early,
/// otherwise it stops by itself after `config.session_duration_secs` worth of
/// batches.
///
/// Returns an InvalidConfig error if the configuration does not validate, a
/// ClientBuild error if the HTTP client cannot be created, and the worker or
/// sensor error if the run cannot be started.
pub fn run_session<S>(
    config: SessionConfig,
    sensors: S,
) -> Result<Arc<MeasurementSession<S, HttpTransport>>, UplinkError>
where
    S: SensorPort + 'static,
{
    let transport = Arc::new(HttpTransport::new(config.request_timeout())?);
    let session = MeasurementSession::new(config, sensors, transport)?;
    session.start()?;
    Ok(session)
}

/// Starts a session that replays `readings` at the configured device period
/// and records submissions in a `MockTransport` instead of sending them.
///
/// Returns a tuple containing:
/// - The running session.
/// - The transport, to inspect what was submitted.
pub fn run_mock_session(
    config: SessionConfig,
    readings: Vec<(SensorKind, Vec<[f32; N_CHANNELS]>)>,
    add_sensor_noise: bool,
) -> Result<
    (
        Arc<MeasurementSession<MockSensors, MockTransport>>,
        Arc<MockTransport>,
    ),
    UplinkError,
> {
    let sensors = MockSensors::new(
        readings,
        Duration::from_millis(config.device_period_ms),
        add_sensor_noise,
    )?;
    let transport = Arc::new(MockTransport::new());
    let session = MeasurementSession::new(config, sensors, Arc::clone(&transport))?;
    session.start()?;
    Ok((session, transport))
}
