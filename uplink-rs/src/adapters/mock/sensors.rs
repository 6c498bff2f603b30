use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::gaussian::GaussianNoise;
use crate::models::errors::UplinkError;
use crate::ports::SensorPort;
use crate::utils::lock;
use common::buffers::CircularReader;
use common::constants::N_CHANNELS;
use common::{SampleCallback, SensorKind};

const GAUSSIAN_SENSOR_MEAN: f32 = 0.0;
const GAUSSIAN_SENSOR_STDEV: f32 = 0.05;

type Reading = [f32; N_CHANNELS];

/// Replays recorded readings as if they came from real sensors.
///
/// Arming spawns one delivery thread per sensor. Each thread loops over its
/// readings (wrapping around at the end) and delivers one every device
/// period until it is disarmed or `max_events` were delivered.
pub struct MockSensors {
    readings: Vec<(SensorKind, CircularReader<Reading>)>,
    device_period: Duration,
    sensor_noise: Option<GaussianNoise>,
    max_events: Option<usize>,
    armed: Mutex<Option<Arc<AtomicBool>>>,
}

impl MockSensors {
    /// Returns an InvalidConfig error if any sensor has no readings.
    pub fn new(
        readings: Vec<(SensorKind, Vec<Reading>)>,
        device_period: Duration,
        add_sensor_noise: bool,
    ) -> Result<Self, UplinkError> {
        let readings = readings
            .into_iter()
            .map(|(sensor_kind, values)| {
                CircularReader::new(values)
                    .map(|reader| (sensor_kind, reader))
                    .map_err(|e| UplinkError::InvalidConfig(format!("{}: {}", sensor_kind, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sensor_noise = if add_sensor_noise {
            Some(GaussianNoise::new(GAUSSIAN_SENSOR_MEAN, GAUSSIAN_SENSOR_STDEV)?)
        } else {
            None
        };

        Ok(Self {
            readings,
            device_period,
            sensor_noise,
            max_events: None,
            armed: Mutex::new(None),
        })
    }

    /// Stops every delivery thread after `max_events` events.
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = Some(max_events);
        self
    }

    pub fn is_armed(&self) -> bool {
        lock(&self.armed)
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

impl SensorPort for MockSensors {
    fn sensor_kinds(&self) -> Vec<SensorKind> {
        self.readings.iter().map(|(kind, _)| *kind).collect()
    }

    fn arm(&self, delivery: SampleCallback) -> Result<(), UplinkError> {
        let mut armed = lock(&self.armed);
        if armed.as_ref().is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            return Err(UplinkError::SensorArm("Sensors already armed".to_string()));
        }

        // Threads of a previous arm see their own flag cleared and exit on
        // their own; they are not joined here.
        let flag = Arc::new(AtomicBool::new(true));
        for (sensor_kind, reader) in &self.readings {
            let sensor_kind = *sensor_kind;
            let mut reader = reader.clone();
            let running = Arc::clone(&flag);
            let delivery = Arc::clone(&delivery);
            let noise = self.sensor_noise.clone();
            let period = self.device_period;
            let max_events = self.max_events;

            std::thread::Builder::new()
                .name(format!("mock-{}", sensor_kind.wire_name()))
                .spawn(move || {
                    let mut rng = StdRng::from_entropy();
                    let mut delivered = 0usize;
                    while running.load(Ordering::SeqCst)
                        && max_events.map_or(true, |max| delivered < max)
                    {
                        let mut values = reader.next_element();
                        if let Some(noise) = &noise {
                            noise.add_noise(&mut rng, &mut values);
                        }
                        if !running.load(Ordering::SeqCst) {
                            break;
                        }
                        delivery(sensor_kind, &values);
                        delivered += 1;
                        std::thread::sleep(period);
                    }
                    debug!("{} mock stopped after {} events", sensor_kind, delivered);
                })
                .map_err(|e| {
                    flag.store(false, Ordering::SeqCst);
                    UplinkError::SensorArm(e.to_string())
                })?;
        }

        info!("Mock sensors armed: {:?}", self.sensor_kinds());
        *armed = Some(flag);
        Ok(())
    }

    fn disarm(&self) {
        if let Some(flag) = lock(&self.armed).as_ref() {
            flag.store(false, Ordering::SeqCst);
        }
    }
}

impl Drop for MockSensors {
    fn drop(&mut self) {
        self.disarm();
    }
}
