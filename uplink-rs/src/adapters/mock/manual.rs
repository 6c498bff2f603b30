use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::errors::UplinkError;
use crate::ports::SensorPort;
use crate::utils::lock;
use common::{SampleCallback, SensorKind};

/// Sensor port driven by hand. Keeps the delivery callback while armed so
/// the caller decides when, and from which thread, events arrive.
#[derive(Default)]
pub struct ManualSensors {
    sensor_kinds: Vec<SensorKind>,
    delivery: Mutex<Option<SampleCallback>>,
    arm_calls: AtomicUsize,
    disarm_calls: AtomicUsize,
    fail_arm: AtomicBool,
}

impl ManualSensors {
    pub fn new(sensor_kinds: Vec<SensorKind>) -> Self {
        Self {
            sensor_kinds,
            ..Self::default()
        }
    }

    /// Makes the next `arm` calls fail with a SensorArm error.
    pub fn set_fail_arm(&self, fail: bool) {
        self.fail_arm.store(fail, Ordering::SeqCst);
    }

    /// Delivers one raw event. Returns false if the port is not armed.
    pub fn deliver(&self, sensor_kind: SensorKind, values: &[f32]) -> bool {
        // The callback may disarm the port, so it runs without the lock held.
        let delivery = lock(&self.delivery).clone();
        match delivery {
            Some(delivery) => {
                delivery(sensor_kind, values);
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        lock(&self.delivery).is_some()
    }

    pub fn arm_calls(&self) -> usize {
        self.arm_calls.load(Ordering::SeqCst)
    }

    pub fn disarm_calls(&self) -> usize {
        self.disarm_calls.load(Ordering::SeqCst)
    }
}

impl SensorPort for ManualSensors {
    fn sensor_kinds(&self) -> Vec<SensorKind> {
        self.sensor_kinds.clone()
    }

    fn arm(&self, delivery: SampleCallback) -> Result<(), UplinkError> {
        self.arm_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_arm.load(Ordering::SeqCst) {
            return Err(UplinkError::SensorArm("Sensor unavailable".to_string()));
        }
        *lock(&self.delivery) = Some(delivery);
        Ok(())
    }

    fn disarm(&self) {
        self.disarm_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.delivery) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_deliver_only_while_armed() {
        let sensors = ManualSensors::new(vec![SensorKind::Gyroscope]);
        let hits = Arc::new(AtomicUsize::new(0));
        let delivery: SampleCallback = {
            let hits = Arc::clone(&hits);
            Arc::new(move |_: SensorKind, _: &[f32]| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        assert!(!sensors.deliver(SensorKind::Gyroscope, &[0.0; 3]));
        sensors.arm(delivery).unwrap();
        assert!(sensors.deliver(SensorKind::Gyroscope, &[0.0; 3]));
        sensors.disarm();
        assert!(!sensors.deliver(SensorKind::Gyroscope, &[0.0; 3]));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!((sensors.arm_calls(), sensors.disarm_calls()), (1, 1));
    }

    #[test]
    fn test_fail_arm() {
        let sensors = ManualSensors::new(vec![SensorKind::Accelerometer]);
        sensors.set_fail_arm(true);
        assert!(sensors.arm(Arc::new(|_: SensorKind, _: &[f32]| {})).is_err());
        assert!(!sensors.is_armed());
    }
}
