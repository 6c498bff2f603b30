use std::fmt;

pub const N_SENSOR_KINDS: usize = 2;
pub const ACCELEROMETER_INDEX: usize = 0;
pub const GYROSCOPE_INDEX: usize = 1;

/// Represents the sensors sampled during a measurement session.
///
/// # Variants
///
/// - `Accelerometer`: 3-axis accelerometer, serialized as `"accel"`.
/// - `Gyroscope`: 3-axis gyroscope, serialized as `"gyro"`.
///
/// # Examples
///
/// ```
/// use common::types::sensors::SensorKind;
///
/// let sensor = SensorKind::Accelerometer;
/// assert_eq!(usize::from(sensor), 0);
/// assert_eq!(sensor.wire_name(), "accel");
///
/// let sensor = SensorKind::try_from("GyroScope").unwrap();
/// assert_eq!(sensor, SensorKind::Gyroscope);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Hash, Eq)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
}

impl SensorKind {
    pub const ALL: [SensorKind; N_SENSOR_KINDS] =
        [SensorKind::Accelerometer, SensorKind::Gyroscope];

    /// Name of the sensor object in the JSON payload.
    pub fn wire_name(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accel",
            SensorKind::Gyroscope => "gyro",
        }
    }
}

impl From<&SensorKind> for usize {
    fn from(value: &SensorKind) -> Self {
        match value {
            SensorKind::Accelerometer => ACCELEROMETER_INDEX,
            SensorKind::Gyroscope => GYROSCOPE_INDEX,
        }
    }
}

impl From<SensorKind> for usize {
    fn from(value: SensorKind) -> Self {
        usize::from(&value)
    }
}

impl TryFrom<usize> for SensorKind {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            ACCELEROMETER_INDEX => Ok(SensorKind::Accelerometer),
            GYROSCOPE_INDEX => Ok(SensorKind::Gyroscope),
            _ => Err(format!("Sensor {} doesn't exist", value)),
        }
    }
}

impl TryFrom<&str> for SensorKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower_case_value = value.to_lowercase();
        if lower_case_value.contains("acc") {
            Ok(Self::Accelerometer)
        } else if lower_case_value.contains("gyr") {
            Ok(Self::Gyroscope)
        } else {
            Err(format!("Unknown sensor kind: {}", value))
        }
    }
}

impl TryFrom<String> for SensorKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SensorKind::try_from(value.as_str())
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
