use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::types::sensors::SensorKind;

/// Per-axis sample arrays of one batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisReadings {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
}

impl AxisReadings {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serializable view of a `SampleBatch`.
///
/// Serializes as
/// `{"user_id":0,"id":1,"timestamps":1700000000,"accel":{"x":[..],"y":[..],"z":[..]}}`
/// where the sensor key is the wire name of `sensor_kind`.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchPayload {
    pub user_id: u32,
    pub id: u32,
    pub timestamps: u64,
    pub sensor_kind: SensorKind,
    pub readings: AxisReadings,
}

impl BatchPayload {
    pub fn with_user_id(mut self, user_id: u32) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for BatchPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("user_id", &self.user_id)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("timestamps", &self.timestamps)?;
        map.serialize_entry(self.sensor_kind.wire_name(), &self.readings)?;
        map.end()
    }
}
