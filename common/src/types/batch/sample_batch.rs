use csv::WriterBuilder;

use super::payload::{AxisReadings, BatchPayload};
use crate::constants::{DEFAULT_USER_ID, N_CHANNELS};
use crate::types::sensors::SensorKind;

/// Readings of one sensor over a bounded time window.
///
/// Channel storage is allocated once, when the batch is created, with room for
/// `capacity` samples per channel. Every accepted tick writes one value per
/// channel at the same cursor. Once the cursor reaches `capacity` the batch is
/// complete and further ticks are ignored.
#[derive(Clone, Debug)]
pub struct SampleBatch {
    id: u32,
    sensor_kind: SensorKind,
    context: i32,
    timestamp: u64,
    channels: [Vec<f32>; N_CHANNELS],
    cursor: usize,
    complete: bool,
}

impl SampleBatch {
    pub fn new(
        id: u32,
        sensor_kind: SensorKind,
        context: i32,
        timestamp: u64,
        capacity: usize,
    ) -> Self {
        Self {
            id,
            sensor_kind,
            context,
            timestamp,
            channels: std::array::from_fn(|_| vec![0.0; capacity]),
            cursor: 0,
            complete: capacity == 0,
        }
    }

    /// Stores one logical sample. Ticks on a complete batch and ticks whose
    /// value count differs from the channel count are dropped.
    pub fn tick(&mut self, values: &[f32]) {
        if self.complete || values.len() != N_CHANNELS {
            return;
        }

        for (channel, value) in self.channels.iter_mut().zip(values) {
            channel[self.cursor] = *value;
        }
        self.cursor += 1;

        if self.cursor == self.capacity() {
            self.complete = true;
        }
    }

    /// Number of valid samples written so far.
    pub fn sample_count(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn sensor_kind(&self) -> SensorKind {
        self.sensor_kind
    }

    pub fn context(&self) -> i32 {
        self.context
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Valid samples of channel `idx`, or `None` if the channel doesn't exist.
    pub fn channel(&self, idx: usize) -> Option<&[f32]> {
        self.channels.get(idx).map(|c| &c[..self.cursor])
    }

    /// Builds the wire payload. Arrays are truncated to `sample_count()`, so a
    /// partially filled batch never exposes unwritten slots.
    pub fn serialize(&self) -> BatchPayload {
        let [x, y, z] = &self.channels;
        let n = self.cursor;
        BatchPayload {
            user_id: DEFAULT_USER_ID,
            id: self.id,
            timestamps: self.timestamp,
            sensor_kind: self.sensor_kind,
            readings: AxisReadings {
                x: x[..n].to_vec(),
                y: y[..n].to_vec(),
                z: z[..n].to_vec(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.serialize().to_json()
    }

    /// Flat CSV record: `id,context,sensor,x0..xn,y0..yn,z0..zn`.
    pub fn to_csv_record(&self) -> Result<String, String> {
        let header = [
            self.id.to_string(),
            self.context.to_string(),
            usize::from(self.sensor_kind).to_string(),
        ];
        let values = self
            .channels
            .iter()
            .flat_map(|c| c[..self.cursor].iter().map(|v| v.to_string()));

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(vec![]);
        writer
            .write_record(header.into_iter().chain(values))
            .map_err(|e| e.to_string())?;
        let bytes = writer.into_inner().map_err(|e| e.to_string())?;
        let record = String::from_utf8(bytes).map_err(|e| e.to_string())?;

        Ok(record.trim_end().to_string())
    }
}
