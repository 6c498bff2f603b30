use log::trace;

use common::{Clock, SampleBatch, SensorKind};

/// Per-sensor batching state machine.
///
/// Keeps at most one open batch. Only every `decimation_ratio`-th raw sample
/// is written to it; when it fills up it is detached and handed back to the
/// caller, and the next accepted sample opens a new batch with the next id.
#[derive(Debug)]
pub struct BatchSequencer {
    sensor_kind: SensorKind,
    decimation_ratio: u64,
    batch_capacity: usize,
    raw_ticks: u64,
    open_batch: Option<SampleBatch>,
    next_id: u32,
    last_completed: Option<u32>,
}

impl BatchSequencer {
    /// A `decimation_ratio` of 0 is treated as 1.
    pub fn new(sensor_kind: SensorKind, decimation_ratio: u64, batch_capacity: usize) -> Self {
        Self {
            sensor_kind,
            decimation_ratio: decimation_ratio.max(1),
            batch_capacity,
            raw_ticks: 0,
            open_batch: None,
            next_id: 0,
            last_completed: None,
        }
    }

    /// Feeds one raw sensor event. Returns the batch it completed, if any.
    ///
    /// The raw counter advances on every call, malformed events included; the
    /// batch itself drops values whose length doesn't match its channel count.
    pub fn on_raw_sample(&mut self, values: &[f32], context: i32) -> Option<SampleBatch> {
        self.raw_ticks += 1;
        if self.raw_ticks % self.decimation_ratio != 0 {
            return None;
        }

        let batch = self.open_batch.get_or_insert_with(|| {
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            trace!("Opening {} batch {}", self.sensor_kind, id);
            SampleBatch::new(
                id,
                self.sensor_kind,
                context,
                Clock::now().as_unix_secs(),
                self.batch_capacity,
            )
        });
        batch.tick(values);

        if !batch.is_complete() {
            return None;
        }
        let completed = self.open_batch.take()?;
        self.last_completed = Some(completed.id());
        Some(completed)
    }

    /// Detaches the open batch, complete or not.
    pub fn take_partial(&mut self) -> Option<SampleBatch> {
        self.open_batch.take()
    }

    pub fn reset(&mut self) {
        self.raw_ticks = 0;
        self.open_batch = None;
        self.next_id = 0;
        self.last_completed = None;
    }

    pub fn sensor_kind(&self) -> SensorKind {
        self.sensor_kind
    }

    pub fn last_completed_id(&self) -> Option<u32> {
        self.last_completed
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn has_open_batch(&self) -> bool {
        self.open_batch.is_some()
    }

    /// True once the batch with id `max_batches - 1` was completed.
    pub fn has_finished(&self, max_batches: u32) -> bool {
        self.last_completed
            .is_some_and(|id| id >= max_batches.saturating_sub(1))
    }
}
