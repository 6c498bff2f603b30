use log::{debug, error, info, warn};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::runtime::Runtime;

use crate::constants::WORKER_THREAD_NAME;
use crate::models::errors::UplinkError;
use crate::models::stats::SessionCounters;
use crate::ports::TransportPort;
use common::SampleBatch;
use handoff::HandoffQueue;

/// Single consumer of the handoff queue.
///
/// Runs on a dedicated thread that owns a current-thread runtime for the
/// async transport. Each batch is serialized and submitted once; failures
/// are logged and the batch is dropped. The loop ends when the queue reports
/// end of stream.
pub struct TransmissionWorker<T: TransportPort> {
    queue: Arc<HandoffQueue<SampleBatch>>,
    transport: Arc<T>,
    endpoint: String,
    user_id: u32,
    counters: Arc<SessionCounters>,
}

impl<T> TransmissionWorker<T>
where
    T: TransportPort + 'static,
{
    pub(crate) fn new(
        queue: Arc<HandoffQueue<SampleBatch>>,
        transport: Arc<T>,
        endpoint: &str,
        user_id: u32,
        counters: Arc<SessionCounters>,
    ) -> Self {
        Self {
            queue,
            transport,
            endpoint: endpoint.to_string(),
            user_id,
            counters,
        }
    }

    /// Starts the worker thread. Returns a WorkerSpawn error if the runtime
    /// or the thread cannot be created.
    pub fn spawn(self) -> Result<JoinHandle<()>, UplinkError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| UplinkError::WorkerSpawn(e.to_string()))?;

        std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || self.run(&runtime))
            .map_err(|e| UplinkError::WorkerSpawn(e.to_string()))
    }

    fn run(self, runtime: &Runtime) {
        info!("Transmission worker started, posting to {}", self.endpoint);
        while let Some(batch) = self.queue.dequeue() {
            self.transmit(runtime, batch);
        }
        info!("Transmission worker drained the queue, exiting");
    }

    fn transmit(&self, runtime: &Runtime, batch: SampleBatch) {
        let (sensor_kind, id) = (batch.sensor_kind(), batch.id());
        let payload = match self.encode(&batch) {
            Ok(payload) => payload,
            Err(e) => {
                error!("{} batch {} discarded: {}", sensor_kind, id, e);
                SessionCounters::incr(&self.counters.failed);
                return;
            }
        };
        drop(batch);

        match runtime.block_on(self.transport.submit(&self.endpoint, payload)) {
            Ok(()) => {
                debug!("{} batch {} submitted", sensor_kind, id);
                SessionCounters::incr(&self.counters.sent);
            }
            Err(e) => {
                warn!("{} batch {} discarded: {}", sensor_kind, id, e);
                SessionCounters::incr(&self.counters.failed);
            }
        }
    }

    /// JSON payload of `batch`, stamped with the worker's user id.
    fn encode(&self, batch: &SampleBatch) -> Result<String, UplinkError> {
        batch
            .serialize()
            .with_user_id(self.user_id)
            .to_json()
            .map_err(|e| UplinkError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockTransport;
    use common::SensorKind;
    use std::sync::atomic::Ordering;
    use test_utils::generators::ramp_sample;

    fn full_batch(id: u32, sensor_kind: SensorKind) -> SampleBatch {
        let mut batch = SampleBatch::new(id, sensor_kind, 0, 1_700_000_000, 2);
        batch.tick(&ramp_sample(0));
        batch.tick(&ramp_sample(1));
        batch
    }

    fn spawn_worker(
        transport: Arc<MockTransport>,
    ) -> (Arc<HandoffQueue<SampleBatch>>, Arc<SessionCounters>, JoinHandle<()>) {
        let queue = Arc::new(HandoffQueue::new());
        let counters = Arc::new(SessionCounters::default());
        let handle = TransmissionWorker::new(
            Arc::clone(&queue),
            transport,
            "http://localhost/data/",
            9,
            Arc::clone(&counters),
        )
        .spawn()
        .unwrap();
        (queue, counters, handle)
    }

    #[test]
    fn test_worker_submits_in_dequeue_order() {
        let transport = Arc::new(MockTransport::new());
        let (queue, counters, handle) = spawn_worker(Arc::clone(&transport));

        for id in 0..3 {
            queue.enqueue(full_batch(id, SensorKind::Accelerometer));
        }
        queue.signal_shutdown();
        handle.join().unwrap();

        let payloads = transport.payloads();
        let ids: Vec<u64> = payloads.iter().map(|p| p["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(payloads.iter().all(|p| p["user_id"] == 9));
        assert!(payloads.iter().all(|p| p["accel"]["x"].as_array().unwrap().len() == 2));
        assert!(transport
            .submissions()
            .iter()
            .all(|(endpoint, _)| endpoint == "http://localhost/data/"));
        assert_eq!(counters.sent.load(Ordering::Relaxed), 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_worker_keeps_going_after_failures() {
        let transport = Arc::new(MockTransport::failing());
        let (queue, counters, handle) = spawn_worker(Arc::clone(&transport));

        queue.enqueue(full_batch(0, SensorKind::Gyroscope));
        queue.enqueue(full_batch(1, SensorKind::Gyroscope));
        queue.signal_shutdown();
        handle.join().unwrap();

        assert_eq!(transport.attempts(), 2);
        assert_eq!(counters.failed.load(Ordering::Relaxed), 2);
        assert_eq!(counters.sent.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_encode_stamps_user_id() {
        let worker = TransmissionWorker::new(
            Arc::new(HandoffQueue::new()),
            Arc::new(MockTransport::new()),
            "http://localhost/data/",
            5,
            Arc::new(SessionCounters::default()),
        );
        let payload = worker.encode(&full_batch(4, SensorKind::Gyroscope)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(json["user_id"], 5);
        assert_eq!(json["id"], 4);
        assert_eq!(json["gyro"]["z"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_serialize_error_display() {
        let err = UplinkError::Serialize("bad float".to_string());
        assert_eq!(err.to_string(), "Error serializing batch: bad float");
    }

    #[test]
    fn test_worker_exits_on_empty_shutdown() {
        let transport = Arc::new(MockTransport::new());
        let (queue, _counters, handle) = spawn_worker(Arc::clone(&transport));

        queue.signal_shutdown();
        handle.join().unwrap();
        assert!(transport.submissions().is_empty());
    }
}
