use dashmap::DashMap;
use log::{debug, error, info, trace, warn};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError, Weak};
use std::thread::JoinHandle;
use std::time::Duration;
use uuid::Uuid;

use crate::models::config::{SamplingPlan, SessionConfig};
use crate::models::errors::UplinkError;
use crate::models::state::{SessionState, StopReason};
use crate::models::stats::{SessionCounters, SessionStats};
use crate::ports::{SensorPort, TransportPort};
use crate::sequencer::BatchSequencer;
use crate::utils::lock;
use crate::worker::TransmissionWorker;
use common::{SampleBatch, SampleCallback, SensorKind};
use handoff::HandoffQueue;

/// Orchestrates one measurement pipeline: a sequencer per sensor feeding a
/// handoff queue drained by a transmission worker.
///
/// A session is always held in an `Arc`; the delivery callback handed to the
/// sensor port only keeps a weak reference to it. Start and stop are
/// serialized, and every stop (requested or automatic) joins the worker
/// before the session is Idle again, so a new run never overlaps the
/// previous one.
pub struct MeasurementSession<S: SensorPort, T: TransportPort> {
    this: Weak<Self>,
    config: SessionConfig,
    plan: SamplingPlan,
    sensors: S,
    transport: Arc<T>,
    queue: Arc<HandoffQueue<SampleBatch>>,
    sequencers: DashMap<SensorKind, Mutex<BatchSequencer>>,
    lifecycle: Mutex<()>,
    state: Mutex<SessionState>,
    idle: Condvar,
    // Checked under the sequencer lock; cleared before the stop barrier.
    accepting: AtomicBool,
    context: AtomicI32,
    run_id: Mutex<Option<Uuid>>,
    last_stop_reason: Mutex<Option<StopReason>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<SessionCounters>,
}

impl<S, T> MeasurementSession<S, T>
where
    S: SensorPort + 'static,
    T: TransportPort + 'static,
{
    /// Creates an Idle session.
    /// Returns an InvalidConfig error if the configuration does not validate
    /// or the sensor port exposes no sensor.
    pub fn new(
        config: SessionConfig,
        sensors: S,
        transport: Arc<T>,
    ) -> Result<Arc<Self>, UplinkError> {
        let plan = config.plan()?;

        let sequencers = DashMap::new();
        for sensor_kind in sensors.sensor_kinds() {
            sequencers.entry(sensor_kind).or_insert_with(|| {
                Mutex::new(BatchSequencer::new(
                    sensor_kind,
                    plan.decimation_ratio,
                    plan.batch_capacity,
                ))
            });
        }
        if sequencers.is_empty() {
            return Err(UplinkError::InvalidConfig(
                "Sensor port exposes no sensor".to_string(),
            ));
        }

        info!(
            "Session plan: 1 of {} raw samples kept, {} samples per batch, {} batches per sensor",
            plan.decimation_ratio, plan.batch_capacity, plan.max_batches
        );

        Ok(Arc::new_cyclic(|this| Self {
            this: this.clone(),
            config,
            plan,
            sensors,
            transport,
            queue: Arc::new(HandoffQueue::new()),
            sequencers,
            lifecycle: Mutex::new(()),
            state: Mutex::new(SessionState::Idle),
            idle: Condvar::new(),
            accepting: AtomicBool::new(false),
            context: AtomicI32::new(0),
            run_id: Mutex::new(None),
            last_stop_reason: Mutex::new(None),
            worker: Mutex::new(None),
            counters: Arc::new(SessionCounters::default()),
        }))
    }

    /// Starts a new run: fresh sequencers, an empty queue, a new worker, and
    /// armed sensors.
    /// Returns an InvalidTransition error if the session is not Idle, and the
    /// worker or sensor error if either cannot be started; the session is
    /// then left Idle.
    pub fn start(&self) -> Result<(), UplinkError> {
        let _lifecycle = lock(&self.lifecycle);
        let state = self.state();
        if state != SessionState::Idle {
            warn!("Start ignored, session is {:?}", state);
            return Err(UplinkError::InvalidTransition(format!(
                "Cannot start a session that is {:?}",
                state
            )));
        }

        self.reset_sequencers();
        self.queue.reset();
        let worker = TransmissionWorker::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.transport),
            &self.config.endpoint,
            self.config.user_id,
            Arc::clone(&self.counters),
        )
        .spawn()?;
        *lock(&self.worker) = Some(worker);

        let run_id = Uuid::new_v4();
        *lock(&self.run_id) = Some(run_id);
        self.set_state(SessionState::Running);
        self.accepting.store(true, Ordering::SeqCst);

        if let Err(e) = self.sensors.arm(self.delivery(run_id)) {
            error!("Could not arm sensors: {}", e);
            self.accepting.store(false, Ordering::SeqCst);
            self.queue.signal_shutdown();
            self.join_worker();
            self.set_state(SessionState::Idle);
            return Err(e);
        }

        info!("Session run {} started, posting to {}", run_id, self.config.endpoint);
        Ok(())
    }

    /// Stops the current run. Partial batches are flushed if configured,
    /// and the call returns once the worker submitted everything queued.
    /// Returns an InvalidTransition error if the session is not Running.
    pub fn stop(&self) -> Result<(), UplinkError> {
        let result = self.shutdown(StopReason::Requested, None);
        if let Err(e) = &result {
            warn!("Stop ignored: {}", e);
        }
        result
    }

    /// Delivery entry point for one raw sensor event.
    ///
    /// Events are dropped unless the session is Running, for unknown sensors,
    /// and for sensors that already completed their last batch. The event
    /// that completes the last batch of every sensor stops the session.
    pub fn on_raw_sample(&self, sensor_kind: SensorKind, values: &[f32]) {
        self.feed(sensor_kind, values, None);
    }

    /// With `origin` set, the event is also dropped unless that run is the
    /// current one, so a late event from a previous arm never reaches a new run.
    fn feed(&self, sensor_kind: SensorKind, values: &[f32], origin: Option<Uuid>) {
        let Some(sequencer) = self.sequencers.get(&sensor_kind) else {
            trace!("No sequencer for {}", sensor_kind);
            return;
        };

        let run_id = {
            let mut sequencer = lock(sequencer.value());
            if !self.accepting.load(Ordering::SeqCst)
                || sequencer.has_finished(self.plan.max_batches)
            {
                return;
            }
            if origin.is_some() && *lock(&self.run_id) != origin {
                trace!("Dropping {} event from a previous run", sensor_kind);
                return;
            }

            let context = self.context.load(Ordering::Relaxed);
            let Some(batch) = sequencer.on_raw_sample(values, context) else {
                return;
            };
            debug!("{} batch {} handed off", sensor_kind, batch.id());
            self.queue.enqueue(batch);
            SessionCounters::incr(&self.counters.enqueued);
            *lock(&self.run_id)
        };
        drop(sequencer);

        if self.all_finished() {
            if let Err(e) = self.shutdown(StopReason::Completed, run_id) {
                debug!("Auto-stop skipped: {}", e);
            }
        }
    }

    /// Grouping label stamped on batches opened from now on.
    pub fn set_context(&self, context: i32) {
        self.context.store(context, Ordering::Relaxed);
    }

    pub fn context(&self) -> i32 {
        self.context.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    /// Blocks until the session is Idle or `timeout` elapsed. Returns true if
    /// the session is Idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let state = lock(&self.state);
        let (state, _) = self
            .idle
            .wait_timeout_while(state, timeout, |s| *s != SessionState::Idle)
            .unwrap_or_else(PoisonError::into_inner);
        *state == SessionState::Idle
    }

    pub fn stats(&self) -> SessionStats {
        self.counters.snapshot(self.queue.len())
    }

    /// Batches waiting for the worker.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub fn last_stop_reason(&self) -> Option<StopReason> {
        *lock(&self.last_stop_reason)
    }

    /// Identifier of the current run, or of the last one once stopped.
    pub fn run_id(&self) -> Option<Uuid> {
        *lock(&self.run_id)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn plan(&self) -> SamplingPlan {
        self.plan
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    fn delivery(&self, run_id: Uuid) -> SampleCallback {
        let this = self.this.clone();
        Arc::new(move |sensor_kind: SensorKind, values: &[f32]| {
            if let Some(session) = this.upgrade() {
                session.feed(sensor_kind, values, Some(run_id));
            }
        })
    }

    fn all_finished(&self) -> bool {
        self.sequencers
            .iter()
            .all(|entry| lock(entry.value()).has_finished(self.plan.max_batches))
    }

    /// Common stop path. With `expected_run` set, only stops that run.
    fn shutdown(
        &self,
        reason: StopReason,
        expected_run: Option<Uuid>,
    ) -> Result<(), UplinkError> {
        let _lifecycle = lock(&self.lifecycle);
        if expected_run.is_some() && *lock(&self.run_id) != expected_run {
            return Err(UplinkError::InvalidTransition(
                "Run already replaced".to_string(),
            ));
        }
        {
            let mut state = lock(&self.state);
            if *state != SessionState::Running {
                return Err(UplinkError::InvalidTransition(format!(
                    "Cannot stop a session that is {:?}",
                    *state
                )));
            }
            *state = SessionState::Stopping;
        }

        self.accepting.store(false, Ordering::SeqCst);
        self.sensors.disarm();

        // Taking every sequencer lock once guarantees no producer enqueues
        // after the queue is shut down.
        for entry in self.sequencers.iter() {
            let Some(batch) = lock(entry.value()).take_partial() else {
                continue;
            };
            if self.config.flush_partial_on_stop
                && batch.sample_count() > 0
                && batch.id() < self.plan.max_batches
            {
                debug!(
                    "Flushing {} batch {} with {} of {} samples",
                    batch.sensor_kind(),
                    batch.id(),
                    batch.sample_count(),
                    batch.capacity()
                );
                self.queue.enqueue(batch);
                SessionCounters::incr(&self.counters.flushed);
            }
        }

        self.queue.signal_shutdown();
        self.join_worker();
        self.reset_sequencers();

        *lock(&self.last_stop_reason) = Some(reason);
        if reason == StopReason::Completed {
            SessionCounters::incr(&self.counters.auto_stops);
        }
        self.set_state(SessionState::Idle);
        info!("Session stopped ({:?}), {:?}", reason, self.stats());
        Ok(())
    }

    fn join_worker(&self) {
        let handle = lock(&self.worker).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Transmission worker panicked");
            }
        }
    }

    fn reset_sequencers(&self) {
        for entry in self.sequencers.iter() {
            lock(entry.value()).reset();
        }
    }

    fn set_state(&self, state: SessionState) {
        *lock(&self.state) = state;
        self.idle.notify_all();
    }
}

impl<S: SensorPort, T: TransportPort> Drop for MeasurementSession<S, T> {
    fn drop(&mut self) {
        let running = *self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
            == SessionState::Running;
        if !running {
            return;
        }
        self.accepting.store(false, Ordering::SeqCst);
        self.sensors.disarm();
        self.queue.signal_shutdown();
        let handle = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Transmission worker panicked");
            }
        }
        debug!("Running session dropped, worker joined");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{ManualSensors, MockTransport};
    use test_utils::generators::ramp_sample;

    // Capacity 3, every 2nd raw sample kept, 4 batches per sensor.
    fn small_config() -> SessionConfig {
        SessionConfig {
            device_period_ms: 500,
            sampling_period_ms: 1000,
            batch_duration_secs: 3,
            session_duration_secs: 12,
            ..Default::default()
        }
    }

    fn session(
        config: SessionConfig,
    ) -> (Arc<MeasurementSession<ManualSensors, MockTransport>>, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let sensors = ManualSensors::new(vec![SensorKind::Accelerometer, SensorKind::Gyroscope]);
        let session = MeasurementSession::new(config, sensors, Arc::clone(&transport)).unwrap();
        (session, transport)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SessionConfig {
            sampling_period_ms: 15,
            ..Default::default()
        };
        let result = MeasurementSession::new(
            config,
            ManualSensors::new(vec![SensorKind::Gyroscope]),
            Arc::new(MockTransport::new()),
        );
        assert!(matches!(result, Err(UplinkError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_rejects_no_sensors() {
        let result = MeasurementSession::new(
            SessionConfig::default(),
            ManualSensors::new(vec![]),
            Arc::new(MockTransport::new()),
        );
        assert!(matches!(result, Err(UplinkError::InvalidConfig(_))));
    }

    #[test]
    fn test_lifecycle_transitions() {
        let (session, _) = session(small_config());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(matches!(session.stop(), Err(UplinkError::InvalidTransition(_))));

        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.sensors().is_armed());
        assert!(matches!(session.start(), Err(UplinkError::InvalidTransition(_))));

        session.stop().unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.sensors().is_armed());
        assert_eq!(session.last_stop_reason(), Some(StopReason::Requested));
        assert_eq!(session.sensors().arm_calls(), 1);
    }

    #[test]
    fn test_samples_ignored_while_idle() {
        let (session, transport) = session(small_config());
        for i in 0..20 {
            session.on_raw_sample(SensorKind::Accelerometer, &ramp_sample(i));
        }
        assert_eq!(session.stats().batches_enqueued, 0);

        session.start().unwrap();
        session.stop().unwrap();
        assert_eq!(transport.attempts(), 0);
    }

    #[test]
    fn test_set_context_while_idle() {
        let (session, transport) = session(small_config());
        session.set_context(7);
        session.start().unwrap();
        for i in 0..6 {
            session.sensors().deliver(SensorKind::Gyroscope, &ramp_sample(i));
        }
        session.stop().unwrap();

        assert_eq!(transport.submissions().len(), 1);
        assert_eq!(session.context(), 7);
        assert_eq!(session.stats().batches_sent, 1);
    }

    #[test]
    fn test_stop_flushes_partial_batches() {
        let (session, transport) = session(small_config());
        session.start().unwrap();
        // One full accel batch and one with a single decimated sample.
        for i in 0..8 {
            session.sensors().deliver(SensorKind::Accelerometer, &ramp_sample(i));
        }
        session.stop().unwrap();

        let payloads = transport.payloads();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0]["id"], 0);
        assert_eq!(payloads[0]["accel"]["x"].as_array().unwrap().len(), 3);
        assert_eq!(payloads[1]["id"], 1);
        assert_eq!(payloads[1]["accel"]["x"].as_array().unwrap().len(), 1);

        let stats = session.stats();
        assert_eq!(stats.batches_enqueued, 1);
        assert_eq!(stats.partial_flushed, 1);
        assert_eq!(stats.batches_sent, 2);
        assert_eq!(stats.queue_depth, 0);
    }

    #[test]
    fn test_stop_without_flush_drops_partial_batches() {
        let config = SessionConfig {
            flush_partial_on_stop: false,
            ..small_config()
        };
        let (session, transport) = session(config);
        session.start().unwrap();
        for i in 0..4 {
            session.sensors().deliver(SensorKind::Gyroscope, &ramp_sample(i));
        }
        session.stop().unwrap();
        assert!(transport.submissions().is_empty());
        assert_eq!(session.stats().partial_flushed, 0);
    }

    #[test]
    fn test_auto_stop_after_last_batch() {
        let (session, transport) = session(small_config());
        session.start().unwrap();
        let first_run = session.run_id();

        // 4 batches * 3 samples * 2 raw events per sample.
        for i in 0..24 {
            session.sensors().deliver(SensorKind::Accelerometer, &ramp_sample(i));
        }
        assert_eq!(session.state(), SessionState::Running);
        for i in 0..24 {
            session.sensors().deliver(SensorKind::Gyroscope, &ramp_sample(i));
        }

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.last_stop_reason(), Some(StopReason::Completed));
        assert_eq!(session.stats().auto_stops, 1);
        assert_eq!(session.run_id(), first_run);
        assert_eq!(transport.submissions().len(), 8);
        assert!(!session.sensors().deliver(SensorKind::Gyroscope, &ramp_sample(0)));
    }

    #[test]
    fn test_finished_sensor_stops_producing() {
        let (session, transport) = session(small_config());
        session.start().unwrap();
        for i in 0..60 {
            session.sensors().deliver(SensorKind::Accelerometer, &ramp_sample(i));
        }
        assert_eq!(session.stats().batches_enqueued, 4);
        session.stop().unwrap();

        let ids: Vec<u64> = transport
            .payloads()
            .iter()
            .map(|p| p["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_late_event_from_previous_run_is_dropped() {
        let (session, transport) = session(small_config());
        session.start().unwrap();
        let stale = session.delivery(session.run_id().unwrap());
        session.stop().unwrap();
        session.start().unwrap();

        for i in 0..6 {
            stale(SensorKind::Accelerometer, &ramp_sample(i));
        }
        assert_eq!(session.stats().batches_enqueued, 0);

        for i in 0..6 {
            session.sensors().deliver(SensorKind::Accelerometer, &ramp_sample(i));
        }
        session.stop().unwrap();
        let ids: Vec<u64> = transport
            .payloads()
            .iter()
            .map(|p| p["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![0]);
    }

    #[test]
    fn test_restart_after_failed_arm() {
        let (session, _) = session(small_config());
        session.sensors().set_fail_arm(true);
        assert!(matches!(session.start(), Err(UplinkError::SensorArm(_))));
        assert_eq!(session.state(), SessionState::Idle);

        session.sensors().set_fail_arm(false);
        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Running);
        session.stop().unwrap();
    }

    #[test]
    fn test_wait_idle() {
        let (session, _) = session(small_config());
        assert!(session.wait_idle(Duration::from_millis(10)));
        session.start().unwrap();
        assert!(!session.wait_idle(Duration::from_millis(10)));
        session.stop().unwrap();
        assert!(session.wait_idle(Duration::from_millis(10)));
    }

    #[test]
    fn test_drop_running_session_joins_worker() {
        let (session, transport) = session(small_config());
        session.start().unwrap();
        for i in 0..6 {
            session.sensors().deliver(SensorKind::Accelerometer, &ramp_sample(i));
        }
        drop(session);
        assert_eq!(transport.submissions().len(), 1);
    }
}
