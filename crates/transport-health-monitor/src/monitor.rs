//! Health monitor runtime.
//!
//! A single actor task owns the connection state. Transport events, timer
//! expiries and operator commands all arrive on one channel, so transitions
//! are serialized without locks. The actor feeds each input to [`step`] and
//! executes the effects it returns.

use crate::machine::{step, ConnectionState, Effect, LinkEvent, LinkPhase, MonitorConfig};
use crate::timer::TimerSlot;
use crate::{MonitorError, MonitorResult};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, warn};
use transport_contract::{
    Bootstrap, ConnectionUpdate, Transport, TransportCell, TransportResult,
};

/// Capacity of the monitor event broadcast channel.
const EVENT_CAPACITY: usize = 64;

/// Reported when a handle's update stream ends without a close event.
const STREAM_ENDED: &str = "connection update stream ended";

/// Coarse status for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Connected,
    Disconnected,
}

/// Point-in-time view of the monitor state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub phase: LinkPhase,
    pub is_connected: bool,
    pub reconnect_attempts: u32,
}

impl From<&ConnectionState> for HealthSnapshot {
    fn from(state: &ConnectionState) -> Self {
        Self {
            status: if state.is_connected {
                HealthStatus::Connected
            } else {
                HealthStatus::Disconnected
            },
            phase: state.phase,
            is_connected: state.is_connected,
            reconnect_attempts: state.reconnect_attempts,
        }
    }
}

/// Events emitted by the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    Connected,
    Disconnected { reason: Option<String> },
    /// A liveness check passed.
    Liveness,
    ReconnectScheduled { attempt: u32, delay: Duration },
    /// The bootstrap collaborator is being called.
    Reinitializing { attempt: u32 },
    GivenUp { attempts: u32 },
    RestartRequested,
}

enum Input {
    Start,
    Restart,
    Shutdown,
    ReinitDone {
        generation: u64,
        result: TransportResult<Arc<dyn Transport>>,
    },
    Update {
        generation: u64,
        update: ConnectionUpdate,
    },
    LivenessDue {
        generation: u64,
    },
}

/// Handle to the monitor actor.
///
/// Cloning is cheap; all clones talk to the same actor.
#[derive(Clone)]
pub struct HealthMonitor {
    input_tx: mpsc::UnboundedSender<Input>,
    state_rx: watch::Receiver<ConnectionState>,
    event_tx: broadcast::Sender<MonitorEvent>,
}

impl HealthMonitor {
    /// Spawn the actor. Nothing connects until [`HealthMonitor::start`].
    ///
    /// The monitor is the only writer of `cell`.
    pub fn spawn(
        config: MonitorConfig,
        bootstrap: Arc<dyn Bootstrap>,
        cell: TransportCell,
    ) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::default());
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let actor = Actor {
            config,
            bootstrap,
            cell,
            state: ConnectionState::default(),
            started: false,
            state_tx,
            event_tx: event_tx.clone(),
            input_tx: input_tx.clone(),
            liveness: TimerSlot::new("liveness"),
            reinit: TimerSlot::new("reinit"),
            pump: TimerSlot::new("update-pump"),
        };
        tokio::spawn(actor.run(input_rx));

        Self {
            input_tx,
            state_rx,
            event_tx,
        }
    }

    /// Create the first transport handle. Later calls are ignored.
    pub fn start(&self) -> MonitorResult<()> {
        self.send(Input::Start)
    }

    /// Tear down the current handle and re-initialize after the settle delay.
    ///
    /// Resets the attempt counter and works from any state, including after
    /// the monitor has given up.
    pub fn restart(&self) -> MonitorResult<()> {
        self.send(Input::Restart)
    }

    /// Stop the actor and cancel every pending timer.
    pub fn shutdown(&self) {
        let _ = self.input_tx.send(Input::Shutdown);
    }

    pub fn state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot::from(&*self.state_rx.borrow())
    }

    /// Subscribe to monitor events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    fn send(&self, input: Input) -> MonitorResult<()> {
        self.input_tx.send(input).map_err(|_| MonitorError::Stopped)
    }
}

struct Actor {
    config: MonitorConfig,
    bootstrap: Arc<dyn Bootstrap>,
    cell: TransportCell,
    state: ConnectionState,
    started: bool,
    state_tx: watch::Sender<ConnectionState>,
    event_tx: broadcast::Sender<MonitorEvent>,
    input_tx: mpsc::UnboundedSender<Input>,
    liveness: TimerSlot,
    reinit: TimerSlot,
    pump: TimerSlot,
}

impl Actor {
    async fn run(mut self, mut input_rx: mpsc::UnboundedReceiver<Input>) {
        debug!("Health monitor running");

        while let Some(input) = input_rx.recv().await {
            match input {
                Input::Start => {
                    if self.started {
                        debug!("Health monitor already started");
                        continue;
                    }
                    self.started = true;
                    info!("Initializing transport");
                    self.run_effect(Effect::ScheduleReinit {
                        delay: Duration::ZERO,
                        attempt: 0,
                    });
                }
                Input::Restart => {
                    info!("Manual restart requested");
                    self.started = true;
                    self.emit(MonitorEvent::RestartRequested);
                    self.apply(LinkEvent::ManualRestart);
                }
                Input::Shutdown => break,
                Input::ReinitDone { generation, result } => {
                    if !self.reinit.consume(generation) {
                        debug!(generation, "Dropping superseded reinit result");
                        continue;
                    }
                    match result {
                        Ok(handle) => self.adopt(handle),
                        Err(e) => {
                            warn!(error = %e, "Transport initialization failed");
                            self.apply(LinkEvent::ReinitFailed {
                                error: e.to_string(),
                            });
                        }
                    }
                }
                Input::Update { generation, update } => {
                    if !self.pump.is_current(generation) {
                        debug!(generation, "Ignoring update from released transport");
                        continue;
                    }
                    let event = match update {
                        ConnectionUpdate::Open => LinkEvent::Opened,
                        ConnectionUpdate::Close { last_disconnect } => LinkEvent::Closed {
                            reason: last_disconnect,
                        },
                    };
                    self.apply(event);
                }
                Input::LivenessDue { generation } => {
                    if !self.liveness.consume(generation) {
                        continue;
                    }
                    let transport_connected = self.cell.is_connected();
                    self.apply(LinkEvent::LivenessTick {
                        transport_connected,
                    });
                }
            }
        }

        if self.reinit.is_armed() {
            debug!("Dropping pending reinit on shutdown");
        }
        self.liveness.cancel();
        self.reinit.cancel();
        self.pump.cancel();
        info!("Health monitor stopped");
    }

    fn apply(&mut self, event: LinkEvent) {
        let (next, effects) = step(&self.state, &event, &self.config);
        let was_connected = self.state.is_connected;
        self.state = next;
        self.state_tx.send_replace(self.state.clone());

        match (was_connected, self.state.is_connected) {
            (false, true) => {
                info!("Transport connected");
                self.emit(MonitorEvent::Connected);
            }
            (true, false) => {
                let reason = match &event {
                    LinkEvent::Closed { reason } => reason.clone(),
                    LinkEvent::LivenessTick { .. } => Some("liveness check failed".to_string()),
                    LinkEvent::ManualRestart => Some("manual restart".to_string()),
                    _ => None,
                };
                warn!(reason = ?reason, "Transport disconnected");
                self.emit(MonitorEvent::Disconnected { reason });
            }
            _ => {}
        }

        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::StartLiveness => {
                let interval = self.config.liveness_interval;
                let tx = self.input_tx.clone();
                self.liveness.arm(move |generation| async move {
                    tokio::time::sleep(interval).await;
                    let _ = tx.send(Input::LivenessDue { generation });
                });
            }
            Effect::StopLiveness => self.liveness.cancel(),
            Effect::EmitLiveness => {
                info!("Liveness check passed");
                self.emit(MonitorEvent::Liveness);
            }
            Effect::ScheduleReinit { delay, attempt } => {
                if attempt > 0 {
                    info!(
                        attempt,
                        max_attempts = self.config.max_reconnect_attempts,
                        delay_secs = delay.as_secs(),
                        "Scheduling reconnect"
                    );
                    self.emit(MonitorEvent::ReconnectScheduled { attempt, delay });
                }
                let bootstrap = self.bootstrap.clone();
                let events = self.event_tx.clone();
                let tx = self.input_tx.clone();
                self.reinit.arm(move |generation| async move {
                    tokio::time::sleep(delay).await;
                    debug!(attempt, "Reinitializing transport");
                    let _ = events.send(MonitorEvent::Reinitializing { attempt });
                    let result = bootstrap.reinitialize().await;
                    let _ = tx.send(Input::ReinitDone { generation, result });
                });
            }
            Effect::CancelReinit => self.reinit.cancel(),
            Effect::ReleaseTransport => {
                self.pump.cancel();
                self.cell.clear();
                debug!("Released transport handle");
            }
            Effect::ReportGivenUp { attempts } => {
                error!(
                    attempts,
                    "Max reconnect attempts reached, manual intervention required"
                );
                self.emit(MonitorEvent::GivenUp { attempts });
            }
        }
    }

    /// Install a fresh handle and start forwarding its connection updates.
    fn adopt(&mut self, handle: Arc<dyn Transport>) {
        let mut updates = handle.subscribe();
        let connected_now = handle.is_connected();
        self.cell.install(handle);

        let tx = self.input_tx.clone();
        self.pump.arm(move |generation| async move {
            loop {
                match updates.recv().await {
                    Ok(update) => {
                        if tx.send(Input::Update { generation, update }).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Connection updates lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        let _ = tx.send(Input::Update {
                            generation,
                            update: ConnectionUpdate::Close {
                                last_disconnect: Some(STREAM_ENDED.to_string()),
                            },
                        });
                        break;
                    }
                }
            }
        });

        // The open event may have fired before we subscribed.
        if connected_now {
            self.apply(LinkEvent::Opened);
        }
    }

    fn emit(&self, event: MonitorEvent) {
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::time::Instant;
    use transport_contract::{MessagePayload, SendReceipt, TransportError};

    struct FakeTransport {
        tx: broadcast::Sender<ConnectionUpdate>,
        connected: AtomicBool,
    }

    impl FakeTransport {
        fn new() -> Self {
            let (tx, _) = broadcast::channel(8);
            Self {
                tx,
                connected: AtomicBool::new(true),
            }
        }

        fn drop_connection(&self) {
            self.connected.store(false, Ordering::SeqCst);
            let _ = self.tx.send(ConnectionUpdate::Close {
                last_disconnect: Some("connection lost".to_string()),
            });
        }

        fn go_silent(&self) {
            self.connected.store(false, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, _: &str, _: &MessagePayload) -> TransportResult<SendReceipt> {
            Ok(SendReceipt::default())
        }

        fn subscribe(&self) -> broadcast::Receiver<ConnectionUpdate> {
            self.tx.subscribe()
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }
    }

    #[derive(Clone, Copy)]
    enum Outcome {
        Connect,
        /// Create the handle, then hold the call until `gate` is notified.
        ConnectWhenReleased,
        Fail,
    }

    /// Follows a script of outcomes, failing once the script runs out.
    #[derive(Default)]
    struct FakeBootstrap {
        script: Mutex<VecDeque<Outcome>>,
        calls: Mutex<Vec<Instant>>,
        handles: Mutex<Vec<Arc<FakeTransport>>>,
        gate: tokio::sync::Notify,
    }

    impl FakeBootstrap {
        fn scripted(outcomes: &[Outcome]) -> Arc<Self> {
            let bootstrap = Self::default();
            bootstrap.script.lock().extend(outcomes.iter().copied());
            Arc::new(bootstrap)
        }

        fn push(&self, outcome: Outcome) {
            self.script.lock().push_back(outcome);
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        fn calls(&self) -> Vec<Instant> {
            self.calls.lock().clone()
        }

        fn latest(&self) -> Arc<FakeTransport> {
            self.handles.lock().last().cloned().expect("no handle created")
        }
    }

    #[async_trait]
    impl Bootstrap for FakeBootstrap {
        async fn reinitialize(&self) -> TransportResult<Arc<dyn Transport>> {
            self.calls.lock().push(Instant::now());
            let outcome = self.script.lock().pop_front().unwrap_or(Outcome::Fail);
            match outcome {
                Outcome::Connect => {
                    let handle = Arc::new(FakeTransport::new());
                    self.handles.lock().push(handle.clone());
                    Ok(handle)
                }
                Outcome::ConnectWhenReleased => {
                    let handle = Arc::new(FakeTransport::new());
                    self.handles.lock().push(handle.clone());
                    self.gate.notified().await;
                    Ok(handle)
                }
                Outcome::Fail => Err(TransportError::Bootstrap("gateway down".to_string())),
            }
        }
    }

    fn spawn_monitor(bootstrap: Arc<FakeBootstrap>) -> (HealthMonitor, TransportCell) {
        let cell = TransportCell::new();
        let monitor = HealthMonitor::spawn(MonitorConfig::default(), bootstrap, cell.clone());
        (monitor, cell)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    fn drain(rx: &mut broadcast::Receiver<MonitorEvent>) -> Vec<MonitorEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn assert_within(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_secs(1),
            "expected ~{:?}, got {:?}",
            expected,
            actual
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_connects_and_installs_handle() {
        let bootstrap = FakeBootstrap::scripted(&[Outcome::Connect]);
        let (monitor, cell) = spawn_monitor(bootstrap.clone());
        let mut events = monitor.subscribe();

        assert_eq!(monitor.health().status, HealthStatus::Disconnected);
        monitor.start().unwrap();
        settle().await;

        let health = monitor.health();
        assert_eq!(health.status, HealthStatus::Connected);
        assert_eq!(health.phase, LinkPhase::Connected);
        assert_eq!(health.reconnect_attempts, 0);
        assert!(cell.is_installed());
        assert_eq!(bootstrap.call_count(), 1);
        assert_eq!(
            drain(&mut events),
            vec![
                MonitorEvent::Reinitializing { attempt: 0 },
                MonitorEvent::Connected
            ]
        );

        // A second start does not create another handle.
        monitor.start().unwrap();
        settle().await;
        assert_eq!(bootstrap.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_without_recovery_backs_off_linearly_then_gives_up() {
        let bootstrap = FakeBootstrap::scripted(&[Outcome::Connect]);
        let (monitor, _cell) = spawn_monitor(bootstrap.clone());
        let mut events = monitor.subscribe();
        monitor.start().unwrap();
        settle().await;

        let closed_at = Instant::now();
        bootstrap.latest().drop_connection();
        settle().await;
        assert_eq!(monitor.health().reconnect_attempts, 1);
        assert_eq!(monitor.health().status, HealthStatus::Disconnected);

        tokio::time::sleep(Duration::from_secs(2000)).await;

        let calls = bootstrap.calls();
        assert_eq!(calls.len(), 11);
        assert_within(calls[1] - closed_at, Duration::from_secs(30));
        for n in 2..=10u64 {
            let gap = calls[n as usize] - calls[n as usize - 1];
            assert_within(gap, Duration::from_secs(30 * n));
        }

        let health = monitor.health();
        assert_eq!(health.phase, LinkPhase::GivenUp);
        assert_eq!(health.status, HealthStatus::Disconnected);
        assert_eq!(health.reconnect_attempts, 10);

        let scheduled: Vec<u32> = drain(&mut events)
            .into_iter()
            .filter_map(|event| match event {
                MonitorEvent::ReconnectScheduled { attempt, .. } => Some(attempt),
                _ => None,
            })
            .collect();
        assert_eq!(scheduled, (1..=10).collect::<Vec<_>>());

        // No further automatic attempts.
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(bootstrap.call_count(), 11);

        // A manual restart brings it back.
        bootstrap.push(Outcome::Connect);
        monitor.restart().unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let health = monitor.health();
        assert_eq!(health.status, HealthStatus::Connected);
        assert_eq!(health.reconnect_attempts, 0);
        assert_eq!(bootstrap.call_count(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_restart_cancels_pending_reconnect() {
        let bootstrap = FakeBootstrap::scripted(&[Outcome::Connect, Outcome::Connect]);
        let (monitor, _cell) = spawn_monitor(bootstrap.clone());
        monitor.start().unwrap();
        settle().await;

        let first = bootstrap.latest();
        first.drop_connection();
        settle().await;
        assert_eq!(monitor.health().reconnect_attempts, 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let restarted_at = Instant::now();
        monitor.restart().unwrap();
        settle().await;
        assert_eq!(monitor.health().reconnect_attempts, 0);
        assert_eq!(bootstrap.call_count(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let calls = bootstrap.calls();
        assert_eq!(calls.len(), 2);
        assert_within(calls[1] - restarted_at, Duration::from_secs(1));
        assert_eq!(monitor.health().status, HealthStatus::Connected);

        // The cancelled 30s reconnect never fires, and the old handle is ignored.
        first.drop_connection();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(bootstrap.call_count(), 2);
        assert_eq!(monitor.health().status, HealthStatus::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_drops_result_of_running_reinit() {
        let bootstrap = FakeBootstrap::scripted(&[
            Outcome::Connect,
            Outcome::ConnectWhenReleased,
            Outcome::Connect,
        ]);
        let (monitor, _cell) = spawn_monitor(bootstrap.clone());
        monitor.start().unwrap();
        settle().await;

        bootstrap.latest().drop_connection();
        tokio::time::sleep(Duration::from_secs(31)).await;
        // The first reconnect is now blocked inside the bootstrap.
        assert_eq!(bootstrap.call_count(), 2);
        assert_eq!(monitor.health().reconnect_attempts, 1);

        bootstrap.gate.notify_one();
        monitor.restart().unwrap();
        settle().await;

        let health = monitor.health();
        assert_eq!(health.reconnect_attempts, 0);
        assert_eq!(health.status, HealthStatus::Disconnected);
        assert_eq!(bootstrap.call_count(), 2);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(bootstrap.call_count(), 3);
        assert_eq!(monitor.health().status, HealthStatus::Connected);
        assert_eq!(monitor.health().reconnect_attempts, 0);

        // Only the handle from the settle reinit was ever subscribed to.
        let handles = bootstrap.handles.lock().clone();
        assert_eq!(handles.len(), 3);
        assert_eq!(handles[1].tx.receiver_count(), 0);
        assert_eq!(handles[2].tx.receiver_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_after_giving_up_stays_given_up() {
        let bootstrap = FakeBootstrap::scripted(&[Outcome::Connect]);
        let (monitor, _cell) = spawn_monitor(bootstrap.clone());
        monitor.start().unwrap();
        settle().await;

        let handle = bootstrap.latest();
        handle.drop_connection();
        tokio::time::sleep(Duration::from_secs(2000)).await;
        assert_eq!(monitor.health().phase, LinkPhase::GivenUp);

        handle.connected.store(true, Ordering::SeqCst);
        let _ = handle.tx.send(ConnectionUpdate::Open);
        settle().await;

        let health = monitor.health();
        assert_eq!(health.phase, LinkPhase::GivenUp);
        assert_eq!(health.status, HealthStatus::Disconnected);
        assert_eq!(health.reconnect_attempts, 10);

        // No liveness check was started either.
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(monitor.health().phase, LinkPhase::GivenUp);
        assert_eq!(bootstrap.call_count(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_liveness_check_fires_every_interval() {
        let bootstrap = FakeBootstrap::scripted(&[Outcome::Connect]);
        let (monitor, _cell) = spawn_monitor(bootstrap.clone());
        monitor.start().unwrap();
        settle().await;
        let mut events = monitor.subscribe();

        tokio::time::sleep(Duration::from_secs(3 * 300 + 1)).await;

        let liveness = drain(&mut events)
            .into_iter()
            .filter(|event| *event == MonitorEvent::Liveness)
            .count();
        assert_eq!(liveness, 3);
        assert_eq!(bootstrap.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_liveness_check_detects_silent_drop() {
        let bootstrap = FakeBootstrap::scripted(&[Outcome::Connect, Outcome::Connect]);
        let (monitor, _cell) = spawn_monitor(bootstrap.clone());
        monitor.start().unwrap();
        settle().await;
        let mut events = monitor.subscribe();

        bootstrap.latest().go_silent();
        tokio::time::sleep(Duration::from_secs(301)).await;

        assert_eq!(monitor.health().status, HealthStatus::Disconnected);
        assert_eq!(monitor.health().reconnect_attempts, 1);
        assert_eq!(
            drain(&mut events),
            vec![
                MonitorEvent::Disconnected {
                    reason: Some("liveness check failed".to_string())
                },
                MonitorEvent::ReconnectScheduled {
                    attempt: 1,
                    delay: Duration::from_secs(30)
                }
            ]
        );

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(monitor.health().status, HealthStatus::Connected);
        assert_eq!(monitor.health().reconnect_attempts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_bootstrap_failure_escalates() {
        let bootstrap = FakeBootstrap::scripted(&[Outcome::Fail, Outcome::Connect]);
        let (monitor, cell) = spawn_monitor(bootstrap.clone());
        monitor.start().unwrap();
        settle().await;

        assert_eq!(monitor.health().reconnect_attempts, 1);
        assert!(!cell.is_installed());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(bootstrap.call_count(), 2);
        assert_eq!(monitor.health().status, HealthStatus::Connected);
        assert!(cell.is_installed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_end_counts_as_close() {
        let bootstrap = FakeBootstrap::scripted(&[Outcome::Connect]);
        let (monitor, cell) = spawn_monitor(bootstrap.clone());
        monitor.start().unwrap();
        settle().await;

        // Dropping every strong reference ends the update stream.
        cell.clear();
        bootstrap.handles.lock().clear();
        settle().await;

        assert_eq!(monitor.health().status, HealthStatus::Disconnected);
        assert_eq!(monitor.health().reconnect_attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_fail_after_shutdown() {
        let bootstrap = FakeBootstrap::scripted(&[]);
        let (monitor, _cell) = spawn_monitor(bootstrap);
        monitor.shutdown();
        settle().await;

        assert_eq!(monitor.restart(), Err(MonitorError::Stopped));
    }

    #[test]
    fn test_health_snapshot_wire_shape() {
        let snapshot = HealthSnapshot::from(&ConnectionState {
            phase: LinkPhase::GivenUp,
            is_connected: false,
            reconnect_attempts: 10,
        });
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "disconnected");
        assert_eq!(json["phase"], "given_up");
        assert_eq!(json["reconnectAttempts"], 10);
    }
}
