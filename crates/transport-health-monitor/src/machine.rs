//! Connection state machine.
//!
//! `step` is a pure function of (state, event). Timers and I/O live in the
//! monitor runtime, which only executes the returned effects.

use serde::Serialize;
use std::time::Duration;

/// Monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Interval between liveness checks while connected.
    pub liveness_interval: Duration,
    /// Reconnect attempt n waits `reconnect_base_delay * n`.
    pub reconnect_base_delay: Duration,
    /// Attempts before giving up until a manual restart.
    pub max_reconnect_attempts: u32,
    /// Delay between a manual restart and re-initialization.
    pub restart_settle_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            liveness_interval: Duration::from_secs(5 * 60),
            reconnect_base_delay: Duration::from_secs(30),
            max_reconnect_attempts: 10,
            restart_settle_delay: Duration::from_secs(1),
        }
    }
}

impl MonitorConfig {
    /// Delay before reconnect attempt `attempt` (1-based). Linear in `attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.reconnect_base_delay.saturating_mul(attempt)
    }
}

/// Coarse connection phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPhase {
    Disconnected,
    Connected,
    /// Reconnect attempts exhausted; waiting for a manual restart.
    GivenUp,
}

/// Connection state owned by the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub phase: LinkPhase,
    pub is_connected: bool,
    pub reconnect_attempts: u32,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            phase: LinkPhase::Disconnected,
            is_connected: false,
            reconnect_attempts: 0,
        }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Transport reported the connection open.
    Opened,
    /// Transport reported the connection closed.
    Closed { reason: Option<String> },
    /// Periodic check fired; carries what the transport reports right now.
    LivenessTick { transport_connected: bool },
    /// The bootstrap collaborator failed before the connection opened.
    ReinitFailed { error: String },
    /// Operator asked for a restart.
    ManualRestart,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartLiveness,
    StopLiveness,
    EmitLiveness,
    ScheduleReinit { delay: Duration, attempt: u32 },
    CancelReinit,
    /// Stop listening to the current handle and drop it.
    ReleaseTransport,
    ReportGivenUp { attempts: u32 },
}

/// Compute the next state and the effects to run.
pub fn step(
    state: &ConnectionState,
    event: &LinkEvent,
    config: &MonitorConfig,
) -> (ConnectionState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match event {
        LinkEvent::ManualRestart => {
            next.phase = LinkPhase::Disconnected;
            next.is_connected = false;
            next.reconnect_attempts = 0;
            effects.push(Effect::StopLiveness);
            effects.push(Effect::CancelReinit);
            effects.push(Effect::ReleaseTransport);
            effects.push(Effect::ScheduleReinit {
                delay: config.restart_settle_delay,
                attempt: 0,
            });
        }
        // Nothing automatic happens once we have given up, not even an open.
        _ if state.phase == LinkPhase::GivenUp => {
            if matches!(event, LinkEvent::Closed { .. }) {
                next.is_connected = false;
            }
        }
        LinkEvent::Opened => {
            next.phase = LinkPhase::Connected;
            next.is_connected = true;
            next.reconnect_attempts = 0;
            effects.push(Effect::CancelReinit);
            effects.push(Effect::StartLiveness);
        }
        LinkEvent::Closed { .. } => {
            next.is_connected = false;
            effects.push(Effect::StopLiveness);
            escalate(&mut next, &mut effects, config);
        }
        LinkEvent::ReinitFailed { .. } => {
            next.is_connected = false;
            escalate(&mut next, &mut effects, config);
        }
        LinkEvent::LivenessTick {
            transport_connected,
        } if state.phase == LinkPhase::Connected => {
            if state.is_connected && *transport_connected {
                effects.push(Effect::EmitLiveness);
                effects.push(Effect::StartLiveness);
            } else {
                next.is_connected = false;
                effects.push(Effect::StopLiveness);
                escalate(&mut next, &mut effects, config);
            }
        }
        // Stale tick; whatever stopped the check already escalated.
        LinkEvent::LivenessTick { .. } => {}
    }

    (next, effects)
}

fn escalate(next: &mut ConnectionState, effects: &mut Vec<Effect>, config: &MonitorConfig) {
    if next.reconnect_attempts < config.max_reconnect_attempts {
        next.reconnect_attempts += 1;
        next.phase = LinkPhase::Disconnected;
        effects.push(Effect::ScheduleReinit {
            delay: config.backoff_delay(next.reconnect_attempts),
            attempt: next.reconnect_attempts,
        });
    } else {
        next.phase = LinkPhase::GivenUp;
        effects.push(Effect::ReportGivenUp {
            attempts: next.reconnect_attempts,
        });
    }
}
