//! Connection health monitoring for the messaging transport.
//!
//! This crate provides:
//! - A pure connection state machine (`step`) mapping events to effects
//! - `HealthMonitor`: the actor that runs those effects with tokio timers
//! - Periodic liveness checks while connected
//! - Linear-backoff reconnects that stop after a configured maximum

mod error;
mod machine;
mod monitor;
mod timer;

pub use error::{MonitorError, MonitorResult};
pub use machine::{step, ConnectionState, Effect, LinkEvent, LinkPhase, MonitorConfig};
pub use monitor::{HealthMonitor, HealthSnapshot, HealthStatus, MonitorEvent};
