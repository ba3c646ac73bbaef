//! Transport over an HTTP messaging gateway.
//!
//! The gateway exposes two endpoints:
//! - `GET {base}/status`: 2xx while the gateway's upstream session is usable
//! - `POST {base}/messages`: `{to, body, mediaUrl?}`, answers `{id?}`
//!
//! `GatewayBootstrap` checks the status endpoint and hands out a fresh
//! `GatewayTransport` per successful check. Each transport polls the status
//! endpoint and reports `Close` once, the first time the gateway stops
//! answering. Recovery is left to the health monitor.

mod bootstrap;
mod client;

pub use bootstrap::{GatewayBootstrap, GatewayConfig};
