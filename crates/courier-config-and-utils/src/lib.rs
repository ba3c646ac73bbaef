//! Configuration, paths, and logging setup for the courier daemon.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DeliverySettings, LinkSettings, DEFAULT_GATEWAY_URL, DEFAULT_HTTP_PORT,
    DEFAULT_LOG_LEVEL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
