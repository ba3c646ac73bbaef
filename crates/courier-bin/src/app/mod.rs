//! Application wiring and lifecycle management.

mod fault;
mod init;
mod state;

pub use fault::install_panic_hook;
pub use init::run_daemon;
pub use state::AppState;
