//! Process-boundary fault handling.

use std::panic;
use tracing::error;

/// Log every panic before the default hook prints it.
///
/// A panic inside a spawned task only ends that task; the daemon keeps running.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());

        error!(location = %location, message = %message, "Unhandled fault");
        original_hook(panic_info);
    }));
}
