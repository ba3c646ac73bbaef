//! Single-occupancy timer slots.

use std::future::Future;
use tokio::task::JoinHandle;
use tracing::trace;

/// Holds at most one scheduled task. Arming the slot aborts whatever it held.
///
/// Each arm gets a new generation number. Tasks report back tagged with it,
/// so messages from a task that was replaced can be recognised and dropped.
pub(crate) struct TimerSlot {
    name: &'static str,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            generation: 0,
            handle: None,
        }
    }

    /// Cancel the current task and spawn `make(generation)` in its place.
    pub(crate) fn arm<F, Fut>(&mut self, make: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        self.handle = Some(tokio::spawn(make(self.generation)));
        trace!(timer = self.name, generation = self.generation, "Armed timer");
        self.generation
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            trace!(timer = self.name, generation = self.generation, "Cancelled timer");
        }
    }

    /// Whether a message tagged `generation` comes from the task this slot holds.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && self.generation == generation
    }

    /// Accept a message from the current task and release the slot.
    ///
    /// Returns false for messages from replaced or cancelled tasks.
    pub(crate) fn consume(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.handle = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
