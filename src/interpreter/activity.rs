//! Long-lived background effects tied to state entry and exit.
//!
//! An activity starts some external process (observing a document event,
//! polling a signal) and returns a cleanup. The manager wraps every cleanup
//! in an [`ActivityHandle`] whose `stop` consumes it, so a cleanup runs at
//! most once no matter how the state is left.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::core::{Context, EventSender};
use crate::machine::{ActivityFn, Cleanup};

/// Handle to one running activity. Stopping is at-most-once by
/// construction; dropping an unstopped handle also runs the cleanup.
pub struct ActivityHandle {
    name: String,
    cleanup: Option<Cleanup>,
}

impl ActivityHandle {
    pub(crate) fn new(name: impl Into<String>, cleanup: Cleanup) -> Self {
        Self {
            name: name.into(),
            cleanup: Some(cleanup),
        }
    }

    /// The activity's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the cleanup. Subsequent calls are no-ops.
    pub fn stop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            trace!(activity = %self.name, "activity stopped");
            cleanup();
        }
    }
}

impl Drop for ActivityHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for ActivityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityHandle")
            .field("name", &self.name)
            .field("stopped", &self.cleanup.is_none())
            .finish()
    }
}

/// Tracks the activities started for the current state.
#[derive(Debug, Default)]
pub(crate) struct ActivityManager {
    running: Vec<ActivityHandle>,
}

impl ActivityManager {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start an activity and track its handle.
    pub(crate) fn start(
        &mut self,
        name: &str,
        activity: &Arc<ActivityFn>,
        ctx: &Context,
        sender: EventSender,
    ) {
        trace!(activity = name, "activity started");
        let cleanup = activity(ctx, sender);
        self.running.push(ActivityHandle::new(name, cleanup));
    }

    /// Stop everything started since the last `stop_all`, in start order.
    pub(crate) fn stop_all(&mut self) {
        for handle in &mut self.running {
            handle.stop();
        }
        self.running.clear();
    }

    #[cfg(test)]
    fn running(&self) -> usize {
        self.running.len()
    }
}
