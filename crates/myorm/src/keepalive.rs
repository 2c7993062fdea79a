//! Background connection keep-alive.

use crate::client::Executor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Statement issued on every poll.
pub const KEEP_ALIVE_SQL: &str = "SHOW TABLES";

/// Run/stop flags shared between the facade and the poll task.
#[derive(Debug, Default)]
pub(crate) struct KeepAliveState {
    should_run: AtomicBool,
    running: AtomicBool,
}

impl KeepAliveState {
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn stop(&self) {
        self.should_run.store(false, Ordering::Release);
    }

    /// Start polling unless a poll task is already alive.
    ///
    /// The task checks the stop flag once per interval, so it may issue one
    /// more poll after [`KeepAliveState::stop`].
    pub(crate) fn start<E>(
        self: &Arc<Self>,
        executor: E,
        interval: Duration,
    ) -> Option<JoinHandle<()>>
    where
        E: Executor + 'static,
    {
        self.should_run.store(true, Ordering::Release);
        if self.running.swap(true, Ordering::AcqRel) {
            return None;
        }

        let state = Arc::clone(self);
        Some(tokio::spawn(async move {
            while state.should_run.load(Ordering::Acquire) {
                tokio::time::sleep(interval).await;
                if let Err(err) = executor.query(KEEP_ALIVE_SQL).await {
                    tracing::warn!(
                        target: "myorm.keepalive",
                        error = %err,
                        "keep-alive poll failed, stopping"
                    );
                    break;
                }
            }
            state.running.store(false, Ordering::Release);
        }))
    }
}
