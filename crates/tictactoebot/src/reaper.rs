//! Background retirement of abandoned boards.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::SessionRegistry;

impl SessionRegistry {
    /// Spawns a task that retires boards idle for `max_idle`, checking every
    /// `interval`. Abort the handle to stop it.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(self))]
    pub fn spawn_reaper(self: &Arc<Self>, interval: Duration, max_idle: Duration) -> JoinHandle<()> {
        info!("Starting session reaper");
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle(max_idle);
                if !evicted.is_empty() {
                    debug!(reaped = evicted.len(), "reaped idle sessions");
                }
            }
        })
    }
}
