//! Background expiry sweeper
//!
//! Lazy expiration already hides expired values; the sweeper only reclaims
//! their memory for keys nobody touches again.

use super::MemoryStorage;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Spawn a task that purges expired values every `interval`
///
/// Must be called from within a tokio runtime. The task runs until it is
/// aborted or the storage reports a fault.
pub fn spawn(storage: Arc<MemoryStorage>, interval: Duration) -> JoinHandle<()> {
    let interval = interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        info!("Expiry sweeper started ({:?} interval)", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match storage.purge_expired() {
                Ok(0) => {}
                Ok(removed) => debug!("Expiry sweep removed {} keys", removed),
                Err(e) => {
                    error!("Expiry sweeper stopping: {}", e);
                    break;
                }
            }
        }
    })
}
