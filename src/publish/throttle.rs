//! Minimum spacing between publish calls

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Enforces a fixed delay between successive posts
///
/// One throttle is shared by everything publishing for an account, so the
/// spacing holds across records and backends.
#[derive(Debug)]
pub struct PublishThrottle {
    delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl PublishThrottle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep until `delay` has passed since the previous call returned
    pub async fn wait(&self) {
        let pause = self
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|last| self.delay.saturating_sub(last.elapsed()));

        if let Some(pause) = pause.filter(|p| !p.is_zero()) {
            debug!("Waiting {:?} before next post", pause);
            tokio::time::sleep(pause).await;
        }

        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }
}
