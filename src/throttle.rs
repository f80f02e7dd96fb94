//! Fixed-interval call gating for rate-limited providers.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// A gate that enforces a minimum interval between consecutive calls.
///
/// Callers `await` [`wait`](FixedIntervalGate::wait) before each provider
/// call; the gate sleeps as needed so that no two calls through it start
/// less than `interval` apart. Concurrent callers are serialized through
/// the gate, so it throttles only the client that owns it — it is not a
/// global lock.
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use docqa::FixedIntervalGate;
///
/// let gate = FixedIntervalGate::new(Duration::from_millis(200));
/// gate.wait().await; // first call passes immediately
/// gate.wait().await; // second call waits out the remainder of 200ms
/// ```
#[derive(Debug)]
pub struct FixedIntervalGate {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl FixedIntervalGate {
    /// Create a gate enforcing the given minimum interval between calls.
    pub fn new(interval: Duration) -> Self {
        Self { interval, next_slot: Mutex::new(None) }
    }

    /// The configured minimum interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next call slot is available, then claim it.
    pub async fn wait(&self) {
        let mut next_slot = self.next_slot.lock().await;
        if let Some(slot) = *next_slot {
            sleep_until(slot).await;
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}
