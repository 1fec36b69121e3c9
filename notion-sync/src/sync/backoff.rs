use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    factor: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(factor: Duration, max: Duration) -> Self {
        Self { factor, max }
    }

    /// Delay before retry `attempt` (1-based): `factor * 2^(attempt - 1)`,
    /// clamped to `max`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor_ms = self.factor.as_millis().min(u128::from(u64::MAX)) as u64;
        let max_ms = self.max.as_millis().min(u128::from(u64::MAX)) as u64;
        let shift = attempt.saturating_sub(1).min(16);
        let delay_ms = factor_ms.saturating_mul(1u64 << shift).min(max_ms);
        Duration::from_millis(delay_ms)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(32))
    }
}

/// Waiting primitive used between retries. Injected so the retry loop
/// can run in tests without real elapsed time.
pub trait Waiter: Send + Sync {
    fn wait(&self, delay: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioWaiter;

impl Waiter for TokioWaiter {
    fn wait(&self, delay: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(delay)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWaiter;

impl Waiter for NoopWaiter {
    fn wait(&self, _delay: Duration) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }
}
