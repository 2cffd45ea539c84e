use std::time::Duration;

/// Configures the per-attempt deadline and retry behavior of the executor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutorConfig {
    /// Deadline for a single attempt in milliseconds.
    pub timeout_ms: u64,
    /// Flat delay before retrying after a transport error, in milliseconds.
    ///
    /// Retries after a deadline expiry start immediately.
    pub retry_delay_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
}

impl ExecutorConfig {
    pub fn per_attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            retry_delay_ms: 3_000,
            max_retries: 5,
        }
    }
}
