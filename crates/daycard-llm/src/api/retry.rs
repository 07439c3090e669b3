//! Attempt budget with exponential backoff and jitter.
//!
//! A run gets a fixed number of attempts. Every failed attempt (transport
//! error, malformed output, rejected output) spends one, and the caller waits
//! [`RetryConfig::delay_before_attempt`] before the next.

use std::time::Duration;

/// Default attempt budget for one run.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts allowed, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
    /// Backoff multiplier (typically 2.0 for exponential backoff).
    pub multiplier: f64,
    /// Whether to shave a deterministic fraction off each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a config with the given attempt budget and default backoff.
    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            max_attempts: attempts,
            ..Default::default()
        }
    }

    /// A config that retries back to back, without sleeping.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            max_attempts: attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
            jitter: false,
        }
    }

    /// Delay to wait before `attempt` (1-indexed). The first attempt never waits.
    pub fn delay_before_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let step = attempt - 2;
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(step as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        if self.jitter {
            // Fixed per-step factors keep runs reproducible without pulling in rand.
            let jitter_factor = match step % 4 {
                0 => 0.75,
                1 => 0.90,
                2 => 0.60,
                _ => 0.85,
            };
            Duration::from_secs_f64(capped * jitter_factor)
        } else {
            Duration::from_secs_f64(capped)
        }
    }

    /// Whether `attempt` (1-indexed) is still inside the budget.
    pub fn allows(&self, attempt: u32) -> bool {
        (1..=self.max_attempts).contains(&attempt)
    }
}
