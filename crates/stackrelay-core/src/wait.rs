//! Delay schedules between status polls
//!
//! `attempt` is the number of polls already made (1 after the first poll).
//! Returning `None` tells the driver to stop polling.

use stackrelay_config::{PollConfig, PollStrategy};
use std::time::Duration;

pub trait WaitStrategy: Send + Sync {
    fn next_delay(&self, attempt: u32) -> Option<Duration>;
}

impl<W: WaitStrategy + ?Sized> WaitStrategy for Box<W> {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        (**self).next_delay(attempt)
    }
}

/// Same delay forever
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInterval(pub Duration);

impl Default for FixedInterval {
    fn default() -> Self {
        Self(Duration::from_secs(10))
    }
}

impl WaitStrategy for FixedInterval {
    fn next_delay(&self, _attempt: u32) -> Option<Duration> {
        Some(self.0)
    }
}

/// `initial * factor^(attempt - 1)`, capped at `max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    pub initial: Duration,
    pub max: Duration,
    pub factor: u32,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            factor: 2,
        }
    }
}

impl WaitStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        let exponent = attempt.saturating_sub(1);
        let delay = self
            .factor
            .checked_pow(exponent)
            .and_then(|multiplier| self.initial.checked_mul(multiplier))
            .unwrap_or(self.max);
        Some(delay.min(self.max))
    }
}

/// Caps another strategy by poll count and/or total time spent waiting.
///
/// The wait budget counts scheduled delays, not wall-clock time spent in
/// API calls. The last delay is shortened so the final poll lands on the
/// budget instead of past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounded<W> {
    inner: W,
    max_attempts: Option<u32>,
    budget: Option<Duration>,
}

impl<W: WaitStrategy> Bounded<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            max_attempts: None,
            budget: None,
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    fn spent_before(&self, attempt: u32) -> Duration {
        (1..attempt)
            .filter_map(|n| self.inner.next_delay(n))
            .fold(Duration::ZERO, |total, d| total.saturating_add(d))
    }
}

impl<W: WaitStrategy> WaitStrategy for Bounded<W> {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return None;
            }
        }

        let delay = self.inner.next_delay(attempt)?;

        match self.budget {
            Some(budget) => {
                let remaining = budget.checked_sub(self.spent_before(attempt))?;
                if remaining.is_zero() {
                    None
                } else {
                    Some(delay.min(remaining))
                }
            }
            None => Some(delay),
        }
    }
}

/// Build the strategy described by `[poll]` configuration
pub fn from_config(config: &PollConfig) -> Box<dyn WaitStrategy> {
    let base: Box<dyn WaitStrategy> = match config.strategy {
        PollStrategy::Fixed => Box::new(FixedInterval(config.interval())),
        PollStrategy::Exponential => {
            Box::new(ExponentialBackoff::new(config.interval(), config.max_interval()))
        }
    };

    if !config.is_bounded() {
        return base;
    }

    let mut bounded = Bounded::new(base);
    if let Some(max) = config.max_attempts {
        bounded = bounded.max_attempts(max);
    }
    if let Some(timeout) = config.timeout() {
        bounded = bounded.budget(timeout);
    }
    Box::new(bounded)
}
