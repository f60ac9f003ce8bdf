//! Deadline-bounded condition polling
//!
//! `Eventually` re-runs a condition until it reports success or the timeout
//! elapses. The condition is always polled at least once and polls are
//! separated by a fixed backoff.

use framecheck_core::AssertionError;
use std::fmt::Display;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Pause between two polls
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// The condition holds
    Done,

    /// The condition does not hold yet; carries what was observed
    NotYet(String),
}

impl Attempt {
    pub fn not_yet(observation: impl Display) -> Self {
        Self::NotYet(observation.to_string())
    }
}

impl From<bool> for Attempt {
    fn from(value: bool) -> Self {
        if value {
            Self::Done
        } else {
            Self::NotYet(value.to_string())
        }
    }
}

impl From<()> for Attempt {
    fn from(_: ()) -> Self {
        Self::Done
    }
}

/// Retry errors
#[derive(Debug, Error)]
pub enum RetryError {
    #[error("Test failed due to timeout after {timeout:?}, with last condition returning: {last_observed}")]
    TimedOut {
        timeout: Duration,
        last_observed: String,
    },

    #[error(transparent)]
    Assertion(#[from] AssertionError),

    #[error("Timeout must be greater than zero")]
    InvalidTimeout,
}

/// Polls a condition until it succeeds or the deadline passes
#[derive(Debug, Clone)]
pub struct Eventually {
    timeout: Duration,
    catch_assertions: bool,
    poll_interval: Duration,
}

enum Observation {
    Value(String),
    Failure(AssertionError),
}

impl Eventually {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            catch_assertions: false,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Treat assertion failures as "not yet" instead of propagating them
    pub fn catch_assertions(mut self, catch_assertions: bool) -> Self {
        self.catch_assertions = catch_assertions;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Poll `condition` until it reports success
    ///
    /// On timeout, a caught assertion failure is returned as is; any other
    /// last observation is reported through `RetryError::TimedOut`.
    pub fn run<F, A>(&self, mut condition: F) -> Result<(), RetryError>
    where
        F: FnMut() -> Result<A, AssertionError>,
        A: Into<Attempt>,
    {
        if self.timeout.is_zero() {
            return Err(RetryError::InvalidTimeout);
        }

        let start = Instant::now();
        let mut attempts = 0usize;
        let last = loop {
            attempts += 1;
            let observation = match condition() {
                Ok(outcome) => match outcome.into() {
                    Attempt::Done => {
                        tracing::debug!(attempts, elapsed = ?start.elapsed(), "condition met");
                        return Ok(());
                    }
                    Attempt::NotYet(observed) => Observation::Value(observed),
                },
                Err(err) if self.catch_assertions => Observation::Failure(err),
                Err(err) => return Err(RetryError::Assertion(err)),
            };

            match &observation {
                Observation::Value(observed) => {
                    tracing::trace!(attempt = attempts, %observed, "condition not met")
                }
                Observation::Failure(err) => {
                    tracing::trace!(attempt = attempts, error = %err, "condition failed")
                }
            }

            std::thread::sleep(self.poll_interval);
            if start.elapsed() >= self.timeout {
                break observation;
            }
        };

        tracing::debug!(attempts, timeout = ?self.timeout, "condition timed out");
        match last {
            Observation::Failure(err) => Err(RetryError::Assertion(err)),
            Observation::Value(last_observed) => Err(RetryError::TimedOut {
                timeout: self.timeout,
                last_observed,
            }),
        }
    }
}

/// Shorthand for `Eventually::new(timeout).catch_assertions(..).run(..)`
pub fn eventually<F, A>(timeout: Duration, catch_assertions: bool, condition: F) -> Result<(), RetryError>
where
    F: FnMut() -> Result<A, AssertionError>,
    A: Into<Attempt>,
{
    Eventually::new(timeout)
        .catch_assertions(catch_assertions)
        .run(condition)
}
