use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use bon::Builder;

use crate::Result;
use crate::error::Error;

const DEFAULT_MAX_LIMIT: usize = 100;
const DEFAULT_MEMORY_CAPACITY: usize = 2000;
const DEFAULT_BASE_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(64);
const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;
const DEFAULT_JITTER_FACTOR: f64 = 0.1;
const DEFAULT_BACKTRACK_DEPTH_THRESHOLD: usize = 400;
const DEFAULT_TARGET_LIMIT_MULTIPLIER: f64 = 2.0;

/// Tuning knobs for a [`Stream`](super::Stream).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use reddit_client_sdk::stream::Config;
///
/// let config = Config::builder()
///     .max_limit(50)
///     .base_interval(Duration::from_secs(2))
///     .build();
///
/// assert!(config.validate().is_ok());
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct Config {
    /// Largest page size ever requested from the paginator
    #[builder(default = DEFAULT_MAX_LIMIT)]
    pub max_limit: usize,
    /// Number of item identities remembered for de-duplication
    #[builder(default = DEFAULT_MEMORY_CAPACITY)]
    pub memory_capacity: usize,
    /// Polling delay while healthy, and the floor of the backoff delay
    #[builder(default = DEFAULT_BASE_INTERVAL)]
    pub base_interval: Duration,
    /// Ceiling of the backoff delay
    #[builder(default = DEFAULT_MAX_INTERVAL)]
    pub max_interval: Duration,
    /// Multiplier applied to the delay after each failed fetch
    #[builder(default = DEFAULT_BACKOFF_FACTOR)]
    pub backoff_factor: f64,
    /// Relative spread of the random jitter applied to waits, in `[0, 1]`
    #[builder(default = DEFAULT_JITTER_FACTOR)]
    pub jitter_factor: f64,
    /// Items emitted since the last cursor reset before a reset is forced
    #[builder(default = DEFAULT_BACKTRACK_DEPTH_THRESHOLD)]
    pub backtrack_depth_threshold: usize,
    /// Page size target relative to the number of new items found in a partial page
    #[builder(default = DEFAULT_TARGET_LIMIT_MULTIPLIER)]
    pub target_limit_multiplier: f64,
    /// Wait yielded while the paginator still holds a forward cursor
    #[builder(default = Duration::ZERO)]
    pub drain_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Config {
    /// Checks the configuration for values the control loop cannot work with.
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::Validation`](crate::error::Kind::Validation) error naming the first
    /// offending field.
    pub fn validate(&self) -> Result<()> {
        if self.max_limit == 0 {
            return Err(Error::validation("max_limit must be at least 1"));
        }
        if self.memory_capacity == 0 {
            return Err(Error::validation("memory_capacity must be at least 1"));
        }
        if self.base_interval > self.max_interval {
            return Err(Error::validation(format!(
                "base_interval ({:?}) must not exceed max_interval ({:?})",
                self.base_interval, self.max_interval
            )));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(Error::validation(format!(
                "backoff_factor must be a finite value of at least 1, got {}",
                self.backoff_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(Error::validation(format!(
                "jitter_factor must be within [0, 1], got {}",
                self.jitter_factor
            )));
        }
        if !self.target_limit_multiplier.is_finite() || self.target_limit_multiplier <= 0.0 {
            return Err(Error::validation(format!(
                "target_limit_multiplier must be positive, got {}",
                self.target_limit_multiplier
            )));
        }

        Ok(())
    }
}

impl From<&Config> for ExponentialBackoff {
    fn from(config: &Config) -> Self {
        ExponentialBackoffBuilder::default()
            .with_initial_interval(config.base_interval)
            .with_max_interval(config.max_interval)
            .with_multiplier(config.backoff_factor)
            .with_randomization_factor(config.jitter_factor)
            .with_max_elapsed_time(None) // Streams retry forever
            .build()
    }
}
