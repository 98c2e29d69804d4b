//! Config for the referee behaviors
//!
//! This module provides the timing constants used while running a match.
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! The following environment variables can be used to override configuration values. All
//! values are optional. Unset or unparsable values keep their default.
//!
//! - `REFEREE_MOVE_TIME_LIMIT_MS` — Nominal time a player has to answer (default: `3000`)
//! - `REFEREE_GRACE_FACTOR` — Multiplier applied to the time limit to get the hard deadline (default: `1.1`)
//! - `REFEREE_RETRY_DELAY_MS` — Pause after a player could not be reached (default: `3000`)
//! - `REFEREE_TICK_INTERVAL_MS` — Minimum time between two turns (default: `0`)
//! - `REFEREE_LOG` — Enable logging to a file, set to `"true"` (default: `false`)

use std::time::Duration;

/// Configuration for referee behaviors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    pub(crate) move_time_limit: Duration,
    pub(crate) grace_factor: f64,
    pub(crate) retry_delay: Duration,
    pub(crate) tick_interval: Duration,
    pub(crate) log: bool,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - Players have 3 seconds to answer, with a 10% grace period.
    /// - An unreachable player is given 3 seconds before being asked again.
    /// - Turns are not paced.
    /// - Logging to file is disabled.
    pub fn new() -> Self {
        Self {
            move_time_limit: Duration::from_secs(3),
            grace_factor: 1.1,
            retry_delay: Duration::from_secs(3),
            tick_interval: Duration::ZERO,
            log: false,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// See the [module documentation](self) for the recognized variables.
    pub fn from_env() -> Self {
        fn get_env_millis(var: &str) -> Option<Duration> {
            std::env::var(var)
                .ok()?
                .parse::<u64>()
                .ok()
                .map(Duration::from_millis)
        }

        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        let default = Self::new();
        Self {
            move_time_limit: get_env_millis("REFEREE_MOVE_TIME_LIMIT_MS")
                .unwrap_or(default.move_time_limit),
            grace_factor: std::env::var("REFEREE_GRACE_FACTOR")
                .ok()
                .and_then(|val| val.parse::<f64>().ok())
                .filter(|factor| factor.is_finite() && *factor >= 1.0)
                .unwrap_or(default.grace_factor),
            retry_delay: get_env_millis("REFEREE_RETRY_DELAY_MS").unwrap_or(default.retry_delay),
            tick_interval: get_env_millis("REFEREE_TICK_INTERVAL_MS")
                .unwrap_or(default.tick_interval),
            log: get_env_flag("REFEREE_LOG", default.log),
        }
    }

    /// Set the nominal time a player has to answer a turn request.
    pub fn with_move_time_limit(mut self, value: Duration) -> Self {
        self.move_time_limit = value;
        self
    }

    /// Set the factor applied to the move time limit to obtain the hard deadline.
    ///
    /// Values lower than `1.0`, and NaN, are raised to `1.0`.
    pub fn with_grace_factor(mut self, value: f64) -> Self {
        self.grace_factor = value.max(1.0);
        self
    }

    /// Set the pause observed after a player could not be reached.
    pub fn with_retry_delay(mut self, value: Duration) -> Self {
        self.retry_delay = value;
        self
    }

    /// Set the minimum time between the start of two turns. `Duration::ZERO` disables pacing.
    pub fn with_tick_interval(mut self, value: Duration) -> Self {
        self.tick_interval = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Nominal time a player has to answer
    pub fn move_time_limit(&self) -> Duration {
        self.move_time_limit
    }

    /// Hard deadline for a turn: the move time limit extended by the grace factor.
    ///
    /// Saturates at [`Duration::MAX`].
    pub fn deadline(&self) -> Duration {
        Duration::try_from_secs_f64(self.move_time_limit.as_secs_f64() * self.grace_factor)
            .unwrap_or(Duration::MAX)
    }

    /// Pause observed after a player could not be reached
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Minimum time between two turns
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
