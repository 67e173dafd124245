//! Error types
//!
//! [`ConfigError`] is returned once, at startup, and is meant to stop the
//! firmware from booting into a clock that can never react to its button.
//! [`ClockError`] is recovered inside the loop iteration that produced it.

/// Startup configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Resync interval is zero
    ZeroResyncInterval,

    /// Crossfade frame step is zero
    ZeroFadeStep,

    /// Button poll interval is zero or longer than 10 ms
    InvalidPollInterval,

    /// Debounce window is not shorter than the long-press threshold
    DebounceNotBelowLongPress,

    /// Day hours are outside `0..24` or empty
    InvalidDayHours,

    /// Button reads active for the whole startup probe
    ///
    /// Usually means the configured polarity does not match the wiring.
    ButtonStuckActive,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroResyncInterval => {
                write!(f, "resync interval must be greater than zero")
            }
            ConfigError::ZeroFadeStep => write!(f, "fade step must be greater than zero"),
            ConfigError::InvalidPollInterval => {
                write!(f, "button poll interval must be between 1 tick and 10ms")
            }
            ConfigError::DebounceNotBelowLongPress => {
                write!(f, "debounce window must be shorter than the long-press threshold")
            }
            ConfigError::InvalidDayHours => {
                write!(f, "day hours must be distinct values in 0..24")
            }
            ConfigError::ButtonStuckActive => {
                write!(f, "button reads active at startup, check polarity and wiring")
            }
        }
    }
}

/// Runtime errors recovered by the clock loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The network time source returned nothing
    TimeSourceUnavailable,

    /// The time source returned calendar fields that do not form a date
    InvalidTimeSample,
}

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ClockError::TimeSourceUnavailable => write!(f, "time source unavailable"),
            ClockError::InvalidTimeSample => write!(f, "invalid time sample"),
        }
    }
}
