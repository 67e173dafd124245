//! Clock configuration
//!
//! Every tunable the clock depends on is injected through [`ClockConfig`].
//! Defaults follow the values the matrix clock has been running with.

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::color::{Rgb, rgb_from_u32};
use crate::error::ConfigError;

pub use crate::button::ButtonConfig;
pub use crate::time_base::TimeConfig;
pub use crate::transition::FadeTimings;

/// Default refresh period of the clock loop
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(50);

/// Colors used by the clock face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockPalette {
    /// Hours and minutes during the day
    pub day: Rgb,
    /// Hours and minutes outside the day hours
    pub night: Rgb,
    /// Seconds, regardless of the time of day
    pub seconds: Rgb,
    /// Animated row of the seconds blocks
    pub seconds_accent: Rgb,
    /// Error indicator
    pub error: Rgb,
}

impl Default for ClockPalette {
    fn default() -> Self {
        Self {
            day: rgb_from_u32(0x00_00_64),
            night: rgb_from_u32(0x14_00_00),
            seconds: rgb_from_u32(0x00_32_32),
            seconds_accent: rgb_from_u32(0x00_50_50),
            error: rgb_from_u32(0x64_00_00),
        }
    }
}

/// Range of hours using the day color
///
/// `start` is inclusive and `end` exclusive. When `start > end` the range
/// wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    pub start: u8,
    pub end: u8,
}

impl DayHours {
    /// Check whether an hour of day (0-23) falls in the range
    pub const fn contains(self, hour: u8) -> bool {
        if self.start <= self.end {
            hour >= self.start && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }

    const fn is_valid(self) -> bool {
        self.start < 24 && self.end <= 24 && self.start != self.end
    }
}

impl Default for DayHours {
    fn default() -> Self {
        Self { start: 6, end: 22 }
    }
}

/// Configuration for the whole clock
#[derive(Debug, Clone)]
pub struct ClockConfig {
    pub time: TimeConfig,
    pub button: ButtonConfig,
    pub timings: FadeTimings,
    pub palette: ClockPalette,
    pub day_hours: DayHours,
    /// Render the two seconds columns
    pub show_seconds: bool,
    /// Alternate an accented row in the seconds blocks every half second
    pub animate_seconds: bool,
    /// Period of the main loop
    pub refresh_interval: Duration,
    /// Consecutive sync failures reported as a warning before an error
    pub warning_failures: u8,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time: TimeConfig::default(),
            button: ButtonConfig::default(),
            timings: FadeTimings::default(),
            palette: ClockPalette::default(),
            day_hours: DayHours::default(),
            show_seconds: true,
            animate_seconds: true,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            warning_failures: 2,
        }
    }
}

impl ClockConfig {
    /// Check the configuration for values the clock cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let result = self.check();
        #[cfg(feature = "esp32-log")]
        if let Err(error) = result {
            println!("[ClockConfig.validate] rejected: {}", error);
        }
        result
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.time.resync_interval.as_ticks() == 0 {
            return Err(ConfigError::ZeroResyncInterval);
        }
        if self.timings.step.as_ticks() == 0 {
            return Err(ConfigError::ZeroFadeStep);
        }
        self.button.validate()?;
        if !self.day_hours.is_valid() {
            return Err(ConfigError::InvalidDayHours);
        }
        Ok(())
    }
}
