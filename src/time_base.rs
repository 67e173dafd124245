//! Local wall clock derived from a time anchor
//!
//! The anchor pairs an absolute time (local seconds since the Unix epoch)
//! with the monotonic instant it was taken at. Current wall time is the
//! anchor plus the monotonic time elapsed since, so the reading advances
//! even when the network is gone. Only [`TimeBase::synchronize`] moves the
//! anchor.

use core::fmt;

use embassy_time::{Duration, Instant};

use crate::error::ClockError;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_DAY_SIGNED: i64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const NOON: u32 = 12 * 3_600;

/// Hour display convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HourFormat {
    /// Hours 1-12
    #[default]
    Twelve,
    /// Hours 0-23
    TwentyFour,
}

/// Configuration for the time base
#[derive(Debug, Clone, Copy)]
pub struct TimeConfig {
    /// How long a synchronization stays fresh
    pub resync_interval: Duration,
    /// Offset of local time from UTC, in seconds
    pub utc_offset_secs: i32,
    pub hour_format: HourFormat,
    /// Seconds of day shown before the first successful sync
    pub fallback_seconds_of_day: u32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            resync_interval: Duration::from_secs(3_600),
            utc_offset_secs: 0,
            hour_format: HourFormat::Twelve,
            fallback_seconds_of_day: NOON,
        }
    }
}

/// Absolute UTC calendar time delivered by a time source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSample {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeSample {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Convert to seconds since 1970-01-01 00:00:00 UTC
    ///
    /// Returns `None` if the fields do not form a valid date and time
    /// at or after the epoch.
    pub const fn to_epoch_seconds(&self) -> Option<u64> {
        if self.year < 1970
            || self.month == 0
            || self.month > 12
            || self.day == 0
            || self.day > days_in_month(self.year, self.month)
            || self.hour > 23
            || self.minute > 59
            || self.second > 59
        {
            return None;
        }

        let days = days_since_epoch(self.year, self.month, self.day);
        Some(
            days * SECONDS_PER_DAY
                + self.hour as u64 * SECONDS_PER_HOUR
                + self.minute as u64 * 60
                + self.second as u64,
        )
    }
}

const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Days from 1970-01-01 to the given civil date (proleptic Gregorian)
#[allow(clippy::cast_sign_loss)]
const fn days_since_epoch(year: u16, month: u8, day: u8) -> u64 {
    // Years start in March so the leap day is the last day of the year
    let year = if month <= 2 { year as i64 - 1 } else { year as i64 };
    let era = year / 400;
    let year_of_era = year - era * 400;
    let month_from_march = (month as i64 + 9) % 12;
    let day_of_year = (153 * month_from_march + 2) / 5 + day as i64 - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    (era * 146_097 + day_of_era - 719_468) as u64
}

/// Absolute time paired with the monotonic instant it refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAnchor {
    /// Local seconds since the Unix epoch at `monotonic`
    pub epoch_seconds: u64,
    pub monotonic: Instant,
}

impl TimeAnchor {
    /// Local epoch seconds at `now`
    pub fn epoch_at(&self, now: Instant) -> u64 {
        self.epoch_seconds + now.saturating_duration_since(self.monotonic).as_secs()
    }
}

/// Time of day as shown on the clock face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    /// 1-12 in twelve-hour format, 0-23 otherwise
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    /// Hour of day is 12 or later
    pub is_pm: bool,
}

impl ClockReading {
    /// Derive a reading from local epoch seconds
    ///
    /// Only the seconds of day matter, so day rollover wraps to midnight.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_epoch_seconds(epoch_seconds: u64, format: HourFormat) -> Self {
        let seconds_of_day = epoch_seconds % SECONDS_PER_DAY;
        let hour_of_day = (seconds_of_day / SECONDS_PER_HOUR) as u8;
        let minutes = ((seconds_of_day % SECONDS_PER_HOUR) / 60) as u8;
        let seconds = (seconds_of_day % 60) as u8;

        let hours = match format {
            HourFormat::Twelve => (hour_of_day + 11) % 12 + 1,
            HourFormat::TwentyFour => hour_of_day,
        };

        Self {
            hours,
            minutes,
            seconds,
            is_pm: hour_of_day >= 12,
        }
    }
}

impl fmt::Display for ClockReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02} {}",
            self.hours,
            self.minutes,
            self.seconds,
            if self.is_pm { "PM" } else { "AM" }
        )
    }
}

/// Hour of day (0-23) for local epoch seconds
#[allow(clippy::cast_possible_truncation)]
pub const fn hour_of_day(epoch_seconds: u64) -> u8 {
    ((epoch_seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR) as u8
}

/// Monotonic local clock with periodic resynchronization
#[derive(Debug, Clone)]
pub struct TimeBase {
    anchor: TimeAnchor,
    format: HourFormat,
    utc_offset_secs: i32,
    resync_interval: Duration,
    created: Instant,
    last_sync: Option<Instant>,
}

impl TimeBase {
    /// Create a time base anchored at the fallback time of day
    pub fn new(config: &TimeConfig, now: Instant) -> Self {
        Self {
            anchor: TimeAnchor {
                epoch_seconds: u64::from(config.fallback_seconds_of_day) % SECONDS_PER_DAY,
                monotonic: now,
            },
            format: config.hour_format,
            utc_offset_secs: config.utc_offset_secs,
            resync_interval: config.resync_interval,
            created: now,
            last_sync: None,
        }
    }

    /// Replace the anchor with `sample` taken at `now`
    ///
    /// Any drift accumulated since the previous anchor is discarded.
    /// An invalid sample leaves the anchor untouched.
    pub fn synchronize(&mut self, sample: &TimeSample, now: Instant) -> Result<(), ClockError> {
        let utc = sample
            .to_epoch_seconds()
            .ok_or(ClockError::InvalidTimeSample)?;
        let local = i64::try_from(utc)
            .unwrap_or(i64::MAX)
            .saturating_add(i64::from(self.utc_offset_secs));

        // Before the epoch only the time of day is kept
        let epoch_seconds = u64::try_from(local)
            .unwrap_or_else(|_| local.rem_euclid(SECONDS_PER_DAY_SIGNED).unsigned_abs());

        self.anchor = TimeAnchor {
            epoch_seconds,
            monotonic: now,
        };
        self.last_sync = Some(now);
        Ok(())
    }

    /// Current reading
    pub fn now(&self, now: Instant) -> ClockReading {
        ClockReading::from_epoch_seconds(self.epoch_seconds(now), self.format)
    }

    /// Local epoch seconds at `now`
    pub fn epoch_seconds(&self, now: Instant) -> u64 {
        self.anchor.epoch_at(now)
    }

    /// Check whether the resync interval has elapsed
    ///
    /// Counts from the last successful sync, or from creation if there was
    /// none. Stays true until [`TimeBase::synchronize`] succeeds.
    pub fn needs_resync(&self, now: Instant) -> bool {
        let since = self.last_sync.unwrap_or(self.created);
        now.saturating_duration_since(since) >= self.resync_interval
    }

    /// Check whether any sync has succeeded
    pub const fn has_synced(&self) -> bool {
        self.last_sync.is_some()
    }

    pub const fn last_sync(&self) -> Option<Instant> {
        self.last_sync
    }

    pub const fn anchor(&self) -> TimeAnchor {
        self.anchor
    }

    pub const fn format(&self) -> HourFormat {
        self.format
    }
}
