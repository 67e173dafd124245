#![no_std]

pub mod bcd;
pub mod buffer;
pub mod button;
pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod math8;
pub mod output;
pub mod pattern;
pub mod scheduler;
pub mod time_base;
pub mod time_source;
pub mod transition;

pub use bcd::{BcdLayout, BcdRenderer, SecondsPhase};
pub use buffer::{MATRIX_SIZE, PIXEL_COUNT, PixelBuffer, coords_to_index, index_to_coords};
pub use button::{ButtonEvent, ButtonInput, Polarity};
pub use clock::{BcdClock, DisplayState};
pub use color::Rgb;
pub use config::{ButtonConfig, ClockConfig, ClockPalette, DayHours, FadeTimings, TimeConfig};
pub use error::{ClockError, ConfigError};
pub use output::{FULL_BRIGHTNESS, SmartLedsOutput};
pub use pattern::{Cross, Pattern, Solid};
pub use scheduler::{Scheduler, TickResult};
pub use time_base::{ClockReading, HourFormat, TimeAnchor, TimeBase, TimeSample};
pub use time_source::{LinkHealth, TimeSource};
pub use transition::{Crossfade, TransitionEngine};

pub use embassy_time::{Duration, Instant};

/// Abstract LED driver trait
///
/// Implement this trait to support different hardware platforms.
/// The matrix is pushed as one linear slice of 64 colors in
/// column-major order.
pub trait OutputDriver {
    /// Write colors to the LED matrix
    fn write(&mut self, colors: &[Rgb]);
}

/// Monotonic time and blocking delays
///
/// Everything that paces itself (button polling, crossfade frames, the
/// refresh loop) goes through this trait, so the core never reads a global
/// clock on its own.
pub trait MonotonicClock {
    /// Current monotonic instant
    fn now(&self) -> Instant;

    /// Block the caller for `duration`
    fn sleep(&mut self, duration: Duration);
}

/// [`MonotonicClock`] backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        embassy_time::block_for(duration);
    }
}
