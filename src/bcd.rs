//! BCD clock face
//!
//! Column map of the 8x8 matrix (row 0 is the bottom, bit 0 lights rows 0-1):
//!
//! | columns | field                     | bits | block |
//! |---------|---------------------------|------|-------|
//! | 0-1     | hours (12h, binary 1-12)  | 4    | 2x2   |
//! | 0       | hour tens (24h)           | 2    | 1x2   |
//! | 1       | hour units (24h)          | 4    | 1x2   |
//! | 2-3     | minute tens               | 3    | 2x2   |
//! | 4-5     | minute units              | 4    | 2x2   |
//! | 6       | second tens               | 3    | 1x2   |
//! | 7       | second units              | 4    | 1x2   |
//!
//! No two fields share a cell.
//!
//! With the seconds animation on, one row of every lit seconds block takes
//! the accent color. The accented row alternates each [`SecondsPhase`].

use embassy_time::{Duration, Instant};

use crate::buffer::PixelBuffer;
use crate::color::{BLACK, Rgb};
use crate::config::{ClockConfig, ClockPalette, DayHours};
use crate::time_base::{ClockReading, HourFormat, hour_of_day};

/// Rows covered by one bit
const ROWS_PER_BIT: u8 = 2;

/// Half-second phase of the seconds animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecondsPhase {
    /// Bottom row of each lit block accented
    #[default]
    Bottom,
    /// Top row of each lit block accented
    Top,
}

impl SecondsPhase {
    /// Length of one phase
    pub const PERIOD: Duration = Duration::from_millis(500);

    /// Phase at a monotonic instant
    pub fn at(now: Instant) -> Self {
        if (now.as_ticks() / Self::PERIOD.as_ticks()) % 2 == 0 {
            Self::Bottom
        } else {
            Self::Top
        }
    }

    /// Row offset within a block
    const fn row(self) -> u8 {
        match self {
            Self::Bottom => 0,
            Self::Top => 1,
        }
    }
}

/// A number drawn as a stack of bit blocks, least significant at the bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BitField {
    column: u8,
    width: u8,
    bits: u8,
}

impl BitField {
    const fn wide(column: u8, bits: u8) -> Self {
        Self {
            column,
            width: 2,
            bits,
        }
    }

    const fn narrow(column: u8, bits: u8) -> Self {
        Self {
            column,
            width: 1,
            bits,
        }
    }

    fn draw(self, value: u8, color: Rgb, frame: &mut PixelBuffer) {
        self.draw_accented(value, color, None, frame);
    }

    /// Draw with one row of each lit block in `accent`
    fn draw_accented(
        self,
        value: u8,
        color: Rgb,
        accent: Option<(Rgb, SecondsPhase)>,
        frame: &mut PixelBuffer,
    ) {
        for bit in 0..self.bits {
            if (value >> bit) & 1 == 0 {
                continue;
            }
            let row = bit * ROWS_PER_BIT;
            for y in row..row + ROWS_PER_BIT {
                let cell = match accent {
                    Some((accent, phase)) if y == row + phase.row() => accent,
                    _ => color,
                };
                for x in self.column..self.column + self.width {
                    frame.set(x, y, cell);
                }
            }
        }
    }

    /// Read the value back; `None` if any block is partially lit
    fn read(self, frame: &PixelBuffer) -> Option<u8> {
        let mut value = 0;
        for bit in 0..self.bits {
            let row = bit * ROWS_PER_BIT;
            let mut lit = 0;
            for y in row..row + ROWS_PER_BIT {
                for x in self.column..self.column + self.width {
                    if frame.get(x, y) != BLACK {
                        lit += 1;
                    }
                }
            }
            if lit == self.width * ROWS_PER_BIT {
                value |= 1 << bit;
            } else if lit != 0 {
                return None;
            }
        }
        Some(value)
    }
}

const HOURS_BINARY: BitField = BitField::wide(0, 4);
const HOUR_TENS: BitField = BitField::narrow(0, 2);
const HOUR_UNITS: BitField = BitField::narrow(1, 4);
const MINUTE_TENS: BitField = BitField::wide(2, 3);
const MINUTE_UNITS: BitField = BitField::wide(4, 4);
const SECOND_TENS: BitField = BitField::narrow(6, 3);
const SECOND_UNITS: BitField = BitField::narrow(7, 4);

/// Fixed placement of the clock fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcdLayout {
    format: HourFormat,
}

impl BcdLayout {
    pub const fn new(format: HourFormat) -> Self {
        Self { format }
    }

    /// Draw hours in `base` and the two minute digits
    pub fn draw_hours_minutes(&self, hours: u8, minutes: u8, base: Rgb, frame: &mut PixelBuffer) {
        match self.format {
            HourFormat::Twelve => HOURS_BINARY.draw(hours, base, frame),
            HourFormat::TwentyFour => {
                HOUR_TENS.draw(hours / 10, base, frame);
                HOUR_UNITS.draw(hours % 10, base, frame);
            }
        }
        MINUTE_TENS.draw(minutes / 10, base, frame);
        MINUTE_UNITS.draw(minutes % 10, base, frame);
    }

    /// Draw the two seconds columns
    ///
    /// `accent` colors the row of each lit block selected by the phase.
    pub fn draw_seconds(
        &self,
        seconds: u8,
        color: Rgb,
        accent: Option<(Rgb, SecondsPhase)>,
        frame: &mut PixelBuffer,
    ) {
        SECOND_TENS.draw_accented(seconds / 10, color, accent, frame);
        SECOND_UNITS.draw_accented(seconds % 10, color, accent, frame);
    }

    /// Decode `(hours, minutes, seconds)` from a rendered frame
    ///
    /// Any lit cell counts as a set bit. Returns `None` if a bit block is
    /// only partially lit.
    pub fn decode(&self, frame: &PixelBuffer) -> Option<(u8, u8, u8)> {
        let hours = match self.format {
            HourFormat::Twelve => HOURS_BINARY.read(frame)?,
            HourFormat::TwentyFour => HOUR_TENS.read(frame)? * 10 + HOUR_UNITS.read(frame)?,
        };
        let minutes = MINUTE_TENS.read(frame)? * 10 + MINUTE_UNITS.read(frame)?;
        let seconds = SECOND_TENS.read(frame)? * 10 + SECOND_UNITS.read(frame)?;
        Some((hours, minutes, seconds))
    }

    pub const fn format(&self) -> HourFormat {
        self.format
    }
}

/// Renders clock readings into pixel buffers
///
/// Pure: the same reading, timestamp and phase always give the same buffer.
#[derive(Debug, Clone)]
pub struct BcdRenderer {
    layout: BcdLayout,
    palette: ClockPalette,
    day_hours: DayHours,
    show_seconds: bool,
    animate_seconds: bool,
}

impl BcdRenderer {
    pub const fn new(
        layout: BcdLayout,
        palette: ClockPalette,
        day_hours: DayHours,
        show_seconds: bool,
    ) -> Self {
        Self {
            layout,
            palette,
            day_hours,
            show_seconds,
            animate_seconds: false,
        }
    }

    /// Enable or disable the seconds animation
    #[must_use]
    pub const fn with_animation(mut self, animate_seconds: bool) -> Self {
        self.animate_seconds = animate_seconds;
        self
    }

    pub fn from_config(config: &ClockConfig) -> Self {
        Self::new(
            BcdLayout::new(config.time.hour_format),
            config.palette,
            config.day_hours,
            config.show_seconds,
        )
        .with_animation(config.animate_seconds)
    }

    /// Hours/minutes color for the given local time
    pub fn base_color(&self, epoch_seconds: u64) -> Rgb {
        if self.day_hours.contains(hour_of_day(epoch_seconds)) {
            self.palette.day
        } else {
            self.palette.night
        }
    }

    /// Render `reading`
    ///
    /// `epoch_seconds` selects day or night colors. `phase` only matters
    /// when the seconds animation is on.
    pub fn render(
        &self,
        reading: &ClockReading,
        epoch_seconds: u64,
        phase: SecondsPhase,
    ) -> PixelBuffer {
        let mut frame = PixelBuffer::new();
        let base = self.base_color(epoch_seconds);

        self.layout
            .draw_hours_minutes(reading.hours, reading.minutes, base, &mut frame);
        if self.show_seconds {
            let accent = self
                .animate_seconds
                .then_some((self.palette.seconds_accent, phase));
            self.layout
                .draw_seconds(reading.seconds, self.palette.seconds, accent, &mut frame);
        }

        frame
    }

    pub const fn layout(&self) -> BcdLayout {
        self.layout
    }

    /// Check whether the phase changes the rendered frame
    pub const fn is_animated(&self) -> bool {
        self.show_seconds && self.animate_seconds
    }
}
