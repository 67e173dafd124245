//! Full-frame patterns
//!
//! Frames that are not a clock face: the dark OFF frame and the error
//! indicator. Each pattern paints the whole buffer, cells it does not use
//! are left black.

use embassy_time::Instant;

use crate::buffer::{MATRIX_SIZE, PixelBuffer};
use crate::color::{BLACK, Rgb};

pub trait Pattern {
    /// Paint one frame
    fn render(&mut self, now: Instant, frame: &mut PixelBuffer);

    /// Render into a fresh buffer
    fn frame(&mut self, now: Instant) -> PixelBuffer {
        let mut frame = PixelBuffer::new();
        self.render(now, &mut frame);
        frame
    }
}

/// Every cell in one color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solid(pub Rgb);

impl Solid {
    /// All cells off
    pub const fn black() -> Self {
        Self(BLACK)
    }
}

impl Pattern for Solid {
    fn render(&mut self, _now: Instant, frame: &mut PixelBuffer) {
        frame.fill(self.0);
    }
}

/// Both diagonals lit, the rest dark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cross(pub Rgb);

impl Pattern for Cross {
    fn render(&mut self, _now: Instant, frame: &mut PixelBuffer) {
        frame.fill(BLACK);
        let last = MATRIX_SIZE - 1;
        for i in 0..MATRIX_SIZE {
            frame.set(i, i, self.0);
            frame.set(i, last - i, self.0);
        }
    }
}
