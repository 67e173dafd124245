//! Crossfades between full frames
//!
//! A fade is cut into `duration / step` frames. Frame `k` of `n` blends
//! every channel as `from + (to - from) * k / n`, so frame 0 is the source,
//! frame `n` is the target and nothing in between overshoots either end.
//! Fades are blocking: the engine owns the output until the last frame is
//! shown.

use embassy_time::Duration;

use crate::buffer::PixelBuffer;
use crate::color::lerp_color;
use crate::time_base::ClockReading;
use crate::{MonotonicClock, OutputDriver};

/// Default interval between crossfade frames
pub const DEFAULT_FADE_STEP: Duration = Duration::from_millis(20);

/// Fade durations per kind of change
#[derive(Debug, Clone, Copy)]
pub struct FadeTimings {
    /// Only the seconds changed
    pub second: Duration,
    /// The minutes changed
    pub minute: Duration,
    /// The hours changed
    pub hour: Duration,
    /// Display state change (first frame, on, off)
    pub state: Duration,
    /// Interval between crossfade frames
    pub step: Duration,
}

impl Default for FadeTimings {
    fn default() -> Self {
        Self {
            second: Duration::from_millis(300),
            minute: Duration::from_millis(500),
            hour: Duration::from_millis(800),
            state: Duration::from_millis(600),
            step: DEFAULT_FADE_STEP,
        }
    }
}

impl FadeTimings {
    /// Pick the fade duration for going from `previous` to `next`
    ///
    /// The most significant changed field wins. Without a previous reading
    /// the state duration is used; an unchanged reading gets zero.
    pub fn for_change(&self, previous: Option<&ClockReading>, next: &ClockReading) -> Duration {
        let Some(previous) = previous else {
            return self.state;
        };
        if previous.hours != next.hours || previous.is_pm != next.is_pm {
            self.hour
        } else if previous.minutes != next.minutes {
            self.minute
        } else if previous.seconds != next.seconds {
            self.second
        } else {
            Duration::from_millis(0)
        }
    }
}

/// Stepped linear blend between two frames
#[derive(Debug, Clone)]
pub struct Crossfade {
    from: PixelBuffer,
    to: PixelBuffer,
    steps: u32,
}

impl Crossfade {
    /// Create a crossfade lasting `duration` with frames every `step`
    ///
    /// A zero duration gives an instant fade with no intermediate frames.
    /// Any positive duration gives at least one step.
    pub fn new(from: PixelBuffer, to: PixelBuffer, duration: Duration, step: Duration) -> Self {
        let steps = if duration.as_ticks() == 0 {
            0
        } else {
            let count = duration.as_ticks() / step.as_ticks().max(1);
            u32::try_from(count).unwrap_or(u32::MAX).max(1)
        };
        Self { from, to, steps }
    }

    /// Number of frames after the source frame
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    pub const fn is_instant(&self) -> bool {
        self.steps == 0
    }

    /// Blended frame at `step` (clamped to the last step)
    pub fn frame(&self, step: u32) -> PixelBuffer {
        let mut frame = PixelBuffer::new();
        let cells = self.from.cells().iter().zip(self.to.cells().iter());
        for (out, (from, to)) in frame.cells_mut().iter_mut().zip(cells) {
            *out = lerp_color(*from, *to, step, self.steps);
        }
        frame
    }

    pub const fn target(&self) -> &PixelBuffer {
        &self.to
    }
}

/// Drives crossfades to the hardware
///
/// Remembers the last frame pushed so the next fade starts from what is
/// actually lit.
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    step: Duration,
    current: PixelBuffer,
}

impl TransitionEngine {
    /// Create an engine; the matrix is assumed dark
    pub const fn new(step: Duration) -> Self {
        Self {
            step,
            current: PixelBuffer::new(),
        }
    }

    /// Frame currently on the matrix
    pub const fn current(&self) -> &PixelBuffer {
        &self.current
    }

    /// Fade from the current frame to `target` over `duration`
    ///
    /// Blocks until the last frame is shown, sleeping one step before each
    /// frame. A zero duration shows `target` once without blending.
    pub fn crossfade<O, C>(
        &mut self,
        target: &PixelBuffer,
        duration: Duration,
        output: &mut O,
        clock: &mut C,
    ) where
        O: OutputDriver,
        C: MonotonicClock,
    {
        let fade = Crossfade::new(self.current, *target, duration, self.step);
        if fade.is_instant() {
            self.apply(target, output);
            return;
        }

        for step in 1..=fade.steps() {
            clock.sleep(self.step);
            fade.frame(step).show(output);
        }
        self.current = *target;
    }

    /// Show `target` immediately
    pub fn apply<O: OutputDriver>(&mut self, target: &PixelBuffer, output: &mut O) {
        target.show(output);
        self.current = *target;
    }
}
