//! Fixed-interval loop around [`BcdClock`]
//!
//! Ticks the clock every refresh interval and sleeps until the next
//! deadline through the clock's own [`MonotonicClock`]. A tick that ran long
//! (a crossfade, a held button, a slow time source) eats into the following
//! sleep instead of shifting the schedule.

use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;

use crate::clock::BcdClock;
use crate::time_source::TimeSource;
use crate::{MonotonicClock, OutputDriver};

/// Timing of one scheduler tick
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// When the next tick is due
    pub next_deadline: Instant,
    /// How long to wait for it (zero if behind schedule)
    pub sleep_duration: Duration,
}

pub struct Scheduler<O, P, S, C> {
    clock: BcdClock<O, P, S, C>,
    next_tick: Instant,
    interval: Duration,
}

impl<O, P, S, C> Scheduler<O, P, S, C>
where
    O: OutputDriver,
    P: InputPin,
    S: TimeSource,
    C: MonotonicClock,
{
    /// Create a scheduler ticking at the clock's refresh interval
    pub fn new(clock: BcdClock<O, P, S, C>) -> Self {
        let interval = clock.config().refresh_interval;
        Self::with_interval(clock, interval)
    }

    pub fn with_interval(clock: BcdClock<O, P, S, C>, interval: Duration) -> Self {
        Self {
            clock,
            next_tick: Instant::from_ticks(0),
            interval,
        }
    }

    /// Run one clock iteration and compute the next deadline
    ///
    /// Does not sleep. If the schedule fell more than two intervals behind,
    /// it restarts from now instead of ticking back-to-back to catch up.
    pub fn tick(&mut self) -> TickResult {
        self.clock.tick();

        let now = self.clock.clock().now();
        if now > self.next_tick + self.interval * 2 {
            self.next_tick = now;
        }
        self.next_tick += self.interval;

        TickResult {
            next_deadline: self.next_tick,
            sleep_duration: self.next_tick.saturating_duration_since(now),
        }
    }

    /// Tick forever
    pub fn run(&mut self) -> ! {
        loop {
            let result = self.tick();
            self.clock.clock_mut().sleep(result.sleep_duration);
        }
    }

    pub const fn clock(&self) -> &BcdClock<O, P, S, C> {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut BcdClock<O, P, S, C> {
        &mut self.clock
    }

    /// Give the clock back
    pub fn into_inner(self) -> BcdClock<O, P, S, C> {
        self.clock
    }
}
