#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use bcd_matrix_clock::{
    Duration, Instant, MonotonicClock, OutputDriver, PixelBuffer, Rgb, TimeSample, TimeSource,
};
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};

/// Simulated monotonic clock; sleeping advances time instantly
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    ticks: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn millis(&self) -> u64 {
        Instant::from_ticks(self.ticks.get()).as_millis()
    }

    pub fn advance(&self, duration: Duration) {
        self.ticks.set(self.ticks.get() + duration.as_ticks());
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Move to an absolute time; never goes back
    pub fn set_millis(&self, millis: u64) {
        let ticks = Instant::from_millis(millis).as_ticks();
        assert!(ticks >= self.ticks.get(), "simulated time went backwards");
        self.ticks.set(ticks);
    }
}

impl MonotonicClock for SimClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.ticks.get())
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

/// Pin that reads pressed during scripted windows of simulated time
#[derive(Debug, Clone)]
pub struct ScriptedPin {
    clock: SimClock,
    presses: Rc<RefCell<Vec<(u64, u64)>>>,
    active_low: bool,
}

impl ScriptedPin {
    /// Pin wired active-high (reads high while pressed)
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            presses: Rc::default(),
            active_low: false,
        }
    }

    /// Pin wired active-low (reads low while pressed)
    pub fn active_low(clock: &SimClock) -> Self {
        Self {
            active_low: true,
            ..Self::new(clock)
        }
    }

    /// Hold the button over `[from_ms, to_ms)`
    pub fn press(&self, from_ms: u64, to_ms: u64) {
        self.presses.borrow_mut().push((from_ms, to_ms));
    }

    /// Hold the button forever
    pub fn hold(&self) {
        self.press(0, u64::MAX);
    }

    fn pressed(&self) -> bool {
        let now = self.clock.millis();
        self.presses
            .borrow()
            .iter()
            .any(|&(from, to)| now >= from && now < to)
    }
}

impl ErrorType for ScriptedPin {
    type Error = Infallible;
}

impl InputPin for ScriptedPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pressed() != self.active_low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Pin whose every read fails
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultyPin;

impl ErrorType for FaultyPin {
    type Error = ErrorKind;
}

impl InputPin for FaultyPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(ErrorKind::Other)
    }
}

/// Output keeping every frame written to it
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    frames: Rc<RefCell<Vec<PixelBuffer>>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn last(&self) -> Option<PixelBuffer> {
        self.frames.borrow().last().copied()
    }

    pub fn frames(&self) -> Vec<PixelBuffer> {
        self.frames.borrow().clone()
    }
}

impl OutputDriver for RecordingOutput {
    fn write(&mut self, colors: &[Rgb]) {
        let mut frame = PixelBuffer::new();
        frame.cells_mut().copy_from_slice(colors);
        self.frames.borrow_mut().push(frame);
    }
}

#[derive(Debug, Default)]
struct SourceState {
    sample: Option<TimeSample>,
    connected: bool,
    fetches: usize,
    power_downs: usize,
    power_ups: usize,
}

/// Time source returning a fixed sample, or nothing while failing
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    state: Rc<RefCell<SourceState>>,
}

impl ScriptedSource {
    pub fn new(sample: TimeSample) -> Self {
        Self {
            state: Rc::new(RefCell::new(SourceState {
                sample: Some(sample),
                connected: true,
                ..SourceState::default()
            })),
        }
    }

    /// Source that never answers
    pub fn failing() -> Self {
        let source = Self::new(TimeSample::new(1970, 1, 1, 0, 0, 0));
        source.set_sample(None);
        source
    }

    pub fn set_sample(&self, sample: Option<TimeSample>) {
        self.state.borrow_mut().sample = sample;
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.borrow_mut().connected = connected;
    }

    pub fn fetches(&self) -> usize {
        self.state.borrow().fetches
    }

    pub fn power_downs(&self) -> usize {
        self.state.borrow().power_downs
    }

    pub fn power_ups(&self) -> usize {
        self.state.borrow().power_ups
    }
}

impl TimeSource for ScriptedSource {
    fn fetch(&mut self) -> Option<TimeSample> {
        let mut state = self.state.borrow_mut();
        state.fetches += 1;
        state.sample
    }

    fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }

    fn power_down(&mut self) {
        self.state.borrow_mut().power_downs += 1;
    }

    fn power_up(&mut self) {
        self.state.borrow_mut().power_ups += 1;
    }
}
