//! The running clock
//!
//! [`BcdClock`] owns every collaborator (output, button pin, time source,
//! monotonic clock) and all mutable clock state. One [`BcdClock::tick`] is one
//! loop iteration: poll the button, react to the event, resync when due and
//! re-render when the reading changed.
//!
//! ```text
//!              LongPress
//!   DISPLAYED ----------> OFF
//!       ^                  |
//!       +------------------+
//!            ShortPress
//! ```
//!
//! ShortPress while displayed forces a resync; LongPress while off is
//! ignored.

use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::bcd::{BcdRenderer, SecondsPhase};
use crate::buffer::PixelBuffer;
use crate::button::{ButtonEvent, ButtonInput};
use crate::config::ClockConfig;
use crate::error::{ClockError, ConfigError};
use crate::pattern::{Cross, Pattern, Solid};
use crate::time_base::{ClockReading, TimeBase};
use crate::time_source::{LinkHealth, LinkMonitor, TimeSource};
use crate::transition::TransitionEngine;
use crate::{MonotonicClock, OutputDriver};

/// Number of flashes of the error indicator before it holds
const ERROR_FLASHES: u8 = 3;

const ERROR_FLASH_ON: Duration = Duration::from_millis(300);
const ERROR_FLASH_OFF: Duration = Duration::from_millis(200);

/// Whether the clock face is lit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Displayed,
    Off,
}

/// BCD matrix clock
pub struct BcdClock<O, P, S, C> {
    config: ClockConfig,
    time_base: TimeBase,
    renderer: BcdRenderer,
    engine: TransitionEngine,
    button: ButtonInput<P>,
    link: LinkMonitor,
    output: O,
    source: S,
    clock: C,
    state: DisplayState,
    last_rendered: Option<ClockReading>,
    last_phase: SecondsPhase,
    started: bool,
}

impl<O, P, S, C> BcdClock<O, P, S, C>
where
    O: OutputDriver,
    P: InputPin,
    S: TimeSource,
    C: MonotonicClock,
{
    /// Create the clock
    ///
    /// Validates `config` and probes the button pin. Nothing is shown until
    /// [`BcdClock::start`] or the first [`BcdClock::tick`].
    pub fn new(
        config: ClockConfig,
        output: O,
        pin: P,
        source: S,
        mut clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let button = ButtonInput::new(pin, config.button, &mut clock)?;
        let now = clock.now();

        Ok(Self {
            time_base: TimeBase::new(&config.time, now),
            renderer: BcdRenderer::from_config(&config),
            engine: TransitionEngine::new(config.timings.step),
            link: LinkMonitor::new(config.warning_failures),
            button,
            output,
            source,
            clock,
            config,
            state: DisplayState::Displayed,
            last_rendered: None,
            last_phase: SecondsPhase::default(),
            started: false,
        })
    }

    /// Initial sync and first frame
    ///
    /// The first frame fades in from black. If the sync fails the error
    /// indicator is shown instead. Does nothing on later calls.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        #[cfg(feature = "esp32-log")]
        println!("[BcdClock.start] starting");

        let _ = self.resync();
        self.refresh();
    }

    /// Run one loop iteration
    ///
    /// The first call performs [`BcdClock::start`]. Blocks while a press is
    /// held, while a crossfade runs and while the time source is queried.
    pub fn tick(&mut self) {
        if !self.started {
            self.start();
            return;
        }

        let event = self.button.poll(&mut self.clock);
        self.handle_event(event);

        if self.state == DisplayState::Displayed {
            if self.time_base.needs_resync(self.clock.now()) {
                let _ = self.resync();
            }
            self.refresh();
        }
    }

    /// Apply a button event to the display state
    pub fn handle_event(&mut self, event: ButtonEvent) {
        match (self.state, event) {
            (_, ButtonEvent::None) | (DisplayState::Off, ButtonEvent::LongPress) => {}
            (DisplayState::Displayed, ButtonEvent::ShortPress) => {
                #[cfg(feature = "esp32-log")]
                println!("[BcdClock.handle_event] forced resync");
                let _ = self.resync();
            }
            (DisplayState::Displayed, ButtonEvent::LongPress) => self.turn_off(),
            (DisplayState::Off, ButtonEvent::ShortPress) => self.turn_on(),
        }
    }

    /// Fetch a sample and re-anchor the time base
    ///
    /// On failure the previous anchor is kept. If no sync has ever succeeded
    /// the error indicator is flashed and then held.
    pub fn resync(&mut self) -> Result<(), ClockError> {
        let result = self.fetch_and_synchronize();
        let health = match result {
            Ok(()) => {
                #[cfg(feature = "esp32-log")]
                println!("[BcdClock.resync] synced, {}", self.reading());
                self.link.record_success()
            }
            Err(_error) => {
                #[cfg(feature = "esp32-log")]
                println!("[BcdClock.resync] failed: {}", _error);
                let health = self.link.record_failure();
                if !self.time_base.has_synced() {
                    self.show_error();
                }
                health
            }
        };

        if let Some(_health) = health {
            #[cfg(feature = "esp32-log")]
            println!(
                "[BcdClock.resync] link {:?} after {} failures",
                _health,
                self.link.consecutive_failures()
            );
        }
        result
    }

    /// Frame the clock should show at `now`
    ///
    /// Black when off, the error cross while never synced, the clock face
    /// otherwise.
    pub fn compose_frame(&self, now: Instant) -> PixelBuffer {
        match self.state {
            DisplayState::Off => Solid::black().frame(now),
            DisplayState::Displayed if !self.time_base.has_synced() => {
                Cross(self.config.palette.error).frame(now)
            }
            DisplayState::Displayed => self.renderer.render(
                &self.time_base.now(now),
                self.time_base.epoch_seconds(now),
                SecondsPhase::at(now),
            ),
        }
    }

    /// Current time reading
    pub fn reading(&self) -> ClockReading {
        self.time_base.now(self.clock.now())
    }

    pub const fn state(&self) -> DisplayState {
        self.state
    }

    /// Frame currently on the matrix
    pub const fn frame(&self) -> &PixelBuffer {
        self.engine.current()
    }

    /// Reading of the last rendered frame, `None` after turning off
    pub const fn last_rendered(&self) -> Option<ClockReading> {
        self.last_rendered
    }

    pub fn link_health(&self) -> LinkHealth {
        self.link.health()
    }

    /// Failed syncs since the last successful one
    pub const fn consecutive_failures(&self) -> u16 {
        self.link.consecutive_failures()
    }

    pub const fn time_base(&self) -> &TimeBase {
        &self.time_base
    }

    pub const fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub const fn output(&self) -> &O {
        &self.output
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Render the current reading if it differs from the last one
    ///
    /// A new reading crossfades. A new animation phase alone is applied
    /// directly.
    fn refresh(&mut self) {
        let now = self.clock.now();
        let reading = self.time_base.now(now);
        let phase = SecondsPhase::at(now);
        if self.last_rendered == Some(reading) {
            if self.renderer.is_animated() && phase != self.last_phase {
                self.last_phase = phase;
                let target = self.compose_frame(now);
                if target != *self.engine.current() {
                    self.engine.apply(&target, &mut self.output);
                }
            }
            return;
        }

        let duration = self
            .config
            .timings
            .for_change(self.last_rendered.as_ref(), &reading);
        self.last_rendered = Some(reading);
        self.last_phase = phase;

        let target = self.compose_frame(now);
        if target == *self.engine.current() {
            return;
        }
        self.engine
            .crossfade(&target, duration, &mut self.output, &mut self.clock);
    }

    fn turn_off(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[BcdClock.turn_off] display off");

        self.state = DisplayState::Off;
        self.last_rendered = None;
        let target = self.compose_frame(self.clock.now());
        self.engine.crossfade(
            &target,
            self.config.timings.state,
            &mut self.output,
            &mut self.clock,
        );
        self.source.power_down();
    }

    fn turn_on(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[BcdClock.turn_on] display on");

        self.source.power_up();
        self.state = DisplayState::Displayed;
        self.last_rendered = None;
        self.refresh();
    }

    fn fetch_and_synchronize(&mut self) -> Result<(), ClockError> {
        if !self.source.is_connected() {
            return Err(ClockError::TimeSourceUnavailable);
        }
        let sample = self
            .source
            .fetch()
            .ok_or(ClockError::TimeSourceUnavailable)?;
        self.time_base.synchronize(&sample, self.clock.now())
    }

    fn show_error(&mut self) {
        let cross = Cross(self.config.palette.error).frame(self.clock.now());
        let dark = PixelBuffer::new();
        for _ in 0..ERROR_FLASHES {
            self.engine.apply(&cross, &mut self.output);
            self.clock.sleep(ERROR_FLASH_ON);
            self.engine.apply(&dark, &mut self.output);
            self.clock.sleep(ERROR_FLASH_OFF);
        }
        self.engine.apply(&cross, &mut self.output);
    }
}
