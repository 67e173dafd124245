//! Debounced push button
//!
//! Polled, not interrupt driven. A poll that finds the button released
//! returns at once. A poll that finds it pressed blocks: it re-checks after
//! the debounce window, then follows the press until release, so a long
//! press is reported only once the button is let go.

use embassy_time::Duration;
use embedded_hal::digital::InputPin;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::MonotonicClock;
use crate::error::ConfigError;

/// Longest accepted poll interval
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Number of startup samples that must all read active to reject the pin
const STARTUP_PROBE_SAMPLES: u8 = 3;

/// Electrical level meaning "pressed"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// Pressed reads high (pull-down wiring)
    #[default]
    ActiveHigh,
    /// Pressed reads low (pull-up wiring)
    ActiveLow,
}

impl Polarity {
    const fn is_active(self, high: bool) -> bool {
        match self {
            Self::ActiveHigh => high,
            Self::ActiveLow => !high,
        }
    }
}

/// Configuration for the button
#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    pub polarity: Polarity,
    /// Delay before confirming a press
    pub debounce: Duration,
    /// Hold time from which a press is long
    pub long_press: Duration,
    /// Sampling interval while the button is held
    pub poll_interval: Duration,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            polarity: Polarity::ActiveHigh,
            debounce: Duration::from_millis(50),
            long_press: Duration::from_millis(1_500),
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl ButtonConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.as_ticks() == 0 || self.poll_interval > MAX_POLL_INTERVAL {
            return Err(ConfigError::InvalidPollInterval);
        }
        if self.debounce >= self.long_press {
            return Err(ConfigError::DebounceNotBelowLongPress);
        }
        Ok(())
    }
}

/// Outcome of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonEvent {
    #[default]
    None,
    ShortPress,
    LongPress,
}

/// Button on a digital input pin
#[derive(Debug)]
pub struct ButtonInput<P> {
    pin: P,
    config: ButtonConfig,
}

impl<P: InputPin> ButtonInput<P> {
    /// Create the button and check the pin idles inactive
    ///
    /// Samples the pin across two debounce windows; if every sample reads
    /// active the polarity does not match the wiring and presses would never
    /// be seen, so construction fails.
    pub fn new<C: MonotonicClock>(
        pin: P,
        config: ButtonConfig,
        clock: &mut C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut button = Self { pin, config };

        let mut active_samples = 0;
        for sample in 0..STARTUP_PROBE_SAMPLES {
            if sample > 0 {
                clock.sleep(config.debounce);
            }
            if button.is_active() {
                active_samples += 1;
            }
        }
        if active_samples == STARTUP_PROBE_SAMPLES {
            #[cfg(feature = "esp32-log")]
            println!("[ButtonInput.new] pin stuck active, polarity {:?}", config.polarity);
            return Err(ConfigError::ButtonStuckActive);
        }

        Ok(button)
    }

    /// Poll the button once
    ///
    /// Returns [`ButtonEvent::None`] immediately when released or when the
    /// press does not survive the debounce re-check. Otherwise blocks until
    /// release.
    pub fn poll<C: MonotonicClock>(&mut self, clock: &mut C) -> ButtonEvent {
        if !self.is_active() {
            return ButtonEvent::None;
        }

        clock.sleep(self.config.debounce);
        if !self.is_active() {
            return ButtonEvent::None;
        }

        let since = clock.now();
        loop {
            let held = clock.now().saturating_duration_since(since);
            if !self.is_active() {
                return if held >= self.config.long_press {
                    ButtonEvent::LongPress
                } else {
                    ButtonEvent::ShortPress
                };
            }
            if held >= self.config.long_press {
                self.wait_release(clock);
                return ButtonEvent::LongPress;
            }
            clock.sleep(self.config.poll_interval);
        }
    }

    /// Check whether the button is held right now
    ///
    /// A pin read error counts as released.
    pub fn is_active(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => self.config.polarity.is_active(high),
            Err(_) => false,
        }
    }

    pub const fn config(&self) -> &ButtonConfig {
        &self.config
    }

    fn wait_release<C: MonotonicClock>(&mut self, clock: &mut C) {
        while self.is_active() {
            clock.sleep(self.config.poll_interval);
        }
    }
}
