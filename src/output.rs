//! `smart-leds` output adapter

#[cfg(feature = "esp32-log")]
use esp_println::println;
use smart_leds::{RGB8, SmartLedsWrite, brightness};

use crate::OutputDriver;
use crate::color::Rgb;

/// Full brightness, colors are sent unchanged
pub const FULL_BRIGHTNESS: u8 = 255;

/// [`OutputDriver`] over any `smart-leds` writer
///
/// Global brightness is applied here, on the way to the LEDs; the frames
/// themselves always carry full-scale colors.
#[derive(Debug)]
pub struct SmartLedsOutput<W> {
    writer: W,
    brightness: u8,
}

impl<W> SmartLedsOutput<W>
where
    W: SmartLedsWrite<Color = RGB8>,
    W::Error: core::fmt::Debug,
{
    pub const fn new(writer: W) -> Self {
        Self::with_brightness(writer, FULL_BRIGHTNESS)
    }

    pub const fn with_brightness(writer: W, brightness: u8) -> Self {
        Self { writer, brightness }
    }

    pub fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Give the writer back
    pub fn release(self) -> W {
        self.writer
    }
}

impl<W> OutputDriver for SmartLedsOutput<W>
where
    W: SmartLedsWrite<Color = RGB8>,
    W::Error: core::fmt::Debug,
{
    fn write(&mut self, colors: &[Rgb]) {
        let scaled = brightness(colors.iter().copied(), self.brightness);
        // A failed frame is dropped, the next one will be sent as usual
        if let Err(_error) = self.writer.write(scaled) {
            #[cfg(feature = "esp32-log")]
            println!("[SmartLedsOutput.write] driver error: {:?}", _error);
        }
    }
}
