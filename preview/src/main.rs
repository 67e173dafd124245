//! Desktop preview for the BCD matrix clock
//!
//! Runs the real clock loop on a background thread against the system
//! clock and draws the 8x8 matrix in a window. The on-screen button behaves
//! like the hardware one (hold it for a long press), and the time source can
//! be made to fail to check the error indicator and link health.

use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use bcd_matrix_clock::{
    BcdClock, ClockConfig, ClockReading, DisplayState, EmbassyClock, HourFormat, LinkHealth,
    MATRIX_SIZE, PIXEL_COUNT, Rgb, Scheduler, SmartLedsOutput, TimeSample, TimeSource,
    coords_to_index,
};
use eframe::egui::{self};
use embedded_hal::digital::{ErrorType, InputPin};
use smart_leds::{RGB8, SmartLedsWrite};

/// Size of each LED rectangle in pixels
const LED_SIZE: f32 = 36.0;

/// Gap between LEDs
const LED_GAP: f32 = 6.0;

/// State shared between the clock thread and the UI
///
/// One mutex guards everything, so the matrix is never written from two
/// places at once.
struct Shared {
    frame: [Rgb; PIXEL_COUNT],
    button_held: bool,
    source_failing: bool,
    state: DisplayState,
    link: LinkHealth,
    reading: Option<ClockReading>,
}

type SharedState = Arc<Mutex<Shared>>;

fn lock(shared: &SharedState) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// LED strip stand-in storing the last frame
struct PreviewStrip {
    shared: SharedState,
}

impl SmartLedsWrite for PreviewStrip {
    type Error = Infallible;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let mut shared = lock(&self.shared);
        for (cell, color) in shared.frame.iter_mut().zip(iterator) {
            *cell = color.into();
        }
        Ok(())
    }
}

/// Button driven by the window
struct PreviewButton {
    shared: SharedState,
}

impl ErrorType for PreviewButton {
    type Error = Infallible;
}

impl InputPin for PreviewButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(lock(&self.shared).button_held)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Time source reading the host clock
struct SystemTimeSource {
    shared: SharedState,
}

impl TimeSource for SystemTimeSource {
    fn fetch(&mut self) -> Option<TimeSample> {
        if lock(&self.shared).source_failing {
            return None;
        }
        let seconds = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
        Some(sample_from_unix(seconds))
    }

    fn is_connected(&self) -> bool {
        !lock(&self.shared).source_failing
    }
}

/// Split Unix seconds into calendar fields
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn sample_from_unix(seconds: u64) -> TimeSample {
    let days = (seconds / 86_400) as i64;
    let seconds_of_day = seconds % 86_400;

    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let day_of_era = z - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_from_march = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_from_march + 2) / 5 + 1;
    let month = if month_from_march < 10 {
        month_from_march + 3
    } else {
        month_from_march - 9
    };
    let year = year_of_era + era * 400 + i64::from(month <= 2);

    TimeSample::new(
        year as u16,
        month as u8,
        day as u8,
        (seconds_of_day / 3_600) as u8,
        (seconds_of_day % 3_600 / 60) as u8,
        (seconds_of_day % 60) as u8,
    )
}

fn spawn_clock(shared: SharedState, config: ClockConfig) {
    thread::spawn(move || {
        let output = SmartLedsOutput::new(PreviewStrip {
            shared: shared.clone(),
        });
        let button = PreviewButton {
            shared: shared.clone(),
        };
        let source = SystemTimeSource {
            shared: shared.clone(),
        };
        let clock = match BcdClock::new(config, output, button, source, EmbassyClock) {
            Ok(clock) => clock,
            Err(error) => {
                eprintln!("clock rejected its configuration: {error}");
                return;
            }
        };

        let mut scheduler = Scheduler::new(clock);
        loop {
            let result = scheduler.tick();
            {
                let clock = scheduler.clock();
                let mut shared = lock(&shared);
                shared.state = clock.state();
                shared.link = clock.link_health();
                shared.reading = clock.last_rendered();
            }
            thread::sleep(std::time::Duration::from_micros(
                result.sleep_duration.as_micros(),
            ));
        }
    });
}

fn main() -> eframe::Result<()> {
    let mut config = ClockConfig::default();
    if std::env::args().any(|arg| arg == "--24h") {
        config.time.hour_format = HourFormat::TwentyFour;
    }

    let shared = Arc::new(Mutex::new(Shared {
        frame: [Rgb::default(); PIXEL_COUNT],
        button_held: false,
        source_failing: false,
        state: DisplayState::Displayed,
        link: LinkHealth::Ok,
        reading: None,
    }));
    spawn_clock(shared.clone(), config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 520.0])
            .with_title("BCD Matrix Clock Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "bcd-matrix-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new(shared)))),
    )
}

struct PreviewApp {
    shared: SharedState,
    /// Multiplier applied to the dim clock colors when drawing
    gain: f32,
}

impl PreviewApp {
    fn new(shared: SharedState) -> Self {
        Self { shared, gain: 2.0 }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn scale(&self, channel: u8) -> u8 {
        (f32::from(channel) * self.gain).min(255.0) as u8
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (frame, state, link, reading, mut source_failing) = {
            let shared = lock(&self.shared);
            (
                shared.frame,
                shared.state,
                shared.link,
                shared.reading,
                shared.source_failing,
            )
        };

        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                let button = ui.button("Button (hold for long press)");
                lock(&self.shared).button_held = button.is_pointer_button_down_on();
            });

            ui.add_space(4.0);

            ui.horizontal(|ui| {
                if ui
                    .checkbox(&mut source_failing, "Time source fails")
                    .changed()
                {
                    lock(&self.shared).source_failing = source_failing;
                }
            });

            ui.add_space(4.0);

            ui.horizontal(|ui| {
                ui.label("Gain:");
                ui.add(egui::Slider::new(&mut self.gain, 1.0..=4.0));
            });

            ui.add_space(4.0);

            ui.label(format!("State: {state:?}  Link: {link:?}"));
            match reading {
                Some(reading) => ui.label(format!("Time: {reading}")),
                None => ui.label("Time: -"),
            };

            ui.add_space(16.0);

            // === Matrix ===
            let pitch = LED_SIZE + LED_GAP;
            let side = f32::from(MATRIX_SIZE) * pitch;
            let (response, painter) =
                ui.allocate_painter(egui::vec2(side, side), egui::Sense::hover());
            let origin = response.rect.min;

            for x in 0..MATRIX_SIZE {
                for y in 0..MATRIX_SIZE {
                    let Some(index) = coords_to_index(x, y) else {
                        continue;
                    };
                    let pixel = frame[index];
                    // Row 0 is the bottom of the matrix
                    let top = MATRIX_SIZE - 1 - y;
                    let rect = egui::Rect::from_min_size(
                        egui::pos2(
                            origin.x + f32::from(x) * pitch,
                            origin.y + f32::from(top) * pitch,
                        ),
                        egui::vec2(LED_SIZE, LED_SIZE),
                    );
                    let color = egui::Color32::from_rgb(
                        self.scale(pixel.r),
                        self.scale(pixel.g),
                        self.scale(pixel.b),
                    );
                    painter.rect_filled(rect, 4.0, color);
                }
            }
        });
    }
}
