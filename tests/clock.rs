mod common;

mod tests {
    use bcd_matrix_clock::{
        BcdClock, BcdLayout, ButtonEvent, ClockConfig, ClockError, ClockPalette, Cross,
        DisplayState, Duration, HourFormat, LinkHealth, MonotonicClock, Pattern, PixelBuffer,
        TimeSample,
    };

    use super::common::{RecordingOutput, ScriptedPin, ScriptedSource, SimClock};

    /// 10:00:00 UTC, inside the default day hours
    const SAMPLE: TimeSample = TimeSample::new(2024, 5, 14, 10, 0, 0);

    type TestClock = BcdClock<RecordingOutput, ScriptedPin, ScriptedSource, SimClock>;

    struct Rig {
        time: SimClock,
        pin: ScriptedPin,
        output: RecordingOutput,
        source: ScriptedSource,
        clock: TestClock,
    }

    fn rig_with(config: ClockConfig, source: ScriptedSource) -> Rig {
        let time = SimClock::new();
        let pin = ScriptedPin::new(&time);
        let output = RecordingOutput::new();
        let clock = BcdClock::new(
            config,
            output.clone(),
            pin.clone(),
            source.clone(),
            time.clone(),
        )
        .unwrap();
        Rig {
            time,
            pin,
            output,
            source,
            clock,
        }
    }

    /// Default configuration with a still seconds display
    fn still_config() -> ClockConfig {
        ClockConfig {
            animate_seconds: false,
            ..ClockConfig::default()
        }
    }

    /// Clock synced to [`SAMPLE`] at 100 ms, first fade done at 700 ms
    fn started() -> Rig {
        let mut rig = rig_with(still_config(), ScriptedSource::new(SAMPLE));
        rig.clock.tick();
        rig
    }

    fn decode(frame: &PixelBuffer) -> Option<(u8, u8, u8)> {
        BcdLayout::new(HourFormat::Twelve).decode(frame)
    }

    #[test]
    fn test_start_fades_in_synced_time() {
        let rig = started();

        assert_eq!(rig.source.fetches(), 1);
        assert!(rig.clock.time_base().has_synced());
        assert_eq!(rig.output.writes(), 30);
        assert_eq!(rig.time.millis(), 700);

        let last = rig.output.last().unwrap();
        assert_eq!(decode(&last), Some((10, 0, 0)));
        assert_eq!(rig.clock.frame(), &last);
        assert_eq!(rig.clock.state(), DisplayState::Displayed);
        assert_eq!(rig.clock.link_health(), LinkHealth::Ok);
    }

    #[test]
    fn test_start_runs_once() {
        let mut rig = started();
        rig.clock.start();
        assert_eq!(rig.source.fetches(), 1);
        assert_eq!(rig.output.writes(), 30);
    }

    #[test]
    fn test_unchanged_reading_is_not_redrawn() {
        let mut rig = started();
        let writes = rig.output.writes();

        rig.clock.tick();
        rig.time.set_millis(1_000);
        rig.clock.tick();

        assert_eq!(rig.output.writes(), writes);
        assert_eq!(rig.clock.last_rendered(), Some(rig.clock.reading()));
    }

    #[test]
    fn test_second_change_uses_second_fade() {
        let mut rig = started();
        let writes = rig.output.writes();

        rig.time.set_millis(1_100);
        rig.clock.tick();

        assert_eq!(rig.output.writes(), writes + 15);
        assert_eq!(decode(&rig.output.last().unwrap()), Some((10, 0, 1)));
    }

    #[test]
    fn test_long_press_turns_off() {
        let mut rig = started();
        rig.pin.press(1_000, 3_000);
        rig.time.set_millis(1_000);
        let writes = rig.output.writes();

        rig.clock.tick();

        assert_eq!(rig.clock.state(), DisplayState::Off);
        assert_eq!(rig.output.writes(), writes + 30);
        assert!(rig.output.last().unwrap().is_dark());
        assert!(rig.clock.compose_frame(rig.time.now()).is_dark());
        assert_eq!(rig.source.power_downs(), 1);
        assert_eq!(rig.clock.last_rendered(), None);
    }

    #[test]
    fn test_off_ignores_time_and_long_press() {
        let mut rig = started();
        rig.pin.press(1_000, 3_000);
        rig.time.set_millis(1_000);
        rig.clock.tick();
        let writes = rig.output.writes();
        let fetches = rig.source.fetches();

        rig.time.set_millis(10_000);
        rig.clock.tick();
        rig.pin.press(11_000, 13_000);
        rig.time.set_millis(11_000);
        rig.clock.tick();

        assert_eq!(rig.clock.state(), DisplayState::Off);
        assert_eq!(rig.output.writes(), writes);
        assert_eq!(rig.source.fetches(), fetches);
        assert_eq!(rig.source.power_ups(), 0);
    }

    #[test]
    fn test_short_press_turns_back_on() {
        let mut rig = started();
        rig.pin.press(1_000, 3_000);
        rig.time.set_millis(1_000);
        rig.clock.tick();
        let writes = rig.output.writes();

        rig.pin.press(7_000, 7_300);
        rig.time.set_millis(7_000);
        rig.clock.tick();

        assert_eq!(rig.clock.state(), DisplayState::Displayed);
        assert_eq!(rig.source.power_ups(), 1);
        assert_eq!(rig.output.writes(), writes + 30);
        assert_eq!(decode(&rig.output.last().unwrap()), Some((10, 0, 7)));
    }

    #[test]
    fn test_short_press_forces_resync() {
        let mut rig = started();
        rig.pin.press(1_000, 1_200);
        rig.time.set_millis(1_000);

        rig.clock.tick();

        assert_eq!(rig.source.fetches(), 2);
        assert_eq!(rig.clock.state(), DisplayState::Displayed);
        assert_eq!(
            rig.clock.time_base().last_sync(),
            Some(bcd_matrix_clock::Instant::from_millis(1_200))
        );
    }

    #[test]
    fn test_handle_event_none_does_nothing() {
        let mut rig = started();
        rig.clock.handle_event(ButtonEvent::None);
        assert_eq!(rig.source.fetches(), 1);
        assert_eq!(rig.clock.state(), DisplayState::Displayed);
    }

    #[test]
    fn test_error_indicator_without_any_sync() {
        let mut rig = rig_with(ClockConfig::default(), ScriptedSource::failing());
        rig.clock.tick();

        let error = ClockConfig::default().palette.error;
        let cross = Cross(error).frame(rig.time.now());
        let frames = rig.output.frames();

        // Three flashes, then the cross holds
        assert_eq!(frames.len(), 7);
        for flash in 0..3 {
            assert_eq!(frames[flash * 2], cross);
            assert!(frames[flash * 2 + 1].is_dark());
        }
        assert_eq!(frames[6], cross);
        assert_eq!(rig.clock.frame(), &cross);
        assert_eq!(rig.time.millis(), 100 + 1_500);
        assert_eq!(rig.clock.link_health(), LinkHealth::Warning);

        // The held cross is not redrawn as the fallback time advances
        rig.time.set_millis(5_000);
        rig.clock.tick();
        assert_eq!(rig.output.writes(), 7);
    }

    #[test]
    fn test_first_sync_replaces_error_indicator() {
        let mut rig = rig_with(ClockConfig::default(), ScriptedSource::failing());
        rig.clock.tick();

        rig.source.set_sample(Some(SAMPLE));
        rig.pin.press(3_000, 3_200);
        rig.time.set_millis(3_000);
        rig.clock.tick();

        assert!(rig.clock.time_base().has_synced());
        assert_eq!(rig.clock.link_health(), LinkHealth::Ok);
        assert_eq!(decode(&rig.output.last().unwrap()), Some((10, 0, 0)));
    }

    #[test]
    fn test_failure_after_sync_keeps_anchor() {
        let mut rig = started();
        let anchor = rig.clock.time_base().anchor();
        rig.source.set_sample(None);

        assert_eq!(rig.clock.resync(), Err(ClockError::TimeSourceUnavailable));
        assert_eq!(rig.clock.time_base().anchor(), anchor);
        assert_eq!(rig.clock.link_health(), LinkHealth::Warning);

        // No error indicator once a sync has succeeded
        rig.time.set_millis(1_100);
        rig.clock.tick();
        assert_eq!(decode(&rig.output.last().unwrap()), Some((10, 0, 1)));
    }

    #[test]
    fn test_link_health_escalates_and_recovers() {
        let mut rig = started();
        rig.source.set_sample(None);

        let _ = rig.clock.resync();
        let _ = rig.clock.resync();
        assert_eq!(rig.clock.link_health(), LinkHealth::Warning);
        let _ = rig.clock.resync();
        assert_eq!(rig.clock.link_health(), LinkHealth::Error);
        assert_eq!(rig.clock.consecutive_failures(), 3);

        rig.source.set_sample(Some(SAMPLE));
        assert_eq!(rig.clock.resync(), Ok(()));
        assert_eq!(rig.clock.link_health(), LinkHealth::Ok);
        assert_eq!(rig.clock.consecutive_failures(), 0);
    }

    #[test]
    fn test_disconnected_source_is_not_queried() {
        let mut rig = started();
        rig.source.set_connected(false);

        assert_eq!(rig.clock.resync(), Err(ClockError::TimeSourceUnavailable));
        assert_eq!(rig.source.fetches(), 1);
    }

    #[test]
    fn test_invalid_sample_is_reported() {
        let mut rig = started();
        rig.source
            .set_sample(Some(TimeSample::new(2024, 2, 31, 10, 0, 0)));

        assert_eq!(rig.clock.resync(), Err(ClockError::InvalidTimeSample));
        assert_eq!(rig.clock.link_health(), LinkHealth::Warning);
    }

    #[test]
    fn test_resync_when_due() {
        let mut config = ClockConfig::default();
        config.time.resync_interval = Duration::from_secs(10);
        let mut rig = rig_with(config, ScriptedSource::new(SAMPLE));
        rig.clock.tick();

        rig.time.set_millis(5_000);
        rig.clock.tick();
        assert_eq!(rig.source.fetches(), 1);

        rig.time.set_millis(10_100);
        rig.clock.tick();
        assert_eq!(rig.source.fetches(), 2);
        assert_eq!(
            rig.clock.time_base().last_sync(),
            Some(bcd_matrix_clock::Instant::from_millis(10_100))
        );
    }

    #[test]
    fn test_24h_afternoon() {
        let mut config = ClockConfig::default();
        config.time.hour_format = HourFormat::TwentyFour;
        let mut rig = rig_with(
            config,
            ScriptedSource::new(TimeSample::new(2024, 5, 14, 15, 42, 0)),
        );
        rig.clock.tick();

        let last = rig.output.last().unwrap();
        assert_eq!(
            BcdLayout::new(HourFormat::TwentyFour).decode(&last),
            Some((15, 42, 0))
        );
        assert!(rig.clock.reading().is_pm);
    }

    #[test]
    fn test_utc_offset_is_shown() {
        let mut config = ClockConfig::default();
        config.time.utc_offset_secs = -3 * 3_600;
        let mut rig = rig_with(config, ScriptedSource::new(SAMPLE));
        rig.clock.tick();

        assert_eq!(decode(&rig.output.last().unwrap()), Some((7, 0, 0)));
    }

    #[test]
    fn test_seconds_phase_applies_without_fade() {
        // 10:00:05 lights the seconds units bits 0 and 2
        let source = ScriptedSource::new(TimeSample::new(2024, 5, 14, 10, 0, 5));
        let mut rig = rig_with(ClockConfig::default(), source);
        let palette = ClockPalette::default();
        rig.clock.tick();

        // Faded in during the bottom phase
        let first = rig.output.last().unwrap();
        assert_eq!(first.get(7, 0), palette.seconds_accent);
        assert_eq!(first.get(7, 1), palette.seconds);
        let writes = rig.output.writes();

        // 700 ms is in the top phase, same second
        rig.clock.tick();
        assert_eq!(rig.output.writes(), writes + 1);
        assert_eq!(rig.time.millis(), 700);
        let top = rig.output.last().unwrap();
        assert_eq!(top.get(7, 0), palette.seconds);
        assert_eq!(top.get(7, 1), palette.seconds_accent);
        assert_eq!(top.get(7, 5), palette.seconds_accent);
        assert_eq!(decode(&top), Some((10, 0, 5)));

        // Same phase, nothing to do
        rig.clock.tick();
        assert_eq!(rig.output.writes(), writes + 1);

        rig.time.set_millis(1_000);
        rig.clock.tick();
        assert_eq!(rig.output.writes(), writes + 2);
        assert_eq!(rig.output.last().unwrap().get(7, 0), palette.seconds_accent);

        // A new second still crossfades
        rig.time.set_millis(1_100);
        rig.clock.tick();
        assert_eq!(rig.output.writes(), writes + 2 + 15);
        assert_eq!(decode(&rig.output.last().unwrap()), Some((10, 0, 6)));
    }

    #[test]
    fn test_still_seconds_ignore_phase() {
        let source = ScriptedSource::new(TimeSample::new(2024, 5, 14, 10, 0, 5));
        let mut rig = rig_with(still_config(), source);
        rig.clock.tick();
        let writes = rig.output.writes();

        rig.clock.tick();
        rig.time.set_millis(1_000);
        rig.clock.tick();

        assert_eq!(rig.output.writes(), writes);
        let frame = rig.output.last().unwrap();
        assert_eq!(frame.get(7, 0), frame.get(7, 1));
    }
}
