//! Edge cases and configuration files
//!
//! Invalid construction must fail with a typed error; runtime operations on
//! odd inputs must stay finite and never panic.

use beatcore::{
    Clock, DeferredTimers, Envelope, ExponentialDecay, LinearDecay, ManualTimeSource, TapMode,
    TapOutcome, TapPattern, TapPatternConfig, TimingConfig, TimingError,
};
use std::io::Write;
use std::rc::Rc;

#[test]
fn test_invalid_tempo_rejected() {
    let time = ManualTimeSource::new(0.0);
    for ms in [0.0, -10.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            Clock::with_ms_per_beat(time.shared(), ms),
            Err(TimingError::InvalidTempo(_))
        ));
    }
}

#[test]
fn test_simultaneous_taps_are_ignored() {
    let time = ManualTimeSource::new(100.0);
    let mut clock = Clock::new(time.shared());
    assert_eq!(clock.bpm_tap(TapMode::Adjust), TapOutcome::FirstTap);
    assert_eq!(clock.bpm_tap(TapMode::Adjust), TapOutcome::Ignored);
    assert_eq!(clock.ms_per_beat(), 500.0);
}

#[test]
fn test_mode_switch_restarts_sequence() {
    let time = ManualTimeSource::new(0.0);
    let mut clock = Clock::new(time.shared());
    clock.bpm_tap(TapMode::Live);
    time.set(400.0);
    assert_eq!(clock.bpm_tap(TapMode::Accumulating), TapOutcome::FirstTap);
    time.set(800.0);
    // Accumulating trusts the first interval fully
    match clock.bpm_tap(TapMode::Accumulating) {
        TapOutcome::TempoUpdated { bps } => assert!((bps - 2.5).abs() < 1e-9),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_negative_beats_snap_correctly() {
    let time = ManualTimeSource::new(0.0);
    let mut clock = Clock::new(time.shared());
    clock.repeat_beat();
    clock.repeat_beat();
    clock.repeat_beat();
    time.set(150.0);
    clock.update();
    // beat -2.7: 1.3 into the bar that starts at -4
    clock.set_bar();
    assert!((clock.beat() - (-3.7)).abs() < 1e-9);
}

#[test]
fn test_envelopes_stay_in_range() {
    let mut exp = ExponentialDecay::with_decay(0.5).unwrap();
    let mut lin = LinearDecay::with_decay(0.5).unwrap();
    for i in 0..200 {
        let beat = i as f64 * 0.05;
        if i % 7 == 0 {
            exp.trigger_at(beat, 1.0);
            lin.trigger_at(beat, 1.0);
        }
        for v in [exp.value_at(beat), lin.value_at(beat)] {
            assert!(v.is_finite());
            assert!(v >= 0.0);
        }
    }
    // Stacked retriggers can overshoot 1 but stay bounded by the geometric sum
    exp.trigger_at(100.0, 1.0);
    exp.trigger_at(100.0, 1.0);
    exp.trigger_at(100.0, 1.0);
    assert!(exp.value_at(100.0) < 2.0);
}

#[test]
fn test_envelope_follows_clock() {
    let time = ManualTimeSource::new(0.0);
    let mut clock = Clock::new(time.shared());
    let mut env = LinearDecay::with_decay(2.0).unwrap();
    env.trigger(&clock, 1.0);
    time.set(500.0);
    clock.update();
    assert!((env.value(&clock) - 0.5).abs() < 1e-9);
    time.set(1000.0);
    clock.update();
    assert_eq!(env.value(&clock), 0.0);
}

#[test]
fn test_pattern_survives_removed_queue() {
    let time = ManualTimeSource::new(0.0);
    let mut clock = Clock::new(time.shared());
    let timers = DeferredTimers::shared(time.shared());
    let mut pattern = TapPattern::new(
        &mut clock,
        Rc::clone(&timers),
        &TapPatternConfig::default(),
        |_| {},
        || {},
    )
    .unwrap();

    clock.remove_queue(pattern.queue_handle());
    pattern.tap(&mut clock, 1.0);
    pattern.release(&mut clock);
    pattern.stop(&mut clock);
    assert!(pattern.pattern().is_empty());
}

#[test]
fn test_load_ron_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timing.ron");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "(clock: (initial_bpm: 100.0), tap_pattern: (beats_per_cycle: 16.0))"
    )
    .unwrap();
    drop(file);

    let config = TimingConfig::load(&path).unwrap();
    assert_eq!(config.clock.initial_bpm, 100.0);
    assert_eq!(config.tap_pattern.beats_per_cycle, 16.0);

    let time = ManualTimeSource::new(0.0);
    let clock = Clock::from_config(time.shared(), &config.clock).unwrap();
    assert!((clock.ms_per_beat() - 600.0).abs() < 1e-9);
}

#[test]
fn test_save_and_load_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timing.json");

    let mut config = TimingConfig::default();
    config.envelope.decay_in_beats = 3.0;
    config.clock.tap_presets.live.gap_beats = 5.0;
    config.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.trim_start().starts_with('{'));
    assert_eq!(TimingConfig::load(&path).unwrap(), config);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        TimingConfig::load(dir.path().join("absent.ron")),
        Err(TimingError::Io(_))
    ));
}
