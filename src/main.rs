// beatcore demo - Simulated performance session on a manual time source
//
// Usage: beatcore [config.ron|config.json]
// Set RUST_LOG=debug (or trace) to follow tempo changes and queue drains.

use beatcore::{
    Clock, DeferredTimers, Envelope, ExponentialDecay, ManualTimeSource, SmoothValue, TapMode,
    TapPattern, TimeAccumulator, TimeSource, TimingConfig, TimingResult,
};
use std::cell::RefCell;
use std::rc::Rc;

// One rendered frame at 60 FPS
const FRAME_MS: f64 = 1000.0 / 60.0;
// Timer poll granularity between frames
const POLL_MS: f64 = 1.0;

#[derive(Debug, Clone, Copy)]
enum PadEvent {
    On(f64),
    Off,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("beatcore demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> TimingResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            TimingConfig::load(&path)?
        }
        None => TimingConfig::default(),
    };

    let time = ManualTimeSource::new(0.0);
    let mut clock = Clock::from_config(time.shared(), &config.clock)?;
    let timers = DeferredTimers::shared(time.shared());

    clock.add_tempo_listener(|bps| log::info!("Tempo now {:.2} BPM", bps * 60.0));
    let slow_motion = clock.register_accumulator(TimeAccumulator::new(0.5));

    let events = Rc::new(RefCell::new(Vec::new()));
    let on_events = Rc::clone(&events);
    let off_events = Rc::clone(&events);
    let mut pattern = TapPattern::new(
        &mut clock,
        Rc::clone(&timers),
        &config.tap_pattern,
        move |velocity| on_events.borrow_mut().push(PadEvent::On(velocity)),
        move || off_events.borrow_mut().push(PadEvent::Off),
    )?;

    let mut envelope = ExponentialDecay::from_config(&config.envelope)?;
    let mut brightness = SmoothValue::new(0.0);

    let run_until = |clock: &mut Clock, end_ms: f64| {
        let mut next_frame = time.now_ms() + FRAME_MS;
        while time.now_ms() < end_ms {
            time.advance(POLL_MS);
            if time.now_ms() >= next_frame {
                clock.tick();
                next_frame += FRAME_MS;
            }
            timers.run_due();
        }
    };

    // Operator taps four beats at 125 BPM
    log::info!("Tapping tempo...");
    for i in 0..4 {
        run_until(&mut clock, 1000.0 + i as f64 * 480.0);
        clock.bpm_tap(TapMode::Live);
    }

    // Align the downbeat, then record a three-tap rhythm
    clock.set_bar();
    log::info!("Recording pattern at beat {:.2}", clock.beat());
    let start = time.now_ms();
    for (offset_ms, hold_ms, velocity) in [(0.0, 200.0, 1.0), (600.0, 100.0, 0.6), (900.0, 300.0, 0.8)] {
        run_until(&mut clock, start + offset_ms);
        pattern.tap(&mut clock, velocity);
        run_until(&mut clock, start + offset_ms + hold_ms);
        pattern.release(&mut clock);
    }
    log::info!("Recorded {} taps", pattern.pattern().len());

    // Let the pattern loop while an envelope follows the pad
    let session_end = time.now_ms() + 8000.0;
    while time.now_ms() < session_end {
        run_until(&mut clock, time.now_ms() + FRAME_MS);

        for event in events.borrow_mut().drain(..) {
            match event {
                PadEvent::On(velocity) => {
                    envelope.trigger(&clock, velocity);
                    log::debug!("pad on {:.2} at beat {:.3}", velocity, clock.beat());
                }
                PadEvent::Off => log::debug!("pad off at beat {:.3}", clock.beat()),
            }
        }

        brightness.set_target(envelope.value(&clock));
        brightness.update(&clock, 0.3);
    }

    log::info!(
        "Session done: beat {:.2}, bar {:.2}, {:.1} BPM, {:.1} FPS, {} loops",
        clock.beat(),
        clock.bar(),
        clock.bpm(),
        clock.smooth_fps(),
        pattern.loop_count()
    );
    if let Some(accumulator) = clock.accumulator(slow_motion) {
        log::info!("Half-speed time: {:.2} s", accumulator.time());
    }
    log::info!("Final brightness {:.3}", brightness.value());

    pattern.detach(&mut clock);
    Ok(())
}
