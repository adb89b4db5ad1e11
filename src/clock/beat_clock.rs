// Beat clock - Global musical time driven by the render loop
//
// Owns elapsed time, the fractional beat, tap-tempo estimation and the smooth
// beat-phase correction that follows each tap. Registered lookahead queues
// and time accumulators are driven from `tick`.

use super::accumulator::TimeAccumulator;
use super::registry::{Handle, Registry};
use super::tap_tempo::{TapMode, TapOutcome, TapPresets, TapTempoParams};
use super::time_source::TimeSource;
use crate::config::ClockConfig;
use crate::error::{TimingResult, check_ms_per_beat};
use crate::scheduler::LookaheadQueue;
use std::rc::Rc;

/// Listener notified with the new tempo in beats per second
pub type TempoListener = Box<dyn FnMut(f64)>;

pub type QueueHandle = Handle<LookaheadQueue>;
pub type AccumulatorHandle = Handle<TimeAccumulator>;
pub type ListenerHandle = Handle<TempoListener>;

pub const BEATS_PER_BAR: f64 = 4.0;
pub const BEATS_PER_STROPHE: f64 = 16.0;

/// Default exponent for `Clock::sustain`
pub const DEFAULT_SUSTAIN_EXPONENT: f64 = 0.3;

/// Beat clock
///
/// `tick` must be called once per rendered frame. `update` may be called any
/// number of times in between when a fresh beat reading is needed.
pub struct Clock {
    time: Rc<dyn TimeSource>,

    elapsed_ms: f64,
    beat: f64,
    ms_per_beat: f64,

    // Frame timing
    previous_tick_ms: f64,
    previous_update_ms: f64,
    tick_delta_ms: f64,
    fps: f64,
    smooth_fps: f64,

    // Phase correction window (elapsed_ms based)
    beat_shift_until: f64,
    beat_shift_per_ms: f64,

    // Tap tempo
    presets: TapPresets,
    last_tap_ms: f64,
    last_tap_mode: Option<TapMode>,
    change_factor: f64,
    shift_factor: f64,

    queues: Registry<LookaheadQueue>,
    accumulators: Registry<TimeAccumulator>,
    listeners: Registry<TempoListener>,
}

impl Clock {
    /// Clock at 120 BPM with default tap presets
    pub fn new(time: Rc<dyn TimeSource>) -> Self {
        let presets = TapPresets::default();
        let now = time.now_ms();
        Self {
            time,
            elapsed_ms: 0.0,
            beat: 0.0,
            ms_per_beat: 500.0,
            previous_tick_ms: now,
            previous_update_ms: now,
            tick_delta_ms: 0.0,
            fps: 0.0,
            smooth_fps: 0.0,
            beat_shift_until: 0.0,
            beat_shift_per_ms: 0.0,
            presets,
            last_tap_ms: f64::NEG_INFINITY,
            last_tap_mode: None,
            change_factor: presets.live.initial_change_factor,
            shift_factor: presets.live.initial_shift_factor,
            queues: Registry::new(),
            accumulators: Registry::new(),
            listeners: Registry::new(),
        }
    }

    /// Clock with an explicit starting tempo
    pub fn with_ms_per_beat(time: Rc<dyn TimeSource>, ms_per_beat: f64) -> TimingResult<Self> {
        let mut clock = Self::new(time);
        clock.ms_per_beat = check_ms_per_beat(ms_per_beat)?;
        Ok(clock)
    }

    pub fn from_config(time: Rc<dyn TimeSource>, config: &ClockConfig) -> TimingResult<Self> {
        config.validate()?;
        let mut clock = Self::with_ms_per_beat(time, 60_000.0 / config.initial_bpm)?;
        clock.presets = config.tap_presets;
        Ok(clock)
    }

    /// Per-frame driver: frame stats, `update`, queue drain, accumulators
    pub fn tick(&mut self) {
        let now = self.time.now_ms();
        self.tick_delta_ms = now - self.previous_tick_ms;
        self.previous_tick_ms = now;

        let delta_s = self.tick_delta_s();
        if delta_s > 0.0 {
            self.fps = 1.0 / delta_s;
            self.smooth_fps = self.smooth_fps * 0.9 + 0.1 * self.fps;
        }

        self.update();
        self.notify_queues();
        for accumulator in self.accumulators.iter_mut() {
            accumulator.tick(delta_s);
        }
    }

    /// Advance elapsed time and beat to the current time source reading
    pub fn update(&mut self) {
        let now = self.time.now_ms();
        let delta_ms = now - self.previous_update_ms;
        self.previous_update_ms = now;

        // Remaining correction window before this update's span
        let shift_remaining = self.beat_shift_until - self.elapsed_ms;
        if shift_remaining > 0.0 {
            self.beat += self.beat_shift_per_ms * shift_remaining.min(delta_ms);
        }

        self.elapsed_ms += delta_ms;
        self.beat += delta_ms / self.ms_per_beat;
    }

    fn notify_queues(&mut self) {
        let beat = self.beat;
        let ms_per_beat = self.ms_per_beat;
        for queue in self.queues.iter_mut() {
            queue.notify(beat, ms_per_beat);
        }
    }

    /// Tap tempo using the configured preset for `mode`
    pub fn bpm_tap(&mut self, mode: TapMode) -> TapOutcome {
        let params = self.presets.params(mode);
        self.bpm_tap_with(mode, params)
    }

    /// Tap tempo with explicit smoothing parameters
    ///
    /// The first tap of a sequence (new mode, or a gap longer than
    /// `gap_beats`) only records its time. Every following tap blends the
    /// tempo toward the observed interval and starts a one-beat correction
    /// window that pulls the phase toward the nearest whole beat.
    ///
    /// Parameters that fail `TapTempoParams::validate` leave the clock
    /// untouched and the tap is ignored.
    pub fn bpm_tap_with(&mut self, mode: TapMode, params: TapTempoParams) -> TapOutcome {
        if let Err(e) = params.validate() {
            log::warn!("{} tap ignored: {}", mode, e);
            return TapOutcome::Ignored;
        }
        let now = self.time.now_ms();
        let gap_ms = self.ms_per_beat * params.gap_beats;

        if self.last_tap_mode != Some(mode) || self.last_tap_ms < now - gap_ms {
            self.last_tap_mode = Some(mode);
            self.last_tap_ms = now;
            self.change_factor = params.initial_change_factor;
            self.shift_factor = params.initial_shift_factor;
            log::debug!("{} tap sequence started", mode);
            return TapOutcome::FirstTap;
        }

        let delta = now - self.last_tap_ms;
        if delta <= 0.0 {
            log::trace!("{} tap ignored: no time since previous tap", mode);
            return TapOutcome::Ignored;
        }

        self.update();

        self.ms_per_beat = self.ms_per_beat * (1.0 - self.change_factor) + delta * self.change_factor;
        self.last_tap_ms = now;

        let phase = self.beat.rem_euclid(1.0);
        self.beat_shift_per_ms = if phase < 0.5 {
            -(phase * self.shift_factor) / self.ms_per_beat
        } else {
            ((1.0 - phase) * self.shift_factor) / self.ms_per_beat
        };
        self.beat_shift_until = self.elapsed_ms + self.ms_per_beat;

        self.change_factor *= params.factor_reduction;
        self.shift_factor *= params.factor_reduction;

        let bps = self.bps();
        log::debug!(
            "{} tap: {:.2} BPM, phase {:.3}, shifting {:+.4} beats",
            mode,
            bps * 60.0,
            phase,
            self.beat_shift_per_ms * self.ms_per_beat
        );
        for listener in self.listeners.iter_mut() {
            listener(bps);
        }
        TapOutcome::TempoUpdated { bps }
    }

    /// Move the bar boundary to the nearest beat (whole-beat jump)
    pub fn set_bar(&mut self) {
        self.update();
        self.snap_to(BEATS_PER_BAR);
    }

    /// Move the strophe (4 bar) boundary to the nearest beat
    pub fn set_strophe(&mut self) {
        self.update();
        self.snap_to(BEATS_PER_STROPHE);
    }

    // Exact midpoint snaps backward
    fn snap_to(&mut self, unit_beats: f64) {
        let phase = (self.beat / unit_beats).rem_euclid(1.0) * unit_beats;
        let target = phase.round();
        if target > unit_beats / 2.0 {
            self.beat += unit_beats - target;
        } else {
            self.beat -= target;
        }
        log::debug!("snapped {}-beat boundary, beat now {:.3}", unit_beats, self.beat);
    }

    /// Play the current beat again
    pub fn repeat_beat(&mut self) {
        self.beat -= 1.0;
    }

    /// Jump one beat ahead
    pub fn skip_beat(&mut self) {
        self.beat += 1.0;
    }

    /// Frame-rate independent per-tick decay multiplier
    pub fn sustain(&self, exponent: f64) -> f64 {
        exponent.powf(self.tick_delta_s())
    }

    // Registration

    pub fn register_queue(&mut self, queue: LookaheadQueue) -> QueueHandle {
        self.queues.insert(queue)
    }

    pub fn remove_queue(&mut self, handle: QueueHandle) -> Option<LookaheadQueue> {
        self.queues.remove(handle)
    }

    pub fn queue(&self, handle: QueueHandle) -> Option<&LookaheadQueue> {
        self.queues.get(handle)
    }

    pub fn queue_mut(&mut self, handle: QueueHandle) -> Option<&mut LookaheadQueue> {
        self.queues.get_mut(handle)
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    pub fn register_accumulator(&mut self, accumulator: TimeAccumulator) -> AccumulatorHandle {
        self.accumulators.insert(accumulator)
    }

    pub fn remove_accumulator(&mut self, handle: AccumulatorHandle) -> Option<TimeAccumulator> {
        self.accumulators.remove(handle)
    }

    pub fn accumulator(&self, handle: AccumulatorHandle) -> Option<&TimeAccumulator> {
        self.accumulators.get(handle)
    }

    pub fn accumulator_mut(&mut self, handle: AccumulatorHandle) -> Option<&mut TimeAccumulator> {
        self.accumulators.get_mut(handle)
    }

    pub fn add_tempo_listener(&mut self, listener: impl FnMut(f64) + 'static) -> ListenerHandle {
        self.listeners.insert(Box::new(listener))
    }

    pub fn remove_tempo_listener(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.remove(handle).is_some()
    }

    // Accessors

    /// Current time source reading (not the clock's elapsed time)
    pub fn now_ms(&self) -> f64 {
        self.time.now_ms()
    }

    pub fn time_source(&self) -> Rc<dyn TimeSource> {
        Rc::clone(&self.time)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn seconds(&self) -> f64 {
        self.elapsed_ms * 0.001
    }

    pub fn beat(&self) -> f64 {
        self.beat
    }

    pub fn bar(&self) -> f64 {
        self.beat / BEATS_PER_BAR
    }

    pub fn strophe(&self) -> f64 {
        self.beat / BEATS_PER_STROPHE
    }

    pub fn ms_per_beat(&self) -> f64 {
        self.ms_per_beat
    }

    /// Beats per second
    pub fn bps(&self) -> f64 {
        1000.0 / self.ms_per_beat
    }

    pub fn bpm(&self) -> f64 {
        60_000.0 / self.ms_per_beat
    }

    pub fn tick_delta_ms(&self) -> f64 {
        self.tick_delta_ms
    }

    pub fn tick_delta_s(&self) -> f64 {
        self.tick_delta_ms * 0.001
    }

    pub fn tick_delta_beats(&self) -> f64 {
        self.tick_delta_ms / self.ms_per_beat
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn smooth_fps(&self) -> f64 {
        self.smooth_fps
    }

    /// True while a tap phase correction is still being applied
    pub fn is_shifting(&self) -> bool {
        self.beat_shift_until > self.elapsed_ms && self.beat_shift_per_ms != 0.0
    }

    pub fn tap_presets(&self) -> &TapPresets {
        &self.presets
    }

    /// Replace the tap presets; invalid presets leave the current ones
    pub fn set_tap_presets(&mut self, presets: TapPresets) -> TimingResult<()> {
        presets.validate()?;
        self.presets = presets;
        Ok(())
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("elapsed_ms", &self.elapsed_ms)
            .field("beat", &self.beat)
            .field("ms_per_beat", &self.ms_per_beat)
            .field("queues", &self.queues.len())
            .field("accumulators", &self.accumulators.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualTimeSource;
    use std::cell::RefCell;

    const EPS: f64 = 1e-9;

    fn manual_clock() -> (ManualTimeSource, Clock) {
        let time = ManualTimeSource::new(0.0);
        let clock = Clock::new(time.shared());
        (time, clock)
    }

    #[test]
    fn test_defaults() {
        let (_time, clock) = manual_clock();
        assert_eq!(clock.beat(), 0.0);
        assert_eq!(clock.ms_per_beat(), 500.0);
        assert_eq!(clock.bpm(), 120.0);
        assert_eq!(clock.bps(), 2.0);
    }

    #[test]
    fn test_invalid_tempo_rejected() {
        let time = ManualTimeSource::new(0.0);
        assert!(Clock::with_ms_per_beat(time.shared(), 0.0).is_err());
        assert!(Clock::with_ms_per_beat(time.shared(), -5.0).is_err());
        assert!(Clock::with_ms_per_beat(time.shared(), 250.0).is_ok());
    }

    #[test]
    fn test_update_advances_beat() {
        let (time, mut clock) = manual_clock();
        time.advance(250.0);
        clock.update();
        assert!((clock.beat() - 0.5).abs() < EPS);
        assert!((clock.elapsed_ms() - 250.0).abs() < EPS);

        time.advance(1750.0);
        clock.update();
        assert!((clock.beat() - 4.0).abs() < EPS);
        assert!((clock.bar() - 1.0).abs() < EPS);
        assert!((clock.seconds() - 2.0).abs() < EPS);
    }

    #[test]
    fn test_update_between_ticks_counts_once() {
        let (time, mut clock) = manual_clock();
        time.advance(100.0);
        clock.update();
        time.advance(100.0);
        clock.tick();

        // Tick delta covers both steps, beat covers them exactly once
        assert!((clock.tick_delta_ms() - 200.0).abs() < EPS);
        assert!((clock.beat() - 0.4).abs() < EPS);
    }

    #[test]
    fn test_tick_frame_stats() {
        let (time, mut clock) = manual_clock();
        time.advance(20.0);
        clock.tick();
        assert!((clock.fps() - 50.0).abs() < EPS);
        assert!((clock.smooth_fps() - 5.0).abs() < EPS);

        time.advance(20.0);
        clock.tick();
        assert!((clock.smooth_fps() - (5.0 * 0.9 + 5.0)).abs() < EPS);
        assert!((clock.tick_delta_beats() - 0.04).abs() < EPS);
    }

    #[test]
    fn test_sustain_is_frame_rate_independent() {
        let (time, mut clock) = manual_clock();
        time.advance(500.0);
        clock.tick();
        let half_second = clock.sustain(0.3);

        let (time2, mut clock2) = manual_clock();
        let mut product = 1.0;
        for _ in 0..10 {
            time2.advance(50.0);
            clock2.tick();
            product *= clock2.sustain(0.3);
        }
        assert!((half_second - product).abs() < 1e-9);
        assert!((half_second - 0.3f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_first_tap_only_bookkeeping() {
        let (time, mut clock) = manual_clock();
        time.advance(1000.0);
        assert_eq!(clock.bpm_tap(TapMode::Live), TapOutcome::FirstTap);
        assert_eq!(clock.ms_per_beat(), 500.0);
        assert!(!clock.is_shifting());
    }

    #[test]
    fn test_mode_switch_restarts_sequence() {
        let (time, mut clock) = manual_clock();
        clock.bpm_tap(TapMode::Live);
        time.advance(400.0);
        assert_eq!(clock.bpm_tap(TapMode::Adjust), TapOutcome::FirstTap);
        time.advance(400.0);
        assert!(matches!(
            clock.bpm_tap(TapMode::Adjust),
            TapOutcome::TempoUpdated { .. }
        ));
    }

    #[test]
    fn test_gap_restarts_sequence() {
        let (time, mut clock) = manual_clock();
        clock.bpm_tap(TapMode::Live);
        // Live gap: 7 beats = 3500 ms at 120 BPM
        time.advance(3600.0);
        assert_eq!(clock.bpm_tap(TapMode::Live), TapOutcome::FirstTap);
        time.advance(3400.0);
        assert!(matches!(
            clock.bpm_tap(TapMode::Live),
            TapOutcome::TempoUpdated { .. }
        ));
    }

    #[test]
    fn test_live_tap_blends_tempo() {
        let (time, mut clock) = manual_clock();
        clock.bpm_tap(TapMode::Live);
        time.advance(400.0);
        let outcome = clock.bpm_tap(TapMode::Live);

        // 500 * 0.8 + 400 * 0.2
        assert!((clock.ms_per_beat() - 480.0).abs() < EPS);
        match outcome {
            TapOutcome::TempoUpdated { bps } => assert!((bps - 1000.0 / 480.0).abs() < EPS),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_accumulating_taps_converge_with_reduction() {
        let (time, mut clock) = manual_clock();
        clock.bpm_tap(TapMode::Accumulating);
        time.advance(600.0);
        clock.bpm_tap(TapMode::Accumulating);
        // change factor 1: adopts the interval outright
        assert!((clock.ms_per_beat() - 600.0).abs() < EPS);

        time.advance(400.0);
        clock.bpm_tap(TapMode::Accumulating);
        // change factor now 0.8
        assert!((clock.ms_per_beat() - (600.0 * 0.2 + 400.0 * 0.8)).abs() < EPS);
    }

    #[test]
    fn test_invalid_tap_params_ignored() {
        let (time, mut clock) = manual_clock();
        let runaway = TapTempoParams {
            initial_change_factor: 3.0,
            ..TapTempoParams::live()
        };
        assert_eq!(clock.bpm_tap_with(TapMode::Live, runaway), TapOutcome::Ignored);
        clock.bpm_tap(TapMode::Live);
        time.advance(400.0);
        assert_eq!(clock.bpm_tap_with(TapMode::Live, runaway), TapOutcome::Ignored);

        // Still 120 BPM and the beat keeps moving forward
        assert_eq!(clock.ms_per_beat(), 500.0);
        let before = clock.beat();
        time.advance(100.0);
        clock.update();
        assert!(clock.beat() > before);
    }

    #[test]
    fn test_set_tap_presets_validates() {
        let (_time, mut clock) = manual_clock();
        let bad = TapPresets {
            live: TapTempoParams {
                gap_beats: -1.0,
                ..TapTempoParams::live()
            },
            ..TapPresets::default()
        };
        assert!(clock.set_tap_presets(bad).is_err());
        assert_eq!(*clock.tap_presets(), TapPresets::default());

        let slow = TapPresets {
            live: TapTempoParams::adjust(),
            ..TapPresets::default()
        };
        assert!(clock.set_tap_presets(slow).is_ok());
        assert_eq!(clock.tap_presets().live, TapTempoParams::adjust());
    }

    #[test]
    fn test_tempo_listeners() {
        let (time, mut clock) = manual_clock();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let handle = clock.add_tempo_listener(move |bps| s.borrow_mut().push(bps));

        clock.bpm_tap(TapMode::Live);
        assert!(seen.borrow().is_empty());
        time.advance(500.0);
        clock.bpm_tap(TapMode::Live);
        assert_eq!(seen.borrow().len(), 1);
        assert!((seen.borrow()[0] - 2.0).abs() < EPS);

        assert!(clock.remove_tempo_listener(handle));
        time.advance(500.0);
        clock.bpm_tap(TapMode::Live);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_tap_correction_pulls_backward() {
        let (time, mut clock) = manual_clock();
        clock.bpm_tap(TapMode::Live);
        // Tap at beat 1.2: phase 0.2 < 0.5, pulled back
        time.advance(600.0);
        clock.bpm_tap(TapMode::Live);
        let tempo = clock.ms_per_beat();
        let beat_at_tap = clock.beat();
        assert!((beat_at_tap - 1.2).abs() < EPS);
        assert!(clock.is_shifting());

        // Step across more than the window
        for _ in 0..20 {
            time.advance(50.0);
            clock.update();
        }
        let plain = 1000.0 / tempo;
        let shift = clock.beat() - beat_at_tap - plain;
        // -phase * shift_factor = -0.2 * 0.5
        assert!((shift - (-0.1)).abs() < 1e-9, "shift {}", shift);
        assert!(!clock.is_shifting());
    }

    #[test]
    fn test_tap_correction_pushes_forward() {
        let (time, mut clock) = manual_clock();
        clock.bpm_tap(TapMode::Live);
        // 0.9 beat later: phase 0.9 >= 0.5, pushed forward by 0.1 * 0.5
        time.advance(450.0);
        clock.bpm_tap(TapMode::Live);
        let tempo = clock.ms_per_beat();
        let beat_at_tap = clock.beat();

        time.advance(2000.0);
        clock.update();
        let shift = clock.beat() - beat_at_tap - 2000.0 / tempo;
        assert!((shift - 0.05).abs() < 1e-9, "shift {}", shift);
    }

    #[test]
    fn test_tap_correction_spread_over_window() {
        let (time, mut clock) = manual_clock();
        clock.bpm_tap(TapMode::Live);
        time.advance(600.0);
        clock.bpm_tap(TapMode::Live);
        let tempo = clock.ms_per_beat();
        let beat_at_tap = clock.beat();

        // Half the window: half the correction
        time.advance(tempo / 2.0);
        clock.update();
        let shift = clock.beat() - beat_at_tap - 0.5;
        assert!((shift - (-0.05)).abs() < 1e-9, "shift {}", shift);
    }

    #[test]
    fn test_set_bar_snaps_backward_below_midpoint() {
        let (time, mut clock) = manual_clock();
        // beat 5.3: bar phase 1.3 beats, target 1
        time.advance(5.3 * 500.0);
        clock.set_bar();
        assert!((clock.beat() - 4.3).abs() < 1e-9);
    }

    #[test]
    fn test_set_bar_snaps_forward_above_midpoint() {
        let (time, mut clock) = manual_clock();
        // beat 6.7: bar phase 2.7, target 3 > 2, forward by 1
        time.advance(6.7 * 500.0);
        clock.set_bar();
        assert!((clock.beat() - 7.7).abs() < 1e-9);
    }

    #[test]
    fn test_set_bar_midpoint_snaps_backward() {
        let (time, mut clock) = manual_clock();
        time.advance(6.0 * 500.0);
        clock.set_bar();
        assert!((clock.beat() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_bar_idempotent() {
        let (time, mut clock) = manual_clock();
        time.advance(7.4 * 500.0);
        clock.set_bar();
        let first = clock.beat();
        clock.set_bar();
        assert_eq!(clock.beat(), first);
    }

    #[test]
    fn test_set_strophe() {
        let (time, mut clock) = manual_clock();
        // beat 25: strophe phase 9 > 8, forward by 7
        time.advance(25.0 * 500.0);
        clock.set_strophe();
        assert!((clock.beat() - 32.0).abs() < 1e-9);

        // beat 40: phase 8 (midpoint), backward
        time.advance(8.0 * 500.0);
        clock.set_strophe();
        assert!((clock.beat() - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_repeat_and_skip_beat() {
        let (_time, mut clock) = manual_clock();
        clock.skip_beat();
        clock.skip_beat();
        clock.repeat_beat();
        assert_eq!(clock.beat(), 1.0);
    }

    #[test]
    fn test_accumulators_follow_tick() {
        let (time, mut clock) = manual_clock();
        let fast = clock.register_accumulator(TimeAccumulator::new(2.0));
        let slow = clock.register_accumulator(TimeAccumulator::new(0.5));

        time.advance(100.0);
        clock.tick();
        // update alone does not advance accumulators
        time.advance(100.0);
        clock.update();

        assert!((clock.accumulator(fast).unwrap().time() - 0.2).abs() < EPS);
        assert!((clock.accumulator(slow).unwrap().time() - 0.05).abs() < EPS);

        clock.accumulator_mut(fast).unwrap().set_speed_factor(0.0);
        let removed = clock.remove_accumulator(slow).unwrap();
        assert!((removed.time() - 0.05).abs() < EPS);
        assert!(clock.accumulator(slow).is_none());
    }

    #[test]
    fn test_tick_drains_registered_queues() {
        let (time, mut clock) = manual_clock();
        let fired = Rc::new(RefCell::new(Vec::new()));

        let mut queue = LookaheadQueue::new(4.0, 70.0).unwrap();
        let f = Rc::clone(&fired);
        // cycle 1 = beat 4 = 2000 ms
        queue.when_t(1.0, move |_, ms_till| f.borrow_mut().push(ms_till));
        let handle = clock.register_queue(queue);

        time.set(1900.0);
        clock.tick();
        assert!(fired.borrow().is_empty());

        time.set(1950.0);
        clock.tick();
        assert_eq!(fired.borrow().len(), 1);
        assert!((fired.borrow()[0] - 50.0).abs() < 1e-6);

        assert!(clock.remove_queue(handle).is_some());
        assert_eq!(clock.queue_count(), 0);
    }
}
