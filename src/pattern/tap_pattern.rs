// Tap pattern - Record operator taps over one cycle and loop them
//
// Recording captures taps as cycle-relative phases. One cycle after the first
// tap, playback starts and alternates on/off edges through the pattern's own
// lookahead queue. Every dequeued edge is finished by a deferred one-shot
// timer; those timers cannot be retracted, so each checks the suppress flag
// and the generation it was issued in before touching the callbacks.

use super::tap::{PatternState, Tap};
use crate::clock::{Clock, QueueHandle};
use crate::config::TapPatternConfig;
use crate::error::TimingResult;
use crate::scheduler::{DeferredTimers, LookaheadQueue};
use std::cell::RefCell;
use std::rc::Rc;

struct PatternCore {
    pattern: Vec<Tap>,
    /// Tap whose edges are being played
    playhead: usize,
    /// Recorded tap still held down
    held: Option<usize>,
    /// Cycle position of the first tap of the recording
    record_start: f64,
    /// First loop start; loop `n` starts at `loop_anchor + n`
    loop_anchor: f64,
    loop_count: u64,
    suppress_callbacks: bool,
    generation: u64,
    state: PatternState,
    sounding: bool,
}

impl PatternCore {
    fn cycle_start(&self) -> f64 {
        self.loop_anchor + self.loop_count as f64
    }
}

struct Shared {
    core: RefCell<PatternCore>,
    on_on: RefCell<Box<dyn FnMut(f64)>>,
    on_off: RefCell<Box<dyn FnMut()>>,
    timers: Rc<DeferredTimers>,
}

impl Shared {
    fn fire_on(&self, velocity: f64) {
        self.core.borrow_mut().sounding = true;
        (self.on_on.borrow_mut())(velocity);
    }

    fn fire_off(&self) {
        self.core.borrow_mut().sounding = false;
        (self.on_off.borrow_mut())();
    }

    /// Issue a deferred effect that only runs if nothing invalidated it
    fn defer(
        self: &Rc<Self>,
        ms_till: f64,
        generation: u64,
        effect: impl FnOnce(&Shared) + 'static,
    ) {
        let shared = Rc::clone(self);
        self.timers.schedule_after(ms_till, move || {
            let live = {
                let core = shared.core.borrow();
                !core.suppress_callbacks && core.generation == generation
            };
            if live {
                effect(&shared);
            } else {
                log::trace!("suppressed stale pattern edge (generation {})", generation);
            }
        });
    }
}

/// Loop start: lift suppression, replay the first tap, then schedule its off
fn schedule_cycle_start(shared: &Rc<Shared>, queue: &mut LookaheadQueue, deadline: f64, generation: u64) {
    let shared = Rc::clone(shared);
    queue.when_t(deadline, move |queue, ms_till| {
        {
            let mut core = shared.core.borrow_mut();
            core.playhead = 0;
        }
        let s = Rc::clone(&shared);
        shared.timers.schedule_after(ms_till, move || {
            let velocity = {
                let mut core = s.core.borrow_mut();
                if core.generation != generation {
                    log::trace!("suppressed stale loop start (generation {})", generation);
                    return;
                }
                core.suppress_callbacks = false;
                core.pattern.first().map(|tap| tap.velocity)
            };
            if let Some(velocity) = velocity {
                s.fire_on(velocity);
            }
        });
        wait_for_off(&shared, queue);
    });
}

fn wait_for_off(shared: &Rc<Shared>, queue: &mut LookaheadQueue) {
    let (deadline, generation) = {
        let mut core = shared.core.borrow_mut();
        let Some(tap) = core.pattern.get(core.playhead).copied() else {
            return;
        };
        core.state = PatternState::WaitingForOff;
        (core.cycle_start() + tap.off_phase(), core.generation)
    };
    let shared = Rc::clone(shared);
    queue.when_t(deadline, move |queue, ms_till| {
        shared.defer(ms_till, generation, |s| s.fire_off());
        wait_for_on(&shared, queue);
    });
}

fn wait_for_on(shared: &Rc<Shared>, queue: &mut LookaheadQueue) {
    let (next, cycle_start, generation) = {
        let mut core = shared.core.borrow_mut();
        core.playhead += 1;
        core.state = PatternState::WaitingForOn;
        (
            core.pattern.get(core.playhead).copied(),
            core.cycle_start(),
            core.generation,
        )
    };
    let shared = Rc::clone(shared);

    match next {
        Some(tap) => {
            queue.when_t(cycle_start + tap.on_phase, move |queue, ms_till| {
                shared.defer(ms_till, generation, move |s| s.fire_on(tap.velocity));
                wait_for_off(&shared, queue);
            });
        }
        None => {
            // Past the last tap: restart on the next loop boundary, counted
            // from the anchor so repeated loops never accumulate drift
            queue.when_t(cycle_start + 1.0, move |queue, ms_till| {
                let first = {
                    let mut core = shared.core.borrow_mut();
                    core.loop_count += 1;
                    core.playhead = 0;
                    core.pattern.first().copied()
                };
                let Some(first) = first else {
                    return;
                };
                shared.defer(ms_till, generation, move |s| s.fire_on(first.velocity));
                wait_for_off(&shared, queue);
            });
        }
    }
}

/// Loopable tap pattern
///
/// Owns a lookahead queue registered with the clock; call `detach` when the
/// pattern is no longer needed.
pub struct TapPattern {
    shared: Rc<Shared>,
    queue: QueueHandle,
    beats_per_cycle: f64,
    latency_compensate_ms: f64,
}

impl TapPattern {
    pub fn new(
        clock: &mut Clock,
        timers: Rc<DeferredTimers>,
        config: &TapPatternConfig,
        on_on: impl FnMut(f64) + 'static,
        on_off: impl FnMut() + 'static,
    ) -> TimingResult<Self> {
        config.validate()?;
        let queue = LookaheadQueue::new(config.beats_per_cycle, config.lookahead_ms)?;
        let queue = clock.register_queue(queue);

        let shared = Rc::new(Shared {
            core: RefCell::new(PatternCore {
                pattern: Vec::new(),
                playhead: 0,
                held: None,
                record_start: f64::NEG_INFINITY,
                loop_anchor: 0.0,
                loop_count: 0,
                suppress_callbacks: false,
                generation: 0,
                state: PatternState::Idle,
                sounding: false,
            }),
            on_on: RefCell::new(Box::new(on_on)),
            on_off: RefCell::new(Box::new(on_off)),
            timers,
        });

        Ok(Self {
            shared,
            queue,
            beats_per_cycle: config.beats_per_cycle,
            latency_compensate_ms: config.latency_compensate_ms,
        })
    }

    /// Record a tap (and play it live)
    ///
    /// A tap more than one cycle after the recording start begins a new
    /// recording, discarding the old pattern and any pending playback.
    pub fn tap(&mut self, clock: &mut Clock, velocity: f64) {
        clock.update();
        let cycle = self.cycle(clock);
        let mut phase = cycle - self.shared.core.borrow().record_start;

        if phase >= 1.0 {
            if !self.start_recording(clock, cycle) {
                return;
            }
            phase = 0.0;
        }

        let close_previous = {
            let mut core = self.shared.core.borrow_mut();
            // A still-held tap ends where the new one begins
            let close_previous = match core.held.take() {
                Some(index) => {
                    if let Some(previous) = core.pattern.get_mut(index) {
                        previous.duration = (phase - previous.on_phase).max(0.0);
                    }
                    core.sounding
                }
                None => false,
            };
            // The beat can be nudged back mid-recording; taps stay ordered
            // and never start before the previous one ended
            if let Some(last) = core.pattern.last() {
                phase = phase.max(last.off_phase());
            }
            core.pattern.push(Tap::new(phase, velocity));
            core.held = Some(core.pattern.len() - 1);
            close_previous
        };

        if close_previous {
            self.shared.fire_off();
        }
        self.shared.fire_on(velocity);
    }

    fn start_recording(&mut self, clock: &mut Clock, cycle: f64) -> bool {
        let ms_per_cycle = clock.ms_per_beat() * self.beats_per_cycle;
        let Some(queue) = clock.queue_mut(self.queue) else {
            log::warn!("tap pattern queue is no longer registered with the clock");
            return false;
        };
        queue.cancel_all();

        let was_sounding = self.shared.core.borrow().sounding;
        if was_sounding {
            self.shared.fire_off();
        }

        let (loop_anchor, generation) = {
            let mut core = self.shared.core.borrow_mut();
            core.pattern.clear();
            core.held = None;
            core.playhead = 0;
            core.record_start = cycle;
            core.loop_anchor = cycle + 1.0 - self.latency_compensate_ms / ms_per_cycle;
            core.loop_count = 0;
            core.suppress_callbacks = true;
            core.generation += 1;
            core.state = PatternState::Recording;
            (core.loop_anchor, core.generation)
        };
        log::debug!(
            "tap pattern recording at cycle {:.3}, loop starts at {:.3}",
            cycle,
            loop_anchor
        );

        schedule_cycle_start(&self.shared, queue, loop_anchor, generation);
        true
    }

    /// Release the held tap; only effective inside the recording window
    pub fn release(&mut self, clock: &mut Clock) {
        clock.update();
        let cycle = self.cycle(clock);
        let released = {
            let mut core = self.shared.core.borrow_mut();
            let phase = cycle - core.record_start;
            if phase >= 1.0 {
                // Past the window the provisional duration stands
                false
            } else {
                match core.held.take() {
                    Some(index) => {
                        if let Some(tap) = core.pattern.get_mut(index) {
                            tap.duration = (phase - tap.on_phase).max(0.0);
                        }
                        true
                    }
                    None => false,
                }
            }
        };
        if released {
            self.shared.fire_off();
        }
    }

    /// Stop playback and silence a sounding tap
    ///
    /// The off callback fires immediately, exactly once, if a tap is
    /// sounding; its already-issued deferred off is suppressed.
    pub fn stop(&mut self, clock: &mut Clock) {
        let was_sounding = self.shared.core.borrow().sounding;
        if was_sounding {
            self.shared.fire_off();
        }
        {
            let mut core = self.shared.core.borrow_mut();
            core.suppress_callbacks = true;
            core.generation += 1;
            core.held = None;
            core.record_start = f64::NEG_INFINITY;
            core.state = PatternState::Idle;
        }
        if let Some(queue) = clock.queue_mut(self.queue) {
            queue.cancel_all();
        }
        log::debug!("tap pattern stopped");
    }

    /// Manual pad: take over from the pattern and play directly
    pub fn manual_press(&mut self, clock: &mut Clock, velocity: f64) {
        self.stop(clock);
        self.shared.fire_on(velocity);
    }

    /// Manual pad release; silent unless something is sounding
    pub fn manual_release(&mut self) {
        let sounding = self.shared.core.borrow().sounding;
        if sounding {
            self.shared.fire_off();
        }
    }

    /// Stop and deregister the queue from the clock
    pub fn detach(mut self, clock: &mut Clock) {
        self.stop(clock);
        clock.remove_queue(self.queue);
    }

    fn cycle(&self, clock: &Clock) -> f64 {
        clock.beat() / self.beats_per_cycle
    }

    /// Copy of the recorded taps
    pub fn pattern(&self) -> Vec<Tap> {
        self.shared.core.borrow().pattern.clone()
    }

    pub fn state(&self) -> PatternState {
        self.shared.core.borrow().state
    }

    /// Start of the current loop iteration, in cycles
    pub fn cycle_start(&self) -> f64 {
        self.shared.core.borrow().cycle_start()
    }

    /// Completed loop iterations since the recording
    pub fn loop_count(&self) -> u64 {
        self.shared.core.borrow().loop_count
    }

    pub fn is_suppressed(&self) -> bool {
        self.shared.core.borrow().suppress_callbacks
    }

    /// True between an on and its off
    pub fn is_sounding(&self) -> bool {
        self.shared.core.borrow().sounding
    }

    /// True while taps would still join the current recording
    pub fn is_recording(&self, clock: &Clock) -> bool {
        let phase = self.cycle(clock) - self.shared.core.borrow().record_start;
        phase < 1.0
    }

    pub fn beats_per_cycle(&self) -> f64 {
        self.beats_per_cycle
    }

    pub fn queue_handle(&self) -> QueueHandle {
        self.queue
    }
}

impl std::fmt::Debug for TapPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.shared.core.borrow();
        f.debug_struct("TapPattern")
            .field("state", &core.state)
            .field("taps", &core.pattern.len())
            .field("cycle_start", &core.cycle_start())
            .field("suppress_callbacks", &core.suppress_callbacks)
            .field("beats_per_cycle", &self.beats_per_cycle)
            .finish()
    }
}
