// Exponential decay envelope
//
// v(t) = (base^t - sink) * stretch, with base^decay = sink, so the curve starts
// at 1 and lands exactly on 0 at the end of the decay window.

use super::{DEFAULT_STACK_TRIGGERS, Envelope};
use crate::config::EnvelopeConfig;
use crate::error::{TimingError, TimingResult, check_decay, check_stack_triggers};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    decay_in_beats: f64,
    sink: f64,
    stack_triggers: f64,
    base: f64,
    stretch: f64,
    trigger_beat: f64,
}

impl ExponentialDecay {
    /// Default floor of the raw exponential
    pub const DEFAULT_SINK: f64 = 0.001;

    /// Create a decay over `decay_in_beats`
    ///
    /// `sink` must lie in (0, 1): it is the raw value of `base^t` at the end
    /// of the window, subtracted out so the envelope reads 0 there.
    pub fn new(decay_in_beats: f64, sink: f64, stack_triggers: f64) -> TimingResult<Self> {
        let decay_in_beats = check_decay(decay_in_beats)?;
        if !(sink > 0.0 && sink < 1.0) {
            return Err(TimingError::InvalidSink(sink));
        }
        let stack_triggers = check_stack_triggers(stack_triggers)?;
        Ok(Self {
            decay_in_beats,
            sink,
            stack_triggers,
            base: sink.powf(1.0 / decay_in_beats),
            stretch: 1.0 / (1.0 - sink),
            // Silent until the first trigger
            trigger_beat: -decay_in_beats,
        })
    }

    pub fn with_decay(decay_in_beats: f64) -> TimingResult<Self> {
        Self::new(decay_in_beats, Self::DEFAULT_SINK, DEFAULT_STACK_TRIGGERS)
    }

    pub fn from_config(config: &EnvelopeConfig) -> TimingResult<Self> {
        Self::new(config.decay_in_beats, config.sink, config.stack_triggers)
    }

    pub fn decay_in_beats(&self) -> f64 {
        self.decay_in_beats
    }

    pub fn trigger_beat(&self) -> f64 {
        self.trigger_beat
    }
}

impl Envelope for ExponentialDecay {
    fn trigger_at(&mut self, beat: f64, level: f64) {
        let target = self.value_at(beat) * self.stack_triggers + level;
        if target <= 0.0 {
            self.trigger_beat = beat - self.decay_in_beats;
            return;
        }
        // Solve (base^t - sink) * stretch = target for t; t < 0 when target > 1
        let raw = target / self.stretch + self.sink;
        let t = raw.ln() / self.base.ln();
        self.trigger_beat = beat - t;
    }

    fn value_at(&self, beat: f64) -> f64 {
        let t = beat - self.trigger_beat;
        if t < self.decay_in_beats {
            (self.base.powf(t) - self.sink) * self.stretch
        } else {
            0.0
        }
    }
}
