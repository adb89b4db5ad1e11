// Linear decay envelope
// Straight ramp from 1 to 0 over the decay window

use super::{DEFAULT_STACK_TRIGGERS, Envelope};
use crate::config::EnvelopeConfig;
use crate::error::{TimingResult, check_decay, check_stack_triggers};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDecay {
    decay_in_beats: f64,
    stack_triggers: f64,
    slope: f64,
    trigger_beat: f64,
}

impl LinearDecay {
    pub fn new(decay_in_beats: f64, stack_triggers: f64) -> TimingResult<Self> {
        let decay_in_beats = check_decay(decay_in_beats)?;
        let stack_triggers = check_stack_triggers(stack_triggers)?;
        Ok(Self {
            decay_in_beats,
            stack_triggers,
            slope: 1.0 / decay_in_beats,
            trigger_beat: -decay_in_beats,
        })
    }

    pub fn with_decay(decay_in_beats: f64) -> TimingResult<Self> {
        Self::new(decay_in_beats, DEFAULT_STACK_TRIGGERS)
    }

    pub fn from_config(config: &EnvelopeConfig) -> TimingResult<Self> {
        Self::new(config.decay_in_beats, config.stack_triggers)
    }

    pub fn decay_in_beats(&self) -> f64 {
        self.decay_in_beats
    }

    pub fn trigger_beat(&self) -> f64 {
        self.trigger_beat
    }
}

impl Envelope for LinearDecay {
    fn trigger_at(&mut self, beat: f64, level: f64) {
        let target = self.value_at(beat) * self.stack_triggers + level;
        // 1 - t * slope = target
        let t = (1.0 - target) / self.slope;
        self.trigger_beat = beat - t;
    }

    fn value_at(&self, beat: f64) -> f64 {
        let t = beat - self.trigger_beat;
        if t < self.decay_in_beats {
            1.0 - t * self.slope
        } else {
            0.0
        }
    }
}
