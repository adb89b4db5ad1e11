// Error types for the timing core
// Construction and configuration failures; runtime operations are total

use thiserror::Error;

/// Timing core errors
#[derive(Debug, Error)]
pub enum TimingError {
    #[error("Invalid tempo: {0} ms per beat (must be finite and > 0)")]
    InvalidTempo(f64),

    #[error("Invalid decay length: {0} beats (must be finite and > 0)")]
    InvalidDecay(f64),

    #[error("Invalid envelope floor: {0} (must be in (0, 1))")]
    InvalidSink(f64),

    #[error("Invalid retrigger weight: {0} (must be finite and >= 0)")]
    InvalidStackTriggers(f64),

    #[error("Invalid cycle length: {0} beats (must be finite and > 0)")]
    InvalidCycle(f64),

    #[error("Invalid duration: {name} = {value} ms (must be finite and >= 0)")]
    InvalidDuration { name: &'static str, value: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),
}

pub type TimingResult<T> = Result<T, TimingError>;

/// Reject non-positive or non-finite tempo
pub(crate) fn check_ms_per_beat(ms_per_beat: f64) -> TimingResult<f64> {
    if ms_per_beat.is_finite() && ms_per_beat > 0.0 {
        Ok(ms_per_beat)
    } else {
        Err(TimingError::InvalidTempo(ms_per_beat))
    }
}

pub(crate) fn check_decay(decay_in_beats: f64) -> TimingResult<f64> {
    if decay_in_beats.is_finite() && decay_in_beats > 0.0 {
        Ok(decay_in_beats)
    } else {
        Err(TimingError::InvalidDecay(decay_in_beats))
    }
}

pub(crate) fn check_cycle(beats_per_cycle: f64) -> TimingResult<f64> {
    if beats_per_cycle.is_finite() && beats_per_cycle > 0.0 {
        Ok(beats_per_cycle)
    } else {
        Err(TimingError::InvalidCycle(beats_per_cycle))
    }
}

pub(crate) fn check_stack_triggers(stack_triggers: f64) -> TimingResult<f64> {
    if stack_triggers.is_finite() && stack_triggers >= 0.0 {
        Ok(stack_triggers)
    } else {
        Err(TimingError::InvalidStackTriggers(stack_triggers))
    }
}

pub(crate) fn check_duration(name: &'static str, value: f64) -> TimingResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(TimingError::InvalidDuration { name, value })
    }
}
