// Tap tempo - Modes and smoothing parameters for tap-tempo estimation
// A mode is both a preset and the identity that separates tapping sequences

use crate::error::{TimingError, TimingResult};
use serde::{Deserialize, Serialize};

/// Tap-tempo mode
///
/// Switching mode between two taps always starts a new tapping sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TapMode {
    /// Fast, constant-strength tracking for live tapping
    Live,
    /// Starts fully trusting the taps, then converges with each tap
    Accumulating,
    /// Fine correction of an already close tempo
    Adjust,
}

impl TapMode {
    pub const ALL: [TapMode; 3] = [TapMode::Live, TapMode::Accumulating, TapMode::Adjust];
}

impl std::fmt::Display for TapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TapMode::Live => "live",
            TapMode::Accumulating => "accumulating",
            TapMode::Adjust => "adjust",
        };
        write!(f, "{}", name)
    }
}

/// Smoothing parameters of one tapping sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapTempoParams {
    /// Multiplier applied to both factors after every tempo-changing tap
    pub factor_reduction: f64,
    /// Silence (in beats) after which the next tap starts a new sequence
    pub gap_beats: f64,
    /// Fraction of the phase error corrected by the first tempo-changing tap
    pub initial_shift_factor: f64,
    /// EMA weight of the observed tap interval on the first tempo-changing tap
    pub initial_change_factor: f64,
}

impl TapTempoParams {
    pub fn new(
        factor_reduction: f64,
        gap_beats: f64,
        initial_shift_factor: f64,
        initial_change_factor: f64,
    ) -> Self {
        Self {
            factor_reduction,
            gap_beats,
            initial_shift_factor,
            initial_change_factor,
        }
    }

    pub fn live() -> Self {
        Self::new(1.0, 7.0, 0.5, 0.2)
    }

    pub fn accumulating() -> Self {
        Self::new(0.8, 7.0, 1.0, 1.0)
    }

    pub fn adjust() -> Self {
        Self::new(1.0, 3.0, 0.15, 0.01)
    }

    /// Check the factors are fractions and the gap is a positive length
    ///
    /// A change factor above 1 would extrapolate past the observed interval
    /// and can drive the tempo negative.
    pub fn validate(&self) -> TimingResult<()> {
        let fractions = [
            ("factor_reduction", self.factor_reduction),
            ("initial_shift_factor", self.initial_shift_factor),
            ("initial_change_factor", self.initial_change_factor),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(TimingError::InvalidConfig(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(self.gap_beats.is_finite() && self.gap_beats > 0.0) {
            return Err(TimingError::InvalidConfig(format!(
                "gap_beats must be finite and > 0, got {}",
                self.gap_beats
            )));
        }
        Ok(())
    }
}

impl Default for TapTempoParams {
    fn default() -> Self {
        Self::live()
    }
}

/// Parameters for each tap mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapPresets {
    pub live: TapTempoParams,
    pub accumulating: TapTempoParams,
    pub adjust: TapTempoParams,
}

impl TapPresets {
    pub fn params(&self, mode: TapMode) -> TapTempoParams {
        match mode {
            TapMode::Live => self.live,
            TapMode::Accumulating => self.accumulating,
            TapMode::Adjust => self.adjust,
        }
    }

    pub fn validate(&self) -> TimingResult<()> {
        for mode in TapMode::ALL {
            self.params(mode).validate().map_err(|e| match e {
                TimingError::InvalidConfig(msg) => {
                    TimingError::InvalidConfig(format!("{} tap preset: {}", mode, msg))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

impl Default for TapPresets {
    fn default() -> Self {
        Self {
            live: TapTempoParams::live(),
            accumulating: TapTempoParams::accumulating(),
            adjust: TapTempoParams::adjust(),
        }
    }
}

/// Outcome of a single `Clock::bpm_tap`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapOutcome {
    /// First tap of a sequence: bookkeeping only
    FirstTap,
    /// Tempo re-estimated; carries the new tempo in beats per second
    TempoUpdated { bps: f64 },
    /// Tap arrived at the same instant as the previous one
    Ignored,
}
