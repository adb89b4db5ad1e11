// Configuration - Serializable defaults for the timing core
// Loaded from RON or JSON by the hosting application

use crate::clock::TapPresets;
use crate::error::{
    TimingError, TimingResult, check_cycle, check_decay, check_duration, check_ms_per_beat,
    check_stack_triggers,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Beat clock settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Tempo at startup, before any tap
    pub initial_bpm: f64,
    pub tap_presets: TapPresets,
}

impl ClockConfig {
    pub fn validate(&self) -> TimingResult<()> {
        if !(self.initial_bpm.is_finite() && self.initial_bpm > 0.0) {
            return Err(TimingError::InvalidConfig(format!(
                "initial_bpm must be > 0, got {}",
                self.initial_bpm
            )));
        }
        check_ms_per_beat(60_000.0 / self.initial_bpm)?;
        self.tap_presets.validate()?;
        Ok(())
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            initial_bpm: 120.0,
            tap_presets: TapPresets::default(),
        }
    }
}

/// Tap pattern recorder/player settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapPatternConfig {
    /// Length of one recorded loop, in beats
    pub beats_per_cycle: f64,
    /// How early the lookahead queue hands out a deadline
    pub lookahead_ms: f64,
    /// Scheduling delay the loop start compensates for
    pub latency_compensate_ms: f64,
}

impl TapPatternConfig {
    pub fn validate(&self) -> TimingResult<()> {
        check_cycle(self.beats_per_cycle)?;
        check_duration("lookahead_ms", self.lookahead_ms)?;
        check_duration("latency_compensate_ms", self.latency_compensate_ms)?;
        Ok(())
    }
}

impl Default for TapPatternConfig {
    fn default() -> Self {
        Self {
            beats_per_cycle: 8.0,
            lookahead_ms: 70.0,
            // one frame at 60 FPS
            latency_compensate_ms: 1000.0 / 60.0,
        }
    }
}

/// Decay envelope defaults
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    pub decay_in_beats: f64,
    /// Floor reached by exponential decays at the end of the window
    pub sink: f64,
    /// Weight of the current value when retriggering
    pub stack_triggers: f64,
}

impl EnvelopeConfig {
    pub fn validate(&self) -> TimingResult<()> {
        check_decay(self.decay_in_beats)?;
        if !(self.sink > 0.0 && self.sink < 1.0) {
            return Err(TimingError::InvalidSink(self.sink));
        }
        check_stack_triggers(self.stack_triggers)?;
        Ok(())
    }
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            decay_in_beats: 1.0,
            sink: 0.001,
            stack_triggers: 0.5,
        }
    }
}

/// Complete timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub clock: ClockConfig,
    pub tap_pattern: TapPatternConfig,
    pub envelope: EnvelopeConfig,
}

impl TimingConfig {
    pub fn validate(&self) -> TimingResult<()> {
        self.clock.validate()?;
        self.tap_pattern.validate()?;
        self.envelope.validate()?;
        Ok(())
    }

    pub fn from_ron_str(text: &str) -> TimingResult<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> TimingResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json` file, anything else is parsed as RON
    pub fn load(path: impl AsRef<Path>) -> TimingResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text)?,
            _ => Self::from_ron_str(&text)?,
        };
        log::debug!("loaded timing config from {}", path.display());
        Ok(config)
    }

    pub fn to_ron_string(&self) -> TimingResult<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> TimingResult<()> {
        let path = path.as_ref();
        let text = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            _ => self.to_ron_string()?,
        };
        std::fs::write(path, text)?;
        Ok(())
    }
}
