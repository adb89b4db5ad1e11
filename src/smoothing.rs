// Smoothing - Frame-rate independent one-pole smoothing for control values
//
// Each step blends toward the target with `sustain = exponent^delta_s`
// (see `Clock::sustain`), so a value converges at the same wall-clock speed
// whatever the frame rate.
//
// Formula: y = y * sustain + target * (1 - sustain)

use crate::clock::Clock;
use crate::error::{TimingError, TimingResult};

/// One-pole smoothed value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothValue {
    value: f64,
    target: f64,
}

impl SmoothValue {
    pub fn new(initial: f64) -> Self {
        Self {
            value: initial,
            target: initial,
        }
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Advance one frame with an explicit sustain factor in [0, 1]
    #[inline]
    pub fn step(&mut self, sustain: f64) -> f64 {
        self.value = self.value * sustain + self.target * (1.0 - sustain);
        self.value
    }

    /// Advance one frame using the clock's last tick delta
    pub fn update(&mut self, clock: &Clock, exponent: f64) -> f64 {
        self.step(clock.sustain(exponent))
    }

    /// Jump to a value (no smoothing)
    pub fn reset(&mut self, value: f64) {
        self.value = value;
        self.target = value;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

/// Two cascaded one-pole stages
///
/// The intermediate stage chases the target and the output chases the
/// intermediate, which removes the corner of a plain one-pole response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleSmoothValue {
    value: f64,
    intermediate: f64,
    target: f64,
}

impl DoubleSmoothValue {
    pub fn new(initial: f64) -> Self {
        Self {
            value: initial,
            intermediate: initial,
            target: initial,
        }
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    #[inline]
    pub fn step(&mut self, sustain: f64) -> f64 {
        self.intermediate = self.intermediate * sustain + self.target * (1.0 - sustain);
        self.value = self.value * sustain + self.intermediate * (1.0 - sustain);
        self.value
    }

    pub fn update(&mut self, clock: &Clock, exponent: f64) -> f64 {
        self.step(clock.sustain(exponent))
    }

    pub fn reset(&mut self, value: f64) {
        self.value = value;
        self.intermediate = value;
        self.target = value;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

/// Smoothed value on a circular range `[min, max)`
///
/// Moves along the shorter arc toward the target and wraps at the range
/// ends, e.g. for hues or angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrappingSmoothValue {
    value: f64,
    target: f64,
    min: f64,
    span: f64,
}

impl WrappingSmoothValue {
    pub fn new(initial: f64, min: f64, max: f64) -> TimingResult<Self> {
        let span = max - min;
        if !(span.is_finite() && span > 0.0) {
            return Err(TimingError::InvalidConfig(format!(
                "wrapping range must satisfy min < max, got [{}, {}]",
                min, max
            )));
        }
        let mut smoothed = Self {
            value: min,
            target: min,
            min,
            span,
        };
        smoothed.reset(initial);
        Ok(smoothed)
    }

    fn wrap(&self, x: f64) -> f64 {
        self.min + (x - self.min).rem_euclid(self.span)
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = self.wrap(target);
    }

    #[inline]
    pub fn step(&mut self, sustain: f64) -> f64 {
        // Signed distance along the shorter arc, in (-span/2, span/2]
        let mut d = (self.target - self.value).rem_euclid(self.span);
        if d > self.span / 2.0 {
            d -= self.span;
        }
        self.value = self.wrap(self.value + d * (1.0 - sustain));
        self.value
    }

    pub fn update(&mut self, clock: &Clock, exponent: f64) -> f64 {
        self.step(clock.sustain(exponent))
    }

    pub fn reset(&mut self, value: f64) {
        self.value = self.wrap(value);
        self.target = self.value;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.min + self.span
    }
}
