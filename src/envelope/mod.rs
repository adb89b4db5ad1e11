// Decay envelopes - Beat-driven decay curves with retrigger blending
//
// Envelopes hold no running state besides the beat at which the current
// curve notionally started; every read is a pure function of the beat.

pub mod exponential;
pub mod linear;

pub use exponential::ExponentialDecay;
pub use linear::LinearDecay;

use crate::clock::Clock;

/// Default weight of the current value when retriggering
pub const DEFAULT_STACK_TRIGGERS: f64 = 0.5;

/// Shared envelope contract
pub trait Envelope {
    /// Retrigger at `beat`, blending the current value with `level`
    fn trigger_at(&mut self, beat: f64, level: f64);

    /// Extension point; decays ignore release
    fn release(&mut self) {}

    /// Sample the curve at `beat`
    fn value_at(&self, beat: f64) -> f64;

    /// Retrigger at the clock's current beat
    fn trigger(&mut self, clock: &Clock, level: f64) {
        self.trigger_at(clock.beat(), level);
    }

    /// Sample at the clock's current beat
    fn value(&self, clock: &Clock) -> f64 {
        self.value_at(clock.beat())
    }
}
