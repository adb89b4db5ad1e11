// beatcore - Beat clock, lookahead scheduling, tap patterns and decay envelopes

pub mod clock;
pub mod config;
pub mod envelope;
pub mod error;
pub mod pattern;
pub mod scheduler;
pub mod smoothing;

// Re-export commonly used types for convenience
pub use clock::{
    Clock, ManualTimeSource, SystemTimeSource, TapMode, TapOutcome, TapPresets, TapTempoParams,
    TimeAccumulator, TimeSource,
};
pub use config::{ClockConfig, EnvelopeConfig, TapPatternConfig, TimingConfig};
pub use envelope::{Envelope, ExponentialDecay, LinearDecay};
pub use error::{TimingError, TimingResult};
pub use pattern::{PatternState, Tap, TapPattern};
pub use scheduler::{DeferredTimers, LookaheadQueue};
pub use smoothing::{DoubleSmoothValue, SmoothValue, WrappingSmoothValue};
