// Clock module
// Beat clock, tap tempo, time sources and clock-driven accumulators

pub mod accumulator;
pub mod beat_clock;
pub mod registry;
pub mod tap_tempo;
pub mod time_source;

pub use accumulator::TimeAccumulator;
pub use beat_clock::{
    AccumulatorHandle, BEATS_PER_BAR, BEATS_PER_STROPHE, Clock, DEFAULT_SUSTAIN_EXPONENT,
    ListenerHandle, QueueHandle, TempoListener,
};
pub use registry::{Handle, Registry};
pub use tap_tempo::{TapMode, TapOutcome, TapPresets, TapTempoParams};
pub use time_source::{ManualTimeSource, SystemTimeSource, TimeSource};
