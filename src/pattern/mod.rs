// Tap patterns - Record a rhythm by tapping and loop it in time with the clock

pub mod tap;
pub mod tap_pattern;

pub use tap::{PatternState, Tap};
pub use tap_pattern::TapPattern;
