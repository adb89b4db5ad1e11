// Scheduler module
// Lookahead queues (coarse drain) and deferred one-shot timers (precise finish)

pub mod deferred;
pub mod lookahead;

pub use deferred::DeferredTimers;
pub use lookahead::{LookaheadQueue, WaiterCallback};
