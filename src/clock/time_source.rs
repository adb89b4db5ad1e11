// Time sources - Real-time readings for the clock and deferred timers
// The clock never consults any other timing source

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic millisecond reading
pub trait TimeSource {
    /// Milliseconds since an arbitrary, fixed origin
    fn now_ms(&self) -> f64;
}

/// Wall-clock source backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Shared handle, ready to pass to `Clock` and `DeferredTimers`
    pub fn shared() -> Rc<dyn TimeSource> {
        Rc::new(Self::new())
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced time source
///
/// Clones share the same reading, so a test (or an offline renderer) can keep
/// one handle and advance the time seen by the clock and the timers.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Rc<Cell<f64>>,
}

impl ManualTimeSource {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    /// Set the current reading
    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    /// Advance the current reading
    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms);
    }

    pub fn shared(&self) -> Rc<dyn TimeSource> {
        Rc::new(self.clone())
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
