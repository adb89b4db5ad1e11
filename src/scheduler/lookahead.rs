// Lookahead queue - Deadline waiters drained by a coarse per-frame poll
//
// The clock drains every registered queue once per frame. A waiter is handed
// out as soon as its deadline enters the lookahead window, together with the
// exact time left until the deadline, so the owner can finish the wait with a
// short, precise one-shot timer (see `DeferredTimers`).

use crate::error::{TimingResult, check_cycle, check_duration};
use std::collections::VecDeque;

/// Callback invoked when a waiter is dequeued
///
/// Receives the queue itself (so the owner can enqueue the next deadline or
/// cancel) and the signed milliseconds left until the literal deadline.
pub type WaiterCallback = Box<dyn FnOnce(&mut LookaheadQueue, f64)>;

struct Waiter {
    deadline: f64,
    callback: WaiterCallback,
}

/// Ordered wait list in cycle units
///
/// Deadlines are expressed in cycles (`beat / beats_per_cycle`) and must be
/// enqueued in non-decreasing order; the queue only ever looks at its head.
pub struct LookaheadQueue {
    beats_per_cycle: f64,
    lookahead_ms: f64,
    waiters: VecDeque<Waiter>,
    /// Latest deadline enqueued since construction or the last `cancel_all`
    last_deadline: f64,
}

impl LookaheadQueue {
    /// Default lookahead window in milliseconds
    pub const DEFAULT_LOOKAHEAD_MS: f64 = 70.0;

    /// Rounding slack for the ordering check, in cycles
    const ORDER_TOLERANCE: f64 = 1e-9;

    pub fn new(beats_per_cycle: f64, lookahead_ms: f64) -> TimingResult<Self> {
        Ok(Self {
            beats_per_cycle: check_cycle(beats_per_cycle)?,
            lookahead_ms: check_duration("lookahead_ms", lookahead_ms)?,
            waiters: VecDeque::new(),
            last_deadline: f64::NEG_INFINITY,
        })
    }

    /// Enqueue a waiter for `deadline` (in cycles)
    pub fn when_t(&mut self, deadline: f64, callback: impl FnOnce(&mut LookaheadQueue, f64) + 'static) {
        // Covers waiters already handed out too: a callback may only chain
        // deadlines at or after the one it was dequeued for
        debug_assert!(
            deadline >= self.last_deadline - Self::ORDER_TOLERANCE,
            "LookaheadQueue deadlines must be non-decreasing (last {}, new {})",
            self.last_deadline,
            deadline
        );
        self.last_deadline = self.last_deadline.max(deadline);
        self.waiters.push_back(Waiter {
            deadline,
            callback: Box::new(callback),
        });
    }

    /// Hand out every waiter whose deadline is inside the lookahead window
    ///
    /// Returns the number of waiters dequeued.
    pub fn notify(&mut self, beat: f64, ms_per_beat: f64) -> usize {
        let now = beat / self.beats_per_cycle;
        let ms_per_cycle = self.beats_per_cycle * ms_per_beat;
        let window = self.lookahead_ms / ms_per_cycle;

        let mut fired = 0;
        while let Some(head) = self.waiters.front() {
            if now + window <= head.deadline {
                break;
            }
            let Some(waiter) = self.waiters.pop_front() else {
                break;
            };
            let ms_till = (waiter.deadline - now) * ms_per_cycle;
            if ms_till < 0.0 {
                log::warn!(
                    "waiter dequeued {:.1} ms past its deadline (cycle {:.4})",
                    -ms_till,
                    waiter.deadline
                );
            } else {
                log::trace!(
                    "waiter for cycle {:.4} dequeued, {:.1} ms ahead",
                    waiter.deadline,
                    ms_till
                );
            }
            (waiter.callback)(self, ms_till);
            fired += 1;
        }
        fired
    }

    /// Discard all pending waiters
    pub fn cancel_all(&mut self) {
        if !self.waiters.is_empty() {
            log::trace!("cancelling {} pending waiters", self.waiters.len());
        }
        self.waiters.clear();
        self.last_deadline = f64::NEG_INFINITY;
    }

    /// Deadline of the next waiter, in cycles
    pub fn next_deadline(&self) -> Option<f64> {
        self.waiters.front().map(|w| w.deadline)
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    pub fn beats_per_cycle(&self) -> f64 {
        self.beats_per_cycle
    }

    pub fn lookahead_ms(&self) -> f64 {
        self.lookahead_ms
    }
}

impl std::fmt::Debug for LookaheadQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookaheadQueue")
            .field("beats_per_cycle", &self.beats_per_cycle)
            .field("lookahead_ms", &self.lookahead_ms)
            .field("pending", &self.waiters.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}
