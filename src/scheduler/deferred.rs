// Deferred timers - Cooperative one-shot callbacks after a precise delay
//
// Work handed out by a lookahead drain is finished here. Timers run on the
// same single-threaded timeline as the clock: the driver polls `run_due`
// as often as it can. An issued timer cannot be retracted; owners guard the
// callback body with their own flag instead.

use crate::clock::TimeSource;
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

struct Timer {
    due_ms: f64,
    seq: u64,
    task: Task,
}

// Min-heap on (due_ms, seq): earliest first, FIFO among equal due times
impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timer {}

/// One-shot timer list shared between a driver and timer owners
///
/// Methods take `&self` so a tap pattern can schedule from inside a queue
/// drain while the driver holds another `Rc` to the same timers.
pub struct DeferredTimers {
    time: Rc<dyn TimeSource>,
    timers: RefCell<BinaryHeap<Timer>>,
    next_seq: Cell<u64>,
}

impl DeferredTimers {
    pub fn new(time: Rc<dyn TimeSource>) -> Self {
        Self {
            time,
            timers: RefCell::new(BinaryHeap::new()),
            next_seq: Cell::new(0),
        }
    }

    pub fn shared(time: Rc<dyn TimeSource>) -> Rc<Self> {
        Rc::new(Self::new(time))
    }

    /// Schedule `task` to run `delay_ms` from now
    ///
    /// Negative delays (a deadline already passed when it was dequeued) are
    /// clamped to zero: the task runs on the next `run_due`.
    pub fn schedule_after(&self, delay_ms: f64, task: impl FnOnce() + 'static) {
        let delay_ms = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.timers.borrow_mut().push(Timer {
            due_ms: self.time.now_ms() + delay_ms,
            seq,
            task: Box::new(task),
        });
    }

    /// Run every timer due at the current time, earliest first
    ///
    /// Tasks may schedule new timers; those run in the same call only if they
    /// are already due. Returns the number of tasks run.
    pub fn run_due(&self) -> usize {
        let now = self.time.now_ms();
        let mut ran = 0;
        loop {
            // Borrow released before the task runs
            let next = {
                let mut timers = self.timers.borrow_mut();
                match timers.peek() {
                    Some(timer) if timer.due_ms <= now => timers.pop(),
                    _ => None,
                }
            };
            let Some(timer) = next else {
                break;
            };
            (timer.task)();
            ran += 1;
        }
        ran
    }

    /// Due time of the earliest pending timer
    pub fn next_due_ms(&self) -> Option<f64> {
        self.timers.borrow().peek().map(|t| t.due_ms)
    }

    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.borrow().is_empty()
    }
}

impl std::fmt::Debug for DeferredTimers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredTimers")
            .field("pending", &self.pending())
            .field("next_due_ms", &self.next_due_ms())
            .finish()
    }
}
