//! Clock and cooperative scheduling capabilities.
//!
//! The state machine never blocks. It asks a [`Scheduler`] for one-shot wakeups
//! (segment finished) and next-frame wakeups (timer tick), and an [`EventLoop`]
//! hands those wakeups back in time order.
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::constants::DEFAULT_FRAME_INTERVAL_MS;

/// What a wakeup asks the state machine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WakeupKind {
    /// The sampled duration for `segment` has elapsed.
    SegmentElapsed { segment: usize },
    /// Per-frame timer tick.
    Frame,
}

/// A scheduled continuation tagged with the run generation that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wakeup {
    pub run: u64,
    pub kind: WakeupKind,
}

impl Wakeup {
    #[must_use]
    pub const fn segment_elapsed(run: u64, segment: usize) -> Self {
        Self {
            run,
            kind: WakeupKind::SegmentElapsed { segment },
        }
    }

    #[must_use]
    pub const fn frame(run: u64) -> Self {
        Self {
            run,
            kind: WakeupKind::Frame,
        }
    }
}

/// Monotonic time source in milliseconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Deferred continuations.
pub trait Scheduler {
    /// Deliver `wakeup` once after `delay_ms`.
    fn after(&mut self, delay_ms: f64, wakeup: Wakeup);

    /// Deliver `wakeup` on the next frame. Callers re-request to keep ticking.
    fn request_frame(&mut self, wakeup: Wakeup);
}

/// A clock that can also wait for the next due wakeup.
pub trait EventLoop: Clock + Scheduler {
    /// Wait for (or jump to) the earliest pending wakeup. `None` once nothing is pending.
    fn next_wakeup(&mut self) -> Option<Wakeup>;
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: f64,
    seq: u64,
    wakeup: Wakeup,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed so the max-heap pops the earliest due, then earliest scheduled.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Time-ordered wakeup queue; ties go to whichever was scheduled first.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    heap: BinaryHeap<Pending>,
    next_seq: u64,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `wakeup` at absolute time `due`.
    pub fn push(&mut self, due: f64, wakeup: Wakeup) {
        let due = if due.is_finite() { due } else { 0.0 };
        self.heap.push(Pending {
            due,
            seq: self.next_seq,
            wakeup,
        });
        self.next_seq = self.next_seq.wrapping_add(1);
    }

    /// Due time of the earliest wakeup.
    #[must_use]
    pub fn peek_due(&self) -> Option<f64> {
        self.heap.peek().map(|pending| pending.due)
    }

    /// Remove the earliest wakeup with its due time.
    pub fn pop(&mut self) -> Option<(f64, Wakeup)> {
        self.heap.pop().map(|pending| (pending.due, pending.wakeup))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

/// Deterministic clock whose time jumps straight to each wakeup.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    now: f64,
    frame_interval_ms: f64,
    queue: TaskQueue,
}

impl VirtualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::with_frame_interval(DEFAULT_FRAME_INTERVAL_MS)
    }

    /// Clock ticking frames every `frame_interval_ms` (at least 1 ms).
    #[must_use]
    pub fn with_frame_interval(frame_interval_ms: f64) -> Self {
        let frame_interval_ms = if frame_interval_ms.is_finite() {
            frame_interval_ms.max(1.0)
        } else {
            DEFAULT_FRAME_INTERVAL_MS
        };
        Self {
            now: 0.0,
            frame_interval_ms,
            queue: TaskQueue::new(),
        }
    }

    /// Move time forward without delivering anything.
    pub fn advance(&mut self, delta_ms: f64) {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.now += delta_ms;
        }
    }

    /// Wakeups still queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> f64 {
        self.now
    }
}

impl Scheduler for VirtualClock {
    fn after(&mut self, delay_ms: f64, wakeup: Wakeup) {
        self.queue.push(self.now + delay_ms.max(0.0), wakeup);
    }

    fn request_frame(&mut self, wakeup: Wakeup) {
        self.queue.push(self.now + self.frame_interval_ms, wakeup);
    }
}

impl EventLoop for VirtualClock {
    fn next_wakeup(&mut self) -> Option<Wakeup> {
        let (due, wakeup) = self.queue.pop()?;
        self.now = self.now.max(due);
        Some(wakeup)
    }
}
