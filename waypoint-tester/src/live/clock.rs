use std::time::{Duration, Instant};

use waypoint_engine::constants::DEFAULT_FRAME_INTERVAL_MS;
use waypoint_engine::{Clock, EventLoop, Scheduler, TaskQueue, Wakeup};

/// Wall-clock event loop: sleeps the thread until each wakeup is due.
#[derive(Debug)]
pub struct RealtimeClock {
    origin: Instant,
    frame_interval_ms: f64,
    queue: TaskQueue,
}

impl RealtimeClock {
    #[must_use]
    pub fn new() -> Self {
        Self::with_frame_interval(DEFAULT_FRAME_INTERVAL_MS)
    }

    #[must_use]
    pub fn with_frame_interval(frame_interval_ms: f64) -> Self {
        Self {
            origin: Instant::now(),
            frame_interval_ms: frame_interval_ms.max(1.0),
            queue: TaskQueue::new(),
        }
    }
}

impl Default for RealtimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for RealtimeClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1_000.0
    }
}

impl Scheduler for RealtimeClock {
    fn after(&mut self, delay_ms: f64, wakeup: Wakeup) {
        self.queue.push(self.now() + delay_ms.max(0.0), wakeup);
    }

    fn request_frame(&mut self, wakeup: Wakeup) {
        self.queue.push(self.now() + self.frame_interval_ms, wakeup);
    }
}

impl EventLoop for RealtimeClock {
    fn next_wakeup(&mut self) -> Option<Wakeup> {
        let due = self.queue.peek_due()?;
        let wait_ms = due - self.now();
        if wait_ms > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(wait_ms / 1_000.0));
        }
        self.queue.pop().map(|(_, wakeup)| wakeup)
    }
}
