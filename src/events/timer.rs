use std::time::{Duration, Instant};

/// Fixed-period tick source polled from the main loop.
///
/// A poll that arrives late fires once and schedules the next tick a full period
/// after `now`; missed ticks are dropped rather than replayed.
#[derive(Debug, Clone)]
pub struct TickTimer {
    period: Duration,
    next: Option<Instant>,
}

impl TickTimer {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// First tick fires one period after `now`. No-op if already running.
    pub fn start(&mut self, now: Instant) {
        if self.next.is_none() {
            self.next = Some(now + self.period);
        }
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    /// True if a tick is due at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(next) = self.next else {
            return false;
        };
        if now < next {
            return false;
        }

        let following = next + self.period;
        self.next = Some(if following <= now {
            now + self.period
        } else {
            following
        });
        true
    }

    /// How long the event loop may block before the next tick, capped at `idle`
    pub fn timeout(&self, now: Instant, idle: Duration) -> Duration {
        match self.next {
            Some(next) => next.saturating_duration_since(now).min(idle),
            None => idle,
        }
    }
}
