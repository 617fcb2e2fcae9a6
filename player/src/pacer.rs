//! Fixed-period stand-in for a display's vertical sync callback

use std::time::{Duration, Instant};

pub struct Pacer {
    period: Duration,
    next: Instant,
    /// Deadlines missed by more than a whole period
    late: u64,
}

impl Pacer {
    /// `refresh_rate` of 0 is treated as 1 Hz
    pub fn new(refresh_rate: u32) -> Self {
        let period = Duration::from_secs(1) / refresh_rate.max(1);
        Self {
            period,
            next: Instant::now() + period,
            late: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn late(&self) -> u64 {
        self.late
    }

    /// Sleep until the next tick
    ///
    /// Falling more than a period behind resynchronizes instead of firing a
    /// burst of catch-up ticks.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next {
            std::thread::sleep(self.next - now);
            self.next += self.period;
        } else if now - self.next > self.period {
            self.late += 1;
            tracing::debug!("Refresh tick late by {:?}", now - self.next);
            self.next = now + self.period;
        } else {
            self.next += self.period;
        }
    }
}
