//! Wall-clock ticks for the presentation shell.
//!
//! A lazy, endless sequence of local timestamps: nothing happens until
//! `next()` is awaited, and `restart()` starts the cadence over.

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Cooperative tick source, one timestamp per period.
#[derive(Debug)]
pub struct ClockTicker {
    period: Duration,
    interval: Interval,
}

impl ClockTicker {
    /// Panics if `period` is zero (as `tokio::time::interval` does).
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: Self::schedule(period),
        }
    }

    /// One tick per second.
    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Wait for the next tick. The first tick completes immediately.
    pub async fn next(&mut self) -> DateTime<Local> {
        self.interval.tick().await;
        Local::now()
    }

    /// Start over: the next tick completes immediately again.
    pub fn restart(&mut self) {
        self.interval = Self::schedule(self.period);
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    fn schedule(period: Duration) -> Interval {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    }
}

/// `Monday, 1/15/2024 9:30:00 AM`, as shown by the live clock.
pub fn format_clock(at: &DateTime<Local>) -> String {
    at.format("%A, %-m/%-d/%Y %-I:%M:%S %p").to_string()
}
