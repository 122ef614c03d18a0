use std::time::{Duration, Instant};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Whole-period tick generator, polled by the event loop.
///
/// Turns wall time into a count of elapsed periods, each handed out exactly
/// once no matter how often [`TickTimer::take_due`] is called. Disarmed timers
/// never produce ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct TickTimer {
    period: Duration,
    armed_at: Option<Instant>,
    delivered: u64,
}

impl TickTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            armed_at: None,
            delivered: 0,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.armed_at = Some(now);
        self.delivered = 0;
    }

    pub fn disarm(&mut self) {
        self.armed_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Ticks handed out since the timer was last armed.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// The instant the `n`th tick falls due, counting from 1.
    pub fn tick_at(&self, n: u64) -> Option<Instant> {
        let periods = u32::try_from(n).ok()?;
        self.armed_at?.checked_add(self.period.checked_mul(periods)?)
    }

    /// Number of periods completed since the last call, up to `now`.
    pub fn take_due(&mut self, now: Instant) -> u64 {
        let Some(armed_at) = self.armed_at else {
            return 0;
        };

        let elapsed = now.saturating_duration_since(armed_at);
        let completed = (elapsed.as_nanos() / self.period.as_nanos().max(1)) as u64;
        let due = completed.saturating_sub(self.delivered);
        self.delivered = self.delivered.max(completed);
        due
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}
