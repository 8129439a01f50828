use std::time::Duration;

use crate::{OrreryError, Result};

/// Periodic deadline measured against a session's elapsed time.
///
/// The first deadline is one period after the start, like a host interval
/// timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    period: Duration,
    next_due: Duration,
}

impl Interval {
    pub fn new(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(OrreryError::InvalidInterval);
        }
        Ok(Self {
            period,
            next_due: period,
        })
    }

    /// Interval firing `hz` times per second.
    pub fn from_hz(hz: f64) -> Result<Self> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(OrreryError::InvalidInterval);
        }
        // Rounded to whole nanoseconds so common rates land on exact periods.
        Self::new(Duration::from_nanos((1e9 / hz).round() as u64))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_due(&self) -> Duration {
        self.next_due
    }

    /// Number of deadlines at or before `now` that have not fired yet.
    pub fn pending(&self, now: Duration) -> u64 {
        if now < self.next_due {
            return 0;
        }
        let overdue = (now - self.next_due).as_nanos() / self.period.as_nanos();
        u64::try_from(overdue).unwrap_or(u64::MAX - 1) + 1
    }

    /// Latest deadline at or before `now`, if any is pending.
    pub fn latest_due(&self, now: Duration) -> Option<Duration> {
        match self.pending(now) {
            0 => None,
            pending => Some(self.next_due + self.scaled(pending - 1)),
        }
    }

    /// Consumes the next deadline.
    pub fn fire(&mut self) {
        self.skip(1);
    }

    /// Consumes `count` deadlines without acting on them.
    pub fn skip(&mut self, count: u64) {
        self.next_due += self.scaled(count);
    }

    /// Consumes every deadline up to and including `at`.
    pub fn fire_through(&mut self, at: Duration) {
        let pending = self.pending(at);
        self.skip(pending);
    }

    fn scaled(&self, count: u64) -> Duration {
        self.period
            .saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn first_deadline_is_one_period_in() {
        let interval = Interval::new(ms(10)).unwrap();
        assert_eq!(interval.pending(ms(9)), 0);
        assert_eq!(interval.pending(ms(10)), 1);
        assert_eq!(interval.pending(ms(35)), 3);
    }

    #[test]
    fn firing_advances_the_deadline() {
        let mut interval = Interval::new(ms(10)).unwrap();
        interval.fire();
        assert_eq!(interval.next_due(), ms(20));
        interval.skip(3);
        assert_eq!(interval.next_due(), ms(50));
    }

    #[test]
    fn collapses_missed_deadlines() {
        let mut interval = Interval::new(ms(16)).unwrap();
        assert_eq!(interval.latest_due(ms(50)), Some(ms(48)));
        interval.fire_through(ms(50));
        assert_eq!(interval.next_due(), ms(64));
        assert_eq!(interval.latest_due(ms(50)), None);
    }

    #[test]
    fn rejects_zero_and_bad_rates() {
        assert!(Interval::new(Duration::ZERO).is_err());
        assert!(Interval::from_hz(0.0).is_err());
        assert!(Interval::from_hz(f64::NAN).is_err());
        let refresh = Interval::from_hz(50.0).unwrap();
        assert_eq!(refresh.period(), ms(20));
    }
}
