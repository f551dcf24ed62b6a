use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Simulated wall clock advanced in whole minutes.
///
/// Each [`advance`](SimClock::advance) moves time forward by `speed` minutes
/// while the clock is running and does nothing while it is paused.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use depot_orchestrator::sim::clock::SimClock;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 15)
///     .and_then(|d| d.and_hms_opt(5, 30, 0))
///     .expect("valid timestamp");
/// let mut clock = SimClock::new(start, 4);
///
/// let (prev, now) = clock.advance().expect("clock is running");
/// assert_eq!(prev, start);
/// assert_eq!(now.format("%H:%M").to_string(), "05:34");
///
/// clock.pause();
/// assert_eq!(clock.advance(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimClock {
    /// Current simulated time
    now: NaiveDateTime,
    /// Simulated minutes per tick
    speed: u32,
    running: bool,
}

impl SimClock {
    /// Creates a running clock.
    ///
    /// # Arguments
    ///
    /// * `start` - Simulated time at the first tick
    /// * `speed` - Simulated minutes per tick
    ///
    /// # Panics
    ///
    /// Panics if `speed` is zero.
    pub fn new(start: NaiveDateTime, speed: u32) -> Self {
        assert!(speed > 0, "speed multiplier must be positive");
        Self {
            now: start,
            speed,
            running: true,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Changes the speed multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `speed` is zero.
    pub fn set_speed(&mut self, speed: u32) {
        assert!(speed > 0, "speed multiplier must be positive");
        self.speed = speed;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Flips between running and paused; returns the new running flag.
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Moves time forward by one tick.
    ///
    /// # Returns
    ///
    /// * `Some((previous, now))` - The elapsed interval
    /// * `None` - If the clock is paused
    pub fn advance(&mut self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if !self.running {
            return None;
        }
        let previous = self.now;
        self.now += Duration::minutes(i64::from(self.speed));
        Some((previous, self.now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|d| d.and_hms_opt(23, 58, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn advance_crosses_midnight() {
        let mut clock = SimClock::new(start(), 4);
        let (_, now) = clock.advance().expect("running");
        assert_eq!(now.format("%d %H:%M").to_string(), "16 00:02");
    }

    #[test]
    fn paused_clock_does_not_move() {
        let mut clock = SimClock::new(start(), 1);
        assert!(!clock.toggle());
        assert_eq!(clock.advance(), None);
        assert_eq!(clock.now(), start());
        clock.resume();
        assert!(clock.advance().is_some());
    }

    #[test]
    fn speed_change_applies_next_tick() {
        let mut clock = SimClock::new(start(), 1);
        clock.set_speed(16);
        let (prev, now) = clock.advance().expect("running");
        assert_eq!((now - prev).num_minutes(), 16);
    }

    #[test]
    #[should_panic(expected = "speed multiplier must be positive")]
    fn zero_speed_panics() {
        SimClock::new(start(), 0);
    }
}
