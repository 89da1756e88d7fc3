//! Single countdown that advances once per host tick.
//!
//! The clock owns no timer of its own. The host drives it by calling
//! [`PhaseClock::tick`] once per second while [`PhaseClock::is_running`] is
//! true, and resets its schedule whenever [`PhaseClock::take_rearm`] reports
//! that the clock was (re)started.

use crate::error::ClockError;

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Clock is stopped; nothing changed.
    Idle,
    /// Seconds left after this tick.
    Remaining(u32),
    /// Countdown reached zero on this tick.
    Expired,
}

/// Longest countdown the clock accepts; keeps minute rounding in range.
pub const MAX_SECONDS: u32 = u32::MAX - 60;

#[derive(Debug, Clone, Default)]
pub struct PhaseClock {
    remaining_seconds: u32,
    running: bool,
    rearm: bool,
}

impl PhaseClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start counting. `Some(minutes)` resets the countdown to the full
    /// duration, `None` continues from the current remaining seconds.
    /// Either way the previous tick schedule is replaced.
    pub fn start(&mut self, minutes: Option<u32>) -> Result<(), ClockError> {
        if let Some(minutes) = minutes {
            if minutes == 0 {
                return Err(ClockError::NonPositiveDuration(minutes));
            }
            self.remaining_seconds = minutes
                .checked_mul(60)
                .filter(|seconds| *seconds <= MAX_SECONDS)
                .ok_or(ClockError::DurationTooLong(minutes))?;
        }
        self.running = true;
        self.rearm = true;
        Ok(())
    }

    /// Stop counting and return the remaining time in whole minutes,
    /// rounded half away from zero.
    pub fn pause(&mut self) -> u32 {
        self.running = false;
        round_minutes(self.remaining_seconds)
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            Tick::Expired
        } else {
            Tick::Remaining(self.remaining_seconds)
        }
    }

    /// True once after every `start`, telling the host to restart its
    /// one-second interval from now.
    pub fn take_rearm(&mut self) -> bool {
        std::mem::take(&mut self.rearm)
    }
}

fn round_minutes(seconds: u32) -> u32 {
    (seconds + 30) / 60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(clock: &mut PhaseClock, ticks: u32) -> Vec<Tick> {
        (0..ticks).map(|_| clock.tick()).collect()
    }

    #[test]
    fn start_sets_full_duration() {
        let mut clock = PhaseClock::new();
        clock.start(Some(25)).unwrap();
        assert_eq!(clock.remaining_seconds(), 1500);
        assert!(clock.is_running());
    }

    #[test]
    fn zero_minutes_is_rejected() {
        let mut clock = PhaseClock::new();
        assert_eq!(
            clock.start(Some(0)),
            Err(ClockError::NonPositiveDuration(0))
        );
        assert!(!clock.is_running());
    }

    #[test]
    fn overflowing_minutes_are_rejected() {
        let mut clock = PhaseClock::new();
        clock.start(Some(5)).unwrap();
        clock.pause();
        let minutes = u32::MAX / 60 + 1;
        assert_eq!(
            clock.start(Some(minutes)),
            Err(ClockError::DurationTooLong(minutes))
        );
        assert!(!clock.is_running());
        assert_eq!(clock.remaining_seconds(), 300);

        let longest = MAX_SECONDS / 60;
        clock.start(Some(longest)).unwrap();
        assert_eq!(clock.remaining_seconds(), longest * 60);
        assert_eq!(clock.pause(), longest);
    }

    #[test]
    fn expires_exactly_once_after_full_duration() {
        let mut clock = PhaseClock::new();
        clock.start(Some(5)).unwrap();
        let ticks = run(&mut clock, 300);
        let expiries = ticks.iter().filter(|t| **t == Tick::Expired).count();
        assert_eq!(expiries, 1);
        assert_eq!(ticks.last(), Some(&Tick::Expired));
        assert_eq!(ticks[0], Tick::Remaining(299));
    }

    #[test]
    fn never_goes_below_zero() {
        let mut clock = PhaseClock::new();
        clock.start(Some(1)).unwrap();
        run(&mut clock, 61);
        assert_eq!(clock.remaining_seconds(), 0);
    }

    #[test]
    fn paused_clock_does_not_count() {
        let mut clock = PhaseClock::new();
        clock.start(Some(25)).unwrap();
        run(&mut clock, 10);
        clock.pause();
        assert_eq!(run(&mut clock, 50), vec![Tick::Idle; 50]);
        assert_eq!(clock.remaining_seconds(), 1490);
    }

    #[test]
    fn resume_keeps_remaining_seconds() {
        let mut clock = PhaseClock::new();
        clock.start(Some(25)).unwrap();
        run(&mut clock, 600);
        assert_eq!(clock.pause(), 15);
        clock.start(None).unwrap();
        assert_eq!(clock.remaining_seconds(), 900);
        assert_eq!(clock.pause(), 15);
        assert_eq!(clock.remaining_seconds(), 900);
    }

    #[test]
    fn pause_rounds_half_away_from_zero() {
        let mut clock = PhaseClock::new();
        for (secs, minutes) in [(100, 2), (90, 2), (89, 1), (29, 0), (30, 1), (1500, 25)] {
            clock.remaining_seconds = secs;
            assert_eq!(clock.pause(), minutes, "{secs} seconds");
        }
    }

    #[test]
    fn every_start_requests_a_rearm() {
        let mut clock = PhaseClock::new();
        assert!(!clock.take_rearm());
        clock.start(Some(5)).unwrap();
        assert!(clock.take_rearm());
        assert!(!clock.take_rearm());
        clock.pause();
        clock.start(None).unwrap();
        assert!(clock.take_rearm());
    }
}
