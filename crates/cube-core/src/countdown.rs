//! Repeating one-second tick source for the session clock

use std::cell::Cell;
use std::rc::Rc;

/// Period of the session clock
pub const TICK_PERIOD_MS: u64 = 1000;

/// Monotonic millisecond time source
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Hand-driven clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// A cancellable repeating timer.
///
/// Front ends poll [`TickSource::take_due`] from their event loop and feed the
/// result to the game; nothing fires on its own, so stopping is synchronous.
pub trait TickSource {
    /// Arm the timer, replacing any schedule already running
    fn start(&mut self);
    /// Disarm the timer; `take_due` returns 0 until the next `start`
    fn stop(&mut self);
    fn is_active(&self) -> bool;
    /// Number of whole periods elapsed since the last call
    fn take_due(&mut self) -> u32;
}

/// [`TickSource`] firing every [`TICK_PERIOD_MS`] on a [`Clock`]
#[derive(Debug, Clone)]
pub struct Countdown<C: Clock> {
    clock: C,
    period_ms: u64,
    next_due_ms: Option<u64>,
    /// Bumped on every start so restarts are observable
    generation: u64,
}

impl<C: Clock> Countdown<C> {
    pub fn new(clock: C) -> Self {
        Self::with_period(clock, TICK_PERIOD_MS)
    }

    pub fn with_period(clock: C, period_ms: u64) -> Self {
        Self {
            clock,
            period_ms: period_ms.max(1),
            next_due_ms: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> TickSource for Countdown<C> {
    fn start(&mut self) {
        if self.next_due_ms.is_some() {
            log::debug!("countdown restarted while active, dropping old schedule");
        }
        self.generation += 1;
        self.next_due_ms = Some(self.clock.now_ms().saturating_add(self.period_ms));
    }

    fn stop(&mut self) {
        self.next_due_ms = None;
    }

    fn is_active(&self) -> bool {
        self.next_due_ms.is_some()
    }

    fn take_due(&mut self) -> u32 {
        let Some(due) = self.next_due_ms else {
            return 0;
        };
        let now = self.clock.now_ms();
        if now < due {
            return 0;
        }

        let ticks = (now - due) / self.period_ms + 1;
        self.next_due_ms = Some(due.saturating_add(ticks.saturating_mul(self.period_ms)));
        ticks.min(u32::MAX as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countdown() -> (ManualClock, Countdown<ManualClock>) {
        let clock = ManualClock::new();
        let countdown = Countdown::new(clock.clone());
        (clock, countdown)
    }

    #[test]
    fn test_idle_until_started() {
        let (clock, mut countdown) = countdown();
        clock.advance(5_000);
        assert!(!countdown.is_active());
        assert_eq!(countdown.take_due(), 0);
    }

    #[test]
    fn test_fires_once_per_second() {
        let (clock, mut countdown) = countdown();
        countdown.start();
        clock.advance(999);
        assert_eq!(countdown.take_due(), 0);
        clock.advance(1);
        assert_eq!(countdown.take_due(), 1);
        assert_eq!(countdown.take_due(), 0);
        clock.advance(2_500);
        assert_eq!(countdown.take_due(), 2);
        clock.advance(500);
        assert_eq!(countdown.take_due(), 1);
    }

    #[test]
    fn test_stop_is_immediate() {
        let (clock, mut countdown) = countdown();
        countdown.start();
        clock.advance(3_000);
        countdown.stop();
        assert_eq!(countdown.take_due(), 0);
        assert!(!countdown.is_active());
    }

    #[test]
    fn test_restart_replaces_schedule() {
        let (clock, mut countdown) = countdown();
        countdown.start();
        clock.advance(900);
        countdown.start();
        assert_eq!(countdown.generation(), 2);
        clock.advance(900);
        // the first schedule would have fired at 1000
        assert_eq!(countdown.take_due(), 0);
        clock.advance(100);
        assert_eq!(countdown.take_due(), 1);
    }
}
