//! Deterministic millisecond clock with periodic drivers
//!
//! Timers here are plain schedule entries, not OS timers. The host advances
//! the clock once per frame and every due firing is replayed in time order,
//! so a stopped timer can never fire and all mutation stays on one thread.

use serde::{Deserialize, Serialize};

/// The three periodic drivers of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Driver {
    /// Spawns a batch of bubbles
    Spawn,
    /// Moves bubbles and prunes the ones that left the screen
    Motion,
    /// Recomputes difficulty from session time
    Difficulty,
}

/// A fixed-period timer that is either stopped or scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicTimer {
    period_ms: u64,
    next_fire_ms: Option<u64>,
}

impl PeriodicTimer {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            next_fire_ms: None,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn next_fire_ms(&self) -> Option<u64> {
        self.next_fire_ms
    }

    pub fn is_running(&self) -> bool {
        self.next_fire_ms.is_some()
    }

    /// First firing one period after `now_ms`
    pub fn start(&mut self, now_ms: u64) {
        self.next_fire_ms = Some(now_ms + self.period_ms);
    }

    pub fn stop(&mut self) {
        self.next_fire_ms = None;
    }

    /// Stop and start again with a new period
    pub fn restart(&mut self, now_ms: u64, period_ms: u64) {
        self.period_ms = period_ms.max(1);
        self.start(now_ms);
    }

    fn is_due(&self, now_ms: u64) -> bool {
        self.next_fire_ms.is_some_and(|at| at <= now_ms)
    }

    /// Move the next firing one period forward
    fn reschedule(&mut self) {
        if let Some(at) = self.next_fire_ms.as_mut() {
            *at += self.period_ms;
        }
    }
}

/// Session clock and its drivers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    now_ms: u64,
    spawn: PeriodicTimer,
    motion: PeriodicTimer,
    difficulty: PeriodicTimer,
}

impl SimClock {
    pub fn new(spawn_ms: u64, motion_ms: u64, difficulty_ms: u64) -> Self {
        Self {
            now_ms: 0,
            spawn: PeriodicTimer::new(spawn_ms),
            motion: PeriodicTimer::new(motion_ms),
            difficulty: PeriodicTimer::new(difficulty_ms),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn timer(&self, driver: Driver) -> &PeriodicTimer {
        match driver {
            Driver::Spawn => &self.spawn,
            Driver::Motion => &self.motion,
            Driver::Difficulty => &self.difficulty,
        }
    }

    pub fn timer_mut(&mut self, driver: Driver) -> &mut PeriodicTimer {
        match driver {
            Driver::Spawn => &mut self.spawn,
            Driver::Motion => &mut self.motion,
            Driver::Difficulty => &mut self.difficulty,
        }
    }

    pub fn start(&mut self, driver: Driver) {
        let now = self.now_ms;
        self.timer_mut(driver).start(now);
    }

    pub fn stop(&mut self, driver: Driver) {
        self.timer_mut(driver).stop();
    }

    /// Restart a driver with a new period from the current time
    pub fn restart(&mut self, driver: Driver, period_ms: u64) {
        let now = self.now_ms;
        self.timer_mut(driver).restart(now, period_ms);
    }

    pub fn start_all(&mut self) {
        for driver in [Driver::Spawn, Driver::Motion, Driver::Difficulty] {
            self.start(driver);
        }
    }

    pub fn stop_all(&mut self) {
        self.spawn.stop();
        self.motion.stop();
        self.difficulty.stop();
    }

    pub fn any_running(&self) -> bool {
        self.spawn.is_running() || self.motion.is_running() || self.difficulty.is_running()
    }

    /// Pop the earliest firing due at or before `until_ms`.
    ///
    /// Moves the clock to the firing time and reschedules that timer. Ties
    /// go to the driver declared first. Returns `None` once nothing is due,
    /// leaving the clock where it was so the caller can finish with
    /// [`SimClock::settle`].
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Driver> {
        let driver = [Driver::Spawn, Driver::Motion, Driver::Difficulty]
            .into_iter()
            .filter(|d| self.timer(*d).is_due(until_ms))
            .min_by_key(|d| (self.timer(*d).next_fire_ms, *d))?;

        let timer = self.timer_mut(driver);
        let fire_at = timer.next_fire_ms.unwrap_or(until_ms);
        timer.reschedule();
        self.now_ms = self.now_ms.max(fire_at);
        Some(driver)
    }

    /// Move the clock to `now_ms` once every due firing has been handled.
    /// Time never runs backwards.
    pub fn settle(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}
