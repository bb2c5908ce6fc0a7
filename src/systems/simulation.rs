//! Real-time simulation scheduling
//!
//! Maps wall-clock time onto fixed physics ticks:
//! - Ticks due from elapsed time minus time spent hidden
//! - Hidden intervals reported by the host are excluded
//! - A per-frame catch-up cap drops excess backlog

use std::time::{Duration, Instant};

use impulse2d_physics::PhysicsWorld;

use crate::config::SimulationConfig;

/// Number of ticks that should run now to catch up with real time
///
/// Tick `n` (1-based) is due once `(n - 1) * fixed_dt` of productive time has
/// passed, so the first tick runs immediately. Productive time is `elapsed`
/// minus `excluded`. Returns 0 when the simulation is already ahead.
pub fn ticks_due(elapsed: Duration, excluded: Duration, tick_index: u64, fixed_dt: Duration) -> u64 {
    let dt_nanos = fixed_dt.as_nanos();
    if dt_nanos == 0 {
        return 0;
    }

    let productive = elapsed.saturating_sub(excluded).as_nanos();
    let target = u64::try_from(productive / dt_nanos + 1).unwrap_or(u64::MAX);
    target.saturating_sub(tick_index)
}

/// Result of a simulation update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    /// Ticks run during this update
    pub ticks_run: u64,
    /// Ticks skipped because of the catch-up cap
    pub ticks_dropped: u64,
}

/// Drives a physics world from wall-clock time
///
/// Handles:
/// - Real-time to tick reconciliation
/// - Hidden-time exclusion
/// - Catch-up limiting
pub struct SimulationSystem {
    started: Instant,
    fixed_dt: Duration,
    max_catch_up_ticks: u64,
    /// Completed hidden intervals plus dropped backlog
    excluded: Duration,
    /// Start of the current hidden interval
    hidden_since: Option<Instant>,
}

impl SimulationSystem {
    /// Create a new simulation system starting at `now`
    pub fn new(now: Instant, ticks_per_second: u32, max_catch_up_ticks: u32) -> Self {
        Self {
            started: now,
            fixed_dt: Duration::from_secs(1) / ticks_per_second.max(1),
            max_catch_up_ticks: u64::from(max_catch_up_ticks.max(1)),
            excluded: Duration::ZERO,
            hidden_since: None,
        }
    }

    /// Create a simulation system from the simulation config section
    pub fn from_config(config: &SimulationConfig, now: Instant) -> Self {
        Self::new(now, config.ticks_per_second, config.max_catch_up_ticks)
    }

    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    pub fn is_visible(&self) -> bool {
        self.hidden_since.is_none()
    }

    /// Report a visibility change from the host
    ///
    /// Time between hiding and showing again does not count toward ticks.
    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        match (visible, self.hidden_since) {
            (true, Some(since)) => {
                let hidden = now.saturating_duration_since(since);
                self.excluded += hidden;
                self.hidden_since = None;
                log::debug!("Visible again after {:?} hidden", hidden);
            }
            (false, None) => {
                self.hidden_since = Some(now);
                log::debug!("Hidden; pausing tick reconciliation");
            }
            _ => {}
        }
    }

    /// Total time excluded from reconciliation as of `now`
    pub fn excluded(&self, now: Instant) -> Duration {
        let current = self
            .hidden_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or(Duration::ZERO);
        self.excluded + current
    }

    /// Run every tick that is due at `now`
    pub fn update(&mut self, world: &mut PhysicsWorld, now: Instant) -> SimulationResult {
        let elapsed = now.saturating_duration_since(self.started);
        let due = ticks_due(elapsed, self.excluded(now), world.tick_index(), self.fixed_dt);

        let ticks_run = due.min(self.max_catch_up_ticks);
        let ticks_dropped = due - ticks_run;

        if ticks_dropped > 0 {
            let dropped_nanos = self.fixed_dt.as_nanos().saturating_mul(u128::from(ticks_dropped));
            self.excluded += Duration::from_nanos(u64::try_from(dropped_nanos).unwrap_or(u64::MAX));
            log::warn!(
                "Simulation fell behind by {} ticks; dropping backlog",
                ticks_dropped
            );
        }

        for _ in 0..ticks_run {
            world.tick();
        }

        SimulationResult {
            ticks_run,
            ticks_dropped,
        }
    }
}
