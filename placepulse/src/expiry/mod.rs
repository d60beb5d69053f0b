//! Marker expiry state machine.
//!
//! After a pagination run completes, every rendered marker counts down:
//! a marker with lifespan index `n` is removed on the tick where the
//! elapsed counter equals `n`. The scheduler is a plain state machine;
//! the one-second tick source that drives it is owned by the session
//! daemon, which guarantees at most one ticking process per session and
//! serializes sweeps with every other registry mutation.
//!
//! # States
//!
//! ```text
//!            start(n)                remaining == 0
//!   Idle ───────────────► Running ───────────────► Idle
//!     ▲                      │
//!     └────── stop() ────────┘
//! ```

use tracing::debug;

use crate::registry::MarkerRegistry;
use crate::render::MarkerHandle;

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// No countdown in progress.
    #[default]
    Idle,

    /// Counting down.
    Running {
        /// Ticks handled since the countdown started.
        elapsed: u32,
        /// Markers still waiting to be removed.
        remaining: u32,
    },
}

/// Result of one tick sweep.
#[derive(Debug)]
pub struct TickSweep {
    /// Handles of the markers that expired on this tick, in
    /// registration order.
    pub expired: Vec<MarkerHandle>,

    /// True when the countdown finished with this tick and the session
    /// should reset.
    pub finished: bool,
}

/// Countdown over the markers of one completed pagination run.
#[derive(Debug, Default)]
pub struct ExpiryScheduler {
    state: SchedulerState,
}

impl ExpiryScheduler {
    /// Creates an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Returns true while a countdown is in progress.
    pub fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running { .. })
    }

    /// Begins a countdown over `initial_points` markers.
    ///
    /// A running countdown is discarded first, so a second `start` never
    /// leaves two countdowns interleaved.
    pub fn start(&mut self, initial_points: u32) {
        if self.is_running() {
            debug!("restarting expiry countdown; discarding previous state");
        }
        self.state = SchedulerState::Running {
            elapsed: 0,
            remaining: initial_points,
        };
    }

    /// Cancels the countdown.
    pub fn stop(&mut self) {
        self.state = SchedulerState::Idle;
    }

    /// Handles one tick: removes every marker whose lifespan index equals
    /// the elapsed counter, then advances the counter.
    ///
    /// Returns `None` when idle. When the number of remaining markers
    /// reaches zero the sweep reports `finished` and the scheduler
    /// transitions back to idle.
    pub fn on_tick(&mut self, registry: &mut MarkerRegistry) -> Option<TickSweep> {
        let (elapsed, remaining) = match self.state {
            SchedulerState::Running { elapsed, remaining } => (elapsed, remaining),
            SchedulerState::Idle => return None,
        };

        let expired = registry.remove_matching(elapsed);
        let remaining = remaining.saturating_sub(expired.len() as u32);

        if remaining == 0 {
            debug!(elapsed, "expiry countdown finished");
            self.state = SchedulerState::Idle;
            Some(TickSweep {
                expired,
                finished: true,
            })
        } else {
            self.state = SchedulerState::Running {
                elapsed: elapsed + 1,
                remaining,
            };
            Some(TickSweep {
                expired,
                finished: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(indices: &[u32]) -> MarkerRegistry {
        let mut registry = MarkerRegistry::new();
        for (i, &index) in indices.iter().enumerate() {
            registry.add(MarkerHandle::new(i as u64), index);
        }
        registry
    }

    #[test]
    fn test_idle_tick_is_a_no_op() {
        let mut scheduler = ExpiryScheduler::new();
        let mut registry = registry_with(&[0]);

        assert!(scheduler.on_tick(&mut registry).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_removes_matching_index_per_tick() {
        let mut scheduler = ExpiryScheduler::new();
        let mut registry = registry_with(&[0, 2, 2]);
        scheduler.start(3);

        // Tick 0: only the index-0 marker goes.
        let sweep = scheduler.on_tick(&mut registry).unwrap();
        assert_eq!(sweep.expired.len(), 1);
        assert!(!sweep.finished);
        assert_eq!(registry.len(), 2);

        // Tick 1: nothing matches.
        let sweep = scheduler.on_tick(&mut registry).unwrap();
        assert!(sweep.expired.is_empty());
        assert!(!sweep.finished);

        // Tick 2: both index-2 markers go and the countdown finishes.
        let sweep = scheduler.on_tick(&mut registry).unwrap();
        assert_eq!(sweep.expired.len(), 2);
        assert!(sweep.finished);
        assert!(registry.is_empty());
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_finishes_exactly_when_remaining_reaches_zero() {
        let mut scheduler = ExpiryScheduler::new();
        let mut registry = registry_with(&[1]);
        scheduler.start(1);

        let sweep = scheduler.on_tick(&mut registry).unwrap();
        assert!(!sweep.finished);

        let sweep = scheduler.on_tick(&mut registry).unwrap();
        assert!(sweep.finished);
    }

    #[test]
    fn test_empty_countdown_finishes_on_first_tick() {
        let mut scheduler = ExpiryScheduler::new();
        let mut registry = MarkerRegistry::new();
        scheduler.start(0);

        let sweep = scheduler.on_tick(&mut registry).unwrap();
        assert!(sweep.expired.is_empty());
        assert!(sweep.finished);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_restart_resets_elapsed() {
        let mut scheduler = ExpiryScheduler::new();
        let mut registry = registry_with(&[0, 1]);
        scheduler.start(2);
        scheduler.on_tick(&mut registry).unwrap();

        // Restart mid-countdown: elapsed goes back to zero.
        scheduler.start(1);
        assert_eq!(
            scheduler.state(),
            SchedulerState::Running {
                elapsed: 0,
                remaining: 1
            }
        );
    }

    #[test]
    fn test_stop_returns_to_idle() {
        let mut scheduler = ExpiryScheduler::new();
        scheduler.start(5);
        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }
}
