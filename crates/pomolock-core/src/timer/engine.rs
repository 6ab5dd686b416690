//! Session state machine.
//!
//! The engine is a plain value with no threads or clocks of its own. The
//! countdown driver owns it and calls [`SessionEngine::tick`] once per second.
//!
//! ## Phase Transitions
//!
//! ```text
//! Work -> ShortBreak -> Work -> ... (cycles - 1 times) -> Work -> LongBreak -> Work
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(Config::default());
//! engine.start();
//! // Once per second:
//! if engine.tick() == TickOutcome::Finished {
//!     let transition = engine.complete_phase();
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::phase::{format_clock, Phase};
use crate::events::Event;
use crate::storage::Config;

/// Immutable read of the session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub phase: Phase,
    pub phase_name: String,
    /// Cycle shown to the user: the one in progress during work, the number
    /// completed during a break.
    pub cycle: u32,
    pub total_cycles: u32,
    pub remaining_secs: u64,
    pub running: bool,
    pub paused: bool,
}

impl Status {
    /// Remaining time as `mm:ss`.
    pub fn clock(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// One-line summary, e.g. `🍅 Work 24:59  cycle 1/4`.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} {} {}  cycle {}/{}",
            self.phase.icon(),
            self.phase_name,
            self.clock(),
            self.cycle,
            self.total_cycles
        );
        if self.paused {
            line.push_str("  (paused)");
        } else if !self.running {
            line.push_str("  (stopped)");
        }
        line
    }
}

/// Result of one call to [`SessionEngine::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or paused: nothing changed.
    Idle,
    /// One second was counted off.
    Counted,
    /// The countdown hit zero; call [`SessionEngine::complete_phase`].
    Finished,
}

/// A completed phase and the one that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub completed: Phase,
    pub next: Phase,
    /// Completed work phases after the transition.
    pub cycle_count: u32,
}

/// Core Pomodoro state machine.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    config: Config,
    phase: Phase,
    cycle_count: u32,
    /// Zero means "not yet loaded for this phase".
    remaining_secs: u64,
    running: bool,
    paused: bool,
}

impl SessionEngine {
    /// Create an engine at the start of a fresh round: work phase, no
    /// completed cycles, countdown not loaded.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: Phase::Work,
            cycle_count: 0,
            remaining_secs: 0,
            running: false,
            paused: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> Status {
        let cycle = match self.phase {
            Phase::Work => self.cycle_count + 1,
            Phase::ShortBreak | Phase::LongBreak => self.cycle_count,
        };
        Status {
            phase: self.phase,
            phase_name: self.phase.display_name().to_string(),
            cycle,
            total_cycles: self.config.cycles,
            remaining_secs: self.remaining_secs,
            running: self.running,
            paused: self.paused,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.status(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `None` when already running (including while paused).
    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.paused = false;
        if self.remaining_secs == 0 {
            self.load_phase();
        }
        Some(Event::TimerStarted {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Flip the paused flag. Phase and countdown are left alone.
    pub fn toggle_pause(&mut self) -> Event {
        self.paused = !self.paused;
        if self.paused {
            Event::TimerPaused {
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            }
        } else {
            Event::TimerResumed {
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            }
        }
    }

    /// Back to the initial state. Idempotent.
    pub fn stop(&mut self) -> Event {
        self.running = false;
        self.paused = false;
        self.phase = Phase::Work;
        self.cycle_count = 0;
        self.remaining_secs = 0;
        Event::TimerStopped { at: Utc::now() }
    }

    /// Swap in a new configuration.
    ///
    /// The running countdown keeps its value; new durations apply from the
    /// next phase load and a new cycle count from the next work completion.
    pub fn reconfigure(&mut self, config: Config) -> Event {
        debug_assert!(config.validate().is_ok());
        self.config = config.clone();
        Event::ConfigChanged {
            config,
            at: Utc::now(),
        }
    }

    /// Count off one second if running and not paused.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running || self.paused {
            return TickOutcome::Idle;
        }
        if self.remaining_secs == 0 {
            return TickOutcome::Finished;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            TickOutcome::Finished
        } else {
            TickOutcome::Counted
        }
    }

    /// Move to the next phase and load its countdown.
    pub fn complete_phase(&mut self) -> Transition {
        let completed = self.phase;
        match completed {
            Phase::Work => self.cycle_count += 1,
            Phase::ShortBreak => {}
            Phase::LongBreak => self.cycle_count = 0,
        }
        // After a long break the counter is already reset, so `next` only
        // depends on it for work phases.
        self.phase = completed.next(self.cycle_count, self.config.cycles);
        self.load_phase();
        Transition {
            completed,
            next: self.phase,
            cycle_count: self.cycle_count,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn load_phase(&mut self) {
        self.remaining_secs = self.config.phase_duration_secs(self.phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finish_phase(engine: &mut SessionEngine) -> Transition {
        loop {
            match engine.tick() {
                TickOutcome::Finished => return engine.complete_phase(),
                TickOutcome::Counted => {}
                TickOutcome::Idle => panic!("engine is not ticking"),
            }
        }
    }

    #[test]
    fn fresh_engine_is_idle_work() {
        let engine = SessionEngine::new(Config::default());
        let status = engine.status();
        assert_eq!(status.phase, Phase::Work);
        assert_eq!(status.cycle, 1);
        assert_eq!(status.total_cycles, 4);
        assert_eq!(status.remaining_secs, 0);
        assert!(!status.running);
        assert!(!status.paused);
    }

    #[test]
    fn start_loads_work_duration() {
        let mut engine = SessionEngine::new(Config::default());
        let event = engine.start().expect("first start emits");
        assert!(matches!(
            event,
            Event::TimerStarted {
                phase: Phase::Work,
                remaining_secs: 1500,
                ..
            }
        ));
        assert!(engine.is_running());
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn start_while_running_is_noop() {
        let mut engine = SessionEngine::new(Config::default());
        engine.start();
        engine.tick();
        assert!(engine.start().is_none());
        assert_eq!(engine.remaining_secs(), 1499);
    }

    #[test]
    fn start_while_paused_keeps_pause() {
        let mut engine = SessionEngine::new(Config::default());
        engine.start();
        engine.toggle_pause();
        assert!(engine.start().is_none());
        assert!(engine.is_paused());
    }

    #[test]
    fn pause_toggled_twice_restores_state() {
        let mut engine = SessionEngine::new(Config::default());
        engine.start();
        engine.tick();
        let before = engine.status();

        assert!(matches!(engine.toggle_pause(), Event::TimerPaused { .. }));
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert!(matches!(engine.toggle_pause(), Event::TimerResumed { .. }));

        assert_eq!(engine.status(), before);
    }

    #[test]
    fn tick_before_start_does_nothing() {
        let mut engine = SessionEngine::new(Config::default());
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(engine.remaining_secs(), 0);
    }

    #[test]
    fn tick_reports_finish_at_zero() {
        let cfg = Config {
            work_time: 1,
            ..Config::default()
        };
        let mut engine = SessionEngine::new(cfg);
        engine.start();
        for _ in 0..59 {
            assert_eq!(engine.tick(), TickOutcome::Counted);
        }
        assert_eq!(engine.tick(), TickOutcome::Finished);
        assert_eq!(engine.remaining_secs(), 0);
    }

    #[test]
    fn work_then_short_break_then_work() {
        let mut engine = SessionEngine::new(Config::default());
        engine.start();

        let t = finish_phase(&mut engine);
        assert_eq!(t.completed, Phase::Work);
        assert_eq!(t.next, Phase::ShortBreak);
        assert_eq!(t.cycle_count, 1);
        assert_eq!(engine.remaining_secs(), 300);
        // Break shows completed cycles.
        assert_eq!(engine.status().cycle, 1);

        let t = finish_phase(&mut engine);
        assert_eq!(t.next, Phase::Work);
        assert_eq!(t.cycle_count, 1);
        assert_eq!(engine.status().cycle, 2);
    }

    #[test]
    fn four_cycles_reach_long_break_then_reset() {
        let mut engine = SessionEngine::new(Config::default());
        engine.start();

        for _ in 0..3 {
            assert_eq!(finish_phase(&mut engine).next, Phase::ShortBreak);
            assert_eq!(finish_phase(&mut engine).next, Phase::Work);
        }
        let t = finish_phase(&mut engine);
        assert_eq!(t.next, Phase::LongBreak);
        assert_eq!(engine.cycle_count(), 4);
        assert_eq!(engine.remaining_secs(), 900);

        let t = finish_phase(&mut engine);
        assert_eq!(t.next, Phase::Work);
        assert_eq!(engine.cycle_count(), 0);
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn stop_resets_everything() {
        let mut engine = SessionEngine::new(Config::default());
        engine.start();
        finish_phase(&mut engine);
        engine.toggle_pause();

        engine.stop();
        let status = engine.status();
        assert_eq!(status.phase, Phase::Work);
        assert_eq!(status.cycle, 1);
        assert_eq!(status.remaining_secs, 0);
        assert!(!status.running);
        assert!(!status.paused);

        // Idempotent.
        engine.stop();
        assert_eq!(engine.status(), status);
    }

    #[test]
    fn reconfigure_applies_on_next_phase() {
        let mut engine = SessionEngine::new(Config::default());
        engine.start();
        engine.tick();
        engine.reconfigure(Config {
            short_break: 2,
            cycles: 1,
            ..Config::default()
        });
        assert_eq!(engine.remaining_secs(), 1499);
        assert_eq!(engine.status().total_cycles, 1);

        // One cycle per round now, so the first work phase ends in a long break.
        let t = finish_phase(&mut engine);
        assert_eq!(t.next, Phase::LongBreak);
    }

    #[test]
    fn status_summary_mentions_cycle() {
        let mut engine = SessionEngine::new(Config::default());
        engine.start();
        let summary = engine.status().summary();
        assert!(summary.contains("Work 25:00"), "{summary}");
        assert!(summary.contains("cycle 1/4"), "{summary}");
    }
}
