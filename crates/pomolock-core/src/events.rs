use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::Config;
use crate::timer::{Phase, Status};

/// Every state change in the timer produces an Event.
/// The presentation layer consumes them in the order they were emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    /// A phase ran down to zero and the next one was loaded.
    PhaseCompleted {
        completed: Phase,
        next: Phase,
        /// Completed work phases after the transition.
        cycle_count: u32,
        at: DateTime<Utc>,
    },
    ConfigChanged {
        config: Config,
        at: DateTime<Utc>,
    },
    /// Emitted after every tick and every phase transition.
    StateSnapshot {
        status: Status,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The status carried by a snapshot event.
    pub fn status(&self) -> Option<&Status> {
        match self {
            Event::StateSnapshot { status, .. } => Some(status),
            _ => None,
        }
    }
}
