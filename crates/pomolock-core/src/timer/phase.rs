use serde::{Deserialize, Serialize};

/// One countdown segment of the Pomodoro cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    /// Human-readable name used in status lines and notifications.
    pub fn display_name(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Phase::Work => "🍅",
            Phase::ShortBreak => "☕",
            Phase::LongBreak => "🛌",
        }
    }

    /// Phase that follows `self`, given how many work phases have been
    /// completed once `self` ends and how many make up a full round.
    ///
    /// `completed_cycles` must already include a just-finished work phase.
    pub fn next(self, completed_cycles: u32, cycles: u32) -> Phase {
        match self {
            Phase::Work if completed_cycles >= cycles => Phase::LongBreak,
            Phase::Work => Phase::ShortBreak,
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Format a second count as `mm:ss`. Minutes are not wrapped at 60.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
