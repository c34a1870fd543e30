use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerCommand;

/// Every focus-timer transition produces an Event.
/// The CLI prints them as JSON; GUIs may forward them to notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        session_id: String,
        habit_id: Option<String>,
        habit_name: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        on_break: bool,
        at: DateTime<Utc>,
    },
    BreakStarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero.
    TimerFinished {
        habit_id: Option<String>,
        was_break: bool,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    /// A command from the shared slot was applied by the timer driver.
    CommandApplied {
        command: TimerCommand,
        at: DateTime<Utc>,
    },
}
