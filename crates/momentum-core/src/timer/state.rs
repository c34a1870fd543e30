//! Records exchanged through the shared store.
//!
//! Two entries live in the store:
//!
//! - the **state record**, written only by the app's timer driver and read
//!   by every other context (widget timeline, control toggle, CLI);
//! - the **command slot**, written by any non-owning context and consumed
//!   by the driver on its next tick.
//!
//! There is no `Idle` state value. "No record" and "record present with
//! `is_active == false`" both mean no session is running.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerState {
    Running,
    Paused,
    BreakTime,
    Finished,
}

impl TimerState {
    /// Whether the recorded remaining time is still counting down.
    pub fn is_counting(&self) -> bool {
        matches!(self, TimerState::Running | TimerState::BreakTime)
    }
}

/// Whole-record snapshot of the focus session.
///
/// Always written as one JSON blob, never field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedTimerState {
    pub is_active: bool,
    #[serde(default)]
    pub habit_id: Option<String>,
    #[serde(default)]
    pub habit_name: String,
    /// Seconds left at `last_updated`.
    pub time_remaining: u64,
    pub timer_state: TimerState,
    pub last_updated: DateTime<Utc>,
    /// Length of the current phase in seconds, for progress rings.
    #[serde(default)]
    pub total_duration: u64,
    /// Set when paused during a break so `resume` goes back to the break.
    #[serde(default)]
    pub paused_from_break: bool,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl SharedTimerState {
    /// Seconds left as of `now`.
    ///
    /// A counting record is a snapshot, so elapsed wall-clock time since
    /// `last_updated` is subtracted, floored at zero. Paused and finished
    /// records are authoritative as-is. A clock that went backwards counts
    /// as no time elapsed.
    pub fn effective_remaining(&self, now: DateTime<Utc>) -> u64 {
        if !self.timer_state.is_counting() {
            return self.time_remaining;
        }
        let elapsed = (now - self.last_updated).num_seconds().max(0) as u64;
        self.time_remaining.saturating_sub(elapsed)
    }

    /// 0.0 .. 1.0 progress through the current phase as of `now`.
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        if self.total_duration == 0 {
            return 0.0;
        }
        let remaining = self.effective_remaining(now).min(self.total_duration);
        1.0 - remaining as f64 / self.total_duration as f64
    }

    /// Copy of this record with the countdown applied up to `now`.
    ///
    /// A counting record that has run out is reported as `Finished`.
    pub fn reconciled(&self, now: DateTime<Utc>) -> Self {
        let mut out = self.clone();
        if self.timer_state.is_counting() {
            out.time_remaining = self.effective_remaining(now);
            out.last_updated = now;
            if out.time_remaining == 0 {
                out.timer_state = TimerState::Finished;
            }
        }
        out
    }
}

/// Intent posted by a widget button or control toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerCommand {
    Start,
    Pause,
    Resume,
    Stop,
}

impl TimerCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerCommand::Start => "start",
            TimerCommand::Pause => "pause",
            TimerCommand::Resume => "resume",
            TimerCommand::Stop => "stop",
        }
    }
}

impl fmt::Display for TimerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown timer command: {}", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

impl FromStr for TimerCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "start" => Ok(TimerCommand::Start),
            "pause" => Ok(TimerCommand::Pause),
            "resume" => Ok(TimerCommand::Resume),
            "stop" => Ok(TimerCommand::Stop),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(state: TimerState, remaining: u64) -> SharedTimerState {
        SharedTimerState {
            is_active: true,
            habit_id: Some("h1".into()),
            habit_name: "Reading".into(),
            time_remaining: remaining,
            timer_state: state,
            last_updated: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            total_duration: 600,
            paused_from_break: false,
            session_id: None,
        }
    }

    #[test]
    fn running_record_counts_down_at_read_time() {
        let r = record(TimerState::Running, 600);
        let later = r.last_updated + Duration::seconds(10);
        assert_eq!(r.effective_remaining(later), 590);
    }

    #[test]
    fn countdown_floors_at_zero() {
        let r = record(TimerState::BreakTime, 30);
        let later = r.last_updated + Duration::minutes(5);
        assert_eq!(r.effective_remaining(later), 0);
        assert_eq!(r.reconciled(later).timer_state, TimerState::Finished);
    }

    #[test]
    fn paused_and_finished_are_authoritative() {
        let later = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(record(TimerState::Paused, 420).effective_remaining(later), 420);
        assert_eq!(record(TimerState::Finished, 0).effective_remaining(later), 0);
    }

    #[test]
    fn clock_skew_does_not_add_time() {
        let r = record(TimerState::Running, 100);
        let earlier = r.last_updated - Duration::seconds(30);
        assert_eq!(r.effective_remaining(earlier), 100);
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let json = serde_json::to_value(record(TimerState::BreakTime, 5)).unwrap();
        assert_eq!(json["isActive"], true);
        assert_eq!(json["timerState"], "breakTime");
        assert_eq!(json["timeRemaining"], 5);
        assert!(json.get("lastUpdated").is_some());
    }

    #[test]
    fn minimal_blob_decodes_with_defaults() {
        let json = r#"{
            "isActive": true,
            "timeRemaining": 1500,
            "timerState": "running",
            "lastUpdated": "2024-05-01T09:00:00Z"
        }"#;
        let r: SharedTimerState = serde_json::from_str(json).unwrap();
        assert_eq!(r.habit_id, None);
        assert_eq!(r.total_duration, 0);
        assert!(!r.paused_from_break);
    }

    #[test]
    fn command_tags_parse() {
        for cmd in [
            TimerCommand::Start,
            TimerCommand::Pause,
            TimerCommand::Resume,
            TimerCommand::Stop,
        ] {
            assert_eq!(cmd.as_str().parse::<TimerCommand>(), Ok(cmd));
        }
        assert!("snooze".parse::<TimerCommand>().is_err());
    }
}
