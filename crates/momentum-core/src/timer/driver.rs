//! Focus timer driver.
//!
//! The driver is the single writer of the shared state record. Like a
//! wall-clock engine it has no internal thread: the host app calls
//! `tick()` from its foreground loop, and every call
//!
//! 1. consumes the pending command (if any) and applies it, then
//! 2. reconciles the countdown and records `Finished` when it hits zero.
//!
//! ## State Transitions
//!
//! ```text
//! (none) -start-> Running -pause-> Paused -resume-> Running
//! Running|Finished -start_break-> BreakTime -pause-> Paused -resume-> BreakTime
//! Running|BreakTime -countdown-> Finished
//! any -stop-> (none)
//! ```
//!
//! Transitions that do not apply to the current state are no-ops and
//! return `None`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::bridge::TimerBridge;
use super::state::{SharedTimerState, TimerCommand, TimerState};
use super::store::SharedStore;
use crate::events::Event;

/// Habit label used when a session is started from a widget without one.
pub const DEFAULT_HABIT_NAME: &str = "Focus";

pub struct FocusTimer<S: SharedStore> {
    bridge: TimerBridge<S>,
    /// Focus length in seconds for sessions started by command.
    focus_secs: u64,
    break_secs: u64,
}

impl<S: SharedStore> FocusTimer<S> {
    pub fn new(store: S, focus_secs: u64, break_secs: u64) -> Self {
        Self {
            bridge: TimerBridge::new(store),
            focus_secs,
            break_secs,
        }
    }

    pub fn bridge(&self) -> &TimerBridge<S> {
        &self.bridge
    }

    pub fn focus_secs(&self) -> u64 {
        self.focus_secs
    }

    pub fn break_secs(&self) -> u64 {
        self.break_secs
    }

    /// Reader view of the session as of `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> Option<SharedTimerState> {
        self.bridge.read_state_at(now)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new focus session.
    ///
    /// Ignored while a session is running, paused or on break; a finished
    /// session is replaced.
    pub fn start_at(
        &self,
        habit_id: Option<String>,
        habit_name: &str,
        duration_secs: u64,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        if let Some(current) = self.bridge.read_state_at(now) {
            if current.timer_state != TimerState::Finished {
                tracing::debug!(state = ?current.timer_state, "start ignored; session in progress");
                return None;
            }
        }

        let session_id = Uuid::new_v4().to_string();
        let state = SharedTimerState {
            is_active: true,
            habit_id: habit_id.clone(),
            habit_name: habit_name.to_string(),
            time_remaining: duration_secs,
            timer_state: TimerState::Running,
            last_updated: now,
            total_duration: duration_secs,
            paused_from_break: false,
            session_id: Some(session_id.clone()),
        };
        self.bridge.write_state(&state);
        tracing::debug!(%session_id, duration_secs, "focus session started");

        Some(Event::TimerStarted {
            session_id,
            habit_id,
            habit_name: habit_name.to_string(),
            duration_secs,
            at: now,
        })
    }

    pub fn pause_at(&self, now: DateTime<Utc>) -> Option<Event> {
        let mut state = self.bridge.read_state_at(now)?;
        if !state.timer_state.is_counting() {
            return None;
        }
        state.paused_from_break = state.timer_state == TimerState::BreakTime;
        state.timer_state = TimerState::Paused;
        self.bridge.write_state(&state);

        Some(Event::TimerPaused {
            remaining_secs: state.time_remaining,
            at: now,
        })
    }

    pub fn resume_at(&self, now: DateTime<Utc>) -> Option<Event> {
        let mut state = self.bridge.read_state_at(now)?;
        if state.timer_state != TimerState::Paused {
            return None;
        }
        let on_break = state.paused_from_break;
        state.timer_state = if on_break {
            TimerState::BreakTime
        } else {
            TimerState::Running
        };
        state.paused_from_break = false;
        state.last_updated = now;
        self.bridge.write_state(&state);

        Some(Event::TimerResumed {
            remaining_secs: state.time_remaining,
            on_break,
            at: now,
        })
    }

    /// End the session from any state by removing the record.
    pub fn stop_at(&self, now: DateTime<Utc>) -> Option<Event> {
        let was_active = self.bridge.is_session_active();
        self.bridge.clear_state();
        was_active.then_some(Event::TimerStopped { at: now })
    }

    /// Switch a running or finished session into a break.
    pub fn start_break_at(&self, duration_secs: u64, now: DateTime<Utc>) -> Option<Event> {
        let mut state = self.bridge.read_state_at(now)?;
        if !matches!(state.timer_state, TimerState::Running | TimerState::Finished) {
            return None;
        }
        state.timer_state = TimerState::BreakTime;
        state.time_remaining = duration_secs;
        state.total_duration = duration_secs;
        state.paused_from_break = false;
        state.last_updated = now;
        self.bridge.write_state(&state);

        Some(Event::BreakStarted {
            duration_secs,
            at: now,
        })
    }

    /// Apply one command as if a widget had posted it.
    pub fn apply_at(&self, command: TimerCommand, now: DateTime<Utc>) -> Option<Event> {
        match command {
            TimerCommand::Start => {
                // Keep the habit of a finished session so "start again" repeats it.
                let previous = self.bridge.read_raw_state();
                let habit_id = previous.as_ref().and_then(|s| s.habit_id.clone());
                let habit_name = previous
                    .as_ref()
                    .map(|s| s.habit_name.clone())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| DEFAULT_HABIT_NAME.to_string());
                self.start_at(habit_id, &habit_name, self.focus_secs, now)
            }
            TimerCommand::Pause => self.pause_at(now),
            TimerCommand::Resume => self.resume_at(now),
            TimerCommand::Stop => self.stop_at(now),
        }
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// One evaluation of the driver loop. Returns the events it produced.
    pub fn tick_at(&self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();

        if let Some(command) = self.bridge.take_command() {
            tracing::debug!(%command, "applying timer command");
            if let Some(event) = self.apply_at(command, now) {
                events.push(Event::CommandApplied { command, at: now });
                events.push(event);
            }
        }

        if let Some(stored) = self.bridge.read_raw_state() {
            if stored.timer_state.is_counting() && stored.effective_remaining(now) == 0 {
                let was_break = stored.timer_state == TimerState::BreakTime;
                let finished = stored.reconciled(now);
                self.bridge.write_state(&finished);
                tracing::debug!(was_break, "focus countdown finished");
                events.push(Event::TimerFinished {
                    habit_id: finished.habit_id,
                    was_break,
                    at: now,
                });
            }
        }

        events
    }

    pub fn tick(&self) -> Vec<Event> {
        self.tick_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap()
    }

    fn timer() -> FocusTimer<MemoryStore> {
        FocusTimer::new(MemoryStore::new(), 25 * 60, 5 * 60)
    }

    #[test]
    fn start_writes_running_record() {
        let timer = timer();
        let event = timer.start_at(Some("h1".into()), "Read", 600, t0());
        assert!(matches!(event, Some(Event::TimerStarted { duration_secs: 600, .. })));

        let state = timer.status_at(t0()).unwrap();
        assert!(state.is_active);
        assert_eq!(state.timer_state, TimerState::Running);
        assert_eq!(state.time_remaining, 600);
        assert_eq!(state.habit_id.as_deref(), Some("h1"));
        assert!(state.session_id.is_some());
    }

    #[test]
    fn start_is_ignored_while_running() {
        let timer = timer();
        timer.start_at(None, "Read", 600, t0());
        assert!(timer.start_at(None, "Other", 60, t0() + Duration::seconds(5)).is_none());
        assert_eq!(timer.status_at(t0()).unwrap().habit_name, "Read");
    }

    #[test]
    fn pause_snapshots_reconciled_remaining() {
        let timer = timer();
        timer.start_at(None, "Read", 600, t0());
        timer.pause_at(t0() + Duration::seconds(100)).unwrap();

        // Paused time does not count down.
        let state = timer.status_at(t0() + Duration::hours(2)).unwrap();
        assert_eq!(state.timer_state, TimerState::Paused);
        assert_eq!(state.time_remaining, 500);
    }

    #[test]
    fn resume_carries_remaining_over() {
        let timer = timer();
        timer.start_at(None, "Read", 600, t0());
        timer.pause_at(t0() + Duration::seconds(100));
        let resumed_at = t0() + Duration::seconds(1000);
        timer.resume_at(resumed_at).unwrap();

        let state = timer.status_at(resumed_at + Duration::seconds(50)).unwrap();
        assert_eq!(state.timer_state, TimerState::Running);
        assert_eq!(state.time_remaining, 450);
    }

    #[test]
    fn resume_returns_to_break() {
        let timer = timer();
        timer.start_at(None, "Read", 60, t0());
        timer.start_break_at(300, t0() + Duration::seconds(60)).unwrap();
        timer.pause_at(t0() + Duration::seconds(120)).unwrap();
        let event = timer.resume_at(t0() + Duration::seconds(500)).unwrap();
        assert!(matches!(event, Event::TimerResumed { on_break: true, remaining_secs: 240, .. }));
        assert_eq!(
            timer.status_at(t0() + Duration::seconds(500)).unwrap().timer_state,
            TimerState::BreakTime
        );
    }

    #[test]
    fn invalid_transitions_are_noops() {
        let timer = timer();
        assert!(timer.pause_at(t0()).is_none());
        assert!(timer.resume_at(t0()).is_none());
        assert!(timer.stop_at(t0()).is_none());

        timer.start_at(None, "Read", 600, t0());
        assert!(timer.resume_at(t0()).is_none());
        timer.pause_at(t0());
        assert!(timer.pause_at(t0()).is_none());
        assert!(timer.start_break_at(60, t0()).is_none());
    }

    #[test]
    fn stop_removes_record_from_any_state() {
        let timer = timer();
        timer.start_at(None, "Read", 600, t0());
        timer.pause_at(t0());
        assert!(timer.stop_at(t0()).is_some());
        assert!(timer.status_at(t0()).is_none());
        assert!(timer.bridge().read_raw_state().is_none());
    }

    #[test]
    fn tick_records_finish() {
        let timer = timer();
        timer.start_at(Some("h9".into()), "Read", 60, t0());
        assert!(timer.tick_at(t0() + Duration::seconds(30)).is_empty());

        let events = timer.tick_at(t0() + Duration::seconds(61));
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::TimerFinished { was_break: false, .. }));

        let state = timer.status_at(t0() + Duration::seconds(90)).unwrap();
        assert_eq!(state.timer_state, TimerState::Finished);
        assert_eq!(state.time_remaining, 0);

        // Finished is recorded once.
        assert!(timer.tick_at(t0() + Duration::seconds(120)).is_empty());
    }

    #[test]
    fn tick_consumes_posted_command() {
        let timer = timer();
        timer.start_at(None, "Read", 600, t0());
        timer.bridge().post_command(TimerCommand::Pause);

        let events = timer.tick_at(t0() + Duration::seconds(10));
        assert!(events.iter().any(|e| matches!(e, Event::TimerPaused { remaining_secs: 590, .. })));
        assert_eq!(timer.bridge().peek_command(), None);
    }

    #[test]
    fn start_command_uses_default_duration_and_previous_habit() {
        let timer = timer();
        timer.start_at(Some("h2".into()), "Stretch", 10, t0());
        timer.tick_at(t0() + Duration::seconds(11));

        timer.bridge().post_command(TimerCommand::Start);
        let now = t0() + Duration::seconds(20);
        timer.tick_at(now);

        let state = timer.status_at(now).unwrap();
        assert_eq!(state.timer_state, TimerState::Running);
        assert_eq!(state.time_remaining, 25 * 60);
        assert_eq!(state.habit_name, "Stretch");
        assert_eq!(state.habit_id.as_deref(), Some("h2"));
    }

    #[test]
    fn start_command_without_history_uses_default_name() {
        let timer = timer();
        timer.bridge().post_command(TimerCommand::Start);
        timer.tick_at(t0());
        assert_eq!(timer.status_at(t0()).unwrap().habit_name, DEFAULT_HABIT_NAME);
    }
}
