//! Best-effort access to the shared timer record and command slot.
//!
//! Every context (app, widget, control toggle, CLI) builds its own
//! `TimerBridge` over the same store. Reads fail open to "no session" and
//! "no command"; writes that fail are logged and dropped. A missed update
//! heals on the next tick, so nothing here returns an error.

use chrono::{DateTime, Utc};

use super::state::{SharedTimerState, TimerCommand};
use super::store::SharedStore;

/// Key of the JSON-serialized state record.
pub const STATE_KEY: &str = "focus_timer_state";
/// Key of the single pending command tag.
pub const COMMAND_KEY: &str = "focus_timer_command";

pub struct TimerBridge<S: SharedStore> {
    store: S,
}

impl<S: SharedStore> TimerBridge<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── State record ─────────────────────────────────────────────────

    /// The stored record exactly as last written, if it is an active one.
    pub fn read_raw_state(&self) -> Option<SharedTimerState> {
        let blob = match self.store.get(STATE_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read timer state; treating as inactive");
                return None;
            }
        };
        match serde_json::from_str::<SharedTimerState>(&blob) {
            Ok(state) if state.is_active => Some(state),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "corrupt timer state record; treating as inactive");
                None
            }
        }
    }

    /// The active session as of `now`, with the countdown reconciled.
    pub fn read_state_at(&self, now: DateTime<Utc>) -> Option<SharedTimerState> {
        self.read_raw_state().map(|state| state.reconciled(now))
    }

    pub fn read_state(&self) -> Option<SharedTimerState> {
        self.read_state_at(Utc::now())
    }

    pub fn is_session_active(&self) -> bool {
        self.read_raw_state().is_some()
    }

    /// Overwrite the whole record in one store operation.
    pub fn write_state(&self, state: &SharedTimerState) {
        let blob = match serde_json::to_string(state) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode timer state");
                return;
            }
        };
        if let Err(e) = self.store.set(STATE_KEY, &blob) {
            tracing::warn!(error = %e, "failed to write timer state; dropping update");
        }
    }

    /// Remove the record entirely; the session is over.
    pub fn clear_state(&self) {
        if let Err(e) = self.store.remove(STATE_KEY) {
            tracing::warn!(error = %e, "failed to clear timer state");
        }
    }

    // ── Command slot ─────────────────────────────────────────────────

    /// Replace any pending command. Last write wins; there is no queue.
    pub fn post_command(&self, command: TimerCommand) {
        tracing::debug!(%command, "posting timer command");
        if let Err(e) = self.store.set(COMMAND_KEY, command.as_str()) {
            tracing::warn!(error = %e, %command, "failed to post timer command");
        }
    }

    fn read_command_tag(&self) -> Option<String> {
        match self.store.get(COMMAND_KEY) {
            Ok(tag) => tag,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read timer command");
                None
            }
        }
    }

    fn parse_command(tag: &str) -> Option<TimerCommand> {
        match tag.parse() {
            Ok(command) => Some(command),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unrecognized timer command");
                None
            }
        }
    }

    /// Look at the pending command without consuming it.
    pub fn peek_command(&self) -> Option<TimerCommand> {
        self.read_command_tag()
            .and_then(|tag| Self::parse_command(&tag))
    }

    /// Read and clear the pending command.
    ///
    /// Only the tag that was read is cleared; a command posted in between
    /// stays in the slot for the next tick. An unrecognized tag is cleared
    /// too, so it cannot block the slot.
    pub fn take_command(&self) -> Option<TimerCommand> {
        let tag = self.read_command_tag()?;
        match self.store.remove_if(COMMAND_KEY, &tag) {
            Ok(true) => {}
            Ok(false) => tracing::debug!(%tag, "timer command replaced while taking it"),
            Err(e) => tracing::warn!(error = %e, "failed to clear timer command"),
        }
        Self::parse_command(&tag)
    }
}
