mod bridge;
mod driver;
mod state;
mod store;

pub use bridge::{TimerBridge, COMMAND_KEY, STATE_KEY};
pub use driver::{FocusTimer, DEFAULT_HABIT_NAME};
pub use state::{SharedTimerState, TimerCommand, TimerState, UnknownCommand};
pub use store::{MemoryStore, SharedStore, SqliteStore, SHARED_STORE_FILE};
