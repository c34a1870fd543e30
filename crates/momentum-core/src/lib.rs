//! # Momentum Core Library
//!
//! This library provides the domain logic behind the Momentum habit and
//! focus app. It follows a CLI-first philosophy: everything is available
//! through the standalone `momentum-cli` binary, and GUI or widget hosts
//! are thin layers over the same library.
//!
//! ## Architecture
//!
//! - **Streak Engine**: pure date math over completion instants in one
//!   calendar (current/longest streak, completion rate, tiers)
//! - **Focus Timer Bridge**: a whole-record state snapshot plus a
//!   last-write-wins command slot in a key-value store shared between the
//!   app process and its widget extensions
//! - **Plan Validator**: schema walk over AI-generated plans yielding a
//!   completeness report and recovery strategy
//! - **Storage**: SQLite habit store and TOML configuration
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: streak metrics
//! - [`FocusTimer`]: single writer of the shared timer record
//! - [`TimerBridge`]: fail-open reader/writer over a [`SharedStore`]
//! - [`CompletenessReport`]: validator output

pub mod error;
pub mod events;
pub mod storage;
pub mod streak;
pub mod timer;
pub mod validator;

pub use error::{ConfigError, CoreError, DatabaseError, StoreError, ValidationError};
pub use events::Event;
pub use storage::{Config, Database, Habit};
pub use streak::{StreakEngine, StreakStatus, StreakTier};
pub use timer::{
    FocusTimer, MemoryStore, SharedStore, SharedTimerState, SqliteStore, TimerBridge,
    TimerCommand, TimerState,
};
pub use validator::{
    apply_defaults, strip_code_fences, validate_response, validate_value, CompletenessReport,
    RecoveryStrategy, Schema,
};
