mod engine;
mod status;

pub use engine::StreakEngine;
pub use status::{StreakStatus, StreakTier};
