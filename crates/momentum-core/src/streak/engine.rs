//! Streak engine implementation.
//!
//! All metrics are derived from an unordered collection of completion
//! instants. Instants are normalized to calendar days in the engine's time
//! zone, so several completions on the same day count once. Nothing is
//! cached; every call recomputes from its input.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = StreakEngine::local();
//! let status = engine.streak_status(&completions, Utc::now());
//! println!("{} days ({})", status.current, status.message);
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, Days, Local, NaiveDate, TimeZone, Utc};

use super::status::{StreakStatus, StreakTier};

/// Computes streak metrics in a single calendar.
///
/// The time zone is the one global notion of "day". A user who travels
/// mid-streak may see a completion move to a neighbouring day; that is
/// accepted behaviour.
#[derive(Debug, Clone)]
pub struct StreakEngine<Tz: TimeZone> {
    tz: Tz,
}

impl StreakEngine<Local> {
    /// Engine using the device's current time zone.
    pub fn local() -> Self {
        Self { tz: Local }
    }
}

impl<Tz: TimeZone> StreakEngine<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Truncate an instant to its calendar day in this engine's zone.
    pub fn normalize(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// The deduplicated, ordered set of completed days.
    pub fn completed_days(&self, dates: &[DateTime<Utc>]) -> BTreeSet<NaiveDate> {
        dates.iter().map(|d| self.normalize(*d)).collect()
    }

    // ── Streaks ──────────────────────────────────────────────────────

    /// Consecutive days ending today or yesterday.
    ///
    /// Returns 0 as soon as neither today nor yesterday is completed.
    pub fn current_streak(&self, dates: &[DateTime<Utc>], today: DateTime<Utc>) -> u32 {
        let days = self.completed_days(dates);
        let Some(&most_recent) = days.last() else {
            return 0;
        };

        let today = self.normalize(today);
        let yesterday = today.pred_opt().unwrap_or(today);
        if most_recent != today && most_recent != yesterday {
            return 0;
        }

        count_back(&days, most_recent)
    }

    pub fn current_streak_now(&self, dates: &[DateTime<Utc>]) -> u32 {
        self.current_streak(dates, Utc::now())
    }

    /// Consecutive days ending exactly at `ending_at`, for historical queries.
    pub fn current_streak_ending_at(
        &self,
        dates: &[DateTime<Utc>],
        ending_at: DateTime<Utc>,
    ) -> u32 {
        let days = self.completed_days(dates);
        count_back(&days, self.normalize(ending_at))
    }

    /// Longest run of consecutive days anywhere in the history.
    pub fn longest_streak(&self, dates: &[DateTime<Utc>]) -> u32 {
        let days = self.completed_days(dates);
        let mut longest = 0u32;
        let mut run = 0u32;
        let mut previous: Option<NaiveDate> = None;

        for day in days {
            run = match previous.and_then(|p| p.succ_opt()) {
                Some(next) if next == day => run + 1,
                _ => 1,
            };
            longest = longest.max(run);
            previous = Some(day);
        }
        longest
    }

    // ── Totals ───────────────────────────────────────────────────────

    pub fn total_completed_days(&self, dates: &[DateTime<Utc>]) -> u32 {
        self.completed_days(dates).len() as u32
    }

    /// Fraction (0.0 ..= 1.0) of the last `last_n_days` days, today
    /// included, that were completed. 0.0 for a non-positive window.
    pub fn completion_rate(
        &self,
        dates: &[DateTime<Utc>],
        last_n_days: i64,
        today: DateTime<Utc>,
    ) -> f64 {
        if last_n_days <= 0 {
            return 0.0;
        }
        let days = self.completed_days(dates);
        let today = self.normalize(today);

        let completed = (0..last_n_days as u64)
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .filter(|day| days.contains(day))
            .count();

        completed as f64 / last_n_days as f64
    }

    pub fn is_completed(&self, dates: &[DateTime<Utc>], on_date: DateTime<Utc>) -> bool {
        let target = self.normalize(on_date);
        dates.iter().any(|d| self.normalize(*d) == target)
    }

    /// Current and longest streak with a message for the current tier.
    pub fn streak_status(&self, dates: &[DateTime<Utc>], today: DateTime<Utc>) -> StreakStatus {
        let current = self.current_streak(dates, today);
        let longest = self.longest_streak(dates);
        StreakStatus {
            current,
            longest,
            message: StreakTier::for_streak(current).message().to_string(),
        }
    }
}

/// Walk backward from `from` while each day is present.
fn count_back(days: &BTreeSet<NaiveDate>, from: NaiveDate) -> u32 {
    let mut streak = 0u32;
    let mut cursor = Some(from);
    while let Some(day) = cursor {
        if !days.contains(&day) {
            break;
        }
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}
