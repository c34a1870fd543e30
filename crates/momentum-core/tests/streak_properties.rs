//! Property tests for the streak engine.

use chrono::{DateTime, Duration, TimeZone, Utc};
use momentum_core::StreakEngine;
use proptest::prelude::*;

fn today() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 20, 15, 0, 0).unwrap()
}

/// Completion instants within the 60 days before `today()`, at any time of day.
fn completions() -> impl Strategy<Value = Vec<DateTime<Utc>>> {
    prop::collection::vec((0i64..60, 0i64..86_400), 0..40).prop_map(|pairs| {
        let midnight = Utc.with_ymd_and_hms(2024, 7, 20, 0, 0, 0).unwrap();
        pairs
            .into_iter()
            .map(|(days, secs)| midnight - Duration::days(days) + Duration::seconds(secs))
            .filter(|t| *t <= today())
            .collect()
    })
}

proptest! {
    #[test]
    fn no_today_or_yesterday_means_zero(dates in completions()) {
        let engine = StreakEngine::new(Utc);
        let t = today();
        let recent: Vec<_> = dates
            .iter()
            .copied()
            .filter(|d| engine.normalize(*d) < engine.normalize(t - Duration::days(1)))
            .collect();
        prop_assert_eq!(engine.current_streak(&recent, t), 0);
    }

    #[test]
    fn longest_is_at_least_current(dates in completions()) {
        let engine = StreakEngine::new(Utc);
        prop_assert!(engine.longest_streak(&dates) >= engine.current_streak(&dates, today()));
    }

    #[test]
    fn duplicates_do_not_change_metrics(dates in completions(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!dates.is_empty());
        let engine = StreakEngine::new(Utc);
        let mut doubled = dates.clone();
        doubled.push(dates[pick.index(dates.len())]);

        let t = today();
        prop_assert_eq!(engine.current_streak(&dates, t), engine.current_streak(&doubled, t));
        prop_assert_eq!(engine.longest_streak(&dates), engine.longest_streak(&doubled));
        prop_assert_eq!(engine.total_completed_days(&dates), engine.total_completed_days(&doubled));
    }

    #[test]
    fn completion_rate_is_a_fraction(dates in completions(), n in -10i64..120) {
        let engine = StreakEngine::new(Utc);
        let rate = engine.completion_rate(&dates, n, today());
        if n <= 0 {
            prop_assert_eq!(rate, 0.0);
        } else {
            prop_assert!((0.0..=1.0).contains(&rate));
        }
    }

    #[test]
    fn ending_at_today_matches_current_when_today_done(dates in completions()) {
        let engine = StreakEngine::new(Utc);
        let t = today();
        let mut with_today = dates.clone();
        with_today.push(t);
        prop_assert_eq!(
            engine.current_streak(&with_today, t),
            engine.current_streak_ending_at(&with_today, t)
        );
    }
}
