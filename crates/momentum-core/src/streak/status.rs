use serde::{Deserialize, Serialize};

/// Current and longest streak plus a motivational line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStatus {
    pub current: u32,
    pub longest: u32,
    pub message: String,
}

/// Current-streak ranges that share a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTier {
    /// 0 days
    NotStarted,
    /// 1-6 days
    Starting,
    /// 7-29 days
    Week,
    /// 30-89 days
    Month,
    /// 90-364 days
    Quarter,
    /// 365+ days
    Year,
}

impl StreakTier {
    pub fn for_streak(current: u32) -> Self {
        match current {
            0 => StreakTier::NotStarted,
            1..=6 => StreakTier::Starting,
            7..=29 => StreakTier::Week,
            30..=89 => StreakTier::Month,
            90..=364 => StreakTier::Quarter,
            _ => StreakTier::Year,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            StreakTier::NotStarted => "Start your streak today!",
            StreakTier::Starting => "Great start! Keep it going!",
            StreakTier::Week => "You're on fire! A full week and counting!",
            StreakTier::Month => "Incredible consistency! A month strong!",
            StreakTier::Quarter => "Unstoppable! This is a real habit now!",
            StreakTier::Year => "Legendary! A whole year of showing up!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(StreakTier::for_streak(0), StreakTier::NotStarted);
        assert_eq!(StreakTier::for_streak(1), StreakTier::Starting);
        assert_eq!(StreakTier::for_streak(6), StreakTier::Starting);
        assert_eq!(StreakTier::for_streak(7), StreakTier::Week);
        assert_eq!(StreakTier::for_streak(29), StreakTier::Week);
        assert_eq!(StreakTier::for_streak(30), StreakTier::Month);
        assert_eq!(StreakTier::for_streak(89), StreakTier::Month);
        assert_eq!(StreakTier::for_streak(90), StreakTier::Quarter);
        assert_eq!(StreakTier::for_streak(364), StreakTier::Quarter);
        assert_eq!(StreakTier::for_streak(365), StreakTier::Year);
        assert_eq!(StreakTier::for_streak(u32::MAX), StreakTier::Year);
    }

    #[test]
    fn every_tier_has_distinct_message() {
        let tiers = [
            StreakTier::NotStarted,
            StreakTier::Starting,
            StreakTier::Week,
            StreakTier::Month,
            StreakTier::Quarter,
            StreakTier::Year,
        ];
        let mut messages: Vec<_> = tiers.iter().map(|t| t.message()).collect();
        messages.dedup();
        assert_eq!(messages.len(), tiers.len());
    }
}
