use serde::{Deserialize, Serialize};

/// Missing-field entry reported when the payload is not a JSON object.
pub const PARSE_FAILURE_FIELD: &str = "unable_to_parse";

/// What the caller should do with a partially complete payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecoveryStrategy {
    /// Complete; use as-is.
    None,
    FillDefaults,
    PartialUse,
    Retry,
    Abort,
}

impl RecoveryStrategy {
    /// Policy table over a 0-100 completeness percentage.
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            RecoveryStrategy::None
        } else if percentage >= 80.0 {
            RecoveryStrategy::FillDefaults
        } else if percentage >= 50.0 {
            RecoveryStrategy::PartialUse
        } else if percentage >= 20.0 {
            RecoveryStrategy::Retry
        } else {
            RecoveryStrategy::Abort
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessReport {
    pub total_fields: usize,
    pub present_fields: usize,
    /// 0.0 ..= 100.0
    pub percentage: f64,
    pub missing_fields: Vec<String>,
    pub strategy: RecoveryStrategy,
}

impl CompletenessReport {
    pub fn from_counts(total: usize, present: usize, missing_fields: Vec<String>) -> Self {
        let percentage = if total == 0 {
            100.0
        } else {
            present as f64 / total as f64 * 100.0
        };
        Self {
            total_fields: total,
            present_fields: present,
            percentage,
            missing_fields,
            strategy: RecoveryStrategy::for_percentage(percentage),
        }
    }

    /// Report for a payload that is not a key-value structure at all.
    pub fn unparsable() -> Self {
        Self {
            total_fields: 0,
            present_fields: 0,
            percentage: 0.0,
            missing_fields: vec![PARSE_FAILURE_FIELD.to_string()],
            strategy: RecoveryStrategy::Abort,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.strategy == RecoveryStrategy::None
    }

    /// Whether the payload can be shown without another model call.
    pub fn is_usable(&self) -> bool {
        matches!(
            self.strategy,
            RecoveryStrategy::None | RecoveryStrategy::FillDefaults | RecoveryStrategy::PartialUse
        )
    }
}
