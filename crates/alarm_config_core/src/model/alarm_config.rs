//! Alarm config record and alarm type discriminator.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-generated primary key of an alarm config row.
pub type AlarmConfigId = i64;

/// Wire literal for error-count alarms.
pub const ALARM_TYPE_ERROR: &str = "error";
/// Wire literal for performance alarms.
pub const ALARM_TYPE_PERFORMANCE: &str = "perf";

/// Partitions rules into error monitoring and performance monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmType {
    #[default]
    Error,
    Perf,
}

impl AlarmType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => ALARM_TYPE_ERROR,
            Self::Perf => ALARM_TYPE_PERFORMANCE,
        }
    }
}

impl Display for AlarmType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known alarm type literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown alarm type `{0}`; expected error|perf")]
pub struct UnknownAlarmType(pub String);

impl FromStr for AlarmType {
    type Err = UnknownAlarmType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            ALARM_TYPE_ERROR => Ok(Self::Error),
            ALARM_TYPE_PERFORMANCE => Ok(Self::Perf),
            other => Err(UnknownAlarmType(other.to_string())),
        }
    }
}

/// One alarm rule for one project, as persisted.
///
/// Flags (`is_enable`, `is_delete`, `wave_motion`, `is_summary`) keep their
/// integer storage form so display output matches what consumers already
/// read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmConfig {
    pub id: AlarmConfigId,
    pub project_id: i64,
    pub owner_ucid: String,
    #[serde(rename = "type")]
    pub kind: AlarmType,
    pub error_type: String,
    pub error_name: String,
    pub error_filter_list: String,
    pub url: String,
    /// Evaluation window in seconds.
    pub time_range_s: i64,
    /// Number of errors inside the window that triggers the alarm.
    pub max_error_count: i64,
    /// Minimum seconds between two notifications of the same rule.
    pub alarm_interval_s: i64,
    pub is_enable: i64,
    pub note: String,
    pub is_delete: i64,
    pub create_ucid: String,
    pub update_ucid: String,
    /// Unix epoch seconds.
    pub create_time: i64,
    /// Unix epoch seconds, refreshed on every write.
    pub update_time: i64,
    pub callback: Option<String>,
    pub page_rule: Option<String>,
    pub wave_motion: i64,
    pub is_summary: i64,
    pub webhook: Option<String>,
}

impl AlarmConfig {
    /// Returns whether the row has not been soft-deleted.
    pub fn is_active(&self) -> bool {
        self.is_delete == 0
    }

    /// Returns whether the scheduler should evaluate this rule.
    pub fn is_enabled(&self) -> bool {
        self.is_active() && self.is_enable == 1
    }
}

#[cfg(test)]
mod tests {
    use super::{AlarmType, UnknownAlarmType};

    #[test]
    fn alarm_type_parses_wire_literals() {
        assert_eq!("error".parse::<AlarmType>(), Ok(AlarmType::Error));
        assert_eq!("perf".parse::<AlarmType>(), Ok(AlarmType::Perf));
        assert_eq!(
            "PERF".parse::<AlarmType>(),
            Err(UnknownAlarmType("PERF".to_string()))
        );
    }

    #[test]
    fn alarm_type_defaults_to_error() {
        assert_eq!(AlarmType::default(), AlarmType::Error);
        assert_eq!(AlarmType::Perf.to_string(), "perf");
    }
}
