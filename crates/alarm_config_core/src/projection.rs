//! Display projection applied before records leave the core boundary.
//!
//! # Invariants
//! - Output carries exactly the display columns; `is_delete` never leaks.
//! - `page_rule` falls back to the literal `url` when the stored value is
//!   falsy. The stored row is left untouched.

use crate::model::alarm_config::AlarmConfig;
use crate::schema::display_columns;
use serde_json::{Map, Value};

/// Sanitized, display-only view of an alarm config.
pub type DisplayRecord = Map<String, Value>;

/// Default page rule applied at display time.
pub const DEFAULT_PAGE_RULE: &str = "url";

/// Copies the display columns of `record` and normalizes `page_rule`.
pub fn project(record: &AlarmConfig) -> DisplayRecord {
    let source = match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    display_columns()
        .filter_map(|spec| {
            let value = source.get(spec.name)?;
            if spec.name == "page_rule" && is_falsy(value) {
                return Some((spec.name.to_string(), Value::from(DEFAULT_PAGE_RULE)));
            }
            Some((spec.name.to_string(), value.clone()))
        })
        .collect()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{project, DEFAULT_PAGE_RULE};
    use crate::model::alarm_config::{AlarmConfig, AlarmType};
    use crate::schema::COLUMNS;
    use serde_json::Value;

    fn sample() -> AlarmConfig {
        AlarmConfig {
            id: 3,
            project_id: 7,
            owner_ucid: "u1".to_string(),
            kind: AlarmType::Perf,
            error_type: String::new(),
            error_name: String::new(),
            error_filter_list: String::new(),
            url: "/checkout".to_string(),
            time_range_s: 60,
            max_error_count: 5,
            alarm_interval_s: 300,
            is_enable: 1,
            note: String::new(),
            is_delete: 1,
            create_ucid: "u1".to_string(),
            update_ucid: "u1".to_string(),
            create_time: 1_700_000_000,
            update_time: 1_700_000_000,
            callback: None,
            page_rule: None,
            wave_motion: 0,
            is_summary: 0,
            webhook: None,
        }
    }

    #[test]
    fn projection_drops_is_delete_and_keeps_everything_else() {
        let display = project(&sample());

        assert!(!display.contains_key("is_delete"));
        assert_eq!(display.len(), COLUMNS.len() - 1);
        assert_eq!(display["type"], Value::from("perf"));
        assert_eq!(display["max_error_count"], Value::from(5));
    }

    #[test]
    fn falsy_page_rule_becomes_url() {
        for stored in [None, Some(String::new()), Some("0".to_string())] {
            let mut record = sample();
            record.page_rule = stored;
            assert_eq!(project(&record)["page_rule"], Value::from(DEFAULT_PAGE_RULE));
        }
    }

    #[test]
    fn explicit_page_rule_is_kept() {
        let mut record = sample();
        record.page_rule = Some("regex".to_string());
        assert_eq!(project(&record)["page_rule"], Value::from("regex"));
    }
}
