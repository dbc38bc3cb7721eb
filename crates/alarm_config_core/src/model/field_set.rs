//! Loosely typed write input for alarm config create/update.
//!
//! Callers (admin API handlers, CLI) hand over whatever JSON object they
//! received. Only the keys an operation allows survive projection; anything
//! else is dropped without error.

use crate::model::alarm_config::AlarmType;
use crate::schema::{ColumnKind, ColumnSpec};
use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caller-supplied column values keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSet(Map<String, Value>);

/// A kept field whose value cannot be stored in its column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for `{column}`: {reason}")]
pub struct InvalidFieldValue {
    pub column: &'static str,
    pub reason: String,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps the fields named by `columns` and converts them to SQL values.
    ///
    /// Output follows `columns` order, so generated SQL is deterministic.
    pub(crate) fn project_onto<'a>(
        &self,
        columns: impl Iterator<Item = &'a ColumnSpec>,
    ) -> Result<Vec<(&'static str, SqlValue)>, InvalidFieldValue> {
        columns
            .filter_map(|spec| self.0.get(spec.name).map(|value| (spec, value)))
            .map(|(spec, value)| coerce(spec, value).map(|sql| (spec.name, sql)))
            .collect()
    }
}

impl From<Map<String, Value>> for FieldSet {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl TryFrom<Value> for FieldSet {
    type Error = Value;

    /// Accepts JSON objects only; any other value is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

fn coerce(spec: &ColumnSpec, value: &Value) -> Result<SqlValue, InvalidFieldValue> {
    let invalid = |reason: String| InvalidFieldValue {
        column: spec.name,
        reason,
    };

    match (spec.kind, value) {
        (ColumnKind::Integer | ColumnKind::Text, Value::Null) => Ok(SqlValue::Null),
        (ColumnKind::Integer, Value::Bool(flag)) => Ok(SqlValue::Integer(i64::from(*flag))),
        (ColumnKind::Integer, Value::Number(number)) => integer_from_number(number)
            .map(SqlValue::Integer)
            .ok_or_else(|| invalid(format!("expected an integer, got {number}"))),
        (ColumnKind::Integer, Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map(SqlValue::Integer)
            .map_err(|_| invalid(format!("expected an integer, got `{text}`"))),
        (ColumnKind::Integer, other) => Err(invalid(format!("expected an integer, got {other}"))),
        (ColumnKind::Flag, Value::Bool(flag)) => Ok(SqlValue::Integer(i64::from(*flag))),
        (ColumnKind::Flag, Value::Number(number)) => integer_from_number(number)
            .filter(|flag| matches!(*flag, 0 | 1))
            .map(SqlValue::Integer)
            .ok_or_else(|| invalid(format!("expected 0 or 1, got {number}"))),
        (ColumnKind::Flag, Value::String(text)) => match text.trim() {
            "0" => Ok(SqlValue::Integer(0)),
            "1" => Ok(SqlValue::Integer(1)),
            _ => Err(invalid(format!("expected 0 or 1, got `{text}`"))),
        },
        (ColumnKind::Flag, other) => Err(invalid(format!("expected 0 or 1, got {other}"))),
        (ColumnKind::Text, Value::String(text)) => Ok(SqlValue::Text(text.clone())),
        (ColumnKind::Text, other) => Ok(SqlValue::Text(other.to_string())),
        (ColumnKind::AlarmType, Value::String(text)) => text
            .parse::<AlarmType>()
            .map(|kind| SqlValue::Text(kind.as_str().to_string()))
            .map_err(|err| invalid(err.to_string())),
        (ColumnKind::AlarmType, other) => {
            Err(invalid(format!("expected error|perf, got {other}")))
        }
    }
}

/// Exact integer value of `number`, if it has one that fits in `i64`.
fn integer_from_number(number: &serde_json::Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f))
            .map(|f| f as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::FieldSet;
    use crate::schema::{create_columns, update_columns};
    use rusqlite::types::Value as SqlValue;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> FieldSet {
        FieldSet::try_from(value).unwrap()
    }

    #[test]
    fn unknown_and_disallowed_keys_are_dropped() {
        let input = fields(json!({
            "id": 99,
            "project_id": 7,
            "is_delete": 1,
            "create_time": 1,
            "password": "hunter2"
        }));

        let projected = input.project_onto(create_columns()).unwrap();
        assert_eq!(projected, vec![("project_id", SqlValue::Integer(7))]);
    }

    #[test]
    fn update_projection_keeps_is_delete_but_not_type() {
        let input = fields(json!({"type": "perf", "is_delete": true, "note": "x"}));

        let projected = input.project_onto(update_columns()).unwrap();
        assert_eq!(
            projected,
            vec![
                ("note", SqlValue::Text("x".to_string())),
                ("is_delete", SqlValue::Integer(1)),
            ]
        );
    }

    #[test]
    fn values_are_coerced_per_column_kind() {
        let input = fields(json!({
            "max_error_count": "12",
            "time_range_s": 60.0,
            "error_filter_list": ["timeout", "abort"],
            "owner_ucid": 42,
            "page_rule": null
        }));

        let projected = input.project_onto(create_columns()).unwrap();
        assert!(projected.contains(&("max_error_count", SqlValue::Integer(12))));
        assert!(projected.contains(&("time_range_s", SqlValue::Integer(60))));
        assert!(projected.contains(&(
            "error_filter_list",
            SqlValue::Text(r#"["timeout","abort"]"#.to_string())
        )));
        assert!(projected.contains(&("owner_ucid", SqlValue::Text("42".to_string()))));
        assert!(projected.contains(&("page_rule", SqlValue::Null)));
    }

    #[test]
    fn uncoercible_values_are_rejected() {
        let err = fields(json!({"max_error_count": "many"}))
            .project_onto(create_columns())
            .unwrap_err();
        assert_eq!(err.column, "max_error_count");

        let err = fields(json!({"type": "warning"}))
            .project_onto(create_columns())
            .unwrap_err();
        assert_eq!(err.column, "type");
    }

    #[test]
    fn flag_columns_accept_only_zero_and_one() {
        let projected = fields(json!({"is_enable": true, "is_delete": "0"}))
            .project_onto(update_columns())
            .unwrap();
        assert_eq!(
            projected,
            vec![
                ("is_enable", SqlValue::Integer(1)),
                ("is_delete", SqlValue::Integer(0)),
            ]
        );

        for bad in [json!(2), json!(-1), json!("yes"), json!(null), json!(0.5)] {
            let err = fields(json!({"is_delete": bad}))
                .project_onto(update_columns())
                .unwrap_err();
            assert_eq!(err.column, "is_delete");
        }
    }

    #[test]
    fn floats_outside_i64_range_are_rejected() {
        let err = fields(json!({"max_error_count": 1e30}))
            .project_onto(create_columns())
            .unwrap_err();
        assert_eq!(err.column, "max_error_count");

        let err = fields(json!({"time_range_s": -1e19}))
            .project_onto(create_columns())
            .unwrap_err();
        assert_eq!(err.column, "time_range_s");
    }

    #[test]
    fn non_object_json_is_not_a_field_set() {
        assert!(FieldSet::try_from(json!([1, 2])).is_err());
        assert!(FieldSet::new().with("note", "x").get("note").is_some());
    }
}
