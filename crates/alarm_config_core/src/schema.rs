//! Column descriptor for the `t_o_alarm_config` table.
//!
//! # Responsibility
//! - Describe every persisted column once, with its value kind and the
//!   operations allowed to touch it.
//! - Derive the create, update and display allow-lists from that single table.
//!
//! # Invariants
//! - `id` is never writable; it is generated by the store.
//! - `type` is writable on create only.
//! - `is_delete` is writable on update and never displayed.
//! - `create_time` and `update_time` are stamped by the repository, not callers.
//! - Flag columns only ever hold 0 or 1.

/// Physical table holding alarm rule configurations.
pub const TABLE_NAME: &str = "t_o_alarm_config";

/// Storage kind used to coerce caller-supplied values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    /// Boolean stored as integer 0 or 1.
    Flag,
    /// Text restricted to the known alarm type literals.
    AlarmType,
}

/// Access flags for one persisted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub on_create: bool,
    pub on_update: bool,
    pub on_display: bool,
}

const fn column(
    name: &'static str,
    kind: ColumnKind,
    on_create: bool,
    on_update: bool,
    on_display: bool,
) -> ColumnSpec {
    ColumnSpec {
        name,
        kind,
        on_create,
        on_update,
        on_display,
    }
}

use ColumnKind::{AlarmType, Flag, Integer, Text};

/// Every column of `t_o_alarm_config`, in schema order.
pub const COLUMNS: &[ColumnSpec] = &[
    //     name                 kind       create update display
    column("id", Integer, false, false, true),
    column("project_id", Integer, true, true, true),
    column("owner_ucid", Text, true, true, true),
    column("type", AlarmType, true, false, true),
    column("error_type", Text, true, true, true),
    column("error_name", Text, true, true, true),
    column("error_filter_list", Text, true, true, true),
    column("url", Text, true, true, true),
    column("time_range_s", Integer, true, true, true),
    column("max_error_count", Integer, true, true, true),
    column("alarm_interval_s", Integer, true, true, true),
    column("is_enable", Flag, true, true, true),
    column("note", Text, true, true, true),
    column("is_delete", Flag, false, true, false),
    column("create_ucid", Text, true, false, true),
    column("update_ucid", Text, true, true, true),
    column("create_time", Integer, false, false, true),
    column("update_time", Integer, false, false, true),
    column("callback", Text, true, true, true),
    column("page_rule", Text, true, true, true),
    column("wave_motion", Integer, true, true, true),
    column("is_summary", Integer, true, true, true),
    column("webhook", Text, true, true, true),
];

/// Looks up a column descriptor by name.
pub fn find_column(name: &str) -> Option<&'static ColumnSpec> {
    COLUMNS.iter().find(|spec| spec.name == name)
}

pub fn create_columns() -> impl Iterator<Item = &'static ColumnSpec> {
    COLUMNS.iter().filter(|spec| spec.on_create)
}

pub fn update_columns() -> impl Iterator<Item = &'static ColumnSpec> {
    COLUMNS.iter().filter(|spec| spec.on_update)
}

pub fn display_columns() -> impl Iterator<Item = &'static ColumnSpec> {
    COLUMNS.iter().filter(|spec| spec.on_display)
}

/// Comma separated column list used by every SELECT.
pub fn select_list() -> String {
    COLUMNS
        .iter()
        .map(|spec| spec.name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{
        create_columns, display_columns, find_column, select_list, update_columns, ColumnKind,
        COLUMNS,
    };
    use std::collections::HashSet;

    fn names(iter: impl Iterator<Item = &'static super::ColumnSpec>) -> HashSet<&'static str> {
        iter.map(|spec| spec.name).collect()
    }

    #[test]
    fn schema_has_expected_column_set() {
        assert_eq!(COLUMNS.len(), 23);
        let unique: HashSet<_> = COLUMNS.iter().map(|spec| spec.name).collect();
        assert_eq!(unique.len(), COLUMNS.len());
    }

    #[test]
    fn create_allow_list_matches_contract() {
        let expected: HashSet<&str> = [
            "project_id",
            "owner_ucid",
            "type",
            "error_type",
            "error_name",
            "error_filter_list",
            "url",
            "time_range_s",
            "max_error_count",
            "alarm_interval_s",
            "is_enable",
            "note",
            "create_ucid",
            "update_ucid",
            "callback",
            "page_rule",
            "wave_motion",
            "is_summary",
            "webhook",
        ]
        .into_iter()
        .collect();
        assert_eq!(names(create_columns()), expected);
    }

    #[test]
    fn update_allow_list_matches_contract() {
        let expected: HashSet<&str> = [
            "project_id",
            "owner_ucid",
            "error_type",
            "error_name",
            "error_filter_list",
            "time_range_s",
            "max_error_count",
            "alarm_interval_s",
            "is_enable",
            "note",
            "url",
            "update_ucid",
            "is_delete",
            "callback",
            "wave_motion",
            "page_rule",
            "is_summary",
            "webhook",
        ]
        .into_iter()
        .collect();
        assert_eq!(names(update_columns()), expected);
    }

    #[test]
    fn display_is_everything_but_is_delete() {
        let display = names(display_columns());
        assert_eq!(display.len(), COLUMNS.len() - 1);
        assert!(!display.contains("is_delete"));
    }

    #[test]
    fn select_list_and_lookup_cover_all_columns() {
        assert!(select_list().starts_with("id, project_id, owner_ucid, type"));
        assert!(find_column("webhook").is_some());
        assert!(find_column("password").is_none());
        assert_eq!(find_column("is_delete").unwrap().kind, ColumnKind::Flag);
        assert_eq!(find_column("is_enable").unwrap().kind, ColumnKind::Flag);
    }
}
