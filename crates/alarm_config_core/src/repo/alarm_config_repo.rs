//! Alarm config repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/count APIs over `t_o_alarm_config`.
//! - Enforce the create and update allow-lists from [`crate::schema`].
//!
//! # Invariants
//! - Rows are never physically removed; deletion flips `is_delete`.
//! - Every read except `fetch_by_ids` skips soft-deleted rows.
//! - `create_time == update_time` on insert; `update_time` moves on every update.
//! - Multi-row reads are ordered by ascending `id`.

use crate::clock::{Clock, SystemClock};
use crate::db::DbError;
use crate::model::alarm_config::{AlarmConfig, AlarmConfigId, AlarmType};
use crate::model::field_set::{FieldSet, InvalidFieldValue};
use crate::schema::{create_columns, select_list, update_columns, COLUMNS, TABLE_NAME};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Params, Row};
use std::collections::{BTreeSet, HashSet};

/// Page size used by `list` when the caller does not pick one.
pub const DEFAULT_LIST_LIMIT: u32 = 10;

/// Ids bound per `fetch_by_ids` statement, well under SQLite's variable limit.
const FETCH_BY_IDS_CHUNK: usize = 900;

pub type RepoResult<T> = Result<T, RepoError>;

/// Explicit outcome of a failed repository call.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("alarm config not found: {0}")]
    NotFound(AlarmConfigId),
    #[error(transparent)]
    InvalidField(#[from] InvalidFieldValue),
    #[error("invalid persisted alarm config data: {0}")]
    InvalidData(String),
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
    #[error("required column `{table}.{column}` is missing")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Paging and partition options for `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmListQuery {
    pub project_id: i64,
    pub alarm_type: AlarmType,
    pub offset: u32,
    /// Maximum rows to return. Defaults to [`DEFAULT_LIST_LIMIT`].
    pub limit: Option<u32>,
}

impl AlarmListQuery {
    /// First page of error alarms for `project_id`.
    pub fn new(project_id: i64) -> Self {
        Self {
            project_id,
            alarm_type: AlarmType::default(),
            offset: 0,
            limit: None,
        }
    }

    pub fn alarm_type(mut self, alarm_type: AlarmType) -> Self {
        self.alarm_type = alarm_type;
        self
    }

    pub fn page(mut self, offset: u32, limit: u32) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }
}

/// Data access contract for alarm configs.
pub trait AlarmConfigRepository {
    /// Inserts a row built from the create allow-list and returns its id.
    fn create(&self, fields: &FieldSet) -> RepoResult<AlarmConfigId>;
    /// Gets one live row.
    fn fetch_by_id(&self, id: AlarmConfigId) -> RepoResult<Option<AlarmConfig>>;
    /// Lists one page of live rows for a project and alarm type.
    fn list(&self, query: &AlarmListQuery) -> RepoResult<Vec<AlarmConfig>>;
    /// Applies the update allow-list to one row and returns rows affected.
    fn update(&self, id: AlarmConfigId, fields: &FieldSet) -> RepoResult<usize>;
    /// Counts live rows for a project and alarm type.
    fn count(&self, project_id: i64, alarm_type: AlarmType) -> RepoResult<u64>;
    /// All live rows across projects.
    fn fetch_all(&self) -> RepoResult<Vec<AlarmConfig>>;
    /// All live, enabled rows; the scheduler's working set.
    fn fetch_all_enabled(&self) -> RepoResult<Vec<AlarmConfig>>;
    /// Rows in `ids` scoped to `project_id`, soft-deleted rows included.
    fn fetch_by_ids(&self, project_id: i64, ids: &[AlarmConfigId])
        -> RepoResult<Vec<AlarmConfig>>;

    /// Marks a row as deleted through the regular update path.
    fn soft_delete(&self, id: AlarmConfigId) -> RepoResult<usize> {
        self.update(id, &FieldSet::new().with("is_delete", 1))
    }

    /// Clears the deleted marker through the regular update path.
    fn restore(&self, id: AlarmConfigId) -> RepoResult<usize> {
        self.update(id, &FieldSet::new().with("is_delete", 0))
    }
}

/// SQLite-backed alarm config repository.
pub struct SqliteAlarmConfigRepository<'conn, C = SystemClock> {
    conn: &'conn Connection,
    clock: C,
    select_sql: String,
}

impl<'conn> SqliteAlarmConfigRepository<'conn> {
    /// Constructs a repository from a migrated connection, using wall-clock time.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::try_with_clock(conn, SystemClock)
    }
}

impl<'conn, C: Clock> SqliteAlarmConfigRepository<'conn, C> {
    /// Constructs a repository that stamps timestamps from `clock`.
    pub fn try_with_clock(conn: &'conn Connection, clock: C) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            clock,
            select_sql: format!("SELECT {} FROM {TABLE_NAME}", select_list()),
        })
    }

    fn query_rows<P: Params>(&self, clause: &str, params: P) -> RepoResult<Vec<AlarmConfig>> {
        let mut stmt = self.conn.prepare(&format!("{} {clause}", self.select_sql))?;
        let mut rows = stmt.query(params)?;
        let mut configs = Vec::new();

        while let Some(row) = rows.next()? {
            configs.push(parse_alarm_config_row(row)?);
        }

        Ok(configs)
    }
}

impl<C: Clock> AlarmConfigRepository for SqliteAlarmConfigRepository<'_, C> {
    fn create(&self, fields: &FieldSet) -> RepoResult<AlarmConfigId> {
        let now = self.clock.now_epoch_seconds();
        let mut columns = fields.project_onto(create_columns())?;
        columns.extend([
            ("create_time", SqlValue::Integer(now)),
            ("update_time", SqlValue::Integer(now)),
            ("is_delete", SqlValue::Integer(0)),
        ]);

        let names = columns
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");

        self.conn.execute(
            &format!("INSERT INTO {TABLE_NAME} ({names}) VALUES ({placeholders});"),
            params_from_iter(columns.into_iter().map(|(_, value)| value)),
        )?;

        let id = self.conn.last_insert_rowid();
        if id <= 0 {
            return Err(RepoError::InvalidData(format!(
                "store returned non-positive generated id `{id}`"
            )));
        }

        Ok(id)
    }

    fn fetch_by_id(&self, id: AlarmConfigId) -> RepoResult<Option<AlarmConfig>> {
        let mut rows = self.query_rows("WHERE id = ?1 AND is_delete = 0;", params![id])?;
        Ok(rows.pop())
    }

    fn list(&self, query: &AlarmListQuery) -> RepoResult<Vec<AlarmConfig>> {
        self.query_rows(
            "WHERE project_id = ?1
               AND type = ?2
               AND is_delete = 0
             ORDER BY id ASC
             LIMIT ?3 OFFSET ?4;",
            params![
                query.project_id,
                query.alarm_type.as_str(),
                i64::from(query.effective_limit()),
                i64::from(query.offset),
            ],
        )
    }

    fn update(&self, id: AlarmConfigId, fields: &FieldSet) -> RepoResult<usize> {
        let mut columns = fields.project_onto(update_columns())?;
        columns.push((
            "update_time",
            SqlValue::Integer(self.clock.now_epoch_seconds()),
        ));

        let assignments = columns
            .iter()
            .enumerate()
            .map(|(index, (name, _))| format!("{name} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let id_placeholder = columns.len() + 1;

        let mut values: Vec<SqlValue> = columns.into_iter().map(|(_, value)| value).collect();
        values.push(SqlValue::Integer(id));

        let changed = self.conn.execute(
            &format!("UPDATE {TABLE_NAME} SET {assignments} WHERE id = ?{id_placeholder};"),
            params_from_iter(values),
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(changed)
    }

    fn count(&self, project_id: i64, alarm_type: AlarmType) -> RepoResult<u64> {
        let total: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(id)
                 FROM {TABLE_NAME}
                 WHERE project_id = ?1
                   AND type = ?2
                   AND is_delete = 0;"
            ),
            params![project_id, alarm_type.as_str()],
            |row| row.get(0),
        )?;

        u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{total}`")))
    }

    fn fetch_all(&self) -> RepoResult<Vec<AlarmConfig>> {
        self.query_rows("WHERE is_delete = 0 ORDER BY id ASC;", [])
    }

    fn fetch_all_enabled(&self) -> RepoResult<Vec<AlarmConfig>> {
        self.query_rows(
            "WHERE is_delete = 0 AND is_enable = 1 ORDER BY id ASC;",
            [],
        )
    }

    fn fetch_by_ids(
        &self,
        project_id: i64,
        ids: &[AlarmConfigId],
    ) -> RepoResult<Vec<AlarmConfig>> {
        // Sorted, de-duplicated ids keep chunk results in ascending id order.
        let ids: Vec<AlarmConfigId> = ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut configs = Vec::new();

        for chunk in ids.chunks(FETCH_BY_IDS_CHUNK) {
            // ?1 is the project id; ids bind from ?2 onwards.
            let placeholders = (2..=chunk.len() + 1)
                .map(|index| format!("?{index}"))
                .collect::<Vec<_>>()
                .join(", ");
            let values = std::iter::once(project_id).chain(chunk.iter().copied());

            configs.extend(self.query_rows(
                &format!("WHERE project_id = ?1 AND id IN ({placeholders}) ORDER BY id ASC;"),
                params_from_iter(values),
            )?);
        }

        Ok(configs)
    }
}

fn parse_alarm_config_row(row: &Row<'_>) -> RepoResult<AlarmConfig> {
    let type_text: String = row.get("type")?;
    let kind = type_text.parse::<AlarmType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid alarm type `{type_text}` in {TABLE_NAME}.type"
        ))
    })?;

    let is_delete: i64 = row.get("is_delete")?;
    if !matches!(is_delete, 0 | 1) {
        return Err(RepoError::InvalidData(format!(
            "invalid is_delete value `{is_delete}` in {TABLE_NAME}.is_delete"
        )));
    }

    Ok(AlarmConfig {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        owner_ucid: row.get("owner_ucid")?,
        kind,
        error_type: row.get("error_type")?,
        error_name: row.get("error_name")?,
        error_filter_list: row.get("error_filter_list")?,
        url: row.get("url")?,
        time_range_s: row.get("time_range_s")?,
        max_error_count: row.get("max_error_count")?,
        alarm_interval_s: row.get("alarm_interval_s")?,
        is_enable: row.get("is_enable")?,
        note: row.get("note")?,
        is_delete,
        create_ucid: row.get("create_ucid")?,
        update_ucid: row.get("update_ucid")?,
        create_time: row.get("create_time")?,
        update_time: row.get("update_time")?,
        callback: row.get("callback")?,
        page_rule: row.get("page_rule")?,
        wave_motion: row.get("wave_motion")?,
        is_summary: row.get("is_summary")?,
        webhook: row.get("webhook")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, TABLE_NAME)? {
        return Err(RepoError::MissingRequiredTable(TABLE_NAME));
    }

    let present = table_columns(conn, TABLE_NAME)?;
    if let Some(missing) = COLUMNS.iter().find(|spec| !present.contains(spec.name)) {
        return Err(RepoError::MissingRequiredColumn {
            table: TABLE_NAME,
            column: missing.name,
        });
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(names)
}
