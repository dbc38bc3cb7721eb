//! Alarm config service: the sentinel boundary in front of the repository.
//!
//! # Responsibility
//! - Expose the operations consumed by the admin API and the alarm scheduler.
//! - Log every failure once, under a per-operation label, then degrade it to
//!   `false`, `0`, `None` or an empty list.
//!
//! # Invariants
//! - No repository error crosses this boundary.
//! - Callers needing to tell "missing" from "store down" use [`AlarmConfigService::repository`].

use crate::model::alarm_config::{AlarmConfig, AlarmConfigId, AlarmType};
use crate::model::field_set::FieldSet;
use crate::projection::{self, DisplayRecord};
use crate::repo::alarm_config_repo::{
    AlarmConfigRepository, AlarmListQuery, RepoError, RepoResult,
};
use log::{debug, error};

/// Use-case wrapper converting repository outcomes into safe sentinels.
pub struct AlarmConfigService<R: AlarmConfigRepository> {
    repo: R,
}

impl<R: AlarmConfigRepository> AlarmConfigService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Explicit-result access for callers that must distinguish outcomes.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates a rule. Returns `true` iff the store generated an id.
    pub fn create(&self, fields: &FieldSet) -> bool {
        settle("alarm_config_create", self.repo.create(fields), 0) > 0
    }

    /// Gets one live rule; `None` covers both "missing" and "store failure".
    pub fn fetch_by_id(&self, id: AlarmConfigId) -> Option<AlarmConfig> {
        settle("alarm_config_fetch_by_id", self.repo.fetch_by_id(id), None)
    }

    /// One page of live rules for a project.
    ///
    /// `limit` defaults to 10 and `alarm_type` to `error` when `None`.
    pub fn list(
        &self,
        project_id: i64,
        offset: u32,
        limit: Option<u32>,
        alarm_type: Option<AlarmType>,
    ) -> Vec<AlarmConfig> {
        let query = AlarmListQuery {
            project_id,
            alarm_type: alarm_type.unwrap_or_default(),
            offset,
            limit,
        };
        settle("alarm_config_list", self.repo.list(&query), Vec::new())
    }

    /// Applies the update allow-list. Returns rows affected, 0 on failure or no match.
    pub fn update(&self, id: AlarmConfigId, fields: &FieldSet) -> usize {
        settle_write("alarm_config_update", id, self.repo.update(id, fields))
    }

    pub fn soft_delete(&self, id: AlarmConfigId) -> usize {
        settle_write("alarm_config_soft_delete", id, self.repo.soft_delete(id))
    }

    pub fn restore(&self, id: AlarmConfigId) -> usize {
        settle_write("alarm_config_restore", id, self.repo.restore(id))
    }

    /// Live rules for a project; `alarm_type` defaults to `error`.
    pub fn count(&self, project_id: i64, alarm_type: Option<AlarmType>) -> u64 {
        settle(
            "alarm_config_count",
            self.repo.count(project_id, alarm_type.unwrap_or_default()),
            0,
        )
    }

    /// Every live rule; internal use only.
    pub fn fetch_all(&self) -> Vec<AlarmConfig> {
        settle("alarm_config_fetch_all", self.repo.fetch_all(), Vec::new())
    }

    /// Scheduler working set: live and enabled rules.
    pub fn fetch_all_enabled(&self) -> Vec<AlarmConfig> {
        settle(
            "alarm_config_fetch_all_enabled",
            self.repo.fetch_all_enabled(),
            Vec::new(),
        )
    }

    /// Rules by id within a project. Soft-deleted rows are included.
    pub fn fetch_by_ids(&self, project_id: i64, ids: &[AlarmConfigId]) -> Vec<AlarmConfig> {
        settle(
            "alarm_config_fetch_by_ids",
            self.repo.fetch_by_ids(project_id, ids),
            Vec::new(),
        )
    }

    /// Display projection; see [`projection::project`].
    pub fn project(&self, record: &AlarmConfig) -> DisplayRecord {
        projection::project(record)
    }
}

/// Logs `result`'s error under `label` and falls back to `sentinel`.
fn settle<T>(label: &'static str, result: RepoResult<T>, sentinel: T) -> T {
    result.unwrap_or_else(|err| {
        log_failure(label, &err);
        sentinel
    })
}

fn settle_write(label: &'static str, id: AlarmConfigId, result: RepoResult<usize>) -> usize {
    match result {
        Ok(changed) => changed,
        Err(RepoError::NotFound(_)) => {
            debug!("event={label} module=alarm_config status=not_found id={id}");
            0
        }
        Err(err) => {
            log_failure(label, &err);
            0
        }
    }
}

fn log_failure(label: &'static str, err: &RepoError) {
    error!("event={label} module=alarm_config status=error error={err}");
}
