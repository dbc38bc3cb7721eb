//! Persistence gateway for per-project alarm rule configurations.
//!
//! The crate owns the `t_o_alarm_config` schema, the create/update/display
//! allow-lists and every query the admin API and the alarm scheduler run
//! against it.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod schema;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::alarm_config::{
    AlarmConfig, AlarmConfigId, AlarmType, ALARM_TYPE_ERROR, ALARM_TYPE_PERFORMANCE,
};
pub use model::field_set::{FieldSet, InvalidFieldValue};
pub use projection::{project, DisplayRecord};
pub use repo::alarm_config_repo::{
    AlarmConfigRepository, AlarmListQuery, RepoError, RepoResult, SqliteAlarmConfigRepository,
    DEFAULT_LIST_LIMIT,
};
pub use service::alarm_config_service::AlarmConfigService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
