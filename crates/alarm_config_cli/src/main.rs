//! Operator CLI over the alarm config store.
//!
//! # Responsibility
//! - Provide a quick check that the core crate links and the store opens.
//! - Expose the repository operations for local inspection and repair.
//!
//! Every record printed goes through the display projection.

use alarm_config_core::db::{open_db, open_db_in_memory};
use alarm_config_core::{
    init_logging, AlarmConfig, AlarmConfigId, AlarmConfigService, AlarmType, AppConfig, FieldSet,
    SqliteAlarmConfigRepository,
};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "alarm-config", version, about = "Inspect and edit alarm rule configurations")]
struct Cli {
    /// TOML config file. Defaults plus environment overrides when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the database path from the config file.
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage and version information.
    Ping,
    /// List one page of live rules for a project.
    List {
        project_id: i64,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long = "type", value_parser = parse_alarm_type)]
        alarm_type: Option<AlarmType>,
    },
    /// Count live rules for a project.
    Count {
        project_id: i64,
        #[arg(long = "type", value_parser = parse_alarm_type)]
        alarm_type: Option<AlarmType>,
    },
    /// Show one live rule.
    Show { id: AlarmConfigId },
    /// Show rules by id within a project, deleted ones included.
    Lookup {
        project_id: i64,
        #[arg(required = true)]
        ids: Vec<AlarmConfigId>,
    },
    /// Print every live rule across all projects.
    All,
    /// Print the scheduler working set.
    Enabled,
    /// Create a rule from a JSON object of fields.
    Create { fields: String },
    /// Update a rule from a JSON object of fields.
    Update { id: AlarmConfigId, fields: String },
    /// Soft-delete a rule.
    Delete { id: AlarmConfigId },
    /// Undo a soft delete.
    Restore { id: AlarmConfigId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("alarm-config: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Command::Ping = cli.command {
        println!("alarm_config_core ping={}", alarm_config_core::ping());
        println!("alarm_config_core version={}", alarm_config_core::core_version());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env()?,
    };
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    init_logging(&config.logging)?;

    let conn = if config.database.is_in_memory() {
        open_db_in_memory()?
    } else {
        open_db(&config.database.path)?
    };
    let service = AlarmConfigService::new(SqliteAlarmConfigRepository::try_new(&conn)?);
    info!(
        "event=cli_command module=cli status=start command={:?}",
        cli.command
    );

    match cli.command {
        Command::Ping => {}
        Command::List {
            project_id,
            offset,
            limit,
            alarm_type,
        } => {
            let limit = limit.unwrap_or(config.paging.default_limit);
            print_records(&service, &service.list(project_id, offset, Some(limit), alarm_type))?;
        }
        Command::Count {
            project_id,
            alarm_type,
        } => println!("{}", service.count(project_id, alarm_type)),
        Command::Show { id } => match service.fetch_by_id(id) {
            Some(record) => print_records(&service, &[record])?,
            None => return Err(format!("alarm config {id} not found").into()),
        },
        Command::Lookup { project_id, ids } => {
            print_records(&service, &service.fetch_by_ids(project_id, &ids))?
        }
        Command::All => print_records(&service, &service.fetch_all())?,
        Command::Enabled => print_records(&service, &service.fetch_all_enabled())?,
        Command::Create { fields } => {
            if !service.create(&parse_fields(&fields)?) {
                return Err("create rejected; see log for details".into());
            }
            println!("created");
        }
        Command::Update { id, fields } => {
            println!("{}", service.update(id, &parse_fields(&fields)?));
        }
        Command::Delete { id } => println!("{}", service.soft_delete(id)),
        Command::Restore { id } => println!("{}", service.restore(id)),
    }

    Ok(())
}

fn parse_alarm_type(value: &str) -> Result<AlarmType, String> {
    value.parse().map_err(|err| format!("{err}"))
}

fn parse_fields(raw: &str) -> Result<FieldSet, Box<dyn Error>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    FieldSet::try_from(value)
        .map_err(|other| format!("fields must be a JSON object, got {other}").into())
}

fn print_records(
    service: &AlarmConfigService<SqliteAlarmConfigRepository<'_>>,
    records: &[AlarmConfig],
) -> Result<(), Box<dyn Error>> {
    let display: Vec<_> = records.iter().map(|record| service.project(record)).collect();
    println!("{}", serde_json::to_string_pretty(&display)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_fields, Cli, Command};
    use alarm_config_core::AlarmType;
    use clap::Parser;

    #[test]
    fn list_parses_type_and_paging() {
        let cli = Cli::try_parse_from([
            "alarm-config",
            "list",
            "7",
            "--offset",
            "10",
            "--type",
            "perf",
        ])
        .unwrap();
        match cli.command {
            Command::List {
                project_id,
                offset,
                limit,
                alarm_type,
            } => {
                assert_eq!(project_id, 7);
                assert_eq!(offset, 10);
                assert_eq!(limit, None);
                assert_eq!(alarm_type, Some(AlarmType::Perf));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn all_takes_no_arguments() {
        let cli = Cli::try_parse_from(["alarm-config", "all"]).unwrap();
        assert!(matches!(cli.command, Command::All));
        assert!(Cli::try_parse_from(["alarm-config", "all", "7"]).is_err());
    }

    #[test]
    fn unknown_alarm_type_is_rejected() {
        assert!(Cli::try_parse_from(["alarm-config", "count", "7", "--type", "latency"]).is_err());
    }

    #[test]
    fn fields_must_be_a_json_object() {
        assert!(parse_fields(r#"{"note": "x"}"#).is_ok());
        assert!(parse_fields("[1, 2]").is_err());
        assert!(parse_fields("not json").is_err());
    }
}
