//! `gymbook` command-line entry point.
//!
//! Configuration is read from the environment (a `.env` file is honoured);
//! `--db` overrides `GYMBOOK_DB_PATH`. Every command prints JSON on stdout;
//! log lines go to stderr unless `GYMBOOK_LOG_DIR` is set.
//!
//! ```text
//! gymbook init
//! gymbook seed
//! gymbook activities [--all]
//! gymbook enroll   --user <UUID> --activity <UUID>
//! gymbook unenroll --user <UUID> --activity <UUID>
//! gymbook mine     --user <UUID>
//! ```

mod error;

use clap::{Parser, Subcommand};
use error::CliResult;
use gymbook_core::db::migrations::latest_version;
use gymbook_core::db::seed::seed_dev_data;
use gymbook_core::db::{open_db, open_db_in_memory};
use gymbook_core::{
    core_version, init_logging, ActivityId, ActivityListQuery, ActivityService, EngineConfig,
    EnrollmentEngine, EnrollmentService, SqliteActivityRepository, SqliteEnrollmentRepository,
    UserId,
};
use rusqlite::Connection;
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gymbook", version, about = "Gym activity enrollment engine")]
struct Cli {
    /// SQLite database file; overrides GYMBOOK_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or upgrade the schema; seeds sample data when GYMBOOK_APP_ENV=dev.
    Init,
    /// Insert sample users and activities into empty tables.
    Seed,
    /// List activities with live availability.
    Activities {
        /// Include deactivated activities.
        #[arg(long)]
        all: bool,
    },
    /// Enroll a member in an activity.
    Enroll {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        activity: ActivityId,
    },
    /// Cancel a member's active enrollment.
    Unenroll {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        activity: ActivityId,
    },
    /// List a member's active enrollments.
    Mine {
        #[arg(long)]
        user: UserId,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error[{}]: {}", err.code(), err);
        std::process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = EngineConfig::from_env()?;
    if let Some(path) = cli.db {
        config.db_path = Some(path);
    }
    init_logging(&config.logging)?;
    log::info!(
        "event=cli_start module=cli status=ok version={} app_env={:?}",
        core_version(),
        config.app_env
    );

    let conn = open(&config)?;
    let output = match cli.command {
        Command::Init => {
            let seeded = if config.app_env.seeds_sample_data() {
                Some(seed_dev_data(&conn)?)
            } else {
                None
            };
            json!({
                "schema_version": latest_version(),
                "seeded": seeded.map(|report| json!({
                    "users_created": report.users_created,
                    "activities_created": report.activities_created,
                })),
            })
        }
        Command::Seed => {
            let report = seed_dev_data(&conn)?;
            json!({
                "users_created": report.users_created,
                "activities_created": report.activities_created,
            })
        }
        Command::Activities { all } => {
            let catalog = ActivityService::new(
                SqliteActivityRepository::try_new(&conn)?,
                SqliteEnrollmentRepository::try_new(&conn)?,
            );
            let query = ActivityListQuery {
                include_inactive: all,
            };
            serde_json::to_value(catalog.list_activities(&query)?)?
        }
        Command::Enroll { user, activity } => {
            let enrollment = engine(&conn)?.enroll(user, activity)?;
            serde_json::to_value(enrollment)?
        }
        Command::Unenroll { user, activity } => {
            engine(&conn)?.unenroll(user, activity)?;
            json!({ "user_id": user, "activity_id": activity, "status": "cancelled" })
        }
        Command::Mine { user } => serde_json::to_value(engine(&conn)?.list_mine(user)?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn open(config: &EngineConfig) -> CliResult<Connection> {
    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    Ok(conn)
}

fn engine(conn: &Connection) -> CliResult<EnrollmentService<SqliteEnrollmentRepository<'_>>> {
    Ok(EnrollmentService::new(SqliteEnrollmentRepository::try_new(
        conn,
    )?))
}
