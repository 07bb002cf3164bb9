//! `stratplan` command-line entry point.
//!
//! # Responsibility
//! - Layer CLI flags and environment over the TOML config.
//! - Run one analytics use-case and print its result as JSON.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use stratplan_core::config::is_valid_locale;
use stratplan_core::{
    init_logging, open_db, AnalyticsConfig, AnalyticsService, ProjectId, SqliteHierarchyRepository,
    SqlitePaymentRepository, StrategyId,
};

#[derive(Parser)]
#[command(name = "stratplan")]
#[command(about = "Strategy health and project spending analytics", version)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, env = "STRATPLAN_CONFIG")]
    config: Option<PathBuf>,

    /// Planning database (overrides config file)
    #[arg(long, env = "STRATPLAN_DB")]
    db: Option<PathBuf>,

    /// Requested display locale
    #[arg(long, env = "STRATPLAN_LOCALE")]
    locale: Option<String>,

    /// Reference date for schedule variance, YYYY-MM-DD
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Log directory (overrides config file)
    #[arg(long, env = "STRATPLAN_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Strategy KPIs and health label
    Health {
        /// Single strategy id; all strategies when omitted
        #[arg(long)]
        strategy: Option<i64>,
    },
    /// Project budget against recorded payments
    Spending {
        /// Project id, repeatable
        #[arg(long = "project", required = true)]
        projects: Vec<i64>,

        /// Print the per-date cumulative series instead of the payment list
        #[arg(long)]
        series: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalyticsConfig::load(path)
            .with_context(|| format!("loading config `{}`", path.display()))?,
        None => AnalyticsConfig::default(),
    };
    if let Some(db) = cli.db.clone() {
        config.database_path = db;
    }
    if let Some(log_dir) = cli.log_dir.clone() {
        config.log_dir = Some(log_dir);
    }
    config.validate().context("validating settings")?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)
            .map_err(|err| anyhow::anyhow!("starting file logging: {err}"))?;
    }

    let locale = cli
        .locale
        .clone()
        .unwrap_or_else(|| config.default_locale.clone());
    if !is_valid_locale(&locale) {
        bail!("invalid locale tag `{locale}`");
    }

    let conn = open_db(&config.database_path)
        .with_context(|| format!("opening `{}`", config.database_path.display()))?;
    let hierarchy = SqliteHierarchyRepository::try_new(&conn)?;
    let payments = SqlitePaymentRepository::try_new(&conn)?;
    let mut service = AnalyticsService::new(hierarchy, payments, config.default_locale.clone());
    if let Some(today) = cli.today {
        service = service.with_today(today);
    }

    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );

    let output = match cli.command {
        Command::Health {
            strategy: Some(id),
        } => serde_json::to_string_pretty(&service.strategic_health(StrategyId(id), &locale)?)?,
        Command::Health { strategy: None } => {
            serde_json::to_string_pretty(&service.all_strategic_health(&locale)?)?
        }
        Command::Spending { projects, series } => {
            let ids: Vec<ProjectId> = projects.into_iter().map(ProjectId).collect();
            let details = service.projects_spending(&ids, &locale)?;
            if series {
                let series: Vec<_> = details
                    .iter()
                    .map(|item| {
                        serde_json::json!({
                            "projectId": item.project_id,
                            "series": item.spending_series(),
                        })
                    })
                    .collect();
                serde_json::to_string_pretty(&series)?
            } else if let [single] = details.as_slice() {
                serde_json::to_string_pretty(single)?
            } else {
                serde_json::to_string_pretty(&details)?
            }
        }
    };

    println!("{output}");
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Health { .. } => "health",
        Command::Spending { .. } => "spending",
    }
}
