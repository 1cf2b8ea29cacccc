//! Support tool for the trail progress engine.
//!
//! Connects to the configured store (or an empty in-memory store when no
//! URL is set, which makes every command a dry run), performs one command
//! through the progress façade, and prints the result as pretty JSON on
//! stdout. Logs go to stderr.
//!
//! ```text
//! trail-support stats
//! trail-support visit 3 --title "Крепость"
//! trail-support import 1=Городище 2 5
//! trail-support grant 100 --note "lost progress, ticket 4821"
//! trail-support reset xp
//! ```

mod cli;

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trail_progress::{ProgressConfig, ProgressStore};
use trail_store::{Blobs, StoreBackend};
use trail_types::{AchievementDetails, AchievementId, PointId};

use crate::cli::{Cli, Command, ResetTarget};

/// Config file picked up from the working directory when `--config` is not
/// given.
const DEFAULT_CONFIG_FILE: &str = "trail-config.yaml";

/// One unlocked achievement with its display details.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UnlockedAchievement {
    id: AchievementId,
    #[serde(flatten)]
    details: Option<AchievementDetails>,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the store connection, or the command
/// fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging.level, cli.json_logs || config.logging.json);

    let backend = StoreBackend::connect(config.store.url.as_deref())
        .await
        .context("failed to connect to the progress store")?;
    info!(
        backend = backend.name(),
        io_timeout_ms = config.store.io_timeout_ms,
        total_points = cli.total,
        "progress store ready"
    );
    let blobs = Blobs::new(backend, config.store.io_timeout());
    let progress = ProgressStore::from_config(blobs, &config, cli.total)?;

    run(&progress, cli.command, cli.total).await
}

async fn run(progress: &ProgressStore, command: Command, total: u32) -> anyhow::Result<()> {
    match command {
        Command::Stats => print_json(&progress.get_user_stats().await),
        Command::Progress => print_json(&progress.get_progress(total).await),
        Command::Visit { point, title } => {
            let outcome = progress
                .visit_point(parse_point(&point), &title)
                .await
                .with_context(|| format!("failed to record visit to point {point}"))?;
            print_json(&outcome)
        }
        Command::Import { points } => {
            let points: Vec<(PointId, String)> = points
                .into_iter()
                .map(|entry| (parse_point(&entry.point), entry.title))
                .collect();
            let outcome = progress
                .import_visits(&points)
                .await
                .context("failed to import visits")?;
            print_json(&outcome)
        }
        Command::Achievements => {
            let catalog = progress.get_achievement_details();
            let unlocked: Vec<UnlockedAchievement> = progress
                .get_achievements()
                .await
                .into_iter()
                .map(|id| UnlockedAchievement {
                    details: catalog.get(&id).cloned(),
                    id,
                })
                .collect();
            print_json(&unlocked)
        }
        Command::Log { limit } => print_json(&progress.get_xp_log(limit).await),
        Command::Rewards => print_json(&progress.reward_preview()),
        Command::Grant { amount, note } => {
            let event = progress
                .grant_manual(amount, &note)
                .await
                .with_context(|| format!("failed to grant {amount} XP"))?;
            print_json(&event)
        }
        Command::Reset { target } => {
            let result = match target {
                ResetTarget::Visits => progress.reset_visits().await,
                ResetTarget::Xp => progress.reset_xp().await,
                ResetTarget::All => progress.reset_all().await,
            };
            result.with_context(|| format!("failed to reset {target:?}"))?;
            print_json(&serde_json::json!({ "reset": format!("{target:?}").to_lowercase() }))
        }
    }
}

fn parse_point(raw: &str) -> PointId {
    match PointId::from_str(raw) {
        Ok(id) => id,
        Err(never) => match never {},
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ProgressConfig> {
    match path {
        Some(path) => ProgressConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            ProgressConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))
                .with_context(|| format!("failed to load {DEFAULT_CONFIG_FILE}"))
        }
        None => Ok(ProgressConfig::default().with_env_overrides()?),
    }
}

fn init_tracing(default_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
