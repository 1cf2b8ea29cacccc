//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Points on the shipped trail.
pub const DEFAULT_TOTAL_POINTS: u32 = 5;

/// Inspect and repair one user's trail progress.
#[derive(Debug, Parser)]
#[command(name = "trail-support")]
#[command(about = "Inspect and repair trail progress, achievements, and XP", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to `trail-config.yaml`. Defaults to `./trail-config.yaml` when
    /// present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Number of points on the trail.
    #[arg(long, global = true, default_value_t = DEFAULT_TOTAL_POINTS)]
    pub total: u32,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Support subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show XP, level, and level history.
    Stats,

    /// Show visited points and completion percentage.
    Progress,

    /// Record a visit to a point.
    Visit {
        /// Point id (digits for numbered points, otherwise a slug).
        point: String,

        /// Point title recorded with the XP award.
        #[arg(long, default_value = "")]
        title: String,
    },

    /// Record visits to several points at once.
    Import {
        /// Point ids, each optionally followed by `=title`
        /// (e.g. `3=Крепость`).
        #[arg(required = true, value_parser = parse_import_entry)]
        points: Vec<ImportEntry>,
    },

    /// Show unlocked achievements with their display details.
    Achievements,

    /// Show recent XP awards, newest first.
    Log {
        /// Maximum number of entries.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show the rewards offered to users.
    Rewards,

    /// Grant XP by hand.
    Grant {
        /// XP to add.
        #[arg(allow_hyphen_values = true)]
        amount: i64,

        /// Why the grant was made.
        #[arg(long)]
        note: String,
    },

    /// Clear a subsystem.
    Reset {
        /// Which state to clear.
        #[arg(value_enum)]
        target: ResetTarget,
    },
}

/// State cleared by `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResetTarget {
    /// Visited points and achievements.
    Visits,
    /// XP, level, history, and the XP log.
    Xp,
    /// Everything.
    All,
}

/// One point named on the `import` command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// Point id as typed.
    pub point: String,
    /// Title recorded with the visit XP; empty when not given.
    pub title: String,
}

fn parse_import_entry(raw: &str) -> Result<ImportEntry, String> {
    let (point, title) = raw.split_once('=').unwrap_or((raw, ""));
    let point = point.trim();
    if point.is_empty() {
        return Err(format!("missing point id in `{raw}`"));
    }
    Ok(ImportEntry {
        point: point.to_owned(),
        title: title.trim().to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_visit_with_global_flags() {
        let cli = Cli::try_parse_from([
            "trail-support",
            "visit",
            "3",
            "--title",
            "Крепость",
            "--total",
            "8",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(cli.total, 8);
        assert!(cli.json_logs);
        assert!(matches!(
            cli.command,
            Command::Visit { ref point, ref title } if point == "3" && title == "Крепость"
        ));
    }

    #[test]
    fn total_defaults_to_shipped_trail() {
        let cli = Cli::try_parse_from(["trail-support", "progress"]).unwrap();
        assert_eq!(cli.total, DEFAULT_TOTAL_POINTS);
        assert!(cli.config.is_none());
    }

    #[test]
    fn negative_grant_parses_for_validation_downstream() {
        let cli = Cli::try_parse_from(["trail-support", "grant", "-50", "--note", "test"]).unwrap();
        assert!(matches!(cli.command, Command::Grant { amount: -50, .. }));
    }

    #[test]
    fn reset_requires_a_known_target() {
        let cli = Cli::try_parse_from(["trail-support", "reset", "xp"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Reset {
                target: ResetTarget::Xp
            }
        ));
        assert!(Cli::try_parse_from(["trail-support", "reset", "photos"]).is_err());
    }

    #[test]
    fn import_needs_points() {
        assert!(Cli::try_parse_from(["trail-support", "import"]).is_err());
        let cli = Cli::try_parse_from(["trail-support", "import", "1", "2", "bridge"]).unwrap();
        assert!(matches!(cli.command, Command::Import { ref points } if points.len() == 3));
    }

    #[test]
    fn import_entries_carry_optional_titles() {
        let cli =
            Cli::try_parse_from(["trail-support", "import", "1=Городище", "5", "gate= Ворота "])
                .unwrap();
        let parsed: Vec<(String, String)> = match cli.command {
            Command::Import { points } => points
                .into_iter()
                .map(|entry| (entry.point, entry.title))
                .collect(),
            _ => Vec::new(),
        };
        let expected = [("1", "Городище"), ("5", ""), ("gate", "Ворота")]
            .map(|(point, title)| (point.to_owned(), title.to_owned()));
        assert_eq!(parsed, expected);
        assert!(Cli::try_parse_from(["trail-support", "import", "=Ворота"]).is_err());
    }
}
