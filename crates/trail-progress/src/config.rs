//! Configuration loading for the progress engine.
//!
//! The canonical configuration lives in `trail-config.yaml` at the project
//! root. Every section is optional; an empty file yields the shipped level
//! table, reward amounts, and achievement rules with an in-memory store.
//!
//! [`ProgressConfig::parse`] reads the YAML alone. [`ProgressConfig::from_file`]
//! also lets `DRAGONFLY_URL` and `TRAIL_STORE_TIMEOUT_MS` override the store
//! section.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use trail_types::{AchievementDetails, AchievementId, LevelInfo, ThresholdMode};

use crate::achievements::{AchievementRule, shipped_catalog, shipped_rules};
use crate::levels::LevelTable;
use crate::rewards::RewardTable;
use crate::xp::DEFAULT_LOG_CAPACITY;

/// Why a progress configuration could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read progress config: {source}")]
    Io {
        /// Source error.
        #[from]
        source: std::io::Error,
    },

    /// The text is not YAML of the expected shape.
    #[error("malformed progress config: {source}")]
    Yaml {
        /// Source error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable setup.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level progress engine configuration.
///
/// Mirrors the structure of `trail-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProgressConfig {
    /// Persisted store connection.
    #[serde(default)]
    pub store: StoreConfig,

    /// Level table.
    #[serde(default)]
    pub levels: LevelsConfig,

    /// XP per reward kind.
    #[serde(default)]
    pub rewards: RewardTable,

    /// Achievement rules and display catalog.
    #[serde(default)]
    pub achievements: AchievementConfig,

    /// XP audit log.
    #[serde(default)]
    pub xp_log: XpLogConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProgressConfig {
    /// Load configuration from a YAML file on disk, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if the level table is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)?.with_env_overrides()
    }

    /// Build a configuration from YAML text alone. The environment is not
    /// consulted.
    ///
    /// # Errors
    ///
    /// Same as [`ProgressConfig::from_file`], minus I/O.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DRAGONFLY_URL` and `TRAIL_STORE_TIMEOUT_MS`, then re-validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the result is unusable.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        self.store.apply_env_overrides();
        self.validate()?;
        Ok(self)
    }

    /// Check that the configuration can drive the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.level_table()?;
        if self.store.io_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.io_timeout_ms must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    /// The validated level table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the rows break the table rules.
    pub fn level_table(&self) -> Result<LevelTable, ConfigError> {
        LevelTable::new(self.levels.table.clone()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Persisted store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// `Dragonfly` URL (`redis://host:port`). Unset means an in-memory store.
    #[serde(default)]
    pub url: Option<String>,

    /// Milliseconds allowed for each store operation.
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
}

impl StoreConfig {
    /// Apply environment variable overrides.
    ///
    /// `DRAGONFLY_URL` replaces the URL. `TRAIL_STORE_TIMEOUT_MS` replaces
    /// the timeout when it parses as a positive integer.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var("DRAGONFLY_URL").ok(),
            std::env::var("TRAIL_STORE_TIMEOUT_MS").ok().as_deref(),
        );
    }

    /// Apply override values as read from the environment.
    pub fn apply_overrides(&mut self, url: Option<String>, timeout_ms: Option<&str>) {
        if let Some(url) = url {
            self.url = Some(url);
        }
        if let Some(raw) = timeout_ms {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.io_timeout_ms = ms,
                _ => tracing::warn!(value = %raw, "ignoring invalid TRAIL_STORE_TIMEOUT_MS"),
            }
        }
    }

    /// The per-operation timeout.
    pub const fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            io_timeout_ms: default_io_timeout_ms(),
        }
    }
}

/// Level table rows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LevelsConfig {
    /// Rows in ascending order, starting at level 1 with 0 XP.
    #[serde(default = "LevelTable::shipped_rows")]
    pub table: Vec<LevelInfo>,
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            table: LevelTable::shipped_rows(),
        }
    }
}

/// Achievement settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AchievementConfig {
    /// How count thresholds match.
    #[serde(default)]
    pub threshold_mode: ThresholdMode,

    /// Rules in evaluation order.
    #[serde(default = "shipped_rules")]
    pub rules: Vec<AchievementRule>,

    /// Display details per achievement.
    #[serde(default = "shipped_catalog")]
    pub catalog: BTreeMap<AchievementId, AchievementDetails>,
}

impl Default for AchievementConfig {
    fn default() -> Self {
        Self {
            threshold_mode: ThresholdMode::default(),
            rules: shipped_rules(),
            catalog: shipped_catalog(),
        }
    }
}

/// XP audit log settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct XpLogConfig {
    /// Events kept; 0 disables the log.
    #[serde(default = "default_log_capacity")]
    pub capacity: usize,
}

impl Default for XpLogConfig {
    fn default() -> Self {
        Self {
            capacity: default_log_capacity(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// serde defaults
// ---------------------------------------------------------------------------

const fn default_io_timeout_ms() -> u64 {
    5000
}

const fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use trail_types::PointId;

    use super::*;
    use crate::achievements::Threshold;

    #[test]
    fn empty_yaml_uses_shipped_defaults() {
        let config = ProgressConfig::parse("").unwrap();
        assert_eq!(config.levels.table.len(), 10);
        assert_eq!(config.rewards, RewardTable::default());
        assert_eq!(config.achievements.rules, shipped_rules());
        assert_eq!(config.achievements.threshold_mode, ThresholdMode::Crossing);
        assert_eq!(config.xp_log.capacity, DEFAULT_LOG_CAPACITY);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r##"
store:
  io_timeout_ms: 750

levels:
  table:
    - { level: 1, xpRequired: 0, title: "Newcomer", color: "#808080" }
    - { level: 2, xpRequired: 50, title: "Walker", color: "#2E8B57" }
    - { level: 3, xpRequired: 150, title: "Guide", color: "#4682B4" }

rewards:
  visit_point: 40
  achievement: 100

achievements:
  threshold_mode: exact
  rules:
    - kind: visit_count
      achievement: first_point
      threshold:
        count: 1
    - kind: visit_count
      achievement: all_points
      threshold: all_of_trail
    - kind: notable_point
      achievement: bridge
      point: old-bridge

xp_log:
  capacity: 25

logging:
  level: debug
  json: true
"##;
        let config = ProgressConfig::parse(yaml).unwrap();
        assert_eq!(config.store.io_timeout(), Duration::from_millis(750));
        let table = config.level_table().unwrap();
        assert_eq!(table.max_level(), 3);
        assert_eq!(table.info(2).title, "Walker");
        assert_eq!(config.rewards.visit_point, 40);
        assert_eq!(config.rewards.take_photo, 25);
        assert_eq!(config.achievements.threshold_mode, ThresholdMode::Exact);
        assert_eq!(config.achievements.rules.len(), 3);
        assert!(matches!(
            config.achievements.rules.first(),
            Some(AchievementRule::VisitCount {
                threshold: Threshold::Count(1),
                ..
            })
        ));
        assert!(matches!(
            config.achievements.rules.last(),
            Some(AchievementRule::NotablePoint { point: PointId::Named(p), .. })
                if p == "old-bridge"
        ));
        // Catalog keeps its default when omitted.
        assert_eq!(config.achievements.catalog.len(), 5);
        assert_eq!(config.xp_log.capacity, 25);
        assert!(config.logging.json);
    }

    #[test]
    fn numeric_notable_points_parse_as_numbers() {
        let yaml = "\
achievements:
  rules:
    - kind: notable_point
      achievement: gate
      point: 7
";
        let config = ProgressConfig::parse(yaml).unwrap();
        assert!(matches!(
            config.achievements.rules.first(),
            Some(AchievementRule::NotablePoint {
                point: PointId::Numeric(7),
                ..
            })
        ));
    }

    #[test]
    fn overrides_replace_store_settings() {
        let mut config = ProgressConfig::parse("store:\n  io_timeout_ms: 750\n").unwrap();
        config
            .store
            .apply_overrides(Some("redis://cache:6379".to_owned()), Some(" 1200 "));
        assert_eq!(config.store.url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.store.io_timeout(), Duration::from_millis(1200));
    }

    #[test]
    fn unusable_timeout_override_is_ignored() {
        let mut store = StoreConfig::default();
        store.apply_overrides(None, Some("0"));
        store.apply_overrides(None, Some("soon"));
        assert_eq!(store, StoreConfig::default());
    }

    #[test]
    fn rejects_unordered_level_table() {
        let yaml = r##"
levels:
  table:
    - { level: 1, xpRequired: 0, title: "A", color: "#000000" }
    - { level: 2, xpRequired: 200, title: "B", color: "#000000" }
    - { level: 3, xpRequired: 100, title: "C", color: "#000000" }
"##;
        let err = ProgressConfig::parse(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ProgressConfig::parse("store:\n  io_timeout_ms: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = ProgressConfig::parse("store: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("trail-config.yaml");
        if path.exists() {
            let config = ProgressConfig::from_file(&path);
            assert!(config.is_ok(), "trail-config.yaml rejected: {config:?}");
        }
    }
}
