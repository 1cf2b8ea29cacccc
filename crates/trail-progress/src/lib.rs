//! Progress and gamification engine for the historical trail app.
//!
//! Tracks which trail points a user has visited, unlocks achievements, and
//! accumulates XP towards a level table. All state lives in a handful of
//! blobs in a `trail-store` backend.
//!
//! # Architecture
//!
//! ```text
//! UI event
//!   |
//!   +-- ProgressStore (one async lock around every mutation)
//!         |
//!         +-- VisitLedger           visited set, derived progress
//!         +-- AchievementEvaluator  pure unlock rules
//!         +-- AchievementBook       unlocked set
//!         +-- XpEngine              XP, level cascade, history, audit log
//! ```
//!
//! # Modules
//!
//! - [`facade`] -- [`ProgressStore`], the only public mutator
//! - [`ledger`] -- Visited points and progress
//! - [`achievements`] -- Rules, evaluation, catalog, persistence
//! - [`xp`] -- XP awards and level stats
//! - [`levels`] -- The level table
//! - [`rewards`] -- XP amounts per reward kind
//! - [`config`] -- YAML configuration
//! - [`error`] -- Error types

pub mod achievements;
pub mod config;
pub mod error;
pub mod facade;
pub mod ledger;
pub mod levels;
mod math;
pub mod rewards;
pub mod xp;

pub use achievements::{
    AchievementEvaluator, AchievementRule, AchievementSet, Evaluation, Threshold,
};
pub use config::{ConfigError, ProgressConfig};
pub use error::ProgressError;
pub use facade::ProgressStore;
pub use ledger::{VisitedSet, compute_progress};
pub use levels::LevelTable;
pub use rewards::RewardTable;
