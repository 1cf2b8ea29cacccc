//! Records exchanged between the progress engine and the UI layer.
//!
//! Field names serialize in `camelCase`: the persisted blobs written by
//! earlier releases of the app use that shape, and the UI reads these
//! records directly.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::RewardKind;
use crate::ids::{AchievementId, PointId, XpEventId};

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// One row of the level table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LevelInfo {
    /// Level number, starting at 1.
    pub level: u32,
    /// Total XP needed to reach this level.
    #[ts(type = "number")]
    pub xp_required: u64,
    /// Display title for the level.
    pub title: String,
    /// Display color (`#RRGGBB`).
    pub color: String,
}

/// A level gained, as stored in the level history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LevelRecord {
    /// The level reached.
    pub level: u32,
    /// Title of the level at the time it was reached.
    pub title: String,
    /// Color of the level at the time it was reached.
    pub color: String,
    /// When the level was reached, in Unix epoch milliseconds.
    #[ts(type = "number")]
    pub achieved_at: i64,
}

impl LevelRecord {
    /// Build a history record for `info`, reached at `at`.
    pub fn reached(info: &LevelInfo, at: DateTime<Utc>) -> Self {
        Self {
            level: info.level,
            title: info.title.clone(),
            color: info.color.clone(),
            achieved_at: at.timestamp_millis(),
        }
    }

    /// The achievement time as a [`DateTime`], if the stored value is in range.
    pub fn achieved_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.achieved_at).single()
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Visit progress along the trail, derived on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Progress {
    /// Points visited so far, in visit order.
    pub visited_points: Vec<PointId>,
    /// Number of visited points.
    pub visited_count: u32,
    /// Number of points on the trail, as supplied by the caller.
    pub total_points: u32,
    /// Rounded completion percentage (0--100).
    pub percentage: u8,
}

// ---------------------------------------------------------------------------
// XP events
// ---------------------------------------------------------------------------

/// What an XP award was for.
///
/// Tagged by `rewardType`, matching the detail objects stored by earlier
/// releases (`{"rewardType": "VISIT_POINT", "pointId": 1, ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "rewardType")]
#[ts(export, export_to = "bindings/")]
pub enum XpDetails {
    /// First visit to a point.
    #[serde(rename = "VISIT_POINT", rename_all = "camelCase")]
    PointVisit {
        /// The visited point.
        point_id: PointId,
        /// Title of the visited point.
        point_title: String,
    },
    /// Photo taken at a point.
    #[serde(rename = "TAKE_PHOTO", rename_all = "camelCase")]
    Photo {
        /// The point the photo belongs to.
        point_id: PointId,
        /// Identifier of the stored photo.
        photo_id: String,
    },
    /// Comment left on a point.
    #[serde(rename = "ADD_COMMENT", rename_all = "camelCase")]
    Comment {
        /// The commented point.
        point_id: PointId,
        /// Identifier of the comment.
        comment_id: String,
    },
    /// Achievement unlocked.
    #[serde(rename = "ACHIEVEMENT", rename_all = "camelCase")]
    Achievement {
        /// The unlocked achievement.
        achievement_id: AchievementId,
        /// Catalog title of the achievement.
        achievement_title: String,
    },
    /// Any other entry of the reward table.
    #[serde(rename = "ACTION", rename_all = "camelCase")]
    Action {
        /// Which reward was applied.
        reward: RewardKind,
        /// Optional subject of the action (point, era, photo id).
        subject: Option<String>,
    },
    /// Manual grant issued by support tooling.
    #[serde(rename = "MANUAL")]
    Manual {
        /// Free-form note explaining the grant.
        note: String,
    },
}

/// Result record produced by every XP award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct XpEvent {
    /// Unique id of this award.
    pub id: XpEventId,
    /// XP awarded.
    pub amount: u32,
    /// Human-readable reason.
    pub reason: String,
    /// Structured details of the award.
    pub details: XpDetails,
    /// When the award was applied, in Unix epoch milliseconds.
    #[ts(type = "number")]
    pub timestamp: i64,
    /// Total XP after the award.
    #[ts(type = "number")]
    pub new_xp: u64,
    /// Level after the award.
    pub new_level: u32,
    /// Number of levels gained by this award.
    pub levels_gained: u32,
    /// History records appended by this award, in ascending level order.
    pub gained_levels: Vec<LevelRecord>,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Full XP and level statistics for the profile screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UserStats {
    /// Total XP.
    #[ts(type = "number")]
    pub xp: u64,
    /// Current level (validated against the level table).
    pub level: u32,
    /// Table row of the current level.
    pub level_info: LevelInfo,
    /// Table row of the next level, absent at the max level.
    pub next_level_info: Option<LevelInfo>,
    /// XP still needed to reach the next level (0 at the max level).
    #[ts(type = "number")]
    pub xp_to_next_level: u64,
    /// Progress through the current level (0--100).
    pub progress_to_next_level: u8,
    /// Every level gained, in gain order.
    pub level_history: Vec<LevelRecord>,
    /// Highest level in the table.
    pub max_level: u32,
    /// Whether the current level is the highest level.
    pub is_max_level: bool,
}

/// Compact XP summary for badges and headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct XpSummary {
    /// Total XP ever earned (XP never decreases outside a reset).
    #[serde(rename = "allTimeXP")]
    #[ts(type = "number")]
    pub all_time_xp: u64,
    /// Current level.
    pub current_level: u32,
    /// Title of the current level.
    pub level_title: String,
    /// Color of the current level.
    pub level_color: String,
    /// Next level number, absent at the max level.
    pub next_level: Option<u32>,
    /// XP still needed to reach the next level.
    #[ts(type = "number")]
    pub xp_to_next_level: u64,
    /// Progress through the current level (0--100).
    pub progress_percentage: u8,
    /// Whether the current level is the highest level.
    pub is_max_level: bool,
    /// Number of levels in the table.
    pub total_levels: u32,
}

// ---------------------------------------------------------------------------
// Catalog and previews
// ---------------------------------------------------------------------------

/// Display metadata of one achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementDetails {
    /// Badge title.
    pub title: String,
    /// What the user did to earn it.
    pub description: String,
    /// Icon name.
    pub icon: String,
    /// Badge color (`#RRGGBB`).
    pub color: String,
}

/// One line of the "how to earn XP" preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RewardPreview {
    /// The rewarded action.
    pub reward: RewardKind,
    /// Action label.
    pub action: String,
    /// XP earned for the action.
    pub xp: u32,
    /// Icon name.
    pub icon: String,
}

// ---------------------------------------------------------------------------
// Visit outcome
// ---------------------------------------------------------------------------

/// Everything that changed because of one recorded visit (or a batch of them).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct VisitOutcome {
    /// Whether at least one point was visited for the first time.
    pub is_new_visit: bool,
    /// Achievements unlocked, in rule order.
    pub new_achievements: Vec<AchievementId>,
    /// XP awards applied, in the order they were applied.
    pub xp_events: Vec<XpEvent>,
}

impl VisitOutcome {
    /// The outcome of a repeat visit: nothing changed.
    pub fn repeat() -> Self {
        Self::default()
    }

    /// Sum of XP awarded by this outcome.
    pub fn total_xp(&self) -> u64 {
        self.xp_events.iter().map(|e| u64::from(e.amount)).sum()
    }
}
