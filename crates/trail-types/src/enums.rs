//! Enumeration types for the progress engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Reward kinds
// ---------------------------------------------------------------------------

/// A user action that earns experience points.
///
/// The wire names (`"VISIT_POINT"`, `"TAKE_PHOTO"`, ...) are the `rewardType`
/// values already stored in XP event details on installed devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum RewardKind {
    /// Visited a trail point for the first time.
    VisitPoint,
    /// Took a photo at a point.
    TakePhoto,
    /// Commented on a point or photo.
    AddComment,
    /// Liked a photo.
    LikePhoto,
    /// Scanned a point's QR code.
    ScanQr,
    /// Studied one era of the timeline.
    CompleteTimeline,
    /// Opened the app on a new day.
    DailyVisit,
    /// Unlocked an achievement.
    Achievement,
    /// Shared a photo.
    SharePhoto,
    /// Visited every point of the trail.
    CompleteAllPoints,
}

impl RewardKind {
    /// Every reward kind, in reward-table order.
    pub const ALL: [Self; 10] = [
        Self::VisitPoint,
        Self::TakePhoto,
        Self::AddComment,
        Self::LikePhoto,
        Self::ScanQr,
        Self::CompleteTimeline,
        Self::DailyVisit,
        Self::Achievement,
        Self::SharePhoto,
        Self::CompleteAllPoints,
    ];

    /// Human-readable reason recorded on the XP event.
    pub const fn reason(self) -> &'static str {
        match self {
            Self::VisitPoint => "Point visit",
            Self::TakePhoto => "Photo taken",
            Self::AddComment => "Comment added",
            Self::LikePhoto => "Photo liked",
            Self::ScanQr => "QR code scanned",
            Self::CompleteTimeline => "Timeline era studied",
            Self::DailyVisit => "Daily visit",
            Self::Achievement => "Achievement unlocked",
            Self::SharePhoto => "Photo shared",
            Self::CompleteAllPoints => "Trail completed",
        }
    }

    /// Icon name the UI shows next to the reward.
    pub const fn icon(self) -> &'static str {
        match self {
            Self::VisitPoint => "map-marker-alt",
            Self::TakePhoto => "camera",
            Self::AddComment => "comment",
            Self::LikePhoto => "heart",
            Self::ScanQr => "qrcode",
            Self::CompleteTimeline => "history",
            Self::DailyVisit => "calendar-check",
            Self::Achievement => "trophy",
            Self::SharePhoto => "share-alt",
            Self::CompleteAllPoints => "flag-checkered",
        }
    }
}

// ---------------------------------------------------------------------------
// Threshold matching
// ---------------------------------------------------------------------------

/// How visit-count achievement thresholds are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ThresholdMode {
    /// Fires when the count moves from below the threshold to at or above
    /// it. A batch of visits that jumps over a threshold still unlocks it.
    #[default]
    Crossing,
    /// Fires only when the count equals the threshold exactly. A batch that
    /// jumps over the threshold skips the achievement.
    Exact,
}
