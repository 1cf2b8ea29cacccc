//! Identifier types for trail points, achievements, and XP events.
//!
//! Point and achievement identifiers come from the trail dataset and the
//! achievement catalog, so they wrap whatever the dataset uses rather than
//! generating their own values. XP events are created by the engine and
//! carry a time-ordered UUID v7.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// XpEventId
// ---------------------------------------------------------------------------

/// Identifier of one XP award, minted as a UUID v7 so that ids sort in
/// award order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct XpEventId(pub Uuid);

impl XpEventId {
    /// Mint a fresh event id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for XpEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for XpEventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

// ---------------------------------------------------------------------------
// PointId
// ---------------------------------------------------------------------------

/// Stable identifier of one trail point.
///
/// The shipped dataset numbers its points (`1`, `2`, ...), and installed
/// devices persist those numbers as bare JSON integers. Datasets keyed by
/// slug are also accepted, so the JSON form is either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum PointId {
    /// Numeric point id (the shipped dataset).
    Numeric(#[ts(type = "number")] u64),
    /// Slug-style point id.
    Named(String),
}

impl core::fmt::Display for PointId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Named(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for PointId {
    fn from(n: u64) -> Self {
        Self::Numeric(n)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        Self::Named(s.to_owned())
    }
}

impl From<String> for PointId {
    fn from(s: String) -> Self {
        Self::Named(s)
    }
}

impl FromStr for PointId {
    type Err = core::convert::Infallible;

    /// Digits parse as a numeric id; anything else is a named id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(trimmed
            .parse::<u64>()
            .map_or_else(|_| Self::Named(trimmed.to_owned()), Self::Numeric))
    }
}

// ---------------------------------------------------------------------------
// AchievementId
// ---------------------------------------------------------------------------

/// Identifier of one unlockable badge, e.g. `"first_point"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementId(pub String);

impl AchievementId {
    /// Visited the first point of the trail.
    pub const FIRST_POINT: &'static str = "first_point";
    /// Visited half of the trail.
    pub const HALF_WAY: &'static str = "half_way";
    /// Visited every point of the trail.
    pub const ALL_POINTS: &'static str = "all_points";
    /// Explored the ancient settlement (point 1 of the shipped trail).
    pub const ANCIENT_SETTLEMENT: &'static str = "ancient_settlement";
    /// Explored the church complex (point 5 of the shipped trail).
    pub const CHURCH_COMPLEX: &'static str = "church_complex";

    /// Create an achievement id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AchievementId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AchievementId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
