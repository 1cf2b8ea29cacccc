//! Achievement rules, evaluation, and the unlocked-achievement store.
//!
//! # Rules
//!
//! An [`AchievementRule`] either watches the visited count
//! ([`AchievementRule::VisitCount`]) or a single notable point
//! ([`AchievementRule::NotablePoint`]). Rules are checked in list order and
//! the unlocked list keeps that order, so the shipped rule list yields
//! `first_point, half_way, all_points` on a linear walk of the trail.
//!
//! # Threshold matching
//!
//! Count thresholds match according to [`ThresholdMode`]. The default,
//! [`ThresholdMode::Crossing`], fires when the count moves from below the
//! threshold to at or above it, which also covers batch imports that jump
//! several counts at once. A resolved threshold of 0 never fires.
//!
//! # Persistence
//!
//! [`AchievementBook`] owns the `@trailapp_achievements` blob. Evaluation
//! itself is pure and never touches the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use trail_store::{Blobs, keys};
use trail_types::{AchievementDetails, AchievementId, PointId, ThresholdMode};

use crate::error::ProgressError;

// ---------------------------------------------------------------------------
// AchievementSet
// ---------------------------------------------------------------------------

/// Unlocked achievement ids, unique and in unlock order.
///
/// Duplicates in a stored list are dropped on load, keeping the first
/// occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AchievementId>", into = "Vec<AchievementId>")]
pub struct AchievementSet {
    ids: Vec<AchievementId>,
}

impl AchievementSet {
    /// An empty set.
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Whether `id` is unlocked.
    pub fn contains(&self, id: &AchievementId) -> bool {
        self.ids.contains(id)
    }

    /// Add `id`. Returns `false` if it was already present.
    pub fn insert(&mut self, id: AchievementId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Number of unlocked achievements.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is unlocked.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Unlocked ids in unlock order.
    pub fn as_slice(&self) -> &[AchievementId] {
        &self.ids
    }

    /// Iterate in unlock order.
    pub fn iter(&self) -> core::slice::Iter<'_, AchievementId> {
        self.ids.iter()
    }

    /// Consume the set, returning the ids in unlock order.
    pub fn into_vec(self) -> Vec<AchievementId> {
        self.ids
    }
}

impl From<Vec<AchievementId>> for AchievementSet {
    fn from(ids: Vec<AchievementId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<AchievementSet> for Vec<AchievementId> {
    fn from(set: AchievementSet) -> Self {
        set.ids
    }
}

impl FromIterator<AchievementId> for AchievementSet {
    fn from_iter<I: IntoIterator<Item = AchievementId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<'a> IntoIterator for &'a AchievementSet {
    type Item = &'a AchievementId;
    type IntoIter = core::slice::Iter<'a, AchievementId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A visited-count threshold, fixed or relative to the trail length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// A fixed number of visited points.
    Count(u32),
    /// Half of the trail, rounded up.
    HalfOfTrail,
    /// Every point of the trail.
    AllOfTrail,
}

impl Threshold {
    /// The concrete count for a trail of `total_points`.
    pub const fn resolve(self, total_points: u32) -> u32 {
        match self {
            Self::Count(n) => n,
            Self::HalfOfTrail => total_points.div_ceil(2),
            Self::AllOfTrail => total_points,
        }
    }
}

/// One rule that unlocks an achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AchievementRule {
    /// Unlocks when the visited count reaches a threshold.
    VisitCount {
        /// The achievement to unlock.
        achievement: AchievementId,
        /// The count to reach.
        threshold: Threshold,
    },
    /// Unlocks when a specific point is newly visited.
    NotablePoint {
        /// The achievement to unlock.
        achievement: AchievementId,
        /// The point that unlocks it.
        point: PointId,
    },
}

impl AchievementRule {
    /// The achievement this rule unlocks.
    pub const fn achievement(&self) -> &AchievementId {
        match self {
            Self::VisitCount { achievement, .. } | Self::NotablePoint { achievement, .. } => {
                achievement
            }
        }
    }
}

/// The rules the app ships with.
///
/// Count rules come first, then the two notable points of the shipped
/// trail (the ancient settlement is point 1, the church complex point 5).
pub fn shipped_rules() -> Vec<AchievementRule> {
    vec![
        AchievementRule::VisitCount {
            achievement: AchievementId::new(AchievementId::FIRST_POINT),
            threshold: Threshold::Count(1),
        },
        AchievementRule::VisitCount {
            achievement: AchievementId::new(AchievementId::HALF_WAY),
            threshold: Threshold::HalfOfTrail,
        },
        AchievementRule::VisitCount {
            achievement: AchievementId::new(AchievementId::ALL_POINTS),
            threshold: Threshold::AllOfTrail,
        },
        AchievementRule::NotablePoint {
            achievement: AchievementId::new(AchievementId::ANCIENT_SETTLEMENT),
            point: PointId::Numeric(1),
        },
        AchievementRule::NotablePoint {
            achievement: AchievementId::new(AchievementId::CHURCH_COMPLEX),
            point: PointId::Numeric(5),
        },
    ]
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Display details for the shipped achievements:
/// `(id, title, description, icon, color)`.
const SHIPPED_CATALOG: [(&str, &str, &str, &str, &str); 5] = [
    (
        AchievementId::FIRST_POINT,
        "Первопроходец",
        "Посетил первую точку тропы",
        "flag",
        "#FFD700",
    ),
    (
        AchievementId::HALF_WAY,
        "Полпути",
        "Посетил половину точек тропы",
        "compass",
        "#2E8B57",
    ),
    (
        AchievementId::ALL_POINTS,
        "Историк-исследователь",
        "Посетил все точки исторической тропы",
        "trophy",
        "#B22222",
    ),
    (
        AchievementId::ANCIENT_SETTLEMENT,
        "Археолог",
        "Исследовал древнее поселение",
        "search",
        "#8B4513",
    ),
    (
        AchievementId::CHURCH_COMPLEX,
        "Церковный историк",
        "Исследовал церковный комплекс",
        "church",
        "#4B0082",
    ),
];

/// Display details for every shipped achievement, keyed by id.
pub fn shipped_catalog() -> BTreeMap<AchievementId, AchievementDetails> {
    SHIPPED_CATALOG
        .iter()
        .map(|&(id, title, description, icon, color)| {
            (
                AchievementId::new(id),
                AchievementDetails {
                    title: title.to_owned(),
                    description: description.to_owned(),
                    icon: icon.to_owned(),
                    color: color.to_owned(),
                },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Outcome of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Achievements unlocked by this evaluation, in rule order.
    pub newly_unlocked: Vec<AchievementId>,
    /// The full unlocked set after this evaluation.
    pub updated: AchievementSet,
}

/// Decides which achievements a visit unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementEvaluator {
    rules: Vec<AchievementRule>,
    mode: ThresholdMode,
    total_points: u32,
}

impl AchievementEvaluator {
    /// Build an evaluator for a trail of `total_points`.
    pub const fn new(rules: Vec<AchievementRule>, mode: ThresholdMode, total_points: u32) -> Self {
        Self {
            rules,
            mode,
            total_points,
        }
    }

    /// The shipped rules with crossing thresholds.
    pub fn shipped(total_points: u32) -> Self {
        Self::new(shipped_rules(), ThresholdMode::Crossing, total_points)
    }

    /// The rules, in evaluation order.
    pub fn rules(&self) -> &[AchievementRule] {
        &self.rules
    }

    /// Trail length the thresholds resolve against.
    pub const fn total_points(&self) -> u32 {
        self.total_points
    }

    /// Evaluate a single new visit that brought the count to
    /// `visited_count`.
    pub fn evaluate(
        &self,
        visited_count: u32,
        last_visited: &PointId,
        current: &AchievementSet,
    ) -> Evaluation {
        self.evaluate_batch(
            visited_count.saturating_sub(1),
            visited_count,
            core::slice::from_ref(last_visited),
            current,
        )
    }

    /// Evaluate a batch of new visits that moved the count from
    /// `previous_count` to `visited_count`.
    ///
    /// Never returns an id already in `current`.
    pub fn evaluate_batch(
        &self,
        previous_count: u32,
        visited_count: u32,
        newly_visited: &[PointId],
        current: &AchievementSet,
    ) -> Evaluation {
        let mut updated = current.clone();
        let mut newly_unlocked = Vec::new();

        for rule in &self.rules {
            let id = rule.achievement();
            if updated.contains(id) {
                continue;
            }
            let fires = match rule {
                AchievementRule::VisitCount { threshold, .. } => self.count_reached(
                    threshold.resolve(self.total_points),
                    previous_count,
                    visited_count,
                ),
                AchievementRule::NotablePoint { point, .. } => newly_visited.contains(point),
            };
            if fires {
                updated.insert(id.clone());
                newly_unlocked.push(id.clone());
            }
        }

        Evaluation {
            newly_unlocked,
            updated,
        }
    }

    const fn count_reached(&self, threshold: u32, previous: u32, current: u32) -> bool {
        if threshold == 0 {
            return false;
        }
        match self.mode {
            ThresholdMode::Crossing => previous < threshold && threshold <= current,
            ThresholdMode::Exact => current == threshold,
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Reads and writes the unlocked-achievement blob.
#[derive(Debug, Clone)]
pub struct AchievementBook {
    blobs: Blobs,
}

impl AchievementBook {
    /// Wrap `blobs`.
    pub const fn new(blobs: Blobs) -> Self {
        Self { blobs }
    }

    /// The unlocked set, or an empty set if it cannot be read.
    pub async fn get(&self) -> AchievementSet {
        match self.blobs.read_json::<AchievementSet>(keys::ACHIEVEMENTS).await {
            Ok(set) => set.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read achievements, reporting none");
                AchievementSet::new()
            }
        }
    }

    /// The unlocked set for a read-modify-write.
    ///
    /// A malformed blob reads as empty; a backend failure is returned.
    pub(crate) async fn load_for_update(&self) -> Result<AchievementSet, ProgressError> {
        Ok(self
            .blobs
            .read_json(keys::ACHIEVEMENTS)
            .await?
            .unwrap_or_default())
    }

    pub(crate) async fn save(&self, set: &AchievementSet) -> Result<(), ProgressError> {
        self.blobs
            .write_json(keys::ACHIEVEMENTS, set.as_slice())
            .await?;
        Ok(())
    }
}
