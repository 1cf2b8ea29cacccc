//! The visit ledger: which trail points the user has visited.
//!
//! The ledger owns the `@trailapp_visited_points` blob (a JSON array of
//! point ids in first-visit order) and keeps the `@trailapp_total_progress`
//! counter in step with it for readers that predate derived progress.
//! Progress itself is always computed from the visited set on read. A
//! reset clears the whole visit group, achievements included.

use trail_store::{Blobs, keys};
use trail_types::{PointId, Progress};

use crate::error::ProgressError;
use crate::math::percentage;

// ---------------------------------------------------------------------------
// VisitedSet
// ---------------------------------------------------------------------------

/// Visited point ids, unique and in first-visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<PointId>", into = "Vec<PointId>")]
pub struct VisitedSet {
    points: Vec<PointId>,
}

impl VisitedSet {
    /// An empty set.
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Whether `point` has been visited.
    pub fn contains(&self, point: &PointId) -> bool {
        self.points.contains(point)
    }

    /// Record `point`. Returns `false` if it was already present.
    pub fn insert(&mut self, point: PointId) -> bool {
        if self.contains(&point) {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Number of visited points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point has been visited.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of visited points as a count.
    pub fn count(&self) -> u32 {
        u32::try_from(self.points.len()).unwrap_or(u32::MAX)
    }

    /// Visited points in first-visit order.
    pub fn as_slice(&self) -> &[PointId] {
        &self.points
    }

    /// Consume the set, returning the points in first-visit order.
    pub fn into_vec(self) -> Vec<PointId> {
        self.points
    }
}

impl From<Vec<PointId>> for VisitedSet {
    fn from(points: Vec<PointId>) -> Self {
        points.into_iter().collect()
    }
}

impl From<VisitedSet> for Vec<PointId> {
    fn from(set: VisitedSet) -> Self {
        set.points
    }
}

impl FromIterator<PointId> for VisitedSet {
    fn from_iter<I: IntoIterator<Item = PointId>>(iter: I) -> Self {
        let mut set = Self::new();
        for point in iter {
            set.insert(point);
        }
        set
    }
}

/// Derive progress figures from a visited set.
///
/// `total_points` comes from the caller's trail dataset. A total of 0
/// yields 0 percent.
pub fn compute_progress(visited: VisitedSet, total_points: u32) -> Progress {
    let visited_count = visited.count();
    Progress {
        percentage: percentage(u64::from(visited_count), u64::from(total_points)),
        visited_points: visited.into_vec(),
        visited_count,
        total_points,
    }
}

// ---------------------------------------------------------------------------
// Mutation results
// ---------------------------------------------------------------------------

/// Result of marking one point visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkOutcome {
    /// Whether the point was not visited before.
    pub is_new_visit: bool,
    /// Visited count after the call.
    pub visited_count: u32,
}

/// Result of marking several points visited at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchMark {
    /// Visited count before the call.
    pub previous_count: u32,
    /// Visited count after the call.
    pub visited_count: u32,
    /// Points that were not visited before, in input order.
    pub newly_visited: Vec<PointId>,
}

// ---------------------------------------------------------------------------
// VisitLedger
// ---------------------------------------------------------------------------

/// Reads and writes the visited-point blobs.
#[derive(Debug, Clone)]
pub struct VisitLedger {
    blobs: Blobs,
}

impl VisitLedger {
    /// Wrap `blobs`.
    pub const fn new(blobs: Blobs) -> Self {
        Self { blobs }
    }

    /// The visited set, or an empty set if it cannot be read.
    pub async fn get_visited(&self) -> VisitedSet {
        match self.blobs.read_json::<VisitedSet>(keys::VISITED_POINTS).await {
            Ok(set) => set.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read visited points, reporting none");
                VisitedSet::new()
            }
        }
    }

    /// Progress along a trail of `total_points`.
    pub async fn get_progress(&self, total_points: u32) -> Progress {
        compute_progress(self.get_visited().await, total_points)
    }

    /// The visited set for a read-modify-write.
    ///
    /// A malformed blob reads as empty; a backend failure is returned.
    pub(crate) async fn load_for_update(&self) -> Result<VisitedSet, ProgressError> {
        Ok(self
            .blobs
            .read_json(keys::VISITED_POINTS)
            .await?
            .unwrap_or_default())
    }

    /// Record a visit to `point`.
    ///
    /// A repeat visit writes nothing.
    pub(crate) async fn mark_visited(&self, point: &PointId) -> Result<MarkOutcome, ProgressError> {
        let mut visited = self.load_for_update().await?;
        if visited.contains(point) {
            return Ok(MarkOutcome {
                is_new_visit: false,
                visited_count: visited.count(),
            });
        }

        visited.insert(point.clone());
        self.save(&visited).await?;
        tracing::debug!(point = %point, visited = visited.count(), "point marked visited");
        Ok(MarkOutcome {
            is_new_visit: true,
            visited_count: visited.count(),
        })
    }

    /// Record visits to every point in `points`, skipping known ones.
    ///
    /// Nothing is written when every point was already visited.
    pub(crate) async fn mark_many(&self, points: &[PointId]) -> Result<BatchMark, ProgressError> {
        let mut visited = self.load_for_update().await?;
        let previous_count = visited.count();
        let newly_visited: Vec<PointId> = points
            .iter()
            .filter(|&point| visited.insert(point.clone()))
            .cloned()
            .collect();

        if !newly_visited.is_empty() {
            self.save(&visited).await?;
        }
        Ok(BatchMark {
            previous_count,
            visited_count: visited.count(),
            newly_visited,
        })
    }

    /// Remove the visited set, its cached count, and the achievements
    /// earned from it.
    pub(crate) async fn reset(&self) -> Result<(), ProgressError> {
        for key in keys::VISIT_KEYS {
            self.blobs.remove(key).await?;
        }
        Ok(())
    }

    async fn save(&self, visited: &VisitedSet) -> Result<(), ProgressError> {
        self.blobs
            .write_json(keys::VISITED_POINTS, visited.as_slice())
            .await?;
        // The cached count is advisory; the visited set is authoritative.
        if let Err(e) = self
            .blobs
            .write_counter(keys::TOTAL_PROGRESS, u64::from(visited.count()))
            .await
        {
            tracing::warn!(error = %e, "failed to update cached visit count");
        }
        Ok(())
    }
}
