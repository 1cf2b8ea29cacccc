//! The progress façade: the one entry point the app talks to.
//!
//! [`ProgressStore`] wires the visit ledger, the achievement evaluator, and
//! the XP engine together over one store. It is the only public way to
//! mutate visits, achievements, or XP. Every mutation (including resets)
//! runs under a single async lock, so overlapping calls from the UI are
//! applied one after another instead of racing on read-modify-write.
//!
//! A visit is processed in a fixed order: mark the point, evaluate and
//! persist achievements, award the visit XP, then award XP for each unlock.
//! There is no cross-blob transaction; a failure part-way leaves earlier
//! steps committed and is reported to the caller.

use std::collections::BTreeMap;

use tokio::sync::Mutex;
use trail_store::Blobs;
use trail_types::{
    AchievementDetails, AchievementId, PointId, Progress, RewardKind, RewardPreview, UserStats,
    VisitOutcome, XpDetails, XpEvent, XpSummary,
};

use crate::achievements::{AchievementBook, AchievementEvaluator, Evaluation, shipped_catalog};
use crate::config::{ConfigError, ProgressConfig};
use crate::error::ProgressError;
use crate::ledger::VisitLedger;
use crate::levels::LevelTable;
use crate::rewards::RewardTable;
use crate::xp::{DEFAULT_LOG_CAPACITY, XpEngine};

/// Progress, achievements, and XP for one user of one trail.
#[derive(Debug)]
pub struct ProgressStore {
    ledger: VisitLedger,
    book: AchievementBook,
    evaluator: AchievementEvaluator,
    catalog: BTreeMap<AchievementId, AchievementDetails>,
    xp: XpEngine,
    /// Held for the whole of every mutating operation.
    write_lock: Mutex<()>,
}

impl ProgressStore {
    /// Build a store with the shipped tables for a trail of `total_points`.
    pub fn new(blobs: Blobs, total_points: u32) -> Self {
        Self {
            ledger: VisitLedger::new(blobs.clone()),
            book: AchievementBook::new(blobs.clone()),
            evaluator: AchievementEvaluator::shipped(total_points),
            catalog: shipped_catalog(),
            xp: XpEngine::new(
                blobs,
                LevelTable::shipped(),
                RewardTable::default(),
                DEFAULT_LOG_CAPACITY,
            ),
            write_lock: Mutex::new(()),
        }
    }

    /// Build a store from configuration for a trail of `total_points`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configured level table is
    /// unusable.
    pub fn from_config(
        blobs: Blobs,
        config: &ProgressConfig,
        total_points: u32,
    ) -> Result<Self, ConfigError> {
        let table = config.level_table()?;
        Ok(Self {
            ledger: VisitLedger::new(blobs.clone()),
            book: AchievementBook::new(blobs.clone()),
            evaluator: AchievementEvaluator::new(
                config.achievements.rules.clone(),
                config.achievements.threshold_mode,
                total_points,
            ),
            catalog: config.achievements.catalog.clone(),
            xp: XpEngine::new(blobs, table, config.rewards, config.xp_log.capacity),
            write_lock: Mutex::new(()),
        })
    }

    /// Number of points on the trail.
    pub const fn total_points(&self) -> u32 {
        self.evaluator.total_points()
    }

    /// The level table in use.
    pub const fn level_table(&self) -> &LevelTable {
        self.xp.table()
    }

    // =========================================================================
    // Visits
    // =========================================================================

    /// Record a visit to `point_id`.
    ///
    /// A repeat visit changes nothing and returns a not-new outcome with no
    /// achievements and no XP.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Store`] if a store read or write fails. Steps
    /// completed before the failure stay committed.
    pub async fn visit_point(
        &self,
        point_id: PointId,
        point_title: &str,
    ) -> Result<VisitOutcome, ProgressError> {
        let _guard = self.write_lock.lock().await;

        let mark = self.ledger.mark_visited(&point_id).await?;
        if !mark.is_new_visit {
            tracing::debug!(point = %point_id, "repeat visit, nothing to do");
            return Ok(VisitOutcome::repeat());
        }
        tracing::info!(point = %point_id, visited = mark.visited_count, "new point visited");

        let current = self.book.load_for_update().await?;
        let evaluation = self
            .evaluator
            .evaluate(mark.visited_count, &point_id, &current);
        self.apply_visits(vec![(point_id, point_title.to_owned())], evaluation)
            .await
    }

    /// Record visits to several points at once, e.g. when restoring a
    /// backup.
    ///
    /// Known points are skipped. Achievements are evaluated once over the
    /// whole batch, and every new point earns the visit reward.
    ///
    /// # Errors
    ///
    /// Same as [`ProgressStore::visit_point`].
    pub async fn import_visits(
        &self,
        points: &[(PointId, String)],
    ) -> Result<VisitOutcome, ProgressError> {
        let _guard = self.write_lock.lock().await;

        let ids: Vec<PointId> = points.iter().map(|(id, _)| id.clone()).collect();
        let batch = self.ledger.mark_many(&ids).await?;
        if batch.newly_visited.is_empty() {
            tracing::debug!(points = points.len(), "import contained no new points");
            return Ok(VisitOutcome::repeat());
        }
        tracing::info!(
            imported = batch.newly_visited.len(),
            visited = batch.visited_count,
            "visits imported"
        );

        let current = self.book.load_for_update().await?;
        let evaluation = self.evaluator.evaluate_batch(
            batch.previous_count,
            batch.visited_count,
            &batch.newly_visited,
            &current,
        );
        let visits = batch
            .newly_visited
            .into_iter()
            .map(|id| {
                let title = points
                    .iter()
                    .find(|(candidate, _)| *candidate == id)
                    .map(|(_, title)| title.clone())
                    .unwrap_or_default();
                (id, title)
            })
            .collect();
        self.apply_visits(visits, evaluation).await
    }

    async fn apply_visits(
        &self,
        visits: Vec<(PointId, String)>,
        evaluation: Evaluation,
    ) -> Result<VisitOutcome, ProgressError> {
        let Evaluation {
            newly_unlocked,
            updated,
        } = evaluation;

        if !newly_unlocked.is_empty() {
            self.book.save(&updated).await?;
            for id in &newly_unlocked {
                tracing::info!(achievement = %id, "achievement unlocked");
            }
        }

        let mut xp_events = Vec::with_capacity(visits.len().saturating_add(newly_unlocked.len()));
        for (point_id, point_title) in visits {
            xp_events.push(self.xp.add_xp_for_point_visit(point_id, point_title).await?);
        }
        for id in &newly_unlocked {
            let title = self.achievement_title(id);
            xp_events.push(self.xp.add_xp_for_achievement(id.clone(), title).await?);
        }

        Ok(VisitOutcome {
            is_new_visit: true,
            new_achievements: newly_unlocked,
            xp_events,
        })
    }

    fn achievement_title(&self, id: &AchievementId) -> String {
        self.catalog
            .get(id)
            .map_or_else(|| id.to_string(), |details| details.title.clone())
    }

    // =========================================================================
    // Other XP sources
    // =========================================================================

    /// Award the photo reward for `photo_id` taken at `point_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError`] if the award cannot be persisted.
    pub async fn record_photo(
        &self,
        point_id: PointId,
        photo_id: &str,
    ) -> Result<XpEvent, ProgressError> {
        let _guard = self.write_lock.lock().await;
        self.xp.add_xp_for_photo(point_id, photo_id.to_owned()).await
    }

    /// Award the comment reward for `comment_id` on `point_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError`] if the award cannot be persisted.
    pub async fn record_comment(
        &self,
        point_id: PointId,
        comment_id: &str,
    ) -> Result<XpEvent, ProgressError> {
        let _guard = self.write_lock.lock().await;
        self.xp
            .add_xp_for_comment(point_id, comment_id.to_owned())
            .await
    }

    /// Award any reward from the reward table.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError`] if the award cannot be persisted.
    pub async fn award_action(
        &self,
        reward: RewardKind,
        subject: Option<String>,
    ) -> Result<XpEvent, ProgressError> {
        let _guard = self.write_lock.lock().await;
        self.xp
            .award(reward, XpDetails::Action { reward, subject })
            .await
    }

    /// Grant `amount` XP by hand, e.g. from support tooling.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::InvalidAmount`] if `amount` is negative or
    /// larger than a single award allows, or [`ProgressError::Store`] if
    /// the award cannot be persisted.
    pub async fn grant_manual(&self, amount: i64, note: &str) -> Result<XpEvent, ProgressError> {
        if amount < 0 {
            return Err(ProgressError::InvalidAmount {
                amount,
                reason: "XP cannot be taken away",
            });
        }
        let Ok(amount_u32) = u32::try_from(amount) else {
            return Err(ProgressError::InvalidAmount {
                amount,
                reason: "exceeds the largest single award",
            });
        };

        let _guard = self.write_lock.lock().await;
        tracing::info!(amount, note, "manual XP grant");
        self.xp
            .add_xp(
                amount_u32,
                "Manual grant",
                XpDetails::Manual {
                    note: note.to_owned(),
                },
            )
            .await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Progress along a trail of `total_points`.
    pub async fn get_progress(&self, total_points: u32) -> Progress {
        self.ledger.get_progress(total_points).await
    }

    /// Visited points in first-visit order.
    pub async fn get_visited_points(&self) -> Vec<PointId> {
        self.ledger.get_visited().await.into_vec()
    }

    /// Unlocked achievements in unlock order.
    pub async fn get_achievements(&self) -> Vec<AchievementId> {
        self.book.get().await.into_vec()
    }

    /// Display details for every known achievement.
    pub const fn get_achievement_details(&self) -> &BTreeMap<AchievementId, AchievementDetails> {
        &self.catalog
    }

    /// XP, level, and level history.
    pub async fn get_user_stats(&self) -> UserStats {
        self.xp.get_stats().await
    }

    /// Compact XP summary.
    pub async fn get_xp_stats(&self) -> XpSummary {
        self.xp.get_summary().await
    }

    /// Up to `limit` recent XP events, newest first.
    pub async fn get_xp_log(&self, limit: usize) -> Vec<XpEvent> {
        self.xp.get_log(limit).await
    }

    /// The rewards shown on the "how to earn XP" screen.
    pub fn reward_preview(&self) -> Vec<RewardPreview> {
        self.xp.rewards().preview()
    }

    // =========================================================================
    // Resets
    // =========================================================================

    /// Clear visited points and achievements together.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Store`] if a key cannot be removed.
    pub async fn reset_visits(&self) -> Result<(), ProgressError> {
        let _guard = self.write_lock.lock().await;
        self.clear_visits().await
    }

    /// Clear XP, level, level history, and the XP log together.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Store`] if a key cannot be removed.
    pub async fn reset_xp(&self) -> Result<(), ProgressError> {
        let _guard = self.write_lock.lock().await;
        self.xp.reset().await?;
        tracing::info!("XP progress reset");
        Ok(())
    }

    /// Clear everything.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Store`] if a key cannot be removed.
    pub async fn reset_all(&self) -> Result<(), ProgressError> {
        let _guard = self.write_lock.lock().await;
        self.clear_visits().await?;
        self.xp.reset().await?;
        tracing::info!("XP progress reset");
        Ok(())
    }

    async fn clear_visits(&self) -> Result<(), ProgressError> {
        self.ledger.reset().await?;
        tracing::info!("visit progress reset");
        Ok(())
    }
}
