//! The XP/level engine.
//!
//! # State
//!
//! XP is a non-negative running total stored as a decimal string. The
//! current level is stored next to it, but only as a cache: every read
//! derives the level from XP through the [`LevelTable`] and logs a warning
//! when the cached value disagrees. Level history is an append-only list of
//! [`LevelRecord`]s, one per level gained.
//!
//! # Awards
//!
//! [`XpEngine::add_xp`] adds the amount, climbs every level row the new
//! total reaches (several at once for large awards), persists history,
//! level, and XP in that order, and returns an [`XpEvent`] describing the
//! change. XP and level never decrease outside of [`XpEngine::reset`].
//!
//! The XP write commits the award. If any earlier write fails the award
//! returns an error with XP unchanged, and a retry neither double-counts
//! XP nor duplicates history records.
//!
//! Each award is also appended to a capped audit log. The log is
//! best-effort: failing to write it never fails the award.

use chrono::Utc;
use trail_store::{Blobs, keys};
use trail_types::{
    AchievementId, LevelRecord, PointId, RewardKind, UserStats, XpDetails, XpEvent, XpEventId,
    XpSummary,
};

use crate::error::ProgressError;
use crate::levels::LevelTable;
use crate::math::percentage;
use crate::rewards::RewardTable;

/// Default number of XP events kept in the audit log.
pub const DEFAULT_LOG_CAPACITY: usize = 200;

/// XP state as loaded from the store, with the level already derived.
#[derive(Debug, Clone, PartialEq, Eq)]
struct XpState {
    xp: u64,
    level: u32,
    history: Vec<LevelRecord>,
}

/// Owns XP, level, level history, and the XP audit log.
#[derive(Debug, Clone)]
pub struct XpEngine {
    blobs: Blobs,
    table: LevelTable,
    rewards: RewardTable,
    log_capacity: usize,
}

impl XpEngine {
    /// Build an engine over `blobs`.
    ///
    /// A `log_capacity` of 0 disables the audit log.
    pub const fn new(
        blobs: Blobs,
        table: LevelTable,
        rewards: RewardTable,
        log_capacity: usize,
    ) -> Self {
        Self {
            blobs,
            table,
            rewards,
            log_capacity,
        }
    }

    /// The level table in use.
    pub const fn table(&self) -> &LevelTable {
        &self.table
    }

    /// The reward table in use.
    pub const fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current XP, level, and history, or level-1 defaults if the store
    /// cannot be read.
    pub async fn get_stats(&self) -> UserStats {
        let state = match self.load().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read XP state, reporting defaults");
                self.empty_state()
            }
        };
        self.stats_from(state)
    }

    /// Compact XP summary for headers and profile cards.
    pub async fn get_summary(&self) -> XpSummary {
        let stats = self.get_stats().await;
        XpSummary {
            all_time_xp: stats.xp,
            current_level: stats.level,
            level_title: stats.level_info.title,
            level_color: stats.level_info.color,
            next_level: stats.next_level_info.map(|info| info.level),
            xp_to_next_level: stats.xp_to_next_level,
            progress_percentage: stats.progress_to_next_level,
            is_max_level: stats.is_max_level,
            total_levels: self.table.total_levels(),
        }
    }

    /// Up to `limit` logged XP events, newest first.
    pub async fn get_log(&self, limit: usize) -> Vec<XpEvent> {
        match self.blobs.read_json::<Vec<XpEvent>>(keys::XP_LOG).await {
            Ok(log) => log.unwrap_or_default().into_iter().rev().take(limit).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read XP log, reporting none");
                Vec::new()
            }
        }
    }

    // =========================================================================
    // Awards
    // =========================================================================

    /// Add `amount` XP, climbing any levels the new total reaches.
    ///
    /// An amount of 0 is a valid award that changes nothing but is still
    /// recorded.
    pub(crate) async fn add_xp(
        &self,
        amount: u32,
        reason: &str,
        details: XpDetails,
    ) -> Result<XpEvent, ProgressError> {
        let state = self.load().await?;

        let new_xp = state.xp.checked_add(u64::from(amount)).ok_or_else(|| {
            ProgressError::ArithmeticOverflow {
                context: format!("adding {amount} XP to {}", state.xp),
            }
        })?;

        let now = Utc::now();
        let gained_levels: Vec<LevelRecord> = self
            .table
            .climb(state.level, new_xp)
            .into_iter()
            .map(|info| LevelRecord::reached(info, now))
            .collect();
        let new_level = gained_levels.last().map_or(state.level, |record| record.level);

        // XP is written last and commits the award. History only takes
        // levels above the last recorded one.
        if !gained_levels.is_empty() {
            let recorded_up_to = state
                .history
                .last()
                .map_or(self.table.first().level, |record| record.level);
            let mut history = state.history;
            let before = history.len();
            history.extend(
                gained_levels
                    .iter()
                    .filter(|record| record.level > recorded_up_to)
                    .cloned(),
            );
            if history.len() > before {
                self.blobs.write_json(keys::LEVEL_HISTORY, &history).await?;
            }
        }
        self.blobs
            .write_counter(keys::USER_LEVEL, u64::from(new_level))
            .await?;
        self.blobs.write_counter(keys::USER_XP, new_xp).await?;

        if !gained_levels.is_empty() {
            tracing::info!(
                from = state.level,
                to = new_level,
                xp = new_xp,
                "level up"
            );
        }

        let event = XpEvent {
            id: XpEventId::new(),
            amount,
            reason: reason.to_owned(),
            details,
            timestamp: now.timestamp_millis(),
            new_xp,
            new_level,
            levels_gained: u32::try_from(gained_levels.len()).unwrap_or(u32::MAX),
            gained_levels,
        };
        tracing::debug!(amount, reason, xp = new_xp, level = new_level, "XP awarded");

        self.append_to_log(&event).await;
        Ok(event)
    }

    /// Award `kind` from the reward table with the given details.
    pub(crate) async fn award(
        &self,
        kind: RewardKind,
        details: XpDetails,
    ) -> Result<XpEvent, ProgressError> {
        self.add_xp(self.rewards.amount(kind), kind.reason(), details)
            .await
    }

    /// Award the point-visit reward.
    pub(crate) async fn add_xp_for_point_visit(
        &self,
        point_id: PointId,
        point_title: String,
    ) -> Result<XpEvent, ProgressError> {
        self.award(
            RewardKind::VisitPoint,
            XpDetails::PointVisit {
                point_id,
                point_title,
            },
        )
        .await
    }

    /// Award the achievement reward.
    pub(crate) async fn add_xp_for_achievement(
        &self,
        achievement_id: AchievementId,
        achievement_title: String,
    ) -> Result<XpEvent, ProgressError> {
        self.award(
            RewardKind::Achievement,
            XpDetails::Achievement {
                achievement_id,
                achievement_title,
            },
        )
        .await
    }

    /// Award the photo reward.
    pub(crate) async fn add_xp_for_photo(
        &self,
        point_id: PointId,
        photo_id: String,
    ) -> Result<XpEvent, ProgressError> {
        self.award(RewardKind::TakePhoto, XpDetails::Photo { point_id, photo_id })
            .await
    }

    /// Award the comment reward.
    pub(crate) async fn add_xp_for_comment(
        &self,
        point_id: PointId,
        comment_id: String,
    ) -> Result<XpEvent, ProgressError> {
        self.award(
            RewardKind::AddComment,
            XpDetails::Comment {
                point_id,
                comment_id,
            },
        )
        .await
    }

    /// Clear XP, level, history, and the audit log.
    pub(crate) async fn reset(&self) -> Result<(), ProgressError> {
        for key in keys::XP_KEYS {
            self.blobs.remove(key).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn load(&self) -> Result<XpState, ProgressError> {
        let (xp, cached_level, history) = tokio::try_join!(
            self.blobs.read_counter(keys::USER_XP),
            self.blobs.read_counter(keys::USER_LEVEL),
            self.blobs.read_json::<Vec<LevelRecord>>(keys::LEVEL_HISTORY),
        )?;
        let xp = xp.unwrap_or(0);
        let level = self.table.level_for_xp(xp).level;
        if cached_level.is_some_and(|cached| cached != u64::from(level)) {
            tracing::warn!(
                cached = ?cached_level,
                derived = level,
                xp,
                "cached level disagrees with XP"
            );
        }
        Ok(XpState {
            xp,
            level,
            history: history.unwrap_or_default(),
        })
    }

    fn empty_state(&self) -> XpState {
        XpState {
            xp: 0,
            level: self.table.first().level,
            history: Vec::new(),
        }
    }

    fn stats_from(&self, state: XpState) -> UserStats {
        let level_info = self.table.info(state.level).clone();
        let next_level_info = self.table.next_after(state.level).cloned();
        let (xp_to_next_level, progress_to_next_level) = match &next_level_info {
            Some(next) => (
                next.xp_required.saturating_sub(state.xp),
                percentage(
                    state.xp.saturating_sub(level_info.xp_required),
                    next.xp_required.saturating_sub(level_info.xp_required),
                ),
            ),
            None => (0, 100),
        };
        let max_level = self.table.max_level();
        UserStats {
            xp: state.xp,
            level: state.level,
            level_info,
            next_level_info,
            xp_to_next_level,
            progress_to_next_level,
            level_history: state.history,
            max_level,
            is_max_level: state.level >= max_level,
        }
    }

    async fn append_to_log(&self, event: &XpEvent) {
        if self.log_capacity == 0 {
            return;
        }
        let mut log = match self.blobs.read_json::<Vec<XpEvent>>(keys::XP_LOG).await {
            Ok(log) => log.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read XP log, skipping entry");
                return;
            }
        };
        log.push(event.clone());
        let excess = log.len().saturating_sub(self.log_capacity);
        log.drain(..excess);
        if let Err(e) = self.blobs.write_json(keys::XP_LOG, &log).await {
            tracing::warn!(error = %e, "failed to write XP log entry");
        }
    }
}
