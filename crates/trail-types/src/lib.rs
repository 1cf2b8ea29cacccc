//! Shared type definitions for the trail progress engine.
//!
//! This crate is the single source of truth for the records that cross the
//! boundary between the progress engine and the app's UI layer. Types flow
//! downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Point, achievement, and XP event identifiers
//! - [`enums`] -- Reward kinds and threshold matching modes
//! - [`structs`] -- Levels, progress, XP events, stats, and visit outcomes

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{RewardKind, ThresholdMode};
pub use ids::{AchievementId, PointId, XpEventId};
pub use structs::{
    AchievementDetails, LevelInfo, LevelRecord, Progress, RewardPreview, UserStats, VisitOutcome,
    XpDetails, XpEvent, XpSummary,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Calling export_all writes the `.ts` files into `bindings/`
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::XpEventId::export_all();
        let _ = crate::ids::PointId::export_all();
        let _ = crate::ids::AchievementId::export_all();

        // Enums
        let _ = crate::enums::RewardKind::export_all();
        let _ = crate::enums::ThresholdMode::export_all();

        // Structs
        let _ = crate::structs::LevelInfo::export_all();
        let _ = crate::structs::LevelRecord::export_all();
        let _ = crate::structs::Progress::export_all();
        let _ = crate::structs::XpDetails::export_all();
        let _ = crate::structs::XpEvent::export_all();
        let _ = crate::structs::UserStats::export_all();
        let _ = crate::structs::XpSummary::export_all();
        let _ = crate::structs::AchievementDetails::export_all();
        let _ = crate::structs::RewardPreview::export_all();
        let _ = crate::structs::VisitOutcome::export_all();
    }
}
