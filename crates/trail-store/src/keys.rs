//! Persisted key names.
//!
//! These names are shared with every installed copy of the app and must
//! never change. Each logical entity owns its own keys.
//!
//! | Key | Shape | Owner |
//! |-----|-------|-------|
//! | `@trailapp_visited_points` | JSON array of point ids | visit ledger |
//! | `@trailapp_total_progress` | decimal string (visited count) | visit ledger |
//! | `@trailapp_achievements` | JSON array of achievement ids | achievements |
//! | `@trailapp_user_xp` | decimal string or JSON integer | XP engine |
//! | `@trailapp_user_level` | decimal string or JSON integer | XP engine |
//! | `@trailapp_level_history` | JSON array of level records | XP engine |
//! | `@trailapp_xp_log` | JSON array of XP events | XP engine |

/// Visited point ids.
pub const VISITED_POINTS: &str = "@trailapp_visited_points";

/// Cached visited count, kept for readers that predate derived progress.
pub const TOTAL_PROGRESS: &str = "@trailapp_total_progress";

/// Unlocked achievement ids.
pub const ACHIEVEMENTS: &str = "@trailapp_achievements";

/// Total XP.
pub const USER_XP: &str = "@trailapp_user_xp";

/// Cached current level.
pub const USER_LEVEL: &str = "@trailapp_user_level";

/// Append-only level history.
pub const LEVEL_HISTORY: &str = "@trailapp_level_history";

/// Capped XP audit log.
pub const XP_LOG: &str = "@trailapp_xp_log";

/// Keys cleared together by a visit-progress reset.
pub const VISIT_KEYS: [&str; 3] = [VISITED_POINTS, TOTAL_PROGRESS, ACHIEVEMENTS];

/// Keys cleared together by an XP reset.
pub const XP_KEYS: [&str; 4] = [USER_XP, USER_LEVEL, LEVEL_HISTORY, XP_LOG];
