//! End-to-end scenarios for the progress façade over an in-memory store.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing
)]

use std::sync::Arc;
use std::time::Duration;

use trail_progress::{AchievementRule, ProgressConfig, ProgressError, ProgressStore};
use trail_store::{Blobs, MemoryStore, StoreBackend, keys};
use trail_types::{AchievementId, PointId};

fn blobs(store: &MemoryStore) -> Blobs {
    Blobs::new(StoreBackend::Memory(store.clone()), Duration::from_millis(500))
}

fn shipped(store: &MemoryStore, total_points: u32) -> ProgressStore {
    ProgressStore::new(blobs(store), total_points)
}

/// The shipped configuration without the notable-point rules.
fn count_rules_only(store: &MemoryStore, total_points: u32) -> ProgressStore {
    let mut config = ProgressConfig::default();
    config
        .achievements
        .rules
        .retain(|rule| matches!(rule, AchievementRule::VisitCount { .. }));
    ProgressStore::from_config(blobs(store), &config, total_points).unwrap()
}

fn ids(list: &[&str]) -> Vec<AchievementId> {
    list.iter().map(|&id| AchievementId::new(id)).collect()
}

// ---------------------------------------------------------------------------
// Visits, achievements, XP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn three_visits_with_count_rules() {
    let store = MemoryStore::new();
    let progress = count_rules_only(&store, 5);

    let first = progress.visit_point(PointId::from(1), "Point 1").await.unwrap();
    assert!(first.is_new_visit);
    assert_eq!(first.new_achievements, ids(&["first_point"]));
    assert_eq!(progress.get_user_stats().await.xp, 250);

    let second = progress.visit_point(PointId::from(2), "Point 2").await.unwrap();
    assert!(second.new_achievements.is_empty());
    assert_eq!(second.total_xp(), 50);

    let third = progress.visit_point(PointId::from(3), "Point 3").await.unwrap();
    assert_eq!(third.new_achievements, ids(&["half_way"]));

    let state = progress.get_progress(5).await;
    assert_eq!(state.visited_count, 3);
    assert_eq!(state.percentage, 60);
    assert_eq!(progress.get_user_stats().await.xp, 550);
}

#[tokio::test]
async fn notable_first_point_unlocks_two_achievements() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 5);

    let outcome = progress.visit_point(PointId::from(1), "Городище").await.unwrap();
    assert_eq!(
        outcome.new_achievements,
        ids(&["first_point", "ancient_settlement"])
    );
    assert_eq!(outcome.xp_events.len(), 3);

    let stats = progress.get_user_stats().await;
    assert_eq!(stats.xp, 450);
    assert_eq!(stats.level, 3);
    let history: Vec<u32> = stats.level_history.iter().map(|r| r.level).collect();
    assert_eq!(history, vec![2, 3]);
}

#[tokio::test]
async fn repeat_visit_changes_nothing() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 5);

    progress.visit_point(PointId::from(1), "Point 1").await.unwrap();
    let before = store.snapshot().await;

    let again = progress.visit_point(PointId::from(1), "Point 1").await.unwrap();
    assert!(!again.is_new_visit);
    assert!(again.new_achievements.is_empty());
    assert!(again.xp_events.is_empty());
    assert_eq!(store.snapshot().await, before);
    assert_eq!(progress.get_visited_points().await, vec![PointId::from(1)]);
}

#[tokio::test]
async fn full_walk_of_the_shipped_trail() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 5);

    for point in 1..=5_u64 {
        let outcome = progress
            .visit_point(PointId::from(point), &format!("Point {point}"))
            .await
            .unwrap();
        assert!(outcome.is_new_visit);
        let expected_percentage = if point == 5 { 100 } else { point * 20 };
        assert_eq!(
            u64::from(progress.get_progress(5).await.percentage),
            expected_percentage
        );
    }

    assert_eq!(
        progress.get_achievements().await,
        ids(&[
            "first_point",
            "ancient_settlement",
            "half_way",
            "all_points",
            "church_complex"
        ])
    );

    let stats = progress.get_user_stats().await;
    assert_eq!(stats.xp, 1250);
    assert_eq!(stats.level, 5);
    let history: Vec<u32> = stats.level_history.iter().map(|r| r.level).collect();
    assert_eq!(history, vec![2, 3, 4, 5]);

    let summary = progress.get_xp_stats().await;
    assert_eq!(summary.level_title, "Профессор истории");
    assert_eq!(summary.next_level, Some(6));
    assert_eq!(summary.xp_to_next_level, 250);
    assert_eq!(summary.progress_percentage, 50);
}

#[tokio::test]
async fn empty_trail_reports_zero_percent() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 0);
    assert_eq!(progress.get_progress(0).await.percentage, 0);

    let outcome = progress.visit_point(PointId::from(9), "Detached").await.unwrap();
    assert_eq!(outcome.new_achievements, ids(&["first_point"]));
    assert_eq!(progress.get_progress(0).await.percentage, 0);
}

#[tokio::test]
async fn named_point_ids_work_alongside_numeric_ones() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 3);
    progress.visit_point(PointId::from("bridge"), "Bridge").await.unwrap();
    progress.visit_point(PointId::from(2), "Point 2").await.unwrap();
    assert_eq!(
        store.peek(keys::VISITED_POINTS).await.as_deref(),
        Some(r#"["bridge",2]"#)
    );
}

// ---------------------------------------------------------------------------
// Persisted shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn persisted_blobs_keep_the_installed_format() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 5);
    progress.visit_point(PointId::from(1), "Point 1").await.unwrap();

    assert_eq!(store.peek(keys::VISITED_POINTS).await.as_deref(), Some("[1]"));
    assert_eq!(store.peek(keys::TOTAL_PROGRESS).await.as_deref(), Some("1"));
    assert_eq!(
        store.peek(keys::ACHIEVEMENTS).await.as_deref(),
        Some(r#"["first_point","ancient_settlement"]"#)
    );
    assert_eq!(store.peek(keys::USER_XP).await.as_deref(), Some("450"));
    assert_eq!(store.peek(keys::USER_LEVEL).await.as_deref(), Some("3"));

    let history: serde_json::Value =
        serde_json::from_str(&store.peek(keys::LEVEL_HISTORY).await.unwrap()).unwrap();
    let first = &history[0];
    assert_eq!(first["level"], 2);
    assert_eq!(first["title"], "Исследователь");
    assert!(first["achievedAt"].is_i64());
}

#[tokio::test]
async fn continues_from_existing_install_data() {
    let store = MemoryStore::with_entries([
        (keys::VISITED_POINTS, "[1,2]"),
        (keys::ACHIEVEMENTS, r#"["first_point","ancient_settlement"]"#),
        (keys::USER_XP, "500"),
        (keys::USER_LEVEL, "3"),
    ]);
    let progress = shipped(&store, 5);

    let outcome = progress.visit_point(PointId::from(3), "Point 3").await.unwrap();
    assert_eq!(outcome.new_achievements, ids(&["half_way"]));
    let stats = progress.get_user_stats().await;
    assert_eq!(stats.xp, 750);
    assert_eq!(stats.level, 4);
}

#[tokio::test]
async fn xp_log_lists_newest_award_first() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 5);
    progress.visit_point(PointId::from(1), "Point 1").await.unwrap();

    let log = progress.get_xp_log(10).await;
    let amounts: Vec<u32> = log.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![200, 200, 50]);
    assert_eq!(log.first().map(|e| e.new_xp), Some(450));
    assert_eq!(progress.get_xp_log(1).await.len(), 1);
}

// ---------------------------------------------------------------------------
// Batch import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_awards_every_new_point_and_crossed_threshold() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 5);

    let points = vec![
        (PointId::from(1), "Point 1".to_owned()),
        (PointId::from(2), "Point 2".to_owned()),
        (PointId::from(3), "Point 3".to_owned()),
        (PointId::from(3), "Point 3 again".to_owned()),
    ];
    let outcome = progress.import_visits(&points).await.unwrap();
    assert!(outcome.is_new_visit);
    assert_eq!(
        outcome.new_achievements,
        ids(&["first_point", "half_way", "ancient_settlement"])
    );
    assert_eq!(outcome.total_xp(), 750);
    assert_eq!(progress.get_user_stats().await.level, 4);

    let again = progress.import_visits(&points).await.unwrap();
    assert!(!again.is_new_visit);
    assert!(again.xp_events.is_empty());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_write_is_reported_and_nothing_is_committed() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 5);
    store.fail_writes(true);

    let err = progress
        .visit_point(PointId::from(1), "Point 1")
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressError::Store(_)));
    assert!(err.is_transient());

    store.fail_writes(false);
    assert!(store.snapshot().await.is_empty());
    // The visit can be retried once the store recovers.
    let outcome = progress.visit_point(PointId::from(1), "Point 1").await.unwrap();
    assert!(outcome.is_new_visit);
}

#[tokio::test]
async fn unreadable_store_gives_defaults_to_readers_and_errors_to_writers() {
    let store = MemoryStore::with_entries([
        (keys::VISITED_POINTS, "[1,2]"),
        (keys::USER_XP, "500"),
    ]);
    let progress = shipped(&store, 5);
    store.fail_reads(true);

    assert_eq!(progress.get_progress(5).await.visited_count, 0);
    assert!(progress.get_achievements().await.is_empty());
    assert_eq!(progress.get_user_stats().await.xp, 0);
    assert!(progress.get_xp_log(5).await.is_empty());

    assert!(progress.visit_point(PointId::from(3), "Point 3").await.is_err());
    store.fail_reads(false);
    assert_eq!(store.peek(keys::VISITED_POINTS).await.as_deref(), Some("[1,2]"));
}

#[tokio::test]
async fn stalled_store_times_out() {
    let store = MemoryStore::new();
    let progress = ProgressStore::new(
        Blobs::new(StoreBackend::Memory(store.clone()), Duration::from_millis(20)),
        5,
    );
    store.stall(true);
    let err = progress
        .visit_point(PointId::from(1), "Point 1")
        .await
        .unwrap_err();
    assert!(err.is_transient());
}

// ---------------------------------------------------------------------------
// Resets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reset_on_empty_store_is_a_no_op() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 5);
    progress.reset_visits().await.unwrap();
    progress.reset_xp().await.unwrap();
    progress.reset_all().await.unwrap();
    assert!(store.snapshot().await.is_empty());
}

#[tokio::test]
async fn resets_clear_their_own_subsystem() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 5);
    progress.visit_point(PointId::from(1), "Point 1").await.unwrap();

    progress.reset_visits().await.unwrap();
    assert!(progress.get_visited_points().await.is_empty());
    assert!(progress.get_achievements().await.is_empty());
    assert_eq!(progress.get_user_stats().await.xp, 450);

    progress.reset_xp().await.unwrap();
    let stats = progress.get_user_stats().await;
    assert_eq!(stats.xp, 0);
    assert_eq!(stats.level, 1);
    assert!(stats.level_history.is_empty());
    assert!(store.snapshot().await.is_empty());

    // After a reset the first point unlocks again.
    let outcome = progress.visit_point(PointId::from(1), "Point 1").await.unwrap();
    assert_eq!(
        outcome.new_achievements,
        ids(&["first_point", "ancient_settlement"])
    );
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn counts_and_levels_never_decrease() {
    let store = MemoryStore::new();
    let progress = shipped(&store, 8);
    let table = progress.level_table().clone();

    let mut last_visited = 0;
    let mut last_xp = 0;
    let mut last_level = 1;
    let mut last_unlocked = 0;

    for point in [3_u64, 3, 7, 1, 8, 7, 2, 5, 5, 6, 4] {
        progress
            .visit_point(PointId::from(point), "Point")
            .await
            .unwrap();
        progress.grant_manual(15, "bonus").await.unwrap();

        let visited = progress.get_progress(8).await.visited_count;
        let stats = progress.get_user_stats().await;
        let unlocked = progress.get_achievements().await.len();

        assert!(visited >= last_visited);
        assert!(stats.xp >= last_xp);
        assert!(stats.level >= last_level);
        assert!(unlocked >= last_unlocked);
        assert_eq!(stats.level, table.level_for_xp(stats.xp).level);

        last_visited = visited;
        last_xp = stats.xp;
        last_level = stats.level;
        last_unlocked = unlocked;
    }
    assert_eq!(last_visited, 8);
    assert_eq!(progress.get_progress(8).await.percentage, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_visits_lose_no_updates() {
    let store = MemoryStore::new();
    let progress = Arc::new(shipped(&store, 5));

    let handles: Vec<_> = (1..=5_u64)
        .map(|point| {
            let progress = Arc::clone(&progress);
            tokio::spawn(async move {
                progress
                    .visit_point(PointId::from(point), &format!("Point {point}"))
                    .await
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_new_visit);
    }

    assert_eq!(progress.get_progress(5).await.visited_count, 5);
    assert_eq!(progress.get_achievements().await.len(), 5);
    assert_eq!(progress.get_user_stats().await.xp, 1250);
}
