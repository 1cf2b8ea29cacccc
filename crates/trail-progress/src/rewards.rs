//! XP reward amounts.

use serde::{Deserialize, Serialize};
use trail_types::{RewardKind, RewardPreview};

/// XP for the first visit to a point.
pub const XP_VISIT_POINT: u32 = 50;
/// XP for a photo taken at a point.
pub const XP_TAKE_PHOTO: u32 = 25;
/// XP for a comment on a point.
pub const XP_ADD_COMMENT: u32 = 10;
/// XP for liking a photo.
pub const XP_LIKE_PHOTO: u32 = 5;
/// XP for scanning a point's QR code.
pub const XP_SCAN_QR: u32 = 30;
/// XP for studying a timeline era.
pub const XP_COMPLETE_TIMELINE: u32 = 100;
/// XP for the first app visit of a day.
pub const XP_DAILY_VISIT: u32 = 20;
/// XP for each unlocked achievement.
pub const XP_ACHIEVEMENT: u32 = 200;
/// XP for sharing a photo.
pub const XP_SHARE_PHOTO: u32 = 15;
/// XP for visiting every point of the trail.
pub const XP_COMPLETE_ALL_POINTS: u32 = 500;

/// Rewards listed on the "how to earn XP" screen, in display order.
const PREVIEW: [(RewardKind, &str); 5] = [
    (RewardKind::VisitPoint, "Visit a point"),
    (RewardKind::TakePhoto, "Take a photo"),
    (RewardKind::AddComment, "Add a comment"),
    (RewardKind::ScanQr, "Scan a QR code"),
    (RewardKind::Achievement, "Earn an achievement"),
];

/// XP awarded per [`RewardKind`].
///
/// Every field defaults to the shipped amount, so a config file only needs
/// to name the rewards it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTable {
    /// First visit to a point.
    pub visit_point: u32,
    /// Photo taken at a point.
    pub take_photo: u32,
    /// Comment on a point.
    pub add_comment: u32,
    /// Photo liked.
    pub like_photo: u32,
    /// QR code scanned.
    pub scan_qr: u32,
    /// Timeline era studied.
    pub complete_timeline: u32,
    /// First app visit of a day.
    pub daily_visit: u32,
    /// Achievement unlocked.
    pub achievement: u32,
    /// Photo shared.
    pub share_photo: u32,
    /// Every point visited.
    pub complete_all_points: u32,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            visit_point: XP_VISIT_POINT,
            take_photo: XP_TAKE_PHOTO,
            add_comment: XP_ADD_COMMENT,
            like_photo: XP_LIKE_PHOTO,
            scan_qr: XP_SCAN_QR,
            complete_timeline: XP_COMPLETE_TIMELINE,
            daily_visit: XP_DAILY_VISIT,
            achievement: XP_ACHIEVEMENT,
            share_photo: XP_SHARE_PHOTO,
            complete_all_points: XP_COMPLETE_ALL_POINTS,
        }
    }
}

impl RewardTable {
    /// XP for `kind`.
    pub const fn amount(&self, kind: RewardKind) -> u32 {
        match kind {
            RewardKind::VisitPoint => self.visit_point,
            RewardKind::TakePhoto => self.take_photo,
            RewardKind::AddComment => self.add_comment,
            RewardKind::LikePhoto => self.like_photo,
            RewardKind::ScanQr => self.scan_qr,
            RewardKind::CompleteTimeline => self.complete_timeline,
            RewardKind::DailyVisit => self.daily_visit,
            RewardKind::Achievement => self.achievement,
            RewardKind::SharePhoto => self.share_photo,
            RewardKind::CompleteAllPoints => self.complete_all_points,
        }
    }

    /// The rewards shown to users, with their current amounts.
    pub fn preview(&self) -> Vec<RewardPreview> {
        PREVIEW
            .iter()
            .map(|&(reward, action)| RewardPreview {
                reward,
                action: action.to_owned(),
                xp: self.amount(reward),
                icon: reward.icon().to_owned(),
            })
            .collect()
    }
}
