use crate::spark::{AptitudeKind, StatKind};
use serde::{Deserialize, Serialize};

/// Priority a user assigns to a wishlisted skill. S is the highest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WishlistTier {
    S,
    A,
    B,
    C,
}

impl WishlistTier {
    pub fn multiplier(self) -> f64 {
        match self {
            WishlistTier::S => 2.0,
            WishlistTier::A => 1.5,
            WishlistTier::B => 1.2,
            WishlistTier::C => 1.0,
        }
    }

    /// Sort key, 0 = highest priority.
    pub fn priority(self) -> u8 {
        match self {
            WishlistTier::S => 0,
            WishlistTier::A => 1,
            WishlistTier::B => 2,
            WishlistTier::C => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub skill: String,
    pub tier: WishlistTier,
}

/// User scoring preferences. Wishlist entries are unique by skill name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub primary_stats: [StatKind; 2],
    pub secondary_stat: StatKind,
    pub primary_aptitudes: Vec<AptitudeKind>,
    pub signature_wishlist: Vec<WishlistItem>,
    pub skill_wishlist: Vec<WishlistItem>,
}

impl Goal {
    /// 1.5 for primary stats, 1.2 for the secondary stat, 0.5 otherwise.
    /// Primary wins when a stat appears in both roles.
    pub fn stat_multiplier(&self, kind: StatKind) -> f64 {
        if self.primary_stats.contains(&kind) {
            1.5
        } else if self.secondary_stat == kind {
            1.2
        } else {
            0.5
        }
    }

    pub fn aptitude_multiplier(&self, kind: AptitudeKind) -> f64 {
        if self.primary_aptitudes.contains(&kind) {
            1.5
        } else {
            0.5
        }
    }

    pub fn signature_tier(&self, skill: &str) -> Option<WishlistTier> {
        self.signature_wishlist
            .iter()
            .find(|item| item.skill == skill)
            .map(|item| item.tier)
    }

    pub fn skill_tier(&self, skill: &str) -> Option<WishlistTier> {
        self.skill_wishlist
            .iter()
            .find(|item| item.skill == skill)
            .map(|item| item.tier)
    }
}
