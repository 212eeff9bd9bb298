use crate::goal::Goal;
use crate::parent::{AncestorView, Parent, ParentPool};
use crate::reference::{SkillCategory, SkillRarity, SkillTable};
use crate::spark::{AptitudeKind, StarLevel, StatKind};
use serde::{Deserialize, Serialize};

/// Base score per star level for stat sparks.
const STAT_BASE: [f64; 3] = [8.0, 15.0, 30.0];

/// Base score per star level for aptitude sparks.
pub const APTITUDE_BASE: [f64; 3] = [10.0, 17.0, 30.0];

/// Flat utility added to the dynamic base score of skill sparks.
const SKILL_FLAT_UTILITY: [f64; 3] = [7.0, 14.0, 21.0];

/// Weight of each ancestor's own total in the lineage score.
pub const ANCESTOR_SHARE: f64 = 0.5;

/// Acquisition chance multiplier per lineage member already carrying the
/// skill's exclusivity group.
pub const ANCESTOR_CHANCE_BONUS: f64 = 1.1;

/// Training run tier. Affects the per-star inheritance chance table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TrainingRank {
    #[default]
    Standard,
    HighTier,
}

/// Per-star inheritance chance table.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarOdds {
    pub one: f64,
    pub two: f64,
    pub three: f64,
}

impl StarOdds {
    pub const STANDARD: StarOdds = StarOdds {
        one: 0.50,
        two: 0.45,
        three: 0.05,
    };

    pub const HIGH_TIER: StarOdds = StarOdds {
        one: 0.20,
        two: 0.70,
        three: 0.10,
    };

    pub fn for_rank(rank: TrainingRank) -> StarOdds {
        match rank {
            TrainingRank::Standard => StarOdds::STANDARD,
            TrainingRank::HighTier => StarOdds::HIGH_TIER,
        }
    }

    pub fn chance(&self, stars: StarLevel) -> f64 {
        match stars {
            StarLevel::One => self.one,
            StarLevel::Two => self.two,
            StarLevel::Three => self.three,
        }
    }
}

impl Default for StarOdds {
    fn default() -> Self {
        StarOdds::STANDARD
    }
}

/// Deterministic utility scoring of breeding candidates against a goal.
/// Pure: identical inputs always produce identical output.
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Lineage score used for ranking: the entity's own total plus half of
    /// each resolved ancestor's own total. Ancestors are scored by the same
    /// model at recursion depth exactly one; rounding happens only here.
    pub fn calculate(
        parent: &Parent,
        goal: &Goal,
        pool: &ParentPool,
        skills: &SkillTable,
        odds: StarOdds,
    ) -> i64 {
        let mut total = Self::individual(parent, goal, pool, skills, odds);

        for ancestor in parent.ancestors(pool) {
            total += ANCESTOR_SHARE * Self::score_view(&ancestor, &[], goal, skills, odds);
        }

        total.round() as i64
    }

    /// The entity's own total over its own sparks only.
    pub fn individual(
        parent: &Parent,
        goal: &Goal,
        pool: &ParentPool,
        skills: &SkillTable,
        odds: StarOdds,
    ) -> f64 {
        let ancestors = parent.ancestors(pool);
        Self::score_view(&parent.as_view(), &ancestors, goal, skills, odds)
    }

    /// Score one lineage member. `ancestors` feeds the regular-skill
    /// acquisition bonus only; pass an empty slice when scoring an ancestor
    /// itself (their own ancestors are out of the model).
    pub fn score_view(
        view: &AncestorView<'_>,
        ancestors: &[AncestorView<'_>],
        goal: &Goal,
        skills: &SkillTable,
        odds: StarOdds,
    ) -> f64 {
        let mut total = Self::stat_contribution(view.stat_spark.kind, view.stat_spark.stars, goal);
        total += Self::aptitude_contribution(
            view.aptitude_spark.kind,
            view.aptitude_spark.stars,
            goal,
        );

        for spark in view.signature_sparks {
            total += Self::skill_contribution(
                &spark.skill,
                spark.stars,
                SkillCategory::Signature,
                goal,
                skills,
                odds,
                &[],
            );
        }

        for spark in view.skill_sparks {
            total += Self::skill_contribution(
                &spark.skill,
                spark.stars,
                SkillCategory::Regular,
                goal,
                skills,
                odds,
                ancestors,
            );
        }

        total
    }

    pub fn stat_contribution(kind: StatKind, stars: StarLevel, goal: &Goal) -> f64 {
        STAT_BASE[stars.index()] * goal.stat_multiplier(kind)
    }

    pub fn aptitude_contribution(kind: AptitudeKind, stars: StarLevel, goal: &Goal) -> f64 {
        APTITUDE_BASE[stars.index()] * goal.aptitude_multiplier(kind)
    }

    /// Dynamic skill spark score: rarer sparks are worth more because they
    /// are harder to reproduce. The base score is
    /// `round(sqrt(1 / acquisition_chance)) + flat_utility[stars]`, scaled
    /// by the wishlist tier multiplier. Unknown skills fall back to normal
    /// rarity with no exclusivity group.
    pub fn skill_contribution(
        name: &str,
        stars: StarLevel,
        category: SkillCategory,
        goal: &Goal,
        skills: &SkillTable,
        odds: StarOdds,
        ancestors: &[AncestorView<'_>],
    ) -> f64 {
        let skill = skills.get(name);
        let rarity = skill.map_or(SkillRarity::Normal, |skill| skill.rarity);
        let group = skill.and_then(|skill| skill.group);

        let mut chance = rarity.base_chance() * odds.chance(stars);

        // The ancestor bonus applies to regular skills only.
        if category == SkillCategory::Regular {
            for ancestor in ancestors {
                if ancestor.carries_skill(name, group, skills) {
                    chance *= ANCESTOR_CHANCE_BONUS;
                }
            }
        }

        let chance = chance.min(1.0);
        let rarity_score = if chance > 0.0 {
            (1.0 / chance).sqrt().round()
        } else {
            0.0
        };

        let tier = match category {
            SkillCategory::Signature => goal.signature_tier(name),
            SkillCategory::Regular => goal.skill_tier(name),
        };
        let multiplier = tier.map_or(1.0, |tier| tier.multiplier());

        (rarity_score + SKILL_FLAT_UTILITY[stars.index()]) * multiplier
    }
}
