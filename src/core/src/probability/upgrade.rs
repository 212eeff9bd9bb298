use crate::error::EngineError;
use crate::goal::Goal;
use crate::parent::{pair_lineage, Parent, ParentPool};
use crate::probability::{
    convolve, mass_above, point_mass, AcquisitionParams, Distribution, SparkAcquisitionModel,
};
use crate::reference::{SkillCategory, SkillRef, SkillTable};
use crate::scoring::{ScoreCalculator, StarOdds, TrainingRank, APTITUDE_BASE};
use crate::spark::{AptitudeKind, StarLevel, StatKind};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Target stat values the trainee is expected to finish with, keyed by
/// stat category. Missing categories count as 0.
pub type TargetStats = BTreeMap<StatKind, u32>;

/// Estimator assumptions. None of these are verified game formulas;
/// product owners asked for them to stay tunable.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeParams {
    /// Assumed number of aptitudes a finished run can hold at rank A.
    pub assumed_max_aptitudes: f64,
    /// Score bonus per acquired skill spark applied to a run's outcome.
    pub count_score_bonus: f64,
    pub acquisition: AcquisitionParams,
}

impl Default for UpgradeParams {
    fn default() -> Self {
        UpgradeParams {
            assumed_max_aptitudes: 5.0,
            count_score_bonus: 0.01,
            acquisition: AcquisitionParams::default(),
        }
    }
}

/// Probabilities that a future run beats the current pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeOutcome {
    /// P(new individual score > the weaker parent's individual score).
    pub score_upgrade: f64,
    /// P(new regular spark count > the weaker parent's spark count).
    pub count_upgrade: f64,
    pub target_score: i64,
    pub target_count: u32,
}

/// Forecasts how likely a breeding run is to out-score the current
/// baseline, by convolving independent per-category score distributions.
pub struct UpgradeEstimator;

impl UpgradeEstimator {
    #[allow(clippy::too_many_arguments)]
    pub fn calculate(
        p1: &Parent,
        p2: &Parent,
        goal: &Goal,
        target_stats: &TargetStats,
        rank: TrainingRank,
        table: &SkillTable,
        pool: &ParentPool,
        sp_budget: i64,
        acquirable: &BTreeSet<String>,
        conditional: &BTreeSet<String>,
        target_aptitudes: &[AptitudeKind],
        params: UpgradeParams,
    ) -> Result<UpgradeOutcome, EngineError> {
        let odds = StarOdds::for_rank(rank);

        let target_score = ScoreCalculator::individual(p1, goal, pool, table, odds)
            .round()
            .min(ScoreCalculator::individual(p2, goal, pool, table, odds).round())
            as i64;
        let target_count = p1.skill_sparks.len().min(p2.skill_sparks.len()) as u32;

        let stat_dist = stat_distribution(goal, target_stats);
        let aptitude_dist = aptitude_distribution(goal, odds, target_aptitudes, &params);
        let skill_dist =
            skill_distribution(p1, p2, goal, odds, table, pool, acquirable, params.acquisition);

        let acquisition = SparkAcquisitionModel::distributions(
            p1,
            p2,
            goal,
            sp_budget,
            table,
            acquirable,
            conditional,
            pool,
            params.acquisition,
        )?;
        let count_dist = acquisition.combined();

        let base = convolve(&stat_dist, &aptitude_dist);

        // Weight the score distribution by how many skill sparks the run
        // acquires: one more convolution with the skill mixture per spark,
        // extended incrementally as counts ascend.
        let mut final_dist = Distribution::new();
        let mut rolling = base;
        let mut rolled = 0i64;

        for (&count, &count_prob) in &count_dist {
            for _ in rolled..count {
                rolling = convolve(&rolling, &skill_dist);
            }
            rolled = rolled.max(count);

            if count_prob == 0.0 {
                continue;
            }

            let bonus = 1.0 + count as f64 * params.count_score_bonus;
            for (&score, &prob) in &rolling {
                *final_dist
                    .entry((score as f64 * bonus).round() as i64)
                    .or_insert(0.0) += prob * count_prob;
            }
        }

        debug!(
            "upgrade forecast: {} outcome scores, baseline {}",
            final_dist.len(),
            target_score
        );

        Ok(UpgradeOutcome {
            score_upgrade: mass_above(&final_dist, target_score),
            count_upgrade: mass_above(&count_dist, target_count as i64),
            target_score,
            target_count,
        })
    }
}

/// Star odds for one stat category given its target value.
fn stat_star_odds(target: u32) -> StarOdds {
    if target >= 1100 {
        StarOdds {
            one: 0.40,
            two: 0.50,
            three: 0.10,
        }
    } else if target >= 600 {
        StarOdds {
            one: 0.44,
            two: 0.50,
            three: 0.06,
        }
    } else {
        StarOdds {
            one: 0.50,
            two: 0.50,
            three: 0.00,
        }
    }
}

/// Score-contribution distribution of the run's single stat spark. Each
/// of the five categories is equally likely; keys are the rounded scoring
/// delta versus the same category at one star.
fn stat_distribution(goal: &Goal, targets: &TargetStats) -> Distribution {
    let mut dist = Distribution::new();
    let weight = 1.0 / StatKind::ALL.len() as f64;

    for kind in StatKind::ALL {
        let odds = stat_star_odds(targets.get(&kind).copied().unwrap_or(0));
        let floor = ScoreCalculator::stat_contribution(kind, StarLevel::One, goal).round() as i64;

        for stars in StarLevel::ALL {
            let prob = weight * odds.chance(stars);
            if prob == 0.0 {
                continue;
            }

            let delta =
                ScoreCalculator::stat_contribution(kind, stars, goal).round() as i64 - floor;
            *dist.entry(delta).or_insert(0.0) += prob;
        }
    }

    dist
}

/// Score-contribution distribution of the run's single aptitude spark.
/// Mass splits between "matches a primary aptitude" and "anything else"
/// based on how many primaries are actually obtainable this run. The
/// "anything else" share is a synthetic non-primary spark, so the
/// remainder mass always lands somewhere even when every kind is primary.
fn aptitude_distribution(
    goal: &Goal,
    odds: StarOdds,
    target_aptitudes: &[AptitudeKind],
    params: &UpgradeParams,
) -> Distribution {
    let mut dist = Distribution::new();

    let obtainable = goal
        .primary_aptitudes
        .iter()
        .copied()
        .filter(|kind| target_aptitudes.contains(kind))
        .count();
    let primary_prob = (obtainable as f64 / params.assumed_max_aptitudes.max(1.0)).min(1.0);
    let other_prob = (1.0 - primary_prob).max(0.0);

    let primary_kind = goal
        .primary_aptitudes
        .iter()
        .copied()
        .find(|kind| target_aptitudes.contains(kind))
        .or(goal.primary_aptitudes.first().copied());

    for stars in StarLevel::ALL {
        if let Some(kind) = primary_kind {
            if primary_prob > 0.0 {
                *dist.entry(aptitude_delta(kind, stars, goal)).or_insert(0.0) +=
                    primary_prob * odds.chance(stars);
            }
        }
        if other_prob > 0.0 {
            *dist.entry(non_primary_delta(stars)).or_insert(0.0) +=
                other_prob * odds.chance(stars);
        }
    }

    if dist.is_empty() {
        return point_mass(0);
    }
    dist
}

fn aptitude_delta(kind: AptitudeKind, stars: StarLevel, goal: &Goal) -> i64 {
    let floor = ScoreCalculator::aptitude_contribution(kind, StarLevel::One, goal).round() as i64;
    ScoreCalculator::aptitude_contribution(kind, stars, goal).round() as i64 - floor
}

/// Delta of a non-primary aptitude spark versus one star. The 0.5
/// multiplier is the non-primary aptitude weight of the scoring model.
fn non_primary_delta(stars: StarLevel) -> i64 {
    let floor = (APTITUDE_BASE[StarLevel::One.index()] * 0.5).round() as i64;
    (APTITUDE_BASE[stars.index()] * 0.5).round() as i64 - floor
}

/// Mixture distribution of one acquired regular skill's score
/// contribution: skills weighted by their own acquire chance, stars by
/// the rank's odds. A skill that is not acquired contributes nothing, so
/// keys are full contributions rather than deltas.
#[allow(clippy::too_many_arguments)]
fn skill_distribution(
    p1: &Parent,
    p2: &Parent,
    goal: &Goal,
    odds: StarOdds,
    table: &SkillTable,
    pool: &ParentPool,
    acquirable: &BTreeSet<String>,
    params: AcquisitionParams,
) -> Distribution {
    let lineage = pair_lineage(p1, p2, pool);

    // Default pool: the distinct regular sparks already in the lineage.
    let skill_pool: Vec<&SkillRef> = if acquirable.is_empty() {
        let mut names = BTreeSet::new();
        for member in &lineage {
            for spark in member.skill_sparks {
                names.insert(spark.skill.as_str());
            }
        }
        names
            .into_iter()
            .filter_map(|name| table.get(name))
            .filter(|skill| skill.category == SkillCategory::Regular)
            .collect()
    } else {
        acquirable
            .iter()
            .filter_map(|name| table.get(name))
            .filter(|skill| skill.category == SkillCategory::Regular)
            .collect()
    };

    let weighted: Vec<(&SkillRef, f64)> = skill_pool
        .iter()
        .map(|skill| {
            (
                *skill,
                SparkAcquisitionModel::acquire_chance(skill, &lineage, table, params),
            )
        })
        .collect();

    let total: f64 = weighted.iter().map(|(_, chance)| chance).sum();
    if total <= 0.0 {
        return point_mass(0);
    }

    let mut dist = Distribution::new();
    for (skill, chance) in weighted {
        let weight = chance / total;
        for stars in StarLevel::ALL {
            let prob = weight * odds.chance(stars);
            if prob == 0.0 {
                continue;
            }

            let score = ScoreCalculator::skill_contribution(
                &skill.name,
                stars,
                SkillCategory::Regular,
                goal,
                table,
                odds,
                &[],
            )
            .round() as i64;
            *dist.entry(score).or_insert(0.0) += prob;
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{WishlistItem, WishlistTier};
    use crate::parent::ParentId;
    use crate::reference::{CharacterId, GroupId, SkillRarity};
    use crate::spark::{AptitudeSpark, SkillSpark, StatSpark};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn goal() -> Goal {
        Goal {
            primary_stats: [StatKind::Speed, StatKind::Stamina],
            secondary_stat: StatKind::Power,
            primary_aptitudes: vec![AptitudeKind::Turf, AptitudeKind::Medium],
            signature_wishlist: vec![],
            skill_wishlist: vec![WishlistItem {
                skill: String::from("Corner Recovery"),
                tier: WishlistTier::A,
            }],
        }
    }

    fn table() -> SkillTable {
        SkillTable::new(vec![SkillRef {
            name: String::from("Corner Recovery"),
            category: SkillCategory::Regular,
            rarity: SkillRarity::Normal,
            group: Some(GroupId(1)),
            base_cost: Some(120),
        }])
    }

    fn parent(id: u32, skills: Vec<&str>) -> Parent {
        Parent {
            id: ParentId(id),
            character: CharacterId(1000 + id),
            name: format!("Parent {id}"),
            generation: 1,
            stat_spark: StatSpark {
                kind: StatKind::Speed,
                stars: StarLevel::Two,
            },
            aptitude_spark: AptitudeSpark {
                kind: AptitudeKind::Turf,
                stars: StarLevel::One,
            },
            signature_sparks: vec![],
            skill_sparks: skills
                .into_iter()
                .map(|name| SkillSpark {
                    skill: String::from(name),
                    stars: StarLevel::One,
                })
                .collect(),
            ancestor1: None,
            ancestor2: None,
        }
    }

    #[test]
    fn stat_distribution_conserves_mass() {
        let mut targets = TargetStats::new();
        targets.insert(StatKind::Speed, 1200);
        targets.insert(StatKind::Stamina, 800);

        let total: f64 = stat_distribution(&goal(), &targets).values().sum();
        assert!(close(total, 1.0));
    }

    #[test]
    fn aptitude_distribution_conserves_mass() {
        let dist = aptitude_distribution(
            &goal(),
            StarOdds::STANDARD,
            &[AptitudeKind::Turf, AptitudeKind::Mile],
            &UpgradeParams::default(),
        );
        let total: f64 = dist.values().sum();
        assert!(close(total, 1.0));
    }

    #[test]
    fn aptitude_distribution_with_every_kind_primary_keeps_full_mass() {
        let mut goal = goal();
        goal.primary_aptitudes = AptitudeKind::ALL.to_vec();

        // One of five assumed slots obtainable: 0.2 primary, 0.8 other,
        // with no real non-primary kind left to carry the remainder.
        let dist = aptitude_distribution(
            &goal,
            StarOdds::STANDARD,
            &[AptitudeKind::Turf],
            &UpgradeParams::default(),
        );
        let total: f64 = dist.values().sum();
        assert!(close(total, 1.0));
    }

    #[test]
    fn aptitude_distribution_without_primaries_is_all_other() {
        let mut goal = goal();
        goal.primary_aptitudes.clear();

        let dist = aptitude_distribution(
            &goal,
            StarOdds::STANDARD,
            &[AptitudeKind::Turf],
            &UpgradeParams::default(),
        );
        let total: f64 = dist.values().sum();
        assert!(close(total, 1.0));
    }

    #[test]
    fn skill_distribution_empty_pool_is_point_mass() {
        let pool = ParentPool::new(vec![]);
        let p1 = parent(1, vec![]);
        let p2 = parent(2, vec![]);

        let dist = skill_distribution(
            &p1,
            &p2,
            &goal(),
            StarOdds::STANDARD,
            &table(),
            &pool,
            &BTreeSet::new(),
            AcquisitionParams::default(),
        );
        assert_eq!(dist, point_mass(0));
    }

    #[test]
    fn upgrade_probability_is_a_probability() {
        let pool = ParentPool::new(vec![]);
        let p1 = parent(1, vec!["Corner Recovery"]);
        let p2 = parent(2, vec!["Corner Recovery"]);
        let mut targets = TargetStats::new();
        targets.insert(StatKind::Speed, 1150);

        let outcome = UpgradeEstimator::calculate(
            &p1,
            &p2,
            &goal(),
            &targets,
            TrainingRank::Standard,
            &table(),
            &pool,
            600,
            &BTreeSet::new(),
            &BTreeSet::new(),
            &[AptitudeKind::Turf],
            UpgradeParams::default(),
        )
        .unwrap();

        assert!((0.0..=1.0).contains(&outcome.score_upgrade));
        assert!((0.0..=1.0).contains(&outcome.count_upgrade));
        assert_eq!(outcome.target_count, 1);
    }

    #[test]
    fn identical_inputs_yield_identical_forecasts() {
        let pool = ParentPool::new(vec![]);
        let p1 = parent(1, vec!["Corner Recovery"]);
        let p2 = parent(2, vec![]);
        let targets = TargetStats::new();

        let run = || {
            UpgradeEstimator::calculate(
                &p1,
                &p2,
                &goal(),
                &targets,
                TrainingRank::HighTier,
                &table(),
                &pool,
                300,
                &BTreeSet::new(),
                &BTreeSet::new(),
                &[],
                UpgradeParams::default(),
            )
            .unwrap()
        };

        assert_eq!(run(), run());
    }
}
