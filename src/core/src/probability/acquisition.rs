use crate::error::EngineError;
use crate::goal::Goal;
use crate::parent::{pair_lineage, AncestorView, Parent, ParentPool};
use crate::probability::{bernoulli, convolve, point_mass, Distribution};
use crate::reference::{SkillCategory, SkillRef, SkillTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tunable acquisition assumptions. The ancestor bonus is an observed
/// approximation, not a verified game formula, hence configurable.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionParams {
    pub ancestor_bonus: f64,
}

impl Default for AcquisitionParams {
    fn default() -> Self {
        AcquisitionParams { ancestor_bonus: 1.1 }
    }
}

/// Count distributions for a future run: skills learned for free through
/// events, and skills purchased from the skill-point budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionDistributions {
    pub free: Distribution,
    pub purchased: Distribution,
}

impl AcquisitionDistributions {
    /// Joint distribution of the total acquired count.
    pub fn combined(&self) -> Distribution {
        convolve(&self.free, &self.purchased)
    }
}

struct Purchasable {
    chance: f64,
    cost: u32,
    priority: u8,
}

/// Per-skill acquisition probabilities for a breeding pair, aggregated
/// into count distributions.
pub struct SparkAcquisitionModel;

impl SparkAcquisitionModel {
    /// Base chance by rarity, multiplied by the ancestor bonus for every
    /// lineage member already carrying the skill's exclusivity group,
    /// capped at certainty.
    pub fn acquire_chance(
        skill: &SkillRef,
        lineage: &[AncestorView<'_>],
        table: &SkillTable,
        params: AcquisitionParams,
    ) -> f64 {
        let mut chance = skill.rarity.base_chance();

        for member in lineage {
            if member.carries_skill(&skill.name, skill.group, table) {
                chance *= params.ancestor_bonus;
            }
        }

        chance.min(1.0)
    }

    /// Build both count distributions. A negative budget is a caller
    /// contract violation; empty skill pools yield a point mass at zero.
    pub fn distributions(
        p1: &Parent,
        p2: &Parent,
        goal: &Goal,
        sp_budget: i64,
        table: &SkillTable,
        acquirable: &BTreeSet<String>,
        conditional: &BTreeSet<String>,
        pool: &ParentPool,
        params: AcquisitionParams,
    ) -> Result<AcquisitionDistributions, EngineError> {
        if sp_budget < 0 {
            return Err(EngineError::NegativeBudget(sp_budget));
        }
        let budget = sp_budget as u32;
        let lineage = pair_lineage(p1, p2, pool);

        // Free skills: independent Bernoulli trials folded together.
        let mut free = point_mass(0);
        for name in conditional {
            if let Some(skill) = table.get(name) {
                let chance = Self::acquire_chance(skill, &lineage, table, params);
                free = convolve(&free, &bernoulli(chance));
            }
        }

        // Purchased skills: the acquirable set, or the wishlisted regular
        // skills when the caller supplies none.
        let mut candidates: Vec<Purchasable> = if acquirable.is_empty() {
            goal.skill_wishlist
                .iter()
                .filter_map(|item| table.get(&item.skill))
                .filter(|skill| skill.category == SkillCategory::Regular)
                .map(|skill| Purchasable {
                    chance: Self::acquire_chance(skill, &lineage, table, params),
                    cost: skill.cost(),
                    priority: goal
                        .skill_tier(&skill.name)
                        .map_or(u8::MAX, |tier| tier.priority()),
                })
                .collect()
        } else {
            acquirable
                .iter()
                .filter_map(|name| table.get(name))
                .filter(|skill| skill.category == SkillCategory::Regular)
                .map(|skill| Purchasable {
                    chance: Self::acquire_chance(skill, &lineage, table, params),
                    cost: skill.cost(),
                    priority: goal
                        .skill_tier(&skill.name)
                        .map_or(u8::MAX, |tier| tier.priority()),
                })
                .collect()
        };

        // Fixed purchase priority: wishlist tier, then acquire chance
        // descending, then cost ascending.
        candidates.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(b.chance.total_cmp(&a.chance))
                .then(a.cost.cmp(&b.cost))
        });

        let purchased = purchased_distribution(&candidates, budget);

        Ok(AcquisitionDistributions { free, purchased })
    }
}

/// Knapsack-style dynamic program over spent budget. Each state is
/// (spent, acquired-count) with its probability; every skill branches a
/// state into "missed" and, when still affordable, "bought". A state that
/// cannot afford the skill keeps its full mass on "missed", so the count
/// distribution always sums to 1. The final distribution marginalizes
/// over all reachable spends.
fn purchased_distribution(candidates: &[Purchasable], budget: u32) -> Distribution {
    let mut states: BTreeMap<u32, Distribution> = BTreeMap::new();
    states.insert(0, point_mass(0));

    for skill in candidates {
        let mut next: BTreeMap<u32, Distribution> = BTreeMap::new();

        for (&spent, counts) in &states {
            let with = spent + skill.cost;
            // Out of budget from this state: not buying is certain.
            let chance = if with <= budget { skill.chance } else { 0.0 };

            for (&count, &prob) in counts {
                *next.entry(spent).or_default().entry(count).or_insert(0.0) +=
                    prob * (1.0 - chance);

                if chance > 0.0 {
                    *next.entry(with).or_default().entry(count + 1).or_insert(0.0) +=
                        prob * chance;
                }
            }
        }

        states = next;
    }

    let mut purchased = Distribution::new();
    for counts in states.values() {
        for (&count, &prob) in counts {
            *purchased.entry(count).or_insert(0.0) += prob;
        }
    }

    if purchased.is_empty() {
        purchased = point_mass(0);
    }
    purchased
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{WishlistItem, WishlistTier};
    use crate::parent::ParentId;
    use crate::reference::{CharacterId, GroupId, SkillRarity};
    use crate::spark::{
        AptitudeKind, AptitudeSpark, SkillSpark, StarLevel, StatKind, StatSpark,
    };

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn skill(name: &str, rarity: SkillRarity, cost: u32) -> SkillRef {
        SkillRef {
            name: String::from(name),
            category: SkillCategory::Regular,
            rarity,
            group: Some(GroupId(1)),
            base_cost: Some(cost),
        }
    }

    fn parent(id: u32, skills: Vec<&str>) -> Parent {
        Parent {
            id: ParentId(id),
            character: CharacterId(1000 + id),
            name: format!("Parent {id}"),
            generation: 1,
            stat_spark: StatSpark {
                kind: StatKind::Speed,
                stars: StarLevel::One,
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

    fn goal_with_wishlist(names: &[&str]) -> Goal {
        Goal {
            primary_stats: [StatKind::Speed, StatKind::Stamina],
            secondary_stat: StatKind::Power,
            primary_aptitudes: vec![],
            signature_wishlist: vec![],
            skill_wishlist: names
                .iter()
                .map(|name| WishlistItem {
                    skill: String::from(*name),
                    tier: WishlistTier::A,
                })
                .collect(),
        }
    }

    #[test]
    fn two_carriers_raise_normal_chance_to_0242() {
        let table = SkillTable::new(vec![skill("Corner Recovery", SkillRarity::Normal, 100)]);
        let p1 = parent(1, vec!["Corner Recovery"]);
        let p2 = parent(2, vec!["Corner Recovery"]);
        let pool = ParentPool::new(vec![]);
        let lineage = pair_lineage(&p1, &p2, &pool);

        let chance = SparkAcquisitionModel::acquire_chance(
            table.get("Corner Recovery").unwrap(),
            &lineage,
            &table,
            AcquisitionParams::default(),
        );
        assert!(close(chance, 0.2 * 1.1 * 1.1));
    }

    #[test]
    fn negative_budget_fails_fast() {
        let table = SkillTable::new(vec![]);
        let p1 = parent(1, vec![]);
        let p2 = parent(2, vec![]);
        let pool = ParentPool::new(vec![]);

        let result = SparkAcquisitionModel::distributions(
            &p1,
            &p2,
            &goal_with_wishlist(&[]),
            -1,
            &table,
            &BTreeSet::new(),
            &BTreeSet::new(),
            &pool,
            AcquisitionParams::default(),
        );
        assert_eq!(result.unwrap_err(), EngineError::NegativeBudget(-1));
    }

    #[test]
    fn empty_pools_yield_point_mass_at_zero() {
        let table = SkillTable::new(vec![]);
        let p1 = parent(1, vec![]);
        let p2 = parent(2, vec![]);
        let pool = ParentPool::new(vec![]);

        let dists = SparkAcquisitionModel::distributions(
            &p1,
            &p2,
            &goal_with_wishlist(&[]),
            600,
            &table,
            &BTreeSet::new(),
            &BTreeSet::new(),
            &pool,
            AcquisitionParams::default(),
        )
        .unwrap();

        assert_eq!(dists.free, point_mass(0));
        assert_eq!(dists.purchased, point_mass(0));
        assert_eq!(dists.combined(), point_mass(0));
    }

    #[test]
    fn free_skills_convolve_as_bernoulli_trials() {
        let table = SkillTable::new(vec![
            skill("Corner Recovery", SkillRarity::Gold, 100),
            SkillRef {
                name: String::from("Straightaway Adept"),
                category: SkillCategory::Regular,
                rarity: SkillRarity::Gold,
                group: Some(GroupId(2)),
                base_cost: Some(100),
            },
        ]);
        let p1 = parent(1, vec![]);
        let p2 = parent(2, vec![]);
        let pool = ParentPool::new(vec![]);
        let conditional: BTreeSet<String> = ["Corner Recovery", "Straightaway Adept"]
            .into_iter()
            .map(String::from)
            .collect();

        let dists = SparkAcquisitionModel::distributions(
            &p1,
            &p2,
            &goal_with_wishlist(&[]),
            0,
            &table,
            &BTreeSet::new(),
            &conditional,
            &pool,
            AcquisitionParams::default(),
        )
        .unwrap();

        // Two independent 0.4 trials.
        assert!(close(dists.free[&0], 0.36));
        assert!(close(dists.free[&1], 0.48));
        assert!(close(dists.free[&2], 0.16));
    }

    #[test]
    fn purchased_counts_respect_the_budget() {
        let table = SkillTable::new(vec![
            skill("Corner Recovery", SkillRarity::Normal, 150),
            SkillRef {
                name: String::from("Straightaway Adept"),
                category: SkillCategory::Regular,
                rarity: SkillRarity::Normal,
                group: Some(GroupId(2)),
                base_cost: Some(150),
            },
        ]);
        let p1 = parent(1, vec![]);
        let p2 = parent(2, vec![]);
        let pool = ParentPool::new(vec![]);
        let goal = goal_with_wishlist(&["Corner Recovery", "Straightaway Adept"]);

        // Budget covers only one of the two skills.
        let dists = SparkAcquisitionModel::distributions(
            &p1,
            &p2,
            &goal,
            150,
            &table,
            &BTreeSet::new(),
            &BTreeSet::new(),
            &pool,
            AcquisitionParams::default(),
        )
        .unwrap();

        assert!(dists.purchased.keys().all(|&count| count <= 1));
        let total: f64 = dists.purchased.values().sum();
        assert!(close(total, 1.0));
    }

    #[test]
    fn unaffordable_branches_keep_their_full_mass() {
        let table = SkillTable::new(vec![
            skill("Corner Recovery", SkillRarity::Normal, 150),
            SkillRef {
                name: String::from("Straightaway Adept"),
                category: SkillCategory::Regular,
                rarity: SkillRarity::Normal,
                group: Some(GroupId(2)),
                base_cost: Some(150),
            },
        ]);
        let p1 = parent(1, vec![]);
        let p2 = parent(2, vec![]);
        let pool = ParentPool::new(vec![]);
        let goal = goal_with_wishlist(&["Corner Recovery", "Straightaway Adept"]);

        // Budget covers one purchase; the second skill is unaffordable
        // from the already-bought state.
        let dists = SparkAcquisitionModel::distributions(
            &p1,
            &p2,
            &goal,
            150,
            &table,
            &BTreeSet::new(),
            &BTreeSet::new(),
            &pool,
            AcquisitionParams::default(),
        )
        .unwrap();

        let total: f64 = dists.purchased.values().sum();
        assert!(close(total, 1.0));
        // Two 0.2 trials, but only one can be paid for:
        // P(1) = 0.8 * 0.2 (second bought) + 0.2 (first bought, second blocked).
        assert!(close(dists.purchased[&0], 0.64));
        assert!(close(dists.purchased[&1], 0.36));
    }

    #[test]
    fn purchased_mass_sums_to_one_with_full_budget() {
        let table = SkillTable::new(vec![
            skill("Corner Recovery", SkillRarity::Normal, 100),
            SkillRef {
                name: String::from("Straightaway Adept"),
                category: SkillCategory::Regular,
                rarity: SkillRarity::Circle,
                group: Some(GroupId(2)),
                base_cost: Some(120),
            },
        ]);
        let p1 = parent(1, vec![]);
        let p2 = parent(2, vec![]);
        let pool = ParentPool::new(vec![]);
        let goal = goal_with_wishlist(&["Corner Recovery", "Straightaway Adept"]);

        let dists = SparkAcquisitionModel::distributions(
            &p1,
            &p2,
            &goal,
            1000,
            &table,
            &BTreeSet::new(),
            &BTreeSet::new(),
            &pool,
            AcquisitionParams::default(),
        )
        .unwrap();

        let total: f64 = dists.purchased.values().sum();
        assert!(close(total, 1.0));
        // Both skills affordable: counts 0, 1 and 2 are all reachable.
        assert!(dists.purchased.contains_key(&2));
    }
}
