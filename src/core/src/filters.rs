use crate::parent::{LineageStats, Parent, ParentPool};
use crate::spark::{AptitudeKind, StarLevel, StatKind};
use serde::{Deserialize, Serialize};

/// Whether conditions read lineage aggregates or only the entity's own
/// sparks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FilterScope {
    #[default]
    Total,
    Representative,
}

/// What a single condition inspects. Skill-name targets with an empty
/// name are vacuous and always pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionTarget {
    Stat(StatKind),
    Aptitude(AptitudeKind),
    Signature(String),
    Skill(String),
    /// The named regular skill must be present on the entity and on both
    /// ancestors simultaneously, regardless of scope.
    LineageWide(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub target: ConditionTarget,
    pub min_stars: StarLevel,
}

pub type ConditionGroup = Vec<Condition>;

/// Roster filter: a free-text search and a distinct-skill floor evaluated
/// first, then condition groups combined with AND across groups and OR
/// within a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilterSpec {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub min_distinct_skills: u32,
    #[serde(default)]
    pub scope: FilterScope,
    #[serde(default)]
    pub groups: Vec<ConditionGroup>,
}

/// Pure roster predicate. An empty spec always passes.
pub fn matches(
    parent: &Parent,
    stats: &LineageStats,
    spec: &FilterSpec,
    pool: &ParentPool,
) -> bool {
    if !spec.search.is_empty()
        && !parent
            .name
            .to_lowercase()
            .contains(&spec.search.to_lowercase())
    {
        return false;
    }

    if stats.distinct_skills < spec.min_distinct_skills {
        return false;
    }

    spec.groups.iter().all(|group| {
        group
            .iter()
            .any(|condition| condition_passes(condition, parent, stats, spec.scope, pool))
    })
}

fn condition_passes(
    condition: &Condition,
    parent: &Parent,
    stats: &LineageStats,
    scope: FilterScope,
    pool: &ParentPool,
) -> bool {
    let min = condition.min_stars;

    match &condition.target {
        ConditionTarget::Stat(kind) => match scope {
            FilterScope::Total => stats.stats.get(kind).is_some_and(|&stars| stars >= min),
            FilterScope::Representative => {
                parent.stat_spark.kind == *kind && parent.stat_spark.stars >= min
            }
        },
        ConditionTarget::Aptitude(kind) => match scope {
            FilterScope::Total => stats.aptitudes.get(kind).is_some_and(|&stars| stars >= min),
            FilterScope::Representative => {
                parent.aptitude_spark.kind == *kind && parent.aptitude_spark.stars >= min
            }
        },
        ConditionTarget::Signature(name) => {
            if name.is_empty() {
                return true;
            }
            match scope {
                FilterScope::Total => {
                    stats.signatures.get(name).is_some_and(|&stars| stars >= min)
                }
                FilterScope::Representative => parent
                    .signature_sparks
                    .iter()
                    .any(|spark| spark.skill == *name && spark.stars >= min),
            }
        }
        ConditionTarget::Skill(name) => {
            if name.is_empty() {
                return true;
            }
            match scope {
                FilterScope::Total => stats.skills.get(name).is_some_and(|&stars| stars >= min),
                FilterScope::Representative => parent
                    .skill_sparks
                    .iter()
                    .any(|spark| spark.skill == *name && spark.stars >= min),
            }
        }
        ConditionTarget::LineageWide(name) => {
            if name.is_empty() {
                return true;
            }
            lineage_wide_present(parent, name, pool)
        }
    }
}

/// Strict 3-for-3 match: the entity and both ancestors all carry the
/// named regular skill. Unresolved ancestors fail the condition.
fn lineage_wide_present(parent: &Parent, name: &str, pool: &ParentPool) -> bool {
    let has = |sparks: &[crate::spark::SkillSpark]| sparks.iter().any(|spark| spark.skill == name);

    if !has(&parent.skill_sparks) {
        return false;
    }

    let ancestors = parent.ancestors(pool);
    ancestors.len() == 2 && ancestors.iter().all(|ancestor| has(ancestor.skill_sparks))
}
