use crate::reference::{CharacterId, GroupId, SkillTable};
use crate::spark::{
    AptitudeKind, AptitudeSpark, SignatureSpark, SkillSpark, StarLevel, StatKind, StatSpark,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ParentId(pub u32);

/// A breeding candidate with its inherited sparks and up to two ancestors.
/// The model is exactly three generations deep: ancestors never have
/// ancestors of their own from this entity's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub id: ParentId,
    pub character: CharacterId,
    pub name: String,
    pub generation: u8,
    pub stat_spark: StatSpark,
    pub aptitude_spark: AptitudeSpark,
    #[serde(default)]
    pub signature_sparks: Vec<SignatureSpark>,
    #[serde(default)]
    pub skill_sparks: Vec<SkillSpark>,
    #[serde(default)]
    pub ancestor1: Option<AncestorRef>,
    #[serde(default)]
    pub ancestor2: Option<AncestorRef>,
}

/// Inline ancestor record for ancestors not tracked in the pool
/// (e.g. rentals). Same shape as a parent minus id and further ancestors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestorData {
    pub character: CharacterId,
    pub stat_spark: StatSpark,
    pub aptitude_spark: AptitudeSpark,
    #[serde(default)]
    pub signature_sparks: Vec<SignatureSpark>,
    #[serde(default)]
    pub skill_sparks: Vec<SkillSpark>,
}

/// An ancestor is either an id into the shared pool or an inline record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AncestorRef {
    Pool(ParentId),
    Inline(AncestorData),
}

/// Borrowed common view over a `Parent` or an inline `AncestorData`,
/// produced by ancestor resolution and consumed by scoring, affinity and
/// the acquisition model.
#[derive(Debug, Copy, Clone)]
pub struct AncestorView<'a> {
    pub character: CharacterId,
    pub stat_spark: &'a StatSpark,
    pub aptitude_spark: &'a AptitudeSpark,
    pub signature_sparks: &'a [SignatureSpark],
    pub skill_sparks: &'a [SkillSpark],
}

impl<'a> AncestorView<'a> {
    /// Whether this lineage member carries a regular skill from the given
    /// exclusivity group, falling back to an exact name match for
    /// ungrouped skills.
    pub fn carries_skill(&self, name: &str, group: Option<GroupId>, table: &SkillTable) -> bool {
        match group {
            Some(group) => self
                .skill_sparks
                .iter()
                .any(|spark| table.get(&spark.skill).and_then(|skill| skill.group) == Some(group)),
            None => self.skill_sparks.iter().any(|spark| spark.skill == name),
        }
    }
}

impl Parent {
    pub fn as_view(&self) -> AncestorView<'_> {
        AncestorView {
            character: self.character,
            stat_spark: &self.stat_spark,
            aptitude_spark: &self.aptitude_spark,
            signature_sparks: &self.signature_sparks,
            skill_sparks: &self.skill_sparks,
        }
    }

    /// Resolved ancestor views, at most two. Unresolvable pool ids are
    /// silently skipped.
    pub fn ancestors<'a>(&'a self, pool: &'a ParentPool) -> Vec<AncestorView<'a>> {
        [&self.ancestor1, &self.ancestor2]
            .into_iter()
            .flatten()
            .filter_map(|ancestor| pool.resolve(ancestor))
            .collect()
    }
}

impl AncestorData {
    pub fn as_view(&self) -> AncestorView<'_> {
        AncestorView {
            character: self.character,
            stat_spark: &self.stat_spark,
            aptitude_spark: &self.aptitude_spark,
            signature_sparks: &self.signature_sparks,
            skill_sparks: &self.skill_sparks,
        }
    }
}

/// Shared id-to-parent pool used for ancestor resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "Vec<Parent>", into = "Vec<Parent>")]
pub struct ParentPool {
    by_id: HashMap<ParentId, Parent>,
}

impl ParentPool {
    pub fn new(parents: Vec<Parent>) -> Self {
        ParentPool {
            by_id: parents.into_iter().map(|parent| (parent.id, parent)).collect(),
        }
    }

    pub fn get(&self, id: ParentId) -> Option<&Parent> {
        self.by_id.get(&id)
    }

    /// The single ancestor resolution function. Pool misses are `None`,
    /// never an error.
    pub fn resolve<'a>(&'a self, ancestor: &'a AncestorRef) -> Option<AncestorView<'a>> {
        match ancestor {
            AncestorRef::Pool(id) => self.get(*id).map(Parent::as_view),
            AncestorRef::Inline(data) => Some(data.as_view()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parent> {
        self.by_id.values()
    }
}

impl From<Vec<Parent>> for ParentPool {
    fn from(parents: Vec<Parent>) -> Self {
        ParentPool::new(parents)
    }
}

impl From<ParentPool> for Vec<Parent> {
    fn from(pool: ParentPool) -> Self {
        let mut parents: Vec<Parent> = pool.by_id.into_values().collect();
        parents.sort_by_key(|parent| parent.id);
        parents
    }
}

/// All six lineage slots of a breeding pair: both parents plus their
/// resolvable ancestors.
pub fn pair_lineage<'a>(
    p1: &'a Parent,
    p2: &'a Parent,
    pool: &'a ParentPool,
) -> Vec<AncestorView<'a>> {
    let mut lineage = vec![p1.as_view(), p2.as_view()];
    lineage.extend(p1.ancestors(pool));
    lineage.extend(p2.ancestors(pool));
    lineage
}

/// Aggregate statistics over an entity and its up-to-two ancestors:
/// maximum star level reached per category or skill name, plus spark
/// counts used by filters and pair tie-breaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LineageStats {
    pub stats: BTreeMap<StatKind, StarLevel>,
    pub aptitudes: BTreeMap<AptitudeKind, StarLevel>,
    pub signatures: BTreeMap<String, StarLevel>,
    pub skills: BTreeMap<String, StarLevel>,
    pub distinct_skills: u32,
    pub total_skill_sparks: u32,
}

impl LineageStats {
    pub fn collect(parent: &Parent, pool: &ParentPool) -> Self {
        let mut stats = LineageStats::default();
        let mut distinct = BTreeSet::new();

        let mut members = vec![parent.as_view()];
        members.extend(parent.ancestors(pool));

        for member in &members {
            max_star(&mut stats.stats, member.stat_spark.kind, member.stat_spark.stars);
            max_star(
                &mut stats.aptitudes,
                member.aptitude_spark.kind,
                member.aptitude_spark.stars,
            );

            for spark in member.signature_sparks {
                max_star(&mut stats.signatures, spark.skill.clone(), spark.stars);
            }

            for spark in member.skill_sparks {
                max_star(&mut stats.skills, spark.skill.clone(), spark.stars);
                distinct.insert(spark.skill.as_str());
            }

            stats.total_skill_sparks += member.skill_sparks.len() as u32;
        }

        stats.distinct_skills = distinct.len() as u32;
        stats
    }
}

fn max_star<K: Ord>(map: &mut BTreeMap<K, StarLevel>, key: K, stars: StarLevel) {
    map.entry(key)
        .and_modify(|current| *current = (*current).max(stars))
        .or_insert(stars);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent(id: u32, character: u32) -> Parent {
        Parent {
            id: ParentId(id),
            character: CharacterId(character),
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
            skill_sparks: vec![],
            ancestor1: None,
            ancestor2: None,
        }
    }

    #[test]
    fn resolve_pool_reference() {
        let ancestor = parent(2, 1002);
        let pool = ParentPool::new(vec![ancestor.clone()]);
        let view = pool.resolve(&AncestorRef::Pool(ParentId(2))).unwrap();
        assert_eq!(view.character, CharacterId(1002));
    }

    #[test]
    fn resolve_missing_pool_reference_is_none() {
        let pool = ParentPool::new(vec![]);
        assert!(pool.resolve(&AncestorRef::Pool(ParentId(42))).is_none());
    }

    #[test]
    fn resolve_inline_reference() {
        let pool = ParentPool::new(vec![]);
        let inline = AncestorRef::Inline(AncestorData {
            character: CharacterId(1003),
            stat_spark: StatSpark {
                kind: StatKind::Guts,
                stars: StarLevel::Three,
            },
            aptitude_spark: AptitudeSpark {
                kind: AptitudeKind::Mile,
                stars: StarLevel::One,
            },
            signature_sparks: vec![],
            skill_sparks: vec![],
        });

        let view = pool.resolve(&inline).unwrap();
        assert_eq!(view.stat_spark.stars, StarLevel::Three);
    }

    #[test]
    fn ancestor_ref_deserializes_untagged() {
        let by_id: AncestorRef = serde_json::from_str("7").unwrap();
        assert_eq!(by_id, AncestorRef::Pool(ParentId(7)));

        let inline: AncestorRef = serde_json::from_str(
            r#"{"character":1001,"stat_spark":{"kind":"Wit","stars":1},
                "aptitude_spark":{"kind":"Dirt","stars":2}}"#,
        )
        .unwrap();
        assert!(matches!(inline, AncestorRef::Inline(_)));
    }

    #[test]
    fn lineage_stats_take_max_star_across_members() {
        let mut ancestor = parent(2, 1002);
        ancestor.stat_spark.stars = StarLevel::Three;
        ancestor.skill_sparks = vec![SkillSpark {
            skill: String::from("Corner Recovery"),
            stars: StarLevel::One,
        }];

        let mut entity = parent(1, 1001);
        entity.skill_sparks = vec![SkillSpark {
            skill: String::from("Corner Recovery"),
            stars: StarLevel::Two,
        }];
        entity.ancestor1 = Some(AncestorRef::Pool(ParentId(2)));

        let pool = ParentPool::new(vec![ancestor]);
        let stats = LineageStats::collect(&entity, &pool);

        assert_eq!(stats.stats[&StatKind::Speed], StarLevel::Three);
        assert_eq!(stats.skills["Corner Recovery"], StarLevel::Two);
        assert_eq!(stats.distinct_skills, 1);
        assert_eq!(stats.total_skill_sparks, 2);
    }
}
