use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Base character id shared by all outfits of one character.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CharacterId(pub u32);

/// Exclusivity group id. Skills sharing a group are mutually exclusive
/// upgrades of each other (normal / circle / gold variants).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GroupId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillCategory {
    Signature,
    Regular,
}

/// Rarity class driving base acquisition chance and shop cost.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillRarity {
    Normal,
    Circle,
    Gold,
}

impl SkillRarity {
    pub fn base_chance(self) -> f64 {
        match self {
            SkillRarity::Normal => 0.20,
            SkillRarity::Circle => 0.25,
            SkillRarity::Gold => 0.40,
        }
    }
}

/// Skill point cost assumed when the reference table carries none.
pub const DEFAULT_SKILL_COST: u32 = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRef {
    pub name: String,
    pub category: SkillCategory,
    pub rarity: SkillRarity,
    pub group: Option<GroupId>,
    pub base_cost: Option<u32>,
}

impl SkillRef {
    pub fn cost(&self) -> u32 {
        self.base_cost.unwrap_or(DEFAULT_SKILL_COST)
    }
}

/// Immutable name-indexed skill reference table, injected into every core
/// function that needs skill metadata. Misses resolve to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SkillRef>", into = "Vec<SkillRef>")]
pub struct SkillTable {
    skills: Vec<SkillRef>,
    by_name: HashMap<String, usize>,
}

impl SkillTable {
    pub fn new(skills: Vec<SkillRef>) -> Self {
        let by_name = skills
            .iter()
            .enumerate()
            .map(|(index, skill)| (skill.name.clone(), index))
            .collect();

        SkillTable { skills, by_name }
    }

    pub fn get(&self, name: &str) -> Option<&SkillRef> {
        self.by_name.get(name).map(|&index| &self.skills[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillRef> {
        self.skills.iter()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl From<Vec<SkillRef>> for SkillTable {
    fn from(skills: Vec<SkillRef>) -> Self {
        SkillTable::new(skills)
    }
}

impl From<SkillTable> for Vec<SkillRef> {
    fn from(table: SkillTable) -> Self {
        table.skills
    }
}

/// A relation group: characters sharing it earn its points toward affinity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationGroup {
    pub id: GroupId,
    pub points: u32,
    pub members: Vec<CharacterId>,
}

impl RelationGroup {
    pub fn contains(&self, character: CharacterId) -> bool {
        self.members.contains(&character)
    }
}

/// Precomputed character relation table. Relation points between two
/// characters are the summed points of every group both belong to.
/// Unknown ids simply share no groups and resolve to 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CharacterTable {
    pub groups: Vec<RelationGroup>,
}

impl CharacterTable {
    pub fn new(groups: Vec<RelationGroup>) -> Self {
        CharacterTable { groups }
    }

    /// Symmetric pairwise relation lookup.
    pub fn relation_points(&self, a: CharacterId, b: CharacterId) -> u32 {
        if a == b {
            return 0;
        }

        self.groups
            .iter()
            .filter(|group| group.contains(a) && group.contains(b))
            .map(|group| group.points)
            .sum()
    }
}
