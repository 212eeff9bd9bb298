pub mod loaders;

pub use loaders::*;

use core::{
    CharacterId, CharacterTable, GroupId, RelationGroup, SkillCategory, SkillRarity, SkillRef,
    SkillTable,
};
use log::info;

pub struct DatabaseEntry {
    pub skills: SkillTable,
    pub characters: CharacterTable,
}

pub struct DatabaseLoader;

impl DatabaseLoader {
    pub fn load() -> DatabaseEntry {
        let skills = SkillTable::new(
            SkillLoader::load()
                .into_iter()
                .map(skill_from_entity)
                .collect(),
        );
        let characters = CharacterTable::new(
            CharacterLoader::load()
                .into_iter()
                .map(group_from_entity)
                .collect(),
        );

        info!(
            "static data: {} skills, {} relation groups",
            skills.len(),
            characters.groups.len()
        );

        DatabaseEntry { skills, characters }
    }
}

fn skill_from_entity(entity: SkillEntity) -> SkillRef {
    SkillRef {
        name: entity.name,
        category: match entity.category.as_str() {
            "signature" => SkillCategory::Signature,
            _ => SkillCategory::Regular,
        },
        rarity: match entity.rarity {
            1 => SkillRarity::Normal,
            2 => SkillRarity::Circle,
            _ => SkillRarity::Gold,
        },
        group: entity.group.map(GroupId),
        base_cost: entity.base_cost,
    }
}

fn group_from_entity(entity: RelationGroupEntity) -> RelationGroup {
    RelationGroup {
        id: GroupId(entity.id),
        points: entity.points,
        members: entity.members.into_iter().map(CharacterId).collect(),
    }
}
