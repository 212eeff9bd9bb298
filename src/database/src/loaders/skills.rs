use serde::Deserialize;

const STATIC_SKILLS_JSON: &str = include_str!("../data/skills.json");

#[derive(Deserialize)]
pub struct SkillEntity {
    pub name: String,
    pub category: String,
    pub rarity: u8,
    pub group: Option<u32>,
    pub base_cost: Option<u32>,
}

pub struct SkillLoader;

impl SkillLoader {
    pub fn load() -> Vec<SkillEntity> {
        serde_json::from_str(STATIC_SKILLS_JSON).unwrap()
    }
}
