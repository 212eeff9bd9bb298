use serde::Deserialize;

const STATIC_CHARACTERS_JSON: &str = include_str!("../data/characters.json");

#[derive(Deserialize)]
pub struct RelationGroupEntity {
    pub id: u32,
    pub points: u32,
    pub members: Vec<u32>,
}

pub struct CharacterLoader;

impl CharacterLoader {
    pub fn load() -> Vec<RelationGroupEntity> {
        serde_json::from_str(STATIC_CHARACTERS_JSON).unwrap()
    }
}
