use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Star level of an inherited spark. Always 1..=3; anything else is a
/// caller contract violation and fails at the boundary.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum StarLevel {
    #[default]
    One,
    Two,
    Three,
}

impl StarLevel {
    pub const ALL: [StarLevel; 3] = [StarLevel::One, StarLevel::Two, StarLevel::Three];

    pub fn value(self) -> u8 {
        match self {
            StarLevel::One => 1,
            StarLevel::Two => 2,
            StarLevel::Three => 3,
        }
    }

    /// Zero-based index into per-star tables.
    pub fn index(self) -> usize {
        (self.value() - 1) as usize
    }
}

impl TryFrom<u8> for StarLevel {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(StarLevel::One),
            2 => Ok(StarLevel::Two),
            3 => Ok(StarLevel::Three),
            other => Err(EngineError::InvalidStarLevel(other)),
        }
    }
}

impl From<StarLevel> for u8 {
    fn from(value: StarLevel) -> u8 {
        value.value()
    }
}

/// The five fixed stat categories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Speed,
    Stamina,
    Power,
    Guts,
    Wit,
}

impl StatKind {
    pub const ALL: [StatKind; 5] = [
        StatKind::Speed,
        StatKind::Stamina,
        StatKind::Power,
        StatKind::Guts,
        StatKind::Wit,
    ];
}

/// Track and running-style aptitude categories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AptitudeKind {
    Turf,
    Dirt,
    Sprint,
    Mile,
    Medium,
    Long,
    FrontRunner,
    PaceChaser,
    LateSurger,
    EndCloser,
}

impl AptitudeKind {
    pub const ALL: [AptitudeKind; 10] = [
        AptitudeKind::Turf,
        AptitudeKind::Dirt,
        AptitudeKind::Sprint,
        AptitudeKind::Mile,
        AptitudeKind::Medium,
        AptitudeKind::Long,
        AptitudeKind::FrontRunner,
        AptitudeKind::PaceChaser,
        AptitudeKind::LateSurger,
        AptitudeKind::EndCloser,
    ];
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSpark {
    pub kind: StatKind,
    pub stars: StarLevel,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AptitudeSpark {
    pub kind: AptitudeKind,
    pub stars: StarLevel,
}

/// Character-bound rare skill spark. At most one per entity in practice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSpark {
    pub skill: String,
    pub stars: StarLevel,
}

/// Regular skill spark. Many per entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSpark {
    pub skill: String,
    pub stars: StarLevel,
}
