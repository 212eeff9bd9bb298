pub mod affinity;
pub mod error;
pub mod filters;
pub mod goal;
pub mod parent;
pub mod probability;
pub mod reference;
pub mod scoring;
pub mod selection;
pub mod spark;
pub mod utils;

pub use affinity::{character_id_of, lineage_character_ids, AffinityCalculator};
pub use error::EngineError;
pub use filters::{Condition, ConditionGroup, ConditionTarget, FilterScope, FilterSpec};
pub use goal::{Goal, WishlistItem, WishlistTier};
pub use parent::{
    pair_lineage, AncestorData, AncestorRef, AncestorView, LineageStats, Parent, ParentId,
    ParentPool,
};
pub use probability::{
    bernoulli, convolve, format_probability, format_stars, mass_above, point_mass,
    AcquisitionDistributions, AcquisitionParams, Distribution, SparkAcquisitionModel, TargetStats,
    UpgradeEstimator, UpgradeOutcome, UpgradeParams,
};
pub use reference::{
    CharacterId, CharacterTable, GroupId, RelationGroup, SkillCategory, SkillRarity, SkillRef,
    SkillTable, DEFAULT_SKILL_COST,
};
pub use scoring::{ScoreCalculator, StarOdds, TrainingRank};
pub use selection::{
    PairCandidate, RosterSelector, ScoredParent, SortDirection, SortField, TopList,
    TraineeCandidate,
};
pub use spark::{
    AptitudeKind, AptitudeSpark, SignatureSpark, SkillSpark, StarLevel, StatKind, StatSpark,
};
pub use utils::TimeEstimation;
