use crate::parent::{AncestorRef, Parent, ParentPool};
use crate::reference::{CharacterId, CharacterTable};
use std::collections::BTreeSet;

/// Aggregate compatibility between a trainee and a candidate parent pair.
pub struct AffinityCalculator;

impl AffinityCalculator {
    /// Pairwise relation points across the trio, plus the trainee's
    /// relation to each resolvable ancestor. Unknown characters and
    /// missing relation entries contribute 0.
    pub fn calculate(
        trainee: CharacterId,
        p1: &Parent,
        p2: &Parent,
        characters: &CharacterTable,
        pool: &ParentPool,
    ) -> u32 {
        let mut total = characters.relation_points(trainee, p1.character)
            + characters.relation_points(trainee, p2.character)
            + characters.relation_points(p1.character, p2.character);

        for ancestor in p1.ancestors(pool).iter().chain(p2.ancestors(pool).iter()) {
            total += characters.relation_points(trainee, ancestor.character);
        }

        total
    }
}

/// Character id behind an ancestor reference, following the same
/// resolution rules as every other consumer.
pub fn character_id_of(ancestor: &AncestorRef, pool: &ParentPool) -> Option<CharacterId> {
    pool.resolve(ancestor).map(|view| view.character)
}

/// Distinct character ids over the six lineage slots of a pair. Callers
/// use this to exclude trainees already present in the lineage.
pub fn lineage_character_ids(
    p1: &Parent,
    p2: &Parent,
    pool: &ParentPool,
) -> BTreeSet<CharacterId> {
    crate::parent::pair_lineage(p1, p2, pool)
        .iter()
        .map(|member| member.character)
        .collect()
}
