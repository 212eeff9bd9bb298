use crate::affinity::{lineage_character_ids, AffinityCalculator};
use crate::filters::{self, FilterSpec};
use crate::goal::Goal;
use crate::parent::{LineageStats, Parent, ParentId, ParentPool};
use crate::reference::{CharacterId, CharacterTable, SkillTable};
use crate::scoring::{ScoreCalculator, StarOdds};
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Bounded best-K list under a comparator chain. While under capacity,
/// inserts keep the list sorted; once full, a candidate only displaces the
/// current worst entry when strictly better.
pub struct TopList<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    entries: Vec<T>,
    capacity: usize,
    compare: C,
}

impl<T, C> TopList<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub fn new(capacity: usize, compare: C) -> Self {
        TopList {
            entries: Vec::with_capacity(capacity.min(64)),
            capacity,
            compare,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }

        if self.entries.len() < self.capacity {
            self.entries.push(item);
            self.entries.sort_by(&self.compare);
            return;
        }

        let worst_index = self.entries.len() - 1;
        if (self.compare)(&item, &self.entries[worst_index]) == Ordering::Less {
            self.entries[worst_index] = item;
            self.entries.sort_by(&self.compare);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_sorted_vec(self) -> Vec<T> {
        self.entries
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortField {
    #[default]
    LineageScore,
    IndividualScore,
    Sparks,
    Name,
    Generation,
    Id,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

/// A roster entry with its computed metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredParent {
    pub id: ParentId,
    pub character: CharacterId,
    pub name: String,
    pub generation: u8,
    pub score: i64,
    pub individual: i64,
    pub total_sparks: u32,
    pub distinct_skills: u32,
}

/// One candidate pairing with its ranking metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairCandidate {
    pub p1: ParentId,
    pub p2: ParentId,
    pub average_score: f64,
    pub average_individual: f64,
    pub total_sparks: u32,
    pub distinct_skills: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraineeCandidate {
    pub character: CharacterId,
    pub affinity: u32,
}

/// Roster-wide search: filtering, scoring, sorting and bounded pair /
/// trainee selection. Scores are computed in a parallel map before the
/// sequential Top-K reduce; each candidate is independent of the others.
pub struct RosterSelector;

impl RosterSelector {
    /// Apply a filter spec, returning surviving roster members.
    pub fn filter<'a>(
        roster: &'a [Parent],
        spec: &FilterSpec,
        pool: &ParentPool,
    ) -> Vec<&'a Parent> {
        roster
            .iter()
            .filter(|parent| {
                let stats = LineageStats::collect(parent, pool);
                filters::matches(parent, &stats, spec, pool)
            })
            .collect()
    }

    /// Score every roster member in parallel.
    pub fn score(
        roster: &[&Parent],
        goal: &Goal,
        pool: &ParentPool,
        skills: &SkillTable,
        odds: StarOdds,
    ) -> Vec<ScoredParent> {
        roster
            .par_iter()
            .map(|parent| {
                let stats = LineageStats::collect(parent, pool);
                ScoredParent {
                    id: parent.id,
                    character: parent.character,
                    name: parent.name.clone(),
                    generation: parent.generation,
                    score: ScoreCalculator::calculate(parent, goal, pool, skills, odds),
                    individual: ScoreCalculator::individual(parent, goal, pool, skills, odds)
                        .round() as i64,
                    total_sparks: stats.total_skill_sparks,
                    distinct_skills: stats.distinct_skills,
                }
            })
            .collect()
    }

    /// Sort scored roster entries. Numeric fields order best-first by
    /// default; `Ascending` reverses. Ties fall back to id for
    /// reproducibility.
    pub fn sort(scored: &mut [ScoredParent], field: SortField, direction: SortDirection) {
        scored.sort_by(|a, b| {
            let ordering = match field {
                SortField::LineageScore => b.score.cmp(&a.score),
                SortField::IndividualScore => b.individual.cmp(&a.individual),
                SortField::Sparks => b.total_sparks.cmp(&a.total_sparks),
                SortField::Name => a.name.cmp(&b.name),
                SortField::Generation => b.generation.cmp(&a.generation),
                SortField::Id => b.id.cmp(&a.id),
            };
            let ordering = match direction {
                SortDirection::Descending => ordering,
                SortDirection::Ascending => ordering.reverse(),
            };
            ordering.then(a.id.cmp(&b.id))
        });
    }

    /// Best-K candidate pairs over the roster: every i < j combination,
    /// excluding same-character pairs. `by_individual` switches the
    /// primary metric; tie-breaks are total sparks, then distinct skills.
    pub fn top_pairs(
        roster: &[&Parent],
        goal: &Goal,
        pool: &ParentPool,
        skills: &SkillTable,
        odds: StarOdds,
        k: usize,
        by_individual: bool,
    ) -> Vec<PairCandidate> {
        let scored = Self::score(roster, goal, pool, skills, odds);

        // Lineage skill-name sets, reused across the O(n^2) scan.
        let skill_sets: Vec<BTreeSet<&str>> = roster
            .par_iter()
            .map(|parent| {
                let mut names = BTreeSet::new();
                let mut members = vec![parent.as_view()];
                members.extend(parent.ancestors(pool));
                for member in &members {
                    for spark in member.skill_sparks {
                        names.insert(spark.skill.as_str());
                    }
                }
                names
            })
            .collect();

        let mut best = TopList::new(k, move |a: &PairCandidate, b: &PairCandidate| {
            compare_pairs(a, b, by_individual)
        });

        for (i, j) in (0..roster.len()).tuple_combinations() {
            if roster[i].character == roster[j].character {
                continue;
            }

            best.push(PairCandidate {
                p1: scored[i].id,
                p2: scored[j].id,
                average_score: (scored[i].score + scored[j].score) as f64 / 2.0,
                average_individual: (scored[i].individual + scored[j].individual) as f64 / 2.0,
                total_sparks: scored[i].total_sparks + scored[j].total_sparks,
                distinct_skills: skill_sets[i].union(&skill_sets[j]).count() as u32,
            });
        }

        debug!(
            "pair search over {} candidates kept {} of {} requested",
            roster.len(),
            best.len(),
            k
        );

        best.into_sorted_vec()
    }

    /// Best-K trainees for a fixed pair, ranked by affinity. Characters
    /// already present in the pair's lineage are excluded; ties break by
    /// character id ascending.
    pub fn top_trainees(
        trainees: &[CharacterId],
        p1: &Parent,
        p2: &Parent,
        characters: &CharacterTable,
        pool: &ParentPool,
        k: usize,
    ) -> Vec<TraineeCandidate> {
        let excluded = lineage_character_ids(p1, p2, pool);

        let candidates: Vec<TraineeCandidate> = trainees
            .par_iter()
            .filter(|character| !excluded.contains(character))
            .map(|&character| TraineeCandidate {
                character,
                affinity: AffinityCalculator::calculate(character, p1, p2, characters, pool),
            })
            .collect();

        let mut best = TopList::new(k, |a: &TraineeCandidate, b: &TraineeCandidate| {
            b.affinity
                .cmp(&a.affinity)
                .then(a.character.cmp(&b.character))
        });
        for candidate in candidates {
            best.push(candidate);
        }

        best.into_sorted_vec()
    }
}

fn compare_pairs(a: &PairCandidate, b: &PairCandidate, by_individual: bool) -> Ordering {
    let primary = if by_individual {
        b.average_individual.total_cmp(&a.average_individual)
    } else {
        b.average_score.total_cmp(&a.average_score)
    };

    primary
        .then(b.total_sparks.cmp(&a.total_sparks))
        .then(b.distinct_skills.cmp(&a.distinct_skills))
        .then(a.p1.cmp(&b.p1))
        .then(a.p2.cmp(&b.p2))
}
