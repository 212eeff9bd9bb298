use color_eyre::eyre::{eyre, Result};
use core::utils::TimeEstimation;
use core::{
    format_probability, AptitudeKind, CharacterId, FilterSpec, Goal, Parent, ParentPool,
    RosterSelector, SortDirection, SortField, StarOdds, TargetStats, TrainingRank,
    UpgradeEstimator, UpgradeParams,
};
use database::DatabaseLoader;
use env_logger::Env;
use log::info;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::env;
use std::fs;

#[derive(Deserialize)]
struct PlanFile {
    goal: Goal,
    roster: Vec<Parent>,
    #[serde(default)]
    filters: FilterSpec,
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(default)]
    training_rank: TrainingRank,
    #[serde(default)]
    target_stats: TargetStats,
    #[serde(default)]
    target_aptitudes: Vec<AptitudeKind>,
    #[serde(default)]
    sp_budget: i64,
    #[serde(default)]
    acquirable_skills: BTreeSet<String>,
    #[serde(default)]
    conditional_skills: BTreeSet<String>,
    #[serde(default)]
    trainees: Vec<CharacterId>,
}

fn default_top_k() -> usize {
    10
}

fn main() -> Result<()> {
    color_eyre::install()?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let plan_path = env::args()
        .nth(1)
        .ok_or_else(|| eyre!("usage: spark_planner <plan.json>"))?;

    let (database, estimated) = TimeEstimation::estimate(DatabaseLoader::load);
    info!("database loaded: {} ms", estimated);

    let plan: PlanFile = serde_json::from_str(&fs::read_to_string(&plan_path)?)?;
    info!("plan loaded: {} roster members", plan.roster.len());

    let pool = ParentPool::new(plan.roster.clone());
    let odds = StarOdds::for_rank(plan.training_rank);

    let filtered = RosterSelector::filter(&plan.roster, &plan.filters, &pool);
    info!("{} of {} pass the filters", filtered.len(), plan.roster.len());

    let mut scored =
        RosterSelector::score(&filtered, &plan.goal, &pool, &database.skills, odds);
    RosterSelector::sort(&mut scored, SortField::LineageScore, SortDirection::Descending);

    for entry in scored.iter().take(plan.top_k) {
        info!(
            "{}: score {}, individual {}, {} sparks ({} distinct skills)",
            entry.name, entry.score, entry.individual, entry.total_sparks, entry.distinct_skills
        );
    }

    let pairs = RosterSelector::top_pairs(
        &filtered,
        &plan.goal,
        &pool,
        &database.skills,
        odds,
        plan.top_k,
        false,
    );

    for pair in &pairs {
        info!(
            "pair {:?} + {:?}: avg score {:.1}, {} sparks, {} distinct skills",
            pair.p1, pair.p2, pair.average_score, pair.total_sparks, pair.distinct_skills
        );
    }

    let Some(best) = pairs.first() else {
        info!("no viable pairs");
        return Ok(());
    };

    let p1 = pool
        .get(best.p1)
        .ok_or_else(|| eyre!("pair member {:?} missing from pool", best.p1))?;
    let p2 = pool
        .get(best.p2)
        .ok_or_else(|| eyre!("pair member {:?} missing from pool", best.p2))?;

    let outcome = UpgradeEstimator::calculate(
        p1,
        p2,
        &plan.goal,
        &plan.target_stats,
        plan.training_rank,
        &database.skills,
        &pool,
        plan.sp_budget,
        &plan.acquirable_skills,
        &plan.conditional_skills,
        &plan.target_aptitudes,
        UpgradeParams::default(),
    )?;

    info!(
        "upgrade forecast for {} + {}: beats score {} {}, beats {} sparks {}",
        p1.name,
        p2.name,
        outcome.target_score,
        format_probability(outcome.score_upgrade),
        outcome.target_count,
        format_probability(outcome.count_upgrade)
    );

    if !plan.trainees.is_empty() {
        let trainees = RosterSelector::top_trainees(
            &plan.trainees,
            p1,
            p2,
            &database.characters,
            &pool,
            plan.top_k,
        );
        for trainee in &trainees {
            info!("trainee {:?}: affinity {}", trainee.character, trainee.affinity);
        }
    }

    Ok(())
}
