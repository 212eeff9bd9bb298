pub mod acquisition;
pub mod upgrade;

pub use acquisition::{AcquisitionDistributions, AcquisitionParams, SparkAcquisitionModel};
pub use upgrade::{TargetStats, UpgradeEstimator, UpgradeOutcome, UpgradeParams};

use std::collections::BTreeMap;

/// Sparse probability distribution over integer outcomes (scores or
/// counts). Keys are always rounded to keep the support finite; the
/// ordered map keeps iteration and float accumulation deterministic.
pub type Distribution = BTreeMap<i64, f64>;

pub fn point_mass(value: i64) -> Distribution {
    let mut dist = Distribution::new();
    dist.insert(value, 1.0);
    dist
}

pub fn bernoulli(p: f64) -> Distribution {
    let mut dist = Distribution::new();
    dist.insert(0, 1.0 - p);
    dist.insert(1, p);
    dist
}

/// Distribution of the sum of two independent variables: every key pair
/// accumulates its joint probability under the summed key. The single
/// generic convolution shared by every distribution in the engine;
/// convolving with a point mass at 0 is the identity.
pub fn convolve(a: &Distribution, b: &Distribution) -> Distribution {
    if a.is_empty() {
        return b.clone();
    }
    if b.is_empty() {
        return a.clone();
    }

    let mut out = Distribution::new();
    for (&key_a, &prob_a) in a {
        for (&key_b, &prob_b) in b {
            *out.entry(key_a + key_b).or_insert(0.0) += prob_a * prob_b;
        }
    }
    out
}

/// Total mass at outcomes strictly greater than the threshold.
pub fn mass_above(dist: &Distribution, threshold: i64) -> f64 {
    dist.range(threshold.saturating_add(1)..)
        .map(|(_, &prob)| prob)
        .sum()
}

/// Display form of a probability: "1 in N" under 50%, a percentage above,
/// with hard floors and ceilings for effectively-impossible and
/// effectively-sure outcomes.
pub fn format_probability(p: f64) -> String {
    if p < 0.0001 {
        String::from("Never")
    } else if p > 0.9999 {
        String::from("Certain")
    } else if p < 0.5 {
        format!("1 in {}", (1.0 / p).round() as i64)
    } else {
        format!("{:.1}%", p * 100.0)
    }
}

/// Three-slot star display, e.g. 2 -> "★★☆".
pub fn format_stars(count: u8) -> String {
    let filled = count.clamp(1, 3) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(3 - filled))
}
