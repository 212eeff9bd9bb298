use thiserror::Error;

/// Contract violations that indicate a caller bug rather than missing data.
/// Lookup misses (unknown skills, unknown characters) never produce errors;
/// they resolve to neutral defaults instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid star level {0}, expected 1..=3")]
    InvalidStarLevel(u8),
    #[error("negative skill point budget {0}")]
    NegativeBudget(i64),
}
