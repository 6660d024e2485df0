//! Analytics module for mockprep
//!
//! Derives progress feedback from a user's attempt history:
//! - [`history`]: bounded window of recent attempts and the signals drawn from it
//! - [`policy`]: maps recent scores to a difficulty tier
//! - [`selector`]: picks the least-exposed character at a tier
//! - [`recommend`]: composes the three into a recommendation payload
//! - [`stats`]: full statistics report (totals, breakdowns, trend)
//!
//! ## Flow
//!
//! ```text
//! recommend:  AttemptStore ──► History ──► policy ──► selector ──► RecommendationPayload
//!                                                       ▲
//!                                                    Catalog
//!
//! stats:      AttemptStore (count / group / extremal / recent) ──► StatsReport
//! ```
//!
//! Every function here is request-scoped and stateless; store failures are
//! propagated on first occurrence and no partial result is returned.

pub mod history;
pub mod policy;
pub mod recommend;
pub mod selector;
pub mod stats;

pub use history::{History, UsageMap, HISTORY_WINDOW};
pub use policy::{recommend_tier, tier_for_average, TierDecision, FIRST_ATTEMPT_MESSAGE};
pub use recommend::{recommend, RecommendationPayload, RecommendationStats};
pub use selector::{select_character, Selection, SelectionReason};
pub use stats::{
    generate_stats, generate_stats_at, BestScore, CharacterStat, DetailedScores,
    ProfessionStat, StatsReport, TrendPoint,
};

/// Round to the nearest integer, halves upward (42.5 -> 43).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
