//! Difficulty recommendation policy.
//!
//! Pure and deterministic: the same scores always produce the same decision.

use crate::types::Difficulty;
use serde::Serialize;

/// Message shown when there is no scored history yet.
pub const FIRST_ATTEMPT_MESSAGE: &str = "first attempt, starter tier.";

/// Lower bounds (inclusive) of each tier above easy, checked hardest first.
const TIER_THRESHOLDS: [(f64, Difficulty); 3] = [
    (80.0, Difficulty::Extreme),
    (65.0, Difficulty::Hard),
    (50.0, Difficulty::Medium),
];

/// Outcome of [`recommend_tier`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierDecision {
    pub tier: Difficulty,
    /// Rounded mean score; `None` without scored history
    pub average: Option<i64>,
    pub message: String,
}

/// Tier for a mean overall score.
pub fn tier_for_average(avg: f64) -> Difficulty {
    TIER_THRESHOLDS
        .iter()
        .find(|(lower, _)| avg >= *lower)
        .map(|(_, tier)| *tier)
        .unwrap_or(Difficulty::Easy)
}

/// Choose a tier from the overall scores of completed attempts.
pub fn recommend_tier(scores: &[f64]) -> TierDecision {
    let Some(avg) = super::mean(scores) else {
        return TierDecision {
            tier: Difficulty::Easy,
            average: None,
            message: FIRST_ATTEMPT_MESSAGE.to_string(),
        };
    };

    let tier = tier_for_average(avg);
    let rounded = super::round_half_up(avg);

    TierDecision {
        tier,
        average: Some(rounded),
        message: format!(
            "Your recent average score is {}, recommended level: {}.",
            rounded, tier
        ),
    }
}
