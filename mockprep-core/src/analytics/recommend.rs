//! Next-interviewer recommendation.

use super::{recommend_tier, select_character, History, SelectionReason};
use crate::catalog::{Catalog, Character};
use crate::error::{Error, Result};
use crate::store::AttemptStore;
use crate::types::{Difficulty, UserId};
use serde::Serialize;

/// Recommendation returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPayload {
    pub message: String,
    /// The recommended character
    pub data: Character,
    /// Present once the user has scored history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RecommendationStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationStats {
    /// Completed, scored attempts inside the history window
    pub total_interviews: usize,
    pub average_score: i64,
    pub recommended_level: Difficulty,
}

/// Recommend the next interviewer for a user.
pub fn recommend(
    store: &dyn AttemptStore,
    catalog: &Catalog,
    user_id: &UserId,
) -> Result<RecommendationPayload> {
    let history = History::load(store, user_id)?;
    let decision = recommend_tier(&history.scores());
    let usage = history.usage_map();

    let selection =
        select_character(catalog, decision.tier, &usage).ok_or_else(|| Error::NotFound {
            entity: "character",
            id: decision.tier.to_string(),
        })?;

    if selection.reason == SelectionReason::Fallback {
        tracing::warn!(
            tier = %decision.tier,
            fallback = %selection.character.id,
            "No characters at recommended tier, using popular character"
        );
    }

    tracing::info!(
        user = %user_id,
        tier = %decision.tier,
        average = ?decision.average,
        character = %selection.character.id,
        reason = ?selection.reason,
        "Recommendation computed"
    );

    let stats = decision.average.map(|average_score| RecommendationStats {
        total_interviews: history.completed_scored.len(),
        average_score,
        recommended_level: decision.tier,
    });

    Ok(RecommendationPayload {
        message: decision.message,
        data: selection.character.clone(),
        stats,
    })
}
