//! Recent attempt history for a single user.

use crate::error::Result;
use crate::store::{AttemptQuery, AttemptStore, ScoreField};
use crate::types::{InterviewAttempt, UserId};
use std::collections::HashMap;

/// Number of most recent attempts considered for recommendations.
pub const HISTORY_WINDOW: usize = 10;

/// Character id -> occurrences within the history window.
pub type UsageMap = HashMap<String, usize>;

/// The newest [`HISTORY_WINDOW`] attempts of a user, newest first.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Window of attempts regardless of status
    pub recent: Vec<InterviewAttempt>,
    /// Completed attempts from the window that carry an overall score
    pub completed_scored: Vec<InterviewAttempt>,
}

impl History {
    /// Fetch the window from the store.
    ///
    /// An empty history (new user) is a valid result; only store failures
    /// are errors.
    pub fn load(store: &dyn AttemptStore, user_id: &UserId) -> Result<Self> {
        let recent = store.find_recent(&AttemptQuery::for_user(user_id), HISTORY_WINDOW)?;
        let history = Self::from_recent(recent);

        tracing::debug!(
            user = %user_id,
            recent = history.recent.len(),
            completed_scored = history.completed_scored.len(),
            "Loaded attempt history"
        );

        Ok(history)
    }

    /// Build from an already fetched newest-first window.
    pub fn from_recent(recent: Vec<InterviewAttempt>) -> Self {
        let completed_scored = recent
            .iter()
            .filter(|a| a.is_completed_with_score())
            .cloned()
            .collect();
        Self {
            recent,
            completed_scored,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    /// Overall scores of completed attempts, newest first.
    pub fn scores(&self) -> Vec<f64> {
        self.completed_scored
            .iter()
            .filter_map(|a| a.overall_score)
            .collect()
    }

    /// Unweighted mean overall score of completed attempts.
    pub fn average_score(&self) -> Option<f64> {
        super::mean(&self.scores())
    }

    /// Mean of one score dimension over completed attempts where it is present.
    pub fn dimension_average(&self, field: ScoreField) -> Option<f64> {
        let values: Vec<f64> = self
            .completed_scored
            .iter()
            .filter_map(|a| field.value(a))
            .collect();
        super::mean(&values)
    }

    /// How often each character appears in the window, any status.
    pub fn usage_map(&self) -> UsageMap {
        let mut usage = UsageMap::new();
        for attempt in &self.recent {
            *usage.entry(attempt.character_id.clone()).or_insert(0) += 1;
        }
        usage
    }
}
