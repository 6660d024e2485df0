//! Record store interface consumed by the analytics layer.
//!
//! The analytics code never issues SQL itself. It describes what it needs
//! with an [`AttemptQuery`] and one of four primitives (recent records,
//! counts, grouped means, extremal record); [`crate::Database`] answers them
//! from SQLite, and tests can substitute their own implementation.

use crate::error::Result;
use crate::types::{AttemptStatus, InterviewAttempt, UserId};
use chrono::{DateTime, Utc};

/// Predicate over attempts. Every set field narrows the match.
#[derive(Debug, Clone)]
pub struct AttemptQuery {
    pub user_id: UserId,
    pub status: Option<AttemptStatus>,
    /// Inclusive lower bound on `created_at`
    pub created_since: Option<DateTime<Utc>>,
    pub profession_id: Option<String>,
}

impl AttemptQuery {
    /// All attempts of a user, any status.
    pub fn for_user(user_id: &UserId) -> Self {
        Self {
            user_id: user_id.clone(),
            status: None,
            created_since: None,
            profession_id: None,
        }
    }

    /// Completed attempts of a user.
    pub fn completed(user_id: &UserId) -> Self {
        Self::for_user(user_id).with_status(AttemptStatus::Completed)
    }

    pub fn with_status(mut self, status: AttemptStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn since(mut self, at: DateTime<Utc>) -> Self {
        self.created_since = Some(at);
        self
    }

    pub fn with_profession(mut self, profession_id: impl Into<String>) -> Self {
        self.profession_id = Some(profession_id.into());
        self
    }
}

/// Numeric attempt fields that can be averaged or ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreField {
    Overall,
    Technical,
    Communication,
    Detailedness,
}

impl ScoreField {
    /// Column holding this field in the `interviews` table.
    pub fn column(&self) -> &'static str {
        match self {
            ScoreField::Overall => "overall_score",
            ScoreField::Technical => "technical_score",
            ScoreField::Communication => "communication_score",
            ScoreField::Detailedness => "detailedness",
        }
    }

    pub fn value(&self, attempt: &InterviewAttempt) -> Option<f64> {
        match self {
            ScoreField::Overall => attempt.overall_score,
            ScoreField::Technical => attempt.technical_score,
            ScoreField::Communication => attempt.communication_score,
            ScoreField::Detailedness => attempt.detailedness,
        }
    }
}

/// How matching attempts are partitioned by [`AttemptStore::group_average`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// A single group over every match
    All,
    Profession,
    Character,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One group produced by [`AttemptStore::group_average`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAverage {
    /// Group key value; `None` for [`GroupKey::All`]
    pub key: Option<String>,
    /// Number of attempts in the group (always > 0)
    pub count: i64,
    /// Mean of each requested field over attempts where it is present
    pub means: Vec<(ScoreField, Option<f64>)>,
}

impl GroupAverage {
    pub fn mean(&self, field: ScoreField) -> Option<f64> {
        self.means
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, mean)| *mean)
    }
}

/// Query primitives over persisted attempts.
///
/// Implementations must return errors rather than partial data; callers
/// propagate the first failure.
pub trait AttemptStore: Send + Sync {
    /// Matching attempts, newest first by `created_at`, at most `limit`.
    fn find_recent(&self, query: &AttemptQuery, limit: usize) -> Result<Vec<InterviewAttempt>>;

    /// Number of matching attempts.
    fn count_where(&self, query: &AttemptQuery) -> Result<i64>;

    /// Grouped counts and means. Empty groups are never returned; group
    /// order is unspecified.
    fn group_average(
        &self,
        query: &AttemptQuery,
        key: GroupKey,
        fields: &[ScoreField],
    ) -> Result<Vec<GroupAverage>>;

    /// The matching attempt with the smallest or largest present `field`.
    /// Ties go to the earliest stored attempt.
    fn find_extremal(
        &self,
        query: &AttemptQuery,
        field: ScoreField,
        direction: SortDirection,
    ) -> Result<Option<InterviewAttempt>>;
}
