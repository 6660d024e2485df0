//! Attempt service: boundary validation and ownership checks around the
//! attempt records in [`Database`].
//!
//! Everything that reaches the analytics layer has passed through here, so
//! scores are known to be within [0, 100] and text fields within their
//! length limits.

use crate::analytics::round_half_up;
use crate::db::{AttemptFilter, Database};
use crate::error::{Error, Result};
use crate::store::{AttemptQuery, AttemptStore};
use crate::types::{
    AttemptId, AttemptStatus, AttemptSummary, AttemptUpdate, InterviewAttempt, NewAttempt, UserId,
};
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;

pub const MAX_FEEDBACK_LEN: usize = 2000;
pub const MAX_LIST_ITEM_LEN: usize = 500;
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Number of attempts returned by [`recent`].
pub const RECENT_LIMIT: usize = 5;

/// One page of a user's attempts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptPage {
    /// Attempts on this page
    pub count: usize,
    /// Attempts matching the filters across all pages
    pub total: i64,
    pub page: usize,
    pub pages: usize,
    pub data: Vec<InterviewAttempt>,
}

/// Filters and paging for [`list`].
#[derive(Debug, Clone)]
pub struct ListRequest {
    pub status: Option<AttemptStatus>,
    pub profession_id: Option<String>,
    pub limit: usize,
    /// 1-based
    pub page: usize,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            status: None,
            profession_id: None,
            limit: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

/// Record a finished attempt.
pub fn create(db: &Database, user_id: &UserId, input: NewAttempt) -> Result<InterviewAttempt> {
    let profession_id = required("professionId", &input.profession_id)?;
    let character_id = required("characterId", &input.character_id)?;
    validate_score("overallScore", input.overall_score)?;
    validate_score("technicalScore", input.technical_score)?;
    validate_score("communicationScore", input.communication_score)?;
    validate_score("detailedness", input.detailedness)?;
    if let Some(feedback) = &input.feedback {
        validate_feedback(feedback)?;
    }
    validate_items("strengths", &input.strengths)?;
    validate_items("improvements", &input.improvements)?;

    let now = Utc::now().trunc_subsecs(6);
    let completed_at = input.completed_at.map_or(now, |t| t.trunc_subsecs(6));
    let started_at = input
        .started_at
        .map_or(completed_at, |t| t.trunc_subsecs(6));
    if started_at > completed_at {
        return Err(Error::validation(
            "startedAt",
            "must not be later than completedAt",
        ));
    }
    let duration_minutes = input
        .duration
        .or_else(|| Some(elapsed_minutes(started_at, completed_at)));

    let attempt = InterviewAttempt {
        id: AttemptId::generate(),
        user_id: user_id.clone(),
        profession_id,
        character_id,
        status: AttemptStatus::Completed,
        started_at,
        completed_at: Some(completed_at),
        duration_minutes,
        overall_score: input.overall_score,
        technical_score: input.technical_score,
        communication_score: input.communication_score,
        detailedness: input.detailedness,
        feedback: input.feedback.unwrap_or_default(),
        strengths: input.strengths,
        improvements: input.improvements,
        recommendation: input.recommendation.unwrap_or_default(),
        question_count: input.question_count,
        correct_answers: input.correct_answers,
        created_at: now,
        updated_at: now,
    };

    db.insert_attempt(&attempt)?;
    tracing::info!(
        user = %user_id,
        attempt = %attempt.id,
        profession = %attempt.profession_id,
        character = %attempt.character_id,
        score = ?attempt.overall_score,
        "Attempt recorded"
    );

    Ok(attempt)
}

/// A page of the user's attempts, newest first.
pub fn list(db: &Database, user_id: &UserId, request: &ListRequest) -> Result<AttemptPage> {
    if request.limit == 0 || request.limit > MAX_PAGE_SIZE {
        return Err(Error::validation(
            "limit",
            format!("must be between 1 and {}", MAX_PAGE_SIZE),
        ));
    }
    if request.page == 0 {
        return Err(Error::validation("page", "must be at least 1"));
    }
    let offset = (request.page - 1)
        .checked_mul(request.limit)
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| Error::validation("page", format!("{} is out of range", request.page)))?;

    let filter = AttemptFilter {
        status: request.status,
        profession_id: request.profession_id.clone(),
        limit: request.limit,
        offset,
    };

    let data = db.list_attempts(user_id, &filter)?;
    let total = db.count_attempts(user_id, &filter)?;

    Ok(AttemptPage {
        count: data.len(),
        total,
        page: request.page,
        pages: (total.max(0) as usize + request.limit - 1) / request.limit,
        data,
    })
}

/// Fetch one attempt owned by `user_id`.
pub fn get(db: &Database, user_id: &UserId, id: &AttemptId) -> Result<InterviewAttempt> {
    let attempt = db.get_attempt(id)?.ok_or_else(|| Error::NotFound {
        entity: "attempt",
        id: id.to_string(),
    })?;

    if &attempt.user_id != user_id {
        tracing::warn!(user = %user_id, attempt = %id, "Attempt access denied");
        return Err(Error::AccessDenied(id.to_string()));
    }

    Ok(attempt)
}

/// Apply a partial update to an attempt owned by `user_id`.
pub fn update(
    db: &Database,
    user_id: &UserId,
    id: &AttemptId,
    changes: AttemptUpdate,
) -> Result<InterviewAttempt> {
    validate_score("overallScore", changes.overall_score)?;
    validate_score("technicalScore", changes.technical_score)?;
    validate_score("communicationScore", changes.communication_score)?;
    validate_score("detailedness", changes.detailedness)?;
    if let Some(feedback) = &changes.feedback {
        validate_feedback(feedback)?;
    }
    if let Some(strengths) = &changes.strengths {
        validate_items("strengths", strengths)?;
    }
    if let Some(improvements) = &changes.improvements {
        validate_items("improvements", improvements)?;
    }

    let mut attempt = get(db, user_id, id)?;
    if changes.is_empty() {
        return Ok(attempt);
    }

    let now = Utc::now().trunc_subsecs(6);
    apply_update(&mut attempt, changes, now);

    if !db.update_attempt(&attempt)? {
        // Deleted between the read and the write
        return Err(Error::NotFound {
            entity: "attempt",
            id: id.to_string(),
        });
    }

    tracing::info!(user = %user_id, attempt = %id, status = %attempt.status.as_str(), "Attempt updated");
    Ok(attempt)
}

/// Delete an attempt owned by `user_id`.
pub fn delete(db: &Database, user_id: &UserId, id: &AttemptId) -> Result<()> {
    get(db, user_id, id)?;

    if !db.delete_attempt(id)? {
        return Err(Error::NotFound {
            entity: "attempt",
            id: id.to_string(),
        });
    }

    tracing::info!(user = %user_id, attempt = %id, "Attempt deleted");
    Ok(())
}

/// The user's newest completed attempts.
pub fn recent(store: &dyn AttemptStore, user_id: &UserId) -> Result<Vec<AttemptSummary>> {
    let attempts = store.find_recent(&AttemptQuery::completed(user_id), RECENT_LIMIT)?;
    Ok(attempts.iter().map(AttemptSummary::from).collect())
}

fn apply_update(attempt: &mut InterviewAttempt, changes: AttemptUpdate, now: DateTime<Utc>) {
    if let Some(score) = changes.overall_score {
        attempt.overall_score = Some(score);
    }
    if let Some(score) = changes.technical_score {
        attempt.technical_score = Some(score);
    }
    if let Some(score) = changes.communication_score {
        attempt.communication_score = Some(score);
    }
    if let Some(score) = changes.detailedness {
        attempt.detailedness = Some(score);
    }
    if let Some(feedback) = changes.feedback {
        attempt.feedback = feedback;
    }
    if let Some(strengths) = changes.strengths {
        attempt.strengths = strengths;
    }
    if let Some(improvements) = changes.improvements {
        attempt.improvements = improvements;
    }
    if let Some(recommendation) = changes.recommendation {
        attempt.recommendation = recommendation;
    }
    if let Some(status) = changes.status {
        if status == AttemptStatus::Completed && attempt.completed_at.is_none() {
            attempt.completed_at = Some(now);
            if attempt.duration_minutes.is_none() {
                attempt.duration_minutes = Some(elapsed_minutes(attempt.started_at, now));
            }
        }
        attempt.status = status;
    }
    attempt.updated_at = now;
}

/// Whole minutes between two instants, halves rounded up.
fn elapsed_minutes(started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> u32 {
    let millis = (completed_at - started_at).num_milliseconds().max(0);
    round_half_up(millis as f64 / 60_000.0).clamp(0, i64::from(u32::MAX)) as u32
}

fn required(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(trimmed.to_string())
}

fn validate_score(field: &'static str, score: Option<f64>) -> Result<()> {
    match score {
        Some(value) if !value.is_finite() || !(0.0..=100.0).contains(&value) => Err(
            Error::validation(field, format!("{} is outside 0..=100", value)),
        ),
        _ => Ok(()),
    }
}

fn validate_feedback(feedback: &str) -> Result<()> {
    if feedback.chars().count() > MAX_FEEDBACK_LEN {
        return Err(Error::validation(
            "feedback",
            format!("must be at most {} characters", MAX_FEEDBACK_LEN),
        ));
    }
    Ok(())
}

fn validate_items(field: &'static str, items: &[String]) -> Result<()> {
    if items.iter().any(|item| item.chars().count() > MAX_LIST_ITEM_LEN) {
        return Err(Error::validation(
            field,
            format!("entries must be at most {} characters", MAX_LIST_ITEM_LEN),
        ));
    }
    Ok(())
}
