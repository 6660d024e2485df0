//! Core domain types for mockprep
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Attempt** | One mock interview session, owned by a single user |
//! | **Character** | An interviewer persona from the catalog, with a difficulty tier |
//! | **Profession** | The job an attempt was practised for |
//! | **Tier** | Difficulty classification: easy, medium, hard, extreme |
//! | **Usage count** | How often a character appears in a user's recent attempts |
//!
//! Attempts reference characters and professions by id only; the catalog
//! is not consulted when an attempt is stored.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted user identifier.
pub const MAX_USER_ID_LEN: usize = 64;

// ============================================
// Identifiers
// ============================================

/// Opaque identifier of the user owning attempts.
///
/// Issued by the authentication layer; only its shape is checked here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a raw user identifier.
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_USER_ID_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(Error::InvalidIdentifier {
                entity: "user",
                value: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a stored attempt (hyphenated UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(String);

impl AttemptId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Validate and normalize a raw attempt identifier.
    pub fn parse(raw: &str) -> Result<Self> {
        uuid::Uuid::parse_str(raw.trim())
            .map(|id| Self(id.hyphenated().to_string()))
            .map_err(|_| Error::InvalidIdentifier {
                entity: "attempt",
                value: raw.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================
// Enumerations
// ============================================

/// Lifecycle state of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "in_progress",
            AttemptStatus::Completed => "completed",
            AttemptStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for AttemptStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(AttemptStatus::InProgress),
            "completed" => Ok(AttemptStatus::Completed),
            "cancelled" => Ok(AttemptStatus::Cancelled),
            _ => Err(format!("unknown attempt status: {}", s)),
        }
    }
}

/// Difficulty tier of an interviewer character.
///
/// Variants are declared from easiest to hardest so that `Ord` follows
/// difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "extreme" => Ok(Difficulty::Extreme),
            _ => Err(format!("unknown difficulty: {}", s)),
        }
    }
}

// ============================================
// Attempt records
// ============================================

/// One mock interview attempt as persisted in the record store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewAttempt {
    pub id: AttemptId,
    /// Owner; never changes after creation
    pub user_id: UserId,
    pub profession_id: String,
    pub character_id: String,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    /// Set whenever `status` is `Completed`
    pub completed_at: Option<DateTime<Utc>>,
    /// Whole minutes, derived once at completion when not supplied
    pub duration_minutes: Option<u32>,
    /// Scores are within [0, 100] when present
    pub overall_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub communication_score: Option<f64>,
    pub detailedness: Option<f64>,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendation: String,
    pub question_count: u32,
    /// Not checked against `question_count`
    pub correct_answers: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InterviewAttempt {
    /// Percentage of correct answers, rounded. Zero when no questions were asked.
    pub fn success_rate(&self) -> u32 {
        if self.question_count == 0 {
            return 0;
        }
        let rate = f64::from(self.correct_answers) / f64::from(self.question_count) * 100.0;
        crate::analytics::round_half_up(rate).max(0) as u32
    }

    /// Whether this attempt counts towards scored history.
    pub fn is_completed_with_score(&self) -> bool {
        self.status == AttemptStatus::Completed && self.overall_score.is_some()
    }
}

/// Input for recording a finished attempt.
///
/// `weaknesses` is accepted as the legacy name of `improvements`; sending
/// both is rejected by the deserializer as a duplicate field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAttempt {
    pub profession_id: String,
    pub character_id: String,
    pub overall_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub communication_score: Option<f64>,
    pub detailedness: Option<f64>,
    pub feedback: Option<String>,
    pub strengths: Vec<String>,
    #[serde(alias = "weaknesses")]
    pub improvements: Vec<String>,
    pub recommendation: Option<String>,
    pub question_count: u32,
    pub correct_answers: u32,
    /// Minutes reported by the client; derived from timestamps otherwise
    #[serde(alias = "durationMinutes")]
    pub duration: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Partial update of an attempt. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttemptUpdate {
    pub overall_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub communication_score: Option<f64>,
    pub detailedness: Option<f64>,
    pub feedback: Option<String>,
    pub strengths: Option<Vec<String>>,
    #[serde(alias = "weaknesses")]
    pub improvements: Option<Vec<String>>,
    pub status: Option<AttemptStatus>,
    pub recommendation: Option<String>,
}

impl AttemptUpdate {
    pub fn is_empty(&self) -> bool {
        self.overall_score.is_none()
            && self.technical_score.is_none()
            && self.communication_score.is_none()
            && self.detailedness.is_none()
            && self.feedback.is_none()
            && self.strengths.is_none()
            && self.improvements.is_none()
            && self.status.is_none()
            && self.recommendation.is_none()
    }
}

/// Compact view of an attempt for "recent activity" lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub id: AttemptId,
    pub profession_id: String,
    pub character_id: String,
    pub overall_score: Option<f64>,
    pub duration_minutes: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl From<&InterviewAttempt> for AttemptSummary {
    fn from(attempt: &InterviewAttempt) -> Self {
        Self {
            id: attempt.id.clone(),
            profession_id: attempt.profession_id.clone(),
            character_id: attempt.character_id.clone(),
            overall_score: attempt.overall_score,
            duration_minutes: attempt.duration_minutes,
            created_at: attempt.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_validation() {
        assert!(UserId::parse("user_42-a").is_ok());
        assert!(UserId::parse("").is_err());
        assert!(UserId::parse("has space").is_err());
        assert!(UserId::parse("../etc").is_err());
        assert!(UserId::parse(&"x".repeat(MAX_USER_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_attempt_id_normalizes() {
        let id = AttemptId::parse("  67E55044-10B1-426F-9247-BB680E5FE0C8 ").unwrap();
        assert_eq!(id.as_str(), "67e55044-10b1-426f-9247-bb680e5fe0c8");

        let err = AttemptId::parse("not-a-uuid").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidIdentifier);
    }

    #[test]
    fn test_difficulty_ordering_and_parse() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Hard < Difficulty::Extreme);
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("legendary".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [
            AttemptStatus::InProgress,
            AttemptStatus::Completed,
            AttemptStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<AttemptStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_new_attempt_accepts_legacy_weaknesses() {
        let input: NewAttempt = serde_json::from_str(
            r#"{"professionId":"backend-developer","characterId":"joe","weaknesses":["pacing"]}"#,
        )
        .unwrap();
        assert_eq!(input.improvements, vec!["pacing".to_string()]);

        let both = serde_json::from_str::<NewAttempt>(
            r#"{"professionId":"p","characterId":"c","weaknesses":["a"],"improvements":["b"]}"#,
        );
        assert!(both.is_err());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(AttemptUpdate::default().is_empty());
        let update: AttemptUpdate = serde_json::from_str(r#"{"feedback":"better"}"#).unwrap();
        assert!(!update.is_empty());
    }
}
