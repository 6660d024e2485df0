//! Database repository layer
//!
//! Provides insert, query and update operations for interview attempts and
//! implements [`AttemptStore`] on top of them.

use crate::error::Result;
use crate::store::{
    AttemptQuery, AttemptStore, GroupAverage, GroupKey, ScoreField, SortDirection,
};
use crate::types::*;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Filters for listing a user's attempts page by page.
#[derive(Debug, Clone)]
pub struct AttemptFilter {
    /// Filter by status
    pub status: Option<AttemptStatus>,
    /// Filter by profession
    pub profession_id: Option<String>,
    /// Page size
    pub limit: usize,
    /// Rows to skip
    pub offset: usize,
}

impl Default for AttemptFilter {
    fn default() -> Self {
        Self {
            status: None,
            profession_id: None,
            limit: 10,
            offset: 0,
        }
    }
}

impl AttemptFilter {
    fn to_query(&self, user_id: &UserId) -> AttemptQuery {
        let mut query = AttemptQuery::for_user(user_id);
        if let Some(status) = self.status {
            query = query.with_status(status);
        }
        if let Some(profession_id) = &self.profession_id {
            query = query.with_profession(profession_id.as_str());
        }
        query
    }
}

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so that text
/// comparison matches chronological order.
fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn parse_ts(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn where_clause(query: &AttemptQuery) -> (String, Vec<String>) {
    let mut clauses = vec!["user_id = ?"];
    let mut values = vec![query.user_id.as_str().to_string()];

    if let Some(status) = query.status {
        clauses.push("status = ?");
        values.push(status.as_str().to_string());
    }
    if let Some(since) = &query.created_since {
        clauses.push("created_at >= ?");
        values.push(ts(since));
    }
    if let Some(profession_id) = &query.profession_id {
        clauses.push("profession_id = ?");
        values.push(profession_id.clone());
    }

    (clauses.join(" AND "), values)
}

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )?;

        tracing::debug!(path = %path.display(), "Database opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.connection();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    ///
    /// A panic while the lock was held leaves SQLite itself consistent, so a
    /// poisoned lock is recovered rather than propagated.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ============================================
    // Attempt operations
    // ============================================

    /// Insert a new attempt
    pub fn insert_attempt(&self, attempt: &InterviewAttempt) -> Result<()> {
        let strengths = serde_json::to_string(&attempt.strengths)?;
        let improvements = serde_json::to_string(&attempt.improvements)?;

        let conn = self.connection();
        conn.execute(
            r#"
            INSERT INTO interviews (id, user_id, profession_id, character_id, status,
                                    started_at, completed_at, duration_minutes,
                                    overall_score, technical_score, communication_score, detailedness,
                                    feedback, strengths, improvements, recommendation,
                                    question_count, correct_answers, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                    ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            "#,
            params![
                attempt.id.as_str(),
                attempt.user_id.as_str(),
                attempt.profession_id,
                attempt.character_id,
                attempt.status.as_str(),
                ts(&attempt.started_at),
                attempt.completed_at.as_ref().map(ts),
                attempt.duration_minutes,
                attempt.overall_score,
                attempt.technical_score,
                attempt.communication_score,
                attempt.detailedness,
                attempt.feedback,
                strengths,
                improvements,
                attempt.recommendation,
                attempt.question_count,
                attempt.correct_answers,
                ts(&attempt.created_at),
                ts(&attempt.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Get an attempt by ID
    pub fn get_attempt(&self, id: &AttemptId) -> Result<Option<InterviewAttempt>> {
        let conn = self.connection();
        let attempt = conn
            .query_row(
                "SELECT * FROM interviews WHERE id = ?",
                [id.as_str()],
                Self::row_to_attempt,
            )
            .optional()?;
        Ok(attempt)
    }

    /// List a user's attempts, newest first
    pub fn list_attempts(
        &self,
        user_id: &UserId,
        filter: &AttemptFilter,
    ) -> Result<Vec<InterviewAttempt>> {
        let (clause, values) = where_clause(&filter.to_query(user_id));
        let sql = format!(
            "SELECT * FROM interviews WHERE {} ORDER BY created_at DESC, rowid DESC LIMIT {} OFFSET {}",
            clause, filter.limit, filter.offset
        );

        let conn = self.connection();
        let mut stmt = conn.prepare(&sql)?;
        let attempts = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_attempt)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(attempts)
    }

    /// Count a user's attempts matching the filter (ignores paging)
    pub fn count_attempts(&self, user_id: &UserId, filter: &AttemptFilter) -> Result<i64> {
        self.count_where(&filter.to_query(user_id))
    }

    /// Persist the mutable fields of an attempt.
    ///
    /// Ownership, identity and creation fields are never rewritten. Returns
    /// false when no attempt has this ID.
    pub fn update_attempt(&self, attempt: &InterviewAttempt) -> Result<bool> {
        let strengths = serde_json::to_string(&attempt.strengths)?;
        let improvements = serde_json::to_string(&attempt.improvements)?;

        let conn = self.connection();
        let changed = conn.execute(
            r#"
            UPDATE interviews SET
                status = ?2,
                completed_at = ?3,
                duration_minutes = ?4,
                overall_score = ?5,
                technical_score = ?6,
                communication_score = ?7,
                detailedness = ?8,
                feedback = ?9,
                strengths = ?10,
                improvements = ?11,
                recommendation = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
            params![
                attempt.id.as_str(),
                attempt.status.as_str(),
                attempt.completed_at.as_ref().map(ts),
                attempt.duration_minutes,
                attempt.overall_score,
                attempt.technical_score,
                attempt.communication_score,
                attempt.detailedness,
                attempt.feedback,
                strengths,
                improvements,
                attempt.recommendation,
                ts(&attempt.updated_at),
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete an attempt. Returns false when it did not exist.
    pub fn delete_attempt(&self, id: &AttemptId) -> Result<bool> {
        let conn = self.connection();
        let changed = conn.execute("DELETE FROM interviews WHERE id = ?", [id.as_str()])?;
        Ok(changed > 0)
    }

    fn row_to_attempt(row: &Row) -> rusqlite::Result<InterviewAttempt> {
        let id_str: String = row.get("id")?;
        let user_str: String = row.get("user_id")?;
        let status_str: String = row.get("status")?;
        let started_at_str: String = row.get("started_at")?;
        let completed_at_str: Option<String> = row.get("completed_at")?;
        let strengths_str: String = row.get("strengths")?;
        let improvements_str: String = row.get("improvements")?;
        let created_at_str: String = row.get("created_at")?;
        let updated_at_str: String = row.get("updated_at")?;

        Ok(InterviewAttempt {
            id: AttemptId::parse(&id_str).map_err(|e| conversion_error(0, e))?,
            user_id: UserId::parse(&user_str).map_err(|e| conversion_error(1, e))?,
            profession_id: row.get("profession_id")?,
            character_id: row.get("character_id")?,
            status: status_str
                .parse::<AttemptStatus>()
                .map_err(|e| conversion_error(4, e))?,
            started_at: parse_ts(5, &started_at_str)?,
            completed_at: completed_at_str
                .as_deref()
                .map(|s| parse_ts(6, s))
                .transpose()?,
            duration_minutes: row.get("duration_minutes")?,
            overall_score: row.get("overall_score")?,
            technical_score: row.get("technical_score")?,
            communication_score: row.get("communication_score")?,
            detailedness: row.get("detailedness")?,
            feedback: row.get("feedback")?,
            strengths: serde_json::from_str(&strengths_str).map_err(|e| conversion_error(13, e))?,
            improvements: serde_json::from_str(&improvements_str)
                .map_err(|e| conversion_error(14, e))?,
            recommendation: row.get("recommendation")?,
            question_count: row.get("question_count")?,
            correct_answers: row.get("correct_answers")?,
            created_at: parse_ts(18, &created_at_str)?,
            updated_at: parse_ts(19, &updated_at_str)?,
        })
    }
}

impl AttemptStore for Database {
    fn find_recent(&self, query: &AttemptQuery, limit: usize) -> Result<Vec<InterviewAttempt>> {
        let (clause, values) = where_clause(query);
        let sql = format!(
            "SELECT * FROM interviews WHERE {} ORDER BY created_at DESC, rowid DESC LIMIT {}",
            clause, limit
        );

        let conn = self.connection();
        let mut stmt = conn.prepare(&sql)?;
        let attempts = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_attempt)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(attempts)
    }

    fn count_where(&self, query: &AttemptQuery) -> Result<i64> {
        let (clause, values) = where_clause(query);
        let sql = format!("SELECT COUNT(*) FROM interviews WHERE {}", clause);

        let conn = self.connection();
        let count = conn.query_row(&sql, params_from_iter(values.iter()), |r| r.get(0))?;
        Ok(count)
    }

    fn group_average(
        &self,
        query: &AttemptQuery,
        key: GroupKey,
        fields: &[ScoreField],
    ) -> Result<Vec<GroupAverage>> {
        let key_expr = match key {
            GroupKey::All => "NULL",
            GroupKey::Profession => "profession_id",
            GroupKey::Character => "character_id",
        };

        let mut columns = vec![format!("{} AS group_key", key_expr), "COUNT(*)".to_string()];
        columns.extend(fields.iter().map(|f| format!("AVG({})", f.column())));

        let (clause, values) = where_clause(query);
        let mut sql = format!(
            "SELECT {} FROM interviews WHERE {}",
            columns.join(", "),
            clause
        );
        if key != GroupKey::All {
            sql.push_str(&format!(" GROUP BY {}", key_expr));
        }

        let conn = self.connection();
        let mut stmt = conn.prepare(&sql)?;
        let groups = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                let mut means = Vec::with_capacity(fields.len());
                for (i, field) in fields.iter().enumerate() {
                    means.push((*field, row.get::<_, Option<f64>>(i + 2)?));
                }
                Ok(GroupAverage {
                    key: row.get(0)?,
                    count: row.get(1)?,
                    means,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // An ungrouped aggregate yields one row even when nothing matched
        Ok(groups.into_iter().filter(|g| g.count > 0).collect())
    }

    fn find_extremal(
        &self,
        query: &AttemptQuery,
        field: ScoreField,
        direction: SortDirection,
    ) -> Result<Option<InterviewAttempt>> {
        let (clause, values) = where_clause(query);
        let order = match direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        let sql = format!(
            "SELECT * FROM interviews WHERE {} AND {col} IS NOT NULL ORDER BY {col} {}, rowid ASC LIMIT 1",
            clause,
            order,
            col = field.column()
        );

        let conn = self.connection();
        let attempt = conn
            .query_row(&sql, params_from_iter(values.iter()), Self::row_to_attempt)
            .optional()?;
        Ok(attempt)
    }
}
