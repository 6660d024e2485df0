//! User statistics report.
//!
//! Unlike the recommendation path this covers every completed attempt of a
//! user, not just the recent window. Each figure comes from one store
//! primitive; the first failing call aborts the whole report.

use super::round_half_up;
use crate::error::Result;
use crate::store::{AttemptQuery, AttemptStore, GroupAverage, GroupKey, ScoreField, SortDirection};
use crate::types::{AttemptId, UserId};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Maximum number of profession groups in a report.
pub const TOP_PROFESSIONS: usize = 5;

/// Number of completed attempts in the progress trend.
pub const TREND_LENGTH: usize = 10;

/// Trailing window for `recent_interviews`, in days.
pub const RECENT_DAYS: i64 = 7;

const ALL_FIELDS: [ScoreField; 4] = [
    ScoreField::Overall,
    ScoreField::Technical,
    ScoreField::Communication,
    ScoreField::Detailedness,
];

/// Statistics payload for a single user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub total_interviews: i64,
    pub average_score: i64,
    pub average_technical_score: i64,
    /// `None` until the user completes an attempt
    pub detailed_scores: Option<DetailedScores>,
    pub best_score: Option<BestScore>,
    pub recent_interviews: i64,
    pub profession_stats: Vec<ProfessionStat>,
    pub character_stats: Vec<CharacterStat>,
    /// Oldest first
    pub progress_trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedScores {
    pub technical: i64,
    pub communication: i64,
    pub detailedness: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestScore {
    pub score: f64,
    pub attempt_id: AttemptId,
    pub profession_id: String,
    pub character_id: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionStat {
    pub profession_id: String,
    pub count: i64,
    pub average_score: i64,
    pub average_technical: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStat {
    pub character_id: String,
    pub count: i64,
    pub average_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub overall_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub communication_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Generate the statistics report as of now.
pub fn generate_stats(store: &dyn AttemptStore, user_id: &UserId) -> Result<StatsReport> {
    generate_stats_at(store, user_id, Utc::now())
}

/// Generate the statistics report as of `now`.
///
/// `now` only anchors the trailing [`RECENT_DAYS`] window.
pub fn generate_stats_at(
    store: &dyn AttemptStore,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> Result<StatsReport> {
    let completed = AttemptQuery::completed(user_id);

    let total_interviews = store.count_where(&completed)?;

    let overall = store
        .group_average(&completed, GroupKey::All, &ALL_FIELDS)?
        .into_iter()
        .next();

    let best_score = store
        .find_extremal(&completed, ScoreField::Overall, SortDirection::Descending)?
        .and_then(|attempt| {
            attempt.overall_score.map(|score| BestScore {
                score,
                attempt_id: attempt.id,
                profession_id: attempt.profession_id,
                character_id: attempt.character_id,
                date: attempt.created_at,
            })
        });

    let window_start = now - Duration::days(RECENT_DAYS);
    let recent_interviews = store.count_where(&completed.clone().since(window_start))?;

    let mut professions = store.group_average(
        &completed,
        GroupKey::Profession,
        &[ScoreField::Overall, ScoreField::Technical],
    )?;
    sort_groups(&mut professions);
    let profession_stats: Vec<ProfessionStat> = professions
        .into_iter()
        .take(TOP_PROFESSIONS)
        .map(|group| ProfessionStat {
            average_score: rounded(group.mean(ScoreField::Overall)),
            average_technical: rounded(group.mean(ScoreField::Technical)),
            count: group.count,
            profession_id: group.key.unwrap_or_default(),
        })
        .collect();

    let mut characters = store.group_average(&completed, GroupKey::Character, &[ScoreField::Overall])?;
    sort_groups(&mut characters);
    let character_stats: Vec<CharacterStat> = characters
        .into_iter()
        .map(|group| CharacterStat {
            average_score: rounded(group.mean(ScoreField::Overall)),
            count: group.count,
            character_id: group.key.unwrap_or_default(),
        })
        .collect();

    // Store returns newest first; the trend reads oldest first
    let mut progress_trend: Vec<TrendPoint> = store
        .find_recent(&completed, TREND_LENGTH)?
        .into_iter()
        .map(|attempt| TrendPoint {
            overall_score: attempt.overall_score,
            technical_score: attempt.technical_score,
            communication_score: attempt.communication_score,
            created_at: attempt.created_at,
        })
        .collect();
    progress_trend.reverse();

    let detailed_scores = overall.as_ref().map(|group| DetailedScores {
        technical: rounded(group.mean(ScoreField::Technical)),
        communication: rounded(group.mean(ScoreField::Communication)),
        detailedness: rounded(group.mean(ScoreField::Detailedness)),
    });
    let mean_of = |field| rounded(overall.as_ref().and_then(|group| group.mean(field)));

    let report = StatsReport {
        total_interviews,
        average_score: mean_of(ScoreField::Overall),
        average_technical_score: mean_of(ScoreField::Technical),
        detailed_scores,
        best_score,
        recent_interviews,
        profession_stats,
        character_stats,
        progress_trend,
    };

    tracing::info!(
        user = %user_id,
        total = report.total_interviews,
        recent = report.recent_interviews,
        professions = report.profession_stats.len(),
        characters = report.character_stats.len(),
        "Statistics generated"
    );

    Ok(report)
}

fn rounded(mean: Option<f64>) -> i64 {
    mean.map(round_half_up).unwrap_or(0)
}

/// Count descending, then key ascending.
fn sort_groups(groups: &mut [GroupAverage]) {
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::{Error, ErrorKind};
    use crate::types::{AttemptStatus, InterviewAttempt};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    struct Seed<'a> {
        profession: &'a str,
        character: &'a str,
        status: AttemptStatus,
        overall: Option<f64>,
        technical: Option<f64>,
        age_hours: i64,
    }

    impl<'a> Seed<'a> {
        fn completed(profession: &'a str, overall: f64, age_hours: i64) -> Self {
            Self {
                profession,
                character: "joe",
                status: AttemptStatus::Completed,
                overall: Some(overall),
                technical: None,
                age_hours,
            }
        }
    }

    fn insert(db: &Database, seed: Seed<'_>) -> InterviewAttempt {
        let created_at = now() - Duration::hours(seed.age_hours);
        let attempt = InterviewAttempt {
            id: AttemptId::generate(),
            user_id: UserId::parse("alice").unwrap(),
            profession_id: seed.profession.to_string(),
            character_id: seed.character.to_string(),
            status: seed.status,
            started_at: created_at,
            completed_at: Some(created_at),
            duration_minutes: Some(20),
            overall_score: seed.overall,
            technical_score: seed.technical,
            communication_score: None,
            detailedness: None,
            feedback: String::new(),
            strengths: vec![],
            improvements: vec![],
            recommendation: String::new(),
            question_count: 0,
            correct_answers: 0,
            created_at,
            updated_at: created_at,
        };
        db.insert_attempt(&attempt).unwrap();
        attempt
    }

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn user() -> UserId {
        UserId::parse("alice").unwrap()
    }

    #[test]
    fn test_zero_state() {
        let db = test_db();
        insert(
            &db,
            Seed {
                status: AttemptStatus::InProgress,
                ..Seed::completed("nurse", 70.0, 1)
            },
        );

        let report = generate_stats_at(&db, &user(), now()).unwrap();
        assert_eq!(report.total_interviews, 0);
        assert_eq!(report.average_score, 0);
        assert_eq!(report.average_technical_score, 0);
        assert_eq!(report.detailed_scores, None);
        assert_eq!(report.best_score, None);
        assert_eq!(report.recent_interviews, 0);
        assert!(report.profession_stats.is_empty());
        assert!(report.character_stats.is_empty());
        assert!(report.progress_trend.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["bestScore"].is_null());
        assert!(json["detailedScores"].is_null());
        assert_eq!(json["averageScore"], 0);
    }

    #[test]
    fn test_totals_and_rounded_means() {
        let db = test_db();
        insert(
            &db,
            Seed {
                technical: Some(70.0),
                ..Seed::completed("nurse", 40.0, 1)
            },
        );
        insert(&db, Seed::completed("nurse", 45.0, 2));
        insert(
            &db,
            Seed {
                status: AttemptStatus::Cancelled,
                ..Seed::completed("nurse", 100.0, 3)
            },
        );

        let report = generate_stats_at(&db, &user(), now()).unwrap();
        assert_eq!(report.total_interviews, 2);
        assert_eq!(report.average_score, 43);
        assert_eq!(report.average_technical_score, 70);
        assert_eq!(
            report.detailed_scores,
            Some(DetailedScores {
                technical: 70,
                communication: 0,
                detailedness: 0,
            })
        );
    }

    #[test]
    fn test_profession_stats_capped_and_ordered() {
        let db = test_db();
        let professions = [
            ("p1", 1),
            ("p2", 4),
            ("p3", 2),
            ("p4", 6),
            ("p5", 3),
            ("p6", 5),
            ("p7", 2),
        ];
        for (profession, count) in professions {
            for i in 0..count {
                insert(&db, Seed::completed(profession, 60.0, i));
            }
        }

        let report = generate_stats_at(&db, &user(), now()).unwrap();
        let ids: Vec<&str> = report
            .profession_stats
            .iter()
            .map(|s| s.profession_id.as_str())
            .collect();
        assert_eq!(ids, vec!["p4", "p6", "p2", "p5", "p3"]);
        assert_eq!(report.profession_stats[0].count, 6);
        assert_eq!(report.profession_stats[0].average_score, 60);
    }

    #[test]
    fn test_character_stats_uncapped() {
        let db = test_db();
        for (i, character) in ["a", "b", "c", "d", "e", "f", "g"].into_iter().enumerate() {
            insert(
                &db,
                Seed {
                    character,
                    ..Seed::completed("nurse", 50.0 + i as f64, i as i64)
                },
            );
        }
        insert(
            &db,
            Seed {
                character: "g",
                ..Seed::completed("nurse", 80.0, 10)
            },
        );

        let report = generate_stats_at(&db, &user(), now()).unwrap();
        assert_eq!(report.character_stats.len(), 7);
        assert_eq!(report.character_stats[0].character_id, "g");
        assert_eq!(report.character_stats[0].count, 2);
        assert_eq!(report.character_stats[0].average_score, 68);
    }

    #[test]
    fn test_trend_is_chronological_and_bounded() {
        let db = test_db();
        for age in 0..12 {
            insert(&db, Seed::completed("nurse", age as f64, age));
        }

        let report = generate_stats_at(&db, &user(), now()).unwrap();
        assert_eq!(report.progress_trend.len(), TREND_LENGTH);
        assert!(report
            .progress_trend
            .windows(2)
            .all(|w| w[0].created_at <= w[1].created_at));
        // newest ten are ages 0..=9, oldest of them first
        assert_eq!(report.progress_trend[0].overall_score, Some(9.0));
        assert_eq!(report.progress_trend[9].overall_score, Some(0.0));
    }

    #[test]
    fn test_best_score_tie_goes_to_first_stored() {
        let db = test_db();
        let first = insert(&db, Seed::completed("nurse", 88.0, 5));
        insert(&db, Seed::completed("pharmacist", 88.0, 1));
        insert(&db, Seed::completed("nurse", 70.0, 2));

        let best = generate_stats_at(&db, &user(), now())
            .unwrap()
            .best_score
            .unwrap();
        assert_eq!(best.score, 88.0);
        assert_eq!(best.attempt_id, first.id);
        assert_eq!(best.profession_id, "nurse");
    }

    #[test]
    fn test_recent_window_is_inclusive() {
        let db = test_db();
        insert(&db, Seed::completed("nurse", 50.0, 1));
        insert(&db, Seed::completed("nurse", 50.0, RECENT_DAYS * 24));
        insert(&db, Seed::completed("nurse", 50.0, RECENT_DAYS * 24 + 1));

        let report = generate_stats_at(&db, &user(), now()).unwrap();
        assert_eq!(report.total_interviews, 3);
        assert_eq!(report.recent_interviews, 2);
    }

    #[test]
    fn test_other_users_are_excluded() {
        let db = test_db();
        insert(&db, Seed::completed("nurse", 90.0, 1));

        let bob = UserId::parse("bob").unwrap();
        let report = generate_stats_at(&db, &bob, now()).unwrap();
        assert_eq!(report.total_interviews, 0);
    }

    struct FailingGroups(Database);

    impl AttemptStore for FailingGroups {
        fn find_recent(&self, q: &AttemptQuery, limit: usize) -> Result<Vec<InterviewAttempt>> {
            self.0.find_recent(q, limit)
        }
        fn count_where(&self, q: &AttemptQuery) -> Result<i64> {
            self.0.count_where(q)
        }
        fn group_average(&self, _: &AttemptQuery, _: GroupKey, _: &[ScoreField]) -> Result<Vec<GroupAverage>> {
            Err(Error::Database(rusqlite::Error::InvalidQuery))
        }
        fn find_extremal(
            &self,
            q: &AttemptQuery,
            field: ScoreField,
            direction: SortDirection,
        ) -> Result<Option<InterviewAttempt>> {
            self.0.find_extremal(q, field, direction)
        }
    }

    #[test]
    fn test_store_failure_aborts_report() {
        let db = test_db();
        insert(&db, Seed::completed("nurse", 90.0, 1));

        let err = generate_stats_at(&FailingGroups(db), &user(), now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }
}
