//! Plain-text rendering for `--format text`.

use chrono::{DateTime, Utc};
use mockprep_core::analytics::{RecommendationPayload, StatsReport};
use mockprep_core::attempts::AttemptPage;
use mockprep_core::catalog::{CategorySummary, Character, Profession, ProfessionMatch};
use mockprep_core::{AttemptSummary, InterviewAttempt};
use std::fmt::Write;

fn score(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.0}", v),
        None => "-".to_string(),
    }
}

fn date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

fn short_id(id: &str) -> &str {
    &id[..8.min(id.len())]
}

pub fn character(c: &Character) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} ({}) [{}]", c.name, c.id, c.difficulty);
    if let Some(badge) = &c.badge {
        let _ = write!(out, " {}", badge);
    }
    out.push('\n');
    if !c.title.is_empty() {
        let _ = writeln!(out, "  {}", c.title);
    }
    if !c.description.is_empty() {
        let _ = writeln!(out, "  {}", c.description);
    }
    out
}

pub fn characters(list: &[&Character]) -> String {
    if list.is_empty() {
        return "No characters found.\n".to_string();
    }
    list.iter().map(|c| character(c)).collect()
}

pub fn categories(list: &[CategorySummary]) -> String {
    let mut out = String::new();
    for category in list {
        let _ = writeln!(
            out,
            "{:<14} {:<24} {} professions",
            category.id, category.name, category.professions_count
        );
    }
    out
}

pub fn professions(list: &[Profession]) -> String {
    let mut out = String::new();
    for profession in list {
        let _ = writeln!(out, "{:<22} {}", profession.id, profession.name);
    }
    out
}

pub fn profession_matches(list: &[ProfessionMatch]) -> String {
    if list.is_empty() {
        return "No professions found.\n".to_string();
    }
    let mut out = String::new();
    for found in list {
        let _ = writeln!(
            out,
            "{:<22} {:<26} ({})",
            found.profession.id, found.profession.name, found.category.name
        );
    }
    out
}

pub fn attempt(a: &InterviewAttempt) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Attempt:        {}", a.id);
    let _ = writeln!(out, "Status:         {}", a.status.as_str());
    let _ = writeln!(out, "Profession:     {}", a.profession_id);
    let _ = writeln!(out, "Character:      {}", a.character_id);
    let _ = writeln!(out, "Started:        {}", date(a.started_at));
    if let Some(completed_at) = a.completed_at {
        let _ = writeln!(out, "Completed:      {}", date(completed_at));
    }
    if let Some(minutes) = a.duration_minutes {
        let _ = writeln!(out, "Duration:       {} min", minutes);
    }
    let _ = writeln!(
        out,
        "Scores:         overall {}, technical {}, communication {}, detail {}",
        score(a.overall_score),
        score(a.technical_score),
        score(a.communication_score),
        score(a.detailedness)
    );
    if a.question_count > 0 {
        let _ = writeln!(
            out,
            "Answers:        {}/{} ({}%)",
            a.correct_answers,
            a.question_count,
            a.success_rate()
        );
    }
    if !a.feedback.is_empty() {
        let _ = writeln!(out, "Feedback:       {}", a.feedback);
    }
    for strength in &a.strengths {
        let _ = writeln!(out, "  + {}", strength);
    }
    for improvement in &a.improvements {
        let _ = writeln!(out, "  - {}", improvement);
    }
    out
}

pub fn attempt_page(page: &AttemptPage) -> String {
    let mut out = String::new();
    if page.data.is_empty() {
        let _ = writeln!(out, "No attempts found.");
    }
    for a in &page.data {
        let _ = writeln!(
            out,
            "{}  {}  {:<11} {:<22} {:<8} {:>4}",
            short_id(a.id.as_str()),
            date(a.created_at),
            a.status.as_str(),
            a.profession_id,
            a.character_id,
            score(a.overall_score)
        );
    }
    let _ = writeln!(
        out,
        "Page {}/{} ({} of {} attempts)",
        page.page,
        page.pages.max(1),
        page.count,
        page.total
    );
    out
}

pub fn summaries(list: &[AttemptSummary]) -> String {
    if list.is_empty() {
        return "No completed attempts yet.\n".to_string();
    }
    let mut out = String::new();
    for s in list {
        let _ = writeln!(
            out,
            "{}  {}  {:<22} {:<8} {:>4}",
            short_id(s.id.as_str()),
            date(s.created_at),
            s.profession_id,
            s.character_id,
            score(s.overall_score)
        );
    }
    out
}

pub fn recommendation(payload: &RecommendationPayload) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", payload.message);
    if let Some(stats) = &payload.stats {
        let _ = writeln!(
            out,
            "Based on {} completed interviews (average {}).",
            stats.total_interviews, stats.average_score
        );
    }
    let _ = writeln!(out);
    let _ = write!(out, "Next interviewer: {}", character(&payload.data));
    out
}

pub fn stats(report: &StatsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Interviews:       {}", report.total_interviews);
    let _ = writeln!(out, "Last 7 days:      {}", report.recent_interviews);
    let _ = writeln!(out, "Average score:    {}", report.average_score);
    let _ = writeln!(out, "Average technical: {}", report.average_technical_score);

    if let Some(detailed) = &report.detailed_scores {
        let _ = writeln!(
            out,
            "Detailed:         technical {}, communication {}, detail {}",
            detailed.technical, detailed.communication, detailed.detailedness
        );
    }
    if let Some(best) = &report.best_score {
        let _ = writeln!(
            out,
            "Best score:       {:.0} ({} with {}, {})",
            best.score,
            best.profession_id,
            best.character_id,
            date(best.date)
        );
    }

    if !report.profession_stats.is_empty() {
        let _ = writeln!(out, "\nTop professions:");
        for p in &report.profession_stats {
            let _ = writeln!(
                out,
                "  {:<22} {:>3} interviews  avg {:>3}  tech {:>3}",
                p.profession_id, p.count, p.average_score, p.average_technical
            );
        }
    }
    if !report.character_stats.is_empty() {
        let _ = writeln!(out, "\nInterviewers:");
        for c in &report.character_stats {
            let _ = writeln!(
                out,
                "  {:<22} {:>3} interviews  avg {:>3}",
                c.character_id, c.count, c.average_score
            );
        }
    }
    if !report.progress_trend.is_empty() {
        let trend: Vec<String> = report
            .progress_trend
            .iter()
            .map(|p| score(p.overall_score))
            .collect();
        let _ = writeln!(out, "\nTrend:            {}", trend.join(" -> "));
    }
    out
}
