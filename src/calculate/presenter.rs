//! Display-ready summary of a single match.

use serde::Serialize;

use crate::models::value::{format_number, safe_text, to_date_label, DateStyle, TBA};
use crate::models::{Match, MatchStatus, ResolvedTeam, ScoreClass, Side, TeamDirectory};

/// Separator between map names in a match's map list.
pub const MAP_SEPARATOR: &str = " · ";

/// Everything a match card or match header shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub id: Option<String>,
    pub team_a: ResolvedTeam,
    pub team_b: ResolvedTeam,
    pub score_a: Option<f64>,
    pub score_b: Option<f64>,
    pub score_label_a: String,
    pub score_label_b: String,
    pub score_class_a: ScoreClass,
    pub score_class_b: ScoreClass,
    pub status: MatchStatus,
    pub status_label: &'static str,
    pub stage: String,
    pub format: String,
    pub time_label: String,
    pub map_label: String,
}

impl MatchSummary {
    pub fn score_label(&self) -> String {
        format!("{}:{}", self.score_label_a, self.score_label_b)
    }

    pub fn score_label_for(&self, side: Side) -> &str {
        match side {
            Side::A => &self.score_label_a,
            Side::B => &self.score_label_b,
        }
    }
}

/// Resolve the authoritative numeric score of a match.
///
/// The series score is used unless the match is a BO1 whose first map has
/// both sides scored, in which case that map's score wins.
pub fn resolve_score(m: &Match) -> (Option<f64>, Option<f64>) {
    if m.is_bo1() {
        if let Some((a, b)) = m.maps.first().and_then(|map| map.score.resolved()) {
            return (Some(a), Some(b));
        }
    }
    m.score.numbers()
}

/// The side that won a match, if both scores resolve and differ.
pub fn decided_winner(m: &Match) -> Option<Side> {
    match resolve_score(m) {
        (Some(a), Some(b)) if a > b => Some(Side::A),
        (Some(a), Some(b)) if a < b => Some(Side::B),
        _ => None,
    }
}

fn score_label(resolved: Option<f64>, raw: &serde_json::Value) -> String {
    match resolved {
        Some(score) => format_number(score),
        None => safe_text(raw, TBA),
    }
}

/// Map names joined for display, or `TBA` when no maps are listed.
pub fn map_label(m: &Match) -> String {
    if m.maps.is_empty() {
        return TBA.to_string();
    }
    m.maps
        .iter()
        .map(|map| safe_text(&map.name, TBA))
        .collect::<Vec<_>>()
        .join(MAP_SEPARATOR)
}

/// Summarize a match for list cards.
pub fn present(m: &Match, teams: &TeamDirectory) -> MatchSummary {
    present_with_style(m, teams, DateStyle::Short)
}

/// Summarize a match, choosing how much of its date to show.
pub fn present_with_style(m: &Match, teams: &TeamDirectory, style: DateStyle) -> MatchSummary {
    let (score_a, score_b) = resolve_score(m);
    let (score_class_a, score_class_b) = ScoreClass::classify(score_a, score_b);
    let status = m.status();

    MatchSummary {
        id: m.id(),
        team_a: teams.resolve(m.team_id(Side::A).as_deref()),
        team_b: teams.resolve(m.team_id(Side::B).as_deref()),
        score_a,
        score_b,
        score_label_a: score_label(score_a, &m.score.a),
        score_label_b: score_label(score_b, &m.score.b),
        score_class_a,
        score_class_b,
        status,
        status_label: status.label(),
        stage: safe_text(&m.stage, "阶段未定"),
        format: safe_text(&m.format, "BO?"),
        time_label: to_date_label(&m.time, style),
        map_label: map_label(m),
    }
}
