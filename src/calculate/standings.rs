//! League table derived from completed match outcomes.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Match, ResolvedTeam, Side, Streak, TeamDirectory, TBA_TEAM_ID};

use super::presenter::{decided_winner, present};
use super::{percent_label, win_rate};

/// The most recent completed match a team played.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastMatch {
    pub match_id: Option<String>,
    pub opponent: ResolvedTeam,
    pub team_score: String,
    pub opponent_score: String,
}

impl LastMatch {
    pub fn label(&self) -> String {
        format!(
            "vs {} {}:{}",
            self.opponent.name, self.team_score, self.opponent_score
        )
    }
}

/// One row of the standings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsRow {
    /// 1-based table position
    pub rank: usize,
    pub team: ResolvedTeam,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub win_rate_label: String,
    pub streak: Streak,
    pub streak_label: String,
    pub last_match: Option<LastMatch>,
    pub last_match_label: String,
}

#[derive(Debug, Default)]
struct Tally {
    wins: u32,
    losses: u32,
}

/// Completed matches in chronological order (stable for equal times).
fn completed_chronological(matches: &[Match]) -> Vec<&Match> {
    let mut completed: Vec<&Match> = matches.iter().filter(|m| m.is_completed()).collect();
    completed.sort_by_key(|m| m.time_key());
    completed
}

/// Current streak of `team_id`.
///
/// Completed matches are walked newest first. Undecided matches before the
/// first decided one are skipped; after that the run ends at the first
/// opposite result or the first undecided match. Matches missing either
/// team id are ignored, as they are for the win/loss tally.
pub fn streak_for(team_id: &str, matches: &[Match]) -> Streak {
    let mut newest_first: Vec<&Match> = matches
        .iter()
        .filter(|m| m.is_completed() && m.has_both_teams() && m.involves(team_id))
        .collect();
    newest_first.sort_by(|a, b| b.time_key().cmp(&a.time_key()));

    let mut run: Option<(bool, u32)> = None;
    for m in newest_first {
        let Some(side) = m.side_of(team_id) else {
            continue;
        };
        let won = match decided_winner(m) {
            Some(winner) => winner == side,
            None if run.is_none() => continue,
            None => break,
        };
        match run {
            None => run = Some((won, 1)),
            Some((kind, count)) if kind == won => run = Some((kind, count + 1)),
            Some(_) => break,
        }
    }

    match run {
        Some((true, n)) => Streak::Wins(n),
        Some((false, n)) => Streak::Losses(n),
        None => Streak::None,
    }
}

/// Build the standings table.
///
/// Every directory team except the TBA placeholder gets a row, as does any
/// other team id that appears in a completed match. Rows are ordered by
/// wins descending, then losses ascending; ties keep directory order.
pub fn build_standings(teams: &TeamDirectory, matches: &[Match]) -> Vec<StandingsRow> {
    let mut order: Vec<String> = teams
        .ids()
        .filter(|id| *id != TBA_TEAM_ID)
        .map(str::to_string)
        .collect();
    let mut tallies: HashMap<String, Tally> = order
        .iter()
        .map(|id| (id.clone(), Tally::default()))
        .collect();

    let completed = completed_chronological(matches);

    for m in &completed {
        let (Some(team_a), Some(team_b)) = (m.team_id(Side::A), m.team_id(Side::B)) else {
            continue;
        };
        for id in [&team_a, &team_b] {
            if id != TBA_TEAM_ID && !tallies.contains_key(id) {
                tallies.insert(id.clone(), Tally::default());
                order.push(id.clone());
            }
        }
        let (winner, loser) = match decided_winner(m) {
            Some(Side::A) => (team_a, team_b),
            Some(Side::B) => (team_b, team_a),
            None => continue,
        };
        if let Some(tally) = tallies.get_mut(&winner) {
            tally.wins += 1;
        }
        if let Some(tally) = tallies.get_mut(&loser) {
            tally.losses += 1;
        }
    }

    let mut rows: Vec<StandingsRow> = order
        .iter()
        .map(|id| {
            let tally = tallies.get(id).map_or((0, 0), |t| (t.wins, t.losses));
            let last_match = completed
                .iter()
                .rev()
                .find(|m| m.involves(id))
                .map(|m| last_match_for(id, m, teams));
            standings_row(id, tally, last_match, matches, teams)
        })
        .collect();

    rows.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.losses.cmp(&b.losses)));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

fn last_match_for(team_id: &str, m: &Match, teams: &TeamDirectory) -> LastMatch {
    let side = m.side_of(team_id).unwrap_or(Side::A);
    let summary = present(m, teams);
    let opponent = match side.opponent() {
        Side::A => summary.team_a.clone(),
        Side::B => summary.team_b.clone(),
    };
    LastMatch {
        match_id: summary.id.clone(),
        opponent,
        team_score: summary.score_label_for(side).to_string(),
        opponent_score: summary.score_label_for(side.opponent()).to_string(),
    }
}

fn standings_row(
    team_id: &str,
    (wins, losses): (u32, u32),
    last_match: Option<LastMatch>,
    matches: &[Match],
    teams: &TeamDirectory,
) -> StandingsRow {
    let rate = win_rate(wins, losses);
    let streak = streak_for(team_id, matches);
    StandingsRow {
        rank: 0,
        team: teams.resolve(Some(team_id)),
        wins,
        losses,
        win_rate: rate,
        win_rate_label: percent_label(rate),
        streak,
        streak_label: streak.to_string(),
        last_match_label: last_match
            .as_ref()
            .map_or_else(|| "TBA".to_string(), LastMatch::label),
        last_match,
    }
}
