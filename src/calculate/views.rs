//! Page-level views assembled from the match, stats and standings
//! computations: the schedule, a match's detail page and a team's page.

use serde::Serialize;

use crate::models::value::{safe_text, text_of, DateStyle};
use crate::models::{Match, Snapshot, TeamDirectory};

use super::aggregate::{build_match_stats, MatchStats, StatsView};
use super::presenter::{present, present_with_style, MatchSummary};

/// Matches shown on a team page per list.
pub const TEAM_PAGE_LIMIT: usize = 3;

/// The home page match lists, both in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub upcoming: Vec<MatchSummary>,
    pub completed: Vec<MatchSummary>,
}

fn chronological(matches: &[Match]) -> Vec<&Match> {
    let mut sorted: Vec<&Match> = matches.iter().collect();
    sorted.sort_by_key(|m| m.time_key());
    sorted
}

pub fn build_schedule(snapshot: &Snapshot) -> Schedule {
    let (completed, upcoming): (Vec<&Match>, Vec<&Match>) = chronological(&snapshot.matches)
        .into_iter()
        .partition(|m| m.is_completed());

    let summarize = |ms: Vec<&Match>| -> Vec<MatchSummary> {
        ms.into_iter().map(|m| present(m, &snapshot.teams)).collect()
    };

    Schedule {
        upcoming: summarize(upcoming),
        completed: summarize(completed),
    }
}

/// One ban/pick step as shown in the veto list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BanPickLine {
    pub team_name: String,
    pub action_label: String,
    pub map: Option<String>,
    pub side: Option<String>,
}

/// A map selector tab on the match page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapTab {
    pub view: StatsView,
    pub label: String,
}

/// Everything the match page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDetail {
    #[serde(flatten)]
    pub summary: MatchSummary,
    pub banpick: Vec<BanPickLine>,
    pub map_tabs: Vec<MapTab>,
    /// Stats for the requested view; `None` when the match has no such map
    pub stats: Option<MatchStats>,
}

fn banpick_lines(m: &Match, teams: &TeamDirectory) -> Vec<BanPickLine> {
    m.banpick
        .iter()
        .map(|step| BanPickLine {
            team_name: teams.resolve(text_of(&step.team).as_deref()).name,
            action_label: step.action_label(),
            map: text_of(&step.map),
            side: text_of(&step.side),
        })
        .collect()
}

fn map_tabs(m: &Match) -> Vec<MapTab> {
    let mut tabs = Vec::with_capacity(m.maps.len() + 1);
    if m.maps.len() > 1 {
        tabs.push(MapTab {
            view: StatsView::All,
            label: "所有地图".to_string(),
        });
    }
    tabs.extend(m.maps.iter().enumerate().map(|(i, map)| MapTab {
        view: StatsView::Map(i),
        label: safe_text(&map.name, &format!("Map {}", i + 1)),
    }));
    tabs
}

/// Build the match page for `match_id`, or `None` if no such match exists.
pub fn build_match_detail(snapshot: &Snapshot, match_id: &str, view: StatsView) -> Option<MatchDetail> {
    let m = snapshot.find_match(match_id)?;
    let teams = &snapshot.teams;

    Some(MatchDetail {
        summary: present_with_style(m, teams, DateStyle::Full),
        banpick: banpick_lines(m, teams),
        map_tabs: map_tabs(m),
        stats: build_match_stats(m, teams, view),
    })
}

/// Everything the team page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProfile {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub members: Vec<String>,
    /// Soonest matches not yet completed
    pub upcoming: Vec<MatchSummary>,
    /// Most recent completed matches, newest first
    pub recent: Vec<MatchSummary>,
}

/// Build the team page, or `None` if the team is not in the directory.
pub fn build_team_profile(snapshot: &Snapshot, team_id: &str) -> Option<TeamProfile> {
    let team = snapshot.teams.get(team_id)?;
    let resolved = snapshot.teams.resolve(Some(team_id));

    let (completed, upcoming): (Vec<&Match>, Vec<&Match>) = chronological(&snapshot.matches)
        .into_iter()
        .filter(|m| m.involves(team_id))
        .partition(|m| m.is_completed());

    Some(TeamProfile {
        id: team_id.to_string(),
        name: resolved.name,
        logo: resolved.logo,
        members: team.member_names(),
        upcoming: upcoming
            .into_iter()
            .take(TEAM_PAGE_LIMIT)
            .map(|m| present(m, &snapshot.teams))
            .collect(),
        recent: completed
            .into_iter()
            .rev()
            .take(TEAM_PAGE_LIMIT)
            .map(|m| present(m, &snapshot.teams))
            .collect(),
    })
}
