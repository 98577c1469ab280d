//! Per-map and series-wide player statistics.
//!
//! A series table merges every map a player appeared on: kills, deaths,
//! assists and total damage are summed, ADR is averaged over the maps that
//! reported it, and a supplied rating is averaged over the maps that
//! supplied one. When no rating is available the performance value is the
//! plain kill/death ratio `k / max(1, d)`.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::models::value::{safe_text, text_of, to_number, TBA};
use crate::models::{GameMap, Match, Metric, PlayerStat, Side, TeamDirectory, Tone};

/// Which slice of a match a stats table covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsView {
    /// Series aggregate, or the only map of a single-map match
    All,
    /// One map, by zero-based index
    Map(usize),
}

impl std::str::FromStr for StatsView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(StatsView::All);
        }
        s.parse::<usize>()
            .map(StatsView::Map)
            .map_err(|_| format!("invalid map view: {}", s))
    }
}

/// A player's normalized numbers for one map or a whole series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerLine {
    pub player: String,
    pub team: String,
    pub kills: Option<f64>,
    pub deaths: Option<f64>,
    pub assists: Option<f64>,
    pub adr: Option<f64>,
    pub damage: Option<f64>,
    pub rating: Option<f64>,
    pub maps_played: u32,
}

impl PlayerLine {
    pub fn from_stat(stat: &PlayerStat) -> Self {
        Self {
            player: safe_text(&stat.player, TBA),
            team: text_of(&stat.team).unwrap_or_default(),
            kills: to_number(&stat.k),
            deaths: to_number(&stat.d),
            assists: to_number(&stat.a),
            adr: to_number(&stat.adr),
            damage: to_number(&stat.damage),
            rating: to_number(&stat.rating),
            maps_played: 1,
        }
    }

    /// The supplied rating, if it is usable (present and non-zero).
    pub fn usable_rating(&self) -> Option<f64> {
        self.rating.filter(|r| *r != 0.0)
    }

    /// Performance value and where it came from.
    pub fn performance(&self) -> Option<(f64, Metric)> {
        match self.usable_rating() {
            Some(rating) => Some((rating, Metric::Rating)),
            None => kill_death_ratio(self.kills, self.deaths).map(|v| (v, Metric::KillDeath)),
        }
    }
}

/// Derived performance value: kills over deaths, with deaths floored at one.
///
/// A line with neither kills nor deaths recorded has no value.
pub fn kill_death_ratio(kills: Option<f64>, deaths: Option<f64>) -> Option<f64> {
    if kills.is_none() && deaths.is_none() {
        return None;
    }
    Some(kills.unwrap_or(0.0) / deaths.unwrap_or(0.0).max(1.0))
}

/// Lines for a single map, in source order.
pub fn aggregate(stats: &[PlayerStat]) -> Vec<PlayerLine> {
    stats.iter().map(PlayerLine::from_stat).collect()
}

#[derive(Default)]
struct SeriesTotals {
    player: String,
    team: String,
    kills: f64,
    deaths: f64,
    assists: f64,
    damage: f64,
    damage_maps: u32,
    adr_sum: f64,
    adr_maps: u32,
    rating_sum: f64,
    rating_maps: u32,
    maps: u32,
}

impl SeriesTotals {
    fn add(&mut self, stat: &PlayerStat) {
        self.kills += to_number(&stat.k).unwrap_or(0.0);
        self.deaths += to_number(&stat.d).unwrap_or(0.0);
        self.assists += to_number(&stat.a).unwrap_or(0.0);
        if let Some(damage) = to_number(&stat.damage) {
            self.damage += damage;
            self.damage_maps += 1;
        }
        if let Some(adr) = to_number(&stat.adr) {
            self.adr_sum += adr;
            self.adr_maps += 1;
        }
        if let Some(rating) = to_number(&stat.rating).filter(|r| *r != 0.0) {
            self.rating_sum += rating;
            self.rating_maps += 1;
        }
        self.maps += 1;
    }

    fn into_line(self) -> PlayerLine {
        let average = |sum: f64, n: u32| (n > 0).then(|| sum / n as f64);
        PlayerLine {
            player: self.player,
            team: self.team,
            kills: Some(self.kills),
            deaths: Some(self.deaths),
            assists: Some(self.assists),
            adr: average(self.adr_sum, self.adr_maps),
            damage: (self.damage_maps > 0).then_some(self.damage),
            rating: average(self.rating_sum, self.rating_maps),
            maps_played: self.maps,
        }
    }
}

/// Merge every map's lines into one line per `(player, team)`, keeping the
/// order in which players first appear.
pub fn aggregate_across_maps(maps: &[GameMap]) -> Vec<PlayerLine> {
    let mut order: Vec<SeriesTotals> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for stat in maps.iter().flat_map(|map| map.player_stats.iter()) {
        let key = (
            text_of(&stat.player).unwrap_or_default(),
            text_of(&stat.team).unwrap_or_default(),
        );
        let pos = *index.entry(key).or_insert_with(|| {
            order.push(SeriesTotals {
                player: safe_text(&stat.player, TBA),
                team: text_of(&stat.team).unwrap_or_default(),
                ..SeriesTotals::default()
            });
            order.len() - 1
        });
        order[pos].add(stat);
    }

    order.into_iter().map(SeriesTotals::into_line).collect()
}

/// One ranked row of a team's stats table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    /// 1-based position within the team
    pub rank: usize,
    #[serde(flatten)]
    pub line: PlayerLine,
    pub diff: f64,
    pub diff_label: String,
    pub diff_tone: Tone,
    pub value: Option<f64>,
    pub value_source: Option<Metric>,
    pub value_label: String,
    pub value_tone: Tone,
}

impl RankedRow {
    fn new(rank: usize, line: PlayerLine) -> Self {
        let diff = line.kills.unwrap_or(0.0) - line.deaths.unwrap_or(0.0);
        let diff_label = if diff > 0.0 {
            format!("+{}", diff)
        } else {
            format!("{}", diff)
        };
        let performance = line.performance();
        let value = performance.map(|(v, _)| v);

        Self {
            rank,
            diff,
            diff_label,
            diff_tone: Tone::of_diff(diff),
            value,
            value_source: performance.map(|(_, source)| source),
            value_label: value.map_or_else(|| "—".to_string(), |v| format!("{:.2}", v)),
            value_tone: Tone::of_value(value),
            line,
        }
    }
}

fn by_value_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Rank lines by performance value, highest first. Lines without a value
/// go last; equal values keep their input order.
pub fn rank_players(lines: Vec<PlayerLine>) -> Vec<RankedRow> {
    let mut lines: Vec<(Option<f64>, PlayerLine)> = lines
        .into_iter()
        .map(|line| (line.performance().map(|(v, _)| v), line))
        .collect();
    lines.sort_by(|(a, _), (b, _)| by_value_desc(*a, *b));

    lines
        .into_iter()
        .enumerate()
        .map(|(i, (_, line))| RankedRow::new(i + 1, line))
        .collect()
}

/// Header metric for a set of lines: `Rating` if any line carries a usable
/// rating, `K/D` otherwise.
pub fn metric_for(lines: &[PlayerLine]) -> Metric {
    if lines.iter().any(|line| line.usable_rating().is_some()) {
        Metric::Rating
    } else {
        Metric::KillDeath
    }
}

/// Split lines into the two rosters by case-insensitive team id.
pub fn split_by_team(
    lines: Vec<PlayerLine>,
    team_a: Option<&str>,
    team_b: Option<&str>,
) -> (Vec<PlayerLine>, Vec<PlayerLine>) {
    let team_a = team_a.map(str::to_lowercase);
    let team_b = team_b.map(str::to_lowercase);
    let mut side_a = Vec::new();
    let mut side_b = Vec::new();

    for line in lines {
        let team = line.team.to_lowercase();
        if team_a.as_deref() == Some(team.as_str()) {
            side_a.push(line);
        } else if team_b.as_deref() == Some(team.as_str()) {
            side_b.push(line);
        }
    }
    (side_a, side_b)
}

/// One team's ranked stats table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsTable {
    pub team_id: Option<String>,
    pub team_name: String,
    pub rows: Vec<RankedRow>,
}

/// Both teams' tables for one view of a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchStats {
    pub view: StatsView,
    pub metric: Metric,
    pub team_a: StatsTable,
    pub team_b: StatsTable,
}

/// Raw lines backing a view, or `None` when the view has no data source.
pub fn lines_for_view(m: &Match, view: StatsView) -> Option<Vec<PlayerLine>> {
    match view {
        StatsView::All if m.maps.len() > 1 => Some(aggregate_across_maps(&m.maps)),
        StatsView::All => m.maps.first().map(|map| aggregate(&map.player_stats)),
        StatsView::Map(i) => m.maps.get(i).map(|map| aggregate(&map.player_stats)),
    }
}

/// Build the ranked per-team tables for one view of a match.
pub fn build_match_stats(m: &Match, teams: &TeamDirectory, view: StatsView) -> Option<MatchStats> {
    let lines = lines_for_view(m, view)?;
    let metric = metric_for(&lines);
    let id_a = m.team_id(Side::A);
    let id_b = m.team_id(Side::B);
    let (lines_a, lines_b) = split_by_team(lines, id_a.as_deref(), id_b.as_deref());

    let table = |id: Option<String>, lines: Vec<PlayerLine>| StatsTable {
        team_name: teams.resolve(id.as_deref()).name,
        team_id: id,
        rows: rank_players(lines),
    };

    Some(MatchStats {
        view,
        metric,
        team_a: table(id_a, lines_a),
        team_b: table(id_b, lines_b),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn stats(value: serde_json::Value) -> Vec<PlayerStat> {
        serde_json::from_value(value).unwrap()
    }

    fn maps(value: serde_json::Value) -> Vec<GameMap> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_series_sums_kills_and_deaths() {
        let maps = maps(json!([
            {"player_stats": [{"player": "x", "team": "t1", "k": 10, "d": 5}]},
            {"player_stats": [{"player": "x", "team": "t1", "k": 8, "d": 7}]}
        ]));
        let lines = aggregate_across_maps(&maps);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kills, Some(18.0));
        assert_eq!(lines[0].deaths, Some(12.0));
        assert_eq!(lines[0].maps_played, 2);
    }

    #[test]
    fn test_series_groups_by_player_and_team() {
        let maps = maps(json!([
            {"player_stats": [
                {"player": "x", "team": "t1", "k": 1},
                {"player": "x", "team": "t2", "k": 2}
            ]},
            {"player_stats": [
                {"player": "y", "team": "t2", "k": 3},
                {"player": "x", "team": "t1", "k": "4"}
            ]}
        ]));
        let lines = aggregate_across_maps(&maps);
        let keys: Vec<_> = lines
            .iter()
            .map(|l| (l.player.as_str(), l.team.as_str(), l.kills))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("x", "t1", Some(5.0)),
                ("x", "t2", Some(2.0)),
                ("y", "t2", Some(3.0))
            ]
        );
    }

    #[test]
    fn test_series_averages_adr_and_sums_damage() {
        let maps = maps(json!([
            {"player_stats": [{"player": "x", "team": "t1", "adr": 80, "damage": 1900}]},
            {"player_stats": [{"player": "x", "team": "t1", "adr": "100", "damage": 2100}]},
            {"player_stats": [{"player": "x", "team": "t1"}]}
        ]));
        let line = &aggregate_across_maps(&maps)[0];
        assert_eq!(line.adr, Some(90.0));
        assert_eq!(line.damage, Some(4000.0));
        assert_eq!(line.maps_played, 3);
    }

    #[test]
    fn test_series_rating_averages_over_rated_maps_only() {
        let maps = maps(json!([
            {"player_stats": [{"player": "x", "team": "t1", "rating": 1.2}]},
            {"player_stats": [{"player": "x", "team": "t1", "rating": 0}]},
            {"player_stats": [{"player": "x", "team": "t1", "rating": "0.8"}]}
        ]));
        let line = &aggregate_across_maps(&maps)[0];
        assert!((line.rating.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_series_without_ratings_leaves_rating_empty() {
        let maps = maps(json!([
            {"player_stats": [{"player": "x", "team": "t1", "k": 3, "d": 0}]},
            {"player_stats": [{"player": "x", "team": "t1", "k": 1}]}
        ]));
        let line = &aggregate_across_maps(&maps)[0];
        assert_eq!(line.rating, None);
        assert_eq!(line.performance(), Some((4.0, Metric::KillDeath)));
    }

    #[test]
    fn test_kill_death_ratio_floors_deaths() {
        assert_eq!(kill_death_ratio(Some(12.0), Some(0.0)), Some(12.0));
        assert_eq!(kill_death_ratio(Some(12.0), Some(8.0)), Some(1.5));
        assert_eq!(kill_death_ratio(None, Some(4.0)), Some(0.0));
        assert_eq!(kill_death_ratio(None, None), None);
    }

    #[test]
    fn test_rating_takes_precedence_unless_zero() {
        let lines = aggregate(&stats(json!([
            {"player": "a", "k": 20, "d": 10, "rating": 1.05},
            {"player": "b", "k": 20, "d": 10, "rating": 0},
            {"player": "c", "k": 20, "d": 10, "rating": ""}
        ])));
        assert_eq!(lines[0].performance(), Some((1.05, Metric::Rating)));
        assert_eq!(lines[1].performance(), Some((2.0, Metric::KillDeath)));
        assert_eq!(lines[2].performance(), Some((2.0, Metric::KillDeath)));
        assert_eq!(metric_for(&lines), Metric::Rating);
        assert_eq!(metric_for(&lines[1..]), Metric::KillDeath);
    }

    #[test]
    fn test_rank_players_descending_with_missing_last() {
        let lines = aggregate(&stats(json!([
            {"player": "none"},
            {"player": "low", "k": 5, "d": 10},
            {"player": "high", "k": 20, "d": 10},
            {"player": "tie", "k": 10, "d": 20}
        ])));
        let ranked = rank_players(lines);
        let names: Vec<_> = ranked.iter().map(|r| r.line.player.as_str()).collect();
        assert_eq!(names, vec!["high", "low", "tie", "none"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[3].value_label, "—");
        assert_eq!(ranked[3].value_source, None);
    }

    #[test]
    fn test_ranked_row_labels_and_tones() {
        let ranked = rank_players(aggregate(&stats(json!([
            {"player": "a", "k": 21, "d": 20},
            {"player": "b", "k": 18, "d": 20},
            {"player": "c", "k": 8, "d": 10}
        ]))));
        assert_eq!(ranked[0].diff_label, "+1");
        assert_eq!(ranked[0].diff_tone, Tone::Positive);
        assert_eq!(ranked[0].value_label, "1.05");
        assert_eq!(ranked[0].value_tone, Tone::Positive);
        assert_eq!(ranked[1].value_label, "0.90");
        assert_eq!(ranked[1].value_tone, Tone::Neutral);
        assert_eq!(ranked[2].diff_label, "-2");
        assert_eq!(ranked[2].value_tone, Tone::Negative);
    }

    #[test]
    fn test_split_by_team_is_case_insensitive() {
        let lines = aggregate(&stats(json!([
            {"player": "a", "team": "T1"},
            {"player": "b", "team": "t2"},
            {"player": "c", "team": "t3"},
            {"player": "d"}
        ])));
        let (a, b) = split_by_team(lines, Some("t1"), Some("T2"));
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].player, "b");
    }

    #[test]
    fn test_stats_view_parse() {
        assert_eq!("all".parse::<StatsView>(), Ok(StatsView::All));
        assert_eq!("".parse::<StatsView>(), Ok(StatsView::All));
        assert_eq!("2".parse::<StatsView>(), Ok(StatsView::Map(2)));
        assert!("second".parse::<StatsView>().is_err());
    }

    #[test]
    fn test_build_match_stats_views() {
        let m: Match = serde_json::from_value(json!({
            "teams": {"a": "t1", "b": "t2"},
            "maps": [
                {"name": "Mirage", "player_stats": [
                    {"player": "x", "team": "t1", "k": 10, "d": 5},
                    {"player": "y", "team": "t2", "k": 5, "d": 10}
                ]},
                {"name": "Nuke", "player_stats": [
                    {"player": "x", "team": "t1", "k": 8, "d": 7},
                    {"player": "y", "team": "t2", "k": 7, "d": 8}
                ]}
            ]
        }))
        .unwrap();
        let teams: TeamDirectory =
            serde_json::from_value(json!({"t1": {"name": "One"}})).unwrap();

        let all = build_match_stats(&m, &teams, StatsView::All).unwrap();
        assert_eq!(all.metric, Metric::KillDeath);
        assert_eq!(all.team_a.team_name, "One");
        assert_eq!(all.team_b.team_name, "t2");
        assert_eq!(all.team_a.rows[0].line.kills, Some(18.0));
        assert_eq!(all.team_b.rows[0].line.deaths, Some(18.0));

        let second = build_match_stats(&m, &teams, StatsView::Map(1)).unwrap();
        assert_eq!(second.team_a.rows[0].line.kills, Some(8.0));

        assert!(build_match_stats(&m, &teams, StatsView::Map(2)).is_none());
    }

    #[test]
    fn test_single_map_all_view_uses_that_map() {
        let m: Match = serde_json::from_value(json!({
            "teams": {"a": "t1", "b": "t2"},
            "maps": [{"player_stats": [{"player": "x", "team": "t1", "k": "TBA"}]}]
        }))
        .unwrap();
        let lines = lines_for_view(&m, StatsView::All).unwrap();
        assert_eq!(lines[0].kills, None);
        assert!(lines_for_view(&Match::default(), StatsView::All).is_none());
    }
}
