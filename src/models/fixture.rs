//! Match model: one series between two teams, with its maps, per-map
//! player statistics and the ban/pick sequence.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::value::{lenient, lenient_seq, safe_text, text_of, time_key, to_number, TBA};

/// Lifecycle state of a match. Source values are free text and compared
/// case-insensitively; anything unrecognized is treated as not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Completed,
}

impl MatchStatus {
    pub fn parse(value: &Value) -> Self {
        match safe_text(value, "tba").to_lowercase().as_str() {
            "completed" => MatchStatus::Completed,
            "live" => MatchStatus::Live,
            _ => MatchStatus::Scheduled,
        }
    }

    /// Label shown on cards and the match header.
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Completed => "已完成",
            MatchStatus::Live => "进行中",
            MatchStatus::Scheduled => "未开始",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// A raw `{a, b}` score object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScorePair {
    #[serde(default)]
    pub a: Value,
    #[serde(default)]
    pub b: Value,
}

impl ScorePair {
    /// Both sides normalized to numbers.
    pub fn numbers(&self) -> (Option<f64>, Option<f64>) {
        (to_number(&self.a), to_number(&self.b))
    }

    /// Both sides resolved, or `None` if either is missing.
    pub fn resolved(&self) -> Option<(f64, f64)> {
        match self.numbers() {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}

/// The `{a, b}` team id pair of a match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamPair {
    #[serde(default)]
    pub a: Value,
    #[serde(default)]
    pub b: Value,
}

impl TeamPair {
    pub fn id(&self, side: Side) -> Option<String> {
        match side {
            Side::A => text_of(&self.a),
            Side::B => text_of(&self.b),
        }
    }
}

/// One player's line on one map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerStat {
    #[serde(default)]
    pub player: Value,

    /// Team id the player played for
    #[serde(default)]
    pub team: Value,

    #[serde(default)]
    pub k: Value,

    #[serde(default)]
    pub d: Value,

    #[serde(default)]
    pub a: Value,

    /// Average damage per round
    #[serde(default)]
    pub adr: Value,

    /// Total damage dealt
    #[serde(default)]
    pub damage: Value,

    /// Supplied rating; zero or absent means it has to be derived
    #[serde(default)]
    pub rating: Value,
}

/// One map played within a match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameMap {
    #[serde(default)]
    pub name: Value,

    #[serde(default, deserialize_with = "lenient")]
    pub score: ScorePair,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub player_stats: Vec<PlayerStat>,
}

/// One step of the map veto.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BanPickAction {
    #[serde(default)]
    pub team: Value,

    /// "ban", "pick" or "side"
    #[serde(default)]
    pub action: Value,

    #[serde(default)]
    pub map: Value,

    #[serde(default)]
    pub side: Value,
}

impl BanPickAction {
    /// Verb shown for the action; unknown actions pass through lower-cased.
    pub fn action_label(&self) -> String {
        let action = safe_text(&self.action, TBA).to_lowercase();
        match action.as_str() {
            "ban" => "禁用了".to_string(),
            "pick" => "选择了".to_string(),
            "side" => "选边".to_string(),
            _ => action,
        }
    }
}

/// A match record from `matches.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Match {
    #[serde(default)]
    pub id: Value,

    #[serde(default)]
    pub stage: Value,

    /// "BO1", "BO3", ...
    #[serde(default)]
    pub format: Value,

    #[serde(default)]
    pub status: Value,

    #[serde(default)]
    pub time: Value,

    #[serde(default, deserialize_with = "lenient")]
    pub teams: TeamPair,

    #[serde(default, deserialize_with = "lenient")]
    pub score: ScorePair,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub maps: Vec<GameMap>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub banpick: Vec<BanPickAction>,
}

impl Match {
    pub fn id(&self) -> Option<String> {
        text_of(&self.id)
    }

    pub fn status(&self) -> MatchStatus {
        MatchStatus::parse(&self.status)
    }

    pub fn is_completed(&self) -> bool {
        self.status() == MatchStatus::Completed
    }

    pub fn is_bo1(&self) -> bool {
        safe_text(&self.format, "BO?").eq_ignore_ascii_case("bo1")
    }

    pub fn team_id(&self, side: Side) -> Option<String> {
        self.teams.id(side)
    }

    pub fn has_both_teams(&self) -> bool {
        self.team_id(Side::A).is_some() && self.team_id(Side::B).is_some()
    }

    /// Which side `team_id` played on, if it played at all.
    pub fn side_of(&self, team_id: &str) -> Option<Side> {
        if self.team_id(Side::A).as_deref() == Some(team_id) {
            Some(Side::A)
        } else if self.team_id(Side::B).as_deref() == Some(team_id) {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.side_of(team_id).is_some()
    }

    /// Chronological sort key; missing time sorts as the epoch.
    pub fn time_key(&self) -> i64 {
        time_key(&self.time)
    }
}
