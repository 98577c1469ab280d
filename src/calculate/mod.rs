//! Statistics calculation engine.
//!
//! Pure functions over an immutable [`Snapshot`](crate::models::Snapshot):
//! - Match presentation (scores, status, labels)
//! - Per-map and series-wide player stats
//! - Standings with win rates and streaks
//! - Page views built from the above

pub mod aggregate;
pub mod presenter;
pub mod standings;
pub mod views;

pub use aggregate::{
    aggregate, aggregate_across_maps, build_match_stats, kill_death_ratio, rank_players,
    MatchStats, PlayerLine, RankedRow, StatsTable, StatsView,
};
pub use presenter::{decided_winner, present, present_with_style, resolve_score, MatchSummary};
pub use standings::{build_standings, streak_for, LastMatch, StandingsRow};
pub use views::{
    build_match_detail, build_schedule, build_team_profile, MatchDetail, Schedule, TeamProfile,
};

/// Calculate win rate from wins/losses.
pub fn win_rate(wins: u32, losses: u32) -> f64 {
    let total = wins + losses;
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}

/// Render a 0..1 rate as a rounded percentage, e.g. `67%`.
pub fn percent_label(rate: f64) -> String {
    format!("{}%", (rate * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_rate() {
        assert!((win_rate(2, 1) - 0.667).abs() < 0.001);
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(win_rate(3, 3), 0.5);
    }

    #[test]
    fn test_percent_label() {
        assert_eq!(percent_label(win_rate(2, 1)), "67%");
        assert_eq!(percent_label(win_rate(1, 2)), "33%");
        assert_eq!(percent_label(0.0), "0%");
        assert_eq!(percent_label(1.0), "100%");
        assert_eq!(percent_label(0.125), "13%");
    }
}
