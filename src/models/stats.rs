//! Classification types attached to derived statistics.

use serde::{Deserialize, Serialize};

/// Performance value above which a player is shown as above average.
pub const POSITIVE_VALUE_THRESHOLD: f64 = 1.00;

/// Performance value below which a player is shown as below average.
pub const NEGATIVE_VALUE_THRESHOLD: f64 = 0.90;

/// Outcome class of one side's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreClass {
    Win,
    Lose,
    Neutral,
}

impl ScoreClass {
    /// Classify both sides. Only two resolved, unequal scores produce a
    /// winner; anything else leaves both sides neutral.
    pub fn classify(a: Option<f64>, b: Option<f64>) -> (Self, Self) {
        match (a, b) {
            (Some(a), Some(b)) if a > b => (ScoreClass::Win, ScoreClass::Lose),
            (Some(a), Some(b)) if a < b => (ScoreClass::Lose, ScoreClass::Win),
            _ => (ScoreClass::Neutral, ScoreClass::Neutral),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ScoreClass::Win => "score-win",
            ScoreClass::Lose => "score-lose",
            ScoreClass::Neutral => "score-neutral",
        }
    }
}

/// Above/below-average tone of a stat cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    /// Tone of a performance value against the fixed thresholds.
    pub fn of_value(value: Option<f64>) -> Self {
        match value {
            Some(v) if v > POSITIVE_VALUE_THRESHOLD => Tone::Positive,
            Some(v) if v < NEGATIVE_VALUE_THRESHOLD => Tone::Negative,
            _ => Tone::Neutral,
        }
    }

    /// Tone of a kill/death difference.
    pub fn of_diff(diff: f64) -> Self {
        if diff > 0.0 {
            Tone::Positive
        } else if diff < 0.0 {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Tone::Positive => "diff-pos",
            Tone::Negative => "diff-neg",
            Tone::Neutral => "",
        }
    }
}

/// A performance metric: the source of a row's value, and the name shown
/// in a stats table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Supplied (or averaged) rating
    Rating,
    /// Derived kills / max(1, deaths)
    KillDeath,
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Rating => write!(f, "Rating"),
            Metric::KillDeath => write!(f, "K/D"),
        }
    }
}

/// A team's current unbroken run of results, most recent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Streak {
    Wins(u32),
    Losses(u32),
    None,
}

impl std::fmt::Display for Streak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Streak::Wins(n) => write!(f, "W{}", n),
            Streak::Losses(n) => write!(f, "L{}", n),
            Streak::None => write!(f, "—"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_classification_is_antisymmetric() {
        assert_eq!(
            ScoreClass::classify(Some(16.0), Some(14.0)),
            (ScoreClass::Win, ScoreClass::Lose)
        );
        assert_eq!(
            ScoreClass::classify(Some(0.0), Some(2.0)),
            (ScoreClass::Lose, ScoreClass::Win)
        );
        assert_eq!(
            ScoreClass::classify(Some(1.0), Some(1.0)),
            (ScoreClass::Neutral, ScoreClass::Neutral)
        );
        assert_eq!(
            ScoreClass::classify(Some(1.0), None),
            (ScoreClass::Neutral, ScoreClass::Neutral)
        );
    }

    #[test]
    fn test_tone_thresholds() {
        assert_eq!(Tone::of_value(Some(1.01)), Tone::Positive);
        assert_eq!(Tone::of_value(Some(1.00)), Tone::Neutral);
        assert_eq!(Tone::of_value(Some(0.90)), Tone::Neutral);
        assert_eq!(Tone::of_value(Some(0.89)), Tone::Negative);
        assert_eq!(Tone::of_value(None), Tone::Neutral);
    }

    #[test]
    fn test_tone_of_diff() {
        assert_eq!(Tone::of_diff(3.0), Tone::Positive);
        assert_eq!(Tone::of_diff(-1.0), Tone::Negative);
        assert_eq!(Tone::of_diff(0.0).css_class(), "");
    }

    #[test]
    fn test_streak_display() {
        assert_eq!(format!("{}", Streak::Wins(3)), "W3");
        assert_eq!(format!("{}", Streak::Losses(1)), "L1");
        assert_eq!(format!("{}", Streak::None), "—");
    }

    #[test]
    fn test_metric_display() {
        assert_eq!(Metric::Rating.to_string(), "Rating");
        assert_eq!(Metric::KillDeath.to_string(), "K/D");
        assert_eq!(
            serde_json::to_value(Metric::KillDeath).unwrap(),
            serde_json::json!("kill_death")
        );
    }
}
