//! The two source documents and the immutable snapshot built from them.

use serde::Deserialize;

use super::value::{lenient, lenient_seq, text_of};
use super::{Match, Side, TeamDirectory, TBA_TEAM_ID};

/// `teams.json`: `{ "teams": { id: Team } }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamsDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub teams: TeamDirectory,
}

/// `matches.json`: `{ "matches": [Match] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchesDocument {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub matches: Vec<Match>,
}

/// Everything a page view reads, loaded once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub teams: TeamDirectory,
    pub matches: Vec<Match>,
}

impl Snapshot {
    pub fn new(teams: TeamsDocument, matches: MatchesDocument) -> Self {
        Self {
            teams: teams.teams,
            matches: matches.matches,
        }
    }

    /// Parse both documents from their JSON text.
    pub fn from_json(teams_json: &str, matches_json: &str) -> Result<Self, serde_json::Error> {
        let teams: TeamsDocument = serde_json::from_str(teams_json)?;
        let matches: MatchesDocument = serde_json::from_str(matches_json)?;
        Ok(Self::new(teams, matches))
    }

    pub fn find_match(&self, id: &str) -> Option<&Match> {
        self.matches
            .iter()
            .find(|m| text_of(&m.id).as_deref() == Some(id))
    }

    /// Team ids referenced by matches but missing from the directory.
    /// The `tba` placeholder is not reported.
    pub fn unknown_team_refs(&self) -> Vec<String> {
        let mut unknown: Vec<String> = Vec::new();
        for m in &self.matches {
            for id in [m.teams.id(Side::A), m.teams.id(Side::B)]
                .into_iter()
                .flatten()
            {
                if id != TBA_TEAM_ID && !self.teams.contains(&id) && !unknown.contains(&id) {
                    unknown.push(id);
                }
            }
        }
        unknown
    }
}
