//! Team model and the ordered team directory from `teams.json`.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::value::{lenient_seq, safe_text, text_of};

/// Team id reserved for "to be announced" bracket slots.
pub const TBA_TEAM_ID: &str = "tba";

/// Name shown for a team that cannot be resolved at all.
pub const UNKNOWN_TEAM_NAME: &str = "未知战队";

/// A team entry as stored in `teams.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub name: Value,

    #[serde(default)]
    pub logo: Value,

    /// Roster, in display order
    #[serde(default, deserialize_with = "lenient_seq")]
    pub members: Vec<Value>,
}

impl Team {
    /// Roster entries as display strings, skipping empty ones.
    pub fn member_names(&self) -> Vec<String> {
        self.members.iter().filter_map(text_of).collect()
    }
}

/// Display-ready team reference. Lookups never fail: an unknown id
/// resolves to a placeholder named after the id itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTeam {
    pub id: Option<String>,
    pub name: String,
    pub logo: String,
}

/// All teams keyed by id, in document order.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    entries: Vec<(String, Team)>,
    index: HashMap<String, usize>,
}

impl TeamDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a team, keeping the position of an existing id.
    pub fn insert(&mut self, id: impl Into<String>, team: Team) {
        let id = id.into();
        match self.index.get(&id) {
            Some(&pos) => self.entries[pos].1 = team,
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, team));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Team> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Team ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a team id for display.
    pub fn resolve(&self, id: Option<&str>) -> ResolvedTeam {
        match id.and_then(|id| self.get(id)) {
            Some(team) => ResolvedTeam {
                id: id.map(str::to_string),
                name: safe_text(&team.name, UNKNOWN_TEAM_NAME),
                logo: safe_text(&team.logo, ""),
            },
            None => ResolvedTeam {
                id: id.map(str::to_string),
                name: id
                    .filter(|id| !id.is_empty())
                    .unwrap_or(UNKNOWN_TEAM_NAME)
                    .to_string(),
                logo: String::new(),
            },
        }
    }
}

impl<'de> Deserialize<'de> for TeamDirectory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DirectoryVisitor;

        impl<'de> Visitor<'de> for DirectoryVisitor {
            type Value = TeamDirectory;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of team id to team")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut directory = TeamDirectory::new();
                while let Some((id, raw)) = map.next_entry::<String, Value>()? {
                    let team = serde_json::from_value(raw).unwrap_or_default();
                    directory.insert(id, team);
                }
                Ok(directory)
            }
        }

        deserializer.deserialize_map(DirectoryVisitor)
    }
}
