//! League records: teams, their home addresses and rosters

use serde::{Deserialize, Serialize};

/// A team from the league listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// League-assigned identifier
    pub id: String,
    #[serde(alias = "abbr")]
    pub abbreviation: String,
    /// Display name (natural key)
    pub name: String,
    pub conference: String,
    pub division: String,
}

impl Team {
    pub fn new(
        id: impl Into<String>,
        abbreviation: impl Into<String>,
        name: impl Into<String>,
        conference: impl Into<String>,
        division: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            abbreviation: abbreviation.into(),
            name: name.into(),
            conference: conference.into(),
            division: division.into(),
        }
    }
}

/// A team's home venue and contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Team display name; resolved to a `team` id at load time
    pub team: String,
    /// Venue name
    pub site: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub url: String,
}

/// A rostered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// League-assigned identifier
    pub id: String,
    pub name: String,
    /// Team display name; resolved to a `team` id at load time
    pub team: String,
    pub position: String,
}

impl Player {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        team: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team: team.into(),
            position: position.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_accepts_short_abbreviation_key() {
        let team: Team = serde_json::from_str(
            r#"{"id": "142", "abbr": "MIN", "name": "Minnesota Twins", "conference": "AL", "division": "Central"}"#,
        )
        .unwrap();
        assert_eq!(team, Team::new("142", "MIN", "Minnesota Twins", "AL", "Central"));
    }
}
