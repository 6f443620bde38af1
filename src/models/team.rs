use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::store::Entity;

use super::{check_required_text, EntityKind, Player};

/// A team together with its ordered roster. Roster entries are owned copies;
/// nothing keeps them in sync with the player collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Team {
    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }
}

impl Validate for Team {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_required_text(&mut errors, "name", "Team name", &self.name);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Team creation only takes a name; rosters start empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTeam {
    pub name: String,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub players: Option<Vec<Player>>,
    pub is_favorite: Option<bool>,
}

impl Entity for Team {
    type New = NewTeam;
    type Patch = TeamPatch;

    const KIND: EntityKind = EntityKind::Team;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    fn set_favorite(&mut self, favorite: bool) {
        self.is_favorite = favorite;
    }

    fn from_new(id: String, new: NewTeam) -> Self {
        Self {
            id,
            name: new.name.trim().to_string(),
            players: Vec::new(),
            is_favorite: new.is_favorite,
        }
    }

    fn apply_patch(&mut self, patch: TeamPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(players) = patch.players {
            self.players = players;
        }
        if let Some(favorite) = patch.is_favorite {
            self.is_favorite = favorite;
        }
    }

    fn samples() -> Vec<Self> {
        let players = Player::samples();
        vec![
            Team {
                id: "team-sample-thunderbolts".into(),
                name: "Thunderbolts".into(),
                players: players[..2].to_vec(),
                is_favorite: true,
            },
            Team {
                id: "team-sample-mystics".into(),
                name: "Mystics".into(),
                players: players[2..4].to_vec(),
                is_favorite: false,
            },
            Team {
                id: "team-sample-harbor".into(),
                name: "Harbor City FC".into(),
                players: Vec::new(),
                is_favorite: false,
            },
        ]
    }
}
