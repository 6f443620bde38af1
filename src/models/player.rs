use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::store::Entity;

use super::{check_required_text, EntityKind};

/// A registered player. Teams embed copies of these records in their roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Validate for Player {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_required_text(&mut errors, "name", "Player name", &self.name);
        check_required_text(&mut errors, "position", "Position", &self.position);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPlayer {
    pub name: String,
    pub position: String,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub position: Option<String>,
    pub is_favorite: Option<bool>,
}

impl Entity for Player {
    type New = NewPlayer;
    type Patch = PlayerPatch;

    const KIND: EntityKind = EntityKind::Player;

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

    fn from_new(id: String, new: NewPlayer) -> Self {
        Self {
            id,
            name: new.name.trim().to_string(),
            position: new.position.trim().to_string(),
            is_favorite: new.is_favorite,
        }
    }

    fn apply_patch(&mut self, patch: PlayerPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(position) = patch.position {
            self.position = position.trim().to_string();
        }
        if let Some(favorite) = patch.is_favorite {
            self.is_favorite = favorite;
        }
    }

    fn samples() -> Vec<Self> {
        [
            ("player-sample-1", "Alex Morgan", "Forward", true),
            ("player-sample-2", "Sam Kerr", "Forward", false),
            ("player-sample-3", "Jordan Lee", "Midfielder", false),
            ("player-sample-4", "Casey Park", "Defender", false),
            ("player-sample-5", "Riley Chen", "Goalkeeper", false),
        ]
        .into_iter()
        .map(|(id, name, position, is_favorite)| Player {
            id: id.into(),
            name: name.into(),
            position: position.into(),
            is_favorite,
        })
        .collect()
    }
}
