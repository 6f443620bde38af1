use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::store::Entity;

use super::{check_required_text, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueType {
    #[default]
    Indoor,
    Outdoor,
}

impl VenueType {
    pub const ALL: [VenueType; 2] = [VenueType::Indoor, VenueType::Outdoor];

    pub fn label(self) -> &'static str {
        match self {
            VenueType::Indoor => "Indoor",
            VenueType::Outdoor => "Outdoor",
        }
    }
}

/// A place where games and training sessions happen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default)]
    pub kind: VenueType,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Validate for Venue {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_required_text(&mut errors, "name", "Venue name", &self.name);
        check_required_text(&mut errors, "location", "Location", &self.location);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewVenue {
    pub name: String,
    pub location: String,
    pub kind: VenueType,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenuePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub kind: Option<VenueType>,
    pub is_favorite: Option<bool>,
}

impl Entity for Venue {
    type New = NewVenue;
    type Patch = VenuePatch;

    const KIND: EntityKind = EntityKind::Venue;

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

    fn from_new(id: String, new: NewVenue) -> Self {
        Self {
            id,
            name: new.name.trim().to_string(),
            location: new.location.trim().to_string(),
            kind: new.kind,
            is_favorite: new.is_favorite,
        }
    }

    fn apply_patch(&mut self, patch: VenuePatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(location) = patch.location {
            self.location = location.trim().to_string();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(favorite) = patch.is_favorite {
            self.is_favorite = favorite;
        }
    }

    fn samples() -> Vec<Self> {
        vec![
            Venue {
                id: "venue-sample-arena".into(),
                name: "Downtown Arena".into(),
                location: "12 Market Street".into(),
                kind: VenueType::Indoor,
                is_favorite: true,
            },
            Venue {
                id: "venue-sample-park".into(),
                name: "Riverside Park Field 2".into(),
                location: "Riverside Park, north gate".into(),
                kind: VenueType::Outdoor,
                is_favorite: false,
            },
        ]
    }
}
