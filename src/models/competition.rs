use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{Validate, ValidationErrors};

use crate::store::Entity;

use super::{check_optional_date, check_required_text, date_order_error, EntityKind};

/// Opaque reference to a game scheduled inside a competition. Game records
/// live outside this application, so references are kept verbatim.
pub type GameRef = serde_json::Value;

/// Competition flavor. `season` and `tournament` come from the main
/// dashboard; `League`, `Tournament` and `Friendly` from the variant builds.
/// Each of those spellings is written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompetitionType {
    #[default]
    #[serde(rename = "season", alias = "Season")]
    Season,
    #[serde(rename = "tournament")]
    Tournament,
    /// Capitalized `Tournament` of the variant builds.
    #[serde(rename = "Tournament")]
    TournamentVariant,
    #[serde(rename = "League", alias = "league")]
    League,
    #[serde(rename = "Friendly", alias = "friendly")]
    Friendly,
}

impl CompetitionType {
    pub const ALL: [CompetitionType; 4] = [
        CompetitionType::Season,
        CompetitionType::Tournament,
        CompetitionType::League,
        CompetitionType::Friendly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CompetitionType::Season => "Season",
            CompetitionType::Tournament | CompetitionType::TournamentVariant => "Tournament",
            CompetitionType::League => "League",
            CompetitionType::Friendly => "Friendly",
        }
    }

    /// The selectable type this one stands for; folds the two tournament
    /// spellings together.
    pub fn flavor(self) -> Self {
        match self {
            CompetitionType::TournamentVariant => CompetitionType::Tournament,
            other => other,
        }
    }
}

/// A season, tournament or one-off fixture grouping a list of games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: CompetitionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub games: Vec<GameRef>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Validate for Competition {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_required_text(&mut errors, "name", "Competition name", &self.name);
        let start = check_optional_date(
            &mut errors,
            "startDate",
            "Start date",
            self.start_date.as_deref(),
        );
        let end = check_optional_date(&mut errors, "endDate", "End date", self.end_date.as_deref());
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.add("endDate", date_order_error());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Fields supplied when creating a competition. `games` always starts empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCompetition {
    pub name: String,
    pub kind: CompetitionType,
    pub format: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_favorite: bool,
}

/// Partial update for a competition. The nested options on the optional
/// fields distinguish "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompetitionPatch {
    pub name: Option<String>,
    pub kind: Option<CompetitionType>,
    pub format: Option<Option<String>>,
    pub start_date: Option<Option<String>>,
    pub end_date: Option<Option<String>>,
    pub games: Option<Vec<GameRef>>,
    pub is_favorite: Option<bool>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Entity for Competition {
    type New = NewCompetition;
    type Patch = CompetitionPatch;

    const KIND: EntityKind = EntityKind::Competition;

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

    fn from_new(id: String, new: NewCompetition) -> Self {
        Self {
            id,
            name: new.name.trim().to_string(),
            kind: new.kind,
            format: non_blank(new.format),
            start_date: non_blank(new.start_date),
            end_date: non_blank(new.end_date),
            games: Vec::new(),
            is_favorite: new.is_favorite,
        }
    }

    fn apply_patch(&mut self, patch: CompetitionPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(kind) = patch.kind {
            if kind.flavor() != self.kind.flavor() {
                self.kind = kind;
            }
        }
        if let Some(format) = patch.format {
            self.format = non_blank(format);
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = non_blank(start_date);
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = non_blank(end_date);
        }
        if let Some(games) = patch.games {
            self.games = games;
        }
        if let Some(favorite) = patch.is_favorite {
            self.is_favorite = favorite;
        }
    }

    fn samples() -> Vec<Self> {
        vec![
            Competition {
                id: "comp-sample-winter".into(),
                name: "Winter League 2024".into(),
                kind: CompetitionType::Season,
                format: Some("Round robin".into()),
                start_date: Some("2024-01-08".into()),
                end_date: Some("2024-03-25".into()),
                games: vec![json!("game-1"), json!("game-2"), json!("game-3")],
                is_favorite: true,
            },
            Competition {
                id: "comp-sample-spring".into(),
                name: "Spring Invitational".into(),
                kind: CompetitionType::Tournament,
                format: Some("Single elimination".into()),
                start_date: Some("2024-04-13".into()),
                end_date: Some("2024-04-14".into()),
                games: vec![json!("game-4"), json!("game-5")],
                is_favorite: false,
            },
            Competition {
                id: "comp-sample-summer".into(),
                name: "Summer Series".into(),
                kind: CompetitionType::Season,
                format: None,
                start_date: Some("2024-06-03".into()),
                end_date: None,
                games: Vec::new(),
                is_favorite: false,
            },
        ]
    }
}
