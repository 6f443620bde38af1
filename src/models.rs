//! Domain models for the four league entity kinds. The structs here are plain
//! data holders that serialize to the camelCase JSON snapshot layout; the
//! store layer owns every mutation, so nothing in this module touches
//! persistence.

mod competition;
mod player;
mod team;
mod venue;

use std::borrow::Cow;
use std::fmt;

use time::macros::format_description;
use time::Date;
use validator::{ValidationError, ValidationErrors};

pub use competition::{Competition, CompetitionPatch, CompetitionType, GameRef, NewCompetition};
pub use player::{NewPlayer, Player, PlayerPatch};
pub use team::{NewTeam, Team, TeamPatch};
pub use venue::{NewVenue, Venue, VenuePatch, VenueType};

/// Longest name accepted for any entity. Keeps cards and table cells
/// readable without horizontal scrolling.
pub const MAX_NAME_LEN: usize = 120;

/// The entity kinds managed by the application, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Competition,
    Team,
    Player,
    Venue,
}

impl EntityKind {
    /// Every kind, in the order the UI presents them.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Competition,
        EntityKind::Team,
        EntityKind::Player,
        EntityKind::Venue,
    ];

    /// Key under which the kind's snapshot is persisted.
    pub fn storage_key(self) -> &'static str {
        match self {
            EntityKind::Competition => "competitions",
            EntityKind::Team => "teams",
            EntityKind::Player => "players",
            EntityKind::Venue => "venues",
        }
    }

    /// Prefix prepended to generated ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            EntityKind::Competition => "comp",
            EntityKind::Team => "team",
            EntityKind::Player => "player",
            EntityKind::Venue => "venue",
        }
    }

    /// Capitalized plural used for tab titles.
    pub fn title(self) -> &'static str {
        match self {
            EntityKind::Competition => "Competitions",
            EntityKind::Team => "Teams",
            EntityKind::Player => "Players",
            EntityKind::Venue => "Venues",
        }
    }

    /// Position of the kind inside [`EntityKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            EntityKind::Competition => 0,
            EntityKind::Team => 1,
            EntityKind::Player => 2,
            EntityKind::Venue => 3,
        }
    }

    /// Next kind in tab order, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous kind in tab order, wrapping around.
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Competition => "competition",
            EntityKind::Team => "team",
            EntityKind::Player => "player",
            EntityKind::Venue => "venue",
        };
        f.write_str(label)
    }
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(value: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value.trim(), &format).ok()
}

fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Record an error when a required text field is blank or too long.
pub(crate) fn check_required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: &str,
) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, field_error("required", format!("{label} is required.")));
    } else if trimmed.chars().count() > MAX_NAME_LEN {
        errors.add(
            field,
            field_error(
                "length",
                format!("{label} must be at most {MAX_NAME_LEN} characters."),
            ),
        );
    }
}

/// Record an error when an optional date is present but not `YYYY-MM-DD`.
pub(crate) fn check_optional_date(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: Option<&str>,
) -> Option<Date> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    match parse_iso_date(raw) {
        Some(date) => Some(date),
        None => {
            errors.add(
                field,
                field_error("date", format!("{label} must be a date like 2024-09-01.")),
            );
            None
        }
    }
}

pub(crate) fn date_order_error() -> ValidationError {
    field_error("date_order", "End date cannot be before the start date.")
}

/// Flatten validation failures into the first human-readable message, ordered
/// by field name so the same input always reports the same problem first.
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .iter()
        .flat_map(|(field, errs)| errs.iter().map(move |err| (field, err)))
        .map(|(field, err)| match &err.message {
            Some(message) => message.to_string(),
            None => format!("{field} is invalid."),
        })
        .next()
        .unwrap_or_else(|| "Invalid input.".to_string())
}
