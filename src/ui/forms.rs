use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{
    Competition, CompetitionPatch, CompetitionType, EntityKind, NewCompetition, NewPlayer,
    NewTeam, NewVenue, Player, PlayerPatch, Team, TeamPatch, Venue, VenuePatch, VenueType,
};

/// Identifies a form field independently of its position in the form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FieldKey {
    Name,
    Type,
    Format,
    StartDate,
    EndDate,
    Position,
    Location,
    Favorite,
}

/// Editable value of a single field.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FieldInput {
    Text { value: String, required: bool },
    Choice { options: Vec<&'static str>, index: usize },
    Toggle(bool),
}

#[derive(Clone, Debug)]
pub(crate) struct FormField {
    pub(crate) key: FieldKey,
    pub(crate) label: &'static str,
    pub(crate) input: FieldInput,
}

impl FormField {
    fn text(key: FieldKey, label: &'static str, required: bool) -> Self {
        Self {
            key,
            label,
            input: FieldInput::Text {
                value: String::new(),
                required,
            },
        }
    }

    fn choice(key: FieldKey, label: &'static str, options: Vec<&'static str>) -> Self {
        Self {
            key,
            label,
            input: FieldInput::Choice { options, index: 0 },
        }
    }

    fn toggle(key: FieldKey, label: &'static str) -> Self {
        Self {
            key,
            label,
            input: FieldInput::Toggle(false),
        }
    }
}

/// Add/edit form shared by every entity kind. The field list is fixed per
/// kind; values are converted into the kind's `New`/`Patch` types on submit.
#[derive(Clone, Debug)]
pub(crate) struct EntityForm {
    pub(crate) kind: EntityKind,
    pub(crate) fields: Vec<FormField>,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl EntityForm {
    /// Empty form for creating a record of `kind`.
    pub(crate) fn blank(kind: EntityKind) -> Self {
        let fields = match kind {
            EntityKind::Competition => vec![
                FormField::text(FieldKey::Name, "Name", true),
                FormField::choice(
                    FieldKey::Type,
                    "Type",
                    CompetitionType::ALL.iter().map(|t| t.label()).collect(),
                ),
                FormField::text(FieldKey::Format, "Format", false),
                FormField::text(FieldKey::StartDate, "Start date (YYYY-MM-DD)", false),
                FormField::text(FieldKey::EndDate, "End date (YYYY-MM-DD)", false),
                FormField::toggle(FieldKey::Favorite, "Favorite"),
            ],
            EntityKind::Team => vec![
                FormField::text(FieldKey::Name, "Name", true),
                FormField::toggle(FieldKey::Favorite, "Favorite"),
            ],
            EntityKind::Player => vec![
                FormField::text(FieldKey::Name, "Name", true),
                FormField::text(FieldKey::Position, "Position", true),
                FormField::toggle(FieldKey::Favorite, "Favorite"),
            ],
            EntityKind::Venue => vec![
                FormField::text(FieldKey::Name, "Name", true),
                FormField::text(FieldKey::Location, "Location", true),
                FormField::choice(
                    FieldKey::Type,
                    "Type",
                    VenueType::ALL.iter().map(|t| t.label()).collect(),
                ),
                FormField::toggle(FieldKey::Favorite, "Favorite"),
            ],
        };
        Self {
            kind,
            fields,
            active: 0,
            error: None,
        }
    }

    pub(crate) fn from_competition(competition: &Competition) -> Self {
        let mut form = Self::blank(EntityKind::Competition);
        form.set_text(FieldKey::Name, &competition.name);
        form.set_choice(
            FieldKey::Type,
            CompetitionType::ALL
                .iter()
                .position(|t| *t == competition.kind.flavor())
                .unwrap_or(0),
        );
        form.set_text(FieldKey::Format, competition.format.as_deref().unwrap_or(""));
        form.set_text(
            FieldKey::StartDate,
            competition.start_date.as_deref().unwrap_or(""),
        );
        form.set_text(FieldKey::EndDate, competition.end_date.as_deref().unwrap_or(""));
        form.set_toggle(FieldKey::Favorite, competition.is_favorite);
        form
    }

    pub(crate) fn from_team(team: &Team) -> Self {
        let mut form = Self::blank(EntityKind::Team);
        form.set_text(FieldKey::Name, &team.name);
        form.set_toggle(FieldKey::Favorite, team.is_favorite);
        form
    }

    pub(crate) fn from_player(player: &Player) -> Self {
        let mut form = Self::blank(EntityKind::Player);
        form.set_text(FieldKey::Name, &player.name);
        form.set_text(FieldKey::Position, &player.position);
        form.set_toggle(FieldKey::Favorite, player.is_favorite);
        form
    }

    pub(crate) fn from_venue(venue: &Venue) -> Self {
        let mut form = Self::blank(EntityKind::Venue);
        form.set_text(FieldKey::Name, &venue.name);
        form.set_text(FieldKey::Location, &venue.location);
        form.set_choice(
            FieldKey::Type,
            VenueType::ALL
                .iter()
                .position(|t| *t == venue.kind)
                .unwrap_or(0),
        );
        form.set_toggle(FieldKey::Favorite, venue.is_favorite);
        form
    }

    fn field_mut(&mut self, key: FieldKey) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|field| field.key == key)
    }

    fn field(&self, key: FieldKey) -> Option<&FormField> {
        self.fields.iter().find(|field| field.key == key)
    }

    fn set_text(&mut self, key: FieldKey, text: &str) {
        if let Some(FormField {
            input: FieldInput::Text { value, .. },
            ..
        }) = self.field_mut(key)
        {
            *value = text.to_string();
        }
    }

    fn set_choice(&mut self, key: FieldKey, selected: usize) {
        if let Some(FormField {
            input: FieldInput::Choice { options, index },
            ..
        }) = self.field_mut(key)
        {
            if selected < options.len() {
                *index = selected;
            }
        }
    }

    fn set_toggle(&mut self, key: FieldKey, on: bool) {
        if let Some(FormField {
            input: FieldInput::Toggle(value),
            ..
        }) = self.field_mut(key)
        {
            *value = on;
        }
    }

    /// Trimmed text of a field; empty when the field is absent.
    pub(crate) fn text(&self, key: FieldKey) -> String {
        match self.field(key).map(|field| &field.input) {
            Some(FieldInput::Text { value, .. }) => value.trim().to_string(),
            _ => String::new(),
        }
    }

    fn optional_text(&self, key: FieldKey) -> Option<String> {
        Some(self.text(key)).filter(|value| !value.is_empty())
    }

    fn choice(&self, key: FieldKey) -> usize {
        match self.field(key).map(|field| &field.input) {
            Some(FieldInput::Choice { index, .. }) => *index,
            _ => 0,
        }
    }

    fn toggle(&self, key: FieldKey) -> bool {
        matches!(
            self.field(key).map(|field| &field.input),
            Some(FieldInput::Toggle(true))
        )
    }

    pub(crate) fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields.len();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = (self.active + self.fields.len() - 1) % self.fields.len();
    }

    pub(crate) fn active_is_text(&self) -> bool {
        matches!(
            self.fields.get(self.active).map(|field| &field.input),
            Some(FieldInput::Text { .. })
        )
    }

    /// Type into a text field. On choice and toggle fields a space cycles
    /// the value instead.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        if let Some(FormField {
            input: FieldInput::Text { value, .. },
            ..
        }) = self.fields.get_mut(self.active)
        {
            value.push(ch);
            return true;
        }
        if ch == ' ' {
            self.cycle(true);
            return true;
        }
        false
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(FormField {
            input: FieldInput::Text { value, .. },
            ..
        }) = self.fields.get_mut(self.active)
        {
            value.pop();
        }
    }

    /// Step a choice field forward or back, or flip a toggle.
    pub(crate) fn cycle(&mut self, forward: bool) {
        let Some(field) = self.fields.get_mut(self.active) else {
            return;
        };
        match &mut field.input {
            FieldInput::Choice { options, index } => {
                let len = options.len();
                *index = if forward {
                    (*index + 1) % len
                } else {
                    (*index + len - 1) % len
                };
            }
            FieldInput::Toggle(value) => *value = !*value,
            FieldInput::Text { .. } => {}
        }
    }

    /// Check required fields before handing values to the store, which runs
    /// the full validation.
    pub(crate) fn check_required(&self) -> Result<()> {
        for field in &self.fields {
            if let FieldInput::Text {
                value,
                required: true,
            } = &field.input
            {
                if value.trim().is_empty() {
                    return Err(anyhow!("{} is required.", field.label));
                }
            }
        }
        Ok(())
    }

    fn competition_type(&self) -> CompetitionType {
        CompetitionType::ALL
            .get(self.choice(FieldKey::Type))
            .copied()
            .unwrap_or_default()
    }

    fn venue_type(&self) -> VenueType {
        VenueType::ALL
            .get(self.choice(FieldKey::Type))
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn to_new_competition(&self) -> NewCompetition {
        NewCompetition {
            name: self.text(FieldKey::Name),
            kind: self.competition_type(),
            format: self.optional_text(FieldKey::Format),
            start_date: self.optional_text(FieldKey::StartDate),
            end_date: self.optional_text(FieldKey::EndDate),
            is_favorite: self.toggle(FieldKey::Favorite),
        }
    }

    /// Every field of the form is written back; the games list is untouched.
    pub(crate) fn to_competition_patch(&self) -> CompetitionPatch {
        CompetitionPatch {
            name: Some(self.text(FieldKey::Name)),
            kind: Some(self.competition_type()),
            format: Some(self.optional_text(FieldKey::Format)),
            start_date: Some(self.optional_text(FieldKey::StartDate)),
            end_date: Some(self.optional_text(FieldKey::EndDate)),
            games: None,
            is_favorite: Some(self.toggle(FieldKey::Favorite)),
        }
    }

    pub(crate) fn to_new_team(&self) -> NewTeam {
        NewTeam {
            name: self.text(FieldKey::Name),
            is_favorite: self.toggle(FieldKey::Favorite),
        }
    }

    /// The roster is edited on its own screen and left alone here.
    pub(crate) fn to_team_patch(&self) -> TeamPatch {
        TeamPatch {
            name: Some(self.text(FieldKey::Name)),
            players: None,
            is_favorite: Some(self.toggle(FieldKey::Favorite)),
        }
    }

    pub(crate) fn to_new_player(&self) -> NewPlayer {
        NewPlayer {
            name: self.text(FieldKey::Name),
            position: self.text(FieldKey::Position),
            is_favorite: self.toggle(FieldKey::Favorite),
        }
    }

    pub(crate) fn to_player_patch(&self) -> PlayerPatch {
        PlayerPatch {
            name: Some(self.text(FieldKey::Name)),
            position: Some(self.text(FieldKey::Position)),
            is_favorite: Some(self.toggle(FieldKey::Favorite)),
        }
    }

    pub(crate) fn to_new_venue(&self) -> NewVenue {
        NewVenue {
            name: self.text(FieldKey::Name),
            location: self.text(FieldKey::Location),
            kind: self.venue_type(),
            is_favorite: self.toggle(FieldKey::Favorite),
        }
    }

    pub(crate) fn to_venue_patch(&self) -> VenuePatch {
        VenuePatch {
            name: Some(self.text(FieldKey::Name)),
            location: Some(self.text(FieldKey::Location)),
            kind: Some(self.venue_type()),
            is_favorite: Some(self.toggle(FieldKey::Favorite)),
        }
    }

    /// Render one line per field for the modal form.
    pub(crate) fn build_lines(&self) -> Vec<Line<'static>> {
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| self.build_line(index, field))
            .collect()
    }

    fn build_line(&self, index: usize, field: &FormField) -> Line<'static> {
        let is_active = index == self.active;
        let (display, empty) = match &field.input {
            FieldInput::Text { value, required } if value.is_empty() => {
                let placeholder = if *required { "<required>" } else { "<optional>" };
                (placeholder.to_string(), true)
            }
            FieldInput::Text { value, .. } => (value.clone(), false),
            FieldInput::Choice { options, index } => (
                format!("< {} >", options.get(*index).copied().unwrap_or("")),
                false,
            ),
            FieldInput::Toggle(on) => {
                let label = if *on { "[x] Yes" } else { "[ ] No" };
                (label.to_string(), false)
            }
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if empty {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label)),
            Span::styled(display, style),
        ])
    }

    /// Row and column of the text cursor relative to the first form line, or
    /// `None` when the active field is not free text.
    pub(crate) fn cursor_offset(&self) -> Option<(u16, u16)> {
        let field = self.fields.get(self.active)?;
        let FieldInput::Text { value, .. } = &field.input else {
            return None;
        };
        let column = field.label.chars().count() + 2 + value.chars().count();
        Some((self.active as u16, column as u16))
    }
}

/// State for confirming permanent deletion of a record.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmDelete {
    pub(crate) kind: EntityKind,
    pub(crate) id: String,
    pub(crate) name: String,
}

/// State for confirming the removal of a player from a team's roster.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmRosterRemove {
    pub(crate) team_id: String,
    pub(crate) player: Player,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Entity;

    fn type_text(form: &mut EntityForm, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn blank_form_reports_first_missing_field() {
        let mut form = EntityForm::blank(EntityKind::Player);
        let err = form.check_required().unwrap_err();
        assert_eq!(err.to_string(), "Name is required.");

        type_text(&mut form, "Ana");
        form.next_field();
        let err = form.check_required().unwrap_err();
        assert_eq!(err.to_string(), "Position is required.");

        type_text(&mut form, "Keeper");
        assert!(form.check_required().is_ok());
        let new = form.to_new_player();
        assert_eq!(new.name, "Ana");
        assert_eq!(new.position, "Keeper");
        assert!(!new.is_favorite);
    }

    #[test]
    fn competition_form_converts_choices_and_optional_text() {
        let mut form = EntityForm::blank(EntityKind::Competition);
        type_text(&mut form, "Winter League");
        form.next_field();
        form.cycle(true);
        form.cycle(true);
        form.next_field();
        form.next_field();
        type_text(&mut form, "2024-01-01");
        form.next_field();
        form.next_field();
        assert!(form.push_char(' '));

        let new = form.to_new_competition();
        assert_eq!(new.name, "Winter League");
        assert_eq!(new.kind, CompetitionType::League);
        assert_eq!(new.format, None);
        assert_eq!(new.start_date.as_deref(), Some("2024-01-01"));
        assert_eq!(new.end_date, None);
        assert!(new.is_favorite);
    }

    #[test]
    fn edit_form_clears_optional_fields() {
        let competition = Competition::samples().remove(0);
        let mut form = EntityForm::from_competition(&competition);
        form.active = 2;
        for _ in 0..competition.format.as_deref().unwrap_or("").len() {
            form.backspace();
        }
        let patch = form.to_competition_patch();
        assert_eq!(patch.format, Some(None));
        assert_eq!(patch.start_date, Some(competition.start_date.clone()));
        assert_eq!(patch.games, None);
        assert_eq!(patch.is_favorite, Some(true));
    }

    #[test]
    fn choice_cycles_in_both_directions() {
        let venue = Venue::samples().remove(0);
        let mut form = EntityForm::from_venue(&venue);
        form.active = 2;
        assert!(!form.active_is_text());
        assert_eq!(form.cursor_offset(), None);
        form.cycle(false);
        assert_eq!(form.to_venue_patch().kind, Some(VenueType::Outdoor));
        form.cycle(true);
        assert_eq!(form.to_venue_patch().kind, Some(VenueType::Indoor));
        assert!(!form.push_char('x'));
    }

    #[test]
    fn cursor_follows_active_text_value() {
        let mut form = EntityForm::blank(EntityKind::Team);
        type_text(&mut form, "Owls");
        assert_eq!(form.cursor_offset(), Some((0, 10)));
        form.previous_field();
        assert_eq!(form.active, 1);
    }
}
