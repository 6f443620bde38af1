use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{Competition, Player, Team, Venue};
use crate::store::{Entity, StoreError};

/// Glyph shown next to favorite records.
pub(crate) const FAVORITE_MARK: &str = "★";
/// Placeholder keeping names aligned when a record is not a favorite.
pub(crate) const PLAIN_MARK: &str = "☆";

/// Presentation text for one entity kind. Cards, table rows and the search
/// filter all read from here so the views agree on what a record shows.
pub(crate) trait CardText: Entity {
    /// Secondary line under the name.
    fn subtitle(&self) -> String;

    /// Extra card lines below the subtitle.
    fn details(&self) -> Vec<String> {
        Vec::new()
    }

    /// Column headers after the favorite and name columns.
    fn table_header() -> Vec<&'static str>;

    /// Cells matching [`CardText::table_header`].
    fn table_cells(&self) -> Vec<String>;

    /// Text the search filter looks at besides the name.
    fn search_text(&self) -> Vec<&str>;

    /// Case-insensitive substring match against name and search text.
    fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name().to_lowercase().contains(&needle)
            || self
                .search_text()
                .iter()
                .any(|text| text.to_lowercase().contains(&needle))
    }
}

fn date_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    match (start, end) {
        (Some(start), Some(end)) => Some(format!("{start} → {end}")),
        (Some(start), None) => Some(format!("from {start}")),
        (None, Some(end)) => Some(format!("until {end}")),
        (None, None) => None,
    }
}

fn count_label(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}

impl CardText for Competition {
    fn subtitle(&self) -> String {
        self.kind.label().to_string()
    }

    fn details(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(format) = &self.format {
            lines.push(format.clone());
        }
        if let Some(range) = date_range(self.start_date.as_deref(), self.end_date.as_deref()) {
            lines.push(range);
        }
        lines.push(count_label(self.games.len(), "game", "games"));
        lines
    }

    fn table_header() -> Vec<&'static str> {
        vec!["Type", "Format", "Dates", "Games"]
    }

    fn table_cells(&self) -> Vec<String> {
        vec![
            self.kind.label().to_string(),
            self.format.clone().unwrap_or_default(),
            date_range(self.start_date.as_deref(), self.end_date.as_deref()).unwrap_or_default(),
            self.games.len().to_string(),
        ]
    }

    fn search_text(&self) -> Vec<&str> {
        let mut text = vec![self.kind.label()];
        if let Some(format) = &self.format {
            text.push(format);
        }
        text
    }
}

impl CardText for Team {
    fn subtitle(&self) -> String {
        count_label(self.players.len(), "player", "players")
    }

    fn details(&self) -> Vec<String> {
        let names: Vec<&str> = self.players.iter().map(|p| p.name.as_str()).collect();
        if names.is_empty() {
            Vec::new()
        } else {
            vec![names.join(", ")]
        }
    }

    fn table_header() -> Vec<&'static str> {
        vec!["Players"]
    }

    fn table_cells(&self) -> Vec<String> {
        vec![self.players.len().to_string()]
    }

    fn search_text(&self) -> Vec<&str> {
        self.players.iter().map(|p| p.name.as_str()).collect()
    }
}

impl CardText for Player {
    fn subtitle(&self) -> String {
        self.position.clone()
    }

    fn table_header() -> Vec<&'static str> {
        vec!["Position"]
    }

    fn table_cells(&self) -> Vec<String> {
        vec![self.position.clone()]
    }

    fn search_text(&self) -> Vec<&str> {
        vec![&self.position]
    }
}

impl CardText for Venue {
    fn subtitle(&self) -> String {
        self.location.clone()
    }

    fn details(&self) -> Vec<String> {
        vec![self.kind.label().to_string()]
    }

    fn table_header() -> Vec<&'static str> {
        vec!["Location", "Type"]
    }

    fn table_cells(&self) -> Vec<String> {
        vec![self.location.clone(), self.kind.label().to_string()]
    }

    fn search_text(&self) -> Vec<&str> {
        vec![&self.location, self.kind.label()]
    }
}

/// Title line for a card or table cell: favorite glyph plus name.
pub(crate) fn title_with_mark(name: &str, favorite: bool) -> String {
    let mark = if favorite { FAVORITE_MARK } else { PLAIN_MARK };
    format!("{mark} {name}")
}

/// Build the body of an entity card. The subtitle is bold when selected;
/// details are dimmed and clipped to the available height.
pub(crate) fn build_card_lines<E: CardText>(
    record: &E,
    inner_height: u16,
    selected: bool,
) -> Vec<Line<'static>> {
    let height = inner_height as usize;
    if height == 0 {
        return vec![Line::from("")];
    }

    let subtitle_style = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let detail_style = if selected {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut lines = Vec::with_capacity(height);
    lines.push(Line::from(Span::styled(record.subtitle(), subtitle_style)));
    for detail in record.details() {
        if lines.len() >= height {
            break;
        }
        lines.push(Line::from(Span::styled(detail, detail_style)));
    }
    lines
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Message shown to the user for a failed form submission. Store errors carry
/// their own wording; anything else reports its innermost cause.
pub(crate) fn surface_error(err: &Error) -> String {
    if let Some(store_err) = err.downcast_ref::<StoreError>() {
        return store_err.user_message();
    }
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// First index of a scrolling window of `capacity` rows that keeps
/// `selected` visible.
pub(crate) fn window_start(selected: usize, capacity: usize, len: usize) -> usize {
    let capacity = capacity.max(1);
    let mut start = if selected >= capacity {
        selected + 1 - capacity
    } else {
        0
    };
    if start + capacity > len {
        start = len.saturating_sub(capacity);
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_matches_kind_specific_text() {
        let venue = Venue::samples().remove(1);
        assert!(venue.matches("riverside"));
        assert!(venue.matches("OUTDOOR"));
        assert!(venue.matches("  "));
        assert!(!venue.matches("arena"));

        let team = Team::samples().remove(0);
        assert!(team.matches("alex"));
    }

    #[test]
    fn competition_details_describe_dates_and_games() {
        let competition = Competition::samples().remove(2);
        assert_eq!(
            competition.details(),
            ["from 2024-06-03".to_string(), "0 games".to_string()]
        );
        assert_eq!(competition.table_cells().len(), Competition::table_header().len());
    }

    #[test]
    fn surface_error_prefers_store_wording() {
        let mut invalid = Player::samples().remove(0);
        invalid.name.clear();
        let err = Error::new(StoreError::Validation {
            kind: Player::KIND,
            source: validator::Validate::validate(&invalid).unwrap_err(),
        });
        assert_eq!(surface_error(&err), "Player name is required.");

        let err = anyhow::anyhow!("disk on fire").context("saving failed");
        assert_eq!(surface_error(&err), "disk on fire");
    }

    #[test]
    fn window_keeps_selection_visible() {
        assert_eq!(window_start(0, 4, 10), 0);
        assert_eq!(window_start(5, 4, 10), 2);
        assert_eq!(window_start(9, 4, 10), 6);
        assert_eq!(window_start(2, 4, 3), 0);
    }
}
