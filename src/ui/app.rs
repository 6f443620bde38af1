use std::mem;

use anyhow::{bail, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap,
};
use ratatui::Frame;
use tracing::info;

use crate::models::{EntityKind, Player};
use crate::store::LeagueStores;

use super::forms::{ConfirmDelete, ConfirmRosterRemove, EntityForm};
use super::helpers::{
    build_card_lines, centered_rect, surface_error, title_with_mark, window_start, CardText,
    FAVORITE_MARK,
};
use super::screens::{
    ListView, PickPlayersItem, PickPlayersState, RosterScreen, SortOrder, ViewLayout,
};

/// Number of cards shown in each row of the grid layout.
const GRID_COLUMNS: usize = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Tab bar height, borders included.
const HEADER_HEIGHT: u16 = 3;
/// Height of one card in the grid layout.
const CARD_HEIGHT: u16 = 6;
/// Height of one player card on the roster screen.
const ROSTER_CARD_HEIGHT: u16 = 4;
/// Rows skipped by PageUp / PageDown.
const PAGE_ROWS: isize = 5;

/// High-level navigation states.
enum Screen {
    List(EntityKind),
    Roster(RosterScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    Adding {
        form: EntityForm,
        /// Team whose roster receives the player once it is created.
        roster_team: Option<String>,
    },
    Editing {
        id: String,
        form: EntityForm,
    },
    ConfirmDelete(ConfirmDelete),
    ConfirmRosterRemove(ConfirmRosterRemove),
    PickingPlayers(PickPlayersState),
    Searching(SearchState),
}

/// State for an active inline search.
struct SearchState {
    kind: EntityKind,
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Capitalized singular used in titles and status messages.
fn kind_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Competition => "Competition",
        EntityKind::Team => "Team",
        EntityKind::Player => "Player",
        EntityKind::Venue => "Venue",
    }
}

/// Central application state shared across the TUI.
pub struct App {
    stores: LeagueStores,
    views: [ListView; 4],
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    saved_search: Option<SearchState>,
}

impl App {
    pub fn new(stores: LeagueStores) -> Self {
        Self {
            stores,
            views: Default::default(),
            screen: Screen::List(EntityKind::Competition),
            mode: Mode::Normal,
            status: None,
            saved_search: None,
        }
    }

    /// Route a key press to the active mode. Returns `true` when the user
    /// asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Adding { form, roster_team } => self.handle_add(code, form, roster_team),
            Mode::Editing { id, form } => self.handle_edit(code, id, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::ConfirmRosterRemove(confirm) => self.handle_confirm_roster_remove(code, confirm),
            Mode::PickingPlayers(state) => self.handle_pick_players(code, state),
            Mode::Searching(state) => self.handle_search(code, state),
        };

        self.mode = mode;
        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match &self.screen {
            Screen::List(kind) => {
                let kind = *kind;
                self.handle_list_key(kind, code, exit)
            }
            Screen::Roster(roster) => {
                let team_id = roster.team_id.clone();
                self.handle_roster_key(&team_id, code, exit)
            }
        }
    }

    fn handle_list_key(&mut self, kind: EntityKind, code: KeyCode, exit: &mut bool) -> Mode {
        let row_step = match self.view(kind).layout {
            ViewLayout::Grid => GRID_COLUMNS as isize,
            ViewLayout::Table => 1,
        };

        match code {
            KeyCode::Char('q') => {
                *exit = true;
            }
            KeyCode::Esc => {
                let view = self.view_mut(kind);
                if view.is_narrowed() {
                    view.set_filter(None);
                    view.favorites_only = false;
                    self.set_status("Filters cleared.", StatusKind::Info);
                } else {
                    *exit = true;
                }
            }
            KeyCode::Tab => self.switch_kind(kind.next()),
            KeyCode::BackTab => self.switch_kind(kind.previous()),
            KeyCode::Char(ch @ '1'..='4') => {
                let index = ch as usize - '1' as usize;
                self.switch_kind(EntityKind::ALL[index]);
            }
            KeyCode::Left => self.move_selection(kind, -1),
            KeyCode::Right => self.move_selection(kind, 1),
            KeyCode::Up => self.move_selection(kind, -row_step),
            KeyCode::Down => self.move_selection(kind, row_step),
            KeyCode::PageUp => self.move_selection(kind, -row_step * PAGE_ROWS),
            KeyCode::PageDown => self.move_selection(kind, row_step * PAGE_ROWS),
            KeyCode::Home => self.view_mut(kind).select_first(),
            KeyCode::End => {
                let len = self.visible_len(kind);
                self.view_mut(kind).select_last(len);
            }
            KeyCode::Enter => {
                if kind == EntityKind::Team {
                    if let Some(team_id) = self.current_id(kind) {
                        self.clear_status();
                        self.screen = Screen::Roster(RosterScreen::new(team_id));
                    } else {
                        self.set_status("No team selected.", StatusKind::Error);
                    }
                }
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                let message = match self.view_mut(kind).toggle_layout() {
                    ViewLayout::Grid => "Showing cards.",
                    ViewLayout::Table => "Showing table.",
                };
                self.set_status(message, StatusKind::Info);
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                let message = if self.view_mut(kind).toggle_favorites_only() {
                    "Showing favorites only."
                } else {
                    "Showing all records."
                };
                self.set_status(message, StatusKind::Info);
            }
            KeyCode::Char('f') | KeyCode::Char('F') | KeyCode::Char('/') => {
                self.clear_status();
                let query = self.view(kind).filter.clone().unwrap_or_default();
                return Mode::Searching(SearchState { kind, query });
            }
            KeyCode::Char('o') | KeyCode::Char('O') => self.cycle_sort(kind),
            KeyCode::Char('K') => self.reorder_selected(kind, -1),
            KeyCode::Char('J') => self.reorder_selected(kind, 1),
            KeyCode::Char('*') | KeyCode::Char(' ') => self.toggle_favorite(kind),
            KeyCode::Char('+') => {
                self.clear_status();
                return Mode::Adding {
                    form: EntityForm::blank(kind),
                    roster_team: None,
                };
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(mode) = self.edit_current(kind) {
                    self.clear_status();
                    return mode;
                }
                self.set_status(format!("No {kind} selected to edit."), StatusKind::Error);
            }
            KeyCode::Char('-') => {
                let selected = self
                    .current_id(kind)
                    .and_then(|id| self.stores.name_of(kind, &id).map(|name| (id, name)));
                if let Some((id, name)) = selected {
                    self.clear_status();
                    return Mode::ConfirmDelete(ConfirmDelete { kind, id, name });
                }
                self.set_status(format!("No {kind} selected to delete."), StatusKind::Error);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_roster_key(&mut self, team_id: &str, code: KeyCode, exit: &mut bool) -> Mode {
        let Some(team) = self.stores.teams.get(team_id) else {
            self.close_roster(team_id);
            self.set_status("That team no longer exists.", StatusKind::Error);
            return Mode::Normal;
        };
        let players = team.players.clone();
        let selected = self.roster_selected();

        match code {
            KeyCode::Char('q') => {
                *exit = true;
            }
            KeyCode::Esc => {
                self.clear_status();
                self.close_roster(team_id);
            }
            KeyCode::Up => self.move_roster_selection(-1, players.len()),
            KeyCode::Down => self.move_roster_selection(1, players.len()),
            KeyCode::PageUp => self.move_roster_selection(-PAGE_ROWS, players.len()),
            KeyCode::PageDown => self.move_roster_selection(PAGE_ROWS, players.len()),
            KeyCode::Home => self.move_roster_selection(isize::MIN / 2, players.len()),
            KeyCode::End => self.move_roster_selection(isize::MAX / 2, players.len()),
            KeyCode::Char('K') | KeyCode::Char('J') => {
                let offset = if code == KeyCode::Char('K') { -1 } else { 1 };
                let target = selected
                    .checked_add_signed(offset)
                    .and_then(|index| players.get(index).map(|p| (index, p)));
                if let (Some(source), Some((index, target))) = (players.get(selected), target) {
                    if self
                        .stores
                        .teams
                        .reorder_roster(team_id, &source.id, &target.id)
                    {
                        if let Some(roster) = self.roster_mut() {
                            roster.selected = index;
                        }
                        self.clear_status();
                    }
                }
            }
            KeyCode::Char('+') => {
                self.clear_status();
                let available: Vec<Player> = self
                    .stores
                    .players
                    .list()
                    .iter()
                    .filter(|player| !players.iter().any(|p| p.id == player.id))
                    .cloned()
                    .collect();
                return Mode::PickingPlayers(PickPlayersState::new(team_id, available));
            }
            KeyCode::Char('-') => {
                if let Some(player) = players.get(selected).cloned() {
                    self.clear_status();
                    return Mode::ConfirmRosterRemove(ConfirmRosterRemove {
                        team_id: team_id.to_string(),
                        player,
                    });
                }
                self.set_status("No player selected to remove.", StatusKind::Error);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_add(
        &mut self,
        code: KeyCode,
        mut form: EntityForm,
        roster_team: Option<String>,
    ) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status(format!("Add {} cancelled.", form.kind), StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => form.cycle(false),
            KeyCode::Right => form.cycle(true),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new(&form, roster_team.as_deref()) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::Adding { form, roster_team }
        } else {
            Mode::Normal
        }
    }

    fn handle_edit(&mut self, code: KeyCode, id: String, mut form: EntityForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => form.cycle(false),
            KeyCode::Right => form.cycle(true),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing(&id, &form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::Editing { id, form }
        } else {
            self.resume_search()
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let kind = confirm.kind;
                if self.stores.delete(kind, &confirm.id) {
                    self.set_status(format!("Deleted \"{}\".", confirm.name), StatusKind::Info);
                } else {
                    self.set_status(
                        format!("That {kind} was already removed."),
                        StatusKind::Error,
                    );
                }
                let len = self.visible_len(kind);
                self.view_mut(kind).ensure_in_bounds(len);
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_confirm_roster_remove(&mut self, code: KeyCode, confirm: ConfirmRosterRemove) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if self
                    .stores
                    .teams
                    .remove_from_roster(&confirm.team_id, &confirm.player.id)
                {
                    self.set_status(
                        format!("Removed {} from the roster.", confirm.player.name),
                        StatusKind::Info,
                    );
                }
                let len = self.roster_len(&confirm.team_id);
                if let Some(roster) = self.roster_mut() {
                    roster.ensure_in_bounds(len);
                }
                Mode::Normal
            }
            _ => Mode::ConfirmRosterRemove(confirm),
        }
    }

    fn handle_pick_players(&mut self, code: KeyCode, mut state: PickPlayersState) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Up => state.move_selection(-1),
            KeyCode::Down => state.move_selection(1),
            KeyCode::PageUp => state.move_selection(-PAGE_ROWS),
            KeyCode::PageDown => state.move_selection(PAGE_ROWS),
            KeyCode::Home => state.select_first(),
            KeyCode::End => state.select_last(),
            KeyCode::Char(' ') => state.toggle_current_selection(),
            KeyCode::Enter => {
                let selections = state.checked_players();
                if !selections.is_empty() {
                    let requested = selections.len();
                    let mut added = 0usize;
                    for player in selections {
                        if self.stores.teams.add_to_roster(&state.team_id, player) {
                            added += 1;
                        }
                    }
                    match (added, requested) {
                        (0, _) => self.set_status(
                            "No players could be added to the roster.",
                            StatusKind::Error,
                        ),
                        (1, 1) => self.set_status("Player added to the roster.", StatusKind::Info),
                        (added, requested) if added == requested => self.set_status(
                            format!("Added {added} players to the roster."),
                            StatusKind::Info,
                        ),
                        (added, requested) => self.set_status(
                            format!("Added {added} of {requested} players to the roster."),
                            StatusKind::Error,
                        ),
                    }
                    return Mode::Normal;
                }

                match state.current_item() {
                    Some(PickPlayersItem::CreateNew) => {
                        return Mode::Adding {
                            form: EntityForm::blank(EntityKind::Player),
                            roster_team: Some(state.team_id.clone()),
                        };
                    }
                    Some(PickPlayersItem::Existing(player)) => {
                        if self
                            .stores
                            .teams
                            .add_to_roster(&state.team_id, player.clone())
                        {
                            self.set_status("Player added to the roster.", StatusKind::Info);
                        } else {
                            self.set_status(
                                "Player could not be added to the roster.",
                                StatusKind::Error,
                            );
                        }
                        return Mode::Normal;
                    }
                    None => return Mode::Normal,
                }
            }
            _ => {}
        }
        Mode::PickingPlayers(state)
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        let kind = state.kind;
        match code {
            KeyCode::Esc => {
                self.view_mut(kind).set_filter(None);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                if state.query.trim().is_empty() {
                    self.view_mut(kind).set_filter(None);
                }
                return Mode::Normal;
            }
            KeyCode::Up => self.move_selection(kind, -1),
            KeyCode::Down => self.move_selection(kind, 1),
            KeyCode::PageUp => self.move_selection(kind, -PAGE_ROWS),
            KeyCode::PageDown => self.move_selection(kind, PAGE_ROWS),
            KeyCode::Backspace => {
                state.query.pop();
                self.view_mut(kind).set_filter(Some(state.query.clone()));
            }
            KeyCode::Char(ch) => {
                state.query.push(ch);
                self.view_mut(kind).set_filter(Some(state.query.clone()));
            }
            _ => {}
        }
        Mode::Searching(state)
    }

    /// Edit the selected record without leaving the search; the search bar
    /// comes back once the form closes.
    pub(crate) fn handle_ctrl_e(&mut self) {
        let Mode::Searching(state) = &self.mode else {
            return;
        };
        let kind = state.kind;
        match self.edit_current(kind) {
            Some(mode) => {
                if let Mode::Searching(state) = mem::replace(&mut self.mode, mode) {
                    self.saved_search = Some(state);
                }
            }
            None => self.set_status(format!("No {kind} selected to edit."), StatusKind::Error),
        }
    }

    /// Re-read every collection from storage, picking up writes made by
    /// another session.
    pub(crate) fn handle_ctrl_r(&mut self) {
        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        self.stores.reload_all();
        for kind in EntityKind::ALL {
            let len = self.visible_len(kind);
            self.view_mut(kind).ensure_in_bounds(len);
        }
        if let Screen::Roster(roster) = &self.screen {
            let team_id = roster.team_id.clone();
            if self.stores.teams.get(&team_id).is_none() {
                self.close_roster(&team_id);
            } else {
                let len = self.roster_len(&team_id);
                if let Some(roster) = self.roster_mut() {
                    roster.ensure_in_bounds(len);
                }
            }
        }
        info!("reloaded collections from storage");
        self.set_status("Reloaded from storage.", StatusKind::Info);
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(0)])
            .split(content_area);
        self.draw_tabs(frame, chunks[0]);

        match &self.screen {
            Screen::List(kind) => self.draw_list(frame, chunks[1], *kind),
            Screen::Roster(roster) => self.draw_roster(frame, chunks[1], roster),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Adding { form, .. } => {
                let title = format!("Add {}", kind_label(form.kind));
                self.draw_form(frame, area, &title, form);
            }
            Mode::Editing { form, .. } => {
                let title = format!("Edit {}", kind_label(form.kind));
                self.draw_form(frame, area, &title, form);
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ConfirmRosterRemove(confirm) => {
                self.draw_confirm_roster_remove(frame, area, confirm)
            }
            Mode::PickingPlayers(state) => self.draw_pick_players(frame, area, state),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = EntityKind::ALL
            .iter()
            .map(|kind| Line::from(format!("{} ({})", kind.title(), self.stores.len(*kind))))
            .collect();
        let active = match &self.screen {
            Screen::List(kind) => kind.index(),
            Screen::Roster(_) => EntityKind::Team.index(),
        };
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("League Manager"))
            .select(active)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect, kind: EntityKind) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);
        self.draw_toolbar(frame, chunks[0], kind);

        match kind {
            EntityKind::Competition => {
                self.draw_records(frame, chunks[1], kind, self.stores.competitions.list())
            }
            EntityKind::Team => self.draw_records(frame, chunks[1], kind, self.stores.teams.list()),
            EntityKind::Player => {
                self.draw_records(frame, chunks[1], kind, self.stores.players.list())
            }
            EntityKind::Venue => {
                self.draw_records(frame, chunks[1], kind, self.stores.venues.list())
            }
        }
    }

    fn draw_toolbar(&self, frame: &mut Frame, area: Rect, kind: EntityKind) {
        let view = self.view(kind);
        let dim = Style::default().fg(Color::DarkGray);
        let accent = Style::default().fg(Color::Cyan);

        let layout = match view.layout {
            ViewLayout::Grid => "cards",
            ViewLayout::Table => "table",
        };
        let mut spans = vec![
            Span::styled(
                format!(
                    "{} of {} shown",
                    self.visible_len(kind),
                    self.stores.len(kind)
                ),
                dim,
            ),
            Span::styled(format!("  •  view: {layout}"), dim),
            Span::styled(format!("  •  sort: {}", view.sort.label()), dim),
        ];
        if view.favorites_only {
            spans.push(Span::styled("  •  favorites only", accent));
        }
        if let Some(filter) = view.filter.as_deref().filter(|q| !q.trim().is_empty()) {
            spans.push(Span::styled(format!("  •  search: \"{filter}\""), accent));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_records<E: CardText>(&self, frame: &mut Frame, area: Rect, kind: EntityKind, records: &[E]) {
        let view = self.view(kind);
        if records.is_empty() {
            let message = format!(
                "No {} yet. Press '+' to add one.",
                kind.title().to_lowercase()
            );
            self.draw_placeholder(frame, area, message);
            return;
        }

        let visible = view.visible(records);
        if visible.is_empty() {
            self.draw_placeholder(
                frame,
                area,
                "Nothing matches the current filters. Press Esc to clear them.".to_string(),
            );
            return;
        }

        match view.layout {
            ViewLayout::Grid => self.render_card_grid(frame, area, &visible, view.selected),
            ViewLayout::Table => self.render_table(frame, area, kind, &visible, view.selected),
        }
    }

    fn draw_placeholder(&self, frame: &mut Frame, area: Rect, message: String) {
        let paragraph = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }

    fn render_card_grid<E: CardText>(
        &self,
        frame: &mut Frame,
        area: Rect,
        records: &[&E],
        selected: usize,
    ) {
        if records.is_empty() || area.height == 0 {
            return;
        }

        let total_rows = records.len().div_ceil(GRID_COLUMNS);
        let capacity = ((area.height / CARD_HEIGHT) as usize).max(1);
        let first_row = window_start(selected / GRID_COLUMNS, capacity, total_rows);
        let row_count = capacity.min(total_rows - first_row);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); row_count])
            .split(area);

        for (row_offset, row_chunk) in rows.iter().enumerate() {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
                .split(*row_chunk);
            for (col_idx, chunk) in columns.iter().enumerate() {
                let index = (first_row + row_offset) * GRID_COLUMNS + col_idx;
                let Some(record) = records.get(index) else {
                    break;
                };
                let is_selected = index == selected;
                let mut block = Block::default()
                    .borders(Borders::ALL)
                    .title(title_with_mark(record.name(), record.is_favorite()));
                if is_selected {
                    block = block.style(Style::default().fg(Color::Yellow));
                }
                let lines = build_card_lines(*record, chunk.height.saturating_sub(2), is_selected);
                let card = Paragraph::new(lines)
                    .alignment(Alignment::Left)
                    .wrap(Wrap { trim: true })
                    .block(block);
                frame.render_widget(card, *chunk);
            }
        }
    }

    fn render_table<E: CardText>(
        &self,
        frame: &mut Frame,
        area: Rect,
        kind: EntityKind,
        records: &[&E],
        selected: usize,
    ) {
        // Borders plus the header row.
        let capacity = (area.height.saturating_sub(3) as usize).max(1);
        let start = window_start(selected, capacity, records.len());
        let end = (start + capacity).min(records.len());

        let header = Row::new(
            ["", "Name"]
                .into_iter()
                .chain(E::table_header())
                .map(Cell::from),
        )
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = records[start..end]
            .iter()
            .enumerate()
            .map(|(offset, record)| {
                let mark = if record.is_favorite() { FAVORITE_MARK } else { "" };
                let mut cells = vec![mark.to_string(), record.name().to_string()];
                cells.extend(record.table_cells());
                let row = Row::new(cells);
                if start + offset == selected {
                    row.style(
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    row
                }
            });

        let mut widths = vec![Constraint::Length(2), Constraint::Percentage(30)];
        widths.extend(E::table_header().iter().map(|_| Constraint::Fill(1)));

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(kind.title()));
        frame.render_widget(table, area);
    }

    fn draw_roster(&self, frame: &mut Frame, area: Rect, roster: &RosterScreen) {
        let Some(team) = self.stores.teams.get(&roster.team_id) else {
            self.draw_placeholder(
                frame,
                area,
                "This team no longer exists. Press Esc to go back.".to_string(),
            );
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                title_with_mark(&team.name, team.is_favorite),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  •  {}", team.subtitle())),
        ]))
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("Roster"));
        frame.render_widget(header, chunks[0]);

        if team.players.is_empty() {
            self.draw_placeholder(
                frame,
                chunks[1],
                "No players on this roster yet. Press '+' to add some.".to_string(),
            );
            return;
        }

        self.render_roster_cards(frame, chunks[1], &team.players, roster.selected);
    }

    fn render_roster_cards(&self, frame: &mut Frame, area: Rect, players: &[Player], selected: usize) {
        if players.is_empty() || area.height == 0 {
            return;
        }

        let capacity = ((area.height / ROSTER_CARD_HEIGHT) as usize).max(1);
        let start = window_start(selected, capacity, players.len());
        let end = (start + capacity).min(players.len());

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(ROSTER_CARD_HEIGHT); end - start])
            .split(area);

        for (offset, chunk) in rows.iter().enumerate() {
            let index = start + offset;
            let player = &players[index];
            let mut block = Block::default().borders(Borders::ALL);
            let mut paragraph_style = Style::default();
            if index == selected {
                block = block.style(Style::default().fg(Color::Yellow));
                paragraph_style = Style::default().fg(Color::Yellow);
            }

            let title = if index == selected {
                format!("▶ {}. {}", index + 1, player.name)
            } else {
                format!("{}. {}", index + 1, player.name)
            };
            let lines = vec![
                Line::from(Span::styled(
                    title,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    player.position.clone(),
                    Style::default().fg(Color::Gray),
                )),
            ];

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .style(paragraph_style);
            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&'static str, &'static str)] = match (&self.screen, &self.mode) {
            (_, Mode::PickingPlayers(_)) => &[
                ("[↑↓]", "Navigate"),
                ("[Space]", "Toggle"),
                ("[Enter]", "Add Selected"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::Searching(_)) => &[
                ("[↑↓]", "Select"),
                ("[Enter]", "Keep Filter"),
                ("[Ctrl-E]", "Edit"),
                ("[Esc]", "Clear"),
            ],
            (_, Mode::Adding { .. } | Mode::Editing { .. }) => &[
                ("[Tab]", "Next Field"),
                ("[←→]", "Change"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (Screen::Roster(_), _) => &[
                ("[↑↓]", "Select"),
                ("[K/J]", "Move"),
                ("[+]", "Add"),
                ("[-]", "Remove"),
                ("[Ctrl-R]", "Reload"),
                ("[Esc]", "Back"),
                ("[q]", "Quit"),
            ],
            (Screen::List(EntityKind::Team), _) => &[
                ("[←↑↓→]", "Move"),
                ("[Enter]", "Roster"),
                ("[Tab]", "Next Tab"),
                ("[g]", "Layout"),
                ("[f]", "Search"),
                ("[v]", "Favorites"),
                ("[o]", "Sort"),
                ("[K/J]", "Reorder"),
                ("[*]", "Star"),
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[q]", "Quit"),
            ],
            (Screen::List(_), _) => &[
                ("[←↑↓→]", "Move"),
                ("[Tab]", "Next Tab"),
                ("[g]", "Layout"),
                ("[f]", "Search"),
                ("[v]", "Favorites"),
                ("[o]", "Sort"),
                ("[K/J]", "Reorder"),
                ("[*]", "Star"),
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (index, (key, action)) in hints.iter().enumerate() {
            spans.push(Span::styled(*key, key_style));
            if index + 1 == hints.len() {
                spans.push(Span::raw(format!(" {action}")));
            } else {
                spans.push(Span::raw(format!(" {action}   ")));
            }
        }
        Line::from(spans)
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let title = format!("Search {}", state.kind.title());
        let block = Block::default().borders(Borders::ALL).title(title);
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &EntityForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = form.build_lines();
        lines.push(Line::from(""));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            let hint = if form.active_is_text() {
                "Enter to save • Tab to switch • Esc to cancel"
            } else {
                "Space or ←/→ to change • Enter to save • Esc to cancel"
            };
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        if let Some((row, column)) = form.cursor_offset() {
            frame.set_cursor_position((inner.x + column, inner.y + row));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![Line::from(format!(
            "Delete {} \"{}\"?",
            confirm.kind, confirm.name
        ))];
        if confirm.kind == EntityKind::Player {
            lines.push(Line::from("Team rosters keep their own copy of this player."));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_roster_remove(
        &self,
        frame: &mut Frame,
        area: Rect,
        confirm: &ConfirmRosterRemove,
    ) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let team_name = self
            .stores
            .name_of(EntityKind::Team, &confirm.team_id)
            .unwrap_or_default();
        let lines = vec![
            Line::from(format!(
                "Remove {} from {}?",
                confirm.player.name, team_name
            )),
            Line::from("The player stays in the player list."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_pick_players(&self, frame: &mut Frame, area: Rect, state: &PickPlayersState) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Add Players to Roster")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let items: Vec<ListItem> = state
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                PickPlayersItem::CreateNew => ListItem::new("Create a new player"),
                PickPlayersItem::Existing(player) => {
                    let checkbox = if state.is_checked(index) {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    ListItem::new(format!("{checkbox} {} ({})", player.name, player.position))
                }
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::NONE))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(state.selected.min(state.len().saturating_sub(1))));
        frame.render_stateful_widget(list, inner, &mut list_state);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn save_new(&mut self, form: &EntityForm, roster_team: Option<&str>) -> Result<()> {
        form.check_required()?;
        let kind = form.kind;
        let id = match kind {
            EntityKind::Competition => {
                self.stores
                    .competitions
                    .create(form.to_new_competition())?
                    .id
            }
            EntityKind::Team => self.stores.teams.create(form.to_new_team())?.id,
            EntityKind::Player => self.stores.players.create(form.to_new_player())?.id,
            EntityKind::Venue => self.stores.venues.create(form.to_new_venue())?.id,
        };

        let roster_player = roster_team
            .filter(|_| kind == EntityKind::Player)
            .zip(self.stores.players.get(&id).cloned());
        if let Some((team_id, player)) = roster_player {
            if self.stores.teams.add_to_roster(team_id, player) {
                let len = self.roster_len(team_id);
                if let Some(roster) = self.roster_mut() {
                    roster.selected = len.saturating_sub(1);
                }
                self.set_status("Player created and added to the roster.", StatusKind::Info);
            } else {
                self.set_status(
                    "Player created but could not be added to the roster.",
                    StatusKind::Error,
                );
            }
        } else {
            self.focus_record(kind, &id);
            self.set_status(format!("{} created.", kind_label(kind)), StatusKind::Info);
        }
        Ok(())
    }

    fn save_existing(&mut self, id: &str, form: &EntityForm) -> Result<()> {
        form.check_required()?;
        let kind = form.kind;
        let updated = match kind {
            EntityKind::Competition => self
                .stores
                .competitions
                .update(id, form.to_competition_patch())?,
            EntityKind::Team => self.stores.teams.update(id, form.to_team_patch())?,
            EntityKind::Player => self.stores.players.update(id, form.to_player_patch())?,
            EntityKind::Venue => self.stores.venues.update(id, form.to_venue_patch())?,
        };
        if !updated {
            bail!("This {kind} no longer exists.");
        }
        self.focus_record(kind, id);
        self.set_status(format!("{} updated.", kind_label(kind)), StatusKind::Info);
        Ok(())
    }

    fn edit_current(&self, kind: EntityKind) -> Option<Mode> {
        let id = self.current_id(kind)?;
        let form = match kind {
            EntityKind::Competition => self
                .stores
                .competitions
                .get(&id)
                .map(EntityForm::from_competition),
            EntityKind::Team => self.stores.teams.get(&id).map(EntityForm::from_team),
            EntityKind::Player => self.stores.players.get(&id).map(EntityForm::from_player),
            EntityKind::Venue => self.stores.venues.get(&id).map(EntityForm::from_venue),
        }?;
        Some(Mode::Editing { id, form })
    }

    fn resume_search(&mut self) -> Mode {
        match self.saved_search.take() {
            Some(state) => Mode::Searching(state),
            None => Mode::Normal,
        }
    }

    fn toggle_favorite(&mut self, kind: EntityKind) {
        let Some(id) = self.current_id(kind) else {
            self.set_status(format!("No {kind} selected."), StatusKind::Error);
            return;
        };
        match self.stores.toggle_favorite(kind, &id) {
            Some(true) => self.set_status("Marked as favorite.", StatusKind::Info),
            Some(false) => self.set_status("Removed from favorites.", StatusKind::Info),
            None => {}
        }
        self.focus_record(kind, &id);
    }

    fn reorder_selected(&mut self, kind: EntityKind, offset: isize) {
        if !self.view(kind).is_reorderable() {
            self.set_status(
                "Switch back to manual order (o) to reorder.",
                StatusKind::Error,
            );
            return;
        }
        let Some((source, target)) = self.reorder_pair(kind, offset) else {
            return;
        };
        if self.stores.reorder(kind, &source, &target) {
            self.focus_record(kind, &source);
            self.clear_status();
        }
    }

    fn cycle_sort(&mut self, kind: EntityKind) {
        let current = self.current_id(kind);
        let message = match self.view_mut(kind).cycle_sort() {
            SortOrder::Manual => "Manual order restored.".to_string(),
            sort => format!("Sorted by {}.", sort.label()),
        };
        if let Some(id) = current {
            self.focus_record(kind, &id);
        }
        self.set_status(message, StatusKind::Info);
    }

    fn switch_kind(&mut self, kind: EntityKind) {
        self.clear_status();
        self.screen = Screen::List(kind);
        let len = self.visible_len(kind);
        self.view_mut(kind).ensure_in_bounds(len);
    }

    fn close_roster(&mut self, team_id: &str) {
        self.screen = Screen::List(EntityKind::Team);
        self.focus_record(EntityKind::Team, team_id);
    }

    fn roster_mut(&mut self) -> Option<&mut RosterScreen> {
        match &mut self.screen {
            Screen::Roster(roster) => Some(roster),
            Screen::List(_) => None,
        }
    }

    fn roster_selected(&self) -> usize {
        match &self.screen {
            Screen::Roster(roster) => roster.selected,
            Screen::List(_) => 0,
        }
    }

    fn roster_len(&self, team_id: &str) -> usize {
        self.stores
            .teams
            .get(team_id)
            .map_or(0, |team| team.players.len())
    }

    fn move_roster_selection(&mut self, offset: isize, len: usize) {
        if let Some(roster) = self.roster_mut() {
            roster.move_selection(offset, len);
        }
    }

    fn view(&self, kind: EntityKind) -> &ListView {
        &self.views[kind.index()]
    }

    fn view_mut(&mut self, kind: EntityKind) -> &mut ListView {
        &mut self.views[kind.index()]
    }

    fn move_selection(&mut self, kind: EntityKind, offset: isize) {
        let len = self.visible_len(kind);
        self.view_mut(kind).move_selection(offset, len);
    }

    fn visible_len(&self, kind: EntityKind) -> usize {
        let view = self.view(kind);
        match kind {
            EntityKind::Competition => view.visible(self.stores.competitions.list()).len(),
            EntityKind::Team => view.visible(self.stores.teams.list()).len(),
            EntityKind::Player => view.visible(self.stores.players.list()).len(),
            EntityKind::Venue => view.visible(self.stores.venues.list()).len(),
        }
    }

    fn current_id(&self, kind: EntityKind) -> Option<String> {
        let view = self.view(kind);
        match kind {
            EntityKind::Competition => view.current_id(self.stores.competitions.list()),
            EntityKind::Team => view.current_id(self.stores.teams.list()),
            EntityKind::Player => view.current_id(self.stores.players.list()),
            EntityKind::Venue => view.current_id(self.stores.venues.list()),
        }
    }

    fn reorder_pair(&self, kind: EntityKind, offset: isize) -> Option<(String, String)> {
        let view = self.view(kind);
        match kind {
            EntityKind::Competition => view.reorder_pair(self.stores.competitions.list(), offset),
            EntityKind::Team => view.reorder_pair(self.stores.teams.list(), offset),
            EntityKind::Player => view.reorder_pair(self.stores.players.list(), offset),
            EntityKind::Venue => view.reorder_pair(self.stores.venues.list(), offset),
        }
    }

    /// Move the selection of `kind` onto `id`.
    fn focus_record(&mut self, kind: EntityKind, id: &str) {
        let view = &mut self.views[kind.index()];
        match kind {
            EntityKind::Competition => view.select_id(self.stores.competitions.list(), id),
            EntityKind::Team => view.select_id(self.stores.teams.list(), id),
            EntityKind::Player => view.select_id(self.stores.players.list(), id),
            EntityKind::Venue => view.select_id(self.stores.venues.list(), id),
        }
    }
}
