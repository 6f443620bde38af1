use std::collections::HashSet;

use crate::models::Player;

use super::helpers::CardText;

/// Presentation order of a list. Sorting is a view concern only; the stored
/// order is what `Manual` shows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum SortOrder {
    #[default]
    Manual,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub(crate) fn next(self) -> Self {
        match self {
            SortOrder::Manual => SortOrder::NameAsc,
            SortOrder::NameAsc => SortOrder::NameDesc,
            SortOrder::NameDesc => SortOrder::Manual,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            SortOrder::Manual => "manual",
            SortOrder::NameAsc => "name A–Z",
            SortOrder::NameDesc => "name Z–A",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum ViewLayout {
    #[default]
    Grid,
    Table,
}

/// Per-kind list state: selection plus the search, favorites and sort
/// settings that decide which records are visible and in what order.
#[derive(Clone, Debug, Default)]
pub(crate) struct ListView {
    pub(crate) selected: usize,
    pub(crate) filter: Option<String>,
    pub(crate) favorites_only: bool,
    pub(crate) sort: SortOrder,
    pub(crate) layout: ViewLayout,
}

impl ListView {
    /// Records that pass the current filters, in presentation order.
    pub(crate) fn visible<'a, E: CardText>(&self, records: &'a [E]) -> Vec<&'a E> {
        let mut visible: Vec<&E> = records
            .iter()
            .filter(|record| !self.favorites_only || record.is_favorite())
            .filter(|record| {
                self.filter
                    .as_deref()
                    .map_or(true, |query| record.matches(query))
            })
            .collect();
        match self.sort {
            SortOrder::Manual => {}
            SortOrder::NameAsc => visible.sort_by_key(|record| record.name().to_lowercase()),
            SortOrder::NameDesc => visible.sort_by(|a, b| {
                b.name()
                    .to_lowercase()
                    .cmp(&a.name().to_lowercase())
            }),
        }
        visible
    }

    pub(crate) fn current_id<E: CardText>(&self, records: &[E]) -> Option<String> {
        self.visible(records)
            .get(self.selected)
            .map(|record| record.id().to_string())
    }

    /// Ids of the selected record and its visible neighbour `offset` slots
    /// away, for a manual reorder. `None` at either end of the list.
    pub(crate) fn reorder_pair<E: CardText>(
        &self,
        records: &[E],
        offset: isize,
    ) -> Option<(String, String)> {
        let visible = self.visible(records);
        let source = visible.get(self.selected)?;
        let target_index = self.selected.checked_add_signed(offset)?;
        let target = visible.get(target_index)?;
        Some((source.id().to_string(), target.id().to_string()))
    }

    pub(crate) fn is_reorderable(&self) -> bool {
        self.sort == SortOrder::Manual
    }

    pub(crate) fn is_narrowed(&self) -> bool {
        self.favorites_only || self.filter.as_deref().is_some_and(|q| !q.trim().is_empty())
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.selected = 0;
    }

    pub(crate) fn toggle_favorites_only(&mut self) -> bool {
        self.favorites_only = !self.favorites_only;
        self.selected = 0;
        self.favorites_only
    }

    pub(crate) fn cycle_sort(&mut self) -> SortOrder {
        self.sort = self.sort.next();
        self.sort
    }

    pub(crate) fn toggle_layout(&mut self) -> ViewLayout {
        self.layout = match self.layout {
            ViewLayout::Grid => ViewLayout::Table,
            ViewLayout::Table => ViewLayout::Grid,
        };
        self.layout
    }

    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            return;
        }
        let new = (self.selected as isize + offset).clamp(0, len as isize - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Point the selection at `id` if it is visible; otherwise clamp.
    pub(crate) fn select_id<E: CardText>(&mut self, records: &[E], id: &str) {
        let visible = self.visible(records);
        if let Some(index) = visible.iter().position(|record| record.id() == id) {
            self.selected = index;
        } else {
            self.ensure_in_bounds(visible.len());
        }
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Backing state for the roster view of a single team.
#[derive(Clone, Debug)]
pub(crate) struct RosterScreen {
    pub(crate) team_id: String,
    pub(crate) selected: usize,
}

impl RosterScreen {
    pub(crate) fn new(team_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            selected: 0,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            return;
        }
        let new = (self.selected as isize + offset).clamp(0, len as isize - 1);
        self.selected = new as usize;
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Backing state for the player picker when adding players to a roster.
pub(crate) struct PickPlayersState {
    pub(crate) team_id: String,
    pub(crate) items: Vec<PickPlayersItem>,
    pub(crate) selected: usize,
    pub(crate) checked: HashSet<String>,
}

/// Entries shown in the player picker list.
#[derive(Clone, Debug)]
pub(crate) enum PickPlayersItem {
    CreateNew,
    Existing(Player),
}

impl PickPlayersState {
    /// Offer every player not already on the roster.
    pub(crate) fn new(team_id: impl Into<String>, available: Vec<Player>) -> Self {
        let mut items = vec![PickPlayersItem::CreateNew];
        items.extend(available.into_iter().map(PickPlayersItem::Existing));
        Self {
            team_id: team_id.into(),
            items,
            selected: 0,
            checked: HashSet::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.items.is_empty() {
            return;
        }
        let len = self.items.len() as isize;
        self.selected = (self.selected as isize + offset).clamp(0, len - 1) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    pub(crate) fn current_item(&self) -> Option<&PickPlayersItem> {
        self.items.get(self.selected)
    }

    pub(crate) fn is_checked(&self, index: usize) -> bool {
        matches!(
            self.items.get(index),
            Some(PickPlayersItem::Existing(player)) if self.checked.contains(&player.id)
        )
    }

    pub(crate) fn toggle_current_selection(&mut self) {
        if let Some(PickPlayersItem::Existing(player)) = self.items.get(self.selected) {
            if !self.checked.remove(&player.id) {
                self.checked.insert(player.id.clone());
            }
        }
    }

    /// Checked players in list order.
    pub(crate) fn checked_players(&self) -> Vec<Player> {
        self.items
            .iter()
            .filter_map(|item| match item {
                PickPlayersItem::Existing(player) if self.checked.contains(&player.id) => {
                    Some(player.clone())
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Team, Venue};
    use crate::store::Entity;

    #[test]
    fn visible_applies_favorites_search_and_sort() {
        let players = Player::samples();
        let mut view = ListView::default();
        assert_eq!(view.visible(&players).len(), players.len());

        view.toggle_favorites_only();
        let names: Vec<&str> = view.visible(&players).iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Alex Morgan"]);

        view.toggle_favorites_only();
        view.set_filter(Some("forward".into()));
        view.cycle_sort();
        view.cycle_sort();
        let names: Vec<&str> = view.visible(&players).iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Sam Kerr", "Alex Morgan"]);
        assert!(!view.is_reorderable());
        assert!(view.is_narrowed());
    }

    #[test]
    fn reorder_pair_uses_visible_neighbours() {
        let venues = Venue::samples();
        let mut view = ListView::default();
        assert_eq!(view.reorder_pair(&venues, -1), None);
        assert_eq!(
            view.reorder_pair(&venues, 1),
            Some((venues[0].id.clone(), venues[1].id.clone()))
        );
        view.select_last(venues.len());
        assert_eq!(view.reorder_pair(&venues, 1), None);
    }

    #[test]
    fn select_id_falls_back_to_clamping() {
        let teams = Team::samples();
        let mut view = ListView::default();
        view.select_id(&teams, &teams[2].id);
        assert_eq!(view.selected, 2);
        assert_eq!(view.current_id(&teams), Some(teams[2].id.clone()));

        view.set_filter(Some("mystics".into()));
        view.selected = 4;
        view.select_id(&teams, &teams[2].id);
        assert_eq!(view.selected, 0);
    }

    #[test]
    fn picker_tracks_checked_players_in_order() {
        let players = Player::samples();
        let mut picker = PickPlayersState::new("team-1", players.clone());
        assert_eq!(picker.len(), players.len() + 1);

        picker.toggle_current_selection();
        assert!(picker.checked.is_empty());

        picker.select_last();
        picker.toggle_current_selection();
        picker.move_selection(-3);
        picker.toggle_current_selection();
        assert!(picker.is_checked(2));
        assert!(!picker.is_checked(0));

        let ids: Vec<String> = picker.checked_players().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, [players[1].id.clone(), players[4].id.clone()]);
    }
}
