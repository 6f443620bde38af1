use crate::db::SharedStorage;
use crate::models::{Competition, EntityKind, Player, Team, Venue};

use super::{Entity, EntityStore};

/// The four stores of a session, all backed by the same storage handle.
/// Operations that do not depend on the record type are exposed here keyed
/// by [`EntityKind`] so callers can stay kind-agnostic.
pub struct LeagueStores {
    pub competitions: EntityStore<Competition>,
    pub teams: EntityStore<Team>,
    pub players: EntityStore<Player>,
    pub venues: EntityStore<Venue>,
}

impl LeagueStores {
    pub fn open(storage: SharedStorage) -> Self {
        Self {
            competitions: EntityStore::open(storage.clone()),
            teams: EntityStore::open(storage.clone()),
            players: EntityStore::open(storage.clone()),
            venues: EntityStore::open(storage),
        }
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Competition => self.competitions.len(),
            EntityKind::Team => self.teams.len(),
            EntityKind::Player => self.players.len(),
            EntityKind::Venue => self.venues.len(),
        }
    }

    /// Ids of `kind` in display order.
    pub fn ids(&self, kind: EntityKind) -> Vec<String> {
        fn collect<E: Entity>(store: &EntityStore<E>) -> Vec<String> {
            store.list().iter().map(|r| r.id().to_string()).collect()
        }
        match kind {
            EntityKind::Competition => collect(&self.competitions),
            EntityKind::Team => collect(&self.teams),
            EntityKind::Player => collect(&self.players),
            EntityKind::Venue => collect(&self.venues),
        }
    }

    /// Display name of the record, if it exists.
    pub fn name_of(&self, kind: EntityKind, id: &str) -> Option<String> {
        let name = match kind {
            EntityKind::Competition => self.competitions.get(id).map(|r| r.name()),
            EntityKind::Team => self.teams.get(id).map(|r| r.name()),
            EntityKind::Player => self.players.get(id).map(|r| r.name()),
            EntityKind::Venue => self.venues.get(id).map(|r| r.name()),
        };
        name.map(str::to_string)
    }

    pub fn delete(&mut self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Competition => self.competitions.delete(id),
            EntityKind::Team => self.teams.delete(id),
            EntityKind::Player => self.players.delete(id),
            EntityKind::Venue => self.venues.delete(id),
        }
    }

    pub fn toggle_favorite(&mut self, kind: EntityKind, id: &str) -> Option<bool> {
        match kind {
            EntityKind::Competition => self.competitions.toggle_favorite(id),
            EntityKind::Team => self.teams.toggle_favorite(id),
            EntityKind::Player => self.players.toggle_favorite(id),
            EntityKind::Venue => self.venues.toggle_favorite(id),
        }
    }

    pub fn reorder(&mut self, kind: EntityKind, source_id: &str, target_id: &str) -> bool {
        match kind {
            EntityKind::Competition => self.competitions.reorder(source_id, target_id),
            EntityKind::Team => self.teams.reorder(source_id, target_id),
            EntityKind::Player => self.players.reorder(source_id, target_id),
            EntityKind::Venue => self.venues.reorder(source_id, target_id),
        }
    }

    /// Re-read every kind from storage.
    pub fn reload_all(&mut self) {
        self.competitions.reload();
        self.teams.reload();
        self.players.reload();
        self.venues.reload();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::db::MemoryStorage;

    #[test]
    fn stores_share_one_storage_under_separate_keys() {
        let storage = Rc::new(MemoryStorage::new());
        let mut stores = LeagueStores::open(storage.clone());
        assert_eq!(stores.len(EntityKind::Team), Team::samples().len());

        let team_id = stores.ids(EntityKind::Team)[0].clone();
        assert_eq!(stores.toggle_favorite(EntityKind::Team, &team_id), Some(false));
        assert!(storage.raw("teams").is_some());
        assert!(storage.raw("venues").is_none());

        let venue_ids = stores.ids(EntityKind::Venue);
        assert!(stores.reorder(EntityKind::Venue, &venue_ids[1], &venue_ids[0]));
        assert_eq!(
            stores.ids(EntityKind::Venue),
            [venue_ids[1].clone(), venue_ids[0].clone()]
        );

        assert!(stores.delete(EntityKind::Venue, &venue_ids[0]));
        assert_eq!(stores.len(EntityKind::Venue), 1);
        assert_eq!(stores.name_of(EntityKind::Venue, &venue_ids[0]), None);

        let reopened = LeagueStores::open(storage);
        assert_eq!(reopened.ids(EntityKind::Venue), [venue_ids[1].clone()]);
        assert!(!reopened.teams.get(&team_id).unwrap().is_favorite);
    }
}
