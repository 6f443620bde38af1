//! The generic entity store. One [`EntityStore`] owns the ordered collection of
//! a single entity kind and mirrors it to a [`StoragePort`] after every
//! mutation. Storage is best effort: a failed read falls back to the kind's
//! sample collection and a failed write leaves the in-memory collection as
//! the only copy.

mod entity;
mod error;
mod league;
mod roster;

use std::collections::HashSet;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::{SharedStorage, StoragePort};

pub use entity::Entity;
pub use error::StoreError;
pub use league::LeagueStores;

/// Ordered, persisted collection of one entity kind.
pub struct EntityStore<E: Entity> {
    storage: SharedStorage,
    records: Vec<E>,
}

impl<E: Entity> EntityStore<E> {
    /// Load the kind's snapshot from `storage`, falling back to samples.
    /// Never fails.
    pub fn open(storage: SharedStorage) -> Self {
        let records = load_snapshot::<E>(storage.as_ref());
        Self { storage, records }
    }

    /// Current snapshot in display order.
    pub fn list(&self) -> &[E] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of `id` in display order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    /// Append a new record built from `new`. The record is validated before
    /// it joins the collection; invalid input leaves the store untouched.
    pub fn create(&mut self, new: E::New) -> Result<E, StoreError> {
        let record = E::from_new(self.next_id(), new);
        check_record(&record)?;
        self.records.push(record.clone());
        self.persist();
        debug!(kind = %E::KIND, id = record.id(), "created record");
        Ok(record)
    }

    /// Merge `patch` into the record with `id`. Returns `Ok(false)` when no
    /// such record exists.
    pub fn update(&mut self, id: &str, patch: E::Patch) -> Result<bool, StoreError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut candidate = self.records[index].clone();
        candidate.apply_patch(patch);
        check_record(&candidate)?;
        self.records[index] = candidate;
        self.persist();
        debug!(kind = %E::KIND, id, "updated record");
        Ok(true)
    }

    /// Remove the record with `id`. Deleting the last record persists an empty
    /// array rather than clearing the key.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.records.remove(index);
        self.persist();
        debug!(kind = %E::KIND, id, "deleted record");
        true
    }

    /// Move `source_id` into the slot `target_id` held before the move,
    /// shifting the records in between.
    pub fn reorder(&mut self, source_id: &str, target_id: &str) -> bool {
        if source_id == target_id {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(source_id), self.position(target_id)) else {
            return false;
        };
        move_item(&mut self.records, from, to);
        self.persist();
        debug!(kind = %E::KIND, source_id, target_id, from, to, "reordered records");
        true
    }

    /// Replace the whole collection, keeping the given order. Every record
    /// must pass validation and ids must be unique; otherwise nothing changes.
    pub fn replace_all(&mut self, records: Vec<E>) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(StoreError::DuplicateId {
                    kind: E::KIND,
                    id: record.id().to_string(),
                });
            }
            check_record(record)?;
        }
        self.records = records;
        self.persist();
        debug!(kind = %E::KIND, count = self.records.len(), "replaced collection");
        Ok(())
    }

    /// Flip the favorite flag and return its new value.
    pub fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let index = self.position(id)?;
        let record = &mut self.records[index];
        let favorite = !record.is_favorite();
        record.set_favorite(favorite);
        self.persist();
        Some(favorite)
    }

    /// Re-read the snapshot from storage, discarding the in-memory copy.
    pub fn reload(&mut self) {
        self.records = load_snapshot::<E>(self.storage.as_ref());
    }

    fn next_id(&self) -> String {
        loop {
            let id = format!("{}-{}", E::KIND.id_prefix(), Uuid::new_v4());
            if self.position(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&self) {
        let key = E::KIND.storage_key();
        let raw = match serde_json::to_string(&self.records) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "failed to serialize snapshot; skipping write");
                return;
            }
        };
        if let Err(err) = self.storage.set(key, &raw) {
            warn!(key, error = %err, "failed to persist snapshot; changes kept in memory only");
        }
    }
}

/// Read and decode one kind's snapshot. Anything unusable yields the samples.
fn check_record<E: Entity>(record: &E) -> Result<(), StoreError> {
    record.validate().map_err(|source| StoreError::Validation {
        kind: E::KIND,
        source,
    })
}

fn load_snapshot<E: Entity>(storage: &dyn StoragePort) -> Vec<E> {
    let key = E::KIND.storage_key();
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!(key, "no saved snapshot; starting from samples");
            return E::samples();
        }
        Err(err) => {
            warn!(key, error = %err, "failed to read snapshot; starting from samples");
            return E::samples();
        }
    };

    match serde_json::from_str::<Vec<E>>(&raw) {
        Ok(records) => {
            let records = drop_duplicate_ids(records);
            debug!(key, count = records.len(), "loaded snapshot");
            records
        }
        Err(err) => {
            warn!(key, error = %err, "saved snapshot is malformed; starting from samples");
            E::samples()
        }
    }
}

fn drop_duplicate_ids<E: Entity>(records: Vec<E>) -> Vec<E> {
    let mut seen = HashSet::new();
    let before = records.len();
    let kept: Vec<E> = records
        .into_iter()
        .filter(|record| seen.insert(record.id().to_string()))
        .collect();
    if kept.len() != before {
        warn!(
            kind = %E::KIND,
            dropped = before - kept.len(),
            "snapshot contained duplicate ids; kept first occurrences"
        );
    }
    kept
}

/// Remove the item at `from` and insert it at `to`.
pub(crate) fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::db::{MemoryStorage, StorageError, StorageResult};
    use crate::models::{
        Competition, CompetitionPatch, CompetitionType, EntityKind, NewCompetition, NewPlayer,
        Player, PlayerPatch, Team, Venue,
    };

    struct BrokenStorage;

    impl StoragePort for BrokenStorage {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::unavailable(
                format!("read {key}"),
                std::io::Error::other("disk on fire"),
            ))
        }

        fn set(&self, key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::unavailable(
                format!("write {key}"),
                std::io::Error::other("quota exceeded"),
            ))
        }

        fn remove(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    fn empty_storage(key: &str) -> Rc<MemoryStorage> {
        Rc::new(MemoryStorage::with_entry(key, "[]"))
    }

    fn player_store() -> (Rc<MemoryStorage>, EntityStore<Player>) {
        let storage = empty_storage("players");
        let store = EntityStore::open(storage.clone());
        (storage, store)
    }

    fn new_player(name: &str) -> NewPlayer {
        NewPlayer {
            name: name.into(),
            position: "Forward".into(),
            ..Default::default()
        }
    }

    fn ids<E: Entity>(store: &EntityStore<E>) -> Vec<String> {
        store.list().iter().map(|r| r.id().to_string()).collect()
    }

    #[test]
    fn open_uses_samples_when_key_is_missing() {
        let store: EntityStore<Venue> = EntityStore::open(Rc::new(MemoryStorage::new()));
        assert_eq!(store.list(), Venue::samples().as_slice());
    }

    #[test]
    fn open_uses_samples_when_snapshot_is_malformed() {
        let storage = Rc::new(MemoryStorage::with_entry("teams", "{not json"));
        let store: EntityStore<Team> = EntityStore::open(storage);
        assert_eq!(store.list(), Team::samples().as_slice());
    }

    #[test]
    fn open_uses_samples_when_read_fails() {
        let store: EntityStore<Team> = EntityStore::open(Rc::new(BrokenStorage));
        assert_eq!(store.len(), Team::samples().len());
    }

    #[test]
    fn open_keeps_an_empty_snapshot_empty() {
        let (_, store) = player_store();
        assert!(store.is_empty());
    }

    #[test]
    fn open_drops_duplicate_ids() {
        let raw = r#"[
            {"id":"p1","name":"A","position":"Wing"},
            {"id":"p1","name":"B","position":"Wing"},
            {"id":"p2","name":"C","position":"Wing"}
        ]"#;
        let store: EntityStore<Player> =
            EntityStore::open(Rc::new(MemoryStorage::with_entry("players", raw)));
        assert_eq!(ids(&store), ["p1", "p2"]);
        assert_eq!(store.get("p1").unwrap().name, "A");
    }

    #[test]
    fn create_appends_persists_and_defaults_favorite() {
        let (storage, mut store) = player_store();
        let first = store.create(new_player("Ana")).unwrap();
        let second = store.create(new_player("Bea")).unwrap();

        assert!(first.id.starts_with("player-"));
        assert_ne!(first.id, second.id);
        assert!(!first.is_favorite);
        assert_eq!(ids(&store), [first.id.clone(), second.id.clone()]);

        let saved: Vec<Player> = serde_json::from_str(&storage.raw("players").unwrap()).unwrap();
        assert_eq!(saved, store.list());
    }

    #[test]
    fn create_rejects_blank_name_without_mutating() {
        let (storage, mut store) = player_store();
        let err = store.create(new_player("   ")).unwrap_err();
        assert_eq!(err.user_message(), "Player name is required.");
        assert!(store.is_empty());
        assert_eq!(storage.raw("players").as_deref(), Some("[]"));
    }

    #[test]
    fn update_merges_patch_and_keeps_id() {
        let (_, mut store) = player_store();
        let created = store.create(new_player("Ana")).unwrap();
        let applied = store
            .update(
                &created.id,
                PlayerPatch {
                    position: Some("Goalkeeper".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(applied);
        let updated = store.get(&created.id).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.position, "Goalkeeper");
    }

    #[test]
    fn update_of_missing_id_is_a_no_op() {
        let (storage, mut store) = player_store();
        store.create(new_player("Ana")).unwrap();
        let before = store.list().to_vec();
        let raw_before = storage.raw("players");
        let applied = store
            .update(
                "player-missing",
                PlayerPatch {
                    name: Some("Ghost".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!applied);
        assert_eq!(store.list(), before.as_slice());
        assert_eq!(storage.raw("players"), raw_before);
    }

    #[test]
    fn invalid_patch_leaves_record_untouched() {
        let storage = empty_storage("competitions");
        let mut store: EntityStore<Competition> = EntityStore::open(storage);
        let created = store
            .create(NewCompetition {
                name: "Cup".into(),
                kind: CompetitionType::Tournament,
                start_date: Some("2024-05-01".into()),
                ..Default::default()
            })
            .unwrap();
        let err = store
            .update(
                &created.id,
                CompetitionPatch {
                    name: Some("Renamed".into()),
                    end_date: Some(Some("2024-04-01".into())),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
        assert_eq!(store.get(&created.id).unwrap(), &created);
    }

    #[test]
    fn delete_last_record_writes_empty_array() {
        let (storage, mut store) = player_store();
        let created = store.create(new_player("Ana")).unwrap();
        assert!(!store.delete("player-missing"));
        assert!(store.delete(&created.id));
        assert!(store.is_empty());
        assert_eq!(storage.raw("players").as_deref(), Some("[]"));
    }

    #[test]
    fn reorder_moves_source_into_target_slot() {
        let (_, mut store) = player_store();
        let a = store.create(new_player("A")).unwrap().id;
        let b = store.create(new_player("B")).unwrap().id;
        let c = store.create(new_player("C")).unwrap().id;
        let d = store.create(new_player("D")).unwrap().id;

        assert!(store.reorder(&a, &c));
        assert_eq!(ids(&store), [b.clone(), c.clone(), a.clone(), d.clone()]);

        assert!(store.reorder(&d, &b));
        assert_eq!(ids(&store), [d.clone(), b.clone(), c.clone(), a.clone()]);

        assert!(!store.reorder(&a, &a));
        assert!(!store.reorder(&a, "player-missing"));
        assert_eq!(ids(&store), [d, b, c, a]);
    }

    #[test]
    fn replace_all_rejects_duplicate_ids() {
        let (_, mut store) = player_store();
        let mut players = Player::samples();
        players[1].id = players[0].id.clone();
        let err = store.replace_all(players).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { .. }));
        assert!(store.is_empty());

        store.replace_all(Player::samples()).unwrap();
        assert_eq!(store.list(), Player::samples().as_slice());
    }

    #[test]
    fn replace_all_rejects_invalid_records() {
        let (storage, mut store) = player_store();
        let mut players = Player::samples();
        players[2].name = "   ".into();
        let err = store.replace_all(players).unwrap_err();
        assert!(matches!(err, StoreError::Validation { kind: EntityKind::Player, .. }));
        assert_eq!(err.user_message(), "Player name is required.");
        assert!(store.is_empty());
        assert_eq!(storage.raw("players").as_deref(), Some("[]"));
    }

    #[test]
    fn variant_tournament_spelling_survives_a_save() {
        let storage = Rc::new(MemoryStorage::with_entry(
            "competitions",
            r#"[{"id":"c1","name":"Cup","type":"Tournament","games":[]}]"#,
        ));
        let mut store: EntityStore<Competition> = EntityStore::open(storage.clone());
        assert_eq!(store.toggle_favorite("c1"), Some(true));
        store
            .update(
                "c1",
                CompetitionPatch {
                    kind: Some(CompetitionType::Tournament),
                    ..Default::default()
                },
            )
            .unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&storage.raw("competitions").unwrap()).unwrap();
        assert_eq!(saved[0]["type"], "Tournament");
        assert_eq!(saved[0]["isFavorite"], true);
    }

    #[test]
    fn toggle_favorite_flips_and_reports() {
        let (_, mut store) = player_store();
        let id = store.create(new_player("Ana")).unwrap().id;
        assert_eq!(store.toggle_favorite(&id), Some(true));
        assert!(store.get(&id).unwrap().is_favorite);
        assert_eq!(store.toggle_favorite(&id), Some(false));
        assert_eq!(store.toggle_favorite("player-missing"), None);
    }

    #[test]
    fn write_failures_do_not_surface() {
        let mut store: EntityStore<Player> = EntityStore::open(Rc::new(BrokenStorage));
        let count = store.len();
        let created = store.create(new_player("Ana")).unwrap();
        assert_eq!(store.len(), count + 1);
        assert_eq!(store.toggle_favorite(&created.id), Some(true));
        assert!(store.delete(&created.id));
        assert_eq!(store.len(), count);
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let (storage, mut store) = player_store();
        storage
            .set("players", r#"[{"id":"p9","name":"Zoe","position":"Wing"}]"#)
            .unwrap();
        assert!(store.is_empty());
        store.reload();
        assert_eq!(ids(&store), ["p9"]);
    }

    #[test]
    fn move_item_matches_array_move() {
        let mut items = vec![1, 2, 3, 4, 5];
        move_item(&mut items, 4, 1);
        assert_eq!(items, [1, 5, 2, 3, 4]);
        move_item(&mut items, 0, 4);
        assert_eq!(items, [5, 2, 3, 4, 1]);
    }
}
