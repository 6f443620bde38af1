//! End-to-end store scenarios against each storage backend.

use std::rc::Rc;

use league_manager::models::{CompetitionType, NewCompetition, NewVenue, TeamPatch, VenueType};
use league_manager::{
    Competition, Entity, EntityStore, FileStorage, LeagueStores, MemoryStorage, SharedStorage,
    SqliteStorage, StoragePort, Team,
};
use tempfile::TempDir;

fn backends() -> Vec<(&'static str, SharedStorage, TempDir)> {
    let file_dir = tempfile::tempdir().unwrap();
    let sqlite_dir = tempfile::tempdir().unwrap();
    let memory_dir = tempfile::tempdir().unwrap();
    vec![
        (
            "file",
            Rc::new(FileStorage::open(file_dir.path()).unwrap()),
            file_dir,
        ),
        (
            "sqlite",
            Rc::new(SqliteStorage::open(&sqlite_dir.path().join("league.sqlite")).unwrap()),
            sqlite_dir,
        ),
        ("memory", Rc::new(MemoryStorage::new()), memory_dir),
    ]
}

fn ids<E: Entity>(store: &EntityStore<E>) -> Vec<String> {
    store.list().iter().map(|r| r.id().to_string()).collect()
}

#[test]
fn winter_league_lifecycle() {
    for (name, storage, _dir) in backends() {
        storage.set("competitions", "[]").unwrap();
        let mut store: EntityStore<Competition> = EntityStore::open(storage.clone());
        assert!(store.is_empty(), "{name}");

        let created = store
            .create(NewCompetition {
                name: "Winter League".into(),
                kind: CompetitionType::Season,
                is_favorite: false,
                ..Default::default()
            })
            .unwrap();
        assert!(!created.id.is_empty(), "{name}");
        assert_eq!(store.list(), [created.clone()], "{name}");
        assert!(created.games.is_empty(), "{name}");
        assert_eq!(created.kind, CompetitionType::Season, "{name}");

        assert_eq!(store.toggle_favorite(&created.id), Some(true), "{name}");
        assert!(store.get(&created.id).unwrap().is_favorite, "{name}");

        assert!(store.delete(&created.id), "{name}");
        assert!(store.list().is_empty(), "{name}");
        assert_eq!(
            storage.get("competitions").unwrap().as_deref(),
            Some("[]"),
            "{name}"
        );
    }
}

#[test]
fn reordering_two_teams() {
    for (name, storage, _dir) in backends() {
        storage
            .set(
                "teams",
                r#"[{"id":"1","name":"Thunderbolts"},{"id":"2","name":"Mystics"}]"#,
            )
            .unwrap();
        let mut store: EntityStore<Team> = EntityStore::open(storage.clone());
        assert!(store.reorder("2", "1"), "{name}");
        assert_eq!(ids(&store), ["2", "1"], "{name}");

        let reopened: EntityStore<Team> = EntityStore::open(storage);
        assert_eq!(ids(&reopened), ["2", "1"], "{name}");
        assert!(reopened.list().iter().all(|t| t.players.is_empty()), "{name}");
    }
}

#[test]
fn changes_survive_reopening_the_backend() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("league.sqlite");

    let venue_id = {
        let storage: SharedStorage = Rc::new(SqliteStorage::open(&db_path).unwrap());
        let mut stores = LeagueStores::open(storage);
        let venue = stores
            .venues
            .create(NewVenue {
                name: "Old Mill Ground".into(),
                location: "Mill Lane".into(),
                kind: VenueType::Outdoor,
                is_favorite: true,
            })
            .unwrap();
        let team_id = stores.teams.list()[0].id.clone();
        stores
            .teams
            .update(
                &team_id,
                TeamPatch {
                    name: Some("Thunderbolts II".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        venue.id
    };

    let storage: SharedStorage = Rc::new(SqliteStorage::open(&db_path).unwrap());
    let stores = LeagueStores::open(storage);
    let venue = stores.venues.get(&venue_id).unwrap();
    assert_eq!(venue.name, "Old Mill Ground");
    assert!(venue.is_favorite);
    assert_eq!(stores.teams.list()[0].name, "Thunderbolts II");
    assert_eq!(stores.players.len(), 5);
}

#[test]
fn store_keeps_working_when_the_snapshot_directory_vanishes() {
    let dir = tempfile::tempdir().unwrap();
    let snapshots = dir.path().join("snapshots");
    let storage: SharedStorage = Rc::new(FileStorage::open(&snapshots).unwrap());
    let mut store: EntityStore<Team> = EntityStore::open(storage);
    std::fs::remove_dir_all(&snapshots).unwrap();

    let team_id = store.list()[1].id.clone();
    assert_eq!(store.toggle_favorite(&team_id), Some(true));
    assert!(store.get(&team_id).unwrap().is_favorite);
}
