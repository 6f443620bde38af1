//! Property tests for ordering and snapshot round-trips.

use std::rc::Rc;

use league_manager::models::VenueType;
use league_manager::{Entity, EntityStore, MemoryStorage, Player, Venue};
use proptest::prelude::*;

fn numbered_players(count: usize) -> Vec<Player> {
    (0..count)
        .map(|i| Player {
            id: format!("p{i}"),
            name: format!("Player {i}"),
            position: "Forward".into(),
            is_favorite: false,
        })
        .collect()
}

fn player_store(records: Vec<Player>) -> EntityStore<Player> {
    let mut store = EntityStore::open(Rc::new(MemoryStorage::with_entry("players", "[]")));
    store.replace_all(records).unwrap();
    store
}

fn ids<E: Entity>(store: &EntityStore<E>) -> Vec<String> {
    store.list().iter().map(|r| r.id().to_string()).collect()
}

fn venue_strategy() -> impl Strategy<Value = (String, String, bool, bool)> {
    (
        "[A-Za-z][A-Za-z0-9 ]{0,24}",
        "[A-Za-z0-9][A-Za-z0-9 ,.]{0,32}",
        any::<bool>(),
        any::<bool>(),
    )
}

proptest! {
    #[test]
    fn reorder_places_source_at_target_index(
        (count, from, to) in (2usize..10).prop_flat_map(|n| (Just(n), 0..n, 0..n))
    ) {
        let mut store = player_store(numbered_players(count));
        let before = ids(&store);
        let changed = store.reorder(&before[from], &before[to]);
        let after = ids(&store);

        if from == to {
            prop_assert!(!changed);
            prop_assert_eq!(&after, &before);
        } else {
            prop_assert!(changed);
            prop_assert_eq!(&after[to], &before[from]);
            let mut rest_before = before.clone();
            rest_before.remove(from);
            let mut rest_after = after.clone();
            rest_after.remove(to);
            prop_assert_eq!(rest_after, rest_before);
        }
    }

    #[test]
    fn adjacent_reorder_is_undone_by_the_reverse(
        (count, index) in (2usize..10).prop_flat_map(|n| (Just(n), 0..n - 1))
    ) {
        let mut store = player_store(numbered_players(count));
        let before = ids(&store);
        let (a, b) = (before[index].clone(), before[index + 1].clone());
        prop_assert!(store.reorder(&a, &b));
        prop_assert!(store.reorder(&b, &a));
        prop_assert_eq!(ids(&store), before);
    }

    #[test]
    fn snapshot_round_trips_through_storage(entries in prop::collection::vec(venue_strategy(), 0..12)) {
        let venues: Vec<Venue> = entries
            .into_iter()
            .enumerate()
            .map(|(i, (name, location, outdoor, is_favorite))| Venue {
                id: format!("venue-{i}"),
                name,
                location,
                kind: if outdoor { VenueType::Outdoor } else { VenueType::Indoor },
                is_favorite,
            })
            .collect();

        let storage = Rc::new(MemoryStorage::new());
        let mut store: EntityStore<Venue> = EntityStore::open(storage.clone());
        store.replace_all(venues.clone()).unwrap();

        let reopened: EntityStore<Venue> = EntityStore::open(storage);
        prop_assert_eq!(reopened.list(), venues.as_slice());
    }
}
