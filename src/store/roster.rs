//! Roster editing for teams. Each helper is a thin wrapper over
//! [`EntityStore::update`] with a `players` patch, so rosters persist exactly
//! like any other field.

use tracing::warn;

use crate::models::{Player, Team, TeamPatch};

use super::{move_item, EntityStore};

impl EntityStore<Team> {
    /// Append a copy of `player` to the team's roster. Returns `false` when the
    /// team is missing or the player is already on it.
    pub fn add_to_roster(&mut self, team_id: &str, player: Player) -> bool {
        let Some(team) = self.get(team_id) else {
            return false;
        };
        if team.has_player(&player.id) {
            return false;
        }
        let mut players = team.players.clone();
        players.push(player);
        self.set_roster(team_id, players)
    }

    pub fn remove_from_roster(&mut self, team_id: &str, player_id: &str) -> bool {
        let Some(team) = self.get(team_id) else {
            return false;
        };
        if !team.has_player(player_id) {
            return false;
        }
        let players = team
            .players
            .iter()
            .filter(|p| p.id != player_id)
            .cloned()
            .collect();
        self.set_roster(team_id, players)
    }

    /// Same contract as [`EntityStore::reorder`], applied to one roster.
    pub fn reorder_roster(&mut self, team_id: &str, source_id: &str, target_id: &str) -> bool {
        if source_id == target_id {
            return false;
        }
        let Some(team) = self.get(team_id) else {
            return false;
        };
        let from = team.players.iter().position(|p| p.id == source_id);
        let to = team.players.iter().position(|p| p.id == target_id);
        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };
        let mut players = team.players.clone();
        move_item(&mut players, from, to);
        self.set_roster(team_id, players)
    }

    fn set_roster(&mut self, team_id: &str, players: Vec<Player>) -> bool {
        let patch = TeamPatch {
            players: Some(players),
            ..Default::default()
        };
        match self.update(team_id, patch) {
            Ok(applied) => applied,
            Err(err) => {
                // Only reachable when a stored team already fails validation.
                warn!(team_id, error = %err, "roster change rejected");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::db::MemoryStorage;
    use crate::store::entity::Entity;
    use crate::models::NewTeam;

    fn roster_ids(store: &EntityStore<Team>, team_id: &str) -> Vec<String> {
        store
            .get(team_id)
            .unwrap()
            .players
            .iter()
            .map(|p| p.id.clone())
            .collect()
    }

    #[test]
    fn add_remove_and_reorder_roster() {
        let mut store: EntityStore<Team> =
            EntityStore::open(Rc::new(MemoryStorage::with_entry("teams", "[]")));
        let team = store
            .create(NewTeam {
                name: "Mystics".into(),
                is_favorite: false,
            })
            .unwrap();
        let players = Player::samples();

        assert!(store.add_to_roster(&team.id, players[0].clone()));
        assert!(store.add_to_roster(&team.id, players[1].clone()));
        assert!(store.add_to_roster(&team.id, players[2].clone()));
        assert!(!store.add_to_roster(&team.id, players[0].clone()));
        assert!(!store.add_to_roster("team-missing", players[3].clone()));
        assert_eq!(
            roster_ids(&store, &team.id),
            [players[0].id.clone(), players[1].id.clone(), players[2].id.clone()]
        );

        assert!(store.reorder_roster(&team.id, &players[2].id, &players[0].id));
        assert_eq!(
            roster_ids(&store, &team.id),
            [players[2].id.clone(), players[0].id.clone(), players[1].id.clone()]
        );

        assert!(store.remove_from_roster(&team.id, &players[0].id));
        assert!(!store.remove_from_roster(&team.id, &players[0].id));
        assert_eq!(
            roster_ids(&store, &team.id),
            [players[2].id.clone(), players[1].id.clone()]
        );
    }
}
