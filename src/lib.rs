//! Core library surface for the league manager: entity models, the
//! persisted entity stores, storage backends and the terminal UI.
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

pub use config::AppConfig;
pub use db::{FileStorage, MemoryStorage, SharedStorage, SqliteStorage, StoragePort};
pub use models::{Competition, EntityKind, Player, Team, Venue};
pub use store::{Entity, EntityStore, LeagueStores, StoreError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
