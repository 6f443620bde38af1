//! Ratatui front-end. One list screen per entity kind plus a roster screen
//! for teams; every mutation goes through [`LeagueStores`](crate::store::LeagueStores).

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
