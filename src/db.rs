//! Persistence backends behind the [`StoragePort`] key-value interface. The
//! entity stores only ever see the trait, so each backend stays a thin
//! adapter: a SQLite table for everyday use, a directory of JSON files for
//! people who like to inspect or version their data, and an in-memory map for
//! throwaway sessions and tests.

mod file;
mod memory;
mod sqlite;
mod storage;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::{ensure_schema, SqliteStorage};
pub use storage::{SharedStorage, StorageError, StoragePort, StorageResult};
