//! SQLite persistence adapter.
//!
//! Implements every outbound store port on a single Diesel-managed SQLite
//! database.

pub mod database;
pub mod store;

pub use store::SqliteStore;
