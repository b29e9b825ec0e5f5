//! SQLite database modules.
//!
//! Connection management, schema definitions and Diesel row types.

pub mod connection;
pub mod model;
pub mod schema;
