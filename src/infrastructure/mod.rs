//! Infrastructure layer.
//!
//! Configuration loading, validation and logging setup.

pub mod config;
