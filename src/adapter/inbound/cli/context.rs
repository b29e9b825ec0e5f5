//! Shared setup for command handlers: configuration and store.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::paths;
use crate::adapter::outbound::sqlite::database::connection::{pool_for_path, run_migrations};
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Load configuration.
///
/// An explicit path must exist. Without one, the default file under
/// `~/.crossedge/` is used when present, otherwise built-in defaults.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path);
    }
    let default = paths::default_config();
    if default.exists() {
        debug!(path = %default.display(), "Using default config file");
        return Config::load(default);
    }
    Config::from_env()
}

/// Open the configured database, applying pending migrations.
///
/// # Errors
/// Returns an error if the database cannot be opened or migrated.
pub fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let path = Path::new(&config.database);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let pool = pool_for_path(&config.database)?;
    let applied = run_migrations(&pool)?;
    if applied > 0 {
        debug!(applied, database = %config.database, "Applied migrations");
    }
    Ok(Arc::new(SqliteStore::new(pool)))
}
