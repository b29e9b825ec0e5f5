//! Handler for `migrate`.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::sqlite::database::connection::{pool_for_path, run_migrations};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute `migrate`.
pub fn execute_migrate(config: &Config) -> Result<()> {
    if let Some(parent) = Path::new(&config.database)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    let pool = pool_for_path(&config.database)?;
    let applied = run_migrations(&pool)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "migrate",
            "database": config.database,
            "applied": applied,
        }));
        return Ok(());
    }

    if applied == 0 {
        output::success("Database schema is up to date");
    } else {
        output::success(&format!("Applied {applied} migration(s)"));
    }
    output::field("Database", &config.database);
    Ok(())
}
