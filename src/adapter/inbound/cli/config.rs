//! Handler for the `config` command group.

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;

/// Execute `config show`.
pub fn execute_show(config: &Config) -> Result<()> {
    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "config": serde_json::to_value(config)?,
        }));
        return Ok(());
    }

    let rendered = toml::to_string_pretty(config).map_err(|e| Error::Parse(e.to_string()))?;
    output::section("Effective configuration");
    output::lines(&rendered);
    Ok(())
}

/// Execute `config validate`.
///
/// Loading already validated the file; this reports what is loaded and
/// warns about platforms whose pairs will fail at evaluation time.
pub fn execute_validate(config: &Config) -> Result<()> {
    let missing = config.platforms_missing_fee_coefficient();

    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "valid": true,
            "platforms": config.platforms.len(),
            "missing_fee_coefficient": missing.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    output::success("Configuration is valid");
    output::field("Database", &config.database);
    output::field("Platforms", config.platforms.len());
    output::field("Match threshold", config.matching.threshold);
    for platform in missing {
        output::warning(&format!(
            "platform {platform} charges fees but has no fee_coefficient"
        ));
    }
    Ok(())
}
