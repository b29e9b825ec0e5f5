//! Path utilities for crossedge.
//!
//! The default configuration file is `~/.crossedge/config.toml`. The
//! database path comes from configuration.

use std::path::PathBuf;

/// Returns the crossedge home directory (`~/.crossedge/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".crossedge")
}

/// Returns the default config file path (`~/.crossedge/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_under_crossedge_home() {
        let home = home_dir();
        assert!(home.to_string_lossy().contains(".crossedge"));
        assert!(default_config().starts_with(&home));
    }
}
