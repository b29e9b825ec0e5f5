//! CLI output formatting.
//!
//! Human-readable report lines go to stdout. In `--json` mode each command
//! prints exactly one JSON document to stdout instead, and the report lines
//! are dropped. Warnings and errors always go to stderr, as JSON lines when
//! `--json` is set.

use std::fmt::Display;

use owo_colors::OwoColorize;
use parking_lot::{const_rwlock, RwLock};
use serde_json::json;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit one JSON document per command instead of report lines.
    pub json: bool,
    /// Suppress report lines; warnings and errors still print.
    pub quiet: bool,
    /// Verbosity level (0 = normal, 1+ = increasingly verbose).
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }

    /// Log level implied by `-q` / `-v`, if any.
    #[must_use]
    pub const fn log_level(self) -> Option<&'static str> {
        match (self.quiet, self.verbose) {
            (true, _) => Some("warn"),
            (false, 0) => None,
            (false, 1) => Some("debug"),
            (false, _) => Some("trace"),
        }
    }

    const fn reports(self) -> bool {
        !self.json && !self.quiet
    }
}

static OUTPUT: RwLock<OutputConfig> = const_rwlock(OutputConfig::new(false, false, 0));

fn current() -> OutputConfig {
    *OUTPUT.read()
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    *OUTPUT.write() = config;
}

#[must_use]
pub fn is_json() -> bool {
    current().json
}

#[must_use]
pub fn is_quiet() -> bool {
    current().quiet
}

fn diagnostic(level: &str, symbol: impl Display, message: &str) {
    if current().json {
        eprintln!("{}", json!({ "level": level, "message": message }));
    } else {
        eprintln!("  {symbol} {message}");
    }
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    if current().reports() {
        println!("  {:<22} {}", label.dimmed(), value);
    }
}

/// Print a success line.
pub fn success(message: &str) {
    if current().reports() {
        println!("  {} {}", "✓".green(), message);
    }
}

/// Print a warning to stderr.
pub fn warning(message: &str) {
    diagnostic("warning", "⚠".yellow(), message);
}

/// Print an error to stderr.
pub fn error(message: &str) {
    diagnostic("error", "×".red(), message);
}

/// Print a section header.
pub fn section(title: &str) {
    if current().reports() {
        println!();
        println!("{}", title.bold());
    }
}

pub fn note(message: &str) {
    if current().reports() {
        println!("  {}", message.dimmed());
    }
}

/// Print a hint with "hint:" prefix.
pub fn hint(message: &str) {
    if current().reports() {
        println!("  {}: {}", "hint".cyan().dimmed(), message.dimmed());
    }
}

/// Print multiple lines of content, each indented.
pub fn lines(content: &str) {
    if current().reports() {
        for line in content.lines() {
            println!("  {line}");
        }
    }
}

/// Print the structured result of a command.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}

/// Format a positive count in green.
pub fn positive(value: impl Display) -> String {
    if is_json() {
        return value.to_string();
    }
    value.to_string().green().to_string()
}

/// Format a highlighted value in cyan.
pub fn highlight(value: impl Display) -> String {
    if is_json() {
        return value.to_string();
    }
    value.to_string().cyan().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_log_level() {
        assert_eq!(OutputConfig::new(false, false, 0).log_level(), None);
        assert_eq!(OutputConfig::new(false, false, 1).log_level(), Some("debug"));
        assert_eq!(OutputConfig::new(false, false, 3).log_level(), Some("trace"));
        assert_eq!(OutputConfig::new(false, true, 2).log_level(), Some("warn"));
    }

    #[test]
    fn json_and_quiet_suppress_report_lines() {
        assert!(OutputConfig::new(false, false, 0).reports());
        assert!(!OutputConfig::new(true, false, 0).reports());
        assert!(!OutputConfig::new(false, true, 0).reports());
    }
}
