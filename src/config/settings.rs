//! Application settings loading from config.toml
//!
//! Settings are optional: every field has a default, and a missing
//! `config.toml` simply yields [`Settings::default`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ledger behaviour
    pub ledger: LedgerSettings,
}

/// `[ledger]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Category used for personal transactions recorded by settlements
    pub settlement_category: String,
    /// Currency symbol used when formatting amounts
    pub currency_symbol: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            settlement_category: "Settlement".to_string(),
            currency_symbol: "$".to_string(),
        }
    }
}

impl Settings {
    /// Formats a money amount with the configured currency symbol.
    #[must_use]
    pub fn money(&self, amount: f64) -> String {
        format!("{}{amount:.2}", self.ledger.currency_symbol)
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses settings from TOML text.
pub fn parse_config(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from the default location (./config.toml), falling back to
/// defaults when the file does not exist.
pub fn load_default_config() -> Result<Settings> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_config(path)
    } else {
        info!("No config.toml found, using default settings.");
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [ledger]
            settlement_category = "Debts"
            currency_symbol = "€"
        "#;

        let settings = parse_config(toml_str).unwrap();
        assert_eq!(settings.ledger.settlement_category, "Debts");
        assert_eq!(settings.ledger.currency_symbol, "€");
        assert_eq!(settings.money(12.5), "€12.50");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = parse_config("[ledger]\ncurrency_symbol = \"£\"\n").unwrap();
        assert_eq!(settings.ledger.settlement_category, "Settlement");
        assert_eq!(settings.ledger.currency_symbol, "£");

        let empty = parse_config("").unwrap();
        assert_eq!(empty.ledger.currency_symbol, "$");
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let result = parse_config("[ledger\nbroken");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
