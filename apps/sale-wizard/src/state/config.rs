//! # Wizard Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`GEST_*`)
//! 2. Config file (`wizard.toml`, `--config` path or the platform config dir)
//! 3. Defaults (this file)
//!
//! ## Example `wizard.toml`
//! ```toml
//! [sale]
//! tax_rate_bps = 1900
//! default_payment_method = "CASH"
//!
//! [currency]
//! symbol = "$"
//! decimals = 0
//! thousands_separator = "."
//! decimal_separator = ","
//!
//! [lookup]
//! base_url = "http://localhost:8080"
//! debounce_ms = 300
//! ```

use std::path::{Path, PathBuf};

use gest_core::validation::validate_tax_rate_bps;
use gest_core::{CurrencyFormat, PaymentMethod, TaxRate, DEFAULT_TAX_RATE_BPS};
use gest_lookup::LookupSettings;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "wizard.toml";

// =============================================================================
// Sale Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleSettings {
    /// Sales tax in basis points (1900 = 19%).
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,

    /// Payment method pre-selected on new drafts.
    #[serde(default)]
    pub default_payment_method: PaymentMethod,
}

fn default_tax_rate_bps() -> u32 {
    DEFAULT_TAX_RATE_BPS
}

impl Default for SaleSettings {
    fn default() -> Self {
        SaleSettings {
            tax_rate_bps: default_tax_rate_bps(),
            default_payment_method: PaymentMethod::default(),
        }
    }
}

// =============================================================================
// Wizard Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default)]
    pub sale: SaleSettings,

    #[serde(default)]
    pub currency: CurrencyFormat,

    #[serde(default)]
    pub lookup: LookupSettings,
}

impl WizardConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Load Order
    /// ```text
    /// defaults ──► wizard.toml (if present) ──► GEST_* env ──► validate()
    /// ```
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading wizard config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        validate_tax_rate_bps(self.sale.tax_rate_bps)
            .map_err(|e| AppError::config(e.to_string()))?;

        if self.currency.decimals > 2 {
            return Err(AppError::config(format!(
                "currency decimals must be between 0 and 2, got: {}",
                self.currency.decimals
            )));
        }

        if self.currency.thousands_separator == self.currency.decimal_separator {
            return Err(AppError::config(
                "thousands and decimal separators must differ",
            ));
        }

        self.lookup.validate()?;
        Ok(())
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.sale.tax_rate_bps)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `GEST_*` overrides read through `lookup`.
    ///
    /// Unparseable numeric values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bps) = lookup("GEST_TAX_RATE_BPS").and_then(|v| v.parse::<u32>().ok()) {
            debug!(tax_rate_bps = bps, "Overriding tax rate from environment");
            self.sale.tax_rate_bps = bps;
        }

        if let Some(method) = lookup("GEST_PAYMENT_METHOD").and_then(|v| v.parse::<PaymentMethod>().ok()) {
            self.sale.default_payment_method = method;
        }

        if let Some(symbol) = lookup("GEST_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }

        if let Some(decimals) = lookup("GEST_CURRENCY_DECIMALS").and_then(|v| v.parse::<u8>().ok()) {
            self.currency.decimals = decimals;
        }

        if let Some(url) = lookup("GEST_BASE_URL") {
            debug!(base_url = %url, "Overriding backend URL from environment");
            self.lookup.base_url = url;
        }

        if let Some(ms) = lookup("GEST_DEBOUNCE_MS").and_then(|v| v.parse::<u64>().ok()) {
            self.lookup.debounce_ms = ms;
        }

        if let Some(secs) = lookup("GEST_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            self.lookup.request_timeout_secs = secs;
        }
    }

    /// Platform config location of `wizard.toml`.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("cl", "gest", "sale-wizard")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = WizardConfig::default();
        assert_eq!(config.tax_rate().bps(), 1900);
        assert_eq!(config.sale.default_payment_method, PaymentMethod::Cash);
        assert_eq!(config.currency.decimals, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_tables() {
        let config: WizardConfig = toml::from_str(
            r#"
            [sale]
            default_payment_method = "DEBIT_CARD"

            [lookup]
            base_url = "http://192.168.1.20:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.sale.tax_rate_bps, 1900);
        assert_eq!(config.sale.default_payment_method, PaymentMethod::DebitCard);
        assert_eq!(config.lookup.base_url, "http://192.168.1.20:8080");
        assert_eq!(config.lookup.debounce_ms, 300);
        assert_eq!(config.currency.symbol, "$");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = WizardConfig::default();
        config.apply_overrides(env(&[
            ("GEST_TAX_RATE_BPS", "1000"),
            ("GEST_PAYMENT_METHOD", "transfer"),
            ("GEST_BASE_URL", "https://ventas.example.cl"),
            ("GEST_DEBOUNCE_MS", "not-a-number"),
        ]));

        assert_eq!(config.sale.tax_rate_bps, 1000);
        assert_eq!(config.sale.default_payment_method, PaymentMethod::BankTransfer);
        assert_eq!(config.lookup.base_url, "https://ventas.example.cl");
        assert_eq!(config.lookup.debounce_ms, 300);
    }

    #[test]
    fn test_config_validation() {
        let mut config = WizardConfig::default();
        config.sale.tax_rate_bps = 12_000;
        assert!(config.validate().is_err());

        let mut config = WizardConfig::default();
        config.currency.decimals = 3;
        assert!(config.validate().is_err());

        let mut config = WizardConfig::default();
        config.currency.decimal_separator = ".".into();
        assert!(config.validate().is_err());

        let mut config = WizardConfig::default();
        config.lookup.base_url = "ftp://files".into();
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigError);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("gest-wizard-missing-config.toml");
        let config = WizardConfig::load(Some(path)).unwrap();
        assert_eq!(config.lookup.search_path, "/api/productos/buscar");
    }
}
