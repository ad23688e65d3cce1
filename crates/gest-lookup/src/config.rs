//! # Lookup Settings
//!
//! Endpoints and timing for the remote collaborators. Loaded as the
//! `[lookup]` table of the wizard's TOML file.
//!
//! ```toml
//! [lookup]
//! base_url = "http://localhost:8080"
//! search_path = "/api/productos/buscar"
//! submit_path = "/ventas/guardar"
//! debounce_ms = 300
//! min_term_len = 3
//! request_timeout_secs = 10
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{LookupError, LookupResult};

/// Query parameter carrying the search term.
pub const SEARCH_TERM_PARAM: &str = "termino";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupSettings {
    /// Scheme, host and port of the backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_search_path")]
    pub search_path: String,

    #[serde(default = "default_submit_path")]
    pub submit_path: String,

    /// Settling window for search input (milliseconds).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Shorter terms never reach the network.
    #[serde(default = "default_min_term_len")]
    pub min_term_len: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_search_path() -> String {
    "/api/productos/buscar".to_string()
}

fn default_submit_path() -> String {
    "/ventas/guardar".to_string()
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_term_len() -> usize {
    gest_core::MIN_SEARCH_TERM_LEN
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for LookupSettings {
    fn default() -> Self {
        LookupSettings {
            base_url: default_base_url(),
            search_path: default_search_path(),
            submit_path: default_submit_path(),
            debounce_ms: default_debounce_ms(),
            min_term_len: default_min_term_len(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl LookupSettings {
    /// Settings pointing at another backend, everything else default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        LookupSettings {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Full search URL for `term`, query-encoded.
    ///
    /// ## Example
    /// ```rust
    /// use gest_lookup::LookupSettings;
    ///
    /// let url = LookupSettings::default().search_url("lápiz rojo").unwrap();
    /// assert_eq!(
    ///     url.as_str(),
    ///     "http://localhost:8080/api/productos/buscar?termino=l%C3%A1piz+rojo"
    /// );
    /// ```
    pub fn search_url(&self, term: &str) -> LookupResult<Url> {
        let mut url = self.endpoint(&self.search_path)?;
        url.query_pairs_mut().append_pair(SEARCH_TERM_PARAM, term);
        Ok(url)
    }

    pub fn submit_url(&self) -> LookupResult<Url> {
        self.endpoint(&self.submit_path)
    }

    fn endpoint(&self, path: &str) -> LookupResult<Url> {
        Ok(Url::parse(&self.base_url)?.join(path)?)
    }

    /// Validates the settings.
    pub fn validate(&self) -> LookupResult<()> {
        let base = Url::parse(&self.base_url)?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(LookupError::InvalidUrl(format!(
                "Base URL must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        for (name, path) in [("search_path", &self.search_path), ("submit_path", &self.submit_path)] {
            if !path.starts_with('/') {
                return Err(LookupError::InvalidConfig(format!(
                    "{} must start with '/', got: {}",
                    name, path
                )));
            }
        }

        if self.min_term_len == 0 {
            return Err(LookupError::InvalidConfig(
                "min_term_len must be greater than 0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(LookupError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
