//! # Product Lookup
//!
//! The remote product search seam. The debouncer only sees the
//! [`ProductLookup`] trait, so tests swap the HTTP client for an in-memory
//! catalog.

use async_trait::async_trait;
use gest_core::ProductHit;
use tracing::{debug, warn};

use crate::config::LookupSettings;
use crate::error::{LookupError, LookupResult};

/// Searches the product catalog by free text.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Returns every product matching `term` (possibly none).
    async fn search(&self, term: &str) -> LookupResult<Vec<ProductHit>>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// `GET {base_url}{search_path}?termino=<term>` against the backend.
#[derive(Debug, Clone)]
pub struct HttpProductLookup {
    client: reqwest::Client,
    settings: LookupSettings,
}

impl HttpProductLookup {
    /// Builds the client. Fails on invalid settings.
    pub fn new(settings: LookupSettings) -> LookupResult<Self> {
        settings.validate()?;
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| LookupError::InvalidConfig(e.to_string()))?;

        Ok(HttpProductLookup { client, settings })
    }

    pub fn settings(&self) -> &LookupSettings {
        &self.settings
    }
}

#[async_trait]
impl ProductLookup for HttpProductLookup {
    async fn search(&self, term: &str) -> LookupResult<Vec<ProductHit>> {
        let url = self.settings.search_url(term)?;
        debug!(%url, "Searching products");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout(self.settings.request_timeout_secs)
            } else {
                LookupError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), term, "Product search failed");
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let hits: Vec<ProductHit> = serde_json::from_slice(&bytes)?;
        debug!(term, count = hits.len(), "Product search returned");
        Ok(hits)
    }
}
