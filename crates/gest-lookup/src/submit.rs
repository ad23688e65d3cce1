//! # Sale Submission
//!
//! Posts the serialized draft to the sale form endpoint.
//!
//! ## Outcome Mapping
//! ```text
//! POST /ventas/guardar (urlencoded FormPayload, redirects NOT followed)
//!      │
//!      ├── 3xx  Location: /ventas/detalle/42  ──► Ok(SubmitOutcome { sale_id: Some(42) })
//!      ├── 2xx  form re-rendered with error   ──► Err(LookupError::Rejected)
//!      └── 4xx / 5xx                          ──► Err(LookupError::Status)
//! ```

use async_trait::async_trait;
use gest_core::FormPayload;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use tracing::{debug, info, warn};

use crate::config::LookupSettings;
use crate::error::{LookupError, LookupResult};

/// Path prefix of the sale detail page the server redirects to.
const SALE_DETAIL_PREFIX: &str = "/ventas/detalle/";

/// A saved sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Sale id parsed from the redirect, when the server sent one.
    pub sale_id: Option<i64>,
    /// Raw `Location` header.
    pub location: Option<String>,
}

impl SubmitOutcome {
    fn from_location(location: Option<String>) -> Self {
        let sale_id = location.as_deref().and_then(parse_sale_id);
        SubmitOutcome { sale_id, location }
    }
}

fn parse_sale_id(location: &str) -> Option<i64> {
    let path = match url::Url::parse(location) {
        Ok(url) => url.path().to_string(),
        Err(_) => location.split(['?', '#']).next().unwrap_or(location).to_string(),
    };
    path.strip_prefix(SALE_DETAIL_PREFIX)?
        .trim_end_matches('/')
        .parse()
        .ok()
}

/// Receives finished sales.
#[async_trait]
pub trait SaleSink: Send + Sync {
    async fn submit(&self, payload: &FormPayload) -> LookupResult<SubmitOutcome>;
}

/// HTTP form poster for the sale endpoint.
#[derive(Debug, Clone)]
pub struct SaleSubmitter {
    client: reqwest::Client,
    settings: LookupSettings,
}

impl SaleSubmitter {
    pub fn new(settings: LookupSettings) -> LookupResult<Self> {
        settings.validate()?;
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| LookupError::InvalidConfig(e.to_string()))?;

        Ok(SaleSubmitter { client, settings })
    }
}

#[async_trait]
impl SaleSink for SaleSubmitter {
    async fn submit(&self, payload: &FormPayload) -> LookupResult<SubmitOutcome> {
        let url = self.settings.submit_url()?;
        debug!(%url, lines = payload.line_count(), "Submitting sale");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(payload.to_urlencoded())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout(self.settings.request_timeout_secs)
                } else {
                    LookupError::from(e)
                }
            })?;

        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let outcome = SubmitOutcome::from_location(location);
            info!(sale_id = ?outcome.sale_id, "Sale saved");
            return Ok(outcome);
        }

        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            warn!(status = status.as_u16(), "Sale form came back, sale not saved");
            return Err(LookupError::Rejected(
                "the server returned the form instead of saving the sale".into(),
            ));
        }

        warn!(status = status.as_u16(), "Sale submission failed");
        Err(LookupError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
