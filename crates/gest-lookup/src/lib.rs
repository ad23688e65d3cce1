//! # gest-lookup: Remote Collaborators of the Sale Wizard
//!
//! Everything that leaves the process: the product search endpoint, the
//! debounced search actor in front of it, and the sale form submission.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lookup Layer                                     │
//! │                                                                         │
//! │  sale-wizard controller loop                                           │
//! │        │ input(term)                         ▲ SearchEvent              │
//! │        ▼                                     │                          │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  SearchDebouncer (tokio task)                                    │  │
//! │  │  300ms settling window • generation counter • stale drop         │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 │ Arc<dyn ProductLookup>               │
//! │                                 ▼                                       │
//! │  ┌────────────────────────┐          ┌────────────────────────────┐    │
//! │  │ HttpProductLookup      │          │ SaleSubmitter (SaleSink)   │    │
//! │  │ GET /api/productos/    │          │ POST /ventas/guardar       │    │
//! │  │     buscar?termino=    │          │ urlencoded FormPayload     │    │
//! │  └────────────────────────┘          └────────────────────────────┘    │
//! │                                                                         │
//! │  Nothing here retries. Failures surface once and the user decides.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`client`] - `ProductLookup` trait and its HTTP implementation
//! - [`debounce`] - Settling-window search actor
//! - [`submit`] - Sale form submission
//! - [`config`] - Endpoints and timing
//! - [`error`] - Lookup error types

pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod submit;

pub use client::{HttpProductLookup, ProductLookup};
pub use config::LookupSettings;
pub use debounce::{DebounceConfig, SearchDebouncer, SearchEvent, SearchHandle};
pub use error::{LookupError, LookupResult};
pub use submit::{SaleSink, SaleSubmitter, SubmitOutcome};
