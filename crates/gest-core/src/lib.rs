//! # gest-core: Pure Business Logic for the Sale Wizard
//!
//! This crate is the heart of the sale-creation wizard. It holds the draft
//! sale, its mutation rules, the step gates and every derived amount as plain
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sale Wizard Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 sale-wizard (terminal front end)                │   │
//! │  │    Customer step ──► Products step ──► Confirm step ──► Submit  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ controller calls                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gest-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   draft   │  │  totals   │  │   │
//! │  │   │ ProductHit│  │   Money   │  │ SaleDraft │  │ SaleTotals│  │   │
//! │  │   │ WizardStep│  │  TaxRate  │  │ LineItem  │  │  change   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │validation │  │  summary  │  │  payload  │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (rates, steps, header references, search hits)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`draft`] - The sale draft and its line items
//! - [`totals`] - Subtotal, discount, tax, total and change
//! - [`validation`] - Step gates and input coercion
//! - [`summary`] - Read-only confirmation summary for the last step
//! - [`payload`] - Form payload submitted to the sale endpoint
//! - [`format`] - Currency display formatting (render boundary only)
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use gest_core::{DiscountRate, Money, ProductId, SaleDraft, SaleTotals, TaxRate};
//!
//! let mut draft = SaleDraft::new();
//! draft
//!     .add_line_item(ProductId(1), "Cuaderno", Money::from_major_minor(1000, 0), 10, 2)
//!     .unwrap();
//! draft
//!     .add_line_item(ProductId(2), "Lápiz", Money::from_major_minor(500, 0), 5, 1)
//!     .unwrap();
//! draft.set_line_discount(1, DiscountRate::from_bps(1000)).unwrap();
//!
//! let totals = SaleTotals::compute(&draft, TaxRate::from_bps(1900));
//! assert_eq!(totals.total.cents(), 291_550);
//! ```

pub mod draft;
pub mod error;
pub mod format;
pub mod money;
pub mod payload;
pub mod summary;
pub mod totals;
pub mod types;
pub mod validation;

pub use draft::{LineItem, SaleDraft, SaleHeader};
pub use error::{CoreError, CoreResult, ValidationError};
pub use format::CurrencyFormat;
pub use money::Money;
pub use payload::FormPayload;
pub use summary::{ConfirmationSummary, SummaryRow};
pub use totals::{change_due, SaleTotals};
pub use types::*;

/// Default sales tax (IVA) applied to every draft, in basis points (19%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1900;

/// Minimum number of characters before a product search hits the network.
pub const MIN_SEARCH_TERM_LEN: usize = 3;

/// Maximum length accepted for a product search term.
pub const MAX_SEARCH_TERM_LEN: usize = 100;
