//! # State Module
//!
//! Everything the wizard keeps between commands.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐   owns    ┌──────────────────────────────────┐   │
//! │  │   WizardConfig   │──────────►│       SaleDraftController        │   │
//! │  │  (read-only)     │  tax rate │                                  │   │
//! │  │  sale / currency │  payment  │  SaleDraft (by value)            │   │
//! │  │  / lookup        │  default  │  broadcast::Sender<DraftEvent>   │   │
//! │  └──────────────────┘           └────────────────┬─────────────────┘   │
//! │                                                  │ subscribe()          │
//! │                                                  ▼                      │
//! │                                   DraftEvent ──► render                 │
//! │                                                                         │
//! │  The controller lives on the main task and is never shared, so no      │
//! │  Mutex wraps the draft.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod controller;
pub mod events;

pub use config::{SaleSettings, WizardConfig};
pub use controller::{ConfirmGate, SaleDraftController};
pub use events::{DraftEvent, DraftView};
