//! # Draft Events
//!
//! What the controller tells the presentation layer after each operation.
//! Subscribers receive them over a `tokio::sync::broadcast` channel; a
//! lagging subscriber only misses intermediate views, the next `Changed`
//! carries the full state again.

use gest_core::{
    ConfirmationSummary, DiscountRate, FormPayload, LineItem, SaleDraft, SaleHeader, SaleTotals,
    TaxRate, WizardStep,
};
use serde::Serialize;
use uuid::Uuid;

/// Full, render-ready snapshot of the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub draft_id: Uuid,
    pub step: WizardStep,
    pub header: SaleHeader,
    pub items: Vec<LineItem>,
    pub order_discount: DiscountRate,
    pub totals: SaleTotals,
    /// Σ quantity across line items.
    pub item_count: i64,
    pub unique_products: usize,
    pub payload: FormPayload,
}

impl DraftView {
    pub fn of(draft: &SaleDraft, tax_rate: TaxRate) -> Self {
        DraftView {
            draft_id: draft.draft_id(),
            step: draft.current_step(),
            header: draft.header().clone(),
            items: draft.items().to_vec(),
            order_discount: draft.order_discount(),
            totals: SaleTotals::compute(draft, tax_rate),
            item_count: draft.item_count(),
            unique_products: draft.unique_products(),
            payload: FormPayload::from_draft(draft),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEvent {
    /// The draft (or a rejected edit's unchanged draft) should be re-rendered.
    Changed(DraftView),

    /// The wizard moved to `step`. Entering the last step carries the
    /// confirmation summary.
    StepEntered {
        step: WizardStep,
        summary: Option<ConfirmationSummary>,
    },

    /// An operation was refused; the draft is unchanged.
    Rejected { message: String },

    /// The sale was saved and a fresh draft started.
    Submitted { sale_id: Option<i64> },
}
