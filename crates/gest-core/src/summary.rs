//! # Confirmation Summary
//!
//! Read-only snapshot shown on the confirmation step. Built once when the
//! wizard enters step 3; it does not follow later edits to the draft.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::draft::{LineItem, SaleDraft};
use crate::money::Money;
use crate::totals::SaleTotals;
use crate::types::{DiscountRate, PaymentMethod, TaxRate};

/// One product row of the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub discount: DiscountRate,
    pub subtotal: Money,
}

impl From<&LineItem> for SummaryRow {
    fn from(item: &LineItem) -> Self {
        SummaryRow {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: item.discount,
            subtotal: item.subtotal(),
        }
    }
}

/// Everything the confirmation step displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationSummary {
    pub customer: Option<String>,
    pub seller: Option<String>,
    pub sale_date: Option<NaiveDateTime>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub rows: Vec<SummaryRow>,
    pub item_count: i64,
    pub unique_products: usize,
    pub order_discount_rate: DiscountRate,
    pub totals: SaleTotals,
}

impl ConfirmationSummary {
    pub fn build(draft: &SaleDraft, tax_rate: TaxRate) -> Self {
        let header = draft.header();
        ConfirmationSummary {
            customer: header.customer.as_ref().map(|c| c.name.clone()),
            seller: header.seller.as_ref().map(|s| s.name.clone()),
            sale_date: header.sale_date,
            payment_method: header.payment_method,
            notes: header.notes.clone(),
            rows: draft.items().iter().map(SummaryRow::from).collect(),
            item_count: draft.item_count(),
            unique_products: draft.unique_products(),
            order_discount_rate: draft.order_discount(),
            totals: SaleTotals::compute(draft, tax_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CustomerRef, ProductId, SellerRef};

    #[test]
    fn test_summary_snapshot() {
        let mut draft = SaleDraft::new();
        draft.header_mut().customer = Some(CustomerRef {
            id: 7,
            name: "Ferretería Sur".to_string(),
        });
        draft.header_mut().seller = Some(SellerRef {
            id: 2,
            name: "Luis".to_string(),
        });
        draft.header_mut().payment_method = PaymentMethod::DebitCard;
        draft
            .add_line_item(ProductId(1), "Martillo", Money::from_major_minor(1000, 0), 10, 2)
            .unwrap();
        draft
            .add_line_item(ProductId(2), "Clavos", Money::from_major_minor(500, 0), 5, 1)
            .unwrap();
        draft.set_line_discount(1, DiscountRate::from_bps(1000)).unwrap();

        let summary = ConfirmationSummary::build(&draft, TaxRate::default());

        assert_eq!(summary.customer.as_deref(), Some("Ferretería Sur"));
        assert_eq!(summary.seller.as_deref(), Some("Luis"));
        assert_eq!(summary.payment_method, PaymentMethod::DebitCard);
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[1].subtotal.cents(), 45_000);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.unique_products, 2);
        assert_eq!(summary.totals.total.cents(), 291_550);

        // Later edits do not leak into the snapshot
        draft.remove_line_item(0).unwrap();
        assert_eq!(summary.rows.len(), 2);
    }
}
