//! # Sale Totals
//!
//! Derived amounts for a draft. Nothing here is stored: every view recomputes
//! from the line items, so totals can never drift from the draft.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each line:  unit_price × qty  ─►  minus line discount %           │
//! │                                           │                            │
//! │                                           ▼                            │
//! │  subtotal        = Σ line subtotals                                    │
//! │  order_discount  = subtotal × order discount %                         │
//! │  tax             = (subtotal − order_discount) × tax rate              │
//! │  total           = subtotal − order_discount + tax                     │
//! │  change          = max(0, tendered − total)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::draft::SaleDraft;
use crate::money::Money;
use crate::types::TaxRate;

/// Totals summary for one draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub subtotal: Money,
    pub order_discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Computes totals for `draft` at the given tax rate.
    ///
    /// Never panics: amounts beyond the i64 range saturate.
    ///
    /// ## Example
    /// ```rust
    /// use gest_core::{Money, ProductId, SaleDraft, SaleTotals, TaxRate};
    ///
    /// let draft = SaleDraft::new();
    /// let totals = SaleTotals::compute(&draft, TaxRate::default());
    /// assert!(totals.total.is_zero());
    /// ```
    pub fn compute(draft: &SaleDraft, tax_rate: TaxRate) -> Self {
        let subtotal: Money = draft.items().iter().map(|item| item.subtotal()).sum();
        let order_discount = subtotal.discount_amount(draft.order_discount());
        let taxable = subtotal - order_discount;
        let tax = taxable.calculate_tax(tax_rate);

        SaleTotals {
            subtotal,
            order_discount,
            tax,
            total: taxable + tax,
        }
    }

    /// Change owed for `tendered` against these totals.
    pub fn change_for(&self, tendered: Money) -> Money {
        change_due(tendered, self.total)
    }
}

/// Change owed to the customer, never negative.
///
/// ## Example
/// ```rust
/// use gest_core::{change_due, Money};
///
/// let total = Money::from_cents(291_550);
/// assert_eq!(change_due(Money::from_cents(300_000), total).cents(), 8_450);
/// assert!(change_due(Money::from_cents(200_000), total).is_zero());
/// ```
pub fn change_due(tendered: Money, total: Money) -> Money {
    (tendered - total).non_negative()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiscountRate, ProductId};

    fn reference_draft() -> SaleDraft {
        let mut draft = SaleDraft::new();
        draft
            .add_line_item(ProductId(1), "Cuaderno", Money::from_major_minor(1000, 0), 10, 2)
            .unwrap();
        draft
            .add_line_item(ProductId(2), "Lápiz", Money::from_major_minor(500, 0), 5, 1)
            .unwrap();
        draft.set_line_discount(1, DiscountRate::from_bps(1000)).unwrap();
        draft
    }

    #[test]
    fn test_reference_sale_totals() {
        let totals = SaleTotals::compute(&reference_draft(), TaxRate::from_bps(1900));

        assert_eq!(totals.subtotal.cents(), 245_000);
        assert!(totals.order_discount.is_zero());
        assert_eq!(totals.tax.cents(), 46_550);
        assert_eq!(totals.total.cents(), 291_550);
    }

    #[test]
    fn test_reference_sale_change() {
        let totals = SaleTotals::compute(&reference_draft(), TaxRate::from_bps(1900));

        assert_eq!(totals.change_for(Money::from_major_minor(3000, 0)).cents(), 8_450);
        assert_eq!(totals.change_for(Money::from_major_minor(2000, 0)), Money::zero());
    }

    #[test]
    fn test_order_discount_applies_before_tax() {
        let mut draft = reference_draft();
        draft.set_order_discount(DiscountRate::from_bps(1000));
        let totals = SaleTotals::compute(&draft, TaxRate::from_bps(1900));

        // 2450 - 245 = 2205, tax 418.95
        assert_eq!(totals.order_discount.cents(), 24_500);
        assert_eq!(totals.tax.cents(), 41_895);
        assert_eq!(totals.total.cents(), 262_395);
    }

    #[test]
    fn test_full_discount_zeroes_total() {
        let mut draft = reference_draft();
        draft.set_order_discount(DiscountRate::full());
        let totals = SaleTotals::compute(&draft, TaxRate::default());

        assert!(totals.total.is_zero());
        assert!(totals.tax.is_zero());
    }

    #[test]
    fn test_totals_saturate_on_huge_lines() {
        let mut draft = SaleDraft::new();
        for id in [1, 2] {
            draft
                .add_line_item(ProductId(id), "Tornillo", Money::from_cents(1), i64::MAX, i64::MAX)
                .unwrap();
        }
        let totals = SaleTotals::compute(&draft, TaxRate::from_bps(1900));

        assert_eq!(totals.subtotal.cents(), i64::MAX);
        assert_eq!(totals.total.cents(), i64::MAX);
        assert!(totals.change_for(Money::zero()).is_zero());
    }

    #[test]
    fn test_empty_draft_totals() {
        let totals = SaleTotals::compute(&SaleDraft::new(), TaxRate::default());
        assert_eq!(totals, SaleTotals::default());
    }
}
