//! # Sale Draft
//!
//! The in-progress, unpersisted sale being composed across the wizard steps.
//!
//! ## Draft Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Draft Operations                                   │
//! │                                                                         │
//! │  User Action              Draft Method              State Change        │
//! │  ───────────              ────────────              ────────────        │
//! │                                                                         │
//! │  Pick product ──────────► add_line_item() ────────► push or qty += n    │
//! │  Edit quantity ─────────► update_quantity() ──────► items[i].qty = n    │
//! │  Edit discount ─────────► set_line_discount() ────► items[i].discount   │
//! │  Remove product ────────► remove_line_item() ─────► items.remove(i)     │
//! │  Order discount ────────► set_order_discount() ───► order_discount      │
//! │  Next / Back ───────────► advance() / retreat() ──► current_step        │
//! │  Clear sale ────────────► clear() ────────────────► items = [], step 1  │
//! │                                                                         │
//! │  Every rejected call leaves the draft exactly as it was.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CustomerRef, DiscountRate, PaymentMethod, ProductId, SellerRef, WizardStep};
use crate::validation::{validate_price_cents, validate_quantity, validate_stock, validate_step};

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the draft.
///
/// ## Snapshot Fields
/// `name`, `unit_price` and `stock_at_selection` are frozen when the product
/// is first added. The stock ceiling is never refreshed afterwards; the sale
/// endpoint re-validates stock on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub stock_at_selection: i64,
    pub quantity: i64,
    pub discount: DiscountRate,
}

impl LineItem {
    /// Unit price × quantity, before the line discount.
    pub fn gross(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Line subtotal after its own percentage discount.
    pub fn subtotal(&self) -> Money {
        self.gross().apply_percentage_discount(self.discount)
    }
}

/// Rejects a quantity whose line total does not fit in cents.
fn check_line_total(name: &str, unit_price: Money, quantity: i64) -> CoreResult<()> {
    match unit_price.checked_multiply_quantity(quantity) {
        Some(_) => Ok(()),
        None => Err(CoreError::AmountOverflow {
            product: name.to_string(),
        }),
    }
}

// =============================================================================
// Sale Header
// =============================================================================

/// Order-level fields collected on the first step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleHeader {
    pub customer: Option<CustomerRef>,
    pub seller: Option<SellerRef>,
    pub sale_date: Option<NaiveDateTime>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

// =============================================================================
// Sale Draft
// =============================================================================

/// The draft sale.
///
/// ## Invariants
/// - At most one line item per `product_id` (re-adding increases quantity)
/// - Every quantity is > 0 and was ≤ the stock ceiling when last set directly
/// - Every discount is within 0%..=100% (enforced by [`DiscountRate`])
#[derive(Debug, Clone)]
pub struct SaleDraft {
    draft_id: Uuid,
    created_at: DateTime<Utc>,
    items: Vec<LineItem>,
    current_step: WizardStep,
    order_discount: DiscountRate,
    header: SaleHeader,
}

impl Default for SaleDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl SaleDraft {
    /// Creates a new empty draft on step 1.
    pub fn new() -> Self {
        SaleDraft {
            draft_id: Uuid::new_v4(),
            created_at: Utc::now(),
            items: Vec::new(),
            current_step: WizardStep::default(),
            order_discount: DiscountRate::zero(),
            header: SaleHeader::default(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn draft_id(&self) -> Uuid {
        self.draft_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> CoreResult<&LineItem> {
        self.items.get(index).ok_or(CoreError::LineItemNotFound(index))
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn order_discount(&self) -> DiscountRate {
        self.order_discount
    }

    pub fn header(&self) -> &SaleHeader {
        &self.header
    }

    /// Header fields carry no cross-field invariants; step gates read them.
    pub fn header_mut(&mut self) -> &mut SaleHeader {
        &mut self.header
    }

    /// Number of distinct products.
    pub fn unique_products(&self) -> usize {
        self.items.len()
    }

    /// Total units across all line items.
    pub fn item_count(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // =========================================================================
    // Line Item Mutation
    // =========================================================================

    /// Adds a product or increases its quantity if already present.
    ///
    /// ## Behavior
    /// - `requested_qty` must be positive and within `stock`
    /// - Product already in the draft: `requested_qty` is added to the
    ///   existing quantity. The combined quantity is NOT re-checked against
    ///   the ceiling captured at first add.
    /// - Product not in the draft: appended with a 0% discount
    /// - A quantity or line total that does not fit in an i64 is rejected
    ///   with [`CoreError::AmountOverflow`] and the draft is left unchanged
    ///
    /// ## Returns
    /// The position of the affected line item.
    pub fn add_line_item(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Money,
        stock: i64,
        requested_qty: i64,
    ) -> CoreResult<usize> {
        let name = name.into();
        validate_quantity(requested_qty)?;
        validate_price_cents(unit_price.cents())?;
        validate_stock(stock)?;

        if requested_qty > stock {
            return Err(CoreError::InsufficientStock {
                product: name,
                available: stock,
                requested: requested_qty,
            });
        }

        if let Some(index) = self.items.iter().position(|i| i.product_id == product_id) {
            let item = &mut self.items[index];
            let merged = item
                .quantity
                .checked_add(requested_qty)
                .ok_or_else(|| CoreError::AmountOverflow {
                    product: item.name.clone(),
                })?;
            check_line_total(&item.name, item.unit_price, merged)?;
            item.quantity = merged;
            return Ok(index);
        }

        check_line_total(&name, unit_price, requested_qty)?;

        self.items.push(LineItem {
            product_id,
            name,
            unit_price,
            stock_at_selection: stock,
            quantity: requested_qty,
            discount: DiscountRate::zero(),
        });
        Ok(self.items.len() - 1)
    }

    /// Sets the quantity of the line item at `index`.
    ///
    /// Rejected (draft unchanged) when `quantity` is not positive or exceeds
    /// the stock captured for the item.
    pub fn update_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        let item = self
            .items
            .get_mut(index)
            .ok_or(CoreError::LineItemNotFound(index))?;

        if quantity > item.stock_at_selection {
            return Err(CoreError::InsufficientStock {
                product: item.name.clone(),
                available: item.stock_at_selection,
                requested: quantity,
            });
        }
        check_line_total(&item.name, item.unit_price, quantity)?;

        item.quantity = quantity;
        Ok(())
    }

    /// Sets the percentage discount of the line item at `index`.
    pub fn set_line_discount(&mut self, index: usize, discount: DiscountRate) -> CoreResult<()> {
        let item = self
            .items
            .get_mut(index)
            .ok_or(CoreError::LineItemNotFound(index))?;
        item.discount = discount;
        Ok(())
    }

    /// Removes and returns the line item at `index`.
    pub fn remove_line_item(&mut self, index: usize) -> CoreResult<LineItem> {
        if index >= self.items.len() {
            return Err(CoreError::LineItemNotFound(index));
        }
        Ok(self.items.remove(index))
    }

    /// Sets the additional order-level discount.
    pub fn set_order_discount(&mut self, discount: DiscountRate) {
        self.order_discount = discount;
    }

    /// Drops every line item and returns to the first step.
    ///
    /// Header fields and the order discount are kept.
    pub fn clear(&mut self) {
        self.items.clear();
        self.current_step = WizardStep::SelectCustomer;
    }

    // =========================================================================
    // Step Navigation
    // =========================================================================

    /// Moves one step forward if the current step's gate passes.
    pub fn advance(&mut self) -> CoreResult<WizardStep> {
        let next = self.current_step.next().ok_or(CoreError::AlreadyAtLastStep)?;
        validate_step(self.current_step, self)?;
        self.current_step = next;
        Ok(next)
    }

    /// Moves one step back. Never validates; stays put on step 1.
    pub fn retreat(&mut self) -> WizardStep {
        if let Some(previous) = self.current_step.previous() {
            self.current_step = previous;
        }
        self.current_step
    }

    /// Jumps to `target`.
    ///
    /// Going forward validates every step being left on the way; going back
    /// never validates.
    pub fn go_to(&mut self, target: WizardStep) -> CoreResult<WizardStep> {
        if target <= self.current_step {
            self.current_step = target;
            return Ok(target);
        }

        let mut step = self.current_step;
        while step < target {
            validate_step(step, self)?;
            step = match step.next() {
                Some(next) => next,
                None => break,
            };
        }
        self.current_step = target;
        Ok(target)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
