//! # Sale Draft Controller
//!
//! Owns the one draft of the process and is the only code that mutates it.
//!
//! ## Controller Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Draft Controller                                │
//! │                                                                         │
//! │  Step 1: customer & date      Step 2: products         Step 3: confirm │
//! │  ───────────────────────      ────────────────         ─────────────── │
//! │  set_customer()               select_search_result()   summary()       │
//! │  set_sale_date()              add_line_item()          change_for()    │
//! │  set_seller()                 update_quantity()        prepare_        │
//! │  set_payment_method()         update_discount()          submission()  │
//! │  set_notes()                  remove_line_item()                       │
//! │                               set_order_discount()                     │
//! │                                                                         │
//! │  advance() / retreat() / go_to()          clear()                      │
//! │                                                                         │
//! │  Every call ends with exactly one of:                                  │
//! │   • DraftEvent::Changed / StepEntered   (success)                      │
//! │   • DraftEvent::Rejected                (draft untouched)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The controller is owned by value by the command loop, one command runs to
//! completion before the next is read, so no lock is involved.

use chrono::NaiveDateTime;
use gest_core::validation::{parse_quantity, validate_for_submit, validate_step};
use gest_core::{
    ConfirmationSummary, CoreError, CustomerRef, DiscountRate, FormPayload, Money, PaymentMethod,
    ProductHit, ProductId, SaleDraft, SaleTotals, SellerRef, TaxRate, WizardStep,
};
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::error::{AppError, AppResult};
use crate::state::config::WizardConfig;
use crate::state::events::{DraftEvent, DraftView};

/// Capacity of the draft event channel.
const EVENT_CAPACITY: usize = 64;

// =============================================================================
// Confirmation Gate
// =============================================================================

/// Yes/no confirmation asked before destructive edits.
pub trait ConfirmGate {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> ConfirmGate for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

// =============================================================================
// Controller
// =============================================================================

pub struct SaleDraftController {
    draft: SaleDraft,
    tax_rate: TaxRate,
    default_payment_method: PaymentMethod,
    /// Snapshot taken when entering the confirmation step.
    summary: Option<ConfirmationSummary>,
    events: broadcast::Sender<DraftEvent>,
}

impl SaleDraftController {
    pub fn new(config: &WizardConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let default_payment_method = config.sale.default_payment_method;
        SaleDraftController {
            draft: Self::fresh_draft(default_payment_method),
            tax_rate: config.tax_rate(),
            default_payment_method,
            summary: None,
            events,
        }
    }

    fn fresh_draft(payment_method: PaymentMethod) -> SaleDraft {
        let mut draft = SaleDraft::new();
        draft.header_mut().payment_method = payment_method;
        info!(draft_id = %draft.draft_id(), "New sale draft");
        draft
    }

    /// Subscribes to draft events.
    pub fn subscribe(&self) -> broadcast::Receiver<DraftEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn draft(&self) -> &SaleDraft {
        &self.draft
    }

    pub fn current_step(&self) -> WizardStep {
        self.draft.current_step()
    }

    pub fn totals(&self) -> SaleTotals {
        SaleTotals::compute(&self.draft, self.tax_rate)
    }

    pub fn view(&self) -> DraftView {
        DraftView::of(&self.draft, self.tax_rate)
    }

    /// Summary built when the confirmation step was last entered.
    pub fn summary(&self) -> Option<&ConfirmationSummary> {
        self.summary.as_ref()
    }

    // =========================================================================
    // Step Navigation
    // =========================================================================

    /// Checks the gate of `step` without moving.
    pub fn validate_step(&self, step: WizardStep) -> AppResult<()> {
        validate_step(step, &self.draft).map_err(AppError::from)
    }

    /// Moves forward one step if the current step's gate passes.
    pub fn advance(&mut self) -> AppResult<WizardStep> {
        debug!(from = %self.current_step(), "advance");
        let result = self.draft.advance();
        let step = self.check(result)?;
        self.enter(step);
        Ok(step)
    }

    /// Moves back one step. Never validates.
    pub fn retreat(&mut self) -> WizardStep {
        debug!(from = %self.current_step(), "retreat");
        let step = self.draft.retreat();
        self.enter(step);
        step
    }

    /// Jumps to `step`, validating each step left on the way forward.
    pub fn go_to(&mut self, step: WizardStep) -> AppResult<WizardStep> {
        debug!(from = %self.current_step(), to = %step, "go_to");
        let result = self.draft.go_to(step);
        let step = self.check(result)?;
        self.enter(step);
        Ok(step)
    }

    fn enter(&mut self, step: WizardStep) {
        self.summary = match step {
            WizardStep::Confirm => Some(ConfirmationSummary::build(&self.draft, self.tax_rate)),
            _ => None,
        };
        self.emit(DraftEvent::StepEntered {
            step,
            summary: self.summary.clone(),
        });
    }

    // =========================================================================
    // Line Items
    // =========================================================================

    /// Adds a product or merges it into its existing line.
    ///
    /// ## Returns
    /// The position of the affected line item.
    pub fn add_line_item(
        &mut self,
        product_id: ProductId,
        name: &str,
        unit_price: Money,
        stock: i64,
        requested_qty: i64,
    ) -> AppResult<usize> {
        debug!(%product_id, qty = requested_qty, stock, "add_line_item");
        let result = self
            .draft
            .add_line_item(product_id, name, unit_price, stock, requested_qty);
        let index = self.check(result)?;
        self.changed();
        Ok(index)
    }

    /// Adds one unit of a search result.
    pub fn select_search_result(&mut self, hit: &ProductHit) -> AppResult<usize> {
        self.add_line_item(hit.id, &hit.name, hit.price, hit.stock, 1)
    }

    /// Sets a line quantity from raw user input.
    ///
    /// On rejection the unchanged view is re-emitted so the display reverts
    /// whatever the user typed.
    pub fn update_quantity(&mut self, index: usize, raw: &str) -> AppResult<i64> {
        debug!(index, raw, "update_quantity");
        let result = parse_quantity(raw)
            .map_err(CoreError::from)
            .and_then(|qty| self.draft.update_quantity(index, qty).map(|_| qty));

        match self.check(result) {
            Ok(qty) => {
                self.changed();
                Ok(qty)
            }
            Err(e) => {
                self.changed();
                Err(e)
            }
        }
    }

    /// Sets a line discount from raw user input (non-numeric → 0%, clamped to 100%).
    pub fn update_discount(&mut self, index: usize, raw: &str) -> AppResult<DiscountRate> {
        debug!(index, raw, "update_discount");
        let discount = DiscountRate::coerce(raw);
        let result = self.draft.set_line_discount(index, discount);
        self.check(result)?;
        self.changed();
        Ok(discount)
    }

    /// Question asked before removing the line at `index`.
    pub fn removal_prompt(&self, index: usize) -> AppResult<String> {
        let item = self.draft.item(index)?;
        Ok(format!("Remove {} from the sale?", item.name))
    }

    /// Removes the line at `index` if `gate` confirms.
    ///
    /// ## Returns
    /// `true` if the line was removed, `false` if the user declined.
    pub fn remove_line_item(&mut self, index: usize, gate: &mut dyn ConfirmGate) -> AppResult<bool> {
        let prompt = match self.removal_prompt(index) {
            Ok(prompt) => prompt,
            Err(e) => return Err(self.reject(e)),
        };
        if !gate.confirm(&prompt) {
            debug!(index, "Removal declined");
            return Ok(false);
        }

        let result = self.draft.remove_line_item(index);
        let removed = self.check(result)?;
        info!(product_id = %removed.product_id, "Line item removed");
        self.changed();
        Ok(true)
    }

    /// Sets the order-level discount from raw user input.
    pub fn set_order_discount(&mut self, raw: &str) -> DiscountRate {
        let discount = DiscountRate::coerce(raw);
        debug!(raw, bps = discount.bps(), "set_order_discount");
        self.draft.set_order_discount(discount);
        self.changed();
        discount
    }

    pub const CLEAR_PROMPT: &'static str = "Discard every product and start over?";

    /// Empties the draft and returns to step 1 if `gate` confirms.
    pub fn clear(&mut self, gate: &mut dyn ConfirmGate) -> bool {
        if !gate.confirm(Self::CLEAR_PROMPT) {
            return false;
        }
        info!(draft_id = %self.draft.draft_id(), "Draft cleared");
        self.draft.clear();
        self.enter(WizardStep::SelectCustomer);
        self.changed();
        true
    }

    // =========================================================================
    // Header
    // =========================================================================

    pub fn set_customer(&mut self, customer: CustomerRef) {
        debug!(customer_id = customer.id, "set_customer");
        self.draft.header_mut().customer = Some(customer);
        self.changed();
    }

    pub fn set_seller(&mut self, seller: SellerRef) {
        debug!(seller_id = seller.id, "set_seller");
        self.draft.header_mut().seller = Some(seller);
        self.changed();
    }

    pub fn set_sale_date(&mut self, date: NaiveDateTime) {
        debug!(%date, "set_sale_date");
        self.draft.header_mut().sale_date = Some(date);
        self.changed();
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        debug!(%method, "set_payment_method");
        self.draft.header_mut().payment_method = method;
        self.changed();
    }

    /// Blank notes clear the field.
    pub fn set_notes(&mut self, notes: &str) {
        let notes = notes.trim();
        self.draft.header_mut().notes = if notes.is_empty() {
            None
        } else {
            Some(notes.to_string())
        };
        self.changed();
    }

    // =========================================================================
    // Payment & Submission
    // =========================================================================

    /// Change owed for a tendered amount typed by the user (non-numeric → 0).
    pub fn change_for(&self, raw: &str) -> Money {
        let tendered = Money::from_decimal_str(raw).unwrap_or_else(Money::zero);
        self.totals().change_for(tendered)
    }

    /// Re-validates the draft and serializes it for the sale endpoint.
    pub fn prepare_submission(&mut self) -> AppResult<FormPayload> {
        let result = validate_for_submit(&self.draft).map_err(CoreError::from);
        self.check(result)?;
        info!(
            draft_id = %self.draft.draft_id(),
            lines = self.draft.unique_products(),
            "Draft ready for submission"
        );
        Ok(FormPayload::from_draft(&self.draft))
    }

    /// Discards the submitted draft and starts a new one.
    pub fn complete_submission(&mut self, sale_id: Option<i64>) {
        info!(draft_id = %self.draft.draft_id(), ?sale_id, "Sale submitted");
        let sale_date = self.draft.header().sale_date;
        self.draft = Self::fresh_draft(self.default_payment_method);
        self.draft.header_mut().sale_date = sale_date;
        self.summary = None;
        self.emit(DraftEvent::Submitted { sale_id });
        self.enter(WizardStep::SelectCustomer);
        self.changed();
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Emits `Rejected` for failures and converts them for the caller.
    fn check<T>(&self, result: Result<T, CoreError>) -> AppResult<T> {
        result.map_err(|e| self.reject(AppError::from(e)))
    }

    fn reject(&self, err: AppError) -> AppError {
        warn!(code = ?err.code, message = %err.message, "Operation rejected");
        self.emit(DraftEvent::Rejected {
            message: err.message.clone(),
        });
        err
    }

    fn changed(&self) {
        self.emit(DraftEvent::Changed(self.view()));
    }

    fn emit(&self, event: DraftEvent) {
        if self.events.send(event).is_err() {
            trace!("No draft event subscribers");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tokio::sync::broadcast::error::TryRecvError;

    fn controller() -> (SaleDraftController, broadcast::Receiver<DraftEvent>) {
        let controller = SaleDraftController::new(&WizardConfig::default());
        let rx = controller.subscribe();
        (controller, rx)
    }

    fn drain(rx: &mut broadcast::Receiver<DraftEvent>) -> Vec<DraftEvent> {
        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        events
    }

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(11, 0, 0)
            .unwrap()
    }

    fn customer() -> CustomerRef {
        CustomerRef {
            id: 3,
            name: "Ana Pérez".into(),
        }
    }

    fn with_reference_items(c: &mut SaleDraftController) {
        c.add_line_item(ProductId(1), "Cuaderno", Money::from_major_minor(1000, 0), 10, 2)
            .unwrap();
        c.add_line_item(ProductId(2), "Lápiz", Money::from_major_minor(500, 0), 5, 1)
            .unwrap();
        c.update_discount(1, "10").unwrap();
    }

    #[test]
    fn test_new_draft_uses_configured_payment_method() {
        let mut config = WizardConfig::default();
        config.sale.default_payment_method = PaymentMethod::CreditCard;
        let c = SaleDraftController::new(&config);

        assert_eq!(c.draft().header().payment_method, PaymentMethod::CreditCard);
        assert_eq!(c.current_step(), WizardStep::SelectCustomer);
    }

    #[test]
    fn test_advance_gated_on_customer_and_date() {
        let (mut c, mut rx) = controller();

        let err = c.advance().unwrap_err();
        assert_eq!(err.message, "customer is required");
        assert_eq!(c.current_step(), WizardStep::SelectCustomer);
        assert_eq!(
            drain(&mut rx),
            vec![DraftEvent::Rejected {
                message: "customer is required".into()
            }]
        );

        c.set_customer(customer());
        assert_eq!(c.advance().unwrap_err().message, "sale date is required");

        c.set_sale_date(date());
        assert_eq!(c.advance().unwrap(), WizardStep::SelectProducts);
    }

    #[test]
    fn test_entering_confirm_builds_summary() {
        let (mut c, mut rx) = controller();
        c.set_customer(customer());
        c.set_sale_date(date());
        c.advance().unwrap();
        assert_eq!(
            c.advance().unwrap_err().message,
            "At least one product must be added"
        );

        with_reference_items(&mut c);
        drain(&mut rx);
        assert_eq!(c.advance().unwrap(), WizardStep::Confirm);

        let summary = c.summary().unwrap();
        assert_eq!(summary.customer.as_deref(), Some("Ana Pérez"));
        assert_eq!(summary.totals.total.cents(), 291_550);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [DraftEvent::StepEntered { step: WizardStep::Confirm, summary: Some(_) }]
        ));

        // At the last step advance is refused
        assert!(c.advance().is_err());
        assert_eq!(c.current_step(), WizardStep::Confirm);

        // Going back drops the snapshot
        assert_eq!(c.retreat(), WizardStep::SelectProducts);
        assert!(c.summary().is_none());
    }

    #[test]
    fn test_reference_totals_and_change() {
        let (mut c, _rx) = controller();
        with_reference_items(&mut c);

        let totals = c.totals();
        assert_eq!(totals.subtotal.cents(), 245_000);
        assert_eq!(totals.tax.cents(), 46_550);
        assert_eq!(totals.total.cents(), 291_550);

        assert_eq!(c.change_for("3000").cents(), 8_450);
        assert_eq!(c.change_for("2000"), Money::zero());
        assert_eq!(c.change_for("abc"), Money::zero());
    }

    #[test]
    fn test_update_quantity_above_stock_reemits_unchanged_view() {
        let (mut c, mut rx) = controller();
        c.add_line_item(ProductId(1), "Cuaderno", Money::from_major_minor(1000, 0), 10, 2)
            .unwrap();
        drain(&mut rx);

        let err = c.update_quantity(0, "11").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InsufficientStock);
        assert_eq!(c.draft().items()[0].quantity, 2);

        let events = drain(&mut rx);
        assert!(matches!(events[0], DraftEvent::Rejected { .. }));
        match &events[1] {
            DraftEvent::Changed(view) => assert_eq!(view.items[0].quantity, 2),
            other => panic!("expected Changed, got {:?}", other),
        }
    }

    #[test]
    fn test_update_quantity_rejects_non_numeric() {
        let (mut c, _rx) = controller();
        c.add_line_item(ProductId(1), "Cuaderno", Money::from_major_minor(1000, 0), 10, 2)
            .unwrap();

        assert!(c.update_quantity(0, "abc").is_err());
        assert!(c.update_quantity(0, "0").is_err());
        assert_eq!(c.draft().items()[0].quantity, 2);

        assert_eq!(c.update_quantity(0, " 7 ").unwrap(), 7);
        assert_eq!(c.view().item_count, 7);
    }

    #[test]
    fn test_update_discount_coerces_input() {
        let (mut c, _rx) = controller();
        c.add_line_item(ProductId(1), "Cuaderno", Money::from_major_minor(1000, 0), 10, 1)
            .unwrap();

        assert_eq!(c.update_discount(0, "abc").unwrap(), DiscountRate::zero());
        assert_eq!(c.update_discount(0, "150").unwrap(), DiscountRate::full());
        assert!(c.totals().total.is_zero());
        assert!(c.update_discount(3, "5").is_err());
    }

    #[test]
    fn test_remove_requires_confirmation() {
        let (mut c, _rx) = controller();
        with_reference_items(&mut c);

        let mut asked = Vec::new();
        let removed = c
            .remove_line_item(0, &mut |prompt: &str| {
                asked.push(prompt.to_string());
                false
            })
            .unwrap();
        assert!(!removed);
        assert_eq!(asked, vec!["Remove Cuaderno from the sale?".to_string()]);
        assert_eq!(c.draft().unique_products(), 2);

        assert!(c.remove_line_item(0, &mut |_: &str| true).unwrap());
        assert_eq!(c.draft().items()[0].name, "Lápiz");

        assert!(c.remove_line_item(5, &mut |_: &str| true).is_err());
    }

    #[test]
    fn test_clear_returns_to_step_one() {
        let (mut c, _rx) = controller();
        c.set_customer(customer());
        c.set_sale_date(date());
        with_reference_items(&mut c);
        c.go_to(WizardStep::Confirm).unwrap();

        assert!(!c.clear(&mut |_: &str| false));
        assert_eq!(c.draft().unique_products(), 2);

        assert!(c.clear(&mut |_: &str| true));
        assert!(c.draft().is_empty());
        assert_eq!(c.current_step(), WizardStep::SelectCustomer);
    }

    #[test]
    fn test_select_search_result_adds_one_unit() {
        let (mut c, _rx) = controller();
        let hit = ProductHit {
            id: ProductId(9),
            name: "Goma".into(),
            price: Money::from_major_minor(300, 0),
            stock: 4,
        };

        c.select_search_result(&hit).unwrap();
        c.select_search_result(&hit).unwrap();
        assert_eq!(c.draft().items()[0].quantity, 2);

        let out_of_stock = ProductHit { stock: 0, ..hit };
        assert!(c.select_search_result(&ProductHit { id: ProductId(10), ..out_of_stock }).is_err());
    }

    #[test]
    fn test_order_discount_and_notes() {
        let (mut c, _rx) = controller();
        with_reference_items(&mut c);

        assert_eq!(c.set_order_discount("x").bps(), 0);
        assert_eq!(c.set_order_discount("10").bps(), 1000);
        assert_eq!(c.totals().total.cents(), 262_395);

        c.set_notes("  ");
        assert_eq!(c.draft().header().notes, None);
        c.set_notes("retira mañana");
        assert_eq!(c.view().payload.get("observaciones"), Some("retira mañana"));
    }

    #[test]
    fn test_prepare_submission_order() {
        let (mut c, _rx) = controller();
        assert_eq!(
            c.prepare_submission().unwrap_err().message,
            "At least one product must be added"
        );

        with_reference_items(&mut c);
        assert_eq!(c.prepare_submission().unwrap_err().message, "customer is required");

        c.set_customer(customer());
        let payload = c.prepare_submission().unwrap();
        assert_eq!(payload.get("clienteId"), Some("3"));
        assert_eq!(payload.line_count(), 2);
    }

    #[test]
    fn test_complete_submission_starts_fresh_draft() {
        let (mut c, mut rx) = controller();
        c.set_customer(customer());
        c.set_sale_date(date());
        with_reference_items(&mut c);
        let old_id = c.draft().draft_id();
        drain(&mut rx);

        c.complete_submission(Some(42));

        assert!(c.draft().is_empty());
        assert_ne!(c.draft().draft_id(), old_id);
        assert_eq!(c.draft().header().sale_date, Some(date()));
        assert!(c.draft().header().customer.is_none());
        assert_eq!(
            drain(&mut rx).first(),
            Some(&DraftEvent::Submitted { sale_id: Some(42) })
        );
    }
}
