//! # Validation Module
//!
//! Step gates and input checks for the sale wizard.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Input coercion                                               │
//! │  ├── Discounts / tendered amounts: non-numeric → 0                     │
//! │  └── Quantities: non-numeric → rejected                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Step gates (THIS MODULE)                                     │
//! │  ├── Step 1: customer AND sale date                                    │
//! │  ├── Step 2: at least one line item                                    │
//! │  └── Step 3: no gate                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Server (sale endpoint)                                       │
//! │  └── Re-validates stock and required fields on submission              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::draft::SaleDraft;
use crate::error::ValidationError;
use crate::types::WizardStep;
use crate::MAX_SEARCH_TERM_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Step Gates
// =============================================================================

/// Checks whether the wizard may leave `step` going forward.
///
/// ## Rules
/// - `SelectCustomer`: a customer must be selected (checked first), then a
///   sale date must be set
/// - `SelectProducts`: the draft must hold at least one line item
/// - `Confirm`: always passes
///
/// ## Example
/// ```rust
/// use gest_core::{SaleDraft, WizardStep};
/// use gest_core::validation::validate_step;
///
/// let draft = SaleDraft::new();
/// assert!(validate_step(WizardStep::SelectProducts, &draft).is_err());
/// assert!(validate_step(WizardStep::Confirm, &draft).is_ok());
/// ```
pub fn validate_step(step: WizardStep, draft: &SaleDraft) -> ValidationResult<()> {
    match step {
        WizardStep::SelectCustomer => {
            if draft.header().customer.is_none() {
                return Err(ValidationError::required("customer"));
            }
            if draft.header().sale_date.is_none() {
                return Err(ValidationError::required("sale date"));
            }
            Ok(())
        }
        WizardStep::SelectProducts => {
            if draft.is_empty() {
                return Err(ValidationError::NoLineItems);
            }
            Ok(())
        }
        WizardStep::Confirm => Ok(()),
    }
}

/// Checks the draft right before submission.
///
/// The product list is checked before the customer, matching the order the
/// sale form reports problems in. The sale date is not re-checked here: the
/// form always carries one once step 1 has been passed.
pub fn validate_for_submit(draft: &SaleDraft) -> ValidationResult<()> {
    if draft.is_empty() {
        return Err(ValidationError::NoLineItems);
    }
    if draft.header().customer.is_none() {
        return Err(ValidationError::required("customer"));
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value (must be > 0).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Parses a quantity typed by the user.
///
/// Unlike discounts, a malformed quantity is never coerced: silently turning
/// "abc" into 0 would delete stock from the draft.
///
/// ## Example
/// ```rust
/// use gest_core::validation::parse_quantity;
///
/// assert_eq!(parse_quantity(" 4 ").unwrap(), 4);
/// assert!(parse_quantity("4.5").is_err());
/// assert!(parse_quantity("0").is_err());
/// ```
pub fn parse_quantity(raw: &str) -> ValidationResult<i64> {
    let qty: i64 = raw.trim().parse().map_err(|_| ValidationError::InvalidFormat {
        field: "quantity".to_string(),
        reason: format!("'{}' is not a whole number", raw.trim()),
    })?;
    validate_quantity(qty)?;
    Ok(qty)
}

/// Validates a price in cents (zero allowed, negative rejected).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a stock level (zero allowed, negative rejected).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product search term.
///
/// ## Rules
/// - Trimmed before checking
/// - At least `min_len` characters (shorter terms never reach the network;
///   [`crate::MIN_SEARCH_TERM_LEN`] unless configured otherwise)
/// - At most [`MAX_SEARCH_TERM_LEN`] characters
///
/// ## Returns
/// The trimmed term.
pub fn validate_search_term(term: &str, min_len: usize) -> ValidationResult<String> {
    let term = term.trim();
    let len = term.chars().count();

    if len < min_len {
        return Err(ValidationError::TooShort {
            field: "search term".to_string(),
            min: min_len,
        });
    }

    if len > MAX_SEARCH_TERM_LEN {
        return Err(ValidationError::TooLong {
            field: "search term".to_string(),
            max: MAX_SEARCH_TERM_LEN,
        });
    }

    Ok(term.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{CustomerRef, ProductId};
    use chrono::NaiveDate;

    fn customer() -> CustomerRef {
        CustomerRef {
            id: 1,
            name: "Ana Pérez".to_string(),
        }
    }

    fn sale_date() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_step_one_requires_customer_regardless_of_date() {
        let mut draft = SaleDraft::new();
        assert_eq!(
            validate_step(WizardStep::SelectCustomer, &draft),
            Err(ValidationError::required("customer"))
        );

        draft.header_mut().sale_date = Some(sale_date());
        assert_eq!(
            validate_step(WizardStep::SelectCustomer, &draft),
            Err(ValidationError::required("customer"))
        );
    }

    #[test]
    fn test_step_one_requires_date() {
        let mut draft = SaleDraft::new();
        draft.header_mut().customer = Some(customer());
        assert_eq!(
            validate_step(WizardStep::SelectCustomer, &draft),
            Err(ValidationError::required("sale date"))
        );

        draft.header_mut().sale_date = Some(sale_date());
        assert!(validate_step(WizardStep::SelectCustomer, &draft).is_ok());
    }

    #[test]
    fn test_step_two_fails_iff_empty() {
        let mut draft = SaleDraft::new();
        assert_eq!(
            validate_step(WizardStep::SelectProducts, &draft),
            Err(ValidationError::NoLineItems)
        );

        draft
            .add_line_item(ProductId(1), "Cuaderno", Money::from_cents(1000), 5, 1)
            .unwrap();
        assert!(validate_step(WizardStep::SelectProducts, &draft).is_ok());
    }

    #[test]
    fn test_submit_checks_products_before_customer() {
        let draft = SaleDraft::new();
        assert_eq!(validate_for_submit(&draft), Err(ValidationError::NoLineItems));

        let mut draft = SaleDraft::new();
        draft
            .add_line_item(ProductId(1), "Cuaderno", Money::from_cents(1000), 5, 1)
            .unwrap();
        assert_eq!(
            validate_for_submit(&draft),
            Err(ValidationError::required("customer"))
        );

        draft.header_mut().customer = Some(customer());
        assert!(validate_for_submit(&draft).is_ok());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3").unwrap(), 3);
        assert!(parse_quantity("").is_err());
        assert!(parse_quantity("-1").is_err());
        assert!(parse_quantity("two").is_err());
    }

    #[test]
    fn test_validate_search_term() {
        let min = crate::MIN_SEARCH_TERM_LEN;
        assert!(validate_search_term("ab", min).is_err());
        assert!(validate_search_term("  ab  ", min).is_err());
        assert_eq!(validate_search_term(" cua ", min).unwrap(), "cua");
        // Counted in characters, not bytes
        assert!(validate_search_term("lá", min).is_err());
        assert!(validate_search_term(&"a".repeat(101), min).is_err());
        assert!(validate_search_term("ab", 2).is_ok());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1900).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }
}
