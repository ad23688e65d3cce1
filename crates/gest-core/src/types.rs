//! # Domain Types
//!
//! Core domain types used throughout the sale wizard.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  DiscountRate   │   │   WizardStep    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  bps 0..=10000  │   │  SelectCustomer │       │
//! │  │  1900 = 19%     │   │  1000 = 10%     │   │  SelectProducts │       │
//! │  └─────────────────┘   └─────────────────┘   │  Confirm        │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ProductHit    │   │  CustomerRef    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  SellerRef      │   │  ─────────────  │       │
//! │  │  id, name       │   │  ─────────────  │   │  Cash, cards,   │       │
//! │  │  price, stock   │   │  id, name       │   │  transfer, ...  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::money::{expand_exponent, parse_hundredths, Money};

// =============================================================================
// Rates
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%; 1900 bps = 19% (Chilean IVA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

/// Percentage discount in basis points, always within 0%..=100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Upper bound: 100%.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a discount from basis points, clamping above 100%.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > Self::MAX_BPS {
            DiscountRate(Self::MAX_BPS)
        } else {
            DiscountRate(bps)
        }
    }

    /// No discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// 100% off.
    #[inline]
    pub const fn full() -> Self {
        DiscountRate(Self::MAX_BPS)
    }

    /// Coerces free-form percentage input into a discount.
    ///
    /// Non-numeric input becomes 0%; numeric input is clamped to 0%..=100%.
    ///
    /// ## Example
    /// ```rust
    /// use gest_core::types::DiscountRate;
    ///
    /// assert_eq!(DiscountRate::coerce("12.5").bps(), 1250);
    /// assert_eq!(DiscountRate::coerce("abc"), DiscountRate::zero());
    /// assert_eq!(DiscountRate::coerce("150"), DiscountRate::full());
    /// assert_eq!(DiscountRate::coerce("-3"), DiscountRate::zero());
    /// ```
    pub fn coerce(raw: &str) -> Self {
        match parse_hundredths(raw) {
            Some(bps) if bps <= 0 => DiscountRate::zero(),
            Some(bps) => DiscountRate::from_bps(bps.min(Self::MAX_BPS as i64) as u32),
            None => DiscountRate::zero(),
        }
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Plain decimal percentage for machine-readable fields (`"12.5"`, `"0"`).
    pub fn to_percent_string(&self) -> String {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => whole.to_string(),
            f if f % 10 == 0 => format!("{}.{}", whole, f / 10),
            f => format!("{}.{:02}", whole, f),
        }
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.to_percent_string())
    }
}

// =============================================================================
// Identifiers & References
// =============================================================================

/// Backend product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The customer selected on the first step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: i64,
    pub name: String,
}

/// The seller attributed with the sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRef {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays. Form values match the sale endpoint's enum names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    Cheque,
    StoreCredit,
}

impl PaymentMethod {
    /// Every method, in the order the selector lists them.
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
        PaymentMethod::Cheque,
        PaymentMethod::StoreCredit,
    ];

    /// Value posted in the `metodoPago` form field.
    pub const fn form_value(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "EFECTIVO",
            PaymentMethod::CreditCard => "TARJETA_CREDITO",
            PaymentMethod::DebitCard => "TARJETA_DEBITO",
            PaymentMethod::BankTransfer => "TRANSFERENCIA",
            PaymentMethod::Cheque => "CHEQUE",
            PaymentMethod::StoreCredit => "CREDITO",
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::CreditCard => "Credit card",
            PaymentMethod::DebitCard => "Debit card",
            PaymentMethod::BankTransfer => "Bank transfer",
            PaymentMethod::Cheque => "Cheque",
            PaymentMethod::StoreCredit => "Store credit",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(PaymentMethod::Cash),
            "credit" | "credit_card" | "tarjeta_credito" => Ok(PaymentMethod::CreditCard),
            "debit" | "debit_card" | "tarjeta_debito" => Ok(PaymentMethod::DebitCard),
            "transfer" | "bank_transfer" | "transferencia" => Ok(PaymentMethod::BankTransfer),
            "cheque" | "check" => Ok(PaymentMethod::Cheque),
            "store_credit" | "credito" => Ok(PaymentMethod::StoreCredit),
            other => Err(ValidationError::InvalidFormat {
                field: "payment method".to_string(),
                reason: format!(
                    "unknown method '{}', expected one of: cash, credit, debit, transfer, cheque, store_credit",
                    other
                ),
            }),
        }
    }
}

// =============================================================================
// Wizard Step
// =============================================================================

/// The three sequential stages of the sale wizard.
///
/// ```text
/// ┌──────────────────┐  advance  ┌──────────────────┐  advance  ┌─────────┐
/// │ 1 SelectCustomer │──────────►│ 2 SelectProducts │──────────►│3 Confirm│
/// │  customer + date │◄──────────│  ≥ 1 line item   │◄──────────│ summary │
/// └──────────────────┘  retreat  └──────────────────┘  retreat  └─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    SelectCustomer,
    SelectProducts,
    Confirm,
}

impl WizardStep {
    /// 1-based step number as shown in the step indicator.
    pub const fn number(&self) -> u8 {
        match self {
            WizardStep::SelectCustomer => 1,
            WizardStep::SelectProducts => 2,
            WizardStep::Confirm => 3,
        }
    }

    /// Step for a 1-based number, if any.
    pub const fn from_number(n: u8) -> Option<WizardStep> {
        match n {
            1 => Some(WizardStep::SelectCustomer),
            2 => Some(WizardStep::SelectProducts),
            3 => Some(WizardStep::Confirm),
            _ => None,
        }
    }

    pub const fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectCustomer => Some(WizardStep::SelectProducts),
            WizardStep::SelectProducts => Some(WizardStep::Confirm),
            WizardStep::Confirm => None,
        }
    }

    pub const fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectCustomer => None,
            WizardStep::SelectProducts => Some(WizardStep::SelectCustomer),
            WizardStep::Confirm => Some(WizardStep::SelectProducts),
        }
    }

    pub const fn title(&self) -> &'static str {
        match self {
            WizardStep::SelectCustomer => "Customer & date",
            WizardStep::SelectProducts => "Products",
            WizardStep::Confirm => "Confirmation",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}

// =============================================================================
// Product Search Hit
// =============================================================================

/// One result of the product search endpoint.
///
/// Field names follow the backend's JSON (`nombre`, `precio`). The price
/// arrives as a JSON number and is converted to cents from its decimal text.
/// Scientific notation (`1e3`, `2.5E2`) is expanded first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductHit {
    pub id: ProductId,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "precio", deserialize_with = "money_from_json_number")]
    pub price: Money,

    #[serde(default, deserialize_with = "stock_or_zero")]
    pub stock: i64,
}

fn money_from_json_number<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    let text = match &value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => return Ok(Money::zero()),
        other => return Err(D::Error::custom(format!("invalid price: {}", other))),
    };

    expand_exponent(&text)
        .and_then(|plain| Money::from_decimal_str(&plain))
        .ok_or_else(|| D::Error::custom(format!("invalid price: {}", text)))
}

fn stock_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

// =============================================================================
// Unit Tests
// =============================================================================
