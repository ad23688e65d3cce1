//! # Form Payload
//!
//! The draft serialized into the field list the sale endpoint expects.
//!
//! ## Field Layout
//! ```text
//! clienteId=7
//! vendedorId=2
//! fecha=2026-10-19T09:30
//! metodoPago=EFECTIVO
//! observaciones=
//! descuento=0
//! detalles[0].productoId=1
//! detalles[0].cantidad=2
//! detalles[0].precioUnitario=1000.00
//! detalles[0].descuento=0
//! detalles[1].productoId=...
//! ```
//!
//! Missing header values are sent as empty strings; the server decides what
//! is required.

use serde::Serialize;
use url::form_urlencoded;

use crate::draft::SaleDraft;

/// Date format of the `fecha` field (HTML `datetime-local`).
pub const SALE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Ordered `name=value` pairs of the sale form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    /// Serializes the current draft.
    pub fn from_draft(draft: &SaleDraft) -> Self {
        let header = draft.header();
        let mut payload = FormPayload::default();

        payload.push(
            "clienteId",
            header.customer.as_ref().map(|c| c.id.to_string()).unwrap_or_default(),
        );
        payload.push(
            "vendedorId",
            header.seller.as_ref().map(|s| s.id.to_string()).unwrap_or_default(),
        );
        payload.push(
            "fecha",
            header
                .sale_date
                .map(|d| d.format(SALE_DATE_FORMAT).to_string())
                .unwrap_or_default(),
        );
        payload.push("metodoPago", header.payment_method.form_value());
        payload.push("observaciones", header.notes.clone().unwrap_or_default());
        payload.push("descuento", draft.order_discount().to_percent_string());

        for (i, item) in draft.items().iter().enumerate() {
            payload.push(format!("detalles[{}].productoId", i), item.product_id.to_string());
            payload.push(format!("detalles[{}].cantidad", i), item.quantity.to_string());
            payload.push(
                format!("detalles[{}].precioUnitario", i),
                item.unit_price.to_decimal_string(),
            );
            payload.push(format!("detalles[{}].descuento", i), item.discount.to_percent_string());
        }

        payload
    }

    fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of `detalles[i]` groups.
    pub fn line_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|(n, _)| n.ends_with(".productoId"))
            .count()
    }

    /// `application/x-www-form-urlencoded` body.
    ///
    /// ## Example
    /// ```rust
    /// use gest_core::{FormPayload, SaleDraft};
    ///
    /// let body = FormPayload::from_draft(&SaleDraft::new()).to_urlencoded();
    /// assert!(body.starts_with("clienteId=&vendedorId=&fecha=&metodoPago=EFECTIVO"));
    /// ```
    pub fn to_urlencoded(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{CustomerRef, DiscountRate, PaymentMethod, ProductId};
    use chrono::NaiveDate;

    fn draft() -> SaleDraft {
        let mut draft = SaleDraft::new();
        draft.header_mut().customer = Some(CustomerRef {
            id: 7,
            name: "Ana".to_string(),
        });
        draft.header_mut().sale_date = NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|d| d.and_hms_opt(9, 30, 45));
        draft.header_mut().payment_method = PaymentMethod::BankTransfer;
        draft.header_mut().notes = Some("entregar & facturar".to_string());
        draft
            .add_line_item(ProductId(1), "Cuaderno", Money::from_major_minor(1000, 0), 10, 2)
            .unwrap();
        draft
            .add_line_item(ProductId(2), "Lápiz", Money::from_cents(49_990), 5, 1)
            .unwrap();
        draft.set_line_discount(1, DiscountRate::from_bps(1250)).unwrap();
        draft.set_order_discount(DiscountRate::from_bps(500));
        draft
    }

    #[test]
    fn test_header_fields() {
        let payload = FormPayload::from_draft(&draft());

        assert_eq!(payload.get("clienteId"), Some("7"));
        assert_eq!(payload.get("vendedorId"), Some(""));
        assert_eq!(payload.get("fecha"), Some("2026-10-19T09:30"));
        assert_eq!(payload.get("metodoPago"), Some("TRANSFERENCIA"));
        assert_eq!(payload.get("descuento"), Some("5"));
    }

    #[test]
    fn test_line_item_fields() {
        let payload = FormPayload::from_draft(&draft());

        assert_eq!(payload.line_count(), 2);
        assert_eq!(payload.get("detalles[0].productoId"), Some("1"));
        assert_eq!(payload.get("detalles[0].cantidad"), Some("2"));
        assert_eq!(payload.get("detalles[0].precioUnitario"), Some("1000.00"));
        assert_eq!(payload.get("detalles[0].descuento"), Some("0"));
        assert_eq!(payload.get("detalles[1].precioUnitario"), Some("499.90"));
        assert_eq!(payload.get("detalles[1].descuento"), Some("12.5"));
    }

    #[test]
    fn test_urlencoded_escapes_values() {
        let body = FormPayload::from_draft(&draft()).to_urlencoded();

        assert!(body.contains("observaciones=entregar+%26+facturar"));
        assert!(body.contains("detalles%5B0%5D.cantidad=2"));
    }
}
