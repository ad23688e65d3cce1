//! # Terminal Rendering
//!
//! Turns draft and search events into printable lines. Money is formatted
//! here and nowhere else.

use gest_core::{
    ConfirmationSummary, CurrencyFormat, Money, ProductHit, SaleTotals, WizardStep,
};
use gest_lookup::SearchEvent;

use crate::state::{DraftEvent, DraftView};

const RULE: &str = "────────────────────────────────────────────────────────────";

/// Lines for one draft event.
pub fn draft_event(event: &DraftEvent, currency: &CurrencyFormat) -> Vec<String> {
    match event {
        DraftEvent::Changed(view) => draft_view(view, currency),
        DraftEvent::StepEntered { step, summary } => {
            let mut lines = vec![format!("══ Step {} ══", step)];
            if let Some(summary) = summary {
                lines.extend(confirmation(summary, currency));
            } else if *step == WizardStep::SelectProducts {
                lines.push("Type 'search <term>' to find products.".to_string());
            }
            lines
        }
        DraftEvent::Rejected { message } => vec![format!("! {}", message)],
        DraftEvent::Submitted { sale_id: Some(id) } => vec![format!("✔ Sale #{} saved", id)],
        DraftEvent::Submitted { sale_id: None } => vec!["✔ Sale saved".to_string()],
    }
}

/// Product table and totals of the current draft.
pub fn draft_view(view: &DraftView, currency: &CurrencyFormat) -> Vec<String> {
    let mut lines = Vec::new();

    if view.items.is_empty() {
        lines.push("(no products)".to_string());
    } else {
        for (i, item) in view.items.iter().enumerate() {
            let mut line = format!(
                "{:>2}. {:<28} {:>4} x {:>10}",
                i + 1,
                item.name,
                item.quantity,
                currency.format(item.unit_price)
            );
            if !item.discount.is_zero() {
                line.push_str(&format!(" -{}", item.discount));
            }
            line.push_str(&format!("  = {}", currency.format(item.subtotal())));
            lines.push(line);
        }
    }

    lines.push(format!(
        "{} units, {} products",
        view.item_count, view.unique_products
    ));
    if !view.order_discount.is_zero() {
        lines.push(format!("Order discount {}", view.order_discount));
    }
    lines.extend(totals(&view.totals, currency));
    lines
}

fn totals(totals: &SaleTotals, currency: &CurrencyFormat) -> Vec<String> {
    let mut lines = vec![format!("Subtotal  {:>12}", currency.format(totals.subtotal))];
    if !totals.order_discount.is_zero() {
        lines.push(format!(
            "Discount  {:>12}",
            currency.format(Money::zero() - totals.order_discount)
        ));
    }
    lines.push(format!("Tax       {:>12}", currency.format(totals.tax)));
    lines.push(format!("TOTAL     {:>12}", currency.format(totals.total)));
    lines
}

/// Read-only confirmation screen.
pub fn confirmation(summary: &ConfirmationSummary, currency: &CurrencyFormat) -> Vec<String> {
    let dash = || "-".to_string();
    let mut lines = vec![
        format!("Customer: {}", summary.customer.clone().unwrap_or_else(dash)),
        format!("Seller:   {}", summary.seller.clone().unwrap_or_else(dash)),
        format!(
            "Date:     {}",
            summary
                .sale_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(dash)
        ),
        format!("Payment:  {}", summary.payment_method),
    ];
    if let Some(notes) = &summary.notes {
        lines.push(format!("Notes:    {}", notes));
    }
    lines.push(RULE.to_string());

    for row in &summary.rows {
        lines.push(format!(
            "{:<28} {:>4} x {:>10} {:>6}  = {}",
            row.name,
            row.quantity,
            currency.format(row.unit_price),
            if row.discount.is_zero() {
                String::new()
            } else {
                format!("-{}", row.discount)
            },
            currency.format(row.subtotal)
        ));
    }

    lines.push(RULE.to_string());
    lines.push(format!(
        "{} units, {} products",
        summary.item_count, summary.unique_products
    ));
    if !summary.order_discount_rate.is_zero() {
        lines.push(format!("Order discount {}", summary.order_discount_rate));
    }
    lines.extend(totals(&summary.totals, currency));
    lines.push("Type 'tender <amount>' for change, 'submit' to save.".to_string());
    lines
}

/// Lines for one search event.
pub fn search_event(event: &SearchEvent) -> Vec<String> {
    match event {
        SearchEvent::Prompt { min_len } => {
            vec![format!("Type at least {} characters to search", min_len)]
        }
        SearchEvent::Started { term, .. } => vec![format!("Searching '{}'…", term)],
        SearchEvent::Results { term, hits } if hits.is_empty() => {
            vec![format!("No products found for '{}'", term)]
        }
        SearchEvent::Results { .. } => Vec::new(),
        SearchEvent::Failed { message, .. } => vec![format!("! {}", message)],
    }
}

/// Numbered search results.
pub fn search_hits(hits: &[ProductHit], currency: &CurrencyFormat) -> Vec<String> {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{:>2}) {:<28} {:>10}  stock {}",
                i + 1,
                hit.name,
                currency.format(hit.price),
                hit.stock
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gest_core::{ProductId, SaleDraft, TaxRate};

    fn reference_view() -> DraftView {
        let mut draft = SaleDraft::new();
        draft
            .add_line_item(ProductId(1), "Cuaderno", Money::from_major_minor(1000, 0), 10, 2)
            .unwrap();
        draft
            .add_line_item(ProductId(2), "Lápiz", Money::from_major_minor(500, 0), 5, 1)
            .unwrap();
        draft
            .set_line_discount(1, gest_core::DiscountRate::from_bps(1000))
            .unwrap();
        DraftView::of(&draft, TaxRate::default())
    }

    #[test]
    fn test_draft_view_lines() {
        let lines = draft_view(&reference_view(), &CurrencyFormat::default());

        assert!(lines[0].starts_with(" 1. Cuaderno"));
        assert!(lines[0].ends_with("= $2.000"));
        assert!(lines[1].contains("-10%"));
        assert!(lines[1].ends_with("= $450"));
        assert_eq!(lines[2], "3 units, 2 products");
        assert!(lines.last().unwrap().ends_with("$2.916"));
    }

    #[test]
    fn test_empty_draft_view() {
        let view = DraftView::of(&SaleDraft::new(), TaxRate::default());
        let lines = draft_view(&view, &CurrencyFormat::default());
        assert_eq!(lines[0], "(no products)");
    }

    #[test]
    fn test_simple_events() {
        let currency = CurrencyFormat::default();
        assert_eq!(
            draft_event(
                &DraftEvent::Rejected {
                    message: "customer is required".into()
                },
                &currency
            ),
            vec!["! customer is required"]
        );
        assert_eq!(
            draft_event(&DraftEvent::Submitted { sale_id: Some(42) }, &currency),
            vec!["✔ Sale #42 saved"]
        );
    }

    #[test]
    fn test_search_events() {
        assert_eq!(
            search_event(&SearchEvent::Results {
                term: "xyz".into(),
                hits: vec![]
            }),
            vec!["No products found for 'xyz'"]
        );
        assert_eq!(
            search_event(&SearchEvent::Failed {
                term: "cua".into(),
                message: "Error searching products, try again".into()
            }),
            vec!["! Error searching products, try again"]
        );
        assert_eq!(search_event(&SearchEvent::Prompt { min_len: 3 }).len(), 1);
    }

    #[test]
    fn test_search_hits_numbered_from_one() {
        let hits = vec![ProductHit {
            id: ProductId(5),
            name: "Goma".into(),
            price: Money::from_major_minor(1234, 0),
            stock: 7,
        }];
        let lines = search_hits(&hits, &CurrencyFormat::default());
        assert!(lines[0].starts_with(" 1) Goma"));
        assert!(lines[0].contains("$1.234"));
        assert!(lines[0].ends_with("stock 7"));
    }
}
