//! Consistency checks over an extracted invoice bundle.
//!
//! Checks only report; extracted values are never rewritten.

pub mod rules;

use rust_decimal::Decimal;

use crate::models::{ExtractedRecord, ExtractionBundle};
use rules::{amounts_match, parse_amount, parse_invoice_date};

pub const INVOICE_SCHEMA: &str = "invoice";
pub const LINE_ITEMS_SCHEMA: &str = "line_items";

/// Allowed difference between `count * unit_item_price` and the line total.
pub fn line_total_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Report inconsistencies in an invoice bundle, one message per issue.
///
/// Schemas missing from the bundle, or recorded as failed, are skipped.
pub fn check_bundle(bundle: &ExtractionBundle) -> Vec<String> {
    let mut issues = Vec::new();

    if let Some(invoice) = bundle.get(INVOICE_SCHEMA).and_then(|r| r.as_one()) {
        check_invoice(invoice, &mut issues);
    }

    if let Some(items) = bundle.get(LINE_ITEMS_SCHEMA).and_then(|r| r.as_many()) {
        for (index, item) in items.iter().enumerate() {
            check_line_item(index, item, &mut issues);
        }
    }

    issues
}

fn check_invoice(invoice: &ExtractedRecord, issues: &mut Vec<String>) {
    if invoice.has_field("invoice_number") && invoice.is_absent("invoice_number") {
        issues.push("invoice: missing invoice number".to_string());
    }

    let invoice_date = parsed_date(invoice, "invoice_date", issues);
    let due_date = parsed_date(invoice, "due_date", issues);

    if let (Some(issued), Some(due)) = (invoice_date, due_date) {
        if due < issued {
            issues.push(format!(
                "invoice: due date {} is before invoice date {}",
                due, issued
            ));
        }
    }
}

fn parsed_date(
    record: &ExtractedRecord,
    field: &str,
    issues: &mut Vec<String>,
) -> Option<chrono::NaiveDate> {
    let raw = record.get(field)?;
    let date = parse_invoice_date(raw);
    if date.is_none() {
        issues.push(format!("invoice: unrecognised {} \"{}\"", field, raw));
    }
    date
}

fn check_line_item(index: usize, item: &ExtractedRecord, issues: &mut Vec<String>) {
    let count = parsed_amount(index, item, "count", issues);
    let unit_price = parsed_amount(index, item, "unit_item_price", issues);
    let total = parsed_amount(index, item, "product_total_price", issues);

    if let (Some(count), Some(unit_price), Some(total)) = (count, unit_price, total) {
        let expected = count * unit_price;
        if !amounts_match(expected, total, line_total_tolerance()) {
            issues.push(format!(
                "line_items[{}]: count x unit price is {}, but product total is {}",
                index,
                expected.normalize(),
                total.normalize()
            ));
        }
    }
}

fn parsed_amount(
    index: usize,
    item: &ExtractedRecord,
    field: &str,
    issues: &mut Vec<String>,
) -> Option<Decimal> {
    let raw = item.get(field)?;
    let amount = parse_amount(raw);
    if amount.is_none() {
        issues.push(format!("line_items[{}]: unrecognised {} \"{}\"", index, field, raw));
    }
    amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::normalize;
    use crate::schema::invoice_registry;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn bundle(invoice: Value, items: Value) -> ExtractionBundle {
        let registry = invoice_registry().unwrap();
        let mut bundle = ExtractionBundle::new();
        bundle.insert(
            INVOICE_SCHEMA,
            normalize(registry.get(INVOICE_SCHEMA).unwrap(), &invoice).unwrap(),
        );
        bundle.insert(
            LINE_ITEMS_SCHEMA,
            normalize(registry.get(LINE_ITEMS_SCHEMA).unwrap(), &items).unwrap(),
        );
        bundle
    }

    #[test]
    fn test_consistent_invoice() {
        let bundle = bundle(
            json!({"invoice_number": "1019273", "invoice_date": "12/20/2023", "due_date": "Jan 19, 2024"}),
            json!([
                {"product_description": "CABLE, GNSS ANTENNA, 20 M", "count": "40", "unit_item_price": "$197.58", "product_total_price": "$7,903.20"},
                {"product_description": "SHIPPING", "count": null, "unit_item_price": null, "product_total_price": "25.00"}
            ]),
        );
        assert_eq!(check_bundle(&bundle), Vec::<String>::new());
    }

    #[test]
    fn test_missing_number_and_bad_due_date() {
        let bundle = bundle(
            json!({"invoice_date": "2024-05-27", "due_date": "2024-05-01"}),
            json!([]),
        );
        assert_eq!(
            check_bundle(&bundle),
            vec![
                "invoice: missing invoice number".to_string(),
                "invoice: due date 2024-05-01 is before invoice date 2024-05-27".to_string(),
            ]
        );
    }

    #[test]
    fn test_unrecognised_date() {
        let bundle = bundle(json!({"invoice_number": "1", "due_date": "upon receipt"}), json!([]));
        assert_eq!(
            check_bundle(&bundle),
            vec!["invoice: unrecognised due_date \"upon receipt\"".to_string()]
        );
    }

    #[test]
    fn test_line_total_mismatch() {
        let bundle = bundle(
            json!({"invoice_number": "1"}),
            json!([{"count": "100", "unit_item_price": "0.90000", "product_total_price": "95.00"}]),
        );
        assert_eq!(
            check_bundle(&bundle),
            vec!["line_items[0]: count x unit price is 90, but product total is 95".to_string()]
        );
    }

    #[test]
    fn test_unrecognised_amount() {
        let bundle = bundle(
            json!({"invoice_number": "1"}),
            json!([{"count": "forty", "unit_item_price": "1.00", "product_total_price": "40.00"}]),
        );
        assert_eq!(
            check_bundle(&bundle),
            vec!["line_items[0]: unrecognised count \"forty\"".to_string()]
        );
    }

    #[test]
    fn test_foreign_bundle_is_skipped() {
        assert!(check_bundle(&ExtractionBundle::new()).is_empty());
    }
}
