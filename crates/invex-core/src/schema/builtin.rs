//! Built-in invoice schemas shipped with the library.
//!
//! The schemas are kept as a JSON data file so they can be exported, edited
//! and loaded back with `SchemaRegistry::from_file`.

use super::SchemaRegistry;

/// Embedded invoice schema file.
pub static INVOICE_SCHEMAS_JSON: &str = include_str!("../../schemas/invoice.json");

/// Registry for invoices: invoice header, remit-to, billing and shipping
/// addresses, then line items, in that order.
pub fn invoice_registry() -> crate::Result<SchemaRegistry> {
    SchemaRegistry::from_json(INVOICE_SCHEMAS_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Cardinality;

    #[test]
    fn test_builtin_order() {
        let registry = invoice_registry().unwrap();
        assert_eq!(
            registry.ids().collect::<Vec<_>>(),
            vec!["invoice", "remit_address", "billing_address", "shipping_address", "line_items"]
        );
    }

    #[test]
    fn test_builtin_cardinalities() {
        let registry = invoice_registry().unwrap();
        assert_eq!(registry.get("invoice").unwrap().cardinality(), Cardinality::One);
        assert_eq!(registry.get("remit_address").unwrap().cardinality(), Cardinality::One);
        assert_eq!(registry.get("line_items").unwrap().cardinality(), Cardinality::Many);
    }

    #[test]
    fn test_builtin_invoice_fields() {
        let registry = invoice_registry().unwrap();
        let invoice = registry.get("invoice").unwrap();
        assert_eq!(invoice.fields().len(), 9);
        assert_eq!(invoice.title(), "Invoice Details");
        assert_eq!(invoice.fields()[0].examples()[0].output, "1019273");

        let items = registry.get("line_items").unwrap();
        assert_eq!(items.examples().len(), 4);
    }
}
