//! Amount parsing for extracted invoice values.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT;

/// Parse an amount as printed on an invoice (e.g. "$7,903.20", "0.90000",
/// "(15.00)"). Currency symbols and thousands separators are dropped; a
/// leading minus or an opening parenthesis makes the amount negative.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let caps = AMOUNT.captures(s)?;
    let integer_part = caps[2].replace(',', "");
    let fraction = caps.get(3).map_or("", |m| m.as_str());

    let amount = Decimal::from_str(&format!("{}{}", integer_part, fraction)).ok()?;
    if caps.get(1).is_some() {
        Some(-amount)
    } else {
        Some(amount)
    }
}

/// Whether two amounts agree within `tolerance`.
pub fn amounts_match(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    (a - b).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$7,903.20"), Some(dec("7903.20")));
        assert_eq!(parse_amount("7903.20"), Some(dec("7903.20")));
        assert_eq!(parse_amount("0.90000"), Some(dec("0.9")));
        assert_eq!(parse_amount("100"), Some(dec("100")));
        assert_eq!(parse_amount("1,250,000"), Some(dec("1250000")));
        assert_eq!(parse_amount("USD 42.50"), Some(dec("42.50")));
    }

    #[test]
    fn test_parse_negative_amount() {
        assert_eq!(parse_amount("-15.00"), Some(dec("-15")));
        assert_eq!(parse_amount("($15.00)"), Some(dec("-15")));
    }

    #[test]
    fn test_parse_amount_without_digits() {
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_amounts_match() {
        let tolerance = dec("0.01");
        assert!(amounts_match(dec("40") * dec("197.58"), dec("7903.20"), tolerance));
        assert!(amounts_match(dec("90.004"), dec("90.00"), tolerance));
        assert!(!amounts_match(dec("90.02"), dec("90.00"), tolerance));
    }
}
