//! Value parsers used by the invoice consistency checks.

pub mod amounts;
pub mod dates;
pub mod patterns;

pub use amounts::{amounts_match, parse_amount};
pub use dates::parse_invoice_date;
