//! Regex patterns for amounts and dates as they appear on invoices.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // 12/20/2023, 7-12-24
    pub static ref DATE_MDY: Regex = Regex::new(
        r"\b(\d{1,2})[/\-](\d{1,2})[/\-](\d{4}|\d{2})\b"
    ).unwrap();

    // 2024-05-27, 2024/05/27
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[/\-](\d{1,2})[/\-](\d{1,2})\b"
    ).unwrap();

    // Jul 12, 2024 / July 12 2024 / Sept. 3, 2023
    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})\b"
    ).unwrap();

    // 12 Jul 2024
    pub static ref DATE_DAY_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+([a-z]{3,9})\.?,?\s+(\d{4})\b"
    ).unwrap();

    // $7,903.20, 0.90000, -15.00, (15.00), 1,000
    pub static ref AMOUNT: Regex = Regex::new(
        r"(-|\()?\s*[$€£]?\s*(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?"
    ).unwrap();
}
