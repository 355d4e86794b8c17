//! Date parsing for extracted invoice values.

use chrono::NaiveDate;

use super::patterns::{DATE_DAY_MONTH_NAME, DATE_MDY, DATE_MONTH_NAME, DATE_YMD};

/// Parse a date as printed on US-style invoices.
///
/// Recognised forms: `12/20/2023` (month first), `2024-05-27`,
/// `Jul 12, 2024` and `12 Jul 2024`. Two-digit years map to 2000-2050 or
/// 1951-1999.
pub fn parse_invoice_date(s: &str) -> Option<NaiveDate> {
    if let Some(caps) = DATE_YMD.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_MDY.captures(s) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_MONTH_NAME.captures(s) {
        if let Some(month) = month_to_number(&caps[1]) {
            let day: u32 = caps[2].parse().ok()?;
            let year: i32 = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    if let Some(caps) = DATE_DAY_MONTH_NAME.captures(s) {
        let month = month_to_number(&caps[2])?;
        let day: u32 = caps[1].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    Some(match year {
        0..=50 => 2000 + year,
        51..=99 => 1900 + year,
        _ => year,
    })
}

fn month_to_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
