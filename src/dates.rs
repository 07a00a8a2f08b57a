//! Shelf-life date arithmetic
//!
//! Expiry dates are computed by adding whole calendar months to the date of
//! manufacture, clamping to the last day of the target month when the source
//! day does not exist there (31 Jan + 1 month lands on 28/29 Feb). Parse
//! failures never abort a render: the display falls back to "N/A" and the
//! barcode payloads carry documented sentinels.

use chrono::{Months, NaiveDate};
use tracing::warn;

/// Sentinel YYMMDD expiry used in the GS1 payload when no date is available
pub const GS1_EXPIRY_SENTINEL: &str = "990101";

/// Sentinel use-by payload for the Code 128 when no date is available
pub const USE_BY_SENTINEL: &str = "01JAN99";

/// Compute the expiry from a DD/MM/YYYY manufacture date and a shelf life in
/// whole months. Returns the uppercase display string and the parsed date;
/// unparseable input yields ("N/A", None).
pub fn compute_expiry(date_of_manufacture: &str, shelf_life_months: u32) -> (String, Option<NaiveDate>) {
    match NaiveDate::parse_from_str(date_of_manufacture.trim(), "%d/%m/%Y") {
        Ok(dom) => match dom.checked_add_months(Months::new(shelf_life_months)) {
            Some(expiry) => (
                expiry.format("%d %b %Y").to_string().to_uppercase(),
                Some(expiry),
            ),
            None => {
                warn!(
                    "Expiry overflow adding {} months to {}",
                    shelf_life_months, date_of_manufacture
                );
                ("N/A".to_string(), None)
            }
        },
        Err(_) => {
            warn!(
                "Unparseable date of manufacture '{}', expiry set to N/A",
                date_of_manufacture
            );
            ("N/A".to_string(), None)
        }
    }
}

/// Resolve the re-test date: a non-blank operator override wins (reformatted
/// for display), otherwise the computed expiry display is used
pub fn resolve_retest(override_value: &str, expiry_display: &str) -> String {
    let cleaned = crate::fields::clean_value(override_value, "");
    if cleaned.is_empty() {
        expiry_display.to_string()
    } else {
        crate::fields::format_date_display(&cleaned)
    }
}

/// YYMMDD expiry element for the GS1 AI 17, sentinel when unavailable
pub fn gs1_expiry(expiry: Option<NaiveDate>) -> String {
    match expiry {
        Some(date) => date.format("%y%m%d").to_string(),
        None => GS1_EXPIRY_SENTINEL.to_string(),
    }
}

/// DDMMMYY use-by payload for the Code 128, sentinel when unavailable
pub fn use_by_payload(expiry: Option<NaiveDate>) -> String {
    match expiry {
        Some(date) => date.format("%d%b%y").to_string().to_uppercase(),
        None => USE_BY_SENTINEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_plain_addition() {
        let (display, date) = compute_expiry("12/11/2024", 18);
        assert_eq!(display, "12 MAY 2026");
        assert_eq!(date, Some(NaiveDate::from_ymd_opt(2026, 5, 12).unwrap()));

        let (display, _) = compute_expiry("15/11/2025", 36);
        assert_eq!(display, "15 NOV 2028");
    }

    #[test]
    fn test_expiry_preserves_day_of_month() {
        // The naive 30-day approximation would drift here
        let (display, date) = compute_expiry("31/12/2025", 24);
        assert_eq!(display, "31 DEC 2027");
        assert_eq!(date, Some(NaiveDate::from_ymd_opt(2027, 12, 31).unwrap()));
    }

    #[test]
    fn test_expiry_clamps_to_month_end() {
        let (display, date) = compute_expiry("31/01/2025", 1);
        assert_eq!(display, "28 FEB 2025");
        assert_eq!(date, Some(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()));

        // Leap year keeps the 29th
        let (display, _) = compute_expiry("31/01/2024", 1);
        assert_eq!(display, "29 FEB 2024");
    }

    #[test]
    fn test_expiry_unparseable() {
        let (display, date) = compute_expiry("soon", 24);
        assert_eq!(display, "N/A");
        assert_eq!(date, None);

        let (display, date) = compute_expiry("-", 24);
        assert_eq!(display, "N/A");
        assert_eq!(date, None);
    }

    #[test]
    fn test_resolve_retest() {
        assert_eq!(resolve_retest("", "15 NOV 2028"), "15 NOV 2028");
        assert_eq!(resolve_retest("-", "15 NOV 2028"), "15 NOV 2028");
        assert_eq!(resolve_retest("01/06/2027", "15 NOV 2028"), "01 JUN 2027");
    }

    #[test]
    fn test_barcode_payloads() {
        let expiry = NaiveDate::from_ymd_opt(2028, 11, 15);
        assert_eq!(gs1_expiry(expiry), "281115");
        assert_eq!(use_by_payload(expiry), "15NOV28");
        assert_eq!(gs1_expiry(None), "990101");
        assert_eq!(use_by_payload(None), "01JAN99");
    }
}
