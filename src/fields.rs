//! Field normalization for label records
//!
//! Raw batch data arrives with placeholder tokens, stray whitespace and
//! inconsistent casing. This module cleans raw values, derives the NIIN and
//! GS1 stock-number digits from the NSN, and assembles the normalized field
//! set consumed by the layout engines.

use std::collections::HashMap;

/// Placeholder tokens treated as an absent value, compared case-insensitively
const BLANK_TOKENS: [&str; 9] = [
    "not applicable or blank",
    "-/blank",
    "n/a",
    "",
    "-",
    "blank",
    "na",
    "none",
    "nan",
];

/// Clean a raw field value: trim, and substitute the default when the value
/// is one of the recognized placeholder tokens
pub fn clean_value(raw: &str, default: &str) -> String {
    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();
    if BLANK_TOKENS.contains(&lowered.as_str()) {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Extract the 9-digit NIIN from a stock number: the last nine digits,
/// left-padded with zeros when fewer are present
pub fn derive_niin(nsn: &str) -> String {
    let digits: String = nsn.chars().filter(|c| c.is_ascii_digit()).collect();
    let padded = format!("{:0>9}", digits);
    padded[padded.len() - 9..].to_string()
}

/// Extract the 13-digit stock number used in the GS1 AI 7001 element
pub fn nsn_digits(nsn: &str) -> String {
    let digits: String = nsn.chars().filter(|c| c.is_ascii_digit()).collect();
    let padded = format!("{:0>13}", digits);
    padded[padded.len() - 13..].to_string()
}

/// Coerce a shelf-life value to whole months, defaulting to 24 when the
/// value is absent or unparseable
pub fn coerce_shelf_life(raw: &str) -> u32 {
    let cleaned = clean_value(raw, "");
    cleaned.parse::<f64>().map(|v| v as u32).unwrap_or(24)
}

/// Normalize a batch-lot-managed flag to a single Y or N
pub fn coerce_managed_flag(raw: &str) -> String {
    let cleaned = clean_value(raw, "N").to_uppercase();
    if cleaned.starts_with('Y') {
        "Y".to_string()
    } else {
        "N".to_string()
    }
}

/// One raw input row, keyed by column name
#[derive(Debug, Clone, Default)]
pub struct LabelRecord {
    values: HashMap<String, String>,
}

impl LabelRecord {
    pub fn new() -> LabelRecord {
        LabelRecord {
            values: HashMap::new(),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Raw value for a column, empty string when the column is absent
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Cleaned value with a field-specific default
    pub fn cleaned(&self, key: &str, default: &str) -> String {
        clean_value(self.get(key), default)
    }

    /// Fill columns that are absent or placeholder from another record
    pub fn fill_missing_from(&mut self, other: &LabelRecord) {
        for (key, value) in &other.values {
            let current = clean_value(self.get(key), "");
            if current.is_empty() {
                self.values.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Normalized field set for a DoD shipping label
#[derive(Debug, Clone)]
pub struct DodLabelFields {
    pub product_description: String,
    pub nato_stock_no: String,
    pub niin: String,
    pub unit_of_issue: String,
    pub batch_lot_no: String,
    pub date_of_manufacture: String,
    pub shelf_life_months: u32,
    pub specification: String,
    pub nato_code: String,
    pub jsd_reference: String,
    pub capacity_net_weight: String,
    pub retest_date: String,
    pub test_report_no: String,
    pub hazardous_material_code: String,
    pub batch_managed: String,
    pub contractor_details: String,
    pub safety_markings: String,
}

impl DodLabelFields {
    /// Build the normalized field set from a raw record, deriving the NIIN
    /// from the stock number when the NIIN column is blank
    pub fn from_record(record: &LabelRecord) -> DodLabelFields {
        let nato_stock_no = record.cleaned("nato_stock_no", "N/A");

        let niin_raw = record.cleaned("niin", "");
        let niin = if niin_raw.is_empty() {
            if nato_stock_no == "N/A" {
                "000000000".to_string()
            } else {
                derive_niin(&nato_stock_no)
            }
        } else {
            derive_niin(&niin_raw)
        };

        DodLabelFields {
            product_description: record.cleaned("product_description", "N/A"),
            nato_stock_no,
            niin,
            unit_of_issue: record.cleaned("unit_of_issue", "DR"),
            batch_lot_no: record.cleaned("batch_lot_no", "-"),
            date_of_manufacture: record.cleaned("date_of_manufacture", "-"),
            shelf_life_months: coerce_shelf_life(record.get("shelf_life_months")),
            specification: record.cleaned("specification", "-"),
            nato_code: record.cleaned("nato_code", "-"),
            jsd_reference: record.cleaned("jsd_reference", "-"),
            capacity_net_weight: record.cleaned("capacity_net_weight", "-"),
            retest_date: record.cleaned("retest_date", "-"),
            test_report_no: record.cleaned("test_report_no", "-"),
            hazardous_material_code: record.cleaned("hazardous_material_code", "-"),
            batch_managed: coerce_managed_flag(record.get("batch_managed")),
            contractor_details: record.cleaned("contractor_details", "-"),
            safety_markings: record.cleaned("safety_markings", "-"),
        }
    }

    /// 13-digit stock number for the GS1 DataMatrix payload
    pub fn nsn13(&self) -> String {
        nsn_digits(&self.nato_stock_no)
    }
}

/// Reformat a DD/MM/YYYY date for display as DD MMM YYYY in uppercase.
/// Unparseable input is passed through untouched so the label still shows
/// whatever the operator supplied.
pub fn format_date_display(raw: &str) -> String {
    let cleaned = clean_value(raw, "-");
    match chrono::NaiveDate::parse_from_str(&cleaned, "%d/%m/%Y") {
        Ok(date) => date.format("%d %b %Y").to_string().to_uppercase(),
        Err(_) => cleaned,
    }
}
