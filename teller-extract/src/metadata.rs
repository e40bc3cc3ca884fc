//! Statement-level metadata: reporting period, account number/type, bank.

use once_cell::sync::Lazy;
use regex::Regex;
use teller_core::{StatementMeta, StatementPeriod};
use chrono::NaiveDate;

static STATEMENT_PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)statement\s+period\s+date\s*:\s*(\d{1,2}/\d{1,2}/\d{4})\s*-\s*(\d{1,2}/\d{1,2}/\d{4})")
        .unwrap()
});
static ACCOUNT_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)account\s*number\s*:\s*([\dxX*]+)").unwrap());
static ACCOUNT_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)account\s*type\s*:\s*([^\r\n]+)").unwrap());

/// Banks we can name from a substring of the statement text.
const KNOWN_BANKS: &[(&str, &str)] = &[
    ("fifth third", "Fifth Third Bank"),
    ("chase", "Chase Bank"),
    ("wells fargo", "Wells Fargo"),
    ("capital one", "Capital One"),
];

/// Scrape whatever metadata the text carries; every field is optional.
pub fn extract_meta(text: &str) -> StatementMeta {
    let mut meta = StatementMeta::default();

    if let Some(caps) = STATEMENT_PERIOD_RE.captures(text) {
        let start = NaiveDate::parse_from_str(&caps[1], "%m/%d/%Y").ok();
        let end = NaiveDate::parse_from_str(&caps[2], "%m/%d/%Y").ok();
        if let (Some(start), Some(end)) = (start, end) {
            meta.period = Some(StatementPeriod { start, end });
        }
    }

    if let Some(caps) = ACCOUNT_NUMBER_RE.captures(text) {
        meta.account_number = Some(caps[1].to_string());
    }
    if let Some(caps) = ACCOUNT_TYPE_RE.captures(text) {
        meta.account_type = Some(caps[1].trim().to_string());
    }

    let lower = text.to_lowercase();
    meta.bank_name = KNOWN_BANKS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, name)| name.to_string());

    meta
}
