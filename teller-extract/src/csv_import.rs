//! CSV statement import.
//!
//! Bank CSV exports disagree on header names ("Trans Date" vs "Posting
//! Date", "Memo" vs "Description"); columns are located by synonym once and
//! rows flow through the same sign rules as table extraction.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use teller_core::{ExtractConfig, Transaction, parse_statement_date};
use tracing::debug;

use crate::rows::TransactionCandidate;
use crate::sign;
use crate::tables::TableKind;
use crate::text::clean_description;

const DATE_HEADERS: &[&str] = &[
    "date", "trans date", "transaction date", "posting date", "effective date", "process date",
];
const DESCRIPTION_HEADERS: &[&str] =
    &["description", "memo", "transaction", "details", "payee", "merchant"];
const AMOUNT_HEADERS: &[&str] =
    &["amount", "debit", "credit", "withdrawal", "deposit", "transaction amount"];
const REFERENCE_HEADERS: &[&str] = &["reference", "ref", "check number", "check #", "ref #"];

#[derive(Debug, Default)]
struct ColumnMap {
    date: Option<usize>,
    description: Option<usize>,
    amount: Option<usize>,
    reference: Option<usize>,
    /// Header text of the amount column; a "Debit"/"Credit" header works
    /// like a column group for sign inference.
    amount_header: Option<String>,
}

fn map_headers(headers: &csv::StringRecord) -> ColumnMap {
    let mut map = ColumnMap::default();
    for (idx, raw) in headers.iter().enumerate() {
        let h = raw.trim().to_lowercase();
        if map.date.is_none() && DATE_HEADERS.iter().any(|k| h.contains(k)) {
            map.date = Some(idx);
        } else if map.amount.is_none() && AMOUNT_HEADERS.iter().any(|k| h.contains(k)) {
            map.amount = Some(idx);
            map.amount_header = Some(raw.trim().to_string());
        } else if map.description.is_none() && DESCRIPTION_HEADERS.iter().any(|k| h.contains(k)) {
            map.description = Some(idx);
        } else if map.reference.is_none() && REFERENCE_HEADERS.iter().any(|k| h.contains(k)) {
            map.reference = Some(idx);
        }
    }
    map
}

/// Parse a CSV statement export into transactions. Unparseable rows are
/// skipped, not errors; a header row without date and amount columns is.
pub fn parse_csv_statement(path: impl AsRef<Path>, config: &ExtractConfig) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    parse_csv_from_reader(file, config)
}

pub fn parse_csv_from_reader<R: Read>(reader: R, config: &ExtractConfig) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let map = map_headers(rdr.headers().context("reading CSV header")?);
    let (Some(date_idx), Some(amount_idx)) = (map.date, map.amount) else {
        bail!("CSV header has no recognizable date and amount columns");
    };

    let group = map
        .amount_header
        .filter(|h| {
            let h = h.to_lowercase();
            ["debit", "credit", "withdrawal", "deposit"].iter().any(|k| h.contains(k))
        });

    let mut out = Vec::new();
    for record in rdr.records() {
        let record = match record {
            Ok(r) => r,
            Err(_) => continue,
        };
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

        let raw_date = cell(Some(date_idx));
        let raw_amount = cell(Some(amount_idx));
        if raw_date.is_empty() || raw_amount.is_empty() {
            continue;
        }
        let Some(date) = parse_csv_date(raw_date, config) else {
            continue;
        };

        let mut description = cell(map.description).to_string();
        let reference = cell(map.reference);
        if description.is_empty() && !reference.is_empty() {
            description = format!("Check #{reference}");
        }

        let candidate = TransactionCandidate {
            raw_date: raw_date.to_string(),
            raw_amount: raw_amount.to_string(),
            description: description.clone(),
            column_group: group.clone(),
            source_table: 0,
        };
        let Some(amount) = sign::resolve(&candidate, TableKind::Transaction) else {
            continue;
        };

        out.push(Transaction {
            date,
            description: clean_description(&description),
            amount,
        });
    }

    debug!(count = out.len(), "parsed transactions from CSV");
    Ok(out)
}

fn parse_csv_date(raw: &str, config: &ExtractConfig) -> Option<NaiveDate> {
    for fmt in ["%m/%d/%Y", "%Y-%m-%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    parse_statement_date(raw, None, config.assume_year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_export() {
        let csv_text = "Date,Description,Amount\n\
            04/24/2025,ATM WITHDRAWAL,-200.00\n\
            04/25/2025,PAYROLL ACME INC,1500.00\n";
        let txns = parse_csv_from_reader(csv_text.as_bytes(), &ExtractConfig::default()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].amount, -200.0);
        assert_eq!(txns[1].amount, 1500.0);
        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2025, 4, 24).unwrap());
    }

    #[test]
    fn test_header_synonyms() {
        let csv_text = "Posting Date,Memo,Transaction Amount\n\
            2025-05-13,Check #9339,14.99\n";
        let txns = parse_csv_from_reader(csv_text.as_bytes(), &ExtractConfig::default()).unwrap();
        assert_eq!(txns.len(), 1);
        // Sign-less exports lean on description keywords.
        assert_eq!(txns[0].amount, -14.99);
        assert_eq!(txns[0].description, "Check #9339");
    }

    #[test]
    fn test_debit_amount_header_acts_as_group() {
        let csv_text = "Date,Description,Debit\n\
            04/24/2025,TRANSFER,35.00\n";
        let txns = parse_csv_from_reader(csv_text.as_bytes(), &ExtractConfig::default()).unwrap();
        assert_eq!(txns[0].amount, -35.0);
    }

    #[test]
    fn test_reference_column_names_checks() {
        let csv_text = "Date,Amount,Check Number\n\
            04/24/2025,14.99,9342\n";
        let txns = parse_csv_from_reader(csv_text.as_bytes(), &ExtractConfig::default()).unwrap();
        assert_eq!(txns[0].description, "Check #9342");
        assert_eq!(txns[0].amount, -14.99);
    }

    #[test]
    fn test_skips_malformed_rows() {
        let csv_text = "Date,Description,Amount\n\
            not-a-date,JUNK,1.00\n\
            04/24/2025,REAL ROW,2.00\n\
            04/25/2025,NO AMOUNT,\n";
        let txns = parse_csv_from_reader(csv_text.as_bytes(), &ExtractConfig::default()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "REAL ROW");
    }

    #[test]
    fn test_unusable_header_is_an_error() {
        let csv_text = "Foo,Bar\n1,2\n";
        assert!(parse_csv_from_reader(csv_text.as_bytes(), &ExtractConfig::default()).is_err());
    }
}
