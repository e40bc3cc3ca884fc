//! Free-text transaction parsing and extractor-artifact cleanup.
//!
//! When the layout extractor fails to recognize tables, statements still
//! carry rows as plain lines:
//!
//!   05/05 9.53 DEBIT CARD PURCHASE GROCER
//!        CARD 1234
//!
//! A line opens a transaction; indented follow-on lines extend its
//! description until the next dated line.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use teller_core::{ExtractConfig, StatementPeriod, Transaction, parse_statement_date};
use tracing::debug;

use crate::filter;
use crate::rows::TransactionCandidate;
use crate::sign;
use crate::tables::TableKind;

/// `MM/DD  amount  description…`, the row shape banks print in text blocks.
static START_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<md>\d{1,2}/\d{1,2}(?:/\d{2,4})?)\s+(?P<amount>[$()\-\d,.]+)\s+(?P<desc>.*)$")
        .unwrap()
});

/// Spread-out extractor artifacts: `C u s t o m e r`, `1 2 3 4`.
static SPACED_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:[A-Za-z]\s+){2,}[A-Za-z]\b").unwrap());
static SPACED_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\d\s+){3,}\d\b").unwrap());

/// A description that is just a check number, marker and all: `9342*i`.
static BARE_CHECK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{3,8})\s*\*?\s*[is]?$").unwrap());
/// Packed multi-check fragments: `9343 i 200.00 9344 i 14.99`.
static PACKED_CHECKS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\d{3,8}\s+[is]\s+(?:\d{1,2}/\d{1,2}|[\d,]+\.\d{2})\s*)+$").unwrap()
});
static CHECK_NUMBER_IN_PACK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{3,8})\s+[is]\b").unwrap());
/// Card prefixes that carry no information once the sign is resolved.
static CARD_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:DEBIT CARD|CREDIT CARD|ACH)\s*-?\s*").unwrap());

/// Parse transactions straight out of the text blob. Sign falls back to
/// punctuation and description keywords since there are no column groups
/// out here.
pub fn parse_text_transactions(
    text: &str,
    period: Option<&StatementPeriod>,
    config: &ExtractConfig,
) -> Vec<Transaction> {
    let mut out = Vec::new();
    let mut pending: Option<(String, String, String)> = None;

    let flush = |pending: &mut Option<(String, String, String)>, out: &mut Vec<Transaction>| {
        if let Some((md, amount, desc)) = pending.take() {
            if let Some(txn) = finish_line(&md, &amount, &desc, period, config) {
                out.push(txn);
            }
        }
    };

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = START_LINE_RE.captures(line) {
            flush(&mut pending, &mut out);
            pending = Some((
                caps["md"].to_string(),
                caps["amount"].to_string(),
                caps["desc"].trim().to_string(),
            ));
        } else if let Some((_, _, desc)) = pending.as_mut() {
            // Wrapped continuation of the open row's description.
            if !desc.is_empty() {
                desc.push(' ');
            }
            desc.push_str(line);
        }
    }
    flush(&mut pending, &mut out);

    debug!(count = out.len(), "parsed transactions from text lines");
    out
}

fn finish_line(
    md: &str,
    amount: &str,
    desc: &str,
    period: Option<&StatementPeriod>,
    config: &ExtractConfig,
) -> Option<Transaction> {
    let date = parse_statement_date(md, period, config.assume_year)?;
    let candidate = TransactionCandidate {
        raw_date: md.to_string(),
        raw_amount: amount.to_string(),
        description: desc.to_string(),
        column_group: None,
        source_table: 0,
    };
    let amount = sign::resolve(&candidate, TableKind::Transaction)?;
    if !filter::keep(amount, desc, TableKind::Transaction, config) {
        return None;
    }
    Some(Transaction {
        date,
        description: clean_description(desc),
        amount,
    })
}

/// Repair spread-out extractor artifacts before any text scraping runs.
pub fn clean_spaced_text(text: &str) -> String {
    let mut lines = Vec::with_capacity(text.lines().count());
    for line in text.lines() {
        let fixed = SPACED_WORD_RE.replace_all(line, |caps: &Captures| {
            caps[0].chars().filter(|c| !c.is_whitespace()).collect::<String>()
        });
        let fixed = SPACED_NUMBER_RE.replace_all(&fixed, |caps: &Captures| {
            caps[0].chars().filter(|c| !c.is_whitespace()).collect::<String>()
        });
        lines.push(fixed.into_owned());
    }
    lines.join("\n")
}

/// Normalize a description after sign inference: collapse whitespace, give
/// bare check numbers a readable form, drop noise card prefixes.
pub fn clean_description(desc: &str) -> String {
    let collapsed = desc.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return collapsed;
    }

    if let Some(caps) = BARE_CHECK_RE.captures(&collapsed) {
        return format!("Check #{}", &caps[1]);
    }

    if PACKED_CHECKS_RE.is_match(&collapsed) {
        let numbers: Vec<String> = CHECK_NUMBER_IN_PACK_RE
            .captures_iter(&collapsed)
            .map(|caps| caps[1].to_string())
            .collect();
        match numbers.len() {
            0 => {}
            1 => return format!("Check #{}", numbers[0]),
            _ => return format!("Checks #{}", numbers.join(", #")),
        }
    }

    CARD_PREFIX_RE.replace(&collapsed, "").trim().to_string()
}
