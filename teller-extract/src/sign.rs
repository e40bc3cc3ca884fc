//! Sign inference: decide whether a candidate's magnitude is money in or
//! money out.
//!
//! Evidence is ranked: column-group labels are the most reliable, then the
//! punctuation of the raw amount itself, then description keywords, then a
//! default of positive. Each amount is resolved exactly once.

use once_cell::sync::Lazy;
use regex::Regex;
use teller_core::parse_amount;

use crate::rows::TransactionCandidate;
use crate::tables::TableKind;

const NEGATIVE_GROUPS: &[&str] = &["checks", "withdrawal", "debit"];
const POSITIVE_GROUPS: &[&str] = &["deposit", "credit"];

const CHECK_MARKERS: &[&str] = &["check #", "ck #"];
const NEGATIVE_KEYWORDS: &[&str] = &["debit", "purchase", "withdrawal", "atm"];
const POSITIVE_KEYWORDS: &[&str] = &["refund", "credit", "deposit"];

/// "pos" must match as a word; as a substring it would hit "deposit".
static POS_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bpos\b").unwrap());

/// Resolve the signed amount for a candidate. Returns None when the raw
/// amount does not parse as money.
pub fn resolve(candidate: &TransactionCandidate, kind: TableKind) -> Option<f64> {
    let parsed = parse_amount(&candidate.raw_amount)?;

    // 1–2. Column-group evidence. A checks table acts as an implicit
    // "Checks" group for every row it holds.
    let group = candidate
        .column_group
        .as_deref()
        .map(str::to_lowercase)
        .or_else(|| (kind == TableKind::Checks).then(|| "checks".to_string()));
    if let Some(g) = group {
        if NEGATIVE_GROUPS.iter().any(|k| g.contains(k)) {
            return Some(-parsed.value);
        }
        if POSITIVE_GROUPS.iter().any(|k| g.contains(k)) {
            return Some(parsed.value);
        }
    }

    // 3. Parentheses or an explicit minus on the raw amount.
    if parsed.negative_hint {
        return Some(-parsed.value);
    }

    // 4. Description keywords, in a fixed order, first match wins.
    let desc = candidate.description.to_lowercase();
    if CHECK_MARKERS.iter().any(|m| desc.contains(m)) {
        return Some(-parsed.value);
    }
    if NEGATIVE_KEYWORDS.iter().any(|k| desc.contains(k)) || POS_WORD_RE.is_match(&desc) {
        return Some(-parsed.value);
    }
    if POSITIVE_KEYWORDS.iter().any(|k| desc.contains(k)) {
        return Some(parsed.value);
    }

    // 5. No evidence at all: assume a credit. This is the least-informed
    // branch and the most likely source of misclassification.
    Some(parsed.value)
}
