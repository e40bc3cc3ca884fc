//! Account-summary extraction from statement text.
//!
//! The layout extractor renders the same summary block two different ways:
//!
//! Layout A keeps each label next to its value:
//!
//!   04/22 Beginning Balance $74,260.12
//!   4 Checks $(614.99)
//!   26 Withdrawals / Debits $(4,506.60)
//!   6 Deposits / Credits $10,794.00
//!   05/21 Ending Balance $79,932.53
//!
//! Layout B spills values first and labels last; the correspondence is
//! purely positional: five amounts, then three counts, then the labels, all
//! in the same logical order (beginning, checks, withdrawals, deposits,
//! ending).
//!
//! The two strategies run in sequence and are independently testable; B is
//! only attempted when A fails to recover both balances.

use once_cell::sync::Lazy;
use regex::Regex;
use teller_core::{AccountSummary, CategorySummary, parse_amount};
use tracing::debug;

static BEGINNING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)beginning\s+balance\s+\$?([\d,]+\.\d{2})").unwrap());
static ENDING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ending\s+balance\s+\$?([\d,]+\.\d{2})").unwrap());
static CHECKS_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s+checks\s+\$?\(?([\d,]+\.\d{2})\)?").unwrap());
static WITHDRAWALS_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s+withdrawals(?:\s*(?:/|and)\s*debits)?\s+\$?\(?([\d,]+\.\d{2})\)?")
        .unwrap()
});
static DEPOSITS_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s+deposits(?:\s*(?:/|and)\s*credits)?\s+\$?\(?([\d,]+\.\d{2})\)?")
        .unwrap()
});

/// Dollar tokens for the positional layout; parentheses may sit inside the
/// dollar sign: `$(614.99)`.
static DOLLAR_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s*\(?\s*[\d,]+\.\d{2}\s*\)?").unwrap());
/// A line that is nothing but a small integer is a category count.
static COUNT_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*(\d{1,6})\s*$").unwrap());

static SUMMARY_HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)account\s+summary").unwrap());

/// Extract the account summary, trying the label-adjacent layout first and
/// the positional values-then-labels layout second. Returns None when
/// neither recovers both a beginning and an ending balance.
pub fn extract_account_summary(text: &str) -> Option<AccountSummary> {
    let a = extract_label_adjacent(text);
    if a.has_balances() {
        debug!("account summary recovered from label-adjacent layout");
        return Some(a);
    }
    let b = extract_positional(text);
    if b.has_balances() {
        debug!("account summary recovered from positional layout");
        return Some(b);
    }
    debug!("no account summary in statement text");
    None
}

/// Layout A: one regex pass per field, label and value on the same span.
fn extract_label_adjacent(text: &str) -> AccountSummary {
    let mut summary = AccountSummary::default();

    if let Some(caps) = BEGINNING_RE.captures(text) {
        summary.beginning_balance = parse_amount(&caps[1]).map(|p| p.value);
    }
    if let Some(caps) = ENDING_RE.captures(text) {
        summary.ending_balance = parse_amount(&caps[1]).map(|p| p.value);
    }
    summary.checks = category_from(&CHECKS_LINE_RE, text);
    summary.withdrawals = category_from(&WITHDRAWALS_LINE_RE, text);
    summary.deposits = category_from(&DEPOSITS_LINE_RE, text);
    summary
}

fn category_from(re: &Regex, text: &str) -> Option<CategorySummary> {
    let caps = re.captures(text)?;
    let count: u32 = caps[1].parse().ok()?;
    let total = parse_amount(&caps[2])?.value;
    Some(CategorySummary { count, total })
}

/// Layout B: collect dollar tokens and standalone counts in document order
/// and zip them into the fixed logical slots.
fn extract_positional(text: &str) -> AccountSummary {
    let window = summary_window(text);
    let lower = window.to_lowercase();

    let mut summary = AccountSummary::default();
    // Without the balance labels somewhere in the window this is just a
    // pile of dollar amounts, not a summary block.
    if !lower.contains("beginning balance") || !lower.contains("ending balance") {
        return summary;
    }

    let amounts: Vec<f64> = DOLLAR_TOKEN_RE
        .find_iter(window)
        .filter_map(|m| parse_amount(m.as_str()))
        .map(|p| p.value)
        .collect();
    if amounts.len() < 5 {
        return summary;
    }

    let counts: Vec<u32> = COUNT_LINE_RE
        .captures_iter(window)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();

    summary.beginning_balance = Some(amounts[0]);
    summary.ending_balance = Some(amounts[4]);
    if counts.len() >= 3 {
        summary.checks = Some(CategorySummary { count: counts[0], total: amounts[1] });
        summary.withdrawals = Some(CategorySummary { count: counts[1], total: amounts[2] });
        summary.deposits = Some(CategorySummary { count: counts[2], total: amounts[3] });
    }
    summary
}

/// Scope the positional scan to the summary block when the document carries
/// an "Account Summary" heading; otherwise scan everything we were given.
fn summary_window(text: &str) -> &str {
    match SUMMARY_HEADING_RE.find(text) {
        Some(m) => &text[m.start()..],
        None => text,
    }
}
