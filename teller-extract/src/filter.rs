//! Balance-entry filtering: running balances and summary rows are not
//! transactions and must never reach the output list.
//!
//! Runs after sign inference so the magnitude check sees the final value,
//! not the raw string.

use teller_core::ExtractConfig;

use crate::tables::TableKind;

const BALANCE_DESC_KEYWORDS: &[&str] = &["balance", "total", "summary", "daily"];

/// Keep/drop decision for a sign-resolved row.
pub fn keep(amount: f64, description: &str, kind: TableKind, config: &ExtractConfig) -> bool {
    if kind == TableKind::BalanceSummary {
        return false;
    }
    // Magnitudes past the threshold are running balances in disguise.
    if amount.abs() > config.balance_amount_threshold {
        return false;
    }
    let desc = description.to_lowercase();
    !BALANCE_DESC_KEYWORDS.iter().any(|k| desc.contains(k))
}
