//! Cross-check extracted line items against the statement's own summary.
//!
//! `ending = beginning + net flows` should hold to the cent when extraction
//! caught everything; the difference is reported, never enforced.

use serde::Serialize;
use teller_core::{AccountSummary, Transaction};

const TOLERANCE: f64 = 0.005;

/// Outcome of reconciling line items against the reported balances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub computed_ending: f64,
    pub reported_ending: f64,
    pub difference: f64,
    pub balanced: bool,
}

/// Reconcile, or None when either balance is missing from the summary.
pub fn reconcile(summary: &AccountSummary, transactions: &[Transaction]) -> Option<Reconciliation> {
    let beginning = summary.beginning_balance?;
    let reported_ending = summary.ending_balance?;

    let net: f64 = transactions.iter().map(|t| t.amount).sum();
    let computed_ending = round_cents(beginning + net);
    let difference = round_cents(reported_ending - computed_ending);

    Some(Reconciliation {
        computed_ending,
        reported_ending,
        difference,
        balanced: difference.abs() < TOLERANCE,
    })
}

/// Net change implied by the summary's own category totals
/// (deposits − withdrawals − checks), when all three are present.
pub fn net_from_summary(summary: &AccountSummary) -> Option<f64> {
    let checks = summary.checks?.total;
    let withdrawals = summary.withdrawals?.total;
    let deposits = summary.deposits?.total;
    Some(round_cents(deposits - withdrawals - checks))
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
