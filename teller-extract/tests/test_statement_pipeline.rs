//! End-to-end pipeline tests over realistic statement fixtures.

use std::cell::RefCell;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use teller_core::{ExtractConfig, RawTable};
use teller_extract::{StatementExtractor, TextCompletion, reconcile};

fn table(rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

fn extractor_config() -> ExtractConfig {
    ExtractConfig {
        assume_year: Some(2025),
        ..ExtractConfig::default()
    }
}

/// Fallback double that records calls and replays a canned reply.
struct ScriptedFallback {
    reply: Result<String>,
    calls: RefCell<usize>,
}

impl ScriptedFallback {
    fn returning(reply: &str) -> Self {
        Self { reply: Ok(reply.to_string()), calls: RefCell::new(0) }
    }

    fn failing() -> Self {
        Self { reply: Err(anyhow::anyhow!("service unavailable")), calls: RefCell::new(0) }
    }

    fn calls(&self) -> usize {
        *self.calls.borrow()
    }
}

impl TextCompletion for ScriptedFallback {
    fn complete(&self, _instruction: &str, _text: &str) -> Result<String> {
        *self.calls.borrow_mut() += 1;
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(_) => bail!("service unavailable"),
        }
    }
}

#[test]
fn test_grouped_withdrawal_table_is_negative() {
    let tables = [table(&[
        &["Withdrawals / Debits.Date", "Withdrawals / Debits.Amount", "Description"],
        &["04/24", "200.00", "ATM WITHDRAWAL"],
        &["04/25", "33.82", "DEBIT CARD PURCHASE"],
    ])];
    let result = StatementExtractor::new(extractor_config()).extract(&tables, "");

    let amounts: Vec<f64> = result.transactions.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![-200.00, -33.82]);
    assert!(!result.used_fallback);
}

#[test]
fn test_deposit_group_stays_positive() {
    let tables = [table(&[
        &["Deposits / Credits.Date", "Deposits / Credits.Amount", "Description"],
        &["05/02", "100.00", "TRANSFER FROM SAVINGS"],
    ])];
    let result = StatementExtractor::new(extractor_config()).extract(&tables, "");
    assert_eq!(result.transactions[0].amount, 100.00);
}

#[test]
fn test_generic_table_uses_description_keywords() {
    let tables = [table(&[
        &["Date", "Amount", "Description"],
        &["05/13", "14.99", "Check #9339"],
        &["05/14", "200.00", "DEBIT CARD PURCHASE AT STORE"],
        &["05/15", "50.00", "REFUND - CARD CREDIT"],
    ])];
    let result = StatementExtractor::new(extractor_config()).extract(&tables, "");

    let amounts: Vec<f64> = result.transactions.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![-14.99, -200.00, 50.00]);
}

#[test]
fn test_packed_checks_row_splits_into_three_debits() {
    let tables = [table(&[
        &["Checks", "Date Paid", "Amount", "Number", "Date Paid", "Amount"],
        &["9338 i", "05/16", "200.00", "9340 i", "04/22", "200.00", "9341 i", "05/14", "200.00"],
    ])];
    let result = StatementExtractor::new(extractor_config()).extract(&tables, "");

    let descriptions: Vec<&str> =
        result.transactions.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, vec!["Check #9338", "Check #9340", "Check #9341"]);
    assert!(result.transactions.iter().all(|t| t.amount == -200.00));
}

#[test]
fn test_balance_summary_table_is_excluded() {
    let tables = [
        table(&[
            &["Daily Balance Summary", "Date", "Amount"],
            &["04/22", "74,260.12", ""],
            &["04/23", "74,560.12", ""],
        ]),
        table(&[
            &["Date", "Amount", "Description"],
            &["04/24", "12.00", "DEBIT CARD PURCHASE"],
        ]),
    ];
    let result = StatementExtractor::new(extractor_config()).extract(&tables, "");
    assert_eq!(result.transactions.len(), 1);
    assert_eq!(result.transactions[0].amount, -12.00);
}

#[test]
fn test_balance_rows_inside_transaction_table_are_dropped() {
    let tables = [table(&[
        &["Date", "Amount", "Description"],
        &["04/22", "74,260.12", "OPENING ENTRY"],
        &["04/23", "15.00", "Daily balance adjustment"],
        &["04/24", "12.00", "DEBIT CARD PURCHASE"],
    ])];
    let result = StatementExtractor::new(extractor_config()).extract(&tables, "");
    assert_eq!(result.transactions.len(), 1);
    assert_eq!(result.transactions[0].description, "PURCHASE");
    assert_eq!(result.transactions[0].amount, -12.00);
}

#[test]
fn test_statement_period_supplies_the_year() {
    let text = "Statement Period Date: 12/15/2024 - 01/14/2025\n";
    let tables = [table(&[
        &["Date", "Amount", "Description"],
        &["12/20", "10.00", "DEBIT CARD PURCHASE"],
        &["01/05", "20.00", "DEBIT CARD PURCHASE"],
    ])];
    let result = StatementExtractor::new(ExtractConfig::default()).extract(&tables, text);

    assert_eq!(result.transactions[0].date, NaiveDate::from_ymd_opt(2024, 12, 20).unwrap());
    assert_eq!(result.transactions[1].date, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    let period = result.meta.period.unwrap();
    assert_eq!(period.start, NaiveDate::from_ymd_opt(2024, 12, 15).unwrap());
}

#[test]
fn test_account_summary_layouts_agree_end_to_end() {
    let layout_a = "04/22 Beginning Balance $74,260.12 Number of Days in Period 30\n \
        4 Checks $(614.99)\n \
        26 Withdrawals / Debits $(4,506.60)\n \
        6 Deposits / Credits $10,794.00\n \
        05/21 Ending Balance $79,932.53";
    let layout_b = "## Account Summary - 7735938\n\n\
        $74,260.12\n\n$(614.99)\n\n$(4,506.60)\n\n$10,794.00\n\n$79,932.53\n\n\
        04/22\n\n4\n\n26\n\n6\n\n05/21\n\n\
        Beginning Balance\n\nChecks\n\nWithdrawals / Debits\n\nDeposits / Credits\n\nEnding Balance";

    let extractor = StatementExtractor::new(extractor_config());
    let a = extractor.extract(&[], layout_a).account_summary.unwrap();
    let b = extractor.extract(&[], layout_b).account_summary.unwrap();

    assert_eq!(a, b);
    assert_eq!(a.beginning_balance, Some(74_260.12));
    assert_eq!(a.ending_balance, Some(79_932.53));
    assert_eq!(a.checks.unwrap().count, 4);
    assert_eq!(a.withdrawals.unwrap().total, 4_506.60);
    assert_eq!(a.deposits.unwrap().total, 10_794.00);
}

#[test]
fn test_text_lines_parse_when_tables_fail() {
    let text = "Statement Period Date: 04/22/2025 - 05/21/2025\n\
        Withdrawals / Debits\n\
        05/05 9.53 DEBIT CARD PURCHASE GROCER\n\
        05/06 120.00 ATM WITHDRAWAL\n";
    let fallback = ScriptedFallback::returning("[]");
    let extractor = StatementExtractor::with_fallback(extractor_config(), &fallback);
    let result = extractor.extract(&[], text);

    assert_eq!(result.transactions.len(), 2);
    assert!(!result.used_fallback);
    // Structural extraction succeeded, so the service was never consulted.
    assert_eq!(fallback.calls(), 0);
}

#[test]
fn test_fallback_is_not_invoked_when_tables_succeed() {
    let tables = [table(&[
        &["Date", "Amount", "Description"],
        &["05/13", "14.99", "Check #9339"],
    ])];
    let fallback = ScriptedFallback::returning("[]");
    let extractor = StatementExtractor::with_fallback(extractor_config(), &fallback);
    let result = extractor.extract(&tables, "no transactions in this text");

    assert_eq!(result.transactions.len(), 1);
    assert!(!result.used_fallback);
    assert_eq!(fallback.calls(), 0);
}

#[test]
fn test_fallback_reply_is_coerced() {
    let fallback = ScriptedFallback::returning(
        r#"[
            {"date": "2025-05-13", "description": "Check #9339", "amount": -14.99},
            {"date": "bogus", "description": "dropped", "amount": 1.00},
            {"date": "2025-05-14", "description": "missing amount"}
        ]"#,
    );
    let extractor = StatementExtractor::with_fallback(extractor_config(), &fallback);
    let result = extractor.extract(&[], "unparseable scan noise");

    assert!(result.used_fallback);
    assert_eq!(fallback.calls(), 1);
    assert_eq!(result.transactions.len(), 1);
    assert_eq!(result.transactions[0].amount, -14.99);
}

#[test]
fn test_fallback_failure_degrades_to_empty() {
    let fallback = ScriptedFallback::failing();
    let extractor = StatementExtractor::with_fallback(extractor_config(), &fallback);
    let result = extractor.extract(&[], "unparseable scan noise");

    assert!(result.used_fallback);
    assert_eq!(fallback.calls(), 1);
    assert!(result.transactions.is_empty());
    assert!(result.account_summary.is_none());
}

#[test]
fn test_no_fallback_configured_yields_empty() {
    let result = StatementExtractor::new(extractor_config()).extract(&[], "nothing here");
    assert!(result.transactions.is_empty());
    assert!(!result.used_fallback);
}

#[test]
fn test_extraction_is_idempotent() {
    let tables = [table(&[
        &["Withdrawals / Debits.Date", "Withdrawals / Debits.Amount", "Description"],
        &["04/24", "200.00", "ATM WITHDRAWAL"],
    ])];
    let text = "Statement Period Date: 04/22/2025 - 05/21/2025\n\
        04/22 Beginning Balance $74,260.12\n\
        05/21 Ending Balance $74,060.12";
    let extractor = StatementExtractor::new(ExtractConfig::default());

    let first = extractor.extract(&tables, text);
    let second = extractor.extract(&tables, text);
    assert_eq!(first, second);
}

#[test]
fn test_full_statement_reconciles() {
    let text = "Statement Period Date: 04/22/2025 - 05/21/2025\n\
        04/22 Beginning Balance $74,260.12\n\
        1 Checks $(200.00)\n\
        1 Withdrawals / Debits $(33.82)\n\
        1 Deposits / Credits $100.00\n\
        05/21 Ending Balance $74,126.30";
    let tables = [
        table(&[
            &["Withdrawals / Debits.Date", "Withdrawals / Debits.Amount", "Description"],
            &["04/25", "33.82", "DEBIT CARD PURCHASE"],
        ]),
        table(&[
            &["Deposits / Credits.Date", "Deposits / Credits.Amount", "Description"],
            &["05/02", "100.00", "TRANSFER FROM SAVINGS"],
        ]),
        table(&[&["Checks", "Date Paid", "Amount"], &["9338 i", "05/16", "200.00"]]),
    ];
    let result = StatementExtractor::new(ExtractConfig::default()).extract(&tables, text);

    assert_eq!(result.transactions.len(), 3);
    let summary = result.account_summary.as_ref().unwrap();
    let r = reconcile(summary, &result.transactions).unwrap();
    assert!(r.balanced, "difference was {}", r.difference);
}
