//! Core data model for the extraction pipeline.
//!
//! Every value here is built fresh per document parse; nothing is cached or
//! mutated across documents.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::StatementPeriod;

/// One table as emitted by the upstream layout extractor: rows of string
/// cells, with the first row treated as the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// The header row, if the table has any rows at all.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(|r| r.as_slice())
    }

    /// Data rows (everything after the header).
    pub fn body(&self) -> &[Vec<String>] {
        if self.rows.len() > 1 { &self.rows[1..] } else { &[] }
    }
}

/// A fully resolved transaction.
///
/// The sign has been decided exactly once by the pipeline: negative means
/// money out (debit), positive means money in (credit). Downstream consumers
/// never re-interpret it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
}

/// Count and total for one summary category (checks, withdrawals, deposits).
/// Totals are magnitudes; the category itself implies direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub count: u32,
    pub total: f64,
}

/// Balances and per-category activity as reported by the statement itself,
/// independent of the parsed line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub beginning_balance: Option<f64>,
    pub ending_balance: Option<f64>,
    pub checks: Option<CategorySummary>,
    pub withdrawals: Option<CategorySummary>,
    pub deposits: Option<CategorySummary>,
}

impl AccountSummary {
    /// True when both balances were recovered, the minimum for the summary
    /// to be useful at all.
    pub fn has_balances(&self) -> bool {
        self.beginning_balance.is_some() && self.ending_balance.is_some()
    }
}

/// Statement-level metadata scraped from the document text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementMeta {
    pub period: Option<StatementPeriod>,
    pub account_number: Option<String>,
    pub account_type: Option<String>,
    pub bank_name: Option<String>,
}

/// The sole output of a document parse; constructed once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub transactions: Vec<Transaction>,
    pub account_summary: Option<AccountSummary>,
    pub meta: StatementMeta,
    /// True when the generative fallback produced the transaction list.
    pub used_fallback: bool,
}
