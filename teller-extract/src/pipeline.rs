//! The extraction pipeline: structural passes first, generative fallback
//! last.
//!
//! PRIMARY runs the table pipeline (classify → split → sign → filter), then
//! the free-text line parser over the same document. Only when both come up
//! empty is the injected completion service consulted, and any failure there
//! degrades to an empty transaction list; a statement we cannot parse is
//! never an error.

use anyhow::Result;
use serde_json::Value;
use teller_core::{
    ExtractConfig, ExtractionResult, RawTable, StatementPeriod, Transaction, parse_amount,
    parse_statement_date,
};
use tracing::{debug, info, warn};

use crate::filter;
use crate::metadata;
use crate::rows;
use crate::sign;
use crate::summary;
use crate::tables::{self, TableKind, TableLayout};
use crate::text;

/// Generative text-completion capability. Injected so tests substitute a
/// deterministic stub and hosts choose their own client and timeout policy.
pub trait TextCompletion {
    /// Submit an instruction plus statement text; returns the service's raw
    /// (JSON-shaped) reply.
    fn complete(&self, instruction: &str, text: &str) -> Result<String>;
}

/// Instruction sent with the statement text on the fallback path. The sign
/// convention must be stated explicitly or the model will guess.
pub const FALLBACK_INSTRUCTION: &str = "Extract bank statement transactions and output ONLY JSON.\n\
Respond with an array of objects: \
[{ \"date\": \"YYYY-MM-DD or MM/DD/YYYY\", \"description\": \"text\", \"amount\": number }]\n\
- Use negative amounts for debits/withdrawals, positive for credits/deposits.\n\
- Do not invent rows; only include real transactions.\n\
- If you cannot find transactions, return an empty array.";

/// One-document extraction driver. Stateless across documents; build one and
/// reuse it freely.
pub struct StatementExtractor<'a> {
    config: ExtractConfig,
    fallback: Option<&'a dyn TextCompletion>,
}

impl<'a> StatementExtractor<'a> {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config, fallback: None }
    }

    pub fn with_fallback(config: ExtractConfig, fallback: &'a dyn TextCompletion) -> Self {
        Self { config, fallback: Some(fallback) }
    }

    /// Run the full pipeline over one document's tables and text.
    pub fn extract(&self, raw_tables: &[RawTable], raw_text: &str) -> ExtractionResult {
        let text_blob = text::clean_spaced_text(raw_text);
        let meta = metadata::extract_meta(&text_blob);
        let period = meta.period;
        let account_summary = summary::extract_account_summary(&text_blob);

        let mut transactions = self.extract_from_tables(raw_tables, period.as_ref());
        if transactions.is_empty() {
            debug!("tables yielded nothing, trying text lines");
            transactions = text::parse_text_transactions(&text_blob, period.as_ref(), &self.config);
        }

        let mut used_fallback = false;
        if transactions.is_empty() {
            if let Some(fallback) = self.fallback {
                used_fallback = true;
                transactions = self.run_fallback(fallback, &text_blob, period.as_ref());
            }
        }

        info!(
            count = transactions.len(),
            used_fallback,
            has_summary = account_summary.is_some(),
            "statement extraction finished"
        );
        ExtractionResult { transactions, account_summary, meta, used_fallback }
    }

    fn extract_from_tables(
        &self,
        raw_tables: &[RawTable],
        period: Option<&StatementPeriod>,
    ) -> Vec<Transaction> {
        let mut out = Vec::new();
        for (table_idx, table) in raw_tables.iter().enumerate() {
            let kind = tables::classify(table);
            match kind {
                TableKind::BalanceSummary | TableKind::Unknown => {
                    debug!(table_idx, ?kind, "skipping non-transaction table");
                    continue;
                }
                TableKind::Transaction | TableKind::Checks => {}
            }
            let layout = TableLayout::from_header(table.header().unwrap_or(&[]));

            for row in table.body() {
                for candidate in rows::split_row(row, &layout, table_idx) {
                    let Some(amount) = sign::resolve(&candidate, kind) else {
                        continue;
                    };
                    if !filter::keep(amount, &candidate.description, kind, &self.config) {
                        continue;
                    }
                    let Some(date) =
                        parse_statement_date(&candidate.raw_date, period, self.config.assume_year)
                    else {
                        continue;
                    };
                    out.push(Transaction {
                        date,
                        description: text::clean_description(&candidate.description),
                        amount,
                    });
                }
            }
        }
        out
    }

    fn run_fallback(
        &self,
        fallback: &dyn TextCompletion,
        text_blob: &str,
        period: Option<&StatementPeriod>,
    ) -> Vec<Transaction> {
        let window = tail_window(text_blob, self.config.fallback_text_window);
        let reply = match fallback.complete(FALLBACK_INSTRUCTION, window) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "generative fallback call failed");
                return Vec::new();
            }
        };
        coerce_fallback_reply(&reply, period, &self.config)
    }
}

/// Keep the last `max_chars` characters of the text; transaction sections
/// tend to appear late in a statement.
fn tail_window(text: &str, max_chars: usize) -> &str {
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices().rev() {
        count += 1;
        start = idx;
        if count == max_chars {
            break;
        }
    }
    if count < max_chars { text } else { &text[start..] }
}

/// Coerce the service's reply into transactions. Accepts a bare array or an
/// object with a `transactions` key; elements without a date or a numeric
/// amount are dropped, a missing description becomes the empty string.
fn coerce_fallback_reply(
    reply: &str,
    period: Option<&StatementPeriod>,
    config: &ExtractConfig,
) -> Vec<Transaction> {
    let value: Value = match serde_json::from_str(reply.trim()) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "generative fallback reply was not JSON");
            return Vec::new();
        }
    };

    let items: &[Value] = match &value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("transactions")
            .and_then(Value::as_array)
            .map_or(&[][..], |items| items.as_slice()),
        _ => &[],
    };

    let mut out = Vec::new();
    for item in items {
        let Some(date) = item
            .get("date")
            .or_else(|| item.get("transaction_date"))
            .and_then(Value::as_str)
            .and_then(|raw| parse_fallback_date(raw, period, config))
        else {
            continue;
        };
        let Some(amount) = fallback_amount(item.get("amount")) else {
            continue;
        };
        let description = item
            .get("description")
            .or_else(|| item.get("memo"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        out.push(Transaction { date, description, amount });
    }
    debug!(count = out.len(), "coerced transactions from fallback reply");
    out
}

fn parse_fallback_date(
    raw: &str,
    period: Option<&StatementPeriod>,
    config: &ExtractConfig,
) -> Option<chrono::NaiveDate> {
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw.trim(), fmt) {
            return Some(date);
        }
    }
    parse_statement_date(raw, period, config.assume_year)
}

fn fallback_amount(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount(s).map(|p| p.signed()),
        _ => None,
    }
}
