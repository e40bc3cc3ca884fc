//! Table classification and column-group detection.
//!
//! The layout extractor emits qualified header cells like
//! `"Withdrawals / Debits.Amount"`; the dotted prefix names the column group.
//! Headers are parsed once here so no downstream stage re-derives group
//! membership.

use teller_core::RawTable;

/// What a raw table holds, decided from its header row. Rules are checked
/// top to bottom, first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Ordinary transaction rows, possibly organized into column groups.
    Transaction,
    /// A checks table; every row is a paid check (a debit).
    Checks,
    /// Running or periodic balances, never transactions.
    BalanceSummary,
    /// Nothing we recognize; excluded from output.
    Unknown,
}

const BALANCE_HEADERS: &[&str] = &["daily balance summary", "balance summary", "account summary"];
const TRANSACTION_HEADERS: &[&str] = &["withdrawal", "deposit", "debit", "credit", "date"];

/// Classify one raw table from its header keywords.
pub fn classify(table: &RawTable) -> TableKind {
    let Some(header) = table.header() else {
        return TableKind::Unknown;
    };
    let joined = header.join(" ").to_lowercase();

    if BALANCE_HEADERS.iter().any(|k| joined.contains(k)) {
        return TableKind::BalanceSummary;
    }
    if joined.contains("checks") {
        return TableKind::Checks;
    }
    if TRANSACTION_HEADERS.iter().any(|k| joined.contains(k)) {
        return TableKind::Transaction;
    }
    TableKind::Unknown
}

/// One header cell split into its optional group label and field name.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderColumn {
    pub group: Option<String>,
    pub field: String,
}

/// Per-table column layout, parsed from the header row exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableLayout {
    pub columns: Vec<HeaderColumn>,
}

impl TableLayout {
    /// Split each header cell on the first `.` into `(group, field)`.
    /// `"Withdrawals / Debits.Amount"` → group `Withdrawals / Debits`,
    /// field `Amount`; an undotted cell is an ungrouped field.
    pub fn from_header(header: &[String]) -> Self {
        let columns = header
            .iter()
            .map(|cell| {
                let cell = cell.trim();
                match cell.split_once('.') {
                    Some((group, field)) if !group.trim().is_empty() && !field.trim().is_empty() => {
                        HeaderColumn {
                            group: Some(group.trim().to_string()),
                            field: field.trim().to_string(),
                        }
                    }
                    _ => HeaderColumn {
                        group: None,
                        field: cell.to_string(),
                    },
                }
            })
            .collect();
        Self { columns }
    }

    pub fn has_groups(&self) -> bool {
        self.columns.iter().any(|c| c.group.is_some())
    }

    /// Distinct group labels in header order.
    pub fn groups(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for col in &self.columns {
            if let Some(g) = col.group.as_deref() {
                if !out.contains(&g) {
                    out.push(g);
                }
            }
        }
        out
    }

    /// Index of the first column in `group` whose field name contains
    /// `field` (case-insensitive).
    pub fn field_in_group(&self, group: &str, field: &str) -> Option<usize> {
        let field = field.to_lowercase();
        self.columns.iter().position(|c| {
            c.group.as_deref() == Some(group) && c.field.to_lowercase().contains(&field)
        })
    }

    /// Indices of columns that belong to no group.
    pub fn ungrouped(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.group.is_none())
            .map(|(i, _)| i)
            .collect()
    }
}
