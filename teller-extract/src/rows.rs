//! Row-to-candidate splitting, including packed check triplets.
//!
//! Checks tables save vertical space by packing repeating
//! `(number, date, amount)` triplets into one physical row:
//!
//!   9338 i | 05/16 | 200.00 | 9340 i | 04/22 | 200.00 | 9341 i | 05/14 | 200.00
//!
//! Such rows split into one candidate per triplet.

use once_cell::sync::Lazy;
use regex::Regex;
use teller_core::{is_amount_like, is_date_like};

use crate::tables::TableLayout;

/// Check-number cell: digits with an optional trailing paid marker
/// (`9338 i`, `9342*i`).
static CHECK_NUMBER_CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,8})\s*\*?\s*[A-Za-z]?\s*$").unwrap());

/// An unresolved (date, amount, description) tuple. Sign inference happens
/// later, exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCandidate {
    pub raw_date: String,
    pub raw_amount: String,
    pub description: String,
    pub column_group: Option<String>,
    pub source_table: usize,
}

/// Split one data row into zero or more candidates. Rows with no
/// discoverable date or amount are dropped silently.
pub fn split_row(row: &[String], layout: &TableLayout, source_table: usize) -> Vec<TransactionCandidate> {
    if row.iter().all(|c| c.trim().is_empty()) {
        return Vec::new();
    }
    if let Some(cands) = split_check_triplets(row, source_table) {
        return cands;
    }
    if layout.has_groups() {
        return split_grouped(row, layout, source_table);
    }
    split_generic(row, source_table).into_iter().collect()
}

/// Detect and split a repeated-triplet row. Fires only when the row length
/// is an exact multiple of 3 and every third cell starting at offset 0 is a
/// check-number token; anything else falls through to ordinary handling.
fn split_check_triplets(row: &[String], source_table: usize) -> Option<Vec<TransactionCandidate>> {
    if row.len() < 3 || row.len() % 3 != 0 {
        return None;
    }
    if !row
        .iter()
        .step_by(3)
        .all(|cell| CHECK_NUMBER_CELL_RE.is_match(cell))
    {
        return None;
    }

    let mut out = Vec::with_capacity(row.len() / 3);
    for triplet in row.chunks(3) {
        let number = match CHECK_NUMBER_CELL_RE.captures(&triplet[0]) {
            Some(caps) => caps[1].to_string(),
            None => continue,
        };
        let date = triplet[1].trim();
        let amount = triplet[2].trim();
        if !is_date_like(date) || amount.is_empty() {
            continue;
        }
        out.push(TransactionCandidate {
            raw_date: date.to_string(),
            raw_amount: amount.to_string(),
            description: format!("Check #{number}"),
            column_group: None,
            source_table,
        });
    }
    // A row that merely starts with digits but carries no usable triplets
    // was not a checks row after all.
    if out.is_empty() { None } else { Some(out) }
}

/// One candidate per column group that carries both a date and an amount in
/// this row. Ungrouped cells become shared description text.
fn split_grouped(row: &[String], layout: &TableLayout, source_table: usize) -> Vec<TransactionCandidate> {
    let cell = |idx: usize| row.get(idx).map(|c| c.trim()).unwrap_or("");

    let shared_desc: Vec<&str> = layout
        .ungrouped()
        .into_iter()
        .map(cell)
        .filter(|c| !c.is_empty())
        .collect();

    let mut out = Vec::new();
    for group in layout.groups() {
        let Some(date_idx) = layout.field_in_group(group, "date") else {
            continue;
        };
        let Some(amount_idx) = layout.field_in_group(group, "amount") else {
            continue;
        };
        let date = cell(date_idx);
        let amount = cell(amount_idx);
        if date.is_empty() || amount.is_empty() {
            continue;
        }

        // Any other field of this group (a memo column, say) joins the
        // shared description.
        let mut desc_parts: Vec<&str> = layout
            .columns
            .iter()
            .enumerate()
            .filter(|(i, c)| {
                c.group.as_deref() == Some(group) && *i != date_idx && *i != amount_idx
            })
            .map(|(i, _)| cell(i))
            .filter(|c| !c.is_empty())
            .collect();
        desc_parts.extend(&shared_desc);

        out.push(TransactionCandidate {
            raw_date: date.to_string(),
            raw_amount: amount.to_string(),
            description: desc_parts.join(" "),
            column_group: Some(group.to_string()),
            source_table,
        });
    }
    out
}

/// Generic row: date-like cell + amount-like cell, the rest is description.
fn split_generic(row: &[String], source_table: usize) -> Option<TransactionCandidate> {
    let cells: Vec<&str> = row.iter().map(|c| c.trim()).collect();

    // Common three-column layout first: Date, Amount, Description.
    if cells.len() >= 3 && is_date_like(cells[0]) && is_amount_like(cells[1]) {
        return Some(TransactionCandidate {
            raw_date: cells[0].to_string(),
            raw_amount: cells[1].to_string(),
            description: cells[2..]
                .iter()
                .filter(|c| !c.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" "),
            column_group: None,
            source_table,
        });
    }

    // Otherwise hunt for the date and amount wherever they sit.
    let date_idx = cells.iter().position(|c| is_date_like(c))?;
    let amount_idx = cells
        .iter()
        .enumerate()
        .position(|(i, c)| i != date_idx && is_amount_like(c))?;

    let description = cells
        .iter()
        .enumerate()
        .filter(|(i, c)| *i != date_idx && *i != amount_idx && !c.is_empty())
        .map(|(_, c)| *c)
        .collect::<Vec<_>>()
        .join(" ");

    Some(TransactionCandidate {
        raw_date: cells[date_idx].to_string(),
        raw_amount: cells[amount_idx].to_string(),
        description,
        column_group: None,
        source_table,
    })
}
