//! teller-core: shared types and parsing utilities for statement extraction.

pub mod config;
pub mod dates;
pub mod money;
pub mod types;

pub use config::ExtractConfig;
pub use dates::{StatementPeriod, is_date_like, parse_statement_date};
pub use money::{ParsedAmount, is_amount_like, parse_amount};
pub use types::{
    AccountSummary, CategorySummary, ExtractionResult, RawTable, StatementMeta, Transaction,
};
