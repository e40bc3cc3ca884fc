//! teller-extract: the statement-extraction pipeline.
//!
//! Raw tables and text from the layout extractor go in; a sign-resolved
//! transaction list, an optional account summary, and statement metadata
//! come out. The generative fallback is an injected capability, never a
//! hard dependency.

pub mod csv_import;
pub mod filter;
pub mod metadata;
pub mod pipeline;
pub mod reconcile;
pub mod rows;
pub mod sign;
pub mod summary;
pub mod tables;
pub mod text;

pub use csv_import::{parse_csv_from_reader, parse_csv_statement};
pub use metadata::extract_meta;
pub use pipeline::{FALLBACK_INSTRUCTION, StatementExtractor, TextCompletion};
pub use reconcile::{Reconciliation, net_from_summary, reconcile};
pub use rows::TransactionCandidate;
pub use summary::extract_account_summary;
pub use tables::{TableKind, TableLayout, classify};
