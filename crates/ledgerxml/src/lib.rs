//! Command-line tools for ledger XML exports.
//!
//! The `ledgerxml` binary loads a journal through `ledger xml` (or reads an
//! XML export directly with `--xml`) and prints reports:
//!
//! - `stats`: version, counts and date span
//! - `accounts`: the account tree
//! - `commodities`: known commodities and their flags
//! - `register`: transactions, optionally filtered by account and date
//! - `totals`: per-commodity sums, optionally filtered by account and date
//!
//! # Example Usage
//!
//! ```bash
//! ledgerxml journal.ledger totals --account '^Expenses' --begin 2024-01-01 --end 2024-02-01
//! ledgerxml --xml export.xml register --account Food
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
