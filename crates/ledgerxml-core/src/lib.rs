//! Core types for ledgerxml
//!
//! This crate provides the in-memory model of a ledger exported as XML:
//!
//! - [`Commodity`] - A unit of value (currency, stock, ...) identified by its symbol
//! - [`Account`] - A node in the hierarchical chart of accounts
//! - [`Posting`] - One account/quantity/commodity line of a transaction
//! - [`Transaction`] - A dated, payee-labelled group of postings
//! - [`Ledger`] - The complete model: commodities, accounts, transactions
//! - [`TransactionList`] - A filterable view over a ledger's transactions
//!
//! # Example
//!
//! ```
//! use ledgerxml_core::{Account, Commodity, Ledger, Posting, Transaction};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//!
//! let usd = Arc::new(Commodity::new("USD", ""));
//! let cash = Arc::new(Account::new("a1", "Cash", "Assets:Cash"));
//! let food = Arc::new(Account::new("a2", "Food", "Expenses:Food"));
//!
//! let txn = Transaction::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), "Grocer")
//!     .with_posting(Posting::new(Arc::clone(&food), Arc::clone(&usd), dec!(12.50)))
//!     .with_posting(Posting::new(Arc::clone(&cash), Arc::clone(&usd), dec!(-12.50)));
//!
//! let mut ledger = Ledger::new("3.3");
//! ledger.commodities.push(usd);
//! ledger.accounts.extend([cash, food]);
//! ledger.push_transaction(txn);
//!
//! let expenses = ledger.transactions().filter_by_account_pattern("^Expenses").unwrap();
//! assert_eq!(expenses.len(), 1);
//! assert_eq!(ledger.transactions().totals().unwrap()["USD"], dec!(0));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod commodity;
pub mod ledger;
pub mod list;
pub mod transaction;

pub use account::Account;
pub use commodity::Commodity;
pub use ledger::Ledger;
pub use list::{parse_query_date, QueryError, Totals, TransactionList};
pub use transaction::{Posting, Transaction};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use regex::Regex;
pub use rust_decimal::Decimal;
