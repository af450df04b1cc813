//! Transaction lists and the queries over them.
//!
//! A [`TransactionList`] is a read-only view over some of a ledger's
//! transactions. Filtering never mutates the list it is called on; it
//! returns a new list over the same ledger.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::{Ledger, Transaction};

/// Per-commodity sums, keyed by commodity symbol.
pub type Totals = BTreeMap<String, Decimal>;

/// Date formats accepted for query arguments.
const QUERY_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Errors raised by invalid query arguments.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The account pattern is not a valid regular expression.
    #[error("invalid account pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The date range is empty because it ends before it starts.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Inclusive start of the range.
        start: NaiveDate,
        /// Exclusive end of the range.
        end: NaiveDate,
    },

    /// A date argument could not be parsed.
    #[error("invalid date {0:?}: expected YYYY-MM-DD or YYYY/MM/DD")]
    InvalidDate(String),

    /// A running total left the range of `Decimal`.
    #[error("total for {symbol} overflows")]
    Overflow {
        /// Commodity whose total overflowed.
        symbol: String,
    },
}

/// Parse a date given as a query argument.
pub fn parse_query_date(text: &str) -> Result<NaiveDate, QueryError> {
    let text = text.trim();
    QUERY_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| QueryError::InvalidDate(text.to_string()))
}

/// An ordered, filterable view over transactions of a [`Ledger`].
#[derive(Debug, Clone)]
pub struct TransactionList<'a> {
    ledger: &'a Ledger,
    transactions: Vec<&'a Transaction>,
}

impl<'a> TransactionList<'a> {
    /// Create a list over the given transactions of `ledger`.
    #[must_use]
    pub const fn new(ledger: &'a Ledger, transactions: Vec<&'a Transaction>) -> Self {
        Self {
            ledger,
            transactions,
        }
    }

    /// The ledger this list belongs to.
    #[must_use]
    pub const fn ledger(&self) -> &'a Ledger {
        self.ledger
    }

    /// Number of transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Get the transaction at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a Transaction> {
        self.transactions.get(index).copied()
    }

    /// Iterate over the transactions in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Transaction> + '_ {
        self.transactions.iter().copied()
    }

    /// Append a transaction to the end of the list.
    pub fn push(&mut self, transaction: &'a Transaction) {
        self.transactions.push(transaction);
    }

    fn filtered(&self, mut keep: impl FnMut(&Transaction) -> bool) -> Self {
        let transactions = self
            .transactions
            .iter()
            .copied()
            .filter(|t| keep(*t))
            .collect();
        Self::new(self.ledger, transactions)
    }

    /// Transactions with at least one posting whose account path matches `pattern`.
    #[must_use]
    pub fn filter_by_account(&self, pattern: &Regex) -> Self {
        self.filtered(|t| t.has_account(pattern))
    }

    /// Like [`filter_by_account`](Self::filter_by_account), compiling `pattern` first.
    pub fn filter_by_account_pattern(&self, pattern: &str) -> Result<Self, QueryError> {
        let regex = Regex::new(pattern).map_err(|source| QueryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.filter_by_account(&regex))
    }

    /// Transactions dated in the half-open range `start <= date < end`.
    ///
    /// A range with `start >= end` selects nothing; use
    /// [`filter_by_date_range`](Self::filter_by_date_range) to reject
    /// inverted ranges instead.
    #[must_use]
    pub fn filter_by_date(&self, start: NaiveDate, end: NaiveDate) -> Self {
        self.filtered(|t| start <= t.date && t.date < end)
    }

    /// Like [`filter_by_date`](Self::filter_by_date), failing when `start > end`.
    pub fn filter_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, QueryError> {
        if start > end {
            return Err(QueryError::InvalidDateRange { start, end });
        }
        Ok(self.filter_by_date(start, end))
    }

    /// Sum the posted quantities per commodity symbol.
    ///
    /// Every commodity known to the ledger appears in the result, with zero
    /// when no posting in this list uses it. Fails instead of rounding when a
    /// sum does not fit in a `Decimal`.
    pub fn totals(&self) -> Result<Totals, QueryError> {
        let mut totals: Totals = self
            .ledger
            .commodities
            .iter()
            .map(|c| (c.symbol.clone(), Decimal::ZERO))
            .collect();

        for posting in self.transactions.iter().flat_map(|t| &t.postings) {
            let symbol = &posting.commodity.symbol;
            let total = totals.entry(symbol.clone()).or_insert(Decimal::ZERO);
            *total = total
                .checked_add(posting.quantity)
                .ok_or_else(|| QueryError::Overflow {
                    symbol: symbol.clone(),
                })?;
        }

        Ok(totals)
    }

    /// Earliest and latest transaction dates, if any.
    #[must_use]
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.iter().map(|t| t.date).min()?;
        let last = self.iter().map(|t| t.date).max()?;
        Some((first, last))
    }
}

impl<'a, 'l> IntoIterator for &'l TransactionList<'a> {
    type Item = &'a Transaction;
    type IntoIter = std::iter::Copied<std::slice::Iter<'l, &'a Transaction>>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter().copied()
    }
}
