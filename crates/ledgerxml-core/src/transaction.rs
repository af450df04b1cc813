//! Transaction and posting types.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::{Account, Commodity};

/// A single line item inside a transaction.
///
/// The account and commodity are shared with the owning [`Ledger`](crate::Ledger);
/// a posting never owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Posting {
    /// The account this posting debits or credits
    #[serde(serialize_with = "serialize_account_path")]
    pub account: Arc<Account>,
    /// The commodity of the quantity
    #[serde(serialize_with = "serialize_commodity_symbol")]
    pub commodity: Arc<Commodity>,
    /// Signed quantity
    pub quantity: Decimal,
}

impl Posting {
    /// Create a new posting.
    #[must_use]
    pub const fn new(account: Arc<Account>, commodity: Arc<Commodity>, quantity: Decimal) -> Self {
        Self {
            account,
            commodity,
            quantity,
        }
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {} {}",
            self.account.path, self.quantity, self.commodity.symbol
        )
    }
}

// Postings serialize their references by key, not by value.
fn serialize_account_path<S: serde::Serializer>(
    account: &Arc<Account>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&account.path)
}

fn serialize_commodity_symbol<S: serde::Serializer>(
    commodity: &Arc<Commodity>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&commodity.symbol)
}

/// A dated, payee-labelled group of postings.
///
/// Postings are expected to net to zero per commodity, but this is not
/// checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Transaction date
    pub date: NaiveDate,
    /// Payee (may be empty)
    pub payee: String,
    /// Postings in document order
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// Create a new transaction without postings.
    #[must_use]
    pub fn new(date: NaiveDate, payee: impl Into<String>) -> Self {
        Self {
            date,
            payee: payee.into(),
            postings: Vec::new(),
        }
    }

    /// Add a posting.
    #[must_use]
    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }

    /// Check whether any posting's account path matches `pattern`.
    ///
    /// The match is unanchored: `Expenses` matches `"Expenses:Food"` as well
    /// as `"Liabilities:Expenses"`. Anchor the pattern to restrict it.
    #[must_use]
    pub fn has_account(&self, pattern: &Regex) -> bool {
        self.postings
            .iter()
            .any(|p| pattern.is_match(&p.account.path))
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y/%m/%d"))?;
        if !self.payee.is_empty() {
            write!(f, " {}", self.payee)?;
        }
        for posting in &self.postings {
            write!(f, "\n    {posting}")?;
        }
        Ok(())
    }
}
