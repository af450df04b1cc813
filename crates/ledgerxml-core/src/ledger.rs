//! The complete ledger model.

use std::sync::Arc;

use crate::{Account, Commodity, Transaction, TransactionList};

/// A fully built ledger.
///
/// All collections keep document order. `accounts` is the flat list of every
/// *named* account in pre-order; `roots` holds the top-level nodes of the
/// account tree, including nameless wrapper nodes, so that the whole
/// hierarchy stays reachable.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    /// Version string of the exporting tool
    pub version: String,
    /// Known commodities
    pub commodities: Vec<Arc<Commodity>>,
    /// Every named account, in pre-order
    pub accounts: Vec<Arc<Account>>,
    /// Top-level account nodes
    pub roots: Vec<Arc<Account>>,
    transactions: Vec<Transaction>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Append a transaction. Transactions keep insertion order.
    pub fn push_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// A view over all transactions of this ledger.
    #[must_use]
    pub fn transactions(&self) -> TransactionList<'_> {
        TransactionList::new(self, self.transactions.iter().collect())
    }

    /// Find an account by id. Returns the first match if ids are duplicated.
    #[must_use]
    pub fn account(&self, id: &str) -> Option<&Arc<Account>> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Find an account by its full path.
    #[must_use]
    pub fn account_by_path(&self, path: &str) -> Option<&Arc<Account>> {
        self.accounts.iter().find(|a| a.path == path)
    }

    /// Find a commodity by symbol. Returns the first match if symbols are duplicated.
    #[must_use]
    pub fn commodity(&self, symbol: &str) -> Option<&Arc<Commodity>> {
        self.commodities.iter().find(|c| c.symbol == symbol)
    }
}
