//! Hierarchical account type.
//!
//! Accounts form a tree: every [`Account`] owns its children through
//! [`Account::subaccounts`]. Postings and the ledger's flat account list hold
//! shared handles (`Arc<Account>`) to the same nodes, never copies.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Separator between the segments of an account path.
pub const PATH_SEPARATOR: char = ':';

/// A named node in the chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Document-local identifier, used to resolve posting references
    pub id: String,
    /// Leaf segment of the account name (empty for synthetic wrapper nodes)
    pub name: String,
    /// Fully-qualified path (e.g., "Expenses:Food:Groceries")
    pub path: String,
    /// Child accounts, in document order
    pub subaccounts: Vec<Arc<Account>>,
}

impl Account {
    /// Create a new account without children.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            subaccounts: Vec::new(),
        }
    }

    /// Add a child account.
    #[must_use]
    pub fn with_subaccount(mut self, child: impl Into<Arc<Self>>) -> Self {
        self.subaccounts.push(child.into());
        self
    }

    /// Whether this account has a name.
    ///
    /// Nameless nodes are synthetic wrappers (such as the root of the
    /// exported tree) and are not registered in the ledger's account list.
    #[must_use]
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// Number of path segments below the root (`"Assets:Bank"` has depth 2).
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.path.is_empty() {
            0
        } else {
            self.path.split(PATH_SEPARATOR).count()
        }
    }

    /// Iterate over this account and all of its descendants in pre-order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Find a descendant (or this account) by its full path.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Self> {
        self.walk().find(|a| a.path == path)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Pre-order iterator over an account subtree. See [`Account::walk`].
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a Account>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Account;

    fn next(&mut self) -> Option<Self::Item> {
        let account = self.stack.pop()?;
        self.stack
            .extend(account.subaccounts.iter().rev().map(AsRef::as_ref));
        Some(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Account {
        Account::new("root", "", "")
            .with_subaccount(
                Account::new("1", "Assets", "Assets")
                    .with_subaccount(Account::new("2", "Bank", "Assets:Bank"))
                    .with_subaccount(Account::new("3", "Cash", "Assets:Cash")),
            )
            .with_subaccount(Account::new("4", "Expenses", "Expenses"))
    }

    #[test]
    fn test_walk_is_preorder() {
        let tree = sample_tree();
        let ids: Vec<_> = tree.walk().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_is_named() {
        let tree = sample_tree();
        assert!(!tree.is_named());
        assert!(tree.subaccounts[0].is_named());
    }

    #[test]
    fn test_depth() {
        assert_eq!(Account::new("x", "", "").depth(), 0);
        assert_eq!(Account::new("x", "Assets", "Assets").depth(), 1);
        assert_eq!(Account::new("x", "Bank", "Assets:Bank").depth(), 2);
    }

    #[test]
    fn test_find() {
        let tree = sample_tree();
        assert_eq!(tree.find("Assets:Cash").map(|a| a.id.as_str()), Some("3"));
        assert!(tree.find("Income").is_none());
    }
}
