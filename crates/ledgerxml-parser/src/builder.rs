//! Conversion of the `ledger` element tree into a [`Ledger`].
//!
//! The build runs in three phases, in this order:
//!
//! 1. commodities, in document order
//! 2. accounts, as a pre-order walk of the account tree
//! 3. transactions, in document order
//!
//! Postings in phase 3 refer to accounts by id and to commodities by symbol,
//! so both must already be known when transactions are built. A reference
//! that does not resolve is an error.

use chrono::NaiveDate;
use ledgerxml_core::{Account, Commodity, Ledger, Posting, Transaction};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{BuildError, XmlNode};

/// Date formats accepted for `<date>` elements.
const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y-%m-%d"];

/// Build a [`Ledger`] from the tree of a `ledger` element.
pub fn build_ledger(root: &XmlNode) -> Result<Ledger, BuildError> {
    let version = root
        .attr("version")
        .ok_or_else(|| BuildError::MissingAttribute {
            attribute: "version",
            context: "ledger".to_string(),
        })?;
    let mut ledger = Ledger::new(version);

    let commodities = required_child(root, "commodities", "ledger")?;
    for (index, node) in commodities.children_named("commodity").enumerate() {
        ledger.commodities.push(Arc::new(build_commodity(node, index)?));
    }
    debug!(count = ledger.commodities.len(), "built commodities");

    let accounts = required_child(root, "accounts", "ledger")?;
    let mut registry = Vec::new();
    for node in accounts.children_named("account") {
        ledger.roots.push(build_account(node, &mut registry)?);
    }
    ledger.accounts = registry.into_iter().flatten().collect();
    debug!(count = ledger.accounts.len(), "built accounts");

    let resolver = Resolver::new(&ledger);
    let transactions = required_child(root, "transactions", "ledger")?;
    for (index, node) in transactions.children_named("transaction").enumerate() {
        ledger.push_transaction(build_transaction(node, index, &resolver)?);
    }
    debug!(count = ledger.transactions().len(), "built transactions");

    Ok(ledger)
}

fn build_commodity(node: &XmlNode, index: usize) -> Result<Commodity, BuildError> {
    let context = format!("commodity #{index}");
    let symbol = required_text(node, "symbol", &context)?;
    Ok(Commodity::new(symbol, node.attr("flags").unwrap_or_default()))
}

/// Build an account and its subtree.
///
/// Named accounts are registered in `registry` in pre-order: a parent's slot
/// is reserved before its children are visited and filled once the parent
/// is complete. Nameless accounts get no slot but keep their children.
fn build_account(
    node: &XmlNode,
    registry: &mut Vec<Option<Arc<Account>>>,
) -> Result<Arc<Account>, BuildError> {
    let path = node.child_text("fullname").unwrap_or_default();
    let id = node.attr("id").ok_or_else(|| BuildError::MissingAttribute {
        attribute: "id",
        context: format!("account {path:?}"),
    })?;
    let mut account = Account::new(id, node.child_text("name").unwrap_or_default(), path);

    let slot = account.is_named().then(|| {
        registry.push(None);
        registry.len() - 1
    });

    for child in node.children_named("account") {
        account.subaccounts.push(build_account(child, registry)?);
    }

    let account = Arc::new(account);
    if let Some(slot) = slot {
        registry[slot] = Some(Arc::clone(&account));
    }
    Ok(account)
}

fn build_transaction(
    node: &XmlNode,
    index: usize,
    resolver: &Resolver,
) -> Result<Transaction, BuildError> {
    let context = format!("transaction #{index}");

    let date_text = required_text(node, "date", &context)?;
    let date = parse_date(date_text).ok_or_else(|| BuildError::InvalidDate {
        text: date_text.to_string(),
        context: context.clone(),
    })?;

    let mut transaction = Transaction::new(date, node.child_text("payee").unwrap_or_default());

    let postings = required_child(node, "postings", &context)?;
    for (n, posting) in postings.children_named("posting").enumerate() {
        let context = format!("posting #{n} of {context}");
        transaction
            .postings
            .push(build_posting(posting, &context, resolver)?);
    }

    if transaction.postings.is_empty() {
        return Err(BuildError::NoPostings { context });
    }
    Ok(transaction)
}

fn build_posting(
    node: &XmlNode,
    context: &str,
    resolver: &Resolver,
) -> Result<Posting, BuildError> {
    let account_ref = required_child(node, "account", context)?
        .attr("ref")
        .ok_or_else(|| BuildError::MissingAttribute {
            attribute: "ref",
            context: format!("<account> of {context}"),
        })?;
    let account = resolver
        .account(account_ref)
        .ok_or_else(|| BuildError::UnknownAccount {
            id: account_ref.to_string(),
            context: context.to_string(),
        })?;

    let amount = required_child(required_child(node, "post-amount", context)?, "amount", context)?;
    let symbol = required_text(required_child(amount, "commodity", context)?, "symbol", context)?;
    let commodity = resolver
        .commodity(symbol)
        .ok_or_else(|| BuildError::UnknownCommodity {
            symbol: symbol.to_string(),
            context: context.to_string(),
        })?;

    let text = required_text(amount, "quantity", context)?;
    let quantity = parse_quantity(text).map_err(|source| BuildError::InvalidQuantity {
        text: text.to_string(),
        context: context.to_string(),
        source,
    })?;

    Ok(Posting::new(account, commodity, quantity))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Parse a quantity exactly.
///
/// `Decimal` keeps at most 28 fractional digits and rounds longer input, so
/// text whose significant fraction does not survive parsing is rejected.
fn parse_quantity(text: &str) -> Result<Decimal, rust_decimal::Error> {
    let value = match Decimal::from_str(text) {
        Ok(value) => value,
        Err(err) => return Decimal::from_scientific(text).map_err(|_| err),
    };
    let digits = fraction_digits(text);
    if value.normalize().scale() < digits {
        return Err(rust_decimal::Error::ScaleExceedsMaximumPrecision(digits));
    }
    Ok(value)
}

/// Digits after the decimal point, ignoring trailing zeros.
fn fraction_digits(text: &str) -> u32 {
    text.split_once('.').map_or(0, |(_, fraction)| {
        fraction
            .trim_end_matches(|c: char| c == '0' || c == '_')
            .chars()
            .filter(char::is_ascii_digit)
            .count() as u32
    })
}

fn required_child<'a>(
    node: &'a XmlNode,
    element: &'static str,
    context: &str,
) -> Result<&'a XmlNode, BuildError> {
    node.child(element).ok_or_else(|| BuildError::MissingElement {
        element,
        context: context.to_string(),
    })
}

fn required_text<'a>(
    node: &'a XmlNode,
    element: &'static str,
    context: &str,
) -> Result<&'a str, BuildError> {
    let text = required_child(node, element, context)?.text();
    if text.is_empty() {
        return Err(BuildError::EmptyElement {
            element,
            context: context.to_string(),
        });
    }
    Ok(text)
}

/// Id and symbol lookup tables. On duplicates the first declaration wins.
struct Resolver {
    accounts: HashMap<String, Arc<Account>>,
    commodities: HashMap<String, Arc<Commodity>>,
}

impl Resolver {
    fn new(ledger: &Ledger) -> Self {
        let mut accounts = HashMap::with_capacity(ledger.accounts.len());
        for account in &ledger.accounts {
            if accounts.contains_key(&account.id) {
                warn!(id = %account.id, path = %account.path, "duplicate account id, keeping first");
                continue;
            }
            accounts.insert(account.id.clone(), Arc::clone(account));
        }

        let mut commodities = HashMap::with_capacity(ledger.commodities.len());
        for commodity in &ledger.commodities {
            if commodities.contains_key(&commodity.symbol) {
                warn!(symbol = %commodity.symbol, "duplicate commodity symbol, keeping first");
                continue;
            }
            commodities.insert(commodity.symbol.clone(), Arc::clone(commodity));
        }

        Self {
            accounts,
            commodities,
        }
    }

    fn account(&self, id: &str) -> Option<Arc<Account>> {
        self.accounts.get(id).cloned()
    }

    fn commodity(&self, symbol: &str) -> Option<Arc<Commodity>> {
        self.commodities.get(symbol).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_document;
    use rust_decimal_macros::dec;

    fn build(xml: &str) -> Result<Ledger, BuildError> {
        build_ledger(&parse_document(xml.as_bytes()).unwrap())
    }

    fn ledger_xml(accounts: &str, transactions: &str) -> String {
        format!(
            r#"<ledger version="197120">
                 <commodities>
                   <commodity flags="PT"><symbol>$</symbol></commodity>
                   <commodity flags=""><symbol>EUR</symbol></commodity>
                 </commodities>
                 <accounts>{accounts}</accounts>
                 <transactions>{transactions}</transactions>
               </ledger>"#
        )
    }

    const ACCOUNTS: &str = r#"
        <account id="root"><name/><fullname/>
          <account id="a1"><name>Assets</name><fullname>Assets</fullname>
            <account id="a2"><name>Bank</name><fullname>Assets:Bank</fullname></account>
          </account>
          <account id="e1"><name>Expenses</name><fullname>Expenses</fullname></account>
        </account>"#;

    fn posting(account: &str, symbol: &str, quantity: &str) -> String {
        format!(
            r#"<posting><account ref="{account}"><name>x</name></account>
                 <post-amount><amount>
                   <commodity flags="PT"><symbol>{symbol}</symbol></commodity>
                   <quantity>{quantity}</quantity>
                 </amount></post-amount></posting>"#
        )
    }

    fn transaction(date: &str, payee: &str, postings: &[String]) -> String {
        format!(
            "<transaction><date>{date}</date><payee>{payee}</payee><postings>{}</postings></transaction>",
            postings.concat()
        )
    }

    #[test]
    fn test_builds_commodities_in_order() {
        let ledger = build(&ledger_xml("", "")).unwrap();
        assert_eq!(ledger.version, "197120");
        let symbols: Vec<_> = ledger.commodities.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["$", "EUR"]);
        assert_eq!(ledger.commodities[0].flags, "PT");
    }

    #[test]
    fn test_nameless_root_is_skipped_but_children_kept() {
        let ledger = build(&ledger_xml(ACCOUNTS, "")).unwrap();

        let paths: Vec<_> = ledger.accounts.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["Assets", "Assets:Bank", "Expenses"]);

        assert_eq!(ledger.roots.len(), 1);
        let root = &ledger.roots[0];
        assert!(!root.is_named());
        assert_eq!(root.subaccounts.len(), 2);
        assert_eq!(root.subaccounts[0].subaccounts[0].path, "Assets:Bank");
        // The tree and the flat list share nodes.
        assert!(Arc::ptr_eq(&root.subaccounts[0].subaccounts[0], &ledger.accounts[1]));
    }

    #[test]
    fn test_posting_resolution() {
        let txn = transaction(
            "2024/01/15",
            "Cheese Delivery",
            &[posting("e1", "$", "10.00"), posting("a2", "$", "-10.00")],
        );
        let ledger = build(&ledger_xml(ACCOUNTS, &txn)).unwrap();

        let t = ledger.transactions().get(0).unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(t.payee, "Cheese Delivery");
        assert_eq!(t.postings.len(), 2);
        assert_eq!(t.postings[0].account.path, "Expenses");
        assert_eq!(t.postings[1].account.path, "Assets:Bank");
        assert_eq!(t.postings[0].quantity, dec!(10.00));
        assert!(Arc::ptr_eq(&t.postings[0].commodity, &ledger.commodities[0]));
    }

    #[test]
    fn test_unknown_account_is_error() {
        let txn = transaction("2024/01/15", "x", &[posting("nope", "$", "1")]);
        let err = build(&ledger_xml(ACCOUNTS, &txn)).unwrap_err();
        assert!(matches!(err, BuildError::UnknownAccount { ref id, .. } if id == "nope"));
        assert!(err.to_string().contains("transaction #0"));
    }

    #[test]
    fn test_nameless_account_cannot_be_referenced() {
        let txn = transaction("2024/01/15", "x", &[posting("root", "$", "1")]);
        let err = build(&ledger_xml(ACCOUNTS, &txn)).unwrap_err();
        assert!(matches!(err, BuildError::UnknownAccount { .. }));
    }

    #[test]
    fn test_unknown_commodity_is_error() {
        let txn = transaction("2024/01/15", "x", &[posting("a2", "GBP", "1")]);
        let err = build(&ledger_xml(ACCOUNTS, &txn)).unwrap_err();
        assert!(matches!(err, BuildError::UnknownCommodity { ref symbol, .. } if symbol == "GBP"));
    }

    #[test]
    fn test_invalid_quantity_names_text() {
        let txn = transaction("2024/01/15", "x", &[posting("a2", "$", "ten")]);
        let err = build(&ledger_xml(ACCOUNTS, &txn)).unwrap_err();
        assert!(matches!(err, BuildError::InvalidQuantity { ref text, .. } if text == "ten"));
        assert!(err.to_string().contains("posting #0 of transaction #0"));
    }

    #[test]
    fn test_invalid_date() {
        let txn = transaction("15.01.2024", "x", &[posting("a2", "$", "1")]);
        let err = build(&ledger_xml(ACCOUNTS, &txn)).unwrap_err();
        assert!(matches!(err, BuildError::InvalidDate { ref text, .. } if text == "15.01.2024"));
    }

    #[test]
    fn test_iso_date_accepted() {
        let txn = transaction("2024-01-15", "x", &[posting("a2", "$", "1")]);
        let ledger = build(&ledger_xml(ACCOUNTS, &txn)).unwrap();
        assert_eq!(
            ledger.transactions().get(0).unwrap().date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_transaction_without_postings() {
        let txn = "<transaction><date>2024/01/15</date><postings/></transaction>";
        let err = build(&ledger_xml(ACCOUNTS, txn)).unwrap_err();
        assert!(matches!(err, BuildError::NoPostings { .. }));

        let txn = "<transaction><date>2024/01/15</date></transaction>";
        let err = build(&ledger_xml(ACCOUNTS, txn)).unwrap_err();
        assert!(matches!(err, BuildError::MissingElement { element: "postings", .. }));
    }

    #[test]
    fn test_missing_payee_is_empty() {
        let txn = format!(
            "<transaction><date>2024/01/15</date><postings>{}</postings></transaction>",
            posting("a2", "$", "1")
        );
        let ledger = build(&ledger_xml(ACCOUNTS, &txn)).unwrap();
        assert_eq!(ledger.transactions().get(0).unwrap().payee, "");
    }

    #[test]
    fn test_commodity_without_symbol() {
        let xml = r#"<ledger version="1"><commodities><commodity flags="P"/></commodities>
                     <accounts/><transactions/></ledger>"#;
        let err = build(xml).unwrap_err();
        assert!(matches!(err, BuildError::MissingElement { element: "symbol", ref context } if context == "commodity #0"));
    }

    #[test]
    fn test_missing_sections() {
        let err = build(r#"<ledger version="1"><accounts/><transactions/></ledger>"#).unwrap_err();
        assert!(matches!(err, BuildError::MissingElement { element: "commodities", .. }));

        let err = build("<ledger><commodities/><accounts/><transactions/></ledger>").unwrap_err();
        assert!(matches!(err, BuildError::MissingAttribute { attribute: "version", .. }));
    }

    #[test]
    fn test_duplicate_ids_first_match_wins() {
        let accounts = r#"
            <account id="dup"><name>First</name><fullname>First</fullname></account>
            <account id="dup"><name>Second</name><fullname>Second</fullname></account>"#;
        let txn = transaction("2024/01/15", "x", &[posting("dup", "$", "1")]);
        let ledger = build(&ledger_xml(accounts, &txn)).unwrap();
        assert_eq!(ledger.accounts.len(), 2);
        assert_eq!(ledger.transactions().get(0).unwrap().postings[0].account.path, "First");
    }

    #[test]
    fn test_scientific_quantity() {
        assert_eq!(parse_quantity("1.5e2").unwrap(), dec!(150));
        assert_eq!(parse_quantity("-0.25").unwrap(), dec!(-0.25));
        assert!(parse_quantity("1,000").is_err());
    }

    #[test]
    fn test_quantity_beyond_decimal_precision_is_rejected() {
        let tiny = "0.00000000000000000000000000001";
        let txn = transaction("2024/01/15", "x", &[posting("a2", "$", tiny)]);
        let err = build(&ledger_xml(ACCOUNTS, &txn)).unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidQuantity {
                ref text,
                source: rust_decimal::Error::ScaleExceedsMaximumPrecision(29),
                ..
            } if text == tiny
        ));
        assert!(err.to_string().contains("posting #0 of transaction #0"));
    }

    #[test]
    fn test_trailing_zeros_beyond_precision_are_exact() {
        let long = "1.50000000000000000000000000000000";
        assert_eq!(parse_quantity(long).unwrap(), dec!(1.5));
        assert_eq!(
            parse_quantity("0.0000000000000000000000000001").unwrap(),
            Decimal::new(1, 28)
        );
    }
}
