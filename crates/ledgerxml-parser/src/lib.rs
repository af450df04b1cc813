//! Streaming parser for ledger XML exports.
//!
//! Parsing happens in two stages:
//!
//! 1. [`parse_document`] / [`parse_document_async`] read the input
//!    incrementally and return the element tree of the top-level `ledger`
//!    element as an [`XmlNode`].
//! 2. [`build_ledger`] turns that tree into a [`Ledger`](ledgerxml_core::Ledger),
//!    resolving posting references to accounts and commodities.
//!
//! # Example
//!
//! ```
//! use ledgerxml_parser::{build_ledger, parse_document};
//!
//! let xml = r#"<ledger version="3">
//!   <commodities><commodity flags="PT"><symbol>$</symbol></commodity></commodities>
//!   <accounts><account id="1"><name>Assets</name><fullname>Assets</fullname></account></accounts>
//!   <transactions/>
//! </ledger>"#;
//!
//! let tree = parse_document(xml.as_bytes()).unwrap();
//! let ledger = build_ledger(&tree).unwrap();
//! assert_eq!(ledger.accounts.len(), 1);
//! assert_eq!(ledger.commodities[0].symbol, "$");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod error;
mod node;
mod stream;

pub use builder::build_ledger;
pub use error::{BuildError, ParseError};
pub use node::XmlNode;
pub use stream::{parse_document, parse_document_async, ROOT_ELEMENT};
