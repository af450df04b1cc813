//! Parse and build error types.

use thiserror::Error;

/// Errors raised while reading the XML stream.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input is not well-formed XML, or reading it failed.
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        /// Byte offset in the input where the error was detected.
        position: usize,
        /// The underlying reader error.
        #[source]
        source: quick_xml::Error,
    },

    /// The input ended before the top-level `ledger` element was closed.
    #[error("unexpected end of input: <ledger> element was never closed")]
    UnexpectedEof,

    /// The document's top-level element is not `ledger`.
    #[error("expected top-level <ledger> element, found <{0}>")]
    UnexpectedRoot(String),
}

/// Errors raised while turning the element tree into a ledger.
///
/// Each variant carries a `context` naming where in the document the
/// problem was found, e.g. `"transaction #3"` or `"posting #1 of transaction #3"`.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A required child element is absent.
    #[error("{context}: missing <{element}> element")]
    MissingElement {
        /// The missing element name.
        element: &'static str,
        /// Where the element was expected.
        context: String,
    },

    /// A required attribute is absent.
    #[error("{context}: missing `{attribute}` attribute")]
    MissingAttribute {
        /// The missing attribute name.
        attribute: &'static str,
        /// The element that should carry it.
        context: String,
    },

    /// A required text value is empty.
    #[error("{context}: <{element}> is empty")]
    EmptyElement {
        /// The empty element name.
        element: &'static str,
        /// Where the element was found.
        context: String,
    },

    /// A transaction has no postings.
    #[error("{context}: transaction has no postings")]
    NoPostings {
        /// The offending transaction.
        context: String,
    },

    /// A posting refers to an account id that was not declared.
    #[error("{context}: dangling reference to unknown account id {id:?}")]
    UnknownAccount {
        /// The unresolved account id.
        id: String,
        /// The posting with the reference.
        context: String,
    },

    /// A posting refers to a commodity symbol that was not declared.
    #[error("{context}: dangling reference to unknown commodity {symbol:?}")]
    UnknownCommodity {
        /// The unresolved commodity symbol.
        symbol: String,
        /// The posting with the reference.
        context: String,
    },

    /// A transaction date is not in `YYYY/MM/DD` form.
    #[error("{context}: invalid date {text:?}, expected YYYY/MM/DD")]
    InvalidDate {
        /// The date text.
        text: String,
        /// The offending transaction.
        context: String,
    },

    /// A posting quantity is not a decimal literal, or has more fractional
    /// digits than a `Decimal` can hold exactly.
    #[error("{context}: invalid quantity {text:?}: {source}")]
    InvalidQuantity {
        /// The quantity text.
        text: String,
        /// The offending posting.
        context: String,
        /// The decimal parse error.
        #[source]
        source: rust_decimal::Error,
    },
}
