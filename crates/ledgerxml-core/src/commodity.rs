//! Commodity type.

use serde::Serialize;
use std::fmt;

/// A unit of value: a currency, a stock ticker or any other tracked unit.
///
/// Identity is the symbol. The flags are the display/rounding flags of the
/// exporting tool (e.g. `"PT"`) and are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Commodity {
    /// The commodity symbol (e.g., "USD", "$", "AAPL")
    pub symbol: String,
    /// Opaque flag string from the source document
    pub flags: String,
}

impl Commodity {
    /// Create a new commodity.
    #[must_use]
    pub fn new(symbol: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            flags: flags.into(),
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_symbol() {
        let c = Commodity::new("EUR", "PT");
        assert_eq!(c.to_string(), "EUR");
        assert_eq!(c.flags, "PT");
    }
}
