//! Price representation for catalog and cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A real-money price attached to a catalog item, currency package, or cart
/// line.
///
/// Amounts arrive from the backend as JSON numbers and are kept as decimals
/// to avoid float drift when the host displays or sums them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    #[serde(default)]
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "USD"). Free-form because the backend
    /// decides which currencies a project supports.
    #[serde(default)]
    pub currency: String,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub fn new(amount: Decimal, currency: String) -> Self {
        Self { amount, currency }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_display() {
        let price = Price::new(Decimal::new(199, 2), "USD".to_string());
        assert_eq!(price.to_string(), "1.99 USD");
    }

    #[test]
    fn test_price_deserializes_from_number() {
        let price: Price = serde_json::from_str(r#"{"amount": 1.99, "currency": "EUR"}"#).unwrap();
        assert_eq!(price.amount, Decimal::new(199, 2));
        assert_eq!(price.currency, "EUR");
    }

    #[test]
    fn test_price_defaults_when_fields_absent() {
        let price: Price = serde_json::from_str("{}").unwrap();
        assert_eq!(price.amount, Decimal::ZERO);
        assert!(price.currency.is_empty());
    }
}
