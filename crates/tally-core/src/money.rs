//! Monetary formatting helpers
//!
//! Amounts are carried as unrounded `f64` through every computation and are
//! only rounded to two decimals here, at the output boundary.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Currency used when the owner has not stored a preference
pub const DEFAULT_CURRENCY: &str = "INR";

/// Round to two decimal places (cents/paise)
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Serde helper: serialize a monetary value rounded to two decimals
pub fn serialize_money<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round2(*amount))
}

/// Serde helper: serialize a map of monetary values, each rounded to two decimals
pub fn serialize_money_map<K, S>(
    amounts: &BTreeMap<K, f64>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    K: Serialize,
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(amounts.len()))?;
    for (key, amount) in amounts {
        map.serialize_entry(key, &round2(*amount))?;
    }
    map.end()
}

/// Display symbol for an ISO 4217 currency code
///
/// Unknown codes are rendered as the code followed by a space.
pub fn currency_symbol(code: &str) -> String {
    match code.trim().to_uppercase().as_str() {
        "INR" => "₹".to_string(),
        "USD" | "CAD" | "AUD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        other => format!("{} ", other),
    }
}

/// Validate a currency preference (three ASCII letters)
pub fn normalize_currency(code: &str) -> Option<String> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_uppercase())
    } else {
        None
    }
}

/// Formats amounts with a fixed currency symbol
#[derive(Debug, Clone)]
pub struct MoneyFormatter {
    symbol: String,
}

impl MoneyFormatter {
    pub fn new(currency: &str) -> Self {
        Self {
            symbol: currency_symbol(currency),
        }
    }

    /// `₹1234.50`
    pub fn format(&self, amount: f64) -> String {
        format!("{}{:.2}", self.symbol, amount)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl Default for MoneyFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1234.567), 1234.57);
        assert_eq!(round2(18.0), 18.0);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }

    #[test]
    fn test_currency_symbol() {
        assert_eq!(currency_symbol("inr"), "₹");
        assert_eq!(currency_symbol("USD"), "$");
        assert_eq!(currency_symbol("CHF"), "CHF ");
    }

    #[test]
    fn test_normalize_currency() {
        assert_eq!(normalize_currency(" usd "), Some("USD".to_string()));
        assert_eq!(normalize_currency("US"), None);
        assert_eq!(normalize_currency("U$D"), None);
    }

    #[test]
    fn test_formatter() {
        let fmt = MoneyFormatter::new("USD");
        assert_eq!(fmt.format(1234.5), "$1234.50");
        assert_eq!(MoneyFormatter::default().format(0.0), "₹0.00");
    }

    #[test]
    fn test_serialize_money_rounds() {
        #[derive(serde::Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "serialize_money")]
            value: f64,
        }
        let json = serde_json::to_string(&Wrapper { value: 10.0 / 3.0 }).unwrap();
        assert_eq!(json, r#"{"value":3.33}"#);
    }

    #[test]
    fn test_serialize_money_map_rounds_each_value() {
        #[derive(serde::Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "serialize_money_map")]
            values: BTreeMap<String, f64>,
        }
        let mut values = BTreeMap::new();
        values.insert("a".to_string(), 0.1 + 0.2);
        values.insert("b".to_string(), 0.333 + 0.334);
        let json = serde_json::to_string(&Wrapper { values }).unwrap();
        assert_eq!(json, r#"{"values":{"a":0.3,"b":0.67}}"#);
    }
}
