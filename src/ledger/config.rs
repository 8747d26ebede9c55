use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized currency code, e.g. `BTC` or `EUR`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(from = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Self {
        Currency(code.trim().to_uppercase())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Currency::new(code)
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        Currency::new(&code)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run configuration, fixed before any transactions are processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The reference (fiat) currency every trade is priced in.
    pub fiat: Currency,
}

impl Config {
    pub fn new(fiat: impl Into<Currency>) -> Self {
        Config { fiat: fiat.into() }
    }

    pub fn is_fiat(&self, currency: &Currency) -> bool {
        self.fiat == *currency
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new("EUR")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_codes_are_normalized() {
        assert_eq!(Currency::new(" btc "), Currency::new("BTC"));
        assert_eq!(Currency::from("eur").code(), "EUR");
    }

    #[test]
    fn currency_deserializes_normalized() {
        let currency: Currency = serde_json::from_str("\"eth\"").unwrap();
        assert_eq!(currency.code(), "ETH");
    }

    #[test]
    fn default_fiat_is_eur() {
        let config = Config::default();
        assert!(config.is_fiat(&Currency::new("eur")));
        assert!(!config.is_fiat(&Currency::new("BTC")));
    }
}
