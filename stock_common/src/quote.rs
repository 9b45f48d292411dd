//! Quote data model and upstream payload decoding.
//!
//! The quote endpoint answers with a terse JSON object (`c`, `d`, `dp`, `h`, `l`,
//! `o`, `pc`). `RawQuote` mirrors that payload with every field optional;
//! `Quote::from_raw` normalizes it into the record the rest of the system works
//! with. Absent or `null` fields become `0.0`, never a value carried over from an
//! earlier response.

use serde::{Deserialize, Serialize};

use crate::error::TerminalError;
use crate::symbols::Symbol;

/// Quote payload exactly as returned by the quote endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawQuote {
    /// Current price.
    #[serde(rename = "c")]
    pub current: Option<f64>,
    /// Absolute change against the previous close.
    #[serde(rename = "d")]
    pub change: Option<f64>,
    /// Percent change against the previous close.
    #[serde(rename = "dp")]
    pub percent_change: Option<f64>,
    /// High price of the day.
    #[serde(rename = "h")]
    pub high: Option<f64>,
    /// Low price of the day.
    #[serde(rename = "l")]
    pub low: Option<f64>,
    /// Open price of the day.
    #[serde(rename = "o")]
    pub open: Option<f64>,
    /// Previous close price.
    #[serde(rename = "pc")]
    pub prev_close: Option<f64>,
}

impl RawQuote {
    /// Decode a response body. A body that is not a JSON object fails here; an
    /// object with missing fields does not.
    pub fn from_json_bytes(body: &[u8]) -> Result<Self, TerminalError> {
        let raw = serde_json::from_slice(body)?;
        Ok(raw)
    }
}

/// Latest market data for a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    symbol: Symbol,
    /// Current price.
    pub price: f64,
    /// Absolute change against the previous close.
    pub change: f64,
    /// Percent change against the previous close.
    pub percent_change: f64,
    /// High price of the day.
    pub high: f64,
    /// Low price of the day.
    pub low: f64,
    /// Open price of the day.
    pub open: f64,
    /// Previous close price.
    pub prev_close: f64,
}

impl Quote {
    /// Normalize an upstream payload for `symbol`.
    pub fn from_raw(symbol: Symbol, raw: RawQuote) -> Self {
        Quote {
            symbol,
            price: or_zero(raw.current),
            change: or_zero(raw.change),
            percent_change: or_zero(raw.percent_change),
            high: or_zero(raw.high),
            low: or_zero(raw.low),
            open: or_zero(raw.open),
            prev_close: or_zero(raw.prev_close),
        }
    }

    /// The symbol this quote belongs to. Fixed for the lifetime of the record.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// `true` when the price is flat or up against the previous close.
    pub fn is_gaining(&self) -> bool {
        self.change >= 0.0
    }
}

// NaN is treated like a missing value.
fn or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| !v.is_nan()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aapl() -> Symbol {
        "AAPL".parse().unwrap()
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let raw = RawQuote::from_json_bytes(br#"{"c": 150.2}"#).unwrap();
        let quote = Quote::from_raw(aapl(), raw);

        assert_eq!(quote.price, 150.2);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.percent_change, 0.0);
        assert_eq!(quote.high, 0.0);
        assert_eq!(quote.low, 0.0);
        assert_eq!(quote.open, 0.0);
        assert_eq!(quote.prev_close, 0.0);
    }

    #[test]
    fn null_fields_default_to_zero() {
        let raw =
            RawQuote::from_json_bytes(br#"{"c": 10.0, "d": null, "dp": null, "pc": 9.5}"#).unwrap();
        let quote = Quote::from_raw(aapl(), raw);

        assert_eq!(quote.price, 10.0);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.percent_change, 0.0);
        assert_eq!(quote.prev_close, 9.5);
    }

    #[test]
    fn full_payload_maps_every_field() {
        let body = br#"{"c":190.5,"d":1.2,"dp":0.63,"h":191.0,"l":188.1,"o":189.0,"pc":189.3,"t":1700000000}"#;
        let quote = Quote::from_raw(aapl(), RawQuote::from_json_bytes(body).unwrap());

        assert_eq!(quote.symbol().as_str(), "AAPL");
        assert_eq!(quote.price, 190.5);
        assert_eq!(quote.change, 1.2);
        assert_eq!(quote.percent_change, 0.63);
        assert_eq!(quote.high, 191.0);
        assert_eq!(quote.low, 188.1);
        assert_eq!(quote.open, 189.0);
        assert_eq!(quote.prev_close, 189.3);
        assert!(quote.is_gaining());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(RawQuote::from_json_bytes(b"<html>rate limited</html>").is_err());
        assert!(RawQuote::from_json_bytes(b"42").is_err());
        assert!(RawQuote::from_json_bytes(br#"{"c": "abc"}"#).is_err());
    }

    #[test]
    fn empty_object_is_all_zero() {
        let quote = Quote::from_raw(aapl(), RawQuote::from_json_bytes(b"{}").unwrap());
        assert_eq!(quote.price, 0.0);
        assert!(quote.is_gaining());
    }
}
