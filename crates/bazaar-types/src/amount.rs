//! Bid and price amounts.

use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when coercing input into an [`Amount`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmountError {
    /// The text is not a number.
    #[error("not a number: {0:?}")]
    NotANumber(String),

    /// The number is negative, infinite or NaN.
    #[error("amount must be a finite, non-negative number: {0}")]
    OutOfRange(f64),
}

/// A price or bid value.
///
/// Always finite and non-negative, which makes the ordering total.
/// Comparison is numeric: `"9"` is lower than `"10"`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    /// Zero.
    pub const ZERO: Amount = Amount(0.0);

    /// Creates an amount, rejecting negative and non-finite values.
    pub fn new(value: f64) -> Result<Self, AmountError> {
        if value.is_finite() && value >= 0.0 {
            // Normalize -0.0 so equal amounts serialize identically.
            Ok(Self(value + 0.0))
        } else {
            Err(AmountError::OutOfRange(value))
        }
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| AmountError::NotANumber(trimmed.to_string()))?;
        Self::new(value)
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Amount {
    type Error = AmountError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

// Older peers store and broadcast amounts as the text the user typed,
// so both JSON numbers and numeric strings are accepted.
impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Amount::new(value),
            Raw::Text(text) => text.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_trims_input() {
        let amount: Amount = " 15 ".parse().unwrap();
        assert_eq!(amount, Amount::from(15));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            "ten".parse::<Amount>(),
            Err(AmountError::NotANumber("ten".to_string()))
        );
        assert!(matches!(
            "-1".parse::<Amount>(),
            Err(AmountError::OutOfRange(_))
        ));
        assert!(matches!(
            "inf".parse::<Amount>(),
            Err(AmountError::OutOfRange(_))
        ));
        assert!("NaN".parse::<Amount>().is_err());
    }

    #[test]
    fn test_comparison_is_numeric() {
        let nine: Amount = "9".parse().unwrap();
        let ten: Amount = "10".parse().unwrap();
        assert!(nine < ten);
        assert!("9" > "10");
    }

    #[test]
    fn test_display_drops_trailing_zero() {
        assert_eq!(Amount::from(15).to_string(), "15");
        assert_eq!("12.5".parse::<Amount>().unwrap().to_string(), "12.5");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_number: Amount = serde_json::from_str("10").unwrap();
        let from_text: Amount = serde_json::from_str("\"10\"").unwrap();
        assert_eq!(from_number, from_text);

        assert!(serde_json::from_str::<Amount>("\"abc\"").is_err());
        assert!(serde_json::from_str::<Amount>("-3").is_err());
    }

    proptest! {
        #[test]
        fn prop_text_order_matches_numeric_order(a in 0u32..1_000_000, b in 0u32..1_000_000) {
            let left: Amount = a.to_string().parse().unwrap();
            let right: Amount = b.to_string().parse().unwrap();
            prop_assert_eq!(left.cmp(&right), a.cmp(&b));
        }
    }
}
