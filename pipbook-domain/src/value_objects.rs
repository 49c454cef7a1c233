//! Value Objects for the Pipbook domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Price must be positive
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Lot size must be positive
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Symbol must be a currency pair (e.g. EUR/USD)
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Symbol is well-formed but absent from the pip table
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// Instrument table entry is malformed
    #[error("Invalid instrument: {0}")]
    InvalidInstrument(String),

    /// Trade payload violates an entity rule
    #[error("Invalid trade: {0}")]
    InvalidTrade(String),
}

// =============================================================================
// Price
// =============================================================================

/// Price represents a positive decimal price
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Create a new Price with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPrice` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidPrice(format!("Price must be positive, got {}", value)));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Absolute distance between two prices
    pub fn distance_to(&self, other: Price) -> Decimal {
        (self.0 - other.0).abs()
    }
}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// Quantity represents a positive position size in standard lots
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a new Quantity with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidQuantity` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidQuantity(format!(
                "Lot size must be positive, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Quantity {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Pair
// =============================================================================

/// Pair represents a currency pair (e.g., EUR/USD)
///
/// Parsing is case-insensitive and accepts `/`, `-`, `_`, a space, or no
/// separator between the two ISO codes, so `eurusd`, `EUR-USD` and
/// `EUR/USD` are the same pair. The canonical form is `BASE/QUOTE`.
///
/// # Invariants
/// - Base and quote are three ASCII letters each, upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pair {
    base: String,
    quote: String,
}

impl Pair {
    /// Parse a currency pair from user input
    ///
    /// # Examples
    /// ```
    /// # use pipbook_domain::value_objects::Pair;
    /// let pair = Pair::parse("eur-usd").unwrap();
    /// assert_eq!(pair.base(), "EUR");
    /// assert_eq!(pair.quote(), "USD");
    /// assert_eq!(pair.to_string(), "EUR/USD");
    /// ```
    ///
    /// # Errors
    /// Returns `DomainError::InvalidSymbol` if the input is not two ISO codes
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let letters: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, '/' | '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();

        if letters.len() != 6 || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidSymbol(format!(
                "Cannot parse currency pair: {:?}",
                input
            )));
        }

        Ok(Self {
            base: letters[..3].to_string(),
            quote: letters[3..].to_string(),
        })
    }

    /// Get the base currency
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Get the quote currency
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Whether the pair is quoted in yen
    pub fn is_yen_quoted(&self) -> bool {
        self.quote == "JPY"
    }
}

impl TryFrom<String> for Pair {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Pair> for String {
    fn from(pair: Pair) -> Self {
        pair.to_string()
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

// =============================================================================
// Direction
// =============================================================================

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Long trade (buy low, sell high)
    Long,
    /// Short trade (sell high, buy low)
    Short,
}

impl Direction {
    /// Signed price move in the trade's favour, from entry to exit
    pub fn favourable_move(&self, entry: Price, exit: Price) -> Decimal {
        match self {
            Direction::Long => exit.as_decimal() - entry.as_decimal(),
            Direction::Short => entry.as_decimal() - exit.as_decimal(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // Price tests
    #[test]
    fn test_price_validation() {
        assert!(Price::new(dec!(1.0850)).is_ok());
        assert!(Price::new(dec!(0.0001)).is_ok());
        assert!(Price::new(dec!(-1.0)).is_err());
        assert!(Price::new(dec!(0.0)).is_err());
    }

    #[test]
    fn test_price_distance() {
        let entry = Price::new(dec!(1.0850)).unwrap();
        let stop = Price::new(dec!(1.0800)).unwrap();
        assert_eq!(entry.distance_to(stop), dec!(0.0050));
        assert_eq!(stop.distance_to(entry), dec!(0.0050));
    }

    #[test]
    fn test_price_rejects_zero_from_json() {
        let parsed: Result<Price, _> = serde_json::from_str("0");
        assert!(parsed.is_err());

        let parsed: Price = serde_json::from_str("1.085").unwrap();
        assert_eq!(parsed.as_decimal(), dec!(1.085));
    }

    // Quantity tests
    #[test]
    fn test_quantity_validation() {
        assert!(Quantity::new(dec!(0.01)).is_ok());
        assert!(Quantity::new(dec!(10)).is_ok());
        assert!(Quantity::new(dec!(-0.1)).is_err());
        assert!(Quantity::new(dec!(0)).is_err());
    }

    // Pair tests
    #[test]
    fn test_pair_parse_separators() {
        for input in ["EUR/USD", "eur/usd", "EURUSD", "EUR-USD", "eur_usd", " EUR USD "] {
            let pair = Pair::parse(input).unwrap();
            assert_eq!(pair.to_string(), "EUR/USD", "input {:?}", input);
        }
    }

    #[test]
    fn test_pair_invalid() {
        assert!(Pair::parse("").is_err());
        assert!(Pair::parse("EUR").is_err());
        assert!(Pair::parse("EUR/USDT").is_err());
        assert!(Pair::parse("EU1/USD").is_err());
    }

    #[test]
    fn test_pair_yen_quoted() {
        assert!(Pair::parse("USD/JPY").unwrap().is_yen_quoted());
        assert!(!Pair::parse("JPY/USD").unwrap().is_yen_quoted());
    }

    #[test]
    fn test_pair_serde_canonical() {
        let pair: Pair = serde_json::from_str("\"gbpusd\"").unwrap();
        assert_eq!(serde_json::to_string(&pair).unwrap(), "\"GBP/USD\"");
    }

    // Direction tests
    #[test]
    fn test_direction_favourable_move() {
        let entry = Price::new(dec!(1.0850)).unwrap();
        let exit = Price::new(dec!(1.0900)).unwrap();
        assert_eq!(Direction::Long.favourable_move(entry, exit), dec!(0.0050));
        assert_eq!(Direction::Short.favourable_move(entry, exit), dec!(-0.0050));
    }

    #[test]
    fn test_direction_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Direction::Short).unwrap(), "\"short\"");
        let parsed: Direction = serde_json::from_str("\"long\"").unwrap();
        assert_eq!(parsed, Direction::Long);
    }
}
