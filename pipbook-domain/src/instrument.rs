//! Instrument pip table
//!
//! The single source of truth for per-instrument pip semantics. Every pip
//! size, standard-lot pip value and contract size used by the calculators and
//! by trade profit comes from a [`PipTable`].
//!
//! The built-in entries are plain data. Extra instruments (or overrides of
//! built-in ones) are loaded from JSON with [`PipTable::extend_from_json`],
//! so adding an instrument never needs a code change.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value_objects::{DomainError, Pair};

/// Units per standard lot
pub const STANDARD_CONTRACT_SIZE: i64 = 100_000;

/// Monetary value of one pip for one standard lot, in account currency.
///
/// Flat for every built-in instrument. A faithful value depends on the quote
/// currency and the live exchange rate; that derivation is out of scope.
pub const STANDARD_LOT_PIP_VALUE: i64 = 10;

/// Built-in instruments: symbol and the number of decimal places of one pip.
const BUILTIN_INSTRUMENTS: &[(&str, u32)] = &[
    ("EUR/USD", 4),
    ("GBP/USD", 4),
    ("AUD/USD", 4),
    ("NZD/USD", 4),
    ("USD/CAD", 4),
    ("USD/CHF", 4),
    ("EUR/GBP", 4),
    ("USD/JPY", 2),
    ("EUR/JPY", 2),
    ("GBP/JPY", 2),
];

// =============================================================================
// InstrumentSpec
// =============================================================================

/// Pip semantics for one currency pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSpec {
    /// Currency pair
    pub pair: Pair,
    /// Price increment of one pip (0.0001, or 0.01 for yen-quoted pairs)
    pub pip_size: Decimal,
    /// Value of one pip for one standard lot
    pub pip_value: Decimal,
    /// Units per standard lot
    pub contract_size: Decimal,
}

impl InstrumentSpec {
    /// Create a spec with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidInstrument` if any figure is <= 0
    pub fn new(
        pair: Pair,
        pip_size: Decimal,
        pip_value: Decimal,
        contract_size: Decimal,
    ) -> Result<Self, DomainError> {
        for (name, value) in [
            ("pip size", pip_size),
            ("pip value", pip_value),
            ("contract size", contract_size),
        ] {
            if value <= Decimal::ZERO {
                return Err(DomainError::InvalidInstrument(format!(
                    "{}: {} must be positive, got {}",
                    pair, name, value
                )));
            }
        }

        Ok(Self {
            pair,
            pip_size,
            pip_value,
            contract_size,
        })
    }

    /// Standard spec: pip of `10^-pip_decimals`, $10 pip value, 100k contract
    pub fn standard(pair: Pair, pip_decimals: u32) -> Self {
        Self {
            pair,
            pip_size: Decimal::new(1, pip_decimals),
            pip_value: Decimal::from(STANDARD_LOT_PIP_VALUE),
            contract_size: Decimal::from(STANDARD_CONTRACT_SIZE),
        }
    }

    /// Number of pips in one unit of price (10000 for 0.0001 pips)
    pub fn pip_multiplier(&self) -> Decimal {
        Decimal::ONE / self.pip_size
    }

    /// Convert a price distance into pips, `None` if it does not fit a `Decimal`
    pub fn to_pips(&self, price_distance: Decimal) -> Option<Decimal> {
        price_distance.checked_div(self.pip_size)
    }
}

/// JSON shape of an instrument entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentEntry {
    pair: String,
    pip_size: Decimal,
    #[serde(default)]
    pip_value: Option<Decimal>,
    #[serde(default)]
    contract_size: Option<Decimal>,
}

impl TryFrom<InstrumentEntry> for InstrumentSpec {
    type Error = DomainError;

    fn try_from(entry: InstrumentEntry) -> Result<Self, Self::Error> {
        InstrumentSpec::new(
            Pair::parse(&entry.pair)?,
            entry.pip_size,
            entry.pip_value.unwrap_or_else(|| Decimal::from(STANDARD_LOT_PIP_VALUE)),
            entry.contract_size.unwrap_or_else(|| Decimal::from(STANDARD_CONTRACT_SIZE)),
        )
    }
}

// =============================================================================
// PipTable
// =============================================================================

/// Lookup table: currency pair → pip semantics
#[derive(Debug, Clone, Default)]
pub struct PipTable {
    entries: HashMap<Pair, InstrumentSpec>,
}

impl PipTable {
    /// Create an empty table
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create the table of built-in majors and yen crosses
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (symbol, pip_decimals) in BUILTIN_INSTRUMENTS {
            // Built-in symbols are well-formed; skip rather than panic if one is not
            if let Ok(pair) = Pair::parse(symbol) {
                table.insert(InstrumentSpec::standard(pair, *pip_decimals));
            }
        }
        table
    }

    /// Insert or replace an entry, returning the replaced one
    pub fn insert(&mut self, spec: InstrumentSpec) -> Option<InstrumentSpec> {
        self.entries.insert(spec.pair.clone(), spec)
    }

    /// Add entries from a JSON array of `{pair, pipSize, pipValue?, contractSize?}`
    ///
    /// Returns the number of entries loaded. Existing pairs are overridden.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidInstrument` if the JSON is malformed or an
    /// entry fails validation. The table is left unchanged on error.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize, DomainError> {
        let entries: Vec<InstrumentEntry> = serde_json::from_str(json)
            .map_err(|e| DomainError::InvalidInstrument(format!("Malformed table: {}", e)))?;

        let specs = entries
            .into_iter()
            .map(InstrumentSpec::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let count = specs.len();
        for spec in specs {
            self.insert(spec);
        }
        Ok(count)
    }

    /// Look up an instrument by user-supplied symbol
    ///
    /// # Errors
    /// - `DomainError::InvalidSymbol` if the symbol is not a currency pair
    /// - `DomainError::UnknownInstrument` if the pair is not in the table
    pub fn get(&self, symbol: &str) -> Result<&InstrumentSpec, DomainError> {
        let pair = Pair::parse(symbol)?;
        self.get_pair(&pair)
    }

    /// Look up an instrument by parsed pair
    ///
    /// # Errors
    /// Returns `DomainError::UnknownInstrument` if the pair is not in the table
    pub fn get_pair(&self, pair: &Pair) -> Result<&InstrumentSpec, DomainError> {
        self.entries
            .get(pair)
            .ok_or_else(|| DomainError::UnknownInstrument(pair.to_string()))
    }

    /// All pairs in the table, sorted
    pub fn pairs(&self) -> Vec<&Pair> {
        let mut pairs: Vec<&Pair> = self.entries.keys().collect();
        pairs.sort();
        pairs
    }

    /// Number of instruments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no instruments
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builtin_table_contents() {
        let table = PipTable::builtin();
        assert_eq!(table.len(), BUILTIN_INSTRUMENTS.len());

        let eurusd = table.get("EUR/USD").unwrap();
        assert_eq!(eurusd.pip_size, dec!(0.0001));
        assert_eq!(eurusd.pip_value, dec!(10));
        assert_eq!(eurusd.contract_size, dec!(100000));
        assert_eq!(eurusd.pip_multiplier(), dec!(10000));
    }

    #[test]
    fn test_yen_pairs_use_two_decimal_pips() {
        let table = PipTable::builtin();
        for symbol in ["USD/JPY", "EUR/JPY", "GBP/JPY"] {
            let spec = table.get(symbol).unwrap();
            assert_eq!(spec.pip_size, dec!(0.01), "{}", symbol);
            assert_eq!(spec.pip_multiplier(), dec!(100), "{}", symbol);
        }
    }

    #[test]
    fn test_lookup_normalises_symbol() {
        let table = PipTable::builtin();
        let a = table.get("gbp-usd").unwrap();
        let b = table.get("GBPUSD").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_lookup_is_stable() {
        let table = PipTable::builtin();
        let first = table.get("AUD/USD").unwrap().clone();
        for _ in 0..3 {
            assert_eq!(table.get("AUD/USD").unwrap(), &first);
        }
    }

    #[test]
    fn test_unknown_instrument() {
        let table = PipTable::builtin();
        let err = table.get("XAU/USD").unwrap_err();
        assert_eq!(err, DomainError::UnknownInstrument("XAU/USD".to_string()));
    }

    #[test]
    fn test_malformed_symbol() {
        let table = PipTable::builtin();
        assert!(matches!(table.get("GOLD"), Err(DomainError::InvalidSymbol(_))));
    }

    #[test]
    fn test_extend_from_json_adds_and_overrides() {
        let mut table = PipTable::builtin();
        let json = r#"[
            {"pair": "XAU/USD", "pipSize": 0.1, "pipValue": 1, "contractSize": 100},
            {"pair": "EUR/USD", "pipSize": 0.0001, "pipValue": 9.5}
        ]"#;

        let loaded = table.extend_from_json(json).unwrap();
        assert_eq!(loaded, 2);

        let gold = table.get("XAUUSD").unwrap();
        assert_eq!(gold.pip_size, dec!(0.1));
        assert_eq!(gold.contract_size, dec!(100));

        let eurusd = table.get("EUR/USD").unwrap();
        assert_eq!(eurusd.pip_value, dec!(9.5));
        assert_eq!(eurusd.contract_size, dec!(100000));
    }

    #[test]
    fn test_extend_from_json_rejects_bad_entry_atomically() {
        let mut table = PipTable::builtin();
        let before = table.len();
        let json = r#"[
            {"pair": "XAG/USD", "pipSize": 0.01},
            {"pair": "XPT/USD", "pipSize": 0}
        ]"#;

        assert!(table.extend_from_json(json).is_err());
        assert_eq!(table.len(), before);
        assert!(table.get("XAG/USD").is_err());
    }

    #[test]
    fn test_pairs_sorted() {
        let table = PipTable::builtin();
        let pairs: Vec<String> = table.pairs().iter().map(|p| p.to_string()).collect();
        let mut sorted = pairs.clone();
        sorted.sort();
        assert_eq!(pairs, sorted);
    }
}
