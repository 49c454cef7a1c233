//! Position sizing, risk/reward and pip lookup.
//!
//! All three calculators read pip semantics from a [`PipTable`]; none of them
//! holds state between calls.
//!
//! ```text
//! riskAmount    = balance × risk% / 100
//! pipsAtRisk    = |entry − stop| / pipSize
//! lotSize       = round2(riskAmount / (pipsAtRisk × pipValue))
//! positionValue = round2(lotSize × contractSize × entry)
//! ```

use std::sync::Arc;

use pipbook_domain::{Direction, InstrumentSpec, Pair, PipTable, Price, Quantity};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// Pair assumed when a risk/reward request names none
pub const DEFAULT_PAIR: &str = "EUR/USD";

/// Risk/reward at or above this ratio is considered favourable
pub const FAVORABLE_RATIO: Decimal = Decimal::TWO;

/// Round half away from zero to `dp` decimal places.
pub fn round_display(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

fn require_price(value: Decimal, field: &str) -> CalcResult<Price> {
    Price::new(value).map_err(|_| CalcError::invalid(format!("{} must be positive, got {}", field, value)))
}

fn default_pair() -> String {
    DEFAULT_PAIR.to_string()
}

// =============================================================================
// Position Size
// =============================================================================

/// Input of the position-size calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSizingRequest {
    /// Account balance in account currency
    pub account_balance: Decimal,
    /// Percentage of the balance to risk, in (0, 100]
    pub risk_percentage: Decimal,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub pair: String,
}

/// Output of the position-size calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSizingResult {
    /// Standard lots, 2 dp
    pub lot_size: Decimal,
    /// Currency at risk, 2 dp
    pub risk_amount: Decimal,
    /// Notional of the rounded lot size at entry, 2 dp
    pub position_value: Decimal,
    /// Value of one pip per standard lot, 2 dp
    pub pip_value: Decimal,
    /// Entry-to-stop distance in pips, 1 dp
    pub pips_at_risk: Decimal,
}

/// Calculate the lot size that risks `risk_percentage` of the balance.
///
/// # Errors
/// - `CalcError::InvalidInput` if balance or risk is non-positive, risk
///   exceeds 100%, a price is non-positive, entry equals stop, or an
///   intermediate amount does not fit a `Decimal`
/// - `CalcError::UnknownInstrument` if the pair is not in the table
pub fn calculate_position_size(
    table: &PipTable,
    request: &PositionSizingRequest,
) -> CalcResult<PositionSizingResult> {
    if request.account_balance <= Decimal::ZERO {
        return Err(CalcError::invalid(format!(
            "Account balance must be positive, got {}",
            request.account_balance
        )));
    }
    if request.risk_percentage <= Decimal::ZERO || request.risk_percentage > Decimal::ONE_HUNDRED {
        return Err(CalcError::invalid(format!(
            "Risk percentage must be in (0, 100], got {}",
            request.risk_percentage
        )));
    }
    let entry = require_price(request.entry_price, "Entry price")?;
    let stop = require_price(request.stop_loss, "Stop loss")?;
    let spec = table.get(&request.pair)?;

    let pips_at_risk = spec
        .to_pips(entry.distance_to(stop))
        .ok_or_else(|| CalcError::out_of_range("Pips at risk"))?;
    if pips_at_risk <= Decimal::ZERO {
        return Err(CalcError::invalid("Stop loss must be different from entry price"));
    }

    let risk_amount = request
        .account_balance
        .checked_mul(request.risk_percentage)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| CalcError::out_of_range("Risk amount"))?;
    let risk_per_lot = pips_at_risk
        .checked_mul(spec.pip_value)
        .filter(|v| !v.is_zero())
        .ok_or_else(|| CalcError::out_of_range("Risk per lot"))?;
    let lot_size = risk_amount
        .checked_div(risk_per_lot)
        .map(|lots| round_display(lots, 2))
        .ok_or_else(|| CalcError::out_of_range("Lot size"))?;
    // Notional follows the displayed (rounded) lot size
    let position_value = lot_size
        .checked_mul(spec.contract_size)
        .and_then(|v| v.checked_mul(entry.as_decimal()))
        .ok_or_else(|| CalcError::out_of_range("Position value"))?;

    Ok(PositionSizingResult {
        lot_size,
        risk_amount: round_display(risk_amount, 2),
        position_value: round_display(position_value, 2),
        pip_value: round_display(spec.pip_value, 2),
        pips_at_risk: round_display(pips_at_risk, 1),
    })
}

// =============================================================================
// Risk / Reward
// =============================================================================

/// Input of the risk/reward calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRewardRequest {
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    #[serde(default = "default_pair")]
    pub pair: String,
}

/// Output of the risk/reward calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRewardResult {
    /// |entry − stop| in price units
    pub risk: Decimal,
    /// |take profit − entry| in price units
    pub reward: Decimal,
    /// reward / risk, 2 dp
    pub ratio: Decimal,
    /// Risk in pips, 1 dp
    pub risk_pips: Decimal,
    /// Reward in pips, 1 dp
    pub reward_pips: Decimal,
    /// ratio ≥ 2
    pub is_favorable: bool,
}

/// Calculate the reward-to-risk ratio of a planned trade.
///
/// # Errors
/// - `CalcError::InvalidInput` if a price is non-positive, entry equals stop,
///   or the ratio does not fit a `Decimal`
/// - `CalcError::UnknownInstrument` if the pair is not in the table
pub fn calculate_risk_reward(
    table: &PipTable,
    request: &RiskRewardRequest,
) -> CalcResult<RiskRewardResult> {
    let entry = require_price(request.entry_price, "Entry price")?;
    let stop = require_price(request.stop_loss, "Stop loss")?;
    let target = require_price(request.take_profit, "Take profit")?;
    let spec = table.get(&request.pair)?;

    let risk = entry.distance_to(stop);
    if risk.is_zero() {
        return Err(CalcError::invalid("Risk cannot be zero"));
    }
    let reward = target.distance_to(entry);
    let ratio = reward.checked_div(risk).ok_or_else(|| CalcError::out_of_range("Ratio"))?;
    let risk_pips = spec.to_pips(risk).ok_or_else(|| CalcError::out_of_range("Risk in pips"))?;
    let reward_pips = spec
        .to_pips(reward)
        .ok_or_else(|| CalcError::out_of_range("Reward in pips"))?;

    Ok(RiskRewardResult {
        risk,
        reward,
        ratio: round_display(ratio, 2),
        risk_pips: round_display(risk_pips, 1),
        reward_pips: round_display(reward_pips, 1),
        is_favorable: ratio >= FAVORABLE_RATIO,
    })
}

// =============================================================================
// Pip Value Lookup
// =============================================================================

/// Pip semantics of one instrument, as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipValueInfo {
    /// Canonical symbol (e.g. `EUR/USD`)
    pub pair: String,
    pub pip_size: Decimal,
    pub pip_value: Decimal,
    pub contract_size: Decimal,
    /// Pips per unit of price (1 / pip size)
    pub pip_multiplier: Decimal,
}

impl From<&InstrumentSpec> for PipValueInfo {
    fn from(spec: &InstrumentSpec) -> Self {
        Self {
            pair: spec.pair.to_string(),
            pip_size: spec.pip_size,
            pip_value: spec.pip_value,
            contract_size: spec.contract_size,
            pip_multiplier: spec.pip_multiplier(),
        }
    }
}

/// Look up the pip semantics of `symbol`.
///
/// # Errors
/// Returns `CalcError::UnknownInstrument` if the symbol is not in the table
pub fn get_pip_value(table: &PipTable, symbol: &str) -> CalcResult<PipValueInfo> {
    Ok(table.get(symbol)?.into())
}

// =============================================================================
// Trade Profit
// =============================================================================

/// Realised profit of a trade in account currency, 2 dp.
///
/// ```text
/// profit = favourable move / pipSize × pipValue × lots
/// ```
///
/// # Errors
/// Returns `CalcError::InvalidInput` if the profit does not fit a `Decimal`
pub fn trade_profit(
    spec: &InstrumentSpec,
    direction: Direction,
    entry: Price,
    exit: Price,
    lot_size: Quantity,
) -> CalcResult<Decimal> {
    spec.to_pips(direction.favourable_move(entry, exit))
        .and_then(|pips| pips.checked_mul(spec.pip_value))
        .and_then(|v| v.checked_mul(lot_size.as_decimal()))
        .map(|profit| round_display(profit, 2))
        .ok_or_else(|| CalcError::out_of_range("Trade profit"))
}

// =============================================================================
// Calculator
// =============================================================================

/// Facade binding the calculators to a shared pip table.
#[derive(Debug, Clone)]
pub struct Calculator {
    table: Arc<PipTable>,
}

impl Calculator {
    /// Create a calculator over `table`
    pub fn new(table: Arc<PipTable>) -> Self {
        Self { table }
    }

    /// Create a calculator over the built-in table
    pub fn builtin() -> Self {
        Self::new(Arc::new(PipTable::builtin()))
    }

    /// The pip table in use
    pub fn table(&self) -> &PipTable {
        &self.table
    }

    /// See [`calculate_position_size`]
    pub fn position_size(&self, request: &PositionSizingRequest) -> CalcResult<PositionSizingResult> {
        calculate_position_size(&self.table, request)
    }

    /// See [`calculate_risk_reward`]
    pub fn risk_reward(&self, request: &RiskRewardRequest) -> CalcResult<RiskRewardResult> {
        calculate_risk_reward(&self.table, request)
    }

    /// See [`get_pip_value`]
    pub fn pip_value(&self, symbol: &str) -> CalcResult<PipValueInfo> {
        get_pip_value(&self.table, symbol)
    }

    /// Profit of closing `lot_size` of `pair` at `exit`. See [`trade_profit`].
    ///
    /// # Errors
    /// - `CalcError::UnknownInstrument` if the pair is not in the table
    /// - `CalcError::InvalidInput` if the profit does not fit a `Decimal`
    pub fn trade_profit(
        &self,
        pair: &Pair,
        direction: Direction,
        entry: Price,
        exit: Price,
        lot_size: Quantity,
    ) -> CalcResult<Decimal> {
        let spec = self.table.get_pair(pair)?;
        trade_profit(spec, direction, entry, exit, lot_size)
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// Tests
// =============================================================================
