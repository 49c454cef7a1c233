//! Domain Entities for Pipbook
//!
//! The journal's trade record and its lifecycle (open → closed).

use crate::value_objects::{Direction, DomainError, Pair, Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a Trade
pub type TradeId = Uuid;

/// User owning a trade. Not authenticated; a plain partition key.
pub type UserId = String;

// =============================================================================
// Trade Status
// =============================================================================

/// Lifecycle of a journal trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    /// Position still open, no exit recorded
    Open,
    /// Exit recorded, profit realised
    Closed,
}

impl TradeStatus {
    /// Get the name of the status for display and filtering
    pub fn name(&self) -> &'static str {
        match self {
            TradeStatus::Open => "open",
            TradeStatus::Closed => "closed",
        }
    }

    /// Parse a status filter value (case-insensitive)
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.to_ascii_lowercase().as_str() {
            "open" => Ok(TradeStatus::Open),
            "closed" => Ok(TradeStatus::Closed),
            other => Err(DomainError::InvalidTrade(format!(
                "Unknown status: {}. Expected: open, closed",
                other
            ))),
        }
    }
}

// =============================================================================
// NewTrade
// =============================================================================

/// Payload for logging a new trade
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    pub pair: Pair,
    pub entry_price: Price,
    pub lot_size: Quantity,
    pub direction: Direction,
    #[serde(default)]
    pub stop_loss: Option<Price>,
    #[serde(default)]
    pub take_profit: Option<Price>,
    /// When present the trade is logged already closed
    #[serde(default)]
    pub exit_price: Option<Price>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// TradeUpdate
// =============================================================================

/// Partial update of a trade, usually to close it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeUpdate {
    #[serde(default)]
    pub exit_price: Option<Price>,
    #[serde(default)]
    pub close_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

// =============================================================================
// Trade
// =============================================================================

/// A journal entry for one trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: TradeId,
    pub user_id: UserId,
    pub pair: Pair,
    pub direction: Direction,
    pub entry_price: Price,
    pub lot_size: Quantity,
    pub stop_loss: Option<Price>,
    pub take_profit: Option<Price>,
    pub exit_price: Option<Price>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub status: TradeStatus,

    /// Realised profit in account currency, set when the trade closes
    pub profit: Option<Decimal>,

    pub open_time: DateTime<Utc>,
    pub close_time: Option<DateTime<Utc>>,

    // Audit
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trade {
    /// Open a new trade from a payload
    ///
    /// The exit price of the payload is ignored here; closing is a separate
    /// step because it needs the instrument's pip semantics for profit.
    pub fn open(user_id: impl Into<UserId>, new_trade: NewTrade) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            pair: new_trade.pair,
            direction: new_trade.direction,
            entry_price: new_trade.entry_price,
            lot_size: new_trade.lot_size,
            stop_loss: new_trade.stop_loss,
            take_profit: new_trade.take_profit,
            exit_price: None,
            tags: new_trade.tags,
            notes: new_trade.notes,
            status: TradeStatus::Open,
            profit: None,
            open_time: now,
            close_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if trade is closed
    pub fn is_closed(&self) -> bool {
        self.status == TradeStatus::Closed
    }

    /// Check if the trade belongs to `user_id`
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Record the exit and realised profit
    ///
    /// Closing an already-closed trade re-prices it (exit corrections).
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTrade` if `close_time` precedes `open_time`
    pub fn close(
        &mut self,
        exit_price: Price,
        profit: Decimal,
        close_time: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if close_time < self.open_time {
            return Err(DomainError::InvalidTrade(format!(
                "Close time {} precedes open time {}",
                close_time, self.open_time
            )));
        }

        self.exit_price = Some(exit_price);
        self.profit = Some(profit);
        self.close_time = Some(close_time);
        self.status = TradeStatus::Closed;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply the non-pricing fields of an update (notes, tags)
    pub fn apply_annotations(&mut self, update: &TradeUpdate) {
        if let Some(notes) = &update.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(tags) = &update.tags {
            self.tags = tags.clone();
        }
        self.updated_at = Utc::now();
    }

    /// Whether this trade counts towards realised statistics
    pub fn realised_profit(&self) -> Option<Decimal> {
        match self.status {
            TradeStatus::Closed => self.profit,
            TradeStatus::Open => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
