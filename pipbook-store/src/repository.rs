//! Repository trait definitions (Ports)
//!
//! These traits define the storage interface for the journal.
//! Implementations can be a database, in-memory, or mock for testing.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pipbook_domain::{Pair, Trade, TradeId, TradeStatus};

/// Default page size of a trade listing
pub const DEFAULT_TRADE_LIMIT: usize = 50;

/// Criteria for listing a user's trades
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeFilter {
    /// Owner of the trades
    pub user_id: String,
    /// Only trades in this status
    pub status: Option<TradeStatus>,
    /// Only trades on this pair
    pub pair: Option<Pair>,
    /// Maximum number of trades returned
    pub limit: usize,
}

impl TradeFilter {
    /// All trades of `user_id`, default limit
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            status: None,
            pair: None,
            limit: DEFAULT_TRADE_LIMIT,
        }
    }

    /// Restrict to a status
    pub fn with_status(mut self, status: TradeStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to a pair
    pub fn with_pair(mut self, pair: Pair) -> Self {
        self.pair = Some(pair);
        self
    }

    /// Change the limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether `trade` satisfies every criterion except the limit
    pub fn matches(&self, trade: &Trade) -> bool {
        trade.user_id == self.user_id
            && self.status.map_or(true, |s| trade.status == s)
            && self.pair.as_ref().map_or(true, |p| &trade.pair == p)
    }
}

/// Repository for Trade entities
#[async_trait]
pub trait TradeRepository: Send + Sync {
    /// Insert a new trade; fails if the id already exists
    async fn insert(&self, trade: &Trade) -> Result<(), StoreError>;

    /// Replace a stored trade.
    ///
    /// `read_at` is the `updated_at` of the copy the caller modified. Fails
    /// with `NotFound` if the trade is gone and with `Conflict` if it was
    /// modified since; the stored trade is left untouched in both cases.
    async fn update(&self, trade: &Trade, read_at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Find a trade by ID
    async fn find_by_id(&self, id: TradeId) -> Result<Option<Trade>, StoreError>;

    /// Find trades matching a filter, newest first
    async fn find(&self, filter: &TradeFilter) -> Result<Vec<Trade>, StoreError>;

    /// All trades of a user, unbounded (analytics input)
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Trade>, StoreError>;

    /// Delete a trade
    async fn delete(&self, id: TradeId) -> Result<(), StoreError>;
}
