//! In-memory store implementation
//!
//! Used by the daemon and in tests; trades live for the process lifetime.
//! Thread-safe using an async RwLock for concurrent access.

use crate::error::StoreError;
use crate::repository::{TradeFilter, TradeRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pipbook_domain::{Trade, TradeId};
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory trade store
pub struct MemoryStore {
    trades: RwLock<HashMap<TradeId, Trade>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            trades: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of trades
    pub async fn trade_count(&self) -> usize {
        self.trades.read().await.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Trade Repository Implementation
// =============================================================================

#[async_trait]
impl TradeRepository for MemoryStore {
    async fn insert(&self, trade: &Trade) -> Result<(), StoreError> {
        let mut trades = self.trades.write().await;
        if trades.contains_key(&trade.id) {
            return Err(StoreError::duplicate("trade", trade.id.to_string()));
        }
        trades.insert(trade.id, trade.clone());
        debug!(trade_id = %trade.id, "Trade inserted");
        Ok(())
    }

    async fn update(&self, trade: &Trade, read_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut trades = self.trades.write().await;
        let stored = trades
            .get_mut(&trade.id)
            .ok_or_else(|| StoreError::not_found("trade", trade.id.to_string()))?;
        if stored.updated_at != read_at {
            return Err(StoreError::conflict("trade", trade.id.to_string()));
        }
        *stored = trade.clone();
        debug!(trade_id = %trade.id, "Trade updated");
        Ok(())
    }

    async fn find_by_id(&self, id: TradeId) -> Result<Option<Trade>, StoreError> {
        let trades = self.trades.read().await;
        Ok(trades.get(&id).cloned())
    }

    async fn find(&self, filter: &TradeFilter) -> Result<Vec<Trade>, StoreError> {
        let trades = self.trades.read().await;
        let mut found: Vec<Trade> = trades.values().filter(|t| filter.matches(t)).cloned().collect();
        // v7 ids are time-ordered, so they break created_at ties deterministically
        found.sort_by_key(|t| Reverse((t.created_at, t.id)));
        found.truncate(filter.limit);
        Ok(found)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Trade>, StoreError> {
        let trades = self.trades.read().await;
        Ok(trades.values().filter(|t| t.is_owned_by(user_id)).cloned().collect())
    }

    async fn delete(&self, id: TradeId) -> Result<(), StoreError> {
        let mut trades = self.trades.write().await;
        if trades.remove(&id).is_some() {
            debug!(trade_id = %id, "Trade deleted");
            Ok(())
        } else {
            Err(StoreError::not_found("trade", id.to_string()))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
