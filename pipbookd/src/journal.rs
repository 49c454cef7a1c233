//! Journal: trade lifecycle and analytics over a trade repository.
//!
//! The journal is responsible for:
//! - Logging new trades (closing them at once when an exit is supplied)
//! - Enforcing that a user only reads and mutates their own trades
//! - Pricing closes through the calculator's pip table
//! - Feeding a user's trades to the summary statistics
//!
//! # Architecture
//!
//! ```text
//! API → Journal → TradeRepository (MemoryStore)
//!          ↓
//!      Calculator (trade profit) / analytics
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use pipbook_domain::{NewTrade, Price, Trade, TradeId, TradeUpdate};
use pipbook_engine::{
    monthly_performance, summarize, wins_by_tag, AnalyticsSummary, CalcError, Calculator,
    MonthlyPerformance, TagStats,
};
use pipbook_store::{StoreError, TradeFilter, TradeRepository};

use crate::error::{DaemonError, DaemonResult};

// =============================================================================
// Journal
// =============================================================================

/// Trade journal service.
pub struct Journal<S: TradeRepository + 'static> {
    /// Trade storage
    store: Arc<S>,
    /// Calculator bound to the daemon's pip table
    calculator: Calculator,
}

impl<S: TradeRepository + 'static> Journal<S> {
    /// Create a new journal.
    pub fn new(store: Arc<S>, calculator: Calculator) -> Self {
        Self { store, calculator }
    }

    /// The calculator used for pricing.
    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// Log a new trade for `user_id`.
    ///
    /// The pair must be in the pip table, since profit is priced from it.
    /// A payload carrying an exit price is stored already closed.
    pub async fn create(&self, user_id: &str, new_trade: NewTrade) -> DaemonResult<Trade> {
        self.calculator
            .table()
            .get_pair(&new_trade.pair)
            .map_err(CalcError::from)?;

        let exit_price = new_trade.exit_price;
        let mut trade = Trade::open(user_id, new_trade);

        if let Some(exit) = exit_price {
            let close_time = trade.open_time;
            self.close_trade(&mut trade, exit, close_time)?;
        }

        self.store.insert(&trade).await?;

        info!(
            trade_id = %trade.id,
            user_id,
            pair = %trade.pair,
            direction = %trade.direction,
            status = trade.status.name(),
            "Trade logged"
        );

        Ok(trade)
    }

    /// List trades matching `filter`, newest first.
    pub async fn list(&self, filter: &TradeFilter) -> DaemonResult<Vec<Trade>> {
        let trades = self.store.find(filter).await?;
        debug!(user_id = %filter.user_id, count = trades.len(), "Trades listed");
        Ok(trades)
    }

    /// Get one trade owned by `user_id`.
    ///
    /// # Errors
    /// - `DaemonError::TradeNotFound` if no trade has this id
    /// - `DaemonError::AccessDenied` if the trade belongs to another user
    pub async fn get(&self, user_id: &str, id: TradeId) -> DaemonResult<Trade> {
        let trade = self.store.find_by_id(id).await?.ok_or(DaemonError::TradeNotFound(id))?;

        if !trade.is_owned_by(user_id) {
            return Err(DaemonError::AccessDenied(id));
        }

        Ok(trade)
    }

    /// Update a trade owned by `user_id`.
    ///
    /// An exit price closes (or re-prices) the trade; its close time defaults
    /// to now. A close time alone only moves the close of a closed trade.
    pub async fn update(
        &self,
        user_id: &str,
        id: TradeId,
        update: TradeUpdate,
    ) -> DaemonResult<Trade> {
        let mut trade = self.get(user_id, id).await?;
        let read_at = trade.updated_at;

        trade.apply_annotations(&update);

        match (update.exit_price, trade.exit_price) {
            (Some(exit), _) => {
                let close_time = update.close_time.unwrap_or_else(Utc::now);
                self.close_trade(&mut trade, exit, close_time)?;
            },
            (None, Some(exit)) => {
                if let Some(close_time) = update.close_time {
                    self.close_trade(&mut trade, exit, close_time)?;
                }
            },
            (None, None) => {},
        }

        self.store.update(&trade, read_at).await.map_err(|e| match e {
            StoreError::NotFound { .. } => DaemonError::TradeNotFound(id),
            e => e.into(),
        })?;

        info!(
            trade_id = %trade.id,
            user_id,
            status = trade.status.name(),
            profit = ?trade.profit,
            "Trade updated"
        );

        Ok(trade)
    }

    /// Delete a trade owned by `user_id`.
    pub async fn delete(&self, user_id: &str, id: TradeId) -> DaemonResult<()> {
        self.get(user_id, id).await?;
        self.store.delete(id).await?;

        info!(trade_id = %id, user_id, "Trade deleted");
        Ok(())
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    /// Summary statistics over all of `user_id`'s trades.
    pub async fn overview(&self, user_id: &str) -> DaemonResult<AnalyticsSummary> {
        let trades = self.store.find_by_user(user_id).await?;
        Ok(summarize(&trades))
    }

    /// Win rate per tag over `user_id`'s closed trades.
    pub async fn wins_by_tag(&self, user_id: &str) -> DaemonResult<BTreeMap<String, TagStats>> {
        let trades = self.store.find_by_user(user_id).await?;
        Ok(wins_by_tag(&trades))
    }

    /// Profit per month over the last `months` months.
    pub async fn monthly_performance(
        &self,
        user_id: &str,
        months: u32,
    ) -> DaemonResult<Vec<MonthlyPerformance>> {
        let trades = self.store.find_by_user(user_id).await?;
        Ok(monthly_performance(&trades, Utc::now(), months))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn close_trade(
        &self,
        trade: &mut Trade,
        exit: Price,
        close_time: chrono::DateTime<Utc>,
    ) -> DaemonResult<()> {
        let profit = self.calculator.trade_profit(
            &trade.pair,
            trade.direction,
            trade.entry_price,
            exit,
            trade.lot_size,
        )?;
        trade.close(exit, profit, close_time)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pipbook_domain::{Direction, Pair, Quantity, TradeStatus};
    use pipbook_store::MemoryStore;
    use rust_decimal_macros::dec;

    fn create_test_journal() -> Journal<MemoryStore> {
        Journal::new(Arc::new(MemoryStore::new()), Calculator::builtin())
    }

    fn new_trade(pair: &str, exit: Option<rust_decimal::Decimal>, tags: &[&str]) -> NewTrade {
        NewTrade {
            pair: Pair::parse(pair).unwrap(),
            entry_price: Price::new(dec!(1.0850)).unwrap(),
            lot_size: Quantity::new(dec!(1)).unwrap(),
            direction: Direction::Long,
            stop_loss: Some(Price::new(dec!(1.0800)).unwrap()),
            take_profit: Some(Price::new(dec!(1.0950)).unwrap()),
            exit_price: exit.map(|e| Price::new(e).unwrap()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_open_trade() {
        let journal = create_test_journal();

        let trade = journal.create("alice", new_trade("EUR/USD", None, &[])).await.unwrap();

        assert_eq!(trade.status, TradeStatus::Open);
        assert_eq!(trade.user_id, "alice");
        assert!(trade.profit.is_none());
        assert!(trade.exit_price.is_none());
    }

    #[tokio::test]
    async fn test_create_with_exit_closes_immediately() {
        let journal = create_test_journal();

        let trade = journal
            .create("alice", new_trade("EUR/USD", Some(dec!(1.0900)), &[]))
            .await
            .unwrap();

        assert_eq!(trade.status, TradeStatus::Closed);
        assert_eq!(trade.profit, Some(dec!(500.00)));
        assert_eq!(trade.close_time, Some(trade.open_time));
    }

    #[tokio::test]
    async fn test_create_unknown_pair_rejected() {
        let journal = create_test_journal();

        let result = journal.create("alice", new_trade("XAU/USD", None, &[])).await;

        assert!(matches!(
            result,
            Err(DaemonError::Calc(CalcError::UnknownInstrument(_)))
        ));
    }

    #[tokio::test]
    async fn test_get_enforces_ownership() {
        let journal = create_test_journal();
        let trade = journal.create("alice", new_trade("EUR/USD", None, &[])).await.unwrap();

        assert_eq!(journal.get("alice", trade.id).await.unwrap().id, trade.id);
        assert!(matches!(
            journal.get("bob", trade.id).await,
            Err(DaemonError::AccessDenied(id)) if id == trade.id
        ));
        assert!(matches!(
            journal.get("alice", uuid::Uuid::now_v7()).await,
            Err(DaemonError::TradeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_closes_trade() {
        let journal = create_test_journal();
        let trade = journal.create("alice", new_trade("EUR/USD", None, &[])).await.unwrap();

        let updated = journal
            .update(
                "alice",
                trade.id,
                TradeUpdate {
                    exit_price: Some(Price::new(dec!(1.0800)).unwrap()),
                    notes: Some("stopped out".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, TradeStatus::Closed);
        assert_eq!(updated.profit, Some(dec!(-500.00)));
        assert_eq!(updated.notes.as_deref(), Some("stopped out"));
        assert!(updated.close_time.is_some());

        let stored = journal.get("alice", trade.id).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_close_time_moves_existing_close() {
        let journal = create_test_journal();
        let trade = journal
            .create("alice", new_trade("EUR/USD", Some(dec!(1.0900)), &[]))
            .await
            .unwrap();
        let later = trade.open_time + Duration::hours(4);

        let updated = journal
            .update(
                "alice",
                trade.id,
                TradeUpdate {
                    close_time: Some(later),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.close_time, Some(later));
        assert_eq!(updated.profit, Some(dec!(500.00)));
    }

    #[tokio::test]
    async fn test_update_close_before_open_rejected() {
        let journal = create_test_journal();
        let trade = journal.create("alice", new_trade("EUR/USD", None, &[])).await.unwrap();

        let result = journal
            .update(
                "alice",
                trade.id,
                TradeUpdate {
                    exit_price: Some(Price::new(dec!(1.0900)).unwrap()),
                    close_time: Some(trade.open_time - Duration::days(1)),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(DaemonError::Domain(_))));
        assert_eq!(journal.get("alice", trade.id).await.unwrap().status, TradeStatus::Open);
    }

    #[tokio::test]
    async fn test_update_after_delete_not_found() {
        let journal = create_test_journal();
        let trade = journal.create("alice", new_trade("EUR/USD", None, &[])).await.unwrap();
        journal.delete("alice", trade.id).await.unwrap();

        let result = journal
            .update(
                "alice",
                trade.id,
                TradeUpdate {
                    exit_price: Some(Price::new(dec!(1.0900)).unwrap()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(DaemonError::TradeNotFound(id)) if id == trade.id));
        assert!(journal.store.find_by_id(trade.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_huge_lot_rejected() {
        let journal = create_test_journal();
        let mut request = new_trade("EUR/USD", None, &[]);
        request.lot_size = Quantity::new(dec!(1000000000000000000000000000)).unwrap();
        let trade = journal.create("alice", request).await.unwrap();

        let result = journal
            .update(
                "alice",
                trade.id,
                TradeUpdate {
                    exit_price: Some(Price::new(dec!(1.0900)).unwrap()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(DaemonError::Calc(CalcError::InvalidInput(_)))));
        assert_eq!(journal.get("alice", trade.id).await.unwrap().status, TradeStatus::Open);
    }

    #[tokio::test]
    async fn test_delete() {
        let journal = create_test_journal();
        let trade = journal.create("alice", new_trade("EUR/USD", None, &[])).await.unwrap();

        assert!(matches!(
            journal.delete("bob", trade.id).await,
            Err(DaemonError::AccessDenied(_))
        ));

        journal.delete("alice", trade.id).await.unwrap();
        assert!(matches!(
            journal.get("alice", trade.id).await,
            Err(DaemonError::TradeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_analytics() {
        let journal = create_test_journal();
        journal
            .create("alice", new_trade("EUR/USD", Some(dec!(1.0900)), &["breakout"]))
            .await
            .unwrap();
        journal
            .create("alice", new_trade("EUR/USD", Some(dec!(1.0825)), &["breakout"]))
            .await
            .unwrap();
        journal.create("alice", new_trade("EUR/USD", None, &[])).await.unwrap();
        journal
            .create("bob", new_trade("EUR/USD", Some(dec!(1.0900)), &[]))
            .await
            .unwrap();

        let summary = journal.overview("alice").await.unwrap();
        assert_eq!(summary.total_trades, 2);
        assert_eq!(summary.total_profit, dec!(250.00));
        assert_eq!(summary.win_rate, dec!(50.00));

        let tags = journal.wins_by_tag("alice").await.unwrap();
        assert_eq!(tags["breakout"].wins, 1);
        assert_eq!(tags["breakout"].total, 2);

        let monthly = journal.monthly_performance("alice", 12).await.unwrap();
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].trades, 2);
        assert_eq!(monthly[0].profit, dec!(250.00));
    }
}
