//! Summary statistics over realised trades.
//!
//! Only closed trades carrying a profit count. Open trades are ignored by
//! every statistic except the overall trade count of an empty summary.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use pipbook_domain::Trade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::round_display;

/// Days counted per month when sizing a performance window
pub const DAYS_PER_MONTH: i64 = 30;

/// Win counts for one tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStats {
    pub wins: usize,
    pub total: usize,
    /// Percentage, 2 dp
    pub win_rate: Decimal,
}

/// Overall journal performance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_trades: usize,
    pub win_rate: Decimal,
    pub total_profit: Decimal,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub profit_factor: Decimal,
    pub max_drawdown: Decimal,
    pub best_trade: Decimal,
    pub worst_trade: Decimal,
    pub wins_by_tag: BTreeMap<String, TagStats>,
}

impl AnalyticsSummary {
    /// All-zero summary reporting `total_trades`
    pub fn empty(total_trades: usize) -> Self {
        Self {
            total_trades,
            win_rate: Decimal::ZERO,
            total_profit: Decimal::ZERO,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            profit_factor: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            best_trade: Decimal::ZERO,
            worst_trade: Decimal::ZERO,
            wins_by_tag: BTreeMap::new(),
        }
    }
}

/// Profit for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPerformance {
    /// `YYYY-MM`
    pub month: String,
    pub profit: Decimal,
    pub trades: usize,
}

fn realised(trades: &[Trade]) -> Vec<&Trade> {
    trades.iter().filter(|t| t.realised_profit().is_some()).collect()
}

fn percentage(part: usize, whole: usize) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(part) / Decimal::from(whole) * Decimal::ONE_HUNDRED
}

/// Sum clamped to the `Decimal` range
fn total(values: &[Decimal]) -> Decimal {
    values.iter().fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    total(values) / Decimal::from(values.len())
}

/// Summarise a user's trades.
///
/// When no trade is realised yet, returns [`AnalyticsSummary::empty`] with
/// the count of all supplied trades.
pub fn summarize(trades: &[Trade]) -> AnalyticsSummary {
    let closed = realised(trades);
    if closed.is_empty() {
        return AnalyticsSummary::empty(trades.len());
    }

    let profits: Vec<Decimal> = closed.iter().filter_map(|t| t.profit).collect();
    let wins: Vec<Decimal> = profits.iter().copied().filter(|p| *p > Decimal::ZERO).collect();
    let losses: Vec<Decimal> = profits.iter().copied().filter(|p| *p < Decimal::ZERO).collect();

    let gross_profit = total(&wins);
    let gross_loss = total(&losses).abs();
    let profit_factor = if gross_loss > Decimal::ZERO {
        gross_profit.checked_div(gross_loss).unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    };

    let best = profits.iter().copied().max().unwrap_or_default();
    let worst = profits.iter().copied().min().unwrap_or_default();

    AnalyticsSummary {
        total_trades: closed.len(),
        win_rate: round_display(percentage(wins.len(), closed.len()), 2),
        total_profit: round_display(total(&profits), 2),
        average_win: round_display(mean(&wins), 2),
        average_loss: round_display(mean(&losses), 2),
        profit_factor: round_display(profit_factor, 2),
        max_drawdown: round_display(max_drawdown_pct(trades), 2),
        best_trade: round_display(best, 2),
        worst_trade: round_display(worst, 2),
        wins_by_tag: wins_by_tag(trades),
    }
}

/// Largest fall of cumulative profit from its running peak, as a percentage
/// of that peak. Trades are replayed in close-time order.
///
/// Drawdown is only measured once the running peak is above zero.
pub fn max_drawdown_pct(trades: &[Trade]) -> Decimal {
    let mut closed = realised(trades);
    closed.sort_by_key(|t| t.close_time);

    let mut equity = Decimal::ZERO;
    let mut peak = Decimal::ZERO;
    let mut max_drawdown = Decimal::ZERO;

    for trade in closed {
        equity = equity.saturating_add(trade.profit.unwrap_or_default());
        if equity > peak {
            peak = equity;
        }
        if peak > Decimal::ZERO {
            let drawdown = peak.saturating_sub(equity).checked_div(peak).unwrap_or(Decimal::MAX);
            max_drawdown = max_drawdown.max(drawdown);
        }
    }

    max_drawdown.saturating_mul(Decimal::ONE_HUNDRED)
}

/// Win rate per tag across realised trades
pub fn wins_by_tag(trades: &[Trade]) -> BTreeMap<String, TagStats> {
    let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();

    for trade in realised(trades) {
        let is_win = trade.profit.is_some_and(|p| p > Decimal::ZERO);
        for tag in &trade.tags {
            let entry = counts.entry(tag.clone()).or_default();
            entry.1 += 1;
            if is_win {
                entry.0 += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(tag, (wins, total))| {
            let stats = TagStats {
                wins,
                total,
                win_rate: round_display(percentage(wins, total), 2),
            };
            (tag, stats)
        })
        .collect()
}

/// Profit per calendar month for trades closed in the last `months` months
/// (each counted as [`DAYS_PER_MONTH`] days) up to `now`, oldest first.
///
/// A window reaching past the earliest representable date starts there.
pub fn monthly_performance(trades: &[Trade], now: DateTime<Utc>, months: u32) -> Vec<MonthlyPerformance> {
    let start = Duration::try_days(i64::from(months) * DAYS_PER_MONTH)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut buckets: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();

    for trade in realised(trades) {
        let Some(close_time) = trade.close_time else {
            continue;
        };
        if close_time < start || close_time > now {
            continue;
        }
        let bucket = buckets.entry(close_time.format("%Y-%m").to_string()).or_default();
        bucket.0 = bucket.0.saturating_add(trade.profit.unwrap_or_default());
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(month, (profit, trades))| MonthlyPerformance {
            month,
            profit: round_display(profit, 2),
            trades,
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pipbook_domain::{Direction, NewTrade, Pair, Price, Quantity};
    use rust_decimal_macros::dec;

    fn trade(profit: Option<Decimal>, close_time: Option<DateTime<Utc>>, tags: &[&str]) -> Trade {
        let mut trade = Trade::open(
            "demo_user",
            NewTrade {
                pair: Pair::parse("EUR/USD").unwrap(),
                entry_price: Price::new(dec!(1.0850)).unwrap(),
                lot_size: Quantity::new(dec!(1)).unwrap(),
                direction: Direction::Long,
                stop_loss: None,
                take_profit: None,
                exit_price: None,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                notes: None,
            },
        );
        if let (Some(profit), Some(close_time)) = (profit, close_time) {
            // Backdate so close_time never precedes open_time
            trade.open_time = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
            trade.close(Price::new(dec!(1.0900)).unwrap(), profit, close_time).unwrap();
        }
        trade
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_summary_of_no_trades() {
        assert_eq!(summarize(&[]), AnalyticsSummary::empty(0));
    }

    #[test]
    fn test_summary_with_only_open_trades_counts_them() {
        let trades = vec![trade(None, None, &[]), trade(None, None, &[])];
        let summary = summarize(&trades);
        assert_eq!(summary.total_trades, 2);
        assert_eq!(summary.win_rate, Decimal::ZERO);
    }

    #[test]
    fn test_summary_metrics() {
        let trades = vec![
            trade(Some(dec!(100)), Some(at(2024, 1, 1)), &[]),
            trade(Some(dec!(-50)), Some(at(2024, 1, 2)), &[]),
            trade(Some(dec!(20)), Some(at(2024, 1, 3)), &[]),
            trade(None, None, &[]),
        ];
        let summary = summarize(&trades);

        assert_eq!(summary.total_trades, 3);
        assert_eq!(summary.win_rate, dec!(66.67));
        assert_eq!(summary.total_profit, dec!(70));
        assert_eq!(summary.average_win, dec!(60));
        assert_eq!(summary.average_loss, dec!(-50));
        assert_eq!(summary.profit_factor, dec!(2.40)); // 120 / 50
        assert_eq!(summary.max_drawdown, dec!(50));
        assert_eq!(summary.best_trade, dec!(100));
        assert_eq!(summary.worst_trade, dec!(-50));
    }

    #[test]
    fn test_profit_factor_zero_without_losses() {
        let trades = vec![trade(Some(dec!(10)), Some(at(2024, 1, 1)), &[])];
        assert_eq!(summarize(&trades).profit_factor, Decimal::ZERO);
    }

    #[test]
    fn test_max_drawdown_replays_in_close_order() {
        // Supplied out of order: +20 (day 3), -50 (day 2), +100 (day 1)
        let trades = vec![
            trade(Some(dec!(20)), Some(at(2024, 1, 3)), &[]),
            trade(Some(dec!(-50)), Some(at(2024, 1, 2)), &[]),
            trade(Some(dec!(100)), Some(at(2024, 1, 1)), &[]),
        ];
        assert_eq!(max_drawdown_pct(&trades), dec!(50));
    }

    #[test]
    fn test_max_drawdown_ignores_losses_before_first_peak() {
        let trades = vec![
            trade(Some(dec!(-30)), Some(at(2024, 1, 1)), &[]),
            trade(Some(dec!(-10)), Some(at(2024, 1, 2)), &[]),
        ];
        assert_eq!(max_drawdown_pct(&trades), Decimal::ZERO);
    }

    #[test]
    fn test_wins_by_tag() {
        let trades = vec![
            trade(Some(dec!(10)), Some(at(2024, 1, 1)), &["breakout", "london"]),
            trade(Some(dec!(-5)), Some(at(2024, 1, 2)), &["breakout"]),
            trade(Some(dec!(7)), Some(at(2024, 1, 3)), &["breakout"]),
            trade(None, None, &["breakout"]),
        ];
        let by_tag = wins_by_tag(&trades);

        let breakout = &by_tag["breakout"];
        assert_eq!((breakout.wins, breakout.total), (2, 3));
        assert_eq!(breakout.win_rate, dec!(66.67));

        let london = &by_tag["london"];
        assert_eq!((london.wins, london.total), (1, 1));
        assert_eq!(london.win_rate, dec!(100));
    }

    #[test]
    fn test_monthly_performance_window_and_grouping() {
        let now = at(2024, 6, 15);
        let trades = vec![
            trade(Some(dec!(10)), Some(at(2024, 5, 2)), &[]),
            trade(Some(dec!(15.555)), Some(at(2024, 5, 20)), &[]),
            trade(Some(dec!(-4)), Some(at(2024, 6, 1)), &[]),
            trade(Some(dec!(99)), Some(at(2023, 1, 1)), &[]), // outside 3-month window
            trade(None, None, &[]),
        ];
        let monthly = monthly_performance(&trades, now, 3);

        assert_eq!(
            monthly,
            vec![
                MonthlyPerformance { month: "2024-05".to_string(), profit: dec!(25.56), trades: 2 },
                MonthlyPerformance { month: "2024-06".to_string(), profit: dec!(-4), trades: 1 },
            ]
        );
    }

    #[test]
    fn test_monthly_performance_window_past_calendar_start() {
        let now = at(2024, 6, 15);
        let trades = vec![trade(Some(dec!(10)), Some(at(2021, 3, 1)), &[])];

        for months in [10_000_000, u32::MAX] {
            let monthly = monthly_performance(&trades, now, months);
            assert_eq!(
                monthly,
                vec![MonthlyPerformance { month: "2021-03".to_string(), profit: dec!(10), trades: 1 }]
            );
        }
    }

    #[test]
    fn test_summary_clamps_at_decimal_range() {
        let trades = vec![
            trade(Some(Decimal::MAX), Some(at(2024, 1, 1)), &[]),
            trade(Some(Decimal::MAX), Some(at(2024, 1, 2)), &[]),
            trade(Some(dec!(-0.01)), Some(at(2024, 1, 3)), &[]),
        ];
        let summary = summarize(&trades);

        assert_eq!(summary.total_trades, 3);
        assert_eq!(summary.best_trade, Decimal::MAX);
        assert!(summary.total_profit > Decimal::ZERO);
        assert_eq!(summary.profit_factor, Decimal::MAX);
    }

    #[test]
    fn test_summary_json_shape() {
        let value = serde_json::to_value(AnalyticsSummary::empty(0)).unwrap();
        for key in ["totalTrades", "winRate", "profitFactor", "maxDrawdown", "winsByTag"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }
}
