//! Pipbook Engine Layer
//!
//! Pure decision logic, deterministic, no I/O.
//! Takes a pip table and a request → returns a result or a `CalcError`.

#![warn(clippy::all)]

pub mod analytics;
pub mod calculator;
pub mod error;

pub use analytics::{
    max_drawdown_pct, monthly_performance, summarize, wins_by_tag, AnalyticsSummary,
    MonthlyPerformance, TagStats,
};
pub use calculator::{
    calculate_position_size, calculate_risk_reward, get_pip_value, round_display, trade_profit,
    Calculator, PipValueInfo, PositionSizingRequest, PositionSizingResult, RiskRewardRequest,
    RiskRewardResult,
};
pub use error::{CalcError, CalcResult};
