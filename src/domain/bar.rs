//! Indicator snapshot per simulated bar.
//!
//! [`prepare_bars`] runs once before the simulation loop: it computes every
//! indicator, lags the moving averages and volatility by one bar, and drops
//! the warm-up rows. The state machine therefore only ever sees bars whose
//! indicators are complete and derived from strictly earlier prices.

use crate::domain::indicator::momentum::calculate_momentum;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::volatility::{calculate_volatility, daily_returns};
use crate::domain::params::StrategyParameters;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

/// Momentum value used when the momentum filter is disabled.
pub const MOMENTUM_PASS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub price: f64,
    pub ret: f64,
    /// Annualized volatility of returns up to the previous bar.
    pub vol: f64,
    pub ma_fast: f64,
    pub ma_slow: f64,
    pub trend: bool,
    pub momentum: f64,
    /// Trend AND momentum > 0.
    pub filter: bool,
}

pub fn prepare_bars(prices: &[PricePoint], params: &StrategyParameters) -> Vec<Bar> {
    let returns = daily_returns(prices);
    let vol = calculate_volatility(prices, params.vol_window).lagged();
    let ma_fast = calculate_sma(prices, params.fast).lagged();
    let ma_slow = calculate_sma(prices, params.slow).lagged();
    let momentum = params
        .use_momentum
        .then(|| calculate_momentum(prices, params.momentum_lookback, params.momentum_skip));

    prices
        .iter()
        .enumerate()
        .filter_map(|(i, point)| {
            let ret = returns[i]?;
            let vol = vol.get(i)?;
            let ma_fast = ma_fast.get(i)?;
            let ma_slow = ma_slow.get(i)?;
            let momentum = match &momentum {
                Some(series) => series.get(i)?,
                None => MOMENTUM_PASS,
            };
            let trend = ma_fast > ma_slow;

            Some(Bar {
                date: point.date,
                price: point.price,
                ret,
                vol,
                ma_fast,
                ma_slow,
                trend,
                momentum,
                filter: trend && momentum > 0.0,
            })
        })
        .collect()
}
