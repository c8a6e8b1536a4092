//! Breakout/trend strategy simulation.
//!
//! A single-asset state machine over prepared [`Bar`]s. Each bar is handled
//! exactly once, in date order:
//!
//! 1. grow equity by the position's return (or the safe rate while flat)
//! 2. if long, raise the running high and test the stop-loss, then the
//!    trailing/filter exit; a stop takes precedence
//! 3. close the position on any exit, paying [`TRANSACTION_COST`]
//! 4. if flat, lower the running low and test the breakout entry
//! 5. record the equity point
//!
//! A position still open after the last bar is liquidated at the last price
//! as a `SAMPLE_END` trade. That liquidation does not pay the transaction
//! cost; normal exits do.
//!
//! Equity stays strictly positive as long as `size * ret > -1` on every bar.
//! With `max_leverage <= 1` that holds for any positive price series; above
//! 1 a single-bar fall worse than `-1 / max_leverage` wipes the account out.
//! Configuration caps `max_leverage` at
//! [`MAX_LEVERAGE_LIMIT`](crate::domain::config_validation::MAX_LEVERAGE_LIMIT).

use crate::domain::bar::{Bar, prepare_bars};
use crate::domain::indicator::TRADING_DAYS_PER_YEAR;
use crate::domain::metrics::Metrics;
use crate::domain::params::StrategyParameters;
use crate::domain::position::{EntryReason, ExitReason, OpenPosition, PositionState, Trade};
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Round-trip cost of a signal exit: 5 basis points.
pub const TRANSACTION_COST: f64 = 0.0005;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    /// Position size held at the close of the bar; 0 while flat.
    pub exposure: f64,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub bars: Vec<Bar>,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub metrics: Metrics,
}

struct Simulator<'a> {
    params: &'a StrategyParameters,
    state: PositionState,
    equity: f64,
    equity_curve: Vec<EquityPoint>,
    trades: Vec<Trade>,
}

impl<'a> Simulator<'a> {
    fn new(params: &'a StrategyParameters, capacity: usize) -> Self {
        Self {
            params,
            state: PositionState::default(),
            equity: 1.0,
            equity_curve: Vec::with_capacity(capacity),
            trades: Vec::new(),
        }
    }

    fn step(&mut self, bar: &Bar) {
        let daily_safe = self.params.safe_rate / TRADING_DAYS_PER_YEAR;
        let price = bar.price;

        match &self.state {
            PositionState::Long(open) => self.equity *= 1.0 + open.size * bar.ret + daily_safe,
            PositionState::Flat { .. } => self.equity *= 1.0 + daily_safe,
        }

        if let PositionState::Long(open) = &mut self.state {
            open.running_max = open.running_max.max(price);

            let mut exit_reason = None;
            let drawdown = (price - open.entry_price) / open.entry_price;
            if drawdown < -self.params.stop_loss {
                exit_reason = Some(ExitReason::Stop);
            }
            let trailing_breached = price < (1.0 - self.params.x) * open.running_max;
            if (trailing_breached || !bar.filter) && exit_reason.is_none() {
                exit_reason = Some(ExitReason::Filter);
            }

            if let Some(reason) = exit_reason {
                let trade = Trade::close(open, bar.date, price, TRANSACTION_COST, reason);
                self.trades.push(trade);
                self.state = PositionState::Flat {
                    running_min: Some(price),
                };
            }
        }

        if let PositionState::Flat { running_min } = self.state {
            let low = running_min.map_or(price, |m| m.min(price));
            self.state = if price > (1.0 + self.params.y) * low && bar.filter {
                PositionState::Long(OpenPosition {
                    size: self.position_size(bar.vol),
                    entry_price: price,
                    entry_date: bar.date,
                    entry_reason: EntryReason::Breakout,
                    running_max: price,
                })
            } else {
                PositionState::Flat {
                    running_min: Some(low),
                }
            };
        }

        self.equity_curve.push(EquityPoint {
            date: bar.date,
            equity: self.equity,
            exposure: self.state.exposure(),
        });
    }

    /// Inverse-volatility sizing, capped at `max_leverage`.
    fn position_size(&self, vol: f64) -> f64 {
        let size = if vol.is_finite() && vol > 0.0 {
            self.params.target_vol / vol
        } else {
            1.0
        };
        size.min(self.params.max_leverage)
    }

    fn finish(mut self, last: Option<&Bar>) -> (Vec<EquityPoint>, Vec<Trade>) {
        if let (PositionState::Long(open), Some(bar)) = (&self.state, last) {
            self.trades.push(Trade::close(
                open,
                bar.date,
                bar.price,
                0.0,
                ExitReason::SampleEnd,
            ));
        }
        (self.equity_curve, self.trades)
    }
}

/// Run the state machine over already-prepared bars.
pub fn simulate(bars: &[Bar], params: &StrategyParameters) -> (Vec<EquityPoint>, Vec<Trade>) {
    let mut sim = Simulator::new(params, bars.len());
    for bar in bars {
        sim.step(bar);
    }
    sim.finish(bars.last())
}

/// Full pipeline on a raw price series: indicators, simulation, metrics.
///
/// Returns `None` when the series is shorter than
/// [`StrategyParameters::required_history`] or leaves fewer than two bars
/// after indicator warm-up.
pub fn run_backtest(series: &PriceSeries, params: &StrategyParameters) -> Option<BacktestResult> {
    let minimum = params.required_history();
    if series.len() < minimum {
        debug!(bars = series.len(), minimum, "series too short, no result");
        return None;
    }

    let bars = prepare_bars(series.points(), params);
    if bars.len() < 2 {
        debug!(bars = bars.len(), "too few bars after warm-up, no result");
        return None;
    }

    let (equity_curve, trades) = simulate(&bars, params);
    let equity: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
    let metrics = Metrics::compute(&equity)?;

    Some(BacktestResult {
        bars,
        equity_curve,
        trades,
        metrics,
    })
}
