//! Trade log summary statistics.

use crate::domain::position::Trade;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeAnalysis {
    pub trades: usize,
    /// Fraction of trades with a positive return; 0 for an empty log.
    pub win_rate: f64,
    /// Mean return of winning trades, `None` without winners.
    pub avg_win: Option<f64>,
    /// Mean return of losing trades, `None` without losers.
    pub avg_loss: Option<f64>,
    /// Gross gains over gross losses; infinite when nothing was lost.
    pub profit_factor: f64,
    pub avg_holding_days: f64,
}

impl TradeAnalysis {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut wins = Vec::new();
        let mut losses = Vec::new();
        for trade in trades {
            if trade.realized_return > 0.0 {
                wins.push(trade.realized_return);
            } else if trade.realized_return < 0.0 {
                losses.push(trade.realized_return);
            }
        }

        let gross_win: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().sum::<f64>().abs();

        let profit_factor = if gross_loss == 0.0 {
            f64::INFINITY
        } else {
            gross_win / gross_loss
        };

        let total_days: i64 = trades.iter().map(|t| t.holding_days).sum();

        TradeAnalysis {
            trades: trades.len(),
            win_rate: ratio(wins.len() as f64, trades.len()),
            avg_win: mean(&wins),
            avg_loss: mean(&losses),
            profit_factor,
            avg_holding_days: ratio(total_days as f64, trades.len()),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn ratio(numerator: f64, count: usize) -> f64 {
    if count > 0 {
        numerator / count as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{EntryReason, ExitReason};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_trade(ret: f64, days: i64) -> Trade {
        let entry_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Trade {
            entry_date,
            exit_date: entry_date + chrono::Duration::days(days),
            entry_price: 100.0,
            exit_price: 100.0 * (1.0 + ret),
            realized_return: ret,
            holding_days: days,
            entry_reason: EntryReason::Breakout,
            exit_reason: ExitReason::Filter,
        }
    }

    #[test]
    fn empty_log() {
        let a = TradeAnalysis::from_trades(&[]);
        assert_eq!(a.trades, 0);
        assert_eq!(a.win_rate, 0.0);
        assert_eq!(a.avg_win, None);
        assert_eq!(a.avg_loss, None);
        assert!(a.profit_factor.is_infinite());
        assert_eq!(a.avg_holding_days, 0.0);
    }

    #[test]
    fn wins_and_losses() {
        let trades = vec![
            make_trade(0.10, 5),
            make_trade(-0.05, 3),
            make_trade(0.20, 10),
            make_trade(-0.03, 2),
        ];
        let a = TradeAnalysis::from_trades(&trades);

        assert_eq!(a.trades, 4);
        assert_relative_eq!(a.win_rate, 0.5);
        assert_relative_eq!(a.avg_win.unwrap(), 0.15, epsilon = 1e-12);
        assert_relative_eq!(a.avg_loss.unwrap(), -0.04, epsilon = 1e-12);
        assert_relative_eq!(a.profit_factor, 0.30 / 0.08, epsilon = 1e-9);
        assert_relative_eq!(a.avg_holding_days, 5.0);
    }

    #[test]
    fn no_losers_gives_infinite_profit_factor() {
        let a = TradeAnalysis::from_trades(&[make_trade(0.1, 4), make_trade(0.2, 6)]);
        assert!(a.profit_factor.is_infinite());
        assert_eq!(a.avg_loss, None);
        assert_relative_eq!(a.win_rate, 1.0);
    }

    #[test]
    fn breakeven_counts_as_neither() {
        let a = TradeAnalysis::from_trades(&[make_trade(0.0, 1), make_trade(-0.1, 1)]);
        assert_relative_eq!(a.win_rate, 0.0);
        assert_eq!(a.avg_win, None);
        assert_eq!(a.profit_factor, 0.0);
    }
}
