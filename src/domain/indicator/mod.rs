//! Technical indicator implementations.
//!
//! Every calculator produces an [`IndicatorSeries`] aligned 1:1 with its input
//! prices. Points inside the warm-up period carry `valid == false`.
//! [`IndicatorSeries::lagged`] shifts a series one bar forward so that the
//! value seen on bar `i` was computed from bars `..i` only.

pub mod momentum;
pub mod sma;
pub mod volatility;

use chrono::NaiveDate;
use std::fmt;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Volatility(usize),
    Momentum { lookback: usize, skip: usize },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Shift values one bar later; the first point becomes invalid.
    pub fn lagged(&self) -> IndicatorSeries {
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, point)| match i.checked_sub(1).map(|j| self.values[j]) {
                Some(prev) => IndicatorPoint {
                    date: point.date,
                    valid: prev.valid,
                    value: prev.value,
                },
                None => IndicatorPoint {
                    date: point.date,
                    valid: false,
                    value: 0.0,
                },
            })
            .collect();
        IndicatorSeries {
            indicator_type: self.indicator_type,
            values,
        }
    }

    /// Value at `index` if it is past warm-up.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Volatility(period) => write!(f, "VOL({})", period),
            IndicatorType::Momentum { lookback, skip } => {
                write!(f, "MOM({},{})", lookback, skip)
            }
        }
    }
}
