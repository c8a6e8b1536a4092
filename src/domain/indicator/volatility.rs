//! Realized volatility of daily returns.
//!
//! R[i] = P[i] / P[i-1] - 1 (undefined at i = 0)
//! VOL(n)[i] = sample_stddev(R[i-n+1..=i]) * sqrt(252)
//! Warmup: first n bars are invalid (the window needs n defined returns).

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, TRADING_DAYS_PER_YEAR,
};
use crate::domain::price::PricePoint;

/// Simple daily returns; `None` for the first bar.
pub fn daily_returns(prices: &[PricePoint]) -> Vec<Option<f64>> {
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            i.checked_sub(1)
                .map(|j| p.price / prices[j].price - 1.0)
        })
        .collect()
}

/// Sample standard deviation (n - 1 denominator). `None` below two values.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

pub fn calculate_volatility(prices: &[PricePoint], period: usize) -> IndicatorSeries {
    let returns = daily_returns(prices);
    let mut values = Vec::with_capacity(prices.len());

    for (i, point) in prices.iter().enumerate() {
        let window = if period > 0 && i >= period {
            returns[i + 1 - period..=i]
                .iter()
                .copied()
                .collect::<Option<Vec<f64>>>()
        } else {
            None
        };

        let stddev = window.as_deref().and_then(sample_stddev);
        values.push(IndicatorPoint {
            date: point.date,
            valid: stddev.is_some(),
            value: stddev.map_or(0.0, |s| s * TRADING_DAYS_PER_YEAR.sqrt()),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Volatility(period),
        values,
    }
}
