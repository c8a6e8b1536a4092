//! Simple moving average of prices.
//!
//! SMA(n)[i] = sum(P[i-j] for j in 0..n) / n
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;

pub fn calculate_sma(prices: &[PricePoint], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(prices.len());
    let mut window_sum = 0.0_f64;

    for (i, point) in prices.iter().enumerate() {
        window_sum += point.price;
        if period > 0 && i >= period {
            window_sum -= prices[i - period].price;
        }

        let valid = period > 0 && i + 1 >= period;
        let value = if valid {
            window_sum / period as f64
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            date: point.date,
            valid,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
