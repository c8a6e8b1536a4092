//! Skip-month momentum.
//!
//! MOM(lookback, skip)[i] = P[i-skip] / P[i-lookback] - 1
//! Warmup: first `lookback` bars invalid. The value on bar `i` only reads
//! prices at least `skip` bars old, so it needs no extra lag.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;

pub fn calculate_momentum(prices: &[PricePoint], lookback: usize, skip: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(prices.len());

    for (i, point) in prices.iter().enumerate() {
        let valid = i >= lookback && i >= skip;
        let value = if valid {
            prices[i - skip].price / prices[i - lookback].price - 1.0
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
        indicator_type: IndicatorType::Momentum { lookback, skip },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_prices(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                price,
            })
            .collect()
    }

    #[test]
    fn momentum_warmup() {
        let series = calculate_momentum(&make_prices(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3, 1);
        assert!(!series.values[0].valid);
        assert!(!series.values[2].valid);
        assert!(series.values[3].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn momentum_uses_skipped_price() {
        let series = calculate_momentum(&make_prices(&[100.0, 120.0, 150.0, 90.0]), 3, 1);
        // P[2] / P[0] - 1; the same-bar price of 90 is not used
        assert!((series.values[3].value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn momentum_negative() {
        let series = calculate_momentum(&make_prices(&[100.0, 80.0, 70.0]), 2, 0);
        assert!(series.values[2].value < 0.0);
        assert!((series.values[2].value + 0.3).abs() < 1e-12);
    }

    #[test]
    fn momentum_indicator_type() {
        let series = calculate_momentum(&make_prices(&[1.0]), 252, 21);
        assert_eq!(
            series.indicator_type,
            IndicatorType::Momentum {
                lookback: 252,
                skip: 21
            }
        );
    }
}
