#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::io::Write;
use trendwalk::domain::params::StrategyParameters;
use trendwalk::domain::price::{PricePoint, PriceSeries};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// One observation per calendar day starting at `start`.
pub fn series_from_fn(start: NaiveDate, count: usize, price: impl Fn(usize) -> f64) -> PriceSeries {
    let points = (0..count)
        .map(|i| PricePoint {
            date: start + Duration::days(i as i64),
            price: price(i),
        })
        .collect();
    PriceSeries::new(points).unwrap()
}

pub fn series_from_prices(start: NaiveDate, prices: &[f64]) -> PriceSeries {
    series_from_fn(start, prices.len(), |i| prices[i])
}

pub fn constant_series(start: NaiveDate, count: usize, price: f64) -> PriceSeries {
    series_from_fn(start, count, |_| price)
}

/// Price compounding at `daily_growth` per bar.
pub fn rising_series(start: NaiveDate, count: usize, daily_growth: f64) -> PriceSeries {
    series_from_fn(start, count, |i| 100.0 * (1.0 + daily_growth).powi(i as i32))
}

/// Deterministic trending series with slow cycles and fast wiggles, enough
/// to produce entries, trailing exits and stops.
pub fn wave_series(start: NaiveDate, count: usize) -> PriceSeries {
    series_from_fn(start, count, |i| {
        let t = i as f64;
        100.0 * (0.0003 * t + 0.25 * (t / 60.0).sin() + 0.03 * (t * 1.7).sin()).exp()
    })
}

/// Prices compounded from a return sequence.
pub fn series_from_returns(start: NaiveDate, returns: &[f64]) -> PriceSeries {
    let mut price = 100.0;
    let mut prices = Vec::with_capacity(returns.len() + 1);
    prices.push(price);
    for r in returns {
        price *= 1.0 + r;
        prices.push(price);
    }
    series_from_prices(start, &prices)
}

/// Short windows so small synthetic series get past warm-up.
pub fn short_window_params() -> StrategyParameters {
    StrategyParameters {
        fast: 5,
        slow: 20,
        vol_window: 10,
        momentum_lookback: 30,
        momentum_skip: 5,
        ..StrategyParameters::default()
    }
}

pub fn write_temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// CSV text in the `Data,Zamkniecie` layout of the daily index files.
pub fn to_csv(series: &PriceSeries) -> String {
    let mut out = String::from("Data,Otwarcie,Zamkniecie\n");
    for p in series.points() {
        out.push_str(&format!("{},{},{}\n", p.date, p.price, p.price));
    }
    out
}
