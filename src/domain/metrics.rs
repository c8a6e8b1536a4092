//! Performance metrics of an equity curve.

use crate::domain::indicator::TRADING_DAYS_PER_YEAR;
use crate::domain::indicator::volatility::sample_stddev;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub cagr: f64,
    /// Annualized volatility of per-bar equity returns.
    pub vol: f64,
    /// CAGR / Vol, or 0 when Vol is 0.
    pub sharpe: f64,
    /// Deepest decline from the running peak, as a non-positive fraction.
    pub max_drawdown: f64,
}

impl Metrics {
    /// `None` when the curve has fewer than two points.
    pub fn compute(equity: &[f64]) -> Option<Self> {
        let (first, last) = match equity {
            [first, .., last] => (*first, *last),
            _ => return None,
        };

        let periods = (equity.len() - 1) as f64;
        let cagr = (last / first).powf(TRADING_DAYS_PER_YEAR / periods) - 1.0;

        let returns: Vec<f64> = equity.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let vol = sample_stddev(&returns).map_or(0.0, |s| s * TRADING_DAYS_PER_YEAR.sqrt());

        let sharpe = if vol > 0.0 { cagr / vol } else { 0.0 };

        Some(Metrics {
            cagr,
            vol,
            sharpe,
            max_drawdown: compute_max_drawdown(equity),
        })
    }
}

fn compute_max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for &value in equity {
        peak = peak.max(value);
        max_dd = max_dd.min(value / peak - 1.0);
    }
    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn too_short_curve_has_no_metrics() {
        assert_eq!(Metrics::compute(&[]), None);
        assert_eq!(Metrics::compute(&[1.0]), None);
    }

    #[test]
    fn flat_curve() {
        let m = Metrics::compute(&[1.0; 10]).unwrap();
        assert_eq!(m.cagr, 0.0);
        assert_eq!(m.vol, 0.0);
        assert_eq!(m.sharpe, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
    }

    #[test]
    fn cagr_one_year_of_bars() {
        let mut equity = vec![1.0; 252];
        equity.push(1.1);
        let m = Metrics::compute(&equity).unwrap();
        assert_relative_eq!(m.cagr, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn cagr_annualizes_by_bar_count() {
        // 126 periods is half a year: 10% becomes 21% annualized
        let mut equity = vec![1.0; 126];
        equity.push(1.1);
        let m = Metrics::compute(&equity).unwrap();
        assert_relative_eq!(m.cagr, 1.1_f64.powi(2) - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn vol_and_sharpe() {
        let equity = [100.0, 110.0, 99.0, 108.9];
        let m = Metrics::compute(&equity).unwrap();
        let expected_vol = sample_stddev(&[0.1, -0.1, 0.1]).unwrap() * 252f64.sqrt();
        assert_relative_eq!(m.vol, expected_vol, epsilon = 1e-9);
        assert_relative_eq!(m.sharpe, m.cagr / m.vol, epsilon = 1e-12);
    }

    #[test]
    fn single_return_has_zero_vol() {
        let m = Metrics::compute(&[1.0, 1.01]).unwrap();
        assert_eq!(m.vol, 0.0);
        assert_eq!(m.sharpe, 0.0);
        assert!(m.cagr > 0.0);
    }

    #[test]
    fn max_drawdown_from_running_peak() {
        let equity = [100.0, 110.0, 90.0, 95.0, 80.0, 100.0];
        let m = Metrics::compute(&equity).unwrap();
        assert_relative_eq!(m.max_drawdown, 80.0 / 110.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn rising_curve_has_no_drawdown() {
        let m = Metrics::compute(&[1.0, 1.1, 1.2, 1.3]).unwrap();
        assert_eq!(m.max_drawdown, 0.0);
        assert!(m.sharpe > 0.0);
    }
}
