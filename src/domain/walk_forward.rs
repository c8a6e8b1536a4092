//! Walk-forward parameter optimization.
//!
//! The series is cut into rolling windows: `train_years` of in-sample data
//! followed by `test_years` of out-of-sample data, advancing by
//! `test_years` each step. On every window the full [`ParameterGrid`] is
//! backtested on the train slice, the best-scoring combination is chosen,
//! and that combination alone is backtested on the test slice.
//!
//! Grid evaluations are independent and may run on the rayon pool. Scores
//! are collected back into grid order before the winner is picked, so the
//! tie-break (earliest combination wins) does not depend on scheduling.

use crate::domain::backtest::run_backtest;
use crate::domain::metrics::Metrics;
use crate::domain::params::StrategyParameters;
use crate::domain::price::PriceSeries;
use chrono::{Months, NaiveDate};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Candidate values searched on each train window.
///
/// Iteration order is part of the contract: `x` outermost, then `y`, then
/// `ma_pairs` in listed order, then `target_vol` innermost.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// (fast, slow) moving-average windows.
    pub ma_pairs: Vec<(usize, usize)>,
    pub target_vol: Vec<f64>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            x: vec![0.15, 0.2],
            y: vec![0.02, 0.035, 0.05, 0.1],
            ma_pairs: vec![(50, 200), (100, 300)],
            target_vol: vec![0.08, 0.10, 0.12],
        }
    }
}

impl ParameterGrid {
    pub fn len(&self) -> usize {
        self.x.len() * self.y.len() * self.ma_pairs.len() * self.target_vol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination in iteration order. Fields the grid does not vary
    /// come from `base`.
    pub fn combinations(&self, base: &StrategyParameters) -> Vec<StrategyParameters> {
        let mut out = Vec::with_capacity(self.len());
        for &x in &self.x {
            for &y in &self.y {
                for &(fast, slow) in &self.ma_pairs {
                    for &target_vol in &self.target_vol {
                        out.push(StrategyParameters {
                            x,
                            y,
                            fast,
                            slow,
                            target_vol,
                            ..*base
                        });
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkForwardConfig {
    pub train_years: u32,
    pub test_years: u32,
    /// A window whose test slice has fewer bars ends the walk.
    pub min_test_bars: usize,
    pub parallel: bool,
    pub grid: ParameterGrid,
    pub base: StrategyParameters,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            train_years: 8,
            test_years: 2,
            min_test_bars: 300,
            parallel: true,
            grid: ParameterGrid::default(),
            base: StrategyParameters::default(),
        }
    }
}

/// Date bounds of one window: train is `[train_start, train_end)`, test is
/// `[train_end, test_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    pub test_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkForwardResult {
    pub start: NaiveDate,
    pub params: StrategyParameters,
    /// Out-of-sample metrics of `params` on the test slice.
    pub metrics: Metrics,
}

/// Column-wise means over all result rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkForwardMeans {
    pub x: f64,
    pub y: f64,
    pub fast: f64,
    pub slow: f64,
    pub target_vol: f64,
    pub cagr: f64,
    pub vol: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkForwardReport {
    pub rows: Vec<WalkForwardResult>,
}

impl WalkForwardReport {
    pub fn means(&self) -> Option<WalkForwardMeans> {
        if self.rows.is_empty() {
            return None;
        }
        let n = self.rows.len() as f64;
        let avg = |f: fn(&WalkForwardResult) -> f64| self.rows.iter().map(f).sum::<f64>() / n;
        Some(WalkForwardMeans {
            x: avg(|r| r.params.x),
            y: avg(|r| r.params.y),
            fast: avg(|r| r.params.fast as f64),
            slow: avg(|r| r.params.slow as f64),
            target_vol: avg(|r| r.params.target_vol),
            cagr: avg(|r| r.metrics.cagr),
            vol: avg(|r| r.metrics.vol),
            sharpe: avg(|r| r.metrics.sharpe),
            max_drawdown: avg(|r| r.metrics.max_drawdown),
        })
    }

    /// Row with the highest out-of-sample Sharpe; the earliest row wins ties.
    pub fn best_by_sharpe(&self) -> Option<&WalkForwardResult> {
        self.rows.iter().fold(None, |best, row| match best {
            Some(b) if row.metrics.sharpe > b.metrics.sharpe => Some(row),
            Some(b) => Some(b),
            None => Some(row),
        })
    }
}

/// Objective maximized on the train slice.
pub fn score(metrics: &Metrics) -> f64 {
    metrics.cagr - 0.5 * metrics.vol + 0.2 * metrics.sharpe
}

/// Index of the best score. Only a strictly greater score replaces the
/// current best, so ties keep the earliest index; `None` entries are
/// skipped.
pub fn select_best(scores: &[Option<f64>]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_score = f64::NEG_INFINITY;
    for (i, s) in scores
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.map(|s| (i, s)))
    {
        if s > best_score {
            best_score = s;
            best = Some(i);
        }
    }
    best
}

/// Window cursor sequence, computed up front.
pub fn plan_windows(series: &PriceSeries, config: &WalkForwardConfig) -> Vec<Window> {
    let mut windows = Vec::new();
    let Some(mut start) = series.first_date() else {
        return windows;
    };
    let (Some(train_months), Some(test_months)) = (
        config.train_years.checked_mul(12),
        config.test_years.checked_mul(12),
    ) else {
        return windows;
    };
    let train = Months::new(train_months);
    let test = Months::new(test_months);
    let min_test_bars = config.min_test_bars.max(1);

    loop {
        let Some(train_end) = start.checked_add_months(train) else {
            break;
        };
        let Some(test_end) = train_end.checked_add_months(test) else {
            break;
        };
        if series.slice(train_end, test_end).len() < min_test_bars {
            break;
        }
        windows.push(Window {
            train_start: start,
            train_end,
            test_end,
        });
        match start.checked_add_months(test) {
            Some(next) if next > start => start = next,
            _ => break,
        }
    }
    windows
}

fn evaluate(train: &PriceSeries, params: &StrategyParameters) -> Option<f64> {
    run_backtest(train, params).map(|r| score(&r.metrics))
}

/// Run the full walk-forward optimization.
///
/// Windows without any valid train score, or whose test slice is too short
/// to simulate, are skipped; the report holds whatever windows succeeded.
pub fn run_walk_forward(series: &PriceSeries, config: &WalkForwardConfig) -> WalkForwardReport {
    let windows = plan_windows(series, config);
    let combos = config.grid.combinations(&config.base);
    info!(
        windows = windows.len(),
        combinations = combos.len(),
        "starting walk-forward"
    );

    let mut report = WalkForwardReport::default();
    for window in windows {
        let train = series.slice(window.train_start, window.train_end);
        let test = series.slice(window.train_end, window.test_end);
        debug!(
            start = %window.train_start,
            train_bars = train.len(),
            test_bars = test.len(),
            "evaluating window"
        );

        let scores: Vec<Option<f64>> = if config.parallel {
            combos.par_iter().map(|p| evaluate(&train, p)).collect()
        } else {
            combos.iter().map(|p| evaluate(&train, p)).collect()
        };

        let Some(best) = select_best(&scores) else {
            warn!(start = %window.train_start, "no parameter set produced a train score, skipping window");
            continue;
        };
        let params = combos[best];

        let Some(test_result) = run_backtest(&test, &params) else {
            warn!(start = %window.train_start, "test slice degenerate, skipping window");
            continue;
        };

        info!(
            start = %window.train_start,
            x = params.x,
            y = params.y,
            fast = params.fast,
            slow = params.slow,
            target_vol = params.target_vol,
            sharpe = test_result.metrics.sharpe,
            "window complete"
        );
        report.rows.push(WalkForwardResult {
            start: window.train_start,
            params,
            metrics: test_result.metrics,
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily_series(start: NaiveDate, count: usize, price: impl Fn(usize) -> f64) -> PriceSeries {
        let dates: Vec<NaiveDate> = (0..count)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        let prices: Vec<f64> = (0..count).map(price).collect();
        PriceSeries::from_columns(&dates, &prices).unwrap()
    }

    fn metrics(cagr: f64, vol: f64, sharpe: f64) -> Metrics {
        Metrics {
            cagr,
            vol,
            sharpe,
            max_drawdown: 0.0,
        }
    }

    #[test]
    fn default_grid_has_48_combinations() {
        let grid = ParameterGrid::default();
        assert_eq!(grid.len(), 48);
        assert_eq!(grid.combinations(&StrategyParameters::default()).len(), 48);
    }

    #[test]
    fn combinations_iterate_x_then_y_then_pairs_then_target_vol() {
        let grid = ParameterGrid {
            x: vec![0.1, 0.2],
            y: vec![0.01, 0.02],
            ma_pairs: vec![(5, 10), (3, 7)],
            target_vol: vec![0.08, 0.12],
        };
        let combos = grid.combinations(&StrategyParameters::default());
        let keys: Vec<(f64, f64, usize, f64)> = combos
            .iter()
            .map(|p| (p.x, p.y, p.fast, p.target_vol))
            .collect();
        assert_eq!(keys[0], (0.1, 0.01, 5, 0.08));
        assert_eq!(keys[1], (0.1, 0.01, 5, 0.12));
        assert_eq!(keys[2], (0.1, 0.01, 3, 0.08));
        assert_eq!(keys[4], (0.1, 0.02, 5, 0.08));
        assert_eq!(keys[8], (0.2, 0.01, 5, 0.08));
        assert_eq!(keys[15], (0.2, 0.02, 3, 0.12));
    }

    #[test]
    fn combinations_inherit_base_fields() {
        let base = StrategyParameters {
            stop_loss: 0.25,
            use_momentum: true,
            ..StrategyParameters::default()
        };
        let combos = ParameterGrid::default().combinations(&base);
        assert!(combos.iter().all(|p| p.stop_loss == 0.25 && p.use_momentum));
    }

    #[test]
    fn score_formula() {
        let m = metrics(0.10, 0.20, 0.5);
        assert!((score(&m) - (0.10 - 0.10 + 0.10)).abs() < 1e-12);
    }

    #[test]
    fn select_best_strictly_greater() {
        assert_eq!(select_best(&[Some(1.0), Some(2.0), Some(2.0)]), Some(1));
        assert_eq!(select_best(&[Some(0.5), Some(0.5)]), Some(0));
    }

    #[test]
    fn select_best_skips_missing() {
        assert_eq!(select_best(&[None, Some(-1.0), None]), Some(1));
        assert_eq!(select_best(&[None, None]), None);
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    fn select_best_ignores_nan() {
        assert_eq!(select_best(&[Some(f64::NAN), Some(0.0)]), Some(1));
    }

    #[test]
    fn plan_windows_rolls_by_test_years() {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let series = daily_series(start, 4018, |_| 100.0);
        let windows = plan_windows(&series, &WalkForwardConfig::default());

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].train_start, start);
        assert_eq!(windows[0].train_end, NaiveDate::from_ymd_opt(2008, 1, 1).unwrap());
        assert_eq!(windows[0].test_end, NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
        assert_eq!(windows[1].train_start, NaiveDate::from_ymd_opt(2002, 1, 1).unwrap());
    }

    #[test]
    fn plan_windows_empty_series() {
        let series = PriceSeries::default();
        assert!(plan_windows(&series, &WalkForwardConfig::default()).is_empty());
    }

    #[test]
    fn plan_windows_overflowing_years_yields_nothing() {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let series = daily_series(start, 4018, |_| 100.0);
        let config = WalkForwardConfig {
            train_years: 400_000_000,
            ..WalkForwardConfig::default()
        };
        assert!(plan_windows(&series, &config).is_empty());
        assert!(run_walk_forward(&series, &config).rows.is_empty());
    }

    #[test]
    fn plan_windows_short_series() {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let series = daily_series(start, 1000, |_| 100.0);
        assert!(plan_windows(&series, &WalkForwardConfig::default()).is_empty());
    }

    #[test]
    fn means_and_best_by_sharpe() {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let row = |x: f64, fast: usize, sharpe: f64| WalkForwardResult {
            start,
            params: StrategyParameters {
                x,
                fast,
                ..StrategyParameters::default()
            },
            metrics: metrics(0.1, 0.2, sharpe),
        };
        let report = WalkForwardReport {
            rows: vec![row(0.1, 50, 0.5), row(0.2, 100, 0.9), row(0.3, 150, 0.9)],
        };

        let means = report.means().unwrap();
        assert!((means.x - 0.2).abs() < 1e-12);
        assert!((means.fast - 100.0).abs() < 1e-12);
        assert!((means.sharpe - (2.3 / 3.0)).abs() < 1e-12);

        let best = report.best_by_sharpe().unwrap();
        assert_eq!(best.params.x, 0.2);
    }

    #[test]
    fn empty_report() {
        let report = WalkForwardReport::default();
        assert!(report.means().is_none());
        assert!(report.best_by_sharpe().is_none());
    }

    #[test]
    fn constant_series_ties_pick_first_combination() {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let series = daily_series(start, 4018, |_| 100.0);
        let config = WalkForwardConfig {
            parallel: false,
            ..WalkForwardConfig::default()
        };
        let report = run_walk_forward(&series, &config);
        let first = config.grid.combinations(&config.base)[0];

        assert_eq!(report.rows.len(), 2);
        for row in &report.rows {
            assert_eq!(row.params, first);
            assert_eq!(row.metrics.cagr, 0.0);
        }
    }

    fn dated_series(dates: Vec<NaiveDate>) -> PriceSeries {
        let prices: Vec<f64> = (0..dates.len())
            .map(|i| 100.0 + 5.0 * (i as f64 / 30.0).sin())
            .collect();
        PriceSeries::from_columns(&dates, &prices).unwrap()
    }

    #[test]
    fn window_without_train_result_is_skipped() {
        // every 20th day until 2008, daily afterwards: the first train slice
        // is too sparse for any parameter set
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let mut dates = Vec::new();
        let mut date = d(2000, 1, 1);
        while date < d(2008, 1, 1) {
            dates.push(date);
            date += chrono::Duration::days(20);
        }
        let mut date = d(2008, 1, 1);
        while date < d(2016, 1, 1) {
            dates.push(date);
            date += chrono::Duration::days(1);
        }
        let series = dated_series(dates);
        let config = WalkForwardConfig {
            parallel: false,
            ..WalkForwardConfig::default()
        };

        assert_eq!(plan_windows(&series, &config).len(), 4);
        let report = run_walk_forward(&series, &config);
        let starts: Vec<NaiveDate> = report.rows.iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![d(2002, 1, 1), d(2004, 1, 1), d(2006, 1, 1)]);
    }

    #[test]
    fn window_with_degenerate_test_slice_is_skipped() {
        // 2002 loses 75 days, leaving 290 test bars: enough to plan the
        // window, too few for the 305 bars a 100/300 pair needs
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let mut dates = Vec::new();
        let mut date = d(2000, 1, 1);
        while date < d(2006, 1, 1) {
            if date < d(2002, 3, 1) || date >= d(2002, 5, 15) {
                dates.push(date);
            }
            date += chrono::Duration::days(1);
        }
        let series = dated_series(dates);
        let config = WalkForwardConfig {
            train_years: 2,
            test_years: 1,
            min_test_bars: 280,
            parallel: false,
            grid: ParameterGrid {
                ma_pairs: vec![(100, 300)],
                ..ParameterGrid::default()
            },
            ..WalkForwardConfig::default()
        };
        assert_eq!(
            config.grid.combinations(&config.base)[0].required_history(),
            305
        );
        assert_eq!(
            series.slice(d(2002, 1, 1), d(2003, 1, 1)).len(),
            290
        );

        let windows = plan_windows(&series, &config);
        assert_eq!(windows.len(), 4);
        assert_eq!(windows[0].train_end, d(2002, 1, 1));

        let report = run_walk_forward(&series, &config);
        let starts: Vec<NaiveDate> = report.rows.iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![d(2001, 1, 1), d(2002, 1, 1), d(2003, 1, 1)]);
    }
}
