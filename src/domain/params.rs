//! Strategy parameters for the breakout/trend simulation.

/// Parameters of one simulation run.
///
/// `x` is the trailing-exit fraction below the running high, `y` the
/// breakout-entry fraction above the running low. Moving-average windows
/// must satisfy `fast < slow`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParameters {
    pub x: f64,
    pub y: f64,
    pub fast: usize,
    pub slow: usize,
    pub vol_window: usize,
    pub target_vol: f64,
    pub max_leverage: f64,
    pub stop_loss: f64,
    pub use_momentum: bool,
    pub safe_rate: f64,
    pub momentum_lookback: usize,
    pub momentum_skip: usize,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        Self {
            x: 0.2,
            y: 0.1,
            fast: 50,
            slow: 200,
            vol_window: 20,
            target_vol: 0.10,
            max_leverage: 1.0,
            stop_loss: 0.10,
            use_momentum: false,
            safe_rate: 0.0,
            momentum_lookback: 252,
            momentum_skip: 21,
        }
    }
}

impl StrategyParameters {
    /// Extra bars demanded beyond the longest indicator window.
    pub const HISTORY_MARGIN: usize = 5;

    /// Minimum raw series length before a simulation is attempted.
    ///
    /// The momentum lookback counts even when the momentum filter is off, so
    /// every parameter set is judged on the same amount of history.
    pub fn required_history(&self) -> usize {
        self.vol_window
            .max(self.slow)
            .max(self.fast)
            .max(self.momentum_lookback)
            + Self::HISTORY_MARGIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = StrategyParameters::default();
        assert_eq!(p.x, 0.2);
        assert_eq!(p.y, 0.1);
        assert_eq!((p.fast, p.slow), (50, 200));
        assert_eq!(p.vol_window, 20);
        assert_eq!(p.target_vol, 0.10);
        assert_eq!(p.max_leverage, 1.0);
        assert_eq!(p.stop_loss, 0.10);
        assert!(!p.use_momentum);
        assert_eq!(p.safe_rate, 0.0);
    }

    #[test]
    fn required_history_uses_momentum_lookback() {
        assert_eq!(StrategyParameters::default().required_history(), 257);
    }

    #[test]
    fn required_history_uses_longest_window() {
        let p = StrategyParameters {
            slow: 300,
            ..StrategyParameters::default()
        };
        assert_eq!(p.required_history(), 305);

        let short = StrategyParameters {
            fast: 2,
            slow: 4,
            vol_window: 3,
            momentum_lookback: 6,
            momentum_skip: 1,
            ..StrategyParameters::default()
        };
        assert_eq!(short.required_history(), 11);
    }
}
