//! Result presentation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TrendwalkError;
use crate::domain::trade_analysis::TradeAnalysis;
use crate::domain::walk_forward::WalkForwardReport;

/// Port for presenting results. Implementations decide the sink.
pub trait ReportPort {
    fn write_backtest(
        &mut self,
        title: &str,
        result: &BacktestResult,
        analysis: &TradeAnalysis,
    ) -> Result<(), TrendwalkError>;

    fn write_walk_forward(&mut self, report: &WalkForwardReport) -> Result<(), TrendwalkError>;
}
