//! Plain-text report adapter implementing ReportPort.
//!
//! Metrics and summaries are printed as aligned text; the trade log and the
//! walk-forward table are emitted as CSV blocks so they can be piped into
//! other tools.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TrendwalkError;
use crate::domain::trade_analysis::TradeAnalysis;
use crate::domain::walk_forward::{WalkForwardReport, WalkForwardResult};
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

pub struct ConsoleReportAdapter<W: Write> {
    out: W,
}

#[derive(Serialize)]
struct WalkForwardRow {
    start: NaiveDate,
    x: f64,
    y: f64,
    fast: usize,
    slow: usize,
    target_vol: f64,
    cagr: f64,
    vol: f64,
    sharpe: f64,
    max_dd: f64,
}

impl From<&WalkForwardResult> for WalkForwardRow {
    fn from(r: &WalkForwardResult) -> Self {
        WalkForwardRow {
            start: r.start,
            x: r.params.x,
            y: r.params.y,
            fast: r.params.fast,
            slow: r.params.slow,
            target_vol: r.params.target_vol,
            cagr: r.metrics.cagr,
            vol: r.metrics.vol,
            sharpe: r.metrics.sharpe,
            max_dd: r.metrics.max_drawdown,
        }
    }
}

fn csv_error(e: csv::Error) -> TrendwalkError {
    TrendwalkError::Io(std::io::Error::other(e))
}

fn fmt_opt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

impl<W: Write> ConsoleReportAdapter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_csv<T: Serialize>(&mut self, rows: impl IntoIterator<Item = T>) -> Result<(), TrendwalkError> {
        let mut wtr = csv::Writer::from_writer(&mut self.out);
        for row in rows {
            wtr.serialize(row).map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl<W: Write> ReportPort for ConsoleReportAdapter<W> {
    fn write_backtest(
        &mut self,
        title: &str,
        result: &BacktestResult,
        analysis: &TradeAnalysis,
    ) -> Result<(), TrendwalkError> {
        let m = &result.metrics;
        writeln!(self.out, "=== {} ===", title)?;
        if let (Some(first), Some(last)) = (result.equity_curve.first(), result.equity_curve.last()) {
            writeln!(
                self.out,
                "Period:           {} to {} ({} bars)",
                first.date,
                last.date,
                result.equity_curve.len()
            )?;
            writeln!(self.out, "Final Equity:     {:.4}", last.equity)?;
        }
        writeln!(self.out, "CAGR:             {:.2}%", m.cagr * 100.0)?;
        writeln!(self.out, "Volatility:       {:.2}%", m.vol * 100.0)?;
        writeln!(self.out, "Sharpe:           {:.2}", m.sharpe)?;
        writeln!(self.out, "Max Drawdown:     {:.2}%", m.max_drawdown * 100.0)?;

        writeln!(self.out, "\n--- Trades ---")?;
        if result.trades.is_empty() {
            writeln!(self.out, "(none)")?;
        } else {
            self.write_csv(&result.trades)?;
        }

        writeln!(self.out, "\n--- Trade Analysis ---")?;
        writeln!(self.out, "Trades:           {}", analysis.trades)?;
        writeln!(self.out, "Win Rate:         {:.1}%", analysis.win_rate * 100.0)?;
        writeln!(self.out, "Avg Win:          {}", fmt_opt_pct(analysis.avg_win))?;
        writeln!(self.out, "Avg Loss:         {}", fmt_opt_pct(analysis.avg_loss))?;
        writeln!(self.out, "Profit Factor:    {:.2}", analysis.profit_factor)?;
        writeln!(self.out, "Avg Days Held:    {:.1}", analysis.avg_holding_days)?;
        Ok(())
    }

    fn write_walk_forward(&mut self, report: &WalkForwardReport) -> Result<(), TrendwalkError> {
        writeln!(self.out, "=== Walk-Forward Results ===")?;
        if report.rows.is_empty() {
            writeln!(self.out, "(no windows completed)")?;
            return Ok(());
        }
        self.write_csv(report.rows.iter().map(WalkForwardRow::from))?;

        if let Some(means) = report.means() {
            writeln!(self.out, "\n--- Average ---")?;
            writeln!(self.out, "X:                {:.4}", means.x)?;
            writeln!(self.out, "Y:                {:.4}", means.y)?;
            writeln!(self.out, "fast:             {:.1}", means.fast)?;
            writeln!(self.out, "slow:             {:.1}", means.slow)?;
            writeln!(self.out, "target_vol:       {:.4}", means.target_vol)?;
            writeln!(self.out, "CAGR:             {:.2}%", means.cagr * 100.0)?;
            writeln!(self.out, "Volatility:       {:.2}%", means.vol * 100.0)?;
            writeln!(self.out, "Sharpe:           {:.2}", means.sharpe)?;
            writeln!(self.out, "Max Drawdown:     {:.2}%", means.max_drawdown * 100.0)?;
        }
        Ok(())
    }
}
