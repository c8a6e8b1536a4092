//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::console_report::ConsoleReportAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::config_validation::{
    parse_double_list, parse_ma_pairs, validate_data_config, validate_strategy_config,
    validate_walk_forward_config,
};
use crate::domain::error::TrendwalkError;
use crate::domain::params::StrategyParameters;
use crate::domain::price::PriceSeries;
use crate::domain::trade_analysis::TradeAnalysis;
use crate::domain::walk_forward::{run_walk_forward, ParameterGrid, WalkForwardConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "trendwalk",
    about = "Breakout/trend strategy simulator with walk-forward optimization"
)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one simulation with the [strategy] parameters
    Backtest(RunArgs),
    /// Optimize on rolling train windows and evaluate out of sample
    WalkForward(RunArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    /// Price CSV, overrides [data] path
    #[arg(short, long)]
    pub data: Option<PathBuf>,
    /// Reference date for the staleness check (default: today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
    /// Skip the staleness check
    #[arg(long)]
    pub allow_stale: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute(command: &Command) -> Result<(), TrendwalkError> {
    match command {
        Command::Backtest(args) => run_single(args),
        Command::WalkForward(args) => run_walk_forward_cmd(args),
        Command::Validate { config } => run_validate(config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TrendwalkError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Reads `[strategy]`, falling back to defaults for absent keys.
pub fn build_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParameters, TrendwalkError> {
    validate_strategy_config(config)?;
    let d = StrategyParameters::default();
    let s = "strategy";
    Ok(StrategyParameters {
        x: config.get_double(s, "x", d.x),
        y: config.get_double(s, "y", d.y),
        fast: config.get_int(s, "fast", d.fast as i64) as usize,
        slow: config.get_int(s, "slow", d.slow as i64) as usize,
        vol_window: config.get_int(s, "vol_window", d.vol_window as i64) as usize,
        target_vol: config.get_double(s, "target_vol", d.target_vol),
        max_leverage: config.get_double(s, "max_leverage", d.max_leverage),
        stop_loss: config.get_double(s, "stop_loss", d.stop_loss),
        use_momentum: config.get_bool(s, "use_momentum", d.use_momentum),
        safe_rate: config.get_double(s, "safe_rate", d.safe_rate),
        momentum_lookback: config.get_int(s, "momentum_lookback", d.momentum_lookback as i64)
            as usize,
        momentum_skip: config.get_int(s, "momentum_skip", d.momentum_skip as i64) as usize,
    })
}

/// Reads `[walk_forward]`; parameters the grid does not vary come from
/// `[strategy]`.
pub fn build_walk_forward_config(config: &dyn ConfigPort) -> Result<WalkForwardConfig, TrendwalkError> {
    validate_walk_forward_config(config)?;
    let base = build_strategy_params(config)?;
    let d = WalkForwardConfig::default();
    let g = ParameterGrid::default();
    let s = "walk_forward";
    Ok(WalkForwardConfig {
        train_years: years(config, "train_years", d.train_years)?,
        test_years: years(config, "test_years", d.test_years)?,
        min_test_bars: config.get_int(s, "min_test_bars", d.min_test_bars as i64) as usize,
        parallel: config.get_bool(s, "parallel", d.parallel),
        grid: ParameterGrid {
            x: parse_double_list(config, s, "x", &g.x)?,
            y: parse_double_list(config, s, "y", &g.y)?,
            ma_pairs: parse_ma_pairs(config, s, "ma_pairs", &g.ma_pairs)?,
            target_vol: parse_double_list(config, s, "target_vol", &g.target_vol)?,
        },
        base,
    })
}

fn years(config: &dyn ConfigPort, key: &str, default: u32) -> Result<u32, TrendwalkError> {
    u32::try_from(config.get_int("walk_forward", key, i64::from(default)))
        .map_err(|_| TrendwalkError::invalid("walk_forward", key, "out of range"))
}

/// Builds the CSV loader from `[data]`; `data_override` replaces `path`.
pub fn build_data_adapter(
    config: &dyn ConfigPort,
    data_override: Option<&Path>,
    allow_stale: bool,
) -> Result<CsvAdapter, TrendwalkError> {
    validate_data_config(config)?;
    let path = match data_override {
        Some(p) => p.to_path_buf(),
        None => config
            .get_string("data", "path")
            .map(PathBuf::from)
            .ok_or_else(|| TrendwalkError::ConfigMissing {
                section: "data".to_string(),
                key: "path".to_string(),
            })?,
    };
    let staleness = if allow_stale {
        None
    } else {
        Some(config.get_int("data", "max_staleness_days", 10))
    };
    Ok(CsvAdapter::new(path)
        .with_columns(
            config.get_string("data", "date_column"),
            config.get_string("data", "price_column"),
        )
        .with_max_staleness_days(staleness)
        .with_max_gap_days(config.get_int("data", "max_gap_days", 30)))
}

fn load_series(config: &dyn ConfigPort, args: &RunArgs) -> Result<PriceSeries, TrendwalkError> {
    let adapter = build_data_adapter(config, args.data.as_deref(), args.allow_stale)?;
    let as_of = args
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let series = adapter.load_prices(as_of)?;
    info!(
        bars = series.len(),
        from = ?series.first_date(),
        to = ?series.last_date(),
        "loaded prices"
    );
    Ok(series)
}

fn backtest_or_insufficient(
    series: &PriceSeries,
    params: &StrategyParameters,
) -> Result<BacktestResult, TrendwalkError> {
    run_backtest(series, params).ok_or(TrendwalkError::InsufficientData {
        bars: series.len(),
        minimum: params.required_history(),
    })
}

fn run_single(args: &RunArgs) -> Result<(), TrendwalkError> {
    let config = load_config(&args.config)?;
    let params = build_strategy_params(&config)?;
    let series = load_series(&config, args)?;

    let result = backtest_or_insufficient(&series, &params)?;
    let analysis = TradeAnalysis::from_trades(&result.trades);
    let mut report = ConsoleReportAdapter::new(io::stdout().lock());
    report.write_backtest("Backtest", &result, &analysis)
}

fn run_walk_forward_cmd(args: &RunArgs) -> Result<(), TrendwalkError> {
    let config = load_config(&args.config)?;
    let wf_config = build_walk_forward_config(&config)?;
    let series = load_series(&config, args)?;

    let wf_report = run_walk_forward(&series, &wf_config);
    let mut report = ConsoleReportAdapter::new(io::stdout().lock());
    report.write_walk_forward(&wf_report)?;

    let Some(best) = wf_report.best_by_sharpe() else {
        return Ok(());
    };
    let params = StrategyParameters {
        x: best.params.x,
        y: best.params.y,
        fast: best.params.fast,
        slow: best.params.slow,
        ..wf_config.base
    };
    info!(
        start = %best.start,
        sharpe = best.metrics.sharpe,
        "re-running full history with best out-of-sample window"
    );
    let result = backtest_or_insufficient(&series, &params)?;
    let analysis = TradeAnalysis::from_trades(&result.trades);
    let title = format!(
        "Full History (X={}, Y={}, MA {}/{}, target_vol={})",
        params.x, params.y, params.fast, params.slow, params.target_vol
    );
    report.write_backtest(&title, &result, &analysis)
}

fn run_validate(config_path: &Path) -> Result<(), TrendwalkError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    let params = build_strategy_params(&config)?;
    let wf = build_walk_forward_config(&config)?;

    println!("[data]");
    match config.get_string("data", "path") {
        Some(path) => println!("  path: {}", path),
        None => println!("  path: (none, pass --data)"),
    }
    println!("\n[strategy]");
    println!("  {:?}", params);
    println!("  required history: {} bars", params.required_history());
    println!("\n[walk_forward]");
    println!(
        "  train {}y / test {}y, min test bars {}, parallel {}",
        wf.train_years, wf.test_years, wf.min_test_bars, wf.parallel
    );
    println!("  x: {:?}", wf.grid.x);
    println!("  y: {:?}", wf.grid.y);
    println!("  ma_pairs: {:?}", wf.grid.ma_pairs);
    println!("  target_vol: {:?}", wf.grid.target_vol);
    println!("  {} combinations per window", wf.grid.len());
    println!("\nConfiguration is valid");
    Ok(())
}
