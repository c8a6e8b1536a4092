//! Configuration validation.
//!
//! Validates the `[data]`, `[strategy]` and `[walk_forward]` sections before
//! anything runs. Also hosts the list parsers shared with the CLI builders.

use crate::domain::error::TrendwalkError;
use crate::domain::params::StrategyParameters;
use crate::domain::walk_forward::ParameterGrid;
use crate::ports::config_port::ConfigPort;

/// Upper bound on `max_leverage`.
pub const MAX_LEVERAGE_LIMIT: f64 = 10.0;
/// Upper bound on `train_years` and `test_years`.
pub const MAX_WINDOW_YEARS: i64 = 100;

#[derive(Debug, Clone, Copy)]
enum ValueKind {
    Int,
    Double,
    Bool,
}

impl ValueKind {
    fn name(self) -> &'static str {
        match self {
            ValueKind::Int => "integer",
            ValueKind::Double => "number",
            ValueKind::Bool => "boolean",
        }
    }
}

const DATA_KEYS: &[(&str, ValueKind)] = &[
    ("max_staleness_days", ValueKind::Int),
    ("max_gap_days", ValueKind::Int),
];

const STRATEGY_KEYS: &[(&str, ValueKind)] = &[
    ("x", ValueKind::Double),
    ("y", ValueKind::Double),
    ("fast", ValueKind::Int),
    ("slow", ValueKind::Int),
    ("vol_window", ValueKind::Int),
    ("target_vol", ValueKind::Double),
    ("max_leverage", ValueKind::Double),
    ("stop_loss", ValueKind::Double),
    ("use_momentum", ValueKind::Bool),
    ("safe_rate", ValueKind::Double),
    ("momentum_lookback", ValueKind::Int),
    ("momentum_skip", ValueKind::Int),
];

const WALK_FORWARD_KEYS: &[(&str, ValueKind)] = &[
    ("train_years", ValueKind::Int),
    ("test_years", ValueKind::Int),
    ("min_test_bars", ValueKind::Int),
    ("parallel", ValueKind::Bool),
];

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TrendwalkError> {
    validate_types(config, "data", DATA_KEYS)?;
    if config.get_int("data", "max_staleness_days", 10) < 0 {
        return Err(TrendwalkError::invalid(
            "data",
            "max_staleness_days",
            "max_staleness_days must be non-negative",
        ));
    }
    if config.get_int("data", "max_gap_days", 30) < 1 {
        return Err(TrendwalkError::invalid(
            "data",
            "max_gap_days",
            "max_gap_days must be at least 1",
        ));
    }
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TrendwalkError> {
    validate_types(config, "strategy", STRATEGY_KEYS)?;
    let d = StrategyParameters::default();
    validate_fraction(config, "strategy", "x", d.x)?;
    validate_positive(config, "strategy", "y", d.y)?;
    validate_windows(
        "strategy",
        config.get_int("strategy", "fast", d.fast as i64),
        config.get_int("strategy", "slow", d.slow as i64),
    )?;
    validate_min_int(config, "strategy", "vol_window", d.vol_window as i64, 2)?;
    validate_positive(config, "strategy", "target_vol", d.target_vol)?;
    validate_positive(config, "strategy", "max_leverage", d.max_leverage)?;
    if config.get_double("strategy", "max_leverage", d.max_leverage) > MAX_LEVERAGE_LIMIT {
        return Err(TrendwalkError::invalid(
            "strategy",
            "max_leverage",
            format!("max_leverage must be at most {}", MAX_LEVERAGE_LIMIT),
        ));
    }

    if config.get_double("strategy", "stop_loss", d.stop_loss) < 0.0 {
        return Err(TrendwalkError::invalid(
            "strategy",
            "stop_loss",
            "stop_loss must be non-negative",
        ));
    }

    let safe_rate = config.get_double("strategy", "safe_rate", d.safe_rate);
    if !(0.0..1.0).contains(&safe_rate) {
        return Err(TrendwalkError::invalid(
            "strategy",
            "safe_rate",
            "safe_rate must be between 0 and 1",
        ));
    }

    let lookback = validate_min_int(
        config,
        "strategy",
        "momentum_lookback",
        d.momentum_lookback as i64,
        1,
    )?;
    let skip = config.get_int("strategy", "momentum_skip", d.momentum_skip as i64);
    if skip < 0 || skip >= lookback {
        return Err(TrendwalkError::invalid(
            "strategy",
            "momentum_skip",
            "momentum_skip must be non-negative and less than momentum_lookback",
        ));
    }
    Ok(())
}

pub fn validate_walk_forward_config(config: &dyn ConfigPort) -> Result<(), TrendwalkError> {
    validate_types(config, "walk_forward", WALK_FORWARD_KEYS)?;
    validate_int_range(config, "walk_forward", "train_years", 8, 1, MAX_WINDOW_YEARS)?;
    validate_int_range(config, "walk_forward", "test_years", 2, 1, MAX_WINDOW_YEARS)?;
    validate_min_int(config, "walk_forward", "min_test_bars", 300, 1)?;

    let defaults = ParameterGrid::default();
    for x in parse_double_list(config, "walk_forward", "x", &defaults.x)? {
        if !(x > 0.0 && x < 1.0) {
            return Err(TrendwalkError::invalid(
                "walk_forward",
                "x",
                "every x must be between 0 and 1",
            ));
        }
    }
    for (key, defaults) in [("y", &defaults.y), ("target_vol", &defaults.target_vol)] {
        if parse_double_list(config, "walk_forward", key, defaults)?
            .iter()
            .any(|v| *v <= 0.0)
        {
            return Err(TrendwalkError::invalid(
                "walk_forward",
                key,
                format!("every {} must be positive", key),
            ));
        }
    }
    for (fast, slow) in parse_ma_pairs(config, "walk_forward", "ma_pairs", &defaults.ma_pairs)? {
        validate_windows("walk_forward", fast as i64, slow as i64)?;
    }
    Ok(())
}

/// Comma-separated floats; `defaults` when the key is absent.
pub fn parse_double_list(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    defaults: &[f64],
) -> Result<Vec<f64>, TrendwalkError> {
    let Some(items) = config.get_list(section, key) else {
        return Ok(defaults.to_vec());
    };
    let values = items
        .iter()
        .map(|s| {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| TrendwalkError::invalid(section, key, format!("'{}' is not a number", s)))
        })
        .collect::<Result<Vec<f64>, _>>()?;
    if values.is_empty() {
        return Err(TrendwalkError::invalid(section, key, "list must not be empty"));
    }
    Ok(values)
}

/// `fast:slow` pairs separated by commas, e.g. `50:200, 100:300`.
pub fn parse_ma_pairs(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    defaults: &[(usize, usize)],
) -> Result<Vec<(usize, usize)>, TrendwalkError> {
    let Some(items) = config.get_list(section, key) else {
        return Ok(defaults.to_vec());
    };
    let pairs = items
        .iter()
        .map(|item| {
            item.split_once(':')
                .and_then(|(f, s)| Some((f.trim().parse().ok()?, s.trim().parse().ok()?)))
                .ok_or_else(|| {
                    TrendwalkError::invalid(section, key, format!("'{}' is not a fast:slow pair", item))
                })
        })
        .collect::<Result<Vec<(usize, usize)>, _>>()?;
    if pairs.is_empty() {
        return Err(TrendwalkError::invalid(section, key, "list must not be empty"));
    }
    Ok(pairs)
}

/// Rejects keys that are present but would not parse as their type. The
/// typed getters fall back to the default on a parse failure, so a value
/// that reads differently under two defaults is malformed.
fn validate_types(
    config: &dyn ConfigPort,
    section: &str,
    keys: &[(&str, ValueKind)],
) -> Result<(), TrendwalkError> {
    for &(key, kind) in keys {
        let Some(raw) = config.get_string(section, key) else {
            continue;
        };
        let parses = match kind {
            ValueKind::Int => config.get_int(section, key, 0) == config.get_int(section, key, 1),
            ValueKind::Double => {
                config.get_double(section, key, 0.0) == config.get_double(section, key, 1.0)
            }
            ValueKind::Bool => {
                config.get_bool(section, key, false) == config.get_bool(section, key, true)
            }
        };
        if !parses {
            return Err(TrendwalkError::invalid(
                section,
                key,
                format!("'{}' is not a valid {}", raw, kind.name()),
            ));
        }
    }
    Ok(())
}

fn validate_fraction(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<(), TrendwalkError> {
    let value = config.get_double(section, key, default);
    if !(value > 0.0 && value < 1.0) {
        return Err(TrendwalkError::invalid(
            section,
            key,
            format!("{} must be between 0 and 1", key),
        ));
    }
    Ok(())
}

fn validate_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<(), TrendwalkError> {
    if config.get_double(section, key, default) <= 0.0 {
        return Err(TrendwalkError::invalid(
            section,
            key,
            format!("{} must be positive", key),
        ));
    }
    Ok(())
}

fn validate_min_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
    minimum: i64,
) -> Result<i64, TrendwalkError> {
    let value = config.get_int(section, key, default);
    if value < minimum {
        return Err(TrendwalkError::invalid(
            section,
            key,
            format!("{} must be at least {}", key, minimum),
        ));
    }
    Ok(value)
}

fn validate_int_range(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
    minimum: i64,
    maximum: i64,
) -> Result<i64, TrendwalkError> {
    let value = validate_min_int(config, section, key, default, minimum)?;
    if value > maximum {
        return Err(TrendwalkError::invalid(
            section,
            key,
            format!("{} must be at most {}", key, maximum),
        ));
    }
    Ok(value)
}

fn validate_windows(section: &str, fast: i64, slow: i64) -> Result<(), TrendwalkError> {
    if fast < 1 {
        return Err(TrendwalkError::invalid(section, "fast", "fast must be at least 1"));
    }
    if fast >= slow {
        return Err(TrendwalkError::invalid(
            section,
            "slow",
            format!("fast ({}) must be less than slow ({})", fast, slow),
        ));
    }
    Ok(())
}
