//! Position state and completed trades.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryReason {
    /// Price broke out above the trailing low while the filter was on.
    Breakout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    Stop,
    Filter,
    SampleEnd,
}

impl fmt::Display for EntryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryReason::Breakout => write!(f, "BREAKOUT"),
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Stop => write!(f, "STOP"),
            ExitReason::Filter => write!(f, "FILTER"),
            ExitReason::SampleEnd => write!(f, "SAMPLE_END"),
        }
    }
}

/// Fields carried while invested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    /// Fraction of equity exposed, in (0, max_leverage].
    pub size: f64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub entry_reason: EntryReason,
    /// Highest price since entry; never below `entry_price`.
    pub running_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    /// Out of the market. `running_min` is the lowest price since the last
    /// exit (or since the start), `None` until the first observation.
    Flat { running_min: Option<f64> },
    Long(OpenPosition),
}

impl PositionState {
    /// Position size held; 0 while flat.
    pub fn exposure(&self) -> f64 {
        match self {
            PositionState::Long(open) => open.size,
            PositionState::Flat { .. } => 0.0,
        }
    }
}

impl Default for PositionState {
    fn default() -> Self {
        PositionState::Flat { running_min: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub realized_return: f64,
    /// Calendar days between entry and exit.
    pub holding_days: i64,
    pub entry_reason: EntryReason,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// Close `open` at `exit_price`, deducting `cost` from the price return.
    pub fn close(
        open: &OpenPosition,
        exit_date: NaiveDate,
        exit_price: f64,
        cost: f64,
        exit_reason: ExitReason,
    ) -> Self {
        Trade {
            entry_date: open.entry_date,
            exit_date,
            entry_price: open.entry_price,
            exit_price,
            realized_return: exit_price / open.entry_price - 1.0 - cost,
            holding_days: (exit_date - open.entry_date).num_days(),
            entry_reason: open.entry_reason,
            exit_reason,
        }
    }
}
