//! Core domain types and logic.

pub mod backtest;
pub mod bar;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod params;
pub mod position;
pub mod price;
pub mod trade_analysis;
pub mod walk_forward;
