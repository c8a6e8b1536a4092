//! Price data access port trait.

use crate::domain::error::TrendwalkError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Load a clean, date-ordered price series. `as_of` is the reference
    /// date for freshness checks.
    fn load_prices(&self, as_of: NaiveDate) -> Result<PriceSeries, TrendwalkError>;
}
