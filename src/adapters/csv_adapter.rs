//! CSV price file adapter.
//!
//! Turns a raw daily price table into a clean [`PriceSeries`]: detects the
//! date and price columns, drops unparseable rows, sorts and de-duplicates
//! by date, rejects stale files and discards history before the most recent
//! long gap.

use crate::domain::error::TrendwalkError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

pub const DATE_COLUMNS: &[&str] = &["Data", "Date", "date"];
pub const PRICE_COLUMNS: &[&str] = &["Zamkniecie", "Close", "close", "price"];

#[derive(Debug, Clone)]
pub struct CsvAdapter {
    path: PathBuf,
    date_column: Option<String>,
    price_column: Option<String>,
    /// `None` disables the freshness check.
    max_staleness_days: Option<i64>,
    max_gap_days: i64,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            date_column: None,
            price_column: None,
            max_staleness_days: Some(10),
            max_gap_days: 30,
        }
    }

    pub fn with_columns(mut self, date_column: Option<String>, price_column: Option<String>) -> Self {
        self.date_column = date_column;
        self.price_column = price_column;
        self
    }

    pub fn with_max_staleness_days(mut self, days: Option<i64>) -> Self {
        self.max_staleness_days = days;
        self
    }

    pub fn with_max_gap_days(mut self, days: i64) -> Self {
        self.max_gap_days = days;
        self
    }

    fn find_column(
        headers: &csv::StringRecord,
        configured: Option<&str>,
        fallbacks: &[&str],
        kind: &str,
    ) -> Result<usize, TrendwalkError> {
        let candidates: Vec<&str> = match configured {
            Some(name) => vec![name],
            None => fallbacks.to_vec(),
        };
        candidates
            .iter()
            .find_map(|name| headers.iter().position(|h| h == *name))
            .ok_or_else(|| TrendwalkError::DataLoad {
                reason: format!(
                    "no {} column (looked for {}; found {})",
                    kind,
                    candidates.join(", "),
                    headers.iter().collect::<Vec<_>>().join(", ")
                ),
            })
    }

    fn read_points(&self) -> Result<BTreeMap<NaiveDate, f64>, TrendwalkError> {
        let content = fs::read_to_string(&self.path).map_err(|e| TrendwalkError::DataLoad {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| TrendwalkError::DataLoad {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();
        let date_idx = Self::find_column(&headers, self.date_column.as_deref(), DATE_COLUMNS, "date")?;
        let price_idx =
            Self::find_column(&headers, self.price_column.as_deref(), PRICE_COLUMNS, "price")?;

        let mut points = BTreeMap::new();
        let mut dropped = 0usize;
        for result in rdr.records() {
            let Ok(record) = result else {
                dropped += 1;
                continue;
            };
            let date = record
                .get(date_idx)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            let price = record
                .get(price_idx)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|p| p.is_finite() && *p > 0.0);
            match (date, price) {
                (Some(date), Some(price)) => {
                    points.insert(date, price);
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(dropped, path = %self.path.display(), "dropped unparseable rows");
        }
        Ok(points)
    }
}

/// Index of the first observation after the most recent gap longer than
/// `max_gap_days`, or 0 when there is none.
pub fn last_gap_start(points: &[PricePoint], max_gap_days: i64) -> usize {
    points
        .windows(2)
        .rposition(|w| (w[1].date - w[0].date).num_days() > max_gap_days)
        .map_or(0, |i| i + 1)
}

impl DataPort for CsvAdapter {
    fn load_prices(&self, as_of: NaiveDate) -> Result<PriceSeries, TrendwalkError> {
        let points: Vec<PricePoint> = self
            .read_points()?
            .into_iter()
            .map(|(date, price)| PricePoint { date, price })
            .collect();

        let Some(newest) = points.last().map(|p| p.date) else {
            return Err(TrendwalkError::NoData {
                source_name: self.path.display().to_string(),
            });
        };

        if let Some(max_days) = self.max_staleness_days {
            if (as_of - newest).num_days() > max_days {
                return Err(TrendwalkError::StaleData {
                    newest,
                    as_of,
                    max_days,
                });
            }
        }

        let start = last_gap_start(&points, self.max_gap_days);
        if start > 0 {
            info!(
                from = %points[start].date,
                discarded = start,
                "gap longer than {} days, keeping data after it",
                self.max_gap_days
            );
        }

        PriceSeries::new(points[start..].to_vec())
    }
}
