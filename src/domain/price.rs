//! Price series representation.

use crate::domain::error::TrendwalkError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Ordered (date, price) observations: dates strictly ascending, prices positive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, TrendwalkError> {
        for (i, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(TrendwalkError::DataLoad {
                    reason: format!("non-positive price {} on {}", point.price, point.date),
                });
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(TrendwalkError::DataLoad {
                    reason: format!(
                        "dates not strictly ascending: {} followed by {}",
                        points[i - 1].date,
                        point.date
                    ),
                });
            }
        }
        Ok(Self { points })
    }

    /// Convenience constructor for callers that already hold parallel columns.
    pub fn from_columns(dates: &[NaiveDate], prices: &[f64]) -> Result<Self, TrendwalkError> {
        if dates.len() != prices.len() {
            return Err(TrendwalkError::DataLoad {
                reason: format!(
                    "column length mismatch: {} dates, {} prices",
                    dates.len(),
                    prices.len()
                ),
            });
        }
        let points = dates
            .iter()
            .zip(prices)
            .map(|(&date, &price)| PricePoint { date, price })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Observations with `from <= date < to`.
    pub fn slice(&self, from: NaiveDate, to: NaiveDate) -> PriceSeries {
        let start = self.points.partition_point(|p| p.date < from);
        let end = self.points.partition_point(|p| p.date < to).max(start);
        PriceSeries {
            points: self.points[start..end].to_vec(),
        }
    }
}
