//! Volatility series models

use chrono::{DateTime, Utc};

#[cfg(test)]
use super::series::{PricePoint, PriceSeries};

/// One row of a price series with its derived columns.
///
/// `None` marks an undefined value (the first return, the volatility warm-up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityRow {
    pub date: DateTime<Utc>,
    pub price: f64,
    pub ret: Option<f64>,
    pub volatility: Option<f64>,
}

/// A price series extended with fractional returns and rolling volatility
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilitySeries {
    rows: Vec<VolatilityRow>,
    window: usize,
}

impl VolatilitySeries {
    pub fn new(rows: Vec<VolatilityRow>, window: usize) -> Self {
        Self { rows, window }
    }

    pub fn rows(&self) -> &[VolatilityRow] {
        &self.rows
    }

    /// Rolling window length the volatility column was computed with
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last `n` rows, oldest first
    pub fn tail(&self, n: usize) -> &[VolatilityRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    pub fn has_volatility(&self) -> bool {
        self.rows.iter().any(|r| r.volatility.is_some())
    }

    /// Drop the derived columns, giving back the underlying price series
    #[cfg(test)]
    pub fn to_price_series(&self) -> PriceSeries {
        PriceSeries::from_points(
            self.rows
                .iter()
                .map(|r| PricePoint {
                    date: r.date,
                    price: r.price,
                })
                .collect(),
        )
    }
}
