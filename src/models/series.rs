//! Price series models

use chrono::{DateTime, Utc};

/// A single observation of an instrument's price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: DateTime<Utc>,
    pub price: f64,
}

/// Ordered, de-duplicated `(date, price)` observations for one instrument.
///
/// Built once by a data source and never mutated afterwards. Dates are
/// strictly increasing and every price is finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from raw observations.
    ///
    /// Non-finite prices are dropped, points are sorted by date and a repeated
    /// timestamp keeps its last observation.
    pub fn from_points(points: Vec<PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.price.is_finite())
            .collect();

        // Stable sort keeps provider order among equal timestamps
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self { points: deduped }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}
