//! Forecast models

use std::fmt;

/// ARIMA model order `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaOrder {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

impl ArimaOrder {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(15, 1, 0)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Projected prices beyond the end of an observed series.
///
/// Values are indexed by forecast step, starting at 1 for the first point
/// after the last observation. No calendar dates are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub order: ArimaOrder,
    pub values: Vec<f64>,
}

impl ForecastResult {
    pub fn steps(&self) -> usize {
        self.values.len()
    }

    /// `(step, value)` pairs with steps starting at 1
    pub fn indexed(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values.iter().enumerate().map(|(i, v)| (i + 1, *v))
    }
}
