//! Forecast engine: ARIMA(p, d, 0) fitted by conditional least squares

use tracing::{debug, info};

use crate::models::{ArimaOrder, ForecastResult, PriceSeries};
use crate::utils::ModelFailure;

/// Default number of steps projected beyond the last observation
pub const DEFAULT_FORECAST_STEPS: usize = 50;

// Relative ridge term added to the normal equations; keeps collinear designs solvable
const RIDGE: f64 = 1e-8;
const PIVOT_EPSILON: f64 = 1e-300;

/// An unfitted ARIMA model of a fixed order
#[derive(Debug, Clone, Copy)]
pub struct ArimaModel {
    order: ArimaOrder,
}

/// ARIMA model fitted to an observed series
#[derive(Debug, Clone)]
pub struct FittedArima {
    order: ArimaOrder,
    /// AR coefficients, lag 1 first
    ar_coefficients: Vec<f64>,
    /// Last `p` values of the `d`-times differenced series, oldest first
    recent_differences: Vec<f64>,
    /// Last value of each differencing level 0..d
    level_tails: Vec<f64>,
}

impl ArimaModel {
    pub fn new(order: ArimaOrder) -> Self {
        Self { order }
    }

    /// Minimum observations the least-squares fit needs: one regression row
    /// per AR coefficient on top of the `p + d` lost to lags and differencing.
    /// Exact-likelihood fitters accept (15,1,0) from 11 observations, so
    /// 11..=30 observations fail here with `InsufficientData` where such a
    /// fitter would still forecast.
    pub fn required_observations(&self) -> usize {
        (2 * self.order.p + self.order.d).max(self.order.d + 1)
    }

    pub fn fit(&self, observations: &[f64]) -> Result<FittedArima, ModelFailure> {
        let ArimaOrder { p, d, q } = self.order;

        if q > 0 {
            return Err(ModelFailure::UnsupportedOrder { order: self.order });
        }

        let required = self.required_observations();
        if observations.len() < required {
            return Err(ModelFailure::InsufficientData {
                order: self.order,
                required,
                available: observations.len(),
            });
        }

        let mut level_tails = Vec::with_capacity(d);
        let mut differenced = observations.to_vec();
        for _ in 0..d {
            // Non-empty: length is at least d + 1 before differencing
            level_tails.push(differenced[differenced.len() - 1]);
            differenced = difference(&differenced);
        }

        let ar_coefficients = if p == 0 {
            Vec::new()
        } else {
            let (xtx, xty) = normal_equations(&differenced, p);
            solve_ridge(xtx, xty).ok_or(ModelFailure::SingularSystem { order: self.order })?
        };

        if ar_coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelFailure::NumericalOverflow { step: 0 });
        }

        Ok(FittedArima {
            order: self.order,
            ar_coefficients,
            recent_differences: differenced[differenced.len().saturating_sub(p)..].to_vec(),
            level_tails,
        })
    }
}

impl FittedArima {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    /// Project `steps` levels beyond the end of the fitted series
    pub fn forecast(&self, steps: usize) -> Result<ForecastResult, ModelFailure> {
        let p = self.ar_coefficients.len();
        let mut history = self.recent_differences.clone();
        let mut tails = self.level_tails.clone();
        let mut values = Vec::with_capacity(steps);

        for step in 1..=steps {
            let next_difference: f64 = self
                .ar_coefficients
                .iter()
                .enumerate()
                .map(|(lag, coefficient)| coefficient * history[history.len() - 1 - lag])
                .sum();

            if p > 0 {
                history.push(next_difference);
            }

            // Integrate back through each differencing level
            let mut value = next_difference;
            for tail in tails.iter_mut().rev() {
                value += *tail;
                *tail = value;
            }

            if !value.is_finite() {
                return Err(ModelFailure::NumericalOverflow { step });
            }
            values.push(value);
        }

        Ok(ForecastResult {
            order: self.order,
            values,
        })
    }
}

/// Fit ARIMA of `order` to the series' prices and project `steps` points
pub fn forecast_arima(
    series: &PriceSeries,
    steps: usize,
    order: ArimaOrder,
) -> Result<ForecastResult, ModelFailure> {
    info!("🔮 Fitting ARIMA{} on {} observations", order, series.len());

    let fitted = ArimaModel::new(order).fit(&series.prices())?;
    debug!("ARIMA{} coefficients: {:?}", fitted.order(), fitted.ar_coefficients());
    let forecast = fitted.forecast(steps)?;

    info!("✓ ARIMA{} projected {} steps", order, forecast.steps());
    Ok(forecast)
}

fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// `X'X` and `X'y` for regressing `w[t]` on `w[t-1..=t-p]`
fn normal_equations(w: &[f64], p: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];

    for t in p..w.len() {
        for i in 0..p {
            let xi = w[t - 1 - i];
            xty[i] += xi * w[t];
            for j in 0..p {
                xtx[i][j] += xi * w[t - 1 - j];
            }
        }
    }

    (xtx, xty)
}

/// Solve `(A + λI) x = b` by Gaussian elimination with partial pivoting.
///
/// λ scales with the mean diagonal of `A`. A zero matrix yields the
/// minimum-norm solution, all zeros.
fn solve_ridge(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let trace: f64 = (0..n).map(|i| a[i][i]).sum();
    if trace == 0.0 {
        return Some(vec![0.0; n]);
    }

    let lambda = RIDGE * trace / n as f64;
    for (i, row) in a.iter_mut().enumerate() {
        row[i] += lambda;
    }

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))?;
        if !(a[pivot_row][col].abs() > PIVOT_EPSILON) {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Some(x)
}
