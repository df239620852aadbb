//! Ordinary least-squares trend fitting.
//!
//! The estimator is agnostic about what `x` means: callers pick an extractor
//! (sample index or seconds since the first sample) through [`TrendBasis`] or
//! pass their own closure to [`RegressionEstimator::fit_with`].

use super::value_objects::PricePoint;
use crate::domain::errors::RegressionError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Which independent variable the trend line is fitted against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TrendBasis {
    /// Seconds elapsed since the first sample.
    #[default]
    #[display(fmt = "timestamp")]
    #[strum(serialize = "timestamp")]
    Timestamp,
    /// Zero-based position in the series.
    #[display(fmt = "sample index")]
    #[strum(serialize = "sample_index")]
    SampleIndex,
}

/// Value Object - fitted line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// `None` when the dependent variable is constant but the fit is not exact.
    pub r_squared: Option<f64>,
    pub sample_count: usize,
}

impl RegressionResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn equation(&self) -> String {
        format!("y = {:.4}x + {:.4}", self.slope, self.intercept)
    }
}

pub struct RegressionEstimator;

impl RegressionEstimator {
    /// Relative tolerance for the zero-variance check on `x`.
    const DEGENERATE_EPSILON: f64 = 1e-12;

    pub fn fit(samples: &[(f64, f64)]) -> Result<RegressionResult, RegressionError> {
        Self::fit_with(samples, |_, &(x, y)| (x, y))
    }

    /// Fit a price series using the chosen basis.
    pub fn fit_series(points: &[PricePoint], basis: TrendBasis) -> Result<RegressionResult, RegressionError> {
        match basis {
            TrendBasis::SampleIndex => Self::fit_with(points, |i, p| (i as f64, p.price)),
            TrendBasis::Timestamp => {
                let origin = points.first().map(|p| p.timestamp).unwrap_or_default();
                Self::fit_with(points, |_, p| (origin.seconds_until(p.timestamp) as f64, p.price))
            }
        }
    }

    /// Fit any slice given an `(index, item) -> (x, y)` extractor.
    ///
    /// Sums are accumulated in slice order, so identical input always yields
    /// bit-identical output.
    pub fn fit_with<T, F>(items: &[T], extract: F) -> Result<RegressionResult, RegressionError>
    where
        F: Fn(usize, &T) -> (f64, f64),
    {
        let count = items.len();
        if count < 2 {
            return Err(RegressionError::InsufficientData { count });
        }

        // Sums run on x relative to the first sample so the variance check
        // does not depend on the magnitude of x.
        let origin = extract(0, &items[0]).0;
        let n = count as f64;
        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
        for (i, item) in items.iter().enumerate() {
            let (x, y) = extract(i, item);
            let dx = x - origin;
            sum_x += dx;
            sum_y += y;
            sum_xy += dx * y;
            sum_xx += dx * dx;
        }

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator.abs() <= Self::DEGENERATE_EPSILON * n * sum_xx {
            return Err(RegressionError::DegenerateInput);
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let shifted_intercept = (sum_y - slope * sum_x) / n;

        let mean_y = sum_y / n;
        let (mut ss_res, mut ss_tot) = (0.0, 0.0);
        for (i, item) in items.iter().enumerate() {
            let (x, y) = extract(i, item);
            let residual = y - (slope * (x - origin) + shifted_intercept);
            ss_res += residual * residual;
            ss_tot += (y - mean_y) * (y - mean_y);
        }

        let r_squared = if ss_tot == 0.0 {
            // Constant y: the fit is exact or R² is undefined.
            let scale = mean_y.abs().max(1.0);
            (ss_res <= f64::EPSILON * scale * scale * n).then_some(1.0)
        } else {
            Some((1.0 - ss_res / ss_tot).clamp(0.0, 1.0))
        };

        let intercept = shifted_intercept - slope * origin;
        Ok(RegressionResult { slope, intercept, r_squared, sample_count: count })
    }
}
