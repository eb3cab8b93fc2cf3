//! Summary statistics over a time series

use crate::models::{Stats, TimeSeriesPoint, Trend};
use crate::series::{round1, round4};

/// Reduce a series to summary statistics
///
/// The series must contain at least one point. A single point has no
/// slope and is reported as a stable, zero-percent trend.
///
/// # Panics
///
/// Panics if `series` is empty.
pub fn compute_stats(series: &[TimeSeriesPoint]) -> Stats {
    assert!(!series.is_empty(), "compute_stats requires a non-empty series");

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let n = values.len() as f64;

    let mean = values.iter().sum::<f64>() / n;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    // Adding 0.0 folds a rounded -0.0 into 0.0
    let trend_percent = round1(trend_percent(&values, mean)) + 0.0;

    Stats {
        // Clamp guards against float drift pushing the mean past a bound
        mean: round4(mean.clamp(min, max)),
        min: round4(min),
        max: round4(max),
        std_dev: round4(std_dev),
        trend: Trend::from_percent(trend_percent),
        trend_percent,
    }
}

/// Least-squares slope against the centred sample index, scaled by the
/// sample count and expressed as a percentage of the mean
fn trend_percent(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 || mean == 0.0 {
        return 0.0;
    }

    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;

    let (numerator, denominator) =
        values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(num, den), (i, &y)| {
                let dx = i as f64 - x_mean;
                (num + dx * (y - mean), den + dx * dx)
            });

    let slope = numerator / denominator;
    let percent = slope * n / mean * 100.0;
    if percent.is_finite() {
        percent
    } else {
        0.0
    }
}
