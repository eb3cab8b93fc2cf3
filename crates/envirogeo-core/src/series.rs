//! Synthetic time series generator
//!
//! Stand-in for satellite retrieval: produces a bounded, optionally seasonal
//! series with a random walk, a linear drift and per-sample noise. Shape is
//! reproducible (seasonality, clamping, cadence) but values are not; use
//! [`generate_with_rng`] with a seeded RNG when repeatability is needed.

use std::f64::consts::PI;

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;

use crate::models::{ParameterId, TimeSeriesPoint};
use crate::parameters::ParameterDefinition;

/// Upper bound on the number of sampling intervals across a span
pub const MAX_INTERVALS: i64 = 90;

/// Seasonal amplitude as a fraction of the parameter range
const SEASONAL_AMPLITUDE: f64 = 0.15;

/// Width of one random-walk step as a fraction of the range
const RANDOM_WALK_STEP: f64 = 0.03;

/// Width of per-sample noise as a fraction of the range
const NOISE_WIDTH: f64 = 0.1;

/// Half-width of the uncertainty band as a fraction of the range
const UNCERTAINTY: f64 = 0.05;

/// Largest drift per day as a fraction of the range
const MAX_DAILY_DRIFT: f64 = 0.0005;

/// Days between samples for a span of `total_days`
///
/// Rounds up so a span never yields more than `MAX_INTERVALS + 1` samples.
pub fn sample_stride(total_days: i64) -> i64 {
    let days = total_days.max(0);
    ((days + MAX_INTERVALS - 1) / MAX_INTERVALS).max(1)
}

/// Generate a series using thread-local randomness
pub fn generate(parameter: ParameterId, start: NaiveDate, end: NaiveDate) -> Vec<TimeSeriesPoint> {
    generate_with_rng(parameter, start, end, &mut rand::thread_rng())
}

/// Generate a series from the supplied random source
///
/// Walks from `start` to `end` inclusive. Returns an empty series when
/// `end` precedes `start`.
pub fn generate_with_rng<R: Rng + ?Sized>(
    parameter: ParameterId,
    start: NaiveDate,
    end: NaiveDate,
    rng: &mut R,
) -> Vec<TimeSeriesPoint> {
    if end < start {
        return Vec::new();
    }

    let def = parameter.definition();
    let range = def.range();
    let total_days = (end - start).num_days();
    let stride = sample_stride(total_days);

    // Base value sits between the 40th and 70th percentile of the range
    let mut base = def.min + range * (0.4 + rng.gen::<f64>() * 0.3);

    let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let drift_per_sample = rng.gen::<f64>() * MAX_DAILY_DRIFT * stride as f64 * direction;

    let capacity = (total_days / stride + 1) as usize;
    let mut points = Vec::with_capacity(capacity);

    for (index, offset) in (0..=total_days).step_by(stride as usize).enumerate() {
        let date = start + Duration::days(offset);

        let seasonal = if def.seasonal {
            seasonal_component(date, range)
        } else {
            0.0
        };

        base += (rng.gen::<f64>() - 0.5) * range * RANDOM_WALK_STEP;
        let drift = index as f64 * drift_per_sample * range;
        let noise = (rng.gen::<f64>() - 0.5) * range * NOISE_WIDTH;

        let value = def.clamp(base + seasonal + drift + noise);
        points.push(point_with_bounds(def, date, value));
    }

    tracing::debug!(
        parameter = %parameter,
        points = points.len(),
        stride,
        "Generated synthetic series"
    );

    points
}

/// One-year sine aligned to day-of-year
fn seasonal_component(date: NaiveDate, range: f64) -> f64 {
    let phase = date.ordinal() as f64 / 365.0 * 2.0 * PI;
    phase.sin() * range * SEASONAL_AMPLITUDE
}

fn point_with_bounds(def: &ParameterDefinition, date: NaiveDate, value: f64) -> TimeSeriesPoint {
    let uncertainty = def.range() * UNCERTAINTY;
    TimeSeriesPoint {
        date,
        value: round4(value),
        min: Some(round4(def.clamp(value - uncertainty))),
        max: Some(round4(def.clamp(value + uncertainty))),
    }
}

/// Round to four decimal places
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
