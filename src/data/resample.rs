use std::fmt;

use serde::{Deserialize, Serialize};

use super::calibrate::AxisMapping;
use super::error::{LapError, LapResult};
use super::filter::{retain_increasing, MonotonicPolicy};
use super::model::{DomainSeries, RawSeries, ResampledSeries};

// ---------------------------------------------------------------------------
// Resolution of the resampled grid
// ---------------------------------------------------------------------------

/// Upper bound on grid samples in either resolution mode.
pub const MAX_SAMPLES: usize = 1_000_000;

/// How many samples the resampled grid gets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// `round(span / step)` samples, independent of absolute scale.
    Step(f64),
    /// A fixed number of samples.
    Count(usize),
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Step(1e-4)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Step(step) => write!(f, "step {step}"),
            Resolution::Count(n) => write!(f, "{n} samples"),
        }
    }
}

impl Resolution {
    /// Number of grid samples over `[min, max]`, never below 2.
    pub fn sample_count(&self, min: f64, max: f64) -> LapResult<usize> {
        let n = match *self {
            Resolution::Step(step) => {
                if !(step.is_finite() && step > 0.0) {
                    return Err(LapError::InvalidParameter(format!(
                        "resample step must be positive, got {step}"
                    )));
                }
                let n = ((max - min) / step).round();
                if !n.is_finite() || n > MAX_SAMPLES as f64 {
                    return Err(LapError::InvalidParameter(format!(
                        "step {step} gives more than {MAX_SAMPLES} samples over [{min}, {max}]"
                    )));
                }
                n as usize
            }
            Resolution::Count(n) if n > MAX_SAMPLES => {
                return Err(LapError::InvalidParameter(format!(
                    "resample count {n} exceeds {MAX_SAMPLES}"
                )));
            }
            Resolution::Count(n) => n,
        };
        Ok(n.max(2))
    }
}

// ---------------------------------------------------------------------------
// Pixel space → domain space
// ---------------------------------------------------------------------------

/// Calibrate a raw series and keep only forward-moving samples.
pub fn to_domain(
    raw: &RawSeries,
    x: &AxisMapping,
    y: &AxisMapping,
    policy: MonotonicPolicy,
) -> LapResult<DomainSeries> {
    let calibrated = raw
        .points
        .iter()
        .map(|&[px, py]| (x.apply(px), y.apply(py)))
        .filter(|(p, v)| p.is_finite() && v.is_finite());
    let (position, velocity) = retain_increasing(calibrated, policy);

    log::debug!(
        "{}: {} raw points, {} kept by {policy}",
        raw.series,
        raw.len(),
        position.len()
    );
    if position.len() < 2 {
        return Err(LapError::InsufficientSeriesData {
            series: raw.series,
            retained: position.len(),
        });
    }
    Ok(DomainSeries::from_checked(raw.series, position, velocity))
}

// ---------------------------------------------------------------------------
// Piecewise-linear interpolation
// ---------------------------------------------------------------------------

/// Piecewise-linear interpolant through a domain series.
///
/// Queries outside the covered range are clamped to its ends.
#[derive(Debug, Clone, Copy)]
pub struct Interpolant<'a> {
    position: &'a [f64],
    velocity: &'a [f64],
}

impl<'a> Interpolant<'a> {
    pub fn new(series: &'a DomainSeries) -> LapResult<Self> {
        if series.len() < 2 {
            return Err(LapError::InsufficientSeriesData {
                series: series.series(),
                retained: series.len(),
            });
        }
        Ok(Self {
            position: series.position(),
            velocity: series.velocity(),
        })
    }

    pub fn min(&self) -> f64 {
        self.position[0]
    }

    pub fn max(&self) -> f64 {
        self.position[self.position.len() - 1]
    }

    pub fn eval(&self, x: f64) -> f64 {
        let last = self.position.len() - 1;
        if x <= self.position[0] {
            return self.velocity[0];
        }
        if x >= self.position[last] {
            return self.velocity[last];
        }
        // First knot strictly beyond x; 1..=last because of the checks above.
        let hi = self.position.partition_point(|&p| p <= x);
        let lo = hi - 1;
        let (x0, x1) = (self.position[lo], self.position[hi]);
        let (y0, y1) = (self.velocity[lo], self.velocity[hi]);
        if x == x0 {
            return y0;
        }
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

/// Sample `series` on an even grid spanning its full position range.
pub fn resample(series: &DomainSeries, resolution: Resolution) -> LapResult<ResampledSeries> {
    let interp = Interpolant::new(series)?;
    let (min, max) = (interp.min(), interp.max());
    let n = resolution.sample_count(min, max)?;
    let span = max - min;

    let mut position = Vec::with_capacity(n);
    let mut velocity = Vec::with_capacity(n);
    for i in 0..n {
        let x = if i + 1 == n {
            max
        } else {
            min + span * (i as f64) / ((n - 1) as f64)
        };
        position.push(x);
        velocity.push(interp.eval(x));
    }

    log::debug!(
        "{}: resampled {} points onto {n} ({resolution}) over [{min:.5}, {max:.5}]",
        series.series(),
        series.len()
    );
    ResampledSeries::from_samples(series.series(), position, velocity)
}

/// Both steps for one series: calibration + filtering, then resampling.
pub fn resample_raw(
    raw: &RawSeries,
    x: &AxisMapping,
    y: &AxisMapping,
    policy: MonotonicPolicy,
    resolution: Resolution,
) -> LapResult<(DomainSeries, ResampledSeries)> {
    let domain = to_domain(raw, x, y, policy)?;
    let resampled = resample(&domain, resolution)?;
    Ok((domain, resampled))
}
