use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::AnalysisConfig;

use super::align::align;
use super::calibrate::AxisCalibrator;
use super::error::{LapError, LapResult};
use super::laptime::{lap_time, time_diff};
use super::model::{Axis, ChartCapture, LapTimeSeries, ResampledSeries, SeriesIndex};
use super::resample::resample_raw;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Shared flag checked between pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self) -> LapResult<()> {
        if self.is_cancelled() {
            Err(LapError::Cancelled)
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Result handed to the viewer
// ---------------------------------------------------------------------------

/// Both laps on a common start, their lap times and the time gap.
#[derive(Debug, Clone)]
pub struct LapComparison {
    pub circuit_length_km: f64,
    /// Aligned speed traces, indexed by [`SeriesIndex::index`].
    pub speed: [ResampledSeries; 2],
    pub lap_time: [LapTimeSeries; 2],
    /// `(position_km, t0 − t1)` over the common length.
    pub time_diff: Vec<[f64; 2]>,
}

impl LapComparison {
    /// Number of samples both laps share.
    pub fn common_len(&self) -> usize {
        self.time_diff.len()
    }

    /// `(position_km, km/h)` points of one lap, truncated to the common length.
    pub fn speed_points(&self, series: SeriesIndex) -> Vec<[f64; 2]> {
        let s = &self.speed[series.index()];
        s.position()
            .iter()
            .zip(s.velocity())
            .take(self.common_len())
            .map(|(&p, &v)| [p * self.circuit_length_km, v])
            .collect()
    }

    /// Gap at the last common sample; positive when the first lap is slower.
    pub fn final_gap(&self) -> Option<f64> {
        self.time_diff.last().map(|p| p[1])
    }
}

/// Run the numeric pipeline on a walked chart.
///
/// Each series is calibrated and resampled on its own; alignment and the
/// time gap need both.
pub fn analyze(
    capture: &ChartCapture,
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> LapResult<LapComparison> {
    config.validate()?;

    for series in SeriesIndex::ALL {
        if capture.series(series).is_empty() {
            return Err(LapError::MissingSeries { series });
        }
    }

    let x = AxisCalibrator::from_samples(Axis::X, capture.samples(Axis::X)).fit()?;
    let y = AxisCalibrator::from_samples(Axis::Y, capture.samples(Axis::Y)).fit()?;
    cancel.check()?;

    let mut resampled = Vec::with_capacity(2);
    for series in SeriesIndex::ALL {
        let (_, r) = resample_raw(
            capture.series(series),
            &x,
            &y,
            config.monotonic_policy,
            config.resolution,
        )?;
        resampled.push(r);
        cancel.check()?;
    }

    let pair = align(&resampled[0], &resampled[1], config.alignment_epsilon)?;
    cancel.check()?;

    let t0 = lap_time(&pair.left, config.circuit_length_km)?;
    let t1 = lap_time(&pair.right, config.circuit_length_km)?;
    let diff = time_diff(&t0, &t1, config.circuit_length_km);

    log::info!(
        "compared laps over {} samples: {:.3} s vs {:.3} s",
        diff.len(),
        t0.time.get(diff.len().saturating_sub(1)).copied().unwrap_or(0.0),
        t1.time.get(diff.len().saturating_sub(1)).copied().unwrap_or(0.0)
    );

    Ok(LapComparison {
        circuit_length_km: config.circuit_length_km,
        speed: [pair.left, pair.right],
        lap_time: [t0, t1],
        time_diff: diff,
    })
}
