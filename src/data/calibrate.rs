use super::error::{LapError, LapResult};
use super::model::{Axis, CalibrationSample};

// ---------------------------------------------------------------------------
// Axis calibration: pixel → domain value by least squares
// ---------------------------------------------------------------------------

/// Linear pixel → domain mapping, `value = slope * pixel + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapping {
    pub axis: Axis,
    pub slope: f64,
    pub intercept: f64,
}

impl AxisMapping {
    pub fn apply(&self, pixel: f64) -> f64 {
        self.slope * pixel + self.intercept
    }
}

/// Collects guide/label pairs for one axis until the document is walked.
#[derive(Debug, Clone)]
pub struct AxisCalibrator {
    axis: Axis,
    samples: Vec<CalibrationSample>,
}

impl AxisCalibrator {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            samples: Vec::new(),
        }
    }

    pub fn from_samples(axis: Axis, samples: &[CalibrationSample]) -> Self {
        Self {
            axis,
            samples: samples.to_vec(),
        }
    }

    pub fn push(&mut self, sample: CalibrationSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[CalibrationSample] {
        &self.samples
    }

    /// Ordinary least-squares fit over all collected samples.
    ///
    /// Needs at least two distinct pixel values; duplicate pixels still
    /// take part in the fit.
    pub fn fit(&self) -> LapResult<AxisMapping> {
        let distinct = distinct_pixels(&self.samples);
        if distinct < 2 {
            return Err(LapError::InsufficientCalibration {
                axis: self.axis,
                distinct,
            });
        }

        let n = self.samples.len() as f64;
        let mean_p = self.samples.iter().map(|s| s.pixel).sum::<f64>() / n;
        let mean_v = self.samples.iter().map(|s| s.value).sum::<f64>() / n;
        // Centered sums keep the fit stable for large pixel offsets.
        let (sxy, sxx) = self.samples.iter().fold((0.0, 0.0), |(sxy, sxx), s| {
            let dp = s.pixel - mean_p;
            (sxy + dp * (s.value - mean_v), sxx + dp * dp)
        });
        let slope = sxy / sxx;
        let intercept = mean_v - slope * mean_p;

        log::debug!(
            "axis {}: {} samples → value = {slope:.6} * pixel + {intercept:.6}",
            self.axis,
            self.samples.len()
        );
        Ok(AxisMapping {
            axis: self.axis,
            slope,
            intercept,
        })
    }
}

fn distinct_pixels(samples: &[CalibrationSample]) -> usize {
    let mut pixels: Vec<f64> = samples.iter().map(|s| s.pixel).collect();
    pixels.sort_by(f64::total_cmp);
    pixels.dedup();
    pixels.len()
}
