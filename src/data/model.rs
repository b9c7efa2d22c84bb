use std::fmt;

use super::error::{LapError, LapResult};

// ---------------------------------------------------------------------------
// Axis / series identifiers
// ---------------------------------------------------------------------------

/// One of the two calibrated chart axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Track position (fraction of a lap).
    X,
    /// Speed in km/h.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Which of the two compared laps a series belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesIndex {
    First,
    Second,
}

impl SeriesIndex {
    pub const ALL: [SeriesIndex; 2] = [SeriesIndex::First, SeriesIndex::Second];

    pub fn index(self) -> usize {
        match self {
            SeriesIndex::First => 0,
            SeriesIndex::Second => 1,
        }
    }

    /// Map a chart class token such as `serie-1` to its series.
    pub fn from_class_token(token: &str) -> Option<Self> {
        match token {
            "serie-0" => Some(SeriesIndex::First),
            "serie-1" => Some(SeriesIndex::Second),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            SeriesIndex::First => SeriesIndex::Second,
            SeriesIndex::Second => SeriesIndex::First,
        }
    }
}

impl fmt::Display for SeriesIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "serie-{}", self.index())
    }
}

// ---------------------------------------------------------------------------
// Pixel-space artifacts produced by the markup walker
// ---------------------------------------------------------------------------

/// A guide pixel paired with the label printed next to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSample {
    pub pixel: f64,
    pub value: f64,
}

impl CalibrationSample {
    pub fn new(pixel: f64, value: f64) -> Self {
        Self { pixel, value }
    }
}

/// Pixel coordinates of one series, in rendering order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub series: SeriesIndex,
    /// `[pixel_x, pixel_y]` pairs.
    pub points: Vec<[f64; 2]>,
}

impl RawSeries {
    pub fn empty(series: SeriesIndex) -> Self {
        Self {
            series,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Everything the walker recovered from one chart document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartCapture {
    pub axis_x: Vec<CalibrationSample>,
    pub axis_y: Vec<CalibrationSample>,
    /// Indexed by [`SeriesIndex::index`]; an absent series is empty.
    pub series: [RawSeries; 2],
}

impl Default for ChartCapture {
    fn default() -> Self {
        Self {
            axis_x: Vec::new(),
            axis_y: Vec::new(),
            series: [
                RawSeries::empty(SeriesIndex::First),
                RawSeries::empty(SeriesIndex::Second),
            ],
        }
    }
}

impl ChartCapture {
    pub fn samples(&self, axis: Axis) -> &[CalibrationSample] {
        match axis {
            Axis::X => &self.axis_x,
            Axis::Y => &self.axis_y,
        }
    }

    pub fn series(&self, series: SeriesIndex) -> &RawSeries {
        &self.series[series.index()]
    }

    /// Take the second lap from another document (cross-source comparison).
    ///
    /// The other document's second series wins; a single-lap page only has
    /// `serie-0`, which is used instead. Calibration stays with `self`, so
    /// both documents must come from the same chart layout.
    pub fn with_substitute(mut self, other: &ChartCapture) -> LapResult<Self> {
        let replacement = SeriesIndex::ALL
            .iter()
            .rev()
            .map(|&s| other.series(s))
            .find(|raw| !raw.is_empty())
            .ok_or(LapError::MissingSeries {
                series: SeriesIndex::Second,
            })?;
        log::warn!(
            "replacing {} ({} points) with {} from the comparison document ({} points)",
            SeriesIndex::Second,
            self.series(SeriesIndex::Second).len(),
            replacement.series,
            replacement.len()
        );
        self.series[SeriesIndex::Second.index()] = RawSeries {
            series: SeriesIndex::Second,
            points: replacement.points.clone(),
        };
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Domain-space artifacts
// ---------------------------------------------------------------------------

/// Calibrated (position, velocity) pairs with strictly increasing position.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSeries {
    series: SeriesIndex,
    position: Vec<f64>,
    velocity: Vec<f64>,
}

impl DomainSeries {
    /// Build a series, checking that positions strictly increase.
    pub fn new(series: SeriesIndex, position: Vec<f64>, velocity: Vec<f64>) -> LapResult<Self> {
        check_columns(series, &position, &velocity)?;
        Ok(Self {
            series,
            position,
            velocity,
        })
    }

    pub(crate) fn from_checked(series: SeriesIndex, position: Vec<f64>, velocity: Vec<f64>) -> Self {
        debug_assert!(check_columns(series, &position, &velocity).is_ok());
        Self {
            series,
            position,
            velocity,
        }
    }

    pub fn series(&self) -> SeriesIndex {
        self.series
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.position.iter().copied().zip(self.velocity.iter().copied())
    }
}

/// A speed trace sampled on an even position grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledSeries {
    series: SeriesIndex,
    position: Vec<f64>,
    velocity: Vec<f64>,
}

impl ResampledSeries {
    /// Wrap already sampled columns; positions must strictly increase.
    pub fn from_samples(
        series: SeriesIndex,
        position: Vec<f64>,
        velocity: Vec<f64>,
    ) -> LapResult<Self> {
        check_columns(series, &position, &velocity)?;
        Ok(Self {
            series,
            position,
            velocity,
        })
    }

    pub fn series(&self) -> SeriesIndex {
        self.series
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    pub fn start(&self) -> f64 {
        self.position.first().copied().unwrap_or(f64::NAN)
    }

    /// Drop the first `n` samples.
    pub(crate) fn skip(&self, n: usize) -> Self {
        Self {
            series: self.series,
            position: self.position[n..].to_vec(),
            velocity: self.velocity[n..].to_vec(),
        }
    }
}

/// Cumulative time (seconds) along a resampled series.
#[derive(Debug, Clone, PartialEq)]
pub struct LapTimeSeries {
    pub series: SeriesIndex,
    pub position: Vec<f64>,
    pub time: Vec<f64>,
}

impl LapTimeSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Elapsed time at the last sample.
    pub fn total(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }
}

fn check_columns(series: SeriesIndex, position: &[f64], velocity: &[f64]) -> LapResult<()> {
    if position.len() != velocity.len() {
        return Err(LapError::InvalidParameter(format!(
            "{series}: {} positions but {} velocities",
            position.len(),
            velocity.len()
        )));
    }
    if let Some(w) = position.windows(2).find(|w| !(w[1] > w[0])) {
        return Err(LapError::InvalidParameter(format!(
            "{series}: position {} does not increase after {}",
            w[1], w[0]
        )));
    }
    Ok(())
}
