use thiserror::Error;

use super::model::{Axis, SeriesIndex};

// ---------------------------------------------------------------------------
// Core error type
// ---------------------------------------------------------------------------

pub type LapResult<T> = Result<T, LapError>;

/// Everything that can go wrong between markup text and the time-diff curve.
///
/// All variants are fatal for the comparison being computed; the viewer
/// shows them in the status line and keeps the previous result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LapError {
    /// A value required by the chart vocabulary could not be read.
    #[error("malformed markup in {role}: {reason} ('{token}')")]
    MalformedMarkup {
        role: &'static str,
        token: String,
        reason: String,
    },

    #[error("axis {axis}: need at least 2 distinct guide pixels, found {distinct}")]
    InsufficientCalibration { axis: Axis, distinct: usize },

    #[error("{series}: need at least 2 increasing points, found {retained}")]
    InsufficientSeriesData { series: SeriesIndex, retained: usize },

    #[error("{series}: average speed is not positive near position {position}")]
    DegenerateVelocity { series: SeriesIndex, position: f64 },

    #[error("{series} is missing from every source document")]
    MissingSeries { series: SeriesIndex },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("analysis cancelled")]
    Cancelled,
}

impl LapError {
    pub(crate) fn malformed(
        role: &'static str,
        token: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        LapError::MalformedMarkup {
            role,
            token: token.into(),
            reason: reason.into(),
        }
    }
}
