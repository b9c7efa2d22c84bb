use super::error::{LapError, LapResult};
use super::model::ResampledSeries;

/// Two resampled laps whose first positions match within the tolerance.
///
/// Lengths may differ; compare pointwise over [`AlignedPair::common_len`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub left: ResampledSeries,
    pub right: ResampledSeries,
}

impl AlignedPair {
    pub fn common_len(&self) -> usize {
        self.left.len().min(self.right.len())
    }
}

/// Trim the lap that starts earlier until it starts at or after the other.
///
/// Starts closer than `epsilon` are left alone. Which argument starts
/// earlier does not matter; results come back in argument order.
pub fn align(
    left: &ResampledSeries,
    right: &ResampledSeries,
    epsilon: f64,
) -> LapResult<AlignedPair> {
    let (l0, r0) = (left.start(), right.start());
    if (l0 - r0).abs() < epsilon {
        return Ok(AlignedPair {
            left: left.clone(),
            right: right.clone(),
        });
    }

    if l0 < r0 {
        Ok(AlignedPair {
            left: advance_to(left, r0)?,
            right: right.clone(),
        })
    } else {
        Ok(AlignedPair {
            left: left.clone(),
            right: advance_to(right, l0)?,
        })
    }
}

fn advance_to(series: &ResampledSeries, start: f64) -> LapResult<ResampledSeries> {
    let skip = series.position().partition_point(|&p| p < start);
    let retained = series.len() - skip;
    if retained < 2 {
        return Err(LapError::InsufficientSeriesData {
            series: series.series(),
            retained,
        });
    }
    log::debug!(
        "{}: dropped {skip} leading samples to start at {start:.5}",
        series.series()
    );
    Ok(series.skip(skip))
}
