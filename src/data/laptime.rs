use super::error::{LapError, LapResult};
use super::model::{LapTimeSeries, ResampledSeries};

const KMH_TO_MS: f64 = 1000.0 / 3600.0;

/// Cumulative time along a lap by trapezoidal integration of 1/v over
/// distance.
///
/// Positions are lap fractions scaled by `circuit_length_km`; speeds are
/// km/h. Time starts at zero on the first sample.
pub fn lap_time(series: &ResampledSeries, circuit_length_km: f64) -> LapResult<LapTimeSeries> {
    let position = series.position();
    let velocity = series.velocity();
    let metres_per_unit = circuit_length_km * 1000.0;

    let mut time = Vec::with_capacity(position.len());
    let mut t = 0.0;
    if !position.is_empty() {
        time.push(t);
    }
    for i in 1..position.len() {
        let speed = (velocity[i - 1] + velocity[i]) * 0.5 * KMH_TO_MS;
        // Also rejects NaN.
        if !(speed > 0.0) {
            return Err(LapError::DegenerateVelocity {
                series: series.series(),
                position: position[i],
            });
        }
        let distance = (position[i] - position[i - 1]) * metres_per_unit;
        t += distance / speed;
        time.push(t);
    }

    Ok(LapTimeSeries {
        series: series.series(),
        position: position.to_vec(),
        time,
    })
}

/// `left − right` elapsed time at each common sample, with x in km.
pub fn time_diff(
    left: &LapTimeSeries,
    right: &LapTimeSeries,
    circuit_length_km: f64,
) -> Vec<[f64; 2]> {
    left.position
        .iter()
        .zip(left.time.iter().zip(&right.time))
        .map(|(&x, (&tl, &tr))| [x * circuit_length_km, tl - tr])
        .collect()
}
