use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Monotonicity filter: which samples survive pen backtracking
// ---------------------------------------------------------------------------

/// Rule deciding whether a sample moves forward along the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonotonicPolicy {
    /// Keep a sample only if it lies beyond the last *kept* sample.
    #[default]
    LastRetained,
    /// Drop a sample only if it steps back from the previous *raw* sample.
    ///
    /// A kept sample that lands behind earlier kept ones removes them, so
    /// after a retrace the later samples survive instead of the overshoot.
    PreviousRaw,
}

impl fmt::Display for MonotonicPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonotonicPolicy::LastRetained => write!(f, "last-retained"),
            MonotonicPolicy::PreviousRaw => write!(f, "previous-raw"),
        }
    }
}

impl FromStr for MonotonicPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last-retained" => Ok(MonotonicPolicy::LastRetained),
            "previous-raw" => Ok(MonotonicPolicy::PreviousRaw),
            other => Err(format!(
                "unknown policy '{other}' (expected last-retained or previous-raw)"
            )),
        }
    }
}

/// Return the `(position, velocity)` columns of the samples that pass
/// `policy`. The first sample always passes; positions of the result
/// strictly increase.
pub fn retain_increasing(
    points: impl IntoIterator<Item = (f64, f64)>,
    policy: MonotonicPolicy,
) -> (Vec<f64>, Vec<f64>) {
    let mut position: Vec<f64> = Vec::new();
    let mut velocity: Vec<f64> = Vec::new();
    let mut previous_raw: Option<f64> = None;
    let mut overshoot = 0usize;

    for (p, v) in points {
        let keep = match (policy, position.last(), previous_raw) {
            (_, None, _) => true,
            (MonotonicPolicy::LastRetained, Some(&last), _) => p > last,
            (MonotonicPolicy::PreviousRaw, Some(_), Some(prev)) => p > prev,
            (MonotonicPolicy::PreviousRaw, Some(_), None) => false,
        };
        previous_raw = Some(p);
        if !keep {
            continue;
        }
        while position.last().is_some_and(|&last| last >= p) {
            position.pop();
            velocity.pop();
            overshoot += 1;
        }
        position.push(p);
        velocity.push(v);
    }

    if overshoot > 0 {
        log::debug!("{overshoot} kept samples removed behind a retrace");
    }
    (position, velocity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(input: &[f64], policy: MonotonicPolicy) -> Vec<f64> {
        retain_increasing(input.iter().map(|&p| (p, 0.0)), policy).0
    }

    #[test]
    fn backtrack_is_dropped_until_passed() {
        let input = [0.0, 1.0, 2.0, 1.5, 1.8, 2.5, 3.0];
        assert_eq!(
            positions(&input, MonotonicPolicy::LastRetained),
            vec![0.0, 1.0, 2.0, 2.5, 3.0]
        );
    }

    #[test]
    fn previous_raw_keeps_samples_after_the_retrace() {
        let input = [0.0, 1.0, 2.0, 1.5, 1.8, 2.5, 3.0];
        // 1.5 steps back from 2.0 and is dropped; 1.8 steps forward from
        // 1.5 and replaces the overshoot at 2.0.
        assert_eq!(
            positions(&input, MonotonicPolicy::PreviousRaw),
            vec![0.0, 1.0, 1.8, 2.5, 3.0]
        );
    }

    #[test]
    fn policies_agree_on_clean_input() {
        let input = [0.0, 0.1, 0.25, 0.3];
        assert_eq!(positions(&input, MonotonicPolicy::LastRetained), input.to_vec());
        assert_eq!(positions(&input, MonotonicPolicy::PreviousRaw), input.to_vec());
    }

    #[test]
    fn plateaus_keep_the_first_sample() {
        let input = [0.0, 1.0, 1.0, 2.0];
        assert_eq!(positions(&input, MonotonicPolicy::LastRetained), vec![0.0, 1.0, 2.0]);
        assert_eq!(positions(&input, MonotonicPolicy::PreviousRaw), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn velocities_follow_their_positions() {
        let (p, v) = retain_increasing(
            vec![(0.0, 10.0), (0.5, 20.0), (0.4, 99.0), (0.6, 30.0)],
            MonotonicPolicy::LastRetained,
        );
        assert_eq!(p, vec![0.0, 0.5, 0.6]);
        assert_eq!(v, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn policy_names_round_trip_through_from_str() {
        for policy in [MonotonicPolicy::LastRetained, MonotonicPolicy::PreviousRaw] {
            assert_eq!(policy.to_string().parse::<MonotonicPolicy>(), Ok(policy));
        }
        assert!("sideways".parse::<MonotonicPolicy>().is_err());
    }
}
