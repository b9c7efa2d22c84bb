use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::error::{LapError, LapResult};
use crate::data::filter::MonotonicPolicy;
use crate::data::resample::{Resolution, MAX_SAMPLES};

pub const DEFAULT_ALIGNMENT_EPSILON: f64 = 1e-4;
pub const DEFAULT_RESAMPLE_STEP: f64 = 1e-4;

fn default_epsilon() -> f64 {
    DEFAULT_ALIGNMENT_EPSILON
}

// ---------------------------------------------------------------------------
// Analysis parameters
// ---------------------------------------------------------------------------

/// Parameters of one lap comparison.
///
/// JSON form:
///
/// ```json
/// {
///   "circuit_length_km": 5.793,
///   "alignment_epsilon": 0.0001,
///   "resolution": { "step": 0.0001 },
///   "monotonic_policy": "last-retained"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Scales lap fractions to distance. No default: it depends on the track.
    pub circuit_length_km: f64,
    #[serde(default = "default_epsilon")]
    pub alignment_epsilon: f64,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub monotonic_policy: MonotonicPolicy,
}

impl Default for AnalysisConfig {
    /// Placeholder length of 1 km until the user sets the real one.
    fn default() -> Self {
        Self {
            circuit_length_km: 1.0,
            alignment_epsilon: DEFAULT_ALIGNMENT_EPSILON,
            resolution: Resolution::Step(DEFAULT_RESAMPLE_STEP),
            monotonic_policy: MonotonicPolicy::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_length(circuit_length_km: f64) -> Self {
        Self {
            circuit_length_km,
            ..Self::default()
        }
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LapResult<()> {
        if !(self.circuit_length_km.is_finite() && self.circuit_length_km > 0.0) {
            return Err(LapError::InvalidParameter(format!(
                "circuit length must be positive, got {} km",
                self.circuit_length_km
            )));
        }
        if !(self.alignment_epsilon.is_finite() && self.alignment_epsilon >= 0.0) {
            return Err(LapError::InvalidParameter(format!(
                "alignment epsilon must be non-negative, got {}",
                self.alignment_epsilon
            )));
        }
        match self.resolution {
            Resolution::Step(step) if !(step.is_finite() && step > 0.0) => {
                Err(LapError::InvalidParameter(format!(
                    "resample step must be positive, got {step}"
                )))
            }
            // Positions are lap fractions, so a full lap spans 1.0.
            Resolution::Step(step) if step < 1.0 / MAX_SAMPLES as f64 => {
                Err(LapError::InvalidParameter(format!(
                    "resample step {step} gives more than {MAX_SAMPLES} samples per lap"
                )))
            }
            Resolution::Count(n) if !(2..=MAX_SAMPLES).contains(&n) => {
                Err(LapError::InvalidParameter(format!(
                    "resample count must be between 2 and {MAX_SAMPLES}, got {n}"
                )))
            }
            _ => Ok(()),
        }
    }
}
