//! FSRS-4.5 parameter set
//!
//! Target retention, maximum interval, and the 19 model weights. A set is
//! immutable for the duration of one `schedule` call; swap it between calls to
//! personalise.

use serde::{Deserialize, Serialize};

use crate::error::{CadenceError, Result};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of model weights
pub const WEIGHT_COUNT: usize = 19;

/// Default target probability of recall
pub const DEFAULT_RETENTION: f64 = 0.9;

/// Default maximum interval in days (100 years)
pub const DEFAULT_MAXIMUM_INTERVAL: u32 = 36500;

/// Largest accepted maximum interval in days (1000 years)
pub const MAX_MAXIMUM_INTERVAL: u32 = 365_000;

/// Default weights, optimized from large-scale review data
///
/// | Index | Role                                               |
/// |-------|----------------------------------------------------|
/// | w0-w3 | Initial stability for Again / Hard / Good / Easy   |
/// | w4    | Initial difficulty baseline (mean-reversion target)|
/// | w5    | Initial difficulty rating slope                    |
/// | w6    | Difficulty step per rating                         |
/// | w7    | Mean-reversion weight                              |
/// | w8    | Recall stability growth scale (exponent)           |
/// | w9    | Recall stability saturation                        |
/// | w10   | Recall stability retrievability gain               |
/// | w11   | Forget stability scale                             |
/// | w12   | Forget stability difficulty exponent               |
/// | w13   | Forget stability prior-stability exponent          |
/// | w14   | Forget stability retrievability gain               |
/// | w15   | Hard penalty multiplier (recall stability)         |
/// | w16   | Easy bonus multiplier (recall stability)           |
/// | w17   | Unused                                             |
/// | w18   | Unused                                             |
///
/// w15/w16 have historically been labelled "reserved", but the recall-stability
/// recurrence consumes them. With `w15 = 0.0` a Hard rating in Review leaves
/// stability unchanged.
pub const FSRS45_WEIGHTS: [f64; WEIGHT_COUNT] = [
    0.4072, 1.1829, 3.1262, 15.4722, // w0-w3
    7.2102, 0.5316, 1.0651, 0.0046, // w4-w7
    1.5418, 0.1618, 1.0, // w8-w10
    2.1232, 0.0062, 0.3378, 0.4175, // w11-w14
    0.0, 2.0, 0.4, 0.9, // w15-w18
];

// ============================================================================
// PARAMETERS
// ============================================================================

/// Scheduler configuration
///
/// Missing fields fall back to the defaults when deserializing, so a JSON
/// file containing only `{"requestRetention": 0.85}` is a valid override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FSRSParameters {
    /// Target probability of recall at the scheduled due date, in (0, 1]
    pub request_retention: f64,
    /// Upper bound for any Review interval, in days
    pub maximum_interval: u32,
    /// Model weights w0-w18
    pub w: [f64; WEIGHT_COUNT],
}

impl Default for FSRSParameters {
    fn default() -> Self {
        Self {
            request_retention: DEFAULT_RETENTION,
            maximum_interval: DEFAULT_MAXIMUM_INTERVAL,
            w: FSRS45_WEIGHTS,
        }
    }
}

impl FSRSParameters {
    /// Override the target retention
    pub fn with_request_retention(mut self, request_retention: f64) -> Self {
        self.request_retention = request_retention;
        self
    }

    /// Override the maximum interval
    pub fn with_maximum_interval(mut self, maximum_interval: u32) -> Self {
        self.maximum_interval = maximum_interval;
        self
    }

    /// Override the weights
    pub fn with_weights(mut self, w: [f64; WEIGHT_COUNT]) -> Self {
        self.w = w;
        self
    }

    /// Parse a (possibly partial) JSON parameter set and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| CadenceError::InvalidParameters(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Check the parameter set preconditions.
    ///
    /// Rejects non-finite weights, a retention outside (0, 1], and a maximum
    /// interval outside [1, MAX_MAXIMUM_INTERVAL]. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        if !self.request_retention.is_finite()
            || self.request_retention <= 0.0
            || self.request_retention > 1.0
        {
            return Err(CadenceError::InvalidParameters(format!(
                "requestRetention must be in (0, 1], got {}",
                self.request_retention
            )));
        }

        if self.maximum_interval == 0 {
            return Err(CadenceError::InvalidParameters(
                "maximumInterval must be at least 1 day".to_string(),
            ));
        }
        if self.maximum_interval > MAX_MAXIMUM_INTERVAL {
            return Err(CadenceError::InvalidParameters(format!(
                "maximumInterval must be at most {} days, got {}",
                MAX_MAXIMUM_INTERVAL, self.maximum_interval
            )));
        }

        if let Some((i, w)) = self.w.iter().enumerate().find(|(_, w)| !w.is_finite()) {
            return Err(CadenceError::InvalidParameters(format!(
                "weight w{} is not finite: {}",
                i, w
            )));
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
