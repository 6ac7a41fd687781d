//! Recall Prediction
//!
//! With recall probability `p ~ Beta(alpha, beta)` at elapsed `time`, recall
//! after `t_now` is `p^(t_now / time)`. Its expectation is a ratio of Beta
//! functions:
//!
//! E[p^δ] = B(alpha + δ, beta) / B(alpha, beta),  δ = t_now / time
//!
//! The log of that ratio decreases monotonically in `t_now`, so callers that
//! only rank items can skip the final `exp`.

use rayon::prelude::*;

use crate::error::RecallResult;
use crate::sanitize::validate_elapsed;
use crate::special::log_beta_ratio;
use crate::types::{BatchPredictInput, Model, PredictOptions};

/// Expected recall probability at `t_now`, or its natural log unless `exact`
pub fn predict_recall(
    model: &Model,
    t_now: f64,
    options: &PredictOptions,
) -> RecallResult<f64> {
    validate_elapsed(t_now)?;
    Ok(predict_unchecked(model, t_now, options.resolve()))
}

/// Prediction for inputs already known to be valid
pub(crate) fn predict_unchecked(model: &Model, t_now: f64, exact: bool) -> f64 {
    if t_now == 0.0 {
        return if exact { 1.0 } else { 0.0 };
    }
    let dt = t_now / model.time();
    let ret = log_beta_ratio(model.alpha() + dt, model.alpha(), model.beta());
    if exact {
        ret.exp()
    } else {
        ret
    }
}

/// Predict many models in parallel; results keep the input order
pub fn predict_recall_batch(
    inputs: &[BatchPredictInput],
    options: &PredictOptions,
) -> Vec<RecallResult<f64>> {
    let exact = options.resolve();
    inputs
        .par_iter()
        .map(|input| -> RecallResult<f64> {
            validate_elapsed(input.t_now)?;
            Ok(predict_unchecked(&input.model, input.t_now, exact))
        })
        .collect()
}

impl Model {
    /// Method form of [`predict_recall`]
    pub fn predict_recall(&self, t_now: f64, options: &PredictOptions) -> RecallResult<f64> {
        predict_recall(self, t_now, options)
    }
}

// ==================== Unit Tests ====================
