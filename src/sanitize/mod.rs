//! Precondition checks shared by the public operations.
//!
//! Every check returns `RecallError::ContractViolation` instead of panicking so
//! that embedding applications can report bad input.

use crate::error::{RecallError, RecallResult};

fn require_positive(name: &str, value: f64) -> RecallResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RecallError::contract(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}

/// Model fields must all be finite and strictly positive
pub fn validate_model_fields(time: f64, alpha: f64, beta: f64) -> RecallResult<()> {
    require_positive("time", time)?;
    require_positive("alpha", alpha)?;
    require_positive("beta", beta)
}

/// Elapsed time for a prediction: finite and >= 0
pub fn validate_elapsed(t_now: f64) -> RecallResult<()> {
    if t_now.is_finite() && t_now >= 0.0 {
        Ok(())
    } else {
        Err(RecallError::contract(format!(
            "elapsed time must be finite and >= 0, got {t_now}"
        )))
    }
}

/// Quiz result: `total >= 1`, `successes <= total`, `t_now > 0`
pub fn validate_quiz(successes: u32, total: u32, t_now: f64) -> RecallResult<()> {
    if total == 0 {
        return Err(RecallError::contract("total must be at least 1"));
    }
    if successes > total {
        return Err(RecallError::contract(format!(
            "successes ({successes}) must not exceed total ({total})"
        )));
    }
    require_positive("t_now", t_now)
}

/// Percentile must lie in [0, 1]
pub fn validate_percentile(percentile: f64) -> RecallResult<()> {
    if (0.0..=1.0).contains(&percentile) {
        Ok(())
    } else {
        Err(RecallError::contract(format!(
            "percentile must be in [0, 1], got {percentile}"
        )))
    }
}

/// Golden-section tolerance must be finite and strictly positive
pub fn validate_tolerance(tolerance: f64) -> RecallResult<()> {
    require_positive("tolerance", tolerance)
}
