//! Error types for the recall model.

use std::fmt;

use thiserror::Error;

/// Crate-wide result alias.
pub type RecallResult<T> = Result<T, RecallError>;

/// Which posterior moment failed validation during an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstabilityKind {
    InvalidMean,
    InvalidSecondMoment,
    InvalidVariance,
}

impl fmt::Display for InstabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstabilityKind::InvalidMean => "invalid mean",
            InstabilityKind::InvalidSecondMoment => "invalid second moment",
            InstabilityKind::InvalidVariance => "invalid variance",
        };
        f.write_str(name)
    }
}

/// Inputs and intermediate moments of a failed update, for diagnosis.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateDiagnostics {
    pub alpha: f64,
    pub beta: f64,
    pub time: f64,
    pub successes: u32,
    pub total: u32,
    pub t_now: f64,
    pub mean: f64,
    pub m2: f64,
    pub sig2: f64,
}

impl fmt::Display for UpdateDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "alpha={} beta={} time={} successes={} total={} t_now={} mean={} m2={} sig2={}",
            self.alpha,
            self.beta,
            self.time,
            self.successes,
            self.total,
            self.t_now,
            self.mean,
            self.m2,
            self.sig2
        )
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum RecallError {
    /// A caller-supplied argument or model field is out of range.
    #[error("contract violation: {reason}")]
    ContractViolation { reason: String },

    /// The posterior moments computed by an update are not usable.
    /// Callers usually retry with a different elapsed time.
    #[error("numerical instability ({kind}): {diagnostics}")]
    NumericalInstability {
        kind: InstabilityKind,
        diagnostics: UpdateDiagnostics,
    },

    /// The percentile root could not be bracketed.
    #[error("failed to bracket percentile {percentile} after {iterations} shifts")]
    BracketingFailure { percentile: f64, iterations: usize },

    /// Golden-section search hit its iteration cap or produced NaN.
    #[error(
        "golden-section search did not converge after {iterations} iterations \
         (tolerance={tolerance}, argmin={argmin}, minimum={minimum})"
    )]
    ConvergenceFailure {
        iterations: usize,
        tolerance: f64,
        argmin: f64,
        minimum: f64,
    },
}

impl RecallError {
    pub(crate) fn contract(reason: impl Into<String>) -> Self {
        RecallError::ContractViolation {
            reason: reason.into(),
        }
    }

    /// Whether retrying with adjusted inputs can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RecallError::NumericalInstability { .. })
    }
}
