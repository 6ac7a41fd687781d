//! Common Types and Constants
//!
//! The recall model value, query options and batch item types shared by the
//! prediction, update and percentile modules.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::RecallError;
use crate::sanitize::validate_model_fields;

// ==================== Constants ====================

/// Default alpha (and beta) of a freshly created prior
pub const DEFAULT_ALPHA: f64 = 4.0;

/// Relative tolerance used by approximate model equality
pub const MODEL_EQ_RELATIVE_TOLERANCE: f64 = 1e-6;

/// Default recall percentile for decay queries (half-life)
pub const DEFAULT_PERCENTILE: f64 = 0.5;

/// Default golden-section tolerance for decay queries
pub const DEFAULT_PERCENTILE_TOLERANCE: f64 = 1e-4;

/// Golden-section maximum iterations for decay queries
pub const MAX_GOLDEN_ITERATIONS: usize = 10_000;

/// Maximum number of bracket shifts before giving up
pub const MAX_BRACKET_ITERATIONS: usize = 1_000;

/// Bracket width in log-time for precise decay queries
pub const PRECISE_BRACKET_WIDTH: f64 = 6.0;

/// Bracket width in log-time for coarse decay queries
pub const COARSE_BRACKET_WIDTH: f64 = 1.0;

/// A posterior is rebalanced when one shape parameter exceeds the other by this factor
pub const REBALANCE_SKEW_RATIO: f64 = 2.0;

// ==================== Model ====================

/// Beta(alpha, beta) belief over recall probability, evaluated at elapsed `time`.
///
/// Values are immutable: updates return a new model and leave the prior usable.
///
/// Equality is approximate (see [`Model::approx_eq`]) while [`Hash`] uses the
/// exact field bits, so two models that compare equal may hash differently.
/// This inconsistency is accepted: models are meant to be compared, not used
/// as map keys.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawModel")]
pub struct Model {
    time: f64,
    alpha: f64,
    beta: f64,
}

#[derive(Deserialize)]
struct RawModel {
    time: f64,
    alpha: f64,
    beta: f64,
}

impl TryFrom<RawModel> for Model {
    type Error = RecallError;

    fn try_from(raw: RawModel) -> Result<Self, Self::Error> {
        Model::new(raw.time, raw.alpha, raw.beta)
    }
}

impl Model {
    /// Create a model; every field must be finite and strictly positive.
    pub fn new(time: f64, alpha: f64, beta: f64) -> Result<Self, RecallError> {
        validate_model_fields(time, alpha, beta)?;
        Ok(Self { time, alpha, beta })
    }

    /// Symmetric prior with `beta = alpha`.
    pub fn with_alpha(time: f64, alpha: f64) -> Result<Self, RecallError> {
        Self::new(time, alpha, alpha)
    }

    /// Symmetric prior with the default alpha = beta = 4.
    pub fn with_time(time: f64) -> Result<Self, RecallError> {
        Self::new(time, DEFAULT_ALPHA, DEFAULT_ALPHA)
    }

    /// Construct from fields already known to satisfy the invariants.
    pub(crate) fn from_parts(time: f64, alpha: f64, beta: f64) -> Self {
        debug_assert!(validate_model_fields(time, alpha, beta).is_ok());
        Self { time, alpha, beta }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Mean recall probability at `time`, i.e. alpha / (alpha + beta)
    pub fn expected_recall(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Whether one shape parameter dominates the other enough to need rebalancing
    pub fn is_skewed(&self) -> bool {
        self.alpha > REBALANCE_SKEW_RATIO * self.beta
            || self.beta > REBALANCE_SKEW_RATIO * self.alpha
    }

    /// Field-wise approximate equality with relative tolerance 1e-6.
    pub fn approx_eq(&self, other: &Model) -> bool {
        approx_field_eq(self.time, other.time)
            && approx_field_eq(self.alpha, other.alpha)
            && approx_field_eq(self.beta, other.beta)
    }
}

fn approx_field_eq(a: f64, b: f64) -> bool {
    if a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()) {
        return true;
    }
    (a - b).abs() < MODEL_EQ_RELATIVE_TOLERANCE * a.abs().max(b.abs())
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl Hash for Model {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.time.to_bits().hash(state);
        self.alpha.to_bits().hash(state);
        self.beta.to_bits().hash(state);
    }
}

// ==================== Options ====================

/// Options for recall prediction
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictOptions {
    /// Return a probability instead of its natural log (default: false)
    pub exact: Option<bool>,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self { exact: Some(false) }
    }
}

impl PredictOptions {
    pub fn exact() -> Self {
        Self { exact: Some(true) }
    }

    pub(crate) fn resolve(&self) -> bool {
        self.exact.unwrap_or(false)
    }
}

/// Options for percentile decay queries
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentileOptions {
    /// Target recall probability in [0, 1] (default: 0.5, the half-life)
    pub percentile: Option<f64>,
    /// Return a fast bracket-midpoint estimate without refining (default: false)
    pub coarse: Option<bool>,
    /// Golden-section tolerance in log-time; ignored when coarse (default: 1e-4)
    pub tolerance: Option<f64>,
}

impl Default for PercentileOptions {
    fn default() -> Self {
        Self {
            percentile: Some(DEFAULT_PERCENTILE),
            coarse: Some(false),
            tolerance: Some(DEFAULT_PERCENTILE_TOLERANCE),
        }
    }
}

/// Percentile options with every default filled in
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ResolvedPercentile {
    pub percentile: f64,
    pub coarse: bool,
    pub tolerance: f64,
}

impl PercentileOptions {
    pub fn with_percentile(percentile: f64) -> Self {
        Self {
            percentile: Some(percentile),
            ..Self::default()
        }
    }

    pub fn coarse() -> Self {
        Self {
            coarse: Some(true),
            ..Self::default()
        }
    }

    pub(crate) fn resolve(&self) -> ResolvedPercentile {
        ResolvedPercentile {
            percentile: self.percentile.unwrap_or(DEFAULT_PERCENTILE),
            coarse: self.coarse.unwrap_or(false),
            tolerance: self.tolerance.unwrap_or(DEFAULT_PERCENTILE_TOLERANCE),
        }
    }
}

// ==================== Batch Types ====================

/// One prediction in a batch
#[derive(Clone, Debug)]
pub struct BatchPredictInput {
    pub model: Model,
    /// Elapsed time since last review
    pub t_now: f64,
}

/// One quiz result in a batch update
#[derive(Clone, Debug)]
pub struct BatchUpdateItem {
    pub model: Model,
    pub successes: u32,
    pub total: u32,
    /// Elapsed time since last review
    pub t_now: f64,
}
