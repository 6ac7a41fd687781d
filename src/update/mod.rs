//! Bayesian Recall Update
//!
//! After a quiz with `successes` out of `total` at elapsed `t_now`, the exact
//! posterior on recall is a finite mixture, not a Beta. Its first two moments
//! at a chosen elapsed time `t_back` are sums over the failures `i`:
//!
//! M_m ∝ Σ_i (-1)^i C(f, i) B(beta, alpha + δ(s + i) + m·δ·ε)
//!
//! with `δ = t_now / time`, `ε = t_back / t_now` and `f = total - successes`.
//! Every term is formed in the log domain, and the mixture is collapsed back
//! to a Beta by moment matching.
//!
//! Moment matching is best conditioned when alpha ≈ beta. If the posterior at
//! the prior's time is skewed by more than 2×, the update is redone with
//! `t_back` at a rough half-life of that skewed posterior.

use rayon::prelude::*;

use crate::error::{InstabilityKind, RecallError, RecallResult, UpdateDiagnostics};
use crate::percentile::{halflife, percentile_decay_unchecked};
use crate::sanitize::validate_quiz;
use crate::special::{log_beta, log_binom, log_sum_exp};
use crate::types::{
    BatchUpdateItem, Model, ResolvedPercentile, DEFAULT_PERCENTILE, DEFAULT_PERCENTILE_TOLERANCE,
};

/// Posterior model after `successes` of `total` quiz trials at elapsed `t_now`
pub fn update_recall(
    model: &Model,
    successes: u32,
    total: u32,
    t_now: f64,
) -> RecallResult<Model> {
    validate_quiz(successes, total, t_now)?;
    let proposed = update_at(model, successes, total, t_now, model.time())?;
    rebalance(model, successes, total, t_now, proposed)
}

/// Apply many independent updates in parallel; results keep the input order
pub fn update_recall_batch(items: &[BatchUpdateItem]) -> Vec<RecallResult<Model>> {
    items
        .par_iter()
        .map(|item| update_recall(&item.model, item.successes, item.total, item.t_now))
        .collect()
}

/// Re-express a skewed posterior around its own rough half-life
fn rebalance(
    prior: &Model,
    successes: u32,
    total: u32,
    t_now: f64,
    proposed: Model,
) -> RecallResult<Model> {
    if !proposed.is_skewed() {
        return Ok(proposed);
    }

    let rough_halflife = percentile_decay_unchecked(
        &proposed,
        ResolvedPercentile {
            percentile: DEFAULT_PERCENTILE,
            coarse: true,
            tolerance: DEFAULT_PERCENTILE_TOLERANCE,
        },
    )?;
    tracing::debug!(
        alpha = proposed.alpha(),
        beta = proposed.beta(),
        rough_halflife,
        "rebalancing skewed posterior"
    );

    update_at(prior, successes, total, t_now, rough_halflife)
}

/// Posterior moments at `t_back`, moment-matched to a Beta
fn update_at(
    prior: &Model,
    successes: u32,
    total: u32,
    t_now: f64,
    t_back: f64,
) -> RecallResult<Model> {
    let alpha = prior.alpha();
    let beta = prior.beta();
    let dt = t_now / prior.time();
    let et = t_back / t_now;

    let failures = total - successes;
    let binomln: Vec<f64> = (0..=failures).map(|i| log_binom(failures, i)).collect();
    let signs: Vec<f64> = (0..=failures)
        .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
        .collect();

    let log_moment = |m: f64| {
        let values: Vec<f64> = binomln
            .iter()
            .zip(successes..=total)
            .map(|(&b, k)| b + log_beta(beta, alpha + dt * f64::from(k) + m * dt * et))
            .collect();
        log_sum_exp(&values, &signs)
    };

    let log_denominator = log_moment(0.0);
    let log_mean_num = log_moment(1.0);
    let log_m2_num = log_moment(2.0);

    let mean = (log_mean_num - log_denominator).exp();
    let m2 = (log_m2_num - log_denominator).exp();
    let mean_sq = (2.0 * (log_mean_num - log_denominator)).exp();
    let sig2 = m2 - mean_sq;

    let diagnostics = UpdateDiagnostics {
        alpha,
        beta,
        time: prior.time(),
        successes,
        total,
        t_now,
        mean,
        m2,
        sig2,
    };
    moments_to_model(t_back, diagnostics)
}

/// Match a Beta distribution to the mean and variance in `diagnostics`
fn moments_to_model(t_back: f64, diagnostics: UpdateDiagnostics) -> RecallResult<Model> {
    let UpdateDiagnostics { mean, m2, sig2, .. } = diagnostics;

    let kind = if mean.is_nan() || mean <= 0.0 {
        Some(InstabilityKind::InvalidMean)
    } else if m2.is_nan() || m2 <= 0.0 {
        Some(InstabilityKind::InvalidSecondMoment)
    } else if sig2.is_nan() || sig2 <= 0.0 {
        Some(InstabilityKind::InvalidVariance)
    } else {
        None
    };
    if let Some(kind) = kind {
        return Err(instability(kind, diagnostics));
    }

    let tmp = mean * (1.0 - mean) / sig2 - 1.0;
    let new_alpha = mean * tmp;
    let new_beta = (1.0 - mean) * tmp;

    // Variance at or above mean·(1 - mean) has no Beta counterpart.
    if !(new_alpha > 0.0 && new_beta > 0.0 && new_alpha.is_finite() && new_beta.is_finite()) {
        return Err(instability(InstabilityKind::InvalidVariance, diagnostics));
    }

    Ok(Model::from_parts(t_back, new_alpha, new_beta))
}

fn instability(kind: InstabilityKind, diagnostics: UpdateDiagnostics) -> RecallError {
    tracing::warn!(%kind, %diagnostics, "recall update produced unusable moments");
    RecallError::NumericalInstability { kind, diagnostics }
}

/// Balanced model (alpha = beta) whose half-life is `scale` times the current one.
///
/// The second moment of recall at the current half-life is preserved, so the
/// rescaled model is about as confident as the original.
pub fn rescale_halflife(model: &Model, scale: f64) -> RecallResult<Model> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(RecallError::contract(format!(
            "scale must be finite and > 0, got {scale}"
        )));
    }

    let old_halflife = halflife(model)?;
    let dt = old_halflife / model.time();

    let log_denominator = log_beta(model.alpha(), model.beta());
    let m2 = (log_beta(model.alpha() + 2.0 * dt, model.beta()) - log_denominator).exp();
    let new_alpha_beta = 1.0 / (8.0 * m2 - 2.0) - 0.5;

    if !(new_alpha_beta > 0.0 && new_alpha_beta.is_finite()) {
        return Err(instability(
            InstabilityKind::InvalidSecondMoment,
            UpdateDiagnostics {
                alpha: model.alpha(),
                beta: model.beta(),
                time: model.time(),
                successes: 0,
                total: 0,
                t_now: old_halflife,
                mean: 0.5,
                m2,
                sig2: m2 - 0.25,
            },
        ));
    }

    Ok(Model::from_parts(
        old_halflife * scale,
        new_alpha_beta,
        new_alpha_beta,
    ))
}

impl Model {
    /// Method form of [`update_recall`]
    pub fn update_recall(&self, successes: u32, total: u32, t_now: f64) -> RecallResult<Model> {
        update_recall(self, successes, total, t_now)
    }

    /// Method form of [`rescale_halflife`]
    pub fn rescale_halflife(&self, scale: f64) -> RecallResult<Model> {
        rescale_halflife(self, scale)
    }
}

// ==================== Unit Tests ====================
