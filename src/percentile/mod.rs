//! Percentile Decay
//!
//! Finds the elapsed time at which expected recall falls to a given
//! percentile. In log-time relative to the model,
//!
//! f(lnδ) = ln B(alpha + e^lnδ, beta) - ln B(alpha, beta) - ln(percentile)
//!
//! is monotonically decreasing with a single root. The root is bracketed by
//! shifting a fixed-width window, then refined by minimizing |f| with golden
//! section search. Coarse mode skips the refinement and returns the bracket
//! midpoint in linear time, which is only good to an order of magnitude.

use crate::error::{RecallError, RecallResult};
use crate::golden::GoldenSectionMinimizer;
use crate::sanitize::{validate_percentile, validate_tolerance};
use crate::special::log_beta;
use crate::types::{
    Model, PercentileOptions, ResolvedPercentile, COARSE_BRACKET_WIDTH, MAX_BRACKET_ITERATIONS,
    MAX_GOLDEN_ITERATIONS, PRECISE_BRACKET_WIDTH,
};

/// Elapsed time at which expected recall equals `options.percentile`
pub fn model_to_percentile_decay(model: &Model, options: &PercentileOptions) -> RecallResult<f64> {
    let resolved = options.resolve();
    validate_percentile(resolved.percentile)?;
    if !resolved.coarse {
        validate_tolerance(resolved.tolerance)?;
    }
    percentile_decay_unchecked(model, resolved)
}

/// Half-life of the model with the default tolerance
pub fn halflife(model: &Model) -> RecallResult<f64> {
    model_to_percentile_decay(model, &PercentileOptions::default())
}

pub(crate) fn percentile_decay_unchecked(
    model: &Model,
    options: ResolvedPercentile,
) -> RecallResult<f64> {
    let alpha = model.alpha();
    let beta = model.beta();
    let log_b = log_beta(alpha, beta);
    let log_percentile = options.percentile.ln();

    let f = |lndelta: f64| (log_beta(alpha + lndelta.exp(), beta) - log_b) - log_percentile;

    let width = if options.coarse {
        COARSE_BRACKET_WIDTH
    } else {
        PRECISE_BRACKET_WIDTH
    };
    let (blow, bhigh) = bracket_root(&f, width, options.percentile)?;

    if options.coarse {
        return Ok((blow.exp() + bhigh.exp()) / 2.0 * model.time());
    }

    let result = GoldenSectionMinimizer::new(options.tolerance, MAX_GOLDEN_ITERATIONS)
        .minimize(|x| f(x).abs(), blow, bhigh);
    if !result.converged {
        return Err(RecallError::ConvergenceFailure {
            iterations: result.iterations,
            tolerance: options.tolerance,
            argmin: result.argmin,
            minimum: result.minimum,
        });
    }

    Ok(result.argmin.exp() * model.time())
}

/// Shift a window of `width` until `f(blow) > 0 > f(bhigh)`
fn bracket_root<F>(f: &F, width: f64, percentile: f64) -> RecallResult<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    let failure = |iterations| RecallError::BracketingFailure {
        percentile,
        iterations,
    };

    let mut blow = -width / 2.0;
    let mut bhigh = width / 2.0;
    let mut flow = f(blow);
    let mut fhigh = f(bhigh);
    let mut shifts = 0;

    while flow > 0.0 && fhigh > 0.0 {
        if shifts >= MAX_BRACKET_ITERATIONS {
            return Err(failure(shifts));
        }
        shifts += 1;
        blow = bhigh;
        flow = fhigh;
        bhigh += width;
        fhigh = f(bhigh);
        tracing::trace!(blow, bhigh, "percentile bracket shifted up");
    }

    while flow < 0.0 && fhigh < 0.0 {
        if shifts >= MAX_BRACKET_ITERATIONS {
            return Err(failure(shifts));
        }
        shifts += 1;
        bhigh = blow;
        fhigh = flow;
        blow -= width;
        flow = f(blow);
        tracing::trace!(blow, bhigh, "percentile bracket shifted down");
    }

    if flow > 0.0 && fhigh < 0.0 {
        Ok((blow, bhigh))
    } else {
        Err(failure(shifts))
    }
}

impl Model {
    /// Method form of [`model_to_percentile_decay`]
    pub fn percentile_decay(&self, options: &PercentileOptions) -> RecallResult<f64> {
        model_to_percentile_decay(self, options)
    }

    /// Method form of [`halflife`]
    pub fn halflife(&self) -> RecallResult<f64> {
        halflife(self)
    }
}

// ==================== Unit Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::predict_recall;
    use crate::types::PredictOptions;

    fn model(time: f64, alpha: f64, beta: f64) -> Model {
        Model::new(time, alpha, beta).unwrap()
    }

    fn options(percentile: f64, coarse: bool, tolerance: f64) -> PercentileOptions {
        PercentileOptions {
            percentile: Some(percentile),
            coarse: Some(coarse),
            tolerance: Some(tolerance),
        }
    }

    #[test]
    fn test_symmetric_model_halflife_is_model_time() {
        let m = model(20.0, 2.0, 2.0);
        let h = model_to_percentile_decay(&m, &options(0.5, false, 1e-6)).unwrap();
        assert!((h - 20.0).abs() / 20.0 < 1e-3);
    }

    #[test]
    fn test_coarse_is_intentionally_imprecise() {
        let m = model(20.0, 2.0, 2.0);
        let coarse = model_to_percentile_decay(&m, &options(0.5, true, 1e-6)).unwrap();
        assert!((coarse - 20.0).abs() > 1e-2);
        // Still the right order of magnitude.
        assert!(coarse > 20.0 / std::f64::consts::E && coarse < 20.0 * std::f64::consts::E);
    }

    #[test]
    fn test_solution_hits_requested_percentile() {
        let m = model(7.0, 3.0, 5.0);
        for p in [0.05, 0.2, 0.5, 0.8, 0.95] {
            let t = model_to_percentile_decay(&m, &options(p, false, 1e-10)).unwrap();
            let recall = predict_recall(&m, t, &PredictOptions::exact()).unwrap();
            assert!((recall - p).abs() < 1e-6, "p={p} t={t} recall={recall}");
        }
    }

    #[test]
    fn test_lower_percentile_gives_longer_time() {
        let m = model(1.0, 4.0, 4.0);
        let t80 = model_to_percentile_decay(&m, &PercentileOptions::with_percentile(0.8)).unwrap();
        let t50 = halflife(&m).unwrap();
        let t20 = model_to_percentile_decay(&m, &PercentileOptions::with_percentile(0.2)).unwrap();
        assert!(t80 < t50 && t50 < t20);
    }

    #[test]
    fn test_bracket_shifts_for_distant_halflife() {
        // Strong prior: half-life far beyond the initial bracket.
        let m = model(1.0, 400.0, 2.0);
        let h = m.halflife().unwrap();
        assert!(h > 1.0_f64.exp().powi(3));
        let recall = predict_recall(&m, h, &PredictOptions::exact()).unwrap();
        assert!((recall - 0.5).abs() < 1e-3);

        let weak = model(1.0, 2.0, 400.0);
        let h = weak.halflife().unwrap();
        assert!(h < 1.0);
        let recall = predict_recall(&weak, h, &PredictOptions::exact()).unwrap();
        assert!((recall - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_extreme_tolerance_fails_to_converge() {
        let m = model(20.0, 2.0, 2.0);
        let err = model_to_percentile_decay(&m, &options(0.5, false, 1e-150)).unwrap_err();
        match err {
            RecallError::ConvergenceFailure { iterations, .. } => {
                assert_eq!(iterations, MAX_GOLDEN_ITERATIONS)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_percentiles_cannot_be_bracketed() {
        let m = model(1.0, 3.0, 3.0);
        for p in [0.0, 1.0] {
            let err = model_to_percentile_decay(&m, &PercentileOptions::with_percentile(p))
                .unwrap_err();
            assert!(matches!(err, RecallError::BracketingFailure { .. }), "{err:?}");
        }
    }

    #[test]
    fn test_invalid_arguments_are_contract_violations() {
        let m = model(1.0, 3.0, 3.0);
        for opts in [options(1.5, false, 1e-4), options(0.5, false, -1.0)] {
            let err = model_to_percentile_decay(&m, &opts).unwrap_err();
            assert!(matches!(err, RecallError::ContractViolation { .. }));
        }
        // Tolerance is not consulted in coarse mode.
        assert!(model_to_percentile_decay(&m, &options(0.5, true, -1.0)).is_ok());
    }

    #[test]
    fn test_halflife_scales_with_model_time() {
        let a = model(1.0, 3.0, 4.0).halflife().unwrap();
        let b = model(10.0, 3.0, 4.0).halflife().unwrap();
        assert!((b / a - 10.0).abs() < 1e-6);
    }
}
