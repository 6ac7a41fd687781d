//! Special Functions in the log domain
//!
//! Everything the recall model computes is a ratio of Beta functions whose
//! magnitudes overflow `f64` long before the ratio itself does, so all
//! quantities are kept as logarithms:
//! - `log_gamma`: Lanczos/Spouge-style rational approximation with g = 607/128
//! - `log_beta`, `log_beta_ratio`, `log_binom`: built from `log_gamma`
//! - `log_sum_exp`: signed-weight sum of exponentials, magnitude only

use std::f64::consts::PI;

// ==================== Constants ====================

/// Shift parameter of the rational approximation
const LANCZOS_G: f64 = 607.0 / 128.0;

/// Series coefficients paired with `LANCZOS_G`
#[allow(clippy::excessive_precision)]
const LANCZOS_COEFFICIENTS: [f64; 15] = [
    0.999_999_999_999_997_1,
    57.156_235_665_862_92,
    -59.597_960_355_475_49,
    14.136_097_974_741_747,
    -0.491_913_816_097_620_2,
    0.339_946_499_848_118_9e-4,
    0.465_236_289_270_485_76e-4,
    -0.983_744_753_048_795_6e-4,
    0.158_088_703_224_912_5e-3,
    -0.210_264_441_724_104_88e-3,
    0.217_439_618_115_212_64e-3,
    -0.164_318_106_536_763_9e-3,
    0.844_182_239_838_527_4e-4,
    -0.261_908_384_015_814_1e-4,
    0.368_991_826_595_316_2e-5,
];

// ==================== Gamma / Beta ====================

/// Natural log of the Gamma function.
///
/// Returns NaN for negative arguments. Every caller in this crate passes
/// sums of strictly positive model parameters, so the NaN is never reached.
pub fn log_gamma(z: f64) -> f64 {
    if z < 0.0 {
        return f64::NAN;
    }

    let series = LANCZOS_COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS_COEFFICIENTS[0], |acc, (i, &c)| acc + c / (z + i as f64));

    let tmp = z + LANCZOS_G + 0.5;
    (z + 0.5) * tmp.ln() - tmp + 0.5 * (2.0 * PI).ln() + (series / z).ln()
}

/// ln(B(a, b))
pub fn log_beta(a: f64, b: f64) -> f64 {
    log_gamma(a) + log_gamma(b) - log_gamma(a + b)
}

/// ln(B(a1, b) / B(a, b)) without forming either Beta value
pub fn log_beta_ratio(a1: f64, a: f64, b: f64) -> f64 {
    log_gamma(a1) - log_gamma(a1 + b) + log_gamma(a + b) - log_gamma(a)
}

/// ln(n choose k) for `k <= n`
pub fn log_binom(n: u32, k: u32) -> f64 {
    debug_assert!(k <= n);
    let n = f64::from(n);
    let k = f64::from(k);
    -log_beta(1.0 + n - k, 1.0 + k) - (n + 1.0).ln()
}

// ==================== Log-Sum-Exp ====================

/// ln(|Σ weights[i] · exp(values[i])|), evaluated around `max(values)`.
///
/// Missing trailing weights count as 1. An empty `values` slice gives -∞.
/// The sign of the sum is discarded.
pub fn log_sum_exp(values: &[f64], weights: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }

    let sum: f64 = values
        .iter()
        .enumerate()
        .map(|(i, &v)| weights.get(i).copied().unwrap_or(1.0) * (v - max).exp())
        .sum();

    sum.abs().ln() + max
}

// ==================== Unit Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    // ==================== log_gamma ====================

    #[test]
    fn test_log_gamma_integers() {
        assert_close(log_gamma(1.0), 0.0, EPSILON);
        assert_close(log_gamma(2.0), 0.0, EPSILON);
        assert_close(log_gamma(5.0), 24.0_f64.ln(), EPSILON);
        assert_close(log_gamma(11.0), 3_628_800.0_f64.ln(), EPSILON);
    }

    #[test]
    fn test_log_gamma_half() {
        assert_close(log_gamma(0.5), PI.sqrt().ln(), EPSILON);
        assert_close(log_gamma(1.5), (PI.sqrt() / 2.0).ln(), EPSILON);
    }

    #[test]
    fn test_log_gamma_large_argument() {
        assert_close(log_gamma(100.0), 359.134_205_369_575_4, EPSILON);
        assert!(log_gamma(1e300).is_finite());
    }

    #[test]
    fn test_log_gamma_negative_is_nan() {
        assert!(log_gamma(-1.0).is_nan());
        assert!(log_gamma(-0.5).is_nan());
    }

    // ==================== Beta / binomial ====================

    #[test]
    fn test_log_beta_symmetric_and_exact() {
        assert_close(log_beta(2.0, 3.0), (1.0_f64 / 12.0).ln(), EPSILON);
        assert_close(log_beta(3.0, 2.0), log_beta(2.0, 3.0), EPSILON);
        assert_close(log_beta(1.0, 1.0), 0.0, EPSILON);
    }

    #[test]
    fn test_log_beta_ratio_matches_difference() {
        let (a1, a, b) = (3.5, 2.25, 7.0);
        assert_close(log_beta_ratio(a1, a, b), log_beta(a1, b) - log_beta(a, b), 1e-10);
        assert_close(log_beta_ratio(3.0, 2.0, 2.0), 0.5_f64.ln(), EPSILON);
    }

    #[test]
    fn test_log_beta_ratio_huge_parameters() {
        // B(1e6, 1e6) underflows, the ratio does not.
        let r = log_beta_ratio(1e6 + 1.0, 1e6, 1e6);
        assert_close(r, 0.5_f64.ln(), 1e-6);
    }

    #[test]
    fn test_log_binom() {
        assert_close(log_binom(5, 2), 10.0_f64.ln(), 1e-10);
        assert_close(log_binom(10, 0), 0.0, 1e-10);
        assert_close(log_binom(10, 10), 0.0, 1e-10);
        assert_close(log_binom(0, 0), 0.0, 1e-10);
        assert_close(log_binom(20, 7), 77_520.0_f64.ln(), 1e-10);
    }

    // ==================== log_sum_exp ====================

    #[test]
    fn test_log_sum_exp_unweighted() {
        let expected = (1.0_f64.exp() + 2.0_f64.exp()).ln();
        assert_close(log_sum_exp(&[1.0, 2.0], &[]), expected, EPSILON);
    }

    #[test]
    fn test_log_sum_exp_short_weights_default_to_one() {
        let expected = (2.0 * 1.0_f64.exp() + 2.0_f64.exp() + 3.0_f64.exp()).ln();
        assert_close(log_sum_exp(&[1.0, 2.0, 3.0], &[2.0]), expected, EPSILON);
    }

    #[test]
    fn test_log_sum_exp_empty() {
        assert_eq!(log_sum_exp(&[], &[]), f64::NEG_INFINITY);
        assert_eq!(log_sum_exp(&[f64::NEG_INFINITY], &[1.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_log_sum_exp_large_values_do_not_overflow() {
        let r = log_sum_exp(&[1000.0, 1000.0], &[1.0, 1.0]);
        assert_close(r, 1000.0 + 2.0_f64.ln(), EPSILON);
    }
}
