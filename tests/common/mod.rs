//! Shared helpers for integration tests.

#![allow(dead_code)]

use danci_recall::Model;

/// Distance from `x` to the next representable f64 away from zero
pub fn ulp(x: f64) -> f64 {
    let a = x.abs();
    if !a.is_finite() {
        return f64::NAN;
    }
    f64::from_bits(a.to_bits() + 1) - a
}

/// `actual` within `n` ulps of `expected`
pub fn within_ulps(actual: f64, expected: f64, n: u32) -> bool {
    (actual - expected).abs() <= f64::from(n) * ulp(expected)
}

pub fn relative_error(actual: f64, expected: f64) -> f64 {
    ((actual - expected) / expected).abs()
}

pub fn model(time: f64, alpha: f64, beta: f64) -> Model {
    Model::new(time, alpha, beta).expect("valid test model")
}
