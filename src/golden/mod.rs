//! Golden Section Search
//!
//! Derivative-free minimization of a unimodal scalar function on a bounded
//! interval. Two interior probes are kept at the golden ratio; each iteration
//! discards the sub-interval beyond the worse probe and evaluates one new one.
//!
//! The function is also evaluated at the original bounds, and the result is
//! the best of those and the midpoint of the final bracket. Plain narrowing
//! can step past a minimum that sits on the boundary.

/// 1/φ = 2 / (1 + √5)
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Outcome of a golden-section search
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimizeResult {
    /// Number of narrowing steps performed
    pub iterations: usize,
    /// Location of the best point found
    pub argmin: f64,
    /// Function value at `argmin`
    pub minimum: f64,
    /// False when a probe was NaN or the bracket never shrank below tolerance
    pub converged: bool,
}

/// Golden-section minimizer with a fixed tolerance and iteration cap
#[derive(Clone, Copy, Debug)]
pub struct GoldenSectionMinimizer {
    tolerance: f64,
    max_iterations: usize,
}

impl GoldenSectionMinimizer {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Minimize `f` over `[lower, upper]`
    pub fn minimize<F>(&self, f: F, lower: f64, upper: f64) -> MinimizeResult
    where
        F: Fn(f64) -> f64,
    {
        let (lower0, upper0) = (lower, upper);
        let f_lower0 = f(lower0);
        let f_upper0 = f(upper0);

        let mut xl = lower;
        let mut xu = upper;
        let mut x1 = xu - INV_PHI * (xu - xl);
        let mut x2 = xl + INV_PHI * (xu - xl);
        let mut f1 = f(x1);
        let mut f2 = f(x2);

        let mut iterations = 0;
        while iterations < self.max_iterations && (xu - xl).abs() > self.tolerance {
            iterations += 1;
            if f2 > f1 {
                xu = x2;
                x2 = x1;
                f2 = f1;
                x1 = xu - INV_PHI * (xu - xl);
                f1 = f(x1);
            } else {
                xl = x1;
                x1 = x2;
                f1 = f2;
                x2 = xl + INV_PHI * (xu - xl);
                f2 = f(x2);
            }
        }

        let mut argmin = 0.5 * (xl + xu);
        let mut minimum = f(argmin);
        if f_lower0 < minimum {
            argmin = lower0;
            minimum = f_lower0;
        }
        if f_upper0 < minimum {
            argmin = upper0;
            minimum = f_upper0;
        }

        let converged = !f1.is_nan() && !f2.is_nan() && (xu - xl).abs() <= self.tolerance;

        MinimizeResult {
            iterations,
            argmin,
            minimum,
            converged,
        }
    }
}

/// Free-function form of [`GoldenSectionMinimizer::minimize`]
pub fn minimize<F>(
    f: F,
    lower: f64,
    upper: f64,
    tolerance: f64,
    max_iterations: usize,
) -> MinimizeResult
where
    F: Fn(f64) -> f64,
{
    GoldenSectionMinimizer::new(tolerance, max_iterations).minimize(f, lower, upper)
}
