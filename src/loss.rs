//! Error measures.
//!
//! The network tracks convergence with the mean squared error of the output
//! layer's error vector (`target - output`).

/// Mean squared error of an error vector: `(1/n) * Σ e_i^2`.
///
/// Returns 0 for an empty slice.
pub fn mse(errors: &[f64]) -> f64 {
    if errors.is_empty() {
        return 0.0;
    }

    let mut sum_sq = 0.0_f64;
    for &e in errors {
        sum_sq += e * e;
    }
    sum_sq / errors.len() as f64
}

/// Mean squared error between `output` and `target`.
///
/// Shape contract: `output.len() == target.len()`.
pub fn mse_between(output: &[f64], target: &[f64]) -> f64 {
    assert_eq!(
        output.len(),
        target.len(),
        "output len {} does not match target len {}",
        output.len(),
        target.len()
    );

    if output.is_empty() {
        return 0.0;
    }

    let mut sum_sq = 0.0_f64;
    for (&y, &t) in output.iter().zip(target) {
        let e = t - y;
        sum_sq += e * e;
    }
    sum_sq / output.len() as f64
}
