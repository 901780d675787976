use num::complex::Complex64;

use crate::Poly;

/// Polish each root independently with a few Newton-Raphson steps.
///
/// Steps that would produce a non-finite value, or that do not reduce the
/// residual, are discarded, so polishing never makes a root worse.
#[must_use]
pub fn newton_polish(poly: &Poly, roots: &[Complex64], max_iter: usize) -> Vec<Complex64> {
    let p_diff = poly.diff();
    roots
        .iter()
        .map(|&z0| {
            let mut z = z0;
            let mut residual = poly.eval(z).norm();
            for _ in 0..max_iter {
                let step = poly.eval(z) / p_diff.eval(z);
                if !step.is_finite() {
                    break;
                }
                let candidate = z - step;
                let candidate_residual = poly.eval(candidate).norm();
                if candidate_residual >= residual {
                    break;
                }
                z = candidate;
                residual = candidate_residual;
            }
            log::trace!("polished {z0} -> {z}");
            z
        })
        .collect()
}
