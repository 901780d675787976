use anyhow::anyhow;
use itertools::Itertools;
use num::{complex::Complex64, One, Zero};

use crate::{
    roots,
    util::doc_macros::errors_no_converge,
    Poly,
};

/// Residuals within this many rounding errors of zero can't be improved on.
const ROUNDING_SLACK: f64 = 4.0;

/// Find all roots using Aberth Ehrlich method.
///
/// A point has converged when its last step was within `epsilon`, or when the
/// polynomial evaluated there is indistinguishable from zero in floating
/// point. The latter is what stops iteration on clusters of multiple roots.
///
/// # Caveats
/// This method performs poorly around zero roots, so you should remove them
/// first (zero roots are trivial to factor out).
///
/// # Errors
#[doc = errors_no_converge!()]
/// - `Other`: the guesses are not distinct, or their number does not match
///   the degree of the polynomial.
pub fn aberth_ehrlich(
    poly: &Poly,
    epsilon: Option<f64>,
    max_iter: Option<usize>,
    initial_guesses: &[Complex64],
) -> roots::Result {
    debug_assert!(poly.is_normalized());

    let n = poly.degree_raw();
    if n == 0 {
        return Ok(vec![]);
    }
    if initial_guesses.len() != n {
        return Err(anyhow!(
            "expected {n} initial guesses, got {}",
            initial_guesses.len()
        )
        .into());
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if (initial_guesses[i] - initial_guesses[j]).norm_sqr() == 0.0 {
                return Err(anyhow!("initial guesses must be distinct").into());
            }
        }
    }

    let epsilon = epsilon.unwrap_or(f64::EPSILON);

    let mut poly = poly.clone();
    poly.make_monic();
    let p_diff = poly.diff();
    let p_abs = Poly::new(
        &poly
            .iter()
            .map(|c| Complex64::new(c.norm(), 0.0))
            .collect_vec(),
    );

    let mut points = initial_guesses.to_vec();
    let mut alphas_buff = vec![Complex64::zero(); n];
    let mut betas_buff = vec![Complex64::zero(); n];

    for i in 0_usize.. {
        if max_iter.is_some_and(|max| i > max) {
            return Err(roots::Error::NoConverge(points));
        }

        alphas(&poly, &p_diff, &points, &mut alphas_buff);
        betas(&points, &mut betas_buff);

        // alphas become deltas in-place
        for (a, b) in alphas_buff.iter_mut().zip(betas_buff.iter()) {
            *a /= Complex64::one() - *a * b;
        }
        let deltas_buff = &alphas_buff;

        if deltas_buff.iter().any(|d| !d.is_finite()) {
            log::debug!("Aberth-Ehrlich step diverged at iteration {i}");
            return Err(roots::Error::NoConverge(points));
        }

        for (y, d) in points.iter_mut().zip(deltas_buff.iter()) {
            *y -= d;
        }

        log::trace!("{points:?}");

        // stopping criteria
        if deltas_buff
            .iter()
            .zip(&points)
            .all(|(d, &z)| d.norm_sqr() <= epsilon || at_rounding_level(&poly, &p_abs, z))
        {
            log::debug!("Aberth-Ehrlich converged after {i} iterations");
            return Ok(points);
        }
    }
    unreachable!();
}

/// `|p(z)|` is below the rounding error bound of Horner's scheme, computed
/// from the absolute values of the coefficients.
fn at_rounding_level(poly: &Poly, p_abs: &Poly, z: Complex64) -> bool {
    let bound = ROUNDING_SLACK * f64::EPSILON * p_abs.eval(Complex64::new(z.norm(), 0.0)).re;
    poly.eval(z).norm() <= bound
}

/// Alpha coefficients of the Aberth-Ehrlich method (Newton corrections)
///
/// Needs `points.len() == out.len()`.
fn alphas(poly: &Poly, p_diff: &Poly, points: &[Complex64], out: &mut [Complex64]) {
    debug_assert_eq!(points.len(), out.len());

    poly.eval_multiple(points, out);
    for (y, &x) in out.iter_mut().zip(points) {
        *y /= p_diff.eval(x);
    }
}

/// Beta coefficients of the Aberth-Ehrlich method
///
/// Needs `points.len() == out.len()`.
fn betas(points: &[Complex64], out: &mut [Complex64]) {
    debug_assert_eq!(points.len(), out.len());

    let n = points.len();
    out.fill(Complex64::zero());
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            out[i] += Complex64::one() / (points[i] - points[j]);
        }
    }
}
