use std::f64::consts::TAU;

use fastrand::Rng;
use itertools::Itertools;
use num::complex::Complex64;

use crate::Poly;

/// Guesses spread around an annulus between the lower and upper root bounds.
///
/// `bias` moves the annulus between the lower bound (0) and the upper bound
/// (1), `perturbation` randomly jitters radius and angle of each guess.
/// The guesses always leave a "gap" so they are radially asymmetric, some
/// methods get stuck on symmetric guesses.
///
/// Needs `poly.degree() >= 1`, a monic polynomial and no zero roots.
#[allow(clippy::cast_precision_loss)]
pub fn initial_guesses_annulus(
    poly: &Poly,
    seed: u64,
    bias: f64,
    perturbation: f64,
    out: &mut [Complex64],
) {
    let num = out.len();
    let n_asym = if num % 2 == 0 { num + 1 } else { num + 2 };
    let mut rng = Rng::with_seed(seed);
    let angle_increment = TAU / n_asym as f64;
    let low = lower_bound(poly);
    let high = upper_bound(poly);
    let span = high - low;
    let radius = high.mul_add(bias, low * (1.0 - bias));
    let mut angle_accumulator = 0.0;
    for y in out {
        let angle = rng
            .f64()
            .mul_add(angle_increment, -(angle_increment / 2.0))
            .mul_add(perturbation, angle_accumulator);
        let radius = radius.mul_add(
            1.0 - perturbation,
            rng.f64().mul_add(span, low) * perturbation,
        );
        *y = Complex64::from_polar(radius, angle);
        angle_accumulator += angle_increment;
    }
}

/// Guesses with random radius between the root bounds and random angle.
///
/// Same pre-conditions as [`initial_guesses_annulus`].
pub fn initial_guesses_random(poly: &Poly, seed: u64, out: &mut [Complex64]) {
    let mut rng = Rng::with_seed(seed);
    let low = lower_bound(poly);
    let high = upper_bound(poly);
    let span = high - low;
    for y in out {
        let radius = rng.f64().mul_add(span, low);
        let angle = rng.f64() * TAU;
        *y = Complex64::from_polar(radius, angle);
    }
}

/// The radius of a disk containing all the roots
///
/// Uses Deutsch's simple formula \[[McNamee 2005](https://www.researchgate.net/publication/228745231_A_comparison_of_a_priori_bounds_on_real_or_complex_roots_of_polynomials)\],
/// falling back to Cauchy's bound when a coefficient vanishes.
fn upper_bound(poly: &Poly) -> f64 {
    debug_assert!(
        poly.degree_raw() >= 1,
        "there are no bounds for a polynomial with no roots"
    );
    debug_assert!(
        poly.is_monic(),
        "Deutsch's formula requires the polynomial to be monic"
    );

    let n = poly.len_raw();
    let coeffs = poly.as_slice();
    let next_last = coeffs[n - 2];
    let ratios = coeffs[..n - 1]
        .iter()
        .tuple_windows()
        .map(|(num, denom)| (num / denom).norm())
        .collect_vec();

    if ratios.iter().all(|r| r.is_finite()) {
        next_last.norm() + ratios.into_iter().fold(0.0, f64::max)
    } else {
        1.0 + coeffs[..n - 1].iter().map(|c| c.norm()).fold(0.0, f64::max)
    }
}

/// The radius of a disk containing none of the roots
fn lower_bound(poly: &Poly) -> f64 {
    let mut this = Poly::new(&poly.as_slice().iter().copied().rev().collect_vec());
    this.make_monic();
    upper_bound(&this).recip()
}
