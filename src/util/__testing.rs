//! Testing utilities, do not depend on any of these in production!

use fastrand::Rng;
use itertools::Itertools;
use num::complex::Complex64;

use crate::{Poly, TransferFunction};

/// Endless stream of complex numbers with random radius and angle.
///
/// Angles are given as fractions of a full turn, in `[0, 1]`.
pub struct RandStreamC64Polar {
    rng: Rng,
    min_radius: f64,
    max_radius: f64,
    min_angle: f64,
    max_angle: f64,
}

impl RandStreamC64Polar {
    #[must_use]
    pub fn new(
        seed: u64,
        min_radius: f64,
        max_radius: f64,
        min_angle: f64,
        max_angle: f64,
    ) -> Self {
        assert!(
            0.0 <= min_angle && max_angle <= 1.0,
            "angles should be specified in the range [0,1]"
        );
        assert!(
            min_angle <= max_angle,
            "min_angle should be smaller or equal to max_angle"
        );
        assert!(0.0 <= min_radius, "radius should be non-negative");
        assert!(
            min_radius <= max_radius,
            "min_radius should be smaller or equal to max_radius"
        );
        Self {
            rng: Rng::with_seed(seed),
            min_radius,
            max_radius,
            min_angle,
            max_angle,
        }
    }
}

impl Iterator for RandStreamC64Polar {
    type Item = Complex64;

    fn next(&mut self) -> Option<Self::Item> {
        let r = self
            .rng
            .f64()
            .mul_add(self.max_radius - self.min_radius, self.min_radius);
        let a = self
            .rng
            .f64()
            .mul_add(self.max_angle - self.min_angle, self.min_angle);
        Some(Complex64::from_polar(r, a * std::f64::consts::TAU))
    }
}

/// Roots of a real polynomial: `degree / 2` conjugate pairs drawn from the
/// stream, plus one real root when the degree is odd.
pub fn conjugate_roots(
    mut stream: impl Iterator<Item = Complex64>,
    degree: usize,
) -> Vec<Complex64> {
    let mut roots = stream
        .by_ref()
        .take(degree / 2)
        .flat_map(|z| [z, z.conj()])
        .collect_vec();
    if degree % 2 == 1 {
        let z = stream.next().expect("rng stream should be infinite");
        roots.push(Complex64::new(z.norm().copysign(z.re), 0.0));
    }
    roots
}

/// A real, stable transfer function with the given poles and zeros and unit
/// gain, coefficients in powers of `z^-1`.
#[must_use]
pub fn test_case_filter(zeros: &[Complex64], poles: &[Complex64]) -> TransferFunction {
    let descending = |roots: &[Complex64]| {
        Poly::from_roots(roots)
            .to_real_vec()
            .into_iter()
            .rev()
            .collect_vec()
    };
    TransferFunction::new(descending(zeros), descending(poles))
        .expect("monic denominators are always valid")
}

/// Check that all roots have been found
#[must_use]
pub fn check_roots(roots1: Vec<Complex64>, mut roots2: Vec<Complex64>, tol: f64) -> bool {
    if roots1.len() != roots2.len() {
        return false;
    }

    for r1 in roots1 {
        let mut best_idx = 0;
        let mut best_d = f64::MAX;
        for (i, r2) in roots2.iter().enumerate() {
            let d = (r1 - r2).norm();
            if d < best_d {
                best_idx = i;
                best_d = d;
            }
        }
        if best_d > tol {
            return false;
        }
        roots2.remove(best_idx);
    }
    true
}

/// Relative closeness of two floats, with an absolute floor for values near
/// zero.
#[must_use]
pub fn almost_equal(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
}
