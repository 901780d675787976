use std::fmt::Display;

use itertools::Itertools;
use num::{complex::Complex64, One, Zero};

use crate::util::complex::{complex_fmt, complex_sort_mut};

pub mod roots;
mod special_funcs;

/// Polynomial with complex coefficients, stored from the least significant
/// term upwards.
///
/// Filter coefficients are written in powers of `z^-1`, so a transfer
/// function's numerator `b` maps to `Poly::from_real_slice(b)` when evaluated
/// at `z^-1`, and to the reversed slice when its roots in `z` are wanted.
#[derive(Clone, Debug, PartialEq)]
pub struct Poly(pub(crate) Vec<Complex64>);

impl Poly {
    #[must_use]
    pub fn new(coeffs: &[Complex64]) -> Self {
        Self(coeffs.to_owned()).normalize()
    }

    #[must_use]
    pub fn from_real_slice(coeffs: &[f64]) -> Self {
        Self::new(&coeffs.iter().map(|&c| Complex64::new(c, 0.0)).collect_vec())
    }

    #[must_use]
    pub fn zero() -> Self {
        Self(vec![Complex64::zero()])
    }

    #[must_use]
    pub fn one() -> Self {
        Self(vec![Complex64::one()])
    }

    /// Monic polynomial from its complex roots.
    ///
    /// # Examples
    /// ```
    /// use iir_infer::Poly;
    /// use num::complex::Complex64;
    ///
    /// let p = Poly::from_roots(&[Complex64::new(-1.0, 0.0), Complex64::new(1.0, 0.0)]);
    /// assert_eq!(p, Poly::from_real_slice(&[-1.0, 0.0, 1.0]));
    /// ```
    #[must_use]
    pub fn from_roots(roots: &[Complex64]) -> Self {
        if roots.is_empty() {
            return Self::one();
        }

        let mut roots = roots.to_owned();
        complex_sort_mut(roots.as_mut_slice());

        roots
            .into_iter()
            .map(|r| Self::new(&[-r, Complex64::one()]))
            .fold(Self::one(), |acc, x| acc.product(&x))
            .normalize()
    }

    /// Evaluate the polynomial at a single value of `x`.
    ///
    /// ```
    /// use iir_infer::Poly;
    /// use num::complex::Complex64;
    ///
    /// let p = Poly::from_real_slice(&[1.0, 2.0, 3.0]);
    /// assert_eq!(p.eval(Complex64::new(1.0, 0.0)), Complex64::new(6.0, 0.0));
    /// ```
    #[must_use]
    pub fn eval(&self, x: Complex64) -> Complex64 {
        // Horner's method
        debug_assert!(self.is_normalized());
        self.0
            .iter()
            .rev()
            .fold(Complex64::zero(), |acc, &c| acc * x + c)
    }

    /// Evaluate at many points, writing into `out`.
    ///
    /// Needs `points.len() == out.len()`.
    pub fn eval_multiple(&self, points: &[Complex64], out: &mut [Complex64]) {
        debug_assert_eq!(points.len(), out.len());
        for (y, &x) in out.iter_mut().zip(points) {
            *y = self.eval(x);
        }
    }

    /// Derivative
    #[must_use]
    pub fn diff(&self) -> Self {
        debug_assert!(self.is_normalized());

        // derivative of constant is zero
        if self.degree_raw() == 0 {
            return Self::zero();
        }

        #[allow(clippy::cast_precision_loss)]
        let coeffs = self
            .0
            .iter()
            .enumerate()
            .skip(1)
            .map(|(n, &c)| c.scale(n as f64))
            .collect_vec();
        Self::new(&coeffs)
    }

    /// Product of two polynomials.
    #[must_use]
    pub fn product(&self, rhs: &Self) -> Self {
        let mut out = vec![Complex64::zero(); self.len_raw() + rhs.len_raw() - 1];
        for (i, &a) in self.0.iter().enumerate() {
            for (j, &b) in rhs.0.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Self(out).normalize()
    }

    /// The degree of the polynomial. Constants (including zero) have degree 0.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree_raw()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        debug_assert!(self.is_normalized());
        self.len_raw() == 1 && self.0[0].is_zero()
    }

    /// Coefficients, from the least significant
    #[must_use]
    pub fn as_slice(&self) -> &[Complex64] {
        self.0.as_slice()
    }

    /// Iterate over coefficients, from the least significant
    pub fn iter(&self) -> std::slice::Iter<'_, Complex64> {
        self.0.iter()
    }

    /// Real parts of the coefficients, from the least significant.
    #[must_use]
    pub fn to_real_vec(&self) -> Vec<f64> {
        self.0.iter().map(|c| c.re).collect()
    }
}

// internals
impl Poly {
    /// The length of the polynomial without checking pre-conditions
    pub(crate) fn len_raw(&self) -> usize {
        self.0.len()
    }

    /// The degree of the polynomial without checking pre-conditions
    #[inline]
    pub(crate) fn degree_raw(&self) -> usize {
        self.len_raw() - 1
    }

    pub(crate) fn is_normalized(&self) -> bool {
        let n = self.len_raw();
        if n == 0 {
            return false;
        }
        // a constant is always normalized, as it may be just a constant zero
        if n == 1 {
            return true;
        }
        !self.0[n - 1].is_zero()
    }

    /// Drop trailing zero coefficients (zero leading terms).
    pub(crate) fn normalize(mut self) -> Self {
        while self.0.len() > 1 && self.0.last().is_some_and(Zero::is_zero) {
            self.0.pop();
        }
        if self.0.is_empty() {
            return Self::zero();
        }
        debug_assert!(self.is_normalized());
        self
    }

    /// The last coefficient
    pub(crate) fn last(&self) -> Complex64 {
        self.0[self.len_raw() - 1]
    }

    pub(crate) fn is_monic(&self) -> bool {
        self.last().is_one()
    }

    /// Make the polynomial monic in-place, the roots are preserved.
    pub(crate) fn make_monic(&mut self) {
        debug_assert!(self.is_normalized());
        let last_coeff = self.last();
        if last_coeff.is_one() {
            return;
        }
        for c in &mut self.0 {
            *c /= last_coeff;
        }
    }

    /// Divide by `x^n`, discarding the `n` lowest coefficients.
    pub(crate) fn shift_down(&self, n: usize) -> Self {
        if n >= self.len_raw() {
            return Self::zero();
        }
        Self::new(&self.0[n..])
    }
}

impl Display for Poly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut iter = self.iter().enumerate();
        if let Some((_, c)) = iter.next() {
            write!(f, "{}", complex_fmt(c))?;
        } else {
            return Ok(());
        }
        for (i, c) in iter {
            write!(f, " + {}*x^{}", complex_fmt(c), i)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use num::complex::Complex64;

    use super::Poly;

    #[test]
    fn normalize_trailing_zeros() {
        let p = Poly::from_real_slice(&[1.0, 2.0, 0.0, 0.0]);
        assert_eq!(p.degree(), 1);
    }

    /// A zero polynomial still has one coefficient
    #[test]
    fn normalize_zero() {
        let p = Poly::from_real_slice(&[0.0, 0.0]);
        assert!(p.is_zero());
        assert_eq!(p.degree(), 0);
    }

    #[test]
    fn diff() {
        let p = Poly::from_real_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(p.diff(), Poly::from_real_slice(&[2.0, 6.0]));
    }

    #[test]
    fn diff_constant() {
        assert!(Poly::from_real_slice(&[4.0]).diff().is_zero());
    }

    #[test]
    fn product() {
        let p = Poly::from_real_slice(&[1.0, 1.0]);
        assert_eq!(p.product(&p), Poly::from_real_slice(&[1.0, 2.0, 1.0]));
    }

    #[test]
    fn monic() {
        let mut p = Poly::from_real_slice(&[1.0, 3.0, 2.0]);
        p.make_monic();
        assert_eq!(p, Poly::from_real_slice(&[0.5, 1.5, 1.0]));
        assert!(p.is_monic());
    }

    #[test]
    fn shift_down() {
        let p = Poly::from_real_slice(&[0.0, 0.0, 1.0, 2.0]);
        assert_eq!(p.shift_down(2), Poly::from_real_slice(&[1.0, 2.0]));
    }

    #[test]
    fn display() {
        let p = Poly::new(&[
            Complex64::new(2.0, 0.0),
            Complex64::new(4.5, 0.0),
            Complex64::new(5.0, 1.0),
        ]);
        assert_eq!(p.to_string(), "2 + 4.5*x^1 + (5+i)*x^2");
    }
}
