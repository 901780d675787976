use num::{complex::Complex64, BigUint, ToPrimitive};

use crate::Poly;

impl Poly {
    /// Bessel polynomial `y_n`, in ascending powers.
    ///
    /// Returns `None` if a coefficient overflows `f64` (`n` in the hundreds).
    #[must_use]
    pub fn bessel(n: usize) -> Option<Self> {
        let coeffs = (0..=n)
            .map(|k| coeff(n, k).map(|c| Complex64::new(c, 0.0)))
            .collect::<Option<Vec<_>>>()?;
        Some(Self::new(&coeffs))
    }

    /// Reverse Bessel polynomial `theta_n(s) = s^n y_n(1/s)`. Its roots are
    /// the poles of a Bessel-Thomson filter with unit group delay.
    ///
    /// ```
    /// use iir_infer::Poly;
    ///
    /// // s^2 + 3s + 3
    /// assert_eq!(
    ///     Poly::reverse_bessel(2).unwrap(),
    ///     Poly::from_real_slice(&[3.0, 3.0, 1.0])
    /// );
    /// ```
    #[must_use]
    pub fn reverse_bessel(n: usize) -> Option<Self> {
        let p = Self::bessel(n)?;
        let v: Vec<_> = p.iter().copied().rev().collect();
        Some(Self::new(&v))
    }
}

fn factorial(n: usize) -> BigUint {
    (1..=n).map(BigUint::from).product()
}

/// The coefficient for the k-th term of the n-th bessel polynomial,
/// `(n + k)! / ((n - k)! k! 2^k)`.
fn coeff(n: usize, k: usize) -> Option<f64> {
    // dividing in BigUint first keeps the numerator from overflowing long
    // before the result does
    let aux_a = factorial(n + k) / factorial(n - k) / factorial(k);
    let aux_b = 0.5f64.powi(i32::try_from(k).ok()?);
    let c = aux_a.to_f64()? * aux_b;
    c.is_finite().then_some(c)
}
