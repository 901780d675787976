use std::fmt::Display;

use itertools::Itertools;
use num::complex::Complex64;

use crate::{
    util::complex::{complex_fmt, snap_real},
    Error, Poly, Result,
};

/// Imaginary parts smaller than this (relative) are rounding noise on roots
/// of real polynomials.
const REAL_ROOT_TOLERANCE: f64 = 1E-12;

/// Rational transfer function `H(z) = B(z^-1) / A(z^-1)` with real
/// coefficients in ascending powers of `z^-1`.
///
/// The denominator is always normalized so that `a[0] == 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferFunction {
    b: Vec<f64>,
    a: Vec<f64>,
}

/// Zeros, poles and gain of a transfer function.
///
/// `H(z) = k * prod(z - zeros) / prod(z - poles)` up to a power of `z` that
/// equalizes the degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct ZeroPoleGain {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl TransferFunction {
    /// Build a transfer function, normalizing the denominator.
    ///
    /// # Errors
    /// - [`Error::InvalidFilter`] if either coefficient list is empty, if
    ///   `a[0]` is zero, or if any coefficient is not finite.
    ///
    /// # Examples
    /// ```
    /// use iir_infer::TransferFunction;
    ///
    /// let tf = TransferFunction::new(vec![2.0, 2.0], vec![2.0, -1.0]).unwrap();
    /// assert_eq!(tf.b(), &[1.0, 1.0]);
    /// assert_eq!(tf.a(), &[1.0, -0.5]);
    /// ```
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        if a.is_empty() {
            return Err(Error::invalid("denominator has no coefficients"));
        }
        if b.is_empty() {
            return Err(Error::invalid("numerator has no coefficients"));
        }
        if b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
            return Err(Error::invalid("coefficients must be finite"));
        }
        let a0 = a[0];
        if a0 == 0.0 {
            return Err(Error::invalid("leading denominator coefficient is zero"));
        }
        Ok(Self {
            b: b.into_iter().map(|c| c / a0).collect(),
            a: a.into_iter().map(|c| c / a0).collect(),
        })
    }

    /// Build from zeros, poles and gain.
    ///
    /// Complex roots must come in conjugate pairs for the coefficients to be
    /// real, the imaginary residue is discarded. When there are fewer zeros
    /// than poles the numerator is delayed so both polynomials have the same
    /// length.
    ///
    /// # Errors
    /// - [`Error::InvalidFilter`] if the resulting coefficients are not finite.
    pub fn from_zpk(zpk: &ZeroPoleGain) -> Result<Self> {
        let descending =
            |roots: &[Complex64]| Poly::from_roots(roots).to_real_vec().into_iter().rev();

        let mut b = descending(&zpk.zeros).map(|c| c * zpk.gain).collect_vec();
        let a = descending(&zpk.poles).collect_vec();
        if b.len() < a.len() {
            let delay = a.len() - b.len();
            b.splice(0..0, std::iter::repeat(0.0).take(delay));
        }
        Self::new(b, a)
    }

    /// Numerator coefficients
    #[must_use]
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Denominator coefficients, `a[0] == 1`
    #[must_use]
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Filter order, the degree of the denominator.
    #[must_use]
    pub fn order(&self) -> usize {
        self.a.len() - 1
    }

    /// Gain at DC, `sum(b) / sum(a)`.
    #[must_use]
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }

    /// Numerator as a polynomial in `z^-1`.
    #[must_use]
    pub fn numerator(&self) -> Poly {
        Poly::from_real_slice(&self.b)
    }

    /// Denominator as a polynomial in `z^-1`.
    #[must_use]
    pub fn denominator(&self) -> Poly {
        Poly::from_real_slice(&self.a)
    }

    /// Factor numerator and denominator into zeros, poles and gain.
    ///
    /// Leading zeros of the numerator are stripped first, so the number of
    /// zeros is `len(b) - 1` minus the number of leading zeros.
    ///
    /// # Errors
    /// - [`Error::RootsNoConverge`] if the root finder gets stuck.
    pub fn zpk(&self, epsilon: f64, max_iter: usize) -> Result<ZeroPoleGain> {
        let leading = self.b.iter().position(|&c| c != 0.0);
        let (zeros, gain) = match leading {
            Some(i) => {
                let b = &self.b[i..];
                let zeros = Poly::from_real_slice(&b.iter().rev().copied().collect_vec())
                    .roots(epsilon, max_iter)?;
                (zeros, b[0])
            }
            None => (vec![], 0.0),
        };
        let poles = Poly::from_real_slice(&self.a.iter().rev().copied().collect_vec())
            .roots(epsilon, max_iter)?;

        let snap = |roots: Vec<Complex64>| {
            roots
                .into_iter()
                .map(|z| snap_real(z, REAL_ROOT_TOLERANCE))
                .collect_vec()
        };
        log::debug!(
            "factored {} zeros and {} poles, gain {gain}",
            zeros.len(),
            poles.len()
        );
        Ok(ZeroPoleGain {
            zeros: snap(zeros),
            poles: snap(poles),
            gain,
        })
    }
}

impl Display for TransferFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "b: {:?}", self.b)?;
        write!(f, "a: {:?}", self.a)
    }
}

impl Display for ZeroPoleGain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let list = |roots: &[Complex64]| roots.iter().map(complex_fmt).join(", ");
        writeln!(f, "zeros: [{}]", list(&self.zeros))?;
        writeln!(f, "poles: [{}]", list(&self.poles))?;
        write!(f, "gain: {}", self.gain)
    }
}

#[cfg(test)]
mod test {
    use num::complex::Complex64;

    use super::{TransferFunction, ZeroPoleGain};
    use crate::{util::__testing::check_roots, Error};

    #[test]
    fn normalizes_denominator() {
        let tf = TransferFunction::new(vec![1.0, 2.0, 1.0], vec![4.0, 2.0, 1.0]).unwrap();
        assert_eq!(tf.a(), &[1.0, 0.5, 0.25]);
        assert_eq!(tf.b(), &[0.25, 0.5, 0.25]);
        assert_eq!(tf.order(), 2);
    }

    #[test]
    fn rejects_degenerate() {
        assert!(matches!(
            TransferFunction::new(vec![1.0], vec![]),
            Err(Error::InvalidFilter(_))
        ));
        assert!(matches!(
            TransferFunction::new(vec![1.0], vec![0.0, 1.0]),
            Err(Error::InvalidFilter(_))
        ));
        assert!(matches!(
            TransferFunction::new(vec![f64::NAN], vec![1.0]),
            Err(Error::InvalidFilter(_))
        ));
    }

    #[test]
    fn dc_gain() {
        let tf = TransferFunction::new(vec![1.0, 1.0], vec![1.0, -0.5]).unwrap();
        assert!((tf.dc_gain() - 4.0).abs() < 1E-15);
    }

    #[test]
    fn zpk_of_second_order() {
        // zeros at -1 (double), poles at 0.5 +- 0.5i
        let tf = TransferFunction::new(vec![0.5, 1.0, 0.5], vec![1.0, -1.0, 0.5]).unwrap();
        let zpk = tf.zpk(1E-14, 100).unwrap();
        assert!(check_roots(
            zpk.zeros,
            vec![Complex64::new(-1.0, 0.0), Complex64::new(-1.0, 0.0)],
            1E-6
        ));
        assert!(check_roots(
            zpk.poles,
            vec![Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5)],
            1E-12
        ));
        assert!((zpk.gain - 0.5).abs() < 1E-15);
    }

    #[test]
    fn zpk_strips_leading_numerator_zeros() {
        let tf = TransferFunction::new(vec![0.0, 1.0], vec![1.0, -0.5]).unwrap();
        let zpk = tf.zpk(1E-14, 100).unwrap();
        assert!(zpk.zeros.is_empty());
        assert_eq!(zpk.poles.len(), 1);
        assert!((zpk.gain - 1.0).abs() < 1E-15);
    }

    #[test]
    fn from_zpk_pads_numerator() {
        let zpk = ZeroPoleGain {
            zeros: vec![],
            poles: vec![Complex64::new(0.5, 0.0)],
            gain: 2.0,
        };
        let tf = TransferFunction::from_zpk(&zpk).unwrap();
        assert_eq!(tf.b(), &[0.0, 2.0]);
        assert_eq!(tf.a(), &[1.0, -0.5]);
    }

    #[test]
    fn zpk_round_trip() {
        let tf = TransferFunction::new(vec![0.2, 0.1, 0.3], vec![1.0, -0.4, 0.2]).unwrap();
        let back = TransferFunction::from_zpk(&tf.zpk(1E-14, 100).unwrap()).unwrap();
        for (x, y) in tf.b().iter().zip(back.b()) {
            assert!((x - y).abs() < 1E-12);
        }
        for (x, y) in tf.a().iter().zip(back.a()) {
            assert!((x - y).abs() < 1E-12);
        }
    }
}
