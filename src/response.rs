//! Sampling the frequency response of a transfer function.

use std::f64::consts::PI;

use itertools::Itertools;
use num::complex::Complex64;

use crate::{
    util::doc_macros::errors_invalid_filter, Error, Poly, Result, TransferFunction,
};

/// Magnitudes are floored here before taking the logarithm, so exact
/// transmission zeros read as -300 dB instead of negative infinity.
pub const MAGNITUDE_FLOOR: f64 = 1E-15;

/// A denominator smaller than this, relative to the sum of the absolute
/// denominator coefficients, counts as a pole on the sampling grid.
const SINGULAR_DENOMINATOR: f64 = 1E-10;

/// Complex frequency response sampled on a linear grid over `[0, fs/2]`.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyResponse {
    frequencies: Vec<f64>,
    values: Vec<Complex64>,
}

impl FrequencyResponse {
    /// Sample frequencies in Hz, ascending.
    #[must_use]
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Complex response at each frequency.
    #[must_use]
    pub fn values(&self) -> &[Complex64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Spacing between adjacent samples in Hz.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        match self.frequencies.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    /// `20*log10(|h|)`, see [`MAGNITUDE_FLOOR`].
    #[must_use]
    pub fn magnitude_db(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|h| 20.0 * h.norm().max(MAGNITUDE_FLOOR).log10())
            .collect()
    }

    /// Phase in radians, wrapped to `(-pi, pi]`.
    #[must_use]
    pub fn phase(&self) -> Vec<f64> {
        self.values.iter().map(|h| h.arg()).collect()
    }
}

/// Sample `tf` at `sample_count` frequencies spaced linearly over
/// `[0, fs/2]`, both ends included.
///
/// Each sample is `B(z) / A(z)` with `z = exp(-j*2*pi*f/fs)` and the
/// coefficient of index `k` multiplying `z^k`.
///
/// # Errors
#[doc = errors_invalid_filter!()]
/// - [`Error::Domain`]: fewer than two samples, or `fs` not positive.
///
/// # Examples
/// ```
/// use iir_infer::{evaluate, TransferFunction};
///
/// let tf = TransferFunction::new(vec![0.5, 0.5], vec![1.0]).unwrap();
/// let response = evaluate(&tf, 48_000.0, 5).unwrap();
/// assert_eq!(response.frequencies(), &[0.0, 6000.0, 12000.0, 18000.0, 24000.0]);
/// assert!((response.values()[0].re - 1.0).abs() < 1E-15);
/// assert!(response.values()[4].norm() < 1E-15);
/// ```
pub fn evaluate(tf: &TransferFunction, fs: f64, sample_count: usize) -> Result<FrequencyResponse> {
    if sample_count < 2 {
        return Err(Error::domain(format!(
            "need at least 2 samples, got {sample_count}"
        )));
    }
    if !(fs.is_finite() && fs > 0.0) {
        return Err(Error::domain(format!("sample rate must be positive, got {fs}")));
    }

    let num = tf.numerator();
    let den = tf.denominator();
    let singular = SINGULAR_DENOMINATOR * tf.a().iter().map(|c| c.abs()).sum::<f64>();

    let frequencies = frequency_grid(fs, sample_count);
    let values = frequencies
        .iter()
        .map(|&f| {
            let z = unit_circle(f, fs);
            let d = den.eval(z);
            if d.norm() <= singular {
                return Err(Error::invalid(format!(
                    "denominator vanishes at {f} Hz (pole on the unit circle)"
                )));
            }
            Ok(num.eval(z) / d)
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "sampled {sample_count} points of an order {} filter at fs = {fs}",
        tf.order()
    );
    Ok(FrequencyResponse {
        frequencies,
        values,
    })
}

/// Group delay in samples at each of `frequencies` (Hz).
///
/// Uses `c = b * reverse(a)`; the group delay is
/// `Re(sum(k c_k z^k) / sum(c_k z^k)) - (len(a) - 1)`. Samples where the
/// denominator is singular are set to 0 and logged.
#[must_use]
pub fn group_delay(tf: &TransferFunction, frequencies: &[f64], fs: f64) -> Vec<f64> {
    let a_rev = tf.a().iter().rev().copied().collect_vec();
    let c = Poly::from_real_slice(tf.b()).product(&Poly::from_real_slice(&a_rev));
    #[allow(clippy::cast_precision_loss)]
    let cr = Poly::new(
        &c.iter()
            .enumerate()
            .map(|(k, &ck)| ck.scale(k as f64))
            .collect_vec(),
    );
    let c_max = c.iter().map(|ck| ck.norm()).fold(0.0, f64::max);
    let singular = 10.0 * f64::EPSILON * c_max;
    #[allow(clippy::cast_precision_loss)]
    let shift = tf.order() as f64;

    frequencies
        .iter()
        .map(|&f| {
            let z = unit_circle(f, fs);
            let den = c.eval(z);
            let gd = (cr.eval(z) / den).re - shift;
            if den.norm() < singular || !gd.is_finite() {
                log::warn!("group delay is singular at {f} Hz, setting it to 0");
                0.0
            } else {
                gd
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn frequency_grid(fs: f64, sample_count: usize) -> Vec<f64> {
    let step = fs / 2.0 / (sample_count - 1) as f64;
    (0..sample_count).map(|k| k as f64 * step).collect()
}

/// `exp(-j*2*pi*f/fs)`
fn unit_circle(f: f64, fs: f64) -> Complex64 {
    Complex64::from_polar(1.0, -2.0 * PI * f / fs)
}
