//! Second-order sections from the RBJ audio EQ cookbook.

use std::f64::consts::PI;

use crate::{Error, FilterFamily, Result, TransferFunction};

/// Design a second-order section with the RBJ cookbook formulas.
///
/// With `w0 = 2*pi*f0/fs`, `alpha = sin(w0)/(2q)` the denominator is
/// `[1 + alpha, -2cos(w0), 1 - alpha]` for every family, and the result is
/// normalized by `a0`. The bandpass has constant 0 dB peak gain (`b0 = alpha`).
///
/// # Errors
/// - [`Error::UnsupportedFamily`]: `family` is [`FilterFamily::Unknown`]
/// - [`Error::Domain`]: `q <= 0`, `fs <= 0` or `f0` not in `(0, fs/2)`
///
/// # Examples
/// ```
/// use iir_infer::{design_biquad, FilterFamily};
///
/// let tf = design_biquad(FilterFamily::Lowpass, 1000.0, 0.7071, 48_000.0).unwrap();
/// assert_eq!(tf.order(), 2);
/// assert!((tf.dc_gain() - 1.0).abs() < 1E-12);
/// ```
pub fn design_biquad(family: FilterFamily, f0: f64, q: f64, fs: f64) -> Result<TransferFunction> {
    if !(fs.is_finite() && fs > 0.0) {
        return Err(Error::domain(format!("sample rate must be positive, got {fs}")));
    }
    if !(q.is_finite() && q > 0.0) {
        return Err(Error::domain(format!("Q must be positive, got {q}")));
    }
    if !(f0 > 0.0 && f0 < fs / 2.0) {
        return Err(Error::domain(format!(
            "f0 must lie strictly between 0 and {} Hz, got {f0}",
            fs / 2.0
        )));
    }

    let w0 = 2.0 * PI * f0 / fs;
    let (sin_w0, cos_w0) = w0.sin_cos();
    let alpha = sin_w0 / (2.0 * q);

    let b = match family {
        FilterFamily::Lowpass => {
            let b0 = (1.0 - cos_w0) / 2.0;
            vec![b0, 1.0 - cos_w0, b0]
        }
        FilterFamily::Highpass => {
            let b0 = (1.0 + cos_w0) / 2.0;
            vec![b0, -(1.0 + cos_w0), b0]
        }
        FilterFamily::Bandpass => vec![alpha, 0.0, -alpha],
        FilterFamily::Notch => vec![1.0, -2.0 * cos_w0, 1.0],
        FilterFamily::Unknown => return Err(Error::UnsupportedFamily(family.to_string())),
    };
    let a = vec![1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha];

    log::debug!("RBJ {family} biquad at f0 = {f0}, Q = {q}, fs = {fs}");
    TransferFunction::new(b, a)
}
