//! Recovering design parameters from filter coefficients.

use std::fmt::Display;

use itertools::Itertools;
use num::complex::Complex64;

use crate::{
    classify::classify_with,
    response::{evaluate, group_delay},
    specification::fmt_opt,
    util::{
        complex::complex_fmt,
        doc_macros::{errors_inconclusive, errors_invalid_filter},
        iterator::{max_of, min_of},
    },
    Error, FilterFamily, FilterSpecification, Result, SynthesisMethod, TransferFunction,
};

mod bands;
pub use bands::{band_levels, passband_window, BandLevels};
mod policy;
pub use policy::{guess_method, InferencePolicy, MethodEvidence};

/// Everything [`infer`] could measure about a filter.
///
/// `rp` and `rs` are `None` exactly when the family is unknown.
#[derive(Clone, Debug, PartialEq)]
pub struct InferredDescriptor {
    pub family: FilterFamily,
    /// Cutoff or center frequency in Hz
    pub f0: Option<f64>,
    pub q: Option<f64>,
    /// Degree of the denominator
    pub order: u32,
    pub method: SynthesisMethod,
    /// Passband ripple in dB
    pub rp: Option<f64>,
    /// Stopband attenuation in dB
    pub rs: Option<f64>,
    /// Sample rate in Hz
    pub fs: f64,
    /// Spread of the passband group delay, in samples
    pub gd_dev: f64,
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl InferredDescriptor {
    /// The specification to redesign this filter from.
    #[must_use]
    pub const fn to_specification(&self) -> FilterSpecification {
        FilterSpecification {
            family: self.family,
            f0: self.f0,
            q: self.q,
            order: self.order,
            method: self.method,
            rp: self.rp,
            rs: self.rs,
            fs: self.fs,
        }
    }

    /// Whether every pole lies strictly inside the unit circle.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.poles.iter().all(|p| p.norm() < 1.0)
    }
}

impl Display for InferredDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let list = |roots: &[Complex64]| roots.iter().map(complex_fmt).join(", ");
        writeln!(f, "family: {}", self.family)?;
        writeln!(f, "f0: {}", fmt_opt(self.f0))?;
        writeln!(f, "Q: {}", fmt_opt(self.q))?;
        writeln!(f, "order: {}", self.order)?;
        writeln!(f, "method: {}", self.method)?;
        writeln!(f, "rp: {}", fmt_opt(self.rp))?;
        writeln!(f, "rs: {}", fmt_opt(self.rs))?;
        writeln!(f, "fs: {}", self.fs)?;
        writeln!(f, "gd_dev: {}", self.gd_dev)?;
        writeln!(f, "zeros: [{}]", list(&self.zeros))?;
        writeln!(f, "poles: [{}]", list(&self.poles))?;
        write!(f, "gain: {}", self.gain)
    }
}

/// Infer with [`InferencePolicy::default`], see [`infer_with`].
///
/// # Errors
/// See [`infer_with`].
///
/// # Examples
/// ```
/// use iir_infer::{design_biquad, infer, FilterFamily};
///
/// let tf = design_biquad(FilterFamily::Highpass, 2000.0, 0.7071, 48_000.0).unwrap();
/// let inferred = infer(&tf, 48_000.0).unwrap();
/// assert_eq!(inferred.family, FilterFamily::Highpass);
/// assert_eq!(inferred.order, 2);
/// assert!(inferred.is_stable());
/// ```
pub fn infer(tf: &TransferFunction, fs: f64) -> Result<InferredDescriptor> {
    infer_with(tf, fs, &InferencePolicy::default())
}

/// Characterize a filter: its family and characteristic frequency, passband
/// ripple, stopband attenuation, passband group delay deviation, zeros and
/// poles, and a guess of the method it was designed with.
///
/// # Errors
#[doc = errors_invalid_filter!()]
#[doc = errors_inconclusive!()]
/// - [`Error::Domain`]: `fs` not positive or fewer than two samples in the
///   policy.
/// - [`Error::RootsNoConverge`]: zeros or poles could not be found.
pub fn infer_with(
    tf: &TransferFunction,
    fs: f64,
    policy: &InferencePolicy,
) -> Result<InferredDescriptor> {
    let order = u32::try_from(tf.order())
        .map_err(|_| Error::domain(format!("order {} is too large", tf.order())))?;

    let response = evaluate(tf, fs, policy.sample_count)?;
    let shape = classify_with(&response, &policy.shape)?;

    let mag = response.magnitude_db();
    let freqs = response.frequencies();
    let levels = band_levels(&mag, freqs, &shape, policy)?;

    let window = passband_window(freqs, &shape, policy)?;
    let gd = group_delay(tf, &freqs[window], fs);
    let gd_dev = match (max_of(&gd), min_of(&gd)) {
        (Some(max), Some(min)) => max - min,
        _ => return Err(Error::inconclusive("group delay window is empty")),
    };

    let zpk = tf.zpk(policy.root_epsilon, policy.root_max_iter)?;

    let method = guess_method(
        &MethodEvidence {
            rp: levels.rp,
            rs: levels.rs,
            gd_dev: Some(gd_dev),
        },
        policy,
    );

    log::debug!(
        "inferred {shape}, rp = {}, rs = {}, gd_dev = {gd_dev}, method {method}",
        fmt_opt(levels.rp),
        fmt_opt(levels.rs)
    );
    Ok(InferredDescriptor {
        family: shape.family,
        f0: shape.f0,
        q: shape.q,
        order,
        method,
        rp: levels.rp,
        rs: levels.rs,
        fs,
        gd_dev,
        zeros: zpk.zeros,
        poles: zpk.poles,
        gain: zpk.gain,
    })
}
