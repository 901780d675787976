//! Recognizing the family of a filter from its magnitude response.

use std::fmt::Display;

use crate::{
    response::FrequencyResponse,
    specification::fmt_opt,
    util::{
        doc_macros::errors_inconclusive,
        iterator::{argmax, argmin},
    },
    Error, FilterFamily, Result,
};

/// Result of classifying a response.
///
/// `f0` is the cutoff (lowpass/highpass) or the center (bandpass/notch),
/// `q` is only measured for the band families. Both are `None` for
/// [`FilterFamily::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    pub family: FilterFamily,
    pub f0: Option<f64>,
    pub q: Option<f64>,
}

impl Shape {
    const UNKNOWN: Self = Self {
        family: FilterFamily::Unknown,
        f0: None,
        q: None,
    };
}

impl Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (f0: {}, Q: {})",
            self.family,
            fmt_opt(self.f0),
            fmt_opt(self.q)
        )
    }
}

/// Thresholds used by [`classify_with`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapePolicy {
    /// Drop from the reference level that defines a cutoff or band edge.
    pub cutoff_drop_db: f64,
    /// Differences at or below this are treated as equal.
    pub flat_tolerance_db: f64,
    /// How far above its DC (Nyquist) level a lowpass (highpass) may peak
    /// before it is taken for a bandpass.
    pub resonance_allowance_db: f64,
}

impl Default for ShapePolicy {
    fn default() -> Self {
        Self {
            cutoff_drop_db: 3.0,
            flat_tolerance_db: 1E-6,
            resonance_allowance_db: 20.0,
        }
    }
}

impl ShapePolicy {
    #[must_use]
    pub fn with_cutoff_drop_db(mut self, db: f64) -> Self {
        self.cutoff_drop_db = db;
        self
    }

    #[must_use]
    pub fn with_flat_tolerance_db(mut self, db: f64) -> Self {
        self.flat_tolerance_db = db;
        self
    }

    #[must_use]
    pub fn with_resonance_allowance_db(mut self, db: f64) -> Self {
        self.resonance_allowance_db = db;
        self
    }
}

/// Classify with [`ShapePolicy::default`], see [`classify_with`].
///
/// # Errors
#[doc = errors_inconclusive!()]
///
/// # Examples
/// ```
/// use iir_infer::{classify, design_biquad, evaluate, FilterFamily};
///
/// let tf = design_biquad(FilterFamily::Bandpass, 2000.0, 4.0, 48_000.0).unwrap();
/// let shape = classify(&evaluate(&tf, 48_000.0, 8000).unwrap()).unwrap();
/// assert_eq!(shape.family, FilterFamily::Bandpass);
/// assert!((shape.f0.unwrap() - 2000.0).abs() < 3.0);
/// ```
pub fn classify(response: &FrequencyResponse) -> Result<Shape> {
    classify_with(response, &ShapePolicy::default())
}

/// Decide the family of a sampled response and measure its characteristic
/// frequency.
///
/// - flat: unknown
/// - maximum at DC only: lowpass, cutoff at the first sample `cutoff_drop_db`
///   below the DC level
/// - maximum at Nyquist only: highpass, cutoff at the first sample within
///   `cutoff_drop_db` of the Nyquist level
/// - interior maximum: bandpass centered on it, unless one end stays within
///   `resonance_allowance_db` of the peak while the other end is far below,
///   which is a resonant lowpass or highpass
/// - interior minimum: notch centered on it
///
/// # Errors
#[doc = errors_inconclusive!()]
pub fn classify_with(response: &FrequencyResponse, policy: &ShapePolicy) -> Result<Shape> {
    let mag = response.magnitude_db();
    let freqs = response.frequencies();
    let (Some(ip), Some(iv)) = (argmax(&mag), argmin(&mag)) else {
        return Err(Error::inconclusive("empty response"));
    };
    let last = mag.len() - 1;
    let (mag0, mag_nyq) = (mag[0], mag[last]);
    let (peak, valley) = (mag[ip], mag[iv]);
    let tol = policy.flat_tolerance_db;

    if peak - valley <= tol {
        log::debug!("flat response ({peak} dB), family unknown");
        return Ok(Shape::UNKNOWN);
    }

    let peak_at_dc = mag0 >= peak - tol;
    let peak_at_nyq = mag_nyq >= peak - tol;
    let peak_interior = peak - mag0 > tol && peak - mag_nyq > tol;
    let valley_interior = mag0 - valley > tol && mag_nyq - valley > tol;
    let allowance = policy.resonance_allowance_db;

    let shape = if peak_at_dc && !peak_at_nyq {
        lowpass(&mag, freqs, policy)?
    } else if peak_at_nyq && !peak_at_dc {
        highpass(&mag, freqs, policy)?
    } else if peak_interior {
        if peak - mag0 <= allowance && mag0 - mag_nyq > allowance {
            log::debug!("interior peak {} dB above DC, resonant lowpass", peak - mag0);
            lowpass(&mag, freqs, policy)?
        } else if peak - mag_nyq <= allowance && mag_nyq - mag0 > allowance {
            log::debug!(
                "interior peak {} dB above Nyquist, resonant highpass",
                peak - mag_nyq
            );
            highpass(&mag, freqs, policy)?
        } else {
            bandpass(&mag, freqs, ip, policy)?
        }
    } else if valley_interior {
        notch(&mag, freqs, iv, policy)?
    } else {
        Shape::UNKNOWN
    };

    log::debug!("classified as {shape}");
    Ok(shape)
}

fn lowpass(mag: &[f64], freqs: &[f64], policy: &ShapePolicy) -> Result<Shape> {
    let thr = mag[0] - policy.cutoff_drop_db;
    let i = mag
        .iter()
        .position(|&m| m <= thr)
        .ok_or_else(|| Error::inconclusive(format!("lowpass never drops to {thr} dB")))?;
    Ok(Shape {
        family: FilterFamily::Lowpass,
        f0: Some(freqs[i]),
        q: None,
    })
}

fn highpass(mag: &[f64], freqs: &[f64], policy: &ShapePolicy) -> Result<Shape> {
    let thr = mag[mag.len() - 1] - policy.cutoff_drop_db;
    let i = mag
        .iter()
        .position(|&m| m >= thr)
        .ok_or_else(|| Error::inconclusive(format!("highpass never rises to {thr} dB")))?;
    Ok(Shape {
        family: FilterFamily::Highpass,
        f0: Some(freqs[i]),
        q: None,
    })
}

fn bandpass(mag: &[f64], freqs: &[f64], ip: usize, policy: &ShapePolicy) -> Result<Shape> {
    let thr = mag[ip] - policy.cutoff_drop_db;
    let below = |m: &f64| *m <= thr;
    let i1 = mag[..ip]
        .iter()
        .rposition(below)
        .ok_or_else(|| Error::inconclusive("no lower band edge below the peak"))?;
    let i2 = mag[ip..]
        .iter()
        .position(below)
        .map(|i| i + ip)
        .ok_or_else(|| Error::inconclusive("no upper band edge above the peak"))?;
    let f0 = freqs[ip];
    Ok(Shape {
        family: FilterFamily::Bandpass,
        f0: Some(f0),
        q: Some(f0 / (freqs[i2] - freqs[i1])),
    })
}

fn notch(mag: &[f64], freqs: &[f64], iv: usize, policy: &ShapePolicy) -> Result<Shape> {
    let thr = mag[iv] + policy.cutoff_drop_db;
    let above = |m: &f64| *m >= thr;
    let i1 = mag[..iv]
        .iter()
        .rposition(above)
        .ok_or_else(|| Error::inconclusive("no lower band edge below the notch"))?;
    let i2 = mag[iv..]
        .iter()
        .position(above)
        .map(|i| i + iv)
        .ok_or_else(|| Error::inconclusive("no upper band edge above the notch"))?;
    let f0 = freqs[iv];
    Ok(Shape {
        family: FilterFamily::Notch,
        f0: Some(f0),
        q: Some(f0 / (freqs[i2] - freqs[i1])),
    })
}
