//! Turning a [`FilterSpecification`] back into coefficients.

use crate::{
    biquad::design_biquad, Error, FilterFamily, FilterSpecification, Result, SynthesisMethod,
    TransferFunction,
};

mod analog;
mod bessel;
mod chebyshev;
mod classical;
mod elliptic;
pub use classical::ClassicalBackend;

/// Band edges never get closer than this to DC or Nyquist (normalized).
const EDGE_MIN: f64 = 1E-6;
const EDGE_MAX: f64 = 0.999;

/// Fraction of `f0` used as bandwidth when a band filter has no Q.
const DEFAULT_BANDWIDTH_FRACTION: f64 = 0.1;

/// Critical frequencies normalized to Nyquist, i.e. in `(0, 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BandEdges {
    Lowpass(f64),
    Highpass(f64),
    /// Lower and upper edge
    Bandpass(f64, f64),
    /// Lower and upper edge
    Bandstop(f64, f64),
}

/// What a classical synthesis backend is asked to build.
///
/// For band filters `order` is the order of the lowpass prototype, the
/// resulting filter has twice as many poles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthesisRequest {
    pub method: SynthesisMethod,
    pub order: u32,
    pub band: BandEdges,
    /// Passband ripple in dB
    pub rp: Option<f64>,
    /// Stopband attenuation in dB
    pub rs: Option<f64>,
}

/// Something that designs classical IIR filters (Butterworth, Chebyshev...).
pub trait ClassicalSynthesis {
    /// # Errors
    /// [`Error::Synthesis`] when the request can't be honored.
    fn synthesize(&self, request: &SynthesisRequest) -> Result<TransferFunction>;
}

/// Design with [`ClassicalBackend`] for classical methods, see
/// [`design_with`].
///
/// # Errors
/// See [`design_with`].
///
/// # Examples
/// ```
/// use iir_infer::{design, FilterFamily, FilterSpecification};
///
/// let spec = FilterSpecification::biquad(FilterFamily::Notch, 50.0, 10.0, 1000.0);
/// let tf = design(&spec).unwrap();
/// assert_eq!(tf.b().len(), 3);
/// ```
pub fn design(spec: &FilterSpecification) -> Result<TransferFunction> {
    design_with(spec, &ClassicalBackend)
}

/// Design the filter `spec` describes.
///
/// Second order biquads go to [`design_biquad`], every other method is
/// translated to a [`SynthesisRequest`] for `backend`. Band edges are `f0`
/// for lowpass and highpass, and `f0 +- bw/2` with `bw = f0/Q` (10% of `f0`
/// without a Q) for band filters, normalized to Nyquist.
///
/// # Errors
/// - [`Error::Domain`]: zero order, missing or out of range `f0`, a biquad
///   without Q or with an order other than 2, or a method missing the ripple
///   (cheby1, elliptic) or attenuation (cheby2, elliptic) it needs.
/// - [`Error::UnsupportedFamily`]: unknown family
/// - [`Error::UnsupportedMethod`]: unknown method
/// - [`Error::Synthesis`]: the backend failed
pub fn design_with<S>(spec: &FilterSpecification, backend: &S) -> Result<TransferFunction>
where
    S: ClassicalSynthesis + ?Sized,
{
    if spec.order == 0 {
        return Err(Error::domain("filter order must be at least 1"));
    }
    let Some(f0) = spec.f0 else {
        return Err(Error::domain("no cutoff or center frequency given"));
    };
    if spec.family == FilterFamily::Unknown {
        return Err(Error::UnsupportedFamily(spec.family.to_string()));
    }
    if spec.method == SynthesisMethod::Unknown {
        return Err(Error::UnsupportedMethod(spec.method.to_string()));
    }

    if spec.method == SynthesisMethod::Biquad {
        if spec.order != 2 {
            return Err(Error::domain(format!(
                "biquads are second order, got order {}",
                spec.order
            )));
        }
        let q = spec
            .q
            .ok_or_else(|| Error::domain("a biquad needs a Q"))?;
        log::debug!("routing {} biquad to the RBJ designer", spec.family);
        return design_biquad(spec.family, f0, q, spec.fs);
    }

    let needs_rp = matches!(spec.method, SynthesisMethod::Cheby1 | SynthesisMethod::Elliptic);
    let needs_rs = matches!(spec.method, SynthesisMethod::Cheby2 | SynthesisMethod::Elliptic);
    if needs_rp && spec.rp.is_none() {
        return Err(Error::domain(format!("{} needs a passband ripple", spec.method)));
    }
    if needs_rs && spec.rs.is_none() {
        return Err(Error::domain(format!(
            "{} needs a stopband attenuation",
            spec.method
        )));
    }

    let request = SynthesisRequest {
        method: spec.method,
        order: spec.order,
        band: band_edges(spec.family, f0, spec.q, spec.fs)?,
        rp: spec.rp,
        rs: spec.rs,
    };
    log::debug!("routing to classical synthesis: {request:?}");
    backend.synthesize(&request)
}

fn band_edges(family: FilterFamily, f0: f64, q: Option<f64>, fs: f64) -> Result<BandEdges> {
    if !(fs.is_finite() && fs > 0.0) {
        return Err(Error::domain(format!("sample rate must be positive, got {fs}")));
    }
    let nyquist = fs / 2.0;
    if !(f0 > 0.0 && f0 < nyquist) {
        return Err(Error::domain(format!(
            "f0 must lie strictly between 0 and {nyquist} Hz, got {f0}"
        )));
    }

    if !family.is_band() {
        return match family {
            FilterFamily::Lowpass => Ok(BandEdges::Lowpass(f0 / nyquist)),
            FilterFamily::Highpass => Ok(BandEdges::Highpass(f0 / nyquist)),
            _ => Err(Error::UnsupportedFamily(family.to_string())),
        };
    }

    let bw = match q {
        Some(q) if q > 0.0 => f0 / q,
        Some(q) => return Err(Error::domain(format!("Q must be positive, got {q}"))),
        None => DEFAULT_BANDWIDTH_FRACTION * f0,
    };
    let lo = ((f0 - bw / 2.0) / nyquist).clamp(EDGE_MIN, EDGE_MAX);
    let hi = ((f0 + bw / 2.0) / nyquist).clamp(EDGE_MIN, EDGE_MAX);
    if lo >= hi {
        return Err(Error::domain(format!("band around {f0} Hz collapses")));
    }
    Ok(if family == FilterFamily::Notch {
        BandEdges::Bandstop(lo, hi)
    } else {
        BandEdges::Bandpass(lo, hi)
    })
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use anyhow::anyhow;

    use super::{design, design_with, BandEdges, ClassicalSynthesis, SynthesisRequest};
    use crate::{
        design_biquad, Error, FilterFamily, FilterSpecification, Result, SynthesisMethod,
        TransferFunction,
    };

    /// Remembers the last request and answers with a pass-through filter.
    #[derive(Default)]
    struct Recorder(RefCell<Option<SynthesisRequest>>);

    impl ClassicalSynthesis for Recorder {
        fn synthesize(&self, request: &SynthesisRequest) -> Result<TransferFunction> {
            *self.0.borrow_mut() = Some(*request);
            TransferFunction::new(vec![1.0], vec![1.0])
        }
    }

    struct Failing;

    impl ClassicalSynthesis for Failing {
        fn synthesize(&self, _: &SynthesisRequest) -> Result<TransferFunction> {
            Err(Error::Synthesis(anyhow!("no can do")))
        }
    }

    fn classical(family: FilterFamily, method: SynthesisMethod) -> FilterSpecification {
        FilterSpecification::classical(family, method, 4, 1000.0, 48_000.0)
    }

    #[test]
    fn biquad_matches_rbj() {
        let spec = FilterSpecification::biquad(FilterFamily::Lowpass, 1000.0, 5.0, 48_000.0);
        let tf = design(&spec).unwrap();
        let expected = design_biquad(FilterFamily::Lowpass, 1000.0, 5.0, 48_000.0).unwrap();
        assert_eq!(tf, expected);
    }

    #[test]
    fn lowpass_edge_is_normalized() {
        let recorder = Recorder::default();
        design_with(&classical(FilterFamily::Lowpass, SynthesisMethod::Bessel), &recorder)
            .unwrap();
        let request = recorder.0.borrow().unwrap();
        assert_eq!(request.order, 4);
        assert_eq!(request.method, SynthesisMethod::Bessel);
        match request.band {
            BandEdges::Lowpass(w) => assert!((w - 1000.0 / 24_000.0).abs() < 1E-15),
            other => panic!("unexpected band {other:?}"),
        }
    }

    #[test]
    fn band_edges_from_q() {
        let recorder = Recorder::default();
        let spec = classical(FilterFamily::Bandpass, SynthesisMethod::Butterworth).with_q(2.0);
        design_with(&spec, &recorder).unwrap();
        let request = recorder.0.borrow().unwrap();
        match request.band {
            BandEdges::Bandpass(lo, hi) => {
                assert!((lo - 750.0 / 24_000.0).abs() < 1E-15);
                assert!((hi - 1250.0 / 24_000.0).abs() < 1E-15);
            }
            other => panic!("unexpected band {other:?}"),
        }
    }

    #[test]
    fn band_edges_without_q_are_clamped() {
        let recorder = Recorder::default();
        let spec = FilterSpecification::classical(
            FilterFamily::Notch,
            SynthesisMethod::Butterworth,
            2,
            23_990.0,
            48_000.0,
        );
        design_with(&spec, &recorder).unwrap();
        let request = recorder.0.borrow().unwrap();
        match request.band {
            BandEdges::Bandstop(lo, hi) => {
                assert!((lo - (23_990.0 - 1199.5) / 24_000.0).abs() < 1E-12);
                assert_eq!(hi, 0.999);
            }
            other => panic!("unexpected band {other:?}"),
        }
    }

    #[test]
    fn missing_ripple_or_attenuation() {
        let recorder = Recorder::default();
        for method in [
            SynthesisMethod::Cheby1,
            SynthesisMethod::Cheby2,
            SynthesisMethod::Elliptic,
        ] {
            assert!(matches!(
                design_with(&classical(FilterFamily::Lowpass, method), &recorder),
                Err(Error::Domain(_))
            ));
        }
        let spec = classical(FilterFamily::Lowpass, SynthesisMethod::Elliptic)
            .with_ripple(0.5)
            .with_attenuation(40.0);
        design_with(&spec, &recorder).unwrap();
        assert_eq!(recorder.0.borrow().unwrap().rs, Some(40.0));
    }

    #[test]
    fn routing_errors() {
        let mut spec = FilterSpecification::biquad(FilterFamily::Lowpass, 1000.0, 1.0, 48_000.0);
        spec.order = 4;
        assert!(matches!(design(&spec), Err(Error::Domain(_))));

        spec.order = 0;
        assert!(matches!(design(&spec), Err(Error::Domain(_))));

        let mut spec = FilterSpecification::biquad(FilterFamily::Lowpass, 1000.0, 1.0, 48_000.0);
        spec.q = None;
        assert!(matches!(design(&spec), Err(Error::Domain(_))));

        let mut spec = FilterSpecification::biquad(FilterFamily::Lowpass, 1000.0, 1.0, 48_000.0);
        spec.f0 = None;
        assert!(matches!(design(&spec), Err(Error::Domain(_))));

        let spec = classical(FilterFamily::Unknown, SynthesisMethod::Butterworth);
        assert!(matches!(design(&spec), Err(Error::UnsupportedFamily(_))));

        let spec = classical(FilterFamily::Lowpass, SynthesisMethod::Unknown);
        assert!(matches!(design(&spec), Err(Error::UnsupportedMethod(_))));
    }

    #[test]
    fn backend_errors_surface() {
        let spec = classical(FilterFamily::Highpass, SynthesisMethod::Butterworth);
        assert!(matches!(design_with(&spec, &Failing), Err(Error::Synthesis(_))));
    }
}
