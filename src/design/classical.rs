use anyhow::anyhow;
use iir_filters::filter_design::{butter, FilterType};
use itertools::Itertools;
use num::complex::Complex64;

use super::{
    analog::{digitize, NORMALIZED_FS},
    bessel,
    chebyshev::{self, positive_db},
    elliptic, BandEdges, ClassicalSynthesis, SynthesisRequest,
};
use crate::{Error, Result, SynthesisMethod, TransferFunction, ZeroPoleGain};

/// Classical synthesis of Butterworth, Chebyshev I and II, elliptic and
/// Bessel filters.
///
/// Butterworth designs come from the `iir_filters` crate. The other methods
/// build an analog lowpass prototype with unit cutoff, transform it to the
/// requested band and discretize it with the bilinear transform, with the
/// band edges pre-warped.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassicalBackend;

impl ClassicalSynthesis for ClassicalBackend {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<TransferFunction> {
        let zpk = match request.method {
            SynthesisMethod::Butterworth => butterworth(request.order, request.band)?,
            method => digitize(&prototype(method, request)?, request.band)?,
        };
        log::debug!(
            "{} design with {} zeros and {} poles",
            request.method,
            zpk.zeros.len(),
            zpk.poles.len()
        );
        TransferFunction::from_zpk(&zpk)
    }
}

fn butterworth(order: u32, band: BandEdges) -> Result<ZeroPoleGain> {
    let filter_type = match band {
        BandEdges::Lowpass(w) => FilterType::LowPass(w),
        BandEdges::Highpass(w) => FilterType::HighPass(w),
        BandEdges::Bandpass(lo, hi) => FilterType::BandPass(lo, hi),
        BandEdges::Bandstop(lo, hi) => FilterType::BandStop(lo, hi),
    };
    let zpk = butter(order, filter_type, NORMALIZED_FS)
        .map_err(|e| Error::Synthesis(anyhow!("butterworth design failed: {e:?}")))?;
    Ok(ZeroPoleGain {
        zeros: zpk.z.iter().map(|z| Complex64::new(z.re, z.im)).collect_vec(),
        poles: zpk.p.iter().map(|p| Complex64::new(p.re, p.im)).collect_vec(),
        gain: zpk.k,
    })
}

/// Analog lowpass prototype with unit cutoff.
fn prototype(method: SynthesisMethod, request: &SynthesisRequest) -> Result<ZeroPoleGain> {
    let order = request.order;
    match method {
        SynthesisMethod::Cheby1 => Ok(chebyshev::type1(
            order,
            positive_db("passband ripple", request.rp)?,
        )),
        SynthesisMethod::Cheby2 => Ok(chebyshev::type2(
            order,
            positive_db("stopband attenuation", request.rs)?,
        )),
        SynthesisMethod::Elliptic => elliptic::prototype(
            order,
            positive_db("passband ripple", request.rp)?,
            positive_db("stopband attenuation", request.rs)?,
        ),
        SynthesisMethod::Bessel => bessel::prototype(order),
        SynthesisMethod::Butterworth | SynthesisMethod::Biquad | SynthesisMethod::Unknown => Err(
            Error::Synthesis(anyhow!("no analog prototype for {method} designs")),
        ),
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::FRAC_1_SQRT_2;

    use super::ClassicalBackend;
    use crate::{
        design, evaluate, infer, BandEdges, ClassicalSynthesis, Error, FilterFamily,
        FilterSpecification, SynthesisMethod, SynthesisRequest,
    };

    const FS: f64 = 48_000.0;

    fn butterworth(family: FilterFamily, order: u32, f0: f64) -> FilterSpecification {
        FilterSpecification::classical(family, SynthesisMethod::Butterworth, order, f0, FS)
    }

    fn db(x: f64) -> f64 {
        20.0 * x.log10()
    }

    #[test]
    fn lowpass_half_power_at_cutoff() {
        let tf = design(&butterworth(FilterFamily::Lowpass, 4, 1000.0)).unwrap();
        assert_eq!(tf.order(), 4);
        assert!((tf.dc_gain() - 1.0).abs() < 1E-9);
        // 500 Hz grid, sample 2 is the cutoff
        let r = evaluate(&tf, FS, 49).unwrap();
        assert!((r.values()[2].norm() - FRAC_1_SQRT_2).abs() < 1E-6);
    }

    #[test]
    fn highpass_blocks_dc() {
        let tf = design(&butterworth(FilterFamily::Highpass, 3, 2000.0)).unwrap();
        assert_eq!(tf.order(), 3);
        assert!(tf.dc_gain().abs() < 1E-9);
    }

    #[test]
    fn bandpass_doubles_order() {
        let spec = butterworth(FilterFamily::Bandpass, 2, 4000.0).with_q(2.0);
        let tf = design(&spec).unwrap();
        assert_eq!(tf.order(), 4);
    }

    #[test]
    fn inferred_family_matches() {
        let tf = design(&butterworth(FilterFamily::Lowpass, 4, 2000.0)).unwrap();
        let inferred = infer(&tf, FS).unwrap();
        assert_eq!(inferred.family, FilterFamily::Lowpass);
        assert_eq!(inferred.order, 4);
        assert!((inferred.f0.unwrap() - 2000.0).abs() < 10.0);
        assert!(inferred.is_stable());
    }

    #[test]
    fn chebyshev_levels_at_cutoff() {
        // 500 Hz grid, sample 2 is the cutoff
        let spec = FilterSpecification::classical(
            FilterFamily::Lowpass,
            SynthesisMethod::Cheby1,
            3,
            1000.0,
            FS,
        )
        .with_ripple(1.0);
        let tf = design(&spec).unwrap();
        assert!(tf.dc_gain().abs() > 0.99);
        let r = evaluate(&tf, FS, 49).unwrap();
        assert!((db(r.values()[2].norm()) + 1.0).abs() < 1E-6);

        let spec = FilterSpecification::classical(
            FilterFamily::Highpass,
            SynthesisMethod::Cheby2,
            3,
            1000.0,
            FS,
        )
        .with_attenuation(40.0);
        let tf = design(&spec).unwrap();
        // odd orders have a zero at DC
        assert!(tf.dc_gain().abs() < 1E-6);
        let r = evaluate(&tf, FS, 49).unwrap();
        assert!((db(r.values()[2].norm()) + 40.0).abs() < 1E-6);
        assert!((r.values()[48].norm() - 1.0).abs() < 1E-8);
    }

    #[test]
    fn elliptic_bandstop() {
        let spec = FilterSpecification::classical(
            FilterFamily::Notch,
            SynthesisMethod::Elliptic,
            2,
            6000.0,
            FS,
        )
        .with_q(2.0)
        .with_ripple(0.5)
        .with_attenuation(30.0);
        let tf = design(&spec).unwrap();
        assert_eq!(tf.order(), 4);
        // 1 kHz grid, the band is 4.5 to 7.5 kHz
        let r = evaluate(&tf, FS, 25).unwrap();
        assert!(db(r.values()[6].norm()) < -30.0 + 1E-6);
        assert!(db(r.values()[0].norm()) > -0.5 - 1E-6);
        assert!(db(r.values()[24].norm()) > -0.5 - 1E-6);
        // passband edges sit at -rp
        let edge = evaluate(&tf, FS, 33).unwrap();
        assert!((db(edge.values()[6].norm()) + 0.5).abs() < 1E-6);
    }

    #[test]
    fn bessel_lowpass() {
        let spec = FilterSpecification::classical(
            FilterFamily::Lowpass,
            SynthesisMethod::Bessel,
            5,
            3000.0,
            FS,
        );
        let tf = design(&spec).unwrap();
        assert_eq!(tf.order(), 5);
        assert!((tf.dc_gain() - 1.0).abs() < 1E-9);
        let inferred = infer(&tf, FS).unwrap();
        assert_eq!(inferred.family, FilterFamily::Lowpass);
        assert!(inferred.is_stable());
    }

    #[test]
    fn every_method_and_band() {
        let bands = [
            BandEdges::Lowpass(0.2),
            BandEdges::Highpass(0.2),
            BandEdges::Bandpass(0.2, 0.3),
            BandEdges::Bandstop(0.2, 0.3),
        ];
        let methods = [
            SynthesisMethod::Butterworth,
            SynthesisMethod::Cheby1,
            SynthesisMethod::Cheby2,
            SynthesisMethod::Elliptic,
            SynthesisMethod::Bessel,
        ];
        for band in bands {
            for method in methods {
                let request = SynthesisRequest {
                    method,
                    order: 3,
                    band,
                    rp: Some(1.0),
                    rs: Some(40.0),
                };
                let tf = ClassicalBackend.synthesize(&request).unwrap();
                let expected = match band {
                    BandEdges::Lowpass(_) | BandEdges::Highpass(_) => 3,
                    BandEdges::Bandpass(..) | BandEdges::Bandstop(..) => 6,
                };
                assert_eq!(tf.order(), expected, "{method} {band:?}");
                let zpk = tf.zpk(1E-14, 1000).unwrap();
                assert!(zpk.poles.iter().all(|p| p.norm() < 1.0), "{method} {band:?}");
            }
        }
    }

    #[test]
    fn missing_levels_are_domain_errors() {
        let request = SynthesisRequest {
            method: SynthesisMethod::Elliptic,
            order: 3,
            band: BandEdges::Lowpass(0.2),
            rp: Some(1.0),
            rs: None,
        };
        assert!(matches!(
            ClassicalBackend.synthesize(&request),
            Err(Error::Domain(_))
        ));
        let request = SynthesisRequest {
            method: SynthesisMethod::Cheby1,
            rp: Some(-1.0),
            ..request
        };
        assert!(matches!(
            ClassicalBackend.synthesize(&request),
            Err(Error::Domain(_))
        ));
    }

    #[test]
    fn routing_only_methods_are_rejected() {
        for method in [SynthesisMethod::Biquad, SynthesisMethod::Unknown] {
            let request = SynthesisRequest {
                method,
                order: 2,
                band: BandEdges::Lowpass(0.2),
                rp: None,
                rs: None,
            };
            assert!(matches!(
                ClassicalBackend.synthesize(&request),
                Err(Error::Synthesis(_))
            ));
        }
    }
}
