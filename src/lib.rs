//! Characterization of IIR filters.
//!
//! Given the coefficients of a digital filter, [`infer`] samples its
//! frequency response, recognizes its family (lowpass, highpass, bandpass or
//! notch), measures cutoff, Q, passband ripple, stopband attenuation and
//! group delay, factors it into zeros and poles and guesses which classical
//! method designed it. [`design`] goes the other way, from a
//! [`FilterSpecification`] to coefficients, so that inferred parameters can
//! be checked by redesigning the filter.
//!
//! ```
//! use iir_infer::{design, infer, FilterFamily, FilterSpecification};
//!
//! let spec = FilterSpecification::biquad(FilterFamily::Bandpass, 1000.0, 5.0, 48_000.0);
//! let tf = design(&spec).unwrap();
//! let inferred = infer(&tf, 48_000.0).unwrap();
//! assert_eq!(inferred.family, FilterFamily::Bandpass);
//! assert!((inferred.f0.unwrap() - 1000.0).abs() < 3.0);
//! ```
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod biquad;
pub mod classify;
pub mod design;
mod error;
pub mod infer;
mod poly;
pub mod response;
mod specification;
mod transfer;
mod util;

pub use biquad::design_biquad;
pub use classify::{classify, classify_with, Shape, ShapePolicy};
pub use design::{
    design, design_with, BandEdges, ClassicalBackend, ClassicalSynthesis, SynthesisRequest,
};
pub use error::{Error, Result};
pub use infer::{guess_method, infer, infer_with, InferencePolicy, InferredDescriptor, MethodEvidence};
pub use poly::{roots, Poly};
pub use response::{evaluate, group_delay, FrequencyResponse};
pub use specification::{FilterFamily, FilterSpecification, SynthesisMethod, DEFAULT_SAMPLE_RATE};
pub use transfer::{TransferFunction, ZeroPoleGain};

#[doc(hidden)]
pub use util::__testing;
