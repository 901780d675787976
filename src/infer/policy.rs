use crate::{classify::ShapePolicy, SynthesisMethod};

/// Tunable constants of the inference engine.
///
/// None of the breakpoints are derived from theory: they are heuristics that
/// separate the usual classical designs well enough on typical audio filters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InferencePolicy {
    /// Points on the `[0, fs/2]` grid the response is sampled at.
    pub sample_count: usize,
    pub shape: ShapePolicy,
    /// A lowpass stopband starts at this multiple of the cutoff.
    pub lowpass_stopband_ratio: f64,
    /// A highpass stopband ends at this multiple of the cutoff.
    pub highpass_stopband_ratio: f64,
    /// Bandwidth of a band filter as a fraction of `fs/2` when its Q is
    /// unknown.
    pub default_bandwidth_fraction: f64,
    /// Passband ripple (dB) below which a filter counts as maximally flat.
    pub ripple_breakpoint_db: f64,
    /// Stopband attenuation (dB) from which a stopband counts as equiripple.
    pub attenuation_breakpoint_db: f64,
    /// Group delay deviation (samples) below which phase counts as linear.
    pub group_delay_breakpoint: f64,
    pub root_epsilon: f64,
    pub root_max_iter: usize,
}

impl Default for InferencePolicy {
    fn default() -> Self {
        Self {
            sample_count: 8000,
            shape: ShapePolicy::default(),
            lowpass_stopband_ratio: 1.2,
            highpass_stopband_ratio: 0.8,
            default_bandwidth_fraction: 0.1,
            ripple_breakpoint_db: 0.1,
            attenuation_breakpoint_db: 1.0,
            group_delay_breakpoint: 1.0,
            root_epsilon: 1E-14,
            root_max_iter: 1000,
        }
    }
}

impl InferencePolicy {
    #[must_use]
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    #[must_use]
    pub fn with_shape(mut self, shape: ShapePolicy) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn with_ripple_breakpoint_db(mut self, db: f64) -> Self {
        self.ripple_breakpoint_db = db;
        self
    }

    #[must_use]
    pub fn with_attenuation_breakpoint_db(mut self, db: f64) -> Self {
        self.attenuation_breakpoint_db = db;
        self
    }

    #[must_use]
    pub fn with_group_delay_breakpoint(mut self, samples: f64) -> Self {
        self.group_delay_breakpoint = samples;
        self
    }

    #[must_use]
    pub fn with_root_finder(mut self, epsilon: f64, max_iter: usize) -> Self {
        self.root_epsilon = epsilon;
        self.root_max_iter = max_iter;
        self
    }
}

/// Measurements the method heuristic looks at. Any of them may be missing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MethodEvidence {
    /// Passband ripple in dB
    pub rp: Option<f64>,
    /// Stopband attenuation in dB
    pub rs: Option<f64>,
    /// Passband group delay deviation in samples
    pub gd_dev: Option<f64>,
}

/// Guess the classical method a filter was designed with.
///
/// Rules in priority order, the first one that matches wins. A rule needing
/// a missing measurement does not match.
///
/// | ripple | other                 | method      |
/// |--------|-----------------------|-------------|
/// | low    | group delay low       | bessel      |
/// | low    | group delay high      | butterworth |
/// | high   | attenuation low       | cheby1      |
/// | low    | attenuation high      | cheby2      |
/// | high   | attenuation high      | elliptic    |
///
/// Without a ripple measurement the answer is always unknown.
///
/// ```
/// use iir_infer::{guess_method, InferencePolicy, MethodEvidence, SynthesisMethod};
///
/// let evidence = MethodEvidence { rp: Some(0.05), rs: None, gd_dev: Some(0.5) };
/// assert_eq!(guess_method(&evidence, &InferencePolicy::default()), SynthesisMethod::Bessel);
/// ```
#[must_use]
pub fn guess_method(evidence: &MethodEvidence, policy: &InferencePolicy) -> SynthesisMethod {
    let Some(rp) = evidence.rp else {
        return SynthesisMethod::Unknown;
    };
    let low_ripple = rp < policy.ripple_breakpoint_db;
    let linear_phase = evidence
        .gd_dev
        .map(|gd| gd < policy.group_delay_breakpoint);
    let attenuating = evidence
        .rs
        .map(|rs| rs >= policy.attenuation_breakpoint_db);

    let method = match (low_ripple, linear_phase, attenuating) {
        (true, Some(true), _) => SynthesisMethod::Bessel,
        (true, Some(false), _) => SynthesisMethod::Butterworth,
        (false, _, Some(false)) => SynthesisMethod::Cheby1,
        (true, _, Some(true)) => SynthesisMethod::Cheby2,
        (false, _, Some(true)) => SynthesisMethod::Elliptic,
        _ => SynthesisMethod::Unknown,
    };
    log::debug!("{evidence:?} looks like {method}");
    method
}
