//! Passband ripple and stopband attenuation, one extraction per family.
//!
//! Every extraction takes the magnitude curve (dB), its frequency grid, the
//! classified shape and the policy, and returns the two levels. Windows are
//! trimmed at strict local extrema so that the transition band does not count
//! as ripple.

use std::ops::Range;

use crate::{
    classify::Shape,
    util::{
        doc_macros::errors_inconclusive,
        iterator::{local_maxima, local_minima, max_of, min_of},
    },
    Error, FilterFamily, Result,
};

use super::InferencePolicy;

/// Passband ripple and stopband attenuation in dB. Both are `None` for an
/// unknown family.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandLevels {
    pub rp: Option<f64>,
    pub rs: Option<f64>,
}

/// Measure ripple and attenuation with the extraction of `shape.family`.
///
/// # Errors
#[doc = errors_inconclusive!()]
pub fn band_levels(
    mag: &[f64],
    freqs: &[f64],
    shape: &Shape,
    policy: &InferencePolicy,
) -> Result<BandLevels> {
    debug_assert_eq!(mag.len(), freqs.len());
    match shape.family {
        FilterFamily::Lowpass => lowpass(mag, freqs, shape, policy),
        FilterFamily::Highpass => highpass(mag, freqs, shape, policy),
        FilterFamily::Bandpass => bandpass(mag, freqs, shape, policy),
        FilterFamily::Notch => notch(mag, freqs, shape, policy),
        FilterFamily::Unknown => Ok(BandLevels::default()),
    }
}

/// Indices of the window the group delay is measured over: up to the cutoff
/// for a lowpass, from the cutoff for a highpass and everything for an
/// unknown family. Band filters use the center window `f0 +- bw/2`, which for
/// a notch is its stopband.
///
/// # Errors
#[doc = errors_inconclusive!()]
pub fn passband_window(
    freqs: &[f64],
    shape: &Shape,
    policy: &InferencePolicy,
) -> Result<Range<usize>> {
    if shape.family.is_band() {
        let f0 = characteristic(shape)?;
        let half = bandwidth(freqs, shape, policy, f0) / 2.0;
        return Ok(between(freqs, f0 - half, f0 + half));
    }
    Ok(match shape.family {
        FilterFamily::Lowpass => at_most(freqs, characteristic(shape)?),
        FilterFamily::Highpass => at_least(freqs, characteristic(shape)?),
        _ => 0..freqs.len(),
    })
}

/// Lowpass: the passband ends at the last local maximum below the cutoff (if
/// any), the stopband starts at the first local minimum above
/// `lowpass_stopband_ratio * f0` (if any).
fn lowpass(
    mag: &[f64],
    freqs: &[f64],
    shape: &Shape,
    policy: &InferencePolicy,
) -> Result<BandLevels> {
    let f0 = characteristic(shape)?;
    let pb = &mag[at_most(freqs, f0)];
    let pb = match local_maxima(pb).last() {
        Some(&i) => &pb[..=i],
        None => pb,
    };
    let sb = &mag[at_least(freqs, policy.lowpass_stopband_ratio * f0)];
    let sb = match local_minima(sb).first() {
        Some(&i) => &sb[i..],
        None => sb,
    };
    log::debug!("lowpass passband {} samples, stopband {}", pb.len(), sb.len());
    edge_levels(pb, sb)
}

/// Mirror of [`lowpass`].
fn highpass(
    mag: &[f64],
    freqs: &[f64],
    shape: &Shape,
    policy: &InferencePolicy,
) -> Result<BandLevels> {
    let f0 = characteristic(shape)?;
    let pb = &mag[at_least(freqs, f0)];
    let pb = match local_maxima(pb).first() {
        Some(&i) => &pb[i..],
        None => pb,
    };
    let sb = &mag[at_most(freqs, policy.highpass_stopband_ratio * f0)];
    let sb = match local_minima(sb).last() {
        Some(&i) => &sb[..=i],
        None => sb,
    };
    log::debug!("highpass passband {} samples, stopband {}", pb.len(), sb.len());
    edge_levels(pb, sb)
}

/// Bandpass: the center gain is the dip between the outermost local maxima
/// of the `f0 +- bw/2` window, the peak itself when there is a single one.
/// Each stopband tail is trimmed at its local minimum closest to `f0`.
fn bandpass(
    mag: &[f64],
    freqs: &[f64],
    shape: &Shape,
    policy: &InferencePolicy,
) -> Result<BandLevels> {
    let f0 = characteristic(shape)?;
    let half = bandwidth(freqs, shape, policy, f0) / 2.0;
    let window = between(freqs, f0 - half, f0 + half);

    let pb = &mag[window.clone()];
    let peaks = local_maxima(pb);
    let (pb, center) = match peaks.as_slice() {
        [] => (pb, max_of(pb)),
        [i] => (pb, Some(pb[*i])),
        [first, .., last] => {
            let narrowed = &pb[*first..=*last];
            (narrowed, min_of(narrowed))
        }
    };
    let (Some(pb_max), Some(center)) = (max_of(pb), center) else {
        return Err(Error::inconclusive("bandpass passband window is empty"));
    };

    let lower = &mag[..window.start];
    let lower = match local_minima(lower).last() {
        Some(&i) => &lower[..=i],
        None => lower,
    };
    let upper = &mag[window.end..];
    let upper = match local_minima(upper).first() {
        Some(&i) => &upper[i..],
        None => upper,
    };
    let sb_max = max_of(lower)
        .into_iter()
        .chain(max_of(upper))
        .reduce(f64::max)
        .ok_or_else(|| Error::inconclusive("bandpass has no stopband on either side"))?;

    log::debug!(
        "bandpass passband {} samples around {f0} Hz, stopband tails {} and {}",
        pb.len(),
        lower.len(),
        upper.len()
    );
    Ok(BandLevels {
        rp: Some(pb_max - center),
        rs: Some(center - sb_max),
    })
}

/// Notch: ripple over both pass tails, each trimmed at its local maximum
/// closest to `f0`; the center is the bump between the outermost local
/// minima of the `f0 +- bw/2` window, the dip itself when there is a single
/// one.
fn notch(
    mag: &[f64],
    freqs: &[f64],
    shape: &Shape,
    policy: &InferencePolicy,
) -> Result<BandLevels> {
    let f0 = characteristic(shape)?;
    let half = bandwidth(freqs, shape, policy, f0) / 2.0;
    let window = between(freqs, f0 - half, f0 + half);

    let lower = &mag[..window.start];
    let lower = match local_maxima(lower).last() {
        Some(&i) => &lower[..=i],
        None => lower,
    };
    let upper = &mag[window.end..];
    let upper = match local_maxima(upper).first() {
        Some(&i) => &upper[i..],
        None => upper,
    };
    let (Some(pb_max), Some(pb_min)) = (
        max_of(lower).into_iter().chain(max_of(upper)).reduce(f64::max),
        min_of(lower).into_iter().chain(min_of(upper)).reduce(f64::min),
    ) else {
        return Err(Error::inconclusive("notch has no passband on either side"));
    };

    let sb = &mag[window];
    let center = match local_minima(sb).as_slice() {
        [] => min_of(sb),
        [i] => Some(sb[*i]),
        [first, .., last] => max_of(&sb[*first..=*last]),
    }
    .ok_or_else(|| Error::inconclusive("notch stopband window is empty"))?;

    log::debug!(
        "notch stopband {} samples around {f0} Hz, pass tails {} and {}",
        sb.len(),
        lower.len(),
        upper.len()
    );
    Ok(BandLevels {
        rp: Some(pb_max - pb_min),
        rs: Some(pb_min - center),
    })
}

/// `rp` is the spread of the passband, `rs` the gap between the passband
/// floor and the stopband ceiling.
fn edge_levels(pb: &[f64], sb: &[f64]) -> Result<BandLevels> {
    let (Some(pb_max), Some(pb_min)) = (max_of(pb), min_of(pb)) else {
        return Err(Error::inconclusive("passband window is empty"));
    };
    let sb_max = max_of(sb).ok_or_else(|| Error::inconclusive("stopband window is empty"))?;
    Ok(BandLevels {
        rp: Some(pb_max - pb_min),
        rs: Some(pb_min - sb_max),
    })
}

fn characteristic(shape: &Shape) -> Result<f64> {
    shape.f0.ok_or_else(|| {
        Error::inconclusive(format!(
            "{} without a characteristic frequency",
            shape.family
        ))
    })
}

/// `f0 / Q`, or a fixed fraction of the analyzed span when Q is unknown.
fn bandwidth(freqs: &[f64], shape: &Shape, policy: &InferencePolicy, f0: f64) -> f64 {
    shape.q.map_or_else(
        || match (freqs.first(), freqs.last()) {
            (Some(lo), Some(hi)) => policy.default_bandwidth_fraction * (hi - lo),
            _ => 0.0,
        },
        |q| f0 / q,
    )
}

/// Samples with `f <= hi`. The grid is ascending.
fn at_most(freqs: &[f64], hi: f64) -> Range<usize> {
    0..freqs.partition_point(|&f| f <= hi)
}

/// Samples with `f >= lo`.
fn at_least(freqs: &[f64], lo: f64) -> Range<usize> {
    freqs.partition_point(|&f| f < lo)..freqs.len()
}

/// Samples with `lo <= f <= hi`.
fn between(freqs: &[f64], lo: f64, hi: f64) -> Range<usize> {
    let start = freqs.partition_point(|&f| f < lo);
    let end = freqs.partition_point(|&f| f <= hi).max(start);
    start..end
}

#[cfg(test)]
mod test {
    use super::{band_levels, passband_window, BandLevels};
    use crate::{
        classify::Shape, util::__testing::almost_equal, Error, FilterFamily, InferencePolicy,
    };

    fn grid(n: usize) -> Vec<f64> {
        (0..n).map(|k| k as f64 * 10.0).collect()
    }

    fn shape(family: FilterFamily, f0: f64, q: Option<f64>) -> Shape {
        Shape {
            family,
            f0: Some(f0),
            q,
        }
    }

    #[test]
    fn lowpass_trims_transition() {
        // ripple of 1 dB in the passband, last maximum at index 3
        let mag = [0.0, -1.0, -0.5, 0.0, -3.0, -10.0, -30.0, -40.0, -35.0, -38.0];
        let freqs = grid(mag.len());
        let levels = band_levels(
            &mag,
            &freqs,
            &shape(FilterFamily::Lowpass, 40.0, None),
            &InferencePolicy::default(),
        )
        .unwrap();
        // passband [0, -1, -0.5, 0], stopband from 48 Hz, trimmed at the
        // minimum at 70 Hz: [-40, -35, -38]
        assert!(almost_equal(levels.rp.unwrap(), 1.0, 1E-12));
        assert!(almost_equal(levels.rs.unwrap(), -1.0 + 35.0, 1E-12));
    }

    #[test]
    fn highpass_mirrors_lowpass() {
        let mag = [-38.0, -35.0, -40.0, -30.0, -10.0, -3.0, 0.0, -0.5, -1.0, 0.0];
        let freqs = grid(mag.len());
        let levels = band_levels(
            &mag,
            &freqs,
            &shape(FilterFamily::Highpass, 50.0, None),
            &InferencePolicy::default(),
        )
        .unwrap();
        // passband from the maximum at 60 Hz: [0, -0.5, -1, 0]
        // stopband up to 40 Hz, trimmed at the minimum at 20 Hz
        assert!(almost_equal(levels.rp.unwrap(), 1.0, 1E-12));
        assert!(almost_equal(levels.rs.unwrap(), -1.0 + 35.0, 1E-12));
    }

    #[test]
    fn bandpass_with_twin_peaks() {
        let mag = [
            -45.0, -50.0, -40.0, -20.0, 0.0, -1.0, 0.0, -20.0, -45.0, -42.0, -60.0,
        ];
        let freqs = grid(mag.len());
        // window 50 +- 25 Hz: indices 3..=7
        let levels = band_levels(
            &mag,
            &freqs,
            &shape(FilterFamily::Bandpass, 50.0, Some(1.0)),
            &InferencePolicy::default(),
        )
        .unwrap();
        // center gain is the dip between the peaks
        assert!(almost_equal(levels.rp.unwrap(), 1.0, 1E-12));
        // the lower tail is trimmed at its minimum at index 1, dropping the
        // -40 skirt; the upper tail has no interior minimum
        assert!(almost_equal(levels.rs.unwrap(), -1.0 + 42.0, 1E-12));
    }

    #[test]
    fn bandpass_without_stopband_is_inconclusive() {
        let mag = [-3.0, 0.0, -3.0];
        let freqs = grid(mag.len());
        let res = band_levels(
            &mag,
            &freqs,
            &shape(FilterFamily::Bandpass, 10.0, Some(0.1)),
            &InferencePolicy::default(),
        );
        assert!(matches!(res, Err(Error::InconclusiveShape(_))));
    }

    #[test]
    fn notch_single_minimum() {
        let mag = [0.0, -0.2, -0.1, -10.0, -60.0, -10.0, -0.3, 0.0, -0.1];
        let freqs = grid(mag.len());
        // window 40 +- 10 Hz: indices 3..=5
        let levels = band_levels(
            &mag,
            &freqs,
            &shape(FilterFamily::Notch, 40.0, Some(2.0)),
            &InferencePolicy::default(),
        )
        .unwrap();
        // lower tail [0, -0.2, -0.1] has no interior maximum, upper tail
        // [-0.3, 0, -0.1] is trimmed at its maximum: [0, -0.1]
        assert!(almost_equal(levels.rp.unwrap(), 0.2, 1E-12));
        assert!(almost_equal(levels.rs.unwrap(), -0.2 + 60.0, 1E-12));
    }

    #[test]
    fn notch_between_several_minima() {
        let mag = [
            0.0, -0.1, 0.0, -20.0, -50.0, -30.0, -50.0, -20.0, 0.0, -0.2, 0.0,
        ];
        let freqs = grid(mag.len());
        // window 50 +- 25 Hz: indices 3..=7
        let levels = band_levels(
            &mag,
            &freqs,
            &shape(FilterFamily::Notch, 50.0, Some(1.0)),
            &InferencePolicy::default(),
        )
        .unwrap();
        assert!(almost_equal(levels.rp.unwrap(), 0.2, 1E-12));
        // center is the bump between the two nulls
        assert!(almost_equal(levels.rs.unwrap(), -0.2 + 30.0, 1E-12));
    }

    #[test]
    fn bandpass_window_without_interior_peak() {
        let mag = [
            -40.0, -45.0, -30.0, -10.0, -4.0, -2.0, -1.0, -20.0, -50.0, -48.0, -60.0,
        ];
        let freqs = grid(mag.len());
        // window 40 +- 20 Hz: indices 2..=6, rising all the way
        let levels = band_levels(
            &mag,
            &freqs,
            &shape(FilterFamily::Bandpass, 40.0, Some(1.0)),
            &InferencePolicy::default(),
        )
        .unwrap();
        // the window maximum is the center gain
        assert_eq!(levels.rp, Some(0.0));
        // lower tail [-40, -45] is kept whole, upper tail is trimmed at its
        // minimum: [-50, -48, -60]
        assert!(almost_equal(levels.rs.unwrap(), -1.0 + 40.0, 1E-12));
    }

    #[test]
    fn notch_window_is_the_stopband() {
        let freqs = grid(101);
        let window = passband_window(
            &freqs,
            &shape(FilterFamily::Notch, 500.0, Some(5.0)),
            &InferencePolicy::default(),
        )
        .unwrap();
        assert_eq!(window, 45..56);
    }

    #[test]
    fn unknown_has_no_levels() {
        let mag = [0.0; 4];
        let shape = Shape {
            family: FilterFamily::Unknown,
            f0: None,
            q: None,
        };
        let policy = InferencePolicy::default();
        let levels = band_levels(&mag, &grid(4), &shape, &policy).unwrap();
        assert_eq!(levels, BandLevels::default());
        assert_eq!(passband_window(&grid(4), &shape, &policy).unwrap(), 0..4);
    }

    #[test]
    fn band_window_without_q() {
        // default bandwidth is a tenth of the 1000 Hz span
        let freqs = grid(101);
        let window = passband_window(
            &freqs,
            &shape(FilterFamily::Bandpass, 500.0, None),
            &InferencePolicy::default(),
        )
        .unwrap();
        assert_eq!(window, 45..56);
    }
}
