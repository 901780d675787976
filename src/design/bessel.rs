//! Bessel-Thomson analog lowpass prototype.

use crate::{Error, Poly, Result, ZeroPoleGain};

const ROOTS_EPSILON: f64 = 1E-14;
const ROOTS_MAX_ITER: usize = 1000;

/// All-pole prototype with maximally flat group delay. The poles are scaled
/// so the magnitude asymptotes match a Butterworth of the same order.
///
/// # Errors
/// - [`Error::Domain`]: the order is too high for the coefficients to fit
///   an `f64`
/// - [`Error::RootsNoConverge`]: the poles could not be found
pub(super) fn prototype(order: u32) -> Result<ZeroPoleGain> {
    let n = usize::try_from(order).map_err(|_| Error::domain("bessel order too high"))?;
    let theta = Poly::reverse_bessel(n)
        .ok_or_else(|| Error::domain(format!("bessel order {order} is too high")))?;

    // theta is monic, so the constant term is the product of the negated
    // roots. Scaling it to 1 gives unit DC gain with k = 1.
    let constant = theta.as_slice()[0].re;
    let scale = constant.powf(-1.0 / f64::from(order));
    let poles = theta
        .roots(ROOTS_EPSILON, ROOTS_MAX_ITER)?
        .into_iter()
        .map(|p| p * scale)
        .collect();
    Ok(ZeroPoleGain {
        zeros: vec![],
        poles,
        gain: 1.0,
    })
}
