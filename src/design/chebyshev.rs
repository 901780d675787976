//! Chebyshev analog lowpass prototypes with unit cutoff.

use std::f64::consts::PI;

use itertools::Itertools;
use num::complex::Complex64;

use crate::{Error, Result, ZeroPoleGain};

/// `10^(db/10) - 1`, the squared deviation of a ripple in dB.
pub(super) fn deviation_sq(db: f64) -> f64 {
    10f64.powf(db / 10.0) - 1.0
}

/// `-n+1, -n+3, ..., n-1`
#[allow(clippy::cast_precision_loss)]
fn symmetric_odds(n: u32) -> impl Iterator<Item = f64> + Clone {
    let n = i64::from(n);
    (-n + 1..n).step_by(2).map(|m| m as f64)
}

pub(super) fn positive_db(what: &str, db: Option<f64>) -> Result<f64> {
    match db {
        Some(db) if db.is_finite() && db > 0.0 => Ok(db),
        Some(db) => Err(Error::domain(format!("{what} must be positive, got {db} dB"))),
        None => Err(Error::domain(format!("{what} is required"))),
    }
}

/// Type I: equiripple passband of `rp` dB, the cutoff is where the response
/// leaves the ripple band.
pub(super) fn type1(order: u32, rp: f64) -> ZeroPoleGain {
    let eps_sq = deviation_sq(rp);
    let n = f64::from(order);
    let mu = (1.0 / eps_sq.sqrt()).asinh() / n;
    let poles = symmetric_odds(order)
        .map(|m| -Complex64::new(mu, PI * m / (2.0 * n)).sinh())
        .collect_vec();

    let mut gain = poles.iter().map(|p| -p).product::<Complex64>().re;
    if order % 2 == 0 {
        gain /= (1.0 + eps_sq).sqrt();
    }
    ZeroPoleGain {
        zeros: vec![],
        poles,
        gain,
    }
}

/// Type II: equiripple stopband `rs` dB down, starting at the cutoff.
pub(super) fn type2(order: u32, rs: f64) -> ZeroPoleGain {
    let n = f64::from(order);
    let mu = deviation_sq(rs).sqrt().asinh() / n;

    // for odd orders the zero at m = 0 sits at infinity
    let zeros = symmetric_odds(order)
        .filter(|&m| m != 0.0)
        .map(|m| -(Complex64::i() / (m * PI / (2.0 * n)).sin()).conj())
        .collect_vec();
    let poles = symmetric_odds(order)
        .map(|m| {
            let p = -Complex64::new(0.0, PI * m / (2.0 * n)).exp();
            1.0 / Complex64::new(mu.sinh() * p.re, mu.cosh() * p.im)
        })
        .collect_vec();

    let num: Complex64 = poles.iter().map(|p| -p).product();
    let den: Complex64 = zeros.iter().map(|z| -z).product();
    ZeroPoleGain {
        zeros,
        poles,
        gain: (num / den).re,
    }
}

#[cfg(test)]
mod test {
    use num::complex::Complex64;

    use super::{positive_db, type1, type2};
    use crate::{Error, ZeroPoleGain};

    fn analog_response(zpk: &ZeroPoleGain, w: f64) -> f64 {
        let s = Complex64::new(0.0, w);
        let num: Complex64 = zpk.zeros.iter().map(|z| s - z).product();
        let den: Complex64 = zpk.poles.iter().map(|p| s - p).product();
        (num / den * zpk.gain).norm()
    }

    fn db(x: f64) -> f64 {
        20.0 * x.log10()
    }

    #[test]
    fn type1_ripple() {
        for order in [2, 3, 4, 5] {
            let zpk = type1(order, 1.0);
            assert_eq!(zpk.poles.len(), order as usize);
            assert!(zpk.poles.iter().all(|p| p.re < 0.0));
            // odd orders start at 0 dB, even orders at the bottom of the ripple
            let dc = db(analog_response(&zpk, 0.0));
            let expected = if order % 2 == 0 { -1.0 } else { 0.0 };
            assert!((dc - expected).abs() < 1E-9, "order {order}: {dc}");
            // the response leaves the ripple band at the cutoff
            assert!((db(analog_response(&zpk, 1.0)) + 1.0).abs() < 1E-9);
        }
    }

    #[test]
    fn type2_stopband() {
        for order in [2, 3, 4, 5] {
            let zpk = type2(order, 40.0);
            assert_eq!(zpk.poles.len(), order as usize);
            assert_eq!(zpk.zeros.len(), 2 * (order as usize / 2));
            assert!(zpk.poles.iter().all(|p| p.re < 0.0));
            assert!(db(analog_response(&zpk, 0.0)).abs() < 1E-9);
            assert!((db(analog_response(&zpk, 1.0)) + 40.0).abs() < 1E-9);
            // zeros on the imaginary axis
            assert!(zpk.zeros.iter().all(|z| z.re.abs() < 1E-12));
        }
    }

    #[test]
    fn ripple_must_be_positive() {
        assert_eq!(positive_db("ripple", Some(0.5)).unwrap(), 0.5);
        assert!(matches!(positive_db("ripple", Some(0.0)), Err(Error::Domain(_))));
        assert!(matches!(positive_db("ripple", None), Err(Error::Domain(_))));
    }
}
