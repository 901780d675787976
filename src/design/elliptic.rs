//! Elliptic (Cauer) analog lowpass prototype, and the elliptic integrals
//! and Jacobi functions it is built from.
//!
//! Parameters are given as `m = k^2` throughout.

use std::f64::consts::{FRAC_PI_2, PI};

use anyhow::anyhow;
use itertools::Itertools;
use num::complex::Complex64;

use super::chebyshev::deviation_sq;
use crate::{Error, Result, ZeroPoleGain};

/// Terms of the nome series used to solve the degree equation.
const NOME_TERMS: i32 = 7;

/// Descending Landen steps allowed before giving up.
const MAX_LANDEN_STEPS: usize = 10;

/// Upper bound on AGM steps, it converges quadratically.
const MAX_AGM_STEPS: usize = 64;

/// Arithmetic-geometric mean of two positive numbers.
fn agm(mut a: f64, mut b: f64) -> f64 {
    for _ in 0..MAX_AGM_STEPS {
        if (a - b).abs() <= f64::EPSILON * a {
            break;
        }
        (a, b) = ((a + b) / 2.0, (a * b).sqrt());
    }
    a
}

/// Complete elliptic integral of the first kind, `K(m)`.
fn ellipk(m: f64) -> f64 {
    FRAC_PI_2 / agm(1.0, (1.0 - m).sqrt())
}

/// `K(1 - m)` without the cancellation of computing `1 - m` first.
fn ellipk_complement(m: f64) -> f64 {
    FRAC_PI_2 / agm(1.0, m.sqrt())
}

/// Jacobi elliptic functions `(sn, cn, dn)` of `u` with parameter `m`, by
/// the descending AGM.
fn ellipj(u: f64, m: f64) -> (f64, f64, f64) {
    const MACHEP: f64 = f64::EPSILON / 2.0;

    if m < 1E-9 {
        let (t, b) = u.sin_cos();
        let ai = 0.25 * m * (u - t * b);
        return (t - ai * b, b + ai * t, 1.0 - 0.5 * m * t * t);
    }
    if m >= 0.999_999_999_9 {
        let ai = 0.25 * (1.0 - m);
        let b = u.cosh();
        let t = u.tanh();
        let phi = 1.0 / b;
        let twon = b * u.sinh();
        let sn = t + ai * (twon - u) / (b * b);
        let ai = ai * t * phi;
        return (sn, phi - ai * (twon - u), phi + ai * (twon + u));
    }

    let mut a = [0.0; 9];
    let mut c = [0.0; 9];
    a[0] = 1.0;
    c[0] = m.sqrt();
    let mut b = (1.0 - m).sqrt();
    let mut twon = 1.0;
    let mut i = 0;
    while (c[i] / a[i]).abs() > MACHEP && i < 8 {
        let ai = a[i];
        i += 1;
        c[i] = (ai - b) / 2.0;
        a[i] = (ai + b) / 2.0;
        b = (ai * b).sqrt();
        twon *= 2.0;
    }

    let mut phi = twon * a[i] * u;
    let mut prev = phi;
    while i > 0 {
        let t = c[i] * phi.sin() / a[i];
        prev = phi;
        phi = (t.asin() + phi) / 2.0;
        i -= 1;
    }
    let (sn, cn) = phi.sin_cos();
    (sn, cn, cn / (phi - prev).cos())
}

/// Inverse of `sn` for complex arguments, by descending Landen
/// transformations.
fn arc_jac_sn(w: Complex64, m: f64) -> Result<Complex64> {
    let complement = |k: f64| ((1.0 - k) * (1.0 + k)).sqrt();
    let k = m.sqrt();
    if !(0.0..1.0).contains(&k) {
        return Err(Error::domain(format!("elliptic modulus {k} is outside [0, 1)")));
    }

    let mut ks = vec![k];
    while let Some(&last) = ks.last().filter(|&&k| k != 0.0) {
        if ks.len() > MAX_LANDEN_STEPS {
            return Err(Error::Synthesis(anyhow!(
                "Landen transformation did not converge for m = {m}"
            )));
        }
        let kp = complement(last);
        ks.push((1.0 - kp) / (1.0 + kp));
    }

    let big_k = ks[1..].iter().map(|k| 1.0 + k).product::<f64>() * FRAC_PI_2;
    let wn = ks.iter().tuple_windows().fold(w, |wn, (&kn, &knext)| {
        let x = kn * wn;
        2.0 * wn / ((1.0 + knext) * (1.0 + ((1.0 - x) * (1.0 + x)).sqrt()))
    });
    Ok(big_k * wn.asin() * 2.0 / PI)
}

/// Real inverse of `sc = sn / cn`.
fn arc_jac_sc1(w: f64, m: f64) -> Result<f64> {
    let z = arc_jac_sn(Complex64::new(0.0, w), m)?;
    if z.re.abs() > 1E-14 {
        return Err(Error::Synthesis(anyhow!(
            "inverse of sc has a real part of {}",
            z.re
        )));
    }
    Ok(z.im)
}

/// Solve the degree equation for the parameter `m` of an order `n` filter
/// with discrimination parameter `m1`.
fn degree(n: f64, m1: f64) -> f64 {
    let q1 = (-PI * ellipk_complement(m1) / ellipk(m1)).exp();
    let q = q1.powf(1.0 / n);
    let num: f64 = (0..=NOME_TERMS).map(|m| q.powi(m * (m + 1))).sum();
    let den = 1.0 + 2.0 * (1..=NOME_TERMS + 1).map(|m| q.powi(m * m)).sum::<f64>();
    16.0 * q * (num / den).powi(4)
}

/// Equiripple passband of `rp` dB up to the cutoff and equiripple stopband
/// `rs` dB down.
///
/// # Errors
/// - [`Error::Domain`]: `rs` does not exceed `rp`
/// - [`Error::Synthesis`]: the inverse Jacobi function did not converge
pub(super) fn prototype(order: u32, rp: f64, rs: f64) -> Result<ZeroPoleGain> {
    let eps_sq = deviation_sq(rp);
    if order == 1 {
        let p = -(1.0 / eps_sq).sqrt();
        return Ok(ZeroPoleGain {
            zeros: vec![],
            poles: vec![Complex64::new(p, 0.0)],
            gain: -p,
        });
    }

    let ck1_sq = eps_sq / deviation_sq(rs);
    if !(ck1_sq > 0.0 && ck1_sq < 1.0) {
        return Err(Error::domain(format!(
            "stopband attenuation ({rs} dB) must exceed the passband ripple ({rp} dB)"
        )));
    }

    let n = f64::from(order);
    let m = degree(n, ck1_sq);
    let capk = ellipk(m);
    let sncd = (1 - order % 2..order)
        .step_by(2)
        .map(|j| ellipj(f64::from(j) * capk / n, m))
        .collect_vec();

    let zeros_upper = sncd
        .iter()
        .filter(|(s, _, _)| s.abs() > f64::EPSILON)
        .map(|(s, _, _)| Complex64::new(0.0, 1.0 / (m.sqrt() * s)))
        .collect_vec();

    let r = arc_jac_sc1(1.0 / eps_sq.sqrt(), ck1_sq)?;
    let v0 = capk * r / (n * ellipk(ck1_sq));
    let (sv, cv, dv) = ellipj(v0, 1.0 - m);
    let poles_upper = sncd
        .iter()
        .map(|&(s, c, d)| -Complex64::new(c * d * sv * cv, s * dv) / (1.0 - (d * sv).powi(2)))
        .collect_vec();

    let conj = |roots: &[Complex64]| roots.iter().map(Complex64::conj).collect_vec();
    let zeros = [zeros_upper.clone(), conj(&zeros_upper)].concat();
    let poles = if order % 2 == 1 {
        let norm = poles_upper.iter().map(Complex64::norm_sqr).sum::<f64>().sqrt();
        // the real pole only appears once
        let complex = poles_upper
            .iter()
            .copied()
            .filter(|p| p.im.abs() > f64::EPSILON * norm)
            .collect_vec();
        [poles_upper, conj(&complex)].concat()
    } else {
        [poles_upper.clone(), conj(&poles_upper)].concat()
    };

    let num: Complex64 = poles.iter().map(|p| -p).product();
    let den: Complex64 = zeros.iter().map(|z| -z).product();
    let mut gain = (num / den).re;
    if order % 2 == 0 {
        gain /= (1.0 + eps_sq).sqrt();
    }
    log::trace!("elliptic prototype: m = {m}, zeros {zeros:?}, poles {poles:?}");
    Ok(ZeroPoleGain { zeros, poles, gain })
}
