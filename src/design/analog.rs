//! From an analog lowpass prototype with unit cutoff to a digital filter:
//! frequency transformation in the s-plane, then the bilinear transform.

use std::f64::consts::PI;

use anyhow::anyhow;
use num::{complex::Complex64, One, Zero};

use super::BandEdges;
use crate::{Error, Result, ZeroPoleGain};

/// With this sample rate, frequencies normalized to Nyquist can be used
/// as they are.
pub(super) const NORMALIZED_FS: f64 = 2.0;

/// Transform `prototype` to the band described by `band` and discretize it.
///
/// Critical frequencies are pre-warped so they land exactly where requested
/// after the bilinear transform.
pub(super) fn digitize(prototype: &ZeroPoleGain, band: BandEdges) -> Result<ZeroPoleGain> {
    let warp = |w: f64| 2.0 * NORMALIZED_FS * (PI * w / NORMALIZED_FS).tan();
    let analog = match band {
        BandEdges::Lowpass(w) => lp2lp(prototype, warp(w))?,
        BandEdges::Highpass(w) => lp2hp(prototype, warp(w))?,
        BandEdges::Bandpass(lo, hi) => {
            let (lo, hi) = (warp(lo), warp(hi));
            lp2bp(prototype, (lo * hi).sqrt(), hi - lo)?
        }
        BandEdges::Bandstop(lo, hi) => {
            let (lo, hi) = (warp(lo), warp(hi));
            lp2bs(prototype, (lo * hi).sqrt(), hi - lo)?
        }
    };
    bilinear(&analog, NORMALIZED_FS)
}

/// Number of zeros at infinity.
fn relative_degree(zpk: &ZeroPoleGain) -> Result<usize> {
    zpk.poles.len().checked_sub(zpk.zeros.len()).ok_or_else(|| {
        Error::Synthesis(anyhow!(
            "improper prototype with {} zeros and {} poles",
            zpk.zeros.len(),
            zpk.poles.len()
        ))
    })
}

fn powu(x: f64, n: usize) -> f64 {
    std::iter::repeat(x).take(n).product()
}

/// `prod(-zeros) / prod(-poles)`, the gain change when inverting `s`.
fn inversion_gain(zpk: &ZeroPoleGain) -> f64 {
    let num: Complex64 = zpk.zeros.iter().map(|z| -z).product();
    let den: Complex64 = zpk.poles.iter().map(|p| -p).product();
    (num / den).re
}

/// Both solutions `s` of `s + wo^2 / s = 2x`, which map a lowpass root `x`
/// onto a band centered at `wo`.
fn split(roots: &[Complex64], wo: f64) -> Vec<Complex64> {
    let wo2 = Complex64::new(wo * wo, 0.0);
    let root = |x: &Complex64| (x * x - wo2).sqrt();
    roots
        .iter()
        .map(|x| x + root(x))
        .chain(roots.iter().map(|x| x - root(x)))
        .collect()
}

fn lp2lp(zpk: &ZeroPoleGain, wo: f64) -> Result<ZeroPoleGain> {
    let degree = relative_degree(zpk)?;
    Ok(ZeroPoleGain {
        zeros: zpk.zeros.iter().map(|z| z * wo).collect(),
        poles: zpk.poles.iter().map(|p| p * wo).collect(),
        gain: zpk.gain * powu(wo, degree),
    })
}

fn lp2hp(zpk: &ZeroPoleGain, wo: f64) -> Result<ZeroPoleGain> {
    let degree = relative_degree(zpk)?;
    let wo = Complex64::new(wo, 0.0);
    let mut zeros: Vec<_> = zpk.zeros.iter().map(|z| wo / z).collect();
    // zeros at infinity move to the origin
    zeros.extend(std::iter::repeat(Complex64::zero()).take(degree));
    Ok(ZeroPoleGain {
        zeros,
        poles: zpk.poles.iter().map(|p| wo / p).collect(),
        gain: zpk.gain * inversion_gain(zpk),
    })
}

fn lp2bp(zpk: &ZeroPoleGain, wo: f64, bw: f64) -> Result<ZeroPoleGain> {
    let degree = relative_degree(zpk)?;
    let scale = |roots: &[Complex64]| roots.iter().map(|r| r * bw / 2.0).collect::<Vec<_>>();
    let mut zeros = split(&scale(&zpk.zeros), wo);
    zeros.extend(std::iter::repeat(Complex64::zero()).take(degree));
    Ok(ZeroPoleGain {
        zeros,
        poles: split(&scale(&zpk.poles), wo),
        gain: zpk.gain * powu(bw, degree),
    })
}

fn lp2bs(zpk: &ZeroPoleGain, wo: f64, bw: f64) -> Result<ZeroPoleGain> {
    let degree = relative_degree(zpk)?;
    let half = Complex64::new(bw / 2.0, 0.0);
    let invert = |roots: &[Complex64]| roots.iter().map(|r| half / r).collect::<Vec<_>>();
    let mut zeros = split(&invert(&zpk.zeros), wo);
    // zeros at infinity move to the center of the stopband
    let center = Complex64::new(0.0, wo);
    zeros.extend(std::iter::repeat(center).take(degree));
    zeros.extend(std::iter::repeat(center.conj()).take(degree));
    Ok(ZeroPoleGain {
        zeros,
        poles: split(&invert(&zpk.poles), wo),
        gain: zpk.gain * inversion_gain(zpk),
    })
}

fn bilinear(zpk: &ZeroPoleGain, fs: f64) -> Result<ZeroPoleGain> {
    let degree = relative_degree(zpk)?;
    let fs2 = Complex64::new(2.0 * fs, 0.0);
    let map = |s: &Complex64| (fs2 + s) / (fs2 - s);

    let mut zeros: Vec<_> = zpk.zeros.iter().map(map).collect();
    // zeros at infinity move to Nyquist
    zeros.extend(std::iter::repeat(-Complex64::one()).take(degree));
    let num: Complex64 = zpk.zeros.iter().map(|z| fs2 - z).product();
    let den: Complex64 = zpk.poles.iter().map(|p| fs2 - p).product();
    Ok(ZeroPoleGain {
        zeros,
        poles: zpk.poles.iter().map(map).collect(),
        gain: zpk.gain * (num / den).re,
    })
}
