//! Index searches over sampled curves.
//!
//! Extrema are strict: a sample is a local maximum (minimum) only if it is
//! greater (smaller) than both neighbours, so endpoints and plateaus never
//! qualify.

use itertools::Itertools;

/// Indices of the strict local maxima of `v`, ascending.
pub(crate) fn local_maxima(v: &[f64]) -> Vec<usize> {
    v.iter()
        .tuple_windows()
        .positions(|(a, b, c)| b > a && b > c)
        .map(|i| i + 1)
        .collect()
}

/// Indices of the strict local minima of `v`, ascending.
pub(crate) fn local_minima(v: &[f64]) -> Vec<usize> {
    v.iter()
        .tuple_windows()
        .positions(|(a, b, c)| b < a && b < c)
        .map(|i| i + 1)
        .collect()
}

/// Index of the first occurrence of the maximum.
pub(crate) fn argmax(v: &[f64]) -> Option<usize> {
    v.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &x)| match best {
            Some((_, b)) if x <= b => best,
            _ => Some((i, x)),
        })
        .map(|(i, _)| i)
}

/// Index of the first occurrence of the minimum.
pub(crate) fn argmin(v: &[f64]) -> Option<usize> {
    v.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &x)| match best {
            Some((_, b)) if x >= b => best,
            _ => Some((i, x)),
        })
        .map(|(i, _)| i)
}

/// Largest value, `None` when empty.
pub(crate) fn max_of(v: &[f64]) -> Option<f64> {
    v.iter().copied().reduce(f64::max)
}

/// Smallest value, `None` when empty.
pub(crate) fn min_of(v: &[f64]) -> Option<f64> {
    v.iter().copied().reduce(f64::min)
}
