// internal utilities for dealing with Complex annoyances

use std::cmp::Ordering;

use num::{complex::Complex64, One, Zero};

// sort a slice of complex numbers lexicographically, using their real part first
pub(crate) fn complex_sort_mut(v: &mut [Complex64]) {
    v.sort_by(|a, b| {
        let re_ord = a.re.partial_cmp(&b.re).unwrap_or(Ordering::Equal);
        if re_ord != Ordering::Equal {
            return re_ord;
        }
        a.im.partial_cmp(&b.im).unwrap_or(Ordering::Equal)
    });
}

/// formatting for Complex, the `Display` implementation prints `0i` for
/// every real number, which is noisy for filter coefficients
pub(crate) fn complex_fmt<T: std::fmt::Display + Zero + One + PartialEq>(
    c: &num::Complex<T>,
) -> String {
    let r = &c.re;
    let i = &c.im;
    if i.is_zero() {
        format!("{r}")
    } else if i.is_one() {
        format!("({r}+i)")
    } else {
        format!("({r}+i{i})")
    }
}

/// Zero out imaginary parts that are only rounding noise, so real roots of
/// real polynomials print and compare as real.
pub(crate) fn snap_real(z: Complex64, tolerance: f64) -> Complex64 {
    if z.im.abs() <= tolerance * z.re.abs().max(1.0) {
        Complex64::new(z.re, 0.0)
    } else {
        z
    }
}
