//! Macros for reducing doc comment boilerplate.

/// Default explanation for [`crate::roots::Error::NoConverge`] errors.
macro_rules! errors_no_converge {
    () => {
        r"- `NoConverge`: the root finder did not converge within the given constraints. The best guess so far is returned with the error.
"
    };
}
pub(crate) use errors_no_converge;

/// Explanation of [`crate::Error::InconclusiveShape`] for extraction steps.
macro_rules! errors_inconclusive {
    () => {
        r"- [`Error::InconclusiveShape`](crate::Error::InconclusiveShape): the response has no sample satisfying a threshold crossing, or a window the extraction needs is empty.
"
    };
}
pub(crate) use errors_inconclusive;

/// Explanation of [`crate::Error::InvalidFilter`] for sampling steps.
macro_rules! errors_invalid_filter {
    () => {
        r"- [`Error::InvalidFilter`](crate::Error::InvalidFilter): the denominator vanishes on the sampling grid (a pole on the unit circle at a sampled frequency).
"
    };
}
pub(crate) use errors_invalid_filter;
