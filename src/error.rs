use num::complex::Complex64;
use thiserror::Error;

use crate::roots;

/// The top-level error type for this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The filter family is not one this crate knows how to handle.
    #[error("unsupported filter family: {0}")]
    UnsupportedFamily(String),

    /// The synthesis method is unknown or cannot be routed.
    #[error("unsupported synthesis method: {0}")]
    UnsupportedMethod(String),

    /// The transfer function is degenerate, e.g. it has a pole on the
    /// sampling grid or a zero leading denominator coefficient.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// The response does not contain the extremum or threshold crossing an
    /// extraction step needs.
    #[error("inconclusive response shape: {0}")]
    InconclusiveShape(String),

    /// A parameter is outside of its domain (non-positive Q, zero order...).
    #[error("parameter out of domain: {0}")]
    Domain(String),

    /// Pole/zero extraction did not converge. The best guesses so far are
    /// attached.
    #[error("root finder did not converge")]
    RootsNoConverge { partial: Vec<Complex64> },

    /// The classical synthesis collaborator failed.
    #[error("classical synthesis failed: {0}")]
    Synthesis(#[source] anyhow::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<roots::Error<Vec<Complex64>>> for Error {
    fn from(value: roots::Error<Vec<Complex64>>) -> Self {
        match value {
            roots::Error::NoConverge(partial) => Self::RootsNoConverge { partial },
            roots::Error::Other(o) => Self::Other(o),
        }
    }
}

impl Error {
    pub(crate) fn inconclusive(what: impl Into<String>) -> Self {
        Self::InconclusiveShape(what.into())
    }

    pub(crate) fn domain(what: impl Into<String>) -> Self {
        Self::Domain(what.into())
    }

    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidFilter(what.into())
    }
}
