use std::{fmt::Display, str::FromStr};

use crate::{Error, Result};

/// Sample rate used when a specification does not name one.
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.0;

/// Shape of a filter's magnitude response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterFamily {
    Lowpass,
    Highpass,
    Bandpass,
    /// Band-stop
    Notch,
    /// Could not be classified
    Unknown,
}

/// How a filter was (or could have been) synthesized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SynthesisMethod {
    /// RBJ cookbook second-order section
    Biquad,
    Butterworth,
    /// Chebyshev type I, equiripple passband
    Cheby1,
    /// Chebyshev type II, equiripple stopband
    Cheby2,
    Elliptic,
    Bessel,
    Unknown,
}

impl FilterFamily {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lowpass => "lowpass",
            Self::Highpass => "highpass",
            Self::Bandpass => "bandpass",
            Self::Notch => "notch",
            Self::Unknown => "unknown",
        }
    }

    /// Bandpass and notch are characterized by a center and a bandwidth.
    #[must_use]
    pub const fn is_band(self) -> bool {
        matches!(self, Self::Bandpass | Self::Notch)
    }
}

impl SynthesisMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Biquad => "biquad",
            Self::Butterworth => "butterworth",
            Self::Cheby1 => "cheby1",
            Self::Cheby2 => "cheby2",
            Self::Elliptic => "elliptic",
            Self::Bessel => "bessel",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for FilterFamily {
    type Err = Error;

    /// ```
    /// use iir_infer::FilterFamily;
    ///
    /// assert_eq!("bandstop".parse::<FilterFamily>().unwrap(), FilterFamily::Notch);
    /// assert!("allpass".parse::<FilterFamily>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowpass" => Ok(Self::Lowpass),
            "highpass" => Ok(Self::Highpass),
            "bandpass" => Ok(Self::Bandpass),
            "notch" | "bandstop" => Ok(Self::Notch),
            "unknown" => Ok(Self::Unknown),
            _ => Err(Error::UnsupportedFamily(s.to_owned())),
        }
    }
}

impl FromStr for SynthesisMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "biquad" => Ok(Self::Biquad),
            "butterworth" | "butter" => Ok(Self::Butterworth),
            "cheby1" => Ok(Self::Cheby1),
            "cheby2" => Ok(Self::Cheby2),
            "elliptic" | "ellip" => Ok(Self::Elliptic),
            "bessel" => Ok(Self::Bessel),
            "unknown" => Ok(Self::Unknown),
            _ => Err(Error::UnsupportedMethod(s.to_owned())),
        }
    }
}

impl Display for FilterFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for SynthesisMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to synthesize a filter.
///
/// `q` only matters for biquads and for the bandwidth of band filters, `rp`
/// and `rs` only for the methods that need them (cheby1: `rp`, cheby2: `rs`,
/// elliptic: both).
#[derive(Clone, Debug, PartialEq)]
pub struct FilterSpecification {
    pub family: FilterFamily,
    /// Cutoff (lowpass/highpass) or center (bandpass/notch) frequency in Hz
    pub f0: Option<f64>,
    pub q: Option<f64>,
    pub order: u32,
    pub method: SynthesisMethod,
    /// Passband ripple in dB
    pub rp: Option<f64>,
    /// Stopband attenuation in dB
    pub rs: Option<f64>,
    /// Sample rate in Hz
    pub fs: f64,
}

impl FilterSpecification {
    /// Second-order RBJ section.
    ///
    /// ```
    /// use iir_infer::{FilterFamily, FilterSpecification, SynthesisMethod};
    ///
    /// let spec = FilterSpecification::biquad(FilterFamily::Bandpass, 1000.0, 5.0, 48_000.0);
    /// assert_eq!(spec.order, 2);
    /// assert_eq!(spec.method, SynthesisMethod::Biquad);
    /// ```
    #[must_use]
    pub const fn biquad(family: FilterFamily, f0: f64, q: f64, fs: f64) -> Self {
        Self {
            family,
            f0: Some(f0),
            q: Some(q),
            order: 2,
            method: SynthesisMethod::Biquad,
            rp: None,
            rs: None,
            fs,
        }
    }

    /// A classical design, ripple and attenuation left unset.
    #[must_use]
    pub const fn classical(
        family: FilterFamily,
        method: SynthesisMethod,
        order: u32,
        f0: f64,
        fs: f64,
    ) -> Self {
        Self {
            family,
            f0: Some(f0),
            q: None,
            order,
            method,
            rp: None,
            rs: None,
            fs,
        }
    }

    #[must_use]
    pub fn with_q(mut self, q: f64) -> Self {
        self.q = Some(q);
        self
    }

    #[must_use]
    pub fn with_ripple(mut self, rp: f64) -> Self {
        self.rp = Some(rp);
        self
    }

    #[must_use]
    pub fn with_attenuation(mut self, rs: f64) -> Self {
        self.rs = Some(rs);
        self
    }

    #[must_use]
    pub fn with_sample_rate(mut self, fs: f64) -> Self {
        self.fs = fs;
        self
    }
}

impl Display for FilterSpecification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "family: {}", self.family)?;
        writeln!(f, "f0: {}", fmt_opt(self.f0))?;
        writeln!(f, "Q: {}", fmt_opt(self.q))?;
        writeln!(f, "order: {}", self.order)?;
        writeln!(f, "method: {}", self.method)?;
        writeln!(f, "rp: {}", fmt_opt(self.rp))?;
        writeln!(f, "rs: {}", fmt_opt(self.rs))?;
        write!(f, "fs: {}", self.fs)
    }
}

pub(crate) fn fmt_opt(x: Option<f64>) -> String {
    x.map_or_else(|| "None".to_owned(), |x| format!("{x}"))
}

#[cfg(test)]
mod test {
    use super::{FilterFamily, FilterSpecification, SynthesisMethod};
    use crate::Error;

    #[test]
    fn parse_family() {
        assert_eq!("LowPass".parse::<FilterFamily>().unwrap(), FilterFamily::Lowpass);
        assert!(matches!(
            "shelf".parse::<FilterFamily>(),
            Err(Error::UnsupportedFamily(s)) if s == "shelf"
        ));
    }

    #[test]
    fn parse_method_aliases() {
        assert_eq!(
            "butter".parse::<SynthesisMethod>().unwrap(),
            SynthesisMethod::Butterworth
        );
        assert_eq!(
            "ellip".parse::<SynthesisMethod>().unwrap(),
            SynthesisMethod::Elliptic
        );
        assert!(matches!(
            "kaiser".parse::<SynthesisMethod>(),
            Err(Error::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for m in [
            SynthesisMethod::Biquad,
            SynthesisMethod::Butterworth,
            SynthesisMethod::Cheby1,
            SynthesisMethod::Cheby2,
            SynthesisMethod::Elliptic,
            SynthesisMethod::Bessel,
        ] {
            assert_eq!(m.to_string().parse::<SynthesisMethod>().unwrap(), m);
        }
    }

    #[test]
    fn builders() {
        let spec = FilterSpecification::classical(
            FilterFamily::Lowpass,
            SynthesisMethod::Elliptic,
            4,
            1000.0,
            44_100.0,
        )
        .with_ripple(0.5)
        .with_attenuation(40.0);
        assert_eq!(spec.rp, Some(0.5));
        assert_eq!(spec.rs, Some(40.0));
        assert_eq!(spec.q, None);
    }
}
