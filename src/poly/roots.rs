use num::{complex::Complex64, Zero};

use crate::{util::doc_macros::errors_no_converge, Poly};

mod aberth_ehrlich;
pub use aberth_ehrlich::aberth_ehrlich;
mod initial_guess;
pub use initial_guess::{initial_guesses_annulus, initial_guesses_random};
mod newton;
pub use newton::newton_polish;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error<T> {
    #[error("root finder did not converge within the given constraints")]
    NoConverge(T),

    #[error("unexpected error while running root finder")]
    Other(#[from] anyhow::Error),
}

pub type Result = std::result::Result<Vec<Complex64>, Error<Vec<Complex64>>>;

/// Seeds used for the initial guesses, one per attempt.
const GUESS_SEEDS: [u64; 3] = [1, 2, 3];

/// Newton steps used to polish roots after Aberth-Ehrlich has converged.
const POLISH_ITER: usize = 8;

impl Poly {
    /// A convenient way of finding all roots, with a pre-configured root finder.
    /// Works well for the low degree real polynomials that make up IIR filters.
    ///
    /// Zero roots are factored out first, degrees 1 and 2 are solved in closed
    /// form, everything else goes through [`aberth_ehrlich`] with annulus
    /// guesses, then random guesses if that gets stuck, and the result is
    /// polished with a few Newton steps.
    ///
    /// # Errors
    #[doc = errors_no_converge!()]
    /// - `Other`: the guesses were degenerate (e.g. not distinct)
    ///
    /// # Examples
    /// ```
    /// use iir_infer::Poly;
    ///
    /// // x^2 - 3x + 2
    /// let p = Poly::from_real_slice(&[2.0, -3.0, 1.0]);
    /// let mut roots = p.roots(1E-14, 100).unwrap();
    /// roots.sort_by(|a, b| a.re.total_cmp(&b.re));
    /// assert!((roots[0].re - 1.0).abs() < 1E-12);
    /// assert!((roots[1].re - 2.0).abs() < 1E-12);
    /// ```
    pub fn roots(&self, epsilon: f64, max_iter: usize) -> Result {
        debug_assert!(self.is_normalized());

        let mut this = self.clone();
        let mut roots = this.zero_roots(epsilon);

        match this.degree_raw() {
            0 => return Ok(roots),
            1 => {
                roots.extend(this.linear_roots());
                return Ok(roots);
            }
            2 => {
                roots.extend(this.quadratic_roots());
                return Ok(roots);
            }
            _ => {}
        }

        this.make_monic();
        let n = this.degree_raw();
        let mut guesses = vec![Complex64::zero(); n];
        let mut last_err = None;

        for (attempt, seed) in GUESS_SEEDS.into_iter().enumerate() {
            if attempt == 0 {
                initial_guesses_annulus(&this, seed, 0.5, 0.5, &mut guesses);
            } else {
                log::debug!("root finder stuck, retrying with random guesses (seed {seed})");
                initial_guesses_random(&this, seed, &mut guesses);
            }

            match aberth_ehrlich(&this, Some(epsilon), Some(max_iter), &guesses) {
                Ok(found) => {
                    roots.extend(newton_polish(&this, &found, POLISH_ITER));
                    return Ok(roots);
                }
                Err(e) => last_err = Some(e),
            }
        }

        match last_err {
            Some(Error::NoConverge(partial)) => {
                roots.extend(partial);
                Err(Error::NoConverge(roots))
            }
            Some(e) => Err(e),
            None => unreachable!("at least one attempt is always made"),
        }
    }
}

// private
impl Poly {
    fn zero_roots(&mut self, epsilon: f64) -> Vec<Complex64> {
        debug_assert!(self.is_normalized());

        let mut roots = vec![];
        while self.degree_raw() > 0 && self.0[0].norm() <= epsilon {
            roots.push(Complex64::zero());
            // deflating zero roots can be accomplished simply by shifting
            *self = self.shift_down(1);
        }

        roots
    }

    fn linear_roots(&mut self) -> Vec<Complex64> {
        debug_assert_eq!(self.degree_raw(), 1);

        let a = self.0[1];
        let b = self.0[0];

        // we found all the roots
        *self = Self::one();

        vec![-b / a]
    }

    /// Quadratic formula, in the form that avoids cancellation between `b`
    /// and the square root of the discriminant.
    fn quadratic_roots(&mut self) -> Vec<Complex64> {
        debug_assert_eq!(self.degree_raw(), 2);

        let a = self.0[2];
        let b = self.0[1];
        let c = self.0[0];

        let sqrt_disc = (b * b - a * c * 4.0).sqrt();
        let q = if (b + sqrt_disc).norm_sqr() >= (b - sqrt_disc).norm_sqr() {
            (b + sqrt_disc) * -0.5
        } else {
            (b - sqrt_disc) * -0.5
        };

        // we found all the roots
        *self = Self::one();

        // q can only vanish when b and c both do, which zero_roots rules out
        vec![q / a, c / q]
    }
}
