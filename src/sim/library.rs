//! Library size factors
//!
//! Size factors are drawn once per replicate on the maximal sample count and
//! then sub-indexed for every sample-size configuration, so within a
//! replicate a sample keeps its factor across the whole sweep.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SimError};
use crate::rng::RMersenneTwister;

/// Generates `nsamples` size factors from the given generator
pub type LibraryFn = Arc<dyn Fn(usize, &mut RMersenneTwister) -> Vec<f64> + Send + Sync>;

/// How per-sample size factors are produced
#[derive(Clone, Default)]
pub enum LibrarySizeModel {
    /// All factors equal to one
    #[default]
    Equal,
    /// Resampled with replacement from a finite pool
    GivenVector(Vec<f64>),
    /// Produced by a generating function
    GivenFunction(LibraryFn),
    /// "Given" mode without a specification; falls back to equal factors
    Unspecified,
}

impl fmt::Debug for LibrarySizeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibrarySizeModel::Equal => f.write_str("Equal"),
            LibrarySizeModel::GivenVector(v) => f.debug_tuple("GivenVector").field(&v.len()).finish(),
            LibrarySizeModel::GivenFunction(_) => f.write_str("GivenFunction(..)"),
            LibrarySizeModel::Unspecified => f.write_str("Unspecified"),
        }
    }
}

impl LibrarySizeModel {
    /// Factors `2^N(0, sd)`, centred on one
    pub fn log2_normal(sd: f64) -> Self {
        LibrarySizeModel::GivenFunction(Arc::new(move |n, rng| {
            (0..n).map(|_| rng.rnorm_with(0.0, sd).exp2()).collect()
        }))
    }

    pub fn validate(&self) -> Result<()> {
        if let LibrarySizeModel::GivenVector(pool) = self {
            if pool.is_empty() {
                return Err(SimError::InvalidInput {
                    reason: "library size pool is empty".to_string(),
                });
            }
            check_factors(pool)?;
        }
        Ok(())
    }

    /// Size factor per sample
    pub fn size_factors(&self, nsamples: usize, rng: &mut RMersenneTwister) -> Result<Vec<f64>> {
        let factors = match self {
            LibrarySizeModel::Equal => vec![1.0; nsamples],
            LibrarySizeModel::Unspecified => {
                log::debug!("no library size specification given, using equal factors");
                vec![1.0; nsamples]
            }
            LibrarySizeModel::GivenVector(pool) => {
                if pool.is_empty() {
                    return Err(SimError::InvalidInput {
                        reason: "library size pool is empty".to_string(),
                    });
                }
                rng.sample_with_replacement(pool, nsamples)
            }
            LibrarySizeModel::GivenFunction(f) => f(nsamples, rng),
        };

        if factors.len() != nsamples {
            return Err(SimError::DimensionMismatch {
                expected: format!("{} size factors", nsamples),
                got: format!("{} size factors", factors.len()),
            });
        }
        check_factors(&factors)?;
        Ok(factors)
    }
}

fn check_factors(factors: &[f64]) -> Result<()> {
    match factors.iter().find(|&&f| !(f.is_finite() && f > 0.0)) {
        Some(bad) => Err(SimError::InvalidInput {
            reason: format!("size factors must be positive and finite, got {}", bad),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_and_unspecified() {
        let mut rng = RMersenneTwister::new(1);
        assert_eq!(LibrarySizeModel::Equal.size_factors(4, &mut rng).unwrap(), vec![1.0; 4]);
        assert_eq!(LibrarySizeModel::Unspecified.size_factors(3, &mut rng).unwrap(), vec![1.0; 3]);
    }

    #[test]
    fn test_vector_resampled_to_length() {
        let mut rng = RMersenneTwister::new(2);
        let pool = vec![0.5, 1.5];
        let sf = LibrarySizeModel::GivenVector(pool.clone())
            .size_factors(10, &mut rng)
            .unwrap();
        assert_eq!(sf.len(), 10);
        assert!(sf.iter().all(|f| pool.contains(f)));
    }

    #[test]
    fn test_function_called_with_sample_count() {
        let mut rng = RMersenneTwister::new(3);
        let sf = LibrarySizeModel::log2_normal(0.25).size_factors(6, &mut rng).unwrap();
        assert_eq!(sf.len(), 6);
        assert!(sf.iter().all(|&f| f > 0.0));
    }

    #[test]
    fn test_bad_function_output_rejected() {
        let mut rng = RMersenneTwister::new(3);
        let short = LibrarySizeModel::GivenFunction(Arc::new(|_, _| vec![1.0]));
        assert!(short.size_factors(4, &mut rng).is_err());

        let negative = LibrarySizeModel::GivenFunction(Arc::new(|n, _| vec![-1.0; n]));
        assert!(negative.size_factors(4, &mut rng).is_err());
    }
}
