//! Negative binomial parameter bundles
//!
//! A bundle is either *estimated* (an observed mean pool plus a smoothed
//! mean-dispersion curve, fitted elsewhere from real counts) or *in silico*
//! (closed-form generators for mean, dispersion and dropout). The count
//! generator matches on the variant, so every branch is handled explicitly.

mod interp;

pub use interp::{approx_all, approx_clamped};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::CountMatrix;
use crate::error::{Result, SimError};
use crate::rng::RMersenneTwister;
use crate::sim::RnaSeqType;

/// Generates `ngenes` true means from the replicate's generator
pub type MeanFn = Arc<dyn Fn(usize, &mut RMersenneTwister) -> Vec<f64> + Send + Sync>;
/// Maps true means to per-gene NB dispersions
pub type DispersionFn = Arc<dyn Fn(&[f64]) -> Vec<f64> + Send + Sync>;
/// Generates `ngenes` dropout probabilities from the replicate's generator
pub type DropoutFn = Arc<dyn Fn(usize, &mut RMersenneTwister) -> Vec<f64> + Send + Sync>;

/// Smoothed mean-dispersion relation over `log2(mean + 1)`
///
/// `y` is the fitted log2 NB size parameter and `sd` its uncertainty band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanDispersionFit {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub sd: Vec<f64>,
}

/// Empirical dropout pool for lowly expressed genes (bulk)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropoutFit {
    /// Genes with `log2(mean + 1)` below this may drop out
    pub cutoff: f64,
    pub observed_rates: Vec<f64>,
}

/// Parameters fitted from a real count table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedParams {
    /// Observed normalized per-gene means
    pub means: Vec<f64>,
    pub mean_dispersion_fit: MeanDispersionFit,
    #[serde(default)]
    pub dropout_fit: Option<DropoutFit>,
}

impl EstimatedParams {
    /// Check the mean pool, the fit knots and the optional dropout fit
    ///
    /// Knots must be sorted ascending with finite values and non-negative
    /// `sd`; dropout rates must be probabilities.
    pub fn validate(&self) -> Result<()> {
        if self.means.is_empty() {
            return Err(invalid("estimated mean pool is empty"));
        }
        if self.means.iter().any(|&m| !m.is_finite() || m < 0.0) {
            return Err(invalid("estimated means must be finite and non-negative"));
        }

        let fit = &self.mean_dispersion_fit;
        if fit.x.is_empty() {
            return Err(invalid("mean-dispersion fit has no knots"));
        }
        if fit.y.len() != fit.x.len() || fit.sd.len() != fit.x.len() {
            return Err(SimError::DimensionMismatch {
                expected: format!("{} fit values for x, y and sd", fit.x.len()),
                got: format!("{} y and {} sd values", fit.y.len(), fit.sd.len()),
            });
        }
        if fit.x.iter().chain(&fit.y).chain(&fit.sd).any(|v| !v.is_finite()) {
            return Err(invalid("mean-dispersion fit contains non-finite values"));
        }
        if fit.x.windows(2).any(|w| w[1] < w[0]) {
            return Err(invalid("mean-dispersion fit x must be sorted ascending"));
        }
        if fit.sd.iter().any(|&s| s < 0.0) {
            return Err(invalid("mean-dispersion fit sd must be non-negative"));
        }

        if let Some(dropout) = &self.dropout_fit {
            if !dropout.cutoff.is_finite() {
                return Err(invalid("dropout cutoff must be finite"));
            }
            if dropout.observed_rates.is_empty() {
                return Err(invalid("dropout rate pool is empty"));
            }
            if dropout.observed_rates.iter().any(|&p| !(0.0..=1.0).contains(&p)) {
                return Err(invalid("dropout rates must lie in [0, 1]"));
            }
        }
        Ok(())
    }
}

/// Dispersion as a global constant or a function of the true means
#[derive(Clone)]
pub enum DispersionSpec {
    Constant(f64),
    Function(DispersionFn),
}

impl fmt::Debug for DispersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispersionSpec::Constant(d) => f.debug_tuple("Constant").field(d).finish(),
            DispersionSpec::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Closed-form generators for in-silico simulation
#[derive(Clone)]
pub struct InSilicoParams {
    pub mean_fn: MeanFn,
    pub dispersion: DispersionSpec,
    /// Bulk only; `None` means no dropout
    pub dropout_fn: Option<DropoutFn>,
}

impl InSilicoParams {
    /// Create generators from a mean function, a dispersion rule and an
    /// optional dropout function
    pub fn new(mean_fn: MeanFn, dispersion: DispersionSpec, dropout_fn: Option<DropoutFn>) -> Self {
        Self {
            mean_fn,
            dispersion,
            dropout_fn,
        }
    }

    /// Every gene gets the same mean and dispersion, no dropout
    pub fn constant(mean: f64, dispersion: f64) -> Self {
        Self::new(
            Arc::new(move |n, _| vec![mean; n]),
            DispersionSpec::Constant(dispersion),
            None,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if let DispersionSpec::Constant(d) = self.dispersion {
            if !(d.is_finite() && d > 0.0) {
                return Err(invalid(format!("constant dispersion must be positive, got {}", d)));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for InSilicoParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InSilicoParams")
            .field("dispersion", &self.dispersion)
            .field("dropout_fn", &self.dropout_fn.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

/// Source of simulation parameters
#[derive(Debug, Clone)]
pub enum ParameterBundle {
    Estimated(EstimatedParams),
    InSilico(InSilicoParams),
}

impl ParameterBundle {
    pub fn validate(&self) -> Result<()> {
        match self {
            ParameterBundle::Estimated(p) => p.validate(),
            ParameterBundle::InSilico(p) => p.validate(),
        }
    }

    /// Short name of the variant, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ParameterBundle::Estimated(_) => "estimated",
            ParameterBundle::InSilico(_) => "insilico",
        }
    }
}

/// Fits a parameter bundle from a real count table
pub trait ParameterSource {
    fn estimate(&self, counts: &CountMatrix, rnaseq_type: RnaSeqType) -> Result<ParameterBundle>;
}

/// Hands out parameters estimated ahead of time, e.g. loaded from JSON
#[derive(Debug, Clone)]
pub struct FixedParameterSource {
    params: EstimatedParams,
}

impl FixedParameterSource {
    /// Wrap a bundle estimated elsewhere
    pub fn new(params: EstimatedParams) -> Self {
        Self { params }
    }
}

impl ParameterSource for FixedParameterSource {
    fn estimate(&self, _counts: &CountMatrix, rnaseq_type: RnaSeqType) -> Result<ParameterBundle> {
        let mut params = self.params.clone();
        if rnaseq_type == RnaSeqType::SingleCell && params.dropout_fit.take().is_some() {
            log::debug!("dropout fit ignored for single-cell parameters");
        }
        params.validate()?;
        Ok(ParameterBundle::Estimated(params))
    }
}

/// Repeat a length-1 vector `n` times, pass a length-`n` vector through
pub(crate) fn broadcast(values: Vec<f64>, n: usize, what: &str) -> Result<Vec<f64>> {
    match values.len() {
        len if len == n => Ok(values),
        1 => Ok(vec![values[0]; n]),
        len => Err(SimError::DimensionMismatch {
            expected: format!("1 or {} {} values", n, what),
            got: format!("{} values", len),
        }),
    }
}

fn invalid(reason: impl Into<String>) -> SimError {
    SimError::InvalidParameters {
        reason: reason.into(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::group_labels;
    use ndarray::Array2;

    pub(crate) fn toy_estimated() -> EstimatedParams {
        EstimatedParams {
            means: vec![0.5, 5.0, 50.0, 500.0],
            mean_dispersion_fit: MeanDispersionFit {
                x: vec![0.0, 4.0, 10.0],
                y: vec![-1.0, 1.0, 3.0],
                sd: vec![0.5, 0.3, 0.2],
            },
            dropout_fit: Some(DropoutFit {
                cutoff: 3.0,
                observed_rates: vec![0.1, 0.3],
            }),
        }
    }

    #[test]
    fn test_estimated_validates() {
        assert!(toy_estimated().validate().is_ok());
    }

    #[test]
    fn test_unsorted_fit_rejected() {
        let mut p = toy_estimated();
        p.mean_dispersion_fit.x = vec![4.0, 0.0, 10.0];
        assert!(matches!(p.validate(), Err(SimError::InvalidParameters { .. })));
    }

    #[test]
    fn test_fit_length_mismatch_rejected() {
        let mut p = toy_estimated();
        p.mean_dispersion_fit.sd.pop();
        assert!(matches!(p.validate(), Err(SimError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_constant_dispersion_must_be_positive() {
        assert!(InSilicoParams::constant(10.0, 0.1).validate().is_ok());
        assert!(InSilicoParams::constant(10.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_broadcast() {
        assert_eq!(broadcast(vec![2.0], 3, "mean").unwrap(), vec![2.0; 3]);
        assert_eq!(broadcast(vec![1.0, 2.0], 2, "mean").unwrap(), vec![1.0, 2.0]);
        assert!(broadcast(vec![1.0, 2.0], 3, "mean").is_err());
    }

    #[test]
    fn test_fixed_source_drops_dropout_for_single_cell() {
        let source = FixedParameterSource::new(toy_estimated());
        let counts = CountMatrix::with_synthetic_ids(Array2::zeros((1, 2)), group_labels(1, 1)).unwrap();

        match source.estimate(&counts, RnaSeqType::SingleCell).unwrap() {
            ParameterBundle::Estimated(p) => assert!(p.dropout_fit.is_none()),
            ParameterBundle::InSilico(_) => panic!("expected estimated bundle"),
        }
        match source.estimate(&counts, RnaSeqType::Bulk).unwrap() {
            ParameterBundle::Estimated(p) => assert!(p.dropout_fit.is_some()),
            ParameterBundle::InSilico(_) => panic!("expected estimated bundle"),
        }
    }
}
