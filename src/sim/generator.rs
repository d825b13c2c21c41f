//! Negative binomial count generation
//!
//! One call produces a gene x sample count matrix for one replicate. The
//! generator consumes randomness only through the handle it is given, in a
//! fixed order: true means, dispersions, size factors, NB draws, dropout
//! probabilities, dropout mask. Reseeding the handle therefore reproduces the
//! matrix exactly.

use ndarray::Array2;

use super::library::LibrarySizeModel;
use super::settings::{RnaSeqType, SimulationSettings};
use crate::data::{CountMatrix, DesignMatrix, GroupLabel};
use crate::error::{Result, SimError};
use crate::params::{approx_all, broadcast, DispersionSpec, EstimatedParams, ParameterBundle};
use crate::rng::RMersenneTwister;

/// Simulated counts of one replicate plus the parameters that produced them
#[derive(Debug, Clone)]
pub struct SimulatedData {
    pub counts: CountMatrix,
    /// Baseline mean per gene, before size factors and effects
    pub true_means: Vec<f64>,
    /// NB size parameter per gene
    pub nb_size: Vec<f64>,
    pub size_factors: Vec<f64>,
    /// Per-gene dropout probability, all zero for single-cell data
    pub dropout_prob: Vec<f64>,
    /// `log2(mean + 1)` per gene and sample after effect injection and clamping
    pub log2_means: Array2<f64>,
}

/// Draws count matrices from a parameter bundle
#[derive(Debug, Clone, Copy)]
pub struct CountMatrixGenerator<'a> {
    params: &'a ParameterBundle,
    library: &'a LibrarySizeModel,
    rnaseq_type: RnaSeqType,
}

impl<'a> CountMatrixGenerator<'a> {
    /// Create a generator for one parameter bundle and library model
    pub fn new(params: &'a ParameterBundle, library: &'a LibrarySizeModel, rnaseq_type: RnaSeqType) -> Self {
        Self {
            params,
            library,
            rnaseq_type,
        }
    }

    /// Generator for the bundle, library model and data type of `settings`
    pub fn from_settings(settings: &'a SimulationSettings) -> Self {
        Self::new(settings.params(), settings.library(), settings.rnaseq_type())
    }

    /// Simulate `effects.len()` genes for the samples labelled by `groups`
    ///
    /// `effects` holds one LFC per gene (zero for non-DE genes); it is added
    /// on the log2 scale to every sample of the non-reference group.
    pub fn generate(
        &self,
        groups: &[GroupLabel],
        effects: &[f64],
        rng: &mut RMersenneTwister,
    ) -> Result<SimulatedData> {
        self.params.validate()?;
        self.library.validate()?;

        let ngenes = effects.len();
        let nsamples = groups.len();
        if ngenes == 0 || nsamples == 0 {
            return Err(SimError::InvalidInput {
                reason: format!("cannot simulate {} genes x {} samples", ngenes, nsamples),
            });
        }

        let true_means = self.true_means(ngenes, rng)?;
        let nb_size = self.nb_sizes(&true_means, rng)?;
        let size_factors = self.library.size_factors(nsamples, rng)?;

        let weights = DesignMatrix::from_groups(groups).effect_weights();
        let log2_means = Array2::from_shape_fn((ngenes, nsamples), |(g, s)| {
            let effective = true_means[g] * size_factors[s];
            let mu = (effective + 1.0).log2() + effects[g] * weights[s];
            // strongly down-regulated low-mean genes are floored at zero
            mu.max(0.0)
        });

        let mut counts = Array2::<u32>::zeros((ngenes, nsamples));
        for s in 0..nsamples {
            for g in 0..ngenes {
                let mean = log2_means[[g, s]].exp2() - 1.0;
                counts[[g, s]] = saturate(rng.rnbinom_mu(nb_size[g], mean));
            }
        }

        let dropout_prob = self.dropout_probabilities(&true_means, rng)?;
        if self.rnaseq_type == RnaSeqType::Bulk {
            for s in 0..nsamples {
                for g in 0..ngenes {
                    if !rng.rbernoulli(1.0 - dropout_prob[g]) {
                        counts[[g, s]] = 0;
                    }
                }
            }
        }

        Ok(SimulatedData {
            counts: CountMatrix::with_synthetic_ids(counts, groups.to_vec())?,
            true_means,
            nb_size,
            size_factors,
            dropout_prob,
            log2_means,
        })
    }

    fn true_means(&self, ngenes: usize, rng: &mut RMersenneTwister) -> Result<Vec<f64>> {
        let means = match self.params {
            ParameterBundle::Estimated(p) => rng.sample_with_replacement(&p.means, ngenes),
            ParameterBundle::InSilico(p) => broadcast((p.mean_fn)(ngenes, rng), ngenes, "mean")?,
        };

        if means.len() != ngenes {
            return Err(SimError::InvalidParameters {
                reason: "estimated mean pool is empty".to_string(),
            });
        }
        if let Some(bad) = means.iter().find(|m| !(m.is_finite() && **m >= 0.0)) {
            return Err(SimError::NumericalInstability {
                operation: "mean generation".to_string(),
                details: format!("mean {} is not a finite non-negative number", bad),
            });
        }
        Ok(means)
    }

    /// NB size parameter per gene
    fn nb_sizes(&self, true_means: &[f64], rng: &mut RMersenneTwister) -> Result<Vec<f64>> {
        let n = true_means.len();
        let sizes = match self.params {
            ParameterBundle::Estimated(p) => estimated_sizes(p, true_means, rng)?,
            ParameterBundle::InSilico(p) => {
                let dispersion = match &p.dispersion {
                    DispersionSpec::Constant(d) => vec![*d; n],
                    DispersionSpec::Function(f) => broadcast(f(true_means), n, "dispersion")?,
                };
                dispersion.iter().map(|d| 1.0 / d).collect()
            }
        };

        // an infinite size is a Poisson gene; NaN or non-positive is not a gene at all
        if let Some(bad) = sizes.iter().find(|s| !(**s > 0.0)) {
            return Err(SimError::NumericalInstability {
                operation: "dispersion resolution".to_string(),
                details: format!("invalid NB size parameter {}", bad),
            });
        }
        Ok(sizes)
    }

    fn dropout_probabilities(&self, true_means: &[f64], rng: &mut RMersenneTwister) -> Result<Vec<f64>> {
        let n = true_means.len();
        if self.rnaseq_type == RnaSeqType::SingleCell {
            return Ok(vec![0.0; n]);
        }

        let probs = match self.params {
            ParameterBundle::Estimated(p) => match &p.dropout_fit {
                Some(fit) => true_means
                    .iter()
                    .map(|&m| {
                        if (m + 1.0).log2() < fit.cutoff {
                            fit.observed_rates[rng.index(fit.observed_rates.len())]
                        } else {
                            0.0
                        }
                    })
                    .collect(),
                None => vec![0.0; n],
            },
            ParameterBundle::InSilico(p) => match &p.dropout_fn {
                Some(f) => broadcast(f(n, rng), n, "dropout")?,
                None => vec![0.0; n],
            },
        };

        if let Some(bad) = probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(SimError::InvalidParameters {
                reason: format!("dropout probability {} outside [0, 1]", bad),
            });
        }
        Ok(probs)
    }
}

/// `2^N(fit(x), sd(x))` with `x = log2(mean + 1)`
fn estimated_sizes(p: &EstimatedParams, true_means: &[f64], rng: &mut RMersenneTwister) -> Result<Vec<f64>> {
    let fit = &p.mean_dispersion_fit;
    let x: Vec<f64> = true_means.iter().map(|m| (m + 1.0).log2()).collect();
    let centre = approx_all(&fit.x, &fit.y, &x, "mean-dispersion")?;
    let spread = approx_all(&fit.x, &fit.sd, &x, "mean-dispersion sd")?;

    Ok(centre
        .iter()
        .zip(&spread)
        .map(|(&mu, &sd)| rng.rnorm_with(mu, sd).exp2())
        .collect())
}

fn saturate(count: u64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
