//! Differential expression ground truth
//!
//! Which genes are DE, and by how much, is decided once per replicate. The
//! same assignment is reused for every sample-size configuration of that
//! replicate, so the truth does not depend on n1/n2.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SimError};
use crate::params::broadcast;
use crate::rng::RMersenneTwister;

/// Generates `n_de` log2 fold changes from the given generator
pub type LfcFn = Arc<dyn Fn(usize, &mut RMersenneTwister) -> Vec<f64> + Send + Sync>;

/// Log2 fold change specification for DE genes
#[derive(Clone)]
pub enum LfcSpec {
    /// Every DE gene gets the same LFC
    Constant(f64),
    /// LFCs drawn with replacement from a finite pool
    Values(Vec<f64>),
    /// LFCs produced by a generating function
    Function(LfcFn),
}

impl fmt::Debug for LfcSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LfcSpec::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            LfcSpec::Values(v) => f.debug_tuple("Values").field(&v.len()).finish(),
            LfcSpec::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl LfcSpec {
    /// Normal LFCs, `N(mean, sd)`
    pub fn normal(mean: f64, sd: f64) -> Self {
        LfcSpec::Function(Arc::new(move |n, rng| {
            (0..n).map(|_| rng.rnorm_with(mean, sd)).collect()
        }))
    }

    /// Gamma-distributed magnitudes with a random sign
    pub fn signed_gamma(shape: f64, rate: f64) -> Self {
        LfcSpec::Function(Arc::new(move |n, rng| {
            (0..n)
                .map(|_| {
                    let sign = if rng.rbernoulli(0.5) { 1.0 } else { -1.0 };
                    sign * rng.rgamma(shape, 1.0 / rate)
                })
                .collect()
        }))
    }

    /// Reject non-finite constants and empty or non-finite value pools
    pub fn validate(&self) -> Result<()> {
        match self {
            LfcSpec::Constant(v) if !v.is_finite() => Err(SimError::InvalidInput {
                reason: format!("constant LFC must be finite, got {}", v),
            }),
            LfcSpec::Values(v) if v.is_empty() => Err(SimError::InvalidInput {
                reason: "LFC value pool is empty".to_string(),
            }),
            LfcSpec::Values(v) if v.iter().any(|x| !x.is_finite()) => Err(SimError::InvalidInput {
                reason: "LFC value pool contains non-finite values".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// DE genes and the per-gene effect vector of one replicate
#[derive(Debug, Clone, PartialEq)]
pub struct DeAssignment {
    /// DE gene indices, ascending
    pub de_genes: Vec<usize>,
    /// LFC per gene, zero for non-DE genes
    pub effects: Vec<f64>,
}

impl DeAssignment {
    /// No DE genes
    pub fn null(ngenes: usize) -> Self {
        Self {
            de_genes: Vec::new(),
            effects: vec![0.0; ngenes],
        }
    }

    /// Whether `gene` received an effect
    pub fn is_de(&self, gene: usize) -> bool {
        self.de_genes.binary_search(&gene).is_ok()
    }
}

/// Number of DE genes for a given fraction
pub fn n_de_genes(ngenes: usize, p_de: f64) -> usize {
    ((p_de * ngenes as f64).round() as usize).min(ngenes)
}

/// Choose `round(p_de * ngenes)` DE genes uniformly without replacement and
/// draw their LFCs
pub fn sample_effects(
    ngenes: usize,
    p_de: f64,
    spec: &LfcSpec,
    rng: &mut RMersenneTwister,
) -> Result<DeAssignment> {
    if !(0.0..=1.0).contains(&p_de) {
        return Err(SimError::InvalidInput {
            reason: format!("p.DE must lie in [0, 1], got {}", p_de),
        });
    }
    spec.validate()?;

    let n_de = n_de_genes(ngenes, p_de);
    if n_de == 0 {
        return Ok(DeAssignment::null(ngenes));
    }

    let drawn = rng.sample_without_replacement(ngenes, n_de);
    let lfcs = match spec {
        LfcSpec::Constant(v) => vec![*v; n_de],
        LfcSpec::Values(pool) => rng.sample_with_replacement(pool, n_de),
        LfcSpec::Function(f) => broadcast(f(n_de, rng), n_de, "LFC")?,
    };

    if let Some(bad) = lfcs.iter().find(|v| !v.is_finite()) {
        return Err(SimError::NumericalInstability {
            operation: "LFC sampling".to_string(),
            details: format!("non-finite LFC {}", bad),
        });
    }

    let mut effects = vec![0.0; ngenes];
    for (&gene, &lfc) in drawn.iter().zip(&lfcs) {
        effects[gene] = lfc;
    }

    let mut de_genes = drawn;
    de_genes.sort_unstable();

    Ok(DeAssignment { de_genes, effects })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_of_de_genes() {
        let mut rng = RMersenneTwister::new(1);
        let de = sample_effects(100, 0.2, &LfcSpec::Constant(1.5), &mut rng).unwrap();
        assert_eq!(de.de_genes.len(), 20);
        assert!(de.de_genes.windows(2).all(|w| w[0] < w[1]));
        for g in 0..100 {
            if de.is_de(g) {
                assert_eq!(de.effects[g], 1.5);
            } else {
                assert_eq!(de.effects[g], 0.0);
            }
        }
    }

    #[test]
    fn test_no_de_genes() {
        let mut rng = RMersenneTwister::new(1);
        let de = sample_effects(50, 0.0, &LfcSpec::Constant(2.0), &mut rng).unwrap();
        assert!(de.de_genes.is_empty());
        assert!(de.effects.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_all_de_genes() {
        let mut rng = RMersenneTwister::new(1);
        let de = sample_effects(30, 1.0, &LfcSpec::Constant(-1.0), &mut rng).unwrap();
        assert_eq!(de.de_genes, (0..30).collect::<Vec<_>>());
        assert!(de.effects.iter().all(|&e| e == -1.0));
    }

    #[test]
    fn test_values_pool() {
        let mut rng = RMersenneTwister::new(4);
        let pool = vec![-2.0, 2.0];
        let de = sample_effects(200, 0.5, &LfcSpec::Values(pool), &mut rng).unwrap();
        assert_eq!(de.de_genes.len(), 100);
        assert!(de.de_genes.iter().all(|&g| de.effects[g].abs() == 2.0));
    }

    #[test]
    fn test_function_spec_and_seed_reproducibility() {
        let spec = LfcSpec::signed_gamma(3.0, 3.0);
        let a = sample_effects(500, 0.1, &spec, &mut RMersenneTwister::new(9)).unwrap();
        let b = sample_effects(500, 0.1, &spec, &mut RMersenneTwister::new(9)).unwrap();
        assert_eq!(a, b);
        assert!(a.de_genes.iter().all(|&g| a.effects[g] != 0.0));
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let mut rng = RMersenneTwister::new(1);
        assert!(sample_effects(10, 1.5, &LfcSpec::Constant(1.0), &mut rng).is_err());
        assert!(sample_effects(10, 0.5, &LfcSpec::Values(vec![]), &mut rng).is_err());
    }
}
