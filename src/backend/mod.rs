//! Differential expression backends
//!
//! The simulation core never tests hypotheses itself. Each DE method is an
//! implementation of [`DeBackend`] registered under a name in a
//! [`BackendRegistry`]; the orchestrator looks methods up by name and checks
//! that the method suits the simulated domain before any sampling starts.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::data::{CountMatrix, GroupLabel};
use crate::error::{Result, SimError};
use crate::sim::RnaSeqType;

/// Domain a DE method was developed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodDomain {
    Bulk,
    SingleCell,
    Both,
}

/// How well a method fits a data domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Supported,
    /// Usable but not designed for this domain
    Suboptimal,
    /// Developed exclusively for the other domain
    Unsupported,
}

impl MethodDomain {
    /// Compatibility of this domain with simulated data of type `data`
    pub fn compatibility(self, data: RnaSeqType) -> Compatibility {
        match (self, data) {
            (MethodDomain::Both, _)
            | (MethodDomain::Bulk, RnaSeqType::Bulk)
            | (MethodDomain::SingleCell, RnaSeqType::SingleCell) => Compatibility::Supported,
            (MethodDomain::Bulk, RnaSeqType::SingleCell) => Compatibility::Suboptimal,
            (MethodDomain::SingleCell, RnaSeqType::Bulk) => Compatibility::Unsupported,
        }
    }
}

/// Everything a backend sees for one (configuration, replicate) cell
#[derive(Debug, Clone, Copy)]
pub struct BackendInput<'a> {
    /// Counts with all-zero genes already removed
    pub counts: &'a CountMatrix,
    pub groups: &'a [GroupLabel],
    pub p_de: f64,
    pub domain: RnaSeqType,
    /// Worker-count hint for backends that parallelize internally
    pub workers: usize,
}

/// Elapsed seconds per stage of one backend call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTiming {
    pub param_estimate: f64,
    pub de_test: f64,
    pub moment_estimate: f64,
}

impl StageTiming {
    /// Stage times in `TimingStage` order
    pub fn as_array(&self) -> [f64; 3] {
        [self.param_estimate, self.de_test, self.moment_estimate]
    }
}

/// Per-gene backend results, in input row order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendOutput {
    pub pvalue: Vec<f64>,
    /// Adjusted p-values, when the method reports them
    pub fdr: Option<Vec<f64>>,
    pub mean: Vec<f64>,
    pub dispersion: Vec<f64>,
    pub dropout: Vec<f64>,
    pub timing: StageTiming,
}

impl BackendOutput {
    /// Check every per-gene vector has `n_genes` entries
    pub fn check_len(&self, method: &str, n_genes: usize) -> Result<()> {
        let mut lengths = vec![
            ("pvalue", self.pvalue.len()),
            ("mean", self.mean.len()),
            ("dispersion", self.dispersion.len()),
            ("dropout", self.dropout.len()),
        ];
        if let Some(fdr) = &self.fdr {
            lengths.push(("fdr", fdr.len()));
        }

        match lengths.iter().find(|(_, len)| *len != n_genes) {
            Some((field, len)) => Err(SimError::Backend {
                method: method.to_string(),
                reason: format!("returned {} {} values for {} genes", len, field, n_genes),
            }),
            None => Ok(()),
        }
    }
}

/// A differential expression method
pub trait DeBackend: Send + Sync {
    fn test(&self, input: &BackendInput<'_>) -> Result<BackendOutput>;
}

impl<F> DeBackend for F
where
    F: Fn(&BackendInput<'_>) -> Result<BackendOutput> + Send + Sync,
{
    fn test(&self, input: &BackendInput<'_>) -> Result<BackendOutput> {
        self(input)
    }
}

#[derive(Clone)]
struct RegisteredBackend {
    domain: MethodDomain,
    backend: Arc<dyn DeBackend>,
}

/// Name to DE method mapping
#[derive(Clone, Default)]
pub struct BackendRegistry {
    entries: BTreeMap<String, RegisteredBackend>,
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, entry)| (name, entry.domain)))
            .finish()
    }
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method; a method already registered under `name` is replaced
    pub fn register(&mut self, name: &str, domain: MethodDomain, backend: Arc<dyn DeBackend>) -> &mut Self {
        if self
            .entries
            .insert(name.to_string(), RegisteredBackend { domain, backend })
            .is_some()
        {
            log::warn!("DE method '{}' registered twice, keeping the latest", name);
        }
        self
    }

    /// Registered method names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    fn entry(&self, name: &str) -> Result<&RegisteredBackend> {
        self.entries.get(name).ok_or_else(|| SimError::Configuration {
            reason: format!(
                "unknown DE method '{}'; registered: {}",
                name,
                self.names().join(", ")
            ),
        })
    }

    /// How well the method registered as `name` suits data of type `data`
    pub fn compatibility(&self, name: &str, data: RnaSeqType) -> Result<Compatibility> {
        Ok(self.entry(name)?.domain.compatibility(data))
    }

    /// Look up `name` for data of type `data`
    ///
    /// Unknown methods and methods built exclusively for the other domain
    /// are configuration errors; a bulk method on single-cell data only
    /// warns.
    pub fn resolve(&self, name: &str, data: RnaSeqType) -> Result<Arc<dyn DeBackend>> {
        let entry = self.entry(name)?;

        match entry.domain.compatibility(data) {
            Compatibility::Supported => {}
            Compatibility::Suboptimal => log::warn!(
                "DE method '{}' was developed for {:?} data and is applied to {} data",
                name,
                entry.domain,
                data
            ),
            Compatibility::Unsupported => {
                return Err(SimError::Configuration {
                    reason: format!(
                        "DE method '{}' is only meant for {:?} data and cannot be used for {} data",
                        name, entry.domain, data
                    ),
                })
            }
        }
        Ok(Arc::clone(&entry.backend))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Reports each gene's mean count with placeholder p-values
    pub(crate) fn mean_backend(input: &BackendInput<'_>) -> Result<BackendOutput> {
        let means = input.counts.gene_means();
        let n = means.len();
        Ok(BackendOutput {
            pvalue: vec![0.5; n],
            fdr: None,
            mean: means,
            dispersion: vec![0.1; n],
            dropout: vec![0.0; n],
            timing: StageTiming {
                param_estimate: 0.0,
                de_test: 0.01,
                moment_estimate: 0.0,
            },
        })
    }

    pub(crate) fn registry() -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        registry
            .register("bulkmethod", MethodDomain::Bulk, Arc::new(mean_backend))
            .register("scmethod", MethodDomain::SingleCell, Arc::new(mean_backend));
        registry
    }

    #[test]
    fn test_compatibility_table() {
        assert_eq!(MethodDomain::Both.compatibility(RnaSeqType::Bulk), Compatibility::Supported);
        assert_eq!(
            MethodDomain::Bulk.compatibility(RnaSeqType::SingleCell),
            Compatibility::Suboptimal
        );
        assert_eq!(
            MethodDomain::SingleCell.compatibility(RnaSeqType::Bulk),
            Compatibility::Unsupported
        );
    }

    #[test]
    fn test_resolve_rules() {
        let registry = registry();
        assert!(registry.resolve("bulkmethod", RnaSeqType::Bulk).is_ok());
        assert!(registry.resolve("bulkmethod", RnaSeqType::SingleCell).is_ok());
        assert!(matches!(
            registry.resolve("scmethod", RnaSeqType::Bulk),
            Err(SimError::Configuration { .. })
        ));
        assert!(matches!(
            registry.resolve("nope", RnaSeqType::Bulk),
            Err(SimError::Configuration { .. })
        ));
        assert_eq!(registry.names(), vec!["bulkmethod", "scmethod"]);
        assert_eq!(
            registry.compatibility("bulkmethod", RnaSeqType::SingleCell).unwrap(),
            Compatibility::Suboptimal
        );
        assert!(registry.compatibility("nope", RnaSeqType::Bulk).is_err());
    }

    #[test]
    fn test_output_length_check() {
        let output = BackendOutput {
            pvalue: vec![0.1; 3],
            fdr: Some(vec![0.2; 2]),
            mean: vec![1.0; 3],
            dispersion: vec![0.1; 3],
            dropout: vec![0.0; 3],
            timing: StageTiming::default(),
        };
        assert!(matches!(output.check_len("m", 3), Err(SimError::Backend { .. })));
    }
}
