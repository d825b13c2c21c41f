//! Simulation settings
//!
//! Settings carry everything that is fixed for a whole power analysis: gene
//! count, replicate count, the parameter bundle, LFC and library-size models,
//! and the per-replicate ground truth. Replicate seeds, DE gene sets and
//! effect vectors are all drawn up front, so every replicate is fully
//! described before any count is simulated.

use serde::{Deserialize, Serialize};

use super::effect::{sample_effects, DeAssignment, LfcSpec};
use super::library::LibrarySizeModel;
use crate::error::{Result, SimError};
use crate::params::ParameterBundle;
use crate::rng::RMersenneTwister;

/// Sequencing domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RnaSeqType {
    Bulk,
    SingleCell,
}

impl std::fmt::Display for RnaSeqType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RnaSeqType::Bulk => f.write_str("bulk"),
            RnaSeqType::SingleCell => f.write_str("singlecell"),
        }
    }
}

/// Fully specified simulation setup
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    ngenes: usize,
    nsims: usize,
    p_de: f64,
    lfc: LfcSpec,
    params: ParameterBundle,
    library: LibrarySizeModel,
    rnaseq_type: RnaSeqType,
    sim_seeds: Vec<u32>,
    truth: Vec<DeAssignment>,
}

impl SimulationSettings {
    /// Start a builder with default settings
    pub fn builder() -> SimulationSettingsBuilder {
        SimulationSettingsBuilder::new()
    }

    /// Assemble settings from explicit per-replicate seeds and truth
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        ngenes: usize,
        p_de: f64,
        lfc: LfcSpec,
        params: ParameterBundle,
        library: LibrarySizeModel,
        rnaseq_type: RnaSeqType,
        sim_seeds: Vec<u32>,
        truth: Vec<DeAssignment>,
    ) -> Result<Self> {
        let settings = Self {
            ngenes,
            nsims: sim_seeds.len(),
            p_de,
            lfc,
            params,
            library,
            rnaseq_type,
            sim_seeds,
            truth,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the invariants between the scalar settings and the
    /// per-replicate vectors
    pub fn validate(&self) -> Result<()> {
        if self.ngenes == 0 {
            return Err(config_error("ngenes must be positive"));
        }
        if self.nsims == 0 {
            return Err(config_error("nsims must be positive"));
        }
        if !(0.0..=1.0).contains(&self.p_de) {
            return Err(config_error(format!("p.DE must lie in [0, 1], got {}", self.p_de)));
        }
        if self.sim_seeds.len() != self.nsims || self.truth.len() != self.nsims {
            return Err(SimError::Configuration {
                reason: format!(
                    "per-replicate vectors disagree with nsims = {}: {} seeds, {} DE assignments",
                    self.nsims,
                    self.sim_seeds.len(),
                    self.truth.len()
                ),
            });
        }
        if let Some(r) = self.truth.iter().position(|t| t.effects.len() != self.ngenes) {
            return Err(SimError::Configuration {
                reason: format!("effect vector of replicate {} does not have {} entries", r + 1, self.ngenes),
            });
        }
        if let Some(r) = self
            .truth
            .iter()
            .position(|t| t.de_genes.iter().any(|&g| g >= self.ngenes))
        {
            return Err(SimError::Configuration {
                reason: format!("DE gene index out of range in replicate {}", r + 1),
            });
        }
        self.params.validate()?;
        self.lfc.validate()?;
        self.library.validate()?;
        Ok(())
    }

    /// Get the number of genes
    pub fn ngenes(&self) -> usize {
        self.ngenes
    }

    /// Get the number of replicates
    pub fn nsims(&self) -> usize {
        self.nsims
    }

    /// Get the fraction of DE genes
    pub fn p_de(&self) -> f64 {
        self.p_de
    }

    /// Get the parameter bundle
    pub fn params(&self) -> &ParameterBundle {
        &self.params
    }

    pub fn library(&self) -> &LibrarySizeModel {
        &self.library
    }

    /// Get the simulated data type
    pub fn rnaseq_type(&self) -> RnaSeqType {
        self.rnaseq_type
    }

    /// Get the per-replicate seeds derived from the master seed
    pub fn sim_seeds(&self) -> &[u32] {
        &self.sim_seeds
    }

    /// DE gene set and effect vector of replicate `r` (0-based)
    pub fn truth(&self, r: usize) -> &DeAssignment {
        &self.truth[r]
    }

    /// Get the DE assignment of every replicate
    pub fn all_truth(&self) -> &[DeAssignment] {
        &self.truth
    }
}

/// Builder for [`SimulationSettings`]
///
/// A master seed drives a setup generator that first derives one seed per
/// replicate and then draws every replicate's DE assignment.
///
/// ```ignore
/// let settings = SimulationSettings::builder()
///     .ngenes(10_000)
///     .nsims(25)
///     .p_de(0.1)
///     .lfc(LfcSpec::normal(0.0, 1.5))
///     .params(ParameterBundle::InSilico(params))
///     .seed(42)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct SimulationSettingsBuilder {
    ngenes: usize,
    nsims: usize,
    p_de: f64,
    lfc: LfcSpec,
    params: Option<ParameterBundle>,
    library: LibrarySizeModel,
    rnaseq_type: RnaSeqType,
    seed: u32,
}

impl Default for SimulationSettingsBuilder {
    fn default() -> Self {
        Self {
            ngenes: 10_000,
            nsims: 25,
            p_de: 0.1,
            lfc: LfcSpec::Constant(1.0),
            params: None,
            library: LibrarySizeModel::Equal,
            rnaseq_type: RnaSeqType::Bulk,
            seed: 1,
        }
    }
}

impl SimulationSettingsBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of genes (default: 10000)
    pub fn ngenes(mut self, ngenes: usize) -> Self {
        self.ngenes = ngenes;
        self
    }

    /// Set the number of replicates (default: 25)
    pub fn nsims(mut self, nsims: usize) -> Self {
        self.nsims = nsims;
        self
    }

    /// Set the fraction of DE genes (default: 0.1)
    pub fn p_de(mut self, p_de: f64) -> Self {
        self.p_de = p_de;
        self
    }

    /// Set the log2 fold change model (default: constant 1)
    pub fn lfc(mut self, lfc: LfcSpec) -> Self {
        self.lfc = lfc;
        self
    }

    /// Parameter bundle (required)
    pub fn params(mut self, params: ParameterBundle) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the library size model (default: equal)
    pub fn library(mut self, library: LibrarySizeModel) -> Self {
        self.library = library;
        self
    }

    /// Set the data type (default: bulk)
    pub fn rnaseq_type(mut self, rnaseq_type: RnaSeqType) -> Self {
        self.rnaseq_type = rnaseq_type;
        self
    }

    /// Set the master seed (default: 1)
    ///
    /// R equivalent: `set.seed(seed)` before drawing replicate seeds
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Validate, derive replicate seeds and draw the DE truth
    pub fn build(self) -> Result<SimulationSettings> {
        let params = self
            .params
            .ok_or_else(|| config_error("a parameter bundle is required"))?;

        if self.ngenes == 0 {
            return Err(config_error("ngenes must be positive"));
        }
        if self.nsims == 0 {
            return Err(config_error("nsims must be positive"));
        }
        if !(0.0..=1.0).contains(&self.p_de) {
            return Err(config_error(format!("p.DE must lie in [0, 1], got {}", self.p_de)));
        }
        params.validate()?;
        self.lfc.validate()?;
        self.library.validate()?;

        let mut setup_rng = RMersenneTwister::new(self.seed);
        let sim_seeds = setup_rng.derive_seeds(self.nsims);
        let truth = (0..self.nsims)
            .map(|_| sample_effects(self.ngenes, self.p_de, &self.lfc, &mut setup_rng))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "settings: {} genes, {} replicates, {} DE genes per replicate, {} parameters",
            self.ngenes,
            self.nsims,
            truth.first().map_or(0, |t| t.de_genes.len()),
            params.kind()
        );

        SimulationSettings::from_parts(
            self.ngenes,
            self.p_de,
            self.lfc,
            params,
            self.library,
            self.rnaseq_type,
            sim_seeds,
            truth,
        )
    }
}

fn config_error(reason: impl Into<String>) -> SimError {
    SimError::Configuration {
        reason: reason.into(),
    }
}
