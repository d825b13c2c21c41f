//! rust_powsim: Monte-Carlo power analysis for RNA-seq differential expression
//!
//! The crate simulates gene x sample count matrices from negative binomial
//! models, either with parameters estimated from a real data set or with
//! closed-form in-silico generators, injects known log2 fold changes into a
//! random subset of genes and hands every replicate to a pluggable
//! differential expression backend. Per-gene results are collected into
//! arrays indexed by gene, sample-size configuration and replicate.
//!
//! # Example
//!
//! ```ignore
//! use rust_powsim::prelude::*;
//!
//! let settings = SimulationSettings::builder()
//!     .ngenes(10_000)
//!     .nsims(25)
//!     .p_de(0.1)
//!     .lfc(LfcSpec::normal(0.0, 1.5))
//!     .params(ParameterBundle::Estimated(read_estimated_params("params.json")?))
//!     .seed(42)
//!     .build()?;
//!
//! let mut registry = BackendRegistry::new();
//! registry.register("mytest", MethodDomain::Bulk, Arc::new(my_backend));
//!
//! let results = simulate_de(&[3, 6, 12], &[3, 6, 12], &settings, &registry, "mytest", None)?;
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod params;
pub mod results;
pub mod rng;
pub mod sim;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{BackendInput, BackendOutput, BackendRegistry, DeBackend, MethodDomain, StageTiming};
    pub use crate::config::SimulationConfig;
    pub use crate::data::{group_labels, CountMatrix, DesignMatrix, GroupLabel};
    pub use crate::error::{Result, SimError};
    pub use crate::io::{read_estimated_params, write_count_matrix, write_estimated_params, write_truth_table};
    pub use crate::params::{
        DispersionSpec, EstimatedParams, FixedParameterSource, InSilicoParams, ParameterBundle, ParameterSource,
    };
    pub use crate::results::{ResultArrays, TimingStage};
    pub use crate::rng::RMersenneTwister;
    pub use crate::sim::{
        n_de_genes, sample_effects, simulate_all_replicates, simulate_de, simulate_replicate, CountMatrixGenerator,
        DeAssignment, LfcSpec, LibrarySizeModel, ReplicateOrchestrator, RnaSeqType, SimulatedData,
        SimulationSettings,
    };
}
