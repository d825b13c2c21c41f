//! Count simulation: settings, DE truth, size factors, NB generation and
//! the replicate sweep

mod effect;
mod generator;
mod library;
mod orchestrator;
mod settings;

pub use effect::{n_de_genes, sample_effects, DeAssignment, LfcFn, LfcSpec};
pub use generator::{CountMatrixGenerator, SimulatedData};
pub use library::{LibraryFn, LibrarySizeModel};
pub use orchestrator::{
    max_group_size, simulate_all_replicates, simulate_de, simulate_replicate, ReplicateOrchestrator,
};
pub use settings::{RnaSeqType, SimulationSettings, SimulationSettingsBuilder};
