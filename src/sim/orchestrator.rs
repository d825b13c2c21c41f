//! Replicate x sample-size sweep
//!
//! For every replicate one maximal count matrix is simulated with
//! `max(n1)` Group1 and `max(n2)` Group2 samples. Each sample-size
//! configuration then takes the leading columns of each group from that one
//! matrix, so smaller designs are nested inside larger ones and share the
//! replicate's size factors and DE truth.

use std::time::Instant;

use rayon::prelude::*;

use super::generator::{CountMatrixGenerator, SimulatedData};
use super::settings::SimulationSettings;
use crate::backend::{BackendInput, BackendOutput, BackendRegistry, DeBackend};
use crate::data::group_labels;
use crate::error::{Result, SimError};
use crate::results::ResultArrays;
use crate::rng::RMersenneTwister;

/// Backend output of one configuration together with the rows it covers
struct CellResult {
    kept: Vec<usize>,
    output: BackendOutput,
}

/// Drives the nested replicate and sample-size loops
#[derive(Debug, Clone, Copy)]
pub struct ReplicateOrchestrator<'a> {
    settings: &'a SimulationSettings,
    registry: &'a BackendRegistry,
    parallel: bool,
}

impl<'a> ReplicateOrchestrator<'a> {
    /// Sequential orchestrator over `settings`, resolving methods in `registry`
    pub fn new(settings: &'a SimulationSettings, registry: &'a BackendRegistry) -> Self {
        Self {
            settings,
            registry,
            parallel: false,
        }
    }

    /// Run replicates on the rayon pool
    ///
    /// Each replicate seeds its own generator and results are scattered
    /// after the parallel section, so the output equals the sequential run.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run the whole sweep for `method`
    ///
    /// `n1[j]` and `n2[j]` are the group sizes of configuration `j`;
    /// `workers` is passed on to the backend as a hint (default 1).
    pub fn run(&self, n1: &[usize], n2: &[usize], method: &str, workers: Option<usize>) -> Result<ResultArrays> {
        let settings = self.settings;
        check_sample_sizes(n1, n2)?;
        settings.validate()?;
        let backend = self.registry.resolve(method, settings.rnaseq_type())?;
        let workers = workers.unwrap_or(1).max(1);

        log::info!(
            "Simulating {} replicates of {} genes ({} samples per group max), DE method '{}'",
            settings.nsims(),
            settings.ngenes(),
            max_group_size(n1, n2),
            method
        );

        let mut results = ResultArrays::allocate(
            settings.ngenes(),
            n1,
            n2,
            method,
            settings.rnaseq_type(),
            settings.all_truth().to_vec(),
        );

        let run_one = |r: usize| -> Result<Vec<CellResult>> {
            run_replicate(settings, backend.as_ref(), method, r, n1, n2, workers)
        };

        if self.parallel {
            let cells: Vec<Vec<CellResult>> = (0..settings.nsims())
                .into_par_iter()
                .map(run_one)
                .collect::<Result<_>>()?;
            for (r, replicate) in cells.iter().enumerate() {
                for (j, cell) in replicate.iter().enumerate() {
                    results.scatter(j, r, &cell.kept, &cell.output);
                }
            }
        } else {
            for r in 0..settings.nsims() {
                for (j, cell) in run_one(r)?.iter().enumerate() {
                    results.scatter(j, r, &cell.kept, &cell.output);
                }
            }
        }

        Ok(results)
    }
}

/// Simulate and test one replicate across all configurations
fn run_replicate(
    settings: &SimulationSettings,
    backend: &dyn DeBackend,
    method: &str,
    r: usize,
    n1: &[usize],
    n2: &[usize],
    workers: usize,
) -> Result<Vec<CellResult>> {
    log::info!("Simulation {} of {}", r + 1, settings.nsims());

    let max_n = max_group_size(n1, n2);
    let data = simulate_replicate(settings, r, max_n, max_n)?;

    n1.iter()
        .zip(n2)
        .enumerate()
        .map(|(j, (&a, &b))| {
            let subset = data.counts.subset_groups(a, b)?;
            let (filtered, kept) = subset.drop_zero_genes();
            log::debug!(
                "replicate {}, {} vs {} samples: {} of {} genes with counts",
                r + 1,
                a,
                b,
                kept.len(),
                settings.ngenes()
            );

            let input = BackendInput {
                counts: &filtered,
                groups: filtered.groups(),
                p_de: settings.p_de(),
                domain: settings.rnaseq_type(),
                workers,
            };
            let start = Instant::now();
            let output = backend.test(&input)?;
            log::debug!("config {} tested in {:.2?}", j + 1, start.elapsed());

            output.check_len(method, kept.len())?;
            Ok(CellResult { kept, output })
        })
        .collect()
}

/// Per-group size of the maximal matrix: the largest size over both groups
/// and every configuration
///
/// Both groups get `max_n` columns, so Group2 always starts at column
/// `max_n` and every configuration is a prefix of each group.
pub fn max_group_size(n1: &[usize], n2: &[usize]) -> usize {
    n1.iter().chain(n2).copied().max().unwrap_or(0)
}

/// Maximal count matrix of replicate `r`: `n1` Group1 then `n2` Group2 samples
///
/// Uses the replicate's own seed and DE truth, so the result does not depend
/// on any other replicate or on which sample sizes are evaluated later.
pub fn simulate_replicate(settings: &SimulationSettings, r: usize, n1: usize, n2: usize) -> Result<SimulatedData> {
    if r >= settings.nsims() {
        return Err(SimError::InvalidInput {
            reason: format!("replicate {} out of range for {} replicates", r + 1, settings.nsims()),
        });
    }

    let mut rng = RMersenneTwister::new(settings.sim_seeds()[r]);
    let groups = group_labels(n1, n2);
    CountMatrixGenerator::from_settings(settings).generate(&groups, &settings.truth(r).effects, &mut rng)
}

/// Maximal count matrices of every replicate, generated on the rayon pool
pub fn simulate_all_replicates(settings: &SimulationSettings, n1: usize, n2: usize) -> Result<Vec<SimulatedData>> {
    (0..settings.nsims())
        .into_par_iter()
        .map(|r| simulate_replicate(settings, r, n1, n2))
        .collect()
}

fn check_sample_sizes(n1: &[usize], n2: &[usize]) -> Result<()> {
    if n1.len() != n2.len() {
        return Err(SimError::Configuration {
            reason: format!(
                "n1 and n2 must have the same length, got {} and {}",
                n1.len(),
                n2.len()
            ),
        });
    }
    if n1.is_empty() {
        return Err(SimError::Configuration {
            reason: "at least one sample-size configuration is required".to_string(),
        });
    }
    if n1.iter().chain(n2).any(|&n| n == 0) {
        return Err(SimError::Configuration {
            reason: "every group needs at least one sample".to_string(),
        });
    }
    Ok(())
}

/// Simulate counts for every replicate and sample-size configuration and
/// collect the DE method's per-gene results
///
/// Fails before any sampling when `n1` and `n2` differ in length, the method
/// is unknown, or the method was built exclusively for the other domain.
/// Errors raised by the method abort the whole run.
pub fn simulate_de(
    n1: &[usize],
    n2: &[usize],
    settings: &SimulationSettings,
    registry: &BackendRegistry,
    method: &str,
    workers: Option<usize>,
) -> Result<ResultArrays> {
    ReplicateOrchestrator::new(settings, registry).run(n1, n2, method, workers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::backend::tests::{mean_backend, registry};
    use crate::backend::{Compatibility, MethodDomain};
    use crate::data::{CountMatrix, GroupLabel};
    use crate::params::{InSilicoParams, ParameterBundle};
    use crate::sim::{LfcSpec, RnaSeqType};

    fn settings(p_de: f64, nsims: usize) -> SimulationSettings {
        SimulationSettings::builder()
            .ngenes(100)
            .nsims(nsims)
            .p_de(p_de)
            .lfc(LfcSpec::Constant(2.0))
            .params(ParameterBundle::InSilico(InSilicoParams::constant(50.0, 0.1)))
            .rnaseq_type(RnaSeqType::Bulk)
            .seed(2024)
            .build()
            .unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let settings = settings(0.2, 1);
        assert_eq!(settings.truth(0).de_genes.len(), 20);

        let data = simulate_replicate(&settings, 0, 10, 10).unwrap();
        assert_eq!(data.counts.n_genes(), 100);
        assert_eq!(data.counts.n_samples(), 20);
        assert!(data.dropout_prob.iter().all(|&p| p == 0.0));
        assert!(data.size_factors.iter().all(|&f| f == 1.0));

        let results = simulate_de(&[10], &[10], &settings, &registry(), "bulkmethod", None).unwrap();
        assert_eq!(results.pvalue.dim(), (100, 1, 1));

        let group1_means: Vec<f64> = data
            .counts
            .subset_groups(10, 0)
            .unwrap()
            .gene_means();
        let overall: f64 = group1_means.iter().sum::<f64>() / 100.0;
        assert!((overall - 50.0).abs() < 5.0, "average group1 mean {}", overall);
    }

    #[test]
    fn test_mismatched_sample_sizes_rejected() {
        let settings = settings(0.1, 1);
        let result = simulate_de(&[5, 10], &[5], &settings, &registry(), "bulkmethod", None);
        assert!(matches!(result, Err(SimError::Configuration { .. })));
    }

    #[test]
    fn test_single_cell_method_on_bulk_rejected() {
        let settings = settings(0.1, 1);
        let result = simulate_de(&[5], &[5], &settings, &registry(), "scmethod", None);
        assert!(matches!(result, Err(SimError::Configuration { .. })));
    }

    #[test]
    fn test_bulk_method_on_single_cell_runs() {
        let settings = SimulationSettings::builder()
            .ngenes(30)
            .nsims(1)
            .params(ParameterBundle::InSilico(InSilicoParams::constant(20.0, 0.2)))
            .rnaseq_type(RnaSeqType::SingleCell)
            .build()
            .unwrap();
        let registry = registry();
        assert_eq!(
            registry.compatibility("bulkmethod", RnaSeqType::SingleCell).unwrap(),
            Compatibility::Suboptimal
        );
        let results = simulate_de(&[4], &[4], &settings, &registry, "bulkmethod", Some(2)).unwrap();
        assert_eq!(results.rnaseq_type, RnaSeqType::SingleCell);
    }

    #[test]
    fn test_nested_subsets_share_columns() {
        let seen: Arc<Mutex<Vec<CountMatrix>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut registry = BackendRegistry::new();
        registry.register(
            "recorder",
            MethodDomain::Both,
            Arc::new(move |input: &BackendInput<'_>| {
                sink.lock().unwrap().push(input.counts.clone());
                mean_backend(input)
            }),
        );

        let settings = settings(0.2, 2);
        let results = simulate_de(&[3, 6], &[4, 8], &settings, &registry, "recorder", None).unwrap();
        assert_eq!(results.pvalue.dim(), (100, 2, 2));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        for r in 0..2 {
            let small = &seen[2 * r];
            let large = &seen[2 * r + 1];
            let small_g1: Vec<&String> = small.sample_ids().iter().take(3).collect();
            let large_g1: Vec<&String> = large.sample_ids().iter().take(3).collect();
            assert_eq!(small_g1, large_g1);
            assert_eq!(small.sample_ids()[3], large.sample_ids()[6]);
            assert_eq!(small.groups()[3], GroupLabel::Group2);

            // genes present in both share identical counts on the shared columns
            let g = small.gene_ids().iter().position(|id| large.gene_ids().contains(id)).unwrap();
            let lg = large.gene_ids().iter().position(|id| *id == small.gene_ids()[g]).unwrap();
            assert_eq!(small.counts()[[g, 0]], large.counts()[[lg, 0]]);
            assert_eq!(small.counts()[[g, 3]], large.counts()[[lg, 6]]);
        }
    }

    #[test]
    fn test_asymmetric_sweep_uses_square_maximal_matrix() {
        let seen: Arc<Mutex<Vec<CountMatrix>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut registry = BackendRegistry::new();
        registry.register(
            "recorder",
            MethodDomain::Both,
            Arc::new(move |input: &BackendInput<'_>| {
                sink.lock().unwrap().push(input.counts.clone());
                mean_backend(input)
            }),
        );

        assert_eq!(max_group_size(&[2], &[5]), 5);
        let settings = settings(0.2, 1);
        simulate_de(&[2], &[5], &settings, &registry, "recorder", None).unwrap();

        let seen = seen.lock().unwrap();
        let ids = seen[0].sample_ids();
        assert_eq!(ids.len(), 7);
        assert_eq!(ids[1], "sample_2");
        assert_eq!(ids[2], "sample_6");
        assert_eq!(ids[6], "sample_10");

        // Group2 columns of the subset equal the maximal matrix columns 5..10
        let full = simulate_replicate(&settings, 0, 5, 5).unwrap();
        let subset = full.counts.subset_groups(2, 5).unwrap();
        assert_eq!(subset.sample_ids(), ids);
    }

    #[test]
    fn test_truth_identical_across_configs() {
        let settings = settings(0.3, 3);
        let results = simulate_de(&[2, 4, 6], &[2, 4, 6], &settings, &registry(), "bulkmethod", None).unwrap();
        assert_eq!(results.truth.len(), 3);
        for r in 0..3 {
            assert_eq!(&results.truth[r], settings.truth(r));
        }
        // the maximal matrix does not depend on which configurations are run
        let a = simulate_replicate(&settings, 1, 6, 6).unwrap();
        let b = simulate_replicate(&settings, 1, 6, 6).unwrap();
        assert_eq!(a.counts, b.counts);
        assert_eq!(a.size_factors, b.size_factors);
    }

    #[test]
    fn test_all_zero_genes_left_missing() {
        let settings = SimulationSettings::builder()
            .ngenes(10)
            .nsims(1)
            .p_de(0.0)
            .params(ParameterBundle::InSilico(InSilicoParams::new(
                Arc::new(|n, _| (0..n).map(|g| if g < 5 { 0.0 } else { 100.0 }).collect()),
                crate::params::DispersionSpec::Constant(0.1),
                None,
            )))
            .build()
            .unwrap();
        let results = simulate_de(&[3], &[3], &settings, &registry(), "bulkmethod", None).unwrap();
        for g in 0..5 {
            assert!(results.pvalue[[g, 0, 0]].is_nan());
        }
        for g in 5..10 {
            assert_eq!(results.pvalue[[g, 0, 0]], 0.5);
        }
    }

    #[test]
    fn test_backend_error_aborts() {
        let mut registry = BackendRegistry::new();
        registry.register(
            "broken",
            MethodDomain::Bulk,
            Arc::new(|_: &BackendInput<'_>| -> crate::error::Result<BackendOutput> {
                Err(SimError::Backend {
                    method: "broken".to_string(),
                    reason: "fit failed".to_string(),
                })
            }),
        );
        let settings = settings(0.1, 2);
        let result = simulate_de(&[3], &[3], &settings, &registry, "broken", None);
        assert!(matches!(result, Err(SimError::Backend { .. })));
    }

    #[test]
    fn test_wrong_output_length_is_backend_error() {
        let mut registry = BackendRegistry::new();
        registry.register(
            "short",
            MethodDomain::Bulk,
            Arc::new(|input: &BackendInput<'_>| -> crate::error::Result<BackendOutput> {
                let mut out = mean_backend(input)?;
                out.pvalue.pop();
                Ok(out)
            }),
        );
        let settings = settings(0.1, 1);
        let result = simulate_de(&[3], &[3], &settings, &registry, "short", None);
        assert!(matches!(result, Err(SimError::Backend { .. })));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let settings = settings(0.2, 4);
        let registry = registry();
        let seq = ReplicateOrchestrator::new(&settings, &registry)
            .run(&[3, 5], &[3, 5], "bulkmethod", None)
            .unwrap();
        let par = ReplicateOrchestrator::new(&settings, &registry)
            .parallel(true)
            .run(&[3, 5], &[3, 5], "bulkmethod", None)
            .unwrap();

        let same = |a: &ndarray::Array3<f64>, b: &ndarray::Array3<f64>| {
            a.iter().zip(b.iter()).all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
        };
        assert!(same(&seq.mean, &par.mean));
        assert!(same(&seq.pvalue, &par.pvalue));
    }

    #[test]
    fn test_simulate_all_replicates() {
        let settings = settings(0.1, 3);
        let all = simulate_all_replicates(&settings, 4, 4).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].counts, simulate_replicate(&settings, 2, 4, 4).unwrap().counts);
    }
}
