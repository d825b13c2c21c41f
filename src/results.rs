//! Result arrays of a simulation run
//!
//! Per-gene arrays are indexed `[gene, config, replicate]`; timings are
//! indexed `[stage, config, replicate]`. Genes filtered out of a cell (zero
//! total count) stay `NaN` there, as does the FDR whenever the backend does
//! not report adjusted p-values.

use ndarray::{s, Array3, ArrayView1};

use crate::backend::BackendOutput;
use crate::sim::{DeAssignment, RnaSeqType};

/// Backend stages recorded in the timing array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingStage {
    ParamEstimate = 0,
    DeTest = 1,
    MomentEstimate = 2,
}

/// Everything one `simulate_de` call produces
#[derive(Debug, Clone)]
pub struct ResultArrays {
    pub pvalue: Array3<f64>,
    pub fdr: Array3<f64>,
    pub mean: Array3<f64>,
    pub dispersion: Array3<f64>,
    pub dropout: Array3<f64>,
    pub timing: Array3<f64>,
    pub n1: Vec<usize>,
    pub n2: Vec<usize>,
    pub method: String,
    pub rnaseq_type: RnaSeqType,
    /// Ground truth of each replicate
    pub truth: Vec<DeAssignment>,
}

impl ResultArrays {
    pub(crate) fn allocate(
        ngenes: usize,
        n1: &[usize],
        n2: &[usize],
        method: &str,
        rnaseq_type: RnaSeqType,
        truth: Vec<DeAssignment>,
    ) -> Self {
        let nconfigs = n1.len();
        let nsims = truth.len();
        let gene_shape = (ngenes, nconfigs, nsims);
        Self {
            pvalue: Array3::from_elem(gene_shape, f64::NAN),
            fdr: Array3::from_elem(gene_shape, f64::NAN),
            mean: Array3::from_elem(gene_shape, f64::NAN),
            dispersion: Array3::from_elem(gene_shape, f64::NAN),
            dropout: Array3::from_elem(gene_shape, f64::NAN),
            timing: Array3::from_elem((3, nconfigs, nsims), f64::NAN),
            n1: n1.to_vec(),
            n2: n2.to_vec(),
            method: method.to_string(),
            rnaseq_type,
            truth,
        }
    }

    /// Write one backend call back at the original gene rows of cell `(config, replicate)`
    pub(crate) fn scatter(&mut self, config: usize, replicate: usize, kept: &[usize], output: &BackendOutput) {
        for (row, &gene) in kept.iter().enumerate() {
            self.pvalue[[gene, config, replicate]] = output.pvalue[row];
            self.mean[[gene, config, replicate]] = output.mean[row];
            self.dispersion[[gene, config, replicate]] = output.dispersion[row];
            self.dropout[[gene, config, replicate]] = output.dropout[row];
            if let Some(fdr) = &output.fdr {
                self.fdr[[gene, config, replicate]] = fdr[row];
            }
        }
        for (stage, secs) in output.timing.as_array().iter().enumerate() {
            self.timing[[stage, config, replicate]] = *secs;
        }
    }

    pub fn ngenes(&self) -> usize {
        self.pvalue.dim().0
    }

    /// Number of sample-size configurations
    pub fn nconfigs(&self) -> usize {
        self.n1.len()
    }

    pub fn nsims(&self) -> usize {
        self.truth.len()
    }

    /// p-values of every gene for one cell
    pub fn pvalues(&self, config: usize, replicate: usize) -> ArrayView1<'_, f64> {
        self.pvalue.slice(s![.., config, replicate])
    }

    /// Number of genes the backend saw in one cell
    pub fn n_tested(&self, config: usize, replicate: usize) -> usize {
        self.pvalues(config, replicate).iter().filter(|p| !p.is_nan()).count()
    }

    /// Elapsed seconds of one stage in one cell, `NaN` if never run
    pub fn stage_time(&self, stage: TimingStage, config: usize, replicate: usize) -> f64 {
        self.timing[[stage as usize, config, replicate]]
    }

    /// Mean elapsed seconds of a stage per configuration, over replicates
    pub fn mean_stage_time(&self, stage: TimingStage) -> Vec<f64> {
        (0..self.nconfigs())
            .map(|j| {
                let times = self.timing.slice(s![stage as usize, j, ..]);
                let finite: Vec<f64> = times.iter().copied().filter(|t| t.is_finite()).collect();
                if finite.is_empty() {
                    f64::NAN
                } else {
                    finite.iter().sum::<f64>() / finite.len() as f64
                }
            })
            .collect()
    }
}
