//! Simulated count matrix

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use super::GroupLabel;
use crate::error::{Result, SimError};

/// Integer count matrix produced by the generator
/// Rows are genes, columns are samples; every column carries its group label.
#[derive(Debug, Clone, PartialEq)]
pub struct CountMatrix {
    counts: Array2<u32>,
    gene_ids: Vec<String>,
    sample_ids: Vec<String>,
    groups: Vec<GroupLabel>,
}

impl CountMatrix {
    /// Wrap raw counts with explicit identifiers
    pub fn new(
        counts: Array2<u32>,
        gene_ids: Vec<String>,
        sample_ids: Vec<String>,
        groups: Vec<GroupLabel>,
    ) -> Result<Self> {
        let (n_genes, n_samples) = counts.dim();

        if gene_ids.len() != n_genes {
            return Err(SimError::DimensionMismatch {
                expected: format!("{} gene IDs", n_genes),
                got: format!("{} gene IDs", gene_ids.len()),
            });
        }
        if sample_ids.len() != n_samples {
            return Err(SimError::DimensionMismatch {
                expected: format!("{} sample IDs", n_samples),
                got: format!("{} sample IDs", sample_ids.len()),
            });
        }
        if groups.len() != n_samples {
            return Err(SimError::DimensionMismatch {
                expected: format!("{} group labels", n_samples),
                got: format!("{} group labels", groups.len()),
            });
        }

        Ok(Self {
            counts,
            gene_ids,
            sample_ids,
            groups,
        })
    }

    /// Wrap raw counts, naming rows `gene_<i>` and columns `sample_<j>` (1-based)
    pub fn with_synthetic_ids(counts: Array2<u32>, groups: Vec<GroupLabel>) -> Result<Self> {
        let (n_genes, n_samples) = counts.dim();
        let gene_ids = (1..=n_genes).map(|i| format!("gene_{}", i)).collect();
        let sample_ids = (1..=n_samples).map(|j| format!("sample_{}", j)).collect();
        Self::new(counts, gene_ids, sample_ids, groups)
    }

    /// Get the number of genes
    pub fn n_genes(&self) -> usize {
        self.counts.nrows()
    }

    /// Get the number of samples
    pub fn n_samples(&self) -> usize {
        self.counts.ncols()
    }

    /// Get the counts as a view
    pub fn counts(&self) -> ArrayView2<'_, u32> {
        self.counts.view()
    }

    /// Get gene IDs
    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    /// Get sample IDs
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get the group label of every sample
    pub fn groups(&self) -> &[GroupLabel] {
        &self.groups
    }

    /// Counts for one gene across samples
    pub fn gene_counts(&self, gene_idx: usize) -> ArrayView1<'_, u32> {
        self.counts.row(gene_idx)
    }

    /// Column indices belonging to `group`, in column order
    pub fn group_columns(&self, group: GroupLabel) -> Vec<usize> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, &g)| g == group)
            .map(|(j, _)| j)
            .collect()
    }

    /// Total count per sample
    pub fn library_sizes(&self) -> Vec<u64> {
        self.counts
            .axis_iter(Axis(1))
            .map(|col| col.iter().map(|&c| c as u64).sum())
            .collect()
    }

    /// Mean count per gene
    pub fn gene_means(&self) -> Vec<f64> {
        let n = self.n_samples().max(1) as f64;
        self.counts
            .axis_iter(Axis(0))
            .map(|row| row.iter().map(|&c| c as f64).sum::<f64>() / n)
            .collect()
    }

    /// Keep the given columns, in the given order
    pub fn subset_samples(&self, sample_indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = sample_indices.iter().find(|&&j| j >= self.n_samples()) {
            return Err(SimError::InvalidInput {
                reason: format!(
                    "sample index {} out of range for {} samples",
                    bad,
                    self.n_samples()
                ),
            });
        }

        let counts = self.counts.select(Axis(1), sample_indices);
        let sample_ids = sample_indices.iter().map(|&j| self.sample_ids[j].clone()).collect();
        let groups = sample_indices.iter().map(|&j| self.groups[j]).collect();
        Self::new(counts, self.gene_ids.clone(), sample_ids, groups)
    }

    /// First `n1` Group1 columns followed by the first `n2` Group2 columns
    pub fn subset_groups(&self, n1: usize, n2: usize) -> Result<Self> {
        let g1 = self.group_columns(GroupLabel::Group1);
        let g2 = self.group_columns(GroupLabel::Group2);
        if n1 > g1.len() || n2 > g2.len() {
            return Err(SimError::DimensionMismatch {
                expected: format!("at most {} + {} samples", g1.len(), g2.len()),
                got: format!("{} + {} samples", n1, n2),
            });
        }

        let columns: Vec<usize> = g1[..n1].iter().chain(g2[..n2].iter()).copied().collect();
        self.subset_samples(&columns)
    }

    /// Drop genes whose counts sum to zero
    ///
    /// Returns the filtered matrix together with the original row index of
    /// every surviving gene.
    pub fn drop_zero_genes(&self) -> (Self, Vec<usize>) {
        let keep: Vec<usize> = self
            .counts
            .axis_iter(Axis(0))
            .enumerate()
            .filter(|(_, row)| row.iter().any(|&c| c > 0))
            .map(|(i, _)| i)
            .collect();

        let filtered = Self {
            counts: self.counts.select(Axis(0), &keep),
            gene_ids: keep.iter().map(|&i| self.gene_ids[i].clone()).collect(),
            sample_ids: self.sample_ids.clone(),
            groups: self.groups.clone(),
        };
        (filtered, keep)
    }
}
