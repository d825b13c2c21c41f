//! Two-group design labels and the effect design matrix

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Group membership of one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupLabel {
    /// Reference group, coded -1
    Group1,
    /// Comparison group, coded +1
    Group2,
}

impl GroupLabel {
    pub fn code(self) -> i8 {
        match self {
            GroupLabel::Group1 => -1,
            GroupLabel::Group2 => 1,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(GroupLabel::Group1),
            1 => Some(GroupLabel::Group2),
            _ => None,
        }
    }
}

/// `n1` Group1 labels followed by `n2` Group2 labels
pub fn group_labels(n1: usize, n2: usize) -> Vec<GroupLabel> {
    std::iter::repeat(GroupLabel::Group1)
        .take(n1)
        .chain(std::iter::repeat(GroupLabel::Group2).take(n2))
        .collect()
}

/// Treatment-coded design without the intercept column
///
/// Levels are ordered by code, the lowest present level is the reference and
/// gets no column. With both groups present this is a single Group2
/// indicator column; with one group only it has no columns at all.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    matrix: Array2<f64>,
}

impl DesignMatrix {
    /// Build the design from per-sample labels
    ///
    /// R equivalent: `model.matrix(~ group)[, -1, drop = FALSE]`
    pub fn from_groups(groups: &[GroupLabel]) -> Self {
        let mut levels: Vec<GroupLabel> = groups.to_vec();
        levels.sort_by_key(|g| g.code());
        levels.dedup();

        if levels.len() < 2 {
            log::debug!("single-group design, effect columns are empty");
        }

        let effect_levels = levels.get(1..).unwrap_or(&[]);
        let mut matrix = Array2::zeros((groups.len(), effect_levels.len()));
        for (i, group) in groups.iter().enumerate() {
            for (j, level) in effect_levels.iter().enumerate() {
                if group == level {
                    matrix[[i, j]] = 1.0;
                }
            }
        }

        Self { matrix }
    }

    /// samples x effect-columns
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Number of non-reference columns (0 or 1)
    pub fn n_effect_columns(&self) -> usize {
        self.matrix.ncols()
    }

    /// Per-sample multiplier of a gene's LFC (sum over effect columns)
    pub fn effect_weights(&self) -> Vec<f64> {
        self.matrix.rows().into_iter().map(|row| row.sum()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_labels_layout() {
        let labels = group_labels(2, 3);
        assert_eq!(labels.len(), 5);
        assert_eq!(labels[1], GroupLabel::Group1);
        assert_eq!(labels[2], GroupLabel::Group2);
    }

    #[test]
    fn test_codes_round_trip() {
        assert_eq!(GroupLabel::from_code(-1), Some(GroupLabel::Group1));
        assert_eq!(GroupLabel::Group2.code(), 1);
        assert_eq!(GroupLabel::from_code(0), None);
    }

    #[test]
    fn test_two_group_design() {
        let design = DesignMatrix::from_groups(&group_labels(2, 2));
        assert_eq!(design.n_effect_columns(), 1);
        assert_eq!(design.effect_weights(), vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_single_group_design_is_empty() {
        let design = DesignMatrix::from_groups(&group_labels(0, 4));
        assert_eq!(design.n_effect_columns(), 0);
        assert_eq!(design.effect_weights(), vec![0.0; 4]);
    }
}
