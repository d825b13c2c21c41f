//! Count matrices and two-group design

mod count_matrix;
mod design;

pub use count_matrix::CountMatrix;
pub use design::{group_labels, DesignMatrix, GroupLabel};
