//! Reading parameter bundles and writing simulated data

mod params;
mod tables;

pub use params::{read_estimated_params, write_estimated_params};
pub use tables::{write_count_matrix, write_truth_table};
