//! JSON storage of estimated parameter bundles

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::Result;
use crate::params::EstimatedParams;

/// Load and validate an estimated bundle
pub fn read_estimated_params<P: AsRef<Path>>(path: P) -> Result<EstimatedParams> {
    let reader = BufReader::new(File::open(path)?);
    let params: EstimatedParams = serde_json::from_reader(reader)?;
    params.validate()?;
    log::debug!(
        "Estimated parameters: {} means, {} fit knots, dropout fit: {}",
        params.means.len(),
        params.mean_dispersion_fit.x.len(),
        params.dropout_fit.is_some()
    );
    Ok(params)
}

/// Store an estimated bundle as pretty-printed JSON
pub fn write_estimated_params<P: AsRef<Path>>(path: P, params: &EstimatedParams) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, params)?;
    Ok(())
}
