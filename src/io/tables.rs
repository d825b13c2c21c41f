//! Delimited output of simulated count matrices and their ground truth
//!
//! Files ending in `.tsv` or `.txt` are tab separated, anything else is
//! comma separated.

use std::path::Path;

use csv::WriterBuilder;

use crate::data::CountMatrix;
use crate::error::{Result, SimError};
use crate::sim::{DeAssignment, SimulatedData};

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tsv") | Some("txt") => b'\t',
        _ => b',',
    }
}

fn writer_for(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    Ok(WriterBuilder::new()
        .delimiter(delimiter_for(path))
        .from_path(path)?)
}

/// Genes in rows, samples in columns; the first column holds gene IDs
pub fn write_count_matrix<P: AsRef<Path>>(path: P, counts: &CountMatrix) -> Result<()> {
    let path = path.as_ref();
    let mut writer = writer_for(path)?;

    let mut header = Vec::with_capacity(counts.n_samples() + 1);
    header.push("gene_id".to_string());
    header.extend(counts.sample_ids().iter().cloned());
    writer.write_record(&header)?;

    for (gene_id, row) in counts.gene_ids().iter().zip(counts.counts().rows()) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(gene_id.clone());
        record.extend(row.iter().map(|c| c.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// One row per gene: DE status, injected LFC and the generating parameters
pub fn write_truth_table<P: AsRef<Path>>(path: P, data: &SimulatedData, truth: &DeAssignment) -> Result<()> {
    let ngenes = data.counts.n_genes();
    if truth.effects.len() != ngenes {
        return Err(SimError::DimensionMismatch {
            expected: format!("{} effects", ngenes),
            got: format!("{} effects", truth.effects.len()),
        });
    }

    let path = path.as_ref();
    let mut writer = writer_for(path)?;
    writer.write_record(["gene_id", "is_de", "lfc", "true_mean", "nb_size", "dropout_prob"])?;

    for (i, gene_id) in data.counts.gene_ids().iter().enumerate() {
        writer.write_record([
            gene_id.clone(),
            truth.is_de(i).to_string(),
            truth.effects[i].to_string(),
            format!("{:.6}", data.true_means[i]),
            format!("{:.6}", data.nb_size[i]),
            format!("{:.6}", data.dropout_prob[i]),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
