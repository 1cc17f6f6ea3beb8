use crate::error::LoaderError;
use gait_common::{InflectionData, LabelData, PressureData};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};
use tracing::{debug, instrument};

/// Reads a JSON object mapping each dataset name to its pressure samples.
#[instrument(skip_all, fields(path = %path.display(), num_datasets))]
pub fn load_pressure_data(path: &Path) -> Result<PressureData, LoaderError> {
    let pressure: PressureData = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    tracing::Span::current().record("num_datasets", pressure.len());
    Ok(pressure)
}

/// Reads a JSON object mapping each dataset name to its labelled sample indices.
#[instrument(skip_all, fields(path = %path.display(), num_datasets))]
pub fn load_label_data(path: &Path) -> Result<LabelData, LoaderError> {
    let labels: LabelData = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    tracing::Span::current().record("num_datasets", labels.len());
    Ok(labels)
}

#[instrument(skip_all, fields(path = %path.display()))]
pub fn save_inflections(path: &Path, inflections: &InflectionData) -> Result<(), LoaderError> {
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut file, inflections)?;
    writeln!(file)?;
    file.flush()?;
    debug!(
        "Saved {} inflection points",
        inflections.values().map(Vec::len).sum::<usize>()
    );
    Ok(())
}
