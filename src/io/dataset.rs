//! CSV persistence for the synthetic training dataset.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::datagen::TrainingRecord;

/// Failure while reading or writing a dataset file.
#[derive(Debug)]
pub enum DatasetError {
    /// Underlying file I/O failure.
    Io(io::Error),
    /// CSV encoding or parse failure.
    Csv(csv::Error),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Io(e) => write!(f, "dataset i/o error: {e}"),
            DatasetError::Csv(e) => write!(f, "dataset csv error: {e}"),
        }
    }
}

impl std::error::Error for DatasetError {}

impl From<io::Error> for DatasetError {
    fn from(e: io::Error) -> Self {
        DatasetError::Io(e)
    }
}

impl From<csv::Error> for DatasetError {
    fn from(e: csv::Error) -> Self {
        DatasetError::Csv(e)
    }
}

/// Writes the dataset to a CSV file at the given path.
///
/// Produces a header row followed by one row per record, in the record
/// field order. Deterministic for identical inputs.
///
/// # Errors
///
/// Returns a `DatasetError` if file creation or writing fails.
pub fn write_dataset(records: &[TrainingRecord], path: &Path) -> Result<(), DatasetError> {
    let file = File::create(path)?;
    write_dataset_to(records, BufWriter::new(file))
}

/// Writes the dataset as CSV to any writer.
///
/// # Errors
///
/// Returns a `DatasetError` if writing fails.
pub fn write_dataset_to(records: &[TrainingRecord], writer: impl Write) -> Result<(), DatasetError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads a dataset CSV file into records.
///
/// # Errors
///
/// Returns a `DatasetError` if the file is missing, unreadable, or any
/// row fails to parse. Partial datasets are not returned.
pub fn read_dataset(path: &Path) -> Result<Vec<TrainingRecord>, DatasetError> {
    let file = File::open(path)?;
    read_dataset_from(BufReader::new(file))
}

/// Reads dataset records from any CSV reader.
///
/// # Errors
///
/// Returns a `DatasetError` if any row fails to parse.
pub fn read_dataset_from(reader: impl Read) -> Result<Vec<TrainingRecord>, DatasetError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        records.push(result?);
    }
    Ok(records)
}
