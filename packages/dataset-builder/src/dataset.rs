//! Dataset files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::error::DatasetError;
use crate::notify::{NoticeLevel, Notifier};
use crate::task::DatasetRecord;

pub const DEFAULT_OUTPUT_DIR: &str = "datasets";
pub const DEFAULT_DATASET_NAME: &str = "multi_source_dataset";

/// Column order of CSV datasets.
pub const CSV_HEADER: [&str; 7] = [
    "source",
    "query",
    "task",
    "prompt",
    "content",
    "result",
    "processed_by",
];

/// Output file format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    #[default]
    Json,
    Csv,
}

impl DatasetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DatasetFormat::Json => "json",
            DatasetFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DatasetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(DatasetFormat::Json),
            "csv" => Ok(DatasetFormat::Csv),
            other => Err(format!("unknown dataset format: {other}")),
        }
    }
}

/// Writes records to `<output_dir>/<name>.<ext>`.
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    output_dir: PathBuf,
}

impl Default for DatasetWriter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl DatasetWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<(), DatasetError> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    pub fn path_for(&self, name: &str, format: DatasetFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", name, format.extension()))
    }

    /// Write `records` and return the file path.
    pub fn write(
        &self,
        records: &[DatasetRecord],
        name: &str,
        format: DatasetFormat,
    ) -> Result<PathBuf, DatasetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DatasetError::EmptyName);
        }

        self.ensure_dir()?;
        let path = self.path_for(name, format);
        match format {
            DatasetFormat::Json => write_json(&path, records)?,
            DatasetFormat::Csv => write_csv(&path, records)?,
        }

        info!(path = %path.display(), records = records.len(), %format, "Dataset written");
        Ok(path)
    }

    /// Write `records` and report the outcome. An empty result set still
    /// produces a file, preceded by a warning.
    pub fn save(
        &self,
        records: &[DatasetRecord],
        name: &str,
        format: DatasetFormat,
        notifier: &dyn Notifier,
    ) -> Result<PathBuf, DatasetError> {
        if records.is_empty() {
            notifier.notify(
                NoticeLevel::Warning,
                "No task produced a result, saving an empty dataset",
            );
        }

        let path = self.write(records, name, format)?;
        notifier.notify(
            NoticeLevel::Done,
            &format!("Saved {} record(s) at {}", records.len(), path.display()),
        );
        Ok(path)
    }
}

fn write_json(path: &Path, records: &[DatasetRecord]) -> Result<(), DatasetError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn write_csv(path: &Path, records: &[DatasetRecord]) -> Result<(), DatasetError> {
    // Header written explicitly so an empty dataset still has one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a JSON dataset back.
pub fn read_json(path: impl AsRef<Path>) -> Result<Vec<DatasetRecord>, DatasetError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
