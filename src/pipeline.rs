//! End-to-end conversion: discover, load, flatten, write.

use crate::error::{Error, Result};
use crate::flatten::{write_csv, FlattenConfig, KeyBuilder, RowCollector};
use crate::input::{discover_json_files, file_prefix, load_json};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

/// Options for one conversion run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// A `.json` file or a directory of them
    pub input: PathBuf,
    /// Destination CSV file
    pub output: PathBuf,
    pub config: FlattenConfig,
}

/// An input file that was left out of the output
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub output: PathBuf,
    pub files_converted: usize,
    pub skipped: Vec<SkippedFile>,
    pub rows_written: usize,
}

/// Convert every JSON file under `options.input` into one CSV file.
///
/// Files that fail to load or flatten are skipped with a warning. The run
/// fails if no file yields any row or if the CSV cannot be written.
pub fn convert(options: &ConvertOptions) -> Result<ConversionSummary> {
    let keys = KeyBuilder::new(&options.config)?;
    let files = discover_json_files(&options.input)?;
    info!(files = files.len(), input = %options.input.display(), "discovered input files");

    let mut collector = RowCollector::new(&keys);
    let mut skipped = Vec::new();

    for path in &files {
        let _span = info_span!("file", path = %path.display()).entered();
        if let Err(err) = add_file(&mut collector, path) {
            warn!(%err, "skipping file");
            skipped.push(SkippedFile {
                path: path.clone(),
                reason: err.to_string(),
            });
        }
    }

    if collector.is_empty() {
        return Err(Error::NoData { files: files.len() });
    }

    let files_converted = collector.documents();
    let rows = collector.into_rows();
    let rows_written = {
        let _span = info_span!("write", output = %options.output.display()).entered();
        write_csv(&rows, &options.output)?
    };
    info!(rows = rows_written, "wrote CSV");

    Ok(ConversionSummary {
        output: options.output.clone(),
        files_converted,
        skipped,
        rows_written,
    })
}

fn add_file(collector: &mut RowCollector<'_>, path: &Path) -> Result<usize> {
    let document = load_json(path)?;
    let rows = collector.add_document(document, &file_prefix(path))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, InputError};

    #[test]
    fn test_invalid_separator_fails_before_reading_input() {
        let options = ConvertOptions {
            input: PathBuf::from("/definitely/not/here"),
            output: PathBuf::from("out.csv"),
            config: FlattenConfig::default().with_separator(","),
        };
        let err = convert(&options).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidSeparator { .. })));
    }

    #[test]
    fn test_missing_input() {
        let options = ConvertOptions {
            input: PathBuf::from("/definitely/not/here"),
            output: PathBuf::from("out.csv"),
            config: FlattenConfig::default(),
        };
        let err = convert(&options).unwrap_err();
        assert!(matches!(err, Error::Input(InputError::NotFound { .. })));
    }
}
