use crate::error::WriteError;
use crate::flatten::types::{LeafPair, Scalar};
use serde::Serialize;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Header row of every output file
pub const CSV_HEADERS: [&str; 2] = ["key", "value"];

/// UTF-8 byte order mark written ahead of the header
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Serialize)]
struct CsvRow<'a> {
    key: Cow<'a, str>,
    value: &'a Scalar,
}

/// Replace commas in a key with underscores.
pub fn sanitize_key(key: &str) -> Cow<'_, str> {
    if key.contains(',') {
        Cow::Owned(key.replace(',', "_"))
    } else {
        Cow::Borrowed(key)
    }
}

/// Writes leaf pairs as a two-column `key,value` CSV stream
pub struct PairWriter<W: Write> {
    writer: csv::Writer<W>,
    path: PathBuf,
    rows: usize,
}

impl PairWriter<BufWriter<File>> {
    /// Create (or truncate) the file at `path`, creating parent directories.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, WriteError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(path).map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        PairWriter::new(BufWriter::new(file), path)
    }
}

impl<W: Write> PairWriter<W> {
    /// Start a CSV stream on `inner`: BOM then header. `path` is used in errors.
    pub fn new(mut inner: W, path: impl Into<PathBuf>) -> Result<Self, WriteError> {
        let path = path.into();
        inner.write_all(UTF8_BOM).map_err(|source| WriteError::Io {
            path: path.clone(),
            source,
        })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(inner);
        writer
            .write_record(CSV_HEADERS)
            .map_err(|source| WriteError::Csv {
                path: path.clone(),
                source,
            })?;

        Ok(PairWriter {
            writer,
            path,
            rows: 0,
        })
    }

    pub fn write_pair(&mut self, pair: &LeafPair) -> Result<(), WriteError> {
        let row = CsvRow {
            key: sanitize_key(&pair.key),
            value: &pair.value,
        };
        self.writer.serialize(row).map_err(|source| WriteError::Csv {
            path: self.path.clone(),
            source,
        })?;
        self.rows += 1;
        Ok(())
    }

    pub fn write_pairs<'a, I>(&mut self, pairs: I) -> Result<(), WriteError>
    where
        I: IntoIterator<Item = &'a LeafPair>,
    {
        for pair in pairs {
            self.write_pair(pair)?;
        }
        Ok(())
    }

    /// Rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush the stream and return the row count.
    ///
    /// Fails with [`WriteError::EmptyOutput`] when no row was written.
    pub fn finish(mut self) -> Result<usize, WriteError> {
        self.writer.flush().map_err(|source| WriteError::Io {
            path: self.path.clone(),
            source,
        })?;
        if self.rows == 0 {
            return Err(WriteError::EmptyOutput { path: self.path });
        }
        Ok(self.rows)
    }
}

/// Write `pairs` to a CSV file at `path` and return the number of rows.
///
/// A header-only result is not kept: the file is removed and
/// [`WriteError::EmptyOutput`] returned.
pub fn write_csv<P: AsRef<Path>>(pairs: &[LeafPair], path: P) -> Result<usize, WriteError> {
    let path = path.as_ref();
    let mut writer = PairWriter::create(path)?;
    writer.write_pairs(pairs)?;
    let result = writer.finish();

    if let Err(WriteError::EmptyOutput { .. }) = &result {
        if let Err(err) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), %err, "failed to remove empty output file");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Number;

    fn render(pairs: &[LeafPair]) -> String {
        let mut buffer = Vec::new();
        let mut writer = PairWriter::new(&mut buffer, "memory.csv").unwrap();
        writer.write_pairs(pairs).unwrap();
        assert_eq!(writer.finish().unwrap(), pairs.len());
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_header_bom_and_rows() {
        let output = render(&[
            LeafPair::new("f_a_b", Scalar::Number(Number::from(1))),
            LeafPair::new("f_x", Scalar::Bool(true)),
            LeafPair::new("f_n", Scalar::Null),
        ]);
        assert_eq!(output, "\u{feff}key,value\r\nf_a_b,1\r\nf_x,True\r\nf_n,\r\n");
    }

    #[test]
    fn test_key_commas_are_sanitized_and_values_quoted() {
        let output = render(&[LeafPair::new("a,b", Scalar::String("x,y".into()))]);
        assert!(output.ends_with("a_b,\"x,y\"\r\n"));
    }

    #[test]
    fn test_empty_stream_is_an_error() {
        let mut buffer = Vec::new();
        let writer = PairWriter::new(&mut buffer, "memory.csv").unwrap();
        let err = writer.finish().unwrap_err();
        assert!(matches!(err, WriteError::EmptyOutput { .. }));
    }

    #[test]
    fn test_sanitize_key_borrows_when_clean() {
        assert!(matches!(sanitize_key("clean"), Cow::Borrowed("clean")));
        assert_eq!(sanitize_key("a,b,c"), "a_b_c");
    }
}
