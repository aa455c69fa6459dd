//! Error types for JSON flattening and CSV output.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Rejected configuration, reported before any input is flattened.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("separator cannot be empty")]
    EmptySeparator,

    /// The separator is a comma or contains a comma, CR or LF.
    #[error("separator {separator:?} cannot be a comma or contain a comma or newline")]
    InvalidSeparator { separator: String },

    #[error("invalid index format {spec:?}: {reason}")]
    InvalidIndexFormat { spec: String, reason: String },

    #[error("max key length must be greater than zero")]
    ZeroMaxKeyLength,
}

/// Why a composed key failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyViolation {
    TooLong { length: usize, max: usize },
    ForbiddenChar { ch: char },
}

impl fmt::Display for KeyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyViolation::TooLong { length, max } => {
                write!(f, "key is {length} chars long (max {max})")
            }
            KeyViolation::ForbiddenChar { ch } => {
                write!(f, "key contains forbidden character {ch:?}")
            }
        }
    }
}

/// Errors raised while flattening a single document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlattenError {
    /// An object key was not a string. `serde_json` only produces string keys,
    /// so this is only reachable for values built by other means.
    #[error("keys must be strings, got {found} under {parent:?}")]
    InvalidKeyType { parent: String, found: String },

    #[error("invalid key {key:?}: {violation}")]
    KeyValidation { key: String, violation: KeyViolation },

    #[error("unsupported value of type {found} at {key:?}")]
    UnsupportedValue { key: String, found: String },

    /// The document is not an object or an array of objects. `index` names the
    /// offending array element when the top level is an array.
    #[error("{}", top_level_message(.found, .index))]
    TopLevelShape { found: String, index: Option<usize> },
}

fn top_level_message(found: &str, index: &Option<usize>) -> String {
    match index {
        Some(index) => format!("array elements must be objects, got {found} at index {index}"),
        None => format!("JSON must be an object or array of objects, got {found}"),
    }
}

/// Errors raised while writing the CSV output. All of them abort the run.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("no valid data to write to {path}")]
    EmptyOutput { path: PathBuf },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV to {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Errors raised while locating or reading input files.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("path does not exist: {path}")]
    NotFound { path: PathBuf },

    #[error("not a .json file: {path}")]
    NotJsonFile { path: PathBuf },

    #[error("no JSON files found in: {path}")]
    NoJsonFiles { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Top-level error for a conversion run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Flatten(#[from] FlattenError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("no valid data found in {files} input file(s)")]
    NoData { files: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validation_display() {
        let err = FlattenError::KeyValidation {
            key: "a,b".to_string(),
            violation: KeyViolation::ForbiddenChar { ch: ',' },
        };
        assert_eq!(
            err.to_string(),
            "invalid key \"a,b\": key contains forbidden character ','"
        );
    }

    #[test]
    fn test_top_level_shape_display() {
        let err = FlattenError::TopLevelShape {
            found: "number".to_string(),
            index: Some(2),
        };
        assert_eq!(
            err.to_string(),
            "array elements must be objects, got number at index 2"
        );

        let err = FlattenError::TopLevelShape {
            found: "string".to_string(),
            index: None,
        };
        assert!(err.to_string().contains("got string"));
    }

    #[test]
    fn test_error_from_config() {
        let err: Error = ConfigError::EmptySeparator.into();
        assert!(matches!(err, Error::Config(ConfigError::EmptySeparator)));
    }
}
