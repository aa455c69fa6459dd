//! # json2csv - flatten JSON documents into a `key,value` CSV
//!
//! Nested objects and arrays are walked depth-first and every scalar becomes
//! one row, keyed by the path that leads to it. Object fields contribute their
//! names, array elements their index rendered through an index format
//! (zero-padded to four digits by default).
//!
//! ## Modules
//!
//! - **flatten**: key composition, the flattener, and the CSV writer
//! - **input**: discovery and parsing of `.json` files
//! - **pipeline**: a whole run from input path to CSV file
//! - **logging**: `tracing` subscriber setup for the binary
//!
//! ## Quick Start
//!
//! ```rust
//! use json2csv::flatten::{flatten_document, FlattenConfig, KeyBuilder};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let data = json!({"a": {"b": 1, "c": [10, 20]}});
//!
//! let keys = KeyBuilder::new(&FlattenConfig::default())?;
//! let rows = flatten_document(data, "f", &keys)?;
//!
//! let keys: Vec<_> = rows.iter().map(|row| row.key.as_str()).collect();
//! assert_eq!(keys, ["f_a_b", "f_a_c_0000", "f_a_c_0001"]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod flatten;
pub mod input;
pub mod logging;
pub mod pipeline;

// Re-export commonly used types for convenience
pub use error::{ConfigError, Error, FlattenError, InputError, KeyViolation, WriteError};
pub use flatten::{
    flatten_document, flatten_value, write_csv, FlattenConfig, IndexFormat, KeyBuilder, LeafPair,
    RowCollector, Scalar,
};
pub use pipeline::{convert, ConversionSummary, ConvertOptions, SkippedFile};
