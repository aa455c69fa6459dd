//! JSON flattening - turn nested JSON into `key,value` rows
//!
//! This module walks JSON documents depth-first and produces one leaf pair
//! per scalar, keyed by the separator-joined path that leads to it.
//!
//! ## Pipeline
//!
//! [`KeyBuilder`] composes key paths, [`Flattener`] walks a single value,
//! [`DocumentFlattener`] applies it to an object or an array of objects,
//! [`RowCollector`] gathers rows across documents and [`PairWriter`]
//! serializes them as CSV.

pub mod types;
pub mod keys;
pub mod flattener;
pub mod document;
pub mod collector;
pub mod writer;

pub use types::{FlattenConfig, IndexAlign, IndexFormat, IndexRadix, LeafPair, Scalar};
pub use keys::{KeyBuilder, Segment};
pub use flattener::{flatten_value, Flattener};
pub use document::{flatten_document, DocumentFlattener};
pub use collector::RowCollector;
pub use writer::{write_csv, PairWriter};
