//! Flattening of whole input documents.
//!
//! A document is either one object or an array of objects. Every record is
//! flattened with the same file prefix, so records of one file are not told
//! apart by position and overlapping field names produce repeated keys.

use crate::error::FlattenError;
use crate::flatten::flattener::Flattener;
use crate::flatten::keys::KeyBuilder;
use crate::flatten::types::{type_name, LeafPair};
use serde_json::Value;
use std::vec;

/// Lazy leaf pairs of every record in a document, in record order
pub struct DocumentFlattener<'k> {
    keys: &'k KeyBuilder,
    prefix: String,
    records: vec::IntoIter<Value>,
    current: Option<Flattener<'k>>,
}

impl<'k> DocumentFlattener<'k> {
    /// Check the document's top-level shape and prepare to flatten it.
    ///
    /// Shape errors are reported up front, before any pair is produced.
    pub fn new(document: Value, prefix: &str, keys: &'k KeyBuilder) -> Result<Self, FlattenError> {
        let records = match document {
            Value::Object(fields) => vec![Value::Object(fields)],
            Value::Array(items) => {
                if let Some((index, item)) = items.iter().enumerate().find(|(_, v)| !v.is_object()) {
                    return Err(FlattenError::TopLevelShape {
                        found: type_name(item).to_string(),
                        index: Some(index),
                    });
                }
                items
            }
            other => {
                return Err(FlattenError::TopLevelShape {
                    found: type_name(&other).to_string(),
                    index: None,
                })
            }
        };

        Ok(DocumentFlattener {
            keys,
            prefix: prefix.to_string(),
            records: records.into_iter(),
            current: None,
        })
    }

    /// Number of records not yet started
    pub fn remaining_records(&self) -> usize {
        self.records.len()
    }
}

impl Iterator for DocumentFlattener<'_> {
    type Item = Result<LeafPair, FlattenError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(current) = self.current.as_mut() {
                match current.next() {
                    Some(Err(err)) => {
                        self.current = None;
                        self.records = Vec::new().into_iter();
                        return Some(Err(err));
                    }
                    Some(pair) => return Some(pair),
                    None => self.current = None,
                }
            }
            let record = self.records.next()?;
            self.current = Some(Flattener::new(record, self.prefix.as_str(), self.keys));
        }
    }
}

/// Flatten a whole document into an owned list of pairs.
///
/// Nothing is returned unless every record flattens cleanly.
pub fn flatten_document(
    document: Value,
    prefix: &str,
    keys: &KeyBuilder,
) -> Result<Vec<LeafPair>, FlattenError> {
    DocumentFlattener::new(document, prefix, keys)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::types::{FlattenConfig, Scalar};
    use serde_json::json;

    fn keys() -> KeyBuilder {
        KeyBuilder::new(&FlattenConfig::default()).unwrap()
    }

    #[test]
    fn test_single_object() {
        let pairs = flatten_document(json!({"a": 1, "b": "two"}), "f", &keys()).unwrap();
        assert_eq!(
            pairs,
            vec![
                LeafPair::new("f_a", Scalar::Number(1.into())),
                LeafPair::new("f_b", Scalar::String("two".into())),
            ]
        );
    }

    #[test]
    fn test_array_of_objects_shares_prefix() {
        let pairs = flatten_document(json!([{"x": true}, {"x": false}]), "f", &keys()).unwrap();
        assert_eq!(
            pairs,
            vec![
                LeafPair::new("f_x", Scalar::Bool(true)),
                LeafPair::new("f_x", Scalar::Bool(false)),
            ]
        );
    }

    #[test]
    fn test_empty_array_document() {
        let pairs = flatten_document(json!([]), "f", &keys()).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_array_with_non_object_element() {
        let err = flatten_document(json!([{"x": 1}, 5]), "f", &keys()).unwrap_err();
        assert_eq!(
            err,
            FlattenError::TopLevelShape {
                found: "number".to_string(),
                index: Some(1),
            }
        );
    }

    #[test]
    fn test_scalar_document() {
        for (document, found) in [
            (json!("text"), "string"),
            (json!(3), "number"),
            (json!(null), "null"),
            (json!(true), "boolean"),
        ] {
            let err = flatten_document(document, "f", &keys()).unwrap_err();
            assert_eq!(
                err,
                FlattenError::TopLevelShape {
                    found: found.to_string(),
                    index: None,
                }
            );
        }
    }

    #[test]
    fn test_error_in_later_record_stops_iteration() {
        let keys = KeyBuilder::new(&FlattenConfig::default().with_validate_keys(true)).unwrap();
        let document = json!([{"a": 1}, {"b\n": 2}, {"c": 3}]);
        let mut records = DocumentFlattener::new(document, "f", &keys).unwrap();
        assert_eq!(records.remaining_records(), 3);

        assert_eq!(records.next().unwrap().unwrap().key, "f_a");
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
        assert_eq!(records.remaining_records(), 0);
    }
}
