use crate::error::FlattenError;
use crate::flatten::keys::{KeyBuilder, Segment};
use crate::flatten::types::{type_name, LeafPair, Scalar};
use serde_json::{map, Value};
use std::iter::Enumerate;
use std::vec;

/// Pending work on the traversal stack
enum Frame {
    /// A value not yet inspected, with the key that leads to it
    Value { key: String, value: Value },
    /// An object whose remaining fields are still to be visited
    Fields { key: String, fields: map::IntoIter },
    /// An array whose remaining elements are still to be visited
    Items {
        key: String,
        items: Enumerate<vec::IntoIter<Value>>,
    },
}

/// Depth-first, left-to-right walk over a JSON value that yields one
/// [`LeafPair`] per scalar.
///
/// The walk consumes the value and keeps its own stack, so input depth is
/// bounded by heap rather than call stack. Once an error has been yielded the
/// iterator is exhausted.
pub struct Flattener<'k> {
    keys: &'k KeyBuilder,
    stack: Vec<Frame>,
}

impl<'k> Flattener<'k> {
    /// Start flattening `value` with `root_key` as the accumulated parent key
    pub fn new(value: Value, root_key: impl Into<String>, keys: &'k KeyBuilder) -> Self {
        Flattener {
            keys,
            stack: vec![Frame::Value {
                key: root_key.into(),
                value,
            }],
        }
    }

    fn fail(&mut self, err: FlattenError) -> Option<Result<LeafPair, FlattenError>> {
        self.stack.clear();
        Some(Err(err))
    }
}

impl Iterator for Flattener<'_> {
    type Item = Result<LeafPair, FlattenError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let child = match self.stack.pop()? {
                Frame::Value { key, value } => match Scalar::from_value(value) {
                    Ok(scalar) => return Some(Ok(LeafPair::new(key, scalar))),
                    Err(Value::Object(fields)) => {
                        self.stack.push(Frame::Fields {
                            key,
                            fields: fields.into_iter(),
                        });
                        continue;
                    }
                    Err(Value::Array(items)) => {
                        self.stack.push(Frame::Items {
                            key,
                            items: items.into_iter().enumerate(),
                        });
                        continue;
                    }
                    Err(other) => {
                        return self.fail(FlattenError::UnsupportedValue {
                            key,
                            found: type_name(&other).to_string(),
                        });
                    }
                },
                Frame::Fields { key, mut fields } => {
                    let Some((name, value)) = fields.next() else {
                        continue;
                    };
                    let child = self.keys.compose(&key, Segment::Field(&name));
                    self.stack.push(Frame::Fields { key, fields });
                    child.map(|key| (key, value))
                }
                Frame::Items { key, mut items } => {
                    let Some((index, value)) = items.next() else {
                        continue;
                    };
                    let child = self.keys.compose(&key, Segment::Index(index));
                    self.stack.push(Frame::Items { key, items });
                    child.map(|key| (key, value))
                }
            };

            match child {
                Ok((key, value)) => self.stack.push(Frame::Value { key, value }),
                Err(err) => return self.fail(err),
            }
        }
    }
}

/// Flatten `value` eagerly into an owned, ordered list of pairs.
pub fn flatten_value(
    value: Value,
    root_key: &str,
    keys: &KeyBuilder,
) -> Result<Vec<LeafPair>, FlattenError> {
    Flattener::new(value, root_key, keys).collect()
}
