use crate::error::FlattenError;
use crate::flatten::document::DocumentFlattener;
use crate::flatten::keys::KeyBuilder;
use crate::flatten::types::LeafPair;
use serde_json::Value;

/// Accumulates flattened rows across documents, in the order they are added.
///
/// A document contributes either all of its rows or none of them.
pub struct RowCollector<'k> {
    keys: &'k KeyBuilder,
    rows: Vec<LeafPair>,
    documents: usize,
}

impl<'k> RowCollector<'k> {
    pub fn new(keys: &'k KeyBuilder) -> Self {
        RowCollector {
            keys,
            rows: Vec::new(),
            documents: 0,
        }
    }

    /// Flatten `document` under `prefix` and keep its rows.
    ///
    /// Returns the number of rows added. On error the collected rows are left
    /// untouched.
    pub fn add_document(&mut self, document: Value, prefix: &str) -> Result<usize, FlattenError> {
        let start = self.rows.len();
        for pair in DocumentFlattener::new(document, prefix, self.keys)? {
            match pair {
                Ok(pair) => self.rows.push(pair),
                Err(err) => {
                    self.rows.truncate(start);
                    return Err(err);
                }
            }
        }
        self.documents += 1;
        let added = self.rows.len() - start;
        tracing::debug!(prefix, rows = added, "flattened document");
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of documents that contributed (possibly zero) rows
    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn rows(&self) -> &[LeafPair] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<LeafPair> {
        self.rows
    }
}
