//! Key path composition.

use crate::error::{ConfigError, FlattenError, KeyViolation};
use crate::flatten::types::{FlattenConfig, IndexFormat, FORBIDDEN_KEY_CHARS};

/// A child of a container: an object field name or an array position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Field(&'a str),
    Index(usize),
}

/// Composes parent keys with child segments.
///
/// Built once from a validated [`FlattenConfig`], so the separator is never
/// re-checked per key.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    separator: String,
    index_format: IndexFormat,
    max_key_length: Option<usize>,
}

impl KeyBuilder {
    pub fn new(config: &FlattenConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(KeyBuilder {
            separator: config.separator.clone(),
            index_format: config.index_format.clone(),
            max_key_length: config.validate_keys.then_some(config.max_key_length),
        })
    }

    pub fn validates_keys(&self) -> bool {
        self.max_key_length.is_some()
    }

    /// Join `parent` and `segment`. An empty parent yields the segment alone.
    pub fn compose(&self, parent: &str, segment: Segment<'_>) -> Result<String, FlattenError> {
        let rendered;
        let child = match segment {
            Segment::Field(name) => name,
            Segment::Index(index) => {
                rendered = self.index_format.render(index);
                rendered.as_str()
            }
        };

        let key = if parent.is_empty() {
            child.to_string()
        } else {
            let mut key = String::with_capacity(parent.len() + self.separator.len() + child.len());
            key.push_str(parent);
            key.push_str(&self.separator);
            key.push_str(child);
            key
        };

        if let Some(max) = self.max_key_length {
            check_key(&key, max).map_err(|violation| FlattenError::KeyValidation {
                key: key.clone(),
                violation,
            })?;
        }

        Ok(key)
    }
}

/// Check a key against the length limit and the CSV-breaking characters.
pub fn check_key(key: &str, max_length: usize) -> Result<(), KeyViolation> {
    let length = key.chars().count();
    if length > max_length {
        return Err(KeyViolation::TooLong {
            length,
            max: max_length,
        });
    }
    if let Some(ch) = key.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c)) {
        return Err(KeyViolation::ForbiddenChar { ch });
    }
    Ok(())
}
