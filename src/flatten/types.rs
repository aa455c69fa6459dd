use crate::error::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Default separator between key path segments
pub const DEFAULT_SEPARATOR: &str = "_";

/// Default index format: zero-padded to four digits
pub const DEFAULT_INDEX_FORMAT: &str = "{:04d}";

/// Default maximum key length, enforced only when key validation is on
pub const DEFAULT_MAX_KEY_LENGTH: usize = 256;

/// Characters that would break a CSV row or a key path
pub const FORBIDDEN_KEY_CHARS: [char; 3] = [',', '\r', '\n'];

static INDEX_FORMAT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<prefix>[^{}]*)\{0?",
        r"(?::(?:(?P<fill>[^{}])?(?P<align>[<>^]))?(?P<zero>0)?(?P<width>[0-9]+)?(?P<kind>[dxXob])?)?",
        r"\}(?P<suffix>[^{}]*)$",
    ))
        .expect("index format regex is valid")
});

/// Radix used when rendering an array index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexRadix {
    Decimal,
    LowerHex,
    UpperHex,
    Octal,
    Binary,
}

/// Side of the padded field the digits are placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexAlign {
    Left,
    Right,
    /// Extra padding goes on the right when it does not split evenly
    Center,
}

/// Rule for rendering an array position into a key segment.
///
/// Parsed from a brace template such as `{:04d}`, `[{:3}]` or `{0:_>4x}`:
/// literal prefix, one placeholder, literal suffix. The placeholder takes an
/// optional positional `0`, then `:[[fill]align][0][width][type]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexFormat {
    /// Plain decimal, no padding
    Decimal,
    Template {
        prefix: String,
        suffix: String,
        width: usize,
        fill: char,
        align: IndexAlign,
        radix: IndexRadix,
    },
}

impl IndexFormat {
    /// Parse `spec`, falling back to plain decimal when it is not a valid template.
    pub fn parse_or_decimal(spec: &str) -> Self {
        match spec.parse() {
            Ok(format) => format,
            Err(err) => {
                tracing::warn!(%err, "falling back to decimal array indices");
                IndexFormat::Decimal
            }
        }
    }

    /// Render a zero-based array index
    pub fn render(&self, index: usize) -> String {
        match self {
            IndexFormat::Decimal => index.to_string(),
            IndexFormat::Template {
                prefix,
                suffix,
                width,
                fill,
                align,
                radix,
            } => {
                let digits = match radix {
                    IndexRadix::Decimal => index.to_string(),
                    IndexRadix::LowerHex => format!("{index:x}"),
                    IndexRadix::UpperHex => format!("{index:X}"),
                    IndexRadix::Octal => format!("{index:o}"),
                    IndexRadix::Binary => format!("{index:b}"),
                };
                let pad = width.saturating_sub(digits.chars().count());
                let (left, right) = match align {
                    IndexAlign::Left => (0, pad),
                    IndexAlign::Right => (pad, 0),
                    IndexAlign::Center => (pad / 2, pad - pad / 2),
                };
                let mut rendered =
                    String::with_capacity(prefix.len() + digits.len() + pad * fill.len_utf8() + suffix.len());
                rendered.push_str(prefix);
                rendered.extend(std::iter::repeat(*fill).take(left));
                rendered.push_str(&digits);
                rendered.extend(std::iter::repeat(*fill).take(right));
                rendered.push_str(suffix);
                rendered
            }
        }
    }
}

impl Default for IndexFormat {
    fn default() -> Self {
        IndexFormat::Template {
            prefix: String::new(),
            suffix: String::new(),
            width: 4,
            fill: '0',
            align: IndexAlign::Right,
            radix: IndexRadix::Decimal,
        }
    }
}

impl FromStr for IndexFormat {
    type Err = ConfigError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidIndexFormat {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let caps = INDEX_FORMAT_REGEX
            .captures(spec)
            .ok_or_else(|| invalid("expected exactly one placeholder like {:04d}"))?;

        let width = match caps.name("width") {
            Some(m) => m
                .as_str()
                .parse::<usize>()
                .map_err(|_| invalid("width is out of range"))?,
            None => 0,
        };

        let radix = match caps.name("kind").map(|m| m.as_str()) {
            None | Some("d") => IndexRadix::Decimal,
            Some("x") => IndexRadix::LowerHex,
            Some("X") => IndexRadix::UpperHex,
            Some("o") => IndexRadix::Octal,
            Some("b") => IndexRadix::Binary,
            Some(_) => return Err(invalid("unknown format type")),
        };

        // An explicit fill wins over the `0` flag
        let fill = match (caps.name("fill"), caps.name("zero")) {
            (Some(m), _) => m.as_str().chars().next().unwrap_or(' '),
            (None, Some(_)) => '0',
            (None, None) => ' ',
        };
        let align = match caps.name("align").map(|m| m.as_str()) {
            Some("<") => IndexAlign::Left,
            Some("^") => IndexAlign::Center,
            _ => IndexAlign::Right,
        };

        Ok(IndexFormat::Template {
            prefix: caps["prefix"].to_string(),
            suffix: caps["suffix"].to_string(),
            width,
            fill,
            align,
            radix,
        })
    }
}

/// Configuration for the flattening process
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Separator placed between key path segments
    pub separator: String,

    /// How array positions are rendered into key segments
    pub index_format: IndexFormat,

    /// Reject keys that are too long or contain CSV-breaking characters
    pub validate_keys: bool,

    /// Maximum key length in characters when `validate_keys` is set
    pub max_key_length: usize,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            separator: String::from(DEFAULT_SEPARATOR),
            index_format: IndexFormat::default(),
            validate_keys: false,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
        }
    }
}

impl FlattenConfig {
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    #[must_use]
    pub fn with_index_format(mut self, index_format: IndexFormat) -> Self {
        self.index_format = index_format;
        self
    }

    #[must_use]
    pub fn with_validate_keys(mut self, enable: bool) -> Self {
        self.validate_keys = enable;
        self
    }

    #[must_use]
    pub fn with_max_key_length(mut self, max: usize) -> Self {
        self.max_key_length = max;
        self
    }

    /// Check the separator and key length limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.separator.is_empty() {
            return Err(ConfigError::EmptySeparator);
        }
        if self.separator.contains(&FORBIDDEN_KEY_CHARS[..]) {
            return Err(ConfigError::InvalidSeparator {
                separator: self.separator.clone(),
            });
        }
        if self.validate_keys && self.max_key_length == 0 {
            return Err(ConfigError::ZeroMaxKeyLength);
        }
        Ok(())
    }
}

/// A JSON leaf value: the only kinds of value that become output rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    /// Take the scalar out of a JSON value, handing containers back unchanged.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(b)),
            Value::Number(n) => Ok(Scalar::Number(n)),
            Value::String(s) => Ok(Scalar::String(s)),
            container => Err(container),
        }
    }
}

/// Cell text: empty for null, `True`/`False` for booleans, JSON text for numbers.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(true) => f.write_str("True"),
            Scalar::Bool(false) => f.write_str("False"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::String(s) => serializer.serialize_str(s),
            other => serializer.collect_str(other),
        }
    }
}

/// One flattened row: a key path and the leaf value found there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafPair {
    pub key: String,
    pub value: Scalar,
}

impl LeafPair {
    pub fn new(key: impl Into<String>, value: Scalar) -> Self {
        LeafPair {
            key: key.into(),
            value,
        }
    }
}

/// Human-readable name of a JSON value's type, for diagnostics
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
