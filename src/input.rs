//! Input discovery and loading.

use crate::error::InputError;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Extension of accepted input files, compared case-insensitively
pub const JSON_EXTENSION: &str = "json";

/// Extension of generated output files
pub const CSV_EXTENSION: &str = "csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(JSON_EXTENSION))
        .unwrap_or(false)
}

/// Collect the JSON files named by `path`.
///
/// A file must have a `.json` extension. A directory is scanned without
/// recursion and must contain at least one `.json` file. Files are returned
/// sorted by name.
pub fn discover_json_files(path: &Path) -> Result<Vec<PathBuf>, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if path.is_file() {
        if has_json_extension(path) {
            return Ok(vec![path.to_path_buf()]);
        }
        return Err(InputError::NotJsonFile {
            path: path.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file = entry.path();
        if file.is_file() && has_json_extension(&file) {
            files.push(file);
        }
    }

    if files.is_empty() {
        return Err(InputError::NoJsonFiles {
            path: path.to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Deepest nesting handed to simd-json, which recurses without a limit.
/// Matches serde_json's own recursion limit.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Longest integer literal (in digits) that survives simd-json unchanged
const MAX_EXACT_DIGITS: usize = 18;

/// Read and parse one JSON document.
///
/// Parsing goes through simd-json when a quick scan shows it is safe; on
/// failure the bytes are re-parsed with serde_json to report the line and
/// column of the problem.
pub fn load_json(path: &Path) -> Result<Value, InputError> {
    let bytes = std::fs::read(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&bytes).map_err(|message| InputError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// What a byte scan learns about a document before it is parsed
#[derive(Debug, Default, PartialEq, Eq)]
struct Scan {
    depth: usize,
    /// Some number literal is a float, has an exponent, or is too long for a
    /// 64-bit integer, so only serde_json keeps its text exactly
    inexact_numbers: bool,
}

impl Scan {
    fn simd_safe(&self) -> bool {
        self.depth <= MAX_NESTING_DEPTH && !self.inexact_numbers
    }
}

fn scan(bytes: &[u8]) -> Scan {
    let mut scan = Scan::default();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                scan.depth = scan.depth.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            b'-' | b'0'..=b'9' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i], b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9') {
                    i += 1;
                }
                let literal = &bytes[start..i];
                let digits = literal.iter().filter(|b| b.is_ascii_digit()).count();
                if digits > MAX_EXACT_DIGITS || literal.iter().any(|b| matches!(b, b'.' | b'e' | b'E')) {
                    scan.inexact_numbers = true;
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    scan
}

fn parse_json(bytes: &[u8]) -> Result<Value, String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let shape = scan(bytes);
    if !shape.simd_safe() {
        tracing::debug!(depth = shape.depth, inexact_numbers = shape.inexact_numbers, "parsing with serde_json");
        return serde_json::from_slice::<Value>(bytes).map_err(|err| err.to_string());
    }

    // simd-json parses in place, so it gets its own copy
    let mut scratch = bytes.to_vec();
    match simd_json::serde::from_slice::<Value>(&mut scratch) {
        Ok(value) => Ok(value),
        Err(simd_err) => match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => {
                tracing::debug!(%simd_err, "simd-json rejected input accepted by serde_json");
                Ok(value)
            }
            Err(err) => Err(err.to_string()),
        },
    }
}

/// Per-file key prefix: the file name without its extension
pub fn file_prefix(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Timestamped output path `output_YYYYMMDD_HHMMSS.csv` inside `dir`
pub fn default_output_path(dir: &Path, now: NaiveDateTime) -> PathBuf {
    dir.join(format!(
        "output_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        CSV_EXTENSION
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_parse_keeps_field_order() {
        let value = parse_json(br#"{"b": 1, "a": [true, null]}"#).unwrap();
        assert_eq!(value, json!({"b": 1, "a": [true, null]}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_parse_strips_bom() {
        let value = parse_json(b"\xEF\xBB\xBF{\"a\": 1}").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_parse_error_has_position() {
        let message = parse_json(b"{\"a\": }").unwrap_err();
        assert!(message.contains("line 1"), "{message}");
    }

    #[test]
    fn test_scan_depth_and_numbers() {
        assert_eq!(
            scan(br#"{"a": [1, {"b": "[[[{"}]}"#),
            Scan {
                depth: 3,
                inexact_numbers: false
            }
        );
        assert!(scan(br#"{"f": 1.5}"#).inexact_numbers);
        assert!(scan(br#"{"e": 1e5}"#).inexact_numbers);
        assert!(scan(br#"{"n": 1234567890123456789}"#).inexact_numbers);
        assert!(!scan(br#"{"s": "1.5", "t": true, "n": -42}"#).inexact_numbers);
    }

    #[test]
    fn test_too_deep_input_is_a_parse_error() {
        let depth = 100_000;
        let text = format!("{{\"a\":{}1{}}}", "[".repeat(depth), "]".repeat(depth));
        let message = parse_json(text.as_bytes()).unwrap_err();
        assert!(message.contains("recursion limit exceeded"), "{message}");
    }

    #[test]
    fn test_large_integers_keep_their_digits() {
        let value = parse_json(br#"{"n": 123456789012345678901234567890, "m": 18446744073709551616}"#).unwrap();
        assert_eq!(value["n"].to_string(), "123456789012345678901234567890");
        assert_eq!(value["m"].to_string(), "18446744073709551616");
    }

    #[test]
    fn test_number_text_is_kept() {
        let value = parse_json(br#"[1.0, 1e5, -0.25, 7]"#).unwrap();
        let rendered: Vec<_> = value.as_array().unwrap().iter().map(Value::to_string).collect();
        assert_eq!(rendered, vec!["1.0", "1e5", "-0.25", "7"]);
    }

    #[test]
    fn test_file_prefix() {
        assert_eq!(file_prefix(Path::new("/data/users.json")), "users");
        assert_eq!(file_prefix(Path::new("archive.v2.JSON")), "archive.v2");
    }

    #[test]
    fn test_default_output_path() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(11, 37, 5)
            .unwrap();
        assert_eq!(
            default_output_path(Path::new("out"), now),
            PathBuf::from("out/output_20250610_113705.csv")
        );
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        assert!(has_json_extension(Path::new("a.JSON")));
        assert!(has_json_extension(Path::new("a.json")));
        assert!(!has_json_extension(Path::new("a.jsonl")));
        assert!(!has_json_extension(Path::new("json")));
    }
}
