//! Training data files: a JSON array of flat objects

use crate::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Fewer real records than this and the synthetic generator is used instead
pub const MIN_REAL_RECORDS: usize = 100;

/// One flat training record
pub type Record = Map<String, Value>;

/// Load training records from `path`
///
/// A missing file yields no records (the caller substitutes synthetic data).
/// A file that exists but cannot be read or parsed is a [`Error::Data`].
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "training data file not found");
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::Data(format!("cannot read {}: {e}", path.display()))),
    };

    let records: Vec<Record> = serde_json::from_str(&content).map_err(|e| {
        Error::Data(format!("{} is not a JSON array of objects: {e}", path.display()))
    })?;

    tracing::debug!(path = %path.display(), records = records.len(), "loaded training records");
    Ok(records)
}

/// Numeric value of `key`, defaulting to `0`
///
/// Booleans read as `0`/`1`; any other non-numeric value reads as `0`.
pub fn field_value(record: &Record, key: &str) -> f32 {
    match record.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0) as f32,
        Some(Value::Bool(b)) => f32::from(u8::from(*b)),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = load_records(&dir.path().join("absent.json")).expect("missing is not an error");
        assert!(records.is_empty());
    }

    #[test]
    fn test_unparseable_file_is_data_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "{{not json").expect("write");
        assert!(matches!(load_records(file.path()), Err(Error::Data(_))));
    }

    #[test]
    fn test_loads_array_of_objects() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"[{{"kerf": 3.5}}, {{"kerf": 2}}]"#).expect("write");
        let records = load_records(file.path()).expect("valid file");
        assert_eq!(records.len(), 2);
        assert_eq!(field_value(&records[1], "kerf"), 2.0);
    }

    #[test]
    fn test_field_value_defaults() {
        let record: Record = serde_json::from_value(json!({
            "flag": true,
            "name": "steel",
            "nothing": null
        }))
        .expect("object");
        assert_eq!(field_value(&record, "flag"), 1.0);
        assert_eq!(field_value(&record, "name"), 0.0);
        assert_eq!(field_value(&record, "nothing"), 0.0);
        assert_eq!(field_value(&record, "absent"), 0.0);
    }
}
