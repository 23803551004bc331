//! Background reference tables

use crate::{Error, Result};
use ndarray::Array2;
use std::path::Path;

/// Read a CSV with a header row of numeric columns
///
/// When the header names exactly the requested features, columns are
/// reordered to match `feature_names`; otherwise they are taken in file
/// order and only the width is checked.
pub fn load_background(path: &Path, feature_names: &[String]) -> Result<Array2<f32>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Data(format!("cannot open background {}: {e}", path.display())))?;
    let headers = reader.headers().map_err(|e| Error::Data(format!("background header: {e}")))?.clone();

    let width = feature_names.len();
    if headers.len() != width {
        return Err(Error::Data(format!("background has {} columns, model takes {width}", headers.len())));
    }
    let columns: Vec<usize> = match feature_names
        .iter()
        .map(|name| headers.iter().position(|h| h.trim() == name))
        .collect::<Option<Vec<_>>>()
    {
        Some(mapped) => mapped,
        None => (0..width).collect(),
    };

    let mut values = Vec::new();
    let mut rows = 0;
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::Data(format!("background row {}: {e}", line + 1)))?;
        for &col in &columns {
            let cell = record.get(col).unwrap_or("");
            let value: f32 = cell
                .trim()
                .parse()
                .map_err(|_| Error::Data(format!("background row {}: '{cell}' is not numeric", line + 1)))?;
            values.push(value);
        }
        rows += 1;
    }
    if rows == 0 {
        return Err(Error::Data(format!("background {} has no rows", path.display())));
    }

    Array2::from_shape_vec((rows, width), values).map_err(|e| Error::Data(format!("background shape: {e}")))
}
