//! Corpus records
//!
//! A corpus file holds one incident per row, either as a JSON array of
//! objects or as JSON Lines. Columns beyond the similarity fields are
//! carried through to results untouched.

use incidentx_core::{Error, FeatureVector, RawAttributes, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// One historical incident and its projected vector
#[derive(Debug, Clone, Serialize)]
pub struct CorpusEntry {
    /// Insertion order in the corpus
    pub position: usize,
    pub record: RawAttributes,
    #[serde(skip)]
    pub vector: FeatureVector,
}

/// Read corpus rows from `path`
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawAttributes>> {
    let text = fs::read_to_string(path)?;
    parse_records(&text)
}

/// Parse a JSON array of objects, or JSON Lines when the text does not open
/// with `[`. Blank lines are skipped.
pub fn parse_records(text: &str) -> Result<Vec<RawAttributes>> {
    if text.trim_start().starts_with('[') {
        let rows: Vec<Value> = serde_json::from_str(text)?;
        rows.into_iter()
            .enumerate()
            .map(|(idx, row)| into_object(idx, row))
            .collect()
    } else {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(idx, line)| into_object(idx, serde_json::from_str(line)?))
            .collect()
    }
}

fn into_object(idx: usize, row: Value) -> Result<RawAttributes> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidArtifact(format!(
            "corpus row {} is not an object: {}",
            idx, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_json_array() {
        let rows = parse_records(r#"[{"upvotes": 1}, {"upvotes": 2, "title": "smoke"}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["title"], "smoke");
    }

    #[test]
    fn test_json_lines() {
        let rows = parse_records("{\"upvotes\": 1}\n\n{\"upvotes\": 2}\n").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_non_object_row_rejected() {
        let err = parse_records("[{\"upvotes\": 1}, 7]").unwrap_err();
        assert!(err.to_string().contains("corpus row 1 is not an object"));
    }

    #[test]
    fn test_malformed_line_rejected() {
        assert!(matches!(
            parse_records("{\"upvotes\": 1}\n{upvotes"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"incident_type\": \"fire\"}}").unwrap();
        assert_eq!(read_records(file.path()).unwrap().len(), 1);
        assert!(matches!(read_records("/nonexistent/corpus.jsonl"), Err(Error::Io(_))));
    }
}
