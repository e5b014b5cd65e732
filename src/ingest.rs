// src/ingest.rs
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

use crate::models::matching::PropertyRecord;

/// Loads a property list from a JSON array file.
pub fn load_properties(path: &Path) -> Result<Vec<PropertyRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read property list from {}", path.display()))?;
    let records: Vec<PropertyRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse property list in {}", path.display()))?;

    info!(
        "Loaded {} property records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_records_with_wire_field_names() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"description": "Downtown Office", "limit": "$1.2M", "mortgageAmount": "900000"}}]"#
        )
        .unwrap();

        let records = load_properties(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "Downtown Office");
        assert_eq!(records[0].mortgage_amount, "900000");
    }

    #[test]
    fn missing_file_is_an_error_naming_the_path() {
        let err = load_properties(Path::new("/nonexistent/list1.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/list1.json"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_properties(file.path()).is_err());
    }
}
