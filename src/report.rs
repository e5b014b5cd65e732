// src/report.rs
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use crate::models::matching::ReportEntry;

const REPORT_HEADERS: [&str; 4] = [
    "List 1 Description",
    "List 2 Description",
    "Status",
    "Details",
];

/// Writes the reconciliation report as CSV, one row per entry, in the order
/// the entries were produced.
pub fn write_report(path: &Path, entries: &[ReportEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;

    writer
        .write_record(REPORT_HEADERS)
        .context("Failed to write report headers")?;
    for entry in entries {
        writer
            .write_record([
                entry.list_a_desc.as_str(),
                entry.list_b_desc.as_str(),
                entry.status.as_str(),
                entry.details.as_str(),
            ])
            .context("Failed to write report row")?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush report to {}", path.display()))?;

    info!(
        "Wrote {} report entries to {}",
        entries.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matching::MatchStatus;
    use std::fs;

    #[test]
    fn writes_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let entries = vec![
            ReportEntry {
                list_a_desc: "Downtown Office".to_string(),
                list_b_desc: "Downtown Office".to_string(),
                status: MatchStatus::Match,
                details: "Exact description match. Limits: $1M/$1M, Mortgages: 800K/800K"
                    .to_string(),
            },
            ReportEntry {
                list_a_desc: String::new(),
                list_b_desc: "Orphaned Warehouse".to_string(),
                status: MatchStatus::Mismatch,
                details: "No corresponding property found".to_string(),
            },
        ];

        write_report(&path, &entries).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();

        assert_eq!(
            lines.next().unwrap(),
            "List 1 Description,List 2 Description,Status,Details"
        );
        assert!(contents.contains("Match"));
        assert!(contents.contains(",Orphaned Warehouse,Mismatch,"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let entries = vec![ReportEntry {
            list_a_desc: "Condo, 12th Floor".to_string(),
            list_b_desc: String::new(),
            status: MatchStatus::Mismatch,
            details: "Limits: $1M/$2M, Mortgages: 1/2".to_string(),
        }];

        write_report(&path, &entries).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"Condo, 12th Floor\""));
    }
}
