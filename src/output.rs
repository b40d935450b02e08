// File writers and console previews.
use crate::error::AtlasResult;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> AtlasResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> AtlasResult<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write `bytes` to `path`, creating parent directories as needed.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> AtlasResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows, or `(no rows)`.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScenarioOverviewRow;

    fn rows() -> Vec<ScenarioOverviewRow> {
        vec![
            ScenarioOverviewRow {
                scenario: "Short-Term Scenario".to_string(),
                value: "1.50".to_string(),
                level: "Low".to_string(),
            },
            ScenarioOverviewRow {
                scenario: "Long-Term Scenario".to_string(),
                value: "N/A".to_string(),
                level: "No data".to_string(),
            },
        ]
    }

    #[test]
    fn markdown_preview_uses_renamed_headers() {
        let s = render_table(&rows(), 1);
        assert!(s.contains("Qualitative Level"));
        assert!(s.contains("Short-Term Scenario"));
        assert!(!s.contains("Long-Term Scenario"));
        assert_eq!(render_table::<ScenarioOverviewRow>(&[], 5), "(no rows)");
    }

    #[test]
    fn csv_and_bytes_land_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("overview.csv");
        write_csv(&csv_path, &rows()).unwrap();
        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(text.starts_with("Scenario,Value,QualitativeLevel\n"));

        let nested = dir.path().join("reports/out.pdf");
        write_bytes(&nested, b"%PDF").unwrap();
        assert_eq!(std::fs::read(&nested).unwrap(), b"%PDF");
    }
}
