// Header normalization for scenario sheets.
//
// Scenario exports name their key columns inconsistently (`uCode`, `ISO3`,
// `Code `, `uName`, `Country`, ...). Normalization rules are data: each
// canonical column lists the headers it accepts, in priority order, and a
// single resolver applies them.
use crate::table::{CodeColumn, IndicatorTable};
use std::collections::HashSet;

pub const COUNTRY_CODE: &str = "country_code";
pub const COUNTRY_NAME: &str = "country_name";

/// Canonical column -> accepted header synonyms (lower-case), highest
/// priority first.
pub const COLUMN_SYNONYMS: &[(&str, &[&str])] = &[
    (COUNTRY_CODE, &["country_code", "ucode", "code", "iso3"]),
    (COUNTRY_NAME, &["country_name", "uname", "country"]),
];

/// A sheet as read from disk: header row plus data rows of raw cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Trimmed cell, `None` when the row is short or the cell is blank.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        let v = self.rows.get(row)?.get(col)?.trim();
        (!v.is_empty()).then_some(v)
    }
}

fn synonyms_for(canonical: &str) -> &'static [&'static str] {
    COLUMN_SYNONYMS
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, syn)| *syn)
        .unwrap_or(&[])
}

/// Index of the header matching the highest-priority synonym of `canonical`.
///
/// Headers are compared trimmed and lower-cased.
pub fn resolve_column(headers: &[String], canonical: &str) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    synonyms_for(canonical)
        .iter()
        .find_map(|syn| lowered.iter().position(|h| h == syn))
}

/// Case-insensitive header lookup used for the metadata and assumption
/// sheets, which have fixed column names.
pub fn find_header(headers: &[String], name: &str) -> Option<usize> {
    let name = name.to_lowercase();
    headers.iter().position(|h| h.trim().to_lowercase() == name)
}

/// Build a canonical [`IndicatorTable`] from a raw scenario sheet.
///
/// Every column other than the resolved code and name columns becomes an
/// indicator, keeping its trimmed header. Blank headers and repeated headers
/// are skipped. The input is never modified.
pub fn normalize(scenario: &str, raw: &RawTable) -> IndicatorTable {
    let headers: Vec<String> = raw.headers.iter().map(|h| h.trim().to_string()).collect();

    let (code_col, code_column) = match resolve_column(&headers, COUNTRY_CODE) {
        Some(i) => (Some(i), CodeColumn::Recognized(headers[i].clone())),
        None if !headers.is_empty() => {
            tracing::warn!(
                scenario,
                header = %headers[0],
                "no recognized country code column; falling back to first column"
            );
            (Some(0), CodeColumn::FirstColumnFallback(headers[0].clone()))
        }
        None => (None, CodeColumn::Missing),
    };
    let name_col = resolve_column(&headers, COUNTRY_NAME).filter(|i| Some(*i) != code_col);

    let row_count = raw.rows.len();
    let codes: Vec<String> = (0..row_count)
        .map(|r| {
            code_col
                .and_then(|c| raw.cell(r, c))
                .map(|v| v.to_uppercase())
                .unwrap_or_default()
        })
        .collect();
    let names: Vec<String> = (0..row_count)
        .map(|r| match name_col.and_then(|c| raw.cell(r, c)) {
            Some(v) => v.to_string(),
            None if name_col.is_none() => codes[r].clone(),
            None => String::new(),
        })
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut indicators = Vec::new();
    let mut cells = Vec::new();
    for (i, header) in headers.iter().enumerate() {
        if Some(i) == code_col || Some(i) == name_col {
            continue;
        }
        if header.is_empty() || !seen.insert(header.as_str()) {
            tracing::debug!(scenario, column = i, header = %header, "skipping blank or repeated header");
            continue;
        }
        indicators.push(header.clone());
        cells.push(
            (0..row_count)
                .map(|r| raw.cell(r, i).map(str::to_string))
                .collect(),
        );
    }

    tracing::debug!(
        scenario,
        rows = row_count,
        indicators = indicators.len(),
        "normalized scenario sheet"
    );
    IndicatorTable::from_parts(scenario, code_column, codes, names, indicators, cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(h: &[&str]) -> Vec<String> {
        h.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn synonyms_resolve_by_priority() {
        assert_eq!(resolve_column(&headers(&["ISO3", " uCode "]), COUNTRY_CODE), Some(1));
        assert_eq!(resolve_column(&headers(&["Code", "iso3"]), COUNTRY_CODE), Some(0));
        assert_eq!(resolve_column(&headers(&["x", "COUNTRY"]), COUNTRY_NAME), Some(1));
        assert_eq!(resolve_column(&headers(&["x", "y"]), COUNTRY_NAME), None);
    }

    #[test]
    fn canonical_columns_and_uppercase_codes() {
        let raw = RawTable::from_strs(
            &[" uCode", "uName ", "H2COST"],
            &[&["ken", "Kenya", "1.5"], &["gha", "Ghana", ""]],
        );
        let t = normalize("S", &raw);
        assert!(!t.is_degraded());
        assert_eq!(t.code_column(), &CodeColumn::Recognized("uCode".to_string()));
        assert_eq!(t.codes(), &["KEN".to_string(), "GHA".to_string()]);
        assert_eq!(t.name(1), Some("Ghana"));
        assert_eq!(t.indicators(), &["H2COST".to_string()]);
        assert_eq!(t.column("H2COST").unwrap(), &[Some("1.5".to_string()), None]);
        // The raw sheet is untouched.
        assert_eq!(raw.headers[0], " uCode");
        assert_eq!(raw.rows[0][0], "ken");
    }

    #[test]
    fn first_column_is_last_resort() {
        let raw = RawTable::from_strs(&["id", "country", "X"], &[&["ken", "Kenya", "3"]]);
        let t = normalize("S", &raw);
        assert!(t.is_degraded());
        assert_eq!(t.code_column(), &CodeColumn::FirstColumnFallback("id".to_string()));
        assert!(t.require_code_column().is_ok());
        assert_eq!(t.row_index("KEN"), Some(0));
        assert_eq!(t.indicators(), &["X".to_string()]);
    }

    #[test]
    fn empty_sheet_has_no_code_column() {
        let t = normalize("S", &RawTable::default());
        assert_eq!(t.code_column(), &CodeColumn::Missing);
        assert!(t.require_code_column().is_err());
        assert!(t.is_empty());
    }

    #[test]
    fn missing_name_column_uses_code_and_short_rows_are_padded() {
        let raw = RawTable::from_strs(&["iso3", "A", "B", "", "A"], &[&["mar", "1"]]);
        let t = normalize("S", &raw);
        assert_eq!(t.name(0), Some("MAR"));
        assert_eq!(t.indicators(), &["A".to_string(), "B".to_string()]);
        assert_eq!(t.value(0, "A"), Some(1.0));
        assert_eq!(t.value(0, "B"), None);
    }
}
