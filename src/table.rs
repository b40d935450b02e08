use crate::error::{AtlasError, AtlasResult};
use crate::normalize::COUNTRY_CODE;
use crate::util::parse_f64_safe;
use std::collections::{BTreeSet, HashMap};

/// Where a table's `country_code` values came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeColumn {
    /// A header matched one of the accepted code synonyms.
    Recognized(String),
    /// Nothing matched; the first column was used. Joins by code may
    /// silently miss.
    FirstColumnFallback(String),
    /// The sheet had no columns at all.
    Missing,
}

/// Row-per-country table for one scenario, with canonical code/name columns.
///
/// Indicator cells are stored column-major as the raw trimmed strings so the
/// classifier sees exactly what the sheet held; empty cells are `None`.
#[derive(Debug, Clone)]
pub struct IndicatorTable {
    scenario: String,
    code_column: CodeColumn,
    codes: Vec<String>,
    names: Vec<String>,
    indicators: Vec<String>,
    cells: Vec<Vec<Option<String>>>,
    index: HashMap<String, usize>,
}

impl IndicatorTable {
    pub(crate) fn from_parts(
        scenario: &str,
        code_column: CodeColumn,
        codes: Vec<String>,
        names: Vec<String>,
        indicators: Vec<String>,
        cells: Vec<Vec<Option<String>>>,
    ) -> Self {
        let mut index = HashMap::with_capacity(codes.len());
        for (row, code) in codes.iter().enumerate() {
            if code.is_empty() {
                continue;
            }
            if index.contains_key(code) {
                tracing::warn!(scenario, code = %code, row, "duplicate country code; keeping first row");
                continue;
            }
            index.insert(code.clone(), row);
        }
        Self {
            scenario: scenario.to_string(),
            code_column,
            codes,
            names,
            indicators,
            cells,
            index,
        }
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn code_column(&self) -> &CodeColumn {
        &self.code_column
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self.code_column, CodeColumn::Recognized(_))
    }

    /// Fails when the table has no code column at all; a degraded table
    /// passes with a warning.
    pub fn require_code_column(&self) -> AtlasResult<()> {
        match &self.code_column {
            CodeColumn::Recognized(_) => Ok(()),
            CodeColumn::FirstColumnFallback(header) => {
                tracing::warn!(
                    scenario = %self.scenario,
                    header = %header,
                    "no recognized country code column; using first column"
                );
                Ok(())
            }
            CodeColumn::Missing => Err(AtlasError::missing_column(
                COUNTRY_CODE,
                format!("scenario `{}`", self.scenario),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn indicators(&self) -> &[String] {
        &self.indicators
    }

    pub fn has_indicator(&self, id: &str) -> bool {
        self.indicator_position(id).is_some()
    }

    fn indicator_position(&self, id: &str) -> Option<usize> {
        self.indicators.iter().position(|c| c == id)
    }

    /// Raw cells of one indicator column, one per row.
    pub fn column(&self, id: &str) -> Option<&[Option<String>]> {
        self.indicator_position(id).map(|i| self.cells[i].as_slice())
    }

    /// Indicator column coerced to numbers; unparseable cells become `None`.
    pub fn numeric_column(&self, id: &str) -> Option<Vec<Option<f64>>> {
        self.column(id)
            .map(|cells| cells.iter().map(|c| parse_f64_safe(c.as_deref())).collect())
    }

    pub fn require_indicator(&self, id: &str) -> AtlasResult<&[Option<String>]> {
        self.column(id).ok_or_else(|| {
            AtlasError::missing_column(id, format!("scenario `{}`", self.scenario))
        })
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn code(&self, row: usize) -> Option<&str> {
        self.codes.get(row).map(String::as_str)
    }

    pub fn name(&self, row: usize) -> Option<&str> {
        self.names.get(row).map(String::as_str)
    }

    /// Row for a country code, matched trimmed and upper-cased.
    pub fn row_index(&self, code: &str) -> Option<usize> {
        self.index.get(&code.trim().to_uppercase()).copied()
    }

    pub fn value(&self, row: usize, id: &str) -> Option<f64> {
        let cells = self.column(id)?;
        parse_f64_safe(cells.get(row)?.as_deref())
    }

    /// Sorted, de-duplicated country names for the country picker.
    pub fn country_names(&self) -> Vec<String> {
        self.names
            .iter()
            .filter(|n| !n.is_empty())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Code of the first row whose name equals `name`.
    pub fn code_for_name(&self, name: &str) -> AtlasResult<&str> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|row| self.code(row))
            .filter(|code| !code.is_empty())
            .ok_or_else(|| AtlasError::UnknownCountry(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, RawTable};

    fn sample() -> IndicatorTable {
        let raw = RawTable::from_strs(
            &["uCode", "uName", "H2COST", "JOBS"],
            &[
                &["ken", "Kenya", "12.5", "300"],
                &["GHA", "Ghana", "", "n/a"],
                &["MAR", "Morocco", "8", "1,200"],
                &["KEN", "Kenya (dup)", "1", "1"],
            ],
        );
        normalize("Short-Term Scenario", &raw)
    }

    #[test]
    fn lookups_by_code_are_case_insensitive() {
        let t = sample();
        assert_eq!(t.row_index(" ken "), Some(0));
        assert_eq!(t.row_index("MAR"), Some(2));
        assert_eq!(t.row_index("ZZZ"), None);
        assert_eq!(t.value(0, "H2COST"), Some(12.5));
        assert_eq!(t.value(1, "H2COST"), None);
        assert_eq!(t.value(2, "JOBS"), Some(1200.0));
        assert_eq!(t.value(0, "MISSING"), None);
    }

    #[test]
    fn duplicate_codes_keep_first_row() {
        let t = sample();
        assert_eq!(t.len(), 4);
        assert_eq!(t.row_index("KEN"), Some(0));
    }

    #[test]
    fn country_picker_helpers() {
        let t = sample();
        assert_eq!(
            t.country_names(),
            vec!["Ghana", "Kenya", "Kenya (dup)", "Morocco"]
        );
        assert_eq!(t.code_for_name("Morocco").unwrap(), "MAR");
        assert!(matches!(
            t.code_for_name("Atlantis"),
            Err(AtlasError::UnknownCountry(_))
        ));
    }

    #[test]
    fn missing_indicator_is_a_structural_error() {
        let t = sample();
        assert!(t.require_indicator("H2COST").is_ok());
        match t.require_indicator("WATER") {
            Err(AtlasError::MissingColumn { column, .. }) => assert_eq!(column, "WATER"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
