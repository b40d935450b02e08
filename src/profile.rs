use crate::classify::classify_indicator;
use crate::error::{AtlasError, AtlasResult};
use crate::metadata::IndicatorMetadata;
use crate::table::IndicatorTable;
use crate::types::{Category, CountryProfile, ProfileEntry};

/// Build the report model for one country in one scenario.
///
/// Each indicator is classified over the whole table, since tercile
/// boundaries depend on every country, then the selected country's value
/// and class are picked out. A country missing from the table still gets
/// one entry per indicator, all "not available" / NoData. Entry order and
/// count always match `indicator_ids`.
pub fn build_profile(
    table: &IndicatorTable,
    country_code: &str,
    scenario_name: &str,
    indicator_ids: &[String],
    metadata: &IndicatorMetadata,
    assumption_text: &str,
) -> CountryProfile {
    let country_code = country_code.trim().to_uppercase();
    let row = table.row_index(&country_code);
    if row.is_none() {
        tracing::info!(
            scenario = scenario_name,
            country = %country_code,
            "country not in scenario table; profile entries will be empty"
        );
    }

    let country_name = row
        .and_then(|r| table.name(r))
        .filter(|n| !n.is_empty())
        .unwrap_or(country_code.as_str())
        .to_string();

    let entries = indicator_ids
        .iter()
        .map(|id| {
            let info = metadata.resolve(id);
            let (value, category) = match row {
                Some(r) => {
                    let categories = classify_indicator(table, id);
                    (
                        table.value(r, id),
                        categories.get(r).copied().unwrap_or(Category::NoData),
                    )
                }
                None => (None, Category::NoData),
            };
            ProfileEntry {
                indicator_id: id.clone(),
                display_name: info.display_name,
                value,
                category,
                note: info.note,
            }
        })
        .collect();

    CountryProfile {
        country_name,
        country_code,
        scenario_name: scenario_name.to_string(),
        assumption_text: assumption_text.to_string(),
        entries,
    }
}

/// Same as [`build_profile`] but with the country display name supplied by
/// the caller (the name the user picked), which wins over the table's.
pub fn build_named_profile(
    table: &IndicatorTable,
    country_name: &str,
    country_code: &str,
    indicator_ids: &[String],
    metadata: &IndicatorMetadata,
    assumption_text: &str,
) -> CountryProfile {
    let mut profile = build_profile(
        table,
        country_code,
        table.scenario(),
        indicator_ids,
        metadata,
        assumption_text,
    );
    profile.country_name = country_name.to_string();
    profile
}

/// Keep only the requested indicators that exist in `table`, in request
/// order. Fails when nothing is left to report on.
pub fn valid_indicators(table: &IndicatorTable, requested: &[String]) -> AtlasResult<Vec<String>> {
    let valid: Vec<String> = requested
        .iter()
        .filter(|id| table.has_indicator(id))
        .cloned()
        .collect();
    if valid.len() < requested.len() {
        tracing::warn!(
            scenario = table.scenario(),
            dropped = requested.len() - valid.len(),
            "requested indicators not present in scenario"
        );
    }
    if valid.is_empty() {
        return Err(AtlasError::NoIndicators {
            scenario: table.scenario().to_string(),
        });
    }
    Ok(valid)
}

/// One indicator for one country, seen in a single scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReading {
    pub scenario: String,
    pub value: Option<f64>,
    pub category: Category,
}

/// Class of `indicator` for `country_code` in every scenario, in the order
/// the tables are given. Scenarios lacking the country or the column read
/// as NoData.
pub fn scenario_overview(
    tables: &[IndicatorTable],
    country_code: &str,
    indicator: &str,
) -> Vec<ScenarioReading> {
    tables
        .iter()
        .map(|table| {
            let row = table.row_index(country_code);
            let categories = classify_indicator(table, indicator);
            ScenarioReading {
                scenario: table.scenario().to_string(),
                value: row.and_then(|r| table.value(r, indicator)),
                category: row
                    .and_then(|r| categories.get(r).copied())
                    .unwrap_or(Category::NoData),
            }
        })
        .collect()
}
