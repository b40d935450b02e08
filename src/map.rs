// Choropleth layer: geometry joined to one classified indicator.
//
// Countries come from the geometry (left join), so a country with a shape
// but no row in the scenario sheet is drawn as NoData. Terciles are taken
// over the joined values, i.e. over the countries that are on the map.
use crate::classify::classify_values;
use crate::error::AtlasResult;
use crate::geometry::Geometry;
use crate::metadata::IndicatorMetadata;
use crate::table::IndicatorTable;
use crate::types::{Category, DataPreviewRow, MapClassRow};
use crate::util::{format_number, median, quantile_sorted, sorted_values};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub code: String,
    pub name: String,
    pub value: Option<f64>,
    pub category: Category,
    pub geometry: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendItem {
    pub category: Category,
    pub label: &'static str,
    pub color: &'static str,
}

/// Fixed four-class legend, High first.
pub fn legend() -> Vec<LegendItem> {
    Category::LEGEND_ORDER
        .iter()
        .map(|c| LegendItem {
            category: *c,
            label: c.as_str(),
            color: c.color(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct MapLayer {
    pub title: String,
    pub scenario: String,
    pub indicator: String,
    pub features: Vec<MapFeature>,
}

impl MapLayer {
    /// Country code -> class, the input the plotting side colours by.
    pub fn class_map(&self) -> BTreeMap<String, Category> {
        self.features
            .iter()
            .map(|f| (f.code.clone(), f.category))
            .collect()
    }

    pub fn rows(&self) -> Vec<MapClassRow> {
        self.features
            .iter()
            .map(|f| MapClassRow {
                country_code: f.code.clone(),
                country_name: f.name.clone(),
                value: f.value.map(|v| format_number(v, 2)).unwrap_or_default(),
                category: f.category.as_str().to_string(),
                color: f.category.color().to_string(),
            })
            .collect()
    }

    /// GeoJSON FeatureCollection with class and fill colour on every feature.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .features
            .iter()
            .map(|f| {
                json!({
                    "type": "Feature",
                    "properties": {
                        "ISO3": f.code,
                        "Country": f.name,
                        "value": f.value,
                        "Category": f.category,
                        "fill": f.category.color(),
                    },
                    "geometry": f.geometry,
                })
            })
            .collect();
        json!({
            "type": "FeatureCollection",
            "title": self.title,
            "scenario": self.scenario,
            "indicator": self.indicator,
            "legend": legend(),
            "features": features,
        })
    }
}

/// Join geometry to `indicator` in `table` and classify.
///
/// Fails when the table has no code column or lacks the indicator.
pub fn build_map_layer(
    geometry: &Geometry,
    table: &IndicatorTable,
    indicator: &str,
    metadata: &IndicatorMetadata,
) -> AtlasResult<MapLayer> {
    table.require_code_column()?;
    table.require_indicator(indicator)?;

    let values: Vec<Option<f64>> = geometry
        .shapes
        .iter()
        .map(|s| table.row_index(&s.code).and_then(|r| table.value(r, indicator)))
        .collect();
    let categories = classify_values(&values);

    let features: Vec<MapFeature> = geometry
        .shapes
        .iter()
        .zip(values.into_iter().zip(categories))
        .map(|(shape, (value, category))| MapFeature {
            code: shape.code.clone(),
            name: shape.name.clone(),
            value,
            category,
            geometry: shape.geometry.clone(),
        })
        .collect();

    let matched = features.iter().filter(|f| f.value.is_some()).count();
    tracing::debug!(
        scenario = table.scenario(),
        indicator,
        countries = features.len(),
        matched,
        "built map layer"
    );

    Ok(MapLayer {
        title: format!(
            "{} - {}",
            metadata.resolve(indicator).display_name,
            table.scenario()
        ),
        scenario: table.scenario().to_string(),
        indicator: indicator.to_string(),
        features,
    })
}

/// Scenario-wide distribution of one indicator for the side panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSummary {
    pub count: usize,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub max: f64,
}

/// `None` when the indicator is absent or has no numeric values.
pub fn summarize(table: &IndicatorTable, indicator: &str) -> Option<IndicatorSummary> {
    let present: Vec<f64> = table.numeric_column(indicator)?.into_iter().flatten().collect();
    let sorted = sorted_values(&present);
    Some(IndicatorSummary {
        count: sorted.len(),
        min: *sorted.first()?,
        p25: quantile_sorted(&sorted, 0.25)?,
        median: median(&sorted)?,
        max: *sorted.last()?,
    })
}

/// First `n` rows of code, name and one indicator.
pub fn preview_rows(table: &IndicatorTable, indicator: &str, n: usize) -> Vec<DataPreviewRow> {
    (0..table.len().min(n))
        .map(|r| DataPreviewRow {
            country_code: table.code(r).unwrap_or_default().to_string(),
            country_name: table.name(r).unwrap_or_default().to_string(),
            value: table
                .column(indicator)
                .and_then(|c| c.get(r).cloned().flatten())
                .unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AtlasError;
    use crate::geometry::CountryShape;
    use crate::normalize::{normalize, RawTable};

    fn geometry(codes: &[(&str, &str)]) -> Geometry {
        Geometry {
            shapes: codes
                .iter()
                .map(|(c, n)| CountryShape {
                    code: c.to_string(),
                    name: n.to_string(),
                    geometry: Value::Null,
                })
                .collect(),
        }
    }

    fn table() -> IndicatorTable {
        let raw = RawTable::from_strs(
            &["uCode", "uName", "H2COST"],
            &[
                &["KEN", "Kenya (sheet)", "10"],
                &["GHA", "Ghana", "20"],
                &["MAR", "Morocco", "30"],
                &["FRA", "France", "1000"],
            ],
        );
        normalize("Short-Term Scenario", &raw)
    }

    #[test]
    fn left_join_keeps_geometry_countries_and_names() {
        let g = geometry(&[("KEN", "Kenya"), ("GHA", "Ghana"), ("MAR", "Morocco"), ("EGY", "Egypt")]);
        let layer = build_map_layer(&g, &table(), "H2COST", &IndicatorMetadata::default()).unwrap();
        let classes = layer.class_map();
        assert_eq!(classes.len(), 4);
        // FRA is not on the map, so it does not stretch the terciles.
        assert_eq!(classes["KEN"], Category::Low);
        assert_eq!(classes["GHA"], Category::Medium);
        assert_eq!(classes["MAR"], Category::High);
        assert_eq!(classes["EGY"], Category::NoData);
        assert_eq!(layer.features[0].name, "Kenya");
        assert_eq!(layer.title, "H2COST - Short-Term Scenario");
    }

    #[test]
    fn geojson_carries_class_and_colour() {
        let g = geometry(&[("KEN", "Kenya"), ("EGY", "Egypt")]);
        let layer = build_map_layer(&g, &table(), "H2COST", &IndicatorMetadata::default()).unwrap();
        let doc = layer.to_geojson();
        assert_eq!(doc["features"][0]["properties"]["Category"], "Medium");
        assert_eq!(doc["features"][1]["properties"]["Category"], "NoData");
        assert_eq!(doc["features"][1]["properties"]["fill"], crate::config::COLOR_NO_DATA);
        assert!(doc["features"][1]["properties"]["value"].is_null());
        assert_eq!(doc["legend"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn missing_indicator_blocks_the_map() {
        let g = geometry(&[("KEN", "Kenya")]);
        let err = build_map_layer(&g, &table(), "WATER", &IndicatorMetadata::default()).unwrap_err();
        assert!(matches!(err, AtlasError::MissingColumn { ref column, .. } if column == "WATER"));
        let empty = normalize("Empty", &RawTable::default());
        assert!(build_map_layer(&g, &empty, "H2COST", &IndicatorMetadata::default()).is_err());
    }

    #[test]
    fn legend_colours_are_distinct() {
        let items = legend();
        let mut colors: Vec<&str> = items.iter().map(|i| i.color).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), 4);
        assert_eq!(items[0].category, Category::High);
        assert_eq!(items[3].category, Category::NoData);
    }

    #[test]
    fn summary_panel_numbers() {
        let s = summarize(&table(), "H2COST").unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.min, 10.0);
        assert_eq!(s.p25, 17.5);
        assert_eq!(s.median, 25.0);
        assert_eq!(s.max, 1000.0);
        assert!(summarize(&table(), "WATER").is_none());
    }

    #[test]
    fn preview_is_truncated() {
        let rows = preview_rows(&table(), "H2COST", 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].country_code, "GHA");
        assert_eq!(rows[1].value, "20");
    }
}
