use crate::config::{COLOR_HIGH, COLOR_LOW, COLOR_MEDIUM, COLOR_NO_DATA};
use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// Qualitative tier of one value within its indicator/scenario distribution.
///
/// `Low < Medium < High` for display purposes; `NoData` sits outside that
/// order (see [`Category::rank`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Low,
    Medium,
    High,
    NoData,
}

impl Category {
    /// Legend order used by the map: darkest class first, missing data last.
    pub const LEGEND_ORDER: [Category; 4] = [
        Category::High,
        Category::Medium,
        Category::Low,
        Category::NoData,
    ];

    /// Position in the Low < Medium < High order. `None` for `NoData`.
    pub fn rank(self) -> Option<u8> {
        match self {
            Category::Low => Some(0),
            Category::Medium => Some(1),
            Category::High => Some(2),
            Category::NoData => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Low => "Low",
            Category::Medium => "Medium",
            Category::High => "High",
            Category::NoData => "NoData",
        }
    }

    /// Wording printed in reports.
    pub fn label(self) -> &'static str {
        match self {
            Category::Low => "Low",
            Category::Medium => "Moderate",
            Category::High => "High",
            Category::NoData => "No data",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Category::Low => COLOR_LOW,
            Category::Medium => COLOR_MEDIUM,
            Category::High => COLOR_HIGH,
            Category::NoData => COLOR_NO_DATA,
        }
    }

    pub fn is_no_data(self) -> bool {
        matches!(self, Category::NoData)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display information for one indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorInfo {
    pub display_name: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileEntry {
    pub indicator_id: String,
    pub display_name: String,
    /// Raw value at native precision; `None` means "not available".
    pub value: Option<f64>,
    pub category: Category,
    pub note: String,
}

/// Everything the report renderer needs for one country in one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryProfile {
    pub country_name: String,
    pub country_code: String,
    pub scenario_name: String,
    pub assumption_text: String,
    pub entries: Vec<ProfileEntry>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProfileSummaryRow {
    #[serde(rename = "Indicator")]
    #[tabled(rename = "Indicator")]
    pub indicator: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "QualitativeLevel")]
    #[tabled(rename = "Qualitative Level")]
    pub level: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MapClassRow {
    #[serde(rename = "ISO3")]
    #[tabled(rename = "ISO3")]
    pub country_code: String,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country_name: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DataPreviewRow {
    #[serde(rename = "ISO3")]
    #[tabled(rename = "ISO3")]
    pub country_code: String,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country_name: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ScenarioOverviewRow {
    #[serde(rename = "Scenario")]
    #[tabled(rename = "Scenario")]
    pub scenario: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "QualitativeLevel")]
    #[tabled(rename = "Qualitative Level")]
    pub level: String,
}
