// Static configuration for the atlas.
//
// Everything the pipeline needs that is not data lives here: where the CSV
// exports and the geometry file are, the scenario list, the text printed on
// every report page and the map palette. An optional `atlas.json` can
// override any field; missing fields keep their defaults.
use crate::error::AtlasResult;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "atlas.json";

pub const DATA_DIR: &str = "data";
pub const METADATA_FILE: &str = "iMeta.csv";
pub const ASSUMPTIONS_FILE: &str = "iAssumptions.csv";
pub const GEOMETRY_FILE: &str = "africa_countries.geojson";
pub const CONTINENT: &str = "Africa";

pub const FOOTER_TEXT: &str = "Green Hydrogen Impact Atlas - country profile";
pub const DISCLAIMER_TEXT: &str =
    "Disclaimer: The results in this profile are for research purposes only.";

/// Characters per line for assumption and note paragraphs in the PDF.
pub const WRAP_WIDTH: usize = 100;
/// How many indicators a report includes when the user does not pick any.
pub const DEFAULT_REPORT_INDICATORS: usize = 8;
pub const PREVIEW_ROWS: usize = 12;

// Map palette. Sequential blues, darkest for High.
pub const COLOR_LOW: &str = "#c6dbef";
pub const COLOR_MEDIUM: &str = "#6baed6";
pub const COLOR_HIGH: &str = "#08519c";
pub const COLOR_NO_DATA: &str = "#d3d3d3";

/// One scenario sheet: its display name and the CSV export holding it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScenarioSource {
    pub name: String,
    pub file: String,
}

impl ScenarioSource {
    fn new(name: &str, file: &str) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub scenarios: Vec<ScenarioSource>,
    pub metadata_file: String,
    pub assumptions_file: String,
    pub geometry_file: String,
    /// Keep only features of this continent when the geometry carries a
    /// `CONTINENT` property. `None` keeps everything.
    pub continent: Option<String>,
    pub footer_text: String,
    pub disclaimer_text: String,
    pub wrap_width: usize,
    pub default_report_indicators: usize,
    pub preview_rows: usize,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DATA_DIR),
            output_dir: PathBuf::from("."),
            scenarios: vec![
                ScenarioSource::new("Short-Term Scenario", "short_term.csv"),
                ScenarioSource::new("Mid-Term Scenario", "mid_term.csv"),
                ScenarioSource::new("Long-Term Scenario", "long_term.csv"),
            ],
            metadata_file: METADATA_FILE.to_string(),
            assumptions_file: ASSUMPTIONS_FILE.to_string(),
            geometry_file: GEOMETRY_FILE.to_string(),
            continent: Some(CONTINENT.to_string()),
            footer_text: FOOTER_TEXT.to_string(),
            disclaimer_text: DISCLAIMER_TEXT.to_string(),
            wrap_width: WRAP_WIDTH,
            default_report_indicators: DEFAULT_REPORT_INDICATORS,
            preview_rows: PREVIEW_ROWS,
        }
    }
}

impl AtlasConfig {
    /// Read `path` if it exists, otherwise fall back to the built-in defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> AtlasResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let s = std::fs::read_to_string(path)?;
        let cfg: AtlasConfig = serde_json::from_str(&s)?;
        tracing::info!(path = %path.display(), "loaded configuration override");
        Ok(cfg)
    }

    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(&self.metadata_file)
    }

    pub fn assumptions_path(&self) -> PathBuf {
        self.data_dir.join(&self.assumptions_file)
    }

    pub fn geometry_path(&self) -> PathBuf {
        self.data_dir.join(&self.geometry_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = AtlasConfig::load_or_default("definitely/not/here/atlas.json").unwrap();
        assert_eq!(cfg.wrap_width, WRAP_WIDTH);
        assert_eq!(cfg.scenario_names().len(), 3);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.json");
        std::fs::write(&path, r#"{"footer_text": "Custom footer", "continent": null}"#).unwrap();
        let cfg = AtlasConfig::load_or_default(&path).unwrap();
        assert_eq!(cfg.footer_text, "Custom footer");
        assert_eq!(cfg.continent, None);
        assert_eq!(cfg.metadata_file, METADATA_FILE);
    }
}
