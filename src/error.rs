// Crate-wide error type.
//
// Only structural problems surface here. Per-value anomalies (unparseable
// cells, unknown countries in a profile, missing metadata rows) are absorbed
// into `Category::NoData` / "not available" by the pipeline itself.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    /// A required column is absent after header normalization.
    #[error("missing required column `{column}` in {context}")]
    MissingColumn { column: String, context: String },

    /// A scenario table has no indicator columns, or none of the requested
    /// indicators exist in it.
    #[error("no indicators found in scenario `{scenario}`")]
    NoIndicators { scenario: String },

    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),

    /// Country name could not be resolved to a code in the selected scenario.
    #[error("country code not found for `{0}`; the profile cannot be generated")]
    UnknownCountry(String),

    #[error("invalid geometry: {0}")]
    Geometry(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),
}

impl AtlasError {
    pub fn missing_column(column: impl Into<String>, context: impl Into<String>) -> Self {
        AtlasError::MissingColumn {
            column: column.into(),
            context: context.into(),
        }
    }
}

pub type AtlasResult<T> = Result<T, AtlasError>;
