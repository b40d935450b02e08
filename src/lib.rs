//! Country atlas: tercile classification of indicator sheets, per-country
//! profiles, PDF profile reports and a classified map layer.
pub mod classify;
pub mod config;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod map;
pub mod metadata;
pub mod normalize;
pub mod output;
pub mod profile;
pub mod report;
pub mod table;
pub mod types;
pub mod util;

pub use classify::{classify_indicator, classify_raw, classify_values, Binning};
pub use config::AtlasConfig;
pub use error::{AtlasError, AtlasResult};
pub use loader::{load_dataset, load_dataset_cached, Dataset, LoadReport};
pub use normalize::{normalize, RawTable};
pub use profile::{build_named_profile, build_profile, scenario_overview, valid_indicators};
pub use table::IndicatorTable;
pub use types::{Category, CountryProfile, ProfileEntry};
