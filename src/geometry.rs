// Country boundaries from a GeoJSON FeatureCollection.
//
// The atlas only needs a code and a display name per country; the geometry
// itself is carried through untouched for whatever draws the map.
use crate::config::AtlasConfig;
use crate::error::{AtlasError, AtlasResult};
use crate::loader::PathCache;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Property holding the ISO3 code, with its fallback.
pub const CODE_PROPERTIES: [&str; 2] = ["SOV_A3", "ADM0_A3"];
pub const NAME_PROPERTY: &str = "ADMIN";
pub const CONTINENT_PROPERTY: &str = "CONTINENT";

#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    pub code: String,
    pub name: String,
    pub geometry: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub shapes: Vec<CountryShape>,
}

fn str_prop<'a>(props: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    props
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl Geometry {
    /// Extract shapes from a parsed FeatureCollection, keeping only
    /// `continent` when features carry a continent property.
    pub fn from_geojson(doc: &Value, continent: Option<&str>) -> AtlasResult<Self> {
        let features = doc
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| AtlasError::Geometry("expected a FeatureCollection with `features`".into()))?;

        let empty = Map::new();
        let mut shapes = Vec::new();
        let mut kept = 0usize;
        for feature in features {
            let props = feature
                .get("properties")
                .and_then(Value::as_object)
                .unwrap_or(&empty);
            if let (Some(want), Some(have)) = (continent, str_prop(props, CONTINENT_PROPERTY)) {
                if have != want {
                    continue;
                }
            }
            kept += 1;
            let Some(code) = CODE_PROPERTIES.iter().find_map(|k| str_prop(props, k)) else {
                tracing::debug!("feature without country code skipped");
                continue;
            };
            let code = code.to_uppercase();
            let name = str_prop(props, NAME_PROPERTY)
                .unwrap_or(code.as_str())
                .to_string();
            shapes.push(CountryShape {
                code,
                name,
                geometry: feature.get("geometry").cloned().unwrap_or(Value::Null),
            });
        }

        if kept > 0 && shapes.is_empty() {
            return Err(AtlasError::missing_column(
                CODE_PROPERTIES.join("/"),
                "geometry features",
            ));
        }
        Ok(Self { shapes })
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        let code = code.trim().to_uppercase();
        self.shapes
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.name.as_str())
    }
}

pub fn load_geometry(path: &Path, continent: Option<&str>) -> AtlasResult<Geometry> {
    let s = std::fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&s)?;
    let geometry = Geometry::from_geojson(&doc, continent)?;
    tracing::info!(path = %path.display(), countries = geometry.len(), "geometry loaded");
    Ok(geometry)
}

static GEOMETRY: Lazy<PathCache<Geometry>> = Lazy::new(PathCache::default);

/// Cached [`load_geometry`], keyed by the geometry file path.
pub fn load_geometry_cached(cfg: &AtlasConfig) -> AtlasResult<Arc<Geometry>> {
    GEOMETRY.get_or_load(&cfg.geometry_path(), |p| {
        load_geometry(p, cfg.continent.as_deref())
    })
}
