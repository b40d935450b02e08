use crate::config::AtlasConfig;
use crate::error::{AtlasError, AtlasResult};
use crate::metadata::{IndicatorMetadata, ScenarioAssumptions};
use crate::normalize::{normalize, RawTable};
use crate::table::IndicatorTable;
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Every sheet of one data load, normalized and ready to classify.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Scenario tables in configured order; scenarios whose file is missing
    /// are absent.
    pub scenarios: Vec<IndicatorTable>,
    pub metadata: IndicatorMetadata,
    pub assumptions: ScenarioAssumptions,
}

impl Dataset {
    pub fn scenario(&self, name: &str) -> AtlasResult<&IndicatorTable> {
        self.scenarios
            .iter()
            .find(|t| t.scenario() == name)
            .ok_or_else(|| AtlasError::UnknownScenario(name.to_string()))
    }

    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|t| t.scenario()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub scenarios_loaded: usize,
    pub scenarios_missing: Vec<String>,
    pub degraded: Vec<String>,
    pub total_rows: usize,
    pub metadata_entries: usize,
}

/// Read a CSV export into a [`RawTable`]. Short rows are allowed.
pub fn read_sheet(path: &Path) -> AtlasResult<RawTable> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawTable::new(headers, rows))
}

/// Like [`read_sheet`], but a missing file is an empty sheet.
pub fn read_optional_sheet(path: &Path) -> AtlasResult<RawTable> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "optional sheet not found");
        return Ok(RawTable::default());
    }
    read_sheet(path)
}

pub fn load_dataset(cfg: &AtlasConfig) -> AtlasResult<(Dataset, LoadReport)> {
    let mut report = LoadReport::default();
    let mut scenarios = Vec::with_capacity(cfg.scenarios.len());

    for source in &cfg.scenarios {
        let path = cfg.data_dir.join(&source.file);
        if !path.exists() {
            tracing::warn!(scenario = %source.name, path = %path.display(), "scenario sheet missing; skipped");
            report.scenarios_missing.push(source.name.clone());
            continue;
        }
        let raw = read_sheet(&path)?;
        let table = normalize(&source.name, &raw);
        if table.is_degraded() {
            report.degraded.push(source.name.clone());
        }
        report.total_rows += table.len();
        scenarios.push(table);
    }
    report.scenarios_loaded = scenarios.len();

    let metadata = IndicatorMetadata::from_raw(&read_optional_sheet(&cfg.metadata_path())?);
    let assumptions = ScenarioAssumptions::from_raw(&read_optional_sheet(&cfg.assumptions_path())?);
    report.metadata_entries = metadata.len();

    tracing::info!(
        data_dir = %cfg.data_dir.display(),
        scenarios = report.scenarios_loaded,
        rows = report.total_rows,
        metadata = report.metadata_entries,
        "dataset loaded"
    );
    Ok((
        Dataset {
            scenarios,
            metadata,
            assumptions,
        },
        report,
    ))
}

/// Loaded values keyed by their sources. A key is read at most once per
/// process; later requests get the same `Arc`.
pub struct SourceCache<K, T> {
    entries: Mutex<HashMap<K, Arc<T>>>,
}

impl<K, T> Default for SourceCache<K, T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, T> SourceCache<K, T>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    pub fn get_or_load<F>(&self, key: &K, load: F) -> AtlasResult<Arc<T>>
    where
        F: FnOnce(&K) -> AtlasResult<T>,
    {
        // A panic while loading leaves the map itself intact.
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(hit) = entries.get(key) {
            tracing::debug!(?key, "cache hit");
            return Ok(Arc::clone(hit));
        }
        let value = Arc::new(load(key)?);
        entries.insert(key.clone(), Arc::clone(&value));
        Ok(value)
    }
}

/// Cache keyed by a single file path.
pub type PathCache<T> = SourceCache<PathBuf, T>;

/// Every file a [`Dataset`] is read from, with the scenario names they load
/// under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetSources {
    pub scenarios: Vec<(String, PathBuf)>,
    pub metadata: PathBuf,
    pub assumptions: PathBuf,
}

impl DatasetSources {
    pub fn from_config(cfg: &AtlasConfig) -> Self {
        Self {
            scenarios: cfg
                .scenarios
                .iter()
                .map(|s| (s.name.clone(), cfg.data_dir.join(&s.file)))
                .collect(),
            metadata: cfg.metadata_path(),
            assumptions: cfg.assumptions_path(),
        }
    }
}

static DATASETS: Lazy<SourceCache<DatasetSources, (Arc<Dataset>, LoadReport)>> =
    Lazy::new(SourceCache::default);

/// Cached [`load_dataset`], keyed by every source file the config names.
pub fn load_dataset_cached(cfg: &AtlasConfig) -> AtlasResult<(Arc<Dataset>, LoadReport)> {
    let loaded = DATASETS.get_or_load(&DatasetSources::from_config(cfg), |_| {
        load_dataset(cfg).map(|(data, report)| (Arc::new(data), report))
    })?;
    Ok((Arc::clone(&loaded.0), loaded.1.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioSource;
    use std::fs;

    fn write_fixture(dir: &Path) {
        fs::write(
            dir.join("short.csv"),
            "\u{feff}uCode,uName,H2COST,JOBS\nKEN,Kenya,1.5,10\nGHA,Ghana,2.5\nMAR,Morocco,3.5,30\n",
        )
        .unwrap();
        fs::write(dir.join("long.csv"), "id,Country,H2COST\nken,Kenya,9\n").unwrap();
        fs::write(
            dir.join("iMeta.csv"),
            "iCode,IndName,Note\nH2COST,Hydrogen cost,\"USD/kg, levelised\"\n",
        )
        .unwrap();
    }

    fn cfg(dir: &Path) -> AtlasConfig {
        AtlasConfig {
            data_dir: dir.to_path_buf(),
            scenarios: vec![
                ScenarioSource {
                    name: "Short".to_string(),
                    file: "short.csv".to_string(),
                },
                ScenarioSource {
                    name: "Mid".to_string(),
                    file: "mid.csv".to_string(),
                },
                ScenarioSource {
                    name: "Long".to_string(),
                    file: "long.csv".to_string(),
                },
            ],
            ..AtlasConfig::default()
        }
    }

    #[test]
    fn loads_scenarios_metadata_and_reports_gaps() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let (data, report) = load_dataset(&cfg(dir.path())).unwrap();
        assert_eq!(data.scenario_names(), vec!["Short", "Long"]);
        assert_eq!(report.scenarios_missing, vec!["Mid".to_string()]);
        assert_eq!(report.degraded, vec!["Long".to_string()]);
        assert_eq!(report.total_rows, 4);

        let short = data.scenario("Short").unwrap();
        assert_eq!(short.indicators(), &["H2COST".to_string(), "JOBS".to_string()]);
        assert_eq!(short.value(1, "JOBS"), None);
        assert_eq!(data.metadata.resolve("H2COST").note, "USD/kg, levelised");
        assert_eq!(data.assumptions.text_for("Short"), "");
        assert!(matches!(data.scenario("Mid"), Err(AtlasError::UnknownScenario(_))));
    }

    #[test]
    fn cached_load_reads_each_directory_once() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let cfg = cfg(dir.path());
        let (first, _) = load_dataset_cached(&cfg).unwrap();
        fs::remove_file(dir.path().join("short.csv")).unwrap();
        let (second, report) = load_dataset_cached(&cfg).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.scenario_names(), vec!["Short", "Long"]);
        assert_eq!(report.scenarios_missing, vec!["Mid".to_string()]);
    }

    #[test]
    fn configs_sharing_a_directory_get_their_own_dataset() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "ISO3,Country,X\nKEN,Kenya,1\n").unwrap();
        fs::write(dir.path().join("b.csv"), "ISO3,Country,Y\nGHA,Ghana,2\n").unwrap();
        let only = |name: &str, file: &str| AtlasConfig {
            data_dir: dir.path().to_path_buf(),
            scenarios: vec![ScenarioSource {
                name: name.to_string(),
                file: file.to_string(),
            }],
            ..AtlasConfig::default()
        };
        let (a, _) = load_dataset_cached(&only("A", "a.csv")).unwrap();
        let (b, _) = load_dataset_cached(&only("B", "b.csv")).unwrap();
        assert_eq!(a.scenario_names(), vec!["A"]);
        assert_eq!(b.scenario_names(), vec!["B"]);
        assert!(b.scenario("B").unwrap().has_indicator("Y"));

        // Same file under another scenario name is a different dataset too.
        let (renamed, _) = load_dataset_cached(&only("A2", "a.csv")).unwrap();
        assert_eq!(renamed.scenario_names(), vec!["A2"]);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let cache: PathCache<u32> = PathCache::default();
        let path = &PathBuf::from("x");
        assert!(cache
            .get_or_load(path, |_| Err(AtlasError::UnknownScenario("x".into())))
            .is_err());
        assert_eq!(*cache.get_or_load(path, |_| Ok(7)).unwrap(), 7);
        assert_eq!(*cache.get_or_load(path, |_| Ok(8)).unwrap(), 7);
    }
}
