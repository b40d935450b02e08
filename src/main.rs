// Interactive entry point.
//
// [1] loads every scenario sheet plus metadata and assumptions,
// [2] picks the working scenario and [3] the indicator, printing the map
// classes and exporting the classified layer, [4] renders a country profile
// PDF and [5] compares one country across scenarios.
use once_cell::sync::Lazy;
use rust_atlas::config::{AtlasConfig, DEFAULT_CONFIG_FILE};
use rust_atlas::geometry::load_geometry_cached;
use rust_atlas::loader::{load_dataset_cached, Dataset};
use rust_atlas::map::{build_map_layer, preview_rows, summarize};
use rust_atlas::report::{self, layout::format_value, report_filename, ReportLayout};
use rust_atlas::types::{ProfileSummaryRow, ScenarioOverviewRow};
use rust_atlas::{build_named_profile, output, scenario_overview, util, valid_indicators, AtlasResult};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::EnvFilter;

// Loaded once per run; scenario and indicator choices persist between menu
// actions.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    data: Option<Arc<Dataset>>,
    scenario: Option<String>,
    indicator: Option<String>,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner())
}

fn prompt(label: &str) -> String {
    print!("{}: ", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Show a numbered list and return the chosen item. Accepts the number or
/// the item text itself (case-insensitive).
fn pick(label: &str, items: &[String]) -> Option<String> {
    if items.is_empty() {
        println!("(nothing to choose from)\n");
        return None;
    }
    for (i, item) in items.iter().enumerate() {
        println!("[{}] {}", i + 1, item);
    }
    let answer = prompt(label);
    let chosen = match answer.parse::<usize>() {
        Ok(n) if (1..=items.len()).contains(&n) => Some(items[n - 1].clone()),
        _ => items
            .iter()
            .find(|i| i.eq_ignore_ascii_case(&answer))
            .cloned(),
    };
    if chosen.is_none() {
        println!("Invalid choice.\n");
    }
    chosen
}

fn slug(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Dataset plus the selected scenario, or a message explaining what is
/// missing.
fn require_scenario() -> Option<(Arc<Dataset>, String)> {
    let st = state();
    let Some(data) = st.data.clone() else {
        println!("Error: No data loaded. Please load the data first (option 1).\n");
        return None;
    };
    let scenario = st
        .scenario
        .clone()
        .or_else(|| data.scenario_names().first().map(|s| s.to_string()));
    match scenario {
        Some(s) => Some((data, s)),
        None => {
            println!("Error: No scenario sheets were found.\n");
            None
        }
    }
}

fn handle_load(cfg: &AtlasConfig) {
    match load_dataset_cached(cfg) {
        Ok((data, load_report)) => {
            println!(
                "Processing dataset... ({} scenarios, {} rows, {} indicator descriptions)",
                load_report.scenarios_loaded,
                util::format_int(load_report.total_rows as i64),
                util::format_int(load_report.metadata_entries as i64)
            );
            for name in &load_report.scenarios_missing {
                println!("Note: sheet for {} not found; skipped.", name);
            }
            for name in &load_report.degraded {
                println!(
                    "Warning: {} has no recognized country code column; using its first column.",
                    name
                );
            }
            println!();
            let mut st = state();
            st.scenario = data.scenario_names().first().map(|s| s.to_string());
            st.indicator = None;
            st.data = Some(data);
        }
        Err(e) => eprintln!("Failed to load data: {}\n", e),
    }
}

fn handle_scenario() {
    let Some((data, _)) = require_scenario() else {
        return;
    };
    let names: Vec<String> = data.scenario_names().iter().map(|s| s.to_string()).collect();
    if let Some(choice) = pick("Scenario", &names) {
        println!("Scenario set to {}.\n", choice);
        state().scenario = Some(choice);
    }
}

fn handle_map(cfg: &AtlasConfig) -> AtlasResult<()> {
    let Some((data, scenario)) = require_scenario() else {
        return Ok(());
    };
    let table = data.scenario(&scenario)?;
    let indicator = match pick("Indicator", table.indicators()) {
        Some(i) => i,
        None => return Ok(()),
    };
    state().indicator = Some(indicator.clone());

    let geometry = load_geometry_cached(cfg)?;
    let layer = build_map_layer(&geometry, table, &indicator, &data.metadata)?;
    println!("\n{}\n", layer.title);
    let rows = layer.rows();
    output::preview_table_rows(&rows, cfg.preview_rows);

    let base = cfg
        .output_dir
        .join(format!("map_{}_{}", slug(&scenario), slug(&indicator)));
    let geojson_path = base.with_extension("geojson");
    output::write_bytes(
        &geojson_path,
        serde_json::to_string_pretty(&layer.to_geojson())?.as_bytes(),
    )?;
    output::write_csv(&base.with_extension("csv"), &rows)?;
    println!("(Classified layer exported to {})\n", geojson_path.display());

    match summarize(table, &indicator) {
        Some(s) => println!(
            "Summary: min {}, 25% {}, median {}, max {} ({} countries)\n",
            util::format_number(s.min, 2),
            util::format_number(s.p25, 2),
            util::format_number(s.median, 2),
            util::format_number(s.max, 2),
            s.count
        ),
        None => println!("Summary: no numeric data\n"),
    }
    println!("Data preview:");
    output::preview_table_rows(&preview_rows(table, &indicator, cfg.preview_rows), cfg.preview_rows);
    Ok(())
}

fn handle_profile(cfg: &AtlasConfig) -> AtlasResult<()> {
    let Some((data, scenario)) = require_scenario() else {
        return Ok(());
    };
    let table = data.scenario(&scenario)?;
    table.require_code_column()?;
    let Some(country) = pick("Country", &table.country_names()) else {
        return Ok(());
    };
    let code = table.code_for_name(&country)?.to_string();

    let answer = prompt(&format!(
        "Indicators (comma separated, blank for the first {})",
        cfg.default_report_indicators
    ));
    let requested: Vec<String> = if answer.is_empty() {
        table
            .indicators()
            .iter()
            .take(cfg.default_report_indicators)
            .cloned()
            .collect()
    } else {
        answer
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    };
    let indicators = valid_indicators(table, &requested)?;

    let profile = build_named_profile(
        table,
        &country,
        &code,
        &indicators,
        &data.metadata,
        data.assumptions.text_for(&scenario),
    );
    let bytes = report::render(&profile, &ReportLayout::from_config(cfg))?;
    let path = cfg.output_dir.join(report_filename(&profile.country_name));
    output::write_bytes(&path, &bytes)?;
    output::write_json(&path.with_extension("json"), &profile)?;

    let rows: Vec<ProfileSummaryRow> = profile
        .entries
        .iter()
        .map(|e| ProfileSummaryRow {
            indicator: e.display_name.clone(),
            value: format_value(e.value),
            level: e.category.label().to_string(),
        })
        .collect();
    println!("\n{} - {}\n", profile.country_name, profile.scenario_name);
    output::preview_table_rows(&rows, rows.len());
    println!("(Profile saved to {})\n", path.display());
    Ok(())
}

fn handle_overview(cfg: &AtlasConfig) -> AtlasResult<()> {
    let Some((data, scenario)) = require_scenario() else {
        return Ok(());
    };
    let table = data.scenario(&scenario)?;
    let selected = state().indicator.clone();
    let indicator = match selected {
        Some(i) => i,
        None => match pick("Indicator", table.indicators()) {
            Some(i) => i,
            None => return Ok(()),
        },
    };
    let Some(country) = pick("Country", &table.country_names()) else {
        return Ok(());
    };
    let code = table.code_for_name(&country)?;

    let rows: Vec<ScenarioOverviewRow> = scenario_overview(&data.scenarios, code, &indicator)
        .into_iter()
        .map(|r| ScenarioOverviewRow {
            scenario: r.scenario,
            value: format_value(r.value),
            level: r.category.label().to_string(),
        })
        .collect();
    println!(
        "\n{} across scenarios for {}\n",
        data.metadata.resolve(&indicator).display_name,
        country
    );
    output::preview_table_rows(&rows, rows.len());
    let path = cfg
        .output_dir
        .join(format!("overview_{}_{}.csv", slug(code), slug(&indicator)));
    output::write_csv(&path, &rows)?;
    println!("(Full table exported to {})\n", path.display());
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cfg = match AtlasConfig::load_or_default(DEFAULT_CONFIG_FILE) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid {}: {}", DEFAULT_CONFIG_FILE, e);
            std::process::exit(2);
        }
    };

    loop {
        println!("Country Atlas:");
        println!("[1] Load data");
        println!("[2] Select scenario");
        println!("[3] Classify indicator (map)");
        println!("[4] Generate country profile (PDF)");
        println!("[5] Compare scenarios for a country");
        println!("[0] Exit\n");
        let result = match prompt("Enter choice").as_str() {
            "1" => {
                handle_load(&cfg);
                Ok(())
            }
            "2" => {
                handle_scenario();
                Ok(())
            }
            "3" => handle_map(&cfg),
            "4" => handle_profile(&cfg),
            "5" => handle_overview(&cfg),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 0-5.\n");
                Ok(())
            }
        };
        if let Err(e) = result {
            eprintln!("Error: {}\n", e);
        }
    }
}
