// Indicator metadata (`iMeta`) and scenario assumptions (`iAssumptions`).
//
// Both sheets are parsed once at load time into plain maps and never change
// afterwards. Lookups never fail: unknown keys fall back to the raw
// indicator id / an empty assumption.
use crate::normalize::{find_header, RawTable};
use crate::types::IndicatorInfo;
use std::collections::HashMap;

pub const META_CODE: &str = "iCode";
pub const META_NAME: &str = "IndName";
pub const META_NOTE: &str = "Note";
pub const ASSUMPTION_SCENARIO: &str = "Scenario";
pub const ASSUMPTION_TEXT: &str = "Text";

#[derive(Debug, Clone, Default)]
pub struct IndicatorMetadata {
    entries: HashMap<String, IndicatorInfo>,
}

impl IndicatorMetadata {
    /// Build from an `iMeta` sheet. Rows need both a code and a name; rows
    /// missing either are left out, so their indicators resolve to the raw
    /// id. A sheet without the code or name column yields an empty map.
    pub fn from_raw(raw: &RawTable) -> Self {
        let (Some(code_col), Some(name_col)) = (
            find_header(&raw.headers, META_CODE),
            find_header(&raw.headers, META_NAME),
        ) else {
            if !raw.is_empty() {
                tracing::warn!(
                    "metadata sheet lacks `{}`/`{}` columns; indicator titles fall back to codes",
                    META_CODE,
                    META_NAME
                );
            }
            return Self::default();
        };
        let note_col = find_header(&raw.headers, META_NOTE);

        let mut entries = HashMap::new();
        let mut skipped = 0usize;
        for row in 0..raw.rows.len() {
            let (Some(code), Some(name)) = (raw.cell(row, code_col), raw.cell(row, name_col))
            else {
                skipped += 1;
                continue;
            };
            let note = note_col
                .and_then(|c| raw.cell(row, c))
                .unwrap_or_default()
                .to_string();
            entries.entry(code.to_string()).or_insert(IndicatorInfo {
                display_name: name.to_string(),
                note,
            });
        }
        tracing::debug!(entries = entries.len(), skipped, "parsed indicator metadata");
        Self { entries }
    }

    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, IndicatorInfo)>,
        K: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Display name and note for an indicator; the id itself and an empty
    /// note when the sheet has no row for it.
    pub fn resolve(&self, indicator_id: &str) -> IndicatorInfo {
        match self.entries.get(indicator_id) {
            Some(info) => info.clone(),
            None => IndicatorInfo {
                display_name: indicator_id.to_string(),
                note: String::new(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Free-text assumption per scenario, matched trimmed and case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ScenarioAssumptions {
    texts: HashMap<String, String>,
}

fn scenario_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl ScenarioAssumptions {
    pub fn from_raw(raw: &RawTable) -> Self {
        let (Some(scen_col), Some(text_col)) = (
            find_header(&raw.headers, ASSUMPTION_SCENARIO),
            find_header(&raw.headers, ASSUMPTION_TEXT),
        ) else {
            return Self::default();
        };
        let mut texts = HashMap::new();
        for row in 0..raw.rows.len() {
            if let (Some(scenario), Some(text)) = (raw.cell(row, scen_col), raw.cell(row, text_col))
            {
                // First row for a scenario wins.
                texts
                    .entry(scenario_key(scenario))
                    .or_insert_with(|| text.to_string());
            }
        }
        Self { texts }
    }

    /// Assumption text for a scenario, or `""`.
    pub fn text_for(&self, scenario: &str) -> &str {
        self.texts
            .get(&scenario_key(scenario))
            .map(String::as_str)
            .unwrap_or("")
    }
}
