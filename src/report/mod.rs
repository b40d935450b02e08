//! Country profile reports: page layout and PDF output.
//!
//! The report is a summary page (title, scenario, optional assumptions and a
//! two-column indicator/level table that continues onto extra pages when it
//! runs long) followed by one detail page per indicator.
pub mod layout;
pub mod pdf;

pub use layout::{layout_report, report_filename, ReportDocument, ReportLayout};

use crate::error::AtlasResult;
use crate::types::CountryProfile;

/// Lay out and encode a profile as PDF bytes.
pub fn render(profile: &CountryProfile, layout: &ReportLayout) -> AtlasResult<Vec<u8>> {
    let doc = layout_report(profile, layout);
    tracing::info!(
        country = %profile.country_code,
        scenario = %profile.scenario_name,
        entries = profile.entries.len(),
        pages = doc.pages.len(),
        "rendering country profile"
    );
    pdf::encode(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, ProfileEntry};

    fn profile(n: usize) -> CountryProfile {
        CountryProfile {
            country_name: "Kenya".to_string(),
            country_code: "KEN".to_string(),
            scenario_name: "Short-Term Scenario".to_string(),
            assumption_text: String::new(),
            entries: (0..n)
                .map(|i| ProfileEntry {
                    indicator_id: format!("I{i}"),
                    display_name: format!("Indicator {i}"),
                    value: Some(i as f64),
                    category: Category::High,
                    note: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn pdf_has_one_page_per_laid_out_page() {
        let bytes = render(&profile(5), &ReportLayout::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 6);
    }

    #[test]
    fn empty_profile_still_renders() {
        let bytes = render(&profile(0), &ReportLayout::default()).unwrap();
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
