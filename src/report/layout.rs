// Page layout for country profile reports.
//
// Layout works on a plain page model (positioned text runs in PDF points,
// origin bottom-left) so pagination can be inspected without decoding PDF
// bytes. `pdf::encode` turns the model into a document.
use crate::config::AtlasConfig;
use crate::types::{CountryProfile, ProfileEntry};
use crate::util::{format_number, wrap_text};

pub const MM: f32 = 72.0 / 25.4;
pub const A4_WIDTH: f32 = 210.0 * MM;
pub const A4_HEIGHT: f32 = 297.0 * MM;

const LEFT: f32 = 20.0 * MM;
const INDENT: f32 = 22.0 * MM;
const LEVEL_COLUMN: f32 = 120.0 * MM;
const FOOTER_Y: f32 = 10.0 * MM;
const DISCLAIMER_Y: f32 = 15.0 * MM;
/// Summary rows are not drawn below this line.
const ROW_FLOOR: f32 = 40.0 * MM;
/// Detail-page notes stop above the footer area.
const NOTE_FLOOR: f32 = 20.0 * MM;

pub const SUMMARY_HEADER_LEFT: &str = "Indicator";
pub const SUMMARY_HEADER_RIGHT: &str = "Qualitative Level";
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];

    /// PDF base-14 font name.
    pub fn base_name(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
        }
    }

    /// Name under which the font is registered in page resources.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub font: Font,
    pub size: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub runs: Vec<TextRun>,
}

impl Page {
    fn text(&mut self, x: f32, y: f32, font: Font, size: f32, text: impl Into<String>) {
        self.runs.push(TextRun {
            x,
            y,
            font,
            size,
            text: text.into(),
        });
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.runs.iter().any(|r| r.text.contains(needle))
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.runs.iter().map(|r| r.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub width: f32,
    pub height: f32,
    pub pages: Vec<Page>,
}

/// Static text and wrapping width used on every report.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    pub footer_text: String,
    pub disclaimer_text: String,
    pub wrap_width: usize,
}

impl ReportLayout {
    pub fn from_config(cfg: &AtlasConfig) -> Self {
        Self {
            footer_text: cfg.footer_text.clone(),
            disclaimer_text: cfg.disclaimer_text.clone(),
            wrap_width: cfg.wrap_width,
        }
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::from_config(&AtlasConfig::default())
    }
}

/// Value as printed on a detail page: `1,234.57` or `N/A`.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format_number(v, 2),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `profile_<country name with underscores>.pdf`
pub fn report_filename(country_name: &str) -> String {
    format!("profile_{}.pdf", country_name.replace(' ', "_"))
}

// Tracks the summary table as it flows across one or more pages.
struct SummaryWriter<'a> {
    layout: &'a ReportLayout,
    pages: Vec<Page>,
    page: Page,
    y: f32,
}

impl<'a> SummaryWriter<'a> {
    fn new(layout: &'a ReportLayout) -> Self {
        Self {
            layout,
            pages: Vec::new(),
            page: Page::default(),
            y: A4_HEIGHT - 40.0 * MM,
        }
    }

    fn close_page(&mut self) {
        let mut page = std::mem::take(&mut self.page);
        page.text(LEFT, FOOTER_Y, Font::Oblique, 8.0, self.layout.footer_text.as_str());
        if self.pages.is_empty() {
            page.text(
                LEFT,
                DISCLAIMER_Y,
                Font::Oblique,
                8.0,
                self.layout.disclaimer_text.as_str(),
            );
        }
        self.pages.push(page);
    }

    fn break_page(&mut self) {
        self.close_page();
        self.y = A4_HEIGHT - 20.0 * MM;
    }

    fn table_header(&mut self) {
        self.page.text(LEFT, self.y, Font::Bold, 12.0, SUMMARY_HEADER_LEFT);
        self.page
            .text(LEVEL_COLUMN, self.y, Font::Bold, 12.0, SUMMARY_HEADER_RIGHT);
        self.y -= 7.0 * MM;
    }

    fn assumption_block(&mut self, text: &str) {
        let lines = wrap_text(text, self.layout.wrap_width);
        if lines.is_empty() {
            return;
        }
        self.page.text(LEFT, self.y, Font::Regular, 10.0, "Assumptions:");
        self.y -= 6.0 * MM;
        for line in lines {
            if self.y < ROW_FLOOR {
                self.break_page();
            }
            self.page.text(INDENT, self.y, Font::Regular, 10.0, line);
            self.y -= 5.0 * MM;
        }
        self.y -= 4.0 * MM;
    }

    fn row(&mut self, entry: &ProfileEntry) {
        if self.y < ROW_FLOOR {
            self.break_page();
            self.table_header();
        }
        self.page
            .text(LEFT, self.y, Font::Regular, 10.0, entry.display_name.as_str());
        self.page
            .text(LEVEL_COLUMN, self.y, Font::Regular, 10.0, entry.category.label());
        self.y -= 6.0 * MM;
    }

    fn finish(mut self) -> Vec<Page> {
        self.close_page();
        self.pages
    }
}

fn summary_pages(profile: &CountryProfile, layout: &ReportLayout) -> Vec<Page> {
    let mut w = SummaryWriter::new(layout);
    w.page.text(
        LEFT,
        A4_HEIGHT - 20.0 * MM,
        Font::Bold,
        16.0,
        format!(
            "Country profile — {} ({})",
            profile.country_name, profile.country_code
        ),
    );
    w.page.text(
        LEFT,
        A4_HEIGHT - 30.0 * MM,
        Font::Bold,
        12.0,
        format!("Scenario: {}", profile.scenario_name),
    );
    w.assumption_block(&profile.assumption_text);
    if w.y < ROW_FLOOR {
        w.break_page();
    }
    w.table_header();
    for entry in &profile.entries {
        w.row(entry);
    }
    w.finish()
}

fn detail_page(profile: &CountryProfile, entry: &ProfileEntry, layout: &ReportLayout) -> Page {
    let mut page = Page::default();
    page.text(
        LEFT,
        A4_HEIGHT - 25.0 * MM,
        Font::Bold,
        16.0,
        format!(
            "{} ({}) — {}",
            profile.country_name, profile.country_code, profile.scenario_name
        ),
    );
    page.text(
        LEFT,
        A4_HEIGHT - 40.0 * MM,
        Font::Bold,
        14.0,
        entry.display_name.as_str(),
    );
    page.text(
        LEFT,
        A4_HEIGHT - 55.0 * MM,
        Font::Regular,
        12.0,
        format!("Value: {}", format_value(entry.value)),
    );
    page.text(
        LEFT,
        A4_HEIGHT - 65.0 * MM,
        Font::Regular,
        12.0,
        format!("Qualitative: {}", entry.category.label()),
    );

    let mut lines = wrap_text(&entry.note, layout.wrap_width);
    let start = A4_HEIGHT - 80.0 * MM;
    let fit = ((start - NOTE_FLOOR) / 12.0).floor() as usize + 1;
    if lines.len() > fit {
        tracing::debug!(indicator = %entry.indicator_id, lines = lines.len(), fit, "truncating note");
        lines.truncate(fit);
        if let Some(last) = lines.last_mut() {
            last.push_str("...");
        }
    }
    let mut y = start;
    for line in lines {
        page.text(LEFT, y, Font::Oblique, 10.0, line);
        y -= 12.0;
    }

    page.text(LEFT, FOOTER_Y, Font::Oblique, 8.0, layout.footer_text.as_str());
    page
}

/// Lay out the full report: summary page(s) followed by one detail page per
/// entry, in profile order.
pub fn layout_report(profile: &CountryProfile, layout: &ReportLayout) -> ReportDocument {
    let mut pages = summary_pages(profile, layout);
    pages.extend(
        profile
            .entries
            .iter()
            .map(|entry| detail_page(profile, entry, layout)),
    );
    ReportDocument {
        width: A4_WIDTH,
        height: A4_HEIGHT,
        pages,
    }
}
