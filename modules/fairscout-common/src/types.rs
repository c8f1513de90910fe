use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

// --- Field Names ---

/// The five document slots a discovery run tries to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Floorplan,
    ExhibitorManual,
    Rules,
    Schedule,
    ExhibitorDirectory,
}

impl FieldName {
    pub const ALL: [FieldName; 5] = [
        FieldName::Floorplan,
        FieldName::ExhibitorManual,
        FieldName::Rules,
        FieldName::Schedule,
        FieldName::ExhibitorDirectory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Floorplan => "floorplan",
            FieldName::ExhibitorManual => "exhibitor_manual",
            FieldName::Rules => "rules",
            FieldName::Schedule => "schedule",
            FieldName::ExhibitorDirectory => "exhibitor_directory",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per field. Named members instead of a map so every consumer
/// is forced to handle all five fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerField<T> {
    pub floorplan: T,
    pub exhibitor_manual: T,
    pub rules: T,
    pub schedule: T,
    pub exhibitor_directory: T,
}

impl<T> PerField<T> {
    pub fn from_fn(mut f: impl FnMut(FieldName) -> T) -> Self {
        Self {
            floorplan: f(FieldName::Floorplan),
            exhibitor_manual: f(FieldName::ExhibitorManual),
            rules: f(FieldName::Rules),
            schedule: f(FieldName::Schedule),
            exhibitor_directory: f(FieldName::ExhibitorDirectory),
        }
    }

    pub fn get(&self, field: FieldName) -> &T {
        match field {
            FieldName::Floorplan => &self.floorplan,
            FieldName::ExhibitorManual => &self.exhibitor_manual,
            FieldName::Rules => &self.rules,
            FieldName::Schedule => &self.schedule,
            FieldName::ExhibitorDirectory => &self.exhibitor_directory,
        }
    }

    pub fn get_mut(&mut self, field: FieldName) -> &mut T {
        match field {
            FieldName::Floorplan => &mut self.floorplan,
            FieldName::ExhibitorManual => &mut self.exhibitor_manual,
            FieldName::Rules => &mut self.rules,
            FieldName::Schedule => &mut self.schedule,
            FieldName::ExhibitorDirectory => &mut self.exhibitor_directory,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &T)> {
        FieldName::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

// --- Quality ---

/// Confidence in a field's final answer. Ordered `Missing < Weak < Strong`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    #[default]
    Missing,
    Weak,
    Strong,
}

impl QualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Missing => "missing",
            QualityLevel::Weak => "weak",
            QualityLevel::Strong => "strong",
        }
    }
}

// --- Candidates ---

/// Where the evidence behind a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Anchor text / href only, never visited.
    Link,
    /// An opened HTML page.
    Page,
    /// A downloaded and parsed PDF.
    Pdf,
}

/// A scored guess at a field's URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub url: String,
    /// 0–100.
    pub score: u8,
    pub reason: String,
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub source: SourceKind,
}

// --- Schedule ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
    /// 24-hour `HH:MM`.
    pub time: Option<String>,
    pub description: String,
    pub source_url: String,
}

// --- Request ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct DiscoveryRequest {
    #[builder(setter(into))]
    pub fair_name: String,
    #[builder(default, setter(strip_option, into))]
    pub known_url: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub city: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub country: Option<String>,
}

// --- Collaborator payloads ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// An outgoing link as seen on a rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub href: String,
    pub text: String,
    /// Visible text immediately preceding the anchor.
    pub context: String,
}

/// A successfully opened page. `final_url` is the address after redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenedPage {
    pub status: u16,
    pub final_url: String,
    pub title: String,
    pub text: String,
    pub links: Vec<PageLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedFile {
    pub url: String,
    pub path: PathBuf,
    pub content_type: Option<String>,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPdf {
    pub text: String,
    pub num_pages: u32,
    pub title: Option<String>,
}

// --- URL helpers ---

/// Lowercased host of a URL, `None` for anything that does not parse.
pub fn extract_host(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// True when the URL path (query and fragment ignored) names a PDF.
pub fn is_pdf_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(u) => u.path().to_lowercase().ends_with(".pdf"),
        Err(_) => {
            let lower = url.to_lowercase();
            let path = lower.split(['?', '#']).next().unwrap_or("");
            path.ends_with(".pdf")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_field_covers_every_field() {
        let fields = PerField::from_fn(|f| f.as_str().to_string());
        let keys: Vec<_> = fields.iter().map(|(f, v)| (f, v.clone())).collect();
        assert_eq!(keys.len(), 5);
        for (field, value) in keys {
            assert_eq!(field.as_str(), value);
        }
    }

    #[test]
    fn per_field_serializes_with_five_snake_case_keys() {
        let fields: PerField<u8> = PerField::default();
        let json = serde_json::to_value(&fields).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        for field in FieldName::ALL {
            assert!(obj.contains_key(field.as_str()), "missing key {field}");
        }
    }

    #[test]
    fn quality_levels_are_ordered() {
        assert!(QualityLevel::Missing < QualityLevel::Weak);
        assert!(QualityLevel::Weak < QualityLevel::Strong);
        assert_eq!(serde_json::to_string(&QualityLevel::Strong).unwrap(), "\"strong\"");
    }

    #[test]
    fn request_builder_defaults_optionals() {
        let req = DiscoveryRequest::builder().fair_name("Fruit Logistica").build();
        assert_eq!(req.fair_name, "Fruit Logistica");
        assert!(req.known_url.is_none());
        assert!(req.city.is_none());
    }

    #[test]
    fn pdf_detection_ignores_query_string() {
        assert!(is_pdf_url("https://example.com/docs/Manual.PDF?v=3"));
        assert!(!is_pdf_url("https://example.com/pdf/overview"));
        assert!(is_pdf_url("not a url/guide.pdf"));
    }

    #[test]
    fn host_is_lowercased() {
        assert_eq!(extract_host("https://WWW.Example.com/x").as_deref(), Some("www.example.com"));
        assert_eq!(extract_host("garbage"), None);
    }
}
