//! The externally persisted result of one discovery run.
//!
//! `DiscoveryOutput::empty` is a complete, schema-valid value with every
//! field `missing`; the orchestrator only ever fills it in further.

use serde::{Deserialize, Serialize};

use crate::types::{
    Candidate, DiscoveryRequest, DownloadedFile, FieldName, PerField, QualityLevel, ScheduleEntry,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Documents {
    pub downloads_overview_url: Option<String>,
    pub floorplan_url: Option<String>,
    pub exhibitor_manual_url: Option<String>,
    pub rules_url: Option<String>,
    pub schedule_page_url: Option<String>,
    pub exhibitor_directory_url: Option<String>,
}

impl Documents {
    pub fn url(&self, field: FieldName) -> Option<&str> {
        match field {
            FieldName::Floorplan => self.floorplan_url.as_deref(),
            FieldName::ExhibitorManual => self.exhibitor_manual_url.as_deref(),
            FieldName::Rules => self.rules_url.as_deref(),
            FieldName::Schedule => self.schedule_page_url.as_deref(),
            FieldName::ExhibitorDirectory => self.exhibitor_directory_url.as_deref(),
        }
    }

    pub fn set_url(&mut self, field: FieldName, url: Option<String>) {
        let slot = match field {
            FieldName::Floorplan => &mut self.floorplan_url,
            FieldName::ExhibitorManual => &mut self.exhibitor_manual_url,
            FieldName::Rules => &mut self.rules_url,
            FieldName::Schedule => &mut self.schedule_page_url,
            FieldName::ExhibitorDirectory => &mut self.exhibitor_directory_url,
        };
        *slot = url;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub build_up: Vec<ScheduleEntry>,
    pub tear_down: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub title: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub step: String,
    pub input: String,
    pub output: String,
    pub ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedUrl {
    pub url: String,
    /// HTTP status when the failure came from a response; `None` for
    /// network failures and policy rejections.
    pub status: Option<u16>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub run_id: String,
    pub final_state: String,
    pub pages_opened: u32,
    pub files_downloaded: u32,
    pub elapsed_ms: u64,
    pub action_log: Vec<ActionLogEntry>,
    pub visited_urls: Vec<String>,
    pub downloaded_files: Vec<DownloadedFile>,
    pub blocked_urls: Vec<BlockedUrl>,
    /// Top three candidates per field, best first.
    pub candidates: PerField<Vec<Candidate>>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryOutput {
    pub fair_name: String,
    pub official_url: Option<String>,
    pub official_domain: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub documents: Documents,
    pub schedule: Schedule,
    pub quality: PerField<QualityLevel>,
    pub primary_reasoning: PerField<Option<String>>,
    pub evidence: PerField<Evidence>,
    pub debug: DebugInfo,
}

impl DiscoveryOutput {
    pub fn empty(request: &DiscoveryRequest) -> Self {
        Self {
            fair_name: request.fair_name.clone(),
            official_url: None,
            official_domain: None,
            country: request.country.clone(),
            city: request.city.clone(),
            documents: Documents::default(),
            schedule: Schedule::default(),
            quality: PerField::default(),
            primary_reasoning: PerField::default(),
            evidence: PerField::default(),
            debug: DebugInfo::default(),
        }
    }

    /// Fields whose quality is `strong` but lack a URL or snippet.
    /// Always empty for output produced by the orchestrator.
    pub fn quality_violations(&self) -> Vec<FieldName> {
        FieldName::ALL
            .into_iter()
            .filter(|&f| {
                let url = self.documents.url(f);
                match self.quality.get(f) {
                    QualityLevel::Strong => url.is_none() || self.evidence.get(f).snippet.is_none(),
                    QualityLevel::Missing => url.is_some(),
                    QualityLevel::Weak => false,
                }
            })
            .collect()
    }
}
