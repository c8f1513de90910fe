//! Mutable state of one discovery run. Owned by a single `discover` call.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use fairscout_common::{
    BlockedUrl, Candidate, DownloadedFile, FieldName, OpenedPage, PerField, ScheduleEntry,
};
use serde::Serialize;
use tokio::time::Instant;

use crate::run_log::ActionLog;
use crate::schedule::{merge_entries, ExtractedSchedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscoveryState {
    Search,
    Entry,
    Downloads,
    PdfParse,
    Select,
    Done,
}

impl DiscoveryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryState::Search => "SEARCH",
            DiscoveryState::Entry => "ENTRY",
            DiscoveryState::Downloads => "DOWNLOADS",
            DiscoveryState::PdfParse => "PDF_PARSE",
            DiscoveryState::Select => "SELECT",
            DiscoveryState::Done => "DONE",
        }
    }
}

impl fmt::Display for DiscoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A PDF link waiting in the download pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PooledPdf {
    pub url: String,
    /// Anchor text or search-result title it was found under.
    pub label: String,
}

pub struct DiscoveryContext {
    pub state: DiscoveryState,
    pub started: Instant,
    pub pages_opened: u32,
    pub files_downloaded: u32,

    pub official_url: Option<String>,
    pub official_domain: Option<String>,
    pub download_center: Option<String>,
    pub downloads_overview_url: Option<String>,

    pub entry_queue: VecDeque<String>,
    queued: HashSet<String>,
    pub pdf_pool: Vec<PooledPdf>,
    pooled: HashSet<String>,
    /// Pages already opened during SEARCH, keyed by final URL.
    pub opened_pages: HashMap<String, OpenedPage>,

    pub candidates: PerField<Vec<Candidate>>,
    pub build_up: Vec<ScheduleEntry>,
    pub tear_down: Vec<ScheduleEntry>,

    pub visited: Vec<String>,
    visited_set: HashSet<String>,
    pub downloaded: Vec<DownloadedFile>,
    pub blocked: Vec<BlockedUrl>,
    pub log: ActionLog,
    pub notes: Vec<String>,
}

impl Default for DiscoveryContext {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryContext {
    pub fn new() -> Self {
        Self {
            state: DiscoveryState::Search,
            started: Instant::now(),
            pages_opened: 0,
            files_downloaded: 0,
            official_url: None,
            official_domain: None,
            download_center: None,
            downloads_overview_url: None,
            entry_queue: VecDeque::new(),
            queued: HashSet::new(),
            pdf_pool: Vec::new(),
            pooled: HashSet::new(),
            opened_pages: HashMap::new(),
            candidates: PerField::default(),
            build_up: Vec::new(),
            tear_down: Vec::new(),
            visited: Vec::new(),
            visited_set: HashSet::new(),
            downloaded: Vec::new(),
            blocked: Vec::new(),
            log: ActionLog::new(),
            notes: Vec::new(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Queue an entry page once. Returns false if it was already queued
    /// or visited.
    pub fn enqueue_entry(&mut self, url: &str) -> bool {
        if self.visited_set.contains(url) || !self.queued.insert(url.to_string()) {
            return false;
        }
        self.entry_queue.push_back(url.to_string());
        true
    }

    /// Put an already-opened page at the head of the entry queue.
    pub fn seed_entry(&mut self, url: &str) {
        if self.queued.insert(url.to_string()) {
            self.entry_queue.push_front(url.to_string());
        }
    }

    /// Add a PDF to the download pool once.
    pub fn add_pdf(&mut self, url: &str, label: &str) -> bool {
        if !self.pooled.insert(url.to_string()) {
            return false;
        }
        self.pdf_pool.push(PooledPdf {
            url: url.to_string(),
            label: label.trim().to_string(),
        });
        true
    }

    pub fn pdf_label(&self, url: &str) -> Option<&str> {
        self.pdf_pool
            .iter()
            .find(|p| p.url == url)
            .map(|p| p.label.as_str())
            .filter(|l| !l.is_empty())
    }

    pub fn add_candidate(&mut self, field: FieldName, candidate: Candidate) {
        self.candidates.get_mut(field).push(candidate);
    }

    pub fn is_candidate(&self, url: &str) -> bool {
        self.candidates
            .iter()
            .any(|(_, list)| list.iter().any(|c| c.url == url))
    }

    pub fn visit(&mut self, url: &str) {
        if self.visited_set.insert(url.to_string()) {
            self.visited.push(url.to_string());
        }
    }

    pub fn was_visited(&self, url: &str) -> bool {
        self.visited_set.contains(url)
    }

    /// Record a failed or rejected URL once.
    pub fn block(&mut self, url: &str, status: Option<u16>, reason: impl Into<String>) {
        if self.is_blocked(url) {
            return;
        }
        self.blocked.push(BlockedUrl {
            url: url.to_string(),
            status,
            reason: reason.into(),
        });
    }

    pub fn is_blocked(&self, url: &str) -> bool {
        self.blocked.iter().any(|b| b.url == url)
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn merge_schedule(&mut self, extracted: ExtractedSchedule) {
        merge_entries(&mut self.build_up, extracted.build_up);
        merge_entries(&mut self.tear_down, extracted.tear_down);
    }

    pub fn has_schedule_entries(&self) -> bool {
        !self.build_up.is_empty() || !self.tear_down.is_empty()
    }
}
