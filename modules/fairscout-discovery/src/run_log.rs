//! Action log: ordered record of every collaborator call and budget
//! decision in one run. Ends up in `debug.action_log`.

use fairscout_common::ActionLogEntry;
use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Search,
    OpenPage,
    VerifyIdentity,
    Download,
    ParsePdf,
    ExtractSchedule,
    Budget,
    Select,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Search => "search",
            Step::OpenPage => "open_page",
            Step::VerifyIdentity => "verify_identity",
            Step::Download => "download",
            Step::ParsePdf => "parse_pdf",
            Step::ExtractSchedule => "extract_schedule",
            Step::Budget => "budget",
            Step::Select => "select",
        }
    }
}

#[derive(Debug, Default)]
pub struct ActionLog {
    entries: Vec<ActionLogEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: Step, input: impl Into<String>, output: impl Into<String>, ms: u64) {
        self.entries.push(ActionLogEntry {
            step: step.as_str().to_string(),
            input: input.into(),
            output: output.into(),
            ms,
        });
    }

    /// Record with the duration measured from `started`.
    pub fn record_since(
        &mut self,
        step: Step,
        input: impl Into<String>,
        output: impl Into<String>,
        started: Instant,
    ) {
        let ms = started.elapsed().as_millis() as u64;
        self.record(step, input, output, ms);
    }

    pub fn entries(&self) -> &[ActionLogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ActionLogEntry> {
        self.entries
    }
}
