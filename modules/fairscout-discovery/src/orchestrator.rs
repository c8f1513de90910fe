//! The discovery state machine.
//!
//! One `discover` call walks SEARCH → ENTRY → DOWNLOADS → PDF_PARSE →
//! SELECT → DONE against a fresh [`DiscoveryContext`]. Budgets are checked
//! before every working state against the counter that state spends; an
//! exhausted budget jumps straight to SELECT.
//! Collaborator failures are recorded and never abort the run, so a
//! complete [`DiscoveryOutput`] always comes back.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Datelike;
use fairscout_archive::{CacheStore, RateLimiter};
use fairscout_common::{
    extract_host, is_pdf_url, Budget, DebugInfo, DiscoveryOutput, DiscoveryRequest,
    DownloadedFile, Evidence as FieldEvidence, FieldName, OpenedPage, ParsedPdf, QualityLevel,
    Schedule, SearchResult, SourceKind,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::{DiscoveryContext, DiscoveryState, PooledPdf};
use crate::domain_guard::{title_matches_fair, DomainGuard, GuardCategory};
use crate::fetch::{Fetched, Fetchers};
use crate::keywords::{
    contains_any, download_priority, field_keywords, fields_in, matched_in_url, pdf_excluded,
    DOWNLOAD_CENTER, ENTRY_AREA,
};
use crate::run_log::Step;
use crate::schedule::{extract_schedule, has_schedule_signal};
use crate::scoring::{score_candidate, select, Evidence, Selection, PDF_CONTENT_BONUS};
use crate::traits::ContentFetcher;

/// Entry pages processed per run.
const MAX_ENTRY_PAGES: usize = 5;
/// Search results opened while resolving the official site.
const MAX_IDENTITY_ATTEMPTS: usize = 3;

/// Host labels of search engines, any TLD.
const SEARCH_ENGINES: &[&str] = &["google", "bing", "duckduckgo", "yahoo", "yandex", "baidu"];

/// Hosts that list or discuss fairs but are never a fair's own site.
const NON_OFFICIAL_HOSTS: &[&str] = &[
    "wikipedia.org",
    "facebook.com",
    "linkedin.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "youtube.com",
    "10times.com",
    "eventseye.com",
    "tradefairdates.com",
    "expodatabase.com",
    "auma.de",
];

const WORKING_STATES: [DiscoveryState; 4] = [
    DiscoveryState::Search,
    DiscoveryState::Entry,
    DiscoveryState::Downloads,
    DiscoveryState::PdfParse,
];

/// What a search query is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryPurpose {
    Identity,
    Fields(&'static [FieldName]),
}

struct SearchBatch {
    purpose: QueryPurpose,
    results: Vec<SearchResult>,
}

pub struct Orchestrator {
    fetchers: Fetchers,
    budget: Budget,
    reference_year: i32,
}

impl Orchestrator {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        limiter: Arc<RateLimiter>,
        cache: Option<Arc<CacheStore>>,
        budget: Budget,
    ) -> Self {
        Self {
            fetchers: Fetchers::new(fetcher, limiter, cache),
            budget,
            reference_year: chrono::Utc::now().year(),
        }
    }

    /// Year treated as "current" by the freshness score.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub async fn discover(&self, request: &DiscoveryRequest) -> DiscoveryOutput {
        let run_id = Uuid::new_v4();
        let guard = DomainGuard::new(&request.fair_name).with_city(request.city.as_deref());
        let mut ctx = DiscoveryContext::new();
        info!(%run_id, fair = request.fair_name.as_str(), known_url = ?request.known_url, "Discovery started");

        for state in WORKING_STATES {
            if let Some(reason) = self.exhausted_budget(&ctx, state) {
                warn!(%run_id, state = %state, reason = reason.as_str(), "Budget exhausted, jumping to SELECT");
                ctx.log.record(Step::Budget, state.as_str(), format!("exhausted: {reason}"), 0);
                ctx.note(format!("budget exhausted before {state}: {reason}"));
                break;
            }
            ctx.state = state;
            info!(%run_id, state = %state, pages_opened = ctx.pages_opened, files_downloaded = ctx.files_downloaded, "Entering state");
            match state {
                DiscoveryState::Search => self.run_search(&mut ctx, request, &guard).await,
                DiscoveryState::Entry => self.run_entry(&mut ctx, &guard).await,
                DiscoveryState::Downloads => self.run_downloads(&mut ctx, &guard).await,
                DiscoveryState::PdfParse => self.run_pdf_parse(&mut ctx, &guard).await,
                DiscoveryState::Select | DiscoveryState::Done => {}
            }
        }

        ctx.state = DiscoveryState::Select;
        let mut output = self.run_select(&mut ctx, request);
        ctx.state = DiscoveryState::Done;

        let candidates = std::mem::take(&mut output.debug.candidates);
        output.debug = DebugInfo {
            run_id: run_id.to_string(),
            final_state: ctx.state.as_str().to_string(),
            pages_opened: ctx.pages_opened,
            files_downloaded: ctx.files_downloaded,
            elapsed_ms: ctx.elapsed_ms(),
            action_log: std::mem::take(&mut ctx.log).into_entries(),
            visited_urls: ctx.visited,
            downloaded_files: ctx.downloaded,
            blocked_urls: ctx.blocked,
            candidates,
            notes: ctx.notes,
        };

        info!(
            %run_id,
            official_url = ?output.official_url,
            pages_opened = output.debug.pages_opened,
            files_downloaded = output.debug.files_downloaded,
            blocked = output.debug.blocked_urls.len(),
            elapsed_ms = output.debug.elapsed_ms,
            "Discovery finished"
        );
        output
    }

    // --- Budgets ---

    /// Reason the run may not enter `state`, if any. Runtime applies to
    /// every state; each counter only gates the state that spends it. Page
    /// opens gate SEARCH and ENTRY, downloads gate DOWNLOADS, and PDF
    /// parsing is local work.
    fn exhausted_budget(&self, ctx: &DiscoveryContext, state: DiscoveryState) -> Option<String> {
        let elapsed = ctx.started.elapsed();
        if elapsed >= self.budget.max_runtime {
            return Some(format!(
                "runtime {}s of {}s",
                elapsed.as_secs(),
                self.budget.max_runtime.as_secs()
            ));
        }
        match state {
            DiscoveryState::Search | DiscoveryState::Entry
                if ctx.pages_opened >= self.budget.max_page_opens =>
            {
                Some(format!(
                    "page opens {}/{}",
                    ctx.pages_opened, self.budget.max_page_opens
                ))
            }
            DiscoveryState::Downloads if ctx.files_downloaded >= self.budget.max_downloads => {
                Some(format!(
                    "downloads {}/{}",
                    ctx.files_downloaded, self.budget.max_downloads
                ))
            }
            _ => None,
        }
    }

    fn can_open(&self, ctx: &DiscoveryContext) -> bool {
        ctx.pages_opened < self.budget.max_page_opens
    }

    // --- SEARCH ---

    async fn run_search(
        &self,
        ctx: &mut DiscoveryContext,
        request: &DiscoveryRequest,
        guard: &DomainGuard,
    ) {
        let known = request
            .known_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());

        if let Some(known) = known {
            if let Some(page) = self.open_page(ctx, known).await {
                if title_matches_fair(&page.title, &request.fair_name) {
                    ctx.log.record(Step::VerifyIdentity, known, "title mentions the fair", 0);
                } else {
                    ctx.log.record(
                        Step::VerifyIdentity,
                        known,
                        format!("title {:?} does not mention the fair", page.title),
                        0,
                    );
                    ctx.note(format!("known URL {known} accepted without a title match"));
                }
                self.accept_identity(ctx, page);
                return;
            }
            ctx.note(format!("known URL {known} could not be opened, falling back to search"));
        }

        let mut batches = Vec::new();
        for (query, purpose) in search_queries(request) {
            let started = Instant::now();
            match self.fetchers.search(&query).await {
                Ok(results) => {
                    debug!(query = query.as_str(), results = results.len(), "Search complete");
                    ctx.log.record_since(
                        Step::Search,
                        query.as_str(),
                        format!("{} results", results.len()),
                        started,
                    );
                    batches.push(SearchBatch { purpose, results });
                }
                Err(e) => {
                    warn!(query = query.as_str(), error = %e, "Search failed");
                    ctx.log.record_since(Step::Search, query.as_str(), format!("error: {e}"), started);
                }
            }
        }

        self.resolve_identity(ctx, request, &batches).await;

        for batch in &batches {
            let QueryPurpose::Fields(fields) = batch.purpose else {
                continue;
            };
            for result in &batch.results {
                self.take_search_result(ctx, guard, fields, result);
            }
        }
    }

    /// Open the first few results whose title names the fair; the first one
    /// that opens becomes the official site.
    async fn resolve_identity(
        &self,
        ctx: &mut DiscoveryContext,
        request: &DiscoveryRequest,
        batches: &[SearchBatch],
    ) {
        let mut tried_hosts = HashSet::new();
        let mut attempts = 0;

        for result in batches.iter().flat_map(|b| b.results.iter()) {
            if attempts >= MAX_IDENTITY_ATTEMPTS || !self.can_open(ctx) {
                break;
            }
            let Some(host) = extract_host(&result.url) else {
                continue;
            };
            if is_search_engine(&host)
                || is_non_official(&host)
                || is_pdf_url(&result.url)
                || !title_matches_fair(&result.title, &request.fair_name)
            {
                continue;
            }
            if !tried_hosts.insert(bare_host(&host).to_string()) {
                continue;
            }

            attempts += 1;
            if let Some(page) = self.open_page(ctx, &result.url).await {
                ctx.log.record(
                    Step::VerifyIdentity,
                    result.url.as_str(),
                    format!("accepted, search title {:?}", result.title),
                    0,
                );
                self.accept_identity(ctx, page);
                return;
            }
        }

        info!(fair = request.fair_name.as_str(), attempts, "Official site not resolved");
        ctx.note("official site not resolved");
    }

    fn accept_identity(&self, ctx: &mut DiscoveryContext, page: OpenedPage) {
        let url = page.final_url.clone();
        let domain = extract_host(&url).map(|h| bare_host(&h).to_string());
        info!(official_url = url.as_str(), official_domain = ?domain, "Official site resolved");
        ctx.official_url = Some(url.clone());
        ctx.official_domain = domain;
        ctx.seed_entry(&url);
        ctx.opened_pages.insert(url, page);
    }

    /// Score a search hit for the fields its query targeted. Not opened.
    fn take_search_result(
        &self,
        ctx: &mut DiscoveryContext,
        guard: &DomainGuard,
        fields: &[FieldName],
        result: &SearchResult,
    ) {
        let url = result.url.trim();
        if extract_host(url).is_some_and(|h| is_search_engine(&h)) {
            return;
        }
        let verdict = guard.classify(url, ctx.official_domain.as_deref());
        if !verdict.allowed {
            if verdict.is_contamination() {
                ctx.block(url, None, format!("domain_rejected: {}", verdict.reason));
            }
            return;
        }

        if is_pdf_url(url) {
            ctx.add_pdf(url, &result.title);
        }
        if guard.wrong_edition(url).is_some() {
            return;
        }
        for &field in fields {
            if !names_field(field, url, &result.title) {
                continue;
            }
            let candidate = score_candidate(
                field,
                Evidence { url, title: Some(result.title.as_str()), content: None },
                SourceKind::Link,
                0,
                self.reference_year,
            );
            ctx.add_candidate(field, candidate);
        }
    }

    // --- ENTRY ---

    async fn run_entry(&self, ctx: &mut DiscoveryContext, guard: &DomainGuard) {
        let mut processed = 0;
        while processed < MAX_ENTRY_PAGES {
            let Some(url) = ctx.entry_queue.pop_front() else {
                break;
            };

            let page = if let Some(page) = ctx.opened_pages.remove(&url) {
                Some(page)
            } else if ctx.was_visited(&url) {
                continue;
            } else if !self.can_open(ctx) {
                ctx.note(format!("page budget reached with {} entry pages queued", ctx.entry_queue.len() + 1));
                break;
            } else {
                self.open_page(ctx, &url).await
            };

            processed += 1;
            if let Some(page) = page {
                self.harvest_page(ctx, guard, &page, true);
            }
        }
        debug!(processed, queued = ctx.entry_queue.len(), pdfs = ctx.pdf_pool.len(), "Entry pages done");
    }

    /// Score an opened page and every link on it. With `follow_entries`,
    /// links into the exhibitor area, and on-site pages naming a floor plan
    /// or exhibitor directory, are queued as entry pages so their content
    /// gets scored.
    fn harvest_page(
        &self,
        ctx: &mut DiscoveryContext,
        guard: &DomainGuard,
        page: &OpenedPage,
        follow_entries: bool,
    ) {
        let page_url = page.final_url.as_str();
        let text_lower = page.text.to_lowercase();

        for field in fields_in(&text_lower) {
            let candidate = score_candidate(
                field,
                Evidence { url: page_url, title: Some(page.title.as_str()), content: Some(page.text.as_str()) },
                SourceKind::Page,
                0,
                self.reference_year,
            );
            ctx.add_candidate(field, candidate);
        }
        if has_schedule_signal(&page.text) {
            self.mine_schedule(ctx, &page.text, page_url);
        }

        for link in &page.links {
            let href = link.href.as_str();
            if href == page_url {
                continue;
            }
            let verdict = guard.classify(href, ctx.official_domain.as_deref());
            if !verdict.allowed {
                if verdict.is_contamination() {
                    debug!(url = href, reason = verdict.reason.as_str(), "Foreign fair link rejected");
                    ctx.block(href, None, format!("domain_rejected: {}", verdict.reason));
                }
                continue;
            }

            let haystack = format!("{} {}", link.text.to_lowercase(), href.to_lowercase());
            let other_edition = guard.wrong_edition(href).is_some();
            if is_pdf_url(href) {
                // Pooled for the record; DOWNLOADS drops other editions.
                ctx.add_pdf(href, &link.text);
            } else if !other_edition {
                if ctx.download_center.is_none() && contains_any(&haystack, DOWNLOAD_CENTER) {
                    debug!(url = href, "Download center found");
                    ctx.download_center = Some(href.to_string());
                }
                let entry_link = contains_any(&haystack, ENTRY_AREA)
                    || names_page_field(verdict.category, href, &link.text);
                if follow_entries && entry_link {
                    ctx.enqueue_entry(href);
                }
            }

            if other_edition {
                continue;
            }
            for field in FieldName::ALL {
                if !names_field(field, href, &link.text)
                    || (is_pdf_url(href) && pdf_excluded(field, href, &link.text))
                {
                    continue;
                }
                let candidate = score_candidate(
                    field,
                    Evidence { url: href, title: Some(link.text.as_str()), content: None },
                    SourceKind::Link,
                    0,
                    self.reference_year,
                );
                ctx.add_candidate(field, candidate);
            }
        }
    }

    fn mine_schedule(&self, ctx: &mut DiscoveryContext, text: &str, source_url: &str) {
        let extracted = extract_schedule(text, source_url);
        ctx.log.record(
            Step::ExtractSchedule,
            source_url,
            format!(
                "{} build-up, {} tear-down",
                extracted.build_up.len(),
                extracted.tear_down.len()
            ),
            0,
        );
        if !extracted.is_empty() {
            info!(
                url = source_url,
                build_up = extracted.build_up.len(),
                tear_down = extracted.tear_down.len(),
                "Schedule entries extracted"
            );
            ctx.merge_schedule(extracted);
        }
    }

    // --- DOWNLOADS ---

    async fn run_downloads(&self, ctx: &mut DiscoveryContext, guard: &DomainGuard) {
        if let Some(center) = ctx.download_center.clone() {
            if ctx.was_visited(&center) {
                if !ctx.is_blocked(&center) {
                    ctx.downloads_overview_url = Some(center);
                }
            } else if self.can_open(ctx) {
                if let Some(page) = self.open_page(ctx, &center).await {
                    ctx.downloads_overview_url = Some(page.final_url.clone());
                    self.harvest_page(ctx, guard, &page, false);
                }
            }
        }

        let mut ranked: Vec<(u32, PooledPdf)> = Vec::new();
        for pdf in ctx.pdf_pool.clone() {
            if let Some(fragment) = guard.wrong_edition(&pdf.url) {
                debug!(url = pdf.url.as_str(), fragment, "Other edition's PDF skipped");
                ctx.note(format!("skipped other edition's PDF {} ({fragment})", pdf.url));
                continue;
            }
            let priority = download_priority(&pdf.url, &pdf.label, ctx.is_candidate(&pdf.url));
            ranked.push((priority, pdf));
        }
        // Stable: equal priorities keep discovery order.
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        let remaining = self.budget.max_downloads.saturating_sub(ctx.files_downloaded) as usize;
        if ranked.len() > remaining {
            ctx.note(format!(
                "download budget covers {remaining} of {} pooled PDFs",
                ranked.len()
            ));
        }

        for (priority, pdf) in ranked.into_iter().take(remaining) {
            debug!(url = pdf.url.as_str(), priority, "Downloading PDF");
            if let Some(file) = self.download(ctx, &pdf.url).await {
                ctx.downloaded.push(file);
            }
        }
    }

    // --- PDF_PARSE ---

    async fn run_pdf_parse(&self, ctx: &mut DiscoveryContext, guard: &DomainGuard) {
        let files = ctx.downloaded.clone();
        for file in &files {
            let started = Instant::now();
            match self.fetchers.parse_pdf(&file.path).await {
                Ok(pdf) => {
                    ctx.log.record_since(
                        Step::ParsePdf,
                        file.url.as_str(),
                        format!("{} pages, {} chars", pdf.num_pages, pdf.text.len()),
                        started,
                    );
                    self.score_pdf(ctx, guard, file, &pdf);
                }
                Err(e) => {
                    warn!(url = file.url.as_str(), error = %e, "PDF parse failed");
                    ctx.log.record_since(Step::ParsePdf, file.url.as_str(), format!("error: {e}"), started);
                    ctx.note(format!("could not parse {}: {e}", file.url));
                }
            }
        }
    }

    /// Score a parsed PDF for every field its text mentions. PDFs of
    /// another edition of the fair score nothing, and a field's exclusion
    /// words in the URL or title rule the PDF out for that field.
    fn score_pdf(
        &self,
        ctx: &mut DiscoveryContext,
        guard: &DomainGuard,
        file: &DownloadedFile,
        pdf: &ParsedPdf,
    ) {
        let text_lower = pdf.text.to_lowercase();
        let title = pdf
            .title
            .clone()
            .or_else(|| ctx.pdf_label(&file.url).map(str::to_string));

        let edition = guard
            .wrong_edition(&file.url)
            .or_else(|| title.as_deref().and_then(|t| guard.wrong_edition(t)));
        if let Some(fragment) = edition {
            debug!(url = file.url.as_str(), fragment, "Other edition's PDF not scored");
            ctx.note(format!("ignored other edition's PDF {} ({fragment})", file.url));
            return;
        }

        let title_text = title.as_deref().unwrap_or_default();
        for field in fields_in(&text_lower) {
            if pdf_excluded(field, &file.url, title_text) {
                debug!(url = file.url.as_str(), field = %field, "PDF excluded for field");
                continue;
            }
            let candidate = score_candidate(
                field,
                Evidence { url: &file.url, title: title.as_deref(), content: Some(pdf.text.as_str()) },
                SourceKind::Pdf,
                PDF_CONTENT_BONUS,
                self.reference_year,
            );
            ctx.add_candidate(field, candidate);
        }
        if has_schedule_signal(&pdf.text) {
            self.mine_schedule(ctx, &pdf.text, &file.url);
        }
    }

    // --- SELECT ---

    fn run_select(&self, ctx: &mut DiscoveryContext, request: &DiscoveryRequest) -> DiscoveryOutput {
        let mut output = DiscoveryOutput::empty(request);
        output.official_url = ctx.official_url.clone();
        output.official_domain = ctx.official_domain.clone();
        output.documents.downloads_overview_url = ctx.downloads_overview_url.clone();

        for field in FieldName::ALL {
            let selection = select(ctx.candidates.get(field));
            if field == FieldName::Schedule && ctx.has_schedule_entries() {
                apply_schedule(ctx, &mut output, &selection);
            } else {
                apply_selection(&mut output, field, &selection);
            }

            ctx.log.record(
                Step::Select,
                field.as_str(),
                format!(
                    "{} {}",
                    output.quality.get(field).as_str(),
                    output.documents.url(field).unwrap_or("-")
                ),
                0,
            );
            *output.debug.candidates.get_mut(field) = selection.top;
        }

        output.schedule = Schedule {
            build_up: ctx.build_up.clone(),
            tear_down: ctx.tear_down.clone(),
        };
        output
    }

    // --- Collaborator calls ---

    /// Open a page, counting it against the budget. Failures land in
    /// `blocked_urls`.
    async fn open_page(&self, ctx: &mut DiscoveryContext, url: &str) -> Option<OpenedPage> {
        ctx.pages_opened += 1;
        ctx.visit(url);
        let started = Instant::now();

        match self.fetchers.open_page(url).await {
            Ok(Fetched { value: mut page, cached }) => {
                if page.final_url.is_empty() {
                    page.final_url = url.to_string();
                }
                info!(
                    url,
                    status = page.status,
                    final_url = page.final_url.as_str(),
                    links = page.links.len(),
                    cached,
                    "Page opened"
                );
                ctx.log.record_since(
                    Step::OpenPage,
                    url,
                    format!(
                        "{} {} ({} links{})",
                        page.status,
                        page.final_url,
                        page.links.len(),
                        if cached { ", cached" } else { "" }
                    ),
                    started,
                );
                if page.final_url != url {
                    ctx.visit(&page.final_url);
                }
                Some(page)
            }
            Err(e) => {
                warn!(url, error = %e, kind = e.kind(), "Page open failed");
                ctx.log.record_since(Step::OpenPage, url, format!("error: {e}"), started);
                ctx.block(url, e.status(), format!("{}: {e}", e.kind()));
                None
            }
        }
    }

    async fn download(&self, ctx: &mut DiscoveryContext, url: &str) -> Option<DownloadedFile> {
        ctx.files_downloaded += 1;
        let started = Instant::now();

        match self.fetchers.download(url).await {
            Ok(Fetched { value: file, cached }) => {
                info!(url, bytes = file.bytes, path = %file.path.display(), cached, "File downloaded");
                ctx.log.record_since(
                    Step::Download,
                    url,
                    format!(
                        "{} bytes{}",
                        file.bytes,
                        if cached { ", cached" } else { "" }
                    ),
                    started,
                );
                Some(file)
            }
            Err(e) => {
                warn!(url, error = %e, kind = e.kind(), "Download failed");
                ctx.log.record_since(Step::Download, url, format!("error: {e}"), started);
                ctx.block(url, e.status(), format!("{}: {e}", e.kind()));
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn search_queries(request: &DiscoveryRequest) -> Vec<(String, QueryPurpose)> {
    let name = request.fair_name.trim();
    let official = match request.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(city) => format!("{name} official website {city}"),
        None => format!("{name} official website"),
    };
    vec![
        (official, QueryPurpose::Identity),
        (
            format!("{name} exhibitor manual"),
            QueryPurpose::Fields(&[FieldName::ExhibitorManual]),
        ),
        (
            format!("{name} exhibitor downloads"),
            QueryPurpose::Fields(&[FieldName::ExhibitorManual, FieldName::Rules]),
        ),
        (format!("{name} floor plan"), QueryPurpose::Fields(&[FieldName::Floorplan])),
        (
            format!("{name} build-up dismantling schedule"),
            QueryPurpose::Fields(&[FieldName::Schedule]),
        ),
        (
            format!("{name} exhibitor list"),
            QueryPurpose::Fields(&[FieldName::ExhibitorDirectory]),
        ),
    ]
}

/// A link only becomes a candidate when its URL or text names the field.
fn names_field(field: FieldName, url: &str, text: &str) -> bool {
    !matched_in_url(field, &url.to_lowercase()).is_empty()
        || contains_any(&text.to_lowercase(), field_keywords(field))
}

/// Floor plans and exhibitor directories are often HTML pages rather
/// than PDFs. Only the fair's own site is followed.
fn names_page_field(category: GuardCategory, url: &str, text: &str) -> bool {
    matches!(category, GuardCategory::SameDomain | GuardCategory::Subdomain)
        && [FieldName::Floorplan, FieldName::ExhibitorDirectory]
            .into_iter()
            .any(|field| names_field(field, url, text))
}

fn bare_host(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn is_search_engine(host: &str) -> bool {
    host.split('.').any(|label| SEARCH_ENGINES.contains(&label))
}

fn is_non_official(host: &str) -> bool {
    let host = bare_host(host);
    NON_OFFICIAL_HOSTS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}

fn apply_selection(output: &mut DiscoveryOutput, field: FieldName, selection: &Selection) {
    *output.quality.get_mut(field) = selection.quality;
    match &selection.best {
        Some(best) => {
            output.documents.set_url(field, Some(best.url.clone()));
            *output.primary_reasoning.get_mut(field) = Some(best.reason.clone());
            *output.evidence.get_mut(field) = FieldEvidence {
                title: best.title.clone(),
                snippet: best.snippet.clone(),
            };
        }
        None => {
            let reasoning = match selection.top.first() {
                Some(top) => format!("best candidate {} scored {}, below threshold", top.url, top.score),
                None => "no candidates found".to_string(),
            };
            *output.primary_reasoning.get_mut(field) = Some(reasoning);
        }
    }
}

/// Schedule with extracted entries: the page is the source of the first
/// dated entry; strong when any entry carries a date.
fn apply_schedule(ctx: &DiscoveryContext, output: &mut DiscoveryOutput, selection: &Selection) {
    let entries = || ctx.build_up.iter().chain(ctx.tear_down.iter());
    let dated = entries().find(|e| e.date.is_some());
    let Some(anchor) = dated.or_else(|| entries().next()) else {
        apply_selection(output, FieldName::Schedule, selection);
        return;
    };

    let quality = if dated.is_some() { QualityLevel::Strong } else { QualityLevel::Weak };
    let title = ctx
        .candidates
        .get(FieldName::Schedule)
        .iter()
        .find(|c| c.url == anchor.source_url)
        .and_then(|c| c.title.clone());

    output.quality.schedule = quality;
    output.documents.schedule_page_url = Some(anchor.source_url.clone());
    output.evidence.schedule = FieldEvidence {
        title,
        snippet: Some(anchor.description.clone()),
    };
    output.primary_reasoning.schedule = Some(format!(
        "{} build-up and {} tear-down entries extracted, first dated entry from {}",
        ctx.build_up.len(),
        ctx.tear_down.len(),
        anchor.source_url
    ));
}
