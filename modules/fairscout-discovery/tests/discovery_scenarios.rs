//! End-to-end discovery runs against MockFetcher.
//!
//! Each scenario wires a small fake fair website into the orchestrator and
//! checks the assembled DiscoveryOutput: identity, per-field selection,
//! schedule mining, budgets and the blocked-URL record.

use std::sync::Arc;
use std::time::Duration;

use fairscout_archive::{CacheStore, RateLimiter};
use fairscout_common::{
    Budget, DiscoveryOutput, DiscoveryRequest, FetchError, FieldName, QualityLevel,
};
use fairscout_discovery::testing::{page, search_result, MockFetcher};
use fairscout_discovery::Orchestrator;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const HOME: &str = "https://www.fruitlogistica.com/en/";
const EXHIBITORS: &str = "https://www.fruitlogistica.com/en/exhibitors/";
const EXHIBITOR_LIST: &str = "https://www.fruitlogistica.com/en/exhibitors/exhibitor-list/";
const DOWNLOADS: &str = "https://www.fruitlogistica.com/en/exhibitors/downloads/";
const MANUAL_PDF: &str = "https://www.fruitlogistica.com/media/fl/fl_dl_all/FL26_Exhibitor_Manual.pdf";
const HALL_PLAN_PDF: &str = "https://www.fruitlogistica.com/media/fl/fl_dl_all/Hall_Plan.pdf";
const GUIDELINES_PDF: &str =
    "https://www.fruitlogistica.com/media/fl/fl_dl_all/Technical_Guidelines_2026.pdf";
const FOREIGN_PDF: &str = "https://d1abc.cloudfront.net/files/LTW26_Standbuild_Guidelines.pdf";

const MANUAL_TEXT: &str = "FRUIT LOGISTICA 2026 Exhibitor Manual\n\
This exhibitor manual and the general terms apply to all exhibitors.\n\
Build-up: 2 February 2026 from 07:00\n\
Dismantling: 6 February 2026 until 22:00\n";

const GUIDELINES_TEXT: &str = "Technical Guidelines 2026\n\
All stand construction must respect the height limit of 4 m and the fire safety rules.";

const HALL_PLAN_TEXT: &str = "Hall plan FRUIT LOGISTICA 2026, Messe Berlin, halls 1 to 27";

fn fruit_logistica() -> DiscoveryRequest {
    DiscoveryRequest::builder()
        .fair_name("Fruit Logistica")
        .known_url(HOME)
        .city("Berlin")
        .country("Germany")
        .build()
}

/// Official site: home → exhibitor area → download center, three PDFs
/// and one foreign-fair PDF on a CDN.
fn fruit_logistica_site() -> MockFetcher {
    MockFetcher::new()
        .on_page(
            HOME,
            page(
                HOME,
                "FRUIT LOGISTICA 2026 | Berlin",
                "Welcome to FRUIT LOGISTICA 2026, the leading trade show for the fresh produce business.",
                &[
                    (EXHIBITORS, "For Exhibitors"),
                    (EXHIBITOR_LIST, "Exhibitor list"),
                    ("https://www.messe-berlin.de/en/", "Messe Berlin"),
                ],
            ),
        )
        .on_page(
            EXHIBITORS,
            page(
                EXHIBITORS,
                "Exhibitor Service",
                "Everything you need for your participation at FRUIT LOGISTICA.",
                &[
                    (DOWNLOADS, "Downloads"),
                    (MANUAL_PDF, "Exhibitor Manual 2026"),
                    (HALL_PLAN_PDF, "Hall plan"),
                    (FOREIGN_PDF, "Stand build guidelines"),
                ],
            ),
        )
        .on_page(
            EXHIBITOR_LIST,
            page(
                EXHIBITOR_LIST,
                "Exhibitor list",
                "Exhibitor directory of FRUIT LOGISTICA 2026: search all exhibitors. Exhibitor list by country.",
                &[],
            ),
        )
        .on_page(
            DOWNLOADS,
            page(
                DOWNLOADS,
                "Download Center",
                "All documents for exhibitors of FRUIT LOGISTICA.",
                &[
                    (GUIDELINES_PDF, "Technical Guidelines"),
                    (MANUAL_PDF, "Exhibitor Manual 2026"),
                ],
            ),
        )
        .on_pdf(MANUAL_PDF, MANUAL_TEXT)
        .on_pdf(GUIDELINES_PDF, GUIDELINES_TEXT)
        .on_pdf(HALL_PLAN_PDF, HALL_PLAN_TEXT)
}

async fn run(mock: MockFetcher, budget: Budget, request: &DiscoveryRequest) -> (DiscoveryOutput, Arc<MockFetcher>) {
    let mock = Arc::new(mock);
    let orchestrator = Orchestrator::new(
        mock.clone(),
        Arc::new(RateLimiter::unthrottled()),
        None,
        budget,
    )
    .with_reference_year(2026);
    let output = orchestrator.discover(request).await;
    (output, mock)
}

fn assert_all_missing(output: &DiscoveryOutput) {
    for field in FieldName::ALL {
        assert_eq!(*output.quality.get(field), QualityLevel::Missing, "{field} should be missing");
        assert!(output.documents.url(field).is_none(), "{field} should have no URL");
    }
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn official_site_yields_documents_and_schedule() {
    let (output, mock) = run(fruit_logistica_site(), Budget::default(), &fruit_logistica()).await;

    assert_eq!(output.official_url.as_deref(), Some(HOME));
    assert_eq!(output.official_domain.as_deref(), Some("fruitlogistica.com"));
    assert_eq!(output.city.as_deref(), Some("Berlin"));
    assert_eq!(output.country.as_deref(), Some("Germany"));
    assert!(mock.search_queries().is_empty(), "known URL verified, no search needed");

    assert_eq!(output.documents.exhibitor_manual_url.as_deref(), Some(MANUAL_PDF));
    assert_eq!(output.quality.exhibitor_manual, QualityLevel::Strong);
    assert_eq!(output.documents.rules_url.as_deref(), Some(GUIDELINES_PDF));
    assert_eq!(output.quality.rules, QualityLevel::Strong);
    assert_eq!(output.documents.floorplan_url.as_deref(), Some(HALL_PLAN_PDF));
    assert_ne!(output.quality.floorplan, QualityLevel::Missing);
    assert_eq!(output.documents.exhibitor_directory_url.as_deref(), Some(EXHIBITOR_LIST));
    assert_ne!(output.quality.exhibitor_directory, QualityLevel::Missing);
    assert_eq!(output.documents.downloads_overview_url.as_deref(), Some(DOWNLOADS));

    assert!(output.quality_violations().is_empty());
    assert!(output.evidence.exhibitor_manual.snippet.is_some());
}

#[tokio::test]
async fn schedule_comes_from_the_manual() {
    let (output, _) = run(fruit_logistica_site(), Budget::default(), &fruit_logistica()).await;

    let build_up = &output.schedule.build_up;
    assert_eq!(build_up.len(), 1);
    assert_eq!(build_up[0].date.as_deref(), Some("2026-02-02"));
    assert_eq!(build_up[0].time.as_deref(), Some("07:00"));
    assert_eq!(build_up[0].source_url, MANUAL_PDF);

    let tear_down = &output.schedule.tear_down;
    assert_eq!(tear_down.len(), 1);
    assert_eq!(tear_down[0].date.as_deref(), Some("2026-02-06"));
    assert_eq!(tear_down[0].time.as_deref(), Some("22:00"));

    assert_eq!(output.quality.schedule, QualityLevel::Strong);
    assert_eq!(output.documents.schedule_page_url.as_deref(), Some(MANUAL_PDF));
    assert!(output
        .evidence
        .schedule
        .snippet
        .as_deref()
        .is_some_and(|s| s.contains("Build-up")));
}

#[tokio::test]
async fn debug_bundle_records_the_run() {
    let (output, mock) = run(fruit_logistica_site(), Budget::default(), &fruit_logistica()).await;
    let debug = &output.debug;

    assert_eq!(debug.final_state, "DONE");
    assert_eq!(debug.pages_opened, 4);
    assert_eq!(debug.files_downloaded, 3);
    assert_eq!(debug.downloaded_files.len(), 3);
    assert!(uuid::Uuid::parse_str(&debug.run_id).is_ok());

    // Highest priority first: guidelines (technical + guide), manual, hall plan.
    assert_eq!(
        mock.downloaded_urls(),
        vec![GUIDELINES_PDF.to_string(), MANUAL_PDF.to_string(), HALL_PLAN_PDF.to_string()]
    );
    assert_eq!(mock.parsed_paths().len(), 3);

    assert!(debug.visited_urls.contains(&HOME.to_string()));
    assert!(debug.visited_urls.contains(&DOWNLOADS.to_string()));
    assert!(!debug.visited_urls.iter().any(|u| u.contains("messe-berlin")));

    let steps: Vec<&str> = debug.action_log.iter().map(|e| e.step.as_str()).collect();
    assert_eq!(steps.first(), Some(&"open_page"));
    assert!(steps.contains(&"download"));
    assert!(steps.contains(&"parse_pdf"));
    assert_eq!(steps.iter().filter(|s| **s == "select").count(), 5);

    for field in FieldName::ALL {
        assert!(debug.candidates.get(field).len() <= 3);
    }
}

#[tokio::test]
async fn floorplan_page_is_followed_and_scored_on_its_content() {
    let hall_plan = "https://www.fruitlogistica.com/en/hall-plan/";
    let mock = MockFetcher::new()
        .on_page(
            HOME,
            page(
                HOME,
                "FRUIT LOGISTICA 2026 | Berlin",
                "Welcome to FRUIT LOGISTICA 2026.",
                &[(hall_plan, "Hall plan"), ("https://www.messe-berlin.de/en/hall-plan/", "Hall plan")],
            ),
        )
        .on_page(
            hall_plan,
            page(
                hall_plan,
                "Hall plan | FRUIT LOGISTICA 2026",
                "Hall plan FRUIT LOGISTICA 2026. Use the interactive floor plan to find every stand. \
                 The hall plan shows halls 1 to 27; the Hallenplan is also available in German.",
                &[],
            ),
        );

    let (output, mock) = run(mock, Budget::default(), &fruit_logistica()).await;

    assert_eq!(mock.opened_urls(), vec![HOME.to_string(), hall_plan.to_string()]);
    assert_eq!(output.documents.floorplan_url.as_deref(), Some(hall_plan));
    assert_eq!(output.quality.floorplan, QualityLevel::Weak);
    let best = &output.debug.candidates.floorplan[0];
    assert!(best.reason.starts_with("page:"), "reason: {}", best.reason);
    assert!(output
        .evidence
        .floorplan
        .snippet
        .as_deref()
        .is_some_and(|s| s.contains("Hall plan")));
}

#[tokio::test]
async fn other_edition_pdfs_are_never_downloaded() {
    let home = "https://www.greentech.nl/amsterdam/";
    let ours = "https://www.greentech.nl/amsterdam/exhibitor-manual-2026.pdf";
    let theirs = "https://www.greentech.nl/americas/exhibitor-manual-2026.pdf";
    let request = DiscoveryRequest::builder()
        .fair_name("GreenTech")
        .known_url(home)
        .city("Amsterdam")
        .build();
    let mock = MockFetcher::new()
        .on_page(
            home,
            page(
                home,
                "GreenTech Amsterdam 2026",
                "Welcome to GreenTech Amsterdam.",
                &[(theirs, "Exhibitor manual Americas"), (ours, "Exhibitor manual")],
            ),
        )
        .on_pdf(ours, MANUAL_TEXT)
        .on_pdf(theirs, MANUAL_TEXT);

    let (output, mock) = run(mock, Budget::default(), &request).await;

    assert_eq!(mock.downloaded_urls(), vec![ours.to_string()]);
    assert_eq!(output.documents.exhibitor_manual_url.as_deref(), Some(ours));
    assert!(output
        .debug
        .notes
        .iter()
        .any(|n| n.contains(theirs) && n.contains("/americas")));
    for field in FieldName::ALL {
        assert!(output.debug.candidates.get(field).iter().all(|c| c.url != theirs));
    }
}

#[tokio::test]
async fn evacuation_plan_is_not_a_floorplan() {
    let evacuation = "https://www.fruitlogistica.com/media/Evacuation_Plan_Hall_3.pdf";
    let mock = MockFetcher::new()
        .on_page(
            HOME,
            page(
                HOME,
                "FRUIT LOGISTICA 2026",
                "Welcome.",
                &[(evacuation, "Evacuation plan hall 3"), (HALL_PLAN_PDF, "Hall plan")],
            ),
        )
        .on_pdf(
            evacuation,
            "Evacuation floor plan hall 3, FRUIT LOGISTICA 2026. Hall plan with emergency exits. \
             Follow the floor plan to the assembly point.",
        )
        .on_pdf(HALL_PLAN_PDF, HALL_PLAN_TEXT);

    let (output, _) = run(mock, Budget::default(), &fruit_logistica()).await;

    assert_eq!(output.documents.floorplan_url.as_deref(), Some(HALL_PLAN_PDF));
    assert!(output
        .debug
        .candidates
        .floorplan
        .iter()
        .all(|c| c.url != evacuation));
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_run_is_served_from_the_cache() {
    let cache_dir = tempfile::tempdir().unwrap();
    let download_dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(fruit_logistica_site().with_download_dir(download_dir.path()));
    let orchestrator = Orchestrator::new(
        mock.clone(),
        Arc::new(RateLimiter::unthrottled()),
        Some(Arc::new(CacheStore::new(cache_dir.path()))),
        Budget::default(),
    )
    .with_reference_year(2026);

    let first = orchestrator.discover(&fruit_logistica()).await;
    let opened = mock.opened_urls();
    let downloaded = mock.downloaded_urls();
    assert_eq!(opened.len(), 4);
    assert_eq!(downloaded.len(), 3);
    // Downloads moved into the cache; nothing left behind.
    assert_eq!(std::fs::read_dir(download_dir.path()).unwrap().count(), 0);
    assert!(first
        .debug
        .downloaded_files
        .iter()
        .all(|f| f.path.starts_with(cache_dir.path())));

    let second = orchestrator.discover(&fruit_logistica()).await;
    assert_eq!(mock.opened_urls(), opened, "no page reopened");
    assert_eq!(mock.downloaded_urls(), downloaded, "no file downloaded again");
    // Cache hits still count against the budgets.
    assert_eq!(second.debug.pages_opened, first.debug.pages_opened);
    assert_eq!(second.debug.files_downloaded, first.debug.files_downloaded);
    assert!(second.debug.action_log.iter().any(|e| e.output.contains("cached")));

    assert_eq!(second.documents, first.documents);
    assert_eq!(second.quality, first.quality);
    assert_eq!(second.schedule.build_up, first.schedule.build_up);
}

// ---------------------------------------------------------------------------
// Contamination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn foreign_fair_pdf_is_blocked_and_never_downloaded() {
    let (output, mock) = run(fruit_logistica_site(), Budget::default(), &fruit_logistica()).await;

    let blocked = output
        .debug
        .blocked_urls
        .iter()
        .find(|b| b.url == FOREIGN_PDF)
        .expect("foreign PDF recorded");
    assert!(blocked.reason.contains("ltw26"), "reason: {}", blocked.reason);
    assert_eq!(blocked.status, None);

    assert!(!mock.downloaded_urls().contains(&FOREIGN_PDF.to_string()));
    for field in FieldName::ALL {
        assert!(output
            .debug
            .candidates
            .get(field)
            .iter()
            .all(|c| c.url != FOREIGN_PDF));
    }
}

#[tokio::test]
async fn identity_from_search_skips_aggregators_and_foreign_results() {
    let request = DiscoveryRequest::builder()
        .fair_name("Fruit Logistica")
        .city("Berlin")
        .build();
    let foreign_manual = "https://www.ltw-expo.com/media/LTW26_Exhibitor_Manual.pdf";

    let mock = MockFetcher::new()
        .on_search(
            "Fruit Logistica official website Berlin",
            vec![
                search_result("https://www.google.com/search?q=fruit+logistica", "Fruit Logistica - Google"),
                search_result("https://en.wikipedia.org/wiki/Fruit_Logistica", "Fruit Logistica - Wikipedia"),
                search_result(HOME, "FRUIT LOGISTICA | Berlin"),
            ],
        )
        .on_search(
            "Fruit Logistica exhibitor manual",
            vec![
                search_result(MANUAL_PDF, "Exhibitor Manual 2026"),
                search_result(foreign_manual, "Exhibitor Manual"),
            ],
        )
        .on_page(HOME, page(HOME, "FRUIT LOGISTICA 2026", "Welcome.", &[]))
        .on_pdf(MANUAL_PDF, MANUAL_TEXT);

    let (output, mock) = run(mock, Budget::default(), &request).await;

    assert_eq!(output.official_url.as_deref(), Some(HOME));
    assert_eq!(mock.opened_urls(), vec![HOME.to_string()]);
    assert_eq!(mock.search_queries().len(), 6);

    assert_eq!(output.documents.exhibitor_manual_url.as_deref(), Some(MANUAL_PDF));
    assert_eq!(output.quality.exhibitor_manual, QualityLevel::Strong);
    assert!(output.debug.blocked_urls.iter().any(|b| b.url == foreign_manual));
    assert!(!mock.downloaded_urls().contains(&foreign_manual.to_string()));
}

// ---------------------------------------------------------------------------
// Degraded runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unavailable_browser_degrades_to_all_missing() {
    let request = DiscoveryRequest::builder()
        .fair_name("Fruit Logistica")
        .known_url("https://www.fruitlogistica.com")
        .build();

    let (output, _) = run(MockFetcher::new().browser_unavailable(), Budget::default(), &request).await;

    assert!(output.official_url.is_none());
    assert_all_missing(&output);
    assert!(output.schedule.build_up.is_empty());
    assert!(!output.debug.blocked_urls.is_empty());
    assert_eq!(output.debug.blocked_urls[0].url, "https://www.fruitlogistica.com");
    assert!(output.debug.blocked_urls[0].reason.starts_with("network:"));
    assert_eq!(output.debug.final_state, "DONE");
    assert!(output.quality_violations().is_empty());
}

#[tokio::test]
async fn zero_page_budget_ends_in_done_without_fetching() {
    let budget = Budget { max_page_opens: 0, ..Budget::default() };
    let (output, mock) = run(fruit_logistica_site(), budget, &fruit_logistica()).await;

    assert_eq!(output.debug.final_state, "DONE");
    assert_eq!(output.debug.pages_opened, 0);
    assert!(mock.opened_urls().is_empty());
    assert!(mock.search_queries().is_empty());
    assert_all_missing(&output);
    assert!(output
        .debug
        .notes
        .iter()
        .any(|n| n.starts_with("budget exhausted before SEARCH")));
    assert_eq!(output.debug.action_log[0].step, "budget");
}

#[tokio::test]
async fn download_budget_keeps_highest_priority_pdf() {
    let budget = Budget { max_downloads: 1, ..Budget::default() };
    let (output, mock) = run(fruit_logistica_site(), budget, &fruit_logistica()).await;

    assert_eq!(mock.downloaded_urls(), vec![GUIDELINES_PDF.to_string()]);
    assert_eq!(output.debug.files_downloaded, 1);
    // PDF parsing still runs on what was downloaded.
    assert_eq!(output.quality.rules, QualityLevel::Strong);
    // The manual was never fetched: only its link is known.
    assert_ne!(output.quality.exhibitor_manual, QualityLevel::Strong);
    assert!(output.schedule.build_up.is_empty());
    assert!(output
        .debug
        .notes
        .iter()
        .any(|n| n == "download budget covers 1 of 3 pooled PDFs"));
}

#[tokio::test]
async fn zero_download_budget_still_opens_pages() {
    let budget = Budget { max_downloads: 0, ..Budget::default() };
    let (output, mock) = run(fruit_logistica_site(), budget, &fruit_logistica()).await;

    // The download center sits under the exhibitor area, so ENTRY opens it.
    assert_eq!(
        mock.opened_urls(),
        vec![
            HOME.to_string(),
            EXHIBITORS.to_string(),
            EXHIBITOR_LIST.to_string(),
            DOWNLOADS.to_string()
        ]
    );
    assert_eq!(output.debug.pages_opened, 4);
    assert!(mock.downloaded_urls().is_empty());
    assert_eq!(output.debug.files_downloaded, 0);
    assert!(output
        .debug
        .notes
        .iter()
        .any(|n| n == "budget exhausted before DOWNLOADS: downloads 0/0"));

    // Pages alone still identify the fair and its exhibitor directory.
    assert_eq!(output.official_url.as_deref(), Some(HOME));
    assert_eq!(output.documents.exhibitor_directory_url.as_deref(), Some(EXHIBITOR_LIST));
    assert_ne!(output.quality.exhibitor_directory, QualityLevel::Missing);
    assert_eq!(output.debug.final_state, "DONE");
}

#[tokio::test]
async fn page_budget_does_not_stop_downloads() {
    // SEARCH and ENTRY use up both page opens; the PDFs linked from the
    // exhibitor area are still downloaded.
    let budget = Budget { max_page_opens: 2, ..Budget::default() };
    let (output, mock) = run(fruit_logistica_site(), budget, &fruit_logistica()).await;

    assert_eq!(output.debug.pages_opened, 2);
    assert_eq!(mock.opened_urls(), vec![HOME.to_string(), EXHIBITORS.to_string()]);
    assert!(!mock.downloaded_urls().is_empty());
    assert!(!mock.opened_urls().contains(&DOWNLOADS.to_string()));
    assert_eq!(output.documents.exhibitor_manual_url.as_deref(), Some(MANUAL_PDF));
}

#[tokio::test]
async fn exhausted_runtime_skips_to_select() {
    let budget = Budget { max_runtime: Duration::ZERO, ..Budget::default() };
    let (output, mock) = run(fruit_logistica_site(), budget, &fruit_logistica()).await;

    assert!(mock.opened_urls().is_empty());
    assert_all_missing(&output);
    assert!(output.debug.notes[0].contains("runtime"));
}

#[tokio::test]
async fn blocked_download_keeps_status_and_run_continues() {
    let pdf = "https://www.fruitlogistica.com/media/Exhibitor_Manual.pdf";
    let mock = MockFetcher::new()
        .on_page(
            HOME,
            page(HOME, "FRUIT LOGISTICA", "Welcome.", &[(pdf, "Exhibitor Manual")]),
        )
        .on_download_error(
            pdf,
            FetchError::HttpBlocked { status: 403, reason: "Forbidden".into() },
        );

    let (output, _) = run(mock, Budget::default(), &fruit_logistica()).await;

    let blocked = output
        .debug
        .blocked_urls
        .iter()
        .find(|b| b.url == pdf)
        .expect("download failure recorded");
    assert_eq!(blocked.status, Some(403));
    assert!(blocked.reason.starts_with("http_blocked:"));
    assert_eq!(output.debug.files_downloaded, 1);
    assert!(output.debug.downloaded_files.is_empty());

    // Only the link is known: 35 points, below the weak threshold.
    assert_eq!(output.quality.exhibitor_manual, QualityLevel::Missing);
    assert!(output.documents.exhibitor_manual_url.is_none());
    assert_eq!(output.debug.candidates.exhibitor_manual[0].score, 35);
    assert!(output
        .primary_reasoning
        .exhibitor_manual
        .as_deref()
        .is_some_and(|r| r.contains("below threshold")));
}

#[tokio::test]
async fn unparseable_pdf_is_skipped() {
    let mock = MockFetcher::new()
        .on_page(
            HOME,
            page(HOME, "FRUIT LOGISTICA", "Welcome.", &[(MANUAL_PDF, "Exhibitor Manual 2026")]),
        )
        .on_broken_pdf(MANUAL_PDF);

    let (output, _) = run(mock, Budget::default(), &fruit_logistica()).await;

    assert_eq!(output.debug.downloaded_files.len(), 1);
    assert!(output.debug.notes.iter().any(|n| n.starts_with("could not parse")));
    assert!(output.debug.blocked_urls.is_empty());
    assert!(output.schedule.build_up.is_empty());
    assert_eq!(output.debug.final_state, "DONE");
}

#[tokio::test]
async fn known_url_with_unrelated_title_is_accepted_with_note() {
    let url = "https://www.fruitlogistica.com/";
    let request = DiscoveryRequest::builder()
        .fair_name("Fruit Logistica")
        .known_url(url)
        .build();
    let mock = MockFetcher::new().on_page(url, page(url, "Messe Berlin GmbH", "Welcome.", &[]));

    let (output, mock) = run(mock, Budget::default(), &request).await;

    assert_eq!(output.official_url.as_deref(), Some(url));
    assert!(mock.search_queries().is_empty());
    assert!(output
        .debug
        .notes
        .iter()
        .any(|n| n.contains("accepted without a title match")));
}
