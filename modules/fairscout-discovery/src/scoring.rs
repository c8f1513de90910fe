//! Candidate scoring and per-field selection.
//!
//! A score is the sum of four capped terms:
//!
//! | term | cap | signal |
//! |---|---|---|
//! | url | 20 | field keywords in the URL, PDF bonus for manual/rules |
//! | title | 30 | keyword occurrences in the title |
//! | content | 40 | keyword occurrences in the text; date/time/direction signals for schedules |
//! | freshness | 10 | current or next year in URL and content |

use std::collections::HashMap;

use fairscout_common::{is_pdf_url, Candidate, FieldName, QualityLevel, SourceKind};

use crate::keywords::{count_occurrences, field_keywords, matched_in_url};
use crate::schedule::{has_build_up_keyword, has_date, has_tear_down_keyword, has_time};

const URL_CAP: u8 = 20;
const TITLE_CAP: u8 = 30;
const CONTENT_CAP: u8 = 40;

pub const STRONG_THRESHOLD: u8 = 70;
pub const WEAK_THRESHOLD: u8 = 40;
/// Bonus for candidates backed by parsed PDF content.
pub const PDF_CONTENT_BONUS: u8 = 20;
/// Candidates kept per field for the debug bundle.
pub const TOP_N: usize = 3;

const SNIPPET_BEFORE: usize = 100;
const SNIPPET_AFTER: usize = 200;
const SNIPPET_MAX: usize = 300;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub url: u8,
    pub title: u8,
    pub content: u8,
    pub freshness: u8,
    pub matched: Vec<&'static str>,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u8 {
        (self.url + self.title + self.content + self.freshness).min(100)
    }

    pub fn reason(&self) -> String {
        let mut reason = format!(
            "url {} + title {} + content {} + fresh {}",
            self.url, self.title, self.content, self.freshness
        );
        if !self.matched.is_empty() {
            reason.push_str("; matched: ");
            reason.push_str(&self.matched.join(", "));
        }
        reason
    }
}

/// What is known about a URL when it gets scored.
#[derive(Debug, Clone, Copy)]
pub struct Evidence<'a> {
    pub url: &'a str,
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
}

// --- Terms ---

pub fn url_match(field: FieldName, url: &str) -> (u8, Vec<&'static str>) {
    let matched = matched_in_url(field, &url_path_and_query(url));
    let mut score = 10 * matched.len().min(2) as u8;
    if is_pdf_url(url) && matches!(field, FieldName::ExhibitorManual | FieldName::Rules) {
        score += 10;
    }
    (score.min(URL_CAP), matched)
}

pub fn title_match(field: FieldName, title: &str) -> u8 {
    let hits = count_occurrences(&title.to_lowercase(), field_keywords(field));
    (15 * hits.min(2) as u8).min(TITLE_CAP)
}

pub fn content_match(field: FieldName, content: &str) -> u8 {
    let lower = content.to_lowercase();
    let hits = count_occurrences(&lower, field_keywords(field));
    let mut score: u8 = match hits {
        0 => 0,
        1..=2 => 10,
        _ => 20,
    };
    if field == FieldName::Schedule {
        for signal in [
            has_date(content),
            has_time(content),
            has_build_up_keyword(content),
            has_tear_down_keyword(content),
        ] {
            if signal {
                score += 10;
            }
        }
    }
    score.min(CONTENT_CAP)
}

pub fn freshness(url: &str, content: Option<&str>, reference_year: i32) -> u8 {
    let years = [reference_year.to_string(), (reference_year + 1).to_string()];
    let in_url = years.iter().any(|y| url.contains(y.as_str()));
    let in_content = content.is_some_and(|c| years.iter().any(|y| c.contains(y.as_str())));
    5 * in_url as u8 + 5 * in_content as u8
}

pub fn score(field: FieldName, evidence: Evidence<'_>, reference_year: i32) -> ScoreBreakdown {
    let (url, matched) = url_match(field, evidence.url);
    ScoreBreakdown {
        url,
        title: evidence.title.map(|t| title_match(field, t)).unwrap_or(0),
        content: evidence.content.map(|c| content_match(field, c)).unwrap_or(0),
        freshness: freshness(evidence.url, evidence.content, reference_year),
        matched,
    }
}

/// Score `evidence` for `field` and wrap it as a candidate. Content-backed
/// sources get an evidence snippet; `bonus` is added after the term caps and
/// the total clamped to 100.
pub fn score_candidate(
    field: FieldName,
    evidence: Evidence<'_>,
    source: SourceKind,
    bonus: u8,
    reference_year: i32,
) -> Candidate {
    let breakdown = score(field, evidence, reference_year);
    let total = breakdown.total().saturating_add(bonus).min(100);
    let mut reason = format!("{}: {}", source_label(source), breakdown.reason());
    if bonus > 0 {
        reason.push_str(&format!(" (+{bonus} content bonus)"));
    }

    let snippet = match source {
        SourceKind::Link => None,
        SourceKind::Page | SourceKind::Pdf => evidence
            .content
            .and_then(|c| extract_snippet(c, field_keywords(field))),
    };

    Candidate {
        url: evidence.url.to_string(),
        score: total,
        reason,
        title: evidence.title.filter(|t| !t.trim().is_empty()).map(|t| t.trim().to_string()),
        snippet,
        source,
    }
}

fn source_label(source: SourceKind) -> &'static str {
    match source {
        SourceKind::Link => "link",
        SourceKind::Page => "page",
        SourceKind::Pdf => "pdf",
    }
}

/// Lowercased path and query of `url`; scheme, host and fragment dropped.
fn url_path_and_query(url: &str) -> String {
    let lower = url.to_lowercase();
    let after_scheme = lower.split_once("://").map_or(lower.as_str(), |(_, rest)| rest);
    let path = after_scheme.find('/').map_or("", |i| &after_scheme[i..]);
    path.split('#').next().unwrap_or_default().to_string()
}

// --- Snippets ---

/// Window around the first keyword hit in `content`: 100 chars before,
/// 200 after, ellipsis-padded where cut, at most 300 chars.
pub fn extract_snippet(content: &str, keywords: &[&str]) -> Option<String> {
    let chars: Vec<char> = content.chars().collect();
    let lower: Vec<char> = chars.iter().map(|c| c.to_lowercase().next().unwrap_or(*c)).collect();

    let (hit, kw_len) = keywords
        .iter()
        .filter_map(|kw| {
            let kw: Vec<char> = kw.chars().collect();
            find_chars(&lower, &kw).map(|pos| (pos, kw.len()))
        })
        .min_by_key(|(pos, _)| *pos)?;

    let start = hit.saturating_sub(SNIPPET_BEFORE);
    let end = (hit + kw_len + SNIPPET_AFTER).min(chars.len());
    let body: String = chars[start..end].iter().collect();
    let body = body.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut snippet = String::new();
    if start > 0 {
        snippet.push_str("...");
    }
    snippet.push_str(&body);
    if end < chars.len() {
        snippet.push_str("...");
    }
    if snippet.chars().count() > SNIPPET_MAX {
        snippet = snippet.chars().take(SNIPPET_MAX - 3).collect::<String>() + "...";
    }
    Some(snippet)
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

// --- Selection ---

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Chosen candidate; `None` when quality is missing.
    pub best: Option<Candidate>,
    pub quality: QualityLevel,
    /// Top candidates after collapsing duplicate URLs, best first.
    pub top: Vec<Candidate>,
}

pub fn quality_for(candidate: &Candidate) -> QualityLevel {
    if candidate.score >= STRONG_THRESHOLD {
        if candidate.snippet.is_some() {
            QualityLevel::Strong
        } else {
            QualityLevel::Weak
        }
    } else if candidate.score >= WEAK_THRESHOLD {
        QualityLevel::Weak
    } else {
        QualityLevel::Missing
    }
}

/// Collapse same-URL candidates to their best score, rank by score
/// (ties keep discovery order), keep the top three, grade the best.
pub fn select(candidates: &[Candidate]) -> Selection {
    let mut best_by_url: HashMap<&str, usize> = HashMap::new();
    let mut collapsed: Vec<Candidate> = Vec::new();
    for c in candidates {
        match best_by_url.get(c.url.as_str()) {
            Some(&i) => {
                if c.score > collapsed[i].score {
                    collapsed[i] = c.clone();
                }
            }
            None => {
                best_by_url.insert(c.url.as_str(), collapsed.len());
                collapsed.push(c.clone());
            }
        }
    }

    collapsed.sort_by(|a, b| b.score.cmp(&a.score));
    collapsed.truncate(TOP_N);

    let quality = collapsed.first().map(quality_for).unwrap_or_default();
    let best = match quality {
        QualityLevel::Missing => None,
        _ => collapsed.first().cloned(),
    };

    Selection { best, quality, top: collapsed }
}
