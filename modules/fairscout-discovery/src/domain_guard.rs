//! Decides whether a URL belongs to the fair being researched.
//!
//! Fair-name matching is asymmetric on purpose: names shorter than five
//! characters ("IRE", "CES") only match as a whole URL segment, longer names
//! match as plain substrings.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Names shorter than this use segment-boundary matching.
const MIN_SUBSTRING_LEN: usize = 5;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*20\d{2}\s*").expect("valid regex"));

/// `<code><2x>` in a file name, e.g. `ltw26_` or `-ise25.`.
static FAIR_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^a-z])([a-z]{2,6})(2[0-9])(?:[^0-9]|$)").expect("valid regex")
});

const STOP_WORDS: &[&str] = &[
    "the", "of", "and", "for", "in", "at", "de", "der", "die", "das", "van", "het", "een", "fair",
    "trade", "show", "exhibition", "expo", "messe", "fiera", "salon", "salone",
];

/// Letter codes followed by a year-like number that are not fair codes.
const COMMON_ABBREVIATIONS: &[&str] = &[
    "rev", "ver", "vol", "doc", "pdf", "img", "src", "tmp", "eng", "deu", "en", "de", "fr", "nl",
    "it", "es", "hall", "halle", "plan", "map", "page", "stand", "booth", "v", "no", "nr",
];

/// Fairs that run several geographic editions under one domain: for each
/// edition city, the path slugs of the other editions.
const EDITIONS: &[(&str, &[(&str, &[&str])])] = &[
    (
        "greentech",
        &[
            ("amsterdam", &["americas", "asia"]),
            ("americas", &["amsterdam", "asia"]),
            ("asia", &["amsterdam", "americas"]),
        ],
    ),
    (
        "seafood",
        &[
            ("barcelona", &["asia", "north-america", "northamerica"]),
            ("boston", &["asia", "global"]),
            ("asia", &["global", "north-america", "northamerica"]),
        ],
    ),
    (
        "ism",
        &[
            ("cologne", &["japan", "india"]),
            ("köln", &["japan", "india"]),
            ("keulen", &["japan", "india"]),
        ],
    ),
];

const CDN_SUFFIXES: &[&str] = &[
    "cloudfront.net",
    "s3.amazonaws.com",
    "blob.core.windows.net",
    "azureedge.net",
    "akamaized.net",
    "googleapis.com",
    "asp.events",
];

const PLATFORM_MARKERS: &[&str] = &[
    "my.site.com",
    "force.com",
    "cvent.com",
    "a2zinc.net",
    "expocad.com",
    "expofp.com",
    "smallworldlabs.com",
    "map-dynamics.",
    "n200.com",
    "mapyourshow.com",
    "swapcard.com",
    "grip.events",
    "ungerboeck",
    "dashboards.events",
    "onlineexhibitormanual.com",
    "gevme.com",
];

/// Second-level labels that sit under a country TLD (`co.uk`, `com.au`).
const GENERIC_SLDS: &[&str] = &["co", "com", "org", "net", "ac", "gov"];

// --- Fair name matching ---

/// Lowercase keywords identifying a fair: the cleaned full name, its
/// concatenated form, and every significant word.
pub fn fair_keywords(fair_name: &str) -> Vec<String> {
    let cleaned = YEAR_RE.replace_all(fair_name, " ").trim().to_lowercase();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut keywords = BTreeSet::new();

    if cleaned.chars().count() >= 3 {
        keywords.insert(cleaned.clone());
    }
    let concat: String = cleaned.chars().filter(|c| *c != ' ' && *c != '-').collect();
    if concat.chars().count() >= 3 {
        keywords.insert(concat);
    }
    for word in cleaned.split_whitespace() {
        let is_numeric = word.chars().all(|c| c.is_ascii_digit());
        if word.chars().count() >= 3 && !is_numeric && !STOP_WORDS.contains(&word) {
            keywords.insert(word.to_string());
        }
    }

    keywords.into_iter().collect()
}

/// Whether a fair-name word appears meaningfully in a URL.
///
/// Short words must start at the beginning of the URL or after `.`, `-`,
/// `_`, `/`, and end at the end of the URL, one of those separators, or a
/// digit. `ire` matches `ire2026.mapyourshow.com` but not `ge26ire`, `tire`
/// or `require`.
pub fn fair_name_in_url(word: &str, url: &str) -> bool {
    if word.is_empty() || url.is_empty() {
        return false;
    }
    let word = word.to_lowercase();
    let url = url.to_lowercase();
    if word.chars().count() >= MIN_SUBSTRING_LEN {
        return url.contains(&word);
    }

    let is_sep = |c: char| matches!(c, '.' | '-' | '_' | '/');
    url.match_indices(&word).any(|(start, m)| {
        let before_ok = url[..start].chars().next_back().is_none_or(is_sep);
        let after_ok = url[start + m.len()..]
            .chars()
            .next()
            .is_none_or(|c| is_sep(c) || c.is_ascii_digit());
        before_ok && after_ok
    })
}

/// Whether a fair-name word appears in free text. Short words need word
/// boundaries on both sides.
pub fn fair_name_in_text(word: &str, text: &str) -> bool {
    if word.is_empty() || text.is_empty() {
        return false;
    }
    let word = word.to_lowercase();
    let text = text.to_lowercase();
    if word.chars().count() >= MIN_SUBSTRING_LEN {
        return text.contains(&word);
    }
    let pattern = format!(r"\b{}\b", regex::escape(&word));
    Regex::new(&pattern).is_ok_and(|re| re.is_match(&text))
}

/// First significant token of a fair name, for title verification.
pub fn first_token(fair_name: &str) -> Option<String> {
    let cleaned = YEAR_RE.replace_all(fair_name, " ").to_lowercase();
    cleaned
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty() && !w.chars().all(|c| c.is_ascii_digit()))
        .map(|w| w.to_string())
}

/// True when the page title plausibly names the fair.
pub fn title_matches_fair(title: &str, fair_name: &str) -> bool {
    first_token(fair_name).is_some_and(|token| fair_name_in_text(&token, title))
}

/// Registrable part of a host: `www.fair.co.uk` → `fair.co.uk`,
/// `exhibitors.fair.com` → `fair.com`.
pub fn base_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host.to_string();
    }
    let tld = labels[labels.len() - 1];
    let sld = labels[labels.len() - 2];
    let keep = if tld.len() == 2 && GENERIC_SLDS.contains(&sld) { 3 } else { 2 };
    labels[labels.len().saturating_sub(keep)..].join(".")
}

/// `/slug` and `-slug` fragments of the editions other than the one in
/// `city`. Empty for single-edition fairs or an unknown city.
fn edition_exclusions(fair_name: &str, city: &str) -> Vec<String> {
    let fair = fair_name.to_lowercase();
    let city = city.trim().to_lowercase();
    if city.is_empty() {
        return Vec::new();
    }
    EDITIONS
        .iter()
        .find(|(key, _)| fair.contains(key))
        .and_then(|(_, editions)| editions.iter().find(|(c, _)| *c == city))
        .map(|(_, others)| {
            let slashed = others.iter().map(|e| format!("/{e}"));
            let hyphened = others.iter().map(|e| format!("-{e}"));
            slashed.chain(hyphened).collect()
        })
        .unwrap_or_default()
}

// --- Classification ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardCategory {
    SameDomain,
    Subdomain,
    Cdn,
    Platform,
    ForeignFair,
    External,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardVerdict {
    pub allowed: bool,
    pub reason: String,
    pub category: GuardCategory,
}

impl GuardVerdict {
    fn allow(category: GuardCategory, reason: impl Into<String>) -> Self {
        Self { allowed: true, reason: reason.into(), category }
    }

    fn deny(category: GuardCategory, reason: impl Into<String>) -> Self {
        Self { allowed: false, reason: reason.into(), category }
    }

    /// Denials worth recording: they point at another fair's material.
    pub fn is_contamination(&self) -> bool {
        !self.allowed && self.category == GuardCategory::ForeignFair
    }
}

/// Classifies URLs for one fair. Built once per run.
pub struct DomainGuard {
    fair_name: String,
    keywords: Vec<String>,
    concat: String,
    wrong_editions: Vec<String>,
}

impl DomainGuard {
    pub fn new(fair_name: &str) -> Self {
        let concat = YEAR_RE
            .replace_all(fair_name, "")
            .trim()
            .to_lowercase()
            .replace(' ', "");
        Self {
            fair_name: fair_name.to_string(),
            keywords: fair_keywords(fair_name),
            concat,
            wrong_editions: Vec::new(),
        }
    }

    /// Target the edition held in `city`. Paths of the fair's other
    /// editions then count as wrong-edition documents.
    pub fn with_city(mut self, city: Option<&str>) -> Self {
        self.wrong_editions = edition_exclusions(&self.fair_name, city.unwrap_or_default());
        self
    }

    /// The other-edition fragment `url` contains, if any.
    pub fn wrong_edition(&self, url: &str) -> Option<&str> {
        let lower = url.to_lowercase();
        self.wrong_editions
            .iter()
            .find(|fragment| lower.contains(fragment.as_str()))
            .map(String::as_str)
    }

    pub fn fair_name(&self) -> &str {
        &self.fair_name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Any fair keyword in the URL.
    pub fn fair_in_url(&self, url: &str) -> bool {
        self.keywords.iter().any(|kw| fair_name_in_url(kw, url))
    }

    /// Fair code in the URL's file name that is not this fair's, e.g.
    /// `LTW26_Standbuild_Guidelines.pdf` while researching IRE.
    pub fn foreign_fair_code(&self, url: &str) -> Option<String> {
        let lower = url.to_lowercase();
        let path = lower.split(['?', '#']).next().unwrap_or("");
        let filename = path.rsplit('/').next().unwrap_or(path);

        FAIR_CODE_RE.captures_iter(filename).find_map(|cap| {
            let code = &cap[1];
            let ours = self.keywords.iter().any(|kw| kw == code) || code == self.concat;
            if ours || COMMON_ABBREVIATIONS.contains(&code) {
                None
            } else {
                Some(format!("{code}{}", &cap[2]))
            }
        })
    }

    /// Classify `url` against the resolved official domain (if any).
    ///
    /// Checked in order: same domain, subdomain of the official base domain,
    /// CDN, exhibition platform naming the fair, foreign fair code, external.
    /// CDN and platform hits carrying a foreign fair code are denied too.
    pub fn classify(&self, url: &str, official_domain: Option<&str>) -> GuardVerdict {
        let Some(host) = fairscout_common::extract_host(url) else {
            return GuardVerdict::deny(GuardCategory::Invalid, "unparseable URL");
        };
        let bare_host = host.strip_prefix("www.").unwrap_or(&host);

        if let Some(official) = official_domain {
            let official = official.to_lowercase();
            let bare_official = official.strip_prefix("www.").unwrap_or(&official);
            if bare_host == bare_official {
                return GuardVerdict::allow(GuardCategory::SameDomain, "official domain");
            }
            let base = base_domain(bare_official);
            if bare_host == base || bare_host.ends_with(&format!(".{base}")) {
                return GuardVerdict::allow(
                    GuardCategory::Subdomain,
                    format!("subdomain of {base}"),
                );
            }
        }

        let foreign = self.foreign_fair_code(url);

        if let Some(cdn) = CDN_SUFFIXES.iter().find(|s| host_has_suffix(&host, s)) {
            return match foreign {
                Some(code) => GuardVerdict::deny(
                    GuardCategory::ForeignFair,
                    format!("CDN file carries foreign fair code {code}"),
                ),
                None => GuardVerdict::allow(GuardCategory::Cdn, format!("CDN {cdn}")),
            };
        }

        if let Some(platform) = PLATFORM_MARKERS.iter().find(|m| host.contains(*m)) {
            if self.fair_in_url(url) && foreign.is_none() {
                return GuardVerdict::allow(
                    GuardCategory::Platform,
                    format!("{platform} page naming the fair"),
                );
            }
        }

        if let Some(code) = foreign {
            return GuardVerdict::deny(
                GuardCategory::ForeignFair,
                format!("file name carries foreign fair code {code}"),
            );
        }

        GuardVerdict::deny(GuardCategory::External, format!("external host {host}"))
    }
}

fn host_has_suffix(host: &str, suffix: &str) -> bool {
    host == suffix || host.ends_with(&format!(".{suffix}"))
}
