//! Build-up / tear-down date mining from free text.
//!
//! Every pattern here is a `regex` crate automaton: matching is linear in
//! the input, no backtracking on hostile text.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use fairscout_common::ScheduleEntry;
use regex::{Captures, Regex};

const CONTEXT_CHARS: usize = 150;
const DESCRIPTION_MAX_CHARS: usize = 200;

const BUILD_UP_KEYWORDS: &[&str] = &[
    // English
    "build-up",
    "build up",
    "buildup",
    "set-up",
    "set up",
    "setup",
    "move-in",
    "move in",
    "installation",
    // German
    "aufbau",
    // Dutch
    "opbouw",
    // French
    "montage",
    "installation des stands",
];

const TEAR_DOWN_KEYWORDS: &[&str] = &[
    // English
    "tear-down",
    "tear down",
    "teardown",
    "dismantling",
    "dismantle",
    "breakdown",
    "move-out",
    "move out",
    // German
    "abbau",
    // Dutch
    "afbouw",
    // French
    "démontage",
    "demontage",
];

/// Month name → number. English (full and short), German, Dutch, French.
const MONTHS: &[(&str, u32)] = &[
    ("january", 1), ("jan", 1), ("januar", 1), ("jänner", 1), ("januari", 1), ("janvier", 1),
    ("february", 2), ("feb", 2), ("februar", 2), ("februari", 2), ("février", 2), ("fevrier", 2),
    ("march", 3), ("mar", 3), ("märz", 3), ("maerz", 3), ("maart", 3), ("mars", 3),
    ("april", 4), ("apr", 4), ("avril", 4),
    ("may", 5), ("mai", 5), ("mei", 5),
    ("june", 6), ("jun", 6), ("juni", 6), ("juin", 6),
    ("july", 7), ("jul", 7), ("juli", 7), ("juillet", 7),
    ("august", 8), ("aug", 8), ("augustus", 8), ("août", 8), ("aout", 8),
    ("september", 9), ("sep", 9), ("sept", 9), ("septembre", 9),
    ("october", 10), ("oct", 10), ("oktober", 10), ("okt", 10), ("octobre", 10),
    ("november", 11), ("nov", 11), ("novembre", 11),
    ("december", 12), ("dec", 12), ("dezember", 12), ("dez", 12), ("décembre", 12), ("decembre", 12),
];

/// Alternation of month names, longest first so `march` wins over `mar`.
fn month_alternation() -> String {
    let mut names: Vec<&str> = MONTHS.iter().map(|(name, _)| *name).collect();
    names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));
    names.dedup();
    names.iter().map(|n| regex::escape(n)).collect::<Vec<_>>().join("|")
}

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{4})-([0-9]{2})-([0-9]{2})\b").expect("valid regex"));

static DMY_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9]{1,2})[./-]([0-9]{1,2})[./-]([0-9]{4})\b").expect("valid regex")
});

static MONTH_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({})\.?\s+([0-9]{{1,2}})(?:st|nd|rd|th)?,?\s+([0-9]{{4}})\b",
        month_alternation()
    ))
    .expect("valid regex")
});

static DAY_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b([0-9]{{1,2}})(?:st|nd|rd|th)?\.?\s+({})\.?,?\s+([0-9]{{4}})\b",
        month_alternation()
    ))
    .expect("valid regex")
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([0-9]{1,2}):([0-9]{2})(?:\s*(a\.?m\.?|p\.?m\.?))?").expect("valid regex")
});

static GERMAN_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([0-9]{1,2})\.([0-9]{2})(\s*uhr)?").expect("valid regex")
});

fn keyword_re(keywords: &[&str]) -> Regex {
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    // The keyword must start a word: `montage` never fires inside `démontage`.
    Regex::new(&format!(r"(?i)(?:^|[^\p{{L}}\p{{N}}])({alternation})")).expect("valid regex")
}

static BUILD_UP_RE: LazyLock<Regex> = LazyLock::new(|| keyword_re(BUILD_UP_KEYWORDS));
static TEAR_DOWN_RE: LazyLock<Regex> = LazyLock::new(|| keyword_re(TEAR_DOWN_KEYWORDS));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    BuildUp,
    TearDown,
}

impl Direction {
    fn keyword_re(&self) -> &'static Regex {
        match self {
            Direction::BuildUp => &BUILD_UP_RE,
            Direction::TearDown => &TEAR_DOWN_RE,
        }
    }
}

// --- Dates ---

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS.iter().find(|(n, _)| *n == lower).map(|(_, m)| *m)
}

fn iso(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.format("%Y-%m-%d").to_string())
}

/// First valid date matched by `re`; invalid calendar dates are skipped.
fn first_date(re: &Regex, text: &str, ymd: impl Fn(&Captures) -> Option<String>) -> Option<String> {
    re.captures_iter(text).find_map(|c| ymd(&c))
}

/// First date in `text`, trying ISO, `DD.MM.YYYY`, month-first and
/// day-first month names in that order. Returns `YYYY-MM-DD`.
pub fn normalize_date(text: &str) -> Option<String> {
    first_date(&ISO_DATE_RE, text, |c| {
        iso(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
    })
    .or_else(|| {
        first_date(&DMY_DATE_RE, text, |c| {
            iso(c[3].parse().ok()?, c[2].parse().ok()?, c[1].parse().ok()?)
        })
    })
    .or_else(|| {
        first_date(&MONTH_FIRST_RE, text, |c| {
            iso(c[3].parse().ok()?, month_number(&c[1])?, c[2].parse().ok()?)
        })
    })
    .or_else(|| {
        first_date(&DAY_FIRST_RE, text, |c| {
            iso(c[3].parse().ok()?, month_number(&c[2])?, c[1].parse().ok()?)
        })
    })
}

pub fn has_date(text: &str) -> bool {
    normalize_date(text).is_some()
}

// --- Times ---

fn hhmm(hour: u32, minute: u32) -> Option<String> {
    NaiveTime::from_hms_opt(hour, minute, 0).map(|t| t.format("%H:%M").to_string())
}

/// First time in `text`: `HH:MM` with optional am/pm, then German
/// `HH.MM [Uhr]`. Returns 24-hour `HH:MM`.
pub fn normalize_time(text: &str) -> Option<String> {
    for c in TIME_RE.captures_iter(text) {
        let (Ok(hour), Ok(minute)) = (c[1].parse::<u32>(), c[2].parse::<u32>()) else {
            continue;
        };
        let hour = match c.get(3).map(|m| m.as_str().to_lowercase()) {
            Some(suffix) if (1..=12).contains(&hour) => {
                let pm = suffix.starts_with('p');
                match (hour, pm) {
                    (12, false) => 0,
                    (12, true) => 12,
                    (h, true) => h + 12,
                    (h, false) => h,
                }
            }
            Some(_) => continue,
            None => hour,
        };
        if let Some(time) = hhmm(hour, minute) {
            return Some(time);
        }
    }

    for c in GERMAN_TIME_RE.captures_iter(text) {
        let Some(whole) = c.get(0) else { continue };
        if is_date_fragment(text, whole.start(), c.get(2).map(|m| m.end()).unwrap_or(whole.end())) {
            continue;
        }
        let (Ok(hour), Ok(minute)) = (c[1].parse::<u32>(), c[2].parse::<u32>()) else {
            continue;
        };
        if let Some(time) = hhmm(hour, minute) {
            return Some(time);
        }
    }
    None
}

/// `29.01` inside `29.01.2026` or `2026.01.29` is part of a date.
fn is_date_fragment(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let mut after = text[end..].chars();
    let preceded = before.is_some_and(|c| c.is_ascii_digit() || c == '.');
    let followed = after.next() == Some('.') && after.next().is_some_and(|c| c.is_ascii_digit());
    preceded || followed
}

pub fn has_time(text: &str) -> bool {
    normalize_time(text).is_some()
}

// --- Keywords ---

pub fn has_build_up_keyword(text: &str) -> bool {
    BUILD_UP_RE.is_match(text)
}

pub fn has_tear_down_keyword(text: &str) -> bool {
    TEAR_DOWN_RE.is_match(text)
}

/// Schedule keywords and a date both occur: worth running the extractor.
pub fn has_schedule_signal(text: &str) -> bool {
    (has_build_up_keyword(text) || has_tear_down_keyword(text)) && has_date(text)
}

// --- Extraction ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedSchedule {
    pub build_up: Vec<ScheduleEntry>,
    pub tear_down: Vec<ScheduleEntry>,
}

impl ExtractedSchedule {
    pub fn is_empty(&self) -> bool {
        self.build_up.is_empty() && self.tear_down.is_empty()
    }
}

/// Byte range of the `radius` chars on either side of `[start, end)`.
fn char_window(text: &str, start: usize, end: usize, radius: usize) -> (usize, usize) {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    (from, to)
}

/// The line around a keyword hit, whitespace-collapsed and capped.
fn description(text: &str, start: usize, end: usize) -> String {
    let line_start = text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[end..].find('\n').map(|i| end + i).unwrap_or(text.len());
    let line = text[line_start..line_end]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if line.chars().count() > DESCRIPTION_MAX_CHARS {
        line.chars().take(DESCRIPTION_MAX_CHARS - 3).collect::<String>() + "..."
    } else {
        line
    }
}

fn extract_direction(text: &str, source_url: &str, direction: Direction) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();
    for cap in direction.keyword_re().captures_iter(text) {
        let Some(kw) = cap.get(1) else { continue };
        let (from, to) = char_window(text, kw.start(), kw.end(), CONTEXT_CHARS);
        // Text after the keyword first, so a neighbouring entry's date
        // earlier in the window does not win.
        let ahead = &text[kw.start()..to];
        let window = &text[from..to];
        entries.push(ScheduleEntry {
            date: normalize_date(ahead).or_else(|| normalize_date(window)),
            time: normalize_time(ahead).or_else(|| normalize_time(window)),
            description: description(text, kw.start(), kw.end()),
            source_url: source_url.to_string(),
        });
    }
    let mut deduped = Vec::new();
    merge_entries(&mut deduped, entries);
    deduped
}

/// Mine build-up and tear-down entries from `text`. Each direction is
/// deduplicated by date and sorted ascending, dateless entries first.
pub fn extract_schedule(text: &str, source_url: &str) -> ExtractedSchedule {
    ExtractedSchedule {
        build_up: extract_direction(text, source_url, Direction::BuildUp),
        tear_down: extract_direction(text, source_url, Direction::TearDown),
    }
}

/// Merge `incoming` into `existing`, keeping the first entry per date (at
/// most one dateless entry), then sort by date with `None` first.
///
/// Two different times on the same date collapse into one entry.
pub fn merge_entries(existing: &mut Vec<ScheduleEntry>, incoming: Vec<ScheduleEntry>) {
    for entry in incoming {
        if !existing.iter().any(|e| e.date == entry.date) {
            existing.push(entry);
        }
    }
    existing.sort_by(|a, b| a.date.cmp(&b.date));
}
