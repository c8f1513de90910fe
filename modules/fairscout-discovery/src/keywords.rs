//! Keyword registry: what each field's documents are called across
//! English, German, Dutch, French, Spanish and Italian fair sites.
//!
//! All keywords are lowercase. Matching is done against lowercased text.

use fairscout_common::FieldName;

// --- Field keywords ---

const FLOORPLAN: &[&str] = &[
    "floorplan",
    "floor plan",
    "hall plan",
    "hallplan",
    "site plan",
    "venue map",
    "show layout",
    "exhibition layout",
    "hallenplan",
    "geländeplan",
    "gelaendeplan",
    "plattegrond",
    "plan du salon",
    "plan des halls",
    "plano del recinto",
    "planimetria",
    "expocad",
    "expofp",
    "mapyourshow",
];

const EXHIBITOR_MANUAL: &[&str] = &[
    "exhibitor manual",
    "exhibitor handbook",
    "exhibitor guide",
    "welcome pack",
    "event manual",
    "service documentation",
    "ausstellerhandbuch",
    "ausstellerinformation",
    "handleiding exposant",
    "exposantenhandleiding",
    "manuel exposant",
    "guide exposant",
    "manual del expositor",
    "manuale espositore",
    "general terms",
    "teilnahmebedingung",
    "algemene voorwaarden",
    "conditions générales",
];

const RULES: &[&str] = &[
    "technical regulation",
    "technical guideline",
    "technical specification",
    "design regulation",
    "construction rule",
    "stand build rule",
    "stand construction",
    "height limit",
    "fire safety",
    "specific terms",
    "technische richtlinie",
    "technische richtlijn",
    "standbauvorschrift",
    "bauvorschrift",
    "standbouwregels",
    "voorschriften",
    "règlement technique",
    "reglement technique",
    "regolamento tecnico",
    "reglamento tecnico",
];

const SCHEDULE: &[&str] = &[
    "build-up",
    "build up",
    "set-up",
    "move-in",
    "move-out",
    "dismantling",
    "tear-down",
    "event schedule",
    "timetable",
    "important dates",
    "key dates",
    "aufbau",
    "abbau",
    "opbouw",
    "afbouw",
    "montage",
    "démontage",
];

const EXHIBITOR_DIRECTORY: &[&str] = &[
    "exhibitor list",
    "exhibitor directory",
    "list of exhibitors",
    "exhibitor search",
    "find exhibitor",
    "exhibitor catalogue",
    "exhibitor catalog",
    "company directory",
    "ausstellerliste",
    "ausstellerverzeichnis",
    "aussteller suchen",
    "exposantenlijst",
    "liste des exposants",
    "catalogue des exposants",
    "elenco espositori",
];

pub fn field_keywords(field: FieldName) -> &'static [&'static str] {
    match field {
        FieldName::Floorplan => FLOORPLAN,
        FieldName::ExhibitorManual => EXHIBITOR_MANUAL,
        FieldName::Rules => RULES,
        FieldName::Schedule => SCHEDULE,
        FieldName::ExhibitorDirectory => EXHIBITOR_DIRECTORY,
    }
}

// --- PDF exclusions ---

/// Words in a PDF's URL or title that mean it is not a floor plan, even
/// when it mentions halls or plans: technical data sheets, evacuation
/// plans and utility layouts.
const FLOORPLAN_EXCLUSIONS: &[&str] = &[
    "technical",
    "data sheet",
    "datasheet",
    "evacuation",
    "emergency",
    "safety",
    "regulation",
    "provision",
    "guideline",
    "specification",
    "spec",
    "elettric",
    "electric",
    "water",
    "gas",
    "service",
];

pub fn field_exclusions(field: FieldName) -> &'static [&'static str] {
    match field {
        FieldName::Floorplan => FLOORPLAN_EXCLUSIONS,
        _ => &[],
    }
}

/// True when a PDF's URL or title rules it out for `field`.
pub fn pdf_excluded(field: FieldName, url: &str, title: &str) -> bool {
    let exclusions = field_exclusions(field);
    !exclusions.is_empty()
        && contains_any(&format!("{} {}", url.to_lowercase(), title.to_lowercase()), exclusions)
}

// --- Navigation keywords ---

/// Links to a page that lists the fair's downloadable documents.
pub const DOWNLOAD_CENTER: &[&str] = &[
    "download center",
    "download centre",
    "download-center",
    "downloadcenter",
    "downloads",
    "document center",
    "documents",
    "dokumente",
    "exhibitor resources",
    "exhibitor service",
    "ausstellerservice",
    "service documents",
    "documenten",
    "téléchargements",
];

/// Links into the exhibitor area; these become entry pages.
pub const ENTRY_AREA: &[&str] = &[
    "exhibitor",
    "aussteller",
    "exposant",
    "standhouder",
    "espositori",
    "expositores",
    "participate",
    "teilnehmen",
    "deelnemen",
];

// --- Download priority ---

/// Keyword groups, the field each stands for, and the priority they add to
/// a pooled PDF. Each group counts once.
pub const DOWNLOAD_PRIORITY: &[(u32, Option<FieldName>, &[&str])] = &[
    (
        50,
        Some(FieldName::ExhibitorManual),
        &["manual", "handbook", "handbuch", "handleiding", "manuel", "welcome pack", "guide"],
    ),
    (
        40,
        Some(FieldName::Rules),
        &[
            "regulation",
            "rules",
            "richtlinie",
            "richtlijn",
            "reglement",
            "règlement",
            "regolamento",
            "guideline",
            "technical",
            "voorschrift",
        ],
    ),
    (30, None, &["exhibitor", "aussteller", "exposant", "standhouder", "espositor"]),
    (
        25,
        Some(FieldName::Floorplan),
        &["floor", "hall", "hallen", "gelände", "gelaende", "plattegrond", "layout", "site plan"],
    ),
    (
        20,
        Some(FieldName::Schedule),
        &["schedule", "timeline", "aufbau", "abbau", "opbouw", "afbouw", "build-up", "dismantl", "move-in"],
    ),
];

/// Priority bonus for a PDF already backed by a scored candidate.
pub const CANDIDATE_PRIORITY: u32 = 100;

// --- Matching helpers ---

/// Variants of a keyword as it may appear in a URL path.
fn url_variants(keyword: &str) -> Vec<String> {
    if !keyword.contains(' ') {
        return vec![keyword.to_string()];
    }
    vec![
        keyword.to_string(),
        keyword.replace(' ', "-"),
        keyword.replace(' ', "_"),
        keyword.replace(' ', ""),
        keyword.replace(' ', "%20"),
    ]
}

/// True when `keyword` (or a hyphen/underscore spelling of it) occurs in a
/// lowercased URL.
pub fn keyword_in_url(keyword: &str, url_lower: &str) -> bool {
    url_variants(keyword).iter().any(|v| url_lower.contains(v.as_str()))
}

/// Keywords of `field` present in `url_lower`, in registry order.
pub fn matched_in_url(field: FieldName, url_lower: &str) -> Vec<&'static str> {
    field_keywords(field)
        .iter()
        .copied()
        .filter(|kw| keyword_in_url(kw, url_lower))
        .collect()
}

/// Any of `keywords` in `haystack_lower`, as a plain substring or, for URLs,
/// a hyphenated spelling.
pub fn contains_any(haystack_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| keyword_in_url(kw, haystack_lower))
}

/// Total occurrences of any of `keywords` in `text_lower`.
pub fn count_occurrences(text_lower: &str, keywords: &[&str]) -> usize {
    keywords.iter().map(|kw| text_lower.matches(kw).count()).sum()
}

/// Fields whose keywords occur in `text_lower`.
pub fn fields_in(text_lower: &str) -> Vec<FieldName> {
    FieldName::ALL
        .into_iter()
        .filter(|&f| field_keywords(f).iter().any(|kw| text_lower.contains(kw)))
        .collect()
}

/// Download priority of a pooled PDF from its URL and link text. A group
/// whose field excludes the PDF adds nothing.
pub fn download_priority(url: &str, link_text: &str, is_candidate: bool) -> u32 {
    let haystack = format!("{} {}", url.to_lowercase(), link_text.to_lowercase());
    let keyword_score: u32 = DOWNLOAD_PRIORITY
        .iter()
        .filter(|(_, field, group)| {
            contains_any(&haystack, group)
                && !field.is_some_and(|f| pdf_excluded(f, url, link_text))
        })
        .map(|(bonus, _, _)| bonus)
        .sum();
    keyword_score + if is_candidate { CANDIDATE_PRIORITY } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_has_keywords_and_they_are_lowercase() {
        for field in FieldName::ALL {
            let kws = field_keywords(field);
            assert!(!kws.is_empty(), "{field} has no keywords");
            for kw in kws {
                assert_eq!(*kw, kw.to_lowercase(), "{kw} is not lowercase");
            }
        }
    }

    #[test]
    fn url_matching_tolerates_hyphens_and_underscores() {
        assert!(keyword_in_url("floor plan", "https://fair.com/floor-plan"));
        assert!(keyword_in_url("floor plan", "https://fair.com/floor_plan.pdf"));
        assert!(keyword_in_url("exhibitor manual", "https://fair.com/exhibitormanual"));
        assert!(!keyword_in_url("floor plan", "https://fair.com/floors/plan"));
    }

    #[test]
    fn matched_in_url_lists_field_keywords() {
        let url = "https://fair.com/media/hallenplan-floor-plan.pdf";
        assert_eq!(matched_in_url(FieldName::Floorplan, url), vec!["floor plan", "hallenplan"]);
        assert!(matched_in_url(FieldName::Rules, url).is_empty());
    }

    #[test]
    fn download_priority_sums_groups_once() {
        // manual (+50) + exhibitor (+30); "guide" in the same group adds nothing.
        assert_eq!(download_priority("https://f.com/exhibitor-manual-guide.pdf", "", false), 80);
        assert_eq!(download_priority("https://f.com/x.pdf", "Technical Regulations", true), 140);
        assert_eq!(download_priority("https://f.com/press.pdf", "Press kit", false), 0);
    }

    #[test]
    fn floorplan_bonus_is_withheld_from_excluded_pdfs() {
        // floor/hall (+25) only.
        assert_eq!(download_priority("https://f.com/hallenplan.pdf", "Hall plan", false), 25);
        // "evacuation" rules out the floor plan bonus; nothing else matches.
        assert_eq!(download_priority("https://f.com/evacuation-plan-hall-3.pdf", "", false), 0);
        // Rules (+40) still count for a technical hall sheet.
        assert_eq!(download_priority("https://f.com/hall-technical-data.pdf", "", false), 40);
    }

    #[test]
    fn exclusions_apply_to_url_and_title() {
        assert!(pdf_excluded(FieldName::Floorplan, "https://f.com/hall-water-supply.pdf", ""));
        assert!(pdf_excluded(FieldName::Floorplan, "https://f.com/doc17.pdf", "Emergency exits, hall 4"));
        assert!(!pdf_excluded(FieldName::Floorplan, "https://f.com/hallenplan.pdf", "Hall plan 2026"));
        assert!(!pdf_excluded(FieldName::Rules, "https://f.com/technical-guidelines.pdf", ""));
        assert!(field_exclusions(FieldName::Schedule).is_empty());
    }

    #[test]
    fn fields_in_text() {
        let fields = fields_in("download the hallenplan and the technical guidelines");
        assert_eq!(fields, vec![FieldName::Floorplan, FieldName::Rules]);
    }
}
