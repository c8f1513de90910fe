// PDF text extraction via poppler's `pdftotext` / `pdfinfo`.

use std::path::Path;
use std::time::Duration;

use fairscout_common::{FetchError, ParsedPdf};
use tracing::{debug, info, warn};

const PDF_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) struct PdfExtractor {
    pdftotext_bin: String,
    pdfinfo_bin: String,
}

impl PdfExtractor {
    pub(crate) fn new(pdftotext_bin: String, pdfinfo_bin: String) -> Self {
        Self {
            pdftotext_bin,
            pdfinfo_bin,
        }
    }

    pub(crate) async fn parse(&self, path: &Path) -> Result<ParsedPdf, FetchError> {
        info!(path = %path.display(), "Parsing PDF");

        let output = tokio::time::timeout(
            PDF_TIMEOUT,
            tokio::process::Command::new(&self.pdftotext_bin)
                .arg("-layout")
                .args(["-enc", "UTF-8"])
                .arg(path)
                .arg("-")
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| FetchError::Parse(format!("pdftotext timed out after {}s", PDF_TIMEOUT.as_secs())))?
        .map_err(|e| FetchError::Parse(format!("failed to launch {}: {e}", self.pdftotext_bin)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(path = %path.display(), stderr = %stderr, "pdftotext failed");
            return Err(FetchError::Parse(format!("pdftotext: {}", stderr.trim())));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let num_pages = count_pages(&raw);
        let text = raw.replace('\u{c}', "\n");
        let title = self.title(path).await;

        info!(path = %path.display(), num_pages, chars = text.len(), "PDF parsed");
        Ok(ParsedPdf {
            text,
            num_pages,
            title,
        })
    }

    /// Document title from `pdfinfo`. Best effort: any failure is `None`.
    async fn title(&self, path: &Path) -> Option<String> {
        let output = tokio::time::timeout(
            PDF_TIMEOUT,
            tokio::process::Command::new(&self.pdfinfo_bin)
                .arg(path)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .ok()?
        .map_err(|e| debug!(error = %e, "pdfinfo unavailable"))
        .ok()?;

        if !output.status.success() {
            return None;
        }
        parse_info_title(&String::from_utf8_lossy(&output.stdout))
    }
}

/// `pdftotext` ends every page with a form feed.
fn count_pages(raw: &str) -> u32 {
    let feeds = raw.matches('\u{c}').count() as u32;
    if feeds == 0 && !raw.trim().is_empty() {
        1
    } else {
        feeds
    }
}

fn parse_info_title(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("Title:"))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_counted_by_form_feeds() {
        assert_eq!(count_pages("page one\u{c}page two\u{c}"), 2);
        assert_eq!(count_pages("no feeds at all"), 1);
        assert_eq!(count_pages(""), 0);
    }

    #[test]
    fn title_is_read_from_pdfinfo_output() {
        let info = "Creator:        Word\nTitle:          Technical Guidelines 2026\nPages:          14\n";
        assert_eq!(parse_info_title(info).as_deref(), Some("Technical Guidelines 2026"));
        assert_eq!(parse_info_title("Title:   \nPages: 1"), None);
    }

    #[tokio::test]
    async fn missing_binary_is_a_parse_error() {
        let extractor = PdfExtractor::new("fairscout-no-such-pdftotext".into(), "pdfinfo".into());
        let err = extractor.parse(Path::new("/tmp/none.pdf")).await.unwrap_err();
        assert_eq!(err.kind(), "parse");
    }
}
