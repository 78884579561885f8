//! Whitespace normalization applied before any segmentation pass.

use regex::Regex;
use std::sync::LazyLock;

static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Normalize raw document text into the form the segmenter operates on.
///
/// - CRLF and lone CR become LF.
/// - Runs of horizontal whitespace collapse to a single space.
/// - Line edges are trimmed; lines left empty count as blank.
/// - Any run of blank lines collapses to one blank line, so paragraphs are
///   separated by exactly one blank line.
/// - Leading and trailing blank lines are dropped.
///
/// Single newlines survive: line structure is meaningful to the paragraph
/// splitter, which classifies headings per line.
///
/// # Examples
///
/// ```
/// use sumweave::segmenter::normalize;
///
/// let text = "# Title\r\n\n\n\nFirst  line.\t \nSecond line.\n";
/// assert_eq!(normalize(text), "# Title\n\nFirst line.\nSecond line.");
/// ```
pub fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let spaced = HORIZONTAL_WS.replace_all(&unified, " ");

    let mut out = String::with_capacity(spaced.len());
    let mut wrote_any = false;
    let mut pending_blank = false;
    for line in spaced.lines() {
        let line = line.trim();
        if line.is_empty() {
            // Leading blanks are dropped; interior runs collapse to one.
            pending_blank = wrote_any;
            continue;
        }
        if wrote_any {
            out.push('\n');
            if pending_blank {
                out.push('\n');
            }
        }
        out.push_str(line);
        wrote_any = true;
        pending_blank = false;
    }
    out
}
