//! Merge chunked text back into one document, collapsing injected overlap.

use crate::config::{DEFAULT_MIN_MERGE_OVERLAP, DEFAULT_OVERLAP_SIZE};

/// Merges chunk sequences whose neighbors may share overlap regions.
///
/// For every boundary the reassembler looks for the longest string that is
/// simultaneously a suffix of the accumulated text and a prefix of the next
/// chunk, searching within `2 x overlap_size` characters from each side and
/// ignoring matches shorter than `min_overlap`. A found duplication is
/// dropped from the next chunk before appending; otherwise the chunks join
/// with a blank line.
///
/// Comparisons work on characters, so multi-byte text never splits inside a
/// code point. Merging is idempotent: feeding an already-merged document back
/// in returns it unchanged.
///
/// # Examples
///
/// ```
/// use sumweave::reassembler::Reassembler;
///
/// let reassembler = Reassembler::new();
/// let merged = reassembler.merge(&[
///     "One two three. Shared tail sentence.",
///     "Shared tail sentence. Four five six.",
/// ]);
/// assert_eq!(merged, "One two three. Shared tail sentence. Four five six.");
/// ```
#[derive(Clone, Debug)]
pub struct Reassembler {
    overlap_size: usize,
    min_overlap: usize,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self {
            overlap_size: DEFAULT_OVERLAP_SIZE,
            min_overlap: DEFAULT_MIN_MERGE_OVERLAP,
        }
    }
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlap size the producing segmenter was configured with; bounds the
    /// search window at `2 x overlap_size` characters.
    #[must_use]
    pub fn with_overlap_size(mut self, overlap_size: usize) -> Self {
        self.overlap_size = overlap_size;
        self
    }

    /// Shortest duplication worth collapsing. Defaults to 10 characters;
    /// values below 1 are treated as 1.
    #[must_use]
    pub fn with_min_overlap(mut self, min_overlap: usize) -> Self {
        self.min_overlap = min_overlap;
        self
    }

    /// Merge chunks left to right into a single document.
    ///
    /// A single chunk is returned unchanged; empty input yields an empty
    /// string.
    pub fn merge<S: AsRef<str>>(&self, chunks: &[S]) -> String {
        let Some(first) = chunks.first() else {
            return String::new();
        };
        let mut merged = first.as_ref().to_string();

        for chunk in &chunks[1..] {
            let chunk = chunk.as_ref();
            match self.find_overlap(&merged, chunk) {
                Some(dup_chars) => {
                    merged.push_str(&chunk[byte_of_char(chunk, dup_chars)..]);
                }
                None => {
                    merged.push_str("\n\n");
                    merged.push_str(chunk);
                }
            }
        }
        merged
    }

    /// Longest shared suffix-of-`text1` / prefix-of-`text2`, in characters,
    /// within the configured windows. `None` when nothing at or above
    /// `min_overlap` matches.
    fn find_overlap(&self, text1: &str, text2: &str) -> Option<usize> {
        let window = self.overlap_size * 2;
        let end = char_tail(text1, window);
        let start: Vec<char> = text2.chars().take(window).collect();

        let limit = end.len().min(start.len());
        let min = self.min_overlap.max(1);
        for len in (min..=limit).rev() {
            if end[end.len() - len..] == start[..len] {
                return Some(len);
            }
        }
        None
    }
}

fn char_tail(s: &str, window: usize) -> Vec<char> {
    let chars: Vec<char> = s.chars().collect();
    let start = chars.len().saturating_sub(window);
    chars[start..].to_vec()
}

fn byte_of_char(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(byte, _)| byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_merges_to_empty_string() {
        let chunks: [&str; 0] = [];
        assert_eq!(Reassembler::new().merge(&chunks), "");
    }

    #[test]
    fn single_chunk_is_returned_unchanged() {
        let merged = Reassembler::new().merge(&["only chunk text"]);
        assert_eq!(merged, "only chunk text");
    }

    #[test]
    fn collapses_duplicated_overlap_once() {
        let merged = Reassembler::new().merge(&[
            "Alpha section text. Overlap sentence goes here.",
            "Overlap sentence goes here. Beta section text.",
        ]);
        assert_eq!(
            merged,
            "Alpha section text. Overlap sentence goes here. Beta section text."
        );
    }

    #[test]
    fn joins_with_blank_line_when_nothing_matches() {
        let merged = Reassembler::new().merge(&["Alpha beta gamma.", "Delta epsilon zeta."]);
        assert_eq!(merged, "Alpha beta gamma.\n\nDelta epsilon zeta.");
    }

    #[test]
    fn matches_below_min_overlap_are_ignored() {
        let merged = Reassembler::new().merge(&["first part ends ab", "ab second part"]);
        assert_eq!(merged, "first part ends ab\n\nab second part");
    }

    #[test]
    fn overlap_search_is_char_boundary_safe() {
        let reassembler = Reassembler::new().with_min_overlap(5);
        let merged = reassembler.merge(&["第一段结束。重叠句子在这里。", "重叠句子在这里。第二段开始。"]);
        assert_eq!(merged, "第一段结束。重叠句子在这里。第二段开始。");
    }

    #[test]
    fn merging_is_idempotent() {
        let chunks = [
            "Alpha section text. Overlap sentence goes here.",
            "Overlap sentence goes here. Beta section text.",
        ];
        let reassembler = Reassembler::new();
        let once = reassembler.merge(&chunks);
        let twice = reassembler.merge(&[once.clone()]);
        assert_eq!(once, twice);
    }

    #[test]
    fn chained_merge_collapses_every_boundary() {
        let merged = Reassembler::new().merge(&[
            "Start of document text here.",
            "document text here. Middle passage words.",
            "Middle passage words. End of document.",
        ]);
        assert_eq!(
            merged,
            "Start of document text here. Middle passage words. End of document."
        );
    }
}
