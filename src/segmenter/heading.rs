//! Heading detection for paragraph classification.

use super::sentences::SENTENCE_TERMINALS;
use crate::config::DEFAULT_HEADING_LENGTH_LIMIT;

/// Pluggable heading classifier applied per normalized line.
///
/// Implemented for plain closures too, so ad-hoc rules read naturally:
///
/// ```
/// use sumweave::segmenter::{HeadingClassifier, Segmenter};
///
/// let markdown_only = |line: &str| line.starts_with('#');
/// assert!(markdown_only.is_heading("## Setup"));
///
/// let segmenter = Segmenter::builder()
///     .classifier(markdown_only)
///     .try_build()
///     .unwrap();
/// # let _ = segmenter;
/// ```
pub trait HeadingClassifier: Send + Sync {
    fn is_heading(&self, line: &str) -> bool;
}

impl<F> HeadingClassifier for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_heading(&self, line: &str) -> bool {
        self(line)
    }
}

/// Default heuristic: markup heading markers, or short lines without terminal
/// sentence punctuation.
///
/// A line is a heading when it starts with `#`, or when it is shorter than the
/// length limit (40 characters by default) and its last character is not one
/// of [`SENTENCE_TERMINALS`].
#[derive(Clone, Debug)]
pub struct DefaultHeadingClassifier {
    length_limit: usize,
}

impl DefaultHeadingClassifier {
    pub fn new(length_limit: usize) -> Self {
        Self { length_limit }
    }
}

impl Default for DefaultHeadingClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_HEADING_LENGTH_LIMIT)
    }
}

impl HeadingClassifier for DefaultHeadingClassifier {
    fn is_heading(&self, line: &str) -> bool {
        if line.starts_with('#') {
            return true;
        }
        let Some(last) = line.chars().last() else {
            return false;
        };
        line.chars().count() < self.length_limit && !SENTENCE_TERMINALS.contains(&last)
    }
}
