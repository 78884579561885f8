//! Overlap-aware document segmentation.
//!
//! Turns normalized text into bounded chunks that carry enough surrounding
//! context to be summarized independently:
//!
//! - paragraphs are split on blank lines, with per-line heading detection
//!   (see [`HeadingClassifier`]);
//! - the most recent heading travels with later body paragraphs and is
//!   materialized at the top of chunks that would otherwise lose it;
//! - chunks are greedily packed against a budget that reserves room for the
//!   overlap prefix, so finished chunks stay within `max_chunk_size`;
//! - every chunk after the first is prefixed with the tail sentences of its
//!   predecessor (capped at `overlap_size` characters, separator included).
//!
//! All sizes are character counts, not bytes, so multi-byte scripts budget
//! the same way ASCII does.

mod heading;
mod normalize;
mod sentences;

use std::sync::Arc;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use heading::{DefaultHeadingClassifier, HeadingClassifier};
pub use normalize::normalize;
pub use sentences::{SENTENCE_TERMINALS, split_sentences};

use crate::config::{DEFAULT_MAX_CHUNK_SIZE, DEFAULT_OVERLAP_SIZE};

/// Classification assigned to each normalized paragraph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParagraphKind {
    Heading,
    Body,
}

/// One normalized paragraph, tagged with the heading section it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub kind: ParagraphKind,
    /// Most recent heading above this paragraph, if any. Headings carry none.
    pub heading_context: Option<String>,
}

/// A finished chunk ready for downstream summarization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the chunk sequence, starting at 0.
    pub index: usize,
    pub text: String,
    /// Character length of the injected overlap prefix, separator included.
    /// Always 0 for the first chunk.
    pub overlap_len: usize,
}

impl Chunk {
    /// Length of the chunk text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The chunk text with the injected overlap prefix stripped.
    pub fn body(&self) -> &str {
        match self.text.char_indices().nth(self.overlap_len) {
            Some((byte, _)) => &self.text[byte..],
            None => "",
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum SegmenterError {
    #[error("max_chunk_size must be at least 1")]
    #[diagnostic(
        code(sumweave::segmenter::chunk_size),
        help("Use a positive chunk size; the default is 2000 characters.")
    )]
    ZeroChunkSize,

    #[error("overlap_size {overlap} must be smaller than max_chunk_size {max}")]
    #[diagnostic(
        code(sumweave::segmenter::overlap),
        help("Shrink overlap_size or grow max_chunk_size; the overlap prefix is carved out of every chunk's budget.")
    )]
    OverlapTooLarge { overlap: usize, max: usize },
}

/// Splits documents into bounded, context-preserving chunks.
///
/// Build one through [`Segmenter::builder`]; the defaults match the rest of
/// the crate (2000-character chunks, 150-character overlap, the default
/// heading heuristic).
///
/// # Examples
///
/// ```
/// use sumweave::segmenter::Segmenter;
///
/// let segmenter = Segmenter::builder().try_build().unwrap();
///
/// let chunks = segmenter.segment("# Title\n\nBody sentence one. Body sentence two.");
/// assert_eq!(chunks.len(), 1);
/// assert_eq!(chunks[0].text, "# Title\n\nBody sentence one. Body sentence two.");
/// assert_eq!(chunks[0].overlap_len, 0);
/// ```
pub struct Segmenter {
    max_chunk_size: usize,
    overlap_size: usize,
    classifier: Arc<dyn HeadingClassifier>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
            classifier: Arc::new(DefaultHeadingClassifier::default()),
        }
    }
}

impl Segmenter {
    /// Create a new builder for constructing a `Segmenter`.
    pub fn builder() -> SegmenterBuilder {
        SegmenterBuilder::default()
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn overlap_size(&self) -> usize {
        self.overlap_size
    }

    /// Character budget for packing, with the overlap prefix reserved up
    /// front. Injection can then never push a finished chunk past
    /// `max_chunk_size`.
    fn packing_budget(&self) -> usize {
        self.max_chunk_size - self.overlap_size
    }

    /// Split `text` into chunks.
    ///
    /// Empty or whitespace-only input yields an empty vector; chunks are
    /// never empty. Each chunk stays within `max_chunk_size` characters
    /// unless it is the sole carrier of a single sentence longer than the
    /// packing budget, which is kept whole rather than cut mid-sentence.
    ///
    /// # Examples
    ///
    /// ```
    /// use sumweave::segmenter::Segmenter;
    ///
    /// let segmenter = Segmenter::builder()
    ///     .max_chunk_size(20)
    ///     .overlap_size(5)
    ///     .try_build()
    ///     .unwrap();
    ///
    /// let chunks = segmenter.segment("# Intro\nAlpha beta gamma. Delta epsilon.");
    /// let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    /// assert_eq!(texts, ["# Intro", "Alpha beta gamma.", "ma.\n\nDelta epsilon."]);
    /// ```
    pub fn segment(&self, text: &str) -> Vec<Chunk> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Vec::new();
        }
        let paragraphs = self.paragraphs(&normalized);
        let packed = self.pack(paragraphs);
        self.inject_overlap(packed)
    }

    /// Split normalized text into classified paragraphs.
    ///
    /// Exposed as the intermediate between [`normalize`] and packing: blank
    /// lines delimit blocks, each line the classifier marks as a heading
    /// becomes its own [`ParagraphKind::Heading`] paragraph, and maximal runs
    /// of other lines join with single spaces into body paragraphs carrying
    /// the latest heading as context.
    pub fn paragraphs(&self, normalized: &str) -> Vec<Paragraph> {
        let mut paragraphs = Vec::new();
        let mut latest_heading: Option<String> = None;
        let mut body_lines: Vec<&str> = Vec::new();

        for block in normalized.split("\n\n") {
            for line in block.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if self.classifier.is_heading(line) {
                    flush_body(&mut body_lines, &latest_heading, &mut paragraphs);
                    paragraphs.push(Paragraph {
                        text: line.to_string(),
                        kind: ParagraphKind::Heading,
                        heading_context: None,
                    });
                    latest_heading = Some(line.to_string());
                } else {
                    body_lines.push(line);
                }
            }
            flush_body(&mut body_lines, &latest_heading, &mut paragraphs);
        }
        paragraphs
    }

    fn pack(&self, paragraphs: Vec<Paragraph>) -> Vec<PackedChunk> {
        let budget = self.packing_budget();
        let mut packed: Vec<PackedChunk> = Vec::new();
        let mut current: Option<Draft> = None;

        for para in paragraphs {
            match para.kind {
                // A heading always closes the running chunk and anchors a new one.
                ParagraphKind::Heading => {
                    if let Some(draft) = current.take() {
                        packed.push(draft.finish());
                    }
                    current = Some(Draft::start(para.text, true));
                }
                ParagraphKind::Body => {
                    let para_len = char_count(&para.text);
                    if para_len > budget {
                        if let Some(draft) = current.take() {
                            packed.push(draft.finish());
                        }
                        pack_sentences(&para.text, budget, &mut packed);
                        continue;
                    }
                    let fits = current
                        .as_ref()
                        .is_some_and(|draft| draft.char_len + 2 + para_len <= budget);
                    if fits {
                        if let Some(draft) = current.as_mut() {
                            draft.push(para.text);
                        }
                    } else {
                        if let Some(draft) = current.take() {
                            packed.push(draft.finish());
                        }
                        current = Some(start_body_draft(para, budget));
                    }
                }
            }
        }
        if let Some(draft) = current.take() {
            packed.push(draft.finish());
        }
        packed
    }

    fn inject_overlap(&self, packed: Vec<PackedChunk>) -> Vec<Chunk> {
        let budget = self.packing_budget();
        let inject = self.overlap_size > 0 && packed.len() > 1;
        let mut chunks = Vec::with_capacity(packed.len());

        for (index, current) in packed.iter().enumerate() {
            let mut text = current.text.clone();
            let mut overlap_len = 0usize;
            if inject && index > 0 {
                let prev = &packed[index - 1];
                // Heading-only predecessors already travel as heading context;
                // oversized receivers must not grow past the bound any further.
                if !prev.heading_only && current.char_len <= budget {
                    if let Some(context) = self.overlap_context(&prev.text) {
                        overlap_len = char_count(&context) + 2;
                        text = format!("{context}\n\n{}", current.text);
                    }
                }
            }
            chunks.push(Chunk {
                index,
                text,
                overlap_len,
            });
        }
        chunks
    }

    /// Pick the overlap context from the end of the previous chunk: whole
    /// tail sentences while they fit, otherwise a raw character tail so a
    /// requested overlap is never silently absent.
    fn overlap_context(&self, prev_text: &str) -> Option<String> {
        const SEPARATOR_LEN: usize = 2; // "\n\n"
        let sentences = split_sentences(prev_text);
        let mut context_len = 0usize;
        let mut start = sentences.len();

        for (i, sentence) in sentences.iter().enumerate().rev() {
            let len = char_count(sentence);
            if context_len + len + SEPARATOR_LEN > self.overlap_size {
                break;
            }
            context_len += len;
            start = i;
        }

        let context = if start < sentences.len() {
            sentences[start..].concat()
        } else {
            if self.overlap_size <= SEPARATOR_LEN {
                return None;
            }
            let take = self.overlap_size - SEPARATOR_LEN;
            let chars: Vec<char> = prev_text.chars().collect();
            chars[chars.len().saturating_sub(take)..].iter().collect()
        };

        let context = context.trim_start();
        if context.is_empty() {
            None
        } else {
            Some(context.to_string())
        }
    }
}

/// Builder for constructing [`Segmenter`] instances.
pub struct SegmenterBuilder {
    max_chunk_size: usize,
    overlap_size: usize,
    classifier: Option<Arc<dyn HeadingClassifier>>,
}

impl Default for SegmenterBuilder {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
            classifier: None,
        }
    }
}

impl SegmenterBuilder {
    /// Maximum chunk length in characters, overlap prefix included.
    ///
    /// Defaults to 2000.
    #[must_use]
    pub fn max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    /// Upper bound in characters for the overlap prefix, separator included.
    ///
    /// Defaults to 150. Zero disables overlap injection.
    #[must_use]
    pub fn overlap_size(mut self, overlap_size: usize) -> Self {
        self.overlap_size = overlap_size;
        self
    }

    /// Replace the default heading heuristic.
    #[must_use]
    pub fn classifier<C: HeadingClassifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Replace the heading heuristic with a shared instance.
    #[must_use]
    pub fn classifier_arc(mut self, classifier: Arc<dyn HeadingClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Validate the configuration and build the segmenter.
    pub fn try_build(self) -> Result<Segmenter, SegmenterError> {
        if self.max_chunk_size == 0 {
            return Err(SegmenterError::ZeroChunkSize);
        }
        if self.overlap_size >= self.max_chunk_size {
            return Err(SegmenterError::OverlapTooLarge {
                overlap: self.overlap_size,
                max: self.max_chunk_size,
            });
        }
        Ok(Segmenter {
            max_chunk_size: self.max_chunk_size,
            overlap_size: self.overlap_size,
            classifier: self
                .classifier
                .unwrap_or_else(|| Arc::new(DefaultHeadingClassifier::default())),
        })
    }
}

// ============================================================================
// Packing internals
// ============================================================================

struct PackedChunk {
    text: String,
    char_len: usize,
    heading_only: bool,
}

struct Draft {
    parts: Vec<String>,
    char_len: usize,
    heading_only: bool,
}

impl Draft {
    fn start(part: String, heading: bool) -> Self {
        let char_len = char_count(&part);
        Self {
            parts: vec![part],
            char_len,
            heading_only: heading,
        }
    }

    fn push(&mut self, part: String) {
        self.char_len += 2 + char_count(&part);
        self.parts.push(part);
        self.heading_only = false;
    }

    fn finish(self) -> PackedChunk {
        PackedChunk {
            text: self.parts.join("\n\n"),
            char_len: self.char_len,
            heading_only: self.heading_only,
        }
    }
}

fn flush_body(lines: &mut Vec<&str>, latest_heading: &Option<String>, out: &mut Vec<Paragraph>) {
    if lines.is_empty() {
        return;
    }
    out.push(Paragraph {
        text: lines.join(" "),
        kind: ParagraphKind::Body,
        heading_context: latest_heading.clone(),
    });
    lines.clear();
}

/// Open a fresh draft with a body paragraph, materializing its heading
/// context at the top when the pair still fits the budget.
fn start_body_draft(para: Paragraph, budget: usize) -> Draft {
    let para_len = char_count(&para.text);
    if let Some(context) = para.heading_context {
        if char_count(&context) + 2 + para_len <= budget {
            let mut draft = Draft::start(context, false);
            draft.push(para.text);
            return draft;
        }
    }
    Draft::start(para.text, false)
}

/// Re-pack an oversized paragraph as closed sentence-fragment chunks.
/// Fragments join with the empty string; a single sentence longer than the
/// budget becomes its own chunk rather than being cut.
fn pack_sentences(text: &str, budget: usize, packed: &mut Vec<PackedChunk>) {
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in split_sentences(text) {
        if current.is_empty() {
            let lead = sentence.trim_start();
            if lead.is_empty() {
                continue;
            }
            current.push_str(lead);
            current_len = char_count(lead);
        } else if current_len + char_count(&sentence) <= budget {
            current.push_str(&sentence);
            current_len += char_count(&sentence);
        } else {
            packed.push(PackedChunk {
                text: std::mem::take(&mut current),
                char_len: current_len,
                heading_only: false,
            });
            let lead = sentence.trim_start();
            current_len = char_count(lead);
            current.push_str(lead);
        }
    }
    if !current.is_empty() {
        packed.push(PackedChunk {
            text: current,
            char_len: current_len,
            heading_only: false,
        });
    }
}

fn char_count(s: &str) -> usize {
    s.chars().count()
}
