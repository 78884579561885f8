//! Document builders shared across integration tests.

#![allow(dead_code)]

/// A short article with headings, ragged whitespace, and CRLF line endings,
/// so end-to-end tests exercise normalization too.
pub fn sample_article() -> String {
    "# Release Notes\r\n\r\nThe cache layer now reuses   connections across calls. \
     Cold start drops to two seconds.\r\n\r\nOperators report fewer timeouts under load. \
     The connection pool holds steady.\r\n\r\n## Upgrade Steps\r\nStop the old daemon. \
     Copy the new binary into place. Start the daemon again.\r\n"
        .to_string()
}

/// `count` flat paragraphs of `sentences_per` numbered sentences.
///
/// Every sentence is unique, so reassembly tests can rule out accidental
/// suffix/prefix matches.
pub fn numbered_paragraphs(count: usize, sentences_per: usize) -> String {
    (0..count)
        .map(|p| {
            (0..sentences_per)
                .map(|s| format!("Paragraph {p} sentence {s} runs along here."))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
