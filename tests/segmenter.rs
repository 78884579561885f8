mod common;

use sumweave::segmenter::{ParagraphKind, Segmenter};

fn segmenter(max: usize, overlap: usize) -> Segmenter {
    Segmenter::builder()
        .max_chunk_size(max)
        .overlap_size(overlap)
        .try_build()
        .expect("valid segmenter config")
}

#[test]
fn bounds_hold_across_configurations() {
    let doc = common::numbered_paragraphs(6, 3);

    for (max, overlap) in [(80, 10), (120, 30), (200, 0), (60, 12)] {
        let seg = segmenter(max, overlap);
        let chunks = seg.segment(&doc);
        assert!(!chunks.is_empty(), "no chunks for ({max}, {overlap})");
        assert_eq!(chunks[0].overlap_len, 0);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert!(!chunk.text.is_empty());
            assert!(
                chunk.char_len() <= max,
                "chunk {i} overflows ({max}, {overlap}): {} chars",
                chunk.char_len()
            );
            assert!(chunk.overlap_len <= overlap);
        }
    }
}

#[test]
fn article_is_normalized_and_sectioned() {
    let seg = segmenter(500, 50);
    let chunks = seg.segment(&common::sample_article());

    assert_eq!(chunks.len(), 2);
    for chunk in &chunks {
        assert!(!chunk.text.contains('\r'));
        assert!(!chunk.text.contains("  "));
    }

    assert!(chunks[0].text.starts_with("# Release Notes\n\n"));
    assert!(chunks[0].text.ends_with("The connection pool holds steady."));

    // The second section carries the tail sentence of the first as context.
    assert!(chunks[1]
        .text
        .starts_with("The connection pool holds steady.\n\n"));
    assert_eq!(chunks[1].overlap_len, 35);
    assert!(chunks[1].body().starts_with("## Upgrade Steps"));
}

#[test]
fn single_fitting_paragraph_stays_whole() {
    let doc = common::numbered_paragraphs(1, 2);
    let chunks = segmenter(200, 20).segment(&doc);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, doc);
    assert_eq!(chunks[0].overlap_len, 0);
}

#[test]
fn heading_only_predecessor_is_not_repeated_as_overlap() {
    let chunks = segmenter(40, 12).segment("# Solo\n\nBody follows the heading.\n\nIt has two sentences.");
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

    assert_eq!(
        texts,
        [
            "# Solo",
            "Body follows the heading.",
            "e heading.\n\nIt has two sentences.",
        ]
    );
    // The heading already travels as context, so the chunk after it gets no
    // prefix; the one after that falls back to a raw character tail.
    assert_eq!(chunks[1].overlap_len, 0);
    assert_eq!(chunks[2].overlap_len, 12);
}

#[test]
fn oversized_receiver_gets_no_prefix() {
    let seg = segmenter(30, 8);
    let chunks =
        seg.segment("Short first sentence here.\n\nthis second sentence runs far beyond any budget we allow");

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].overlap_len, 0);
    assert_eq!(
        chunks[1].text,
        "this second sentence runs far beyond any budget we allow"
    );
}

#[test]
fn cjk_text_budgets_by_characters() {
    let seg = segmenter(10, 4);
    let chunks = seg.segment("第一句很长。第二句也很长。第三句结束。");
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

    assert_eq!(texts, ["第一句很长。", "第二句也很长。", "长。\n\n第三句结束。"]);
    assert_eq!(chunks[2].overlap_len, 4);
    assert_eq!(chunks[2].body(), "第三句结束。");
}

#[test]
fn short_lines_and_hash_lines_both_head_sections() {
    let seg = segmenter(500, 0);
    let paragraphs = seg.paragraphs(
        "INTRODUCTION\n\nThe study examines caching behavior in long pipelines.\n\n# Results\n\nNumbers improved.",
    );

    let kinds: Vec<ParagraphKind> = paragraphs.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        [
            ParagraphKind::Heading,
            ParagraphKind::Body,
            ParagraphKind::Heading,
            ParagraphKind::Body,
        ]
    );
    assert_eq!(paragraphs[1].heading_context.as_deref(), Some("INTRODUCTION"));
    assert_eq!(paragraphs[3].heading_context.as_deref(), Some("# Results"));
}
