//! Sentence boundary scanning shared by packing and overlap construction.

/// Characters that terminate a sentence, ASCII and full-width forms alike.
pub const SENTENCE_TERMINALS: &[char] = &['.', '!', '?', '。', '！', '？', '．'];

/// Split text into sentences on terminal punctuation.
///
/// A sentence runs up to and including a maximal run of terminal characters,
/// so `"Wait!!"` stays one sentence. Whitespace between sentences attaches to
/// the following sentence, which keeps `concat(sentences) == text` exact.
/// Text with no terminal at all is returned as a single sentence.
///
/// # Examples
///
/// ```
/// use sumweave::segmenter::split_sentences;
///
/// let sentences = split_sentences("Alpha beta gamma. Delta epsilon.");
/// assert_eq!(sentences, vec!["Alpha beta gamma.", " Delta epsilon."]);
///
/// assert_eq!(split_sentences("no terminal here"), vec!["no terminal here"]);
/// ```
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut in_terminal_run = false;

    for ch in text.chars() {
        let is_terminal = SENTENCE_TERMINALS.contains(&ch);
        if in_terminal_run && !is_terminal {
            sentences.push(std::mem::take(&mut current));
            in_terminal_run = false;
        }
        current.push(ch);
        if is_terminal {
            in_terminal_run = true;
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_ascii_terminals() {
        assert_eq!(
            split_sentences("One. Two! Three?"),
            vec!["One.", " Two!", " Three?"]
        );
    }

    #[test]
    fn splits_on_full_width_terminals() {
        assert_eq!(split_sentences("第一句。第二句！"), vec!["第一句。", "第二句！"]);
    }

    #[test]
    fn terminal_runs_stay_with_their_sentence() {
        assert_eq!(split_sentences("Wait!! Really?!"), vec!["Wait!!", " Really?!"]);
    }

    #[test]
    fn no_terminal_means_one_sentence() {
        assert_eq!(split_sentences("just a fragment"), vec!["just a fragment"]);
    }

    #[test]
    fn empty_text_yields_no_sentences() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn concatenation_is_lossless() {
        let text = "A first one. Then!! another?  and a tail";
        assert_eq!(split_sentences(text).concat(), text);
    }
}
