// src/summarize.rs
//! Position-only extractive summarizer: keep the leading sentences.
//! Sentences are split on the literal ". " delimiter; abbreviations and
//! decimals are not special-cased.

pub const NO_CONTENT_TO_SUMMARIZE: &str = "No content available to summarize.";

pub const DEFAULT_MAX_SENTENCES: usize = 3;

const MIN_TEXT_CHARS: usize = 10;
const SENTENCE_DELIMITER: &str = ". ";

/// First three sentences of `text`.
pub fn summarize(text: &str) -> String {
    summarize_with(text, DEFAULT_MAX_SENTENCES)
}

/// First `max_sentences` sentences of `text` (at least one). Text with no more
/// fragments than that is returned unchanged.
pub fn summarize_with(text: &str, max_sentences: usize) -> String {
    if text.chars().count() < MIN_TEXT_CHARS {
        return NO_CONTENT_TO_SUMMARIZE.to_string();
    }

    let keep = max_sentences.max(1);
    let fragments: Vec<&str> = text.split(SENTENCE_DELIMITER).collect();
    if fragments.len() <= keep {
        return text.to_string();
    }

    let mut out = fragments[..keep].join(SENTENCE_DELIMITER);
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_or_empty_text_yields_sentinel() {
        assert_eq!(summarize(""), NO_CONTENT_TO_SUMMARIZE);
        assert_eq!(summarize("short"), NO_CONTENT_TO_SUMMARIZE);
        // nine chars, still too short
        assert_eq!(summarize("123456789"), NO_CONTENT_TO_SUMMARIZE);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 5 chars, 10 bytes
        assert_eq!(summarize("ééééé"), NO_CONTENT_TO_SUMMARIZE);
    }

    #[test]
    fn three_or_fewer_fragments_are_returned_unchanged() {
        let t = "One sentence. Two sentence. Three sentence.";
        assert_eq!(summarize(t), t);
        let single = "No delimiter in this text at all";
        assert_eq!(summarize(single), single);
    }

    #[test]
    fn more_than_three_fragments_keep_first_three_plus_period() {
        let t = "A is first. B is second. C is third. D is fourth. E is fifth.";
        assert_eq!(summarize(t), "A is first. B is second. C is third.");
    }

    #[test]
    fn delimiter_is_literal() {
        let t = "Version 1. 2 is out. Dr. Smith agrees. Then more. End";
        assert_eq!(summarize(t), "Version 1. 2 is out. Dr.");
    }

    #[test]
    fn custom_sentence_count() {
        let t = "Alpha one. Beta two. Gamma three.";
        assert_eq!(summarize_with(t, 1), "Alpha one.");
        assert_eq!(summarize_with(t, 0), "Alpha one.");
        assert_eq!(summarize_with(t, 5), t);
    }
}
