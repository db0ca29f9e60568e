//! Plain-text extraction and word statistics over chapter markup.

pub mod stopwords;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::markup::dom::Fragment;

pub use stopwords::is_stopword;

/// One token of word characters: letters, digits or underscore, any script.
static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}_]+").unwrap());

/// A ranked vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Strip markup down to readable prose: tag text only, runs of whitespace
/// collapsed to single spaces, trimmed at both ends.
pub fn to_plain_text(markup: &str) -> String {
    let frag = Fragment::parse(markup);
    frag.text_content()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Count word tokens in plain text. Apostrophes split tokens, so
/// "l'été" counts as two words.
pub fn count_words(text: &str) -> usize {
    WORD_TOKEN.find_iter(text).count()
}

/// The most frequent content words of a text, lowercased, skipping tokens
/// shorter than three characters and French stopwords. Ordered by
/// descending count, ties by ascending word.
pub fn top_words(text: &str, limit: usize) -> Vec<WordCount> {
    use std::collections::HashMap;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in WORD_TOKEN.find_iter(text) {
        let word = token.as_str().to_lowercase();
        if word.chars().count() < 3 || is_stopword(&word) {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }
    let mut ranked: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_strips_tags_and_collapses_whitespace() {
        let markup = "<p>Au   bord\n\tdu <em>lac</em></p><p>elle attend.</p>";
        assert_eq!(to_plain_text(markup), "Au bord du lacelle attend.");
    }

    #[test]
    fn test_plain_text_of_empty_markup() {
        assert_eq!(to_plain_text(""), "");
        assert_eq!(to_plain_text("<p>   </p>"), "");
    }

    #[test]
    fn test_count_words_basic() {
        assert_eq!(count_words("la barque glisse sur l'eau"), 6);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   …!?  "), 0);
    }

    #[test]
    fn test_count_words_splits_at_apostrophes() {
        // "l" and "été" are separate tokens.
        assert_eq!(count_words("l'été"), 2);
    }

    #[test]
    fn test_count_words_accepts_digits_and_underscore() {
        assert_eq!(count_words("chapitre 12 v2_final"), 3);
    }

    #[test]
    fn test_top_words_filters_short_tokens_and_stopwords() {
        let text = "le dragon dort et le dragon rêve du dragon au matin";
        let top = top_words(text, 10);
        assert_eq!(top[0], WordCount { word: "dragon".to_string(), count: 3 });
        assert!(top.iter().all(|w| !is_stopword(&w.word)));
        assert!(top.iter().all(|w| w.word.chars().count() >= 3));
    }

    #[test]
    fn test_top_words_lowercases_before_counting() {
        let top = top_words("Navire navire NAVIRE", 5);
        assert_eq!(top, vec![WordCount { word: "navire".to_string(), count: 3 }]);
    }

    #[test]
    fn test_top_words_ties_break_on_word_order() {
        let top = top_words("zèbre brume zèbre brume ancre", 5);
        let words: Vec<&str> = top.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["brume", "zèbre", "ancre"]);
    }

    #[test]
    fn test_top_words_respects_limit() {
        let text = "aube bise crue dune aube bise crue aube bise aube";
        let top = top_words(text, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].word, "aube");
        assert_eq!(top[0].count, 4);
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn top_words_never_exceeds_limit(text in ".{0,200}", limit in 0usize..20) {
                prop_assert!(top_words(&text, limit).len() <= limit);
            }

            #[test]
            fn count_words_matches_token_sum(text in "[a-zA-Zéà '\\.,]{0,120}") {
                let total: usize = WORD_TOKEN.find_iter(&text).count();
                prop_assert_eq!(count_words(&text), total);
            }
        }
    }
}
