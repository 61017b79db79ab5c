//! Tokenization and chunk planning for word-synchronized playback.

use once_cell::sync::Lazy;
use regex::Regex;

static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").expect("valid regex"));

/// One whitespace-delimited word with its position in the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordToken {
    pub index: usize,
    pub text: String,
}

/// Split content into ordered, non-empty word tokens.
pub fn tokenize(content: &str) -> Vec<WordToken> {
    let flattened = NEWLINE_RUNS.replace_all(content, " ");
    flattened
        .split_whitespace()
        .enumerate()
        .map(|(index, text)| WordToken {
            index,
            text: text.to_string(),
        })
        .collect()
}

/// Join the words starting at `start` with single spaces.
pub fn join_words_from(tokens: &[WordToken], start: usize) -> String {
    tokens
        .get(start..)
        .unwrap_or_default()
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A contiguous word range sent as one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    pub start_index: usize,
    /// Inclusive.
    pub end_index: usize,
    pub text: String,
}

impl ChunkPlan {
    pub fn word_count(&self) -> usize {
        self.end_index + 1 - self.start_index
    }
}

/// Partition the words from `start` onward into chunks whose joined text
/// stays within `max_chars`, unless a single word is longer than that.
pub fn plan_word_chunks(tokens: &[WordToken], start: usize, max_chars: usize) -> Vec<ChunkPlan> {
    let mut plans = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;
    let mut current_start = start;

    for token in tokens.get(start..).unwrap_or_default() {
        let word_chars = token.text.chars().count();
        if !current.is_empty() && current_chars + 1 + word_chars > max_chars {
            plans.push(ChunkPlan {
                start_index: current_start,
                end_index: token.index - 1,
                text: std::mem::take(&mut current),
            });
            current_chars = 0;
            current_start = token.index;
        }
        if !current.is_empty() {
            current.push(' ');
            current_chars += 1;
        }
        current.push_str(&token.text);
        current_chars += word_chars;
    }

    if !current.is_empty() {
        let end_index = tokens.len().saturating_sub(1);
        plans.push(ChunkPlan {
            start_index: current_start,
            end_index,
            text: current,
        });
    }

    plans
}

/// Very lightweight sentence splitter based on punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            if current.chars().any(|c| !c.is_whitespace()) {
                sentences.push(current.trim().to_string());
            }
            current.clear();
        }
    }

    if current.chars().any(|c| !c.is_whitespace()) {
        sentences.push(current.trim().to_string());
    }

    sentences
}

/// Group sentences into request-sized pieces for batch generation.
///
/// A sentence longer than `max_chars` is emitted on its own.
pub fn plan_sentence_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        let added = current.chars().count() + 1 + sentence.chars().count();
        if !current.is_empty() && added > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[WordToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn tokenize_collapses_newlines_and_whitespace() {
        let tokens = tokenize("Hello\n\n  world\r\n\tagain  ");
        assert_eq!(words(&tokens), vec!["Hello", "world", "again"]);
        assert_eq!(tokens[2].index, 2);
    }

    #[test]
    fn tokenize_is_idempotent() {
        let content = "The quick\nbrown   fox.\n\nJumps over.";
        assert_eq!(tokenize(content), tokenize(content));
    }

    #[test]
    fn tokenize_empty_content() {
        assert!(tokenize(" \n\n ").is_empty());
    }

    #[test]
    fn join_words_from_past_end_is_empty() {
        let tokens = tokenize("a b c");
        assert_eq!(join_words_from(&tokens, 1), "b c");
        assert_eq!(join_words_from(&tokens, 5), "");
    }

    #[test]
    fn chunks_reconstruct_words_and_respect_limit() {
        let content = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do \
                       eiusmod tempor incididunt ut labore et dolore magna aliqua";
        let tokens = tokenize(content);
        for limit in [1, 5, 12, 30, 1000] {
            let plans = plan_word_chunks(&tokens, 0, limit);
            let joined = plans
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            assert_eq!(joined, join_words_from(&tokens, 0));
            for plan in &plans {
                let single_word = plan.start_index == plan.end_index;
                assert!(plan.text.chars().count() <= limit || single_word);
                assert!(!plan.text.is_empty());
            }
        }
    }

    #[test]
    fn chunks_are_contiguous_from_start() {
        let tokens = tokenize(&"word ".repeat(240));
        let plans = plan_word_chunks(&tokens, 7, 500);
        assert_eq!(plans[0].start_index, 7);
        for pair in plans.windows(2) {
            assert_eq!(pair[1].start_index, pair[0].end_index + 1);
        }
        assert_eq!(plans.last().unwrap().end_index, tokens.len() - 1);
    }

    #[test]
    fn exact_fill_does_not_emit_empty_chunk() {
        let tokens = tokenize("abcd efgh");
        let plans = plan_word_chunks(&tokens, 0, 9);
        assert_eq!(plans.len(), 1);
        let plans = plan_word_chunks(&tokens, 0, 4);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[1].text, "efgh");
    }

    #[test]
    fn limit_counts_characters_across_a_chunk() {
        // 11 chars, 13 bytes.
        let tokens = tokenize("héllo wörld again");
        let plans = plan_word_chunks(&tokens, 0, 11);
        let texts: Vec<_> = plans.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["héllo wörld", "again"]);
        assert_eq!(plans[1].start_index, 2);
    }

    #[test]
    fn oversized_word_gets_its_own_chunk() {
        let tokens = tokenize("a supercalifragilistic b");
        let plans = plan_word_chunks(&tokens, 0, 5);
        let texts: Vec<_> = plans.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn twelve_hundred_chars_make_three_chunks() {
        // 240 four-letter words joined by spaces is 1199 chars.
        let tokens = tokenize(&"abcd ".repeat(240));
        let plans = plan_word_chunks(&tokens, 0, 500);
        assert!(plans.len() >= 3);
        assert_eq!(plans[0].start_index, 0);
        assert_eq!(plans.last().unwrap().end_index, 239);
        let covered: usize = plans.iter().map(ChunkPlan::word_count).sum();
        assert_eq!(covered, 240);
    }

    #[test]
    fn start_past_end_plans_nothing() {
        let tokens = tokenize("a b");
        assert!(plan_word_chunks(&tokens, 2, 10).is_empty());
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = split_sentences("One. Two! Three? trailing");
        assert_eq!(sentences, vec!["One.", "Two!", "Three?", "trailing"]);
    }

    #[test]
    fn sentence_chunks_group_until_limit() {
        let chunks = plan_sentence_chunks("Aaaa. Bbbb. Cccc.", 11);
        assert_eq!(chunks, vec!["Aaaa. Bbbb.", "Cccc."]);
    }
}
