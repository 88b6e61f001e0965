//! Budget-aware text segmentation
//!
//! Splits text into segments that fit the extraction model's input window.
//! Sentence boundaries are preferred; an oversized sentence is split on word
//! boundaries, and a single word that alone exceeds the budget is truncated
//! rather than dropped. The split is deterministic for a given input.

use relstream_domain::TokenCounter;
use tracing::warn;

/// Fraction of the model window the segmenter actually fills, in tenths.
///
/// Leaves headroom for the tokenizer's special tokens and estimation error.
const BUDGET_NUMERATOR: usize = 9;
const BUDGET_DENOMINATOR: usize = 10;

/// Token estimate derived from whitespace-delimited words.
///
/// Approximates subword tokenization as 4 tokens per 3 words, which is
/// conservative for European languages. Exact counts do not matter here;
/// the budget already carries headroom.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceCounter;

impl TokenCounter for WhitespaceCounter {
    fn count(&self, text: &str) -> usize {
        let words = text.split_whitespace().count();
        (words * 4).div_ceil(3)
    }
}

/// Sentence-preferring splitter with a hard token budget per segment.
///
/// # Examples
///
/// ```
/// use relstream_segment::{Segmenter, WhitespaceCounter};
///
/// let segmenter = Segmenter::new(WhitespaceCounter, 1024);
/// let pieces = segmenter.split("Apple Inc. is headquartered in Cupertino.");
/// assert_eq!(pieces.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Segmenter<C: TokenCounter> {
    counter: C,
    budget: usize,
}

impl<C: TokenCounter> Segmenter<C> {
    /// Create a segmenter for a model window of `max_tokens`.
    ///
    /// The effective per-segment budget is 90% of the window.
    pub fn new(counter: C, max_tokens: usize) -> Self {
        let budget = (max_tokens * BUDGET_NUMERATOR / BUDGET_DENOMINATOR).max(1);
        Self { counter, budget }
    }

    /// The effective token budget per segment.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Split text into budget-respecting pieces, in document order.
    ///
    /// Whitespace-only input yields no pieces. Every piece is non-empty and
    /// trimmed.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut current = String::new();
        let mut current_tokens = 0;

        for sentence in split_sentences(text) {
            let sentence_tokens = self.counter.count(&sentence);

            if sentence_tokens > self.budget {
                // Flush whatever is accumulated, then word-split the outlier
                if !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                    current_tokens = 0;
                }
                self.split_words(&sentence, &mut pieces);
                continue;
            }

            if current_tokens + sentence_tokens > self.budget && !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_tokens = 0;
            }

            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&sentence);
            current_tokens += sentence_tokens;
        }

        if !current.is_empty() {
            pieces.push(current);
        }

        pieces
    }

    fn split_words(&self, sentence: &str, pieces: &mut Vec<String>) {
        let mut current = String::new();
        let mut current_tokens = 0;

        for word in sentence.split_whitespace() {
            let word_tokens = self.counter.count(word);

            if word_tokens > self.budget {
                if !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                    current_tokens = 0;
                }
                pieces.push(self.truncate_word(word));
                continue;
            }

            if current_tokens + word_tokens > self.budget && !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_tokens = 0;
            }

            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_tokens += word_tokens;
        }

        if !current.is_empty() {
            pieces.push(current);
        }
    }

    /// Hard-truncate a single word that alone exceeds the budget.
    ///
    /// The counter cannot see inside a word, so the word is cut to `budget`
    /// chars, which always fits.
    fn truncate_word(&self, word: &str) -> String {
        warn!(
            length = word.len(),
            budget = self.budget,
            "truncating oversized word"
        );
        word.chars().take(self.budget).collect()
    }
}

/// Split text on sentence-final punctuation, keeping the punctuation.
///
/// A boundary is one or more of `.`, `!`, `?` followed by whitespace or end
/// of input. Runs of whitespace between sentences are dropped; each returned
/// sentence is trimmed and non-empty.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut in_terminator = false;

    for c in text.chars() {
        if matches!(c, '.' | '!' | '?') {
            current.push(c);
            in_terminator = true;
        } else if in_terminator && c.is_whitespace() {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
            in_terminator = false;
        } else {
            current.push(c);
            in_terminator = false;
        }
    }

    let sentence = current.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }

    sentences
}
