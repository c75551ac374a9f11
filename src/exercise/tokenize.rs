/// A word of the verse, addressed by its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub index: usize,
    pub raw: String,
}

impl Word {
    pub fn new(index: usize, raw: impl Into<String>) -> Self {
        Self {
            index,
            raw: raw.into(),
        }
    }
}

/// Split verse text on runs of whitespace, keeping punctuation attached.
/// Empty or whitespace-only text yields no words.
pub fn tokenize(text: &str) -> Vec<Word> {
    text.split_whitespace()
        .enumerate()
        .map(|(index, raw)| Word::new(index, raw))
        .collect()
}

/// The raw strings of a word sequence, in order
pub fn raw_words(words: &[Word]) -> Vec<&str> {
    words.iter().map(|w| w.raw.as_str()).collect()
}
