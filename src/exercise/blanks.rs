use super::importance::importance;
use super::tokenize::Word;
use itertools::Itertools;

/// Marker rendered in place of a word the user has to fill in
pub const BLANK_MARKER: &str = "____";

pub const MIN_DAY: u8 = 1;
pub const MAX_DAY: u8 = 7;
const MAX_DIFFICULTY_PERCENT: f64 = 60.0;

/// Strictly increasing word indices chosen as blanks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlankSet(Vec<usize>);

impl BlankSet {
    pub fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Position of `index` among the blanks, used to move between inputs
    pub fn position(&self, index: usize) -> Option<usize> {
        self.0.binary_search(&index).ok()
    }
}

/// Percentage of words blanked on a given day of the week, 10% rising to 60%
pub fn difficulty_percent(day: u8) -> f64 {
    let day = day.clamp(MIN_DAY, MAX_DAY);
    (10.0 + f64::from(day - 1) * 8.33).min(MAX_DIFFICULTY_PERCENT)
}

pub fn target_blank_count(word_count: usize, difficulty_percent: f64) -> usize {
    if word_count == 0 {
        return 0;
    }
    let wanted = (word_count as f64 * difficulty_percent / 100.0).floor() as usize;
    wanted.clamp(1, word_count)
}

/// Pick the most important words as blanks, returned in reading order
pub fn select_blanks(words: &[Word], difficulty_percent: f64) -> BlankSet {
    let target = target_blank_count(words.len(), difficulty_percent);

    let mut ranked: Vec<(usize, u32)> = words
        .iter()
        .map(|w| (w.index, importance(&w.raw, w.index)))
        .collect();
    // sort_by is stable: equal importance keeps reading order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    BlankSet(
        ranked
            .into_iter()
            .take(target)
            .map(|(index, _)| index)
            .sorted()
            .collect(),
    )
}

/// The verse with every blank replaced by the blank marker
pub fn blank_out(words: &[Word], blanks: &BlankSet) -> String {
    words
        .iter()
        .map(|w| {
            if blanks.contains(w.index) {
                BLANK_MARKER
            } else {
                w.raw.as_str()
            }
        })
        .join(" ")
}

/// "T____" style hint showing only the uppercased first letter
pub fn first_letter_hint(word: &str) -> String {
    let first: String = word.chars().take(1).flat_map(char::to_uppercase).collect();
    format!("{first}{BLANK_MARKER}")
}
