use super::tokenize::Word;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

/// Marker rendered in place of a hidden word during typing rounds.
/// Distinct from the fill-in blank marker since nothing is typed into it.
pub const MASK_MARKER: &str = "[...]";

pub const WARMUP_ROUND: u8 = 1;
pub const FINAL_ROUND: u8 = 3;

/// Share of interior words hidden in a round, in percent
pub fn mask_percent(round: u8) -> usize {
    match round {
        0 | 1 => 0,
        2 => 30,
        _ => 60,
    }
}

/// Number of words hidden in `round` for a verse of `word_count` words
pub fn masked_count(word_count: usize, round: u8) -> usize {
    word_count.saturating_sub(2) * mask_percent(round) / 100
}

/// A verse prepared for one typing round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedVerse {
    pub round: u8,
    words: Vec<Word>,
    masked: Vec<usize>,
}

impl MaskedVerse {
    pub fn masked_indices(&self) -> &[usize] {
        &self.masked
    }

    pub fn is_masked(&self, index: usize) -> bool {
        self.masked.binary_search(&index).is_ok()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn render(&self) -> String {
        self.words
            .iter()
            .map(|w| {
                if self.is_masked(w.index) {
                    MASK_MARKER
                } else {
                    w.raw.as_str()
                }
            })
            .join(" ")
    }
}

/// Hide a growing share of the verse for `round`. The first and last words
/// always stay visible so the user has an anchor at both ends.
pub fn mask_for_round<R: Rng + ?Sized>(words: &[Word], round: u8, rng: &mut R) -> MaskedVerse {
    let count = masked_count(words.len(), round);

    let mut masked: Vec<usize> = if count == 0 {
        Vec::new()
    } else {
        let interior: Vec<usize> = (1..words.len() - 1).collect();
        interior.choose_multiple(rng, count).copied().collect()
    };
    masked.sort_unstable();

    MaskedVerse {
        round,
        words: words.to_vec(),
        masked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::tokenize::tokenize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const JEREMIAH: &str = "For I know the plans I have for you";

    #[test]
    fn test_warmup_round_is_unmasked() {
        let words = tokenize(JEREMIAH);
        let mut rng = StdRng::seed_from_u64(7);
        let masked = mask_for_round(&words, WARMUP_ROUND, &mut rng);
        assert!(masked.masked_indices().is_empty());
        assert_eq!(masked.render(), JEREMIAH);
    }

    #[test]
    fn test_round_three_masks_four_of_seven_interior_words() {
        let words = tokenize(JEREMIAH);
        assert_eq!(words.len(), 9);
        let mut rng = StdRng::seed_from_u64(42);
        let masked = mask_for_round(&words, FINAL_ROUND, &mut rng);
        assert_eq!(masked.masked_indices().len(), 4);
        assert!(!masked.is_masked(0));
        assert!(!masked.is_masked(8));
        assert!(masked.masked_indices().iter().all(|&i| (1..=7).contains(&i)));
    }

    #[test]
    fn test_exemption_and_coverage_across_seeds() {
        let words = tokenize("Be still, and know that I am God: I will be exalted among the heathen");
        let n = words.len();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            for round in [2, 3] {
                let masked = mask_for_round(&words, round, &mut rng);
                let idx = masked.masked_indices();
                assert_eq!(idx.len(), masked_count(n, round));
                assert!(!masked.is_masked(0), "seed {seed} masked the first word");
                assert!(!masked.is_masked(n - 1), "seed {seed} masked the last word");
                assert!(idx.windows(2).all(|w| w[0] < w[1]), "duplicates or disorder");
            }
        }
    }

    #[test]
    fn test_same_seed_same_mask() {
        let words = tokenize(JEREMIAH);
        let a = mask_for_round(&words, 2, &mut StdRng::seed_from_u64(3));
        let b = mask_for_round(&words, 2, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_verses_are_never_masked() {
        let mut rng = StdRng::seed_from_u64(1);
        for text in ["Selah", "Jesus wept.", "Rejoice evermore always"] {
            let words = tokenize(text);
            let masked = mask_for_round(&words, FINAL_ROUND, &mut rng);
            assert!(masked.masked_indices().is_empty(), "{text}");
        }
    }

    #[test]
    fn test_masked_count_uses_integer_percentages() {
        assert_eq!(masked_count(9, 2), 2);
        assert_eq!(masked_count(9, 3), 4);
        assert_eq!(masked_count(12, 2), 3);
        assert_eq!(masked_count(12, 3), 6);
        assert_eq!(masked_count(2, 3), 0);
        assert_eq!(masked_count(0, 3), 0);
    }

    #[test]
    fn test_render_uses_mask_marker() {
        let words = tokenize(JEREMIAH);
        let masked = mask_for_round(&words, FINAL_ROUND, &mut StdRng::seed_from_u64(9));
        let rendered = masked.render();
        assert_eq!(rendered.matches(MASK_MARKER).count(), 4);
        assert!(rendered.starts_with("For "));
        assert!(rendered.ends_with(" you"));
    }
}
