/// Function words that make weak blanks
pub const STOPWORDS: [&str; 12] = [
    "the", "and", "or", "but", "of", "in", "on", "at", "to", "for", "with", "by",
];

/// Lowercase and drop everything that is not a letter or digit
pub fn normalize(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// How good a candidate `word` at `position` is for a blank. Higher is better.
pub fn importance(word: &str, position: usize) -> u32 {
    let clean = normalize(word);
    let len = clean.chars().count() as u32;

    if len <= 2 {
        return 0;
    }
    if STOPWORDS.contains(&clean.as_str()) {
        return 1;
    }

    // every third position gets a nudge so equal-length words spread out
    len + u32::from(position % 3 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("LORD,"), "lord");
        assert_eq!(normalize("heart;"), "heart");
        assert_eq!(normalize("don't"), "dont");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn test_short_words_score_zero() {
        assert_eq!(importance("in", 1), 0);
        assert_eq!(importance("I,", 0), 0);
        assert_eq!(importance("--", 3), 0);
    }

    #[test]
    fn test_stopwords_score_one() {
        assert_eq!(importance("the", 2), 1);
        assert_eq!(importance("With", 3), 1);
        assert_eq!(importance("for,", 0), 1);
    }

    #[test]
    fn test_length_with_position_bonus() {
        assert_eq!(importance("Trust", 0), 6);
        assert_eq!(importance("Trust", 1), 5);
        assert_eq!(importance("LORD", 3), 5);
        assert_eq!(importance("heart;", 7), 5);
        assert_eq!(importance("all", 5), 3);
    }
}
