use super::importance::normalize;
use crate::util::round_percent;

/// Live feedback for a single word while the user is typing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordStatus {
    Upcoming,
    Correct,
    Partial,
    Incorrect,
}

/// Trimmed, case-insensitive word comparison
pub fn answers_match(target: &str, answer: &str) -> bool {
    target.trim().to_lowercase() == answer.trim().to_lowercase()
}

/// Positional accuracy of `user` against `target`, 0..=100.
/// Only the overlapping prefix is compared; missing words count as wrong.
pub fn score<T: AsRef<str>, U: AsRef<str>>(target: &[T], user: &[U]) -> u8 {
    let correct = target
        .iter()
        .zip(user.iter())
        .filter(|(t, u)| answers_match(t.as_ref(), u.as_ref()))
        .count();
    round_percent(correct, target.len())
}

/// Word-level accuracy of typed text against the verse text
pub fn text_accuracy(target: &str, typed: &str) -> u8 {
    let target: Vec<&str> = target.split_whitespace().collect();
    let typed: Vec<&str> = typed.split_whitespace().collect();
    score(&target, &typed)
}

/// Full-typing success: the whole input equals the verse, ignoring case and outer whitespace
pub fn typing_complete(target: &str, typed: &str) -> bool {
    answers_match(target, typed)
}

/// Status of a target word given what was typed at its position
pub fn word_status(target: &str, typed: Option<&str>) -> WordStatus {
    let Some(typed) = typed else {
        return WordStatus::Upcoming;
    };
    let target = normalize(target);
    let typed = normalize(typed);

    if typed == target {
        WordStatus::Correct
    } else if target.starts_with(&typed) {
        WordStatus::Partial
    } else {
        WordStatus::Incorrect
    }
}

/// Status of every verse word against the current typing input
pub fn word_statuses<T: AsRef<str>>(target: &[T], typed: &str) -> Vec<WordStatus> {
    let typed: Vec<&str> = typed.split_whitespace().collect();
    target
        .iter()
        .enumerate()
        .map(|(i, t)| word_status(t.as_ref(), typed.get(i).copied()))
        .collect()
}

/// Share of the verse length typed so far, 0..=100
pub fn typing_progress(target: &str, typed: &str) -> u8 {
    let target_len = target.chars().count();
    let typed_len = typed.chars().count().min(target_len);
    round_percent(typed_len, target_len)
}
