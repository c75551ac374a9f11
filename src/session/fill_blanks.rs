use super::{Clock, CompletionEvent, Phase, SessionState};
use crate::exercise::blanks::{
    blank_out, difficulty_percent, first_letter_hint, select_blanks, BlankSet,
};
use crate::exercise::scoring::{answers_match, score};
use crate::exercise::tokenize::{tokenize, Word};
use crate::exercise::ExerciseType;
use crate::util::round_percent;
use crate::verse::Verse;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStatus {
    Empty,
    Correct,
    Incorrect,
}

/// Fill-in-the-blank drill over one verse, difficulty scaled by day of week
#[derive(Debug)]
pub struct FillBlanksSession {
    verse: Verse,
    words: Vec<Word>,
    day: u8,
    difficulty: f64,
    blanks: BlankSet,
    answers: HashMap<usize, String>,
    lock_first_letter: bool,
    state: SessionState,
    clock: Arc<dyn Clock>,
}

impl FillBlanksSession {
    pub fn new(verse: Verse, day: u8, lock_first_letter: bool, clock: Arc<dyn Clock>) -> Self {
        let words = tokenize(verse.text());
        let difficulty = difficulty_percent(day);
        let blanks = select_blanks(&words, difficulty);

        Self {
            verse,
            words,
            day,
            difficulty,
            blanks,
            answers: HashMap::new(),
            lock_first_letter,
            state: SessionState::default(),
            clock,
        }
    }

    pub fn verse(&self) -> &Verse {
        &self.verse
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn blanks(&self) -> &BlankSet {
        &self.blanks
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn difficulty_percent(&self) -> f64 {
        self.difficulty
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state.phase == Phase::Complete
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    /// Replace the answer typed into the blank at word `index`.
    /// Returns the completion event when this change fills the last blank correctly.
    pub fn set_answer(&mut self, index: usize, value: &str) -> Option<CompletionEvent> {
        if !self.state.accepts_input() {
            return None;
        }
        if !self.blanks.contains(index) {
            log::debug!("ignoring answer for word {index}, not a blank");
            return None;
        }

        if value.trim().is_empty() {
            self.answers.remove(&index);
        } else {
            let value = if self.lock_first_letter {
                lock_first_letter(&self.words[index].raw, value)
            } else {
                value.to_string()
            };
            self.state.mark_input(self.clock.now());
            self.answers.insert(index, value);
        }

        self.check_completion()
    }

    pub fn push_char(&mut self, index: usize, c: char) -> Option<CompletionEvent> {
        let mut value = self.answer(index).unwrap_or_default().to_string();
        value.push(c);
        self.set_answer(index, &value)
    }

    pub fn backspace(&mut self, index: usize) -> Option<CompletionEvent> {
        let mut value = self.answer(index).unwrap_or_default().to_string();
        value.pop();
        self.set_answer(index, &value)
    }

    fn check_completion(&mut self) -> Option<CompletionEvent> {
        if self.state.phase == Phase::Complete || !self.all_correct() {
            return None;
        }
        let accuracy = self.accuracy();
        Some(self.state.finish(
            Phase::Complete,
            self.clock.now(),
            ExerciseType::FillBlanks,
            accuracy,
            None,
        ))
    }

    fn all_correct(&self) -> bool {
        self.blanks
            .iter()
            .all(|i| self.answer_status(i) == AnswerStatus::Correct)
    }

    pub fn answer_status(&self, index: usize) -> AnswerStatus {
        match self.answer(index) {
            None => AnswerStatus::Empty,
            Some(answer) if answers_match(&self.words[index].raw, answer) => AnswerStatus::Correct,
            Some(_) => AnswerStatus::Incorrect,
        }
    }

    /// Share of blanks answered correctly, 0..=100
    pub fn accuracy(&self) -> u8 {
        let targets: Vec<&str> = self
            .blanks
            .iter()
            .map(|i| self.words[i].raw.as_str())
            .collect();
        let answers: Vec<&str> = self
            .blanks
            .iter()
            .map(|i| self.answer(i).unwrap_or_default())
            .collect();
        score(&targets, &answers)
    }

    pub fn filled_count(&self) -> usize {
        self.answers.len()
    }

    pub fn progress_percent(&self) -> u8 {
        round_percent(self.filled_count(), self.blanks.len())
    }

    pub fn hint(&self, index: usize) -> Option<String> {
        self.blanks
            .contains(index)
            .then(|| first_letter_hint(&self.words[index].raw))
    }

    pub fn blanked_text(&self) -> String {
        blank_out(&self.words, &self.blanks)
    }

    pub fn reset(&mut self) {
        self.answers.clear();
        self.state = SessionState::default();
    }
}

/// Make sure an answer starts with the target word's first letter, uppercased
fn lock_first_letter(target: &str, value: &str) -> String {
    let Some(first) = target.chars().next() else {
        return value.to_string();
    };
    if value.is_empty() {
        return String::new();
    }

    let first_upper: String = first.to_uppercase().collect();
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.to_lowercase().eq(first.to_lowercase()) => {
            format!("{first_upper}{}", chars.as_str())
        }
        _ => format!("{first_upper}{value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ManualClock;
    use std::time::{Duration, UNIX_EPOCH};

    fn session(day: u8) -> (FillBlanksSession, ManualClock) {
        let clock = ManualClock::new();
        let verse = Verse::new("Trust in the LORD with all your heart", "Proverbs 3:5", "KJV").unwrap();
        (
            FillBlanksSession::new(verse, day, false, Arc::new(clock.clone())),
            clock,
        )
    }

    #[test]
    fn test_day_four_blanks_two_words() {
        let (s, _) = session(4);
        assert_eq!(s.blanks().as_slice(), &[0, 3]);
        assert_eq!(s.blanked_text(), "____ in the ____ with all your heart");
        assert_eq!(s.hint(3).as_deref(), Some("L____"));
        assert_eq!(s.hint(1), None);
    }

    #[test]
    fn test_idle_time_before_typing_is_not_counted() {
        let (mut s, clock) = session(4);
        clock.advance(Duration::from_secs(30));
        assert_eq!(s.state().started_at, None);

        s.set_answer(0, "trust");
        assert_eq!(s.state().started_at, Some(UNIX_EPOCH + Duration::from_secs(30)));
        assert_eq!(s.state().phase, Phase::InProgress);

        clock.advance(Duration::from_millis(1200));
        let event = s.set_answer(3, "lord").expect("completion");
        assert_eq!(event.time_spent_ms, 1200);
        assert_eq!(event.accuracy_percent, 100);
        assert_eq!(event.exercise_type, ExerciseType::FillBlanks);
        assert_eq!(event.round, None);
    }

    #[test]
    fn test_completion_fires_once() {
        let (mut s, _) = session(4);
        assert!(s.set_answer(0, "Trust").is_none());
        assert!(s.set_answer(3, " LORD ").is_some());
        assert!(s.is_complete());
        assert!(s.set_answer(3, "lord").is_none());
        assert!(s.set_answer(0, "trust").is_none());
    }

    #[test]
    fn test_input_ignored_after_completion() {
        let (mut s, _) = session(4);
        s.set_answer(0, "trust");
        s.set_answer(3, "lord");
        s.set_answer(0, "wrong");
        assert_eq!(s.answer(0), Some("trust"));
    }

    #[test]
    fn test_non_blank_answers_are_ignored() {
        let (mut s, _) = session(4);
        assert!(s.set_answer(1, "in").is_none());
        assert!(s.set_answer(99, "x").is_none());
        assert_eq!(s.filled_count(), 0);
        assert_eq!(s.state().phase, Phase::NotStarted);
    }

    #[test]
    fn test_accuracy_and_statuses() {
        let (mut s, _) = session(4);
        assert_eq!(s.accuracy(), 0);
        assert_eq!(s.answer_status(0), AnswerStatus::Empty);

        s.set_answer(0, "trust");
        s.set_answer(3, "lard");
        assert_eq!(s.answer_status(0), AnswerStatus::Correct);
        assert_eq!(s.answer_status(3), AnswerStatus::Incorrect);
        assert_eq!(s.accuracy(), 50);
        assert_eq!(s.progress_percent(), 100);
        assert!(!s.is_complete());
    }

    #[test]
    fn test_clearing_an_answer_removes_it() {
        let (mut s, _) = session(4);
        s.set_answer(0, "tr");
        assert_eq!(s.filled_count(), 1);
        s.set_answer(0, "  ");
        assert_eq!(s.filled_count(), 0);
    }

    #[test]
    fn test_push_char_and_backspace() {
        let (mut s, _) = session(4);
        for c in "trusx".chars() {
            s.push_char(0, c);
        }
        s.backspace(0);
        s.push_char(0, 't');
        assert_eq!(s.answer(0), Some("trust"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut s, _) = session(4);
        s.set_answer(0, "trust");
        s.set_answer(3, "lord");
        assert!(s.is_complete());

        s.reset();
        assert_eq!(s.filled_count(), 0);
        assert_eq!(s.state(), &SessionState::default());
        assert!(s.set_answer(0, "trust").is_none());
        assert!(s.set_answer(3, "lord").is_some());
    }

    #[test]
    fn test_trailing_punctuation_must_be_typed() {
        let verse = Verse::new("Pray evermore.", "1 Thessalonians 5:17", "KJV").unwrap();
        let mut s = FillBlanksSession::new(verse, 1, false, Arc::new(ManualClock::new()));
        assert_eq!(s.blanks().as_slice(), &[1]);
        assert!(s.set_answer(1, "evermore").is_none());
        assert_eq!(s.answer_status(1), AnswerStatus::Incorrect);
        assert!(s.set_answer(1, "EVERMORE.").is_some());
    }

    #[test]
    fn test_first_letter_lock() {
        assert_eq!(lock_first_letter("trust", "rust"), "Trust");
        assert_eq!(lock_first_letter("trust", "trust"), "Trust");
        assert_eq!(lock_first_letter("trust", "Trust"), "Trust");
        assert_eq!(lock_first_letter("trust", ""), "");

        let clock = ManualClock::new();
        let verse = Verse::new("Trust in the LORD with all your heart", "Proverbs 3:5", "KJV").unwrap();
        let mut s = FillBlanksSession::new(verse, 4, true, Arc::new(clock));
        s.set_answer(0, "rust");
        assert_eq!(s.answer(0), Some("Trust"));
    }

    #[test]
    fn test_whitespace_is_blank_with_first_letter_lock() {
        let verse = Verse::new("Trust in the LORD with all your heart", "Proverbs 3:5", "KJV").unwrap();
        let mut s = FillBlanksSession::new(verse, 4, true, Arc::new(ManualClock::new()));

        assert!(s.set_answer(0, " ").is_none());
        assert_eq!(s.answer(0), None);
        assert_eq!(s.filled_count(), 0);
        assert_eq!(s.state().phase, Phase::NotStarted);
        assert_eq!(s.state().started_at, None);

        s.push_char(0, ' ');
        assert_eq!(s.filled_count(), 0);

        s.set_answer(0, "rust");
        s.set_answer(0, "\t");
        assert_eq!(s.answer(0), None);
    }
}
