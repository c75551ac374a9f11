use super::{Clock, CompletionEvent, Phase, SessionEnv, SessionState};
use crate::exercise::masking::{mask_for_round, MaskedVerse, FINAL_ROUND, WARMUP_ROUND};
use crate::exercise::scoring::{text_accuracy, typing_complete, typing_progress, word_statuses, WordStatus};
use crate::exercise::tokenize::{tokenize, Word};
use crate::exercise::ExerciseType;
use crate::verse::Verse;
use rand::rngs::StdRng;
use std::sync::Arc;

/// Type-the-verse drill. With more than one round, later rounds hide a growing
/// share of the verse while the user still types all of it.
#[derive(Debug)]
pub struct TypingSession {
    verse: Verse,
    words: Vec<Word>,
    total_rounds: u8,
    hints_available: bool,
    hints_visible: bool,
    masked: MaskedVerse,
    input: String,
    state: SessionState,
    clock: Arc<dyn Clock>,
    rng: StdRng,
}

impl TypingSession {
    pub fn new(verse: Verse, rounds: u8, show_hints: bool, env: SessionEnv) -> Self {
        let SessionEnv { clock, mut rng } = env;
        let words = tokenize(verse.text());
        let masked = mask_for_round(&words, WARMUP_ROUND, &mut rng);

        Self {
            verse,
            words,
            total_rounds: rounds.clamp(WARMUP_ROUND, FINAL_ROUND),
            hints_available: show_hints,
            hints_visible: false,
            masked,
            input: String::new(),
            state: SessionState::default(),
            clock,
            rng,
        }
    }

    pub fn verse(&self) -> &Verse {
        &self.verse
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn round(&self) -> u8 {
        self.state.round
    }

    pub fn total_rounds(&self) -> u8 {
        self.total_rounds
    }

    pub fn masked(&self) -> &MaskedVerse {
        &self.masked
    }

    pub fn is_last_round(&self) -> bool {
        self.state.round >= self.total_rounds
    }

    pub fn hints_available(&self) -> bool {
        self.hints_available
    }

    pub fn hints_visible(&self) -> bool {
        self.hints_visible
    }

    pub fn toggle_hints(&mut self) {
        if self.hints_available {
            self.hints_visible = !self.hints_visible;
        }
    }

    /// Replace the whole input, as a text area would on every change
    pub fn set_input(&mut self, text: &str) -> Option<CompletionEvent> {
        if !self.state.accepts_input() {
            return None;
        }
        self.input = text.to_string();
        if !self.input.is_empty() {
            self.state.mark_input(self.clock.now());
        }
        self.check_completion()
    }

    pub fn push_char(&mut self, c: char) -> Option<CompletionEvent> {
        let mut text = self.input.clone();
        text.push(c);
        self.set_input(&text)
    }

    pub fn backspace(&mut self) -> Option<CompletionEvent> {
        let mut text = self.input.clone();
        text.pop();
        self.set_input(&text)
    }

    /// Append dictated text after whatever has been typed so far
    pub fn append_transcript(&mut self, transcript: &str) -> Option<CompletionEvent> {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return None;
        }
        let mut text = self.input.clone();
        if !text.is_empty() && !text.ends_with(char::is_whitespace) {
            text.push(' ');
        }
        text.push_str(transcript);
        self.set_input(&text)
    }

    fn check_completion(&mut self) -> Option<CompletionEvent> {
        if self.state.phase != Phase::InProgress
            || !typing_complete(self.verse.text(), &self.input)
        {
            return None;
        }

        let phase = if self.is_last_round() {
            Phase::Complete
        } else {
            Phase::RoundComplete
        };
        let round = (self.total_rounds > 1).then_some(self.state.round);
        let accuracy = self.accuracy();
        Some(self.state.finish(
            phase,
            self.clock.now(),
            ExerciseType::Typing,
            accuracy,
            round,
        ))
    }

    /// Move from a finished round to the next one. The start time is kept so
    /// completion events report time spent across the whole drill.
    pub fn next_round(&mut self) -> bool {
        if self.state.phase != Phase::RoundComplete {
            return false;
        }
        self.state.round += 1;
        self.state.phase = Phase::InProgress;
        self.input.clear();
        self.masked = mask_for_round(&self.words, self.state.round, &mut self.rng);
        log::debug!(
            "typing round {} of {} masks {} words",
            self.state.round,
            self.total_rounds,
            self.masked.masked_indices().len()
        );
        true
    }

    pub fn accuracy(&self) -> u8 {
        text_accuracy(self.verse.text(), &self.input)
    }

    pub fn progress_percent(&self) -> u8 {
        typing_progress(self.verse.text(), &self.input)
    }

    pub fn word_statuses(&self) -> Vec<WordStatus> {
        let raw: Vec<&str> = self.words.iter().map(|w| w.raw.as_str()).collect();
        word_statuses(&raw, &self.input)
    }

    pub fn reset(&mut self) {
        self.input.clear();
        self.hints_visible = false;
        self.state = SessionState::default();
        self.masked = mask_for_round(&self.words, WARMUP_ROUND, &mut self.rng);
    }
}
